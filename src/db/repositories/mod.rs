//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod company;
pub mod course;
pub mod file;
pub mod section;
pub mod session;
pub mod team_member;
pub mod testimonial;
pub mod user;

pub use company::{CompanyRepository, SqlxCompanyRepository};
pub use course::{CourseRepository, SqlxCourseRepository};
pub use file::{FileRepository, SqlxFileRepository};
pub use section::{Section, SectionRepository, SqlxSectionRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use team_member::{SqlxTeamMemberRepository, TeamMemberRepository};
pub use testimonial::{SqlxTestimonialRepository, TestimonialRepository};
pub use user::{AdminUserRepository, SqlxAdminUserRepository};
