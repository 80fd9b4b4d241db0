//! Data models
//!
//! Data structures used throughout the Kursa backend. Models represent
//! database entities (CompanyInfo, Course, TeamMember, Testimonial,
//! sections, StoredFile, AdminUser, Session) and their create/update
//! inputs.

mod company;
mod course;
mod file;
mod section;
mod session;
mod team_member;
mod testimonial;
mod user;

pub use company::{CompanyInfo, UpdateCompanyInput};
pub use course::{
    generate_slug, Course, CourseFeature, CourseWithFeatures, CreateCourseInput,
    CreateFeatureInput, OrderItem, UpdateCourseInput, UpdateFeatureInput,
};
pub use file::StoredFile;
pub use section::{FooterContent, FooterLink, HeroContent};
pub use session::Session;
pub use team_member::{CreateTeamMemberInput, TeamMember, UpdateTeamMemberInput};
pub use testimonial::{CreateTestimonialInput, Testimonial, UpdateTestimonialInput};
pub use user::AdminUser;
