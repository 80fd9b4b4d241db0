//! Services layer - Business logic
//!
//! Services implement business rules, coordinate between repositories
//! and the cache, and handle validation and error cases.

pub mod auth;
pub mod company;
pub mod course;
pub mod file;
pub mod password;
pub mod rate_limiter;
pub mod section;
pub mod team_member;
pub mod testimonial;

pub use auth::{AuthService, AuthServiceError, LoginInput, RequestMeta, SetupInput};
pub use company::CompanyService;
pub use course::{CourseService, CourseServiceError};
pub use file::{FileService, FileServiceError, UploadedData};
pub use password::{hash_password, verify_password};
pub use rate_limiter::LoginRateLimiter;
pub use section::SectionService;
pub use team_member::TeamMemberService;
pub use testimonial::{TestimonialService, TestimonialServiceError};
