//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, the refresh-token store, and the mail gateway.

pub mod admin;
pub mod auth;
pub mod blog;
pub mod comment;
pub mod contact;
pub mod project;
pub mod testimonial;
pub mod user;

pub use admin::AdminService;
pub use auth::SessionService;
pub use blog::BlogService;
pub use comment::CommentService;
pub use contact::ContactService;
pub use project::ProjectService;
pub use testimonial::TestimonialService;
pub use user::UserService;
