//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod admin;
pub mod blog;
pub mod comment;
pub mod contact;
pub mod project;
pub mod testimonial;
pub mod user;

pub use admin::{AdminRecord, AdminRepository};
pub use blog::{BlogPostRecord, BlogRepository, CreateBlogPost, UpdateBlogPost};
pub use comment::{CommentRecord, CommentRepository};
pub use contact::{ContactRecord, ContactRepository};
pub use project::{CreateProject, ProjectRecord, ProjectRepository, UpdateProject};
pub use testimonial::{TestimonialRecord, TestimonialRepository};
pub use user::{UpdateUserProfile, UserRecord, UserRepository};
