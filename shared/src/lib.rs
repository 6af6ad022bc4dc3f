//! Portfolio Shared Library
//!
//! This crate contains shared types, models, and validation helpers used
//! across the backend workspace members.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;

// Export models
pub use models::{
    BlogPost, Comment, ContactMessage, Project, Role, SocialLinks, Testimonial, TokenState,
};
