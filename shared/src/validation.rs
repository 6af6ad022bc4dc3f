//! Input validation functions
//!
//! This module provides validation utilities for user input, shared by
//! the request handlers and the configuration loader.

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if !email.contains('@') || !email.contains('.') {
        return Err("Invalid email format".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    // Basic email regex check
    let email_regex = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    if !email_regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.len() > 100 {
        return Err("Name too long".to_string());
    }
    Ok(())
}

/// Validate a content title (blog posts, projects)
pub fn validate_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if trimmed.len() > 200 {
        return Err("Title too long".to_string());
    }
    Ok(())
}

/// Validate a URL slug: lowercase alphanumerics and hyphens, no leading,
/// trailing, or doubled hyphens
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug cannot be empty".to_string());
    }
    if slug.len() > 120 {
        return Err("Slug too long".to_string());
    }
    let slug_regex = regex_lite::Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
    if !slug_regex.is_match(slug) {
        return Err("Slug must contain only lowercase letters, digits, and hyphens".to_string());
    }
    Ok(())
}

/// Derive a slug from a title
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Validate a project rating value
pub fn validate_rating(rating: i32) -> Result<(), String> {
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5".to_string());
    }
    Ok(())
}

/// Validate a contact/comment message body
pub fn validate_message_body(body: &str) -> Result<(), String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("Message cannot be empty".to_string());
    }
    if trimmed.len() > 5000 {
        return Err("Message too long".to_string());
    }
    Ok(())
}

/// Validate an optional http(s) link
pub fn validate_link(url: &str) -> Result<(), String> {
    if url.len() > 500 {
        return Err("Link too long".to_string());
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("Link must start with http:// or https://".to_string());
    }
    Ok(())
}
