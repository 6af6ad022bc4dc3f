//! Testimonial service
//!
//! Submissions land unapproved; only the admin listing sees them before
//! moderation.

use crate::error::ApiError;
use crate::repositories::{TestimonialRecord, TestimonialRepository};
use portfolio_shared::models::Testimonial;
use portfolio_shared::types::{CreateTestimonialRequest, MessageResponse};
use portfolio_shared::validation;
use sqlx::PgPool;
use uuid::Uuid;

/// Testimonial service for submissions and moderation
pub struct TestimonialService;

impl TestimonialService {
    /// List testimonials, restricted to approved ones for public callers
    pub async fn list(pool: &PgPool, include_unapproved: bool) -> Result<Vec<Testimonial>, ApiError> {
        let records = TestimonialRepository::list(pool, !include_unapproved).await?;

        Ok(records.into_iter().map(testimonial_from).collect())
    }

    /// Submit a testimonial for moderation
    pub async fn create(
        pool: &PgPool,
        request: &CreateTestimonialRequest,
    ) -> Result<Testimonial, ApiError> {
        validate_field("authorName", validation::validate_name(&request.author_name))?;
        validate_field("quote", validation::validate_message_body(&request.quote))?;

        let record = TestimonialRepository::create(
            pool,
            request.author_name.trim(),
            request.author_role.as_deref(),
            request.company.as_deref(),
            request.quote.trim(),
        )
        .await?;

        Ok(testimonial_from(record))
    }

    /// Mark a testimonial as approved
    pub async fn approve(pool: &PgPool, id: Uuid) -> Result<Testimonial, ApiError> {
        let record = TestimonialRepository::approve(pool, id)
            .await?
            .ok_or_else(testimonial_not_found)?;

        Ok(testimonial_from(record))
    }

    /// Remove a testimonial
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<MessageResponse, ApiError> {
        if !TestimonialRepository::delete(pool, id).await? {
            return Err(testimonial_not_found());
        }

        Ok(MessageResponse::new("Testimonial deleted"))
    }
}

fn testimonial_from(record: TestimonialRecord) -> Testimonial {
    Testimonial {
        id: record.id,
        author_name: record.author_name,
        author_role: record.author_role,
        company: record.company,
        quote: record.quote,
        approved: record.approved,
        created_at: record.created_at,
    }
}

fn validate_field(field: &str, result: Result<(), String>) -> Result<(), ApiError> {
    result.map_err(|message| ApiError::FieldValidation {
        field: field.to_string(),
        message,
    })
}

fn testimonial_not_found() -> ApiError {
    ApiError::NotFound("Testimonial not found".to_string())
}
