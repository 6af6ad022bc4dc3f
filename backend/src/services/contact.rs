//! Contact message service
//!
//! Public submission with validation, admin inbox with unread filtering,
//! and a CSV export of the full history.

use crate::error::ApiError;
use crate::repositories::{ContactRecord, ContactRepository};
use portfolio_shared::models::ContactMessage;
use portfolio_shared::types::{
    ContactListQuery, ContactMessageRequest, MessageResponse, PaginatedResponse,
};
use portfolio_shared::validation;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// CSV export row for contact messages
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCsvRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

/// Contact service for the public form and the admin inbox
pub struct ContactService;

impl ContactService {
    /// Accept a contact form submission
    pub async fn submit(
        pool: &PgPool,
        request: &ContactMessageRequest,
    ) -> Result<MessageResponse, ApiError> {
        validate_field("name", validation::validate_name(&request.name))?;
        validate_field("email", validation::validate_email(&request.email))?;
        validate_field("message", validation::validate_message_body(&request.message))?;

        ContactRepository::create(
            pool,
            request.name.trim(),
            request.email.trim(),
            request.subject.as_deref(),
            request.message.trim(),
        )
        .await?;

        Ok(MessageResponse::new("Message received"))
    }

    /// List messages for the admin inbox, newest first
    pub async fn list(
        pool: &PgPool,
        query: &ContactListQuery,
    ) -> Result<PaginatedResponse<ContactMessage>, ApiError> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;
        let unread_only = query.unread_only.unwrap_or(false);

        let (records, total) =
            ContactRepository::list(pool, unread_only, per_page as i64, offset).await?;

        let total = total.max(0) as u64;
        let total_pages = ((total + per_page as u64 - 1) / per_page as u64) as u32;
        Ok(PaginatedResponse {
            data: records.into_iter().map(message_from).collect(),
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Mark a message as read
    pub async fn mark_read(pool: &PgPool, id: Uuid) -> Result<ContactMessage, ApiError> {
        let record = ContactRepository::mark_read(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Contact message not found".to_string()))?;

        Ok(message_from(record))
    }

    /// Export every message as CSV, oldest first
    pub async fn export_csv(pool: &PgPool) -> Result<String, ApiError> {
        let records = ContactRepository::list_all(pool).await?;

        let rows: Vec<ContactCsvRow> = records
            .into_iter()
            .map(|record| ContactCsvRow {
                id: record.id.to_string(),
                name: record.name,
                email: record.email,
                subject: record.subject.unwrap_or_default(),
                message: record.message,
                read: record.read,
                created_at: record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            })
            .collect();

        to_csv(&rows)
    }
}

fn to_csv<T: Serialize>(data: &[T]) -> Result<String, ApiError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV flush error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("CSV encoding error: {}", e)))
}

fn message_from(record: ContactRecord) -> ContactMessage {
    ContactMessage {
        id: record.id,
        name: record.name,
        email: record.email,
        subject: record.subject,
        message: record.message,
        read: record.read,
        created_at: record.created_at,
    }
}

fn validate_field(field: &str, result: Result<(), String>) -> Result<(), ApiError> {
    result.map_err(|message| ApiError::FieldValidation {
        field: field.to_string(),
        message,
    })
}
