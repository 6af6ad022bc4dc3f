//! Email dispatch
//!
//! `Mailer` is the seam between account flows and the outside world. The
//! gateway implementation posts JSON to an HTTP mail relay; the logging
//! implementation is the default for development and stands in whenever
//! no relay host is configured.

use crate::config::EmailConfig;
use anyhow::{anyhow, Context, Result};
use portfolio_shared::models::Role;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const SEND_TIMEOUT_SECS: u64 = 10;

/// A fully rendered outbound message
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Logs outbound mail instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "email send (log only)"
        );
        Ok(())
    }
}

/// Delivers mail through an HTTP relay as a JSON POST
pub struct GatewayMailer {
    client: reqwest::Client,
    endpoint: String,
    from_address: String,
    username: Option<String>,
    password: Option<SecretString>,
}

impl GatewayMailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .context("mail gateway host is not configured")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .context("failed to build mail gateway client")?;

        Ok(Self {
            client,
            endpoint: format!("http://{}:{}/messages", host, config.port),
            from_address: config.from_address.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    #[cfg(test)]
    fn with_endpoint(endpoint: String, from_address: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            from_address,
            username: None,
            password: None,
        }
    }
}

#[async_trait::async_trait]
impl Mailer for GatewayMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let payload = serde_json::json!({
            "from": self.from_address,
            "to": message.to,
            "subject": message.subject,
            "body": message.body,
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(username) = &self.username {
            request = request.basic_auth(
                username,
                self.password.as_ref().map(ExposeSecret::expose_secret),
            );
        }

        let response = request
            .send()
            .await
            .context("mail gateway request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("mail gateway rejected message: {status} {body}"));
        }

        Ok(())
    }
}

/// Pick the mailer for the current configuration
pub fn build_mailer(config: &EmailConfig) -> Result<Arc<dyn Mailer>> {
    if config.is_configured() {
        info!("email: using HTTP gateway mailer");
        Ok(Arc::new(GatewayMailer::from_config(config)?))
    } else {
        info!("email: no gateway configured, using logging mailer");
        Ok(Arc::new(LogMailer))
    }
}

fn reset_link(frontend_url: &str, role: Role, token: &str) -> String {
    let base = frontend_url.trim_end_matches('/');
    match role {
        Role::Admin => format!("{base}/admin/reset-password/{token}"),
        Role::User => format!("{base}/reset-password/{token}"),
    }
}

pub fn password_reset_message(
    frontend_url: &str,
    role: Role,
    to: &str,
    token: &str,
) -> EmailMessage {
    let link = reset_link(frontend_url, role, token);
    EmailMessage {
        to: to.to_string(),
        subject: "Password reset request".to_string(),
        body: format!(
            "A password reset was requested for this address.\n\n\
             Reset your password within the next hour: {link}\n\n\
             If you did not request this, you can ignore this message."
        ),
    }
}

pub fn password_changed_message(to: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your password was changed".to_string(),
        body: "Your password was just changed. If this was not you, \
               request a password reset immediately."
            .to_string(),
    }
}

pub fn verification_message(frontend_url: &str, to: &str, token: &str) -> EmailMessage {
    let base = frontend_url.trim_end_matches('/');
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your email address".to_string(),
        body: format!(
            "Welcome! Confirm your email address within 24 hours: \
             {base}/verify-email/{token}"
        ),
    }
}
