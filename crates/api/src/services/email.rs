//! Email service for the workflow's notification side-channel.
//!
//! Supports multiple providers:
//! - `console`: Logs emails to console (development, default)
//! - `smtp`: Sends via SMTP server
//! - `sendgrid`: Uses SendGrid API
//!
//! Sending is best-effort everywhere: a failure is surfaced to the caller so
//! that send-then-mark sequences can skip the mark, but it never rolls back
//! state that already committed.

use crate::config::EmailConfig;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name (optional)
    pub to_name: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (optional)
    pub body_html: Option<String>,
}

/// Email service for transactional notifications.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Check if email service is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Address that receives "pending changes" alerts, if configured.
    pub fn admin_email(&self) -> Option<&str> {
        if self.config.admin_email.is_empty() {
            None
        } else {
            Some(&self.config.admin_email)
        }
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => self.send_console(message).await,
            "smtp" => self.send_smtp(message).await,
            "sendgrid" => self.send_sendgrid(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    /// Alert the studio admin that a client proposed changes.
    ///
    /// Fired once per unresolved batch by the dedup gate in the field-update
    /// handler.
    pub async fn send_pending_changes_alert(
        &self,
        admin_email: &str,
        client_label: &str,
        project_name: &str,
        project_link: &str,
    ) -> Result<(), EmailError> {
        let subject = format!("Pending changes for project: {}", project_name);

        let body_text = format!(
            "Client {client} proposed changes for the project {project}.\n\n\
             Please review them in the admin dashboard:\n{link}\n",
            client = client_label,
            project = project_name,
            link = project_link
        );

        let body_html = format!(
            "<p>Client <strong>{client}</strong> proposed changes for the project \
             <strong>{project}</strong>.</p>\
             <p>Please review them in the admin dashboard.</p>\
             <a href=\"{link}\">View project</a>",
            client = client_label,
            project = project_name,
            link = project_link
        );

        self.send(EmailMessage {
            to: admin_email.to_string(),
            to_name: None,
            subject,
            body_text,
            body_html: Some(body_html),
        })
        .await
    }

    /// Tell a client why their proposed change was rejected.
    ///
    /// Only sent when the admin left a reason.
    pub async fn send_rejection_notice(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        project_name: &str,
        field_display: &str,
        reason: &str,
        project_link: &str,
    ) -> Result<(), EmailError> {
        let subject = format!("Change rejected for project: {}", project_name);
        let greeting = to_name.unwrap_or(to_email);

        let body_text = format!(
            "Hi {greeting},\n\n\
             Your change to \"{field}\" on the project {project} was rejected.\n\n\
             Reason: {reason}\n\n\
             You can submit a new change if needed:\n{link}\n",
            greeting = greeting,
            field = field_display,
            project = project_name,
            reason = reason,
            link = project_link
        );

        let body_html = format!(
            "<p>Hi {greeting},</p>\
             <p>Your change to <strong>{field}</strong> on the project \
             <strong>{project}</strong> was rejected.</p>\
             <p><strong>Reason:</strong> {reason}</p>\
             <p>You can submit a new change if needed.</p>\
             <a href=\"{link}\">View project</a>",
            greeting = greeting,
            field = field_display,
            project = project_name,
            reason = reason,
            link = project_link
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(|s| s.to_string()),
            subject,
            body_text,
            body_html: Some(body_html),
        })
        .await
    }

    /// Send the client a digest of changes applied since their last
    /// notification, one line per change.
    pub async fn send_project_digest(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        project_name: &str,
        change_lines: &[String],
        project_link: &str,
    ) -> Result<(), EmailError> {
        let subject = format!("Project update: {}", project_name);
        let greeting = to_name.unwrap_or("there");
        let changes = change_lines.join("\n");

        let body_text = format!(
            "Hi {greeting},\n\n\
             Your project {project} was updated by the videographer.\n\n\
             Changes:\n{changes}\n\n\
             You can view the full project details here:\n{link}\n\n\
             Best regards,\n{sender}",
            greeting = greeting,
            project = project_name,
            changes = changes,
            link = project_link,
            sender = self.config.sender_name
        );

        let body_html = format!(
            "<p>Hi {greeting},</p>\
             <p>Your project <strong>{project}</strong> was updated by the videographer.</p>\
             <p><strong>Changes:</strong></p>\
             <pre style=\"background: #f5f5f5; padding: 10px; border-radius: 5px;\">{changes}</pre>\
             <a href=\"{link}\">View project</a>\
             <br><br>\
             <p>Best regards,<br>{sender}</p>",
            greeting = greeting,
            project = project_name,
            changes = changes,
            link = project_link,
            sender = self.config.sender_name
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(|s| s.to_string()),
            subject,
            body_text,
            body_html: Some(body_html),
        })
        .await
    }

    /// Console provider - logs email to console (for development).
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );

        info!(
            body_text = %message.body_text,
            "Email body (plain text)"
        );

        if let Some(html) = &message.body_html {
            debug!("Email body (HTML) - {} chars", html.len());
        }

        Ok(())
    }

    /// SMTP provider - sends via SMTP server.
    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        warn!(
            provider = "smtp",
            host = %self.config.smtp_host,
            port = %self.config.smtp_port,
            "SMTP provider configured but full implementation requires the lettre crate"
        );

        info!(
            to = %message.to,
            subject = %message.subject,
            smtp_host = %self.config.smtp_host,
            "Email would be sent via SMTP (full implementation pending)"
        );

        Ok(())
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let client = reqwest::Client::new();

        let mut personalizations = serde_json::json!({
            "to": [{
                "email": message.to
            }]
        });

        if let Some(name) = &message.to_name {
            personalizations["to"][0]["name"] = serde_json::json!(name);
        }

        let mut body = serde_json::json!({
            "personalizations": [personalizations],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": message.subject,
            "content": [{
                "type": "text/plain",
                "value": message.body_text
            }]
        });

        if let Some(html) = &message.body_html {
            body["content"]
                .as_array_mut()
                .expect("content is an array")
                .push(serde_json::json!({
                    "type": "text/html",
                    "value": html
                }));
        }

        let response = client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(
                "Authorization",
                format!("Bearer {}", self.config.sendgrid_api_key),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(
                to = %message.to,
                subject = %message.subject,
                "Email sent via SendGrid"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                error = %error_body,
                "SendGrid API error"
            );
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            provider: "console".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            sendgrid_api_key: String::new(),
            sender_email: "studio@example.com".to_string(),
            sender_name: "Wedding Video Portal".to_string(),
            base_url: "https://portal.example.com".to_string(),
            admin_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_email_service_creation() {
        let service = EmailService::new(test_config());
        assert!(service.is_enabled());
        assert_eq!(service.admin_email(), Some("admin@example.com"));
    }

    #[test]
    fn test_admin_email_unset() {
        let mut config = test_config();
        config.admin_email = String::new();
        let service = EmailService::new(config);
        assert_eq!(service.admin_email(), None);
    }

    #[tokio::test]
    async fn test_send_console_email() {
        let service = EmailService::new(test_config());

        let message = EmailMessage {
            to: "user@example.com".to_string(),
            to_name: Some("Test User".to_string()),
            subject: "Test Subject".to_string(),
            body_text: "Test body".to_string(),
            body_html: Some("<p>Test body</p>".to_string()),
        };

        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_disabled_silently_succeeds() {
        let mut config = test_config();
        config.enabled = false;
        let service = EmailService::new(config);

        let message = EmailMessage {
            to: "user@example.com".to_string(),
            to_name: None,
            subject: "Test".to_string(),
            body_text: "Test".to_string(),
            body_html: None,
        };

        assert!(service.send(message).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_provider_fails() {
        let mut config = test_config();
        config.provider = "pigeon".to_string();
        let service = EmailService::new(config);

        let message = EmailMessage {
            to: "user@example.com".to_string(),
            to_name: None,
            subject: "Test".to_string(),
            body_text: "Test".to_string(),
            body_html: None,
        };

        assert!(service.send(message).await.is_err());
    }

    #[tokio::test]
    async fn test_send_pending_changes_alert() {
        let service = EmailService::new(test_config());
        let result = service
            .send_pending_changes_alert(
                "admin@example.com",
                "Ana Pop",
                "Ana & Mihai",
                "https://portal.example.com/dashboard/projects/abc",
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_rejection_notice() {
        let service = EmailService::new(test_config());
        let result = service
            .send_rejection_notice(
                "ana@example.com",
                Some("Ana"),
                "Ana & Mihai",
                "City",
                "Venue already confirmed",
                "https://portal.example.com/dashboard/projects/abc",
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_project_digest() {
        let service = EmailService::new(test_config());
        let lines = vec![
            "- City: Cluj".to_string(),
            "- Restaurant: Grand Hotel".to_string(),
        ];
        let result = service
            .send_project_digest(
                "ana@example.com",
                Some("Ana"),
                "Ana & Mihai",
                &lines,
                "https://portal.example.com/dashboard/projects/abc",
            )
            .await;
        assert!(result.is_ok());
    }
}
