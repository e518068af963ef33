// src/services/email.rs
//! Passwordless sign-in link delivery via AWS SES.
//!
//! When SES is not configured (no EMAIL_FROM_ADDRESS), the service degrades
//! to logging the sign-in link so local development works without AWS
//! credentials.

use aws_sdk_sesv2::Client as SesClient;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SES operation failed: {0}")]
    SesError(String),
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Verified SES sender address. None means console-fallback mode.
    pub from_address: Option<String>,
    pub product_name: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            from_address: std::env::var("EMAIL_FROM_ADDRESS").ok().filter(|s| !s.is_empty()),
            product_name: std::env::var("PRODUCT_NAME").unwrap_or_else(|_| "Jinnie".to_string()),
        }
    }
}

pub struct EmailService {
    config: EmailConfig,
    ses_client: OnceCell<SesClient>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            ses_client: OnceCell::new(),
        }
    }

    async fn get_ses_client(&self) -> &SesClient {
        self.ses_client
            .get_or_init(|| async {
                let aws_config = aws_config::load_from_env().await;
                SesClient::new(&aws_config)
            })
            .await
    }

    /// Send a passwordless sign-in link to `to`.
    ///
    /// In console-fallback mode the link is logged instead of emailed.
    pub async fn send_sign_in_link(&self, to: &str, link: &str) -> Result<(), EmailError> {
        let from_address = match &self.config.from_address {
            Some(addr) => addr.clone(),
            None => {
                info!(
                    to = %safe_email_log(to),
                    link = %link,
                    "EMAIL_FROM_ADDRESS not configured - sign-in link logged instead of sent"
                );
                return Ok(());
            }
        };

        let subject = format!("Sign in to {}", self.config.product_name);
        let body = sign_in_link_email(&self.config.product_name, link);

        self.send_html_email(&from_address, to, &subject, &body).await?;

        info!(to = %safe_email_log(to), "Sign-in link email sent via SES");
        Ok(())
    }

    async fn send_html_email(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        use aws_sdk_sesv2::types::{Body as SesBody, Content, Destination, EmailContent, Message};

        let client = self.get_ses_client().await;

        let destination = Destination::builder().to_addresses(to).build();

        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::SesError(format!("Failed to build subject: {}", e)))?;

        let body_content = Content::builder()
            .data(body)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::SesError(format!("Failed to build body: {}", e)))?;

        let ses_body = SesBody::builder().html(body_content).build();

        let message = Message::builder()
            .subject(subject_content)
            .body(ses_body)
            .build();

        let email_content = EmailContent::builder().simple(message).build();

        client
            .send_email()
            .from_email_address(from)
            .destination(destination)
            .content(email_content)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %safe_email_log(to), "Failed to send email via SES");
                EmailError::SesError(format!("Send failed: {}", e))
            })?;

        Ok(())
    }
}

/// HTML body for the sign-in link email
fn sign_in_link_email(product_name: &str, link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #E8618C; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #E8618C; color: white; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{product_name}</h1>
        </div>
        <div class="content">
            <p>Tap the button below to verify your email and finish what you started.</p>

            <p><a class="button" href="{link}">Sign in to {product_name}</a></p>

            <p>This link expires in one hour and can only be used once. If you did not request it, you can safely ignore this email.</p>
        </div>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_body_contains_link() {
        let body = sign_in_link_email("Jinnie", "https://jinnie.app/verify?token=K_ABC");
        assert!(body.contains("https://jinnie.app/verify?token=K_ABC"));
        assert!(body.contains("Sign in to Jinnie"));
    }

    #[tokio::test]
    async fn test_console_fallback_when_not_configured() {
        let service = EmailService::new(EmailConfig {
            from_address: None,
            product_name: "Jinnie".to_string(),
        });

        let result = service
            .send_sign_in_link("visitor@example.com", "https://jinnie.app/verify?token=x")
            .await;
        assert!(result.is_ok());
    }
}
