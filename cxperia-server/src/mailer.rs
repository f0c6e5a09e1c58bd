//! Transactional email over an HTTP email API
//!
//! Delivery is best effort: callers log failures and carry on.

use cxperia_common::config::EmailConfig;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email delivery is not configured")]
    Disabled,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// HTTP email client
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Email is sent only when an API key is configured
    pub fn is_enabled(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(MailError::Disabled),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&OutgoingEmail {
                from: &self.config.from,
                to: [to],
                subject,
                html,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MailError::Status(response.status()));
        }
        Ok(())
    }

    /// Welcome message after signup; failures are logged, never returned
    pub async fn send_welcome(&self, to: &str, brand_name: &str) {
        if !self.is_enabled() {
            debug!("Email disabled, skipping welcome email to {}", to);
            return;
        }

        let html = welcome_html(brand_name);
        match self.send(to, "Welcome to Cxperia", &html).await {
            Ok(()) => debug!("Sent welcome email to {}", to),
            Err(e) => warn!("Welcome email to {} failed: {}", to, e),
        }
    }
}

fn welcome_html(brand_name: &str) -> String {
    format!(
        "<h1>Welcome to Cxperia, {}!</h1>\
         <p>Your brand account is ready. Add a product, build its experience, \
         and generate a QR code to put on your packaging.</p>",
        escape_html(brand_name)
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_key() {
        let mailer = Mailer::new(EmailConfig::default());
        assert!(!mailer.is_enabled());

        let mailer = Mailer::new(EmailConfig {
            api_key: Some("  ".to_string()),
            ..EmailConfig::default()
        });
        assert!(!mailer.is_enabled());
    }

    #[tokio::test]
    async fn test_send_without_key_is_disabled_error() {
        let mailer = Mailer::new(EmailConfig::default());
        let err = mailer.send("a@b.co", "hi", "<p>hi</p>").await.unwrap_err();
        assert!(matches!(err, MailError::Disabled));
    }

    #[test]
    fn test_welcome_escapes_brand_name() {
        let html = welcome_html("<Glow & Co>");
        assert!(html.contains("&lt;Glow &amp; Co&gt;"));
    }
}
