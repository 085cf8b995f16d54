//! Outbound email: a small `Mailer` seam with a SendGrid backend for
//! production and a console backend for local runs and tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::MailConfig;
use crate::errors::{AppError, Result};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub from_email: String,
    pub from_name: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

/// Build the password reset message.
pub fn otp_email(config: &MailConfig, to: &str, otp: &str, ttl: Duration) -> Email {
    let minutes = (ttl.as_secs() + 59) / 60;
    let validity = if minutes == 1 { "1 minute".to_string() } else { format!("{} minutes", minutes) };

    let html = format!(
        r#"<div style="font-family:sans-serif; padding:18px;">
  <h2>Your Password Reset OTP: <span style="color:#440077">{otp}</span></h2>
  <p>This OTP is valid for <b>{validity}</b>. Please do not share it with anyone.</p>
</div>"#
    );

    Email {
        from_email: config.from_email.clone(),
        from_name: config.from_name.clone(),
        to: to.to_string(),
        subject: "UrbanTales Seller Password Reset OTP".to_string(),
        html,
    }
}

#[derive(Clone)]
pub struct SendGridMailer {
    api_key: String,
    client: Client,
}

impl SendGridMailer {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": email.from_email, "name": email.from_name },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.html }],
        });

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::email(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            Err(AppError::email(format!("SendGrid returned {}: {}", status, detail)))
        }
    }
}

/// Logs messages instead of delivering them and keeps them in an outbox.
#[derive(Clone, Default)]
pub struct ConsoleMailer {
    outbox: Arc<Mutex<Vec<Email>>>,
}

impl ConsoleMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Email> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn last_to(&self, to: &str) -> Option<Email> {
        self.sent().into_iter().rev().find(|e| e.to == to)
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "📧 [console mailer] {}",
            email.html
        );
        self.outbox
            .lock()
            .map_err(|_| AppError::service("mail outbox lock poisoned"))?
            .push(email.clone());
        Ok(())
    }
}

/// Pull the 6-digit code back out of an OTP email body.
pub fn extract_otp(email: &Email) -> Option<String> {
    let start = email.html.find("#440077\">")? + "#440077\">".len();
    let code: String = email.html[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    (code.len() == 6).then_some(code)
}
