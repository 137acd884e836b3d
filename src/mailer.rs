use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{MailConfig, MailDriver};

/// Outbound notification channel for login codes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str, ttl_minutes: i64) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: String,
    text: String,
}

/// Sends mail through a Resend-compatible JSON HTTP API (`POST /emails`, bearer key).
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: &str, api_key: Option<&str>, from: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.map(str::to_string),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_otp(&self, to: &str, code: &str, ttl_minutes: i64) -> anyhow::Result<()> {
        let mail = OutgoingMail {
            from: &self.from,
            to,
            subject: "Your OTP Code",
            html: render_otp_html(code, ttl_minutes),
            text: render_otp_text(code, ttl_minutes),
        };
        let mut req = self.client.post(&self.endpoint).json(&mail);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        req.send()
            .await
            .context("mail api request")?
            .error_for_status()
            .context("mail api rejected message")?;
        info!(to = %to, "otp mail sent");
        Ok(())
    }
}

/// Local development mailer, selected only by `MAIL_DRIVER=log`: writes the
/// code to the log instead of sending it.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, code: &str, ttl_minutes: i64) -> anyhow::Result<()> {
        warn!(to = %to, code = %code, ttl_minutes, "MAIL_DRIVER=log; otp not delivered");
        Ok(())
    }
}

pub fn from_config(cfg: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    Ok(match &cfg.driver {
        MailDriver::Http { api_url } => {
            Arc::new(HttpMailer::new(api_url, cfg.api_key.as_deref(), &cfg.from)?)
        }
        MailDriver::Log => {
            warn!("MAIL_DRIVER=log: login codes are written to the log and never delivered");
            Arc::new(LogMailer)
        }
    })
}

fn render_otp_text(code: &str, ttl_minutes: i64) -> String {
    format!(
        "Your OTP code is: {code}\n\nThis code will expire in {ttl_minutes} minutes. Do not share this code with anyone.\n"
    )
}

fn render_otp_html(code: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 40px;">
  <p style="font-size: 16px;">Your OTP code is:</p>
  <h2 style="font-size: 36px; letter-spacing: 8px; text-align: center;">{code}</h2>
  <p style="font-size: 14px; color: #a0a0a0;">This code will expire in {ttl_minutes} minutes. Do not share this code with anyone.</p>
</div>"#
    )
}
