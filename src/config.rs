use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    pub ttl_minutes: i64,
    pub length: usize,
    /// Minimum spacing between two requests for the same email. Zero disables it.
    pub resend_cooldown_secs: i64,
}

/// How OTP mail leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum MailDriver {
    /// JSON mail API at `api_url`.
    Http { api_url: String },
    /// Local development only (`MAIL_DRIVER=log`): codes go to the log, nothing is delivered.
    Log,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub driver: MailDriver,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` only when `DATA_STORE=memory` was asked for explicitly.
    pub database_url: Option<String>,
    pub admin_email: String,
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub mail: MailConfig,
    pub cookie: CookieConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = match get("DATA_STORE").as_deref() {
            Some("memory") => None,
            Some("postgres") | None => Some(
                get("DATABASE_URL")
                    .context("DATABASE_URL must be set (or DATA_STORE=memory for local development)")?,
            ),
            Some(other) => anyhow::bail!("unknown DATA_STORE {other:?}; expected postgres or memory"),
        };
        let admin_email = get("ADMIN_EMAIL").context("ADMIN_EMAIL must be set")?;
        let jwt = JwtConfig {
            secret: get("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "folio-api".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "folio-admin".into()),
            ttl_minutes: parse_as(get("JWT_TTL_MINUTES")).unwrap_or(60 * 24 * 7),
        };
        let otp = OtpConfig {
            ttl_minutes: parse_as(get("OTP_TTL_MINUTES")).unwrap_or(10),
            length: parse_as::<usize>(get("OTP_LENGTH")).unwrap_or(6).clamp(4, 10),
            resend_cooldown_secs: parse_as(get("OTP_RESEND_COOLDOWN_SECS")).unwrap_or(0),
        };
        let driver = match get("MAIL_DRIVER").as_deref() {
            Some("log") => MailDriver::Log,
            Some("http") | None => MailDriver::Http {
                api_url: get("MAIL_API_URL")
                    .context("MAIL_API_URL must be set (or MAIL_DRIVER=log for local development)")?,
            },
            Some(other) => anyhow::bail!("unknown MAIL_DRIVER {other:?}; expected http or log"),
        };
        let mail = MailConfig {
            driver,
            api_key: get("MAIL_API_KEY"),
            from: get("MAIL_FROM").unwrap_or_else(|| "no-reply@localhost".into()),
        };
        let cookie = CookieConfig {
            name: get("SESSION_COOKIE_NAME").unwrap_or_else(|| "auth-token".into()),
            secure: parse_as(get("SESSION_COOKIE_SECURE")).unwrap_or(true),
        };
        Ok(Self {
            database_url,
            admin_email: crate::auth::services::normalize_email(&admin_email),
            jwt,
            otp,
            mail,
            cookie,
        })
    }
}

fn parse_as<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| v.parse::<T>().ok())
}
