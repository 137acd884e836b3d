use axum::extract::FromRef;
use lazy_static::lazy_static;
use rand::{rngs::OsRng, Rng};
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, warn};

use crate::{
    auth::{
        jwt::SessionKeys,
        repo_types::{OtpRecord, Provisioned, Role},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Canonical form used as the key in both the user and OTP stores.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Fixed-length decimal code; leading zeros are kept.
pub fn generate_code(len: usize) -> String {
    let mut rng = OsRng;
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Issues a fresh code for `email`, replacing any earlier one, and mails it.
///
/// If delivery fails the new record is deleted again so no undeliverable
/// code stays live.
pub async fn request_otp(state: &AppState, raw_email: &str) -> ApiResult<OtpRecord> {
    let email = normalize_email(raw_email);
    if !is_valid_email(&email) {
        warn!(email = %email, "otp requested for invalid email");
        return Err(ApiError::Validation("Valid email is required".into()));
    }

    let cfg = &state.config.otp;
    let now = OffsetDateTime::now_utc();

    if cfg.resend_cooldown_secs > 0 {
        let latest = state
            .otps
            .latest_for_email(&email)
            .await
            .map_err(|e| ApiError::internal("Failed to send OTP", e))?;
        if let Some(prev) = latest {
            let cooldown = Duration::seconds(cfg.resend_cooldown_secs);
            let elapsed = now - prev.created_at;
            if !prev.is_expired(now) && elapsed < cooldown {
                let wait = (cooldown - elapsed).whole_seconds().max(1);
                warn!(email = %email, wait, "otp requested inside cooldown");
                return Err(ApiError::TooManyRequests(format!(
                    "Please wait {wait} seconds before requesting another code"
                )));
            }
        }
    }

    let replaced = state
        .otps
        .delete_for_email(&email)
        .await
        .map_err(|e| ApiError::internal("Failed to send OTP", e))?;

    let code = generate_code(cfg.length);
    let record = state
        .otps
        .insert(&email, &code, now, now + Duration::minutes(cfg.ttl_minutes))
        .await
        .map_err(|e| ApiError::internal("Failed to send OTP", e))?;

    if let Err(e) = state.mailer.send_otp(&email, &code, cfg.ttl_minutes).await {
        if let Err(cleanup) = state.otps.delete(record.id).await {
            error!(error = %cleanup, otp_id = %record.id, "failed to drop undelivered otp");
        }
        return Err(ApiError::internal(
            "Failed to send OTP email. Please check your email configuration.",
            e,
        ));
    }

    info!(email = %email, replaced, "otp issued");
    Ok(record)
}

/// Successful login: the (possibly new) user and a signed session token.
#[derive(Debug)]
pub struct Login {
    pub provisioned: Provisioned,
    pub token: String,
}

/// Consumes the code for `email` and opens a session.
///
/// Unknown email and wrong code produce the same error.
pub async fn verify_otp(state: &AppState, raw_email: &str, raw_code: &str) -> ApiResult<Login> {
    let email = normalize_email(raw_email);
    let code = raw_code.trim();
    if email.is_empty() || code.is_empty() {
        return Err(ApiError::Validation("Email and OTP are required".into()));
    }

    let record = state
        .otps
        .find(&email, code)
        .await
        .map_err(|e| ApiError::internal("Failed to verify OTP", e))?;
    let Some(record) = record else {
        warn!(email = %email, "otp verify: no matching code");
        return Err(ApiError::Validation("Invalid OTP".into()));
    };

    if record.is_expired(OffsetDateTime::now_utc()) {
        state
            .otps
            .delete(record.id)
            .await
            .map_err(|e| ApiError::internal("Failed to verify OTP", e))?;
        warn!(email = %email, "otp verify: expired code");
        return Err(ApiError::Validation("OTP has expired".into()));
    }

    // The delete is the claim: of two concurrent verifications only one removes the row.
    let consumed = state
        .otps
        .delete(record.id)
        .await
        .map_err(|e| ApiError::internal("Failed to verify OTP", e))?;
    if !consumed {
        warn!(email = %email, "otp verify: code already used");
        return Err(ApiError::Validation("Invalid OTP".into()));
    }

    let role = if email == state.config.admin_email {
        Role::Admin
    } else {
        Role::User
    };
    let provisioned = state
        .users
        .provision(&email, role)
        .await
        .map_err(|e| ApiError::internal("Failed to verify OTP", e))?;
    if provisioned.is_new() {
        info!(user_id = %provisioned.user().id, role = %provisioned.user().role, "user provisioned on first login");
    }

    let token = SessionKeys::from_ref(state)
        .sign(provisioned.user())
        .map_err(|e| ApiError::internal("Failed to verify OTP", e))?;

    info!(user_id = %provisioned.user().id, "user logged in");
    Ok(Login { provisioned, token })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::repo::{OtpRepo, UserRepo},
        state::testing::{test_config, Fake, ADMIN_EMAIL},
    };
    use uuid::Uuid;

    #[test]
    fn email_check_is_minimal() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("owner@localhost"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@x.com"));
        assert!(!is_valid_email("spa ce@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Owner@Example.COM "), "owner@example.com");
    }

    #[test]
    fn codes_are_fixed_length_digits() {
        for len in [4, 6, 10] {
            let code = generate_code(len);
            assert_eq!(code.len(), len);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn request_stores_and_mails_one_code() {
        let fake = Fake::new();
        let rec = request_otp(&fake.state, "A@X.com").await.unwrap();
        assert_eq!(rec.email, "a@x.com");
        assert_eq!(rec.code.len(), 6);
        let ttl = rec.expires_at - rec.created_at;
        assert!(ttl > Duration::minutes(9) && ttl <= Duration::minutes(10));
        assert_eq!(fake.mailer.last_code_for("a@x.com"), Some(rec.code.clone()));
        assert_eq!(fake.auth.otp_count("a@x.com").await, 1);
    }

    #[tokio::test]
    async fn request_rejects_invalid_email_without_side_effects() {
        let fake = Fake::new();
        let err = request_otp(&fake.state, "not-an-email").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(fake.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn second_request_invalidates_first_code() {
        let fake = Fake::new();
        let first = request_otp(&fake.state, "a@x.com").await.unwrap();
        let second = request_otp(&fake.state, "a@x.com").await.unwrap();
        assert_eq!(fake.auth.otp_count("a@x.com").await, 1);

        if first.code != second.code {
            let err = verify_otp(&fake.state, "a@x.com", &first.code).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(m) if m == "Invalid OTP"));
        }
        verify_otp(&fake.state, "a@x.com", &second.code).await.unwrap();
    }

    #[tokio::test]
    async fn replaced_fixed_code_no_longer_verifies() {
        let fake = Fake::new();
        let now = OffsetDateTime::now_utc();
        fake.auth
            .insert("a@x.com", "123456", now, now + Duration::minutes(10))
            .await
            .unwrap();

        let fresh = request_otp(&fake.state, "a@x.com").await.unwrap();
        if fresh.code != "123456" {
            assert!(fake.auth.find("a@x.com", "123456").await.unwrap().is_none());
            let err = verify_otp(&fake.state, "a@x.com", "123456").await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(m) if m == "Invalid OTP"));
        }
    }

    #[tokio::test]
    async fn code_is_single_use() {
        let fake = Fake::new();
        let rec = request_otp(&fake.state, "a@x.com").await.unwrap();
        let login = verify_otp(&fake.state, "a@x.com", &rec.code).await.unwrap();
        assert!(!login.token.is_empty());
        let err = verify_otp(&fake.state, "a@x.com", &rec.code).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "Invalid OTP"));
    }

    #[tokio::test]
    async fn expired_code_is_rejected_and_removed() {
        let fake = Fake::new();
        let now = OffsetDateTime::now_utc();
        fake.auth
            .put_otp(OtpRecord {
                id: Uuid::new_v4(),
                email: "a@x.com".into(),
                code: "123456".into(),
                expires_at: now - Duration::seconds(1),
                created_at: now - Duration::minutes(11),
            })
            .await;

        let err = verify_otp(&fake.state, "a@x.com", "123456").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "OTP has expired"));
        assert_eq!(fake.auth.otp_count("a@x.com").await, 0);
        assert!(fake.auth.find_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn wrong_code_and_unknown_email_look_the_same() {
        let fake = Fake::new();
        let rec = request_otp(&fake.state, "a@x.com").await.unwrap();
        let wrong = if rec.code == "000000" { "111111" } else { "000000" };
        let e1 = verify_otp(&fake.state, "a@x.com", wrong).await.unwrap_err();
        let e2 = verify_otp(&fake.state, "nobody@x.com", &rec.code).await.unwrap_err();
        assert_eq!(e1.to_string(), e2.to_string());
        // the live code survives a wrong guess
        assert_eq!(fake.auth.otp_count("a@x.com").await, 1);
    }

    #[tokio::test]
    async fn verify_requires_both_fields() {
        let fake = Fake::new();
        let err = verify_otp(&fake.state, "a@x.com", "  ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "Email and OTP are required"));
    }

    #[tokio::test]
    async fn admin_role_only_for_configured_address() {
        let fake = Fake::new();

        let rec = request_otp(&fake.state, " Owner@Example.com").await.unwrap();
        let login = verify_otp(&fake.state, ADMIN_EMAIL, &rec.code).await.unwrap();
        assert!(login.provisioned.is_new());
        assert_eq!(login.provisioned.user().role, Role::Admin);

        let rec = request_otp(&fake.state, "guest@example.com").await.unwrap();
        let login = verify_otp(&fake.state, "guest@example.com", &rec.code).await.unwrap();
        assert_eq!(login.provisioned.user().role, Role::User);
    }

    #[tokio::test]
    async fn role_is_assigned_once_at_first_login() {
        let fake = Fake::new();
        let rec = request_otp(&fake.state, "a@x.com").await.unwrap();
        let first = verify_otp(&fake.state, "a@x.com", &rec.code).await.unwrap();
        assert!(first.provisioned.is_new());

        // admin address moves to this user; the stored role must not change
        let mut cfg = test_config();
        cfg.admin_email = "a@x.com".into();
        let mut state = fake.state.clone();
        state.config = std::sync::Arc::new(cfg);

        let rec = request_otp(&state, "a@x.com").await.unwrap();
        let second = verify_otp(&state, "a@x.com", &rec.code).await.unwrap();
        assert!(!second.provisioned.is_new());
        assert_eq!(second.provisioned.user().id, first.provisioned.user().id);
        assert_eq!(second.provisioned.user().role, Role::User);
    }

    #[tokio::test]
    async fn session_token_carries_identity() {
        let fake = Fake::new();
        let rec = request_otp(&fake.state, ADMIN_EMAIL).await.unwrap();
        let login = verify_otp(&fake.state, ADMIN_EMAIL, &rec.code).await.unwrap();
        let claims = SessionKeys::from_ref(&fake.state).verify(&login.token).unwrap();
        assert_eq!(claims.sub, login.provisioned.user().id);
        assert_eq!(claims.email, ADMIN_EMAIL);
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn delivery_failure_leaves_no_live_code() {
        let fake = Fake::new();
        let earlier = request_otp(&fake.state, "a@x.com").await.unwrap();

        fake.mailer.fail(true);
        let err = request_otp(&fake.state, "a@x.com").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal { .. }));
        assert_eq!(fake.auth.otp_count("a@x.com").await, 0);
        assert!(verify_otp(&fake.state, "a@x.com", &earlier.code).await.is_err());
    }

    #[tokio::test]
    async fn issued_record_is_stamped_with_the_issuing_clock() {
        let fake = Fake::new();
        let before = OffsetDateTime::now_utc();
        let rec = request_otp(&fake.state, "a@x.com").await.unwrap();
        let after = OffsetDateTime::now_utc();
        assert!(rec.created_at >= before && rec.created_at <= after);
        assert_eq!(rec.expires_at - rec.created_at, Duration::minutes(10));
        let stored = fake.auth.latest_for_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.created_at, rec.created_at);
    }

    #[tokio::test]
    async fn cooldown_measures_from_stored_creation_time() {
        let mut cfg = test_config();
        cfg.otp.resend_cooldown_secs = 60;
        let fake = Fake::with_config(cfg);
        let now = OffsetDateTime::now_utc();
        fake.auth
            .insert("a@x.com", "123456", now - Duration::seconds(61), now + Duration::minutes(9))
            .await
            .unwrap();
        request_otp(&fake.state, "a@x.com").await.unwrap();

        fake.auth
            .insert("b@x.com", "123456", now - Duration::seconds(30), now + Duration::minutes(9))
            .await
            .unwrap();
        let err = request_otp(&fake.state, "b@x.com").await.unwrap_err();
        assert!(matches!(err, ApiError::TooManyRequests(_)));
    }

    #[tokio::test]
    async fn cooldown_throttles_rapid_requests() {
        let mut cfg = test_config();
        cfg.otp.resend_cooldown_secs = 60;
        let fake = Fake::with_config(cfg);

        let first = request_otp(&fake.state, "a@x.com").await.unwrap();
        let err = request_otp(&fake.state, "a@x.com").await.unwrap_err();
        assert!(matches!(err, ApiError::TooManyRequests(_)));
        assert_eq!(fake.mailer.sent().len(), 1);
        // the live code is untouched by the throttled request
        verify_otp(&fake.state, "a@x.com", &first.code).await.unwrap();
    }
}
