//! Server side of the password reset protocol: issue, verify and redeem
//! one-time codes.
//!
//! Tracing targets:
//! - `auth.password.reset_requested` - code issued and mailed
//! - `auth.password.reset_verified` - code verified
//! - `auth.password.reset_completed` - password replaced
//! - `auth.password.reset_failed` - any rejected step

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::config::{MailConfig, OtpConfig};
use crate::database::{OtpStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::otp::OtpRecord;
use crate::services::email_service::{otp_email, Mailer};
use crate::services::password_policy;
use crate::services::rate_limiter::OtpRequestLimiter;

#[derive(Clone)]
pub struct OtpService {
    otps: Arc<dyn OtpStore>,
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    limiter: OtpRequestLimiter,
    mail: MailConfig,
    config: OtpConfig,
}

impl OtpService {
    pub fn new(
        otps: Arc<dyn OtpStore>,
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        mail: MailConfig,
        config: OtpConfig,
    ) -> Result<Self> {
        let limiter = OtpRequestLimiter::new(config.requests_per_window, config.request_window)?;
        Ok(Self { otps, users, mailer, limiter, mail, config })
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    // Generate 6-digit OTP
    pub fn generate_otp() -> String {
        let mut rng = rand::thread_rng();
        format!("{:06}", rng.gen_range(0..1_000_000))
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn ttl(&self) -> Result<chrono::Duration> {
        chrono::Duration::from_std(self.config.ttl)
            .map_err(|_| AppError::configuration("OTP TTL out of range"))
    }

    /// Issue a fresh code, replacing any earlier one for the same email, and mail it.
    pub async fn request_otp(&self, email: &str) -> Result<()> {
        let email = Self::normalize_email(email);

        if let Err(retry_after_secs) = self.limiter.check(&email) {
            tracing::warn!(
                target: "auth.password.reset_failed",
                email = %email,
                reason = "rate_limited",
                retry_after_secs,
                "OTP request throttled"
            );
            return Err(AppError::RateLimitExceeded { retry_after_secs });
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::info!(
                target: "auth.password.reset_failed",
                email = %email,
                reason = "unknown_email",
                "OTP requested for unknown email"
            );
            return Err(AppError::not_found("No account found with this email"));
        };

        let code = Self::generate_otp();
        let record = OtpRecord::issue(email.clone(), code.clone(), Utc::now(), self.ttl()?);
        self.otps.upsert(record).await?;

        // Codes are keyed by the normalised email; mail goes to the stored address.
        let message = otp_email(&self.mail, &user.email, &code, self.config.ttl);
        self.mailer.send(&message).await?;

        tracing::info!(
            target: "auth.password.reset_requested",
            email = %email,
            expires_in_secs = self.config.ttl.as_secs(),
            "Password reset OTP sent"
        );
        Ok(())
    }

    /// Check a code without consuming it; the confirm step redeems it.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<()> {
        let email = Self::normalize_email(email);
        let now = Utc::now();

        let record = match self.otps.find(&email).await? {
            Some(record) if record.is_live(now, self.config.max_attempts) => record,
            _ => {
                tracing::info!(
                    target: "auth.password.reset_failed",
                    email = %email,
                    reason = "no_live_code",
                    "OTP verification failed"
                );
                return Err(AppError::InvalidOtp);
            }
        };

        if record.code != code {
            self.otps.record_failed_attempt(&email).await?;
            tracing::info!(
                target: "auth.password.reset_failed",
                email = %email,
                reason = "code_mismatch",
                attempts = record.attempts + 1,
                "OTP verification failed"
            );
            return Err(AppError::InvalidOtp);
        }

        self.otps.mark_verified(&email, code).await?;
        tracing::info!(target: "auth.password.reset_verified", email = %email, "OTP verified");
        Ok(())
    }

    /// Re-validate the verified code, redeem it and store the new password.
    pub async fn confirm_reset(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        let email = Self::normalize_email(email);

        if let Err(reason) = password_policy::check(new_password) {
            tracing::info!(
                target: "auth.password.reset_failed",
                email = %email,
                reason = "weak_password",
                "Password reset rejected by policy"
            );
            return Err(AppError::invalid_data(reason));
        }

        let now = Utc::now();
        if self
            .otps
            .consume(&email, code, self.config.max_attempts, now)
            .await?
            .is_none()
        {
            if let Some(record) = self.otps.find(&email).await? {
                if record.code != code {
                    self.otps.record_failed_attempt(&email).await?;
                }
            }
            tracing::warn!(
                target: "auth.password.reset_failed",
                email = %email,
                reason = "invalid_code",
                "Password reset failed: invalid, unverified or expired OTP"
            );
            return Err(AppError::InvalidOtp);
        }

        let password = new_password.to_string();
        let cost = self.config.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::service(format!("Hashing task failed: {}", e)))??;

        if !self.users.update_password(&email, &password_hash).await? {
            return Err(AppError::not_found("User not found"));
        }

        tracing::info!(
            target: "auth.password.reset_completed",
            email = %email,
            "Password reset completed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{MemoryOtpStore, MemoryUserStore};
    use crate::models::user::User;
    use crate::services::email_service::{extract_otp, ConsoleMailer};
    use std::time::Duration;

    struct Harness {
        service: OtpService,
        otps: Arc<MemoryOtpStore>,
        users: Arc<MemoryUserStore>,
        mailer: ConsoleMailer,
    }

    fn harness(config: OtpConfig) -> Harness {
        let otps = Arc::new(MemoryOtpStore::new());
        let users = Arc::new(MemoryUserStore::new());
        users.insert(User::new("a@b.com", "old-hash", "seller")).unwrap();
        let mailer = ConsoleMailer::new();
        let mail = MailConfig {
            sendgrid_api_key: None,
            from_email: "noreply@urbantales.test".into(),
            from_name: "UrbanTales Seller".into(),
        };
        let service = OtpService::new(
            otps.clone(),
            users.clone(),
            Arc::new(mailer.clone()),
            mail,
            config,
        )
        .unwrap();
        Harness { service, otps, users, mailer }
    }

    fn fast_config() -> OtpConfig {
        OtpConfig { bcrypt_cost: 4, ..OtpConfig::default() }
    }

    fn mailed_code(h: &Harness) -> String {
        extract_otp(&h.mailer.last_to("a@b.com").unwrap()).unwrap()
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = OtpService::generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn request_stores_and_mails_code() {
        let h = harness(fast_config());
        h.service.request_otp("  A@B.com ").await.unwrap();

        let record = h.otps.find("a@b.com").await.unwrap().unwrap();
        assert_eq!(record.code, mailed_code(&h));
        assert_eq!((record.expires_at - record.issued_at).num_seconds(), 120);
    }

    #[tokio::test]
    async fn request_for_unknown_email_is_not_found() {
        let h = harness(fast_config());
        let err = h.service.request_otp("nobody@b.com").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn new_request_invalidates_previous_code() {
        let h = harness(fast_config());
        h.service.request_otp("a@b.com").await.unwrap();
        let first = mailed_code(&h);
        h.service.request_otp("a@b.com").await.unwrap();
        if mailed_code(&h) == first {
            // one-in-a-million repeat, nothing to assert
            return;
        }
        let err = h.service.verify_otp("a@b.com", &first).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOtp));
    }

    #[tokio::test]
    async fn wrong_code_is_rejected_and_counted() {
        let h = harness(fast_config());
        h.service.request_otp("a@b.com").await.unwrap();
        let code = mailed_code(&h);
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let err = h.service.verify_otp("a@b.com", wrong).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOtp));
        assert_eq!(h.otps.find("a@b.com").await.unwrap().unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn too_many_failures_lock_the_code() {
        let config = OtpConfig { max_attempts: 2, ..fast_config() };
        let h = harness(config);
        h.service.request_otp("a@b.com").await.unwrap();
        let code = mailed_code(&h);
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..2 {
            assert!(h.service.verify_otp("a@b.com", wrong).await.is_err());
        }
        assert!(h.service.verify_otp("a@b.com", &code).await.is_err());
    }

    #[tokio::test]
    async fn full_reset_then_code_is_spent() {
        let h = harness(fast_config());
        h.service.request_otp("a@b.com").await.unwrap();
        let code = mailed_code(&h);

        h.service.verify_otp("a@b.com", &code).await.unwrap();
        h.service.confirm_reset("a@b.com", &code, "NewPass#2024").await.unwrap();

        let user = h.users.find_by_email("a@b.com").await.unwrap().unwrap();
        assert!(bcrypt::verify("NewPass#2024", &user.password_hash).unwrap());

        assert!(h.service.verify_otp("a@b.com", &code).await.is_err());
        assert!(h.service.confirm_reset("a@b.com", &code, "NewPass#2024").await.is_err());
    }

    #[tokio::test]
    async fn confirm_requires_prior_verification() {
        let h = harness(fast_config());
        h.service.request_otp("a@b.com").await.unwrap();
        let code = mailed_code(&h);

        let err = h.service.confirm_reset("a@b.com", &code, "NewPass#2024").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOtp));
    }

    #[tokio::test]
    async fn confirm_enforces_password_policy_before_redeeming() {
        let h = harness(fast_config());
        h.service.request_otp("a@b.com").await.unwrap();
        let code = mailed_code(&h);
        h.service.verify_otp("a@b.com", &code).await.unwrap();

        let err = h.service.confirm_reset("a@b.com", &code, "password").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // The code is still redeemable with an acceptable password
        h.service.confirm_reset("a@b.com", &code, "Password1").await.unwrap();
    }

    #[tokio::test]
    async fn expired_code_fails_verification() {
        let config = OtpConfig { ttl: Duration::from_millis(50), ..fast_config() };
        let h = harness(config);
        h.service.request_otp("a@b.com").await.unwrap();
        let code = mailed_code(&h);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(h.service.verify_otp("a@b.com", &code).await.is_err());
    }

    #[tokio::test]
    async fn requests_are_throttled_per_email() {
        let config = OtpConfig { requests_per_window: 2, ..fast_config() };
        let h = harness(config);
        h.service.request_otp("a@b.com").await.unwrap();
        h.service.request_otp("a@b.com").await.unwrap();

        let err = h.service.request_otp("a@b.com").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn mixed_case_account_can_reset() {
        let h = harness(fast_config());
        h.users.insert(User::new("Asha.Rao@Shop.com", "old-hash", "seller")).unwrap();

        h.service.request_otp("Asha.Rao@Shop.com").await.unwrap();
        let mail = h.mailer.last_to("Asha.Rao@Shop.com").unwrap();
        let code = extract_otp(&mail).unwrap();

        h.service.verify_otp("asha.rao@shop.com", &code).await.unwrap();
        h.service.confirm_reset("ASHA.RAO@SHOP.COM", &code, "Brand#New9").await.unwrap();

        let user = h.users.find_by_email("asha.rao@shop.com").await.unwrap().unwrap();
        assert!(bcrypt::verify("Brand#New9", &user.password_hash).unwrap());
    }
}
