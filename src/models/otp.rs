use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A one-time password reset code bound to an email address.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OtpRecord {
    pub email: String,
    pub code: String,            // 6-digit OTP
    pub attempts: u32,           // Failed verifications
    pub verified: bool,          // Set by a successful verify
    pub consumed: bool,          // Set by a successful confirm
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn issue(email: impl Into<String>, code: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            email: email.into(),
            code: code.into(),
            attempts: 0,
            verified: false,
            consumed: false,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Usable for verify/confirm: unexpired, unconsumed and not locked by failed attempts.
    pub fn is_live(&self, now: DateTime<Utc>, max_attempts: u32) -> bool {
        !self.consumed && !self.is_expired(now) && self.attempts < max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_expires_after_ttl() {
        let now = Utc::now();
        let record = OtpRecord::issue("a@b.com", "123456", now, Duration::minutes(2));
        assert!(record.is_live(now, 5));
        assert!(record.is_live(now + Duration::seconds(119), 5));
        assert!(!record.is_live(now + Duration::minutes(2), 5));
    }

    #[test]
    fn consumed_or_locked_records_are_dead() {
        let now = Utc::now();
        let mut record = OtpRecord::issue("a@b.com", "123456", now, Duration::minutes(2));
        record.attempts = 5;
        assert!(!record.is_live(now, 5));
        record.attempts = 0;
        record.consumed = true;
        assert!(!record.is_live(now, 5));
    }
}
