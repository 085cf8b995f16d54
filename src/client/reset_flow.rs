//! Client side of the password reset protocol.
//!
//! `Idle -> OtpRequested -> OtpVerified -> PasswordConfirmed`, with `Error`
//! reachable from any step. A failed step leaves [`ResetFlow::progress`]
//! where it was, so calling the same step again is the retry.

use std::time::Duration;

use tokio::time::Instant;
use url::{form_urlencoded, Url};

use crate::client::api::ResetApi;
use crate::client::ClientError;
use crate::services::password_policy;

pub const RESEND_COOLDOWN: Duration = Duration::from_secs(60);
pub const VERIFY_REDIRECT_DELAY: Duration = Duration::from_millis(1200);
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);
pub const OTP_LENGTH: usize = 6;

const CONFIRM_PATH: &str = "/reset-password/confirm";
const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    Idle,
    OtpRequested,
    OtpVerified,
    PasswordConfirmed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// Where the UI should navigate next, and how long to wait first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub after: Duration,
}

/// Whole-second countdown before another code may be requested.
///
/// Only a deadline is stored, so there is no timer task to cancel.
#[derive(Debug, Clone, Default)]
pub struct ResendCooldown {
    deadline: Option<Instant>,
}

impl ResendCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.deadline = Some(Instant::now() + RESEND_COOLDOWN);
    }

    /// Seconds left, rounded up. Zero once the cooldown has elapsed.
    pub fn remaining_secs(&self) -> u64 {
        let Some(deadline) = self.deadline else {
            return 0;
        };
        let left = deadline.saturating_duration_since(Instant::now());
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }

    pub fn is_running(&self) -> bool {
        self.remaining_secs() > 0
    }
}

/// Keep the digits a user typed or pasted, at most six of them.
pub fn sanitize_otp_input(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).take(OTP_LENGTH).collect()
}

pub fn confirm_path(email: &str, otp: &str) -> String {
    let email: String = form_urlencoded::byte_serialize(email.as_bytes()).collect();
    format!("{}?email={}&otp={}", CONFIRM_PATH, email, otp)
}

pub struct ResetFlow<A> {
    api: A,
    state: ResetState,
    progress: ResetState,
    email: String,
    otp: String,
    cooldown: ResendCooldown,
    notice: Option<Notice>,
}

impl<A: ResetApi> ResetFlow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: ResetState::Idle,
            progress: ResetState::Idle,
            email: String::new(),
            otp: String::new(),
            cooldown: ResendCooldown::new(),
            notice: None,
        }
    }

    /// Resume on the OTP page from its `?email=..` link. The code was just
    /// mailed, so the resend cooldown starts running.
    pub fn from_otp_url(api: A, link: &str) -> Result<Self, ClientError> {
        let url = Url::parse("http://localhost/")?.join(link)?;
        let email = url
            .query_pairs()
            .find(|(key, _)| *key == "email")
            .map(|(_, value)| value.trim().to_string())
            .unwrap_or_default();

        if email.is_empty() {
            return Err(ClientError::validation(
                "Email missing. Please request a new OTP.",
            ));
        }

        let mut flow = Self::new(api);
        flow.email = email;
        flow.state = ResetState::OtpRequested;
        flow.progress = ResetState::OtpRequested;
        flow.cooldown.start();
        Ok(flow)
    }

    /// Resume on the confirm page from its `?email=..&otp=..` link.
    pub fn from_confirm_url(api: A, link: &str) -> Result<Self, ClientError> {
        let url = Url::parse("http://localhost/")?.join(link)?;
        let mut flow = Self::new(api);

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "email" => flow.email = value.trim().to_string(),
                "otp" => flow.otp = sanitize_otp_input(&value),
                _ => {}
            }
        }

        if flow.email.is_empty() || flow.otp.len() != OTP_LENGTH {
            return Err(ClientError::validation(
                "Reset link is incomplete. Please request a new OTP.",
            ));
        }

        flow.state = ResetState::OtpVerified;
        flow.progress = ResetState::OtpVerified;
        Ok(flow)
    }

    pub fn state(&self) -> ResetState {
        self.state
    }

    /// Last step that succeeded.
    pub fn progress(&self) -> ResetState {
        self.progress
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn otp(&self) -> &str {
        &self.otp
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn cooldown(&self) -> &ResendCooldown {
        &self.cooldown
    }

    pub fn can_resend(&self) -> bool {
        self.progress != ResetState::Idle && !self.cooldown.is_running()
    }

    pub async fn request(&mut self, email: &str) -> Result<(), ClientError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(self.fail(ClientError::validation("Please enter your email address")));
        }
        self.email = email.to_string();
        self.send_code(
            "OTP sent! Please check your inbox and, if necessary, your Spam/Junk folder.",
        )
        .await
    }

    pub async fn resend(&mut self) -> Result<(), ClientError> {
        if self.email.is_empty() {
            return Err(self.fail(ClientError::validation("Please enter your email address")));
        }
        self.send_code(
            "OTP resent! Please check your inbox and, if necessary, your Spam/Junk folder.",
        )
        .await
    }

    async fn send_code(&mut self, success: &str) -> Result<(), ClientError> {
        let remaining = self.cooldown.remaining_secs();
        if remaining > 0 {
            return Err(self.fail(ClientError::Cooldown(remaining)));
        }

        self.begin();
        match self.api.request_otp(&self.email).await {
            Ok(_) => {
                self.cooldown.start();
                self.otp.clear();
                self.advance(ResetState::OtpRequested, success);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn verify(&mut self, otp_input: &str) -> Result<Redirect, ClientError> {
        let otp = sanitize_otp_input(otp_input);
        if otp.len() != OTP_LENGTH {
            return Err(self.fail(ClientError::validation("Please enter the 6-digit OTP")));
        }
        if self.email.is_empty() {
            return Err(self.fail(ClientError::validation(
                "Email missing. Please request a new OTP.",
            )));
        }

        self.begin();
        match self.api.verify_otp(&self.email, &otp).await {
            Ok(_) => {
                let path = confirm_path(&self.email, &otp);
                self.otp = otp;
                self.advance(ResetState::OtpVerified, "OTP verified! Redirecting...");
                Ok(Redirect { path, after: VERIFY_REDIRECT_DELAY })
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub async fn confirm(
        &mut self,
        password: &str,
        confirm_password: &str,
    ) -> Result<Redirect, ClientError> {
        if password != confirm_password {
            return Err(self.fail(ClientError::validation("Passwords do not match")));
        }
        if let Err(reason) = password_policy::check(password) {
            return Err(self.fail(ClientError::validation(reason)));
        }
        if self.email.is_empty() || self.otp.len() != OTP_LENGTH {
            return Err(self.fail(ClientError::validation(
                "Reset link is incomplete. Please request a new OTP.",
            )));
        }

        self.begin();
        match self.api.confirm_reset(&self.email, &self.otp, password).await {
            Ok(_) => {
                self.advance(
                    ResetState::PasswordConfirmed,
                    "Password reset successful! Redirecting to login...",
                );
                Ok(Redirect { path: LOGIN_PATH.to_string(), after: LOGIN_REDIRECT_DELAY })
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn begin(&mut self) {
        self.notice = None;
    }

    fn advance(&mut self, to: ResetState, text: &str) {
        self.state = to;
        self.progress = to;
        self.notice = Some(Notice { kind: NoticeKind::Success, text: text.to_string() });
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        self.state = ResetState::Error;
        self.notice = Some(Notice { kind: NoticeKind::Error, text: err.to_string() });
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        requests: u32,
        verifies: u32,
        confirms: u32,
    }

    #[derive(Clone, Default)]
    struct FakeApi {
        calls: Arc<Mutex<Calls>>,
    }

    const CODE: &str = "482913";

    fn rejected(message: &str) -> ClientError {
        ClientError::Rejected { status: StatusCode::BAD_REQUEST, message: message.to_string() }
    }

    #[async_trait]
    impl ResetApi for FakeApi {
        async fn request_otp(&self, _email: &str) -> Result<String, ClientError> {
            self.calls.lock().unwrap().requests += 1;
            Ok("sent".into())
        }

        async fn verify_otp(&self, _email: &str, otp: &str) -> Result<String, ClientError> {
            self.calls.lock().unwrap().verifies += 1;
            if otp == CODE {
                Ok("verified".into())
            } else {
                Err(rejected("Invalid or expired OTP"))
            }
        }

        async fn confirm_reset(&self, _e: &str, otp: &str, _p: &str) -> Result<String, ClientError> {
            self.calls.lock().unwrap().confirms += 1;
            if otp == CODE {
                Ok("done".into())
            } else {
                Err(rejected("Invalid or expired OTP"))
            }
        }
    }

    #[test]
    fn sanitizes_pasted_codes() {
        assert_eq!(sanitize_otp_input(" 48-29 13 "), "482913");
        assert_eq!(sanitize_otp_input("12345678"), "123456");
        assert_eq!(sanitize_otp_input("abc"), "");
    }

    #[test]
    fn confirm_path_encodes_email() {
        assert_eq!(
            confirm_path("jo+shop@example.com", CODE),
            "/reset-password/confirm?email=jo%2Bshop%40example.com&otp=482913"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resend_waits_for_the_cooldown() {
        let api = FakeApi::default();
        let mut flow = ResetFlow::new(api.clone());

        flow.request("seller@example.com").await.unwrap();
        assert_eq!(flow.state(), ResetState::OtpRequested);
        assert_eq!(flow.cooldown().remaining_secs(), 60);
        assert!(!flow.can_resend());

        tokio::time::advance(Duration::from_millis(59_500)).await;
        assert_eq!(flow.cooldown().remaining_secs(), 1);
        assert!(matches!(flow.resend().await, Err(ClientError::Cooldown(1))));
        assert_eq!(api.calls.lock().unwrap().requests, 1);
        assert_eq!(flow.progress(), ResetState::OtpRequested);

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(flow.can_resend());
        flow.resend().await.unwrap();
        assert_eq!(api.calls.lock().unwrap().requests, 2);
        assert_eq!(flow.cooldown().remaining_secs(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_code_keeps_progress_and_retry_succeeds() {
        let mut flow = ResetFlow::new(FakeApi::default());
        flow.request("seller@example.com").await.unwrap();

        let err = flow.verify("000000").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired OTP");
        assert_eq!(flow.state(), ResetState::Error);
        assert_eq!(flow.progress(), ResetState::OtpRequested);
        assert_eq!(flow.notice().unwrap().kind, NoticeKind::Error);

        let redirect = flow.verify("482 913").await.unwrap();
        assert_eq!(flow.state(), ResetState::OtpVerified);
        assert_eq!(redirect.after, VERIFY_REDIRECT_DELAY);
        assert!(redirect.path.ends_with("otp=482913"));
    }

    #[tokio::test]
    async fn short_code_never_reaches_the_server() {
        let api = FakeApi::default();
        let mut flow = ResetFlow::new(api.clone());
        flow.request("seller@example.com").await.unwrap();

        assert!(matches!(flow.verify("12a45").await, Err(ClientError::Validation(_))));
        assert_eq!(api.calls.lock().unwrap().verifies, 0);
    }

    #[tokio::test]
    async fn confirm_checks_passwords_locally_first() {
        let api = FakeApi::default();
        let link = confirm_path("seller@example.com", CODE);
        let mut flow = ResetFlow::from_confirm_url(api.clone(), &link).unwrap();
        assert_eq!(flow.email(), "seller@example.com");

        let err = flow.confirm("Strong#Pass1", "Strong#Pass2").await.unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");

        let err = flow.confirm("short1!", "short1!").await.unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 8 characters");

        let err = flow.confirm("lowercase", "lowercase").await.unwrap_err();
        assert!(err.to_string().starts_with("Please choose a stronger password"));

        assert_eq!(api.calls.lock().unwrap().confirms, 0);

        let redirect = flow.confirm("Strong#Pass1", "Strong#Pass1").await.unwrap();
        assert_eq!(redirect, Redirect { path: "/login".into(), after: LOGIN_REDIRECT_DELAY });
        assert_eq!(flow.state(), ResetState::PasswordConfirmed);
        assert_eq!(api.calls.lock().unwrap().confirms, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn otp_page_link_resumes_without_a_new_request() {
        let api = FakeApi::default();
        let mut flow =
            ResetFlow::from_otp_url(api.clone(), "/reset-password/otp?email=%20seller%40example.com%20")
                .unwrap();
        assert_eq!(flow.email(), "seller@example.com");
        assert_eq!(flow.progress(), ResetState::OtpRequested);
        assert_eq!(flow.cooldown().remaining_secs(), 60);
        assert!(!flow.can_resend());

        assert!(matches!(flow.resend().await, Err(ClientError::Cooldown(60))));
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(matches!(flow.resend().await, Err(ClientError::Cooldown(1))));

        flow.verify(CODE).await.unwrap();
        assert_eq!(flow.state(), ResetState::OtpVerified);
        assert_eq!(api.calls.lock().unwrap().requests, 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(flow.can_resend());
    }

    #[test]
    fn otp_link_without_email_is_rejected() {
        let result = ResetFlow::from_otp_url(FakeApi::default(), "/reset-password/otp");
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn incomplete_confirm_link_is_rejected() {
        let result = ResetFlow::from_confirm_url(FakeApi::default(), "/reset-password/confirm?otp=1");
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }
}
