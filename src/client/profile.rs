use crate::client::session::SessionCache;
use crate::client::{decode_field, read_json, ClientConfig, ClientError};
use crate::models::user_profile::{initials, ProfileUpdate, UserProfile};

const PROFILE_PATH: &str = "/api/users/profile";

/// Profile page and edit form, backed by the shared session.
#[derive(Clone)]
pub struct ProfileClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: SessionCache,
}

impl ProfileClient {
    pub fn new(config: ClientConfig, session: SessionCache) -> Self {
        Self { http: reqwest::Client::new(), config, session }
    }

    pub fn session(&self) -> &SessionCache {
        &self.session
    }

    /// Cached user, or the guest placeholder when nobody is signed in.
    pub fn current_profile(&self) -> UserProfile {
        self.session.user().unwrap_or_else(UserProfile::guest)
    }

    pub fn initials(&self) -> String {
        initials(&self.current_profile().full_name)
    }

    fn token(&self) -> Result<String, ClientError> {
        self.session
            .token()
            .ok_or_else(|| ClientError::validation("Please login first!"))
    }

    /// Reload the profile from the server and cache it.
    pub async fn refresh(&self) -> Result<UserProfile, ClientError> {
        let token = self.token()?;
        let response = self
            .http
            .get(self.config.endpoint(PROFILE_PATH)?)
            .bearer_auth(token)
            .send()
            .await?;
        let body = read_json(response, "Could not load profile.").await?;
        let user: UserProfile = decode_field(&body, "user")?;
        self.session.update_user(user.clone())?;
        Ok(user)
    }

    /// Save edits. The server echoes the stored profile, which replaces the
    /// cached one.
    pub async fn update(&self, profile: &UserProfile) -> Result<UserProfile, ClientError> {
        let token = self.token()?;
        let response = self
            .http
            .put(self.config.endpoint(PROFILE_PATH)?)
            .bearer_auth(token)
            .json(&ProfileUpdate::from(profile))
            .send()
            .await?;
        let body = read_json(response, "Update failed.").await?;
        let user: UserProfile = decode_field(&body, "user")?;
        self.session.update_user(user.clone())?;

        tracing::info!("✅ Profile saved for {}", user.email);
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.clear()
    }
}
