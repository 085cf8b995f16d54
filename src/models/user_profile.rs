use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public view of an account, shaped the way the storefront reads it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub dob: String,
    pub gender: String,
    pub role: String,
    pub bio: String,
    pub profile_image: String,
}

impl UserProfile {
    /// Placeholder shown when nobody is signed in.
    pub fn guest() -> Self {
        Self {
            full_name: "Guest User".to_string(),
            email: "guest@example.com".to_string(),
            phone: "0000000000".to_string(),
            address: "Not added yet".to_string(),
            dob: "N/A".to_string(),
            gender: "N/A".to_string(),
            role: "User".to_string(),
            bio: "No bio added yet.".to_string(),
            profile_image: String::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,

    // Read-only, accepted so the whole cached profile can be sent back.
    pub email: Option<String>,

    #[validate(length(max = 20, message = "Phone number is too long"))]
    pub phone: Option<String>,

    #[validate(length(max = 300, message = "Address is too long"))]
    pub address: Option<String>,

    pub dob: Option<String>,
    pub gender: Option<String>,

    // Read-only.
    pub role: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    #[validate(url(message = "Profile image must be a URL"))]
    pub profile_image: Option<String>,
}

impl From<&UserProfile> for ProfileUpdate {
    fn from(profile: &UserProfile) -> Self {
        let opt = |v: &String| if v.is_empty() { None } else { Some(v.clone()) };
        Self {
            full_name: opt(&profile.full_name),
            email: opt(&profile.email),
            phone: Some(profile.phone.clone()),
            address: Some(profile.address.clone()),
            dob: Some(profile.dob.clone()),
            gender: Some(profile.gender.clone()),
            role: opt(&profile.role),
            bio: Some(profile.bio.clone()),
            profile_image: opt(&profile.profile_image),
        }
    }
}

/// Up to two uppercase initials for the avatar fallback.
pub fn initials(name: &str) -> String {
    let mut parts = name.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => first
            .chars()
            .take(1)
            .chain(second.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect(),
        (Some(first), None) => first.chars().take(1).flat_map(char::to_uppercase).collect(),
        _ => "U".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_cover_edge_cases() {
        assert_eq!(initials("asha rao kumar"), "AR");
        assert_eq!(initials("madonna"), "M");
        assert_eq!(initials("   "), "U");
    }

    #[test]
    fn profile_serializes_camel_case() {
        let json = serde_json::to_value(UserProfile::guest()).unwrap();
        assert_eq!(json["fullName"], "Guest User");
        assert!(json.get("profileImage").is_some());
    }

    #[test]
    fn update_rejects_bad_image_url() {
        let update = ProfileUpdate {
            profile_image: Some("not a url".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
