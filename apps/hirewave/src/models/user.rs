use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. Anything the backend sends that is not one of the three
/// known roles deserializes to `Unspecified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Recruiter,
    Jobseeker,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::Jobseeker => "jobseeker",
            Role::Unspecified => "unspecified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub year_of_passing: String,
    #[serde(default)]
    pub status: String,
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_type: Role,
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_superuser: bool,
    pub referral_code: Option<String>,
    pub profile: Option<UserProfile>,
}

impl User {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Referral code from the account, falling back to the profile copy.
    pub fn referral_code(&self) -> Option<&str> {
        self.referral_code
            .as_deref()
            .or_else(|| self.profile.as_ref()?.referral_code.as_deref())
    }
}

/// Body of `POST /auth/verify-otp/`. Older backends answer with `token`
/// instead of the `access`/`refresh` pair.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    pub access: Option<String>,
    pub token: Option<String>,
    pub refresh: Option<String>,
    pub user: Option<User>,
}

impl AuthResponse {
    pub fn bearer(&self) -> Option<&str> {
        self.access.as_deref().or(self.token.as_deref())
    }
}

/// Body of `POST /auth/register/`. Field names follow the backend serializer.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(rename = "yearOfPassing", skip_serializing_if = "Option::is_none")]
    pub year_of_passing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "referralCode")]
    pub referral_code: String,
    pub user_type: Role,
}

/// Generic `{message, email}` acknowledgement returned by the OTP and register endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    pub message: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_unknown_value_is_unspecified() {
        let role: Role = serde_json::from_str(r#""superhero""#).unwrap();
        assert_eq!(role, Role::Unspecified);
        let role: Role = serde_json::from_str(r#""recruiter""#).unwrap();
        assert_eq!(role, Role::Recruiter);
    }

    #[test]
    fn test_user_deserializes_backend_payload() {
        let json = r#"{
            "id": "7d5c4c1e-9a43-4f3f-8f0e-0d3a0f6f1b11",
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "user_type": "admin",
            "date_joined": "2024-03-01T10:00:00Z",
            "profile": {"dob": null, "college": "", "year_of_passing": "", "status": "", "referral_code": "ABCD1234"}
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_type, Role::Admin);
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.referral_code(), Some("ABCD1234"));
        assert!(!user.is_superuser);
    }

    #[test]
    fn test_full_name_falls_back_to_email() {
        let user: User = serde_json::from_str(
            r#"{"id": "7d5c4c1e-9a43-4f3f-8f0e-0d3a0f6f1b11", "email": "x@example.com"}"#,
        )
        .unwrap();
        assert_eq!(user.full_name(), "x@example.com");
        assert_eq!(user.user_type, Role::Unspecified);
    }

    #[test]
    fn test_auth_response_bearer_prefers_access() {
        let resp: AuthResponse =
            serde_json::from_str(r#"{"access": "a", "token": "t", "refresh": "r"}"#).unwrap();
        assert_eq!(resp.bearer(), Some("a"));
        let resp: AuthResponse = serde_json::from_str(r#"{"token": "t"}"#).unwrap();
        assert_eq!(resp.bearer(), Some("t"));
    }
}
