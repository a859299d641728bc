use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Client-level error type.
/// Every variant can be turned into the string shown next to the control that triggered it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
        field_errors: BTreeMap<String, Vec<String>>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Builds an `Api` error from a non-success response body.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let (message, field_errors) = extract_api_message(body);
        ClientError::Api {
            status: status.as_u16(),
            message,
            field_errors,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the backend answered 404, which the OTP request endpoint
    /// uses for "no account found for this email".
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// What the backend said, for `Api` errors that carried a message.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The message displayed to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(e) if e.is_timeout() => {
                "The request timed out. Please try again.".to_string()
            }
            ClientError::Network(_) => {
                "Unable to reach HireWave. Check your connection and try again.".to_string()
            }
            ClientError::Api {
                status, message, ..
            } => match (*status, message) {
                (401, _) => "Your session has expired. Please log in again.".to_string(),
                (403, _) => "You do not have permission to access this resource.".to_string(),
                (_, Some(message)) => message.clone(),
                (404, None) => "The requested resource was not found.".to_string(),
                (400, None) => "Invalid data submitted. Please check your inputs.".to_string(),
                (status, None) => format!("Something went wrong (status {status}). Please try again."),
            },
            ClientError::Validation(msg) => msg.clone(),
            ClientError::NotAuthenticated => "Please log in to continue.".to_string(),
            ClientError::Storage(e) => format!("Could not access the local session store: {e}"),
            ClientError::Decode(_) => {
                "Received an unexpected response from the server.".to_string()
            }
        }
    }
}

/// Pulls a displayable message out of whatever JSON error body the backend sent.
///
/// Lookup order: `detail`, `error`, `message`, then field-keyed validation
/// messages (`non_field_errors` unprefixed, others as `field: msg`).
pub fn extract_api_message(body: &str) -> (Option<String>, BTreeMap<String, Vec<String>>) {
    let mut field_errors = BTreeMap::new();

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        let trimmed = body.trim();
        // HTML error pages are not worth showing
        let message = (!trimmed.is_empty() && !trimmed.starts_with('<')).then(|| trimmed.to_string());
        return (message, field_errors);
    };

    for key in ["detail", "error", "message"] {
        if let Some(Value::String(s)) = map.get(key) {
            return (Some(s.clone()), field_errors);
        }
    }

    let nested = match map.get("errors") {
        Some(Value::Object(inner)) => inner.clone(),
        _ => map,
    };

    for (field, value) in &nested {
        let messages: Vec<String> = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => continue,
        };
        if !messages.is_empty() {
            field_errors.insert(field.clone(), messages);
        }
    }

    if field_errors.is_empty() {
        return (None, field_errors);
    }

    let message = field_errors
        .iter()
        .map(|(field, msgs)| {
            if field == "non_field_errors" {
                msgs.join(", ")
            } else {
                format!("{field}: {}", msgs.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    (Some(message), field_errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prefers_detail_then_error() {
        let (msg, _) = extract_api_message(r#"{"detail": "Token expired", "error": "x"}"#);
        assert_eq!(msg.as_deref(), Some("Token expired"));

        let (msg, _) = extract_api_message(r#"{"error": "Invalid OTP"}"#);
        assert_eq!(msg.as_deref(), Some("Invalid OTP"));
    }

    #[test]
    fn test_extract_field_errors() {
        let (msg, fields) =
            extract_api_message(r#"{"email": ["Enter a valid email address."], "otp": "Too short"}"#);
        assert_eq!(fields.len(), 2);
        assert_eq!(
            msg.as_deref(),
            Some("email: Enter a valid email address.\notp: Too short")
        );
    }

    #[test]
    fn test_extract_non_field_errors_unprefixed() {
        let (msg, _) = extract_api_message(r#"{"non_field_errors": ["Invalid OTP."]}"#);
        assert_eq!(msg.as_deref(), Some("Invalid OTP."));
    }

    #[test]
    fn test_extract_ignores_html_bodies() {
        let (msg, fields) = extract_api_message("<html><body>502</body></html>");
        assert!(msg.is_none());
        assert!(fields.is_empty());
    }

    #[test]
    fn test_user_message_status_overrides() {
        let err = ClientError::from_response(StatusCode::UNAUTHORIZED, r#"{"detail": "bad token"}"#);
        assert_eq!(
            err.user_message(),
            "Your session has expired. Please log in again."
        );

        let err = ClientError::from_response(StatusCode::NOT_FOUND, "");
        assert_eq!(err.user_message(), "The requested resource was not found.");
    }

    #[test]
    fn test_backend_message_only_for_api_errors() {
        let err = ClientError::from_response(StatusCode::UNAUTHORIZED, r#"{"error": "Invalid OTP"}"#);
        assert_eq!(err.backend_message(), Some("Invalid OTP"));
        assert!(ClientError::from_response(StatusCode::UNAUTHORIZED, "").backend_message().is_none());
        assert!(ClientError::NotAuthenticated.backend_message().is_none());
    }

    #[test]
    fn test_user_message_uses_backend_text_for_no_account() {
        let err = ClientError::from_response(
            StatusCode::NOT_FOUND,
            r#"{"error": "No account found with this email. Please sign up first."}"#,
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.user_message(),
            "No account found with this email. Please sign up first."
        );
    }
}
