use serde::{Deserialize, Serialize};

use crate::entity::FieldErrors;

/// Body shape shared by every endpoint.
///
/// `data` carries the note or note list on success; `errors` carries
/// per-field reasons on validation failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            errors: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_only_envelope() {
        let value = serde_json::to_value(ApiResponse::data(vec![1, 2])).unwrap();
        assert_eq!(value, json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn test_message_only_envelope() {
        let value = serde_json::to_value(ApiResponse::<()>::message("Note deleted successfully")).unwrap();
        assert_eq!(value, json!({"success": true, "message": "Note deleted successfully"}));
    }

    #[test]
    fn test_failure_envelope_with_errors() {
        let mut errors = FieldErrors::new();
        errors.add("title", "The title field is required.");
        let value =
            serde_json::to_value(ApiResponse::<()>::failure("Validation failed", Some(errors))).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": {"title": ["The title field is required."]}
            })
        );
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let parsed: ApiResponse<serde_json::Value> =
            serde_json::from_str(r#"{"success":false,"message":"Note not found"}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.message.as_deref(), Some("Note not found"));
        assert!(parsed.data.is_none());
        assert!(parsed.errors.is_none());
    }
}
