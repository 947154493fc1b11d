use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::{field_errors, FieldError, RelayError};

pub const ALLOWED_ROLES: [&str; 3] = ["system", "user", "assistant"];
pub const MAX_MESSAGES: usize = 20;

pub const DEFAULT_MODEL: &str = "mistral-7b-instruct-v0.3";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: i64 = 500;

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> i64 {
    DEFAULT_MAX_TOKENS
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if ALLOWED_ROLES.contains(&role) {
        return Ok(());
    }
    let mut err = ValidationError::new("role");
    err.message = Some(
        format!(
            "role '{}' is not one of: {}",
            role,
            ALLOWED_ROLES.join(", ")
        )
        .into(),
    );
    Err(err)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChatMessage {
    #[validate(custom(function = "validate_role"))]
    pub role: String,
    // Counted in characters, not bytes.
    #[validate(length(max = 2000, message = "content must be at most 2000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    // Count is checked in `check`; validator panics when a field-level error
    // and nested list errors land under the same key.
    #[validate(nested)]
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,
}

impl ChatRequest {
    // Collects every broken rule, message count and per-message rules alike
    pub fn check(&self) -> Result<(), RelayError> {
        let mut fields = Vec::new();

        if self.messages.is_empty() || self.messages.len() > MAX_MESSAGES {
            fields.push(FieldError {
                loc: vec!["body".into(), "messages".into()],
                msg: format!("messages must contain between 1 and {} items", MAX_MESSAGES),
                kind: "length".to_string(),
            });
        }

        if let Err(errors) = self.validate() {
            fields.extend(field_errors(&errors));
        }

        if fields.is_empty() {
            Ok(())
        } else {
            fields.sort_by(|a, b| a.loc.cmp(&b.loc));
            Err(RelayError::Validation(fields))
        }
    }
}

// Normalized reply for `POST /chat`; everything but `response` is copied from upstream as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Value>,
    pub usage: Option<Value>,
    pub model: Option<Value>,
    pub created: Option<Value>,
    pub response: String,
}
