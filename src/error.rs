use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

// Path segment of an offending field, e.g. `["body", "messages", 0, "role"]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum LocItem {
    Key(String),
    Index(usize),
}

impl From<&str> for LocItem {
    fn from(key: &str) -> Self {
        LocItem::Key(key.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<LocItem>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Error)]
pub enum RelayError {
    // Raised before any upstream call
    #[error("invalid chat request: {}", summarize(.0))]
    Validation(Vec<FieldError>),
    // Transport, status or body failure once the call is issued
    #[error("{0}")]
    Upstream(String),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", render_loc(&e.loc), e.msg))
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_loc(loc: &[LocItem]) -> String {
    loc.iter()
        .map(|item| match item {
            LocItem::Key(key) => key.clone(),
            LocItem::Index(index) => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

impl RelayError {
    // Bad syntax, missing field or wrong type in the JSON body
    pub fn from_payload(err: &JsonPayloadError) -> Self {
        let kind = match err {
            JsonPayloadError::Deserialize(_) => "value_error",
            _ => "json_invalid",
        };
        RelayError::Validation(vec![FieldError {
            loc: vec!["body".into()],
            msg: err.to_string(),
            kind: kind.to_string(),
        }])
    }
}

// Validator error tree -> field errors rooted at `body`, ordered by path
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields = Vec::new();
    flatten(errors, &["body".into()], &mut fields);
    fields.sort_by(|a, b| a.loc.cmp(&b.loc));
    fields
}

// Walks the nested validator tree, building a path for each leaf error
fn flatten(errors: &ValidationErrors, loc: &[LocItem], out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let mut path = loc.to_vec();
        path.push(LocItem::Key(field.to_string()));
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    out.push(FieldError {
                        loc: path.clone(),
                        msg: err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| err.code.to_string()),
                        kind: err.code.to_string(),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let mut item_path = path.clone();
                    item_path.push(LocItem::Index(*index));
                    flatten(inner, &item_path, out);
                }
            }
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Upstream(err.to_string())
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            RelayError::Validation(fields) => json!({ "detail": fields }),
            RelayError::Upstream(text) => json!({ "detail": text }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
