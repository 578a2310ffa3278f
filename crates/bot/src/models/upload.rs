use hyper::StatusCode;
use serde::Deserialize;
use stash_database::{ContentType, UserRecord};
use thiserror::Error;

/// Fields of the web upload form. Everything is optional here so a missing
/// field becomes a validation error rather than a decoding error.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UploadForm {
  pub user_id: Option<String>,
  pub content: Option<String>,
  pub r#type: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
  #[error("Missing user_id or content")]
  MissingField,
  #[error("user_id must be an integer")]
  InvalidUserId,
  #[error("type must be one of: text, photo")]
  InvalidType,
  #[error("Malformed form body")]
  MalformedBody,
  #[error("Request body too large")]
  BodyTooLarge,
  #[error("Failed to read request body")]
  UnreadableBody,
}

impl UploadError {
  pub fn status(&self) -> StatusCode {
    match self {
      UploadError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
      _ => StatusCode::BAD_REQUEST,
    }
  }

  /// Label used for the rejected uploads metric
  pub fn reason(&self) -> &'static str {
    match self {
      UploadError::MissingField => "missing_field",
      UploadError::InvalidUserId => "invalid_user_id",
      UploadError::InvalidType => "invalid_type",
      UploadError::MalformedBody => "malformed_body",
      UploadError::BodyTooLarge => "body_too_large",
      UploadError::UnreadableBody => "unreadable_body",
    }
  }
}

pub fn upload_parse(body: &[u8]) -> Result<UploadForm, UploadError> {
  serde_urlencoded::from_bytes(body).map_err(|_| UploadError::MalformedBody)
}

pub fn upload_validate(form: &UploadForm) -> Result<UserRecord, UploadError> {
  // blank values count as missing, non-blank ones are kept as sent
  fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
  }

  let (Some(user_id), Some(content)) = (present(&form.user_id), present(&form.content)) else {
    return Err(UploadError::MissingField);
  };

  let user_id = user_id.trim().parse::<i64>().map_err(|_| UploadError::InvalidUserId)?;

  let r#type = match form.r#type.as_deref().filter(|t| !t.is_empty()) {
    Some(t) => t.parse::<ContentType>().map_err(|_| UploadError::InvalidType)?,
    None => ContentType::Text,
  };

  Ok(UserRecord::new(user_id, r#type, content))
}
