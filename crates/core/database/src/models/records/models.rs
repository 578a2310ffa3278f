use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use stash_result::ErrorType;

/// How the `content` of a [`UserRecord`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
  #[default]
  Text,
  /// `content` holds a platform issued file id
  Photo,
}

impl ContentType {
  pub const ALL: [ContentType; 2] = [ContentType::Text, ContentType::Photo];

  pub fn as_str(&self) -> &'static str {
    match self {
      ContentType::Text => "text",
      ContentType::Photo => "photo",
    }
  }
}

impl fmt::Display for ContentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ContentType {
  type Err = ErrorType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "text" => Ok(ContentType::Text),
      "photo" => Ok(ContentType::Photo),
      other => {
        Err(ErrorType::FailedValidation { error: format!("unknown content type `{}`", other) })
      }
    }
  }
}

/// The single piece of content stored for a user. Writing replaces it whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
  pub user_id: i64,       // unique
  pub r#type: ContentType, // "text" | "photo"
  pub content: String,
}

impl UserRecord {
  pub fn new(user_id: i64, r#type: ContentType, content: impl Into<String>) -> Self {
    Self { user_id, r#type, content: content.into() }
  }

  pub fn text(user_id: i64, content: impl Into<String>) -> Self {
    Self::new(user_id, ContentType::Text, content)
  }

  pub fn photo(user_id: i64, file_id: impl Into<String>) -> Self {
    Self::new(user_id, ContentType::Photo, file_id)
  }
}
