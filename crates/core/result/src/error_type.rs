use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ErrorType {
  // Validation errors
  FailedValidation { error: String },

  // Database errors
  DatabaseError { operation: String, collection: String },
  DBConnectionError,

  // External service errors
  InternalError,
  Connection,
  ConfigError,
}

impl fmt::Display for ErrorType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ErrorType::FailedValidation { error } => write!(f, "Validation failed: {}", error),
      ErrorType::DatabaseError { operation, collection } => {
        write!(f, "Database error during {} on {}", operation, collection)
      }
      ErrorType::DBConnectionError => write!(f, "Database connection error"),
      ErrorType::InternalError => write!(f, "Internal error"),
      ErrorType::Connection => write!(f, "Connection error"),
      ErrorType::ConfigError => write!(f, "Configuration error"),
    }
  }
}
