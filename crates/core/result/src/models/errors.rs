use std::{error::Error, fmt};

use crate::ErrorType;

pub type BoxedErr = Box<dyn Error + Sync + Send>;

#[derive(Debug)]
pub struct DBError {
  pub err_type: ErrorType,
  pub err: Box<dyn Error + Send + Sync>,
  pub msg: String,
  pub path: String,
}

impl Default for DBError {
  fn default() -> Self {
    Self {
      err_type: ErrorType::DatabaseError { operation: String::new(), collection: String::new() },
      err: Box::new(std::io::Error::other("Database error")),
      msg: String::new(),
      path: String::new(),
    }
  }
}

impl fmt::Display for DBError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut parts = Vec::new();

    if !self.path.is_empty() {
      parts.push(format!("path: {}", self.path));
    }
    parts.push(format!("err_type: {}", self.err_type));
    if !self.msg.is_empty() {
      parts.push(format!("msg: {}", self.msg));
    }
    parts.push(format!("err: {}", self.err));

    write!(f, "{}", parts.join(", "))
  }
}

impl Error for DBError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    Some(self.err.as_ref())
  }
}

impl DBError {
  pub fn new(
    path: impl Into<String>,
    err: Box<dyn Error + Send + Sync>,
    err_type: ErrorType,
    msg: impl Into<String>,
  ) -> Self {
    Self { err_type, err, msg: msg.into(), path: path.into() }
  }
}

/// Failures of the process plumbing (listeners, registries, bootstrap).
///
/// `temp` marks errors that are expected to go away on their own (a peer
/// hanging up, a slow store), as opposed to misconfiguration.
#[derive(Debug)]
pub struct InternalError {
  pub err_type: ErrorType,
  pub temp: bool,
  pub err: BoxedErr,
  pub msg: String,
  pub path: String,
}

impl fmt::Display for InternalError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "path: {}, err_type: {}, temp: {}, msg: {}, err: {}",
      self.path, self.err_type, self.temp, self.msg, self.err
    )
  }
}

impl Error for InternalError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    Some(self.err.as_ref())
  }
}

#[derive(Debug)]
pub struct SimpleError {
  pub message: String,
  pub err_type: ErrorType,
  pub err: BoxedErr,
}

impl fmt::Display for SimpleError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.message.is_empty() {
      write!(f, "{}: {}", self.err_type, self.err)
    } else {
      write!(f, "{}: {}", self.err_type, self.message)
    }
  }
}

impl Error for SimpleError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    Some(self.err.as_ref())
  }
}
