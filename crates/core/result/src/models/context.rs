use std::fmt;

use ulid::Ulid;

/// Which entry point a request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
  Chat,
  Web,
}

impl fmt::Display for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Source::Chat => write!(f, "chat"),
      Source::Web => write!(f, "web"),
    }
  }
}

/// Per-request data carried from the entry point down to the repositories.
#[derive(Debug, Clone)]
pub struct Context {
  pub request_id: String,
  pub source: Source,
  /// Command or route that started the request
  pub path: String,
}

impl Context {
  pub fn new(source: Source, path: impl Into<String>) -> Self {
    Self { request_id: Ulid::new().to_string(), source, path: path.into() }
  }

  pub fn request_id(&self) -> &str {
    &self.request_id
  }
}

impl Default for Context {
  fn default() -> Self {
    Self::new(Source::Chat, "")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_context_gets_unique_request_ids() {
    let a = Context::new(Source::Web, "/upload");
    let b = Context::new(Source::Web, "/upload");
    assert_eq!(a.request_id().len(), 26);
    assert_ne!(a.request_id(), b.request_id());
    assert_eq!(a.source.to_string(), "web");
    assert_eq!(a.path, "/upload");
  }
}
