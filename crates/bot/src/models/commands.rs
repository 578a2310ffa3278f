use stash_database::ContentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Start,
  Store,
  Get,
}

impl Command {
  pub fn as_str(&self) -> &'static str {
    match self {
      Command::Start => "start",
      Command::Store => "store",
      Command::Get => "get",
    }
  }

  fn from_name(name: &str) -> Option<Self> {
    match name.to_ascii_lowercase().as_str() {
      "start" => Some(Command::Start),
      "store" => Some(Command::Store),
      "get" => Some(Command::Get),
      _ => None,
    }
  }
}

/// One size variant of a photo attached to a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
  pub file_id: String,
  pub width: u32,
  pub height: u32,
}

impl PhotoRef {
  fn area(&self) -> u64 {
    u64::from(self.width) * u64::from(self.height)
  }
}

/// A chat message reduced to what the command handlers need.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncomingMessage {
  pub chat_id: i64,
  pub user_id: i64,
  pub text: String,
  /// Photo sizes of the message this one replies to, empty when there is none
  pub reply_photos: Vec<PhotoRef>,
}

/// Splits `/name[@bot] args` into the command and its raw argument text.
///
/// Mentions of another bot are rejected. When `bot_username` is empty every
/// mention is accepted.
pub fn parse_command<'a>(text: &'a str, bot_username: &str) -> Option<(Command, &'a str)> {
  let text = text.trim_start();
  let rest = text.strip_prefix('/')?;

  let (head, args) = match rest.find(char::is_whitespace) {
    Some(idx) => (&rest[..idx], &rest[idx..]),
    None => (rest, ""),
  };

  let name = match head.split_once('@') {
    Some((name, mention)) => {
      if !bot_username.is_empty() && !mention.eq_ignore_ascii_case(bot_username) {
        return None;
      }
      name
    }
    None => head,
  };

  Command::from_name(name).map(|command| (command, args))
}

/// Picks what `/store` should save: the largest photo of the replied-to
/// message, otherwise the trimmed command text. `None` means nothing to store.
pub fn resolve_store_content(args: &str, reply_photos: &[PhotoRef]) -> Option<(ContentType, String)> {
  // max_by_key keeps the last of equal elements
  if let Some(photo) = reply_photos.iter().max_by_key(|p| p.area()) {
    return Some((ContentType::Photo, photo.file_id.clone()));
  }

  let text = args.trim();
  if text.is_empty() {
    return None;
  }
  Some((ContentType::Text, text.to_string()))
}
