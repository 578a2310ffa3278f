pub const WELCOME: &str = "Welcome! Use /store to save and /get to retrieve your content.";
pub const STORE_PROMPT: &str = "Please provide text to store after /store or reply to an image.";
pub const STORE_SUCCESS: &str = "Stored successfully!";
pub const STORE_FAILED: &str =
  "Something went wrong while storing your content. Please try again.";
pub const NOTHING_STORED: &str = "No data found. Use /store to save something first.";
pub const SAVED_TEXT_PREFIX: &str = "Your saved text:\n";
pub const SAVED_IMAGE_CAPTION: &str = "Your saved image:";
pub const CONFIRMED: &str = "✔️ Your data is stored!";
pub const BACK_PROMPT: &str = "Use /get or /store to interact again.";

pub const CALLBACK_CONFIRM_STORE: &str = "confirm_store";
pub const CALLBACK_BACK: &str = "back";

/// An inline button: the label shown to the user and the data sent back on press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
  pub label: String,
  pub data: String,
}

impl Control {
  pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
    Self { label: label.into(), data: data.into() }
  }

  pub fn confirm_store() -> Self {
    Self::new("✅ Confirm", CALLBACK_CONFIRM_STORE)
  }

  pub fn back() -> Self {
    Self::new("↩ Back", CALLBACK_BACK)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
  ConfirmStore,
  Back,
}

impl CallbackAction {
  pub fn parse(data: &str) -> Option<Self> {
    match data {
      CALLBACK_CONFIRM_STORE => Some(CallbackAction::ConfirmStore),
      CALLBACK_BACK => Some(CallbackAction::Back),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      CallbackAction::ConfirmStore => CALLBACK_CONFIRM_STORE,
      CallbackAction::Back => CALLBACK_BACK,
    }
  }

  /// Fixed text the originating message is replaced with
  pub fn reply_text(&self) -> &'static str {
    match self {
      CallbackAction::ConfirmStore => CONFIRMED,
      CallbackAction::Back => BACK_PROMPT,
    }
  }
}

pub fn saved_text(content: &str) -> String {
  format!("{}{}", SAVED_TEXT_PREFIX, content)
}
