use async_trait::async_trait;
use stash_result::errors::BoxedErr;
use teloxide::{
  payloads::{EditMessageTextSetters, SendMessageSetters, SendPhotoSetters},
  prelude::*,
  types::{ChatAction as TgChatAction, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId},
};

use crate::models::replies::Control;

/// A message the bot has sent and may edit later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
  pub chat_id: i64,
  pub message_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
  Typing,
  UploadPhoto,
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
  async fn send_text(
    &self,
    chat_id: i64,
    text: &str,
    control: Option<Control>,
  ) -> Result<MessageRef, BoxedErr>;

  async fn edit_text(
    &self,
    message: MessageRef,
    text: &str,
    control: Option<Control>,
  ) -> Result<(), BoxedErr>;

  /// `file_id` is a handle previously issued by the platform
  async fn send_photo(
    &self,
    chat_id: i64,
    file_id: &str,
    caption: &str,
    control: Option<Control>,
  ) -> Result<MessageRef, BoxedErr>;

  async fn send_action(&self, chat_id: i64, action: ChatAction) -> Result<(), BoxedErr>;

  async fn answer_callback(&self, callback_id: &str) -> Result<(), BoxedErr>;
}

/// Telegram Bot API implementation.
#[derive(Clone)]
pub struct TelegramMessenger {
  bot: Bot,
}

impl TelegramMessenger {
  pub fn new(bot: Bot) -> Self {
    Self { bot }
  }
}

fn keyboard(control: Control) -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new([[InlineKeyboardButton::callback(control.label, control.data)]])
}

#[async_trait]
impl Messenger for TelegramMessenger {
  async fn send_text(
    &self,
    chat_id: i64,
    text: &str,
    control: Option<Control>,
  ) -> Result<MessageRef, BoxedErr> {
    let mut req = self.bot.send_message(ChatId(chat_id), text);
    if let Some(control) = control {
      req = req.reply_markup(keyboard(control));
    }

    let msg = req.await?;
    Ok(MessageRef { chat_id, message_id: msg.id.0 })
  }

  async fn edit_text(
    &self,
    message: MessageRef,
    text: &str,
    control: Option<Control>,
  ) -> Result<(), BoxedErr> {
    let mut req =
      self.bot.edit_message_text(ChatId(message.chat_id), MessageId(message.message_id), text);
    if let Some(control) = control {
      req = req.reply_markup(keyboard(control));
    }

    req.await?;
    Ok(())
  }

  async fn send_photo(
    &self,
    chat_id: i64,
    file_id: &str,
    caption: &str,
    control: Option<Control>,
  ) -> Result<MessageRef, BoxedErr> {
    let mut req =
      self.bot.send_photo(ChatId(chat_id), InputFile::file_id(file_id.to_string())).caption(caption);
    if let Some(control) = control {
      req = req.reply_markup(keyboard(control));
    }

    let msg = req.await?;
    Ok(MessageRef { chat_id, message_id: msg.id.0 })
  }

  async fn send_action(&self, chat_id: i64, action: ChatAction) -> Result<(), BoxedErr> {
    let action = match action {
      ChatAction::Typing => TgChatAction::Typing,
      ChatAction::UploadPhoto => TgChatAction::UploadPhoto,
    };

    self.bot.send_chat_action(ChatId(chat_id), action).await?;
    Ok(())
  }

  async fn answer_callback(&self, callback_id: &str) -> Result<(), BoxedErr> {
    self.bot.answer_callback_query(callback_id.to_string()).await?;
    Ok(())
  }
}
