use std::sync::Arc;

use stash_result::errors::BoxedErr;
use teloxide::{
  dispatching::{Dispatcher, UpdateFilterExt},
  dptree,
  error_handlers::LoggingErrorHandler,
  prelude::*,
  types::{CallbackQuery, MaybeInaccessibleMessage, Message, PhotoSize, Update},
};
use tracing::{debug, info};

use super::{messenger::MessageRef, BotController, IncomingCallback};
use crate::models::commands::{IncomingMessage, PhotoRef};

type HandlerResult = Result<(), BoxedErr>;

fn photo_ref(size: &PhotoSize) -> PhotoRef {
  PhotoRef { file_id: size.file.id.to_string(), width: size.width, height: size.height }
}

/// `None` for messages that carry no text or have no identifiable sender
pub fn incoming_message(msg: &Message) -> Option<IncomingMessage> {
  let text = msg.text()?;
  let user = msg.from.as_ref()?;
  let user_id = i64::try_from(user.id.0).ok()?;

  let reply_photos = msg
    .reply_to_message()
    .and_then(|reply| reply.photo())
    .map(|sizes| sizes.iter().map(photo_ref).collect())
    .unwrap_or_default();

  Some(IncomingMessage { chat_id: msg.chat.id.0, user_id, text: text.to_string(), reply_photos })
}

pub fn incoming_callback(q: &CallbackQuery) -> Option<IncomingCallback> {
  let user_id = i64::try_from(q.from.id.0).ok()?;
  let message = match &q.message {
    Some(MaybeInaccessibleMessage::Regular(m)) => {
      Some(MessageRef { chat_id: m.chat.id.0, message_id: m.id.0 })
    }
    Some(MaybeInaccessibleMessage::Inaccessible(_)) | None => None,
  };

  Some(IncomingCallback { id: q.id.to_string(), user_id, data: q.data.clone(), message })
}

async fn on_message(ctr: Arc<BotController>, msg: Message) -> HandlerResult {
  match incoming_message(&msg) {
    Some(incoming) => ctr.handle_message(incoming).await,
    None => {
      debug!(chat_id = msg.chat.id.0, "skipping message without text or sender");
      Ok(())
    }
  }
}

async fn on_callback(ctr: Arc<BotController>, q: CallbackQuery) -> HandlerResult {
  match incoming_callback(&q) {
    Some(incoming) => ctr.handle_callback(incoming).await,
    None => Ok(()),
  }
}

/// Runs the long-polling update loop until Ctrl+C.
pub async fn dispatch(bot: Bot, ctr: Arc<BotController>) {
  let handler = dptree::entry()
    .branch(Update::filter_message().endpoint(on_message))
    .branch(Update::filter_callback_query().endpoint(on_callback));

  info!("the bot is polling for updates");

  Dispatcher::builder(bot, handler)
    .dependencies(dptree::deps![ctr])
    .error_handler(LoggingErrorHandler::with_custom_text("An error from the update handler"))
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

#[cfg(test)]
mod tests {
  use serde_json::{json, Value};

  use super::*;

  fn user() -> Value {
    json!({ "id": 42, "is_bot": false, "first_name": "Ann" })
  }

  fn chat() -> Value {
    json!({ "id": 500, "type": "private", "first_name": "Ann" })
  }

  fn message(id: i32, extra: Value) -> Value {
    let mut msg = json!({ "message_id": id, "date": 1700000000, "chat": chat(), "from": user() });
    if let (Some(msg), Some(extra)) = (msg.as_object_mut(), extra.as_object()) {
      msg.extend(extra.clone());
    }
    msg
  }

  fn photo_size(file_id: &str, width: u32, height: u32) -> Value {
    json!({
      "file_id": file_id,
      "file_unique_id": format!("u-{file_id}"),
      "file_size": 1000,
      "width": width,
      "height": height,
    })
  }

  #[test]
  fn test_text_message() {
    let msg: Message = serde_json::from_value(message(10, json!({ "text": "/get" }))).unwrap();

    let incoming = incoming_message(&msg).unwrap();
    assert_eq!(incoming.chat_id, 500);
    assert_eq!(incoming.user_id, 42);
    assert_eq!(incoming.text, "/get");
    assert!(incoming.reply_photos.is_empty());
  }

  #[test]
  fn test_reply_to_photo_keeps_every_size() {
    let original = message(
      9,
      json!({ "photo": [photo_size("small", 90, 60), photo_size("large", 1280, 853)] }),
    );
    let msg: Message = serde_json::from_value(message(
      10,
      json!({ "text": "/store", "reply_to_message": original }),
    ))
    .unwrap();

    let incoming = incoming_message(&msg).unwrap();
    assert_eq!(incoming.reply_photos, vec![
      PhotoRef { file_id: "small".to_string(), width: 90, height: 60 },
      PhotoRef { file_id: "large".to_string(), width: 1280, height: 853 },
    ]);
  }

  #[test]
  fn test_message_without_text_is_skipped() {
    let msg: Message =
      serde_json::from_value(message(11, json!({ "photo": [photo_size("p", 10, 10)] }))).unwrap();
    assert_eq!(incoming_message(&msg), None);
  }

  #[test]
  fn test_callback_on_regular_message() {
    let q: CallbackQuery = serde_json::from_value(json!({
      "id": "cb-1",
      "from": user(),
      "chat_instance": "ci",
      "data": "confirm_store",
      "message": message(12, json!({ "text": "Content stored successfully!" })),
    }))
    .unwrap();

    assert_eq!(incoming_callback(&q), Some(IncomingCallback {
      id: "cb-1".to_string(),
      user_id: 42,
      data: Some("confirm_store".to_string()),
      message: Some(MessageRef { chat_id: 500, message_id: 12 }),
    }));
  }

  #[test]
  fn test_callback_on_inaccessible_message() {
    let q: CallbackQuery = serde_json::from_value(json!({
      "id": "cb-2",
      "from": user(),
      "chat_instance": "ci",
      "data": "back",
      "message": { "chat": chat(), "message_id": 3, "date": 0 },
    }))
    .unwrap();

    let incoming = incoming_callback(&q).unwrap();
    assert_eq!(incoming.data.as_deref(), Some("back"));
    assert_eq!(incoming.message, None);
  }
}
