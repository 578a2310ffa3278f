use std::{sync::Arc, time::Instant};

use stash_database::{ContentType, UserRecord};
use stash_result::{
  context::{Context, Source},
  errors::BoxedErr,
};
use tracing::{debug, info, instrument};

use super::{messenger::ChatAction, BotController};
use crate::models::{
  commands::{parse_command, resolve_store_content, Command, IncomingMessage},
  replies::{self, Control},
};

impl BotController {
  /// Entry point for every text message. Anything that is not one of our
  /// commands is ignored.
  pub async fn handle_message(&self, msg: IncomingMessage) -> Result<(), BoxedErr> {
    let Some((command, args)) = parse_command(&msg.text, &self.config.bot.username) else {
      debug!(chat_id = msg.chat_id, "ignoring non-command message");
      return Ok(());
    };

    let start = Instant::now();
    let metrics = self.store.metrics();
    metrics.record_command(command.as_str());

    let res = match command {
      Command::Start => self.start(&msg).await,
      Command::Store => self.store(&msg, args).await,
      Command::Get => self.get(&msg).await,
    };

    metrics.observe_request_duration(command.as_str(), start.elapsed().as_secs_f64());
    res
  }

  pub async fn start(&self, msg: &IncomingMessage) -> Result<(), BoxedErr> {
    self.messenger.send_text(msg.chat_id, replies::WELCOME, None).await?;
    Ok(())
  }

  #[instrument(skip(self, msg, args), fields(user_id = msg.user_id, chat_id = msg.chat_id))]
  pub async fn store(&self, msg: &IncomingMessage, args: &str) -> Result<(), BoxedErr> {
    let ctx = Arc::new(Context::new(Source::Chat, "/store"));
    self.messenger.send_action(msg.chat_id, ChatAction::Typing).await?;

    let Some((r#type, content)) = resolve_store_content(args, &msg.reply_photos) else {
      info!(request_id = ctx.request_id(), "nothing to store");
      self.messenger.send_text(msg.chat_id, replies::STORE_PROMPT, None).await?;
      return Ok(());
    };

    let record = UserRecord::new(msg.user_id, r#type, content);

    // the animation is decoration only, the final edit waits for both
    let (progress, stored) = tokio::join!(
      self.progress.run(self.messenger.as_ref(), msg.chat_id),
      self.store.upsert(ctx.clone(), &record),
    );
    let progress_msg = progress?;

    let metrics = self.store.metrics();
    if let Err(err) = stored {
      metrics.record_store_failure();
      self.messenger.edit_text(progress_msg, replies::STORE_FAILED, None).await?;
      return Err(Box::new(err));
    }

    metrics.record_store_success();
    self
      .messenger
      .edit_text(progress_msg, replies::STORE_SUCCESS, Some(Control::confirm_store()))
      .await?;
    Ok(())
  }

  #[instrument(skip(self, msg), fields(user_id = msg.user_id, chat_id = msg.chat_id))]
  pub async fn get(&self, msg: &IncomingMessage) -> Result<(), BoxedErr> {
    let ctx = Arc::new(Context::new(Source::Chat, "/get"));

    let Some(record) = self.store.find(ctx, msg.user_id).await? else {
      self.messenger.send_text(msg.chat_id, replies::NOTHING_STORED, None).await?;
      return Ok(());
    };

    match record.r#type {
      ContentType::Text => {
        self.messenger.send_action(msg.chat_id, ChatAction::Typing).await?;
        let text = replies::saved_text(&record.content);
        self.messenger.send_text(msg.chat_id, &text, Some(Control::back())).await?;
      }
      ContentType::Photo => {
        self.messenger.send_action(msg.chat_id, ChatAction::UploadPhoto).await?;
        self
          .messenger
          .send_photo(
            msg.chat_id,
            &record.content,
            replies::SAVED_IMAGE_CAPTION,
            Some(Control::back()),
          )
          .await?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use stash_database::{RecordsRepository, ReferenceDb};

  use super::*;
  use crate::{
    controller::testing::{controller, DownRepository, RecordingMessenger, Sent, SlowRepository},
    models::commands::PhotoRef,
  };

  const CHAT: i64 = 500;
  const USER: i64 = 42;

  fn message(text: &str) -> IncomingMessage {
    IncomingMessage { chat_id: CHAT, user_id: USER, text: text.to_string(), reply_photos: vec![] }
  }

  fn setup() -> (Arc<ReferenceDb>, Arc<RecordingMessenger>, BotController) {
    let db = Arc::new(ReferenceDb::default());
    let messenger = Arc::new(RecordingMessenger::default());
    let ctr = controller(db.clone(), messenger.clone());
    (db, messenger, ctr)
  }

  fn texts(sent: &[Sent]) -> Vec<String> {
    sent
      .iter()
      .filter_map(|s| match s {
        Sent::Text { text, .. } | Sent::Edit { text, .. } => Some(text.clone()),
        _ => None,
      })
      .collect()
  }

  #[tokio::test]
  async fn test_start_sends_welcome_without_store_access() {
    let (db, messenger, ctr) = setup();
    ctr.handle_message(message("/start")).await.unwrap();

    assert_eq!(
      messenger.sent(),
      vec![Sent::Text {
        chat_id: CHAT,
        message_id: 1,
        text: replies::WELCOME.to_string(),
        control: None
      }]
    );
    assert_eq!(db.upsert_count(), 0);
  }

  #[tokio::test]
  async fn test_non_commands_are_ignored() {
    let (_db, messenger, ctr) = setup();
    ctr.handle_message(message("just chatting")).await.unwrap();
    ctr.handle_message(message("/get@someone_else")).await.unwrap();
    assert!(messenger.sent().is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_store_text_plays_progress_then_confirms() {
    let (db, messenger, ctr) = setup();
    ctr.handle_message(message("/store  buy milk ")).await.unwrap();

    let record = db.records_find(Arc::new(Context::default()), USER).await.unwrap();
    assert_eq!(record, Some(UserRecord::text(USER, "buy milk")));

    let sent = messenger.sent();
    assert_eq!(sent[0], Sent::Action { chat_id: CHAT, action: ChatAction::Typing });

    let shown = texts(&sent);
    let mut expected = ctr.progress.frames();
    expected.push(replies::STORE_SUCCESS.to_string());
    assert_eq!(shown, expected);

    match sent.last().unwrap() {
      Sent::Edit { message, control, .. } => {
        assert_eq!(message.message_id, 1);
        assert_eq!(control, &Some(Control::confirm_store()));
      }
      other => panic!("expected final edit, got {:?}", other),
    }
  }

  #[tokio::test(start_paused = true)]
  async fn test_store_reply_to_photo_uses_largest_size() {
    let (db, _messenger, ctr) = setup();
    let mut msg = message("/store");
    msg.reply_photos = vec![
      PhotoRef { file_id: "thumb".into(), width: 90, height: 90 },
      PhotoRef { file_id: "full".into(), width: 1280, height: 1280 },
    ];

    ctr.handle_message(msg).await.unwrap();

    let record = db.records_find(Arc::new(Context::default()), USER).await.unwrap();
    assert_eq!(record, Some(UserRecord::photo(USER, "full")));
  }

  #[tokio::test]
  async fn test_store_whitespace_only_writes_nothing() {
    let (db, messenger, ctr) = setup();
    db.records_upsert(Arc::new(Context::default()), &UserRecord::text(USER, "keep me"))
      .await
      .unwrap();

    ctr.handle_message(message("/store")).await.unwrap();
    ctr.handle_message(message("/store   \n\t ")).await.unwrap();

    assert_eq!(db.upsert_count(), 1);
    let record = db.records_find(Arc::new(Context::default()), USER).await.unwrap();
    assert_eq!(record, Some(UserRecord::text(USER, "keep me")));
    assert_eq!(texts(&messenger.sent()), vec![replies::STORE_PROMPT, replies::STORE_PROMPT]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_progress_frames_do_not_depend_on_store_latency() {
    for delay in [Duration::ZERO, Duration::from_secs(30)] {
      let inner = Arc::new(ReferenceDb::default());
      let slow = Arc::new(SlowRepository { inner: inner.clone(), delay });
      let messenger = Arc::new(RecordingMessenger::default());
      let ctr = controller(slow, messenger.clone());

      ctr.handle_message(message("/store note")).await.unwrap();

      let mut expected = ctr.progress.frames();
      expected.push(replies::STORE_SUCCESS.to_string());
      assert_eq!(texts(&messenger.sent()), expected);
      assert_eq!(inner.upsert_count(), 1);
    }
  }

  #[tokio::test(start_paused = true)]
  async fn test_store_failure_is_reported_and_propagated() {
    let messenger = Arc::new(RecordingMessenger::default());
    let ctr = controller(Arc::new(DownRepository), messenger.clone());

    let res = ctr.handle_message(message("/store note")).await;
    assert!(res.is_err());

    let shown = texts(&messenger.sent());
    assert_eq!(shown.len(), 7);
    assert_eq!(shown.last().unwrap(), replies::STORE_FAILED);
  }

  #[tokio::test]
  async fn test_chat_api_failure_propagates() {
    let db = Arc::new(ReferenceDb::default());
    let ctr = controller(db, Arc::new(RecordingMessenger::failing()));
    assert!(ctr.handle_message(message("/start")).await.is_err());
  }

  #[tokio::test]
  async fn test_get_without_record() {
    let (db, messenger, ctr) = setup();
    ctr.handle_message(message("/get")).await.unwrap();

    assert_eq!(texts(&messenger.sent()), vec![replies::NOTHING_STORED]);
    assert_eq!(db.upsert_count(), 0);
    assert!(db.records.lock().await.is_empty());
  }

  #[tokio::test]
  async fn test_get_text_record() {
    let (db, messenger, ctr) = setup();
    db.records_upsert(Arc::new(Context::default()), &UserRecord::text(USER, "hi"))
      .await
      .unwrap();

    ctr.handle_message(message("/get")).await.unwrap();

    assert_eq!(
      messenger.sent(),
      vec![
        Sent::Action { chat_id: CHAT, action: ChatAction::Typing },
        Sent::Text {
          chat_id: CHAT,
          message_id: 1,
          text: "Your saved text:\nhi".to_string(),
          control: Some(Control::back()),
        },
      ]
    );
  }

  #[tokio::test]
  async fn test_get_photo_record() {
    let (db, messenger, ctr) = setup();
    db.records_upsert(Arc::new(Context::default()), &UserRecord::photo(USER, "file-1"))
      .await
      .unwrap();

    ctr.handle_message(message("/get")).await.unwrap();

    assert_eq!(
      messenger.sent(),
      vec![
        Sent::Action { chat_id: CHAT, action: ChatAction::UploadPhoto },
        Sent::Photo {
          chat_id: CHAT,
          file_id: "file-1".to_string(),
          caption: replies::SAVED_IMAGE_CAPTION.to_string(),
          control: Some(Control::back()),
        },
      ]
    );
  }

  #[tokio::test]
  async fn test_get_only_sees_own_record() {
    let (db, messenger, ctr) = setup();
    db.records_upsert(Arc::new(Context::default()), &UserRecord::text(USER + 1, "not yours"))
      .await
      .unwrap();

    ctr.handle_message(message("/get")).await.unwrap();
    assert_eq!(texts(&messenger.sent()), vec![replies::NOTHING_STORED]);
  }
}
