use std::{
  sync::{
    atomic::{AtomicI32, Ordering},
    Arc, Mutex,
  },
  time::Duration,
};

use async_trait::async_trait;
use stash_config::Settings;
use stash_database::{RecordsRepository, ReferenceDb, UserRecord};
use stash_result::{
  context::Context,
  errors::{BoxedErr, DBError},
  ErrorType,
};
use tokio::time::sleep;

use super::{
  messenger::{ChatAction, MessageRef, Messenger},
  BotController, BotControllerArgs, RecordStore,
};
use crate::{
  models::replies::Control,
  server::observability::{MetricsCollector, MetricsCollectorArgs},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
  Text { chat_id: i64, message_id: i32, text: String, control: Option<Control> },
  Edit { message: MessageRef, text: String, control: Option<Control> },
  Photo { chat_id: i64, file_id: String, caption: String, control: Option<Control> },
  Action { chat_id: i64, action: ChatAction },
  Answer { callback_id: String },
}

/// Keeps every outbound call in order instead of talking to a chat platform.
#[derive(Default)]
pub struct RecordingMessenger {
  sent: Mutex<Vec<Sent>>,
  next_id: AtomicI32,
  fail_sends: bool,
}

impl RecordingMessenger {
  pub fn failing() -> Self {
    Self { fail_sends: true, ..Default::default() }
  }

  pub fn sent(&self) -> Vec<Sent> {
    self.sent.lock().unwrap().clone()
  }

  fn push(&self, entry: Sent) {
    self.sent.lock().unwrap().push(entry);
  }

  fn next_id(&self) -> i32 {
    self.next_id.fetch_add(1, Ordering::SeqCst) + 1
  }
}

#[async_trait]
impl Messenger for RecordingMessenger {
  async fn send_text(
    &self,
    chat_id: i64,
    text: &str,
    control: Option<Control>,
  ) -> Result<MessageRef, BoxedErr> {
    if self.fail_sends {
      return Err("chat api unavailable".into());
    }
    let message_id = self.next_id();
    self.push(Sent::Text { chat_id, message_id, text: text.to_string(), control });
    Ok(MessageRef { chat_id, message_id })
  }

  async fn edit_text(
    &self,
    message: MessageRef,
    text: &str,
    control: Option<Control>,
  ) -> Result<(), BoxedErr> {
    self.push(Sent::Edit { message, text: text.to_string(), control });
    Ok(())
  }

  async fn send_photo(
    &self,
    chat_id: i64,
    file_id: &str,
    caption: &str,
    control: Option<Control>,
  ) -> Result<MessageRef, BoxedErr> {
    let message_id = self.next_id();
    self.push(Sent::Photo {
      chat_id,
      file_id: file_id.to_string(),
      caption: caption.to_string(),
      control,
    });
    Ok(MessageRef { chat_id, message_id })
  }

  async fn send_action(&self, chat_id: i64, action: ChatAction) -> Result<(), BoxedErr> {
    self.push(Sent::Action { chat_id, action });
    Ok(())
  }

  async fn answer_callback(&self, callback_id: &str) -> Result<(), BoxedErr> {
    self.push(Sent::Answer { callback_id: callback_id.to_string() });
    Ok(())
  }
}

/// Reference store that takes `delay` to answer every call.
pub struct SlowRepository {
  pub inner: Arc<ReferenceDb>,
  pub delay: Duration,
}

#[async_trait]
impl RecordsRepository for SlowRepository {
  async fn records_upsert(&self, ctx: Arc<Context>, record: &UserRecord) -> Result<(), DBError> {
    sleep(self.delay).await;
    self.inner.records_upsert(ctx, record).await
  }

  async fn records_find(
    &self,
    ctx: Arc<Context>,
    user_id: i64,
  ) -> Result<Option<UserRecord>, DBError> {
    sleep(self.delay).await;
    self.inner.records_find(ctx, user_id).await
  }
}

/// Store that is always unreachable.
pub struct DownRepository;

#[async_trait]
impl RecordsRepository for DownRepository {
  async fn records_upsert(&self, _ctx: Arc<Context>, _record: &UserRecord) -> Result<(), DBError> {
    Err(DBError { err_type: ErrorType::DBConnectionError, ..Default::default() })
  }

  async fn records_find(
    &self,
    _ctx: Arc<Context>,
    _user_id: i64,
  ) -> Result<Option<UserRecord>, DBError> {
    Err(DBError { err_type: ErrorType::DBConnectionError, ..Default::default() })
  }
}

pub fn metrics() -> Arc<MetricsCollector> {
  let config = Arc::new(Settings::default());
  Arc::new(MetricsCollector::new(MetricsCollectorArgs { config }).unwrap())
}

pub fn controller(
  db: Arc<dyn RecordsRepository>,
  messenger: Arc<RecordingMessenger>,
) -> BotController {
  let mut settings = Settings::default();
  settings.bot.username = "stash_bot".to_string();

  BotController::new(BotControllerArgs {
    store: RecordStore::new(db, metrics()),
    config: Arc::new(settings),
    messenger,
  })
}
