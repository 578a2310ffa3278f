use stash_result::errors::BoxedErr;
use tracing::{instrument, warn};

use super::{messenger::MessageRef, BotController};
use crate::models::replies::CallbackAction;

/// A button press, reduced to what the handler needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
  pub id: String,
  pub user_id: i64,
  pub data: Option<String>,
  /// `None` when the platform no longer exposes the originating message
  pub message: Option<MessageRef>,
}

impl BotController {
  #[instrument(skip(self, cb), fields(user_id = cb.user_id, data = cb.data.as_deref().unwrap_or("")))]
  pub async fn handle_callback(&self, cb: IncomingCallback) -> Result<(), BoxedErr> {
    // stops the client side spinner whatever the outcome
    self.messenger.answer_callback(&cb.id).await?;

    let Some(action) = cb.data.as_deref().and_then(CallbackAction::parse) else {
      warn!("unknown callback data, ignoring");
      return Ok(());
    };

    let Some(message) = cb.message else {
      warn!("callback without an accessible message, ignoring");
      return Ok(());
    };

    self.store.metrics().record_callback(action.as_str());
    self.messenger.edit_text(message, action.reply_text(), None).await?;
    Ok(())
  }
}
