mod callbacks;
mod commands;
pub mod messenger;
pub mod progress;
pub mod router;
mod store;
pub mod upload;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use stash_config::Settings;

pub use callbacks::IncomingCallback;
pub use store::RecordStore;

use crate::controller::{messenger::Messenger, progress::ProgressIndicator};

pub struct BotControllerArgs {
  pub store: RecordStore,
  pub config: Arc<Settings>,
  pub messenger: Arc<dyn Messenger>,
}

/// Handles chat commands and button callbacks. Holds no per-user state.
pub struct BotController {
  pub(super) store: RecordStore,
  pub(super) config: Arc<Settings>,
  pub(super) messenger: Arc<dyn Messenger>,
  pub(super) progress: ProgressIndicator,
}

impl BotController {
  pub fn new(args: BotControllerArgs) -> BotController {
    let progress = ProgressIndicator::from_settings(&args.config.progress);

    BotController { store: args.store, config: args.config, messenger: args.messenger, progress }
  }
}
