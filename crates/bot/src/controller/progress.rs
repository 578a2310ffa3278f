use std::time::Duration;

use stash_config::Progress;
use stash_result::errors::BoxedErr;
use tokio::time::sleep;

use super::messenger::{MessageRef, Messenger};

/// Percentages shown, in order. The caller replaces the last frame with the result.
pub const PROGRESS_STEPS: [u8; 6] = [0, 20, 40, 60, 80, 100];

const BAR_CELLS: usize = 10;

pub fn render_frame(label: &str, percent: u8) -> String {
  let filled = (usize::from(percent) / 10).min(BAR_CELLS);
  format!("{}: [{}{}] {}%", label, "★".repeat(filled), "☆".repeat(BAR_CELLS - filled), percent)
}

/// Cosmetic upload animation. It knows nothing about the real store call and
/// always plays every frame.
#[derive(Debug, Clone)]
pub struct ProgressIndicator {
  label: String,
  delay: Duration,
}

impl ProgressIndicator {
  pub fn new(label: impl Into<String>, delay: Duration) -> Self {
    Self { label: label.into(), delay }
  }

  pub fn from_settings(settings: &Progress) -> Self {
    Self::new(settings.label.clone(), Duration::from_millis(settings.frame_delay_ms))
  }

  pub fn frames(&self) -> Vec<String> {
    PROGRESS_STEPS.iter().map(|pct| render_frame(&self.label, *pct)).collect()
  }

  /// Sends the first frame, then edits it in place once per remaining frame.
  pub async fn run(&self, messenger: &dyn Messenger, chat_id: i64) -> Result<MessageRef, BoxedErr> {
    let msg = messenger.send_text(chat_id, &render_frame(&self.label, PROGRESS_STEPS[0]), None).await?;

    for pct in &PROGRESS_STEPS[1..] {
      sleep(self.delay).await;
      messenger.edit_text(msg, &render_frame(&self.label, *pct), None).await?;
    }

    Ok(msg)
  }
}
