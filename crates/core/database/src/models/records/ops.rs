mod reference;

#[cfg(feature = "mongodb")]
mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use stash_result::{context::Context, errors::DBError};

use crate::UserRecord;

#[async_trait]
pub trait RecordsRepository: Sync + Send {
  /// Insert the record, or replace the one already stored for `record.user_id`
  async fn records_upsert(&self, ctx: Arc<Context>, record: &UserRecord) -> Result<(), DBError>;
  /// `Ok(None)` when the user never stored anything
  async fn records_find(
    &self,
    ctx: Arc<Context>,
    user_id: i64,
  ) -> Result<Option<UserRecord>, DBError>;
}
