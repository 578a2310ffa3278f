use std::sync::{atomic::Ordering, Arc};

use async_trait::async_trait;
use stash_result::{context::Context, errors::DBError};

use crate::{RecordsRepository, ReferenceDb, UserRecord};

#[async_trait()]
impl RecordsRepository for ReferenceDb {
  async fn records_upsert(&self, _ctx: Arc<Context>, record: &UserRecord) -> Result<(), DBError> {
    let mut records = self.records.lock().await;
    records.insert(record.user_id, record.clone());
    self.upserts.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }

  async fn records_find(
    &self,
    _ctx: Arc<Context>,
    user_id: i64,
  ) -> Result<Option<UserRecord>, DBError> {
    let records = self.records.lock().await;
    Ok(records.get(&user_id).cloned())
  }
}
