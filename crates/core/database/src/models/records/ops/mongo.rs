use std::sync::Arc;

use async_trait::async_trait;
use mongodb::{bson::doc, error::ErrorKind};
use stash_result::{context::Context, errors::DBError, ErrorType};
use tracing::debug;

use crate::{MongoDb, RecordsRepository, UserRecord};

impl MongoDb {
  fn records_error(&self, err: mongodb::error::Error, operation: &str, path: &str) -> DBError {
    let err_type = match *err.kind {
      ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => ErrorType::DBConnectionError,
      _ => ErrorType::DatabaseError {
        operation: operation.to_string(),
        collection: self.collection.clone(),
      },
    };

    let msg = format!("failed to {} record: {}", operation, err);
    DBError::new(path, Box::new(err), err_type, msg)
  }
}

#[async_trait()]
impl RecordsRepository for MongoDb {
  async fn records_upsert(&self, ctx: Arc<Context>, record: &UserRecord) -> Result<(), DBError> {
    let path = "database.records.records_upsert";

    let res = self
      .records()
      .replace_one(doc! { "user_id": record.user_id }, record)
      .upsert(true)
      .await
      .map_err(|err| self.records_error(err, "upsert", path))?;

    debug!(
      request_id = ctx.request_id(),
      user_id = record.user_id,
      matched = res.matched_count,
      upserted = res.upserted_id.is_some(),
      "record upserted"
    );
    Ok(())
  }

  async fn records_find(
    &self,
    _ctx: Arc<Context>,
    user_id: i64,
  ) -> Result<Option<UserRecord>, DBError> {
    let path = "database.records.records_find";

    self
      .records()
      .find_one(doc! { "user_id": user_id })
      .await
      .map_err(|err| self.records_error(err, "find", path))
  }
}
