use std::{sync::Arc, time::Instant};

use stash_database::{RecordsRepository, UserRecord};
use stash_result::{context::Context, errors::DBError};
use tracing::{error, info};

use crate::server::observability::MetricsCollector;

/// The persistence handle shared by both entry points. Wraps the repository
/// with timing and failure metrics.
#[derive(Clone)]
pub struct RecordStore {
  db: Arc<dyn RecordsRepository>,
  metrics: Arc<MetricsCollector>,
}

impl RecordStore {
  pub fn new(db: Arc<dyn RecordsRepository>, metrics: Arc<MetricsCollector>) -> Self {
    Self { db, metrics }
  }

  pub fn metrics(&self) -> &MetricsCollector {
    &self.metrics
  }

  pub async fn upsert(&self, ctx: Arc<Context>, record: &UserRecord) -> Result<(), DBError> {
    let operation = "records_upsert";
    let start = Instant::now();
    self.metrics.record_db_operation(operation);

    let res = self.db.records_upsert(ctx.clone(), record).await;
    self.metrics.observe_db_operation_duration(operation, start.elapsed().as_secs_f64());

    match &res {
      Ok(()) => info!(
        request_id = ctx.request_id(),
        source = %ctx.source,
        path = %ctx.path,
        user_id = record.user_id,
        content_type = %record.r#type,
        "record stored"
      ),
      Err(err) => {
        self.metrics.record_db_error(operation, &err.err_type.to_string());
        error!(
          request_id = ctx.request_id(),
          path = %ctx.path,
          user_id = record.user_id,
          "{}",
          err
        );
      }
    }
    res
  }

  pub async fn find(&self, ctx: Arc<Context>, user_id: i64) -> Result<Option<UserRecord>, DBError> {
    let operation = "records_find";
    let start = Instant::now();
    self.metrics.record_db_operation(operation);

    let res = self.db.records_find(ctx.clone(), user_id).await;
    self.metrics.observe_db_operation_duration(operation, start.elapsed().as_secs_f64());

    if let Err(err) = &res {
      self.metrics.record_db_error(operation, &err.err_type.to_string());
      error!(request_id = ctx.request_id(), path = %ctx.path, user_id, "{}", err);
    }
    res
  }
}
