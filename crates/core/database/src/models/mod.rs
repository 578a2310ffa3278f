mod records;

use std::sync::Arc;

use async_trait::async_trait;
pub use records::*;
use stash_result::{context::Context, errors::DBError};

#[cfg(feature = "mongodb")]
use crate::MongoDb;
use crate::{Database, ReferenceDb};

pub trait AbstractDatabase: Sync + Send + RecordsRepository {}

impl AbstractDatabase for ReferenceDb {}

#[cfg(feature = "mongodb")]
impl AbstractDatabase for MongoDb {}

impl std::ops::Deref for Database {
  type Target = dyn AbstractDatabase;

  fn deref(&self) -> &Self::Target {
    match self {
      Database::Reference(dummy) => dummy,
      #[cfg(feature = "mongodb")]
      Database::MongoDb(mongo) => mongo,
    }
  }
}

/// Lets handlers depend on `Arc<dyn RecordsRepository>` while holding a [`Database`].
#[async_trait]
impl RecordsRepository for Database {
  async fn records_upsert(&self, ctx: Arc<Context>, record: &UserRecord) -> Result<(), DBError> {
    (**self).records_upsert(ctx, record).await
  }

  async fn records_find(
    &self,
    ctx: Arc<Context>,
    user_id: i64,
  ) -> Result<Option<UserRecord>, DBError> {
    (**self).records_find(ctx, user_id).await
  }
}
