use std::ops::Deref;

use mongodb::{
  bson::doc,
  options::IndexOptions,
  Client, Collection, IndexModel,
};
use stash_result::{errors::DBError, ErrorType};
use tracing::info;

use crate::UserRecord;

/// MongoDB implementation
#[derive(Debug)]
pub struct MongoDb {
  pub client: Client,
  pub db_name: String,
  pub collection: String,
}

impl Deref for MongoDb {
  type Target = Client;

  fn deref(&self) -> &Self::Target {
    &self.client
  }
}

impl MongoDb {
  pub async fn connect(uri: &str, db_name: String, collection: String) -> Result<Self, DBError> {
    let path = "database.drivers.mongo.connect";
    let err = |err: mongodb::error::Error, msg: &str| {
      DBError::new(path, Box::new(err), ErrorType::DBConnectionError, msg)
    };

    let client =
      Client::with_uri_str(uri).await.map_err(|e| err(e, "Failed to connect to MongoDB"))?;

    client
      .database(&db_name)
      .run_command(doc! { "ping": 1 })
      .await
      .map_err(|e| err(e, "Failed to verify MongoDB connection"))?;

    let db = MongoDb { client, db_name, collection };
    db.ensure_indexes().await?;

    info!("connected to MongoDB database `{}`", db.db_name);
    Ok(db)
  }

  pub fn records(&self) -> Collection<UserRecord> {
    self.client.database(&self.db_name).collection(&self.collection)
  }

  /// One document per user, enforced by the store as well
  async fn ensure_indexes(&self) -> Result<(), DBError> {
    let index = IndexModel::builder()
      .keys(doc! { "user_id": 1 })
      .options(IndexOptions::builder().unique(true).name("user_id_unique".to_string()).build())
      .build();

    self.records().create_index(index).await.map(|_| ()).map_err(|err| {
      DBError::new(
        "database.drivers.mongo.ensure_indexes",
        Box::new(err),
        ErrorType::DatabaseError {
          operation: "create_index".to_string(),
          collection: self.collection.clone(),
        },
        "failed to create the user_id index",
      )
    })
  }
}
