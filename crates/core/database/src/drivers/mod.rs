use std::future::Future;
use std::pin::Pin;

pub use self::reference::*;

mod reference;

#[cfg(feature = "mongodb")]
pub use self::mongo::*;
#[cfg(feature = "mongodb")]
mod mongo;

#[cfg(feature = "mongodb")]
use stash_config::config;
use stash_result::{errors::DBError, ErrorType};
#[cfg(feature = "mongodb")]
use tracing::warn;

/// Database information to use to create a client
pub enum DatabaseInfo {
  /// Auto-detect the database in use
  Auto,
  /// Auto-detect the database in use and create an empty testing database
  Test(String),
  /// Use the mock database
  Reference,
  /// Connect to MongoDB
  #[cfg(feature = "mongodb")]
  MongoDb { uri: String, db_name: String, collection: String },
}

/// Database
#[derive(Debug)]
pub enum Database {
  /// Mock database
  Reference(ReferenceDb),
  /// MongoDB database
  #[cfg(feature = "mongodb")]
  MongoDb(MongoDb),
}

// Generic helper type alias and function
type BoxedFuture<T> = Pin<Box<dyn Future<Output = Result<T, DBError>>>>;

fn boxed<T>(f: impl Future<Output = Result<T, DBError>> + 'static) -> BoxedFuture<T> {
  Box::pin(f)
}

fn connection_error(msg: impl Into<String>) -> DBError {
  let msg = msg.into();
  DBError {
    err_type: ErrorType::DBConnectionError,
    err: Box::new(std::io::Error::new(std::io::ErrorKind::NotConnected, msg.clone())),
    msg,
    path: "database.drivers.connect".to_string(),
  }
}

impl DatabaseInfo {
  /// MongoDB when a URI is configured, in-memory otherwise
  #[cfg(feature = "mongodb")]
  pub fn from_settings(settings: &stash_config::Database) -> DatabaseInfo {
    if settings.mongodb.trim().is_empty() {
      warn!("no MongoDB URI configured, records are kept in memory");
      return DatabaseInfo::Reference;
    }

    DatabaseInfo::MongoDb {
      uri: settings.mongodb.clone(),
      db_name: settings.db_name.clone(),
      collection: settings.collection.clone(),
    }
  }

  /// Create a database client from the given database information
  pub async fn connect(self) -> Result<Database, DBError> {
    match self {
      DatabaseInfo::Auto => {
        if std::env::var("TEST_DB").is_ok() {
          return boxed(DatabaseInfo::Test("stash_test".to_string()).connect()).await;
        }

        #[cfg(feature = "mongodb")]
        {
          let config = config().await.map_err(|err| connection_error(err.to_string()))?;
          boxed(DatabaseInfo::from_settings(&config.database).connect()).await
        }

        #[cfg(not(feature = "mongodb"))]
        {
          boxed(DatabaseInfo::Reference.connect()).await
        }
      }
      #[cfg_attr(not(feature = "mongodb"), allow(unused_variables))]
      DatabaseInfo::Test(database_name) => {
        let test_db = std::env::var("TEST_DB").unwrap_or_else(|_| "REFERENCE".to_string());

        match test_db.as_str() {
          "REFERENCE" => boxed(DatabaseInfo::Reference.connect()).await,
          #[cfg(feature = "mongodb")]
          "MONGODB" => {
            let config = config().await.map_err(|err| connection_error(err.to_string()))?;
            boxed(
              DatabaseInfo::MongoDb {
                uri: config.database.mongodb,
                db_name: database_name,
                collection: config.database.collection,
              }
              .connect(),
            )
            .await
          }
          other => Err(connection_error(format!(
            "`TEST_DB` must be REFERENCE or MONGODB, got `{}`",
            other
          ))),
        }
      }
      #[cfg(feature = "mongodb")]
      DatabaseInfo::MongoDb { uri, db_name, collection } => {
        Ok(Database::MongoDb(MongoDb::connect(&uri, db_name, collection).await?))
      }
      DatabaseInfo::Reference => Ok(Database::Reference(Default::default())),
    }
  }
}
