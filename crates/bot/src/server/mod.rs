use std::{io::ErrorKind, sync::Arc};

use stash_config::{config, Settings};
use stash_database::{Database, DatabaseInfo};
use stash_result::{
  errors::{BoxedErr, SimpleError},
  ErrorType,
};
use teloxide::Bot;
use tokio::spawn;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use crate::{
  controller::{
    messenger::TelegramMessenger,
    router,
    upload::{UploadController, UploadControllerArgs},
    BotController, BotControllerArgs, RecordStore,
  },
  server::observability::{MetricsCollector, MetricsCollectorArgs},
};

pub mod observability;

pub struct BotServer {
  pub(super) db: Arc<Database>,
  pub(super) config: Arc<Settings>,
  pub(super) metrics: Arc<MetricsCollector>,
  token: String,
}

impl BotServer {
  pub async fn new() -> Result<BotServer, BoxedErr> {
    let se = |err: BoxedErr, typ: ErrorType, msg: &str| SimpleError {
      err,
      err_type: typ,
      message: msg.to_string(),
    };

    BotServer::setup_logging();
    let config =
      config().await.map_err(|err| se(Box::new(err), ErrorType::ConfigError, "invalid config"))?;
    config.preflight_checks();

    let token = config
      .bot_token()
      .map_err(|err| se(Box::new(err), ErrorType::ConfigError, "missing bot token"))?;

    let metrics = MetricsCollector::new(MetricsCollectorArgs { config: Arc::new(config.clone()) })?;

    let db = DatabaseInfo::Auto.connect().await.map_err(|err| {
      se(
        Box::new(std::io::Error::new(ErrorKind::NotConnected, err)),
        ErrorType::Connection,
        "failed to connect to the record store",
      )
    })?;
    info!("connected to the record store");

    let server = BotServer {
      db: Arc::new(db),
      config: Arc::new(config),
      metrics: Arc::new(metrics),
      token,
    };

    Ok(server)
  }

  /// Run the metrics and upload servers in the background and block on the bot
  pub async fn run(&self) -> Result<(), BoxedErr> {
    #[cfg(feature = "sentry")]
    stash_config::configure!(self.config, bot);

    let store = RecordStore::new(self.db.clone(), self.metrics.clone());

    let metrics_clone = self.metrics.clone();
    spawn(async move {
      if let Err(e) = metrics_clone.run().await {
        error!("Metrics server failed: {:?}", e);
      }
    });

    let upload = Arc::new(UploadController::new(UploadControllerArgs {
      store: store.clone(),
      config: self.config.clone(),
    })?);
    spawn(async move {
      if let Err(e) = upload.run().await {
        error!("Upload server failed: {:?}", e);
      }
    });

    let bot = Bot::new(self.token.clone());
    let controller = BotController::new(BotControllerArgs {
      store,
      config: self.config.clone(),
      messenger: Arc::new(TelegramMessenger::new(bot.clone())),
    });

    router::dispatch(bot, Arc::new(controller)).await; // this will block

    Ok(())
  }

  fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber =
      tracing_subscriber::registry().with(env_filter).with(tracing_subscriber::fmt::layer());
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
      eprintln!("failed to set tracing subscriber: {err}");
    }
  }
}
