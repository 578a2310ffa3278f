use std::{convert::Infallible, sync::Arc};

use http_body_util::Full;
use hyper::{
  body::{Bytes, Incoming},
  header::{HeaderValue, CONTENT_TYPE},
  server::conn::http1::Builder,
  service::service_fn,
  Request, Response, StatusCode,
};
use hyper_util::rt::tokio::TokioIo;
use prometheus::{
  core::Collector, CounterVec, HistogramOpts, HistogramVec, IntCounter, Opts, Registry,
  TextEncoder,
};
use stash_config::Settings;
use stash_result::{
  errors::{BoxedErr, InternalError},
  ErrorType,
};
use tokio::{net::TcpListener, spawn};

/// Prometheus metrics collector for the bot service
#[derive(Clone, Debug)]
pub struct MetricsCollector {
  config: Arc<Settings>,
  registry: Arc<Registry>,
  pub commands_total: CounterVec,
  pub callbacks_total: CounterVec,
  pub store_total: IntCounter,
  pub store_failed: IntCounter,
  pub uploads_total: IntCounter,
  pub uploads_rejected: CounterVec,
  pub uploads_failed: IntCounter,
  pub db_operations_total: CounterVec,
  pub db_operations_failed: CounterVec,
  pub request_duration_seconds: HistogramVec,
  pub db_operation_duration_seconds: HistogramVec,
}

pub struct MetricsCollectorArgs {
  pub config: Arc<Settings>,
}

fn ie(msg: String, err: BoxedErr) -> InternalError {
  let path = "bot.server.observability".into();
  InternalError { err_type: ErrorType::InternalError, temp: false, err, msg, path }
}

fn register<C>(
  registry: &Registry,
  name: &str,
  metric: Result<C, prometheus::Error>,
) -> Result<C, InternalError>
where
  C: Collector + Clone + 'static,
{
  let metric = metric.map_err(|err| ie(format!("failed to create {name}"), Box::new(err)))?;
  registry
    .register(Box::new(metric.clone()))
    .map_err(|err| ie(format!("failed to register {name}"), Box::new(err)))?;
  Ok(metric)
}

fn plain(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
  let mut res = Response::new(Full::new(body));
  *res.status_mut() = status;
  res
}

impl MetricsCollector {
  pub fn new(args: MetricsCollectorArgs) -> Result<Self, BoxedErr> {
    let registry = Registry::new();
    let r = &registry;

    // --- Chat Metrics ---
    let commands_total = register(
      r,
      "commands_total",
      CounterVec::new(Opts::new("bot_commands_total", "Total chat commands handled"), &["command"]),
    )?;
    let callbacks_total = register(
      r,
      "callbacks_total",
      CounterVec::new(Opts::new("bot_callbacks_total", "Total inline button presses"), &["action"]),
    )?;
    let store_total = register(
      r,
      "store_total",
      IntCounter::new("bot_store_total", "Total store requests with content"),
    )?;
    let store_failed = register(
      r,
      "store_failed",
      IntCounter::new("bot_store_failed_total", "Total failed store requests"),
    )?;

    // --- Upload Metrics ---
    let uploads_total = register(
      r,
      "uploads_total",
      IntCounter::new("bot_uploads_total", "Total successful web uploads"),
    )?;
    let uploads_rejected = register(
      r,
      "uploads_rejected",
      CounterVec::new(
        Opts::new("bot_uploads_rejected_total", "Total web uploads rejected by validation"),
        &["reason"],
      ),
    )?;
    let uploads_failed = register(
      r,
      "uploads_failed",
      IntCounter::new("bot_uploads_failed_total", "Total web uploads failed by the store"),
    )?;

    // --- Database Metrics ---
    let db_operations_total = register(
      r,
      "db_operations_total",
      CounterVec::new(
        Opts::new("bot_db_operations_total", "Total database operations"),
        &["operation"],
      ),
    )?;
    let db_operations_failed = register(
      r,
      "db_operations_failed",
      CounterVec::new(
        Opts::new("bot_db_operations_failed_total", "Total failed database operations"),
        &["operation", "error"],
      ),
    )?;

    // --- Duration Histograms ---
    let request_duration_seconds = register(
      r,
      "request_duration_seconds",
      HistogramVec::new(
        HistogramOpts::new("bot_request_duration_seconds", "Request duration in seconds"),
        &["endpoint"],
      ),
    )?;
    let db_operation_duration_seconds = register(
      r,
      "db_operation_duration_seconds",
      HistogramVec::new(
        HistogramOpts::new("bot_db_operation_duration_seconds", "Database operation duration"),
        &["operation"],
      ),
    )?;

    Ok(MetricsCollector {
      registry: Arc::new(registry),
      config: args.config,
      commands_total,
      callbacks_total,
      store_total,
      store_failed,
      uploads_total,
      uploads_rejected,
      uploads_failed,
      db_operations_total,
      db_operations_failed,
      request_duration_seconds,
      db_operation_duration_seconds,
    })
  }

  /// Text exposition of everything gathered so far
  pub fn render(&self) -> String {
    TextEncoder::new().encode_to_string(&self.registry.gather()).unwrap_or_default()
  }

  /// Start HTTP server to expose metrics for Prometheus
  pub async fn run(&self) -> Result<(), BoxedErr> {
    let url = self.config.hosts.metrics.clone();

    let listener = TcpListener::bind(&url).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Bot metrics server listening on {}", addr);

    loop {
      let (socket, _) = listener.accept().await?;
      let io = TokioIo::new(socket);

      let collector = self.clone();

      spawn(async move {
        let svc = service_fn(move |req: Request<Incoming>| {
          let collector = collector.clone();

          async move {
            let res = match req.uri().path() {
              "/metrics" => {
                let mut res = plain(StatusCode::OK, Bytes::from(collector.render()));
                res.headers_mut().insert(
                  CONTENT_TYPE,
                  HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
                );
                res
              }
              "/health" => plain(StatusCode::OK, Bytes::from_static(b"OK")),
              _ => plain(StatusCode::NOT_FOUND, Bytes::from_static(b"Not Found")),
            };
            Ok::<_, Infallible>(res)
          }
        });

        if let Err(err) = Builder::new().serve_connection(io, svc).await {
          tracing::error!("Error serving metrics: {}", err);
        }
      });
    }
  }

  pub fn record_command(&self, command: &str) {
    self.commands_total.with_label_values(&[command]).inc();
  }

  pub fn record_callback(&self, action: &str) {
    self.callbacks_total.with_label_values(&[action]).inc();
  }

  pub fn record_store_success(&self) {
    self.store_total.inc();
  }

  pub fn record_store_failure(&self) {
    self.store_total.inc();
    self.store_failed.inc();
  }

  pub fn record_upload_success(&self) {
    self.uploads_total.inc();
  }

  pub fn record_upload_rejected(&self, reason: &str) {
    self.uploads_rejected.with_label_values(&[reason]).inc();
  }

  pub fn record_upload_failure(&self) {
    self.uploads_failed.inc();
  }

  pub fn record_db_operation(&self, operation: &str) {
    self.db_operations_total.with_label_values(&[operation]).inc();
  }

  pub fn record_db_error(&self, operation: &str, error: &str) {
    self.db_operations_failed.with_label_values(&[operation, error]).inc();
  }

  pub fn observe_request_duration(&self, endpoint: &str, duration_secs: f64) {
    self.request_duration_seconds.with_label_values(&[endpoint]).observe(duration_secs);
  }

  pub fn observe_db_operation_duration(&self, operation: &str, duration_secs: f64) {
    self.db_operation_duration_seconds.with_label_values(&[operation]).observe(duration_secs);
  }
}
