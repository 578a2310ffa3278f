use std::{convert::Infallible, sync::Arc, time::Instant};

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::{
  body::{Body, Bytes, Incoming},
  header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE},
  server::conn::http1::Builder,
  service::service_fn,
  Method, Request, Response, StatusCode,
};
use hyper_util::rt::tokio::TokioIo;
use serde::Serialize;
use stash_config::Settings;
use stash_database::ContentType;
use stash_result::{
  context::{Context, Source},
  errors::{BoxedErr, InternalError},
  network::{ErrorResponse, StatusResponse, CONTENT_TYPE_HTML, CONTENT_TYPE_JSON},
  ErrorType,
};
use tera::Tera;
use tokio::{net::TcpListener, spawn};
use tracing::{error, info, warn};

use super::RecordStore;
use crate::models::upload::{upload_parse, upload_validate, UploadError};

pub struct UploadControllerArgs {
  pub store: RecordStore,
  pub config: Arc<Settings>,
}

/// The web form entry point. Shares nothing with the chat side except the store.
pub struct UploadController {
  store: RecordStore,
  config: Arc<Settings>,
  form: Bytes,
}

fn respond(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
  let mut res = Response::new(Full::new(body));
  *res.status_mut() = status;
  res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
  res
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
  let body = serde_json::to_vec(body).unwrap_or_default();
  respond(status, CONTENT_TYPE_JSON, Bytes::from(body))
}

fn json_error(status: StatusCode, msg: &str) -> Response<Full<Bytes>> {
  json(status, &ErrorResponse::new(msg))
}

/// Reads at most `limit` bytes. Only an exceeded limit is reported as too large.
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, UploadError>
where
  B: Body,
  B::Error: Into<BoxedErr>,
{
  match Limited::new(body, limit).collect().await {
    Ok(collected) => Ok(collected.to_bytes()),
    Err(err) if err.is::<LengthLimitError>() => Err(UploadError::BodyTooLarge),
    Err(err) => {
      warn!("failed to read upload body: {}", err);
      Err(UploadError::UnreadableBody)
    }
  }
}

pub fn render_form(config: &Settings) -> Result<String, BoxedErr> {
  let mut tera = Tera::default();
  tera.add_raw_template("upload.html", include_str!("templates/upload.html"))?;

  let types: Vec<&str> = ContentType::ALL.iter().map(|t| t.as_str()).collect();
  let mut context = tera::Context::new();
  context.insert("title", &config.upload.title);
  context.insert("action", &config.upload.path);
  context.insert("types", &types);

  Ok(tera.render("upload.html", &context)?)
}

impl UploadController {
  pub fn new(args: UploadControllerArgs) -> Result<UploadController, BoxedErr> {
    let form = render_form(&args.config).map_err(|err| InternalError {
      err_type: ErrorType::InternalError,
      temp: false,
      err,
      msg: "failed to render the upload form".into(),
      path: "bot.controller.upload.new".into(),
    })?;

    Ok(UploadController { store: args.store, config: args.config, form: Bytes::from(form) })
  }

  /// Serve the upload endpoint over HTTP/1
  pub async fn run(self: Arc<Self>) -> Result<(), BoxedErr> {
    let url = self.config.hosts.upload.clone();

    let listener = TcpListener::bind(&url).await?;
    let addr = listener.local_addr()?;
    info!("the upload server is listening on: {}", addr);

    loop {
      let (socket, _) = listener.accept().await?;
      let io = TokioIo::new(socket);
      let ctr = self.clone();

      spawn(async move {
        let svc = service_fn(move |req: Request<Incoming>| {
          let ctr = ctr.clone();
          async move { Ok::<_, Infallible>(ctr.serve(req).await) }
        });

        if let Err(err) = Builder::new().serve_connection(io, svc).await {
          error!("Error serving upload connection: {}", err);
        }
      });
    }
  }

  async fn serve(&self, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let limit = self.config.upload.max_body_bytes;
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let declared = req
      .headers()
      .get(CONTENT_LENGTH)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
      return self.reject(UploadError::BodyTooLarge);
    }

    let body = match read_body(req.into_body(), limit).await {
      Ok(body) => body,
      Err(err) => return self.reject(err),
    };

    self.handle(&method, &path, body).await
  }

  /// Routes one request whose body has already been read.
  pub async fn handle(&self, method: &Method, path: &str, body: Bytes) -> Response<Full<Bytes>> {
    if path != self.config.upload.path {
      return json_error(StatusCode::NOT_FOUND, "Not found");
    }

    match method {
      &Method::GET => respond(StatusCode::OK, CONTENT_TYPE_HTML, self.form.clone()),
      &Method::POST => self.upload(body).await,
      _ => json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
    }
  }

  async fn upload(&self, body: Bytes) -> Response<Full<Bytes>> {
    let start = Instant::now();
    let metrics = self.store.metrics();

    let record = match upload_parse(&body).and_then(|form| upload_validate(&form)) {
      Ok(record) => record,
      Err(err) => return self.reject(err),
    };

    let ctx = Arc::new(Context::new(Source::Web, self.config.upload.path.clone()));
    let res = match self.store.upsert(ctx.clone(), &record).await {
      Ok(()) => {
        metrics.record_upload_success();
        json(StatusCode::OK, &StatusResponse::success())
      }
      Err(err) => {
        metrics.record_upload_failure();
        error!(request_id = ctx.request_id(), "web upload failed: {}", err);
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
      }
    };

    metrics.observe_request_duration("upload", start.elapsed().as_secs_f64());
    res
  }

  fn reject(&self, err: UploadError) -> Response<Full<Bytes>> {
    warn!("rejected web upload: {}", err);
    self.store.metrics().record_upload_rejected(err.reason());
    json_error(err.status(), &err.to_string())
  }
}
