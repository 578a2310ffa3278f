use stash_bot::server::BotServer;
use stash_result::errors::BoxedErr;

#[tokio::main]
async fn main() -> Result<(), BoxedErr> {
  let server = BotServer::new().await;

  match server {
    Ok(srv) => srv.run().await,
    Err(e) => Err(e),
  }
}
