// verify-server/src/main.rs
mod api;
mod static_files;

use std::io;
use std::sync::Arc;

use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use common::privy::{PrivyClient, TokenVerifier};
use common::{setup_tracing, Config};

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Privy Auth Demo verification server")
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    setup_tracing();

    let config = Config::from_env();

    let privy = PrivyClient::new(config.privy.clone())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    tracing::info!("Verifying tokens for Privy app {}", privy.app_id());

    let verifier: Arc<dyn TokenVerifier> = Arc::new(privy);
    let verifier_data = web::Data::from(verifier);

    let server_addr = config.web_server_addr.clone();
    let static_config = config.static_files.clone();

    tracing::info!("Starting verification server on {}", server_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(verifier_data.clone())
            .service(index)
            .configure(api::configure)
            .configure(|cfg| static_files::configure(cfg, &static_config))
    })
    .bind(&server_addr)?
    .run()
    .await
}
