// verify-server/src/api/mod.rs
pub mod verify;

use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

#[get("/")]
pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Privy Auth Demo API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(api_index)
            .service(
                web::resource("/verify")
                    .route(web::get().to(verify::verify))
                    .route(web::post().to(verify::verify)),
            ),
    );
}
