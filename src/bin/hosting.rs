//! Scoring Server Binary
//!
//! Loads the configured artifact (or the rule fallback) and serves
//! /predict, /batch, and the dashboard endpoints.

use antifraud::service::server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    antifraud::init();
    server::run().await
}
