#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use ::axum::Server;
use anyhow::Result;
use buddy::config::AmadeusConfig;
use dotenvy::dotenv;
use std::{env, net::SocketAddr, process};
use tracing::info;

use crate::{axum::app, utils::logger};

mod axum;
mod http;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guard = logger::setup();

    let config = AmadeusConfig::from_env().unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        process::exit(1);
    });

    let port = env::var("PORT").map_or(Ok(8000), |p| p.parse::<u16>())?;
    let address = SocketAddr::from(([0, 0, 0, 0], port));

    info!("⚡ Flight offers API started on http://{address}");
    Server::bind(&address)
        .serve(app::create(config).into_make_service())
        .await?;

    Ok(())
}
