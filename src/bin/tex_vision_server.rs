// ABOUTME: Tex Vision HTTP server binary
// ABOUTME: Loads environment configuration, applies CLI overrides, opens storage and serves the API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tex_vision::{config::ServerConfig, database, logging, resources::ServerResources, server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "tex-vision-server")]
#[command(about = "Tex Vision - vision drills and wellness check-ins for youth athletes")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (`memory` or `sqlite:...`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());

    let database = database::connect(&config.database_url).await?;
    info!(backend = database.backend_name(), "Database initialized");

    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(config, database));
    if let Err(e) = server::serve(resources, port).await {
        error!(error = %e, "Server error");
        return Err(e);
    }
    Ok(())
}
