mod api;
mod cli;
mod commands;
mod config;
mod error;
mod hash;
mod mcp;
mod page_range;
mod pdf;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::page_range::Strictness;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();

    match cli.command {
        Commands::Serve { config, host, port } => {
            let mut config = AppConfig::load(config.as_deref())
                .context("Failed to load configuration")?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
        }
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Organize {
            path,
            pages,
            output,
            strict,
        } => {
            let strictness = if strict {
                Strictness::Strict
            } else {
                Strictness::Lenient
            };
            commands::organize::run(&path, &pages, &output, strictness)?;
        }
        Commands::Split {
            path,
            start,
            end,
            output,
            lenient,
        } => {
            let strictness = if lenient {
                Strictness::Lenient
            } else {
                Strictness::Strict
            };
            commands::split::run(&path, start, end, &output, strictness)?;
        }
        Commands::Crop {
            path,
            margin,
            output,
            strict,
        } => {
            let strictness = if strict {
                Strictness::Strict
            } else {
                Strictness::Lenient
            };
            commands::crop::run(&path, margin, &output, strictness)?;
        }
        Commands::Merge { inputs, output } => {
            let input_refs: Vec<_> = inputs.iter().collect();
            commands::merge::run(&input_refs, &output)?;
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Starting pdfworks service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        max_upload_bytes = config.limits.max_upload_bytes,
        organize = ?config.selection.organize,
        split = ?config.selection.split,
        crop = ?config.selection.crop,
        "Configuration loaded"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = api::router(Arc::new(api::AppState::new(config)));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format().with_target(true).compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pdfworks=info,tower_http=info"));

    // stdout carries command output and the MCP transport
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
