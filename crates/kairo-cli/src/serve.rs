//! Serve command: runs the HTTP relay until Ctrl+C.
//!
//! Startup sequence:
//! 1. Load config (file + env)
//! 2. Build dispatcher, store handle and throttle
//! 3. Bind the listener and serve with peer addresses attached

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use kairo_core::config::load_config;
use kairo_core::types::CompletionMode;
use kairo_server::{build_router, AppState};

use crate::helpers;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    helpers::print_banner();

    let config = load_config(config_path);
    let state = AppState::from_config(&config);

    let (text_keys, text_escalation) = state.dispatcher.candidate_counts(CompletionMode::Text);
    let (vision_keys, vision_escalation) =
        state.dispatcher.candidate_counts(CompletionMode::Vision);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    println!("  Listening: http://{addr}");
    println!("  Chat:      {} ({} keys, escalation: {})", config.models.chat, text_keys, yes_no(text_escalation));
    println!("  Vision:    {} ({} keys, reserve: {})", config.models.vision, vision_keys, yes_no(vision_escalation));
    println!("  Sync:      {}", if config.store.is_configured() { "Firestore" } else { "disabled" });
    println!();
    println!("  Ctrl+C to stop");
    println!();

    if text_keys == 0 {
        tracing::warn!("no primary API keys configured, every chat will get the apology reply");
    }
    info!(addr = %addr, "relay starting");

    let app = build_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    println!("  Relay stopped. Goodbye!");
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        println!();
        println!("  Shutting down...");
        info!("received Ctrl+C, shutting down");
    }
}
