//! # clotheslined — clothesline actuator daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`clothesline.toml`, env vars)
//! - Initialize logging
//! - Construct the in-memory store and the simulated sensor (adapters)
//! - Spawn the motor controller, command listener and automation service
//! - Optionally start the telemetry tick
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use clothesline_adapter_http_axum::state::AppState;
use clothesline_adapter_simulator::SimulatedSensor;
use clothesline_adapter_store_memory::InMemoryStore;
use clothesline_app::clock::Clock;
use clothesline_app::ports::{SharedStore, StorePaths};
use clothesline_app::services::automation_service::AutomationService;
use clothesline_app::services::command_listener::CommandListener;
use clothesline_app::services::motor_controller::MotorController;
use clothesline_app::services::status_publisher::StatusPublisher;
use clothesline_app::services::telemetry_service::{StartOutcome, TelemetryService};
use clothesline_domain::automation::AutomationPolicy;
use clothesline_domain::time::Millis;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    let paths = StorePaths::new(&config.store.root)?;
    tracing::info!(root = paths.root(), "starting clotheslined");

    // Store and publisher
    let clock = Clock::new();
    let store = Arc::new(InMemoryStore::default());
    let publisher = Arc::new(StatusPublisher::new(Arc::clone(&store), &paths, clock));

    // Motor controller
    let (motor, _controller) = MotorController::spawn(
        Arc::clone(&store),
        &paths,
        Arc::clone(&publisher),
        clock,
        config.motor_travel(),
    );
    publisher.publish_motor(motor.state()).await;

    // Store subscriptions
    let listener = CommandListener::new(motor.clone()).spawn(store.subscribe(&paths.command()));
    let automation = Arc::new(AutomationService::new(
        motor.clone(),
        AutomationPolicy::new(
            millis(config.automation.stability_ms),
            millis(config.automation.cooldown_ms),
        ),
        config.automation.enabled,
    ));
    let automation_task = Arc::clone(&automation).spawn(store.subscribe(&paths.status()));

    // Telemetry
    let telemetry = Arc::new(TelemetryService::new(
        SimulatedSensor::from_entropy(),
        Arc::clone(&publisher),
        clock,
        config.telemetry_interval(),
    ));
    if config.telemetry.autostart {
        if let StartOutcome::AlreadyRunning = telemetry.start().await {
            tracing::warn!("telemetry was already running at boot");
        }
    }

    // HTTP
    let state = AppState::new(
        motor,
        Arc::clone(&telemetry),
        publisher,
        automation,
        store,
        paths,
        clock,
    );
    let app = clothesline_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let tcp = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "clotheslined listening");

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.stop().await;
    listener.abort();
    automation_task.abort();
    tracing::info!("clotheslined stopped");

    Ok(())
}

fn millis(ms: u64) -> Millis {
    Millis::try_from(ms).unwrap_or(Millis::MAX)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
