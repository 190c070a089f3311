use std::process::ExitCode;

use health_monitor::config::Config;
use health_monitor::error::MonitorError;
use health_monitor::frame::{FrameInput, JsonlFrameSource};
use health_monitor::logging::{init_tracing, LogConfig};
use health_monitor::overlay::select_overlay;
use health_monitor::session::{Session, Sinks};
use health_monitor::sinks::csv_log::CsvLogger;
use health_monitor::sinks::notify::select_notifier;
use health_monitor::sinks::telemetry::TelemetryClient;
use uuid::Uuid;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    if let Err(e) = init_tracing(&LogConfig {
        log_level: config.log_level.clone(),
        enable_file_logs: config.enable_file_logs,
        log_dir: config.log_dir.clone(),
    }) {
        eprintln!("health-monitor: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!("Starting health-monitor");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Session aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), MonitorError> {
    config.validate().map_err(MonitorError::Config)?;
    tracing::debug!(?config, "Configuration loaded");

    let session_id = Uuid::new_v4();
    let csv = CsvLogger::open(&config.csv_log_path).await?;
    let sinks = Sinks {
        csv,
        telemetry: TelemetryClient::new(&config.telemetry, session_id),
        notifier: select_notifier(config.notifications_enabled),
        overlay: select_overlay(config.overlay_enabled),
    };

    let input = FrameInput::open(&config.frame_source).await?;
    let mut source = JsonlFrameSource::from_lines(input);

    let session = Session::from_config(session_id, &config, sinks);
    let summary = session.run(&mut source, shutdown_signal()).await;

    if source.skipped() > 0 {
        tracing::warn!(skipped = source.skipped(), "Malformed frames were skipped");
    }
    tracing::info!(
        frames = summary.frames,
        total_blinks = summary.total_blinks,
        "Session summary"
    );
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}
