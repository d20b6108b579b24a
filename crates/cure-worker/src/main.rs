//! Download worker binary.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use cure_media::{check_ffmpeg, check_ytdlp, Downloader, FfmpegRunner};
use cure_models::Env;
use cure_queue::{select_subscriber, SubscriberExt};
use cure_telegram::{TelegramClient, TelegramConfig};
use cure_worker::logging::init_tracing;
use cure_worker::{metrics, DownloadHandler, Pipeline, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS). Fails only if
    // one is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Load environment variables
    dotenvy::dotenv().ok();
    let env = Env::from_process();

    init_tracing(WorkerConfig::wants_json_logs(&env));

    if let Err(e) = run(env).await {
        error!("Worker failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(env: Env) -> anyhow::Result<()> {
    info!("Starting cure-worker");

    let config = WorkerConfig::from_env(&env)?;
    info!("Worker config: {:?}", config);

    if let Some(port) = config.metrics_port {
        metrics::install_exporter(port)?;
    }

    let telegram_config = TelegramConfig::from_env(&env)?;
    let upload_chat_id = telegram_config.upload_chat_id;
    let telegram = Arc::new(TelegramClient::new(telegram_config)?);
    telegram.check().await.context("Telegram bot check failed")?;

    let ytdlp = check_ytdlp()?;
    let ffmpeg = check_ffmpeg()?;
    info!("Using {} and {}", ytdlp.display(), ffmpeg.display());

    tokio::fs::create_dir_all(&config.storage_dir)
        .await
        .with_context(|| format!("creating storage dir {}", config.storage_dir.display()))?;

    let subscriber = select_subscriber(&env)?;

    let pipeline = Pipeline::new(
        config.storage_dir.clone(),
        upload_chat_id,
        Arc::new(Downloader::new().with_timeout(config.download_timeout)),
        Arc::new(FfmpegRunner::new().with_timeout(config.convert_timeout)),
        telegram.clone(),
        telegram,
    );
    let handler = DownloadHandler::new(pipeline);

    info!(
        broker = subscriber.kind().as_str(),
        "Listening for jobs on {}", config.topic
    );

    // In-flight jobs are abandoned on shutdown.
    tokio::select! {
        result = subscriber.subscribe(config.topic, handler) => match result {
            Ok(never) => match never {},
            Err(e) => Err(e).context("subscription ended"),
        },
        _ = shutdown_signal() => {
            info!("Received shutdown signal, exiting");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
