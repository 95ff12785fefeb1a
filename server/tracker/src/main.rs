mod config;
mod discord;
mod engine;
mod intake;
mod metrics_adapter;
mod points;
mod scheduler;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serenity::all::{Client, GatewayIntents};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;
use vs_control::VoiceDirectory;
use vs_metrics::{MetricsConfig, MetricsServer};
use vs_sink::{InfluxSink, PointSink};

use crate::config::Config;
use crate::discord::{DiscordDirectory, VoiceEvents};
use crate::engine::{Engine, EngineConfig};
use crate::intake::Intake;
use crate::metrics_adapter::tracker_metrics;
use crate::scheduler::{CoalescingScheduler, NoopMetrics, TrackerMetrics};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cfg = Config::parse();

    // Metrics
    let metrics: Arc<dyn TrackerMetrics> = match &cfg.metrics_listen {
        Some(listen) => {
            let ms = MetricsServer::install(MetricsConfig {
                listen: listen.clone(),
                namespace: "vs",
            })?;
            tokio::spawn(async move {
                if let Err(e) = ms.serve().await {
                    warn!("metrics server stopped: {:#}", e);
                }
            });
            tracker_metrics("vs")
        }
        None => Arc::new(NoopMetrics),
    };

    // Sink
    let sink: Arc<dyn PointSink> =
        Arc::new(InfluxSink::new(cfg.influx()).context("influx client")?);

    // Event source
    let (tx, rx) = mpsc::unbounded_channel();
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_VOICE_STATES;
    let mut client = Client::builder(&cfg.discord_token, intents)
        .event_handler(VoiceEvents::new(tx))
        .await
        .context("discord client")?;
    let directory: Arc<dyn VoiceDirectory> = Arc::new(DiscordDirectory::new(client.cache.clone()));

    // Engine
    let scheduler = CoalescingScheduler::new(sink.clone(), metrics.clone());
    let intake = Intake::new(directory, sink.clone(), metrics);
    let engine = Engine::new(
        scheduler,
        intake,
        sink,
        EngineConfig {
            tick_interval: cfg.tick_interval(),
        },
    );
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let engine = tokio::spawn(engine.run(rx, async move {
        let _ = stop_rx.await;
    }));

    info!("listening for voice state updates");

    let shard_manager = client.shard_manager.clone();
    tokio::select! {
        r = client.start() => r.context("discord gateway")?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown");
            shard_manager.shutdown_all().await;
        }
    }

    let _ = stop_tx.send(());
    engine.await??;
    Ok(())
}
