//! Study Session Replay - Main Entry Point

use anyhow::Context;
use clap::Parser;
use cli::{init_logging, replay_reader, AppConfig, Replayer};
use cloud_sync::SummaryPublisher;
use pipeline::StudyPipeline;
use session::SessionSummary;
use std::path::{Path, PathBuf};
use storage::SessionRepository;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "study-replay")]
#[command(about = "Replay recorded landmark frames through a study session")]
struct Cli {
    /// JSON-lines frame file, `-` for stdin
    input: PathBuf,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    total_minutes: Option<u32>,
    #[arg(long)]
    interval_minutes: Option<u32>,
    /// Skip MQTT publishing even when enabled in config
    #[arg(long)]
    no_publish: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    info!("=== Study Replay v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(user_id) = cli.user_id {
        config.session.user_id = Some(user_id);
    }
    if let Some(username) = cli.username {
        config.session.username = Some(username);
    }
    if let Some(total) = cli.total_minutes {
        config.session.total_minutes = total;
    }
    if let Some(interval) = cli.interval_minutes {
        config.session.interval_minutes = interval;
    }

    let pipeline = StudyPipeline::new(config.pipeline_config())?;
    let replayer = Replayer::new(pipeline, &config.replay);

    let reader: Box<dyn AsyncBufRead + Unpin> = if cli.input.as_os_str() == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        let file = tokio::fs::File::open(&cli.input)
            .await
            .with_context(|| format!("opening {}", cli.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let report = replay_reader(reader, replayer).await?;
    info!(
        "Replayed {} frames ({} skipped), {} habit events, {} breaks",
        report.frames, report.skipped_lines, report.habit_events, report.breaks
    );

    let Some(summary) = report.summary else {
        warn!("No frames replayed, nothing to report");
        return Ok(());
    };

    if let Some(path) = &config.replay.store_path {
        store(path, &summary).await?;
    }

    if config.cloud.enabled && !cli.no_publish {
        publish(config.cloud.clone(), &summary).await;
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn store(path: &Path, summary: &SessionSummary) -> anyhow::Result<()> {
    let repo = SessionRepository::load(path)
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    repo.insert_session(summary.clone())?;
    repo.save(path).await?;

    if let Some(user_id) = &summary.user_id {
        if let Some(record) = repo.lifetime_record(user_id)? {
            info!(
                "Lifetime for {}: {} sessions, {} h",
                user_id, record.total_sessions, record.total_hours
            );
        }
    }
    Ok(())
}

/// Best effort: failures are logged, never fatal
async fn publish(config: cloud_sync::CloudConfig, summary: &SessionSummary) {
    let mut publisher = SummaryPublisher::new(config);
    if let Err(e) = publisher.connect().await {
        error!("Summary not published: {}", e);
        return;
    }
    if let Err(e) = publisher.publish_summary(summary).await {
        error!("Summary not published: {}", e);
    }
    if let Err(e) = publisher.disconnect().await {
        warn!("MQTT disconnect failed: {}", e);
    }
}
