use anyhow::Result;
use clustermetrics::aggregator::{self, AggregatorHandle};
use clustermetrics::config::AppConfig;
use clustermetrics::models::RealtimeMetrics;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the merged JSON
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = AppConfig::load()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        channel_capacity = app_config.aggregator.channel_capacity,
        "starting aggregation pass"
    );
    let (handle, pass) = aggregator::spawn(app_config.aggregator_config());

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        feed(BufReader::new(tokio::io::stdin()), "<stdin>", &handle).await?;
    } else {
        for path in &paths {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| anyhow::anyhow!("opening {}: {}", path, e))?;
            if !feed(BufReader::new(file), path, &handle).await? {
                break;
            }
        }
    }
    drop(handle);

    let pass = pass.await?;
    tracing::info!(
        snapshots = pass.snapshots,
        hosts = pass.metrics.hosts.len(),
        errors = pass.metrics.errors.len(),
        "aggregation finished"
    );
    let out = if app_config.output.pretty {
        serde_json::to_string_pretty(&pass.metrics)?
    } else {
        serde_json::to_string(&pass.metrics)?
    };
    println!("{out}");
    Ok(())
}

/// Submits one snapshot per JSON line. Returns false once the pass has closed.
async fn feed<R: AsyncBufRead + Unpin>(
    reader: R,
    source: &str,
    handle: &AggregatorHandle,
) -> Result<bool> {
    let mut lines = reader.lines();
    let mut line_no: u64 = 0;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let snapshot: RealtimeMetrics = match serde_json::from_str(&line) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    source,
                    line = line_no,
                    "skipping undecodable snapshot"
                );
                continue;
            }
        };
        if handle.submit(snapshot).await.is_err() {
            tracing::debug!(source, "aggregation pass closed; remaining input ignored");
            return Ok(false);
        }
    }
    Ok(true)
}
