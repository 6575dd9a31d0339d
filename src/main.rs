mod config;
mod engine;
mod errors;
mod models;
mod store;
mod utils;

use std::sync::Arc;

use log::{error, info, warn};

use config::EngineConfig;
use engine::{Engine, RoomQuery};
use models::MetricSummary;
use store::{connect, PgReadingStore, PgRoomStore};
use utils::format_datetime;

fn log_metric(label: &str, summary: &MetricSummary) {
    info!(
        "  {}: min {:.2}, max {:.2}, average {:.2} over {} readings ({} chart points)",
        label,
        summary.min,
        summary.max,
        summary.average,
        summary.count,
        summary.series.len()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match EngineConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let client = match connect(&config.database_url).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let engine = Engine::new(
        PgRoomStore::new(client.clone()),
        PgReadingStore::new(client),
    );

    let query = RoomQuery {
        room_ids: config.room_ids.clone(),
        first_value_date: config.first_value_date,
        smooth_interval_minutes: config.smooth_interval_minutes,
    };

    if let Some(since) = &query.first_value_date {
        info!("Querying readings since {}", format_datetime(since));
    }

    let batch = match engine.run(&query).await {
        Ok(batch) => batch,
        Err(e) => {
            error!("Batch query failed: {}", e);
            return Err(e.into());
        }
    };

    // Print summary
    for room in &batch.rooms {
        info!("Summary for {}:", room.name);
        info!("  Attached sensors: {}", room.tags.len());
        if let Some(summary) = &room.temperature {
            log_metric("Temperature", summary);
        }
        if let Some(summary) = &room.humidity {
            log_metric("Humidity", summary);
        }
        if let Some(summary) = &room.pressure {
            log_metric("Pressure", summary);
        }
    }

    // Warning if the query matched nothing
    if batch.rooms.is_empty() {
        warn!("No rooms matched the query!");
    }

    println!("{}", serde_json::to_string_pretty(&batch)?);

    Ok(())
}
