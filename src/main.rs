use std::error::Error;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use building_map_server::adapters::outbound::{init_domain_logger, RetainedBroadcast, YamlBuildingSource};
use building_map_server::application::{startup, BuildingMapFetchActor, StartupOptions};
use building_map_server::domains::building_map::MapPublisher;
use building_map_server::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load_or_default("config.toml").await?;

    let map_path = match config.resolve_map_path(std::env::args().nth(1)) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("loading map path: {}", map_path.display());

    let provider = YamlBuildingSource::new(map_path);
    let broadcast = Arc::new(RetainedBroadcast::new(config.broadcast.topic.clone()));
    let publisher = select_publisher(&config, broadcast.clone())?;

    let options = StartupOptions {
        lowercase_image_encoding: config.map.lowercase_image_encoding,
        logger: Some(init_domain_logger(config.logging.file.as_deref())),
    };
    let server = match startup(&provider, publisher.as_ref(), options).await {
        Ok(server) => Arc::new(server),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // fetch has no external request adapter yet; the client serves in-process callers only
    let client = BuildingMapFetchActor::spawn(server.clone(), config.service.request_buffer);
    info!(
        "serving {} on {} (retained broadcast) and {} (in-process fetch only)  Ctrl+C to exit...",
        server.snapshot().name,
        broadcast.topic(),
        config.service.name
    );

    tokio::signal::ctrl_c().await?;
    drop(client);
    info!("Shutting down building map server");

    Ok(())
}

#[cfg(feature = "kafka")]
fn select_publisher(
    config: &Config,
    broadcast: Arc<RetainedBroadcast>,
) -> Result<Arc<dyn MapPublisher>, Box<dyn Error>> {
    use building_map_server::adapters::outbound::KafkaMapPublisher;

    if config.kafka.enabled {
        let kafka = KafkaMapPublisher::new(&config.kafka, &config.broadcast.topic, config.broadcast.format)?;
        return Ok(Arc::new(kafka));
    }
    Ok(broadcast)
}

#[cfg(not(feature = "kafka"))]
fn select_publisher(
    config: &Config,
    broadcast: Arc<RetainedBroadcast>,
) -> Result<Arc<dyn MapPublisher>, Box<dyn Error>> {
    if config.kafka.enabled {
        tracing::warn!("kafka.enabled is set but this binary was built without the kafka feature");
    }
    Ok(broadcast)
}
