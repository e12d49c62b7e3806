// Building map distribution: build once, publish once, answer fetches forever.
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::common::{ApplicationError, ApplicationResult};
use crate::domains::building::BuildingModelProvider;
use crate::domains::building_map::{
    BuildingMapSnapshot, GetBuildingMapRequest, GetBuildingMapResponse, MapPublisher, SnapshotBuilder,
};
use crate::domains::logger::DynLogger;

/// Owns the single snapshot for the lifetime of the process.
#[derive(Debug)]
pub struct BuildingMapServer {
    snapshot: Arc<BuildingMapSnapshot>,
}

impl BuildingMapServer {
    /// Take ownership of a fully built snapshot and publish it on the retained channel.
    pub async fn new(snapshot: BuildingMapSnapshot, publisher: &dyn MapPublisher) -> ApplicationResult<Self> {
        let snapshot = Arc::new(snapshot);

        info!("publishing map...");
        publisher.publish(Arc::clone(&snapshot)).await?;

        info!("ready to serve map: \"{}\"", snapshot.name);
        Ok(Self { snapshot })
    }

    pub fn get_building_map(&self, _request: &GetBuildingMapRequest) -> GetBuildingMapResponse {
        info!("get_building_map()");
        GetBuildingMapResponse {
            building_map: Arc::clone(&self.snapshot),
        }
    }

    pub fn snapshot(&self) -> &Arc<BuildingMapSnapshot> {
        &self.snapshot
    }
}

#[derive(Clone)]
pub struct StartupOptions {
    pub lowercase_image_encoding: bool,
    pub logger: Option<DynLogger>,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            lowercase_image_encoding: true,
            logger: None,
        }
    }
}

/// Load, build and publish, strictly in that order. Nothing is published if any step fails.
pub async fn startup(
    provider: &dyn BuildingModelProvider,
    publisher: &dyn MapPublisher,
    options: StartupOptions,
) -> ApplicationResult<BuildingMapServer> {
    let building = provider.load()?;

    let mut builder = SnapshotBuilder::new(provider.base_dir())
        .lowercase_encoding(options.lowercase_image_encoding);
    if let Some(logger) = options.logger {
        builder = builder.with_logger(logger);
    }
    let snapshot = builder.build(&building)?;
    info!(
        "built map \"{}\": {} levels, {} lifts, {} doors, {} nav graphs, {} image bytes",
        snapshot.name,
        snapshot.levels.len(),
        snapshot.lifts.len(),
        snapshot.door_count(),
        snapshot.graph_count(),
        snapshot.image_bytes()
    );

    BuildingMapServer::new(snapshot, publisher).await
}

struct FetchCommand {
    request: GetBuildingMapRequest,
    respond_to: oneshot::Sender<GetBuildingMapResponse>,
}

/// Request/response endpoint in front of a [`BuildingMapServer`].
pub struct BuildingMapFetchActor {
    server: Arc<BuildingMapServer>,
    receiver: mpsc::Receiver<FetchCommand>,
}

impl BuildingMapFetchActor {
    /// Spawn the handler task and return a client connected to it.
    /// A `capacity` of zero is raised to one.
    pub fn spawn(server: Arc<BuildingMapServer>, capacity: usize) -> BuildingMapClient {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let actor = Self { server, receiver };
        tokio::spawn(actor.run());
        BuildingMapClient { sender }
    }

    async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            let response = self.server.get_building_map(&command.request);
            // the caller may have gone away; nothing to do then
            let _ = command.respond_to.send(response);
        }
    }
}

#[derive(Clone)]
pub struct BuildingMapClient {
    sender: mpsc::Sender<FetchCommand>,
}

impl BuildingMapClient {
    pub async fn get_building_map(&self) -> ApplicationResult<GetBuildingMapResponse> {
        self.request(GetBuildingMapRequest::default()).await
    }

    pub async fn request(&self, request: GetBuildingMapRequest) -> ApplicationResult<GetBuildingMapResponse> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(FetchCommand { request, respond_to })
            .await
            .map_err(|e| ApplicationError::Transport(format!("Failed to send fetch request: {}", e)))?;
        response
            .await
            .map_err(|e| ApplicationError::Transport(format!("Fetch handler dropped the request: {}", e)))
    }
}
