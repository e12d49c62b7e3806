use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::common::{ApplicationError, ApplicationResult};
use crate::domains::building_map::{BuildingMapSnapshot, MapPublisher};

type Slot = Option<Arc<BuildingMapSnapshot>>;

/// In-process keep-last-1 broadcast.
///
/// The channel always holds the most recent publish, so a subscriber created
/// after `publish` still observes it.
pub struct RetainedBroadcast {
    topic: String,
    sender: watch::Sender<Slot>,
}

impl RetainedBroadcast {
    pub fn new(topic: impl Into<String>) -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self {
            topic: topic.into(),
            sender,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscribe(&self) -> MapSubscription {
        MapSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn retained(&self) -> Option<Arc<BuildingMapSnapshot>> {
        self.sender.borrow().clone()
    }
}

#[async_trait]
impl MapPublisher for RetainedBroadcast {
    async fn publish(&self, snapshot: Arc<BuildingMapSnapshot>) -> ApplicationResult<()> {
        info!("publishing map \"{}\" on {}", snapshot.name, self.topic);
        // send_replace keeps the value even while nobody is subscribed
        self.sender.send_replace(Some(snapshot));
        Ok(())
    }
}

pub struct MapSubscription {
    receiver: watch::Receiver<Slot>,
}

impl MapSubscription {
    /// Resolve with the retained map, waiting for the first publish if needed.
    pub async fn latest(&mut self) -> ApplicationResult<Arc<BuildingMapSnapshot>> {
        let slot = self
            .receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|e| ApplicationError::Transport(format!("Map broadcast closed: {}", e)))?;
        Option::clone(&slot).ok_or_else(|| ApplicationError::Transport("Map broadcast held no value".to_string()))
    }

    /// The retained map, if one has been published.
    pub fn try_latest(&self) -> Option<Arc<BuildingMapSnapshot>> {
        self.receiver.borrow().clone()
    }
}
