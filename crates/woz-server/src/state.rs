//! Application state shared across handlers.

use std::sync::Arc;

use relay::RelayRegistry;
use woz_store::{
    FrequentResponse, FrequentResponses, JsonFileStore, SessionLog, TaskClassification,
    TaskClassifications,
};

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Ranked canned replies.
    pub frequent_responses: Arc<FrequentResponses>,
    /// Task classification names.
    pub task_classifications: Arc<TaskClassifications>,
    /// Session transcripts.
    pub sessions: Arc<SessionLog>,
    /// Live phone and wizard connections.
    pub relay: RelayRegistry,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        frequent_responses: FrequentResponses,
        task_classifications: TaskClassifications,
        relay: RelayRegistry,
    ) -> Self {
        Self {
            frequent_responses: Arc::new(frequent_responses),
            task_classifications: Arc::new(task_classifications),
            sessions: Arc::new(SessionLog::new()),
            relay,
        }
    }

    /// Load both collections from the data directory.
    pub async fn open(config: &Config) -> Self {
        let frequent_responses = FrequentResponses::open(Arc::new(
            JsonFileStore::<FrequentResponse>::new(config.frequent_responses_path()),
        ))
        .await;
        let task_classifications = TaskClassifications::open(Arc::new(
            JsonFileStore::<TaskClassification>::new(config.task_classifications_path()),
        ))
        .await;

        Self::new(
            frequent_responses,
            task_classifications,
            RelayRegistry::new(config.relay_queue),
        )
    }
}
