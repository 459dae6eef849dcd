//! Flat-file persistence for the Wizard-of-Oz backend.
//!
//! This crate owns the in-memory state of the REST surface: frequent
//! responses (ranked per task classification), task classifications and
//! session transcripts. The two reference collections are loaded once and
//! rewritten as a whole after every mutation through a [`RecordStore`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use woz_store::{FrequentResponseInput, FrequentResponses, JsonFileStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(JsonFileStore::new("frequent_responses.json"));
//!     let responses = FrequentResponses::open(store).await;
//!
//!     // Insert at the top of the "Open Naver" group
//!     let input = FrequentResponseInput::new("Open Naver", "잠시만요!").at(0);
//!     responses.create(input).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod error;
pub mod frequent_response;
pub mod models;
pub mod session;
pub mod task_classification;

pub use collection::{load_or_seed, JsonFileStore, MemoryStore, Record, RecordStore};
pub use error::{Result, StoreError};
pub use frequent_response::FrequentResponses;
pub use models::{
    Deleted, FrequentResponse, FrequentResponseInput, MessageEntry, TaskClassification,
    TaskClassificationInput,
};
pub use session::SessionLog;
pub use task_classification::TaskClassifications;
