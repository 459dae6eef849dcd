//! Task classification CRUD.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::collection::{load_or_seed, RecordStore};
use crate::error::{Result, StoreError};
use crate::frequent_response::DEFAULT_TASK_CLASSIFICATION;
use crate::models::{Deleted, TaskClassification, TaskClassificationInput};

const ENTITY: &str = "Task classification";

/// Seed written when no collection exists yet.
pub fn default_task_classifications() -> Vec<TaskClassification> {
    vec![TaskClassification {
        id: Uuid::new_v4().to_string(),
        name: DEFAULT_TASK_CLASSIFICATION.to_string(),
    }]
}

/// The task-classification collection. Unordered; records keep insertion order.
pub struct TaskClassifications {
    records: Mutex<Vec<TaskClassification>>,
    store: Arc<dyn RecordStore<TaskClassification>>,
}

impl TaskClassifications {
    /// Load the collection from `store`, seeding it if needed.
    pub async fn open(store: Arc<dyn RecordStore<TaskClassification>>) -> Self {
        let records = load_or_seed(store.as_ref(), default_task_classifications).await;
        Self {
            records: Mutex::new(records),
            store,
        }
    }

    pub async fn list(&self) -> Vec<TaskClassification> {
        self.records.lock().await.clone()
    }

    pub async fn create(&self, input: TaskClassificationInput) -> Result<TaskClassification> {
        let mut records = self.records.lock().await;
        let record = TaskClassification {
            id: Uuid::new_v4().to_string(),
            name: input.name,
        };
        records.push(record.clone());

        self.store.save(&records).await?;
        info!(id = %record.id, name = %record.name, "Task classification added");
        Ok(record)
    }

    /// Rename a classification.
    ///
    /// Frequent responses filed under the old name are not updated.
    pub async fn update(&self, id: &str, input: TaskClassificationInput) -> Result<TaskClassification> {
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;
        record.name = input.name;
        let record = record.clone();

        self.store.save(&records).await?;
        info!(id = %record.id, name = %record.name, "Task classification updated");
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<Deleted> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;
        records.remove(index);

        self.store.save(&records).await?;
        info!(id = %id, "Task classification deleted");
        Ok(Deleted::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::MemoryStore;

    fn input(name: &str) -> TaskClassificationInput {
        TaskClassificationInput {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_task_classification_crud() {
        let store = Arc::new(MemoryStore::<TaskClassification>::new());
        let classifications = TaskClassifications::open(store.clone()).await;

        // Seed
        let seeded = classifications.list().await;
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].name, "Open Naver");

        // Create
        let created = classifications.create(input("Call family")).await.unwrap();
        assert_eq!(classifications.list().await.len(), 2);

        // Update
        let updated = classifications
            .update(&created.id, input("Call son"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Call son");

        // Delete
        let deleted = classifications.delete(&created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);
        assert_eq!(store.snapshot().unwrap(), seeded);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let classifications = TaskClassifications::open(Arc::new(MemoryStore::<TaskClassification>::new())).await;

        let update = classifications.update("missing", input("x")).await;
        let delete = classifications.delete("missing").await;

        assert!(matches!(update, Err(StoreError::NotFound { .. })));
        assert!(matches!(delete, Err(StoreError::NotFound { .. })));
        assert_eq!(classifications.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_is_reported() {
        let store = Arc::new(MemoryStore::<TaskClassification>::new());
        let classifications = TaskClassifications::open(store.clone()).await;
        store.set_fail_writes(true);

        let result = classifications.create(input("Unsaved")).await;

        assert!(matches!(result, Err(StoreError::Persistence(_))));
        assert_eq!(classifications.list().await.len(), 2);
    }
}
