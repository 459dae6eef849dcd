//! Frequent responses with dense per-group ranking.
//!
//! Every task classification forms a group whose `order` values are exactly
//! `0..count`. Create, update and delete keep that invariant by shifting the
//! ranks of the affected group only; other groups are never touched.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::collection::{load_or_seed, RecordStore};
use crate::error::{Result, StoreError};
use crate::models::{Deleted, FrequentResponse, FrequentResponseInput};

const ENTITY: &str = "Frequent response";

/// Group seeded into an empty store.
pub const DEFAULT_TASK_CLASSIFICATION: &str = "Open Naver";

/// Seed written when no collection exists yet.
pub fn default_frequent_responses() -> Vec<FrequentResponse> {
    vec![FrequentResponse {
        id: Uuid::new_v4().to_string(),
        task_classification: DEFAULT_TASK_CLASSIFICATION.to_string(),
        content: "안녕하세요! 무엇을 도와드릴까요?".to_string(),
        order: 0,
    }]
}

/// The frequent-response collection.
///
/// The lock is held for the whole operation, file write included, so
/// concurrent requests observe each mutation as a unit.
pub struct FrequentResponses {
    records: Mutex<Vec<FrequentResponse>>,
    store: Arc<dyn RecordStore<FrequentResponse>>,
}

impl FrequentResponses {
    /// Load the collection from `store`, seeding and renumbering as needed.
    pub async fn open(store: Arc<dyn RecordStore<FrequentResponse>>) -> Self {
        let mut records = load_or_seed(store.as_ref(), default_frequent_responses).await;

        if normalize(&mut records) {
            warn!(store = %store.describe(), "Renumbered frequent response ranks");
            if let Err(err) = store.save(&records).await {
                warn!(error = %err, "Failed to persist renumbered ranks");
            }
        }

        Self {
            records: Mutex::new(records),
            store,
        }
    }

    /// All records in storage order.
    pub async fn list(&self) -> Vec<FrequentResponse> {
        self.records.lock().await.clone()
    }

    /// A single record by id.
    pub async fn get(&self, id: &str) -> Result<FrequentResponse> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(ENTITY, id))
    }

    /// Insert a record into its group.
    ///
    /// Without an order the record goes last. With one, it must lie in
    /// `0..=count` and siblings at or after it move down by one.
    pub async fn create(&self, input: FrequentResponseInput) -> Result<FrequentResponse> {
        let mut records = self.records.lock().await;
        let group = input.task_classification;
        let siblings = group_len(&records, &group);

        let order = match input.order {
            Some(order) if order > siblings => {
                return Err(StoreError::InvalidOrder {
                    order,
                    max: siblings,
                })
            }
            Some(order) => {
                open_rank(&mut records, &group, order);
                order
            }
            None => siblings,
        };

        let record = FrequentResponse {
            id: Uuid::new_v4().to_string(),
            task_classification: group,
            content: input.content,
            order,
        };
        records.push(record.clone());

        self.persist(&records).await?;
        info!(
            id = %record.id,
            task_classification = %record.task_classification,
            order = record.order,
            "Frequent response added"
        );
        Ok(record)
    }

    /// Change a record's content, group and/or rank.
    ///
    /// Moving to another group closes the gap in the old group and inserts
    /// into the new one (at `order`, or last).
    pub async fn update(&self, id: &str, input: FrequentResponseInput) -> Result<FrequentResponse> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        let old_group = records[index].task_classification.clone();
        let old_order = records[index].order;

        if old_group == input.task_classification {
            if let Some(new_order) = input.order.filter(|&o| o != old_order) {
                let max = group_len(&records, &old_group).saturating_sub(1);
                if new_order > max {
                    return Err(StoreError::InvalidOrder {
                        order: new_order,
                        max,
                    });
                }
                move_rank(&mut records, &old_group, old_order, new_order);
                records[index].order = new_order;
            }
        } else {
            let new_group = &input.task_classification;
            let new_len = group_len(&records, new_group);
            let new_order = match input.order {
                Some(order) if order > new_len => {
                    return Err(StoreError::InvalidOrder {
                        order,
                        max: new_len,
                    })
                }
                Some(order) => order,
                None => new_len,
            };

            close_rank(&mut records, &old_group, old_order);
            open_rank(&mut records, new_group, new_order);
            records[index].task_classification = new_group.clone();
            records[index].order = new_order;
        }
        records[index].content = input.content;

        let record = records[index].clone();
        self.persist(&records).await?;
        info!(
            id = %record.id,
            task_classification = %record.task_classification,
            order = record.order,
            "Frequent response updated"
        );
        Ok(record)
    }

    /// Remove a record and close the gap it leaves in its group.
    pub async fn delete(&self, id: &str) -> Result<Deleted> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found(ENTITY, id))?;

        let removed = records.remove(index);
        close_rank(&mut records, &removed.task_classification, removed.order);

        self.persist(&records).await?;
        info!(id = %id, "Frequent response deleted");
        Ok(Deleted::new(id))
    }

    async fn persist(&self, records: &[FrequentResponse]) -> Result<()> {
        self.store.save(records).await.map_err(|err| {
            tracing::error!(error = %err, "Error saving frequent responses");
            match err {
                StoreError::Persistence(_) => err,
                other => StoreError::Persistence(other.to_string()),
            }
        })
    }
}

fn group_len(records: &[FrequentResponse], group: &str) -> u32 {
    records
        .iter()
        .filter(|r| r.task_classification == group)
        .count() as u32
}

/// Make room at `order`: members ranked at or after it move down one.
fn open_rank(records: &mut [FrequentResponse], group: &str, order: u32) {
    for record in records
        .iter_mut()
        .filter(|r| r.task_classification == group && r.order >= order)
    {
        record.order += 1;
    }
}

/// Close the gap at `order`: members ranked after it move up one.
fn close_rank(records: &mut [FrequentResponse], group: &str, order: u32) {
    for record in records
        .iter_mut()
        .filter(|r| r.task_classification == group && r.order > order)
    {
        record.order -= 1;
    }
}

/// Shift the members between `from` and `to` so the slot at `to` is free.
///
/// The member currently at `from` is left alone; the caller places it.
fn move_rank(records: &mut [FrequentResponse], group: &str, from: u32, to: u32) {
    for record in records
        .iter_mut()
        .filter(|r| r.task_classification == group)
    {
        if to < from && record.order >= to && record.order < from {
            record.order += 1;
        } else if to > from && record.order > from && record.order <= to {
            record.order -= 1;
        }
    }
}

/// Renumber every group to `0..count`, keeping the existing relative order
/// (ties broken by storage position). Returns whether anything changed.
fn normalize(records: &mut [FrequentResponse]) -> bool {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        groups
            .entry(record.task_classification.clone())
            .or_default()
            .push(index);
    }

    let mut changed = false;
    for indices in groups.values_mut() {
        indices.sort_by_key(|&i| (records[i].order, i));
        for (rank, &i) in indices.iter().enumerate() {
            let rank = rank as u32;
            if records[i].order != rank {
                records[i].order = rank;
                changed = true;
            }
        }
    }
    changed
}
