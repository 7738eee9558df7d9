//! Entity Table Module
//!
//! Keyed, insertion-ordered record storage behind a single `RwLock`. Every
//! in-memory repository is a thin layer over one table: scans and lookups
//! take the read lock, anything that mutates takes the write lock for the
//! whole read-modify-write step.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::{AdapterError, EntityKind, Result};
use crate::models::{ChaosEvent, Scenario, ServiceInfo, TestResult, TestRun};

// == Record ==
/// A value stored in an [`EntityTable`], identified by a string id.
pub trait Record: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;
}

impl Record for Scenario {
    const KIND: EntityKind = EntityKind::Scenario;

    fn id(&self) -> &str {
        &self.scenario_id
    }
}

impl Record for TestRun {
    const KIND: EntityKind = EntityKind::TestRun;

    fn id(&self) -> &str {
        &self.run_id
    }
}

impl Record for ChaosEvent {
    const KIND: EntityKind = EntityKind::ChaosEvent;

    fn id(&self) -> &str {
        &self.event_id
    }
}

impl Record for TestResult {
    const KIND: EntityKind = EntityKind::TestResult;

    fn id(&self) -> &str {
        &self.result_id
    }
}

impl Record for ServiceInfo {
    const KIND: EntityKind = EntityKind::Service;

    fn id(&self) -> &str {
        &self.service_id
    }
}

// == Rows ==
#[derive(Debug)]
struct Rows<T> {
    /// Ids in first-insertion order; overwriting keeps the original slot
    order: Vec<String>,
    by_id: HashMap<String, T>,
}

impl<T: Record> Rows<T> {
    fn upsert(&mut self, record: T) {
        let id = record.id().to_string();
        if !self.by_id.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.by_id.insert(id, record);
    }

    fn remove(&mut self, id: &str) -> Option<T> {
        let removed = self.by_id.remove(id)?;
        self.order.retain(|k| k != id);
        Some(removed)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

// == Entity Table ==
/// Thread-safe map from record id to record.
#[derive(Debug)]
pub struct EntityTable<T> {
    rows: RwLock<Rows<T>>,
}

impl<T: Record> Default for EntityTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> EntityTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Rows {
                order: Vec::new(),
                by_id: HashMap::new(),
            }),
        }
    }

    /// Inserts or overwrites by id.
    pub async fn insert(&self, record: T) -> T {
        self.rows.write().await.upsert(record.clone());
        record
    }

    /// Inserts every record in order under one lock acquisition.
    pub async fn insert_all(&self, records: Vec<T>) -> Vec<T> {
        let mut rows = self.rows.write().await;
        for record in &records {
            rows.upsert(record.clone());
        }
        records
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.rows.read().await.by_id.get(id).cloned()
    }

    /// Overwrites an existing record; `NotFound` if its id is absent.
    pub async fn replace(&self, record: T) -> Result<T> {
        let mut rows = self.rows.write().await;
        match rows.by_id.get_mut(record.id()) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(AdapterError::not_found(T::KIND, record.id())),
        }
    }

    /// Applies `change` to the stored record and returns the new state.
    ///
    /// The change runs on a copy and is committed only if it succeeds, so a
    /// failing change leaves the stored record untouched.
    pub async fn modify<F>(&self, id: &str, change: F) -> Result<T>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        let mut rows = self.rows.write().await;
        let slot = rows
            .by_id
            .get_mut(id)
            .ok_or_else(|| AdapterError::not_found(T::KIND, id))?;
        let mut updated = slot.clone();
        change(&mut updated)?;
        *slot = updated.clone();
        Ok(updated)
    }

    /// True iff the id was present.
    pub async fn remove(&self, id: &str) -> bool {
        self.rows.write().await.remove(id).is_some()
    }

    /// Removes every record matching `predicate` and returns their ids.
    pub async fn remove_where<P>(&self, predicate: P) -> Vec<String>
    where
        P: Fn(&T) -> bool,
    {
        let mut rows = self.rows.write().await;
        let doomed: Vec<String> = rows
            .iter()
            .filter(|record| predicate(record))
            .map(|record| record.id().to_string())
            .collect();
        for id in &doomed {
            rows.remove(id);
        }
        doomed
    }

    /// Records matching `predicate`, in insertion order.
    pub async fn filter<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    /// First record matching `predicate` in insertion order.
    pub async fn find<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .iter()
            .find(|record| predicate(record))
            .cloned()
    }

    pub async fn count<P>(&self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .iter()
            .filter(|record| predicate(record))
            .count()
    }

    /// A slice of the insertion-ordered snapshot.
    pub async fn page(&self, limit: usize, offset: usize) -> Vec<T> {
        self.rows
            .read()
            .await
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<T> {
        self.rows.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Payload, ScenarioStatus, ScenarioType};

    fn scenario(id: &str, name: &str) -> Scenario {
        Scenario::new(id, name, ScenarioType::Combined, Payload::new())
    }

    #[tokio::test]
    async fn test_overwrite_keeps_insertion_slot() {
        let table = EntityTable::new();
        table.insert(scenario("a", "first")).await;
        table.insert(scenario("b", "second")).await;
        table.insert(scenario("a", "replaced")).await;

        let names: Vec<String> = table.all().await.into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["replaced", "second"]);
        assert_eq!(table.len().await, 2);
    }

    #[tokio::test]
    async fn test_replace_requires_existing_id() {
        let table: EntityTable<Scenario> = EntityTable::new();

        let err = table.replace(scenario("ghost", "x")).await.unwrap_err();
        assert_eq!(err, AdapterError::not_found(EntityKind::Scenario, "ghost"));
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_modify_commits_nothing() {
        let table = EntityTable::new();
        table.insert(scenario("a", "orig")).await;

        let result = table
            .modify("a", |s| {
                s.name = "changed".to_string();
                Err(AdapterError::Validation("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(table.get("a").await.unwrap().name, "orig");
    }

    #[tokio::test]
    async fn test_modify_returns_new_state() {
        let table = EntityTable::new();
        table.insert(scenario("a", "orig")).await;

        let updated = table
            .modify("a", |s| {
                s.status = ScenarioStatus::Active;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(updated.status, ScenarioStatus::Active);
        assert_eq!(table.get("a").await.unwrap().status, ScenarioStatus::Active);
    }

    #[tokio::test]
    async fn test_page_and_remove_where() {
        let table = EntityTable::new();
        for i in 0..5 {
            table.insert(scenario(&format!("s{i}"), &format!("n{i}"))).await;
        }

        let ids: Vec<String> = table.page(2, 1).await.into_iter().map(|s| s.scenario_id).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert!(table.page(10, 7).await.is_empty());

        let removed = table.remove_where(|s| s.scenario_id != "s3").await;
        assert_eq!(removed.len(), 4);
        assert_eq!(table.all().await[0].scenario_id, "s3");
    }
}
