//! In-process record store.

use std::collections::HashMap;

use async_trait::async_trait;
use certificate_core::{CertificateId, CertificateRecord, NewCertificate};
use tokio::sync::RwLock;

use super::{CreateOutcome, RecordStore, StoreError};

/// Record store held in memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<CertificateId, CertificateRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find(&self, id: &CertificateId) -> Result<Option<CertificateRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn create_if_absent(&self, record: NewCertificate) -> Result<CreateOutcome, StoreError> {
        let mut records = self.records.write().await;

        if let Some(existing) = records.get(&record.id) {
            return Ok(CreateOutcome::Existing(existing.clone()));
        }

        let record = record.into_record();
        records.insert(record.id.clone(), record.clone());
        Ok(CreateOutcome::Created(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_certificate(id: &str, name: &str) -> NewCertificate {
        NewCertificate {
            id: CertificateId::parse(id).unwrap(),
            name: name.to_string(),
            grade: "A".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let store = MemoryRecordStore::new();
        let id = CertificateId::parse("missing").unwrap();
        assert!(store.find(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let store = MemoryRecordStore::new();
        let outcome = store
            .create_if_absent(new_certificate("abc", "Ana"))
            .await
            .unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));

        let found = store
            .find(&CertificateId::parse("abc").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Ana");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_existing_keeps_original() {
        let store = MemoryRecordStore::new();
        store
            .create_if_absent(new_certificate("abc", "Ana"))
            .await
            .unwrap();

        let outcome = store
            .create_if_absent(new_certificate("abc", "Bob"))
            .await
            .unwrap();

        match outcome {
            CreateOutcome::Existing(record) => assert_eq!(record.name, "Ana"),
            other => panic!("expected existing record, got {:?}", other),
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_have_single_winner() {
        let store = std::sync::Arc::new(MemoryRecordStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create_if_absent(new_certificate("race", &format!("caller-{}", i)))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), CreateOutcome::Created(_)) {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }
}
