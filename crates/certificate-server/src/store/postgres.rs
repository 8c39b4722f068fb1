//! PostgreSQL record store.

use async_trait::async_trait;
use certificate_core::{CertificateId, CertificateRecord, NewCertificate};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{CreateOutcome, RecordStore, StoreError};

/// Row of the `certificates` table.
#[derive(Debug, FromRow)]
struct CertificateRow {
    id: String,
    name: String,
    grade: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CertificateRow> for CertificateRecord {
    type Error = StoreError;

    fn try_from(row: CertificateRow) -> Result<Self, Self::Error> {
        let id = CertificateId::parse(row.id.clone()).map_err(|e| StoreError::Corrupt {
            id: row.id,
            reason: e.to_string(),
        })?;

        Ok(CertificateRecord {
            id,
            name: row.name,
            grade: row.grade,
            created_at: row.created_at,
        })
    }
}

/// Record store backed by the `certificates` table.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find(&self, id: &CertificateId) -> Result<Option<CertificateRecord>, StoreError> {
        let row = sqlx::query_as::<_, CertificateRow>(
            "SELECT id, name, grade, created_at FROM certificates WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CertificateRecord::try_from).transpose()
    }

    async fn create_if_absent(&self, record: NewCertificate) -> Result<CreateOutcome, StoreError> {
        // ON CONFLICT DO NOTHING returns no row when the id is already taken.
        let inserted = sqlx::query_as::<_, CertificateRow>(
            r#"
            INSERT INTO certificates (id, name, grade, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, name, grade, created_at
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.name)
        .bind(&record.grade)
        .bind(record.created_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(CreateOutcome::Created(row.try_into()?));
        }

        match self.find(&record.id).await? {
            Some(existing) => Ok(CreateOutcome::Existing(existing)),
            None => Err(StoreError::Vanished(record.id.to_string())),
        }
    }
}
