//! SQLite implementation of the SessionRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ElementKind, LabelingSession, SessionKind, SliceRef};
use crate::domain::ports::{NewSession, SessionRepository};

use super::parse_datetime;

#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_element(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: i64,
    kind: ElementKind,
    element_index: i64,
    first: SliceRef,
    second: Option<SliceRef>,
) -> DomainResult<i64> {
    let result = sqlx::query(
        r#"INSERT INTO session_elements
           (session_id, element_kind, element_index,
            image_id_1, slice_dim_1, slice_index_1,
            image_id_2, slice_dim_2, slice_index_2)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(session_id)
    .bind(kind.as_str())
    .bind(element_index)
    .bind(first.image_id)
    .bind(first.slice_dim)
    .bind(first.slice_index)
    .bind(second.map(|s| s.image_id))
    .bind(second.map(|s| s.slice_dim))
    .bind(second.map(|s| s.slice_index))
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(
        &self,
        session: NewSession,
        slices: &[SliceRef],
        comparisons: &[(SliceRef, SliceRef)],
    ) -> DomainResult<LabelingSession> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"INSERT INTO labeling_sessions
               (dataset_id, session_kind, session_name, prompt, label_options, metadata_json, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.dataset_id)
        .bind(session.kind.as_str())
        .bind(&session.name)
        .bind(&session.prompt)
        .bind(&session.label_options)
        .bind(&session.metadata_json)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let session_id = result.last_insert_rowid();

        for (index, slice) in slices.iter().enumerate() {
            insert_element(&mut tx, session_id, ElementKind::Slice, index as i64, *slice, None)
                .await?;
        }

        for (index, (left, right)) in comparisons.iter().enumerate() {
            insert_element(
                &mut tx,
                session_id,
                ElementKind::Comparison,
                index as i64,
                *left,
                Some(*right),
            )
            .await?;
        }

        tx.commit().await?;

        Ok(LabelingSession {
            id: session_id,
            dataset_id: session.dataset_id,
            kind: session.kind,
            name: session.name,
            prompt: session.prompt,
            label_options: session.label_options,
            metadata_json: session.metadata_json,
            created_at,
        })
    }

    async fn get(&self, id: i64) -> DomainResult<Option<LabelingSession>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"SELECT id, dataset_id, session_kind, session_name, prompt, label_options, metadata_json, created_at
               FROM labeling_sessions WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_dataset(&self, dataset_id: i64) -> DomainResult<Vec<LabelingSession>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            r#"SELECT id, dataset_id, session_kind, session_name, prompt, label_options, metadata_json, created_at
               FROM labeling_sessions WHERE dataset_id = ? ORDER BY id"#,
        )
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        // Elements and labels follow via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM labeling_sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SessionNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i64,
    dataset_id: i64,
    session_kind: String,
    session_name: String,
    prompt: String,
    label_options: String,
    metadata_json: String,
    created_at: String,
}

impl TryFrom<SessionRow> for LabelingSession {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let kind = SessionKind::from_str(&row.session_kind).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid session kind: {}", row.session_kind))
        })?;

        Ok(LabelingSession {
            id: row.id,
            dataset_id: row.dataset_id,
            kind,
            name: row.session_name,
            prompt: row.prompt,
            label_options: row.label_options,
            metadata_json: row.metadata_json,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
