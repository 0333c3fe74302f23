//! SQLite implementation of the ElementRepository.
//!
//! `apply_active_label` is the one place the active-sort relabel protocol
//! touches storage: label insertion, downstream truncation, and frontier
//! re-seeding commit together or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Comparison, ElementKind, Label, Slice, SliceRef};
use crate::domain::ports::ElementRepository;

use super::parse_datetime;

#[derive(Clone)]
pub struct SqliteElementRepository {
    pool: SqlitePool,
}

impl SqliteElementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ElementRepository for SqliteElementRepository {
    async fn session_slices(&self, session_id: i64) -> DomainResult<Vec<Slice>> {
        let rows: Vec<ElementRow> = sqlx::query_as(
            r#"SELECT id, session_id, element_index,
                      image_id_1, slice_dim_1, slice_index_1,
                      image_id_2, slice_dim_2, slice_index_2
               FROM session_elements
               WHERE session_id = ? AND element_kind = ?
               ORDER BY element_index"#,
        )
        .bind(session_id)
        .bind(ElementKind::Slice.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Slice {
                id: row.id,
                session_id: row.session_id,
                element_index: row.element_index,
                slice: SliceRef::new(row.image_id_1, row.slice_dim_1, row.slice_index_1),
            })
            .collect())
    }

    async fn session_comparisons(&self, session_id: i64) -> DomainResult<Vec<Comparison>> {
        let rows: Vec<ElementRow> = sqlx::query_as(
            r#"SELECT id, session_id, element_index,
                      image_id_1, slice_dim_1, slice_index_1,
                      image_id_2, slice_dim_2, slice_index_2
               FROM session_elements
               WHERE session_id = ? AND element_kind = ?
               ORDER BY element_index"#,
        )
        .bind(session_id)
        .bind(ElementKind::Comparison.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert_comparison(
        &self,
        session_id: i64,
        element_index: i64,
        left: SliceRef,
        right: SliceRef,
    ) -> DomainResult<i64> {
        let result = sqlx::query(
            r#"INSERT INTO session_elements
               (session_id, element_kind, element_index,
                image_id_1, slice_dim_1, slice_index_1,
                image_id_2, slice_dim_2, slice_index_2)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session_id)
        .bind(ElementKind::Comparison.as_str())
        .bind(element_index)
        .bind(left.image_id)
        .bind(left.slice_dim)
        .bind(left.slice_index)
        .bind(right.image_id)
        .bind(right.slice_dim)
        .bind(right.slice_index)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn delete_comparisons_after(&self, session_id: i64, index: i64) -> DomainResult<()> {
        sqlx::query(
            "DELETE FROM session_elements WHERE session_id = ? AND element_kind = ? AND element_index > ?",
        )
        .bind(session_id)
        .bind(ElementKind::Comparison.as_str())
        .bind(index)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_label(
        &self,
        element_id: i64,
        value: &str,
        start_at: DateTime<Utc>,
        finish_at: DateTime<Utc>,
    ) -> DomainResult<i64> {
        let result = sqlx::query(
            "INSERT INTO element_labels (element_id, label_value, start_at, finish_at) VALUES (?, ?, ?, ?)",
        )
        .bind(element_id)
        .bind(value)
        .bind(start_at.to_rfc3339())
        .bind(finish_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn element_labels(&self, element_id: i64) -> DomainResult<Vec<Label>> {
        let rows: Vec<LabelRow> = sqlx::query_as(
            r#"SELECT id, element_id, label_value, start_at, finish_at
               FROM element_labels WHERE element_id = ? ORDER BY id"#,
        )
        .bind(element_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn current_labels(&self, session_id: i64) -> DomainResult<HashMap<i64, Label>> {
        let rows: Vec<LabelRow> = sqlx::query_as(
            r#"SELECT l.id, l.element_id, l.label_value, l.start_at, l.finish_at
               FROM element_labels l
               JOIN session_elements e ON e.id = l.element_id
               WHERE e.session_id = ?"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let mut current: HashMap<i64, Label> = HashMap::new();
        for row in rows {
            let label: Label = row.try_into()?;
            match current.get(&label.element_id) {
                Some(existing) if !label.supersedes(existing) => {}
                _ => {
                    current.insert(label.element_id, label);
                }
            }
        }
        Ok(current)
    }

    async fn apply_active_label(
        &self,
        session_id: i64,
        element_id: i64,
        element_index: i64,
        value: &str,
        start_at: DateTime<Utc>,
        finish_at: DateTime<Utc>,
        next_comparison: Option<(SliceRef, SliceRef)>,
    ) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        // The target element must still exist at the expected index; the
        // frontier can have moved since the caller loaded it.
        let target: Option<(i64,)> = sqlx::query_as(
            r#"SELECT id FROM session_elements
               WHERE id = ? AND session_id = ? AND element_kind = ? AND element_index = ?"#,
        )
        .bind(element_id)
        .bind(session_id)
        .bind(ElementKind::Comparison.as_str())
        .bind(element_index)
        .fetch_optional(&mut *tx)
        .await?;

        if target.is_none() {
            tx.rollback().await?;
            return Err(DomainError::InvalidElementReference { session_id, element_id });
        }

        sqlx::query(
            "INSERT INTO element_labels (element_id, label_value, start_at, finish_at) VALUES (?, ?, ?, ?)",
        )
        .bind(element_id)
        .bind(value)
        .bind(start_at.to_rfc3339())
        .bind(finish_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        // Downstream comparisons lose their premises; their labels cascade.
        sqlx::query(
            "DELETE FROM session_elements WHERE session_id = ? AND element_kind = ? AND element_index > ?",
        )
        .bind(session_id)
        .bind(ElementKind::Comparison.as_str())
        .bind(element_index)
        .execute(&mut *tx)
        .await?;

        if let Some((left, right)) = next_comparison {
            sqlx::query(
                r#"INSERT INTO session_elements
                   (session_id, element_kind, element_index,
                    image_id_1, slice_dim_1, slice_index_1,
                    image_id_2, slice_dim_2, slice_index_2)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(session_id)
            .bind(ElementKind::Comparison.as_str())
            .bind(element_index + 1)
            .bind(left.image_id)
            .bind(left.slice_dim)
            .bind(left.slice_index)
            .bind(right.image_id)
            .bind(right.slice_dim)
            .bind(right.slice_index)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ElementRow {
    id: i64,
    session_id: i64,
    element_index: i64,
    image_id_1: i64,
    slice_dim_1: u32,
    slice_index_1: u32,
    image_id_2: Option<i64>,
    slice_dim_2: Option<u32>,
    slice_index_2: Option<u32>,
}

impl TryFrom<ElementRow> for Comparison {
    type Error = DomainError;

    fn try_from(row: ElementRow) -> Result<Self, Self::Error> {
        let (Some(image_id_2), Some(slice_dim_2), Some(slice_index_2)) =
            (row.image_id_2, row.slice_dim_2, row.slice_index_2)
        else {
            return Err(DomainError::SerializationError(format!(
                "comparison element {} is missing its second slice",
                row.id
            )));
        };

        Ok(Comparison {
            id: row.id,
            session_id: row.session_id,
            element_index: row.element_index,
            left: SliceRef::new(row.image_id_1, row.slice_dim_1, row.slice_index_1),
            right: SliceRef::new(image_id_2, slice_dim_2, slice_index_2),
        })
    }
}

#[derive(sqlx::FromRow)]
struct LabelRow {
    id: i64,
    element_id: i64,
    label_value: String,
    start_at: String,
    finish_at: String,
}

impl TryFrom<LabelRow> for Label {
    type Error = DomainError;

    fn try_from(row: LabelRow) -> Result<Self, Self::Error> {
        Ok(Label {
            id: row.id,
            element_id: row.element_id,
            value: row.label_value,
            start_at: parse_datetime(&row.start_at)?,
            finish_at: parse_datetime(&row.finish_at)?,
        })
    }
}
