//! Assessment service — assessments and the documents registered against them.
//!
//! DESIGN
//! ======
//! File bytes live in hosted storage; this service records their metadata
//! under an assessment id and the upload session id. The session id is what
//! the scoring workflow writes back into `ai_output`, so it is the key the
//! poller and results views use.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = r#"'YYYY-MM-DD"T"HH24:MI:SS"Z"'"#;

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("assessment not found: {0}")]
    NotFound(Uuid),
    #[error("assessment title is empty")]
    EmptyTitle,
    #[error("document file name is empty")]
    EmptyFileName,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Pending,
    Processing,
    Completed,
}

impl AssessmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }

    /// Parse a stored status. Unknown values read as pending.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            other => {
                tracing::warn!(status = other, "unknown assessment status; reading as pending");
                Self::Pending
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub id: Uuid,
    pub title: String,
    pub status: AssessmentStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct AssessmentRow {
    id: Uuid,
    title: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<AssessmentRow> for Assessment {
    fn from(row: AssessmentRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            status: AssessmentStatus::parse(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Metadata for one uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    pub file_name: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AssessmentDocument {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub session_id: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub storage_path: Option<String>,
}

/// Trim a title and reject blanks.
///
/// # Errors
///
/// Returns [`AssessmentError::EmptyTitle`] when nothing is left.
pub fn normalize_title(title: &str) -> Result<String, AssessmentError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AssessmentError::EmptyTitle);
    }
    Ok(title.to_owned())
}

/// Reject documents without a file name.
///
/// # Errors
///
/// Returns [`AssessmentError::EmptyFileName`] on the first blank name.
pub fn validate_documents(docs: &[NewDocument]) -> Result<(), AssessmentError> {
    if docs.iter().any(|d| d.file_name.trim().is_empty()) {
        return Err(AssessmentError::EmptyFileName);
    }
    Ok(())
}

fn select_columns() -> String {
    format!(
        "id, title, status,
         to_char(created_at AT TIME ZONE 'UTC', {TIMESTAMP_FORMAT}) AS created_at,
         to_char(updated_at AT TIME ZONE 'UTC', {TIMESTAMP_FORMAT}) AS updated_at"
    )
}

// =============================================================================
// CRUD
// =============================================================================

/// Create a pending assessment and register its documents under
/// `session_id`. Both inserts commit together or not at all.
///
/// # Errors
///
/// Returns a validation error for a blank title or file name, or a
/// database error.
pub async fn create_assessment(
    pool: &PgPool,
    title: &str,
    session_id: &str,
    docs: &[NewDocument],
) -> Result<(Assessment, Vec<AssessmentDocument>), AssessmentError> {
    let title = normalize_title(title)?;
    validate_documents(docs)?;

    let mut tx = pool.begin().await?;
    let created = insert_assessment(tx.as_mut(), &title).await?;
    let documents = register_documents(tx.as_mut(), created.id, session_id, docs).await?;
    tx.commit().await?;

    Ok((created, documents))
}

async fn insert_assessment(conn: &mut PgConnection, title: &str) -> Result<Assessment, AssessmentError> {
    let sql = format!("INSERT INTO assessments (id, title, status) VALUES ($1, $2, $3) RETURNING {}", select_columns());
    let row = sqlx::query_as::<_, AssessmentRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(AssessmentStatus::Pending.as_str())
        .fetch_one(conn)
        .await?;

    Ok(row.into())
}

/// List assessments, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_assessments(pool: &PgPool) -> Result<Vec<Assessment>, AssessmentError> {
    let sql = format!("SELECT {} FROM assessments ORDER BY assessments.created_at DESC, assessments.id DESC", select_columns());
    let rows = sqlx::query_as::<_, AssessmentRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Assessment::from).collect())
}

/// Load one assessment.
///
/// # Errors
///
/// Returns [`AssessmentError::NotFound`] when absent, or a database error.
pub async fn get_assessment(pool: &PgPool, id: Uuid) -> Result<Assessment, AssessmentError> {
    let sql = format!("SELECT {} FROM assessments WHERE id = $1", select_columns());
    let row = sqlx::query_as::<_, AssessmentRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AssessmentError::NotFound(id))?;

    Ok(row.into())
}

/// Set the status of an assessment.
///
/// # Errors
///
/// Returns [`AssessmentError::NotFound`] when absent, or a database error.
pub async fn update_status(pool: &PgPool, id: Uuid, status: AssessmentStatus) -> Result<(), AssessmentError> {
    let result = sqlx::query("UPDATE assessments SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AssessmentError::NotFound(id));
    }
    Ok(())
}

/// Record document metadata for an assessment's upload session. Runs on
/// the caller's connection so it can share a transaction.
///
/// # Errors
///
/// Returns a validation error for blank file names, or a database error.
pub async fn register_documents(
    conn: &mut PgConnection,
    assessment_id: Uuid,
    session_id: &str,
    docs: &[NewDocument],
) -> Result<Vec<AssessmentDocument>, AssessmentError> {
    validate_documents(docs)?;
    if docs.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "INSERT INTO assessment_documents (id, assessment_id, session_id, file_name, file_size, mime_type, storage_path) ",
    );
    builder.push_values(docs, |mut b, doc| {
        b.push_bind(Uuid::new_v4())
            .push_bind(assessment_id)
            .push_bind(session_id)
            .push_bind(doc.file_name.trim())
            .push_bind(doc.file_size)
            .push_bind(doc.mime_type.as_deref())
            .push_bind(doc.storage_path.as_deref());
    });
    builder.push(" RETURNING id, assessment_id, session_id, file_name, file_size, mime_type, storage_path");

    let rows = builder
        .build_query_as::<AssessmentDocument>()
        .fetch_all(conn)
        .await?;

    Ok(rows)
}

/// List documents registered for an assessment.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_documents(pool: &PgPool, assessment_id: Uuid) -> Result<Vec<AssessmentDocument>, AssessmentError> {
    let rows = sqlx::query_as::<_, AssessmentDocument>(
        "SELECT id, assessment_id, session_id, file_name, file_size, mime_type, storage_path
         FROM assessment_documents
         WHERE assessment_id = $1
         ORDER BY created_at ASC",
    )
    .bind(assessment_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
#[path = "assessment_test.rs"]
mod tests;
