//! Remarks service — reviewer comments attached to a session's criteria.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RemarkError {
    #[error("remark comment is empty")]
    EmptyComment,
    #[error("remark criterion is empty")]
    EmptyCriterion,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Remark {
    pub id: Uuid,
    pub session_id: String,
    pub criterion: String,
    pub comment: String,
    pub attachment_path: Option<String>,
    pub author: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRemark {
    pub criterion: String,
    pub comment: String,
    #[serde(default)]
    pub attachment_path: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl NewRemark {
    /// Trim fields and reject blank comments or criteria.
    ///
    /// # Errors
    ///
    /// Returns [`RemarkError::EmptyComment`] or [`RemarkError::EmptyCriterion`].
    pub fn normalized(self) -> Result<Self, RemarkError> {
        let criterion = self.criterion.trim().to_owned();
        if criterion.is_empty() {
            return Err(RemarkError::EmptyCriterion);
        }
        let comment = self.comment.trim().to_owned();
        if comment.is_empty() {
            return Err(RemarkError::EmptyComment);
        }
        Ok(Self {
            criterion,
            comment,
            attachment_path: non_blank(self.attachment_path),
            author: non_blank(self.author),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Insert a remark for `session_id`.
///
/// # Errors
///
/// Returns a validation error for blank input, or a database error.
pub async fn create_remark(pool: &PgPool, session_id: &str, remark: NewRemark) -> Result<Remark, RemarkError> {
    let remark = remark.normalized()?;
    let row = sqlx::query_as::<_, Remark>(
        r#"INSERT INTO user_remarks (id, session_id, criterion, comment, attachment_path, author)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING id, session_id, criterion, comment, attachment_path, author,
                     to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at"#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(&remark.criterion)
    .bind(&remark.comment)
    .bind(&remark.attachment_path)
    .bind(&remark.author)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

// Order on the table column: the `created_at` alias is second-resolution text.
const LIST_REMARKS_SQL: &str = r#"SELECT id, session_id, criterion, comment, attachment_path, author,
          to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
   FROM user_remarks
   WHERE session_id = $1
     AND ($2::text IS NULL OR criterion = $2)
   ORDER BY user_remarks.created_at ASC, user_remarks.id ASC"#;

/// List remarks for a session, oldest first, optionally narrowed to one
/// criterion.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_remarks(pool: &PgPool, session_id: &str, criterion: Option<&str>) -> Result<Vec<Remark>, RemarkError> {
    let rows = sqlx::query_as::<_, Remark>(LIST_REMARKS_SQL)
        .bind(session_id)
        .bind(criterion)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

#[cfg(test)]
#[path = "remarks_test.rs"]
mod tests;
