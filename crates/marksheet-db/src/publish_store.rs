//! Result publication to the student portal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use marksheet_types::{PublicationId, PublishedResult, ResultClass, ResultStatus, StudentId};

use crate::codec::{count_from_db, parse_code, semester_from_db, semester_to_db};
use crate::error::DbError;

/// A published result together with the semester summary it exposes.
///
/// The summary fields are `None` when the semester result was never
/// calculated (or was deleted after publication).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedResultView {
    /// The publication record.
    #[serde(flatten)]
    pub publication: PublishedResult,
    /// SGPA of the semester.
    pub sgpa: Option<Decimal>,
    /// CGPA recorded with the semester.
    pub cgpa: Option<Decimal>,
    /// PASS or FAIL.
    pub result_status: Option<ResultStatus>,
    /// Result class.
    pub result_class: Option<ResultClass>,
    /// Subjects passed.
    pub subjects_passed: Option<u32>,
    /// Subjects failed.
    pub subjects_failed: Option<u32>,
}

/// Operations on the `published_results` table.
pub struct PublishStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PublishStore<'a> {
    /// Create a new publish store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Publish one semester's results for a set of students.
    ///
    /// Students already published for the term are skipped. Returns the
    /// number of newly published results.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingReference`] if a student does not exist.
    pub async fn publish(
        &self,
        student_ids: &[StudentId],
        semester: u8,
        academic_year: &str,
        department: &str,
        published_by: Option<&str>,
    ) -> Result<u32, DbError> {
        if student_ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = student_ids.iter().map(|id| id.into_inner()).collect();

        let done = sqlx::query(
            r"INSERT INTO published_results (student_id, semester, academic_year, department, published_by)
              SELECT student_id, $2, $3, $4, $5 FROM UNNEST($1::UUID[]) AS t(student_id)
              ON CONFLICT (student_id, semester, academic_year) DO NOTHING",
        )
        .bind(&ids)
        .bind(semester_to_db(semester))
        .bind(academic_year)
        .bind(department)
        .bind(published_by)
        .execute(self.pool)
        .await
        .map_err(|e| DbError::on_insert(e, "published result"))?;

        let published = u32::try_from(done.rows_affected()).unwrap_or(u32::MAX);
        tracing::info!(
            department,
            semester,
            academic_year,
            requested = student_ids.len(),
            published,
            "Published results"
        );
        Ok(published)
    }

    /// Every published result of a student, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn published_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<PublishedResultView>, DbError> {
        let rows = sqlx::query_as::<_, PublishedRow>(
            r"SELECT p.id, p.student_id, p.semester, p.academic_year, p.department,
                     p.published_by, p.published_at, p.is_viewed, p.viewed_at,
                     r.sgpa, r.cgpa, r.result_status, r.result_class,
                     r.subjects_passed, r.subjects_failed
              FROM published_results p
              LEFT JOIN semester_results r
                ON r.student_id = p.student_id
               AND r.semester = p.semester
               AND r.academic_year = p.academic_year
              WHERE p.student_id = $1
              ORDER BY p.published_at DESC",
        )
        .bind(student_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(PublishedRow::into_view).collect()
    }

    /// Mark a published result as viewed. The first view time is kept.
    ///
    /// Returns `false` if nothing was published for the term.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn mark_viewed(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<bool, DbError> {
        let done = sqlx::query(
            r"UPDATE published_results
              SET is_viewed = TRUE, viewed_at = COALESCE(viewed_at, now())
              WHERE student_id = $1 AND semester = $2 AND academic_year = $3",
        )
        .bind(student_id.into_inner())
        .bind(semester_to_db(semester))
        .bind(academic_year)
        .execute(self.pool)
        .await?;

        Ok(done.rows_affected() > 0)
    }
}

/// A `published_results` row left-joined with its semester result.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PublishedRow {
    id: Uuid,
    student_id: Uuid,
    semester: i16,
    academic_year: String,
    department: String,
    published_by: Option<String>,
    published_at: DateTime<Utc>,
    is_viewed: bool,
    viewed_at: Option<DateTime<Utc>>,
    sgpa: Option<Decimal>,
    cgpa: Option<Decimal>,
    result_status: Option<String>,
    result_class: Option<String>,
    subjects_passed: Option<i32>,
    subjects_failed: Option<i32>,
}

impl PublishedRow {
    fn into_view(self) -> Result<PublishedResultView, DbError> {
        const ENTITY: &str = "published_results";
        Ok(PublishedResultView {
            publication: PublishedResult {
                id: PublicationId::from(self.id),
                student_id: StudentId::from(self.student_id),
                semester: semester_from_db(ENTITY, self.semester)?,
                academic_year: self.academic_year,
                department: self.department,
                published_by: self.published_by,
                published_at: self.published_at,
                is_viewed: self.is_viewed,
                viewed_at: self.viewed_at,
            },
            sgpa: self.sgpa,
            cgpa: self.cgpa,
            result_status: self
                .result_status
                .map(|s| parse_code(ENTITY, &s))
                .transpose()?,
            result_class: self
                .result_class
                .map(|s| parse_code(ENTITY, &s))
                .transpose()?,
            subjects_passed: self
                .subjects_passed
                .map(|n| count_from_db(ENTITY, n))
                .transpose()?,
            subjects_failed: self
                .subjects_failed
                .map(|n| count_from_db(ENTITY, n))
                .transpose()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row() -> PublishedRow {
        PublishedRow {
            id: Uuid::now_v7(),
            student_id: Uuid::now_v7(),
            semester: 3,
            academic_year: String::from("2024-25"),
            department: String::from("CSE"),
            published_by: Some(String::from("exam-cell")),
            published_at: Utc::now(),
            is_viewed: false,
            viewed_at: None,
            sgpa: None,
            cgpa: None,
            result_status: None,
            result_class: None,
            subjects_passed: None,
            subjects_failed: None,
        }
    }

    #[test]
    fn missing_semester_result_leaves_summary_empty() {
        let view = row().into_view().unwrap();
        assert_eq!(view.publication.semester, 3);
        assert!(view.sgpa.is_none());
        assert!(view.result_status.is_none());
        assert!(view.subjects_failed.is_none());
    }

    #[test]
    fn joined_summary_is_decoded() {
        let mut joined = row();
        joined.sgpa = Some(Decimal::new(386, 2));
        joined.result_status = Some(String::from("FAIL"));
        joined.result_class = Some(String::from("Fail"));
        joined.subjects_passed = Some(1);
        joined.subjects_failed = Some(1);

        let view = joined.into_view().unwrap();
        assert_eq!(view.result_status, Some(ResultStatus::Fail));
        assert_eq!(view.result_class, Some(ResultClass::Fail));
        assert_eq!(view.subjects_failed, Some(1));
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let mut joined = row();
        joined.result_status = Some(String::from("MAYBE"));
        assert!(matches!(joined.into_view(), Err(DbError::Decode { .. })));
    }
}
