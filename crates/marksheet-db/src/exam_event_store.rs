//! Exam events (the sittings component marks are entered against).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use marksheet_types::{ExamEvent, ExamEventId, ExamStatus, ExamType};

use crate::codec::{parse_code, semester_from_db, semester_to_db};
use crate::error::DbError;

/// Columns selected for an [`ExamEventRow`].
const EXAM_EVENT_COLUMNS: &str = "id, name, exam_type, status, department, semester, \
     academic_year, start_date, end_date, passing_percentage, created_at";

/// Fields required to schedule an exam event.
#[derive(Debug, Clone)]
pub struct NewExamEvent {
    /// Display name.
    pub name: String,
    /// Kind of examination.
    pub exam_type: ExamType,
    /// Initial lifecycle state.
    pub status: ExamStatus,
    /// Department sitting the exam.
    pub department: String,
    /// Semester (1 to 8).
    pub semester: u8,
    /// Academic year label.
    pub academic_year: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Announced pass percentage.
    pub passing_percentage: Decimal,
}

/// Operations on the `exam_events` table.
pub struct ExamEventStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ExamEventStore<'a> {
    /// Create a new exam event store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an exam event and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn create(&self, new: &NewExamEvent) -> Result<ExamEvent, DbError> {
        let row = sqlx::query_as::<_, ExamEventRow>(&format!(
            r"INSERT INTO exam_events (name, exam_type, status, department, semester, academic_year, start_date, end_date, passing_percentage)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              RETURNING {EXAM_EVENT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(new.exam_type.as_str())
        .bind(new.status.as_str())
        .bind(&new.department)
        .bind(semester_to_db(new.semester))
        .bind(&new.academic_year)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.passing_percentage)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(exam_event_id = %row.id, "Inserted exam event");
        row.into_exam_event()
    }

    /// Fetch an exam event by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, id: ExamEventId) -> Result<Option<ExamEvent>, DbError> {
        let row = sqlx::query_as::<_, ExamEventRow>(&format!(
            "SELECT {EXAM_EVENT_COLUMNS} FROM exam_events WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(ExamEventRow::into_exam_event).transpose()
    }

    /// List exam events, newest first, optionally for one department.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(&self, department: Option<&str>) -> Result<Vec<ExamEvent>, DbError> {
        let rows = sqlx::query_as::<_, ExamEventRow>(&format!(
            r"SELECT {EXAM_EVENT_COLUMNS} FROM exam_events
              WHERE ($1::TEXT IS NULL OR department = $1)
              ORDER BY start_date DESC, name"
        ))
        .bind(department)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ExamEventRow::into_exam_event).collect()
    }
}

/// A row from the `exam_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExamEventRow {
    /// Exam event UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Exam type code.
    pub exam_type: String,
    /// Status code.
    pub status: String,
    /// Department.
    pub department: String,
    /// Semester.
    pub semester: i16,
    /// Academic year label.
    pub academic_year: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Pass percentage.
    pub passing_percentage: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ExamEventRow {
    /// Convert into the domain [`ExamEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if a code or semester column is invalid.
    pub fn into_exam_event(self) -> Result<ExamEvent, DbError> {
        Ok(ExamEvent {
            id: ExamEventId::from(self.id),
            name: self.name,
            exam_type: parse_code("exam_events", &self.exam_type)?,
            status: parse_code("exam_events", &self.status)?,
            department: self.department,
            semester: semester_from_db("exam_events", self.semester)?,
            academic_year: self.academic_year,
            start_date: self.start_date,
            end_date: self.end_date,
            passing_percentage: self.passing_percentage,
            created_at: self.created_at,
        })
    }
}
