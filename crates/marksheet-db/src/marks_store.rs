//! Component mark entry and lookup.
//!
//! Marks are keyed by (student, component, exam event). Re-entering marks
//! for the same key overwrites the previous values in place.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use marksheet_types::{
    ComponentMark, ComponentMarkId, ExamEventId, StudentId, SubjectComponent,
    SubjectComponentId, SubjectId,
};

use crate::codec::{parse_code, qualified, semester_to_db};
use crate::error::DbError;

/// Columns selected for a [`MarkRow`].
const MARK_COLUMNS: &str = "id, student_id, subject_id, component_id, component_type, \
     exam_event_id, marks_obtained, max_marks, passing_marks, is_absent, entered_by, remarks, \
     entered_at";

/// Marks of one student in a bulk entry.
#[derive(Debug, Clone)]
pub struct MarkEntry {
    /// The student.
    pub student_id: StudentId,
    /// Marks scored.
    pub marks_obtained: Decimal,
    /// Whether the student was absent.
    pub is_absent: bool,
    /// Examiner remarks; `None` keeps any existing remark.
    pub remarks: Option<String>,
}

/// How many rows a bulk entry inserted and overwrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertCounts {
    /// New rows.
    pub created: u32,
    /// Existing rows overwritten.
    pub updated: u32,
}

impl UpsertCounts {
    /// Rows touched in total.
    pub const fn total(self) -> u32 {
        self.created.saturating_add(self.updated)
    }
}

/// Operations on the `component_marks` table.
pub struct MarksStore<'a> {
    pool: &'a PgPool,
}

impl<'a> MarksStore<'a> {
    /// Create a new marks store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert one component's marks for many students in one transaction.
    ///
    /// `max_marks` and `passing_marks` are copied from `component`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingReference`] if a student or the exam event
    /// does not exist; nothing is written in that case.
    pub async fn bulk_upsert(
        &self,
        component: &SubjectComponent,
        exam_event_id: ExamEventId,
        entered_by: Option<&str>,
        entries: &[MarkEntry],
    ) -> Result<UpsertCounts, DbError> {
        let mut counts = UpsertCounts::default();
        if entries.is_empty() {
            return Ok(counts);
        }

        let mut tx = self.pool.begin().await?;

        for entry in entries {
            let inserted: bool = sqlx::query_scalar(
                r"INSERT INTO component_marks (student_id, subject_id, component_id, component_type, exam_event_id, marks_obtained, max_marks, passing_marks, is_absent, entered_by, remarks)
                  VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                  ON CONFLICT (student_id, component_id, exam_event_id) DO UPDATE SET
                      marks_obtained = EXCLUDED.marks_obtained,
                      max_marks = EXCLUDED.max_marks,
                      passing_marks = EXCLUDED.passing_marks,
                      is_absent = EXCLUDED.is_absent,
                      entered_by = EXCLUDED.entered_by,
                      remarks = COALESCE(EXCLUDED.remarks, component_marks.remarks),
                      entered_at = now()
                  RETURNING (xmax = 0) AS inserted",
            )
            .bind(entry.student_id.into_inner())
            .bind(component.subject_id.into_inner())
            .bind(component.id.into_inner())
            .bind(component.component_type.as_str())
            .bind(exam_event_id.into_inner())
            .bind(entry.marks_obtained)
            .bind(component.out_of_marks)
            .bind(component.passing_marks)
            .bind(entry.is_absent)
            .bind(entered_by)
            .bind(&entry.remarks)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DbError::on_insert(e, "component mark"))?;

            if inserted {
                counts.created = counts.created.saturating_add(1);
            } else {
                counts.updated = counts.updated.saturating_add(1);
            }
        }

        tx.commit().await?;

        tracing::debug!(
            component_id = %component.id,
            exam_event_id = %exam_event_id,
            created = counts.created,
            updated = counts.updated,
            "Upserted component marks"
        );
        Ok(counts)
    }

    /// Every mark row of one student in one subject.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn for_student_subject(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
    ) -> Result<Vec<ComponentMark>, DbError> {
        let rows = sqlx::query_as::<_, MarkRow>(&format!(
            r"SELECT {MARK_COLUMNS} FROM component_marks
              WHERE student_id = $1 AND subject_id = $2
              ORDER BY component_type, entered_at"
        ))
        .bind(student_id.into_inner())
        .bind(subject_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MarkRow::into_mark).collect()
    }

    /// IDs of the subjects of a semester in which the student has marks.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn subjects_with_marks(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<Vec<SubjectId>, DbError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r"SELECT DISTINCT s.id FROM component_marks m
              JOIN subjects s ON s.id = m.subject_id
              WHERE m.student_id = $1 AND s.semester = $2 AND s.academic_year = $3
              ORDER BY s.id",
        )
        .bind(student_id.into_inner())
        .bind(semester_to_db(semester))
        .bind(academic_year)
        .fetch_all(self.pool)
        .await?;

        Ok(ids.into_iter().map(SubjectId::from).collect())
    }

    /// Every mark row, optionally restricted to students of a department
    /// and current semester.
    ///
    /// The semester filter matches the student's `current_semester`, not
    /// the subject's semester.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(
        &self,
        department: Option<&str>,
        semester: Option<u8>,
    ) -> Result<Vec<ComponentMark>, DbError> {
        let rows = sqlx::query_as::<_, MarkRow>(&format!(
            r"SELECT {} FROM component_marks m
              JOIN students st ON st.id = m.student_id
              WHERE ($1::TEXT IS NULL OR st.department = $1)
                AND ($2::SMALLINT IS NULL OR st.current_semester = $2)
              ORDER BY m.entered_at, m.id",
            qualified(MARK_COLUMNS, "m")
        ))
        .bind(department)
        .bind(semester.map(semester_to_db))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MarkRow::into_mark).collect()
    }
}

/// A row from the `component_marks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MarkRow {
    /// Row UUID.
    pub id: Uuid,
    /// Student UUID.
    pub student_id: Uuid,
    /// Subject UUID.
    pub subject_id: Uuid,
    /// Component UUID.
    pub component_id: Uuid,
    /// Component type code.
    pub component_type: String,
    /// Exam event UUID.
    pub exam_event_id: Uuid,
    /// Marks scored.
    pub marks_obtained: Decimal,
    /// Maximum marks.
    pub max_marks: Decimal,
    /// Pass mark.
    pub passing_marks: Decimal,
    /// Absent flag.
    pub is_absent: bool,
    /// Who entered the marks.
    pub entered_by: Option<String>,
    /// Examiner remarks.
    pub remarks: Option<String>,
    /// Entry timestamp.
    pub entered_at: DateTime<Utc>,
}

impl MarkRow {
    /// Convert into the domain [`ComponentMark`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the component type is unknown.
    pub fn into_mark(self) -> Result<ComponentMark, DbError> {
        Ok(ComponentMark {
            id: ComponentMarkId::from(self.id),
            student_id: StudentId::from(self.student_id),
            subject_id: SubjectId::from(self.subject_id),
            component_id: SubjectComponentId::from(self.component_id),
            component_type: parse_code("component_marks", &self.component_type)?,
            exam_event_id: ExamEventId::from(self.exam_event_id),
            marks_obtained: self.marks_obtained,
            max_marks: self.max_marks,
            passing_marks: self.passing_marks,
            is_absent: self.is_absent,
            entered_by: self.entered_by,
            remarks: self.remarks,
            entered_at: self.entered_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_adds_both_counts() {
        let counts = UpsertCounts {
            created: 3,
            updated: 2,
        };
        assert_eq!(counts.total(), 5);
        assert_eq!(UpsertCounts::default().total(), 0);
    }
}
