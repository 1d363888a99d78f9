//! Persisted subject and semester results.
//!
//! Results are only ever written by the grading resolvers, through
//! [`ResultStore::upsert_subject_result`] and
//! [`ResultStore::upsert_semester_result`]. Both are keyed by natural key,
//! so recomputation replaces the previous row and keeps its ID.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use marksheet_types::{
    SemesterResult, SemesterResultId, StudentId, SubjectId, SubjectResult, SubjectResultId,
};

use crate::codec::{
    count_from_db, count_to_db, parse_code, qualified, semester_from_db, semester_to_db,
};
use crate::error::DbError;

/// Columns of `subject_results`, in [`SubjectResultRow`] order.
const SUBJECT_RESULT_COLUMNS: &str = "id, student_id, subject_id, academic_year, semester, \
     ia_marks, ese_marks, oral_marks, practical_marks, tw_marks, total_marks_obtained, \
     total_max_marks, percentage, grade, grade_points, is_pass, credits_earned, is_backlog, \
     attempt_number, calculated_at";

/// Columns of `semester_results`, in [`SemesterResultRow`] order.
const SEMESTER_RESULT_COLUMNS: &str = "id, student_id, semester, academic_year, \
     total_subjects, subjects_passed, subjects_failed, total_credits_attempted, \
     total_credits_earned, total_credit_points, sgpa, cgpa, overall_percentage, \
     total_marks_obtained, total_max_marks, result_status, result_class, backlog_subjects, \
     has_backlogs, calculated_at";

/// A subject result with the subject's catalog details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectResultListing {
    /// Subject code.
    pub subject_code: String,
    /// Subject name.
    pub subject_name: String,
    /// Full credit value of the subject.
    pub credits: u32,
    /// The result itself.
    #[serde(flatten)]
    pub result: SubjectResult,
}

/// A semester result with the student's name and roll number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterResultListing {
    /// Student display name.
    pub student_name: String,
    /// Roll number.
    pub roll_number: Option<String>,
    /// The result itself.
    #[serde(flatten)]
    pub result: SemesterResult,
}

/// Operations on the `subject_results` and `semester_results` tables.
pub struct ResultStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ResultStore<'a> {
    /// Create a new result store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -----------------------------------------------------------------------
    // Subject results
    // -----------------------------------------------------------------------

    /// Insert or replace a subject result on (student, subject, academic
    /// year, attempt number).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert_subject_result(
        &self,
        result: &SubjectResult,
    ) -> Result<SubjectResult, DbError> {
        let row = sqlx::query_as::<_, SubjectResultRow>(&format!(
            r"INSERT INTO subject_results ({SUBJECT_RESULT_COLUMNS})
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
              ON CONFLICT (student_id, subject_id, academic_year, attempt_number) DO UPDATE SET
                  semester = EXCLUDED.semester,
                  ia_marks = EXCLUDED.ia_marks,
                  ese_marks = EXCLUDED.ese_marks,
                  oral_marks = EXCLUDED.oral_marks,
                  practical_marks = EXCLUDED.practical_marks,
                  tw_marks = EXCLUDED.tw_marks,
                  total_marks_obtained = EXCLUDED.total_marks_obtained,
                  total_max_marks = EXCLUDED.total_max_marks,
                  percentage = EXCLUDED.percentage,
                  grade = EXCLUDED.grade,
                  grade_points = EXCLUDED.grade_points,
                  is_pass = EXCLUDED.is_pass,
                  credits_earned = EXCLUDED.credits_earned,
                  is_backlog = EXCLUDED.is_backlog,
                  calculated_at = EXCLUDED.calculated_at
              RETURNING {SUBJECT_RESULT_COLUMNS}"
        ))
        .bind(result.id.into_inner())
        .bind(result.student_id.into_inner())
        .bind(result.subject_id.into_inner())
        .bind(&result.academic_year)
        .bind(semester_to_db(result.semester))
        .bind(result.ia_marks)
        .bind(result.ese_marks)
        .bind(result.oral_marks)
        .bind(result.practical_marks)
        .bind(result.tw_marks)
        .bind(result.total_marks_obtained)
        .bind(result.total_max_marks)
        .bind(result.percentage)
        .bind(result.grade.as_str())
        .bind(result.grade_points)
        .bind(result.is_pass)
        .bind(count_to_db(result.credits_earned))
        .bind(result.is_backlog)
        .bind(count_to_db(result.attempt_number))
        .bind(result.calculated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::on_insert(e, "subject result"))?;

        tracing::debug!(
            subject_result_id = %row.id,
            student_id = %result.student_id,
            subject_id = %result.subject_id,
            "Upserted subject result"
        );
        row.into_result()
    }

    /// The latest attempt of one student in one subject for a year.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn subject_result(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
        academic_year: &str,
    ) -> Result<Option<SubjectResult>, DbError> {
        let row = sqlx::query_as::<_, SubjectResultRow>(&format!(
            r"SELECT {SUBJECT_RESULT_COLUMNS} FROM subject_results
              WHERE student_id = $1 AND subject_id = $2 AND academic_year = $3
              ORDER BY attempt_number DESC
              LIMIT 1"
        ))
        .bind(student_id.into_inner())
        .bind(subject_id.into_inner())
        .bind(academic_year)
        .fetch_optional(self.pool)
        .await?;

        row.map(SubjectResultRow::into_result).transpose()
    }

    /// Every subject result of one student for one semester.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn subject_results(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<Vec<SubjectResult>, DbError> {
        let rows = sqlx::query_as::<_, SubjectResultRow>(&format!(
            r"SELECT {SUBJECT_RESULT_COLUMNS} FROM subject_results
              WHERE student_id = $1 AND semester = $2 AND academic_year = $3
              ORDER BY subject_id, attempt_number"
        ))
        .bind(student_id.into_inner())
        .bind(semester_to_db(semester))
        .bind(academic_year)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SubjectResultRow::into_result).collect()
    }

    /// A student's subject results for a semester, with subject details.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn subject_result_listing(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<Vec<SubjectResultListing>, DbError> {
        let rows = sqlx::query_as::<_, SubjectResultListingRow>(&format!(
            r"SELECT {}, s.code AS subject_code, s.name AS subject_name, s.credits AS subject_credits
              FROM subject_results r
              JOIN subjects s ON s.id = r.subject_id
              WHERE r.student_id = $1 AND r.semester = $2 AND r.academic_year = $3
              ORDER BY s.code, r.attempt_number",
            qualified(SUBJECT_RESULT_COLUMNS, "r")
        ))
        .bind(student_id.into_inner())
        .bind(semester_to_db(semester))
        .bind(academic_year)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SubjectResultListing {
                    subject_code: row.subject_code,
                    subject_name: row.subject_name,
                    credits: count_from_db("subjects", row.subject_credits)?,
                    result: row.result.into_result()?,
                })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Semester results
    // -----------------------------------------------------------------------

    /// Insert or replace a semester result on (student, semester, academic
    /// year).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert_semester_result(
        &self,
        result: &SemesterResult,
    ) -> Result<SemesterResult, DbError> {
        let row = sqlx::query_as::<_, SemesterResultRow>(&format!(
            r"INSERT INTO semester_results ({SEMESTER_RESULT_COLUMNS})
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
              ON CONFLICT (student_id, semester, academic_year) DO UPDATE SET
                  total_subjects = EXCLUDED.total_subjects,
                  subjects_passed = EXCLUDED.subjects_passed,
                  subjects_failed = EXCLUDED.subjects_failed,
                  total_credits_attempted = EXCLUDED.total_credits_attempted,
                  total_credits_earned = EXCLUDED.total_credits_earned,
                  total_credit_points = EXCLUDED.total_credit_points,
                  sgpa = EXCLUDED.sgpa,
                  cgpa = EXCLUDED.cgpa,
                  overall_percentage = EXCLUDED.overall_percentage,
                  total_marks_obtained = EXCLUDED.total_marks_obtained,
                  total_max_marks = EXCLUDED.total_max_marks,
                  result_status = EXCLUDED.result_status,
                  result_class = EXCLUDED.result_class,
                  backlog_subjects = EXCLUDED.backlog_subjects,
                  has_backlogs = EXCLUDED.has_backlogs,
                  calculated_at = EXCLUDED.calculated_at
              RETURNING {SEMESTER_RESULT_COLUMNS}"
        ))
        .bind(result.id.into_inner())
        .bind(result.student_id.into_inner())
        .bind(semester_to_db(result.semester))
        .bind(&result.academic_year)
        .bind(count_to_db(result.total_subjects))
        .bind(count_to_db(result.subjects_passed))
        .bind(count_to_db(result.subjects_failed))
        .bind(count_to_db(result.total_credits_attempted))
        .bind(count_to_db(result.total_credits_earned))
        .bind(result.total_credit_points)
        .bind(result.sgpa)
        .bind(result.cgpa)
        .bind(result.overall_percentage)
        .bind(result.total_marks_obtained)
        .bind(result.total_max_marks)
        .bind(result.result_status.as_str())
        .bind(result.result_class.as_str())
        .bind(&result.backlog_subjects)
        .bind(result.has_backlogs)
        .bind(result.calculated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::on_insert(e, "semester result"))?;

        tracing::debug!(
            semester_result_id = %row.id,
            student_id = %result.student_id,
            semester = result.semester,
            "Upserted semester result"
        );
        row.into_result()
    }

    /// One student's result for one semester.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn semester_result(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<Option<SemesterResult>, DbError> {
        let row = sqlx::query_as::<_, SemesterResultRow>(&format!(
            r"SELECT {SEMESTER_RESULT_COLUMNS} FROM semester_results
              WHERE student_id = $1 AND semester = $2 AND academic_year = $3"
        ))
        .bind(student_id.into_inner())
        .bind(semester_to_db(semester))
        .bind(academic_year)
        .fetch_optional(self.pool)
        .await?;

        row.map(SemesterResultRow::into_result).transpose()
    }

    /// Semester results of every student of a department.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn semester_results_for_department(
        &self,
        department: &str,
        semester: u8,
        academic_year: &str,
    ) -> Result<Vec<SemesterResultListing>, DbError> {
        let rows = sqlx::query_as::<_, SemesterResultListingRow>(&format!(
            r"SELECT {}, st.first_name, st.middle_name, st.last_name, st.roll_number
              FROM semester_results r
              JOIN students st ON st.id = r.student_id
              WHERE st.department = $1 AND r.semester = $2 AND r.academic_year = $3
              ORDER BY st.roll_number NULLS LAST, st.last_name, st.first_name",
            qualified(SEMESTER_RESULT_COLUMNS, "r")
        ))
        .bind(department)
        .bind(semester_to_db(semester))
        .bind(academic_year)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let student_name = [
                    Some(row.first_name.as_str()),
                    row.middle_name.as_deref(),
                    Some(row.last_name.as_str()),
                ]
                .into_iter()
                .flatten()
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ");
                Ok(SemesterResultListing {
                    student_name,
                    roll_number: row.roll_number,
                    result: row.result.into_result()?,
                })
            })
            .collect()
    }

    /// The most recent result of each semester before `semester`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn prior_semester_results(
        &self,
        student_id: StudentId,
        semester: u8,
    ) -> Result<Vec<SemesterResult>, DbError> {
        let rows = sqlx::query_as::<_, SemesterResultRow>(&format!(
            r"SELECT DISTINCT ON (semester) {SEMESTER_RESULT_COLUMNS} FROM semester_results
              WHERE student_id = $1 AND semester < $2
              ORDER BY semester, calculated_at DESC"
        ))
        .bind(student_id.into_inner())
        .bind(semester_to_db(semester))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SemesterResultRow::into_result).collect()
    }
}

/// A row from the `subject_results` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubjectResultRow {
    /// Row UUID.
    pub id: Uuid,
    /// Student UUID.
    pub student_id: Uuid,
    /// Subject UUID.
    pub subject_id: Uuid,
    /// Academic year label.
    pub academic_year: String,
    /// Semester.
    pub semester: i16,
    /// IA subtotal.
    pub ia_marks: Decimal,
    /// ESE subtotal.
    pub ese_marks: Decimal,
    /// Oral subtotal.
    pub oral_marks: Decimal,
    /// Practical subtotal.
    pub practical_marks: Decimal,
    /// Term work subtotal.
    pub tw_marks: Decimal,
    /// Total marks obtained.
    pub total_marks_obtained: Decimal,
    /// Total maximum marks.
    pub total_max_marks: Decimal,
    /// Percentage.
    pub percentage: Decimal,
    /// Grade code.
    pub grade: String,
    /// Grade points.
    pub grade_points: Decimal,
    /// Pass flag.
    pub is_pass: bool,
    /// Credits earned.
    pub credits_earned: i32,
    /// Backlog flag.
    pub is_backlog: bool,
    /// Attempt number.
    pub attempt_number: i32,
    /// Calculation timestamp.
    pub calculated_at: DateTime<Utc>,
}

impl SubjectResultRow {
    /// Convert into the domain [`SubjectResult`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if a code or counter column is invalid.
    pub fn into_result(self) -> Result<SubjectResult, DbError> {
        Ok(SubjectResult {
            id: SubjectResultId::from(self.id),
            student_id: StudentId::from(self.student_id),
            subject_id: SubjectId::from(self.subject_id),
            academic_year: self.academic_year,
            semester: semester_from_db("subject_results", self.semester)?,
            ia_marks: self.ia_marks,
            ese_marks: self.ese_marks,
            oral_marks: self.oral_marks,
            practical_marks: self.practical_marks,
            tw_marks: self.tw_marks,
            total_marks_obtained: self.total_marks_obtained,
            total_max_marks: self.total_max_marks,
            percentage: self.percentage,
            grade: parse_code("subject_results", &self.grade)?,
            grade_points: self.grade_points,
            is_pass: self.is_pass,
            credits_earned: count_from_db("subject_results", self.credits_earned)?,
            is_backlog: self.is_backlog,
            attempt_number: count_from_db("subject_results", self.attempt_number)?,
            calculated_at: self.calculated_at,
        })
    }
}

/// A `subject_results` row joined with its subject.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SubjectResultListingRow {
    #[sqlx(flatten)]
    result: SubjectResultRow,
    subject_code: String,
    subject_name: String,
    subject_credits: i32,
}

/// A row from the `semester_results` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SemesterResultRow {
    /// Row UUID.
    pub id: Uuid,
    /// Student UUID.
    pub student_id: Uuid,
    /// Semester.
    pub semester: i16,
    /// Academic year label.
    pub academic_year: String,
    /// Subjects rolled up.
    pub total_subjects: i32,
    /// Subjects passed.
    pub subjects_passed: i32,
    /// Subjects failed.
    pub subjects_failed: i32,
    /// Credits attempted.
    pub total_credits_attempted: i32,
    /// Credits earned.
    pub total_credits_earned: i32,
    /// Credit points.
    pub total_credit_points: Decimal,
    /// SGPA.
    pub sgpa: Decimal,
    /// CGPA.
    pub cgpa: Decimal,
    /// Overall percentage.
    pub overall_percentage: Decimal,
    /// Marks obtained across subjects.
    pub total_marks_obtained: Decimal,
    /// Maximum marks across subjects.
    pub total_max_marks: Decimal,
    /// Result status code.
    pub result_status: String,
    /// Result class name.
    pub result_class: String,
    /// Failed subject codes.
    pub backlog_subjects: Vec<String>,
    /// Backlog flag.
    pub has_backlogs: bool,
    /// Calculation timestamp.
    pub calculated_at: DateTime<Utc>,
}

impl SemesterResultRow {
    /// Convert into the domain [`SemesterResult`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if a code or counter column is invalid.
    pub fn into_result(self) -> Result<SemesterResult, DbError> {
        const ENTITY: &str = "semester_results";
        Ok(SemesterResult {
            id: SemesterResultId::from(self.id),
            student_id: StudentId::from(self.student_id),
            semester: semester_from_db(ENTITY, self.semester)?,
            academic_year: self.academic_year,
            total_subjects: count_from_db(ENTITY, self.total_subjects)?,
            subjects_passed: count_from_db(ENTITY, self.subjects_passed)?,
            subjects_failed: count_from_db(ENTITY, self.subjects_failed)?,
            total_credits_attempted: count_from_db(ENTITY, self.total_credits_attempted)?,
            total_credits_earned: count_from_db(ENTITY, self.total_credits_earned)?,
            total_credit_points: self.total_credit_points,
            sgpa: self.sgpa,
            cgpa: self.cgpa,
            overall_percentage: self.overall_percentage,
            total_marks_obtained: self.total_marks_obtained,
            total_max_marks: self.total_max_marks,
            result_status: parse_code(ENTITY, &self.result_status)?,
            result_class: parse_code(ENTITY, &self.result_class)?,
            backlog_subjects: self.backlog_subjects,
            has_backlogs: self.has_backlogs,
            calculated_at: self.calculated_at,
        })
    }
}

/// A `semester_results` row joined with its student.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SemesterResultListingRow {
    #[sqlx(flatten)]
    result: SemesterResultRow,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    roll_number: Option<String>,
}
