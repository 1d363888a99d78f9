//! Student records.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use marksheet_types::{AcademicStatus, Gender, Student, StudentId};

use crate::codec::{parse_code, semester_from_db, semester_to_db};
use crate::error::DbError;

/// Columns selected for a [`StudentRow`].
const STUDENT_COLUMNS: &str = "id, first_name, middle_name, last_name, email, roll_number, \
     department, current_semester, gender, academic_status, created_at";

/// Fields required to register a student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    /// Given name.
    pub first_name: String,
    /// Middle name, if any.
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
    /// Contact email (unique).
    pub email: String,
    /// Roll number (unique when present).
    pub roll_number: Option<String>,
    /// Department.
    pub department: String,
    /// Current semester (1 to 8).
    pub current_semester: u8,
    /// Recorded gender.
    pub gender: Gender,
    /// Progression status.
    pub academic_status: AcademicStatus,
}

/// Operations on the `students` table.
pub struct StudentStore<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentStore<'a> {
    /// Create a new student store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a student and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conflict`] if the email or roll number is taken.
    pub async fn create(&self, new: &NewStudent) -> Result<Student, DbError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r"INSERT INTO students (first_name, middle_name, last_name, email, roll_number, department, current_semester, gender, academic_status)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(&new.first_name)
        .bind(&new.middle_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.roll_number)
        .bind(&new.department)
        .bind(semester_to_db(new.current_semester))
        .bind(new.gender.as_str())
        .bind(new.academic_status.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::on_insert(e, "student with this email or roll number"))?;

        tracing::debug!(student_id = %row.id, "Inserted student");
        row.into_student()
    }

    /// Fetch a student by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, id: StudentId) -> Result<Option<Student>, DbError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(StudentRow::into_student).transpose()
    }

    /// List students, optionally restricted to one department.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(&self, department: Option<&str>) -> Result<Vec<Student>, DbError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            r"SELECT {STUDENT_COLUMNS} FROM students
              WHERE ($1::TEXT IS NULL OR department = $1)
              ORDER BY department, roll_number NULLS LAST, last_name, first_name"
        ))
        .bind(department)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StudentRow::into_student).collect()
    }

    /// IDs of every active student of a department.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn active_ids_in_department(
        &self,
        department: &str,
    ) -> Result<Vec<StudentId>, DbError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r"SELECT id FROM students
              WHERE department = $1 AND academic_status = 'active'
              ORDER BY id",
        )
        .bind(department)
        .fetch_all(self.pool)
        .await?;

        Ok(ids.into_iter().map(StudentId::from).collect())
    }
}

/// A row from the `students` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRow {
    /// Student UUID.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Middle name.
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
    /// Email.
    pub email: String,
    /// Roll number.
    pub roll_number: Option<String>,
    /// Department.
    pub department: String,
    /// Current semester.
    pub current_semester: i16,
    /// Gender code.
    pub gender: String,
    /// Academic status code.
    pub academic_status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl StudentRow {
    /// Convert into the domain [`Student`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if a code or semester column is invalid.
    pub fn into_student(self) -> Result<Student, DbError> {
        Ok(Student {
            id: StudentId::from(self.id),
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            email: self.email,
            roll_number: self.roll_number,
            department: self.department,
            current_semester: semester_from_db("students", self.current_semester)?,
            gender: parse_code("students", &self.gender)?,
            academic_status: parse_code("students", &self.academic_status)?,
            created_at: self.created_at,
        })
    }
}
