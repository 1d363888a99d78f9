//! Subjects and their marks components.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use marksheet_types::{ComponentType, Subject, SubjectComponent, SubjectComponentId, SubjectId};

use crate::codec::{count_from_db, count_to_db, parse_code, semester_from_db, semester_to_db};
use crate::error::DbError;

/// Columns selected for a [`SubjectRow`].
const SUBJECT_COLUMNS: &str = "id, code, name, academic_year, scheme, department, semester, \
     credits, overall_passing_criteria";

/// Columns selected for a [`ComponentRow`].
const COMPONENT_COLUMNS: &str =
    "id, subject_id, component_type, out_of_marks, passing_marks, is_enabled, resolution";

/// One component of a [`NewSubject`].
#[derive(Debug, Clone)]
pub struct NewComponent {
    /// Component category.
    pub component_type: ComponentType,
    /// Maximum marks.
    pub out_of_marks: Decimal,
    /// Pass mark.
    pub passing_marks: Decimal,
    /// Free-text label.
    pub resolution: Option<String>,
}

/// Fields required to create a subject.
#[derive(Debug, Clone)]
pub struct NewSubject {
    /// Catalog code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Academic year label.
    pub academic_year: String,
    /// Syllabus scheme.
    pub scheme: String,
    /// Offering department.
    pub department: String,
    /// Semester (1 to 8).
    pub semester: u8,
    /// Credit value.
    pub credits: u32,
    /// Overall pass percentage.
    pub overall_passing_criteria: Decimal,
    /// Marks components, at most one per category.
    pub components: Vec<NewComponent>,
}

/// Filters for [`SubjectStore::list`].
#[derive(Debug, Clone, Default)]
pub struct SubjectFilter {
    /// Only subjects of this department.
    pub department: Option<String>,
    /// Only subjects of this semester.
    pub semester: Option<u8>,
    /// Only subjects of this academic year.
    pub academic_year: Option<String>,
}

/// Operations on the `subjects` and `subject_components` tables.
pub struct SubjectStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SubjectStore<'a> {
    /// Create a new subject store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a subject and all of its components in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conflict`] if the subject code is already used in
    /// the academic year, or two components share a category.
    pub async fn create(&self, new: &NewSubject) -> Result<Subject, DbError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SubjectRow>(&format!(
            r"INSERT INTO subjects (code, name, academic_year, scheme, department, semester, credits, overall_passing_criteria)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
              RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(&new.code)
        .bind(&new.name)
        .bind(&new.academic_year)
        .bind(&new.scheme)
        .bind(&new.department)
        .bind(semester_to_db(new.semester))
        .bind(count_to_db(new.credits))
        .bind(new.overall_passing_criteria)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::on_insert(e, "subject with this code"))?;

        let mut components = Vec::with_capacity(new.components.len());
        for component in &new.components {
            let inserted = sqlx::query_as::<_, ComponentRow>(&format!(
                r"INSERT INTO subject_components (subject_id, component_type, out_of_marks, passing_marks, resolution)
                  VALUES ($1, $2, $3, $4, $5)
                  RETURNING {COMPONENT_COLUMNS}"
            ))
            .bind(row.id)
            .bind(component.component_type.as_str())
            .bind(component.out_of_marks)
            .bind(component.passing_marks)
            .bind(&component.resolution)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DbError::on_insert(e, "component of this type"))?;
            components.push(inserted.into_component()?);
        }

        tx.commit().await?;

        tracing::debug!(
            subject_id = %row.id,
            code = %row.code,
            components = components.len(),
            "Inserted subject"
        );
        row.into_subject(components)
    }

    /// Fetch a subject with its components.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, id: SubjectId) -> Result<Option<Subject>, DbError> {
        let Some(row) = sqlx::query_as::<_, SubjectRow>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let components = self.components_of(&[row.id]).await?;
        let own = components.into_values().next().unwrap_or_default();
        row.into_subject(own).map(Some)
    }

    /// List subjects matching `filter`, each with its components.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(&self, filter: &SubjectFilter) -> Result<Vec<Subject>, DbError> {
        let rows = sqlx::query_as::<_, SubjectRow>(&format!(
            r"SELECT {SUBJECT_COLUMNS} FROM subjects
              WHERE ($1::TEXT IS NULL OR department = $1)
                AND ($2::SMALLINT IS NULL OR semester = $2)
                AND ($3::TEXT IS NULL OR academic_year = $3)
              ORDER BY academic_year, semester, code"
        ))
        .bind(filter.department.as_deref())
        .bind(filter.semester.map(semester_to_db))
        .bind(filter.academic_year.as_deref())
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut components = self.components_of(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let own = components.remove(&row.id).unwrap_or_default();
                row.into_subject(own)
            })
            .collect()
    }

    /// Fetch a single component by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn component(
        &self,
        id: SubjectComponentId,
    ) -> Result<Option<SubjectComponent>, DbError> {
        let row = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {COMPONENT_COLUMNS} FROM subject_components WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(ComponentRow::into_component).transpose()
    }

    /// Components of every subject in `subject_ids`, grouped by subject.
    async fn components_of(
        &self,
        subject_ids: &[Uuid],
    ) -> Result<BTreeMap<Uuid, Vec<SubjectComponent>>, DbError> {
        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            r"SELECT {COMPONENT_COLUMNS} FROM subject_components
              WHERE subject_id = ANY($1)
              ORDER BY subject_id, component_type"
        ))
        .bind(subject_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: BTreeMap<Uuid, Vec<SubjectComponent>> = BTreeMap::new();
        for row in rows {
            let subject_id = row.subject_id;
            grouped
                .entry(subject_id)
                .or_default()
                .push(row.into_component()?);
        }
        Ok(grouped)
    }
}

/// A row from the `subjects` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubjectRow {
    /// Subject UUID.
    pub id: Uuid,
    /// Catalog code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Academic year label.
    pub academic_year: String,
    /// Syllabus scheme.
    pub scheme: String,
    /// Department.
    pub department: String,
    /// Semester.
    pub semester: i16,
    /// Credits.
    pub credits: i32,
    /// Overall pass percentage.
    pub overall_passing_criteria: Decimal,
}

impl SubjectRow {
    /// Convert into the domain [`Subject`] with the given components.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the semester or credits are invalid.
    pub fn into_subject(self, components: Vec<SubjectComponent>) -> Result<Subject, DbError> {
        Ok(Subject {
            id: SubjectId::from(self.id),
            code: self.code,
            name: self.name,
            academic_year: self.academic_year,
            scheme: self.scheme,
            department: self.department,
            semester: semester_from_db("subjects", self.semester)?,
            credits: count_from_db("subjects", self.credits)?,
            overall_passing_criteria: self.overall_passing_criteria,
            components,
        })
    }
}

/// A row from the `subject_components` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ComponentRow {
    /// Component UUID.
    pub id: Uuid,
    /// Owning subject UUID.
    pub subject_id: Uuid,
    /// Component type code.
    pub component_type: String,
    /// Maximum marks.
    pub out_of_marks: Decimal,
    /// Pass mark.
    pub passing_marks: Decimal,
    /// Whether marks may be entered.
    pub is_enabled: bool,
    /// Free-text label.
    pub resolution: Option<String>,
}

impl ComponentRow {
    /// Convert into the domain [`SubjectComponent`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the component type is unknown.
    pub fn into_component(self) -> Result<SubjectComponent, DbError> {
        Ok(SubjectComponent {
            id: SubjectComponentId::from(self.id),
            subject_id: SubjectId::from(self.subject_id),
            component_type: parse_code("subject_components", &self.component_type)?,
            out_of_marks: self.out_of_marks,
            passing_marks: self.passing_marks,
            is_enabled: self.is_enabled,
            resolution: self.resolution,
        })
    }
}
