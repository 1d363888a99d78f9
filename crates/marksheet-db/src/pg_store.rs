//! The `PostgreSQL` implementation of [`RecordStore`].
//!
//! [`PgStore`] owns a pool handle and hands out the table-level stores.
//! The trait methods delegate to those stores and fold [`DbError`] into
//! [`StoreError`].

use sqlx::PgPool;

use marksheet_grading::{RecordStore, StoreError};
use marksheet_types::{
    ComponentMark, SemesterResult, Student, StudentId, Subject, SubjectId, SubjectResult,
};

use crate::exam_event_store::ExamEventStore;
use crate::marks_store::MarksStore;
use crate::publish_store::PublishStore;
use crate::result_store::ResultStore;
use crate::student_store::StudentStore;
use crate::subject_store::SubjectStore;

/// Owned, cloneable access to every table of the records database.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Students.
    pub const fn students(&self) -> StudentStore<'_> {
        StudentStore::new(&self.pool)
    }

    /// Subjects and components.
    pub const fn subjects(&self) -> SubjectStore<'_> {
        SubjectStore::new(&self.pool)
    }

    /// Exam events.
    pub const fn exam_events(&self) -> ExamEventStore<'_> {
        ExamEventStore::new(&self.pool)
    }

    /// Component marks.
    pub const fn marks(&self) -> MarksStore<'_> {
        MarksStore::new(&self.pool)
    }

    /// Subject and semester results.
    pub const fn results(&self) -> ResultStore<'_> {
        ResultStore::new(&self.pool)
    }

    /// Result publication.
    pub const fn publications(&self) -> PublishStore<'_> {
        PublishStore::new(&self.pool)
    }
}

impl RecordStore for PgStore {
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.students().get(id).await?)
    }

    async fn find_subject(&self, id: SubjectId) -> Result<Option<Subject>, StoreError> {
        Ok(self.subjects().get(id).await?)
    }

    async fn component_marks(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
    ) -> Result<Vec<ComponentMark>, StoreError> {
        Ok(self
            .marks()
            .for_student_subject(student_id, subject_id)
            .await?)
    }

    async fn subjects_with_marks(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<Vec<SubjectId>, StoreError> {
        Ok(self
            .marks()
            .subjects_with_marks(student_id, semester, academic_year)
            .await?)
    }

    async fn upsert_subject_result(
        &self,
        result: &SubjectResult,
    ) -> Result<SubjectResult, StoreError> {
        Ok(self.results().upsert_subject_result(result).await?)
    }

    async fn subject_results(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<Vec<SubjectResult>, StoreError> {
        Ok(self
            .results()
            .subject_results(student_id, semester, academic_year)
            .await?)
    }

    async fn upsert_semester_result(
        &self,
        result: &SemesterResult,
    ) -> Result<SemesterResult, StoreError> {
        Ok(self.results().upsert_semester_result(result).await?)
    }

    async fn prior_semester_results(
        &self,
        student_id: StudentId,
        semester: u8,
    ) -> Result<Vec<SemesterResult>, StoreError> {
        Ok(self
            .results()
            .prior_semester_results(student_id, semester)
            .await?)
    }
}
