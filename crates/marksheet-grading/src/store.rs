//! The persistence seam used by the resolvers.
//!
//! The engine never talks to a database directly. Anything that can look
//! up reference rows and upsert results by their natural key can back it:
//! the `PostgreSQL` store in production, an in-memory map in tests.
//! Upserts are last-writer-wins on the natural key.

use std::future::Future;

use marksheet_types::{
    ComponentMark, SemesterResult, Student, StudentId, Subject, SubjectId, SubjectResult,
};

/// Error reported by a [`RecordStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not complete the operation.
    #[error("record store backend error: {0}")]
    Backend(String),

    /// A persisted row could not be decoded into a domain value.
    #[error("corrupt {entity} row: {detail}")]
    Corrupt {
        /// The table or entity the row belongs to.
        entity: &'static str,
        /// What was wrong with the row.
        detail: String,
    },
}

/// Read and write access to the rows the resolvers need.
pub trait RecordStore: Send + Sync {
    /// Look up a student by ID.
    fn find_student(
        &self,
        id: StudentId,
    ) -> impl Future<Output = Result<Option<Student>, StoreError>> + Send;

    /// Look up a subject, with its components, by ID.
    fn find_subject(
        &self,
        id: SubjectId,
    ) -> impl Future<Output = Result<Option<Subject>, StoreError>> + Send;

    /// Every component mark row of one student in one subject.
    fn component_marks(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
    ) -> impl Future<Output = Result<Vec<ComponentMark>, StoreError>> + Send;

    /// IDs of the subjects of a semester in which the student has marks.
    fn subjects_with_marks(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> impl Future<Output = Result<Vec<SubjectId>, StoreError>> + Send;

    /// Insert or replace a subject result keyed by (student, subject,
    /// academic year, attempt number). Returns the stored row.
    fn upsert_subject_result(
        &self,
        result: &SubjectResult,
    ) -> impl Future<Output = Result<SubjectResult, StoreError>> + Send;

    /// Every subject result of one student for one semester.
    fn subject_results(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> impl Future<Output = Result<Vec<SubjectResult>, StoreError>> + Send;

    /// Insert or replace a semester result keyed by (student, semester,
    /// academic year). Returns the stored row.
    fn upsert_semester_result(
        &self,
        result: &SemesterResult,
    ) -> impl Future<Output = Result<SemesterResult, StoreError>> + Send;

    /// Persisted semester results of the student for semesters strictly
    /// before `semester`.
    fn prior_semester_results(
        &self,
        student_id: StudentId,
        semester: u8,
    ) -> impl Future<Output = Result<Vec<SemesterResult>, StoreError>> + Send;
}
