//! Semester-wide result recalculation for many students.
//!
//! Every student is processed independently: a failure is logged and
//! recorded in the [`BatchReport`], and the batch moves on to the next
//! student.

use serde::Serialize;
use tracing::{info, warn};

use marksheet_types::StudentId;

use crate::resolver::{resolve_semester_result, resolve_subject_result};
use crate::store::RecordStore;
use crate::{GradingError, GradingPolicy};

/// A student whose recalculation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentFailure {
    /// The student.
    pub student_id: StudentId,
    /// Why the recalculation failed.
    pub reason: String,
}

/// Outcome of a batch recalculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Students whose subject and semester results were all resolved.
    pub students_resolved: u32,
    /// Subject results written across all students.
    pub subject_results: u32,
    /// Students that could not be resolved.
    pub failures: Vec<StudentFailure>,
}

/// Recalculate every subject result with marks, then the semester result,
/// for each student in `student_ids`.
pub async fn recalculate_batch<S: RecordStore>(
    store: &S,
    policy: &GradingPolicy,
    student_ids: &[StudentId],
    semester: u8,
    academic_year: &str,
) -> BatchReport {
    let mut report = BatchReport::default();

    for &student_id in student_ids {
        match recalculate_student(store, policy, student_id, semester, academic_year).await {
            Ok(subjects) => {
                report.students_resolved = report.students_resolved.saturating_add(1);
                report.subject_results = report.subject_results.saturating_add(subjects);
            }
            Err(e) => {
                warn!(
                    student_id = %student_id,
                    semester,
                    academic_year,
                    error = %e,
                    "Result recalculation failed for student"
                );
                report.failures.push(StudentFailure {
                    student_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        semester,
        academic_year,
        students = student_ids.len(),
        resolved = report.students_resolved,
        failed = report.failures.len(),
        "Batch recalculation finished"
    );

    report
}

async fn recalculate_student<S: RecordStore>(
    store: &S,
    policy: &GradingPolicy,
    student_id: StudentId,
    semester: u8,
    academic_year: &str,
) -> Result<u32, GradingError> {
    let subjects = store
        .subjects_with_marks(student_id, semester, academic_year)
        .await?;

    let mut resolved: u32 = 0;
    for subject_id in subjects {
        resolve_subject_result(store, policy, student_id, subject_id, academic_year, semester)
            .await?;
        resolved = resolved.saturating_add(1);
    }

    resolve_semester_result(store, policy, student_id, semester, academic_year).await?;
    Ok(resolved)
}
