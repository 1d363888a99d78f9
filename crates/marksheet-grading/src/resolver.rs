//! Subject and semester result resolution.
//!
//! Each resolver performs a bounded series of reads through a
//! [`RecordStore`] followed by exactly one upsert. An error at any step
//! returns before the write, so a failed call persists nothing.

use std::iter;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use marksheet_types::{
    ComponentType, ResultStatus, SemesterResult, SemesterResultId, StudentId, SubjectId,
    SubjectResult, SubjectResultId,
};

use crate::aggregate::aggregate;
use crate::grade::{classify, cumulative_gpa, grade_for, percentage_of, round2, sgpa};
use crate::policy::CgpaMode;
use crate::store::RecordStore;
use crate::{GradingError, GradingPolicy};

/// Attempt number of the regular (non-backlog) attempt.
pub const FIRST_ATTEMPT: u32 = 1;

/// Highest semester number of a programme.
pub const MAX_SEMESTER: u8 = 8;

fn check_term(semester: u8, academic_year: &str) -> Result<(), GradingError> {
    if !(1..=MAX_SEMESTER).contains(&semester) {
        return Err(GradingError::InvalidInput(format!(
            "semester must be between 1 and {MAX_SEMESTER}, got {semester}"
        )));
    }
    if academic_year.trim().is_empty() {
        return Err(GradingError::InvalidInput(String::from(
            "academic year must not be empty",
        )));
    }
    Ok(())
}

/// Compute and persist the result of one student in one subject.
///
/// # Errors
///
/// - [`GradingError::InvalidInput`] if the semester or academic year is malformed.
/// - [`GradingError::NoData`] if the student has no marks in the subject.
/// - [`GradingError::NotFound`] if the subject does not exist.
/// - [`GradingError::Store`] if a read or the upsert fails.
pub async fn resolve_subject_result<S: RecordStore>(
    store: &S,
    policy: &GradingPolicy,
    student_id: StudentId,
    subject_id: SubjectId,
    academic_year: &str,
    semester: u8,
) -> Result<SubjectResult, GradingError> {
    check_term(semester, academic_year)?;
    let marks = store.component_marks(student_id, subject_id).await?;
    let totals = aggregate(&marks, policy)?;

    let subject = store
        .find_subject(subject_id)
        .await?
        .ok_or_else(|| GradingError::not_found("subject", subject_id))?;

    let is_pass = policy.subject_passes(totals.all_components_pass(), totals.percentage);
    let (grade, grade_points) = grade_for(totals.percentage);
    let credits_earned = if is_pass { subject.credits } else { 0 };

    let result = SubjectResult {
        id: SubjectResultId::new(),
        student_id,
        subject_id,
        academic_year: academic_year.to_owned(),
        semester,
        ia_marks: totals.subtotal(ComponentType::InternalAssessment),
        ese_marks: totals.subtotal(ComponentType::EndSemesterExam),
        oral_marks: totals.subtotal(ComponentType::Oral),
        practical_marks: totals.subtotal(ComponentType::Practical),
        tw_marks: totals.subtotal(ComponentType::TermWork),
        total_marks_obtained: totals.total_marks,
        total_max_marks: totals.max_marks,
        percentage: totals.percentage,
        grade,
        grade_points,
        is_pass,
        credits_earned,
        is_backlog: !is_pass,
        attempt_number: FIRST_ATTEMPT,
        calculated_at: Utc::now(),
    };

    let stored = store.upsert_subject_result(&result).await?;

    info!(
        student_id = %student_id,
        subject = %subject.code,
        percentage = %stored.percentage,
        grade = %stored.grade,
        is_pass = stored.is_pass,
        "Subject result resolved"
    );

    Ok(stored)
}

/// Running sums over a semester's subject results.
#[derive(Debug, Default)]
struct SemesterTotals {
    subjects: u32,
    passed: u32,
    credits_attempted: u32,
    credits_earned: u32,
    credit_points: Decimal,
    marks_obtained: Decimal,
    max_marks: Decimal,
    backlog_subjects: Vec<String>,
}

impl SemesterTotals {
    fn add(
        &mut self,
        result: &SubjectResult,
        subject_credits: u32,
        subject_code: String,
    ) -> Result<(), GradingError> {
        let points = Decimal::from(result.credits_earned)
            .checked_mul(result.grade_points)
            .ok_or(GradingError::ArithmeticOverflow)?;

        self.subjects = self
            .subjects
            .checked_add(1)
            .ok_or(GradingError::ArithmeticOverflow)?;
        self.credits_attempted = self
            .credits_attempted
            .checked_add(subject_credits)
            .ok_or(GradingError::ArithmeticOverflow)?;
        self.credits_earned = self
            .credits_earned
            .checked_add(result.credits_earned)
            .ok_or(GradingError::ArithmeticOverflow)?;
        self.credit_points = self
            .credit_points
            .checked_add(points)
            .ok_or(GradingError::ArithmeticOverflow)?;
        self.marks_obtained = self
            .marks_obtained
            .checked_add(result.total_marks_obtained)
            .ok_or(GradingError::ArithmeticOverflow)?;
        self.max_marks = self
            .max_marks
            .checked_add(result.total_max_marks)
            .ok_or(GradingError::ArithmeticOverflow)?;

        if result.is_pass {
            self.passed = self
                .passed
                .checked_add(1)
                .ok_or(GradingError::ArithmeticOverflow)?;
        } else {
            self.backlog_subjects.push(subject_code);
        }
        Ok(())
    }
}

/// Compute and persist the consolidated result of one student for one
/// semester from the subject results already stored for it.
///
/// # Errors
///
/// - [`GradingError::InvalidInput`] if the semester or academic year is malformed.
/// - [`GradingError::NoData`] if no subject results exist for the key.
/// - [`GradingError::NotFound`] if the student, or a subject referenced by
///   one of the results, does not exist.
/// - [`GradingError::Store`] if a read or the upsert fails.
pub async fn resolve_semester_result<S: RecordStore>(
    store: &S,
    policy: &GradingPolicy,
    student_id: StudentId,
    semester: u8,
    academic_year: &str,
) -> Result<SemesterResult, GradingError> {
    check_term(semester, academic_year)?;
    let results = store
        .subject_results(student_id, semester, academic_year)
        .await?;
    if results.is_empty() {
        return Err(GradingError::NoData("subject results"));
    }

    store
        .find_student(student_id)
        .await?
        .ok_or_else(|| GradingError::not_found("student", student_id))?;

    let mut totals = SemesterTotals::default();
    for result in &results {
        let subject = store
            .find_subject(result.subject_id)
            .await?
            .ok_or_else(|| GradingError::not_found("subject", result.subject_id))?;
        totals.add(result, subject.credits, subject.code)?;
    }

    let subjects_failed = totals
        .subjects
        .checked_sub(totals.passed)
        .ok_or(GradingError::ArithmeticOverflow)?;
    let semester_gpa = sgpa(totals.credit_points, totals.credits_attempted)?;

    let cgpa = match policy.cgpa_mode {
        CgpaMode::SemesterOnly => semester_gpa,
        CgpaMode::Cumulative => {
            let prior = store.prior_semester_results(student_id, semester).await?;
            debug!(
                student_id = %student_id,
                prior_semesters = prior.len(),
                "Computing cumulative GPA"
            );
            cumulative_gpa(
                prior
                    .iter()
                    .map(|p| (p.sgpa, p.total_credits_attempted))
                    .chain(iter::once((semester_gpa, totals.credits_attempted))),
            )?
        }
    };

    let overall_percentage = round2(percentage_of(totals.marks_obtained, totals.max_marks)?);
    let result_status = if subjects_failed == 0 {
        ResultStatus::Pass
    } else {
        ResultStatus::Fail
    };

    let result = SemesterResult {
        id: SemesterResultId::new(),
        student_id,
        semester,
        academic_year: academic_year.to_owned(),
        total_subjects: totals.subjects,
        subjects_passed: totals.passed,
        subjects_failed,
        total_credits_attempted: totals.credits_attempted,
        total_credits_earned: totals.credits_earned,
        total_credit_points: totals.credit_points,
        sgpa: semester_gpa,
        cgpa,
        overall_percentage,
        total_marks_obtained: totals.marks_obtained,
        total_max_marks: totals.max_marks,
        result_status,
        result_class: classify(cgpa),
        backlog_subjects: totals.backlog_subjects,
        has_backlogs: subjects_failed > 0,
        calculated_at: Utc::now(),
    };

    let stored = store.upsert_semester_result(&result).await?;

    info!(
        student_id = %student_id,
        semester,
        academic_year,
        sgpa = %stored.sgpa,
        status = %stored.result_status,
        "Semester result resolved"
    );

    Ok(stored)
}
