//! The detailed result sheet: a student header, per-subject component
//! breakdown and the semester summary, in the layout of a printed
//! university marksheet.
//!
//! `GET /api/results/sheet/{student_id}?semester=&academic_year=`

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

use marksheet_db::SubjectResultListing;
use marksheet_grading::{aggregate, GradingError, GradingPolicy};
use marksheet_types::{
    ComponentMark, ComponentType, Grade, SemesterResult, Student, StudentId, SubjectId,
};

use crate::error::ApiError;
use crate::request::parse_uuid;
use crate::results::TermQuery;
use crate::state::AppState;

/// Summary status shown before the semester result is calculated.
const PENDING_STATUS: &str = "PENDING";

/// Summary class shown before the semester result is calculated.
const PENDING_CLASS: &str = "N/A";

/// The full result sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSheet {
    /// Who the sheet is for.
    pub student: SheetHeader,
    /// One block per subject result.
    pub subjects: Vec<SheetSubject>,
    /// Semester totals.
    pub semester_summary: SheetSummary,
}

/// Student and term identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetHeader {
    /// Student ID.
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Roll number.
    pub roll_number: Option<String>,
    /// Department.
    pub department: String,
    /// Semester.
    pub semester: u8,
    /// Academic year label.
    pub academic_year: String,
}

/// One component line within a subject block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetComponent {
    /// Component category.
    pub component_type: ComponentType,
    /// Marks counted (zero when absent).
    pub marks_obtained: Decimal,
    /// Maximum marks.
    pub max_marks: Decimal,
    /// Pass mark.
    pub passing_marks: Decimal,
    /// Whether the student was absent.
    pub is_absent: bool,
    /// Whether the component was passed.
    pub is_pass: bool,
}

/// One subject block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSubject {
    /// Subject code.
    pub subject_code: String,
    /// Subject name.
    pub subject_name: String,
    /// Credit value.
    pub credits: u32,
    /// Component breakdown.
    pub components: Vec<SheetComponent>,
    /// Total marks obtained.
    pub total_marks_obtained: Decimal,
    /// Total maximum marks.
    pub total_max_marks: Decimal,
    /// Percentage.
    pub percentage: Decimal,
    /// Letter grade.
    pub grade: Grade,
    /// Grade points.
    pub grade_points: Decimal,
    /// Whether the subject was passed.
    pub is_pass: bool,
    /// Credits earned.
    pub credits_earned: u32,
}

/// Semester totals, or a pending placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    /// Subjects rolled up.
    pub total_subjects: u32,
    /// Subjects passed.
    pub subjects_passed: u32,
    /// Subjects failed.
    pub subjects_failed: u32,
    /// Credits attempted.
    pub total_credits_attempted: u32,
    /// Credits earned.
    pub total_credits_earned: u32,
    /// SGPA.
    pub sgpa: Decimal,
    /// CGPA.
    pub cgpa: Decimal,
    /// Overall percentage.
    pub overall_percentage: Decimal,
    /// PASS, FAIL or PENDING.
    pub result_status: String,
    /// Result class, or N/A.
    pub result_class: String,
    /// Failed subject codes.
    pub backlog_subjects: Vec<String>,
}

impl SheetSummary {
    fn from_result(result: Option<SemesterResult>) -> Self {
        match result {
            Some(r) => Self {
                total_subjects: r.total_subjects,
                subjects_passed: r.subjects_passed,
                subjects_failed: r.subjects_failed,
                total_credits_attempted: r.total_credits_attempted,
                total_credits_earned: r.total_credits_earned,
                sgpa: r.sgpa,
                cgpa: r.cgpa,
                overall_percentage: r.overall_percentage,
                result_status: r.result_status.to_string(),
                result_class: r.result_class.to_string(),
                backlog_subjects: r.backlog_subjects,
            },
            None => Self {
                total_subjects: 0,
                subjects_passed: 0,
                subjects_failed: 0,
                total_credits_attempted: 0,
                total_credits_earned: 0,
                sgpa: Decimal::ZERO,
                cgpa: Decimal::ZERO,
                overall_percentage: Decimal::ZERO,
                result_status: String::from(PENDING_STATUS),
                result_class: String::from(PENDING_CLASS),
                backlog_subjects: Vec::new(),
            },
        }
    }
}

/// Component lines for one subject. Pass flags use the same thresholds as
/// the subject resolver.
fn component_lines(
    marks: &[ComponentMark],
    policy: &GradingPolicy,
) -> Result<Vec<SheetComponent>, GradingError> {
    let outcomes = match aggregate(marks, policy) {
        Ok(aggregate) => aggregate.components,
        Err(GradingError::NoData(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let by_mark: BTreeMap<_, _> = marks.iter().map(|m| (m.id, m)).collect();

    Ok(outcomes
        .into_iter()
        .filter_map(|outcome| {
            by_mark.get(&outcome.mark_id).map(|mark| SheetComponent {
                component_type: outcome.component_type,
                marks_obtained: outcome.marks,
                max_marks: outcome.max_marks,
                passing_marks: mark.passing_marks,
                is_absent: mark.is_absent,
                is_pass: outcome.passed,
            })
        })
        .collect())
}

/// Assemble a result sheet from already-loaded rows.
pub fn build_sheet(
    student: &Student,
    semester: u8,
    academic_year: &str,
    subjects: Vec<SubjectResultListing>,
    marks: &BTreeMap<SubjectId, Vec<ComponentMark>>,
    semester_result: Option<SemesterResult>,
    policy: &GradingPolicy,
) -> Result<ResultSheet, GradingError> {
    let mut blocks = Vec::with_capacity(subjects.len());
    for listing in subjects {
        let own = marks
            .get(&listing.result.subject_id)
            .map_or(&[][..], Vec::as_slice);
        let result = listing.result;
        blocks.push(SheetSubject {
            subject_code: listing.subject_code,
            subject_name: listing.subject_name,
            credits: listing.credits,
            components: component_lines(own, policy)?,
            total_marks_obtained: result.total_marks_obtained,
            total_max_marks: result.total_max_marks,
            percentage: result.percentage,
            grade: result.grade,
            grade_points: result.grade_points,
            is_pass: result.is_pass,
            credits_earned: result.credits_earned,
        });
    }

    Ok(ResultSheet {
        student: SheetHeader {
            id: student.id,
            name: student.full_name(),
            roll_number: student.roll_number.clone(),
            department: student.department.clone(),
            semester,
            academic_year: academic_year.to_owned(),
        },
        subjects: blocks,
        semester_summary: SheetSummary::from_result(semester_result),
    })
}

/// Serve the detailed result sheet of a student for one term.
pub async fn result_sheet(
    State(state): State<Arc<AppState>>,
    Path(student_str): Path<String>,
    Query(params): Query<TermQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = StudentId::from(parse_uuid(&student_str)?);
    let student = state
        .store
        .students()
        .get(student_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("student not found: {student_id}")))?;

    let results = state.store.results();
    let subjects = results
        .subject_result_listing(student_id, params.semester, &params.academic_year)
        .await?;

    let mut marks = BTreeMap::new();
    for listing in &subjects {
        let subject_id = listing.result.subject_id;
        let rows = state
            .store
            .marks()
            .for_student_subject(student_id, subject_id)
            .await?;
        marks.insert(subject_id, rows);
    }

    let semester_result = results
        .semester_result(student_id, params.semester, &params.academic_year)
        .await?;

    let sheet = build_sheet(
        &student,
        params.semester,
        &params.academic_year,
        subjects,
        &marks,
        semester_result,
        &state.policy,
    )?;

    Ok(Json(sheet))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use marksheet_types::{
        AcademicStatus, ComponentMarkId, ExamEventId, Gender, ResultClass, ResultStatus,
        SemesterResultId, SubjectComponentId, SubjectResult, SubjectResultId,
    };

    use super::*;

    fn student() -> Student {
        Student {
            id: StudentId::new(),
            first_name: String::from("Asha"),
            middle_name: None,
            last_name: String::from("Patil"),
            email: String::from("asha@example.edu"),
            roll_number: Some(String::from("CSE-042")),
            department: String::from("CSE"),
            current_semester: 3,
            gender: Gender::Female,
            academic_status: AcademicStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn mark(
        student_id: StudentId,
        subject_id: SubjectId,
        component_type: ComponentType,
        marks: i64,
        max: i64,
        pass: i64,
        is_absent: bool,
    ) -> ComponentMark {
        ComponentMark {
            id: ComponentMarkId::new(),
            student_id,
            subject_id,
            component_id: SubjectComponentId::new(),
            component_type,
            exam_event_id: ExamEventId::new(),
            marks_obtained: Decimal::new(marks, 0),
            max_marks: Decimal::new(max, 0),
            passing_marks: Decimal::new(pass, 0),
            is_absent,
            entered_by: None,
            remarks: None,
            entered_at: Utc::now(),
        }
    }

    fn listing(student_id: StudentId, subject_id: SubjectId) -> SubjectResultListing {
        SubjectResultListing {
            subject_code: String::from("CSC301"),
            subject_name: String::from("Data Structures"),
            credits: 4,
            result: SubjectResult {
                id: SubjectResultId::new(),
                student_id,
                subject_id,
                academic_year: String::from("2024-25"),
                semester: 3,
                ia_marks: Decimal::new(15, 0),
                ese_marks: Decimal::ZERO,
                oral_marks: Decimal::ZERO,
                practical_marks: Decimal::ZERO,
                tw_marks: Decimal::ZERO,
                total_marks_obtained: Decimal::new(15, 0),
                total_max_marks: Decimal::new(100, 0),
                percentage: Decimal::new(15, 0),
                grade: Grade::F,
                grade_points: Decimal::ZERO,
                is_pass: false,
                credits_earned: 0,
                is_backlog: true,
                attempt_number: 1,
                calculated_at: Utc::now(),
            },
        }
    }

    #[test]
    fn missing_semester_result_is_pending() {
        let pupil = student();
        let sheet = build_sheet(
            &pupil,
            3,
            "2024-25",
            Vec::new(),
            &BTreeMap::new(),
            None,
            &GradingPolicy::default(),
        )
        .unwrap();

        assert_eq!(sheet.student.name, "Asha Patil");
        assert!(sheet.subjects.is_empty());
        assert_eq!(sheet.semester_summary.result_status, "PENDING");
        assert_eq!(sheet.semester_summary.result_class, "N/A");
        assert_eq!(sheet.semester_summary.sgpa, Decimal::ZERO);
    }

    #[test]
    fn components_carry_pass_flags_and_absence() {
        let pupil = student();
        let subject_id = SubjectId::new();
        let marks = BTreeMap::from([(
            subject_id,
            vec![
                mark(pupil.id, subject_id, ComponentType::InternalAssessment, 15, 20, 8, false),
                mark(pupil.id, subject_id, ComponentType::EndSemesterExam, 50, 80, 32, true),
            ],
        )]);

        let sheet = build_sheet(
            &pupil,
            3,
            "2024-25",
            vec![listing(pupil.id, subject_id)],
            &marks,
            None,
            &GradingPolicy::default(),
        )
        .unwrap();

        let components = &sheet.subjects.first().unwrap().components;
        assert_eq!(components.len(), 2);
        let ia = components
            .iter()
            .find(|c| c.component_type == ComponentType::InternalAssessment)
            .unwrap();
        assert!(ia.is_pass);
        let ese = components
            .iter()
            .find(|c| c.component_type == ComponentType::EndSemesterExam)
            .unwrap();
        assert!(ese.is_absent);
        assert_eq!(ese.marks_obtained, Decimal::ZERO);
        assert!(!ese.is_pass);
    }

    #[test]
    fn calculated_semester_fills_the_summary() {
        let pupil = student();
        let result = SemesterResult {
            id: SemesterResultId::new(),
            student_id: pupil.id,
            semester: 3,
            academic_year: String::from("2024-25"),
            total_subjects: 2,
            subjects_passed: 1,
            subjects_failed: 1,
            total_credits_attempted: 7,
            total_credits_earned: 4,
            total_credit_points: Decimal::new(270, 1),
            sgpa: Decimal::new(386, 2),
            cgpa: Decimal::new(386, 2),
            overall_percentage: Decimal::new(475, 1),
            total_marks_obtained: Decimal::new(95, 0),
            total_max_marks: Decimal::new(200, 0),
            result_status: ResultStatus::Fail,
            result_class: ResultClass::Fail,
            backlog_subjects: vec![String::from("CSC302")],
            has_backlogs: true,
            calculated_at: Utc::now(),
        };

        let sheet = build_sheet(
            &pupil,
            3,
            "2024-25",
            Vec::new(),
            &BTreeMap::new(),
            Some(result),
            &GradingPolicy::default(),
        )
        .unwrap();

        assert_eq!(sheet.semester_summary.result_status, "FAIL");
        assert_eq!(sheet.semester_summary.result_class, "Fail");
        assert_eq!(sheet.semester_summary.backlog_subjects, ["CSC302"]);
    }
}
