//! Core entity structs for the academic records backend.
//!
//! Reference data (students, subjects, exam events) is owned by the
//! surrounding CRUD layer. Marks and results are the inputs and outputs of
//! the result aggregation engine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AcademicStatus, ComponentType, ExamStatus, ExamType, Gender, Grade, ResultClass, ResultStatus,
};
use crate::ids::{
    ComponentMarkId, ExamEventId, PublicationId, SemesterResultId, StudentId, SubjectComponentId,
    SubjectId, SubjectResultId,
};

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A student enrolled in a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Student {
    /// Student ID.
    pub id: StudentId,
    /// Given name.
    pub first_name: String,
    /// Middle name, if any.
    pub middle_name: Option<String>,
    /// Family name.
    pub last_name: String,
    /// Contact email (unique).
    pub email: String,
    /// Roll number printed on mark sheets (unique when present).
    pub roll_number: Option<String>,
    /// Department the student belongs to.
    pub department: String,
    /// Semester the student is currently in (1 to 8).
    pub current_semester: u8,
    /// Recorded gender.
    pub gender: Gender,
    /// Progression status.
    pub academic_status: AcademicStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Full display name with the middle name when present.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().filter(|m| !m.trim().is_empty()) {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// One marks component of a subject, e.g. "IA out of 20, pass at 8".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubjectComponent {
    /// Component ID.
    pub id: SubjectComponentId,
    /// Owning subject.
    pub subject_id: SubjectId,
    /// Which assessment category this is.
    pub component_type: ComponentType,
    /// Maximum marks for the component.
    #[ts(as = "String")]
    pub out_of_marks: Decimal,
    /// Minimum marks required to pass the component.
    #[ts(as = "String")]
    pub passing_marks: Decimal,
    /// Disabled components accept no new marks.
    pub is_enabled: bool,
    /// Free-text label, e.g. "Viva voce".
    pub resolution: Option<String>,
}

/// A subject offered for one academic year and semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Subject {
    /// Subject ID.
    pub id: SubjectId,
    /// Catalog code, e.g. `CSC301`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Academic year label, e.g. `2024-25`.
    pub academic_year: String,
    /// Syllabus scheme, e.g. `2019`.
    pub scheme: String,
    /// Offering department.
    pub department: String,
    /// Semester number (1 to 8).
    pub semester: u8,
    /// Credit value of the subject.
    pub credits: u32,
    /// Overall percentage required to pass.
    #[ts(as = "String")]
    pub overall_passing_criteria: Decimal,
    /// Marks components making up the subject.
    pub components: Vec<SubjectComponent>,
}

impl Subject {
    /// Look up one of this subject's components by ID.
    pub fn component(&self, id: SubjectComponentId) -> Option<&SubjectComponent> {
        self.components.iter().find(|c| c.id == id)
    }
}

/// An examination sitting that produces component marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExamEvent {
    /// Exam event ID.
    pub id: ExamEventId,
    /// Display name, e.g. "Second Year Mid-Term Exams, Winter 2025".
    pub name: String,
    /// Kind of examination.
    pub exam_type: ExamType,
    /// Lifecycle state.
    pub status: ExamStatus,
    /// Department sitting the exam.
    pub department: String,
    /// Semester number (1 to 8).
    pub semester: u8,
    /// Academic year label.
    pub academic_year: String,
    /// First day of the sitting.
    pub start_date: NaiveDate,
    /// Last day of the sitting.
    pub end_date: NaiveDate,
    /// Pass percentage announced for the event.
    #[ts(as = "String")]
    pub passing_percentage: Decimal,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

/// Marks scored by one student in one component at one exam event.
///
/// Unique per (student, component, exam event); re-entry overwrites.
/// `component_type` and `passing_marks` are read from the owning
/// [`SubjectComponent`] so the aggregator never needs a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ComponentMark {
    /// Row ID.
    pub id: ComponentMarkId,
    /// The student.
    pub student_id: StudentId,
    /// The subject the component belongs to.
    pub subject_id: SubjectId,
    /// The component being marked.
    pub component_id: SubjectComponentId,
    /// Category of the component.
    pub component_type: ComponentType,
    /// The exam event the marks were scored in.
    pub exam_event_id: ExamEventId,
    /// Marks scored. Ignored when `is_absent`.
    #[ts(as = "String")]
    pub marks_obtained: Decimal,
    /// Maximum marks for the row (copied from the component at entry).
    #[ts(as = "String")]
    pub max_marks: Decimal,
    /// Pass mark of the component.
    #[ts(as = "String")]
    pub passing_marks: Decimal,
    /// The student did not sit this component.
    pub is_absent: bool,
    /// Who entered the marks.
    pub entered_by: Option<String>,
    /// Examiner remarks.
    pub remarks: Option<String>,
    /// When the marks were last entered.
    pub entered_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Final result of one student in one subject for one attempt.
///
/// Invariant: `credits_earned` is the subject's credits when `is_pass`,
/// otherwise zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubjectResult {
    /// Row ID.
    pub id: SubjectResultId,
    /// The student.
    pub student_id: StudentId,
    /// The subject.
    pub subject_id: SubjectId,
    /// Academic year label.
    pub academic_year: String,
    /// Semester number (1 to 8).
    pub semester: u8,
    /// Internal assessment subtotal.
    #[ts(as = "String")]
    pub ia_marks: Decimal,
    /// End-semester exam subtotal.
    #[ts(as = "String")]
    pub ese_marks: Decimal,
    /// Oral subtotal.
    #[ts(as = "String")]
    pub oral_marks: Decimal,
    /// Practical subtotal.
    #[ts(as = "String")]
    pub practical_marks: Decimal,
    /// Term work subtotal.
    #[ts(as = "String")]
    pub tw_marks: Decimal,
    /// Sum of all subtotals.
    #[ts(as = "String")]
    pub total_marks_obtained: Decimal,
    /// Sum of every row's maximum marks.
    #[ts(as = "String")]
    pub total_max_marks: Decimal,
    /// Overall percentage, two decimal places.
    #[ts(as = "String")]
    pub percentage: Decimal,
    /// Letter grade for the percentage.
    pub grade: Grade,
    /// Grade points for the letter grade.
    #[ts(as = "String")]
    pub grade_points: Decimal,
    /// Whether the subject was passed.
    pub is_pass: bool,
    /// Credits earned (all or nothing).
    pub credits_earned: u32,
    /// The subject must be re-attempted.
    pub is_backlog: bool,
    /// Attempt number; 1 for the regular attempt.
    pub attempt_number: u32,
    /// When the result was last computed.
    pub calculated_at: DateTime<Utc>,
}

/// Consolidated result of one student for one semester.
///
/// Invariants: `subjects_passed + subjects_failed == total_subjects`, and
/// `result_status` is [`ResultStatus::Fail`] exactly when
/// `subjects_failed > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SemesterResult {
    /// Row ID.
    pub id: SemesterResultId,
    /// The student.
    pub student_id: StudentId,
    /// Semester number (1 to 8).
    pub semester: u8,
    /// Academic year label.
    pub academic_year: String,
    /// Number of subject results rolled up.
    pub total_subjects: u32,
    /// Subjects passed.
    pub subjects_passed: u32,
    /// Subjects failed.
    pub subjects_failed: u32,
    /// Full credit value of every subject attempted.
    pub total_credits_attempted: u32,
    /// Credits actually earned.
    pub total_credits_earned: u32,
    /// Sum of `credits_earned * grade_points`.
    #[ts(as = "String")]
    pub total_credit_points: Decimal,
    /// Semester grade point average, two decimal places.
    #[ts(as = "String")]
    pub sgpa: Decimal,
    /// Cumulative grade point average, two decimal places.
    #[ts(as = "String")]
    pub cgpa: Decimal,
    /// Aggregate percentage across all subjects, two decimal places.
    #[ts(as = "String")]
    pub overall_percentage: Decimal,
    /// Sum of marks obtained across subjects.
    #[ts(as = "String")]
    pub total_marks_obtained: Decimal,
    /// Sum of maximum marks across subjects.
    #[ts(as = "String")]
    pub total_max_marks: Decimal,
    /// PASS or FAIL.
    pub result_status: ResultStatus,
    /// Classification from CGPA.
    pub result_class: ResultClass,
    /// Codes of the failed subjects.
    pub backlog_subjects: Vec<String>,
    /// Whether any subject was failed.
    pub has_backlogs: bool,
    /// When the result was last computed.
    pub calculated_at: DateTime<Utc>,
}

/// A semester result made visible to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PublishedResult {
    /// Row ID.
    pub id: PublicationId,
    /// The student.
    pub student_id: StudentId,
    /// Semester number (1 to 8).
    pub semester: u8,
    /// Academic year label.
    pub academic_year: String,
    /// Department the result was published for.
    pub department: String,
    /// Who published the result.
    pub published_by: Option<String>,
    /// When the result was published.
    pub published_at: DateTime<Utc>,
    /// Whether the student has opened the result.
    pub is_viewed: bool,
    /// When the student first opened the result.
    pub viewed_at: Option<DateTime<Utc>>,
}
