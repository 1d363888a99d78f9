//! In-memory [`RecordStore`] for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use rust_decimal::Decimal;

use marksheet_types::{
    AcademicStatus, ComponentMark, ComponentMarkId, ComponentType, ExamEventId, Gender, Grade,
    ResultClass, ResultStatus, SemesterResult, SemesterResultId, Student, StudentId, Subject,
    SubjectComponent, SubjectComponentId, SubjectId, SubjectResult, SubjectResultId,
};

use crate::store::{RecordStore, StoreError};

pub const YEAR: &str = "2024-25";
pub const SEMESTER: u8 = 3;

#[derive(Default)]
struct Inner {
    students: BTreeMap<StudentId, Student>,
    subjects: BTreeMap<SubjectId, Subject>,
    marks: Vec<ComponentMark>,
    subject_results: Vec<SubjectResult>,
    semester_results: Vec<SemesterResult>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_student(&self) -> StudentId {
        let id = StudentId::new();
        let student = Student {
            id,
            first_name: String::from("Test"),
            middle_name: None,
            last_name: String::from("Student"),
            email: format!("{id}@example.edu"),
            roll_number: None,
            department: String::from("Computer Science Engineering"),
            current_semester: SEMESTER,
            gender: Gender::Other,
            academic_status: AcademicStatus::Active,
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().students.insert(id, student);
        id
    }

    pub fn remove_student(&self, id: StudentId) {
        self.inner.lock().unwrap().students.remove(&id);
    }

    /// A subject with IA (out of 20, pass 8) and ESE (out of 80, pass 32).
    pub fn add_ia_ese_subject(&self, code: &str, credits: u32) -> Subject {
        let id = SubjectId::new();
        let component = |component_type, out_of: i64, passing: i64| SubjectComponent {
            id: SubjectComponentId::new(),
            subject_id: id,
            component_type,
            out_of_marks: Decimal::from(out_of),
            passing_marks: Decimal::from(passing),
            is_enabled: true,
            resolution: None,
        };
        let subject = Subject {
            id,
            code: code.to_owned(),
            name: format!("Subject {code}"),
            academic_year: YEAR.to_owned(),
            scheme: String::from("2019"),
            department: String::from("Computer Science Engineering"),
            semester: SEMESTER,
            credits,
            overall_passing_criteria: Decimal::from(40),
            components: vec![
                component(ComponentType::InternalAssessment, 20, 8),
                component(ComponentType::EndSemesterExam, 80, 32),
            ],
        };
        self.inner
            .lock()
            .unwrap()
            .subjects
            .insert(id, subject.clone());
        subject
    }

    pub fn remove_subject(&self, id: SubjectId) {
        self.inner.lock().unwrap().subjects.remove(&id);
    }

    /// Enter marks for every component of `subject`, in component order.
    pub fn add_marks(&self, student_id: StudentId, subject: &Subject, ia: Decimal, ese: Decimal) {
        let exam_event_id = ExamEventId::new();
        let mut inner = self.inner.lock().unwrap();
        for (component, obtained) in subject.components.iter().zip([ia, ese]) {
            inner.marks.push(ComponentMark {
                id: ComponentMarkId::new(),
                student_id,
                subject_id: subject.id,
                component_id: component.id,
                component_type: component.component_type,
                exam_event_id,
                marks_obtained: obtained,
                max_marks: component.out_of_marks,
                passing_marks: component.passing_marks,
                is_absent: false,
                entered_by: None,
                remarks: None,
                entered_at: Utc::now(),
            });
        }
    }

    /// Record the student as absent for one component: zero marks, the
    /// component's maximum still counted.
    pub fn mark_absent(
        &self,
        student_id: StudentId,
        subject: &Subject,
        component_type: ComponentType,
    ) {
        let mut inner = self.inner.lock().unwrap();
        for mark in inner.marks.iter_mut().filter(|m| {
            m.student_id == student_id
                && m.subject_id == subject.id
                && m.component_type == component_type
        }) {
            mark.marks_obtained = Decimal::ZERO;
            mark.is_absent = true;
        }
    }

    /// Store a subject result out of 100 marks without going through the
    /// subject resolver.
    pub fn put_subject_result(
        &self,
        student_id: StudentId,
        subject: &Subject,
        marks: Decimal,
        grade_points: Decimal,
        is_pass: bool,
    ) {
        let result = SubjectResult {
            id: SubjectResultId::new(),
            student_id,
            subject_id: subject.id,
            academic_year: YEAR.to_owned(),
            semester: SEMESTER,
            ia_marks: Decimal::ZERO,
            ese_marks: marks,
            oral_marks: Decimal::ZERO,
            practical_marks: Decimal::ZERO,
            tw_marks: Decimal::ZERO,
            total_marks_obtained: marks,
            total_max_marks: Decimal::ONE_HUNDRED,
            percentage: marks,
            grade: if is_pass { Grade::D } else { Grade::F },
            grade_points,
            is_pass,
            credits_earned: if is_pass { subject.credits } else { 0 },
            is_backlog: !is_pass,
            attempt_number: 1,
            calculated_at: Utc::now(),
        };
        self.inner.lock().unwrap().subject_results.push(result);
    }

    pub fn put_prior_semester(
        &self,
        student_id: StudentId,
        semester: u8,
        sgpa: Decimal,
        credits: u32,
    ) {
        let result = SemesterResult {
            id: SemesterResultId::new(),
            student_id,
            semester,
            academic_year: String::from("2023-24"),
            total_subjects: 1,
            subjects_passed: 1,
            subjects_failed: 0,
            total_credits_attempted: credits,
            total_credits_earned: credits,
            total_credit_points: sgpa * Decimal::from(credits),
            sgpa,
            cgpa: sgpa,
            overall_percentage: Decimal::from(60),
            total_marks_obtained: Decimal::from(60),
            total_max_marks: Decimal::ONE_HUNDRED,
            result_status: ResultStatus::Pass,
            result_class: ResultClass::FirstClass,
            backlog_subjects: Vec::new(),
            has_backlogs: false,
            calculated_at: Utc::now(),
        };
        self.inner.lock().unwrap().semester_results.push(result);
    }

    pub fn subject_result_count(&self) -> usize {
        self.inner.lock().unwrap().subject_results.len()
    }

    pub fn semester_result_count(&self) -> usize {
        self.inner.lock().unwrap().semester_results.len()
    }
}

impl RecordStore for MemoryStore {
    async fn find_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.inner.lock().unwrap().students.get(&id).cloned())
    }

    async fn find_subject(&self, id: SubjectId) -> Result<Option<Subject>, StoreError> {
        Ok(self.inner.lock().unwrap().subjects.get(&id).cloned())
    }

    async fn component_marks(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
    ) -> Result<Vec<ComponentMark>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .marks
            .iter()
            .filter(|m| m.student_id == student_id && m.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn subjects_with_marks(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<Vec<SubjectId>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut ids: Vec<SubjectId> = inner
            .marks
            .iter()
            .filter(|m| m.student_id == student_id)
            .filter(|m| {
                inner.subjects.get(&m.subject_id).is_some_and(|s| {
                    s.semester == semester && s.academic_year == academic_year
                })
            })
            .map(|m| m.subject_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn upsert_subject_result(
        &self,
        result: &SubjectResult,
    ) -> Result<SubjectResult, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let existing = inner.subject_results.iter_mut().find(|r| {
            r.student_id == result.student_id
                && r.subject_id == result.subject_id
                && r.academic_year == result.academic_year
                && r.attempt_number == result.attempt_number
        });
        if let Some(row) = existing {
            *row = SubjectResult {
                id: row.id,
                ..result.clone()
            };
            return Ok(row.clone());
        }
        inner.subject_results.push(result.clone());
        Ok(result.clone())
    }

    async fn subject_results(
        &self,
        student_id: StudentId,
        semester: u8,
        academic_year: &str,
    ) -> Result<Vec<SubjectResult>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .subject_results
            .iter()
            .filter(|r| {
                r.student_id == student_id
                    && r.semester == semester
                    && r.academic_year == academic_year
            })
            .cloned()
            .collect())
    }

    async fn upsert_semester_result(
        &self,
        result: &SemesterResult,
    ) -> Result<SemesterResult, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let existing = inner.semester_results.iter_mut().find(|r| {
            r.student_id == result.student_id
                && r.semester == result.semester
                && r.academic_year == result.academic_year
        });
        if let Some(row) = existing {
            *row = SemesterResult {
                id: row.id,
                ..result.clone()
            };
            return Ok(row.clone());
        }
        inner.semester_results.push(result.clone());
        Ok(result.clone())
    }

    async fn prior_semester_results(
        &self,
        student_id: StudentId,
        semester: u8,
    ) -> Result<Vec<SemesterResult>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .semester_results
            .iter()
            .filter(|r| r.student_id == student_id && r.semester < semester)
            .cloned()
            .collect())
    }
}
