//! Health check and reference-data endpoints.
//!
//! Students, subjects (with their marks components) and exam events are the
//! rows every other endpoint refers to.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `POST` | `/api/students` | Register a student |
//! | `GET` | `/api/students` | List students (by department) |
//! | `GET` | `/api/students/{id}` | Single student |
//! | `POST` | `/api/subjects` | Create a subject with components |
//! | `GET` | `/api/subjects` | List subjects (by department/semester/year) |
//! | `GET` | `/api/subjects/{id}` | Single subject |
//! | `POST` | `/api/exam-events` | Schedule an exam event |
//! | `GET` | `/api/exam-events` | List exam events (by department) |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use marksheet_db::{NewComponent, NewExamEvent, NewStudent, NewSubject, SubjectFilter};
use marksheet_types::{
    AcademicStatus, ComponentType, ExamStatus, ExamType, Gender, StudentId, SubjectId,
};

use crate::error::ApiError;
use crate::request::{non_negative, parse_uuid, percentage, validated};
use crate::state::AppState;

/// Overall pass percentage recorded on a subject when none is given.
const DEFAULT_PASSING_CRITERIA: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Syllabus scheme recorded on a subject when none is given.
const DEFAULT_SCHEME: &str = "R-2019";

// ---------------------------------------------------------------------------
// Request bodies and query parameters
// ---------------------------------------------------------------------------

/// Body of `POST /api/students`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    /// Given name.
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    /// Middle name.
    #[validate(length(max = 100))]
    pub middle_name: Option<String>,
    /// Family name.
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// Contact email.
    #[validate(email)]
    pub email: String,
    /// Roll number.
    #[validate(length(min = 1, max = 50))]
    pub roll_number: Option<String>,
    /// Department.
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    /// Current semester.
    #[validate(range(min = 1, max = 8))]
    pub current_semester: u8,
    /// Recorded gender.
    pub gender: Gender,
    /// Progression status (default `active`).
    pub academic_status: Option<AcademicStatus>,
}

/// One component of a [`CreateSubjectRequest`].
#[derive(Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "pass_mark_within_maximum"))]
pub struct ComponentRequest {
    /// Component category.
    pub component_type: ComponentType,
    /// Maximum marks. Zero is allowed; such a component passes at the
    /// default component percentage.
    #[validate(custom(function = "non_negative"))]
    pub out_of_marks: Decimal,
    /// Pass mark.
    #[validate(custom(function = "non_negative"))]
    pub passing_marks: Decimal,
    /// Free-text label.
    pub resolution: Option<String>,
}

fn pass_mark_within_maximum(component: &ComponentRequest) -> Result<(), ValidationError> {
    if component.passing_marks > component.out_of_marks {
        return Err(ValidationError::new("passing_marks")
            .with_message(std::borrow::Cow::Borrowed("pass mark exceeds maximum marks")));
    }
    Ok(())
}

/// Body of `POST /api/subjects`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    /// Catalog code.
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Academic year label.
    #[validate(length(min = 1, max = 20))]
    pub academic_year: String,
    /// Syllabus scheme.
    pub scheme: Option<String>,
    /// Offering department.
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    /// Semester.
    #[validate(range(min = 1, max = 8))]
    pub semester: u8,
    /// Credit value.
    #[validate(range(max = 40))]
    pub credits: u32,
    /// Overall pass percentage (default 40).
    #[validate(custom(function = "percentage"))]
    pub overall_passing_criteria: Option<Decimal>,
    /// Marks components.
    #[validate(length(min = 1, max = 5), nested)]
    pub components: Vec<ComponentRequest>,
}

/// Body of `POST /api/exam-events`.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "dates_in_order"))]
pub struct CreateExamEventRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Kind of examination.
    pub exam_type: ExamType,
    /// Lifecycle state (default `scheduled`).
    pub status: Option<ExamStatus>,
    /// Department sitting the exam.
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    /// Semester.
    #[validate(range(min = 1, max = 8))]
    pub semester: u8,
    /// Academic year label.
    #[validate(length(min = 1, max = 20))]
    pub academic_year: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Announced pass percentage (default 40).
    #[validate(custom(function = "percentage"))]
    pub passing_percentage: Option<Decimal>,
}

fn dates_in_order(event: &CreateExamEventRequest) -> Result<(), ValidationError> {
    if event.end_date < event.start_date {
        return Err(ValidationError::new("end_date")
            .with_message(std::borrow::Cow::Borrowed("end date is before start date")));
    }
    Ok(())
}

/// Query parameters for list endpoints filtered by department.
#[derive(Debug, Deserialize)]
pub struct DepartmentQuery {
    /// Only rows of this department.
    pub department: Option<String>,
}

/// Query parameters for `GET /api/subjects`.
#[derive(Debug, Deserialize)]
pub struct SubjectsQuery {
    /// Only subjects of this department.
    pub department: Option<String>,
    /// Only subjects of this semester.
    pub semester: Option<u8>,
    /// Only subjects of this academic year.
    pub academic_year: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe. Does not touch the database.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "marksheet",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// Register a student.
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;
    let student = state
        .store
        .students()
        .create(&NewStudent {
            first_name: request.first_name,
            middle_name: request.middle_name,
            last_name: request.last_name,
            email: request.email,
            roll_number: request.roll_number,
            department: request.department,
            current_semester: request.current_semester,
            gender: request.gender,
            academic_status: request.academic_status.unwrap_or(AcademicStatus::Active),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(student)))
}

/// List students, optionally for one department.
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DepartmentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let students = state
        .store
        .students()
        .list(params.department.as_deref())
        .await?;

    Ok(Json(serde_json::json!({
        "count": students.len(),
        "students": students,
    })))
}

/// Return a single student.
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = StudentId::from(parse_uuid(&id_str)?);
    let student = state
        .store
        .students()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("student not found: {id}")))?;

    Ok(Json(student))
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

/// Create a subject together with its components.
pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;
    let components = request
        .components
        .into_iter()
        .map(|c| NewComponent {
            component_type: c.component_type,
            out_of_marks: c.out_of_marks,
            passing_marks: c.passing_marks,
            resolution: c.resolution,
        })
        .collect();

    let subject = state
        .store
        .subjects()
        .create(&NewSubject {
            code: request.code,
            name: request.name,
            academic_year: request.academic_year,
            scheme: request
                .scheme
                .unwrap_or_else(|| String::from(DEFAULT_SCHEME)),
            department: request.department,
            semester: request.semester,
            credits: request.credits,
            overall_passing_criteria: request
                .overall_passing_criteria
                .unwrap_or(DEFAULT_PASSING_CRITERIA),
            components,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(subject)))
}

/// List subjects matching the query filters.
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubjectsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let subjects = state
        .store
        .subjects()
        .list(&SubjectFilter {
            department: params.department,
            semester: params.semester,
            academic_year: params.academic_year,
        })
        .await?;

    Ok(Json(serde_json::json!({
        "count": subjects.len(),
        "subjects": subjects,
    })))
}

/// Return a single subject with its components.
pub async fn get_subject(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = SubjectId::from(parse_uuid(&id_str)?);
    let subject = state
        .store
        .subjects()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("subject not found: {id}")))?;

    Ok(Json(subject))
}

// ---------------------------------------------------------------------------
// Exam events
// ---------------------------------------------------------------------------

/// Schedule an exam event.
pub async fn create_exam_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateExamEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;
    let event = state
        .store
        .exam_events()
        .create(&NewExamEvent {
            name: request.name,
            exam_type: request.exam_type,
            status: request.status.unwrap_or(ExamStatus::Scheduled),
            department: request.department,
            semester: request.semester,
            academic_year: request.academic_year,
            start_date: request.start_date,
            end_date: request.end_date,
            passing_percentage: request
                .passing_percentage
                .unwrap_or(DEFAULT_PASSING_CRITERIA),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// List exam events, optionally for one department.
pub async fn list_exam_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DepartmentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let events = state
        .store
        .exam_events()
        .list(params.department.as_deref())
        .await?;

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "exam_events": events,
    })))
}
