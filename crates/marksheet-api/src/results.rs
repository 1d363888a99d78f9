//! Result calculation and query endpoints.
//!
//! Calculation goes through the grading resolvers only; these handlers never
//! write result rows themselves.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/results/subject/calculate` | Resolve one subject result |
//! | `POST` | `/api/results/semester/calculate` | Resolve one semester result |
//! | `POST` | `/api/results/semester/calculate-batch` | Recalculate many students in the background |
//! | `GET` | `/api/results/subject/{student_id}/{subject_id}` | One subject result |
//! | `GET` | `/api/results/subject/student/{student_id}` | A student's subject results for a semester |
//! | `GET` | `/api/results/semester/{student_id}/{semester}` | One semester result |
//! | `GET` | `/api/results/semester` | A department's semester results |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use marksheet_grading::{recalculate_batch, resolve_semester_result, resolve_subject_result};
use marksheet_types::{StudentId, SubjectId};

use crate::error::ApiError;
use crate::request::{parse_uuid, validated};
use crate::state::AppState;

/// Body of `POST /api/results/subject/calculate`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubjectCalculationRequest {
    /// The student.
    pub student_id: StudentId,
    /// The subject.
    pub subject_id: SubjectId,
    /// Academic year label.
    #[validate(length(min = 1, max = 20))]
    pub academic_year: String,
    /// Semester.
    #[validate(range(min = 1, max = 8))]
    pub semester: u8,
}

/// Body of `POST /api/results/semester/calculate`.
#[derive(Debug, Deserialize, Validate)]
pub struct SemesterCalculationRequest {
    /// The student.
    pub student_id: StudentId,
    /// Semester.
    #[validate(range(min = 1, max = 8))]
    pub semester: u8,
    /// Academic year label.
    #[validate(length(min = 1, max = 20))]
    pub academic_year: String,
}

/// Body of `POST /api/results/semester/calculate-batch`.
///
/// Either `student_ids` or `department` must be given. With only a
/// department, every active student of it is recalculated.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchCalculationRequest {
    /// Students to recalculate.
    #[serde(default)]
    pub student_ids: Vec<StudentId>,
    /// Department whose active students are recalculated.
    #[validate(length(min = 1, max = 100))]
    pub department: Option<String>,
    /// Semester.
    #[validate(range(min = 1, max = 8))]
    pub semester: u8,
    /// Academic year label.
    #[validate(length(min = 1, max = 20))]
    pub academic_year: String,
}

/// Query parameters carrying an academic year.
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    /// Academic year label.
    pub academic_year: String,
}

/// Query parameters naming one term.
#[derive(Debug, Deserialize)]
pub struct TermQuery {
    /// Academic year label.
    pub academic_year: String,
    /// Semester.
    pub semester: u8,
}

/// Query parameters for the department listing.
#[derive(Debug, Deserialize)]
pub struct DepartmentTermQuery {
    /// Department.
    pub department: String,
    /// Semester.
    pub semester: u8,
    /// Academic year label.
    pub academic_year: String,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Resolve and persist one subject result.
pub async fn calculate_subject(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubjectCalculationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;
    let result = resolve_subject_result(
        &state.store,
        &state.policy,
        request.student_id,
        request.subject_id,
        &request.academic_year,
        request.semester,
    )
    .await?;

    Ok(Json(result))
}

/// Resolve and persist one semester result from stored subject results.
pub async fn calculate_semester(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SemesterCalculationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;
    let result = resolve_semester_result(
        &state.store,
        &state.policy,
        request.student_id,
        request.semester,
        &request.academic_year,
    )
    .await?;

    Ok(Json(result))
}

/// Recalculate many students on a background task.
///
/// Answers `202 Accepted` as soon as the batch is scheduled. Per-student
/// failures are logged by the batch itself.
pub async fn calculate_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchCalculationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;

    let student_ids = if request.student_ids.is_empty() {
        let Some(department) = request.department.as_deref() else {
            return Err(ApiError::InvalidInput(String::from(
                "either student_ids or department is required",
            )));
        };
        state
            .store
            .students()
            .active_ids_in_department(department)
            .await?
    } else {
        request.student_ids
    };

    let accepted = student_ids.len();
    let store = state.store.clone();
    let policy = state.policy.clone();
    let semester = request.semester;
    let academic_year = request.academic_year;
    let year = academic_year.clone();

    tokio::spawn(async move {
        recalculate_batch(&store, &policy, &student_ids, semester, &year).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "accepted": accepted,
            "semester": semester,
            "academic_year": academic_year,
            "message": "batch recalculation scheduled",
        })),
    ))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// The latest subject result of a student in a subject.
pub async fn get_subject_result(
    State(state): State<Arc<AppState>>,
    Path((student_str, subject_str)): Path<(String, String)>,
    Query(params): Query<YearQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = StudentId::from(parse_uuid(&student_str)?);
    let subject_id = SubjectId::from(parse_uuid(&subject_str)?);

    let result = state
        .store
        .results()
        .subject_result(student_id, subject_id, &params.academic_year)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("subject result not found")))?;

    Ok(Json(result))
}

/// A student's subject results for one semester.
pub async fn list_student_subject_results(
    State(state): State<Arc<AppState>>,
    Path(student_str): Path<String>,
    Query(params): Query<TermQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = StudentId::from(parse_uuid(&student_str)?);
    let results = state
        .store
        .results()
        .subject_result_listing(student_id, params.semester, &params.academic_year)
        .await?;

    Ok(Json(serde_json::json!({
        "student_id": student_id,
        "semester": params.semester,
        "academic_year": params.academic_year,
        "count": results.len(),
        "results": results,
    })))
}

/// One semester result of a student.
pub async fn get_semester_result(
    State(state): State<Arc<AppState>>,
    Path((student_str, semester)): Path<(String, u8)>,
    Query(params): Query<YearQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = StudentId::from(parse_uuid(&student_str)?);
    let result = state
        .store
        .results()
        .semester_result(student_id, semester, &params.academic_year)
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("semester result not found")))?;

    Ok(Json(result))
}

/// Semester results of every student of a department.
pub async fn list_semester_results(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DepartmentTermQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state
        .store
        .results()
        .semester_results_for_department(&params.department, params.semester, &params.academic_year)
        .await?;

    Ok(Json(serde_json::json!({
        "department": params.department,
        "semester": params.semester,
        "academic_year": params.academic_year,
        "count": results.len(),
        "results": results,
    })))
}
