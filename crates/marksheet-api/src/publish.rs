//! Publishing semester results to the student portal.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/results/publish` | Publish a term's results for a set of students |
//! | `GET` | `/api/results/published/{student_id}` | A student's published results |
//! | `PUT` | `/api/results/published/{student_id}/viewed` | Record that the student opened a result |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use marksheet_types::StudentId;

use crate::error::ApiError;
use crate::request::{parse_uuid, validated};
use crate::results::TermQuery;
use crate::state::AppState;

/// Body of `POST /api/results/publish`.
#[derive(Debug, Deserialize, Validate)]
pub struct PublishRequest {
    /// Department the results belong to.
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    /// Semester.
    #[validate(range(min = 1, max = 8))]
    pub semester: u8,
    /// Academic year label.
    #[validate(length(min = 1, max = 20))]
    pub academic_year: String,
    /// Students whose results are published.
    #[validate(length(min = 1))]
    pub student_ids: Vec<StudentId>,
    /// Who is publishing.
    #[validate(length(min = 1, max = 100))]
    pub published_by: Option<String>,
}

/// Publish one term's results. Already-published students are skipped.
pub async fn publish_results(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;
    let published = state
        .store
        .publications()
        .publish(
            &request.student_ids,
            request.semester,
            &request.academic_year,
            &request.department,
            request.published_by.as_deref(),
        )
        .await?;

    Ok(Json(serde_json::json!({
        "requested": request.student_ids.len(),
        "published": published,
        "message": format!("{published} result(s) published"),
    })))
}

/// Every published result of a student with its semester summary.
pub async fn published_results(
    State(state): State<Arc<AppState>>,
    Path(student_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = StudentId::from(parse_uuid(&student_str)?);
    let results = state
        .store
        .publications()
        .published_for_student(student_id)
        .await?;

    Ok(Json(serde_json::json!({
        "student_id": student_id,
        "count": results.len(),
        "results": results,
    })))
}

/// Mark a published result as viewed by the student.
pub async fn mark_viewed(
    State(state): State<Arc<AppState>>,
    Path(student_str): Path<String>,
    Query(params): Query<TermQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = StudentId::from(parse_uuid(&student_str)?);
    let updated = state
        .store
        .publications()
        .mark_viewed(student_id, params.semester, &params.academic_year)
        .await?;
    if !updated {
        return Err(ApiError::NotFound(String::from("published result not found")));
    }

    Ok(Json(serde_json::json!({
        "student_id": student_id,
        "semester": params.semester,
        "academic_year": params.academic_year,
        "is_viewed": true,
    })))
}
