//! Component mark entry endpoints.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/marks/component/bulk` | Upsert one component's marks for many students |
//! | `GET` | `/api/marks/component/student/{student_id}/subject/{subject_id}` | A student's marks in a subject |
//! | `GET` | `/api/marks/component/all` | All marks, by student department and semester |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use marksheet_db::MarkEntry;
use marksheet_types::{ExamEventId, StudentId, SubjectComponent, SubjectComponentId, SubjectId};

use crate::error::ApiError;
use crate::request::{non_negative, parse_uuid, validated};
use crate::state::AppState;

/// Marks of one student in a [`BulkMarksRequest`].
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct MarkEntryRequest {
    /// The student.
    pub student_id: StudentId,
    /// Marks scored. Ignored (stored as zero) when absent.
    #[validate(custom(function = "non_negative"))]
    pub marks_obtained: Decimal,
    /// Whether the student was absent.
    #[serde(default)]
    pub is_absent: bool,
    /// Examiner remarks.
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

/// Body of `POST /api/marks/component/bulk`.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkMarksRequest {
    /// Subject the component belongs to.
    pub subject_id: SubjectId,
    /// Component being marked.
    pub component_id: SubjectComponentId,
    /// Exam event the marks were scored in.
    pub exam_event_id: ExamEventId,
    /// Who is entering the marks.
    #[validate(length(min = 1, max = 100))]
    pub entered_by: Option<String>,
    /// One entry per student.
    #[validate(length(min = 1), nested)]
    pub entries: Vec<MarkEntryRequest>,
}

/// Query parameters for `GET /api/marks/component/all`.
#[derive(Debug, Deserialize, Validate)]
pub struct MarksQuery {
    /// Only marks of students in this department.
    #[validate(length(min = 1, max = 100))]
    pub department: Option<String>,
    /// Only marks of students currently in this semester.
    #[validate(range(min = 1, max = 8))]
    pub semester: Option<u8>,
}

/// Check the entries against the component they are entered for.
fn check_entries(
    component: &SubjectComponent,
    subject_id: SubjectId,
    entries: &[MarkEntryRequest],
) -> Result<(), ApiError> {
    if component.subject_id != subject_id {
        return Err(ApiError::InvalidInput(format!(
            "component {} does not belong to subject {subject_id}",
            component.id
        )));
    }
    if !component.is_enabled {
        return Err(ApiError::InvalidInput(format!(
            "component {} is disabled",
            component.id
        )));
    }
    if let Some(over) = entries
        .iter()
        .find(|e| !e.is_absent && e.marks_obtained > component.out_of_marks)
    {
        return Err(ApiError::InvalidInput(format!(
            "marks {} for student {} exceed maximum {}",
            over.marks_obtained, over.student_id, component.out_of_marks
        )));
    }
    Ok(())
}

/// Upsert one component's marks for many students in one transaction.
///
/// Responds with the number of rows created and updated.
pub async fn bulk_upsert_marks(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkMarksRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;

    let component = state
        .store
        .subjects()
        .component(request.component_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("component not found: {}", request.component_id))
        })?;
    check_entries(&component, request.subject_id, &request.entries)?;

    if state
        .store
        .exam_events()
        .get(request.exam_event_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!(
            "exam event not found: {}",
            request.exam_event_id
        )));
    }

    let entries: Vec<MarkEntry> = request
        .entries
        .into_iter()
        .map(|e| MarkEntry {
            student_id: e.student_id,
            marks_obtained: if e.is_absent {
                Decimal::ZERO
            } else {
                e.marks_obtained
            },
            is_absent: e.is_absent,
            remarks: e.remarks,
        })
        .collect();

    let counts = state
        .store
        .marks()
        .bulk_upsert(
            &component,
            request.exam_event_id,
            request.entered_by.as_deref(),
            &entries,
        )
        .await?;

    tracing::info!(
        component_id = %component.id,
        component_type = %component.component_type,
        created = counts.created,
        updated = counts.updated,
        "Component marks entered"
    );

    Ok(Json(serde_json::json!({
        "created": counts.created,
        "updated": counts.updated,
        "total": counts.total(),
    })))
}

/// Every component mark of a student in a subject.
pub async fn student_subject_marks(
    State(state): State<Arc<AppState>>,
    Path((student_str, subject_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = StudentId::from(parse_uuid(&student_str)?);
    let subject_id = SubjectId::from(parse_uuid(&subject_str)?);

    let marks = state
        .store
        .marks()
        .for_student_subject(student_id, subject_id)
        .await?;
    if marks.is_empty() {
        return Err(ApiError::NotFound(String::from("no component marks found")));
    }

    Ok(Json(serde_json::json!({
        "student_id": student_id,
        "subject_id": subject_id,
        "count": marks.len(),
        "marks": marks,
    })))
}

/// Every component mark, filtered by the student's department and current
/// semester when given.
pub async fn list_component_marks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MarksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = validated(params)?;
    let marks = state
        .store
        .marks()
        .list(params.department.as_deref(), params.semester)
        .await?;

    Ok(Json(serde_json::json!({
        "count": marks.len(),
        "marks": marks,
    })))
}
