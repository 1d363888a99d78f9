//! Axum router construction for the records API.
//!
//! Assembles every route into a single [`Router`] with CORS enabled for the
//! staff and student dashboards and request tracing on every call.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, marks, publish, results, sheet};

/// Build the complete Axum router.
///
/// Route groups:
/// - `/health` -- liveness
/// - `/api/students`, `/api/subjects`, `/api/exam-events` -- reference data
/// - `/api/marks/...` -- component mark entry
/// - `/api/results/...` -- calculation, queries, publication, result sheet
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Reference data
        .route(
            "/api/students",
            post(handlers::create_student).get(handlers::list_students),
        )
        .route("/api/students/{id}", get(handlers::get_student))
        .route(
            "/api/subjects",
            post(handlers::create_subject).get(handlers::list_subjects),
        )
        .route("/api/subjects/{id}", get(handlers::get_subject))
        .route(
            "/api/exam-events",
            post(handlers::create_exam_event).get(handlers::list_exam_events),
        )
        // Marks
        .route("/api/marks/component/bulk", post(marks::bulk_upsert_marks))
        .route("/api/marks/component/all", get(marks::list_component_marks))
        .route(
            "/api/marks/component/student/{student_id}/subject/{subject_id}",
            get(marks::student_subject_marks),
        )
        // Calculation
        .route(
            "/api/results/subject/calculate",
            post(results::calculate_subject),
        )
        .route(
            "/api/results/semester/calculate",
            post(results::calculate_semester),
        )
        .route(
            "/api/results/semester/calculate-batch",
            post(results::calculate_batch),
        )
        // Queries
        .route(
            "/api/results/subject/student/{student_id}",
            get(results::list_student_subject_results),
        )
        .route(
            "/api/results/subject/{student_id}/{subject_id}",
            get(results::get_subject_result),
        )
        .route("/api/results/semester", get(results::list_semester_results))
        .route(
            "/api/results/semester/{student_id}/{semester}",
            get(results::get_semester_result),
        )
        // Publication
        .route("/api/results/publish", post(publish::publish_results))
        .route(
            "/api/results/published/{student_id}",
            get(publish::published_results),
        )
        .route(
            "/api/results/published/{student_id}/viewed",
            put(publish::mark_viewed),
        )
        .route("/api/results/sheet/{student_id}", get(sheet::result_sheet))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
