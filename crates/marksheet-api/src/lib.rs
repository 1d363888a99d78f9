//! HTTP API for the Marksheet academic records backend.
//!
//! A thin Axum layer over the grading engine and the `PostgreSQL` stores:
//!
//! - **Reference data**: students, subjects with components, exam events
//! - **Mark entry**: bulk upsert of one component's marks
//! - **Calculation**: subject and semester results, plus background batch
//!   recalculation
//! - **Queries and publication**: stored results, student portal
//!   publication, and the detailed result sheet
//!
//! Handlers validate input, call one engine or store operation, and map
//! errors through [`ApiError`]. No grading arithmetic lives here.

pub mod error;
pub mod handlers;
pub mod marks;
pub mod publish;
pub mod request;
pub mod results;
pub mod router;
pub mod server;
pub mod sheet;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
