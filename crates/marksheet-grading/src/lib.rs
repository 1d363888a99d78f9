//! Result aggregation engine for the Marksheet academic records backend.
//!
//! Turns raw component marks into graded subject results, and subject
//! results into semester results with SGPA, CGPA and a result class.
//!
//! # Pipeline
//!
//! ```text
//! ComponentMark rows
//!     |
//!     +-- aggregate()                 subtotals, percentage, per-row pass
//!     |
//!     +-- resolve_subject_result()    grade, pass rule, credits --> upsert
//!     |
//!     +-- resolve_semester_result()   SGPA, CGPA, class          --> upsert
//! ```
//!
//! # Modules
//!
//! - [`grade`] -- Grade table, result classes, GPA formulas.
//! - [`aggregate`] -- Component mark aggregation.
//! - [`resolver`] -- Subject and semester result resolvers.
//! - [`batch`] -- Per-student isolated batch recalculation.
//! - [`policy`] -- Configurable pass rule and CGPA mode.
//! - [`store`] -- The [`RecordStore`] persistence seam.
//!
//! All arithmetic uses [`Decimal`](rust_decimal::Decimal) with checked operations. The engine never
//! panics; it returns errors.
//!
//! # Usage
//!
//! ```
//! use marksheet_grading::grade_for;
//! use marksheet_types::Grade;
//! use rust_decimal::Decimal;
//!
//! let (grade, points) = grade_for(Decimal::new(75, 0));
//! assert_eq!(grade, Grade::A);
//! assert_eq!(points, Decimal::new(9, 0));
//! ```

pub mod aggregate;
pub mod batch;
pub mod grade;
pub mod policy;
pub mod resolver;
pub mod store;

#[cfg(test)]
mod memory;

// Re-export primary types at crate root.
pub use aggregate::{aggregate, ComponentOutcome, MarksAggregate};
pub use batch::{recalculate_batch, BatchReport, StudentFailure};
pub use grade::{classify, cumulative_gpa, grade_for, grade_points, sgpa};
pub use policy::{CgpaMode, GradingPolicy, PassRule};
pub use resolver::{resolve_semester_result, resolve_subject_result, FIRST_ATTEMPT, MAX_SEMESTER};
pub use store::{RecordStore, StoreError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while computing results.
#[derive(Debug, thiserror::Error)]
pub enum GradingError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity ("student", "subject").
        entity: &'static str,
        /// The ID that was looked up.
        id: String,
    },

    /// There is nothing to aggregate over.
    #[error("no {0} found")]
    NoData(&'static str),

    /// The request itself is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A checked decimal or counter operation overflowed.
    #[error("arithmetic overflow while computing results")]
    ArithmeticOverflow,

    /// The record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GradingError {
    /// Shorthand for [`GradingError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
