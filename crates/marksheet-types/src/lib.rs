//! Shared type definitions for the Marksheet academic records backend.
//!
//! This crate is the single source of truth for the records exchanged
//! between the grading engine, the data layer, and the HTTP API. Types
//! defined here flow downstream to `TypeScript` via `ts-rs` for the
//! results dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Closed enumerations (component types, grades, statuses)
//! - [`structs`] -- Entity structs (students, subjects, marks, results)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AcademicStatus, ComponentType, ExamStatus, ExamType, Gender, Grade, ResultClass, ResultStatus,
    UnknownCode,
};
pub use ids::{
    ComponentMarkId, ExamEventId, PublicationId, SemesterResultId, StudentId, SubjectComponentId,
    SubjectId, SubjectResultId,
};
pub use structs::{
    ComponentMark, ExamEvent, PublishedResult, SemesterResult, Student, Subject, SubjectComponent,
    SubjectResult,
};
