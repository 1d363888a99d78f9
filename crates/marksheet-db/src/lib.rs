//! `PostgreSQL` data layer for the Marksheet records backend.
//!
//! Reference data (students, subjects, exam events) and raw component marks
//! are written by the HTTP layer. Subject and semester results are written
//! only by the grading resolvers, through [`PgStore`]'s
//! [`RecordStore`](marksheet_grading::RecordStore) implementation.
//!
//! # Layout
//!
//! ```text
//! PostgresPool --store()--> PgStore
//!                             |-- StudentStore    (students)
//!                             |-- SubjectStore    (subjects + components)
//!                             |-- ExamEventStore  (exam events)
//!                             |-- MarksStore      (component marks, bulk upsert)
//!                             |-- ResultStore     (subject + semester results)
//!                             +-- PublishStore    (student portal publication)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration and migrations
//! - [`pg_store`] -- owned handle implementing the grading seam
//! - [`codec`] -- column encodings for enums and counters
//! - [`error`] -- shared error type

pub mod codec;
pub mod error;
pub mod exam_event_store;
pub mod marks_store;
pub mod pg_store;
pub mod postgres;
pub mod publish_store;
pub mod result_store;
pub mod student_store;
pub mod subject_store;

pub use error::DbError;
pub use exam_event_store::{ExamEventRow, ExamEventStore, NewExamEvent};
pub use marks_store::{MarkEntry, MarkRow, MarksStore, UpsertCounts};
pub use pg_store::PgStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use publish_store::{PublishStore, PublishedResultView};
pub use result_store::{
    ResultStore, SemesterResultListing, SemesterResultRow, SubjectResultListing, SubjectResultRow,
};
pub use student_store::{NewStudent, StudentRow, StudentStore};
pub use subject_store::{
    ComponentRow, NewComponent, NewSubject, SubjectFilter, SubjectRow, SubjectStore,
};
