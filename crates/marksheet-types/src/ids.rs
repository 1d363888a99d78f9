//! Identifier newtypes for every academic record.
//!
//! A `StudentId` cannot be handed to a function expecting a `SubjectId`.
//! Values are UUID v7, so rows sort by creation time in the indexes.
//!
//! The database assigns IDs on insert; `new()` is for tests and fixtures.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Declares one ID newtype over [`Uuid`].
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// A fresh time-ordered ID.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The wrapped [`Uuid`].
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, out: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, out)
            }
        }

        impl From<Uuid> for $name {
            fn from(raw: Uuid) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for Uuid {
            fn from(typed: $name) -> Self {
                typed.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an enrolled student.
    StudentId
}

define_id! {
    /// Unique identifier for a subject offered in an academic year.
    SubjectId
}

define_id! {
    /// Unique identifier for one marks component (IA, ESE, ...) of a subject.
    SubjectComponentId
}

define_id! {
    /// Unique identifier for an exam event (a sitting that produces marks).
    ExamEventId
}

define_id! {
    /// Unique identifier for a single component mark row.
    ComponentMarkId
}

define_id! {
    /// Unique identifier for a persisted subject result.
    SubjectResultId
}

define_id! {
    /// Unique identifier for a persisted semester result.
    SemesterResultId
}

define_id! {
    /// Unique identifier for a result publication record.
    PublicationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_version_7_and_ordered() {
        let first = StudentId::new();
        let second = StudentId::new();
        assert_eq!(first.into_inner().get_version_num(), 7);
        assert!(first <= second);
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = StudentId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{}\"", id.into_inner())));
    }

    #[test]
    fn uuid_conversions_round_trip() {
        let raw = Uuid::now_v7();
        let subject = SubjectId::from(raw);
        assert_eq!(Uuid::from(subject), raw);
        assert_eq!(subject.to_string(), raw.to_string());
    }
}
