//! Enumeration types for the academic records backend.
//!
//! Every categorical field that crosses a layer boundary (component type,
//! grade letter, result status, exam lifecycle, student attributes) is a
//! closed enum here. Each enum carries a canonical string code used for
//! JSON and for the `TEXT` columns in `PostgreSQL`, so no consumer ever
//! compares raw strings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A string did not match any known code for the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code: {value:?}")]
pub struct UnknownCode {
    /// The enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Implements `as_str`, `ALL`, [`Display`](core::fmt::Display) and
/// [`FromStr`](core::str::FromStr) from a single variant-to-code table.
macro_rules! impl_codes {
    ($name:ident, $kind:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical string code for this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    other => Err(UnknownCode {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Marks components
// ---------------------------------------------------------------------------

/// A category of assessment contributing to a subject's total marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ComponentType {
    /// Internal Assessment (class tests during the term).
    #[serde(rename = "IA")]
    InternalAssessment,
    /// End-Semester Exam.
    #[serde(rename = "ESE")]
    EndSemesterExam,
    /// Oral examination (viva).
    #[serde(rename = "OR")]
    Oral,
    /// Practical examination.
    #[serde(rename = "PR")]
    Practical,
    /// Term work (assignments and journals).
    #[serde(rename = "TW")]
    TermWork,
}

impl_codes!(ComponentType, "component type", {
    InternalAssessment => "IA",
    EndSemesterExam => "ESE",
    Oral => "OR",
    Practical => "PR",
    TermWork => "TW",
});

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// Letter grade on the ten-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Grade {
    /// 80% and above.
    #[serde(rename = "A+")]
    APlus,
    /// 70% to below 80%.
    #[serde(rename = "A")]
    A,
    /// 60% to below 70%.
    #[serde(rename = "B+")]
    BPlus,
    /// 55% to below 60%.
    #[serde(rename = "B")]
    B,
    /// 50% to below 55%.
    #[serde(rename = "C")]
    C,
    /// 40% to below 50%.
    #[serde(rename = "D")]
    D,
    /// Below 40%.
    #[serde(rename = "F")]
    F,
}

impl_codes!(Grade, "grade", {
    APlus => "A+",
    A => "A",
    BPlus => "B+",
    B => "B",
    C => "C",
    D => "D",
    F => "F",
});

/// Overall outcome of a semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResultStatus {
    /// Every subject in the semester was passed.
    #[serde(rename = "PASS")]
    Pass,
    /// At least one subject was failed.
    #[serde(rename = "FAIL")]
    Fail,
}

impl_codes!(ResultStatus, "result status", {
    Pass => "PASS",
    Fail => "FAIL",
});

/// Result classification derived from CGPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResultClass {
    /// CGPA 7.5 and above.
    #[serde(rename = "First Class with Distinction")]
    FirstClassWithDistinction,
    /// CGPA 6.0 to below 7.5.
    #[serde(rename = "First Class")]
    FirstClass,
    /// CGPA 5.0 to below 6.0.
    #[serde(rename = "Second Class")]
    SecondClass,
    /// CGPA 4.0 to below 5.0.
    #[serde(rename = "Pass Class")]
    PassClass,
    /// CGPA below 4.0.
    #[serde(rename = "Fail")]
    Fail,
}

impl_codes!(ResultClass, "result class", {
    FirstClassWithDistinction => "First Class with Distinction",
    FirstClass => "First Class",
    SecondClass => "Second Class",
    PassClass => "Pass Class",
    Fail => "Fail",
});

// ---------------------------------------------------------------------------
// Exam events
// ---------------------------------------------------------------------------

/// The kind of examination an exam event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    /// Mid-term examination.
    MidTerm,
    /// End-term examination.
    EndTerm,
    /// Internal assessment.
    Internal,
    /// Practical examination.
    Practical,
    /// Viva voce.
    Viva,
    /// Project evaluation.
    Project,
}

impl_codes!(ExamType, "exam type", {
    MidTerm => "mid_term",
    EndTerm => "end_term",
    Internal => "internal",
    Practical => "practical",
    Viva => "viva",
    Project => "project",
});

/// Lifecycle state of an exam event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    /// Being prepared; not visible to students.
    Draft,
    /// Dates fixed.
    Scheduled,
    /// Sittings in progress.
    Ongoing,
    /// All sittings finished.
    Completed,
    /// Called off.
    Cancelled,
}

impl_codes!(ExamStatus, "exam status", {
    Draft => "draft",
    Scheduled => "scheduled",
    Ongoing => "ongoing",
    Completed => "completed",
    Cancelled => "cancelled",
});

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// Gender recorded on the student profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other or undisclosed.
    Other,
}

impl_codes!(Gender, "gender", {
    Male => "male",
    Female => "female",
    Other => "other",
});

/// Where a student stands in their programme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AcademicStatus {
    /// Currently studying.
    Active,
    /// Moved up to the next year.
    Promoted,
    /// Held back in the current year.
    Detained,
    /// Completed the programme.
    Graduated,
    /// Left the programme.
    Dropout,
}

impl_codes!(AcademicStatus, "academic status", {
    Active => "active",
    Promoted => "promoted",
    Detained => "detained",
    Graduated => "graduated",
    Dropout => "dropout",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_codes_match_serde_names() {
        for component in ComponentType::ALL {
            let json = serde_json::to_string(component).ok();
            assert_eq!(json, Some(format!("\"{}\"", component.as_str())));
        }
    }

    #[test]
    fn grade_codes_parse_back() {
        for grade in Grade::ALL {
            assert_eq!(grade.as_str().parse::<Grade>().ok(), Some(*grade));
        }
    }

    #[test]
    fn result_class_uses_display_names() {
        assert_eq!(
            ResultClass::FirstClassWithDistinction.to_string(),
            "First Class with Distinction"
        );
        let json = serde_json::to_string(&ResultClass::PassClass).ok();
        assert_eq!(json.as_deref(), Some("\"Pass Class\""));
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = "TH".parse::<ComponentType>();
        assert_eq!(
            err,
            Err(UnknownCode {
                kind: "component type",
                value: String::from("TH"),
            })
        );
    }

    #[test]
    fn snake_case_enums_round_trip() {
        for status in ExamStatus::ALL {
            let json = serde_json::to_string(status).ok();
            assert_eq!(json, Some(format!("\"{status}\"")));
        }
        assert_eq!("dropout".parse::<AcademicStatus>().ok(), Some(AcademicStatus::Dropout));
        assert_eq!("female".parse::<Gender>().ok(), Some(Gender::Female));
    }
}
