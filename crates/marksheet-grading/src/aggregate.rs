//! Component mark aggregation for one student in one subject.
//!
//! Absent rows contribute zero marks but their maximum marks still count
//! toward the denominator, so an absence pulls the percentage down.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use marksheet_types::{ComponentMark, ComponentMarkId, ComponentType};

use crate::grade::percentage_of;
use crate::{GradingError, GradingPolicy};

/// Pass/fail outcome of a single component mark row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOutcome {
    /// The mark row this outcome is for.
    pub mark_id: ComponentMarkId,
    /// Component category of the row.
    pub component_type: ComponentType,
    /// Marks counted for the row (zero when absent).
    pub marks: Decimal,
    /// Maximum marks of the row.
    pub max_marks: Decimal,
    /// Row percentage, unrounded. Zero when `max_marks` is zero.
    pub percentage: Decimal,
    /// Percentage needed to pass the row.
    pub threshold: Decimal,
    /// `percentage >= threshold`.
    pub passed: bool,
}

/// Totals for one student's marks in one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarksAggregate {
    /// Per-category subtotal of marks obtained.
    pub subtotals: BTreeMap<ComponentType, Decimal>,
    /// Sum of all subtotals.
    pub total_marks: Decimal,
    /// Sum of every row's maximum marks.
    pub max_marks: Decimal,
    /// `total_marks / max_marks * 100` rounded to two places, zero when
    /// `max_marks` is zero.
    pub percentage: Decimal,
    /// One outcome per input row, in input order.
    pub components: Vec<ComponentOutcome>,
}

impl MarksAggregate {
    /// Subtotal for one component category (zero if it had no rows).
    pub fn subtotal(&self, component_type: ComponentType) -> Decimal {
        self.subtotals
            .get(&component_type)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether every row met its pass threshold.
    pub fn all_components_pass(&self) -> bool {
        self.components.iter().all(|c| c.passed)
    }
}

/// Aggregate the mark rows of one (student, subject) pair.
///
/// Returns [`GradingError::NoData`] when `marks` is empty; an empty input is
/// never reported as a zero percentage.
pub fn aggregate(
    marks: &[ComponentMark],
    policy: &GradingPolicy,
) -> Result<MarksAggregate, GradingError> {
    if marks.is_empty() {
        return Err(GradingError::NoData("component marks"));
    }

    let mut subtotals: BTreeMap<ComponentType, Decimal> = BTreeMap::new();
    let mut total_marks = Decimal::ZERO;
    let mut max_marks = Decimal::ZERO;
    let mut components = Vec::with_capacity(marks.len());

    for row in marks {
        let obtained = if row.is_absent {
            Decimal::ZERO
        } else {
            row.marks_obtained
        };

        let subtotal = subtotals.entry(row.component_type).or_insert(Decimal::ZERO);
        *subtotal = subtotal
            .checked_add(obtained)
            .ok_or(GradingError::ArithmeticOverflow)?;
        total_marks = total_marks
            .checked_add(obtained)
            .ok_or(GradingError::ArithmeticOverflow)?;
        max_marks = max_marks
            .checked_add(row.max_marks)
            .ok_or(GradingError::ArithmeticOverflow)?;

        components.push(outcome(row, obtained, policy)?);
    }

    let percentage = percentage_of(total_marks, max_marks)?.round_dp(2);

    Ok(MarksAggregate {
        subtotals,
        total_marks,
        max_marks,
        percentage,
        components,
    })
}

fn outcome(
    row: &ComponentMark,
    obtained: Decimal,
    policy: &GradingPolicy,
) -> Result<ComponentOutcome, GradingError> {
    let threshold = if row.max_marks.is_zero() {
        policy.default_component_pass_percentage
    } else {
        percentage_of(row.passing_marks, row.max_marks)?
    };
    let percentage = percentage_of(obtained, row.max_marks)?;

    Ok(ComponentOutcome {
        mark_id: row.id,
        component_type: row.component_type,
        marks: obtained,
        max_marks: row.max_marks,
        percentage,
        threshold,
        passed: percentage >= threshold,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use marksheet_types::{ExamEventId, StudentId, SubjectComponentId, SubjectId};
    use rust_decimal_macros::dec;

    use super::*;

    fn row(
        component_type: ComponentType,
        obtained: Decimal,
        max: Decimal,
        passing: Decimal,
    ) -> ComponentMark {
        ComponentMark {
            id: ComponentMarkId::new(),
            student_id: StudentId::new(),
            subject_id: SubjectId::new(),
            component_id: SubjectComponentId::new(),
            component_type,
            exam_event_id: ExamEventId::new(),
            marks_obtained: obtained,
            max_marks: max,
            passing_marks: passing,
            is_absent: false,
            entered_by: None,
            remarks: None,
            entered_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_is_no_data() {
        let result = aggregate(&[], &GradingPolicy::default());
        assert!(matches!(result, Err(GradingError::NoData(_))));
    }

    #[test]
    fn ia_and_ese_sum_to_seventy_five_percent() {
        let marks = [
            row(ComponentType::InternalAssessment, dec!(20), dec!(20), dec!(8)),
            row(ComponentType::EndSemesterExam, dec!(55), dec!(80), dec!(32)),
        ];
        let agg = aggregate(&marks, &GradingPolicy::default()).unwrap();

        assert_eq!(agg.total_marks, dec!(75));
        assert_eq!(agg.max_marks, dec!(100));
        assert_eq!(agg.percentage, dec!(75));
        assert_eq!(agg.subtotal(ComponentType::InternalAssessment), dec!(20));
        assert_eq!(agg.subtotal(ComponentType::EndSemesterExam), dec!(55));
        assert_eq!(agg.subtotal(ComponentType::Oral), Decimal::ZERO);
        assert!(agg.all_components_pass());
        assert_eq!(
            agg.components.iter().map(|c| c.percentage).collect::<Vec<_>>(),
            vec![dec!(100), dec!(68.75)]
        );
    }

    #[test]
    fn rows_of_the_same_type_are_summed() {
        let marks = [
            row(ComponentType::InternalAssessment, dec!(7), dec!(10), dec!(4)),
            row(ComponentType::InternalAssessment, dec!(9), dec!(10), dec!(4)),
        ];
        let agg = aggregate(&marks, &GradingPolicy::default()).unwrap();
        assert_eq!(agg.subtotal(ComponentType::InternalAssessment), dec!(16));
        assert_eq!(agg.percentage, dec!(80));
    }

    #[test]
    fn absent_rows_count_toward_max_marks_only() {
        let mut absent = row(ComponentType::Oral, dec!(18), dec!(25), dec!(10));
        absent.is_absent = true;
        let marks = [
            row(ComponentType::EndSemesterExam, dec!(60), dec!(75), dec!(30)),
            absent,
        ];
        let agg = aggregate(&marks, &GradingPolicy::default()).unwrap();

        assert_eq!(agg.total_marks, dec!(60));
        assert_eq!(agg.max_marks, dec!(100));
        assert_eq!(agg.percentage, dec!(60));
        assert_eq!(agg.subtotal(ComponentType::Oral), Decimal::ZERO);
        assert!(!agg.all_components_pass());
    }

    #[test]
    fn zero_max_row_resolves_to_zero_with_default_threshold() {
        let marks = [row(ComponentType::TermWork, dec!(0), dec!(0), dec!(0))];
        let agg = aggregate(&marks, &GradingPolicy::default()).unwrap();

        assert_eq!(agg.percentage, Decimal::ZERO);
        let only = agg.components.first().unwrap();
        assert_eq!(only.percentage, Decimal::ZERO);
        assert_eq!(only.threshold, dec!(40));
        assert!(!only.passed);
    }

    #[test]
    fn component_below_its_pass_mark_fails_even_with_high_total() {
        let marks = [
            row(ComponentType::InternalAssessment, dec!(5), dec!(20), dec!(8)),
            row(ComponentType::EndSemesterExam, dec!(78), dec!(80), dec!(32)),
        ];
        let agg = aggregate(&marks, &GradingPolicy::default()).unwrap();
        assert_eq!(agg.percentage, dec!(83));
        assert!(!agg.all_components_pass());
    }

    #[test]
    fn percentage_is_rounded_to_two_places() {
        let marks = [row(ComponentType::Practical, dec!(20), dec!(30), dec!(12))];
        let agg = aggregate(&marks, &GradingPolicy::default()).unwrap();
        assert_eq!(agg.percentage, dec!(66.67));
    }
}
