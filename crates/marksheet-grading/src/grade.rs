//! The grade table and the other pure GPA formulas.
//!
//! Everything here is side-effect-free [`Decimal`] arithmetic. Division and
//! multiplication are checked and surface [`GradingError::ArithmeticOverflow`]
//! instead of panicking.

use rust_decimal::Decimal;

use marksheet_types::{Grade, ResultClass};

use crate::GradingError;

/// Lower bounds (inclusive) of every passing band, highest first.
const GRADE_BANDS: [(i64, Grade); 6] = [
    (80, Grade::APlus),
    (70, Grade::A),
    (60, Grade::BPlus),
    (55, Grade::B),
    (50, Grade::C),
    (40, Grade::D),
];

/// Map a percentage to its letter grade and grade points.
///
/// Bands are inclusive on the lower bound, so exactly 80 is `A+`. Anything
/// below 40, including negative input, is `F` with zero points.
pub fn grade_for(percentage: Decimal) -> (Grade, Decimal) {
    let grade = GRADE_BANDS
        .iter()
        .find(|(floor, _)| percentage >= Decimal::from(*floor))
        .map_or(Grade::F, |(_, grade)| *grade);
    (grade, grade_points(grade))
}

/// Grade points on the ten-point scale for a letter grade.
pub fn grade_points(grade: Grade) -> Decimal {
    match grade {
        Grade::APlus => Decimal::new(100, 1),
        Grade::A => Decimal::new(90, 1),
        Grade::BPlus => Decimal::new(80, 1),
        Grade::B => Decimal::new(70, 1),
        Grade::C => Decimal::new(60, 1),
        Grade::D => Decimal::new(50, 1),
        Grade::F => Decimal::new(0, 1),
    }
}

/// Classify a CGPA into a result class.
pub fn classify(cgpa: Decimal) -> ResultClass {
    if cgpa >= Decimal::new(75, 1) {
        ResultClass::FirstClassWithDistinction
    } else if cgpa >= Decimal::new(60, 1) {
        ResultClass::FirstClass
    } else if cgpa >= Decimal::new(50, 1) {
        ResultClass::SecondClass
    } else if cgpa >= Decimal::new(40, 1) {
        ResultClass::PassClass
    } else {
        ResultClass::Fail
    }
}

/// Round to two decimal places (banker's rounding).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// `part / whole * 100`, unrounded, or zero when `whole` is zero.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Result<Decimal, GradingError> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(GradingError::ArithmeticOverflow)
}

/// Semester grade point average: `credit_points / credits_attempted`,
/// rounded to two places, or zero when no credits were attempted.
pub fn sgpa(credit_points: Decimal, credits_attempted: u32) -> Result<Decimal, GradingError> {
    if credits_attempted == 0 {
        return Ok(Decimal::ZERO);
    }
    credit_points
        .checked_div(Decimal::from(credits_attempted))
        .map(round2)
        .ok_or(GradingError::ArithmeticOverflow)
}

/// Credit-weighted mean of per-semester SGPAs.
///
/// Each item is `(sgpa, credits_attempted)` for one semester. Returns zero
/// when the total credit count is zero.
pub fn cumulative_gpa<I>(semesters: I) -> Result<Decimal, GradingError>
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    let mut weighted = Decimal::ZERO;
    let mut credits: u32 = 0;
    for (gpa, attempted) in semesters {
        let points = gpa
            .checked_mul(Decimal::from(attempted))
            .ok_or(GradingError::ArithmeticOverflow)?;
        weighted = weighted
            .checked_add(points)
            .ok_or(GradingError::ArithmeticOverflow)?;
        credits = credits
            .checked_add(attempted)
            .ok_or(GradingError::ArithmeticOverflow)?;
    }
    sgpa(weighted, credits)
}
