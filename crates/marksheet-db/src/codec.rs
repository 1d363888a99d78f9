//! Conversions between domain values and their column representations.
//!
//! Closed enums are stored as their canonical `TEXT` codes; small counters
//! use `SMALLINT`/`INTEGER`. Reads validate, writes saturate.

use core::str::FromStr;

use marksheet_types::UnknownCode;

use crate::error::DbError;

/// Parse a `TEXT` code column into its enum.
pub fn parse_code<T>(entity: &'static str, raw: &str) -> Result<T, DbError>
where
    T: FromStr<Err = UnknownCode>,
{
    raw.parse().map_err(|e: UnknownCode| DbError::decode(entity, e))
}

/// Read a `SMALLINT` semester column.
pub fn semester_from_db(entity: &'static str, raw: i16) -> Result<u8, DbError> {
    u8::try_from(raw).map_err(|e| DbError::decode(entity, format!("semester {raw}: {e}")))
}

/// Read a non-negative `INTEGER` column.
pub fn count_from_db(entity: &'static str, raw: i32) -> Result<u32, DbError> {
    u32::try_from(raw).map_err(|e| DbError::decode(entity, format!("count {raw}: {e}")))
}

/// Write a semester number as `SMALLINT`.
pub fn semester_to_db(semester: u8) -> i16 {
    i16::from(semester)
}

/// Write a counter as `INTEGER`, saturating at `i32::MAX`.
pub fn count_to_db(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Qualify every column in a column list with a table alias.
pub fn qualified(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use marksheet_types::{ComponentType, Grade};

    use super::*;

    #[test]
    fn codes_parse_and_reject() {
        assert_eq!(
            parse_code::<ComponentType>("component_marks", "ESE").ok(),
            Some(ComponentType::EndSemesterExam)
        );
        assert_eq!(parse_code::<Grade>("subject_results", "B+").ok(), Some(Grade::BPlus));
        assert!(matches!(
            parse_code::<Grade>("subject_results", "E"),
            Err(DbError::Decode { entity: "subject_results", .. })
        ));
    }

    #[test]
    fn negative_counts_are_corrupt() {
        assert!(count_from_db("semester_results", -1).is_err());
        assert_eq!(count_from_db("semester_results", 7).ok(), Some(7));
        assert!(semester_from_db("subjects", -3).is_err());
    }

    #[test]
    fn writes_saturate() {
        assert_eq!(count_to_db(u32::MAX), i32::MAX);
        assert_eq!(semester_to_db(8), 8);
    }

    #[test]
    fn qualified_prefixes_every_column() {
        assert_eq!(
            qualified("id, student_id,\n     semester", "r"),
            "r.id, r.student_id, r.semester"
        );
    }
}
