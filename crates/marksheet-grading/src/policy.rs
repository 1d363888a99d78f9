//! Institution-level grading rules.
//!
//! A [`GradingPolicy`] is loaded once from configuration at startup and
//! passed by reference into every resolver call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a subject's pass/fail is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassRule {
    /// Every component must meet its own pass mark and the overall
    /// percentage must meet the overall threshold.
    #[default]
    ComponentAndOverall,
    /// Only the overall percentage is checked.
    OverallOnly,
}

/// How the CGPA on a semester result is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CgpaMode {
    /// CGPA equals the SGPA of the semester being resolved.
    #[default]
    SemesterOnly,
    /// Credit-weighted mean over this semester and every earlier semester
    /// with a persisted result.
    Cumulative,
}

/// Grading rules applied by the resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingPolicy {
    /// Subject pass rule.
    #[serde(default)]
    pub pass_rule: PassRule,
    /// Minimum overall subject percentage to pass.
    #[serde(default = "default_pass_percentage")]
    pub overall_pass_percentage: Decimal,
    /// Component pass threshold used when a row's maximum marks is zero.
    #[serde(default = "default_pass_percentage")]
    pub default_component_pass_percentage: Decimal,
    /// CGPA computation mode.
    #[serde(default)]
    pub cgpa_mode: CgpaMode,
}

fn default_pass_percentage() -> Decimal {
    Decimal::from(40)
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            pass_rule: PassRule::default(),
            overall_pass_percentage: default_pass_percentage(),
            default_component_pass_percentage: default_pass_percentage(),
            cgpa_mode: CgpaMode::default(),
        }
    }
}

impl GradingPolicy {
    /// Decide a subject's pass flag from its component outcomes and overall
    /// percentage.
    pub fn subject_passes(&self, all_components_pass: bool, percentage: Decimal) -> bool {
        let overall = percentage >= self.overall_pass_percentage;
        match self.pass_rule {
            PassRule::ComponentAndOverall => all_components_pass && overall,
            PassRule::OverallOnly => overall,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn defaults_are_the_strict_rule_at_forty_percent() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.pass_rule, PassRule::ComponentAndOverall);
        assert_eq!(policy.overall_pass_percentage, dec!(40));
        assert_eq!(policy.default_component_pass_percentage, dec!(40));
        assert_eq!(policy.cgpa_mode, CgpaMode::SemesterOnly);
    }

    #[test]
    fn strict_rule_needs_both_gates() {
        let policy = GradingPolicy::default();
        assert!(policy.subject_passes(true, dec!(40)));
        assert!(!policy.subject_passes(false, dec!(90)));
        assert!(!policy.subject_passes(true, dec!(39.99)));
    }

    #[test]
    fn overall_only_ignores_components() {
        let policy = GradingPolicy {
            pass_rule: PassRule::OverallOnly,
            ..GradingPolicy::default()
        };
        assert!(policy.subject_passes(false, dec!(45)));
        assert!(!policy.subject_passes(true, dec!(30)));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let policy: GradingPolicy =
            serde_json::from_str(r#"{"cgpa_mode":"cumulative"}"#).unwrap_or_default();
        assert_eq!(policy.cgpa_mode, CgpaMode::Cumulative);
        assert_eq!(policy.pass_rule, PassRule::ComponentAndOverall);
        assert_eq!(policy.overall_pass_percentage, dec!(40));
    }
}
