//! Risk scoring.
//!
//! Turns impact counts into a single score in `[0, 10]`:
//!
//! ```text
//! base     = direct*100 + secondary*50 + tertiary*25 + circular*200
//! adjusted = base * change_type_multiplier
//! score    = 10 * log10(adjusted + 1) / log10(1001), clamped, one decimal
//! ```
//!
//! The log transform keeps small changes visible while large ones saturate
//! at 10 once `adjusted` reaches 1000.

use serde::{Deserialize, Serialize};

use crate::error::Degraded;
use crate::types::{ChangeType, ImpactLevel, ImpactedFile};

const DIRECT_WEIGHT: f64 = 100.0;
const SECONDARY_WEIGHT: f64 = 50.0;
const TERTIARY_WEIGHT: f64 = 25.0;
const CIRCULAR_WEIGHT: f64 = 200.0;

/// `adjusted` value at which the score saturates, plus one.
const SATURATION: f64 = 1001.0;

/// Highest possible score.
pub const MAX_SCORE: f64 = 10.0;

/// Impact counts feeding the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    /// CRITICAL files.
    pub direct: usize,
    /// HIGH files.
    pub secondary: usize,
    /// MEDIUM and LOW files.
    pub tertiary: usize,
    /// Recorded circular paths.
    pub circular: usize,
}

impl RiskFactors {
    /// Count impacted files by level.
    #[must_use]
    pub fn from_impacts(files: &[ImpactedFile], circular: usize) -> Self {
        let mut factors = Self {
            circular,
            ..Self::default()
        };
        for file in files {
            match file.impact_level {
                ImpactLevel::Critical => factors.direct += 1,
                ImpactLevel::High => factors.secondary += 1,
                ImpactLevel::Medium | ImpactLevel::Low => factors.tertiary += 1,
            }
        }
        factors
    }

    /// Total impacted files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.direct + self.secondary + self.tertiary
    }

    /// Weighted sum before the change-type multiplier.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // counts are far below 2^52
    pub fn base(&self) -> f64 {
        self.direct as f64 * DIRECT_WEIGHT
            + self.secondary as f64 * SECONDARY_WEIGHT
            + self.tertiary as f64 * TERTIARY_WEIGHT
            + self.circular as f64 * CIRCULAR_WEIGHT
    }
}

/// Score `factors` for a change of kind `change_type`.
///
/// Falls back to [`fallback_score`] if the computation produces a
/// non-finite value.
///
/// # Errors
///
/// [`Degraded`] carrying the file-count fallback score and the reason the
/// formula was abandoned.
pub fn calculate(factors: &RiskFactors, change_type: ChangeType) -> Result<f64, Degraded<f64>> {
    calculate_weighted(factors, change_type.risk_multiplier())
}

/// Score `factors` with an explicit multiplier.
///
/// # Errors
///
/// [`Degraded`] carrying the file-count fallback score when `multiplier`
/// is negative or not finite, or when the score itself is not finite.
pub fn calculate_weighted(factors: &RiskFactors, multiplier: f64) -> Result<f64, Degraded<f64>> {
    let fallback = || fallback_score(factors.file_count());

    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(Degraded::new(
            fallback(),
            format!("invalid change type multiplier: {multiplier}"),
        ));
    }

    let adjusted = factors.base() * multiplier;
    let score = MAX_SCORE * (adjusted + 1.0).log10() / SATURATION.log10();
    if !score.is_finite() {
        return Err(Degraded::new(
            fallback(),
            format!("non-finite score for adjusted impact {adjusted}"),
        ));
    }

    Ok(round_one_decimal(score.clamp(0.0, MAX_SCORE)))
}

/// Coarse score from the number of impacted files alone.
#[must_use]
pub fn fallback_score(file_count: usize) -> f64 {
    match file_count {
        50.. => 9.0,
        20.. => 7.0,
        10.. => 5.0,
        5.. => 3.0,
        1.. => 1.0,
        0 => 0.0,
    }
}

/// Risk tier of a score, used by the generic recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    /// Below 4.
    Low,
    /// 4 up to 7.
    Medium,
    /// 7 and above.
    High,
}

impl RiskTier {
    /// Classify a score.
    #[must_use]
    pub fn of(score: f64) -> Self {
        if score >= 7.0 {
            Self::High
        } else if score >= 4.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn factors(direct: usize, secondary: usize, tertiary: usize, circular: usize) -> RiskFactors {
        RiskFactors {
            direct,
            secondary,
            tertiary,
            circular,
        }
    }

    #[test]
    fn linear_chain_scores_seven_point_three() {
        let score = calculate(&factors(1, 1, 0, 0), ChangeType::Modify).unwrap();
        assert!((score - 7.3).abs() < f64::EPSILON);
    }

    #[test]
    fn nothing_impacted_scores_zero() {
        assert_eq!(calculate(&RiskFactors::default(), ChangeType::Delete), Ok(0.0));
    }

    #[test]
    fn large_impact_saturates() {
        assert_eq!(calculate(&factors(10, 0, 0, 0), ChangeType::Modify), Ok(10.0));
        assert_eq!(calculate(&factors(500, 500, 500, 50), ChangeType::Delete), Ok(10.0));
    }

    #[test]
    fn multiplier_orders_change_types() {
        let f = factors(1, 2, 3, 0);
        let delete = calculate(&f, ChangeType::Delete).unwrap();
        let refactor = calculate(&f, ChangeType::Refactor).unwrap();
        let modify = calculate(&f, ChangeType::Modify).unwrap();
        let feature = calculate(&f, ChangeType::AddFeature).unwrap();

        assert!(delete >= refactor);
        assert!(refactor >= modify);
        assert!(modify >= feature);
        assert!(delete > feature);
    }

    #[test]
    fn nan_multiplier_falls_back() {
        let result = calculate_weighted(&factors(3, 3, 0, 0), f64::NAN);
        let degraded = result.unwrap_err();
        assert!((degraded.value - 3.0).abs() < f64::EPSILON);
        assert!(degraded.reason.contains("multiplier"));
    }

    #[test]
    fn negative_multiplier_falls_back() {
        assert!(calculate_weighted(&factors(1, 0, 0, 0), -1.0).is_err());
    }

    #[rstest]
    #[case::none(0, 0.0)]
    #[case::one(1, 1.0)]
    #[case::five(5, 3.0)]
    #[case::ten(10, 5.0)]
    #[case::twenty(20, 7.0)]
    #[case::fifty(50, 9.0)]
    #[case::many(4000, 9.0)]
    fn fallback_buckets(#[case] files: usize, #[case] expected: f64) {
        assert!((fallback_score(files) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn factors_count_levels() {
        let make = |level: ImpactLevel, distance: u32| ImpactedFile {
            node_id: format!("f{distance}"),
            path: format!("f{distance}"),
            impact_level: level,
            distance,
            reason: String::new(),
            color: String::new(),
        };
        let files = vec![
            make(ImpactLevel::Critical, 1),
            make(ImpactLevel::High, 2),
            make(ImpactLevel::Medium, 3),
            make(ImpactLevel::Low, 4),
        ];

        let f = RiskFactors::from_impacts(&files, 2);
        assert_eq!(f, factors(1, 1, 2, 2));
        assert!((f.base() - 600.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case::low(3.9, RiskTier::Low)]
    #[case::medium(4.0, RiskTier::Medium)]
    #[case::high(7.0, RiskTier::High)]
    fn tiers(#[case] score: f64, #[case] expected: RiskTier) {
        assert_eq!(RiskTier::of(score), expected);
    }
}
