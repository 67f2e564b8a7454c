//! Scoring primitives shared by every derivation stage.
//!
//! All scores are reported on a 0-100 integer scale regardless of what an
//! upstream model emits (some emit 0-1 floats). Conversion happens here and
//! only here, so every deriver classifies identical inputs identically.

use crate::models::{RiskLevel, Severity};

/// Normalize a score from model output to the canonical 0-100 integer scale.
///
/// Values in `(0.0, 1.0]` are treated as fractions; anything else is clamped
/// to `[0, 100]` and rounded. `1.0` is ambiguous between the two scales and
/// reads as the fraction (100), matching how upstream models use it.
pub fn normalize_score(raw: f64) -> u8 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    let scaled = if raw <= 1.0 { raw * 100.0 } else { raw };
    scaled.round().min(100.0) as u8
}

/// Round a mean expressed as f64 onto the 0-100 scale.
pub fn round_score(mean: f64) -> u8 {
    if !mean.is_finite() || mean <= 0.0 {
        return 0;
    }
    mean.round().min(100.0) as u8
}

/// Classify alert severity from an (impact, confidence) pair.
///
/// Evaluated in priority order: the critical conjunction first, then the
/// high disjunction, then moderate.
pub fn severity_for(impact: u8, confidence: u8) -> Severity {
    if impact >= 85 && confidence >= 75 {
        Severity::Critical
    } else if impact >= 75 || confidence >= 70 {
        Severity::High
    } else {
        Severity::Moderate
    }
}

/// Classify recommendation risk from an (impact, confidence) pair.
///
/// The low branch mirrors the qualification floor applied by the
/// recommendation deriver, which filters such signals out one step earlier;
/// it is reachable only when this classifier is called standalone.
pub fn risk_level_for(impact: u8, confidence: u8) -> RiskLevel {
    if impact >= 80 && confidence >= 70 {
        RiskLevel::High
    } else if impact < 60 || confidence < 50 {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fractions_and_integers() {
        assert_eq!(normalize_score(0.85), 85);
        assert_eq!(normalize_score(85.0), 85);
        assert_eq!(normalize_score(0.854), 85);
        assert_eq!(normalize_score(1.0), 100);
        assert_eq!(normalize_score(100.0), 100);
    }

    #[test]
    fn test_normalize_clamps_out_of_range() {
        assert_eq!(normalize_score(-3.0), 0);
        assert_eq!(normalize_score(250.0), 100);
        assert_eq!(normalize_score(f64::NAN), 0);
    }

    #[test]
    fn test_fraction_and_integer_scales_agree() {
        // Identical severities whether the source emitted 0-1 or 0-100.
        for (frac, int) in [(0.9, 90.0), (0.75, 75.0), (0.6, 60.0)] {
            assert_eq!(
                severity_for(normalize_score(frac), normalize_score(0.8)),
                severity_for(normalize_score(int), normalize_score(80.0)),
            );
        }
    }

    #[test]
    fn test_severity_priority_order() {
        assert_eq!(severity_for(85, 75), Severity::Critical);
        assert_eq!(severity_for(90, 74), Severity::High); // misses conjunction
        assert_eq!(severity_for(75, 0), Severity::High);
        assert_eq!(severity_for(0, 70), Severity::High);
        assert_eq!(severity_for(74, 69), Severity::Moderate);
    }

    #[test]
    fn test_severity_monotonic_in_impact() {
        // Raising impact while holding confidence fixed never lowers severity.
        for confidence in [0u8, 50, 69, 70, 75, 100] {
            let mut prev = severity_for(0, confidence);
            for impact in 1..=100u8 {
                let current = severity_for(impact, confidence);
                assert!(current >= prev);
                prev = current;
            }
        }
    }

    #[test]
    fn test_risk_level_branches() {
        assert_eq!(risk_level_for(80, 70), RiskLevel::High);
        assert_eq!(risk_level_for(79, 90), RiskLevel::Medium);
        assert_eq!(risk_level_for(65, 55), RiskLevel::Medium);
        assert_eq!(risk_level_for(59, 90), RiskLevel::Low);
        assert_eq!(risk_level_for(90, 49), RiskLevel::Low);
    }
}
