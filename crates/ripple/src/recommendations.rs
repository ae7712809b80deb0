//! Rule-based advisories for a change.
//!
//! Rules are additive and evaluated in a fixed order, so the output reads
//! from the broadest concern (overall risk) to the most specific (the kind
//! of change):
//!
//! 1. Risk thresholds
//! 2. Volume of directly affected files
//! 3. Circular dependencies
//! 4. Sensitive areas, judged from impacted file paths
//! 5. Change type

use crate::error::Degraded;
use crate::risk::RiskTier;
use crate::types::{ChangeType, ImpactLevel, ImpactedFile};

/// Score at or above which a staged rollout is advised.
const ROLLOUT_THRESHOLD: f64 = 7.0;

/// Score at or above which integration tests are advised.
const TESTING_THRESHOLD: f64 = 5.0;

/// More CRITICAL files than this suggests splitting the change.
const SPLIT_THRESHOLD: usize = 10;

/// More impacted files than this suggests watching performance.
const LARGE_IMPACT_THRESHOLD: usize = 20;

/// Path keywords and the advisory they trigger.
const AREA_RULES: &[(&[&str], &str)] = &[
    (
        &["auth", "security", "login"],
        "Authentication or security code is affected: run the security test suite and request a security-focused review.",
    ),
    (
        &["database", "model", "repository"],
        "Data layer files are affected: verify schema compatibility and back up data before deploying.",
    ),
    (
        &["api", "controller", "endpoint"],
        "API surface is affected: check backward compatibility for clients and update the API documentation.",
    ),
    (
        &["config", "env", "setting"],
        "Configuration files are affected: verify settings in every environment before deploying.",
    ),
    (
        &["component", "view", "ui"],
        "UI components are affected: run visual regression tests and check the affected screens manually.",
    ),
];

/// Everything the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationContext<'a> {
    /// The changed file.
    pub target: &'a str,
    /// The kind of change.
    pub change_type: ChangeType,
    /// Risk score in `[0, 10]`.
    pub risk_score: f64,
    /// Impacted files.
    pub impacted_files: &'a [ImpactedFile],
    /// Circular paths found by the traversal.
    pub cycles: &'a [Vec<String>],
}

/// Produce advisories for `ctx`.
///
/// Never returns an empty list.
///
/// # Errors
///
/// [`Degraded`] holding the generic advice for the score's tier when the
/// score is not a finite number in `[0, 10]`.
pub fn generate(ctx: &RecommendationContext<'_>) -> Result<Vec<String>, Degraded<Vec<String>>> {
    if !ctx.risk_score.is_finite() || !(0.0..=10.0).contains(&ctx.risk_score) {
        return Err(Degraded::new(
            generic(RiskTier::of(ctx.risk_score)),
            format!("risk score out of range: {}", ctx.risk_score),
        ));
    }

    let mut out = Vec::new();
    risk_rules(ctx, &mut out);
    volume_rules(ctx, &mut out);
    cycle_rules(ctx, &mut out);
    area_rules(ctx, &mut out);
    change_type_rules(ctx, &mut out);

    if out.is_empty() {
        out.push("Low impact change: a standard code review should be sufficient.".to_string());
    }
    Ok(out)
}

/// Generic advice keyed only by risk tier.
#[must_use]
pub fn generic(tier: RiskTier) -> Vec<String> {
    let lines: &[&str] = match tier {
        RiskTier::Low => &["Low risk change: a standard code review should be sufficient."],
        RiskTier::Medium => &[
            "Moderate risk change: review dependent files before merging.",
            "Run the full test suite before deploying.",
        ],
        RiskTier::High => &[
            "High risk change: review all dependent files carefully.",
            "Add tests covering the affected code paths before making the change.",
            "Consider deploying behind a feature flag.",
        ],
    };
    lines.iter().map(ToString::to_string).collect()
}

fn risk_rules(ctx: &RecommendationContext<'_>, out: &mut Vec<String>) {
    if ctx.risk_score >= ROLLOUT_THRESHOLD {
        out.push(format!(
            "High risk ({:.1}/10): roll this change out in phases or behind a feature flag.",
            ctx.risk_score
        ));
    }
    if ctx.risk_score >= TESTING_THRESHOLD {
        out.push(
            "Write integration tests covering the affected dependents before making the change."
                .to_string(),
        );
    }
}

fn volume_rules(ctx: &RecommendationContext<'_>, out: &mut Vec<String>) {
    let critical = ctx
        .impacted_files
        .iter()
        .filter(|f| f.impact_level == ImpactLevel::Critical)
        .count();

    if critical > SPLIT_THRESHOLD {
        out.push(format!(
            "{critical} files import {} directly: consider splitting this change into smaller steps.",
            ctx.target
        ));
    }
    if critical > 0 {
        let noun = if critical == 1 { "file" } else { "files" };
        out.push(format!(
            "{critical} {noun} directly depend on {} and will need review.",
            ctx.target
        ));
    }
}

fn cycle_rules(ctx: &RecommendationContext<'_>, out: &mut Vec<String>) {
    if ctx.cycles.is_empty() {
        return;
    }
    out.push(
        "Circular dependencies detected: resolve them before refactoring, since changes propagate around the loop."
            .to_string(),
    );
    if ctx.cycles.len() > 1 {
        out.push(format!(
            "{} circular dependency chains involve this file.",
            ctx.cycles.len()
        ));
    }
}

fn area_rules(ctx: &RecommendationContext<'_>, out: &mut Vec<String>) {
    let paths: Vec<String> = ctx
        .impacted_files
        .iter()
        .map(|f| f.path.to_ascii_lowercase())
        .collect();

    for (keywords, advice) in AREA_RULES {
        let hit = paths
            .iter()
            .any(|path| keywords.iter().any(|k| path.contains(k)));
        if hit {
            out.push((*advice).to_string());
        }
    }
}

fn change_type_rules(ctx: &RecommendationContext<'_>, out: &mut Vec<String>) {
    let impacted = ctx.impacted_files.len();

    if ctx.change_type == ChangeType::Delete && impacted > 0 {
        out.push(format!(
            "Deleting {} breaks {impacted} dependent file(s): deprecate it first and migrate dependents before removal.",
            ctx.target
        ));
    }
    if impacted > LARGE_IMPACT_THRESHOLD {
        out.push(format!(
            "{impacted} files are affected: monitor performance and error rates closely after deployment."
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, distance: u32) -> ImpactedFile {
        let level = ImpactLevel::from_distance(distance);
        ImpactedFile {
            node_id: path.to_string(),
            path: path.to_string(),
            impact_level: level,
            distance,
            reason: String::new(),
            color: level.color().to_string(),
        }
    }

    fn ctx<'a>(
        change_type: ChangeType,
        risk_score: f64,
        files: &'a [ImpactedFile],
        cycles: &'a [Vec<String>],
    ) -> RecommendationContext<'a> {
        RecommendationContext {
            target: "src/core.ts",
            change_type,
            risk_score,
            impacted_files: files,
            cycles,
        }
    }

    #[test]
    fn no_impact_still_gives_advice() {
        let recs = generate(&ctx(ChangeType::Modify, 0.0, &[], &[])).unwrap();
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("Low impact"));
    }

    #[test]
    fn high_score_triggers_both_risk_rules_in_order() {
        let recs = generate(&ctx(ChangeType::Modify, 8.0, &[], &[])).unwrap();
        assert!(recs[0].contains("feature flag"));
        assert!(recs[1].contains("integration tests"));
    }

    #[test]
    fn medium_score_triggers_testing_only() {
        let recs = generate(&ctx(ChangeType::Modify, 5.5, &[], &[])).unwrap();
        assert!(!recs.iter().any(|r| r.contains("feature flag")));
        assert!(recs[0].contains("integration tests"));
    }

    #[test]
    fn many_critical_files_suggest_splitting() {
        let files: Vec<_> = (0..11).map(|i| file(&format!("src/f{i}.ts"), 1)).collect();
        let recs = generate(&ctx(ChangeType::Modify, 10.0, &files, &[])).unwrap();

        assert!(recs.iter().any(|r| r.contains("splitting")));
        assert!(recs.iter().any(|r| r.starts_with("11 files directly depend")));
    }

    #[test]
    fn single_critical_file_uses_singular() {
        let files = vec![file("src/a.ts", 1)];
        let recs = generate(&ctx(ChangeType::Modify, 3.0, &files, &[])).unwrap();
        assert!(recs.iter().any(|r| r.starts_with("1 file directly depend")));
    }

    #[test]
    fn cycles_warn_and_count() {
        let cycles = vec![
            vec!["a".to_string(), "b".to_string(), "a".to_string()],
            vec!["c".to_string(), "d".to_string(), "c".to_string()],
        ];
        let recs = generate(&ctx(ChangeType::Refactor, 2.0, &[], &cycles)).unwrap();

        assert!(recs[0].contains("Circular dependencies"));
        assert!(recs[1].starts_with("2 circular"));
    }

    #[test]
    fn path_keywords_trigger_area_advice_once() {
        let files = vec![
            file("src/auth/login.ts", 2),
            file("src/auth/session.ts", 3),
            file("src/api/userController.ts", 4),
        ];
        let recs = generate(&ctx(ChangeType::Modify, 4.0, &files, &[])).unwrap();

        assert_eq!(recs.iter().filter(|r| r.contains("security")).count(), 1);
        assert!(recs.iter().any(|r| r.contains("API surface")));
        assert!(!recs.iter().any(|r| r.contains("UI components")));
    }

    #[test]
    fn delete_with_dependents_advises_deprecation() {
        let files = vec![file("src/a.ts", 1)];
        let recs = generate(&ctx(ChangeType::Delete, 6.0, &files, &[])).unwrap();
        assert!(recs.iter().any(|r| r.contains("deprecate")));

        let recs = generate(&ctx(ChangeType::Delete, 0.0, &[], &[])).unwrap();
        assert!(!recs.iter().any(|r| r.contains("deprecate")));
    }

    #[test]
    fn large_impact_advises_monitoring() {
        let files: Vec<_> = (0..21).map(|i| file(&format!("lib/m{i}.rs"), 4)).collect();
        let recs = generate(&ctx(ChangeType::AddFeature, 9.0, &files, &[])).unwrap();
        assert!(recs.iter().any(|r| r.contains("monitor performance")));
    }

    #[test]
    fn invalid_score_falls_back_to_generic() {
        let degraded = generate(&ctx(ChangeType::Modify, f64::NAN, &[], &[])).unwrap_err();
        assert!(!degraded.value.is_empty());
        assert!(degraded.reason.contains("out of range"));

        let degraded = generate(&ctx(ChangeType::Modify, 42.0, &[], &[])).unwrap_err();
        assert_eq!(degraded.value, generic(RiskTier::High));
    }

    #[test]
    fn generic_advice_sizes_by_tier() {
        assert_eq!(generic(RiskTier::Low).len(), 1);
        assert_eq!(generic(RiskTier::Medium).len(), 2);
        assert_eq!(generic(RiskTier::High).len(), 3);
    }
}
