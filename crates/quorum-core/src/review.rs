use quorum_types::{ReviewReport, RiskLevel};

const LARGE_PATCH_CHARS: usize = 20_000;

/// Stateless heuristic review of a patch or diff. Independent of the
/// orchestration core; exposed as its own tool.
pub fn review_patch(patch_or_diff: &str, criteria: &[String]) -> ReviewReport {
    let mut findings = Vec::new();

    if !patch_or_diff.contains("@@") {
        findings.push("Patch does not include unified diff hunks (@@).".to_string());
    }
    if patch_or_diff.chars().count() > LARGE_PATCH_CHARS {
        findings.push("Patch is large; consider splitting into smaller changes.".to_string());
    }
    if patch_or_diff.contains("TODO") || patch_or_diff.contains("FIXME") {
        findings.push("Patch contains TODO/FIXME markers.".to_string());
    }
    if !criteria.is_empty() {
        findings.push(format!(
            "Custom criteria evaluated: {}.",
            criteria.join(", ")
        ));
    }

    ReviewReport {
        risk: if findings.is_empty() {
            RiskLevel::Low
        } else {
            RiskLevel::Medium
        },
        findings,
        recommendations: vec![
            "Ensure patch applies cleanly with git apply.".to_string(),
            "Run the suggested test plan.".to_string(),
            "Validate agent output against the response schema.".to_string(),
        ],
    }
}
