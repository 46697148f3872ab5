use quorum_types::{AgentCandidate, JudgeVerdict, Score};

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 10.0)
}

/// Score every surviving candidate and pick the best. Pure function of the
/// candidate sequence; callers must pass at least one candidate.
///
/// The risk axis divides the risk-narrative length by 40 — a calibration
/// constant kept for compatibility with the existing scoring behavior.
pub fn judge_candidates(candidates: &[AgentCandidate]) -> JudgeVerdict {
    debug_assert!(!candidates.is_empty());

    let scores: Vec<Score> = candidates
        .iter()
        .map(|candidate| Score {
            accuracy: clamp_score(candidate.confidence * 10.0),
            executability: clamp_score(if candidate.patch.trim().is_empty() {
                4.0
            } else {
                8.0
            }),
            risk: clamp_score(10.0 - (candidate.risks.chars().count() as f64 / 40.0).min(10.0)),
            testability: clamp_score(if candidate.test_plan.trim().is_empty() {
                3.0
            } else {
                8.0
            }),
        })
        .collect();

    // Strictly-greater comparison: ties resolve to the lowest index.
    let mut best_index = 0;
    for (index, score) in scores.iter().enumerate() {
        if score.total() > scores[best_index].total() {
            best_index = index;
        }
    }

    JudgeVerdict {
        scores,
        best_index,
        rationale: format!("Selected candidate {best_index} based on highest total score."),
        improvements: "Improve patch clarity, ensure test plan commands are executable, \
                       and reduce risk exposure by adding rollback steps."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(confidence: f64, patch: &str, test_plan: &str, risks: &str) -> AgentCandidate {
        AgentCandidate {
            plan: "Plan".to_string(),
            patch: patch.to_string(),
            test_plan: test_plan.to_string(),
            risks: risks.to_string(),
            assumptions: "None".to_string(),
            confidence,
        }
    }

    #[test]
    fn scores_follow_the_axis_formulas() {
        let verdict = judge_candidates(&[candidate(0.7, "@@ +x", "echo ok", "Low")]);
        let score = &verdict.scores[0];
        assert!((score.accuracy - 7.0).abs() < 1e-9);
        assert!((score.executability - 8.0).abs() < 1e-9);
        assert!((score.risk - (10.0 - 3.0 / 40.0)).abs() < 1e-9);
        assert!((score.testability - 8.0).abs() < 1e-9);
    }

    #[test]
    fn blank_patch_and_test_plan_score_lower() {
        let verdict = judge_candidates(&[candidate(0.5, "   ", "  ", "")]);
        let score = &verdict.scores[0];
        assert!((score.executability - 4.0).abs() < 1e-9);
        assert!((score.testability - 3.0).abs() < 1e-9);
    }

    #[test]
    fn long_risk_narrative_saturates_at_zero() {
        let risks = "r".repeat(1000);
        let verdict = judge_candidates(&[candidate(0.5, "@@", "t", &risks)]);
        assert!((verdict.scores[0].risk - 0.0).abs() < 1e-9);
    }

    #[test]
    fn best_index_picks_highest_total() {
        let verdict = judge_candidates(&[
            candidate(0.2, "", "", "Low"),
            candidate(0.9, "@@ +x", "echo ok", "Low"),
            candidate(0.5, "@@ +x", "", "Low"),
        ]);
        assert_eq!(verdict.best_index, 1);
        assert_eq!(verdict.scores.len(), 3);
        assert!(verdict.rationale.contains("candidate 1"));
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let verdict = judge_candidates(&[
            candidate(0.7, "@@ +x", "echo ok", "Low"),
            candidate(0.7, "@@ +x", "echo ok", "Low"),
        ]);
        assert_eq!(verdict.best_index, 0);
    }

    #[test]
    fn accuracy_is_clamped_to_ten() {
        // Confidence is validated to 0..1 upstream; the clamp still holds if
        // a candidate is constructed directly.
        let verdict = judge_candidates(&[candidate(1.0, "@@", "t", "")]);
        assert!((verdict.scores[0].accuracy - 10.0).abs() < 1e-9);
    }
}
