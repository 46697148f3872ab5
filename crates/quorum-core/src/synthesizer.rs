use quorum_types::{AgentCandidate, FinalResult, JudgeVerdict};

const ROLLBACK_GUIDANCE: &str = "Revert the applied patch or restore the prior state.";

/// Merge the winning candidate with the judge's feedback. Pure, no failure
/// path: the improvement note lands in the plan, everything else is carried
/// verbatim.
pub fn synthesize_final(best: &AgentCandidate, verdict: &JudgeVerdict) -> FinalResult {
    FinalResult {
        plan: format!("{}\n\nImprovements: {}", best.plan, verdict.improvements),
        patch: best.patch.clone(),
        test_plan: best.test_plan.clone(),
        risks: best.risks.clone(),
        rollback: ROLLBACK_GUIDANCE.to_string(),
        confidence: best.confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::judge_candidates;

    #[test]
    fn final_result_carries_candidate_fields_verbatim() {
        let best = AgentCandidate {
            plan: "Plan".to_string(),
            patch: "diff --git a/file b/file".to_string(),
            test_plan: "cargo test".to_string(),
            risks: "Low".to_string(),
            assumptions: "None".to_string(),
            confidence: 0.7,
        };
        let verdict = judge_candidates(std::slice::from_ref(&best));

        let final_result = synthesize_final(&best, &verdict);

        assert!(final_result.plan.starts_with("Plan"));
        assert!(final_result
            .plan
            .contains(&format!("Improvements: {}", verdict.improvements)));
        assert_eq!(final_result.patch, best.patch);
        assert_eq!(final_result.test_plan, best.test_plan);
        assert_eq!(final_result.risks, best.risks);
        assert_eq!(final_result.rollback, ROLLBACK_GUIDANCE);
        assert!((final_result.confidence - best.confidence).abs() < f64::EPSILON);
    }
}
