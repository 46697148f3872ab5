use crate::agent::AgentSpec;
use crate::candidate::AgentCandidate;
use crate::report::{AgentReport, AgentStatus};

/// Terminal state of one agent run. Exactly one outcome exists per spec in a
/// run; a failed agent never aborts its siblings.
#[derive(Debug, Clone)]
pub enum AgentOutcome {
    Success {
        spec: AgentSpec,
        candidate: AgentCandidate,
        latency_ms: u64,
    },
    Failure {
        spec: AgentSpec,
        error: String,
        latency_ms: u64,
    },
}

impl AgentOutcome {
    pub fn success(spec: AgentSpec, candidate: AgentCandidate, latency_ms: u64) -> Self {
        AgentOutcome::Success {
            spec,
            candidate,
            latency_ms,
        }
    }

    pub fn failure(spec: AgentSpec, error: impl Into<String>, latency_ms: u64) -> Self {
        AgentOutcome::Failure {
            spec,
            error: error.into(),
            latency_ms,
        }
    }

    pub fn spec(&self) -> &AgentSpec {
        match self {
            AgentOutcome::Success { spec, .. } | AgentOutcome::Failure { spec, .. } => spec,
        }
    }

    pub fn latency_ms(&self) -> u64 {
        match self {
            AgentOutcome::Success { latency_ms, .. } | AgentOutcome::Failure { latency_ms, .. } => {
                *latency_ms
            }
        }
    }

    pub fn candidate(&self) -> Option<&AgentCandidate> {
        match self {
            AgentOutcome::Success { candidate, .. } => Some(candidate),
            AgentOutcome::Failure { .. } => None,
        }
    }

    /// Per-agent line of the run report. Successful agents summarize with the
    /// head of their plan; failed agents carry the error text in both the
    /// summary and the error field.
    pub fn report(&self) -> AgentReport {
        let spec = self.spec();
        let base = AgentReport {
            id: spec.id_str().to_string(),
            role: spec.role.clone(),
            provider: spec.provider.clone(),
            model: spec.model.clone(),
            latency_ms: self.latency_ms(),
            status: AgentStatus::Ok,
            summary: String::new(),
            error: None,
        };
        match self {
            AgentOutcome::Success { candidate, .. } => AgentReport {
                summary: truncate_chars(&candidate.plan, 200),
                ..base
            },
            AgentOutcome::Failure { error, .. } => AgentReport {
                status: AgentStatus::Error,
                summary: error.clone(),
                error: Some(error.clone()),
                ..base
            },
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> AgentSpec {
        AgentSpec {
            role: "planner".to_string(),
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.2),
            id: Some("agent-1".to_string()),
        }
    }

    #[test]
    fn success_report_uses_plan_head() {
        let candidate = AgentCandidate {
            plan: "p".repeat(300),
            patch: String::new(),
            test_plan: String::new(),
            risks: String::new(),
            assumptions: String::new(),
            confidence: 0.5,
        };
        let report = AgentOutcome::success(spec(), candidate, 12).report();
        assert_eq!(report.status, AgentStatus::Ok);
        assert_eq!(report.summary.len(), 200);
        assert!(report.error.is_none());
    }

    #[test]
    fn failure_report_carries_error() {
        let report = AgentOutcome::failure(spec(), "boom", 3).report();
        assert_eq!(report.status, AgentStatus::Error);
        assert_eq!(report.summary, "boom");
        assert_eq!(report.error.as_deref(), Some("boom"));
    }
}
