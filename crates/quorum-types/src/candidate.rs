use serde::{Deserialize, Serialize};

/// Structured payload an agent must produce. Constructed only through
/// [`AgentCandidate::parse`], which enforces the value ranges the wire
/// contract promises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCandidate {
    pub plan: String,
    pub patch: String,
    pub test_plan: String,
    pub risks: String,
    pub assumptions: String,
    pub confidence: f64,
}

impl AgentCandidate {
    /// Parse and validate raw model output. Returns a human-readable
    /// diagnostic on failure; the runner feeds it back into the repair loop.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let candidate: AgentCandidate =
            serde_json::from_str(raw.trim()).map_err(|err| format!("invalid JSON: {err}"))?;
        if !(0.0..=1.0).contains(&candidate.confidence) {
            return Err(format!(
                "confidence must be within 0..1, got {}",
                candidate.confidence
            ));
        }
        Ok(candidate)
    }
}
