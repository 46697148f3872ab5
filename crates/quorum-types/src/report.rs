use serde::{Deserialize, Serialize};

/// Four-axis score for one candidate, each axis clamped to 0..10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub accuracy: f64,
    pub executability: f64,
    pub risk: f64,
    pub testability: f64,
}

impl Score {
    pub fn total(&self) -> f64 {
        self.accuracy + self.executability + self.risk + self.testability
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeVerdict {
    pub scores: Vec<Score>,
    pub best_index: usize,
    pub rationale: String,
    pub improvements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResult {
    pub plan: String,
    pub patch: String,
    pub test_plan: String,
    pub risks: String,
    pub rollback: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReport {
    pub id: String,
    pub role: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
    pub status: AgentStatus,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything a caller gets back from one orchestration run. The engine keeps
/// no state once this is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub trace_id: String,
    pub agents: Vec<AgentReport>,
    pub judge: JudgeVerdict,
    #[serde(rename = "final")]
    pub final_result: FinalResult,
}
