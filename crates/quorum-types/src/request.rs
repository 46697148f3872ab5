use serde::{Deserialize, Serialize};

use crate::agent::{AgentSpec, Preset};

pub const MIN_AGENTS: usize = 4;
pub const MAX_AGENTS: usize = 12;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 2;
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Input for the orchestration entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub prompt: String,
    pub n_agents: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<AgentSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_flight_per_provider: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<bool>,
}

impl RunRequest {
    pub fn new(prompt: impl Into<String>, n_agents: usize) -> Self {
        Self {
            prompt: prompt.into(),
            n_agents,
            preset: None,
            agents: None,
            repo_context: None,
            max_in_flight_per_provider: None,
            timeout_ms: None,
            trace: None,
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight_per_provider
            .unwrap_or(DEFAULT_MAX_IN_FLIGHT)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace.unwrap_or(true)
    }
}

/// Input for the patch-review entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub patch_or_diff: String,
    #[serde(default)]
    pub criteria: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub findings: Vec<String>,
    pub risk: RiskLevel,
    pub recommendations: Vec<String>,
}
