use serde::{Deserialize, Serialize};

/// One configured role/provider/model/temperature tuple. Every agent in a run
/// attempts the same prompt independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl AgentSpec {
    /// Id as assigned for the run. Call sites must only use this after
    /// ids have been filled in.
    pub fn id_str(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Balanced,
    Quality,
    Speed,
    Security,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Balanced => "balanced",
            Preset::Quality => "quality",
            Preset::Speed => "speed",
            Preset::Security => "security",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Balanced
    }
}
