use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("all agents failed; see per-agent errors in the trace")]
    AllAgentsFailed,
}
