use std::sync::Arc;
use std::time::Duration;

use quorum_providers::{ChatMessage, ProviderError, ProviderRegistry};
use quorum_types::{AgentCandidate, AgentOutcome, AgentSpec};
use tokio::time::Instant;
use tracing::debug;

use crate::retry::RetryPolicy;

pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Structural repair rounds after the first parse failure; 3 structural
/// attempts total.
const REPAIR_ROUNDS: u32 = 2;

const REPAIR_INSTRUCTION: &str =
    "Your previous response was invalid JSON. Return ONLY a valid JSON object matching the schema.";

/// Drives one agent's full interaction: message construction, transport call
/// with timeout and retry, and the bounded repair loop for structurally
/// invalid output. Never fails the run — every path ends in an
/// [`AgentOutcome`].
pub struct AgentRunner {
    providers: Arc<ProviderRegistry>,
    retry: RetryPolicy,
}

impl AgentRunner {
    pub fn new(providers: Arc<ProviderRegistry>, retry: RetryPolicy) -> Self {
        Self { providers, retry }
    }

    pub async fn run(
        &self,
        spec: &AgentSpec,
        prompt: &str,
        repo_context: Option<&str>,
        timeout: Duration,
    ) -> AgentOutcome {
        let started = Instant::now();
        let provider = match self.providers.get(&spec.provider) {
            Ok(provider) => provider,
            Err(err) => {
                return AgentOutcome::failure(spec.clone(), err.to_string(), elapsed_ms(started))
            }
        };
        let temperature = spec.temperature.unwrap_or(DEFAULT_TEMPERATURE);

        let mut messages = vec![
            ChatMessage::system(system_prompt(&spec.role)),
            ChatMessage::user(user_prompt(prompt, repo_context)),
        ];

        let mut attempt: u32 = 0;
        loop {
            let call = self
                .retry
                .run(|| {
                    let fut = provider.complete(&messages, &spec.model, temperature);
                    async move {
                        match tokio::time::timeout(timeout, fut).await {
                            Ok(result) => result,
                            Err(_) => Err(ProviderError::Timeout),
                        }
                    }
                })
                .await;

            let completion = match call {
                Ok(completion) => completion,
                Err(err) => {
                    return AgentOutcome::failure(spec.clone(), err.to_string(), elapsed_ms(started))
                }
            };

            let content = completion.content.trim().to_string();
            match AgentCandidate::parse(&content) {
                Ok(candidate) => {
                    return AgentOutcome::success(spec.clone(), candidate, elapsed_ms(started))
                }
                Err(parse_err) if attempt == REPAIR_ROUNDS => {
                    return AgentOutcome::failure(
                        spec.clone(),
                        format!(
                            "invalid JSON response after {} attempts: {parse_err}",
                            attempt + 1
                        ),
                        elapsed_ms(started),
                    );
                }
                Err(parse_err) => {
                    debug!(
                        agent = spec.id_str(),
                        attempt,
                        error = %parse_err,
                        "structural validation failed, requesting repair"
                    );
                    messages.push(ChatMessage::assistant(content));
                    messages.push(ChatMessage::user(REPAIR_INSTRUCTION));
                    attempt += 1;
                }
            }
        }
    }
}

fn system_prompt(role: &str) -> String {
    format!(
        "You are an autonomous agent in a multi-agent system. Role: {role}. \
         Return a strict JSON object with keys: plan, patch, test_plan, risks, assumptions, confidence. \
         confidence must be 0..1. patch must be a unified diff. \
         test_plan should be runnable commands with expected results."
    )
}

fn user_prompt(prompt: &str, repo_context: Option<&str>) -> String {
    match repo_context {
        Some(context) if !context.trim().is_empty() => {
            format!("{prompt}\n\nRepo context:\n{context}")
        }
        _ => prompt.to_string(),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{valid_candidate_json, ScriptItem, ScriptedProvider};
    use quorum_providers::ProviderError;
    use std::sync::Arc;

    fn spec_for(provider: &str) -> AgentSpec {
        AgentSpec {
            role: "implementer".to_string(),
            provider: provider.to_string(),
            model: "mock".to_string(),
            temperature: Some(0.2),
            id: Some("agent-1".to_string()),
        }
    }

    fn runner_with(provider: Arc<ScriptedProvider>) -> AgentRunner {
        let registry = ProviderRegistry::from_providers(vec![provider]);
        AgentRunner::new(Arc::new(registry), RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn valid_response_yields_success() {
        let provider = Arc::new(ScriptedProvider::always_ok("openai"));
        let runner = runner_with(provider.clone());

        let outcome = runner
            .run(
                &spec_for("openai"),
                "Test",
                None,
                Duration::from_millis(60_000),
            )
            .await;

        let candidate = outcome.candidate().expect("success");
        assert_eq!(candidate.plan, "Plan");
        assert_eq!(provider.call_count(), 1);
        // system + user message, no repair traffic.
        assert_eq!(provider.message_counts(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn repo_context_is_appended_to_user_message() {
        let message = user_prompt("Fix it", Some("src/lib.rs contents"));
        assert!(message.starts_with("Fix it"));
        assert!(message.contains("Repo context:\nsrc/lib.rs contents"));
        assert_eq!(user_prompt("Fix it", Some("  ")), "Fix it");
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_json_triggers_one_repair_round_trip() {
        let provider = Arc::new(ScriptedProvider::new(
            "openai",
            vec![
                ScriptItem::Ok("not-json".to_string()),
                ScriptItem::Ok(valid_candidate_json()),
            ],
        ));
        let runner = runner_with(provider.clone());

        let outcome = runner
            .run(
                &spec_for("openai"),
                "Test",
                None,
                Duration::from_millis(60_000),
            )
            .await;

        assert!(outcome.candidate().is_some());
        assert_eq!(provider.call_count(), 2);
        // The repair call carries the bad output plus the corrective
        // instruction on top of the original two messages.
        assert_eq!(provider.message_counts(), vec![2, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn repair_budget_exhaustion_reports_last_parse_error() {
        let provider = Arc::new(ScriptedProvider::new(
            "openai",
            vec![ScriptItem::Ok("still-not-json".to_string())],
        ));
        let runner = runner_with(provider.clone());

        let outcome = runner
            .run(
                &spec_for("openai"),
                "Test",
                None,
                Duration::from_millis(60_000),
            )
            .await;

        match outcome {
            AgentOutcome::Failure { error, .. } => {
                assert!(error.contains("invalid JSON response after 3 attempts"));
                assert!(error.contains("invalid JSON"));
            }
            AgentOutcome::Success { .. } => panic!("expected failure"),
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_429_is_retried_and_latency_reflects_backoff() {
        let rate_limited = ProviderError::Status {
            status: 429,
            detail: "Too Many Requests".to_string(),
        };
        let provider = Arc::new(ScriptedProvider::new(
            "openai",
            vec![
                ScriptItem::Err(rate_limited.clone()),
                ScriptItem::Err(rate_limited),
                ScriptItem::Ok(valid_candidate_json()),
            ],
        ));
        let runner = runner_with(provider.clone());

        let outcome = runner
            .run(
                &spec_for("openai"),
                "Retry",
                None,
                Duration::from_millis(60_000),
            )
            .await;

        assert!(outcome.candidate().is_some());
        assert_eq!(provider.call_count(), 3);
        // Two backoff sleeps (500ms + 1000ms) happened before success.
        assert!(outcome.latency_ms() >= 1500);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_call_is_cancelled_and_retried() {
        let provider = Arc::new(ScriptedProvider::new(
            "openai",
            vec![ScriptItem::Hang, ScriptItem::Ok(valid_candidate_json())],
        ));
        let runner = runner_with(provider.clone());

        let outcome = runner
            .run(
                &spec_for("openai"),
                "Timeout",
                None,
                Duration::from_millis(1_000),
            )
            .await;

        assert!(outcome.candidate().is_some());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_status_fails_without_retry() {
        let provider = Arc::new(ScriptedProvider::new(
            "openai",
            vec![ScriptItem::Err(ProviderError::Status {
                status: 400,
                detail: "Fatal".to_string(),
            })],
        ));
        let runner = runner_with(provider.clone());

        let outcome = runner
            .run(
                &spec_for("openai"),
                "Partial",
                None,
                Duration::from_millis(60_000),
            )
            .await;

        match outcome {
            AgentOutcome::Failure { error, .. } => assert!(error.contains("Fatal")),
            AgentOutcome::Success { .. } => panic!("expected failure"),
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_provider_yields_failure_outcome() {
        let runner = runner_with(Arc::new(ScriptedProvider::always_ok("openai")));

        let outcome = runner
            .run(
                &spec_for("missing"),
                "Test",
                None,
                Duration::from_millis(60_000),
            )
            .await;

        match outcome {
            AgentOutcome::Failure { error, .. } => {
                assert!(error.contains("`missing` is not configured"))
            }
            AgentOutcome::Success { .. } => panic!("expected failure"),
        }
    }
}
