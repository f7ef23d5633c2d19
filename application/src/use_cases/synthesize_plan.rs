//! Plan synthesis use case
//!
//! Turns an intent into a [`Plan`] with one oracle round-trip. Synthesis
//! never fails outward: an unreachable oracle, an unparseable reply or a
//! structurally invalid plan all produce the deterministic fallback plan
//! ([`Plan::fallback`]) together with a [`SynthesisFailure`] describing why.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, ResponseFormat};
use crate::use_cases::shared::{Interrupted, run_bounded};
use pmcro_domain::{Plan, PlanParseError, PlanningPromptTemplate, ToolDescriptor, parse_plan};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why synthesis fell back.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisFailure {
    /// The oracle could not be reached or did not answer in time
    OracleUnavailable(String),
    /// The reply could not be turned into a usable plan
    PlanValidation(PlanParseError),
    /// The run was cancelled while waiting for the oracle
    Cancelled,
}

impl SynthesisFailure {
    /// Error-kind label recorded in the trail.
    pub fn kind(&self) -> &str {
        match self {
            SynthesisFailure::OracleUnavailable(_) => "OracleUnavailable",
            SynthesisFailure::PlanValidation(_) => "PlanValidationFailure",
            SynthesisFailure::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for SynthesisFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthesisFailure::OracleUnavailable(msg) => write!(f, "Oracle unavailable: {}", msg),
            SynthesisFailure::PlanValidation(e) => write!(f, "{}", e),
            SynthesisFailure::Cancelled => write!(f, "Cancelled during planning"),
        }
    }
}

/// Result of one synthesis attempt.
#[derive(Debug, Clone)]
pub struct PlanSynthesis {
    /// Always usable: the parsed plan or the fallback
    pub plan: Plan,
    /// Set when `plan` is the fallback
    pub failure: Option<SynthesisFailure>,
}

impl PlanSynthesis {
    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }
}

/// Use case for synthesizing a plan from an intent
pub struct PlanSynthesizer<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    timeout: Option<Duration>,
}

impl<G: LlmGateway + 'static> PlanSynthesizer<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Produce a plan for `intent`, listing `tools` in the instructions.
    pub async fn synthesize(
        &self,
        intent: &str,
        tools: &[ToolDescriptor],
        cancellation: &Option<CancellationToken>,
    ) -> PlanSynthesis {
        let system = PlanningPromptTemplate::system(tools);
        let user = PlanningPromptTemplate::user(intent);

        info!(
            "Synthesizing plan with {} ({} tools)",
            self.gateway.model_name(),
            tools.len()
        );

        let reply = run_bounded(
            self.gateway.complete(&system, &user, ResponseFormat::Json),
            self.timeout,
            cancellation,
        )
        .await;

        let failure = match reply {
            Ok(Ok(text)) => {
                debug!("Planning reply: {} bytes", text.len());
                match parse_plan(&text) {
                    Ok(plan) => {
                        info!("Plan ready: {} steps", plan.step_count());
                        return PlanSynthesis {
                            plan,
                            failure: None,
                        };
                    }
                    Err(e) => SynthesisFailure::PlanValidation(e),
                }
            }
            Ok(Err(e)) => SynthesisFailure::OracleUnavailable(e.to_string()),
            Err(Interrupted::TimedOut(limit)) => SynthesisFailure::OracleUnavailable(format!(
                "{} after {}s",
                GatewayError::Timeout,
                limit.as_secs()
            )),
            Err(Interrupted::Cancelled) => SynthesisFailure::Cancelled,
        };

        warn!("Plan synthesis fell back: {}", failure);
        PlanSynthesis {
            plan: Plan::fallback(intent, failure.to_string()),
            failure: Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::run_intent::test_support::ScriptedGateway;
    use pmcro_domain::MANUAL_INTERVENTION_TOOL;

    fn synthesizer(replies: Vec<Result<String, GatewayError>>) -> PlanSynthesizer<ScriptedGateway> {
        PlanSynthesizer::new(Arc::new(ScriptedGateway::new(replies)))
    }

    fn assert_fallback(synthesis: &PlanSynthesis, intent: &str) {
        assert!(synthesis.is_fallback());
        assert_eq!(synthesis.plan.goal, intent);
        assert_eq!(synthesis.plan.step_count(), 1);
        assert_eq!(synthesis.plan.steps()[0].tool, MANUAL_INTERVENTION_TOOL);
    }

    #[tokio::test]
    async fn test_synthesize_valid_plan() {
        let synth = synthesizer(vec![Ok(r#"{"goal":"g","analysis":"a","steps":[
            {"order":2,"action":"second","tool":"t"},
            {"order":1,"action":"first","tool":"t"}]}"#
            .to_string())]);

        let synthesis = synth.synthesize("noop", &[], &None).await;
        assert!(!synthesis.is_fallback());
        assert_eq!(synthesis.plan.steps()[0].action, "first");
    }

    #[tokio::test]
    async fn test_not_json_falls_back() {
        let synth = synthesizer(vec![Ok("not json".to_string())]);
        let synthesis = synth.synthesize("noop", &[], &None).await;
        assert_fallback(&synthesis, "noop");
        assert_eq!(
            synthesis.failure.as_ref().map(|f| f.kind()),
            Some("PlanValidationFailure")
        );
    }

    #[tokio::test]
    async fn test_missing_goal_falls_back() {
        let synth = synthesizer(vec![Ok(
            r#"{"analysis":"a","steps":[{"order":1,"action":"x","tool":"t"}]}"#.to_string(),
        )]);
        let synthesis = synth.synthesize("noop", &[], &None).await;
        assert_fallback(&synthesis, "noop");
    }

    #[tokio::test]
    async fn test_oracle_error_falls_back() {
        let synth = synthesizer(vec![Err(GatewayError::ConnectionError("refused".into()))]);
        let synthesis = synth.synthesize("noop", &[], &None).await;
        assert_fallback(&synthesis, "noop");
        assert_eq!(
            synthesis.failure.as_ref().map(|f| f.kind()),
            Some("OracleUnavailable")
        );
        assert!(synthesis.plan.analysis.contains("refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_oracle_timeout_falls_back() {
        let gateway = ScriptedGateway::new(vec![Ok("{}".to_string())])
            .with_delay(Duration::from_secs(600));
        let synth = PlanSynthesizer::new(Arc::new(gateway))
            .with_timeout(Some(Duration::from_secs(300)));

        let synthesis = synth.synthesize("noop", &[], &None).await;
        assert_fallback(&synthesis, "noop");
        assert!(synthesis.plan.analysis.contains("after 300s"));
    }

    #[tokio::test]
    async fn test_prompt_lists_tools() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok("not json".to_string())]));
        let synth = PlanSynthesizer::new(gateway.clone());
        let tools = vec![ToolDescriptor::new("echo", "Echo a message")];

        synth.synthesize("say hi", &tools, &None).await;

        let prompts = gateway.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.contains("**echo**"));
        assert!(prompts[0].1.contains("say hi"));
    }
}
