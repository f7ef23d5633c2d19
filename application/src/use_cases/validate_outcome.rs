//! Outcome validation use case
//!
//! Asks the oracle whether the execution log satisfied the intent. Like
//! synthesis, this never fails outward: any failure becomes a
//! `success = false` verdict whose reasoning carries the error text.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, ResponseFormat};
use crate::use_cases::shared::{Interrupted, run_bounded};
use pmcro_domain::{
    ExecutionRecord, ValidationOutcome, ValidationPromptTemplate, parse_validation_outcome,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Result of one validation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeCheck {
    pub outcome: ValidationOutcome,
    /// Error-kind label when the verdict is synthetic
    pub failure: Option<&'static str>,
}

impl OutcomeCheck {
    fn failed(kind: &'static str, reasoning: String) -> Self {
        warn!("Outcome validation failed ({}): {}", kind, reasoning);
        Self {
            outcome: ValidationOutcome::failed(reasoning),
            failure: Some(kind),
        }
    }

    pub fn was_cancelled(&self) -> bool {
        self.failure == Some("Cancelled")
    }
}

/// Use case for judging an execution log against an intent
pub struct OutcomeValidator<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    timeout: Option<Duration>,
}

impl<G: LlmGateway + 'static> OutcomeValidator<G> {
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

    pub async fn validate(
        &self,
        intent: &str,
        goal: &str,
        log: &[ExecutionRecord],
        cancellation: &Option<CancellationToken>,
    ) -> OutcomeCheck {
        let system = ValidationPromptTemplate::system();
        let user = ValidationPromptTemplate::user(intent, goal, log);

        let reply = run_bounded(
            self.gateway.complete(&system, &user, ResponseFormat::Json),
            self.timeout,
            cancellation,
        )
        .await;

        match reply {
            Ok(Ok(text)) => match parse_validation_outcome(&text) {
                Ok(outcome) => {
                    info!("Validation verdict: success={}", outcome.success);
                    OutcomeCheck {
                        outcome,
                        failure: None,
                    }
                }
                Err(e) => OutcomeCheck::failed("OutcomeValidationFailure", e),
            },
            Ok(Err(e)) => OutcomeCheck::failed("OracleUnavailable", e.to_string()),
            Err(Interrupted::TimedOut(limit)) => OutcomeCheck::failed(
                "OracleUnavailable",
                format!("{} after {}s", GatewayError::Timeout, limit.as_secs()),
            ),
            Err(Interrupted::Cancelled) => {
                OutcomeCheck::failed("Cancelled", "Cancelled during validation".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::run_intent::test_support::ScriptedGateway;

    fn validator(reply: Result<String, GatewayError>) -> OutcomeValidator<ScriptedGateway> {
        OutcomeValidator::new(Arc::new(ScriptedGateway::new(vec![reply])))
    }

    #[tokio::test]
    async fn test_valid_verdict() {
        let check = validator(Ok(r#"{"success":true,"reasoning":"all good"}"#.to_string()))
            .validate("i", "g", &[], &None)
            .await;
        assert_eq!(check.outcome, ValidationOutcome::passed("all good"));
        assert!(check.failure.is_none());
    }

    #[tokio::test]
    async fn test_gateway_error_becomes_failed_verdict() {
        let check = validator(Err(GatewayError::RequestFailed("HTTP 500".into())))
            .validate("i", "g", &[], &None)
            .await;
        assert!(!check.outcome.success);
        assert!(check.outcome.reasoning.contains("HTTP 500"));
        assert_eq!(check.failure, Some("OracleUnavailable"));
    }

    #[tokio::test]
    async fn test_unparseable_verdict() {
        let check = validator(Ok("yes, it worked".to_string()))
            .validate("i", "g", &[], &None)
            .await;
        assert!(!check.outcome.success);
        assert_eq!(check.failure, Some("OutcomeValidationFailure"));
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let token = CancellationToken::new();
        token.cancel();
        let check = validator(Ok(r#"{"success":true}"#.to_string()))
            .validate("i", "g", &[], &Some(token))
            .await;
        assert!(check.was_cancelled());
        assert!(!check.outcome.success);
    }
}
