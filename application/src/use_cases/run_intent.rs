//! Run Intent use case
//!
//! Drives one intent through the cognitive cycle:
//!
//! | State   | Work                                             | Trail entry |
//! |---------|--------------------------------------------------|-------------|
//! | Intake  | accept intent and cancellation token             | -           |
//! | Plan    | one synthesis round-trip (real or fallback plan) | `Plan`      |
//! | Make    | dispatch each step, strictly sequentially        | `Make` × N  |
//! | Check   | one validation round-trip over the log           | `Check`     |
//! | Reflect | assemble the [`IntentReport`]                    | `Reflect`   |
//! | Done    | terminal                                         | -           |
//!
//! Step failures never abort the Make phase. Cancellation stops further
//! steps, skips validation and yields a report with status `Cancelled`.

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, OrchestrationProgress};
use crate::ports::tool_dispatcher::ToolDispatcherPort;
use crate::use_cases::shared::{Interrupted, check_cancelled, run_bounded};
use crate::use_cases::synthesize_plan::{PlanSynthesizer, SynthesisFailure};
use crate::use_cases::validate_outcome::{OutcomeCheck, OutcomeValidator};
use pmcro_domain::trail::RUN_ID_KEY;
use pmcro_domain::{
    CognitiveTrail, DomainError, ExecutionRecord, IntentReport, LoopState, Phase, PlanStep, RunId,
    RunStatus, ToolCallRequest, ToolDescriptor, ToolError, TrailEntry, ValidationOutcome,
};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that escape a run.
///
/// Recoverable conditions (oracle failures, tool failures, cancellation)
/// are folded into the report instead.
#[derive(Error, Debug)]
pub enum RunIntentError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One dispatched step. `interrupted` is set when the run was cancelled
/// while the call was in flight.
struct StepOutcome {
    record: ExecutionRecord,
    error_kind: Option<&'static str>,
    interrupted: bool,
}

impl StepOutcome {
    fn failed(step: &PlanStep, error: &ToolError, interrupted: bool) -> Self {
        Self {
            record: ExecutionRecord::failed(step.order, &step.tool, error.to_string()),
            error_kind: Some(error.kind.trail_label()),
            interrupted,
        }
    }
}

/// Use case for executing an intent end to end
pub struct RunIntentUseCase<G: LlmGateway + 'static, D: ToolDispatcherPort + 'static> {
    gateway: Arc<G>,
    dispatcher: Arc<D>,
    trail: Arc<dyn CognitiveTrail>,
    params: ExecutionParams,
    cancellation_token: Option<CancellationToken>,
}

impl<G, D> Clone for RunIntentUseCase<G, D>
where
    G: LlmGateway + 'static,
    D: ToolDispatcherPort + 'static,
{
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            dispatcher: self.dispatcher.clone(),
            trail: self.trail.clone(),
            params: self.params.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl<G: LlmGateway + 'static, D: ToolDispatcherPort + 'static> RunIntentUseCase<G, D> {
    pub fn new(gateway: Arc<G>, dispatcher: Arc<D>, trail: Arc<dyn CognitiveTrail>) -> Self {
        Self {
            gateway,
            dispatcher,
            trail,
            params: ExecutionParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub async fn execute(&self, intent: &str) -> Result<IntentReport, RunIntentError> {
        self.execute_with_progress(intent, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        intent: &str,
        progress: &dyn OrchestrationProgress,
    ) -> Result<IntentReport, RunIntentError> {
        let intent = intent.trim();
        if intent.is_empty() {
            return Err(DomainError::InvalidIntent("intent is empty".to_string()).into());
        }

        let run_id = RunId::generate();
        let mut state = LoopState::Intake;
        info!("Run {} started: {}", run_id, intent);

        // ==================== Plan ====================
        state = state.transition(LoopState::Plan)?;
        progress.on_phase_start(Phase::Plan);

        let (tools, catalog_error) = self.fetch_catalog().await;
        let synthesis = PlanSynthesizer::new(self.gateway.clone())
            .with_timeout(self.params.planning_timeout)
            .synthesize(intent, &tools, &self.cancellation_token)
            .await;
        let plan = synthesis.plan;
        let mut cancelled = synthesis.failure == Some(SynthesisFailure::Cancelled);

        self.record(
            &run_id,
            Phase::Plan,
            json!({
                "goal": plan.goal,
                "analysis": plan.analysis,
                "stepCount": plan.step_count(),
                "fallback": synthesis.failure.is_some(),
                "errorKind": synthesis.failure.as_ref().map(|f| f.kind()),
                "error": synthesis.failure.as_ref().map(|f| f.to_string()),
                "catalogError": catalog_error,
            }),
        );
        progress.on_plan_ready(&plan);

        // ==================== Make ====================
        state = state.transition(LoopState::Make)?;
        let mut execution_log: Vec<ExecutionRecord> = Vec::with_capacity(plan.step_count());

        if !cancelled {
            progress.on_phase_start(Phase::Make);
            let total = plan.step_count();

            for (index, step) in plan.steps().iter().enumerate() {
                if check_cancelled(&self.cancellation_token).is_err() {
                    cancelled = true;
                    break;
                }

                progress.on_step_start(step, index, total);
                let StepOutcome {
                    record,
                    error_kind,
                    interrupted,
                } = self.execute_step(step).await;

                let mut payload = serde_json::to_value(&record).unwrap_or_else(|_| json!({}));
                if let Some(object) = payload.as_object_mut() {
                    object.insert("action".to_string(), Value::String(step.action.clone()));
                    if let Some(kind) = error_kind {
                        object.insert("errorKind".to_string(), Value::String(kind.to_string()));
                    }
                }
                self.record(&run_id, Phase::Make, payload);
                progress.on_step_complete(&record);
                execution_log.push(record);

                if interrupted {
                    cancelled = true;
                    break;
                }
            }
        }

        // ==================== Check ====================
        state = state.transition(LoopState::Check)?;
        let check = if cancelled {
            OutcomeCheck {
                outcome: ValidationOutcome::failed("Run cancelled before validation"),
                failure: Some("Cancelled"),
            }
        } else {
            progress.on_phase_start(Phase::Check);
            OutcomeValidator::new(self.gateway.clone())
                .with_timeout(self.params.validation_timeout)
                .validate(intent, &plan.goal, &execution_log, &self.cancellation_token)
                .await
        };
        cancelled = cancelled || check.was_cancelled();

        self.record(
            &run_id,
            Phase::Check,
            json!({
                "success": check.outcome.success,
                "reasoning": check.outcome.reasoning,
                "errorKind": check.failure,
                "logLength": execution_log.len(),
            }),
        );
        progress.on_validation(&check.outcome);

        // ==================== Reflect ====================
        state = state.transition(LoopState::Reflect)?;
        progress.on_phase_start(Phase::Reflect);

        let status = if cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        let failed = execution_log.iter().filter(|r| !r.is_success()).count();

        self.record(
            &run_id,
            Phase::Reflect,
            json!({
                "status": status,
                "success": check.outcome.success,
                "executed": execution_log.len(),
                "failed": failed,
            }),
        );

        let report = IntentReport {
            run_id: run_id.to_string(),
            intent: intent.to_string(),
            goal: plan.goal.clone(),
            thought_process: plan.analysis.clone(),
            status,
            validation: check.outcome,
            execution_log,
            history: self.trail.history_for(run_id.as_str()),
        };

        state = state.transition(LoopState::Done)?;
        debug!("Run {} reached {}", run_id, state);
        info!(
            "Run {} finished: {} ({} steps, {} failed, validation success={})",
            run_id,
            report.status,
            report.executed_count(),
            failed,
            report.validation.success
        );

        Ok(report)
    }

    /// Tool catalog for the planning prompt; an unreachable dispatcher
    /// yields an empty catalog and the error text.
    async fn fetch_catalog(&self) -> (Vec<ToolDescriptor>, Option<String>) {
        let listed = run_bounded(
            self.dispatcher.list_tools(),
            self.params.tool_call_timeout,
            &self.cancellation_token,
        )
        .await;

        match listed {
            Ok(Ok(tools)) => (tools, None),
            Ok(Err(e)) => {
                warn!("Could not list tools: {}", e);
                (Vec::new(), Some(e.to_string()))
            }
            Err(Interrupted::TimedOut(limit)) => {
                warn!("Listing tools timed out after {}s", limit.as_secs());
                (
                    Vec::new(),
                    Some(ToolError::timeout("tools/list").to_string()),
                )
            }
            // The synthesizer observes the same token and falls back
            Err(Interrupted::Cancelled) => (Vec::new(), None),
        }
    }

    /// Dispatch one step and classify any failure.
    async fn execute_step(&self, step: &PlanStep) -> StepOutcome {
        let request = match ToolCallRequest::from_blob(&step.tool, &step.arguments) {
            Ok(request) => request,
            Err(message) => {
                warn!("Step {} has unusable arguments: {}", step.order, message);
                let error = ToolError::invalid_arguments(message);
                return StepOutcome::failed(step, &error, false);
            }
        };

        info!("Step {}: {} ({})", step.order, step.action, step.tool);
        let outcome = run_bounded(
            self.dispatcher.call_tool(&request),
            self.params.tool_call_timeout,
            &self.cancellation_token,
        )
        .await;

        let outcome = match outcome {
            Ok(Ok(result)) => {
                let error_kind = result.failure_kind().map(|kind| kind.trail_label());
                StepOutcome {
                    record: ExecutionRecord::from_result(step.order, &step.tool, result),
                    error_kind,
                    interrupted: false,
                }
            }
            Ok(Err(e)) => StepOutcome {
                record: ExecutionRecord::failed(step.order, &step.tool, e.to_string()),
                error_kind: Some(e.trail_label()),
                interrupted: false,
            },
            Err(Interrupted::TimedOut(limit)) => {
                let error =
                    ToolError::timeout(format!("{} after {}s", step.tool, limit.as_secs()));
                StepOutcome::failed(step, &error, false)
            }
            Err(Interrupted::Cancelled) => StepOutcome::failed(step, &ToolError::cancelled(), true),
        };

        if let Some(error) = &outcome.record.error {
            warn!("Step {} failed: {}", step.order, error);
        }
        outcome
    }

    fn record(&self, run_id: &RunId, phase: Phase, mut payload: Value) {
        if let Some(object) = payload.as_object_mut() {
            object.insert(
                RUN_ID_KEY.to_string(),
                Value::String(run_id.as_str().to_string()),
            );
        }
        self.trail.append(TrailEntry::new(phase, payload));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::ports::llm_gateway::{GatewayError, LlmGateway, ResponseFormat};
    use crate::ports::tool_dispatcher::{DispatchError, ToolDispatcherPort};
    use async_trait::async_trait;
    use pmcro_domain::{ToolCallRequest, ToolCallResult, ToolDescriptor, ToolErrorKind};
    use serde_json::json;
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Gateway replaying a fixed queue of replies and recording prompts.
    pub(crate) struct ScriptedGateway {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        prompts: Mutex<Vec<(String, String)>>,
        delay: Option<Duration>,
    }

    impl ScriptedGateway {
        pub(crate) fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn prompts(&self) -> Vec<(String, String)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            system_prompt: &str,
            user_prompt: &str,
            _format: ResponseFormat,
        ) -> Result<String, GatewayError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::RequestFailed("no scripted reply".into())))
        }
    }

    /// Dispatcher with a fixed tool set that records every call.
    ///
    /// Unregistered names fail with `-32602`; tools marked rejecting fail
    /// argument validation with `-32602`; tools marked failing return a
    /// failed result; `hang_on` never completes; `cancel_on` cancels the
    /// given token and then never completes.
    #[derive(Default)]
    pub(crate) struct ScriptedDispatcher {
        tools: Vec<ToolDescriptor>,
        failing: HashSet<String>,
        rejecting: HashSet<String>,
        hang_on: HashSet<String>,
        cancel_on: Option<(String, CancellationToken)>,
        list_error: Option<DispatchError>,
        calls: Mutex<Vec<ToolCallRequest>>,
    }

    impl ScriptedDispatcher {
        pub(crate) fn with_tools(names: &[&str]) -> Self {
            Self {
                tools: names
                    .iter()
                    .map(|name| ToolDescriptor::new(*name, format!("{} tool", name)))
                    .collect(),
                ..Default::default()
            }
        }

        pub(crate) fn failing(mut self, name: &str) -> Self {
            self.failing.insert(name.to_string());
            self
        }

        pub(crate) fn rejecting(mut self, name: &str) -> Self {
            self.rejecting.insert(name.to_string());
            self
        }

        pub(crate) fn hanging(mut self, name: &str) -> Self {
            self.hang_on.insert(name.to_string());
            self
        }

        pub(crate) fn cancelling(mut self, name: &str, token: CancellationToken) -> Self {
            self.cancel_on = Some((name.to_string(), token));
            self
        }

        pub(crate) fn with_list_error(mut self, error: DispatchError) -> Self {
            self.list_error = Some(error);
            self
        }

        pub(crate) fn called_tools(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.tool_name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ToolDispatcherPort for ScriptedDispatcher {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, DispatchError> {
            match &self.list_error {
                Some(error) => Err(error.clone()),
                None => Ok(self.tools.clone()),
            }
        }

        async fn call_tool(
            &self,
            request: &ToolCallRequest,
        ) -> Result<ToolCallResult, DispatchError> {
            self.calls.lock().unwrap().push(request.clone());
            let name = request.tool_name.as_str();

            if let Some((tool, token)) = &self.cancel_on
                && tool == name
            {
                token.cancel();
                std::future::pending::<()>().await;
            }
            if self.hang_on.contains(name) {
                std::future::pending::<()>().await;
            }
            if !self.tools.iter().any(|t| t.name == name) {
                return Err(DispatchError::Rpc {
                    code: -32602,
                    message: format!("Unknown tool: {}", name),
                    kind: Some(ToolErrorKind::UnknownTool),
                });
            }
            if self.rejecting.contains(name) {
                return Err(DispatchError::Rpc {
                    code: -32602,
                    message: format!("Invalid arguments for '{}'", name),
                    kind: Some(ToolErrorKind::InvalidArguments),
                });
            }
            if self.failing.contains(name) {
                return Ok(ToolCallResult::failure(format!("{} handler failed", name)));
            }
            Ok(ToolCallResult::success(
                json!({"tool": name, "arguments": request.arguments_value()}),
            ))
        }
    }
}
