//! Hand-off of a resolved configuration to the test orchestration client.
//!
//! Triggering tests, polling for their results, and reporting them are owned
//! by an external client. This module only fixes the shape of that client
//! and the order in which the step drives it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::ResolvedConfig;

/// Failure reported by the orchestration client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("synthetics orchestration failed: {message}")]
pub struct OrchestrationError {
    /// Error detail from the client.
    pub message: String,
}

/// Handle for a batch of triggered tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredRun {
    /// Batch identifier assigned by the service.
    pub batch_id: String,
    /// Public IDs of the tests in the batch.
    pub public_ids: Vec<String>,
}

/// Result of one test execution, opaque to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Public ID of the test.
    pub public_id: String,
    /// Whether the service considers the run as passed.
    pub passed: bool,
    /// Raw result payload.
    pub payload: Value,
}

/// External client that triggers Synthetic tests and collects their results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyntheticsOrchestrator: Send + Sync {
    /// Triggers the tests selected by `config`.
    async fn trigger_tests(&self, config: &ResolvedConfig) -> Result<TriggeredRun, OrchestrationError>;

    /// Waits for the results of a triggered batch.
    async fn wait_for_results(
        &self,
        config: &ResolvedConfig,
        run: &TriggeredRun,
    ) -> Result<Vec<TestResult>, OrchestrationError>;

    /// Reports results to the CI host.
    async fn report(&self, results: &[TestResult]) -> Result<(), OrchestrationError>;
}

/// Outcome of a completed hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of results returned.
    pub results: usize,
    /// Number of results that did not pass.
    pub failed: usize,
}

impl RunSummary {
    /// Returns `true` when every result passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failed == 0
    }
}

/// Triggers the tests, waits for them, and reports the results.
///
/// # Errors
///
/// Returns the first [`OrchestrationError`] raised by the client; later
/// stages do not run.
pub async fn run_tests(
    orchestrator: &dyn SyntheticsOrchestrator,
    config: &ResolvedConfig,
) -> Result<RunSummary, OrchestrationError> {
    let run = orchestrator.trigger_tests(config).await?;
    tracing::info!(batch_id = %run.batch_id, tests = run.public_ids.len(), "triggered synthetic tests");

    let results = orchestrator.wait_for_results(config, &run).await?;
    orchestrator.report(&results).await?;

    Ok(RunSummary {
        results: results.len(),
        failed: results.iter().filter(|result| !result.passed).count(),
    })
}

#[cfg(test)]
mod tests {
    use mockall::predicate::always;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;

    #[fixture]
    fn config() -> ResolvedConfig {
        ResolvedConfig {
            api_key: "api".to_owned(),
            app_key: "app".to_owned(),
            public_ids: vec!["abc-def-ghi".to_owned()],
            ..ResolvedConfig::default()
        }
    }

    fn triggered() -> TriggeredRun {
        TriggeredRun {
            batch_id: "batch-1".to_owned(),
            public_ids: vec!["abc-def-ghi".to_owned()],
        }
    }

    fn result(public_id: &str, passed: bool) -> TestResult {
        let status = if passed { "passed" } else { "failed" };
        TestResult {
            public_id: public_id.to_owned(),
            passed,
            payload: json!({ "status": status }),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn drives_client_in_order_and_summarises(config: ResolvedConfig) {
        let mut orchestrator = MockSyntheticsOrchestrator::new();
        let mut sequence = mockall::Sequence::new();
        orchestrator
            .expect_trigger_tests()
            .withf(|config| config.public_ids == ["abc-def-ghi"])
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(triggered()));
        orchestrator
            .expect_wait_for_results()
            .with(always(), mockall::predicate::eq(triggered()))
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(vec![result("abc-def-ghi", true), result("jkl-mno-pqr", false)]));
        orchestrator
            .expect_report()
            .withf(|results| results.len() == 2)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));

        let summary = run_tests(&orchestrator, &config)
            .await
            .expect("hand-off should succeed");

        assert_eq!(summary, RunSummary { results: 2, failed: 1 });
        assert!(!summary.passed());
    }

    #[rstest]
    #[tokio::test]
    async fn trigger_failure_stops_the_run(config: ResolvedConfig) {
        let mut orchestrator = MockSyntheticsOrchestrator::new();
        orchestrator.expect_trigger_tests().returning(|_| {
            Err(OrchestrationError {
                message: "no tests to trigger".to_owned(),
            })
        });
        orchestrator.expect_wait_for_results().never();
        orchestrator.expect_report().never();

        let error = run_tests(&orchestrator, &config)
            .await
            .expect_err("trigger failure should propagate");

        assert_eq!(error.message, "no tests to trigger");
    }
}
