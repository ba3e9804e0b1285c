//! Run telemetry: one event per run, emitted through the `oryx` CLI image.

use std::time::{Duration, Instant};

use aca_cloud::ContainerClient;
use aca_cloud::runner::CommandRunner;
use aca_core::TelemetryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Scenario, outcome, elapsed time, and error of a run. Every field is
/// written at most once; later writes are ignored.
#[derive(Debug)]
pub struct TelemetryRecorder {
    enabled: bool,
    started: Instant,
    scenario: Option<&'static str>,
    outcome: Option<Outcome>,
    error: Option<String>,
}

impl TelemetryRecorder {
    pub fn start(enabled: bool) -> Self {
        Self {
            enabled,
            started: Instant::now(),
            scenario: None,
            outcome: None,
            error: None,
        }
    }

    pub fn set_scenario(&mut self, scenario: &'static str) {
        match self.scenario {
            Some(existing) => {
                tracing::debug!(existing, ignored = scenario, "telemetry scenario already set");
            }
            None => self.scenario = Some(scenario),
        }
    }

    pub fn record_success(&mut self) {
        self.record(Outcome::Succeeded, None);
    }

    pub fn record_failure(&mut self, message: String) {
        self.record(Outcome::Failed, Some(message));
    }

    fn record(&mut self, outcome: Outcome, error: Option<String>) {
        if self.outcome.is_some() {
            tracing::debug!("telemetry outcome already recorded");
            return;
        }
        self.outcome = Some(outcome);
        self.error = error;
    }

    pub fn scenario(&self) -> Option<&'static str> {
        self.scenario
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// `oryx telemetry` invocation for this record.
    pub fn event_script(&self, event_name: &str, elapsed: Duration) -> String {
        let mut script = format!(
            "oryx telemetry --event-name {event_name} --processing-time {}",
            elapsed.as_millis()
        );

        let outcome = self.outcome.unwrap_or(Outcome::Failed);
        script.push_str(&property("result", outcome.as_str()));
        if let Some(scenario) = self.scenario {
            script.push_str(&property("scenario", scenario));
        }
        if let Some(error) = &self.error {
            script.push_str(&property("errorMessage", error));
        }
        script
    }

    /// Emit the event. Consumes the recorder so a run flushes at most once.
    /// Failures are logged and never change the run's outcome.
    pub async fn flush<R: CommandRunner>(
        self,
        container: &ContainerClient<R>,
        config: &TelemetryConfig,
    ) {
        if !self.enabled || !config.enabled {
            tracing::debug!("telemetry disabled");
            return;
        }

        let script = self.event_script(&config.event_name, self.started.elapsed());
        match container.run_script(&config.image, &script).await {
            Ok(_) => tracing::debug!("telemetry sent"),
            Err(e) => tracing::warn!(error = %e, "failed to send telemetry"),
        }
    }
}

/// ` --property 'key=value'`, quoted for `bash -c`.
fn property(key: &str, value: &str) -> String {
    let value = value.replace('\n', " ").replace('\'', r"'\''");
    format!(" --property '{key}={value}'")
}
