use std::path::Path;

use aca_cloud::runner::CommandRunner;
use aca_cloud::{ContainerClient, RealRunner};
use aca_core::{BuildIdentity, DeployConfig, TaskInputs, TelemetryConfig};

use super::deploy_pipeline::{self, DeployOutcome};
use crate::host::Host;
use crate::inputs::InputArgs;
use crate::telemetry::TelemetryRecorder;

/// Execute the full deploy pipeline.
pub async fn deploy(
    inputs: InputArgs,
    build_id: Option<String>,
    build_number: Option<String>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let host = Host::detect();
    for secret in inputs.secrets() {
        host.mask_secret(secret);
    }
    let build = host.build_identity(build_id, build_number);

    let config = super::load_config(config_path);
    let defaults = DeployConfig::default();
    let active = match &config {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "config not loaded, telemetry uses defaults");
            &defaults
        }
    };
    let container_cli = active.container.cli.clone();
    let telemetry_config = active.telemetry.clone();
    let runner = RealRunner::new(container_cli.clone());

    let run = Run {
        host,
        container_cli,
        telemetry: telemetry_config,
    };
    run.execute(&runner, config, inputs, &build).await
}

/// Reporting settings of one run, fixed before the pipeline starts.
pub(crate) struct Run {
    pub host: Host,
    pub container_cli: String,
    pub telemetry: TelemetryConfig,
}

impl Run {
    /// The single place a run's failure is caught: it is recorded in
    /// telemetry and reported to the CI host, telemetry is flushed whatever
    /// the outcome, and the error is returned for a non-zero exit.
    pub(crate) async fn execute<R: CommandRunner>(
        self,
        runner: &R,
        config: anyhow::Result<DeployConfig>,
        inputs: InputArgs,
        build: &BuildIdentity,
    ) -> anyhow::Result<()> {
        let mut telemetry = TelemetryRecorder::start(!inputs.disable_telemetry);

        let result = match config {
            Ok(config) => pipeline(runner, &config, inputs, build, &mut telemetry).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(outcome) => {
                telemetry.record_success();
                for step in &outcome.steps {
                    println!("  {step}");
                }
                println!();
                println!("Deployment succeeded.");
            }
            Err(e) => {
                let message = format!("{e:#}");
                telemetry.record_failure(message.clone());
                self.host.report_failure(&message);
            }
        }

        let container = ContainerClient::with_runner(runner, self.container_cli);
        telemetry.flush(&container, &self.telemetry).await;

        result.map(|_| ())
    }
}

async fn pipeline<R: CommandRunner>(
    runner: &R,
    config: &DeployConfig,
    inputs: InputArgs,
    build: &BuildIdentity,
    telemetry: &mut TelemetryRecorder,
) -> anyhow::Result<DeployOutcome> {
    let task = aca_core::validate(&TaskInputs::from(inputs))?;
    tracing::info!(source = task.source.kind(), "inputs validated");

    deploy_pipeline::run(runner, config, &task, build, telemetry).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{Calls, count, existing_app, new_app, recording};
    use aca_cloud::runner::CommandOutput;

    fn run() -> Run {
        Run {
            host: Host::Local,
            container_cli: "docker".to_owned(),
            telemetry: TelemetryConfig::default(),
        }
    }

    fn build() -> BuildIdentity {
        BuildIdentity::new("7", "3")
    }

    fn image_inputs() -> InputArgs {
        InputArgs {
            image_to_deploy: Some("nginx:1.27".to_owned()),
            resource_group: Some("prod-rg".to_owned()),
            location: Some("eastus".to_owned()),
            ..Default::default()
        }
    }

    fn telemetry_calls(calls: &Calls) -> Vec<String> {
        calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.contains("oryx telemetry"))
            .cloned()
            .collect()
    }

    fn create_fails(line: &str) -> CommandOutput {
        if line.starts_with("az: containerapp create") {
            CommandOutput::failed(1, "InvalidParameterValue")
        } else {
            new_app(line)
        }
    }

    #[tokio::test]
    async fn failed_run_flushes_failure_with_message() {
        let (mock, calls) = recording(create_fails);

        let result = run()
            .execute(&mock, Ok(DeployConfig::default()), image_inputs(), &build())
            .await;

        assert!(result.is_err());
        let events = telemetry_calls(&calls);
        assert_eq!(events.len(), 1);
        assert!(events[0].starts_with("container CLI: run --rm"));
        assert!(events[0].contains("--property 'result=failed'"));
        assert!(events[0].contains("--property 'scenario=used-image'"));
        assert!(events[0].contains("--property 'errorMessage="));
    }

    #[tokio::test]
    async fn invalid_inputs_are_reported_and_flushed() {
        let (mock, calls) = recording(new_app);

        let result = run()
            .execute(
                &mock,
                Ok(DeployConfig::default()),
                InputArgs::default(),
                &build(),
            )
            .await;

        assert!(result.unwrap_err().to_string().contains("appSourcePath"));
        assert_eq!(count(&calls, "az:"), 0);
        let events = telemetry_calls(&calls);
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("errorMessage="));
    }

    #[tokio::test]
    async fn successful_run_flushes_success() {
        let (mock, calls) = recording(existing_app);

        run()
            .execute(&mock, Ok(DeployConfig::default()), image_inputs(), &build())
            .await
            .unwrap();

        let events = telemetry_calls(&calls);
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("--property 'result=succeeded'"));
        assert!(!events[0].contains("errorMessage"));
    }

    #[tokio::test]
    async fn telemetry_failure_keeps_run_outcome() {
        fn telemetry_down(line: &str) -> CommandOutput {
            if line.contains("oryx telemetry") {
                CommandOutput::failed(125, "Unable to find image")
            } else {
                existing_app(line)
            }
        }
        let (mock, _) = recording(telemetry_down);
        run()
            .execute(&mock, Ok(DeployConfig::default()), image_inputs(), &build())
            .await
            .unwrap();

        fn everything_down(line: &str) -> CommandOutput {
            if line.contains("oryx telemetry") {
                CommandOutput::failed(125, "Unable to find image")
            } else {
                create_fails(line)
            }
        }
        let (mock, _) = recording(everything_down);
        let err = run()
            .execute(&mock, Ok(DeployConfig::default()), image_inputs(), &build())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("container app create failed"));
    }

    #[tokio::test]
    async fn disabled_telemetry_is_not_flushed() {
        let (mock, calls) = recording(existing_app);
        let inputs = InputArgs {
            disable_telemetry: true,
            ..image_inputs()
        };

        run()
            .execute(&mock, Ok(DeployConfig::default()), inputs, &build())
            .await
            .unwrap();

        assert!(telemetry_calls(&calls).is_empty());
    }

    #[tokio::test]
    async fn config_error_is_reported_without_running_commands() {
        let (mock, calls) = recording(existing_app);

        let err = run()
            .execute(
                &mock,
                Err(anyhow::anyhow!("failed to parse aca-deploy.toml")),
                image_inputs(),
                &build(),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("aca-deploy.toml"));
        assert_eq!(count(&calls, "az:"), 0);
        assert_eq!(telemetry_calls(&calls).len(), 1);
    }
}
