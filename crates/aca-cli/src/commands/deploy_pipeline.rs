use aca_build::{ImageBuilder, ImageNames};
use aca_cloud::runner::CommandRunner;
use aca_cloud::{
    AzClient, ContainerClient, PackClient, Provisioned, RegistryAuthenticator, ResourceProvisioner,
};
use aca_core::plan::{PlanInputs, plan};
use aca_core::{BuildIdentity, DeployConfig, DeploymentSource, TaskConfig};

use crate::telemetry::TelemetryRecorder;

/// Result of a successful deploy pipeline run.
pub(crate) struct DeployOutcome {
    pub steps: Vec<String>,
}

/// Run the deploy pipeline: provision → [login → build → push] → plan → deploy.
///
/// Stops at the first failure. The telemetry scenario is recorded as soon as
/// it is known, so failed runs still report it.
pub(crate) async fn run<R: CommandRunner>(
    runner: &R,
    config: &DeployConfig,
    task: &TaskConfig,
    build: &BuildIdentity,
    telemetry: &mut TelemetryRecorder,
) -> anyhow::Result<DeployOutcome> {
    let az = AzClient::with_runner(runner);
    let container = ContainerClient::with_runner(runner, &config.container.cli);
    let pack = PackClient::with_runner(runner);
    let mut steps = Vec::new();

    az.prepare_extension().await?;
    steps.push("az containerapp extension ready".to_owned());

    // Provision
    let Provisioned { context, state } = ResourceProvisioner::new(&az, config)
        .provision(task, build)
        .await?;
    steps.push(format!(
        "Target: {} in {} ({}), {}",
        context.app_name,
        context.resource_group,
        context.location,
        if state.exists() { "existing app" } else { "new app" },
    ));

    // Image
    let image = match &task.source {
        DeploymentSource::Yaml(path) => {
            telemetry.set_scenario("used-yaml");
            steps.push(format!("Using YAML definition {}", path.display()));
            None
        }
        DeploymentSource::Image(image) => {
            telemetry.set_scenario("used-image");
            Some(image.clone())
        }
        DeploymentSource::AppSource { path, .. } => {
            match (
                ImageNames::resolve(task, build, &config.naming),
                &task.registry,
            ) {
                (Some(names), Some(registry)) => {
                    let login = RegistryAuthenticator::new(&container)
                        .authenticate(registry)
                        .await?;
                    tracing::debug!(?login, "registry login");

                    let kind = ImageBuilder::new(&container, &pack, &config.builder, &config.ingress)
                        .build_and_push(task, path, &names.to_build)
                        .await?;
                    telemetry.set_scenario(kind.as_str());
                    steps.push(format!("Built and pushed {} ({kind})", names.to_build));
                    Some(names.to_deploy)
                }
                _ => {
                    telemetry.set_scenario("used-platform-build");
                    steps.push(format!("Uploading {} for a platform build", path.display()));
                    None
                }
            }
        }
    };

    // Deploy
    let deployment = plan(&PlanInputs {
        task,
        context: &context,
        state: &state,
        image: image.as_deref(),
        ingress_policy: &config.ingress,
    });
    tracing::debug!(?deployment, "deployment plan");
    az.execute_plan(deployment).await?;

    match image {
        Some(image) => steps.push(format!("Deployed {image} to {}", context.app_name)),
        None => steps.push(format!("Deployed {}", context.app_name)),
    }

    Ok(DeployOutcome { steps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{count, existing_app, new_app, recording};
    use aca_cloud::runner::CommandOutput;
    use aca_core::{TaskInputs, validate};

    fn build() -> BuildIdentity {
        BuildIdentity::new("7", "3")
    }

    #[tokio::test]
    async fn new_app_from_image_is_created_once() {
        let (mock, calls) = recording(new_app);
        let task = validate(&TaskInputs {
            image_to_deploy: Some("nginx:1.27".to_owned()),
            acr_name: Some("myacr".to_owned()),
            acr_username: Some("myacr".to_owned()),
            acr_password: Some("pw".to_owned()),
            resource_group: Some("prod-rg".to_owned()),
            location: Some("eastus".to_owned()),
            ..Default::default()
        })
        .unwrap();
        let mut telemetry = TelemetryRecorder::start(true);

        run(&mock, &DeployConfig::default(), &task, &build(), &mut telemetry)
            .await
            .unwrap();

        assert_eq!(count(&calls, "az: containerapp create"), 1);
        assert_eq!(count(&calls, "az: containerapp up"), 0);
        assert_eq!(count(&calls, "container CLI: login"), 0);
        let calls = calls.lock().unwrap();
        let create = calls
            .iter()
            .find(|c| c.starts_with("az: containerapp create"))
            .unwrap();
        assert!(create.contains("-i nginx:1.27"));
        assert!(create.contains("--environment team-env"));
        assert_eq!(telemetry.scenario(), Some("used-image"));
    }

    #[tokio::test]
    async fn existing_app_with_credentials_sets_registry_then_updates() {
        let (mock, calls) = recording(existing_app);
        let task = validate(&TaskInputs {
            image_to_deploy: Some("myacr.azurecr.io/web:2".to_owned()),
            acr_name: Some("myacr".to_owned()),
            acr_username: Some("myacr".to_owned()),
            acr_password: Some("pw".to_owned()),
            container_app_name: Some("web".to_owned()),
            resource_group: Some("prod-rg".to_owned()),
            ..Default::default()
        })
        .unwrap();
        let mut telemetry = TelemetryRecorder::start(true);

        run(&mock, &DeployConfig::default(), &task, &build(), &mut telemetry)
            .await
            .unwrap();

        let calls = calls.lock().unwrap();
        let deploy: Vec<&String> = calls
            .iter()
            .filter(|c| {
                c.starts_with("az: containerapp registry")
                    || c.starts_with("az: containerapp update")
                    || c.starts_with("az: containerapp up ")
            })
            .collect();
        assert_eq!(deploy.len(), 2);
        assert!(deploy[0].starts_with("az: containerapp registry set"));
        assert!(deploy[1].starts_with("az: containerapp update"));
        assert!(!deploy[1].contains("--registry-server"));
    }

    #[tokio::test]
    async fn source_build_logs_in_builds_pushes_and_deploys_built_image() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("Dockerfile"), "FROM scratch\n").unwrap();
        let (mock, calls) = recording(new_app);
        let task = validate(&TaskInputs {
            app_source_path: Some(dir.path().display().to_string()),
            registry_url: Some("ghcr.io".to_owned()),
            registry_username: Some("me".to_owned()),
            registry_password: Some("pw".to_owned()),
            location: Some("eastus".to_owned()),
            ..Default::default()
        })
        .unwrap();
        let mut telemetry = TelemetryRecorder::start(true);

        run(&mock, &DeployConfig::default(), &task, &build(), &mut telemetry)
            .await
            .unwrap();

        let image = "ghcr.io/aca-deploy/container-app:7.3";
        let calls = calls.lock().unwrap();
        let position = |prefix: &str| calls.iter().position(|c| c.starts_with(prefix)).unwrap();
        assert!(position("container CLI: login ghcr.io") < position("container CLI: build"));
        assert!(position("container CLI: build") < position("container CLI: push"));
        assert!(position("container CLI: push") < position("az: containerapp create"));
        assert!(calls.iter().any(|c| c == &format!("container CLI: push {image}")));
        assert_eq!(telemetry.scenario(), Some("used-dockerfile"));
    }

    #[tokio::test]
    async fn platform_build_uses_up_with_source() {
        let (mock, calls) = recording(new_app);
        let task = validate(&TaskInputs {
            app_source_path: Some("./src".to_owned()),
            location: Some("eastus".to_owned()),
            ..Default::default()
        })
        .unwrap();
        let mut telemetry = TelemetryRecorder::start(true);

        run(&mock, &DeployConfig::default(), &task, &build(), &mut telemetry)
            .await
            .unwrap();

        assert_eq!(count(&calls, "container CLI"), 0);
        assert_eq!(count(&calls, "pack"), 0);
        let calls = calls.lock().unwrap();
        let up = calls
            .iter()
            .find(|c| c.starts_with("az: containerapp up"))
            .unwrap();
        assert!(up.contains("--source ./src --location eastus"));
        assert_eq!(telemetry.scenario(), Some("used-platform-build"));
    }

    #[tokio::test]
    async fn failed_provisioning_stops_before_deploy() {
        fn group_create_fails(line: &str) -> CommandOutput {
            if line.starts_with("az: group create") {
                CommandOutput::failed(1, "AuthorizationFailed")
            } else if line.starts_with("az: group show") || line.starts_with("az: containerapp show") {
                CommandOutput::failed(3, "ResourceNotFound")
            } else {
                CommandOutput::ok("")
            }
        }
        let (mock, calls) = recording(group_create_fails);
        let task = validate(&TaskInputs {
            image_to_deploy: Some("nginx".to_owned()),
            location: Some("eastus".to_owned()),
            ..Default::default()
        })
        .unwrap();
        let mut telemetry = TelemetryRecorder::start(true);

        let err = run(&mock, &DeployConfig::default(), &task, &build(), &mut telemetry)
            .await
            .err()
            .unwrap();

        assert!(err.to_string().contains("aca-app-7-3-rg"));
        assert_eq!(count(&calls, "az: containerapp create"), 0);
        assert_eq!(count(&calls, "az: containerapp env"), 0);
    }
}
