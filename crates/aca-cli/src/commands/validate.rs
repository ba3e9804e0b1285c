use std::path::Path;

use aca_core::source::{BuildStrategy, resolve_build_strategy};
use aca_core::{DeploymentSource, Registry, TaskConfig, TaskInputs};
use serde::Serialize;

use crate::inputs::InputArgs;

/// How a validated task will be deployed, as printed by `validate`.
#[derive(Debug, Serialize)]
struct Scenario {
    source: &'static str,
    path: Option<String>,
    image: Option<String>,
    registry: Option<String>,
    registry_login: Option<&'static str>,
    build: Option<String>,
    ingress: Option<String>,
    target_port: Option<u16>,
    environment_variables: Vec<String>,
}

impl Scenario {
    fn from_task(task: &TaskConfig) -> Self {
        let (path, image) = match &task.source {
            DeploymentSource::Yaml(path) => (Some(path.display().to_string()), None),
            DeploymentSource::AppSource {
                path,
                image_to_deploy,
            } => (Some(path.display().to_string()), image_to_deploy.clone()),
            DeploymentSource::Image(image) => (None, Some(image.clone())),
        };

        let build = match &task.source {
            DeploymentSource::AppSource { path, .. } if task.builds_locally() => {
                Some(match resolve_build_strategy(path, task.dockerfile_path.as_deref()) {
                    BuildStrategy::Dockerfile(dockerfile) => {
                        format!("dockerfile ({})", dockerfile.display())
                    }
                    BuildStrategy::Builder => "builder".to_owned(),
                })
            }
            DeploymentSource::AppSource { .. } => Some("platform".to_owned()),
            _ => None,
        };

        let registry_login = task.registry.as_ref().map(|r| match r {
            _ if r.credentials().is_some() => "password",
            Registry::Managed { .. } => "access-token",
            Registry::External { .. } => "none",
        });

        Self {
            source: task.source.kind(),
            path,
            image,
            registry: task.registry.as_ref().map(Registry::server),
            registry_login,
            build,
            ingress: task.ingress.map(|i| i.to_string()),
            target_port: task.target_port,
            environment_variables: task
                .environment_variables
                .iter()
                .map(|kv| kv.name.clone())
                .collect(),
        }
    }
}

/// Validate inputs and print the resolved scenario. Never calls Azure.
pub async fn validate(inputs: InputArgs, json: bool) -> anyhow::Result<()> {
    let task = aca_core::validate(&TaskInputs::from(inputs))?;
    let scenario = Scenario::from_task(&task);

    if json {
        println!("{}", serde_json::to_string_pretty(&scenario)?);
        return Ok(());
    }

    println!("Inputs are valid.");
    println!("  Source:    {}", scenario.source);
    if let Some(path) = &scenario.path {
        println!("  Path:      {path}");
    }
    if let Some(image) = &scenario.image {
        println!("  Image:     {image}");
    }
    if let Some(registry) = &scenario.registry {
        let login = scenario.registry_login.unwrap_or("none");
        println!("  Registry:  {registry} (login: {login})");
    }
    if let Some(build) = &scenario.build {
        println!("  Build:     {build}");
    }
    if let Some(ingress) = &scenario.ingress {
        println!("  Ingress:   {ingress}");
    }
    if let Some(port) = scenario.target_port {
        println!("  Port:      {port}");
    }
    if !scenario.environment_variables.is_empty() {
        println!("  Env vars:  {}", scenario.environment_variables.join(", "));
    }

    Ok(())
}
