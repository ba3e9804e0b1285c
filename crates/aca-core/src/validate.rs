//! Scenario validation: turns raw [`TaskInputs`] into a [`TaskConfig`].
//!
//! Runs before anything touches the network or spawns a process. The only
//! side effect is a filesystem probe for a Dockerfile, used to decide whether
//! build arguments must follow the builder's naming rules.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::inputs::{
    Credentials, DeploymentSource, Ingress, Registry, ResourceRequest, TaskConfig, TaskInputs,
};
use crate::source::{BuildStrategy, RuntimeStack, resolve_build_strategy};
use crate::tokenize::{KeyValue, is_builder_arg_name, parse_assignments};
use crate::{Error, Result};

/// Validate `inputs`, failing fast on the first invalid combination.
pub fn validate(inputs: &TaskInputs) -> Result<TaskConfig> {
    let source = resolve_source(inputs)?;
    let registry = resolve_registry(inputs)?;

    let environment_variables = assignments("environmentVariables", &inputs.environment_variables)?;
    let build_arguments = assignments("buildArguments", &inputs.build_arguments)?;

    let ingress = non_empty(&inputs.ingress)
        .map(|raw| parse_ingress(&raw))
        .transpose()?;
    let target_port = non_empty(&inputs.target_port)
        .map(|raw| parse_port(&raw))
        .transpose()?;
    let runtime_stack = non_empty(&inputs.runtime_stack)
        .map(|raw| RuntimeStack::parse(&raw))
        .transpose()?;

    let dockerfile_path = non_empty(&inputs.dockerfile_path).map(PathBuf::from);

    let config = TaskConfig {
        source,
        registry,
        image_to_build: non_empty(&inputs.image_to_build),
        dockerfile_path,
        build_arguments,
        runtime_stack,
        builder_stack: non_empty(&inputs.builder_stack),
        resources: ResourceRequest {
            container_app_name: non_empty(&inputs.container_app_name),
            location: non_empty(&inputs.location),
            resource_group: non_empty(&inputs.resource_group),
            environment: non_empty(&inputs.container_app_environment),
            environment_resource_group: non_empty(
                &inputs.container_app_environment_resource_group,
            ),
        },
        ingress,
        target_port,
        environment_variables,
        disable_telemetry: inputs.disable_telemetry,
    };

    check_build_arguments(&config)?;

    Ok(config)
}

fn resolve_source(inputs: &TaskInputs) -> Result<DeploymentSource> {
    let yaml = non_empty(&inputs.yaml_config_path);
    let app_source = non_empty(&inputs.app_source_path);
    let image = non_empty(&inputs.image_to_deploy);

    match (yaml, app_source, image) {
        (None, None, None) => Err(Error::MissingRequiredArgument {
            detail: "one of 'appSourcePath', 'imageToDeploy', or 'yamlConfigPath' must be provided"
                .to_owned(),
        }),
        (Some(_), Some(_), _) => Err(Error::ConflictingArguments {
            first: "yamlConfigPath",
            second: "appSourcePath",
        }),
        (Some(_), None, Some(_)) => Err(Error::ConflictingArguments {
            first: "yamlConfigPath",
            second: "imageToDeploy",
        }),
        (Some(yaml), None, None) => Ok(DeploymentSource::Yaml(PathBuf::from(yaml))),
        (None, Some(path), image_to_deploy) => Ok(DeploymentSource::AppSource {
            path: PathBuf::from(path),
            image_to_deploy,
        }),
        (None, None, Some(image)) => Ok(DeploymentSource::Image(image)),
    }
}

fn resolve_registry(inputs: &TaskInputs) -> Result<Option<Registry>> {
    let acr_name = non_empty(&inputs.acr_name);
    let registry_url = non_empty(&inputs.registry_url);

    match (acr_name, registry_url) {
        (Some(_), Some(_)) => Err(Error::ConflictingArguments {
            first: "acrName",
            second: "registryUrl",
        }),
        (Some(name), None) => Ok(Some(Registry::Managed {
            name,
            credentials: credentials(&inputs.acr_username, &inputs.acr_password),
        })),
        (None, Some(url)) => Ok(Some(Registry::External {
            url,
            credentials: credentials(&inputs.registry_username, &inputs.registry_password),
        })),
        (None, None) => Ok(None),
    }
}

fn credentials(username: &Option<String>, password: &Option<String>) -> Option<Credentials> {
    match (non_empty(username), non_blank_verbatim(password)) {
        (Some(username), Some(password)) => Some(Credentials {
            username,
            password: SecretString::from(password),
        }),
        (None, None) => None,
        _ => {
            tracing::debug!("registry username or password missing, credentials ignored");
            None
        }
    }
}

fn assignments(input: &'static str, raw: &Option<String>) -> Result<Vec<KeyValue>> {
    match non_empty(raw) {
        Some(raw) => parse_assignments(input, &raw),
        None => Ok(Vec::new()),
    }
}

fn parse_ingress(raw: &str) -> Result<Ingress> {
    match raw.to_ascii_lowercase().as_str() {
        "external" | "enabled" => Ok(Ingress::External),
        "internal" => Ok(Ingress::Internal),
        "disabled" => Ok(Ingress::Disabled),
        other => Err(Error::invalid(
            "ingress",
            format!("expected external, internal, or disabled, got {other:?}"),
        )),
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(Error::invalid(
            "targetPort",
            format!("expected a port number, got {raw:?}"),
        )),
    }
}

/// Build arguments handed to the builder must be `BP_*` or `ORYX_*`.
fn check_build_arguments(config: &TaskConfig) -> Result<()> {
    if config.build_arguments.is_empty() {
        return Ok(());
    }

    let DeploymentSource::AppSource { path, .. } = &config.source else {
        tracing::warn!("buildArguments ignored: no application source to build");
        return Ok(());
    };

    if config.registry.is_none() {
        tracing::warn!("buildArguments ignored: source is built by the platform");
        return Ok(());
    }

    let strategy = resolve_build_strategy(Path::new(path), config.dockerfile_path.as_deref());
    if strategy != BuildStrategy::Builder {
        return Ok(());
    }

    match config
        .build_arguments
        .iter()
        .find(|kv| !is_builder_arg_name(&kv.name))
    {
        Some(kv) => Err(Error::invalid(
            "buildArguments",
            format!(
                "builder arguments must be named BP_* or ORYX_*, got {:?}",
                kv.name
            ),
        )),
        None => Ok(()),
    }
}

/// Like [`non_empty`] but keeps surrounding whitespace, for secrets.
fn non_blank_verbatim(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
