use std::fmt;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::naming::acr_login_server;
use crate::source::RuntimeStack;
use crate::tokenize::KeyValue;

/// Raw task inputs as handed over by the host, before validation.
///
/// Every field is optional; empty strings are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct TaskInputs {
    pub app_source_path: Option<String>,
    pub acr_name: Option<String>,
    pub acr_username: Option<String>,
    pub acr_password: Option<String>,
    pub registry_url: Option<String>,
    pub registry_username: Option<String>,
    pub registry_password: Option<String>,
    pub image_to_deploy: Option<String>,
    pub image_to_build: Option<String>,
    pub yaml_config_path: Option<String>,
    pub build_arguments: Option<String>,
    pub dockerfile_path: Option<String>,
    pub runtime_stack: Option<String>,
    pub builder_stack: Option<String>,
    pub container_app_name: Option<String>,
    pub location: Option<String>,
    pub resource_group: Option<String>,
    pub container_app_environment: Option<String>,
    pub container_app_environment_resource_group: Option<String>,
    pub ingress: Option<String>,
    pub target_port: Option<String>,
    pub environment_variables: Option<String>,
    pub disable_telemetry: bool,
}

/// Validated task configuration, produced by [`crate::validate`].
#[derive(Debug)]
pub struct TaskConfig {
    pub source: DeploymentSource,
    pub registry: Option<Registry>,
    /// Explicit image-to-build name, if given
    pub image_to_build: Option<String>,
    /// Dockerfile path relative to the source root, if given
    pub dockerfile_path: Option<PathBuf>,
    pub build_arguments: Vec<KeyValue>,
    pub runtime_stack: Option<RuntimeStack>,
    pub builder_stack: Option<String>,
    pub resources: ResourceRequest,
    pub ingress: Option<Ingress>,
    pub target_port: Option<u16>,
    pub environment_variables: Vec<KeyValue>,
    pub disable_telemetry: bool,
}

impl TaskConfig {
    /// Whether the app source is built locally and pushed to a registry.
    pub fn builds_locally(&self) -> bool {
        matches!(self.source, DeploymentSource::AppSource { .. }) && self.registry.is_some()
    }
}

/// The single source of truth for what gets deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentSource {
    /// Full app definition in a YAML manifest.
    Yaml(PathBuf),
    /// Application source tree to build; `image_to_deploy` overrides the
    /// built image name for deployment.
    AppSource {
        path: PathBuf,
        image_to_deploy: Option<String>,
    },
    /// Pre-built image.
    Image(String),
}

impl DeploymentSource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Yaml(_) => "yaml",
            Self::AppSource { .. } => "app-source",
            Self::Image(_) => "image",
        }
    }
}

/// Container registry to authenticate against and push to.
#[derive(Debug)]
pub enum Registry {
    /// Azure Container Registry, addressed by name.
    Managed {
        name: String,
        credentials: Option<Credentials>,
    },
    /// Any other registry, addressed by login server URL.
    External {
        url: String,
        credentials: Option<Credentials>,
    },
}

impl Registry {
    /// Login server, e.g. `myacr.azurecr.io`.
    pub fn server(&self) -> String {
        match self {
            Self::Managed { name, .. } => acr_login_server(name),
            Self::External { url, .. } => url.clone(),
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Managed { credentials, .. } | Self::External { credentials, .. } => {
                credentials.as_ref()
            }
        }
    }
}

/// Username/password pair; the password never appears in `Debug` output.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Resource names the user supplied explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRequest {
    pub container_app_name: Option<String>,
    pub location: Option<String>,
    pub resource_group: Option<String>,
    pub environment: Option<String>,
    pub environment_resource_group: Option<String>,
}

/// Inbound exposure of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingress {
    External,
    Internal,
    Disabled,
}

impl Ingress {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Internal => "internal",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for Ingress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
