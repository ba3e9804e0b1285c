use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "aca-deploy.toml";

/// aca-deploy.toml policy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub ingress: IngressConfig,
    #[serde(default)]
    pub builder: BuilderConfig,
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Prefix of synthesized app names (`<prefix>-<buildId>-<buildNumber>`)
    #[serde(default = "default_app_prefix")]
    pub app_prefix: String,
    /// Repository part of synthesized image names
    #[serde(default = "default_image_repository")]
    pub image_repository: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Region used when the platform cannot report a default location
    #[serde(default = "default_fallback_location")]
    pub fallback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngressConfig {
    /// Target port used when ingress is enabled but no port was given
    #[serde(default = "default_target_port")]
    pub default_target_port: u16,
    /// Per-platform overrides of the default target port, keyed by the
    /// platform name of the runtime stack (e.g. `python`)
    #[serde(default = "default_runtime_stack_ports")]
    pub runtime_stack_ports: HashMap<String, u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Install the pack CLI before building
    #[serde(default = "default_true")]
    pub install_pack: bool,
    /// pack CLI release to install
    #[serde(default = "default_pack_version")]
    pub pack_version: String,
    /// Builder images in priority order
    #[serde(default = "default_builder_images")]
    pub images: Vec<BuilderImage>,
}

/// A buildpack builder image and the OS stack it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderImage {
    pub stack: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Container CLI used to build, log in, push, and run images
    #[serde(default = "default_container_cli")]
    pub cli: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Image providing the `oryx telemetry` command
    #[serde(default = "default_telemetry_image")]
    pub image: String,
    #[serde(default = "default_event_name")]
    pub event_name: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            app_prefix: default_app_prefix(),
            image_repository: default_image_repository(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback_location(),
        }
    }
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            default_target_port: default_target_port(),
            runtime_stack_ports: default_runtime_stack_ports(),
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            install_pack: true,
            pack_version: default_pack_version(),
            images: default_builder_images(),
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            cli: default_container_cli(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image: default_telemetry_image(),
            event_name: default_event_name(),
        }
    }
}

impl DeployConfig {
    /// Load from aca-deploy.toml in the given directory, or return defaults if not found.
    pub fn load(dir: &Path) -> crate::Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path. A missing file is an error here.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl IngressConfig {
    /// Target port for an enabled ingress with no explicit port.
    pub fn target_port_for(&self, platform: Option<&str>) -> u16 {
        platform
            .and_then(|p| self.runtime_stack_ports.get(p))
            .copied()
            .unwrap_or(self.default_target_port)
    }
}

impl BuilderConfig {
    /// Builder images compatible with `stack`, in priority order.
    /// Without a stack every configured image is a candidate.
    pub fn candidates(&self, stack: Option<&str>) -> Vec<&BuilderImage> {
        self.images
            .iter()
            .filter(|b| stack.is_none_or(|s| b.stack.eq_ignore_ascii_case(s)))
            .collect()
    }
}

fn default_true() -> bool {
    true
}

fn default_app_prefix() -> String {
    "aca-app".to_owned()
}

fn default_image_repository() -> String {
    "aca-deploy/container-app".to_owned()
}

fn default_fallback_location() -> String {
    "eastus2".to_owned()
}

fn default_target_port() -> u16 {
    80
}

fn default_runtime_stack_ports() -> HashMap<String, u16> {
    HashMap::from([("python".to_owned(), 8080)])
}

fn default_pack_version() -> String {
    "0.35.1".to_owned()
}

fn default_builder_images() -> Vec<BuilderImage> {
    vec![
        BuilderImage {
            stack: "debian-bookworm".to_owned(),
            image: "mcr.microsoft.com/oryx/builder:debian-bookworm-20240424.1".to_owned(),
        },
        BuilderImage {
            stack: "debian-bullseye".to_owned(),
            image: "mcr.microsoft.com/oryx/builder:debian-bullseye-20240424.1".to_owned(),
        },
        BuilderImage {
            stack: "debian-buster".to_owned(),
            image: "mcr.microsoft.com/oryx/builder:20230208.1".to_owned(),
        },
    ]
}

fn default_container_cli() -> String {
    "docker".to_owned()
}

fn default_telemetry_image() -> String {
    "mcr.microsoft.com/oryx/cli:debian-buster-20230207.2".to_owned()
}

fn default_event_name() -> String {
    "ContainerAppsDeployTask".to_owned()
}
