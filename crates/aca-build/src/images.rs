use aca_core::naming::default_image_to_build;
use aca_core::{BuildIdentity, DeploymentSource, NamingConfig, TaskConfig};

/// Image names of a local build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNames {
    /// Tag produced by the build and pushed to the registry.
    pub to_build: String,
    /// Image the app is deployed from; defaults to `to_build`.
    pub to_deploy: String,
}

impl ImageNames {
    /// Names for a source tree built locally, `None` for every other scenario.
    pub fn resolve(task: &TaskConfig, build: &BuildIdentity, naming: &NamingConfig) -> Option<Self> {
        let DeploymentSource::AppSource {
            image_to_deploy, ..
        } = &task.source
        else {
            return None;
        };
        let registry = task.registry.as_ref()?;

        let to_build = task.image_to_build.clone().unwrap_or_else(|| {
            default_image_to_build(&registry.server(), &naming.image_repository, build)
        });
        let to_deploy = image_to_deploy.clone().unwrap_or_else(|| to_build.clone());

        Some(Self {
            to_build,
            to_deploy,
        })
    }
}
