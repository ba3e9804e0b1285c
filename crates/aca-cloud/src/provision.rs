//! Resource provisioning: resolves app name, location, resource group, and
//! hosting environment, creating each only when absent.

use aca_core::naming::{default_environment, default_resource_group, normalize_location};
use aca_core::{AppState, BuildIdentity, DeployConfig, EnvironmentRef, ResourceContext, TaskConfig};

use crate::az::AzClient;
use crate::error::ProvisionError;
use crate::runner::CommandRunner;

/// Outcome of provisioning: resolved names plus the one-time existence snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub context: ResourceContext,
    pub state: AppState,
}

pub struct ResourceProvisioner<'a, R: CommandRunner> {
    az: &'a AzClient<R>,
    config: &'a DeployConfig,
}

impl<'a, R: CommandRunner> ResourceProvisioner<'a, R> {
    pub fn new(az: &'a AzClient<R>, config: &'a DeployConfig) -> Self {
        Self { az, config }
    }

    pub async fn provision(
        &self,
        task: &TaskConfig,
        build: &BuildIdentity,
    ) -> Result<Provisioned, ProvisionError> {
        let request = &task.resources;

        let app_name = request
            .container_app_name
            .clone()
            .unwrap_or_else(|| build.app_name(&self.config.naming.app_prefix));

        let (resource_group, supplied_group) = match &request.resource_group {
            Some(rg) => (rg.clone(), true),
            None => (default_resource_group(&app_name), false),
        };

        let app_exists = self.az.container_app_exists(&app_name, &resource_group).await;
        tracing::info!(app = %app_name, resource_group = %resource_group, app_exists, "resolved target");

        let location = self
            .resolve_location(task, &app_name, &resource_group, supplied_group && app_exists)
            .await;

        if !supplied_group {
            self.ensure_resource_group(&resource_group, &location).await?;
        }

        let context = ResourceContext {
            app_name,
            resource_group,
            location,
        };

        let state = if app_exists {
            AppState::Exists
        } else {
            AppState::NotExists {
                environment: self.resolve_environment(task, &context).await?,
            }
        };

        Ok(Provisioned { context, state })
    }

    async fn resolve_location(
        &self,
        task: &TaskConfig,
        app_name: &str,
        resource_group: &str,
        lookup_app: bool,
    ) -> String {
        let request = &task.resources;

        if let Some(location) = &request.location {
            return normalize_location(location);
        }

        let app_location = if lookup_app {
            self.az.app_environment_location(app_name, resource_group).await
        } else {
            None
        };
        if let Some(location) = app_location {
            tracing::debug!(%location, "using location of the app's environment");
            return normalize_location(&location);
        }

        if let Some(environment) = &request.environment {
            let environment_group = request
                .environment_resource_group
                .as_deref()
                .unwrap_or(resource_group);
            if let Some(location) = self
                .az
                .environment_location(environment, environment_group)
                .await
            {
                tracing::debug!(%location, "using location of the named environment");
                return normalize_location(&location);
            }
        }

        match self.az.default_location().await {
            Some(location) => normalize_location(&location),
            None => {
                let fallback = &self.config.location.fallback;
                tracing::warn!(%fallback, "no default location reported, using fallback");
                normalize_location(fallback)
            }
        }
    }

    /// Create `name` unless the existence probe finds it.
    async fn ensure_resource_group(&self, name: &str, location: &str) -> Result<(), ProvisionError> {
        if self.az.resource_group_exists(name).await {
            tracing::debug!(resource_group = name, "resource group exists");
            return Ok(());
        }

        tracing::info!(resource_group = name, location, "creating resource group");
        self.az.create_resource_group(name, location).await
    }

    async fn resolve_environment(
        &self,
        task: &TaskConfig,
        context: &ResourceContext,
    ) -> Result<EnvironmentRef, ProvisionError> {
        let request = &task.resources;
        let environment_group = request
            .environment_resource_group
            .clone()
            .unwrap_or_else(|| context.resource_group.clone());

        let (name, existed) = match &request.environment {
            Some(name) => {
                let existed = self.az.environment_exists(name, &environment_group).await;
                (name.clone(), existed)
            }
            None => match self.az.first_environment(&environment_group).await {
                Some(found) => {
                    tracing::info!(environment = %found, "reusing existing environment");
                    (found, true)
                }
                None => {
                    let name = default_environment(&context.app_name);
                    let existed = self.az.environment_exists(&name, &environment_group).await;
                    (name, existed)
                }
            },
        };

        if !existed {
            tracing::info!(environment = %name, resource_group = %environment_group, "creating environment");
            self.az
                .create_environment(&name, &environment_group, &context.location)
                .await?;
        }

        let id = if environment_group != context.resource_group {
            let id = self.az.environment_id(&name, &environment_group).await;
            if id.is_none() {
                tracing::warn!(environment = %name, "environment id unavailable, addressing by name");
            }
            id
        } else {
            None
        };

        Ok(EnvironmentRef {
            name,
            resource_group: environment_group,
            id,
            existed,
        })
    }
}
