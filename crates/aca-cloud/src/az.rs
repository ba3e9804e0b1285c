use aca_core::plan::{DeploymentPlan, InvocationKind};

use crate::error::{CommandError, DeployError, ProvisionError};
use crate::runner::{CommandRunner, RealRunner, Tool, exec, exec_streaming};

/// Azure CLI operations client, parameterized over the runner for testability.
pub struct AzClient<R: CommandRunner = RealRunner> {
    runner: R,
}

impl<R: CommandRunner> AzClient<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    // ── CLI setup ──

    /// Allow on-demand extension installs and install or upgrade the
    /// `containerapp` extension.
    pub async fn prepare_extension(&self) -> Result<(), ProvisionError> {
        self.exec(args([
            "config",
            "set",
            "extension.use_dynamic_install=yes_without_prompt",
        ]))
        .await
        .map_err(|e| ProvisionError::CliSetup { source: e })?;

        self.exec(args([
            "extension",
            "add",
            "--name",
            "containerapp",
            "--upgrade",
            "--only-show-errors",
        ]))
        .await
        .map_err(|e| ProvisionError::CliSetup { source: e })?;

        Ok(())
    }

    pub async fn version(&self) -> Result<String, CommandError> {
        self.query(args(["version", "--query", "\"azure-cli\"", "-o", "tsv"]))
            .await
    }

    pub async fn account(&self) -> Result<String, CommandError> {
        self.query(args(["account", "show", "--query", "user.name", "-o", "tsv"]))
            .await
    }

    pub async fn extension_version(&self) -> Result<String, CommandError> {
        self.query(args([
            "extension",
            "show",
            "--name",
            "containerapp",
            "--query",
            "version",
            "-o",
            "tsv",
        ]))
        .await
    }

    // ── Resource groups ──

    pub async fn resource_group_exists(&self, name: &str) -> bool {
        self.probe(
            "resource group",
            args(["group", "show", "-n", name, "-o", "none"]),
        )
        .await
    }

    pub async fn create_resource_group(
        &self,
        name: &str,
        location: &str,
    ) -> Result<(), ProvisionError> {
        self.exec(args(["group", "create", "-n", name, "-l", location, "-o", "none"]))
            .await
            .map_err(|e| ProvisionError::ResourceGroup {
                name: name.to_owned(),
                source: e,
            })?;

        Ok(())
    }

    // ── Container apps ──

    pub async fn container_app_exists(&self, name: &str, resource_group: &str) -> bool {
        self.probe(
            "container app",
            args([
                "containerapp",
                "show",
                "-n",
                name,
                "-g",
                resource_group,
                "-o",
                "none",
            ]),
        )
        .await
    }

    /// Location of the environment an existing app is linked to.
    pub async fn app_environment_location(
        &self,
        name: &str,
        resource_group: &str,
    ) -> Option<String> {
        let environment_id = self
            .probe_value(
                "container app environment id",
                args([
                    "containerapp",
                    "show",
                    "-n",
                    name,
                    "-g",
                    resource_group,
                    "--query",
                    "properties.managedEnvironmentId",
                    "-o",
                    "tsv",
                ]),
            )
            .await?;

        self.probe_value(
            "container app environment location",
            args([
                "containerapp",
                "env",
                "show",
                "--ids",
                &environment_id,
                "--query",
                "location",
                "-o",
                "tsv",
            ]),
        )
        .await
    }

    // ── Environments ──

    pub async fn environment_exists(&self, name: &str, resource_group: &str) -> bool {
        self.probe(
            "container app environment",
            args([
                "containerapp",
                "env",
                "show",
                "-n",
                name,
                "-g",
                resource_group,
                "-o",
                "none",
            ]),
        )
        .await
    }

    pub async fn environment_location(&self, name: &str, resource_group: &str) -> Option<String> {
        self.environment_field(name, resource_group, "location").await
    }

    pub async fn environment_id(&self, name: &str, resource_group: &str) -> Option<String> {
        self.environment_field(name, resource_group, "id").await
    }

    async fn environment_field(
        &self,
        name: &str,
        resource_group: &str,
        field: &str,
    ) -> Option<String> {
        self.probe_value(
            "container app environment",
            args([
                "containerapp",
                "env",
                "show",
                "-n",
                name,
                "-g",
                resource_group,
                "--query",
                field,
                "-o",
                "tsv",
            ]),
        )
        .await
    }

    /// Name of any environment in `resource_group`.
    pub async fn first_environment(&self, resource_group: &str) -> Option<String> {
        self.probe_value(
            "container app environments",
            args([
                "containerapp",
                "env",
                "list",
                "-g",
                resource_group,
                "--query",
                "[0].name",
                "-o",
                "tsv",
            ]),
        )
        .await
    }

    pub async fn create_environment(
        &self,
        name: &str,
        resource_group: &str,
        location: &str,
    ) -> Result<(), ProvisionError> {
        self.exec(args([
            "containerapp",
            "env",
            "create",
            "-n",
            name,
            "-g",
            resource_group,
            "-l",
            location,
            "-o",
            "none",
        ]))
        .await
        .map_err(|e| ProvisionError::Environment {
            name: name.to_owned(),
            source: e,
        })?;

        Ok(())
    }

    // ── Locations ──

    /// First location the platform offers for container apps.
    pub async fn default_location(&self) -> Option<String> {
        self.probe_value(
            "container apps default location",
            args([
                "provider",
                "show",
                "-n",
                "Microsoft.App",
                "--query",
                "resourceTypes[?resourceType=='containerApps'].locations[] | [0]",
                "-o",
                "tsv",
            ]),
        )
        .await
    }

    // ── Deployment ──

    /// Execute every invocation of `plan` in order, stopping at the first failure.
    pub async fn execute_plan(&self, plan: DeploymentPlan) -> Result<(), DeployError> {
        for invocation in plan.invocations {
            let action = action_name(invocation.kind);
            tracing::info!(action, "running az containerapp {action}");

            let result = match invocation.kind {
                InvocationKind::Up => {
                    exec_streaming(&self.runner, Tool::Az, &invocation.args).await
                }
                _ => self.exec(invocation.args).await.map(|_| ()),
            };

            result.map_err(|e| DeployError::Invocation { action, source: e })?;
        }

        Ok(())
    }

    // ── Helpers ──

    async fn exec(&self, args: Vec<String>) -> Result<String, CommandError> {
        exec(&self.runner, Tool::Az, &args).await
    }

    async fn query(&self, args: Vec<String>) -> Result<String, CommandError> {
        self.exec(args).await.map(|out| out.trim().to_owned())
    }

    /// Read-only check: any failure means "absent".
    async fn probe(&self, what: &str, args: Vec<String>) -> bool {
        match self.exec(args).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "{what} not found");
                false
            }
        }
    }

    /// Read-only query: any failure or empty output means "unknown".
    async fn probe_value(&self, what: &str, args: Vec<String>) -> Option<String> {
        match self.query(args).await {
            Ok(value) if !value.is_empty() => Some(value),
            Ok(_) => {
                tracing::debug!("{what}: empty result");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "{what} lookup failed");
                None
            }
        }
    }
}

fn action_name(kind: InvocationKind) -> &'static str {
    match kind {
        InvocationKind::CreateFromYaml => "create (yaml)",
        InvocationKind::UpdateFromYaml => "update (yaml)",
        InvocationKind::Create => "create",
        InvocationKind::Up => "up",
        InvocationKind::RegistrySet => "registry set",
        InvocationKind::Update => "update",
        InvocationKind::DisableIngress => "ingress disable",
    }
}

pub(crate) fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}
