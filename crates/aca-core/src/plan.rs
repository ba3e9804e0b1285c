//! Deployment planning: decides which `az containerapp` calls to issue.
//!
//! ```text
//!                      ┌─ yaml ──────────────► create --yaml
//!   NotExists ─────────┼─ platform-built ────► up --source
//!                      └─ image ─────────────► create -i
//!
//!                      ┌─ yaml ──────────────► update --yaml
//!   Exists ────────────┼─ update-in-place ───► [registry set] → update
//!                      └─ otherwise ─────────► up
//!                           then, if ingress = disabled ─► ingress disable
//! ```
//!
//! The planner is pure: it only assembles argument lists. Execution lives in
//! `aca-cloud`.

use std::fmt;

use secrecy::ExposeSecret;

use crate::config::IngressConfig;
use crate::context::{AppState, ResourceContext};
use crate::inputs::{Credentials, DeploymentSource, Ingress, Registry, TaskConfig};
use crate::redact::redact_args;

/// What a single `az` invocation in a plan does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    CreateFromYaml,
    UpdateFromYaml,
    Create,
    Up,
    RegistrySet,
    Update,
    DisableIngress,
}

/// One `az` call; `args` excludes the `az` program name.
#[derive(Clone, PartialEq, Eq)]
pub struct AzInvocation {
    pub kind: InvocationKind,
    pub args: Vec<String>,
}

impl fmt::Debug for AzInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzInvocation")
            .field("kind", &self.kind)
            .field("args", &redact_args(&self.args))
            .finish()
    }
}

impl AzInvocation {
    fn new(kind: InvocationKind, args: Vec<String>) -> Self {
        Self { kind, args }
    }
}

/// Ordered `az` calls for one run. Consumed exactly once.
#[derive(Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    /// Flags shared by the terminal create/update call.
    pub command_plan: Vec<String>,
    pub invocations: Vec<AzInvocation>,
}

impl fmt::Debug for DeploymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentPlan")
            .field("command_plan", &redact_args(&self.command_plan))
            .field("invocations", &self.invocations)
            .finish()
    }
}

/// Inputs of [`plan`].
pub struct PlanInputs<'a> {
    pub task: &'a TaskConfig,
    pub context: &'a ResourceContext,
    pub state: &'a AppState,
    /// Image to deploy; `None` when the platform builds the source.
    pub image: Option<&'a str>,
    pub ingress_policy: &'a IngressConfig,
}

/// Whether an existing app can be updated in place with `containerapp update`.
///
/// `update` cannot change ingress or port, and cannot build source, so any
/// of those forces `up`.
pub fn should_use_update_command(task: &TaskConfig, image: Option<&str>) -> bool {
    image.is_some()
        && task.target_port.is_none()
        && matches!(task.ingress, None | Some(Ingress::Disabled))
}

/// Compute the `az` calls that deploy `inputs.task` given the existence snapshot.
pub fn plan(inputs: &PlanInputs<'_>) -> DeploymentPlan {
    let PlanInputs {
        task,
        context,
        state,
        image,
        ingress_policy: _,
    } = *inputs;

    let target = app_target(context);

    if let DeploymentSource::Yaml(path) = &task.source {
        let (kind, verb) = if state.exists() {
            (InvocationKind::UpdateFromYaml, "update")
        } else {
            (InvocationKind::CreateFromYaml, "create")
        };
        let mut args = command(&["containerapp", verb]);
        args.extend(target);
        args.extend(command(&["--yaml", &path.display().to_string(), "--output", "none"]));
        return DeploymentPlan {
            command_plan: Vec::new(),
            invocations: vec![AzInvocation::new(kind, args)],
        };
    }

    let exists = state.exists();
    let use_update = exists && should_use_update_command(task, image);
    let command_plan = command_plan(inputs, use_update);

    let mut invocations = Vec::new();

    match state {
        AppState::NotExists { environment } => {
            let (kind, verb) = if image.is_none() {
                (InvocationKind::Up, "up")
            } else {
                (InvocationKind::Create, "create")
            };
            let mut args = command(&["containerapp", verb]);
            args.extend(target.iter().cloned());
            args.extend(command(&["--environment", environment.reference()]));
            args.extend(command_plan.iter().cloned());
            if kind == InvocationKind::Create {
                args.extend(command(&["--output", "none"]));
            }
            invocations.push(AzInvocation::new(kind, args));
        }
        AppState::Exists if use_update => {
            if let Some((registry, creds)) = registry_credentials(task) {
                let mut args = command(&["containerapp", "registry", "set"]);
                args.extend(target.iter().cloned());
                args.extend(command(&[
                    "--server",
                    &registry.server(),
                    "--username",
                    &creds.username,
                    "--password",
                    creds.password.expose_secret(),
                ]));
                invocations.push(AzInvocation::new(InvocationKind::RegistrySet, args));
            }

            let mut args = command(&["containerapp", "update"]);
            args.extend(target.iter().cloned());
            args.extend(command_plan.iter().cloned());
            args.extend(command(&["--output", "none"]));
            invocations.push(AzInvocation::new(InvocationKind::Update, args));
        }
        AppState::Exists => {
            let mut args = command(&["containerapp", "up"]);
            args.extend(target.iter().cloned());
            args.extend(command_plan.iter().cloned());
            invocations.push(AzInvocation::new(InvocationKind::Up, args));
        }
    }

    // Runs after either update path, even if `update` already left ingress off.
    if exists && task.ingress == Some(Ingress::Disabled) {
        let mut args = command(&["containerapp", "ingress", "disable"]);
        args.extend(target);
        invocations.push(AzInvocation::new(InvocationKind::DisableIngress, args));
    }

    DeploymentPlan {
        command_plan,
        invocations,
    }
}

fn command_plan(inputs: &PlanInputs<'_>, use_update: bool) -> Vec<String> {
    let PlanInputs {
        task,
        context,
        state,
        image,
        ingress_policy,
    } = *inputs;
    let exists = state.exists();
    let mut flags = Vec::new();

    match (image, &task.source) {
        (Some(image), _) => flags.extend(command(&["-i", image])),
        (None, DeploymentSource::AppSource { path, .. }) => flags.extend(command(&[
            "--source",
            &path.display().to_string(),
            "--location",
            &context.location,
        ])),
        (None, _) => {}
    }

    // `update` rejects registry flags; credentials go to create/up only.
    if let Some((registry, creds)) = registry_credentials(task).filter(|_| !use_update) {
        flags.extend(command(&[
            "--registry-server",
            &registry.server(),
            "--registry-username",
            &creds.username,
            "--registry-password",
            creds.password.expose_secret(),
        ]));
    }

    let disabled = task.ingress == Some(Ingress::Disabled);
    if !exists {
        if !disabled {
            let ingress = task.ingress.unwrap_or(Ingress::External);
            let port = task.target_port.unwrap_or_else(|| {
                ingress_policy.target_port_for(
                    task.runtime_stack.as_ref().map(|s| s.platform.as_str()),
                )
            });
            flags.extend(command(&[
                "--ingress",
                ingress.as_str(),
                "--target-port",
                &port.to_string(),
            ]));
        }
    } else if !use_update {
        if let Some(ingress) = task.ingress.filter(|i| *i != Ingress::Disabled) {
            flags.extend(command(&["--ingress", ingress.as_str()]));
        }
        if let Some(port) = task.target_port {
            flags.extend(command(&["--target-port", &port.to_string()]));
        }
    }

    if !task.environment_variables.is_empty() {
        flags.push(if use_update {
            "--replace-env-vars".to_owned()
        } else {
            "--env-vars".to_owned()
        });
        flags.extend(task.environment_variables.iter().map(ToString::to_string));
    }

    flags
}

fn registry_credentials(task: &TaskConfig) -> Option<(&Registry, &Credentials)> {
    let registry = task.registry.as_ref()?;
    registry.credentials().map(|creds| (registry, creds))
}

fn app_target(context: &ResourceContext) -> Vec<String> {
    command(&["-n", &context.app_name, "-g", &context.resource_group])
}

fn command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_owned()).collect()
}
