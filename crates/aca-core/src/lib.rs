//! Core types and decision logic for aca-deploy.
//!
//! This crate turns raw task inputs into a validated [`TaskConfig`]
//! ([`validate`]), derives default resource names ([`naming`]), loads the
//! `aca-deploy.toml` policy file ([`DeployConfig`]), and plans the
//! `az containerapp` calls of a deployment ([`plan`]). Nothing here spawns
//! a process.

pub mod config;
pub mod context;
pub mod error;
pub mod inputs;
pub mod naming;
pub mod plan;
pub mod redact;
pub mod source;
pub mod tokenize;
pub mod validate;

pub use config::{
    BuilderConfig, BuilderImage, ContainerConfig, DeployConfig, IngressConfig, LocationConfig,
    NamingConfig, TelemetryConfig,
};
pub use context::{AppState, EnvironmentRef, ResourceContext};
pub use error::{Error, Result};
pub use inputs::{
    Credentials, DeploymentSource, Ingress, Registry, ResourceRequest, TaskConfig, TaskInputs,
};
pub use naming::BuildIdentity;
pub use plan::{AzInvocation, DeploymentPlan, InvocationKind, PlanInputs};
pub use source::{BuildStrategy, RuntimeStack};
pub use tokenize::KeyValue;
pub use validate::validate;
