//! External tool operations for aca-deploy: the Azure CLI, the container
//! CLI, and `pack`. Every subprocess goes through [`CommandRunner`].

pub mod az;
pub mod container;
pub mod doctor;
pub mod error;
pub mod pack;
pub mod provision;
pub mod registry;
pub mod runner;

pub use az::AzClient;
pub use container::ContainerClient;
pub use doctor::{CheckResult, DoctorReport};
pub use error::{AuthError, CommandError, DeployError, ProvisionError};
pub use pack::PackClient;
pub use provision::{Provisioned, ResourceProvisioner};
pub use registry::{LoginMethod, RegistryAuthenticator};
pub use runner::{CommandOutput, CommandRunner, RealRunner, Tool};
