mod deploy;
mod deploy_pipeline;
mod doctor;
#[cfg(test)]
mod test_support;
mod validate;

use std::path::Path;

use aca_core::DeployConfig;

pub use deploy::deploy;
pub use doctor::doctor;
pub use validate::validate;

/// Load the policy file: `--config` when given, else `./aca-deploy.toml`
/// when present, else defaults.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<DeployConfig> {
    let config = match path {
        Some(path) => DeployConfig::load_from(path)?,
        None => DeployConfig::load(Path::new("."))?,
    };
    Ok(config)
}
