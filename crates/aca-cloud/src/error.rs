use crate::runner::Tool;

/// Failure of a single external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{tool} could not be started (is it installed and on PATH?)")]
    NotFound { tool: Tool, source: std::io::Error },

    #[error("{tool} command failed with exit code {exit_code}: {args}\n{stderr}")]
    Failed {
        tool: Tool,
        /// Redacted, space-joined arguments
        args: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("{tool} output was not valid UTF-8")]
    InvalidUtf8 {
        tool: Tool,
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write to {tool} stdin")]
    StdinWrite { tool: Tool, source: std::io::Error },
}

/// Resource group, environment, or CLI setup failure. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("failed to prepare the az containerapp extension")]
    CliSetup { source: CommandError },

    #[error("failed to create resource group '{name}'")]
    ResourceGroup { name: String, source: CommandError },

    #[error("failed to create container app environment '{name}'")]
    Environment { name: String, source: CommandError },
}

/// Registry login failure. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to log in to registry '{server}'")]
    Login { server: String, source: CommandError },

    #[error("invalid container registry name {0:?}")]
    InvalidRegistryName(String),
}

/// Terminal create/update call failure.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("container app {action} failed")]
    Invocation {
        action: &'static str,
        source: CommandError,
    },
}
