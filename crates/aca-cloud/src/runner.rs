use std::fmt;
use std::process::Stdio;

use aca_core::redact::redact_args;

use crate::error::CommandError;

/// External tools driven by aca-deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Azure CLI
    Az,
    /// Container CLI (`docker` by default)
    Container,
    /// Cloud Native Buildpacks CLI
    Pack,
    /// Host shell; the single argument is a script
    Shell,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Az => "az",
            Self::Container => "container CLI",
            Self::Pack => "pack",
            Self::Shell => "shell",
        })
    }
}

/// Exit code and captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout on success, [`CommandError::Failed`] otherwise.
    pub fn into_stdout(self, tool: Tool, args: &[String]) -> Result<String, CommandError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(CommandError::Failed {
                tool,
                args: redact_args(args).join(" "),
                exit_code: self.exit_code,
                stderr: self.stderr.trim().to_owned(),
            })
        }
    }
}

/// The single effect boundary: every subprocess goes through here.
///
/// A non-zero exit is reported in [`CommandOutput::exit_code`], not as an
/// error; `Err` means the command could not be run at all. Production code
/// uses [`RealRunner`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture its output.
    async fn run(&self, tool: Tool, args: &[String]) -> Result<CommandOutput, CommandError>;

    /// Run a command, streaming output to the terminal. Captured output is empty.
    async fn run_streaming(&self, tool: Tool, args: &[String])
    -> Result<CommandOutput, CommandError>;

    /// Run a command with data piped to stdin.
    async fn run_with_stdin(
        &self,
        tool: Tool,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<CommandOutput, CommandError>;
}

impl<R: CommandRunner> CommandRunner for &R {
    async fn run(&self, tool: Tool, args: &[String]) -> Result<CommandOutput, CommandError> {
        (**self).run(tool, args).await
    }

    async fn run_streaming(
        &self,
        tool: Tool,
        args: &[String],
    ) -> Result<CommandOutput, CommandError> {
        (**self).run_streaming(tool, args).await
    }

    async fn run_with_stdin(
        &self,
        tool: Tool,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<CommandOutput, CommandError> {
        (**self).run_with_stdin(tool, args, stdin_data).await
    }
}

/// Run and require success, returning stdout.
pub async fn exec<R: CommandRunner>(
    runner: &R,
    tool: Tool,
    args: &[String],
) -> Result<String, CommandError> {
    runner.run(tool, args).await?.into_stdout(tool, args)
}

/// Run with streamed output and require success.
pub async fn exec_streaming<R: CommandRunner>(
    runner: &R,
    tool: Tool,
    args: &[String],
) -> Result<(), CommandError> {
    runner
        .run_streaming(tool, args)
        .await?
        .into_stdout(tool, args)
        .map(|_| ())
}

/// Host shell used for [`Tool::Shell`] scripts: PowerShell on Windows,
/// POSIX `sh` elsewhere.
pub fn host_shell() -> (&'static str, &'static [&'static str]) {
    if cfg!(windows) {
        ("pwsh", &["-NoProfile", "-NonInteractive", "-Command"])
    } else {
        ("sh", &["-c"])
    }
}

/// Real subprocess runner.
#[derive(Debug, Clone)]
pub struct RealRunner {
    container_cli: String,
}

impl RealRunner {
    pub fn new(container_cli: impl Into<String>) -> Self {
        Self {
            container_cli: container_cli.into(),
        }
    }

    fn command(&self, tool: Tool, args: &[String]) -> tokio::process::Command {
        tracing::debug!(%tool, args = ?redact_args(args), "running");

        let mut cmd = match tool {
            Tool::Az => tokio::process::Command::new("az"),
            Tool::Container => tokio::process::Command::new(&self.container_cli),
            Tool::Pack => tokio::process::Command::new("pack"),
            Tool::Shell => {
                let (program, prefix) = host_shell();
                let mut cmd = tokio::process::Command::new(program);
                cmd.args(prefix);
                cmd
            }
        };
        cmd.args(args);
        cmd
    }
}

impl CommandRunner for RealRunner {
    async fn run(&self, tool: Tool, args: &[String]) -> Result<CommandOutput, CommandError> {
        let output = self
            .command(tool, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CommandError::NotFound { tool, source: e })?;

        Ok(CommandOutput {
            exit_code: exit_code(output.status),
            stdout: String::from_utf8(output.stdout)
                .map_err(|e| CommandError::InvalidUtf8 { tool, source: e })?,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn run_streaming(
        &self,
        tool: Tool,
        args: &[String],
    ) -> Result<CommandOutput, CommandError> {
        let status = self
            .command(tool, args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| CommandError::NotFound { tool, source: e })?;

        Ok(CommandOutput {
            exit_code: exit_code(status),
            stdout: String::new(),
            stderr: format!("exit status: {status}"),
        })
    }

    async fn run_with_stdin(
        &self,
        tool: Tool,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<CommandOutput, CommandError> {
        use tokio::io::AsyncWriteExt;

        let mut child = self
            .command(tool, args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CommandError::NotFound { tool, source: e })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(stdin_data)
                .await
                .map_err(|e| CommandError::StdinWrite { tool, source: e })?;
            stdin
                .shutdown()
                .await
                .map_err(|e| CommandError::StdinWrite { tool, source: e })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CommandError::NotFound { tool, source: e })?;

        Ok(CommandOutput {
            exit_code: exit_code(output.status),
            stdout: String::from_utf8(output.stdout)
                .map_err(|e| CommandError::InvalidUtf8 { tool, source: e })?,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Signal-terminated processes have no code; report them as -1.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
