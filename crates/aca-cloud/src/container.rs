use std::path::Path;

use aca_core::KeyValue;
use secrecy::{ExposeSecret, SecretString};

use crate::az::args;
use crate::error::CommandError;
use crate::runner::{CommandRunner, RealRunner, Tool, exec, exec_streaming};

/// Container CLI operations (`docker` or a compatible CLI).
pub struct ContainerClient<R: CommandRunner = RealRunner> {
    runner: R,
    cli: String,
}

impl<R: CommandRunner> ContainerClient<R> {
    /// `cli` is the program name used inside shell pipelines; direct
    /// invocations go through the runner's [`Tool::Container`] mapping.
    pub fn with_runner(runner: R, cli: impl Into<String>) -> Self {
        Self {
            runner,
            cli: cli.into(),
        }
    }

    pub async fn version(&self) -> Result<String, CommandError> {
        exec(&self.runner, Tool::Container, &args(["--version"]))
            .await
            .map(|v| v.trim().to_owned())
    }

    /// Log in with the password piped to stdin, keeping it off the command line.
    pub async fn login(
        &self,
        server: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<(), CommandError> {
        let login_args = args(["login", server, "--username", username, "--password-stdin"]);
        self.runner
            .run_with_stdin(
                Tool::Container,
                &login_args,
                password.expose_secret().as_bytes(),
            )
            .await?
            .into_stdout(Tool::Container, &login_args)?;
        Ok(())
    }

    /// Log in by piping the stdout of `token_command` into
    /// `login --password-stdin`, on the host shell.
    pub async fn login_with_token_command(
        &self,
        token_command: &str,
        server: &str,
        username: &str,
    ) -> Result<(), CommandError> {
        let script = format!(
            "{token_command} | {cli} login {server} --username {username} --password-stdin",
            cli = self.cli,
        );
        exec(&self.runner, Tool::Shell, &[script]).await?;
        Ok(())
    }

    pub async fn build(
        &self,
        dockerfile: &Path,
        tag: &str,
        build_arguments: &[KeyValue],
        context: &Path,
    ) -> Result<(), CommandError> {
        let mut build_args = args(["build", "--file"]);
        build_args.push(dockerfile.display().to_string());
        build_args.extend(args(["--tag", tag]));
        for kv in build_arguments {
            build_args.push("--build-arg".to_owned());
            build_args.push(kv.to_string());
        }
        build_args.push(context.display().to_string());

        exec_streaming(&self.runner, Tool::Container, &build_args).await
    }

    pub async fn push(&self, image: &str) -> Result<(), CommandError> {
        exec_streaming(&self.runner, Tool::Container, &args(["push", image])).await
    }

    /// `run --rm <image> /bin/bash -c <script>`, capturing output.
    pub async fn run_script(&self, image: &str, script: &str) -> Result<String, CommandError> {
        exec(
            &self.runner,
            Tool::Container,
            &args(["run", "--rm", image, "/bin/bash", "-c", script]),
        )
        .await
    }
}
