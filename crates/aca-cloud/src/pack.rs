use std::path::Path;

use aca_core::KeyValue;

use crate::az::args;
use crate::error::CommandError;
use crate::runner::{CommandRunner, RealRunner, Tool, exec, exec_streaming};

/// Cloud Native Buildpacks `pack` CLI operations.
pub struct PackClient<R: CommandRunner = RealRunner> {
    runner: R,
}

impl<R: CommandRunner> PackClient<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub async fn version(&self) -> Result<String, CommandError> {
        exec(&self.runner, Tool::Pack, &args(["version"]))
            .await
            .map(|v| v.trim().to_owned())
    }

    /// Install `pack` at `version` unless some version is already on PATH.
    pub async fn ensure_installed(&self, version: &str) -> Result<(), CommandError> {
        match self.version().await {
            Ok(installed) => {
                tracing::debug!(%installed, "pack already installed");
                return Ok(());
            }
            Err(e) => tracing::info!(error = %e, version, "installing pack"),
        }

        exec(&self.runner, Tool::Shell, &[install_script(version)]).await?;
        Ok(())
    }

    pub async fn enable_experimental(&self) -> Result<(), CommandError> {
        exec(&self.runner, Tool::Pack, &args(["config", "experimental", "true"])).await?;
        Ok(())
    }

    pub async fn set_default_builder(&self, builder: &str) -> Result<(), CommandError> {
        exec(
            &self.runner,
            Tool::Pack,
            &args(["config", "default-builder", builder]),
        )
        .await?;
        Ok(())
    }

    pub async fn build(
        &self,
        image: &str,
        source: &Path,
        builder: &str,
        env: &[KeyValue],
    ) -> Result<(), CommandError> {
        let mut build_args = args(["build", image, "--path"]);
        build_args.push(source.display().to_string());
        build_args.extend(args(["--builder", builder]));
        for kv in env {
            build_args.push("--env".to_owned());
            build_args.push(kv.to_string());
        }

        exec_streaming(&self.runner, Tool::Pack, &build_args).await
    }
}

const RELEASES: &str = "https://github.com/buildpacks/pack/releases/download";

fn install_script(version: &str) -> String {
    if cfg!(windows) {
        format!(
            "$dir = Join-Path $env:USERPROFILE 'pack'; \
             New-Item -ItemType Directory -Force -Path $dir | Out-Null; \
             $zip = Join-Path $dir 'pack.zip'; \
             Invoke-WebRequest -Uri '{RELEASES}/v{version}/pack-v{version}-windows.zip' -OutFile $zip; \
             Expand-Archive -Path $zip -DestinationPath $dir -Force; \
             Remove-Item $zip"
        )
    } else {
        format!(
            "(curl -sSL '{RELEASES}/v{version}/pack-v{version}-linux.tgz' | \
             tar -C /usr/local/bin/ --no-same-owner -xzv pack)"
        )
    }
}
