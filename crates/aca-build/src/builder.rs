use std::fmt;
use std::path::Path;

use aca_cloud::error::CommandError;
use aca_cloud::runner::CommandRunner;
use aca_cloud::{ContainerClient, PackClient};
use aca_core::source::{BuildStrategy, resolve_build_strategy};
use aca_core::{BuilderConfig, IngressConfig, KeyValue, TaskConfig};

/// Which strategy produced the image; reported as the telemetry scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    Builder,
    Dockerfile,
}

impl BuildKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Builder => "used-builder",
            Self::Dockerfile => "used-dockerfile",
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to set up the pack CLI")]
    PackSetup { source: CommandError },

    #[error(
        "no builder image is configured for stack '{stack}' (configured stacks: {})",
        .configured.join(", ")
    )]
    UnknownBuilderStack {
        stack: String,
        configured: Vec<String>,
    },

    #[error("no builder image could build the application (attempted: {})", .attempted.join(", "))]
    NoBuilderAvailable { attempted: Vec<String> },

    #[error("image build from {dockerfile} failed")]
    Dockerfile {
        dockerfile: String,
        source: CommandError,
    },

    #[error("failed to push image '{image}'")]
    Push { image: String, source: CommandError },
}

/// Builds an application source tree into an image and pushes it.
pub struct ImageBuilder<'a, R: CommandRunner> {
    container: &'a ContainerClient<R>,
    pack: &'a PackClient<R>,
    builder: &'a BuilderConfig,
    ingress: &'a IngressConfig,
}

impl<'a, R: CommandRunner> ImageBuilder<'a, R> {
    pub fn new(
        container: &'a ContainerClient<R>,
        pack: &'a PackClient<R>,
        builder: &'a BuilderConfig,
        ingress: &'a IngressConfig,
    ) -> Self {
        Self {
            container,
            pack,
            builder,
            ingress,
        }
    }

    /// Build `source` into `image` and push it. Nothing is pushed when the
    /// build fails.
    pub async fn build_and_push(
        &self,
        task: &TaskConfig,
        source: &Path,
        image: &str,
    ) -> Result<BuildKind, BuildError> {
        let kind = match resolve_build_strategy(source, task.dockerfile_path.as_deref()) {
            BuildStrategy::Dockerfile(dockerfile) => {
                tracing::info!(dockerfile = %dockerfile.display(), %image, "building image from Dockerfile");
                self.container
                    .build(&dockerfile, image, &task.build_arguments, source)
                    .await
                    .map_err(|e| BuildError::Dockerfile {
                        dockerfile: dockerfile.display().to_string(),
                        source: e,
                    })?;
                BuildKind::Dockerfile
            }
            BuildStrategy::Builder => {
                self.build_with_builder(task, source, image).await?;
                BuildKind::Builder
            }
        };

        tracing::info!(%image, "pushing image");
        self.container
            .push(image)
            .await
            .map_err(|e| BuildError::Push {
                image: image.to_owned(),
                source: e,
            })?;

        Ok(kind)
    }

    async fn build_with_builder(
        &self,
        task: &TaskConfig,
        source: &Path,
        image: &str,
    ) -> Result<(), BuildError> {
        let candidates = self.builder.candidates(task.builder_stack.as_deref());
        if candidates.is_empty() {
            let mut configured: Vec<String> =
                self.builder.images.iter().map(|b| b.stack.clone()).collect();
            configured.dedup();
            return Err(BuildError::UnknownBuilderStack {
                stack: task.builder_stack.clone().unwrap_or_else(|| "any".to_owned()),
                configured,
            });
        }

        if self.builder.install_pack {
            self.pack
                .ensure_installed(&self.builder.pack_version)
                .await
                .map_err(|e| BuildError::PackSetup { source: e })?;
        }
        self.pack
            .enable_experimental()
            .await
            .map_err(|e| BuildError::PackSetup { source: e })?;

        let env = self.builder_env(task);
        let mut attempted = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            tracing::info!(builder = %candidate.image, stack = %candidate.stack, %image, "building image with builder");
            attempted.push(candidate.image.clone());

            match self.try_builder(&candidate.image, image, source, &env).await {
                Ok(()) => return Ok(()),
                Err(e) => tracing::warn!(error = %e, builder = %candidate.image, "builder failed, trying next"),
            }
        }

        Err(BuildError::NoBuilderAvailable { attempted })
    }

    async fn try_builder(
        &self,
        builder: &str,
        image: &str,
        source: &Path,
        env: &[KeyValue],
    ) -> Result<(), CommandError> {
        self.pack.set_default_builder(builder).await?;
        self.pack.build(image, source, builder, env).await
    }

    /// `PLATFORM_NAME`/`PLATFORM_VERSION`, `ORYX_RUNTIME_PORT`, then user
    /// build arguments.
    fn builder_env(&self, task: &TaskConfig) -> Vec<KeyValue> {
        let mut env = Vec::new();

        if let Some(stack) = &task.runtime_stack {
            env.push(KeyValue::new("PLATFORM_NAME", stack.builder_platform()));
            env.push(KeyValue::new("PLATFORM_VERSION", &stack.version));
        }

        let port = task.target_port.unwrap_or_else(|| {
            self.ingress
                .target_port_for(task.runtime_stack.as_ref().map(|s| s.platform.as_str()))
        });
        env.push(KeyValue::new("ORYX_RUNTIME_PORT", port.to_string()));

        env.extend(task.build_arguments.iter().cloned());
        env
    }
}
