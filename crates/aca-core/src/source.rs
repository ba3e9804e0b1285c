use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// How an application source tree is turned into an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Build with the container CLI from this Dockerfile.
    Dockerfile(PathBuf),
    /// No Dockerfile found; build with the buildpack builder.
    Builder,
}

/// Pick the build strategy for `source_root`.
///
/// An explicit `dockerfile_path` (relative to the source root) wins when it
/// exists; otherwise a `Dockerfile` at the root is used; otherwise the
/// builder.
pub fn resolve_build_strategy(source_root: &Path, dockerfile_path: Option<&Path>) -> BuildStrategy {
    if let Some(explicit) = dockerfile_path {
        let candidate = source_root.join(explicit);
        if candidate.is_file() {
            return BuildStrategy::Dockerfile(candidate);
        }
        tracing::warn!(
            path = %candidate.display(),
            "dockerfile path does not exist, probing source root"
        );
    }

    let root_dockerfile = source_root.join("Dockerfile");
    if root_dockerfile.is_file() {
        BuildStrategy::Dockerfile(root_dockerfile)
    } else {
        BuildStrategy::Builder
    }
}

/// Runtime stack given as `platform:version`, e.g. `python:3.11`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStack {
    pub platform: String,
    pub version: String,
}

impl RuntimeStack {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().split_once(':') {
            Some((platform, version)) if !platform.is_empty() && !version.is_empty() => Ok(Self {
                platform: platform.to_ascii_lowercase(),
                version: version.to_owned(),
            }),
            _ => Err(Error::invalid(
                "runtimeStack",
                format!("expected platform:version, got {raw:?}"),
            )),
        }
    }

    /// Platform name as understood by the builder (`dotnetcore` is `dotnet`).
    pub fn builder_platform(&self) -> &str {
        match self.platform.as_str() {
            "dotnetcore" => "dotnet",
            other => other,
        }
    }
}

impl fmt::Display for RuntimeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.version)
    }
}
