//! CI host integration: detection, build identity, secret masking, and
//! failure reporting.

use aca_core::BuildIdentity;

/// CI system the task runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    AzurePipelines,
    GitHubActions,
    Local,
}

impl Host {
    pub fn detect() -> Self {
        Self::detect_with(env_var)
    }

    fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if lookup("TF_BUILD").is_some() {
            Self::AzurePipelines
        } else if lookup("GITHUB_ACTIONS").is_some() {
            Self::GitHubActions
        } else {
            Self::Local
        }
    }

    /// Build id and number for default names. Explicit values win over the
    /// host's variables.
    pub fn build_identity(
        self,
        build_id: Option<String>,
        build_number: Option<String>,
    ) -> BuildIdentity {
        self.build_identity_with(build_id, build_number, env_var)
    }

    fn build_identity_with(
        self,
        build_id: Option<String>,
        build_number: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> BuildIdentity {
        let (id_var, number_var) = match self {
            Self::AzurePipelines => ("BUILD_BUILDID", "BUILD_BUILDNUMBER"),
            Self::GitHubActions => ("GITHUB_RUN_ID", "GITHUB_RUN_NUMBER"),
            Self::Local => ("", ""),
        };

        let id = build_id
            .or_else(|| lookup(id_var))
            .unwrap_or_else(|| "local".to_owned());
        let number = build_number
            .or_else(|| lookup(number_var))
            .unwrap_or_else(|| "0".to_owned());
        BuildIdentity::new(id, number)
    }

    /// Logging command that hides `value` in all later host output.
    pub fn mask_command(self, value: &str) -> Option<String> {
        match self {
            Self::AzurePipelines => Some(format!("##vso[task.setsecret]{value}")),
            Self::GitHubActions => Some(format!("::add-mask::{value}")),
            Self::Local => None,
        }
    }

    pub fn mask_secret(self, value: &str) {
        if let Some(command) = self.mask_command(value) {
            println!("{command}");
        }
    }

    /// Line that marks the run failed with `message`. Local runs have none;
    /// the error returned from `main` is the report.
    pub fn failure_command(self, message: &str) -> Option<String> {
        let message = single_line(message);
        match self {
            Self::AzurePipelines => Some(format!("##vso[task.complete result=Failed;]{message}")),
            Self::GitHubActions => Some(format!("::error::{message}")),
            Self::Local => None,
        }
    }

    pub fn report_failure(self, message: &str) {
        if let Some(line) = self.failure_command(message) {
            println!("{line}");
        }
    }
}

/// Host logging commands end at the first newline.
fn single_line(message: &str) -> String {
    message.lines().map(str::trim).collect::<Vec<_>>().join(" ")
}

fn env_var(key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    std::env::var_os(key)
        .map(|v| v.to_string_lossy().into_owned())
        .filter(|v| !v.is_empty())
}
