use std::fmt;

use crate::az::AzClient;
use crate::container::ContainerClient;
use crate::pack::PackClient;
use crate::runner::CommandRunner;

/// Host tool availability, as reported by `aca-deploy doctor`.
#[derive(Debug, Default)]
pub struct DoctorReport {
    pub az: CheckResult,
    pub account: CheckResult,
    pub extension: CheckResult,
    pub container_cli: CheckResult,
    /// Informational: installed on demand when a buildpack build runs.
    pub pack: CheckResult,
    pub config_file: CheckResult,
}

impl DoctorReport {
    pub async fn collect<R: CommandRunner>(
        az: &AzClient<R>,
        container: &ContainerClient<R>,
        pack: &PackClient<R>,
    ) -> Self {
        let mut report = Self::default();

        report.az = match az.version().await {
            Ok(v) => CheckResult::ok(&v),
            Err(e) => CheckResult::fail(&e.to_string()),
        };

        report.account = match az.account().await {
            Ok(a) if !a.is_empty() => CheckResult::ok(&a),
            Ok(_) => CheckResult::fail("no active account"),
            Err(e) => {
                tracing::debug!(error = %e, "az account show failed");
                CheckResult::fail("not logged in (run `az login`)")
            }
        };

        report.extension = match az.extension_version().await {
            Ok(v) => CheckResult::ok(&v),
            Err(e) => {
                tracing::debug!(error = %e, "containerapp extension missing");
                CheckResult::fail("not installed (installed on first deploy)")
            }
        };

        report.container_cli = match container.version().await {
            Ok(v) => CheckResult::ok(&v),
            Err(e) => CheckResult::fail(&e.to_string()),
        };

        report.pack = match pack.version().await {
            Ok(v) => CheckResult::ok(&v),
            Err(e) => {
                tracing::debug!(error = %e, "pack missing");
                CheckResult::fail("not installed (installed on demand)")
            }
        };

        report
    }

    /// Required checks only; `pack` and the extension are installed on demand.
    pub fn all_passed(&self) -> bool {
        self.az.passed && self.account.passed && self.container_cli.passed && self.config_file.passed
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("az CLI", &self.az),
            ("Account", &self.account),
            ("containerapp ext", &self.extension),
            ("Container CLI", &self.container_cli),
            ("pack CLI", &self.pack),
            ("aca-deploy.toml", &self.config_file),
        ];
        for (label, check) in rows {
            writeln!(f, "{label:<18} {:<3} {}", check.icon(), check.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}
