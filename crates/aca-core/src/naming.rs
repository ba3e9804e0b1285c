//! Deterministic default names derived from the CI build identity.

/// Build identifier and build number of the CI run.
///
/// Synthesized names embed both, so re-running the same build resolves to
/// the same resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIdentity {
    pub build_id: String,
    pub build_number: String,
}

impl BuildIdentity {
    pub fn new(build_id: impl Into<String>, build_number: impl Into<String>) -> Self {
        Self {
            build_id: build_id.into(),
            build_number: build_number.into(),
        }
    }

    /// `<prefix>-<buildId>-<buildNumber>` with every `.` replaced by `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use aca_core::BuildIdentity;
    ///
    /// let build = BuildIdentity::new("123", "20240101.4");
    /// assert_eq!(build.app_name("aca-app"), "aca-app-123-20240101-4");
    /// ```
    pub fn app_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}-{}", self.build_id, self.build_number).replace('.', "-")
    }

    /// Image tag `<buildId>.<buildNumber>`.
    pub fn image_tag(&self) -> String {
        format!("{}.{}", self.build_id, self.build_number)
    }
}

pub fn default_resource_group(app_name: &str) -> String {
    format!("{app_name}-rg")
}

pub fn default_environment(app_name: &str) -> String {
    format!("{app_name}-env")
}

/// Login server of an Azure Container Registry.
pub fn acr_login_server(acr_name: &str) -> String {
    format!("{acr_name}.azurecr.io")
}

/// `<registryServer>/<repository>:<buildId>.<buildNumber>`
pub fn default_image_to_build(
    registry_server: &str,
    repository: &str,
    build: &BuildIdentity,
) -> String {
    format!("{registry_server}/{repository}:{}", build.image_tag())
}

/// Strip whitespace and lowercase, so `East US 2` becomes `eastus2`.
pub fn normalize_location(location: &str) -> String {
    location
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
