/// Resource names and location resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContext {
    pub app_name: String,
    pub resource_group: String,
    pub location: String,
}

/// Existence snapshot of the target app, taken once before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Exists,
    /// The app must be created into `environment`.
    NotExists { environment: EnvironmentRef },
}

impl AppState {
    pub fn exists(&self) -> bool {
        matches!(self, Self::Exists)
    }
}

/// Hosting environment an app is created into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRef {
    pub name: String,
    pub resource_group: String,
    /// Full resource ID, set when the environment lives outside the app's
    /// resource group and cannot be addressed by name.
    pub id: Option<String>,
    /// Whether the environment existed before this run.
    pub existed: bool,
}

impl EnvironmentRef {
    /// Value for `--environment`: the resource ID when known, else the name.
    pub fn reference(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}
