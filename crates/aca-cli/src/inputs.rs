use aca_core::TaskInputs;
use clap::Args;

/// Task inputs. Every flag can also be set through the `INPUT_<NAME>`
/// variable the CI host exports for task inputs.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Application source directory to build
    #[arg(long, env = "INPUT_APPSOURCEPATH")]
    pub app_source_path: Option<String>,

    /// Azure Container Registry name
    #[arg(long, env = "INPUT_ACRNAME")]
    pub acr_name: Option<String>,

    /// Azure Container Registry username
    #[arg(long, env = "INPUT_ACRUSERNAME")]
    pub acr_username: Option<String>,

    /// Azure Container Registry password
    #[arg(long, env = "INPUT_ACRPASSWORD", hide_env_values = true)]
    pub acr_password: Option<String>,

    /// Login server of any other container registry
    #[arg(long, env = "INPUT_REGISTRYURL")]
    pub registry_url: Option<String>,

    /// Registry username
    #[arg(long, env = "INPUT_REGISTRYUSERNAME")]
    pub registry_username: Option<String>,

    /// Registry password
    #[arg(long, env = "INPUT_REGISTRYPASSWORD", hide_env_values = true)]
    pub registry_password: Option<String>,

    /// Image to deploy
    #[arg(long, env = "INPUT_IMAGETODEPLOY")]
    pub image_to_deploy: Option<String>,

    /// Name of the image built from the application source
    #[arg(long, env = "INPUT_IMAGETOBUILD")]
    pub image_to_build: Option<String>,

    /// Container app YAML definition
    #[arg(long, env = "INPUT_YAMLCONFIGPATH")]
    pub yaml_config_path: Option<String>,

    /// Build arguments as space-separated KEY=VALUE pairs
    #[arg(long, env = "INPUT_BUILDARGUMENTS")]
    pub build_arguments: Option<String>,

    /// Dockerfile path relative to the application source
    #[arg(long, env = "INPUT_DOCKERFILEPATH")]
    pub dockerfile_path: Option<String>,

    /// Runtime stack for builder builds, as platform:version
    #[arg(long, env = "INPUT_RUNTIMESTACK")]
    pub runtime_stack: Option<String>,

    /// OS stack of the builder image
    #[arg(long, env = "INPUT_BUILDERSTACK")]
    pub builder_stack: Option<String>,

    /// Container app name
    #[arg(long, env = "INPUT_CONTAINERAPPNAME")]
    pub container_app_name: Option<String>,

    /// Deployment location
    #[arg(long, env = "INPUT_LOCATION")]
    pub location: Option<String>,

    /// Resource group of the container app
    #[arg(long, env = "INPUT_RESOURCEGROUP")]
    pub resource_group: Option<String>,

    /// Container app environment
    #[arg(long, env = "INPUT_CONTAINERAPPENVIRONMENT")]
    pub container_app_environment: Option<String>,

    /// Resource group of the container app environment
    #[arg(long, env = "INPUT_CONTAINERAPPENVIRONMENTRESOURCEGROUP")]
    pub container_app_environment_resource_group: Option<String>,

    /// Ingress: external, internal, or disabled
    #[arg(long, env = "INPUT_INGRESS")]
    pub ingress: Option<String>,

    /// Port the app listens on
    #[arg(long, env = "INPUT_TARGETPORT")]
    pub target_port: Option<String>,

    /// App environment variables as space-separated KEY=VALUE pairs
    #[arg(long, env = "INPUT_ENVIRONMENTVARIABLES")]
    pub environment_variables: Option<String>,

    /// Do not send run telemetry
    #[arg(
        long,
        env = "INPUT_DISABLETELEMETRY",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub disable_telemetry: bool,
}

impl InputArgs {
    /// Non-empty credential values the host should mask.
    pub fn secrets(&self) -> impl Iterator<Item = &str> {
        [&self.acr_password, &self.registry_password]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

impl From<InputArgs> for TaskInputs {
    fn from(args: InputArgs) -> Self {
        Self {
            app_source_path: args.app_source_path,
            acr_name: args.acr_name,
            acr_username: args.acr_username,
            acr_password: args.acr_password,
            registry_url: args.registry_url,
            registry_username: args.registry_username,
            registry_password: args.registry_password,
            image_to_deploy: args.image_to_deploy,
            image_to_build: args.image_to_build,
            yaml_config_path: args.yaml_config_path,
            build_arguments: args.build_arguments,
            dockerfile_path: args.dockerfile_path,
            runtime_stack: args.runtime_stack,
            builder_stack: args.builder_stack,
            container_app_name: args.container_app_name,
            location: args.location,
            resource_group: args.resource_group,
            container_app_environment: args.container_app_environment,
            container_app_environment_resource_group: args
                .container_app_environment_resource_group,
            ingress: args.ingress,
            target_port: args.target_port,
            environment_variables: args.environment_variables,
            disable_telemetry: args.disable_telemetry,
        }
    }
}
