//! Registry login for the local container CLI.

use aca_core::Registry;

use crate::container::ContainerClient;
use crate::error::AuthError;
use crate::runner::CommandRunner;

/// Username the managed registry expects alongside an access token.
const TOKEN_USERNAME: &str = "00000000-0000-0000-0000-000000000000";

/// How the container CLI was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    /// No credentials to use; later pushes rely on existing CLI state.
    Skipped,
    Password,
    AccessToken,
}

pub struct RegistryAuthenticator<'a, R: CommandRunner> {
    container: &'a ContainerClient<R>,
}

impl<'a, R: CommandRunner> RegistryAuthenticator<'a, R> {
    pub fn new(container: &'a ContainerClient<R>) -> Self {
        Self { container }
    }

    pub async fn authenticate(&self, registry: &Registry) -> Result<LoginMethod, AuthError> {
        let server = registry.server();
        let login_failed = |source| AuthError::Login {
            server: server.clone(),
            source,
        };

        if let Some(creds) = registry.credentials() {
            tracing::info!(%server, "logging in to registry with username and password");
            self.container
                .login(&server, &creds.username, &creds.password)
                .await
                .map_err(login_failed)?;
            return Ok(LoginMethod::Password);
        }

        match registry {
            Registry::External { .. } => {
                tracing::info!(%server, "no registry credentials, skipping login");
                Ok(LoginMethod::Skipped)
            }
            Registry::Managed { name, .. } => {
                if !is_registry_name(name) {
                    return Err(AuthError::InvalidRegistryName(name.clone()));
                }
                tracing::info!(%server, "logging in to registry with an access token");
                let token_command = format!(
                    "az acr login --name {name} --expose-token --output tsv --query accessToken"
                );
                self.container
                    .login_with_token_command(&token_command, &server, TOKEN_USERNAME)
                    .await
                    .map_err(login_failed)?;
                Ok(LoginMethod::AccessToken)
            }
        }
    }
}

/// Registry names are interpolated into a shell script, so only
/// alphanumerics are accepted.
fn is_registry_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_are_alphanumeric() {
        assert!(is_registry_name("myacr01"));
        assert!(!is_registry_name(""));
        assert!(!is_registry_name("my-acr"));
        assert!(!is_registry_name("acr;rm -rf /"));
    }
}
