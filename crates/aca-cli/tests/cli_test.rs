use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with every host-provided input variable cleared, so tests
/// are not affected by the CI they run in.
fn aca_deploy() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("aca-deploy");
    for (key, _) in std::env::vars_os() {
        let key = key.to_string_lossy();
        if key.starts_with("INPUT_") || key == "ACA_DEPLOY_CONFIG" {
            cmd.env_remove(key.as_ref());
        }
    }
    cmd
}

// ── Help / Version ──

#[test]
fn shows_help() {
    aca_deploy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Azure Container Apps"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn shows_version() {
    aca_deploy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aca-deploy"));
}

#[test]
fn deploy_help_lists_inputs() {
    aca_deploy()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--app-source-path"))
        .stdout(predicate::str::contains("--yaml-config-path"))
        .stdout(predicate::str::contains("INPUT_IMAGETODEPLOY"));
}

// ── Validate ──

#[test]
fn validate_requires_a_source() {
    aca_deploy()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("appSourcePath"));
}

#[test]
fn validate_rejects_two_registries() {
    aca_deploy()
        .args([
            "validate",
            "--app-source-path",
            ".",
            "--acr-name",
            "myacr",
            "--registry-url",
            "ghcr.io",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("acrName"))
        .stderr(predicate::str::contains("registryUrl"));
}

#[test]
fn validate_rejects_assignment_without_equals() {
    aca_deploy()
        .args([
            "validate",
            "--image-to-deploy",
            "nginx",
            "--environment-variables",
            "FOO=bar BAZ",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("environmentVariables"));
}

#[test]
fn validate_reads_host_input_variables() {
    aca_deploy()
        .arg("validate")
        .env("INPUT_IMAGETODEPLOY", "nginx:1.27")
        .env("INPUT_INGRESS", "internal")
        .assert()
        .success()
        .stdout(predicate::str::contains("Image:     nginx:1.27"))
        .stdout(predicate::str::contains("Ingress:   internal"));
}

#[test]
fn validate_treats_empty_inputs_as_unset() {
    aca_deploy()
        .arg("validate")
        .env("INPUT_IMAGETODEPLOY", "nginx")
        .env("INPUT_YAMLCONFIGPATH", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("Source:    image"));
}

#[test]
fn validate_json_output() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Dockerfile"), "FROM scratch\n").unwrap();

    let output = aca_deploy()
        .args(["validate", "--json", "--registry-url", "ghcr.io"])
        .arg("--app-source-path")
        .arg(tmp.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let scenario: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(scenario["source"], "app-source");
    assert_eq!(scenario["registry"], "ghcr.io");
    assert_eq!(scenario["registry_login"], "none");
    assert!(
        scenario["build"]
            .as_str()
            .unwrap()
            .starts_with("dockerfile")
    );
}

#[test]
fn disable_telemetry_accepts_host_boolean_spellings() {
    for value in ["true", "True", "TRUE", "1", "false", "False", "0", ""] {
        aca_deploy()
            .args(["validate", "--image-to-deploy", "nginx"])
            .env("INPUT_DISABLETELEMETRY", value)
            .assert()
            .success();
    }
}

// ── Deploy ──

#[test]
fn local_failure_is_reported_once() {
    let tmp = TempDir::new().unwrap();

    let output = aca_deploy()
        .current_dir(tmp.path())
        .env_remove("TF_BUILD")
        .env_remove("GITHUB_ACTIONS")
        .args(["deploy", "--disable-telemetry"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("missing required argument").count(), 1);
    assert!(output.stdout.is_empty());
}

// ── Config ──

#[test]
fn invalid_config_file_fails_deploy_before_any_command() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("aca-deploy.toml"), "[naming\n").unwrap();

    aca_deploy()
        .current_dir(tmp.path())
        .args(["deploy", "--image-to-deploy", "nginx", "--disable-telemetry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("aca-deploy.toml"));
}

#[test]
fn missing_explicit_config_fails() {
    aca_deploy()
        .args([
            "deploy",
            "--config",
            "/nonexistent/aca-deploy.toml",
            "--image-to-deploy",
            "nginx",
            "--disable-telemetry",
        ])
        .assert()
        .failure();
}
