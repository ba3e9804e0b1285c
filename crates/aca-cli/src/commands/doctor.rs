use std::path::Path;

use aca_cloud::{AzClient, CheckResult, ContainerClient, DoctorReport, PackClient, RealRunner};
use aca_core::DeployConfig;
use aca_core::config::CONFIG_FILE_NAME;

pub async fn doctor(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path);

    let (container_cli, config_check) = match &config {
        Ok(config) => {
            let detail = match config_path {
                Some(path) => format!("{} loaded", path.display()),
                None if Path::new(CONFIG_FILE_NAME).exists() => "Found".to_owned(),
                None => "Not found (defaults used)".to_owned(),
            };
            (config.container.cli.clone(), CheckResult::ok(&detail))
        }
        Err(e) => (
            DeployConfig::default().container.cli,
            CheckResult::fail(&format!("{e:#}")),
        ),
    };

    let runner = RealRunner::new(container_cli.clone());
    let mut report = DoctorReport::collect(
        &AzClient::with_runner(&runner),
        &ContainerClient::with_runner(&runner, container_cli),
        &PackClient::with_runner(&runner),
    )
    .await;
    report.config_file = config_check;

    println!();
    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed, see above for details");
    }

    Ok(())
}
