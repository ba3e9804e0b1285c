use aca_cloud::error::{CommandError, DeployError, ProvisionError};
use aca_cloud::runner::{CommandOutput, CommandRunner, Tool};
use aca_cloud::{AzClient, ContainerClient, DoctorReport, PackClient};
use aca_core::{AzInvocation, DeploymentPlan, InvocationKind};
use mockall::mock;

mock! {
    Runner {}

    impl CommandRunner for Runner {
        async fn run(&self, tool: Tool, args: &[String]) -> Result<CommandOutput, CommandError>;
        async fn run_streaming(
            &self,
            tool: Tool,
            args: &[String],
        ) -> Result<CommandOutput, CommandError>;
        async fn run_with_stdin(
            &self,
            tool: Tool,
            args: &[String],
            stdin_data: &[u8],
        ) -> Result<CommandOutput, CommandError>;
    }
}

fn invocation(kind: InvocationKind, args: &[&str]) -> AzInvocation {
    AzInvocation {
        kind,
        args: args.iter().map(|a| (*a).to_owned()).collect(),
    }
}

// ── CLI setup ──

#[tokio::test]
async fn prepare_extension_enables_dynamic_install_then_upgrades() {
    let mut mock = MockRunner::new();
    let mut seq = mockall::Sequence::new();

    mock.expect_run()
        .withf(|_, args| args.contains(&"extension.use_dynamic_install=yes_without_prompt".to_owned()))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(CommandOutput::ok("")));
    mock.expect_run()
        .withf(|_, args| args.contains(&"--upgrade".to_owned()))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(CommandOutput::ok("")));

    AzClient::with_runner(mock).prepare_extension().await.unwrap();
}

#[tokio::test]
async fn prepare_extension_failure_is_setup_error() {
    let mut mock = MockRunner::new();
    mock.expect_run().returning(|tool, _| {
        Err(CommandError::NotFound {
            tool,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "az"),
        })
    });

    let result = AzClient::with_runner(mock).prepare_extension().await;

    assert!(matches!(result, Err(ProvisionError::CliSetup { .. })));
}

// ── Plan execution ──

#[tokio::test]
async fn up_is_streamed_and_other_calls_are_captured() {
    let mut mock = MockRunner::new();
    let mut seq = mockall::Sequence::new();

    mock.expect_run_streaming()
        .withf(|tool, args| matches!(tool, Tool::Az) && args[1] == "up")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(CommandOutput::ok("")));
    mock.expect_run()
        .withf(|_, args| args[1] == "ingress")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(CommandOutput::ok("")));

    let plan = DeploymentPlan {
        command_plan: Vec::new(),
        invocations: vec![
            invocation(InvocationKind::Up, &["containerapp", "up", "-n", "web"]),
            invocation(
                InvocationKind::DisableIngress,
                &["containerapp", "ingress", "disable", "-n", "web"],
            ),
        ],
    };

    AzClient::with_runner(mock).execute_plan(plan).await.unwrap();
}

#[tokio::test]
async fn first_failed_invocation_stops_the_plan() {
    let mut mock = MockRunner::new();

    mock.expect_run()
        .withf(|_, args| args[1] == "registry")
        .times(1)
        .returning(|_, _| Ok(CommandOutput::failed(1, "UNAUTHORIZED")));
    mock.expect_run()
        .withf(|_, args| args[1] == "update")
        .never();

    let plan = DeploymentPlan {
        command_plan: Vec::new(),
        invocations: vec![
            invocation(
                InvocationKind::RegistrySet,
                &["containerapp", "registry", "set", "--password", "s3cret"],
            ),
            invocation(InvocationKind::Update, &["containerapp", "update"]),
        ],
    };

    let err = AzClient::with_runner(mock)
        .execute_plan(plan)
        .await
        .unwrap_err();

    let DeployError::Invocation { action, source } = err;
    assert_eq!(action, "registry set");
    let message = source.to_string();
    assert!(message.contains("UNAUTHORIZED"));
    assert!(!message.contains("s3cret"), "password leaked: {message}");
}

// ── Doctor ──

#[tokio::test]
async fn doctor_reports_each_tool() {
    let mut az = MockRunner::new();
    az.expect_run()
        .withf(|_, args| args[0] == "version")
        .returning(|_, _| Ok(CommandOutput::ok("2.61.0\n")));
    az.expect_run()
        .withf(|_, args| args[0] == "account")
        .returning(|_, _| Ok(CommandOutput::ok("dev@example.com\n")));
    az.expect_run()
        .withf(|_, args| args[0] == "extension")
        .returning(|_, _| Ok(CommandOutput::failed(1, "not installed")));

    let mut container = MockRunner::new();
    container
        .expect_run()
        .returning(|_, _| Ok(CommandOutput::ok("Docker version 26.1.0\n")));

    let mut pack = MockRunner::new();
    pack.expect_run().returning(|tool, _| {
        Err(CommandError::NotFound {
            tool,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "pack"),
        })
    });

    let report = DoctorReport::collect(
        &AzClient::with_runner(&az),
        &ContainerClient::with_runner(&container, "docker"),
        &PackClient::with_runner(&pack),
    )
    .await;

    assert_eq!(report.az.detail, "2.61.0");
    assert_eq!(report.account.detail, "dev@example.com");
    assert!(!report.extension.passed);
    assert_eq!(report.container_cli.detail, "Docker version 26.1.0");
    assert!(!report.pack.passed);

    let rendered = report.to_string();
    assert!(rendered.contains("az CLI"));
    assert!(rendered.contains("NG"));
}
