//! Shared command-runner mock for the command tests.

use std::sync::{Arc, Mutex};

use aca_cloud::error::CommandError;
use aca_cloud::runner::{CommandOutput, CommandRunner, Tool};
use mockall::mock;

mock! {
    pub Runner {}

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

pub(crate) type Calls = Arc<Mutex<Vec<String>>>;

/// Mock that records every command line and answers with `respond`.
pub(crate) fn recording(respond: fn(&str) -> CommandOutput) -> (MockRunner, Calls) {
    let calls: Calls = Arc::default();
    let mut mock = MockRunner::new();

    let log = calls.clone();
    mock.expect_run().returning(move |tool, args| {
        let line = format!("{tool}: {}", args.join(" "));
        log.lock().unwrap().push(line.clone());
        Ok(respond(&line))
    });
    let log = calls.clone();
    mock.expect_run_streaming().returning(move |tool, args| {
        let line = format!("{tool}: {}", args.join(" "));
        log.lock().unwrap().push(line.clone());
        Ok(respond(&line))
    });
    let log = calls.clone();
    mock.expect_run_with_stdin().returning(move |tool, args, _| {
        let line = format!("{tool}: {}", args.join(" "));
        log.lock().unwrap().push(line.clone());
        Ok(respond(&line))
    });

    (mock, calls)
}

pub(crate) fn count(calls: &Calls, prefix: &str) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c.starts_with(prefix))
        .count()
}

pub(crate) fn new_app(line: &str) -> CommandOutput {
    if line.starts_with("az: containerapp show") {
        CommandOutput::failed(3, "ResourceNotFound")
    } else if line.starts_with("az: containerapp env list") {
        CommandOutput::ok("team-env\n")
    } else {
        CommandOutput::ok("")
    }
}

pub(crate) fn existing_app(line: &str) -> CommandOutput {
    CommandOutput::ok(if line.contains("--query location") {
        "eastus\n"
    } else {
        ""
    })
}
