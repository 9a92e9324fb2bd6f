use std::{os::unix::process::ExitStatusExt, process::Output};

use log::trace;

use crate::dependencies::{Command, DependencyError};

/// Executes dependency commands.
///
/// Stages never spawn processes themselves; they hand a [`Command`] to a
/// runner, so the whole pipeline can be driven against a recording runner in
/// tests.
pub trait CommandRunner {
    /// Runs the command to completion. Stdout is discarded while stdin and
    /// stderr are inherited, so interactive prompts reach the operator.
    /// Succeeds iff the process exits with status zero.
    fn run(&self, command: &Command) -> Result<(), Box<DependencyError>>;

    /// Runs the command to completion and returns its stdout.
    fn output(&self, command: &Command) -> Result<String, Box<DependencyError>>;
}

/// Runs commands on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostRunner;

impl HostRunner {
    fn execute(
        &self,
        command: &Command,
        capture_stdout: bool,
    ) -> Result<Output, Box<DependencyError>> {
        let path = command.dependency().path()?;
        let rendered_command = command.render_command();
        trace!("Executing '{rendered_command}'");

        let expression = duct::cmd(path, command.get_args()).unchecked();
        let expression = if capture_stdout {
            expression.stdout_capture()
        } else {
            expression.stdout_null()
        };

        let output = expression.run().map_err(|inner| {
            Box::new(DependencyError::CouldNotExecute {
                dependency: command.dependency(),
                inner,
            })
        })?;

        let explanation = explain_exit(&output);
        trace!("Executed '{rendered_command}': {explanation}");

        if output.status.code() != Some(0) {
            return Err(Box::new(DependencyError::ExecutionFailed {
                dependency: command.dependency(),
                rendered_command,
                explanation,
            }));
        }

        Ok(output)
    }
}

impl CommandRunner for HostRunner {
    fn run(&self, command: &Command) -> Result<(), Box<DependencyError>> {
        self.execute(command, false).map(|_| ())
    }

    fn output(&self, command: &Command) -> Result<String, Box<DependencyError>> {
        let output = self.execute(command, true)?;
        Ok(String::from_utf8_lossy(&output.stdout).into())
    }
}

/// Produces a string explaining the exit status of the process
fn explain_exit(output: &Output) -> String {
    if let Some(code) = output.status.code() {
        format!("exited with status: {code}")
    } else if let Some(signal) = output.status.signal() {
        format!("terminated by signal: {signal}")
    } else {
        "exited with unknown status".into()
    }
}

#[cfg(test)]
mod tests {
    use crate::dependencies::Dependency;

    use super::*;

    #[test]
    fn test_run() {
        HostRunner
            .run(&Dependency::Echo.cmd().with_arg("Hello, world"))
            .unwrap();

        let error = HostRunner.run(&Dependency::False.cmd()).unwrap_err();
        match *error {
            DependencyError::ExecutionFailed {
                dependency,
                ref rendered_command,
                ref explanation,
            } => {
                assert_eq!(dependency, Dependency::False);
                assert_eq!(rendered_command, "false");
                assert_eq!(explanation, "exited with status: 1");
            }
            ref other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_output() {
        let output = HostRunner
            .output(&Dependency::Echo.cmd().with_args(["Hello,", "world"]))
            .unwrap();
        assert_eq!(output, "Hello, world\n");
    }

    #[test]
    fn test_missing_dependency() {
        let error = HostRunner
            .run(&Dependency::DoesNotExist.cmd())
            .unwrap_err();
        assert!(matches!(*error, DependencyError::NotFound { .. }));
    }
}
