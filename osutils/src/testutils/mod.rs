use std::{cell::RefCell, io};

use crate::{
    dependencies::{Command, DependencyError},
    exe::CommandRunner,
};

struct Failure {
    needle: String,
    remaining: Option<usize>,
    spawn: bool,
}

/// Records the commands it is asked to run instead of running them.
///
/// Failures are injected by substring match on the rendered command line.
#[derive(Default)]
pub struct MockRunner {
    invocations: RefCell<Vec<String>>,
    failures: RefCell<Vec<Failure>>,
    output: String,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every command whose rendered form contains `needle`.
    pub fn failing_on(self, needle: impl Into<String>) -> Self {
        self.failures.borrow_mut().push(Failure {
            needle: needle.into(),
            remaining: None,
            spawn: false,
        });
        self
    }

    /// Fails every command whose rendered form contains `needle` as if the
    /// process could not be started at all.
    pub fn unable_to_spawn(self, needle: impl Into<String>) -> Self {
        self.failures.borrow_mut().push(Failure {
            needle: needle.into(),
            remaining: None,
            spawn: true,
        });
        self
    }

    /// Fails the first `times` commands whose rendered form contains
    /// `needle`, then lets them succeed.
    pub fn failing_times(self, needle: impl Into<String>, times: usize) -> Self {
        self.failures.borrow_mut().push(Failure {
            needle: needle.into(),
            remaining: Some(times),
            spawn: false,
        });
        self
    }

    /// Stdout returned by [`CommandRunner::output`].
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Rendered command lines, in invocation order.
    pub fn invocations(&self) -> Vec<String> {
        self.invocations.borrow().clone()
    }

    fn record(&self, command: &Command) -> Result<(), Box<DependencyError>> {
        let rendered_command = command.render_command();
        self.invocations.borrow_mut().push(rendered_command.clone());

        let mut failures = self.failures.borrow_mut();
        let mut injected = None;
        for failure in failures
            .iter_mut()
            .filter(|failure| rendered_command.contains(&failure.needle))
        {
            match failure.remaining {
                None => {}
                Some(0) => continue,
                Some(ref mut remaining) => *remaining -= 1,
            }
            injected = Some(failure.spawn);
            break;
        }

        match injected {
            None => Ok(()),
            Some(true) => Err(Box::new(DependencyError::CouldNotExecute {
                dependency: command.dependency(),
                inner: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            })),
            Some(false) => Err(Box::new(DependencyError::ExecutionFailed {
                dependency: command.dependency(),
                rendered_command,
                explanation: "exited with status: 1".into(),
            })),
        }
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &Command) -> Result<(), Box<DependencyError>> {
        self.record(command)
    }

    fn output(&self, command: &Command) -> Result<String, Box<DependencyError>> {
        self.record(command)?;
        Ok(self.output.clone())
    }
}
