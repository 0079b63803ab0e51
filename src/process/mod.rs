//! Subprocess execution.
//!
//! Every command carries its own working directory; there is no shared
//! default directory. [`CommandRunner`] is the seam tests replace with a fake.

use crate::error::ProcessError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A program invocation with an explicit working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// Program to execute
    pub program: String,
    /// Arguments passed verbatim (no shell interpolation)
    pub args: Vec<String>,
    /// Working directory for the child
    pub directory: PathBuf,
    /// Environment variables removed from the child environment
    pub env_remove: Vec<String>,
}

impl ShellCommand {
    /// Create a command running `program` inside `directory`
    pub fn new(program: impl Into<String>, directory: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            directory: directory.as_ref().to_path_buf(),
            env_remove: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Remove an inherited environment variable from the child
    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    /// Command line for logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Standard output with surrounding whitespace removed
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Runs commands to completion
pub trait CommandRunner {
    /// Run `command`, blocking until it exits.
    ///
    /// Returns [`ProcessError::Failed`] on a non-zero exit status.
    fn run(&self, command: &ShellCommand) -> Result<CommandOutput, ProcessError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &ShellCommand) -> Result<CommandOutput, ProcessError> {
        (**self).run(command)
    }
}

/// [`CommandRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &ShellCommand) -> Result<CommandOutput, ProcessError> {
        let display = command.display();
        log::debug!("$ {} (in {})", display, command.directory.display());

        let mut child = Command::new(&command.program);
        child.args(&command.args).current_dir(&command.directory);
        for key in &command.env_remove {
            child.env_remove(key);
        }

        let output = child.output().map_err(|source| ProcessError::Spawn {
            command: display.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ProcessError::Failed {
                command: display,
                code: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted runner for unit tests.

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    type Script = Box<dyn Fn(&ShellCommand) -> Option<Result<CommandOutput, ProcessError>>>;

    /// Records every command and answers from a list of rules.
    ///
    /// Commands that match no rule succeed with empty output.
    #[derive(Default)]
    pub struct FakeRunner {
        pub calls: RefCell<Vec<ShellCommand>>,
        rules: RefCell<VecDeque<Script>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer commands whose display starts with `prefix` with `stdout`
        pub fn stdout(self, prefix: &str, stdout: &str) -> Self {
            let prefix = prefix.to_string();
            let stdout = stdout.to_string();
            self.rule(move |cmd| {
                cmd.display().starts_with(&prefix).then(|| {
                    Ok(CommandOutput {
                        stdout: stdout.clone(),
                        stderr: String::new(),
                    })
                })
            })
        }

        /// Fail commands whose display starts with `prefix` with `code`
        pub fn fail(self, prefix: &str, code: i32) -> Self {
            let prefix = prefix.to_string();
            self.rule(move |cmd| {
                cmd.display().starts_with(&prefix).then(|| {
                    Err(ProcessError::Failed {
                        command: cmd.display(),
                        code: Some(code),
                        stdout: String::new(),
                        stderr: format!("{prefix} failed"),
                    })
                })
            })
        }

        pub fn rule<F>(self, rule: F) -> Self
        where
            F: Fn(&ShellCommand) -> Option<Result<CommandOutput, ProcessError>> + 'static,
        {
            self.rules.borrow_mut().push_back(Box::new(rule));
            self
        }

        pub fn commands(&self) -> Vec<String> {
            self.calls.borrow().iter().map(ShellCommand::display).collect()
        }

        pub fn ran(&self, prefix: &str) -> bool {
            self.commands().iter().any(|c| c.starts_with(prefix))
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, command: &ShellCommand) -> Result<CommandOutput, ProcessError> {
            self.calls.borrow_mut().push(command.clone());
            for rule in self.rules.borrow().iter() {
                if let Some(result) = rule(command) {
                    return result;
                }
            }
            Ok(CommandOutput::default())
        }
    }
}
