//! Git operations on a working copy.
//!
//! All operations shell out to the system `git` through a [`CommandRunner`],
//! always inside the directory the client was created for.

use crate::error::{GitError, ProcessError, Result};
use crate::process::{CommandRunner, ShellCommand};
use std::path::{Path, PathBuf};

/// Git client bound to one working copy
#[derive(Debug, Clone)]
pub struct Git<R> {
    directory: PathBuf,
    runner: R,
}

impl<R: CommandRunner> Git<R> {
    /// Create a client for the repository at `directory`
    pub fn new(directory: impl AsRef<Path>, runner: R) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            runner,
        }
    }

    /// Working copy this client operates on
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn git<I, S>(&self, args: I) -> ShellCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ShellCommand::new("git", &self.directory).args(args)
    }

    fn single_line(&self, command: ShellCommand) -> Result<String> {
        let output = self.runner.run(&command)?;
        let line = output.trimmed();
        if line.is_empty() || line.contains('\n') {
            return Err(GitError::UnexpectedOutput {
                command: command.display(),
                output: output.stdout.clone(),
            }
            .into());
        }
        Ok(line.to_string())
    }

    /// Full hash of `HEAD`
    pub fn commit_hash(&self) -> Result<String> {
        self.single_line(self.git(["rev-parse", "HEAD"]))
    }

    /// Name of the checked out branch (`HEAD` when detached)
    pub fn branch_name(&self) -> Result<String> {
        self.single_line(self.git(["rev-parse", "--abbrev-ref", "HEAD"]))
    }

    /// Stage `files`, including deletions under directories
    pub fn add(&self, files: &[&str]) -> Result<()> {
        self.runner
            .run(&self.git(["add", "--all", "--"]).args(files.iter().copied()))?;
        Ok(())
    }

    /// Whether the index differs from `HEAD`
    pub fn has_staged_changes(&self) -> Result<bool> {
        match self.runner.run(&self.git(["diff", "--cached", "--quiet"])) {
            Ok(_) => Ok(false),
            Err(ProcessError::Failed { code: Some(1), .. }) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Commit the staged changes and return the new commit hash.
    ///
    /// Fails with [`GitError::NoChanges`] when nothing is staged.
    pub fn commit(&self, message: &str) -> Result<String> {
        if !self.has_staged_changes()? {
            return Err(GitError::NoChanges {
                path: self.directory.clone(),
            }
            .into());
        }
        self.runner
            .run(&self.git(["commit", "--message"]).arg(message))?;
        self.commit_hash()
    }

    /// Push the current branch to its upstream
    pub fn push(&self) -> Result<()> {
        log::info!("Pushing {}", self.directory.display());
        self.runner.run(&self.git(["push"]))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use crate::process::fake::FakeRunner;

    #[test]
    fn test_commit_hash_trims_output() {
        let runner = FakeRunner::new().stdout("git rev-parse HEAD", "abc123\n");
        let git = Git::new("/pkg", &runner);
        assert_eq!(git.commit_hash().unwrap(), "abc123");
        assert_eq!(runner.calls.borrow()[0].directory, PathBuf::from("/pkg"));
    }

    #[test]
    fn test_branch_name() {
        let runner = FakeRunner::new().stdout("git rev-parse --abbrev-ref HEAD", "main\n");
        let git = Git::new("/pkg", &runner);
        assert_eq!(git.branch_name().unwrap(), "main");
    }

    #[test]
    fn test_empty_output_is_rejected() {
        let runner = FakeRunner::new();
        let git = Git::new("/pkg", &runner);
        assert!(matches!(
            git.commit_hash(),
            Err(ReleaseError::Git(GitError::UnexpectedOutput { .. }))
        ));
    }

    #[test]
    fn test_add_passes_paths_after_separator() {
        let runner = FakeRunner::new();
        let git = Git::new("/pkg", &runner);
        git.add(&["Package.swift", "Sources"]).unwrap();
        assert_eq!(
            runner.commands(),
            vec!["git add --all -- Package.swift Sources"]
        );
    }

    #[test]
    fn test_commit_without_changes_fails() {
        // `git diff --cached --quiet` exits 0 when the index is clean
        let runner = FakeRunner::new();
        let git = Git::new("/pkg", &runner);
        let err = git.commit("Bump").unwrap_err();
        assert!(matches!(err, ReleaseError::Git(GitError::NoChanges { .. })));
        assert!(!runner.ran("git commit"));
    }

    #[test]
    fn test_commit_with_changes_returns_new_hash() {
        let runner = FakeRunner::new()
            .fail("git diff --cached --quiet", 1)
            .stdout("git rev-parse HEAD", "def456\n");
        let git = Git::new("/pkg", &runner);
        assert_eq!(git.commit("Bump to version v1").unwrap(), "def456");
        let commit = runner
            .calls
            .borrow()
            .iter()
            .find(|c| c.args.first().map(String::as_str) == Some("commit"))
            .cloned()
            .unwrap();
        assert_eq!(commit.args, vec!["commit", "--message", "Bump to version v1"]);
    }

    #[test]
    fn test_diff_failure_is_propagated() {
        let runner = FakeRunner::new().fail("git diff --cached --quiet", 128);
        let git = Git::new("/pkg", &runner);
        assert!(matches!(
            git.commit("Bump"),
            Err(ReleaseError::Process(ProcessError::Failed { code: Some(128), .. }))
        ));
    }
}
