use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn release() -> Command {
    let mut cmd = Command::cargo_bin("release").unwrap();
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("RELEASE_PACKAGE_REPO")
        .env_remove("RELEASE_SOURCE_REPO")
        .env_remove("RELEASE_API_URL");
    cmd
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {args:?} failed: {output:?}");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn help_lists_the_release_flags() {
    release()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--version <VERSION>"))
        .stdout(predicate::str::contains("--local-only"))
        .stdout(predicate::str::contains("--test-mode"));
}

#[test]
fn version_is_required() {
    release()
        .arg("--local-only")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--version"));
}

#[test]
fn invalid_version_exits_with_one() {
    release()
        .args(["--version", "v1/2", "--local-only"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid arguments"));
}

#[test]
fn missing_token_fails_before_building() {
    if which::which("git").is_err() {
        eprintln!("git not available; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let home = tempfile::tempdir().unwrap();

    release()
        .env("HOME", home.path())
        .args(["--version", "v1.0.0", "--test-mode"])
        .arg("--package-dir")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GitHub token not found"));

    assert!(!dir.path().join("test-mock").exists());
}

#[test]
fn local_test_mode_release_commits_the_manifest() {
    if which::which("git").is_err() {
        eprintln!("git not available; skipping");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let package = dir.path().join("matrix-rust-components-swift");
    fs::create_dir(&package).unwrap();
    fs::write(
        package.join("Package.swift"),
        include_str!("fixtures/Package.swift"),
    )
    .unwrap();

    git(&package, &["init", "--quiet"]);
    git(&package, &["config", "user.name", "Release Bot"]);
    git(&package, &["config", "user.email", "release@example.com"]);
    git(&package, &["config", "commit.gpgsign", "false"]);
    git(&package, &["add", "Package.swift"]);
    git(&package, &["commit", "--quiet", "--message", "Initial"]);

    release()
        .args(["--version", "v9.9.9", "--test-mode", "--local-only", "--quiet"])
        .arg("--package-dir")
        .arg(&package)
        .assert()
        .success();

    let manifest = fs::read_to_string(package.join("Package.swift")).unwrap();
    assert!(manifest.contains("let version = \"v9.9.9\""));
    assert!(manifest.contains(
        "let url = \"https://github.com/matrix-org/matrix-rust-components-swift/releases/download/v9.9.9/MatrixSDKFFI.xcframework.zip\""
    ));
    assert!(package.join("test-mock/MatrixSDKFFI.xcframework.zip").exists());

    assert_eq!(
        git(&package, &["log", "-1", "--format=%s"]),
        "Bump to version v9.9.9 (matrix-rust-sdk/test-branch test123)"
    );
    assert_eq!(git(&package, &["status", "--porcelain", "--", "Package.swift"]), "");
}
