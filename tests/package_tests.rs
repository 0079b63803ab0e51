use std::fs;
use std::path::{Path, PathBuf};
use xcframework_release::package::{read_field, sha256_file, zip_directory, ManifestFields};
use xcframework_release::{BuildProduct, FRAMEWORK_NAME, GitHubClient, Package, ReqwestTransport, Repository};

const FIXTURE: &str = include_str!("fixtures/Package.swift");

fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn framework(root: &Path) -> PathBuf {
    let framework = root.join(FRAMEWORK_NAME);
    write(&framework.join("Info.plist"), b"<plist/>");
    write(
        &framework.join("ios-arm64/MatrixSDKFFI.framework/MatrixSDKFFI"),
        &[0u8; 4096],
    );
    write(
        &framework.join("ios-arm64_x86_64-simulator/MatrixSDKFFI.framework/Headers/MatrixSDKFFI.h"),
        b"#pragma once\n",
    );
    framework
}

fn product(directory: &Path, version: &str) -> BuildProduct {
    BuildProduct {
        source_repo: Repository::new("matrix-org", "matrix-rust-sdk"),
        version: version.to_string(),
        commit_hash: "abc123".to_string(),
        branch: "main".to_string(),
        directory: directory.to_path_buf(),
        framework_name: FRAMEWORK_NAME.to_string(),
    }
}

fn local_package(dir: &Path) -> Package<ReqwestTransport> {
    let client = GitHubClient::new(ReqwestTransport::new().unwrap(), "https://api.github.com").unwrap();
    Package::new(
        Repository::new("matrix-org", "matrix-rust-components-swift"),
        dir,
        None,
        client,
        true,
    )
}

#[test]
fn zipping_twice_gives_identical_checksums() {
    let dir = tempfile::tempdir().unwrap();
    let framework = framework(dir.path());

    let first = zip_directory(&framework, &dir.path().join("first.zip")).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(1100));
    fs::write(framework.join("Info.plist"), b"<plist/>").unwrap();
    let second = zip_directory(&framework, &dir.path().join("second.zip")).unwrap();

    assert_eq!(first.checksum, second.checksum);
    assert_eq!(
        fs::read(&first.path).unwrap(),
        fs::read(&second.path).unwrap()
    );
}

#[test]
fn checksum_matches_archive_bytes() {
    let dir = tempfile::tempdir().unwrap();
    framework(dir.path());
    let package_dir = tempfile::tempdir().unwrap();

    let artifact = local_package(package_dir.path())
        .zip_binary(&product(dir.path(), "v1.0.0"))
        .unwrap();

    assert_eq!(artifact.path, dir.path().join("MatrixSDKFFI.xcframework.zip"));
    assert_eq!(artifact.checksum.len(), 64);
    assert_eq!(sha256_file(&artifact.path).unwrap(), artifact.checksum);
}

#[test]
fn missing_framework_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let package_dir = tempfile::tempdir().unwrap();
    assert!(local_package(package_dir.path())
        .zip_binary(&product(dir.path(), "v1.0.0"))
        .is_err());
}

#[test]
fn manifest_update_only_touches_the_three_declarations() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Package.swift"), FIXTURE).unwrap();
    let package = local_package(dir.path());
    let checksum = "a".repeat(64);

    package
        .update_manifest(&product(dir.path(), "v2.0.0"), &checksum)
        .unwrap();

    let updated = fs::read_to_string(dir.path().join("Package.swift")).unwrap();
    assert_eq!(read_field(&updated, "version").as_deref(), Some("v2.0.0"));
    assert_eq!(read_field(&updated, "checksum").as_deref(), Some(checksum.as_str()));
    assert_eq!(
        read_field(&updated, "url").as_deref(),
        Some("https://github.com/matrix-org/matrix-rust-components-swift/releases/download/v2.0.0/MatrixSDKFFI.xcframework.zip")
    );

    let original: Vec<&str> = FIXTURE.lines().collect();
    let rewritten: Vec<&str> = updated.lines().collect();
    assert_eq!(original.len(), rewritten.len());
    for (before, after) in original.iter().zip(&rewritten) {
        let declaration = ["let checksum", "let version", "let url"]
            .iter()
            .any(|prefix| before.starts_with(prefix));
        if !declaration {
            assert_eq!(before, after);
        }
    }
    assert!(updated.ends_with('\n'));
    assert!(!dir.path().join("Package.swift.tmp").exists());
}

#[test]
fn manifest_without_declarations_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = "// swift-tools-version:5.5\nlet package = Package(name: \"X\")\n";
    fs::write(dir.path().join("Package.swift"), manifest).unwrap();

    let err = local_package(dir.path())
        .update_manifest(&product(dir.path(), "v2.0.0"), "abc")
        .unwrap_err();
    assert!(err.to_string().contains("checksum"), "{err}");
    assert_eq!(
        fs::read_to_string(dir.path().join("Package.swift")).unwrap(),
        manifest
    );
}

#[test]
fn render_matches_declarations_exactly() {
    let fields = ManifestFields {
        version: "v3".to_string(),
        checksum: "c".to_string(),
        url: "https://example.com/F.zip".to_string(),
    };
    let rendered =
        xcframework_release::package::render(FIXTURE, &fields, Path::new("Package.swift")).unwrap();
    assert!(rendered.contains("let checksum = \"c\"\n"));
    assert!(rendered.contains("let version = \"v3\"\n"));
    assert!(rendered.contains("let url = \"https://example.com/F.zip\"\n"));
    assert!(rendered.contains(".binaryTarget(name: \"MatrixSDKFFI\", url: url, checksum: checksum)"));
}

#[test]
fn sync_mirrors_generated_sources() {
    let sdk = tempfile::tempdir().unwrap();
    let package_dir = tempfile::tempdir().unwrap();
    write(&sdk.path().join("swift/matrix_sdk_ffi.swift"), b"// new");
    write(
        &package_dir.path().join("Sources/MatrixRustSDK/removed.swift"),
        b"// gone",
    );

    let summary = local_package(package_dir.path())
        .sync_sources(&product(sdk.path(), "v1"))
        .unwrap();

    let sources = package_dir.path().join("Sources/MatrixRustSDK");
    assert_eq!(fs::read(sources.join("matrix_sdk_ffi.swift")).unwrap(), b"// new");
    assert!(!sources.join("removed.swift").exists());
    assert_eq!(summary.copied, 1);
    assert_eq!(summary.removed, 1);
}
