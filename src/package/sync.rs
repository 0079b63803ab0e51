//! Directory mirroring for the generated Swift sources.
//!
//! Equivalent to `rsync -a --delete source/ destination/`: after a sync the
//! destination contains exactly the files of the source.

use crate::error::{Result, SyncError};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// What a sync changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Files written because they were new or different
    pub copied: usize,
    /// Files and directories removed from the destination
    pub removed: usize,
}

/// Mirror `source` into `destination`, deleting anything the source lacks
pub fn mirror_directory(source: &Path, destination: &Path) -> Result<SyncSummary> {
    if !source.is_dir() {
        return Err(SyncError::SourceNotFound {
            path: source.to_path_buf(),
        }
        .into());
    }
    fs::create_dir_all(destination)?;

    let walk_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: walkdir::Error| SyncError::Walk { path, source }
    };
    let outside = |path: &Path, root: &Path| SyncError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };

    let mut summary = SyncSummary::default();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(walk_err(source))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| outside(entry.path(), source))?;
        let target = destination.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if target.symlink_metadata().is_ok_and(|m| !m.is_dir()) {
                fs::remove_file(&target)?;
                summary.removed += 1;
            }
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())?;
            if target.symlink_metadata().is_ok() {
                remove_path(&target)?;
            }
            create_symlink(&link, &target, entry.path())?;
            summary.copied += 1;
        } else {
            if target.symlink_metadata().is_ok_and(|m| !m.is_file()) {
                remove_path(&target)?;
            }
            if !same_contents(entry.path(), &target)? {
                fs::copy(entry.path(), &target)?;
                summary.copied += 1;
            }
        }
    }

    for entry in WalkDir::new(destination).min_depth(1).contents_first(true) {
        let entry = entry.map_err(walk_err(destination))?;
        let relative = entry
            .path()
            .strip_prefix(destination)
            .map_err(|_| outside(entry.path(), destination))?;
        if source.join(relative).symlink_metadata().is_err() {
            remove_path(entry.path())?;
            summary.removed += 1;
        }
    }

    log::info!(
        "Synced {} -> {} ({} copied, {} removed)",
        source.display(),
        destination.display(),
        summary.copied,
        summary.removed
    );
    Ok(summary)
}

fn same_contents(a: &Path, b: &Path) -> io::Result<bool> {
    let Ok(meta_b) = b.metadata() else {
        return Ok(false);
    };
    if a.metadata()?.len() != meta_b.len() {
        return Ok(false);
    }
    Ok(fs::read(a)? == fs::read(b)?)
}

fn remove_path(path: &Path) -> io::Result<()> {
    let meta = path.symlink_metadata()?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
fn create_symlink(link: &Path, target: &Path, _original: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn create_symlink(_link: &Path, target: &Path, original: &Path) -> io::Result<()> {
    fs::copy(original, target).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_mirror_copies_new_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("swift");
        let dst = dir.path().join("Sources/MatrixRustSDK");
        write(&src.join("matrix_sdk_ffi.swift"), "ffi");
        write(&src.join("nested/extra.swift"), "extra");

        let summary = mirror_directory(&src, &dst).unwrap();
        assert_eq!(summary, SyncSummary { copied: 2, removed: 0 });
        assert_eq!(fs::read_to_string(dst.join("nested/extra.swift")).unwrap(), "extra");
    }

    #[test]
    fn test_mirror_deletes_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("swift");
        let dst = dir.path().join("dst");
        write(&src.join("keep.swift"), "new");
        write(&dst.join("keep.swift"), "old");
        write(&dst.join("stale.swift"), "stale");
        write(&dst.join("gone/deep.swift"), "deep");

        let summary = mirror_directory(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("keep.swift")).unwrap(), "new");
        assert!(!dst.join("stale.swift").exists());
        assert!(!dst.join("gone").exists());
        assert_eq!(summary.copied, 1);
        assert_eq!(summary.removed, 3);
    }

    #[test]
    fn test_mirror_skips_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("swift");
        let dst = dir.path().join("dst");
        write(&src.join("a.swift"), "same");
        write(&dst.join("a.swift"), "same");

        let summary = mirror_directory(&src, &dst).unwrap();
        assert_eq!(summary, SyncSummary::default());
    }

    #[test]
    fn test_mirror_replaces_file_with_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("swift");
        let dst = dir.path().join("dst");
        write(&src.join("thing/inner.swift"), "inner");
        write(&dst.join("thing"), "was a file");

        mirror_directory(&src, &dst).unwrap();
        assert!(dst.join("thing").is_dir());
        assert_eq!(fs::read_to_string(dst.join("thing/inner.swift")).unwrap(), "inner");
    }

    #[test]
    fn test_missing_source_is_a_sync_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = mirror_directory(&dir.path().join("nope"), &dir.path().join("dst")).unwrap_err();
        assert!(matches!(
            err,
            crate::ReleaseError::Sync(SyncError::SourceNotFound { ref path }) if path.ends_with("nope")
        ));
        assert!(!dir.path().join("dst").exists());
    }
}
