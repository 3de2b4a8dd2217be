//! Deterministic content digest of a directory tree.
//!
//! Paths are collected relative to the root with `/` separators and sorted
//! before hashing, so filesystem enumeration order never affects the result.
//! The digest is `h1:` followed by the base64 SHA-256 of a manifest with one
//! `"<hex sha256>  <path>\n"` line per file.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use base64::Engine;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::constants::FINGERPRINT_PREFIX;
use crate::error::{DirsignError, Result};

/// Digest of `files`, each opened through `open`. Input order is irrelevant.
pub fn hash_files<F, R>(files: &[String], mut open: F) -> Result<String>
where
    F: FnMut(&str) -> io::Result<R>,
    R: Read,
{
    let mut sorted: Vec<&String> = files.iter().collect();
    sorted.sort();

    let mut manifest = Sha256::new();
    for name in sorted {
        if name.contains('\n') {
            tracing::warn!(path = %name.escape_debug(), "skipping file name containing a newline");
            continue;
        }

        let mut reader = open(name).map_err(|e| DirsignError::Io(format!("{name}: {e}")))?;
        let mut inner = Sha256::new();
        io::copy(&mut reader, &mut inner).map_err(|e| DirsignError::Io(format!("{name}: {e}")))?;

        manifest.update(format!("{}  {}\n", hex::encode(inner.finalize()), name).as_bytes());
    }

    Ok(format!(
        "{}{}",
        FINGERPRINT_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(manifest.finalize())
    ))
}

/// Regular files under `dir`, relative, `/`-separated and joined onto
/// `prefix`. Entries whose file name is in `exclude` are left out. A path
/// that is not valid UTF-8 fails the walk.
pub fn dir_files(dir: &Path, prefix: &str, exclude: &HashSet<String>) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|e| DirsignError::Io(e.to_string()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if exclude.contains(name) {
                continue;
            }
        }

        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| DirsignError::Io(e.to_string()))?;
        let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
        let Some(parts) = parts else {
            return Err(DirsignError::Io(format!(
                "{}: path is not valid UTF-8",
                rel.display()
            )));
        };

        files.push(join_prefix(prefix, &parts.join("/")));
    }

    Ok(files)
}

fn join_prefix(prefix: &str, rel: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        rel.to_string()
    } else {
        format!("{prefix}/{rel}")
    }
}

/// Fingerprints one directory with a fixed exclusion list.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    root: PathBuf,
    prefix: String,
    exclude: HashSet<String>,
}

impl Fingerprinter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: String::new(),
            exclude: HashSet::new(),
        }
    }

    /// Leave out every file with this name, at any depth.
    pub fn exclude(mut self, file_name: impl Into<String>) -> Self {
        self.exclude.insert(file_name.into());
        self
    }

    /// Join `prefix` onto every manifest path.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn compute(&self) -> Result<String> {
        let files = dir_files(&self.root, &self.prefix, &self.exclude)?;
        let strip = match self.prefix.trim_end_matches('/') {
            "" => String::new(),
            p => format!("{p}/"),
        };

        let digest = hash_files(&files, |name| {
            let rel = name.strip_prefix(strip.as_str()).unwrap_or(name);
            File::open(self.root.join(rel))
        })?;

        tracing::debug!(root = %self.root.display(), files = files.len(), "fingerprint computed");
        Ok(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"beta").unwrap();
        fs::write(dir.path().join("sub/deeper/c.bin"), [0u8, 1, 2, 3]).unwrap();
        dir
    }

    #[test]
    fn test_deterministic() {
        let dir = tree();
        let fp = Fingerprinter::new(dir.path());
        let first = fp.compute().unwrap();
        assert!(first.starts_with("h1:"));
        assert_eq!(first, fp.compute().unwrap());
    }

    #[test]
    fn test_single_byte_change() {
        let dir = tree();
        let fp = Fingerprinter::new(dir.path());
        let before = fp.compute().unwrap();
        fs::write(dir.path().join("sub/deeper/c.bin"), [0u8, 1, 2, 4]).unwrap();
        assert_ne!(before, fp.compute().unwrap());
    }

    #[test]
    fn test_rename_changes_digest() {
        let dir = tree();
        let fp = Fingerprinter::new(dir.path());
        let before = fp.compute().unwrap();
        fs::rename(dir.path().join("a.txt"), dir.path().join("z.txt")).unwrap();
        assert_ne!(before, fp.compute().unwrap());
    }

    #[test]
    fn test_excluded_file_ignored() {
        let dir = tree();
        let fp = Fingerprinter::new(dir.path()).exclude("dirsign.store");
        let before = fp.compute().unwrap();

        fs::write(dir.path().join("dirsign.store"), b"{}").unwrap();
        assert_eq!(before, fp.compute().unwrap());
        fs::write(dir.path().join("sub/dirsign.store"), b"{\"x\":1}").unwrap();
        assert_eq!(before, fp.compute().unwrap());
        fs::remove_file(dir.path().join("dirsign.store")).unwrap();
        assert_eq!(before, fp.compute().unwrap());
    }

    #[test]
    fn test_relative_slash_paths_sorted_by_hash() {
        let dir = tree();
        let mut files = dir_files(dir.path(), "", &HashSet::new()).unwrap();
        files.sort();
        assert_eq!(files, vec!["a.txt", "sub/b.txt", "sub/deeper/c.bin"]);
    }

    #[test]
    fn test_prefix_joined() {
        let dir = tree();
        let mut files = dir_files(dir.path(), "proj/", &HashSet::new()).unwrap();
        files.sort();
        assert_eq!(files[0], "proj/a.txt");

        let plain = Fingerprinter::new(dir.path()).compute().unwrap();
        let prefixed = Fingerprinter::new(dir.path()).prefix("proj").compute().unwrap();
        assert_ne!(plain, prefixed);
    }

    #[test]
    fn test_order_independent() {
        let contents = |name: &str| -> io::Result<io::Cursor<Vec<u8>>> {
            Ok(io::Cursor::new(name.as_bytes().to_vec()))
        };
        let forward: Vec<String> = ["a", "b/c", "b/d", "e"].iter().map(|s| s.to_string()).collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        let mut shuffled = forward.clone();
        shuffled.swap(0, 2);

        let expected = hash_files(&forward, contents).unwrap();
        assert_eq!(expected, hash_files(&reversed, contents).unwrap());
        assert_eq!(expected, hash_files(&shuffled, contents).unwrap());
    }

    #[test]
    fn test_manifest_format() {
        let files = vec!["x".to_string()];
        let digest = hash_files(&files, |_| Ok(io::Cursor::new(b"hi".to_vec()))).unwrap();

        let inner = hex::encode(Sha256::digest(b"hi"));
        let outer = Sha256::digest(format!("{inner}  x\n").as_bytes());
        let expected = format!(
            "h1:{}",
            base64::engine::general_purpose::STANDARD.encode(outer)
        );
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_newline_path_skipped() {
        let contents = |_: &str| -> io::Result<io::Cursor<Vec<u8>>> { Ok(io::Cursor::new(vec![7])) };
        let clean = vec!["a".to_string()];
        let with_newline = vec!["a".to_string(), "bad\nname".to_string()];
        assert_eq!(
            hash_files(&clean, contents).unwrap(),
            hash_files(&with_newline, contents).unwrap()
        );
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let files = vec!["missing".to_string()];
        let result = hash_files(&files, |_| -> io::Result<io::Cursor<Vec<u8>>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        });
        assert!(matches!(result, Err(DirsignError::Io(msg)) if msg.contains("missing")));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_name_fails_walk() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        let fp = Fingerprinter::new(dir.path());
        assert!(fp.compute().is_ok());

        fs::write(dir.path().join(OsStr::from_bytes(b"evil\xff.sh")), b"#!/bin/sh").unwrap();
        assert!(matches!(fp.compute(), Err(DirsignError::Io(msg)) if msg.contains("UTF-8")));
        assert!(matches!(
            dir_files(dir.path(), "", &HashSet::new()),
            Err(DirsignError::Io(_))
        ));
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let fp = Fingerprinter::new(dir.path().join("nope"));
        assert!(matches!(fp.compute(), Err(DirsignError::Io(_))));
    }
}
