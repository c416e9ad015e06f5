//! Bundle writing: concatenate members into one artifact (+ gzip sibling).
//!
//! Both outputs are streamed into temp files next to their destination and
//! renamed into place only after every member was copied. A failed combine
//! leaves neither output behind, not even one from a previous build.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::NamedTempFile;

use crate::error::BuildError;

use super::version::get_mtime;

/// A bundle written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    pub path: PathBuf,
    /// `<path>.gz`, when gzip was requested
    pub gzip_path: Option<PathBuf>,
    /// Modification time of the plain output, used for cache busting
    pub last_modified: SystemTime,
}

/// Sibling path with a `.gz` suffix.
pub fn gzip_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

/// Concatenate `members` (in order) into `output`.
///
/// With `gzip`, the same byte stream is compressed into `<output>.gz`.
/// Without it, a stale `.gz` from an earlier build is removed.
pub fn combine(members: &[PathBuf], output: &Path, gzip: bool) -> Result<BundleArtifact, BuildError> {
    let gz_output = gzip_path(output);

    if let Err(err) = write_outputs(members, output, gzip.then_some(gz_output.as_path())) {
        remove_if_exists(output);
        remove_if_exists(&gz_output);
        return Err(err);
    }

    if !gzip {
        remove_if_exists(&gz_output);
    }

    let last_modified = get_mtime(output)
        .ok_or_else(|| BuildError::io(output, io::Error::from(io::ErrorKind::NotFound)))?;

    Ok(BundleArtifact {
        path: output.to_path_buf(),
        gzip_path: gzip.then_some(gz_output),
        last_modified,
    })
}

fn write_outputs(members: &[PathBuf], output: &Path, gz_output: Option<&Path>) -> Result<(), BuildError> {
    let parent = output.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;

    let temp = || NamedTempFile::new_in(parent).map_err(|e| BuildError::io(parent, e));
    let mut plain = BufWriter::new(temp()?);
    let mut compressed = match gz_output {
        Some(_) => Some(GzEncoder::new(BufWriter::new(temp()?), Compression::best())),
        None => None,
    };

    for member in members {
        let bytes = fs::read(member).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => BuildError::MissingMember {
                path: member.clone(),
            },
            _ => BuildError::io(member, e),
        })?;

        plain.write_all(&bytes).map_err(|e| BuildError::io(output, e))?;
        if let (Some(encoder), Some(gz)) = (compressed.as_mut(), gz_output) {
            encoder.write_all(&bytes).map_err(|e| BuildError::io(gz, e))?;
        }
    }

    // Finish the gzip sibling first so the plain file's mtime is the newest.
    if let (Some(encoder), Some(gz)) = (compressed, gz_output) {
        let tmp = encoder
            .finish()
            .and_then(|w| w.into_inner().map_err(io::IntoInnerError::into_error))
            .map_err(|e| BuildError::io(gz, e))?;
        persist(tmp, gz)?;
    }

    let tmp = plain
        .into_inner()
        .map_err(|e| BuildError::io(output, e.into_error()))?;
    persist(tmp, output)
}

fn persist(tmp: NamedTempFile, dest: &Path) -> Result<(), BuildError> {
    tmp.as_file().sync_all().map_err(|e| BuildError::io(dest, e))?;
    let file: File = tmp
        .persist(dest)
        .map_err(|e| BuildError::io(dest, e.error))?;
    // Renaming keeps the temp file's mtime; touch so it reflects this build.
    file.set_modified(SystemTime::now())
        .map_err(|e| BuildError::io(dest, e))
}

fn remove_if_exists(path: &Path) {
    if let Err(e) = fs::remove_file(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        crate::log!("warn"; "cannot remove {}: {}", path.display(), e);
    }
}

// ============================================================================
// tests
// ============================================================================
