//! Gzip decompression into working files

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, warn};

use crate::error::{Result, TripError};

/// Decompressed working file, deleted when dropped
#[derive(Debug)]
pub struct Decompressed {
    path: PathBuf,
}

impl Decompressed {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Decompressed {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Deleted file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed on delete {}: {}", self.path.display(), e),
        }
    }
}

/// Working file beside the source, named after it without its last
/// extension: `pings.tsv.gz` gives `pings.tsv`
pub fn working_path<P: AsRef<Path>>(source: P) -> Result<PathBuf> {
    let source = source.as_ref();
    if source.as_os_str().is_empty() {
        return Err(TripError::Validation("Source file path is blank".to_string()));
    }

    match (source.extension(), source.file_stem()) {
        (Some(_), Some(stem)) => Ok(source.with_file_name(stem)),
        _ => Err(TripError::Validation(format!(
            "Source file {} has no extension to strip",
            source.display()
        ))),
    }
}

/// Decompress `source` into `target`, which must not exist yet.
///
/// The returned guard owns `target`: dropping it, on success or failure
/// of whatever reads it, deletes the file.
pub fn decompress<P: AsRef<Path>, Q: AsRef<Path>>(source: P, target: Q) -> Result<Decompressed> {
    let source = source.as_ref();
    let target = target.as_ref();
    if source.as_os_str().is_empty() {
        return Err(TripError::Validation("Source file path is blank".to_string()));
    }
    if target.as_os_str().is_empty() {
        return Err(TripError::Validation("Target file path is blank".to_string()));
    }
    if !source.is_file() {
        return Err(TripError::Validation(format!(
            "File path does not exist: {}",
            source.display()
        )));
    }

    let input = File::open(source).map_err(|e| TripError::io(source, e))?;
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| TripError::io(target, e))?;

    let working = Decompressed {
        path: target.to_path_buf(),
    };

    let mut decoder = GzDecoder::new(input);
    io::copy(&mut decoder, &mut output).map_err(|e| TripError::io(source, e))?;

    debug!("Decompressed {} into {}", source.display(), target.display());

    Ok(working)
}
