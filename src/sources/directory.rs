//! Directory tree source integration

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;

use super::gzip::{decompress, working_path};
use super::{FieldsConfiguration, IngestReport, PingsSource, TsvSource};
use crate::error::{Result, TripError};
use crate::Ping;

/// Every file below a root directory, gzip compressed or plain
pub struct DirectorySource {
    root: PathBuf,
    fields: FieldsConfiguration,
    working_dir: Option<PathBuf>,
    report: IngestReport,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(root: P, fields: Option<FieldsConfiguration>) -> Self {
        Self {
            root: root.into(),
            fields: fields.unwrap_or_default(),
            working_dir: None,
            report: IngestReport::default(),
        }
    }

    /// Decompress into this directory instead of beside each archive
    pub fn working_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.working_dir = Some(dir.into());

        self
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    /// Beside the archive unless a plain file already takes that name,
    /// then prefixed with the file index
    fn working_file(&self, index: usize, source: &Path) -> Result<PathBuf> {
        let sibling = working_path(source)?;

        match (&self.working_dir, sibling.file_name()) {
            (Some(dir), Some(name)) => {
                Ok(dir.join(format!("{}-{}", index, name.to_string_lossy())))
            }
            (None, Some(name)) if sibling.exists() => {
                Ok(sibling.with_file_name(format!("{}-{}", index, name.to_string_lossy())))
            }
            _ => Ok(sibling),
        }
    }

    fn read_file(&self, index: usize, path: &Path) -> Result<(Vec<Ping>, IngestReport)> {
        if path.extension() == Some(OsStr::new("gz")) {
            let working = decompress(path, self.working_file(index, path)?)?;
            read_plain(working.path(), &self.fields)
        } else {
            read_plain(path, &self.fields)
        }
    }
}

impl PingsSource for DirectorySource {
    fn fetch(&mut self) -> Result<Vec<Ping>> {
        if self.root.as_os_str().is_empty() {
            return Err(TripError::Validation("Root directory path is blank".to_string()));
        }
        if !self.root.is_dir() {
            return Err(TripError::Validation(format!(
                "Root directory does not exist: {}",
                self.root.display()
            )));
        }

        let mut files = vec![];
        list_files(&self.root, &mut files)?;

        let this = &*self;
        let results: Vec<(PathBuf, Result<(Vec<Ping>, IngestReport)>)> = files
            .into_par_iter()
            .enumerate()
            .map(|(index, path)| {
                let res = this.read_file(index, &path);
                (path, res)
            })
            .collect();

        let mut pings = vec![];
        let mut report = IngestReport::default();
        for (path, res) in results {
            match res {
                Ok((mut file_pings, file_report)) => {
                    info!("{} pings from {}", file_pings.len(), path.display());
                    report.merge(&file_report);
                    pings.append(&mut file_pings);
                }
                Err(e) => {
                    warn!("Failed on read {}: {}", path.display(), e);
                    report.files_failed += 1;
                }
            }
        }

        info!(
            "{} pings from {} files, {} files failed, {} malformed lines",
            report.pings, report.files_read, report.files_failed, report.malformed_lines
        );
        self.report.merge(&report);

        Ok(pings)
    }
}

fn read_plain(path: &Path, fields: &FieldsConfiguration) -> Result<(Vec<Ping>, IngestReport)> {
    let file = File::open(path).map_err(|e| TripError::io(path, e))?;

    let mut source = TsvSource::new(BufReader::new(file), Some(fields.clone()));
    let pings = source.fetch()?;

    let mut report = source.report().clone();
    report.files_read = 1;

    Ok((pings, report))
}

/// Regular files below `dir`, sorted, subdirectories included
fn list_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| TripError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| TripError::io(dir, e))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            list_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempdir::TempDir;

    use super::DirectorySource;
    use crate::{PingsSource, TripError};

    fn io(e: std::io::Error) -> TripError {
        TripError::Parse(e.to_string())
    }

    fn write_gz(path: &Path, data: &str) -> Result<(), TripError> {
        let mut encoder = GzEncoder::new(File::create(path).map_err(io)?, Compression::default());
        encoder.write_all(data.as_bytes()).map_err(io)?;
        encoder.finish().map_err(io)?;

        Ok(())
    }

    #[test]
    fn nested_files() -> Result<(), TripError> {
        let dir = TempDir::new("directory-nested_files").map_err(io)?;
        let nested = dir.path().join("01").join("02");
        fs::create_dir_all(&nested).map_err(io)?;

        write_gz(
            &dir.path().join("a.tsv.gz"),
            "h\n1621814400\tD1\tx\t0.0\t0.0\n1621814520\tD1\tx\t0.01\t0.0\n",
        )?;
        write_gz(
            &nested.join("b.tsv.gz"),
            "h\n1621814400\tD2\tx\t1.0\t1.0\nbroken line\n",
        )?;
        fs::write(
            dir.path().join("01").join("c.tsv"),
            "h\n1621814400\tD3\tx\t2.0\t2.0\n",
        )
        .map_err(io)?;
        fs::write(dir.path().join("d.tsv.gz"), "not gzip").map_err(io)?;

        let mut source = DirectorySource::new(dir.path(), None);
        let pings = source.fetch()?;
        assert_eq!(4, pings.len());

        let report = source.report();
        assert_eq!(3, report.files_read);
        assert_eq!(1, report.files_failed);
        assert_eq!(4, report.pings);
        assert_eq!(1, report.malformed_lines);

        // Working files are gone
        assert!(!dir.path().join("a.tsv").exists());
        assert!(!nested.join("b.tsv").exists());
        assert!(!dir.path().join("d.tsv").exists());

        Ok(())
    }

    #[test]
    fn separate_working_dir() -> Result<(), TripError> {
        let dir = TempDir::new("directory-separate_working_dir").map_err(io)?;
        let work = TempDir::new("directory-separate_working_dir-work").map_err(io)?;
        fs::create_dir(dir.path().join("x")).map_err(io)?;
        fs::create_dir(dir.path().join("y")).map_err(io)?;

        write_gz(&dir.path().join("x").join("p.tsv.gz"), "h\n1621814400\tD1\tx\t0.0\t0.0\n")?;
        write_gz(&dir.path().join("y").join("p.tsv.gz"), "h\n1621814400\tD2\tx\t0.0\t0.0\n")?;

        let mut source = DirectorySource::new(dir.path(), None);
        source.working_dir(work.path());
        let pings = source.fetch()?;
        assert_eq!(2, pings.len());
        assert_eq!(0, source.report().files_failed);
        assert_eq!(0, fs::read_dir(work.path()).map_err(io)?.count());

        Ok(())
    }

    #[test]
    fn archive_beside_plain_twin() -> Result<(), TripError> {
        let dir = TempDir::new("directory-archive_beside_plain_twin").map_err(io)?;

        write_gz(&dir.path().join("a.tsv.gz"), "h\n1621814400\tD1\tx\t0.0\t0.0\n")?;
        fs::write(dir.path().join("a.tsv"), "h\n1621814400\tD2\tx\t1.0\t1.0\n").map_err(io)?;

        let mut source = DirectorySource::new(dir.path(), None);
        let pings = source.fetch()?;
        assert_eq!(2, pings.len());
        assert_eq!(2, source.report().files_read);
        assert_eq!(0, source.report().files_failed);

        // The plain file is untouched, the working copy is gone
        assert_eq!(
            "h\n1621814400\tD2\tx\t1.0\t1.0\n",
            fs::read_to_string(dir.path().join("a.tsv")).map_err(io)?
        );
        assert_eq!(2, fs::read_dir(dir.path()).map_err(io)?.count());

        Ok(())
    }

    #[test]
    fn missing_root() {
        let mut source = DirectorySource::new("/definitely/not/here", None);
        assert!(matches!(source.fetch(), Err(TripError::Validation(_))));

        let mut source = DirectorySource::new("", None);
        assert!(matches!(source.fetch(), Err(TripError::Validation(_))));
    }
}
