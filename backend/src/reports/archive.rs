//! Report files written when a session closes.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ReportArchive {
    dir: PathBuf,
}

impl ReportArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File name for an event. Characters unsafe in file names are replaced,
    /// and a hash suffix keeps distinct events from colliding.
    pub fn file_name(event_id: &str) -> String {
        let safe: String = event_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if safe == event_id && !safe.starts_with('.') {
            format!("attendance_{}.csv", safe)
        } else {
            let digest = format!("{:x}", md5::compute(event_id.as_bytes()));
            format!("attendance_{}-{}.csv", safe, &digest[..8])
        }
    }

    pub fn path_for(&self, event_id: &str) -> PathBuf {
        self.dir.join(Self::file_name(event_id))
    }

    /// Writes the report through a temporary file so readers never see a partial one.
    pub fn write(&self, event_id: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(event_id);
        let tmp = path.with_extension("csv.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }

    pub fn read(&self, event_id: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(event_id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
