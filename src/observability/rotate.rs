//! Size-bounded log file with timestamped backups.
//!
//! # Responsibilities
//! - Roll the active file over once a write would push it past `max_bytes`
//! - Optionally gzip each backup as it is rolled over
//! - Prune backups beyond `max_backups` or older than `max_age`
//!
//! # Layout
//! ```text
//! logs/controller.log                        active file
//! logs/controller-1729350000123.log          backup (ms since epoch)
//! logs/controller-1729340000456.log.gz       compressed backup
//! ```
//!
//! The timestamp in the backup name is the rollover time; pruning reads it
//! from the name, not from file metadata.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::config::LogConfig;

const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// When backups are made and how long they are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    pub max_bytes: u64,
    pub max_backups: usize,
    pub max_age: Option<Duration>,
    pub compress: bool,
}

impl From<&LogConfig> for Retention {
    fn from(config: &LogConfig) -> Self {
        Self {
            max_bytes: config.max_size.saturating_mul(MEGABYTE),
            max_backups: config.max_backups,
            max_age: (config.max_age > 0)
                .then(|| Duration::from_secs(config.max_age.saturating_mul(DAY.as_secs()))),
            compress: config.compress,
        }
    }
}

/// An append-only log file that rolls over by size.
#[derive(Debug)]
pub struct SizeRotatingFile {
    path: PathBuf,
    dir: PathBuf,
    stem: String,
    ext: Option<String>,
    retention: Retention,
    file: File,
    written: u64,
}

impl SizeRotatingFile {
    /// Open (or create) `path` for appending and prune stale backups.
    pub fn open(path: impl Into<PathBuf>, retention: Retention) -> io::Result<Self> {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;
        let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        let rotating = Self {
            path,
            dir,
            stem,
            ext,
            retention,
            file,
            written,
        };
        rotating.prune()?;
        Ok(rotating)
    }

    /// Path of the active file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backups currently on disk, newest first.
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self.scan()?.into_iter().map(|(_, path)| path).collect())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let backup = self.next_backup_path();
        fs::rename(&self.path, &backup)?;
        self.file = open_append(&self.path)?;
        self.written = 0;

        if self.retention.compress {
            compress(&backup)?;
        }
        self.prune()
    }

    fn next_backup_path(&self) -> PathBuf {
        let mut millis = unix_millis(SystemTime::now());
        loop {
            let name = self.backup_name(millis);
            let plain = self.dir.join(&name);
            let gz = self.dir.join(format!("{name}.gz"));
            if !plain.exists() && !gz.exists() {
                return plain;
            }
            millis += 1;
        }
    }

    fn backup_name(&self, millis: u64) -> String {
        match &self.ext {
            Some(ext) => format!("{}-{}.{}", self.stem, millis, ext),
            None => format!("{}-{}", self.stem, millis),
        }
    }

    /// Parse the rollover time out of a backup file name.
    fn backup_millis(&self, name: &str) -> Option<u64> {
        let rest = name.strip_prefix(&self.stem)?.strip_prefix('-')?;
        let rest = rest.strip_suffix(".gz").unwrap_or(rest);
        let digits = match &self.ext {
            Some(ext) => rest.strip_suffix(ext.as_str())?.strip_suffix('.')?,
            None => rest,
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    fn scan(&self) -> io::Result<Vec<(u64, PathBuf)>> {
        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(millis) = self.backup_millis(&name.to_string_lossy()) {
                backups.push((millis, entry.path()));
            }
        }
        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups)
    }

    fn prune(&self) -> io::Result<()> {
        let cutoff = self
            .retention
            .max_age
            .and_then(|age| SystemTime::now().checked_sub(age))
            .map(unix_millis);

        for (index, (millis, path)) in self.scan()?.into_iter().enumerate() {
            let too_many = index >= self.retention.max_backups;
            let too_old = cutoff.is_some_and(|cutoff| millis < cutoff);
            if too_many || too_old {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

impl Write for SizeRotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // An empty file never rolls over, so a single oversized line still lands.
        if self.written > 0 && self.written + buf.len() as u64 > self.retention.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn compress(path: &Path) -> io::Result<()> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");

    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&gz_name)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.sync_all()?;

    fs::remove_file(path)
}

fn unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn retention(max_bytes: u64, max_backups: usize) -> Retention {
        Retention {
            max_bytes,
            max_backups,
            max_age: None,
            compress: false,
        }
    }

    fn line(n: usize) -> Vec<u8> {
        format!("{:<39}\n", format!("line {n}")).into_bytes()
    }

    #[test]
    fn test_rolls_over_past_max_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controller.log");
        let mut file = SizeRotatingFile::open(&path, retention(64, 5)).unwrap();

        for n in 0..3 {
            file.write_all(&line(n)).unwrap();
        }
        file.flush().unwrap();

        let backups = file.backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(fs::read(&path).unwrap(), line(2));
        // Newest backup holds the line before the active one.
        assert_eq!(fs::read(&backups[0]).unwrap(), line(1));
    }

    #[test]
    fn test_keeps_only_max_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controller.log");
        let mut file = SizeRotatingFile::open(&path, retention(40, 1)).unwrap();

        for n in 0..4 {
            file.write_all(&line(n)).unwrap();
        }

        let backups = file.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read(&backups[0]).unwrap(), line(2));
    }

    #[test]
    fn test_compresses_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controller.log");
        let mut file = SizeRotatingFile::open(
            &path,
            Retention {
                compress: true,
                ..retention(40, 3)
            },
        )
        .unwrap();

        file.write_all(&line(0)).unwrap();
        file.write_all(&line(1)).unwrap();

        let backups = file.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].to_string_lossy().ends_with(".log.gz"));

        let mut content = Vec::new();
        GzDecoder::new(File::open(&backups[0]).unwrap())
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, line(0));
    }

    #[test]
    fn test_prunes_backups_past_max_age() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("controller-1000.log");
        let stale_gz = dir.path().join("controller-2000.log.gz");
        let unrelated = dir.path().join("controller-notes.txt");
        for path in [&stale, &stale_gz, &unrelated] {
            fs::write(path, b"old").unwrap();
        }

        let file = SizeRotatingFile::open(
            dir.path().join("controller.log"),
            Retention {
                max_age: Some(DAY),
                ..retention(MEGABYTE, 10)
            },
        )
        .unwrap();

        assert!(!stale.exists());
        assert!(!stale_gz.exists());
        assert!(unrelated.exists());
        assert!(file.backups().unwrap().is_empty());
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controller.log");
        fs::write(&path, line(0)).unwrap();

        let mut file = SizeRotatingFile::open(&path, retention(64, 2)).unwrap();
        file.write_all(&line(1)).unwrap();

        // The existing 40 bytes count towards the limit.
        assert_eq!(file.backups().unwrap().len(), 1);
        assert_eq!(fs::read(&path).unwrap(), line(1));
    }

    #[test]
    fn test_retention_from_config() {
        let config = LogConfig {
            max_size: 100,
            max_age: 7,
            max_backups: 3,
            compress: true,
            ..LogConfig::default()
        };
        let retention = Retention::from(&config);

        assert_eq!(retention.max_bytes, 100 * MEGABYTE);
        assert_eq!(retention.max_age, Some(DAY * 7));
        assert_eq!(retention.max_backups, 3);
        assert!(retention.compress);
        assert_eq!(Retention::from(&LogConfig::default()).max_age, None);
    }
}
