//! Size-bounded log file rotation
//!
//! The file manager owns one active file inside a log directory. Files are
//! named `log_<epoch-millis>.log`, so sorting names descending also sorts
//! them newest first. When the next line would push the active file past
//! `max_file_size`, a fresh file is opened first; old files beyond
//! `max_files` are pruned oldest-first whenever a file is opened.

use super::error::{LoggerError, Result};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const LOG_FILE_PREFIX: &str = "log_";
pub const LOG_FILE_SUFFIX: &str = ".log";

/// Default rotation threshold (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of retained files, the active one included
pub const DEFAULT_MAX_FILES: usize = 5;

/// Prefix-based rotation engine
///
/// Not shareable across loggers writing to the same directory: two managers
/// pointing at one directory will prune each other's files.
///
/// # Examples
///
/// ```no_run
/// use chromalog::core::FileManager;
///
/// let mut manager = FileManager::new("./logs", 1024 * 1024, 3).unwrap();
/// manager.write("service started").unwrap();
/// ```
#[derive(Debug)]
pub struct FileManager {
    directory: PathBuf,
    max_file_size: u64,
    max_files: usize,
    current_path: PathBuf,
    file: Option<File>,
    current_size: u64,
    last_stamp: i64,
    rotations: u64,
}

impl FileManager {
    /// Create the directory if needed, prune stale files and open a fresh file
    ///
    /// # Errors
    ///
    /// Returns an error for invalid limits, or when the directory cannot be
    /// created or the first file cannot be opened.
    pub fn new<P: AsRef<Path>>(directory: P, max_file_size: u64, max_files: usize) -> Result<Self> {
        if max_file_size == 0 {
            return Err(LoggerError::config("FileManager", "max_file_size must be greater than 0"));
        }
        if max_files == 0 {
            return Err(LoggerError::config("FileManager", "max_files must be at least 1"));
        }

        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", directory.display()),
                e,
            )
        })?;

        let mut manager = Self {
            directory,
            max_file_size,
            max_files,
            current_path: PathBuf::new(),
            file: None,
            current_size: 0,
            last_stamp: 0,
            rotations: 0,
        };
        manager.open_fresh()?;
        Ok(manager)
    }

    /// Append `message` plus a newline, rotating first if it would overflow
    ///
    /// A line is never split across files. A line larger than the threshold
    /// is written alone into a fresh file.
    ///
    /// # Errors
    ///
    /// Returns an error if a new file cannot be opened or the write fails.
    pub fn write(&mut self, message: &str) -> Result<()> {
        let mut line = String::with_capacity(message.len() + 1);
        line.push_str(message);
        line.push('\n');
        let size = line.len() as u64;

        if self.current_size > 0 && self.current_size + size > self.max_file_size {
            self.rotate()?;
        }

        if self.file.is_none() {
            // A previous rotation failed to open its file; retry now
            self.open_fresh()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::other("log file not open"))?;

        file.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::file_manager(
                self.current_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += size;
        Ok(())
    }

    /// Close the active file and start a new one
    ///
    /// # Errors
    ///
    /// Returns an error if the new file cannot be opened.
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
        self.rotations += 1;
        self.open_fresh()
    }

    /// Rotated files in the directory, newest first
    pub fn log_files(&self) -> Vec<PathBuf> {
        list_log_files(&self.directory)
    }

    #[must_use]
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    #[must_use]
    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Number of rotations since construction
    #[must_use]
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    fn open_fresh(&mut self) -> Result<()> {
        // Best effort: the directory may have been removed underneath us
        let _ = fs::create_dir_all(&self.directory);
        self.prune();

        let path = self.next_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_rotation(
                    path.display().to_string(),
                    format!("Failed to create new log file: {}", e),
                )
            })?;

        self.file = Some(file);
        self.current_path = path;
        self.current_size = 0;
        Ok(())
    }

    /// Delete oldest files until `max_files - 1` remain
    fn prune(&self) {
        let files = self.log_files();
        if files.len() < self.max_files {
            return;
        }
        for stale in &files[self.max_files - 1..] {
            let _ = fs::remove_file(stale);
        }
    }

    fn next_path(&mut self) -> PathBuf {
        let mut stamp = Utc::now().timestamp_millis().max(self.last_stamp + 1);
        loop {
            let candidate = self
                .directory
                .join(format!("{}{}{}", LOG_FILE_PREFIX, stamp, LOG_FILE_SUFFIX));
            if !candidate.exists() {
                self.last_stamp = stamp;
                return candidate;
            }
            stamp += 1;
        }
    }
}

/// `log_*.log` files in `directory`, sorted by name descending
pub fn list_log_files(directory: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(directory) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_SUFFIX))
        })
        .map(|entry| entry.path())
        .collect();

    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_directory_and_first_file() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        let manager = FileManager::new(&log_dir, 1024, 3).unwrap();
        assert!(log_dir.is_dir());
        assert_eq!(manager.current_size(), 0);
        assert_eq!(manager.log_files(), vec![manager.current_path().to_path_buf()]);
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            FileManager::new(dir.path(), 0, 3),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            FileManager::new(dir.path(), 1024, 0),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_write_tracks_size() {
        let dir = tempdir().unwrap();
        let mut manager = FileManager::new(dir.path(), 1024, 3).unwrap();

        manager.write("hello").unwrap();
        manager.write("world").unwrap();

        assert_eq!(manager.current_size(), 12);
        let content = fs::read_to_string(manager.current_path()).unwrap();
        assert_eq!(content, "hello\nworld\n");
    }

    #[test]
    fn test_rotates_before_overflowing_write() {
        let dir = tempdir().unwrap();
        let mut manager = FileManager::new(dir.path(), 20, 10).unwrap();

        // 10 bytes per line: two fit exactly, the third rotates
        manager.write("123456789").unwrap();
        manager.write("123456789").unwrap();
        let first = manager.current_path().to_path_buf();
        manager.write("123456789").unwrap();

        assert_ne!(manager.current_path(), first);
        assert_eq!(manager.rotations(), 1);
        assert_eq!(fs::read_to_string(&first).unwrap().len(), 20);
        assert_eq!(manager.current_size(), 10);
    }

    #[test]
    fn test_retention_never_exceeds_max_files() {
        let dir = tempdir().unwrap();
        let mut manager = FileManager::new(dir.path(), 16, 3).unwrap();

        for i in 0..50 {
            manager.write(&format!("entry {:04}", i)).unwrap();
            assert!(manager.log_files().len() <= 3);
        }

        let files = manager.log_files();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], manager.current_path());
        let newest = fs::read_to_string(&files[0]).unwrap();
        assert!(newest.contains("entry 0049"));
    }

    #[test]
    fn test_prunes_stale_files_at_startup() {
        let dir = tempdir().unwrap();
        for stamp in 1..=6 {
            fs::write(dir.path().join(format!("log_{}.log", 1_000 + stamp)), "old\n").unwrap();
        }
        fs::write(dir.path().join("unrelated.txt"), "keep").unwrap();

        let manager = FileManager::new(dir.path(), 1024, 4).unwrap();
        let files = manager.log_files();

        assert_eq!(files.len(), 4);
        assert_eq!(files[0], manager.current_path());
        // Oldest went first
        assert!(!dir.path().join("log_1001.log").exists());
        assert!(dir.path().join("log_1006.log").exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_oversized_line_written_alone() {
        let dir = tempdir().unwrap();
        let mut manager = FileManager::new(dir.path(), 8, 5).unwrap();

        manager.write("tiny").unwrap();
        manager.write("a line far longer than eight bytes").unwrap();
        manager.write("tiny").unwrap();

        let files = manager.log_files();
        assert_eq!(files.len(), 3);
        let middle = fs::read_to_string(&files[1]).unwrap();
        assert_eq!(middle, "a line far longer than eight bytes\n");
    }

    #[test]
    fn test_single_file_retention() {
        let dir = tempdir().unwrap();
        let mut manager = FileManager::new(dir.path(), 10, 1).unwrap();

        for _ in 0..5 {
            manager.write("123456789").unwrap();
        }
        assert_eq!(manager.log_files().len(), 1);
    }
}
