//! File transport with rename-based rotation
//!
//! All file I/O happens on one dedicated writer thread fed by a channel, so
//! concurrent `log` calls never interleave partial lines or race on the
//! rotation decision. Lines land in the order `write` was called.
//!
//! When the next line would push the active file past `max_size`, the active
//! file is renamed to `<filename>.<epoch-millis>` and a fresh one is opened.
//! Backups are pruned oldest-first so the active file plus its backups never
//! exceed `max_files`.

use crate::core::{
    delivered, report_error, report_warning, strip_ansi, Delivery, LogEntry, LoggerError, Result, Transport,
    TransportOptions, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE,
};
use chrono::Utc;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;

/// Settings for a [`FileTransport`]
#[derive(Debug, Clone)]
pub struct FileTransportConfig {
    pub filename: PathBuf,
    pub max_size: u64,
    pub max_files: usize,
    pub options: TransportOptions,
}

impl FileTransportConfig {
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            max_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
            options: TransportOptions::new("file"),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Retained files, the active one included
    #[must_use = "builder methods return a new value"]
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }
}

enum Command {
    Write {
        line: String,
        ack: oneshot::Sender<Result<()>>,
    },
    Flush {
        ack: oneshot::Sender<Result<()>>,
    },
}

/// Rotating file sink
///
/// # Example
///
/// ```no_run
/// use chromalog::transports::{FileTransport, FileTransportConfig};
///
/// let transport = FileTransport::new(
///     FileTransportConfig::new("./logs/app.log")
///         .with_max_size(1024 * 1024)
///         .with_max_files(3),
/// )
/// .unwrap();
/// ```
pub struct FileTransport {
    options: TransportOptions,
    path: PathBuf,
    sender: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl FileTransport {
    /// Open (or create) the active file and start the writer thread
    ///
    /// # Errors
    ///
    /// Returns an error for invalid limits, or when the parent directory or
    /// the file cannot be created.
    pub fn new(config: FileTransportConfig) -> Result<Self> {
        if config.max_size == 0 {
            return Err(LoggerError::config("FileTransport", "max_size must be greater than 0"));
        }
        if config.max_files == 0 {
            return Err(LoggerError::config("FileTransport", "max_files must be at least 1"));
        }

        let writer = RotatingWriter::open(&config.filename, config.max_size, config.max_files)?;
        let (sender, receiver) = unbounded();
        let name = config.options.name.clone();

        let worker = thread::Builder::new()
            .name(format!("chromalog-file-{}", name))
            .spawn(move || run_writer(name, writer, receiver))
            .map_err(|e| {
                LoggerError::io_operation("spawning file writer", "Failed to start writer thread", e)
            })?;

        Ok(Self {
            options: config.options,
            path: config.filename,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn submit(&self, command: Command, ack: oneshot::Receiver<Result<()>>) -> Delivery {
        let name = self.options.name.clone();
        let queued = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(command).is_ok());

        Box::pin(async move {
            if !queued {
                return Err(LoggerError::transport_closed(name));
            }
            match ack.await {
                Ok(result) => result,
                Err(_) => Err(LoggerError::transport_closed(name)),
            }
        })
    }
}

impl Transport for FileTransport {
    fn name(&self) -> &str {
        &self.options.name
    }

    fn write(&self, entry: &Arc<LogEntry>) -> Delivery {
        if !self.options.accepts(entry) {
            return delivered();
        }

        let line = self
            .options
            .render(entry, |e| strip_ansi(&e.formatted_message));
        let (ack, done) = oneshot::channel();
        self.submit(Command::Write { line, ack }, done)
    }

    /// Resolves once every previously queued line is on disk
    fn end(&self) -> Delivery {
        let (ack, done) = oneshot::channel();
        self.submit(Command::Flush { ack }, done)
    }
}

impl Drop for FileTransport {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain and exit
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = join_writer(&self.options.name, worker) {
                report_error(&self.options.name, &e);
            }
        }
    }
}

fn join_writer(name: &str, worker: JoinHandle<()>) -> Result<()> {
    worker
        .join()
        .map_err(|_| LoggerError::transport_panic(name, "writer thread panicked"))
}

fn run_writer(name: String, mut writer: RotatingWriter, receiver: Receiver<Command>) {
    for command in receiver {
        match command {
            Command::Write { line, ack } => {
                let result = writer.write_line(&line);
                // Nobody is waiting on this delivery; report here instead
                if let Err(Err(e)) = ack.send(result) {
                    report_error(&name, &e);
                }
            }
            Command::Flush { ack } => {
                let _ = ack.send(writer.flush());
            }
        }
    }

    if let Err(e) = writer.flush() {
        report_error(&name, &e);
    }
}

/// Active file plus rotation bookkeeping, owned by the writer thread
struct RotatingWriter {
    path: PathBuf,
    directory: PathBuf,
    file_stem: String,
    file: Option<File>,
    current_size: u64,
    max_size: u64,
    max_files: usize,
    last_stamp: i64,
}

impl RotatingWriter {
    fn open(path: &Path, max_size: u64, max_files: usize) -> Result<Self> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", directory.display()),
                e,
            )
        })?;

        let file_stem = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                LoggerError::config("FileTransport", format!("'{}' is not a file path", path.display()))
            })?;

        let file = open_append(path)?;
        // Appending to an existing file continues its size accounting
        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        let writer = Self {
            path: path.to_path_buf(),
            directory,
            file_stem,
            file: Some(file),
            current_size,
            max_size,
            max_files,
            last_stamp: 0,
        };
        // Leftovers from earlier runs count against the limit too
        writer.prune(max_files - 1);
        Ok(writer)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut bytes = String::with_capacity(line.len() + 1);
        bytes.push_str(line);
        bytes.push('\n');
        let size = bytes.len() as u64;

        if self.current_size > 0 && self.current_size + size > self.max_size {
            self.rotate()?;
        }

        if self.file.is_none() {
            self.file = Some(open_append(&self.path)?);
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::other("log file not open"))?;

        file.write_all(bytes.as_bytes()).map_err(|e| {
            LoggerError::file_manager(
                self.path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += size;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush().map_err(|e| {
                LoggerError::io_operation(
                    "flushing log file",
                    format!("Failed to flush '{}'", self.path.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        if self.max_files == 1 {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)
                .map_err(|e| {
                    LoggerError::file_rotation(
                        self.path.display().to_string(),
                        format!("Failed to truncate log file: {}", e),
                    )
                })?;
            self.file = Some(file);
            self.current_size = 0;
            return Ok(());
        }

        // Room for the backup about to be created
        self.prune(self.max_files - 2);

        let backup = self.next_backup_path();
        fs::rename(&self.path, &backup).map_err(|e| {
            LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to rotate current log file: {}", e),
            )
        })?;

        self.file = Some(open_append(&self.path).map_err(|e| {
            LoggerError::file_rotation(self.path.display().to_string(), e.to_string())
        })?);
        self.current_size = 0;
        Ok(())
    }

    /// Delete oldest backups until at most `keep` remain
    fn prune(&self, keep: usize) {
        let backups = self.backups();
        if backups.len() <= keep {
            return;
        }
        for (_, stale) in &backups[..backups.len() - keep] {
            if let Err(e) = fs::remove_file(stale) {
                report_warning(format!(
                    "Failed to remove old backup {}: {}",
                    stale.display(),
                    e
                ));
            }
        }
    }

    /// Rotated backups, oldest first
    fn backups(&self) -> Vec<(i64, PathBuf)> {
        let Ok(entries) = fs::read_dir(&self.directory) else {
            return Vec::new();
        };

        let prefix = format!("{}.", self.file_stem);
        let mut backups: Vec<(i64, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let stamp = name.to_str()?.strip_prefix(&prefix)?.parse::<i64>().ok()?;
                Some((stamp, entry.path()))
            })
            .collect();

        backups.sort_by_key(|(stamp, _)| *stamp);
        backups
    }

    fn next_backup_path(&mut self) -> PathBuf {
        let mut stamp = Utc::now().timestamp_millis().max(self.last_stamp + 1);
        loop {
            let candidate = self.directory.join(format!("{}.{}", self.file_stem, stamp));
            if !candidate.exists() {
                self.last_stamp = stamp;
                return candidate;
            }
            stamp += 1;
        }
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::io_operation(
                "opening log file",
                format!("Failed to open '{}'", path.display()),
                e,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, TransportOptions};
    use futures::future::join_all;
    use tempfile::tempdir;

    fn entry(text: impl Into<String>) -> Arc<LogEntry> {
        Arc::new(LogEntry::new(LogLevel::Info, text.into()))
    }

    fn backup_count(dir: &Path, stem: &str) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|n| n.starts_with(&format!("{}.", stem)))
            })
            .count()
    }

    #[tokio::test]
    async fn test_lines_keep_call_order_without_awaiting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ordered.log");
        let transport = FileTransport::new(FileTransportConfig::new(&path)).unwrap();

        let deliveries: Vec<_> = (0..200)
            .map(|i| transport.write(&entry(format!("line {}", i))))
            .collect();
        transport.end().await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let expected: Vec<String> = (0..200).map(|i| format!("line {}", i)).collect();
        assert_eq!(content.lines().collect::<Vec<_>>(), expected);

        for outcome in join_all(deliveries).await {
            assert!(outcome.is_ok());
        }
    }

    #[tokio::test]
    async fn test_strips_color_codes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.log");
        let transport = FileTransport::new(FileTransportConfig::new(&path)).unwrap();

        let colored = LogEntry::new(LogLevel::Error, "x")
            .with_formatted_message("\x1b[31mERROR\x1b[0m disk failure");
        transport.write(&Arc::new(colored)).await.unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ERROR disk failure\n");
    }

    #[tokio::test]
    async fn test_rotation_by_projected_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let transport = FileTransport::new(
            FileTransportConfig::new(&path).with_max_size(20).with_max_files(10),
        )
        .unwrap();

        // 10 bytes per line
        for _ in 0..3 {
            transport.write(&entry("123456789")).await.unwrap();
        }

        assert_eq!(backup_count(dir.path(), "app.log"), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "123456789\n");
    }

    #[tokio::test]
    async fn test_retention_caps_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let transport = FileTransport::new(
            FileTransportConfig::new(&path).with_max_size(16).with_max_files(3),
        )
        .unwrap();

        for i in 0..40 {
            transport.write(&entry(format!("entry {:04}", i))).await.unwrap();
            // active file + backups
            assert!(backup_count(dir.path(), "app.log") + 1 <= 3);
        }

        assert_eq!(backup_count(dir.path(), "app.log"), 2);
        assert!(fs::read_to_string(&path).unwrap().contains("entry 0039"));
    }

    #[tokio::test]
    async fn test_single_file_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.log");
        let transport = FileTransport::new(
            FileTransportConfig::new(&path).with_max_size(10).with_max_files(1),
        )
        .unwrap();

        transport.write(&entry("aaaaaaaaa")).await.unwrap();
        transport.write(&entry("bbbbbbbbb")).await.unwrap();

        assert_eq!(backup_count(dir.path(), "one.log"), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "bbbbbbbbb\n");
    }

    #[tokio::test]
    async fn test_existing_file_counts_toward_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resume.log");
        fs::write(&path, "123456789\n").unwrap();

        let transport = FileTransport::new(
            FileTransportConfig::new(&path).with_max_size(15).with_max_files(2),
        )
        .unwrap();
        transport.write(&entry("abcdefghi")).await.unwrap();

        assert_eq!(backup_count(dir.path(), "resume.log"), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "abcdefghi\n");
    }

    #[tokio::test]
    async fn test_construction_prunes_stale_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        for stamp in 1001..=1006 {
            fs::write(dir.path().join(format!("app.log.{}", stamp)), "old\n").unwrap();
        }

        let transport = FileTransport::new(
            FileTransportConfig::new(&path).with_max_size(1024).with_max_files(3),
        )
        .unwrap();

        assert_eq!(backup_count(dir.path(), "app.log"), 2);
        assert!(dir.path().join("app.log.1005").exists());
        assert!(dir.path().join("app.log.1006").exists());

        transport.write(&entry("fresh")).await.unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_single_file_construction_drops_all_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.log");
        fs::write(dir.path().join("one.log.1"), "old\n").unwrap();
        fs::write(dir.path().join("one.log.2"), "old\n").unwrap();

        let _transport =
            FileTransport::new(FileTransportConfig::new(&path).with_max_files(1)).unwrap();

        assert_eq!(backup_count(dir.path(), "one.log"), 0);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_filter_and_custom_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.log");
        let transport = FileTransport::new(FileTransportConfig::new(&path).with_options(
            TransportOptions::new("audit")
                .with_level(LogLevel::Warn)
                .with_format(|e: &LogEntry| format!("{}:{}", e.level, e.formatted_message)),
        ))
        .unwrap();

        transport.write(&entry("ignored")).await.unwrap();
        transport
            .write(&Arc::new(LogEntry::new(LogLevel::Warn, "kept")))
            .await
            .unwrap();

        assert_eq!(transport.name(), "audit");
        assert_eq!(fs::read_to_string(&path).unwrap(), "warn:kept\n");
    }

    #[test]
    fn test_panicked_writer_surfaces_as_transport_error() {
        let worker = thread::spawn(|| panic!("disk vanished"));
        let err = join_writer("audit", worker).unwrap_err();
        assert_eq!(err.to_string(), "Transport 'audit' panicked: writer thread panicked");

        let worker = thread::spawn(|| {});
        assert!(join_writer("audit", worker).is_ok());
    }

    #[test]
    fn test_invalid_configuration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.log");
        assert!(FileTransport::new(FileTransportConfig::new(&path).with_max_size(0)).is_err());
        assert!(FileTransport::new(FileTransportConfig::new(&path).with_max_files(0)).is_err());
    }

    #[test]
    fn test_unwritable_directory_fails_at_construction() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "file").unwrap();

        let result = FileTransport::new(FileTransportConfig::new(blocker.join("app.log")));
        assert!(result.is_err());
    }
}
