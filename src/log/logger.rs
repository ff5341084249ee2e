use crate::{
    config::Config,
    log::{log_level::LogLevel, log_msg::LogMsg, log_sink::LogSink, logger_handle::LoggerHandle},
    sink_info,
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::mpsc::TrySendError,
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

/// Flush to disk every 100 lines if debugging/tracing.
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 100;

/// Flush to disk every 1000 lines otherwise.
#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 1_000;

const DEFAULT_APP_NAME: &str = "rtcp-feedback";

/// Bounded, non-blocking logger that writes to a per-process log file.
///
/// Producers enqueue through [`LoggerHandle`]s; one background thread drains
/// the queue into the file. The thread exits once every handle (including the
/// one held here) is dropped, flushing what it has.
pub struct Logger {
    handle: LoggerHandle,
    thread: Option<thread::JoinHandle<()>>,
    file_path: PathBuf,
}

impl Logger {
    /// Reads `[Logging] log_path` and `log_filename`; without a path the
    /// file goes to a `logs/` directory under the system temp dir.
    pub fn from_config(cap: usize, config: &Config) -> Self {
        let app_name = config.get_non_empty_or_default("Logging", "log_filename", DEFAULT_APP_NAME);
        let dir = config
            .get_non_empty("Logging", "log_path")
            .map(expand_path)
            .unwrap_or_else(|| std::env::temp_dir().join("logs"));
        Self::start_in_dir(dir, app_name, cap)
    }

    /// Starts the logger in `dir`, creating it if missing.
    ///
    /// The file is named `<app_name>-<unix secs>-pid<pid>.log`.
    pub fn start_in_dir<D: AsRef<Path>>(dir: D, app_name: &str, cap: usize) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let file_path = dir.join(format!("{app_name}-{secs}-pid{}.log", std::process::id()));

        let (handle, rx) = LoggerHandle::channel(cap);
        let worker_path = file_path.clone();

        let thread = thread::Builder::new()
            .name("logger-worker".into())
            .spawn(move || {
                // Target file -> sink (never panic).
                let writer: Box<dyn Write + Send> = match OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&worker_path)
                {
                    Ok(f) => Box::new(f),
                    Err(_) => Box::new(io::sink()),
                };
                let mut out = BufWriter::new(writer);
                let mut lines_written: u32 = 0;

                while let Ok(m) = rx.recv() {
                    let _ = writeln!(&mut out, "{}", m.to_line());
                    lines_written = lines_written.wrapping_add(1);
                    if lines_written % FLUSH_BATCH_SIZE == 0 {
                        let _ = out.flush();
                    }
                }
                let _ = out.flush();
            })
            .ok();

        let logger = Self {
            handle,
            thread,
            file_path,
        };
        sink_info!(logger.handle, "logger started: {}", logger.file_path.display());
        logger
    }

    /// Enqueues a message without blocking; see [`LoggerHandle::try_log`].
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), TrySendError<LogMsg>> {
        self.handle.try_log(level, text, target)
    }

    /// Returns a cloneable handle usable as a [`LogSink`].
    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Drops this logger's handle and waits for the worker to drain the queue.
    ///
    /// Blocks until every other [`LoggerHandle`] clone is dropped as well.
    pub fn shutdown(mut self) {
        let thread = self.thread.take();
        drop(self);
        if let Some(t) = thread {
            let _ = t.join();
        }
    }
}

/// Expands a leading `~` to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    if let Some(rest) = path_str.strip_prefix('~') {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);
        if let Some(mut home_path) = home {
            if rest.is_empty() {
                return home_path;
            }
            if let Some(tail) = rest.strip_prefix('/').or_else(|| rest.strip_prefix('\\')) {
                home_path.push(tail);
                return home_path;
            }
        }
    }
    PathBuf::from(path_str)
}
