use crate::{
    config::Config,
    log::{log_level::LogLevel, log_msg::LogMsg, logger_handle::LoggerHandle},
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::mpsc::{self, TrySendError},
    thread::{self, JoinHandle},
    time::{SystemTime, UNIX_EPOCH},
};

/// Flush every 100 lines when debugging so crashes leave a useful tail.
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 100;

#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 1_000;

/// Default capacity of the log queue.
pub const DEFAULT_LOG_CAPACITY: usize = 4_096;

/// Bounded, non-blocking logger writing to a per-process log file.
///
/// Producers (the dispatcher and sender threads) push `LogMsg` into a bounded
/// `mpsc` channel through cloneable [`LoggerHandle`]s; a `logger-worker`
/// thread drains the channel into the file and flushes in batches.
pub struct Logger {
    handle: LoggerHandle,
    thread: Option<JoinHandle<()>>,
    file_path: PathBuf,
}

impl Logger {
    /// Starts the logger from the `[logging]` section of `config`.
    ///
    /// Keys: `log_path` (directory, `~` expanded) and `log_filename` (prefix).
    /// Without `log_path` the file goes to `logs/` next to the executable.
    #[must_use]
    pub fn from_config(config: &Config, cap: usize) -> Self {
        let app_name = config.get_non_empty("logging", "log_filename");
        match config.get_non_empty("logging", "log_path") {
            Some(dir) => Self::start_in_dir(expand_path(dir), app_name, cap),
            None => Self::start_default(app_name, cap),
        }
    }

    /// Creates a `logs/` directory next to the executable and logs there.
    #[must_use]
    pub fn start_default(app_name: Option<&str>, cap: usize) -> Self {
        let base = exe_dir_fallback_cwd().join("logs");
        Self::start_in_dir(base, app_name, cap)
    }

    /// Starts the logger in `dir`, creating it when missing.
    ///
    /// The file is named `<app_name>-<unix secs>-pid<pid>.log`. If the file
    /// cannot be opened the worker falls back to a temp file, then to a sink;
    /// it never panics.
    pub fn start_in_dir<D: AsRef<Path>>(dir: D, app_name: Option<&str>, cap: usize) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let pid = std::process::id();
        let fname = match app_name {
            Some(name) => format!("{name}-{secs}-pid{pid}.log"),
            None => format!("rustyrtp-{secs}-pid{pid}.log"),
        };
        let file_path = dir.join(fname);

        let (tx, rx) = mpsc::sync_channel::<LogMsg>(cap.max(1));
        let worker_path = file_path.clone();

        let thread = thread::Builder::new()
            .name("logger-worker".into())
            .spawn(move || {
                let writer: Box<dyn Write + Send> = match OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&worker_path)
                {
                    Ok(f) => Box::new(f),
                    Err(_) => {
                        let fallback = std::env::temp_dir().join("rustyrtp-fallback.log");
                        match OpenOptions::new().create(true).append(true).open(fallback) {
                            Ok(f) => Box::new(f),
                            Err(_) => Box::new(io::sink()),
                        }
                    }
                };
                let mut out = BufWriter::new(writer);
                let mut lines_written: u32 = 0;

                while let Ok(m) = rx.recv() {
                    let _ = writeln!(
                        &mut out,
                        "[{:?}] {} {} | {}",
                        m.level, m.ts_ms, m.target, m.text
                    );
                    lines_written = lines_written.wrapping_add(1);
                    if lines_written % FLUSH_BATCH_SIZE == 0 || m.level >= LogLevel::Warn {
                        let _ = out.flush();
                    }
                }
                let _ = out.flush();
            })
            .ok();

        Self {
            handle: LoggerHandle { tx },
            thread,
            file_path,
        }
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

    /// Cloneable sink to hand to dispatchers and senders.
    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Closes the queue and waits for the worker to flush.
    ///
    /// Blocks until every [`LoggerHandle`] cloned from this logger is dropped.
    pub fn shutdown(self) {
        let Logger { handle, thread, .. } = self;
        drop(handle);
        if let Some(t) = thread {
            let _ = t.join();
        }
    }
}

fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Expands a leading `~` to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .map(PathBuf::from);
    match (path_str, home) {
        ("~", Some(home)) => home,
        (p, Some(mut home)) if p.starts_with("~/") || p.starts_with("~\\") => {
            home.push(&p[2..]);
            home
        }
        (p, _) => PathBuf::from(p),
    }
}
