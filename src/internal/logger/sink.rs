// src/internal/logger/sink.rs

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing_subscriber::fmt::MakeWriter;

/// Identity of the active sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    Stdout,
    Stderr,
    File(PathBuf),
}

/// Destination for rendered log bytes.
#[derive(Debug, Clone)]
pub enum Sink {
    Stdout,
    Stderr,
    File {
        path: PathBuf,
        file: Arc<Mutex<File>>,
    },
}

impl Sink {
    /// Resolve a configured output name, opening the file for paths.
    pub fn open(output: &str) -> io::Result<Self> {
        match output {
            "stdout" => Ok(Sink::Stdout),
            "stderr" => Ok(Sink::Stderr),
            path => {
                let file = open_log_file(Path::new(path))?;
                Ok(Sink::File {
                    path: PathBuf::from(path),
                    file: Arc::new(Mutex::new(file)),
                })
            }
        }
    }

    pub fn kind(&self) -> SinkKind {
        match self {
            Sink::Stdout => SinkKind::Stdout,
            Sink::Stderr => SinkKind::Stderr,
            Sink::File { path, .. } => SinkKind::File(path.clone()),
        }
    }
}

/// Open a log file for appending, creating it owner read/write if absent.
/// Parent directories must already exist.
fn open_log_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

/// Swappable sink shared between the configuration side and the `fmt` layer.
#[derive(Debug, Clone)]
pub struct ActiveSink(Arc<RwLock<Sink>>);

impl ActiveSink {
    pub fn new(sink: Sink) -> Self {
        Self(Arc::new(RwLock::new(sink)))
    }

    pub fn kind(&self) -> SinkKind {
        self.0.read().unwrap_or_else(PoisonError::into_inner).kind()
    }

    /// Install a new sink. The old one is dropped here; an open file closes
    /// once the last writer holding it is done.
    pub fn replace(&self, sink: Sink) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = sink;
    }
}

/// Per-record writer handed out to the `fmt` layer.
pub enum SinkWriter {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    File(Arc<Mutex<File>>),
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Stdout(out) => out.write(buf),
            SinkWriter::Stderr(err) => err.write(buf),
            SinkWriter::File(file) => file.lock().unwrap_or_else(PoisonError::into_inner).write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            SinkWriter::Stdout(out) => out.lock().write_all(buf),
            SinkWriter::Stderr(err) => err.lock().write_all(buf),
            SinkWriter::File(file) => file
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Stdout(out) => out.flush(),
            SinkWriter::Stderr(err) => err.flush(),
            SinkWriter::File(file) => file.lock().unwrap_or_else(PoisonError::into_inner).flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for ActiveSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match &*self.0.read().unwrap_or_else(PoisonError::into_inner) {
            Sink::Stdout => SinkWriter::Stdout(io::stdout()),
            Sink::Stderr => SinkWriter::Stderr(io::stderr()),
            Sink::File { file, .. } => SinkWriter::File(Arc::clone(file)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_streams_by_name() {
        assert_eq!(Sink::open("stdout").unwrap().kind(), SinkKind::Stdout);
        assert_eq!(Sink::open("stderr").unwrap().kind(), SinkKind::Stderr);
    }

    #[test]
    fn opens_file_for_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "existing\n").unwrap();

        let sink = ActiveSink::new(Sink::open(path.to_str().unwrap()).unwrap());
        assert_eq!(sink.kind(), SinkKind::File(path.clone()));
        sink.make_writer().write_all(b"appended\n").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing\nappended\n");
    }

    #[cfg(unix)]
    #[test]
    fn new_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.log");
        Sink::open(path.to_str().unwrap()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
        assert_eq!(mode & 0o600, 0o600);
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("app.log");
        let err = Sink::open(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn replace_switches_writer() {
        let sink = ActiveSink::new(Sink::Stdout);
        let shared = sink.clone();
        shared.replace(Sink::Stderr);
        assert_eq!(sink.kind(), SinkKind::Stderr);
        assert!(matches!(sink.make_writer(), SinkWriter::Stderr(_)));
    }
}
