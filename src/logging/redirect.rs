//! Process-level capture of file descriptor 1.
//!
//! `StreamCapture` only sees text handed to it. Output written straight to
//! stdout (`println!`, child libraries, C code) bypasses it, so this module
//! points fd 1 at a pipe and feeds whatever arrives there into a capture.
//!
//! # Design Decisions
//! - A dedicated reader thread drains the pipe line by line; it exits when
//!   every write end is closed
//! - The terminal stays reachable through a duplicate of the original fd.
//!   The console sink must write there, or its own output would loop back
//!   into the pipe

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::thread::JoinHandle;

use crate::logging::capture::StreamCapture;
use crate::logging::level::Level;
use crate::logging::logger::Logger;

/// Duplicate of the current fd 1.
pub fn duplicate_stdout() -> io::Result<File> {
    // SAFETY: `dup` takes no pointers; the result is checked below.
    let fd = unsafe { libc::dup(libc::STDOUT_FILENO) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `fd` was just returned by `dup` and nothing else owns it.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// Active redirection of fd 1; restores the original stdout when dropped.
#[derive(Debug)]
pub struct StdoutRedirect {
    original: OwnedFd,
    reader: Option<JoinHandle<()>>,
}

impl StdoutRedirect {
    /// Route fd 1 into a capture over `logger` at `level`.
    pub fn install(logger: Logger, level: Level) -> io::Result<Self> {
        io::stdout().flush()?;
        let original = OwnedFd::from(duplicate_stdout()?);

        let mut fds = [0; 2];
        // SAFETY: `fds` is a writable two-element array, as `pipe` requires.
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `pipe` succeeded, so both descriptors are open and unowned.
        let (read_end, write_end) = unsafe { (File::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

        let capture = StreamCapture::new(logger).with_level(level);
        let reader = std::thread::Builder::new()
            .name("stdout-capture".to_string())
            .spawn(move || pump(read_end, &capture))?;

        // SAFETY: both descriptors are open; `dup2` replaces fd 1 atomically.
        if unsafe { libc::dup2(write_end.as_raw_fd(), libc::STDOUT_FILENO) } < 0 {
            let error = io::Error::last_os_error();
            drop(write_end);
            let _ = reader.join();
            return Err(error);
        }
        drop(write_end);

        tracing::debug!("stdout redirected into the log pipeline");
        Ok(Self {
            original,
            reader: Some(reader),
        })
    }

    /// Writable handle on the stdout that was in place before the redirect.
    pub fn original_stdout(&self) -> io::Result<File> {
        Ok(File::from(self.original.try_clone()?))
    }

    /// Put the original stdout back and wait for pending lines to be logged.
    pub fn restore(mut self) -> io::Result<()> {
        self.release()
    }

    fn release(&mut self) -> io::Result<()> {
        let Some(reader) = self.reader.take() else {
            return Ok(());
        };
        let _ = io::stdout().flush();

        // SAFETY: `original` is an open descriptor owned by `self`.
        if unsafe { libc::dup2(self.original.as_raw_fd(), libc::STDOUT_FILENO) } < 0 {
            // fd 1 still feeds the pipe, so the reader cannot finish.
            return Err(io::Error::last_os_error());
        }
        if reader.join().is_err() {
            return Err(io::Error::other("stdout capture thread panicked"));
        }
        Ok(())
    }
}

impl Drop for StdoutRedirect {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            let _ = writeln!(io::stderr(), "logging: failed to restore stdout: {}", e);
        }
    }
}

fn pump(read_end: File, mut capture: &StreamCapture) {
    let mut reader = BufReader::new(read_end);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                let _ = capture.write_all(&line);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = writeln!(io::stderr(), "logging: stdout capture stopped: {}", e);
                break;
            }
        }
    }
}
