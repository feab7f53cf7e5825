//! Line readers for live descriptors and regular files.
//!
//! A live source (pipe, socket, terminal) is read one byte at a time in
//! non-blocking mode, waiting in `poll(2)` between bytes. The wait is bounded
//! by a deadline so the ingestion loop regains control at the refresh rate
//! even in the middle of a line. Regular files are read with ordinary
//! buffered blocking reads.

use std::fs::File;
use std::io::{self, BufRead, Read};
use std::os::fd::{AsFd, AsRawFd, RawFd};
use std::time::Instant;

/// One complete input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Raw bytes, including the `\n` terminator when there was one.
    pub raw: Vec<u8>,
    /// True if a read hit would-block while this line was being accumulated,
    /// i.e. the reader had drained everything the source had to offer.
    pub caught_up: bool,
}

impl Line {
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(Line),
    /// The deadline passed before a newline was seen. The partial line is kept.
    Timeout,
    Eof,
}

/// What kind of descriptor the input is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Pipe, socket, terminal or anything else that can stall.
    Live,
    /// A regular file, read to completion before the first render.
    File,
}

impl SourceKind {
    pub fn of(file: &File) -> io::Result<Self> {
        if file.metadata()?.file_type().is_file() {
            Ok(SourceKind::File)
        } else {
            Ok(SourceKind::Live)
        }
    }
}

/// Unbuffered handle on standard input.
///
/// `std::io::Stdin` keeps its own buffer, which would hide ready bytes from
/// `poll`; a duplicated descriptor wrapped in a `File` does not.
pub fn stdin_file() -> io::Result<File> {
    let fd = io::stdin().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}

// ─────────────────────────────────────────────────────────────────────────────
// Live reader
// ─────────────────────────────────────────────────────────────────────────────

/// Non-blocking, deadline-interruptible line reader.
///
/// Not meant to be shared: the partial-line buffer belongs to the single
/// caller and survives `Timeout` results.
pub struct LineReader<R> {
    inner: R,
    partial: Vec<u8>,
    caught_up: bool,
    eof_pending: bool,
}

impl<R: Read + AsRawFd> LineReader<R> {
    /// Wrap `inner`, switching its descriptor to non-blocking mode.
    pub fn new(inner: R) -> io::Result<Self> {
        set_nonblocking(inner.as_raw_fd())?;
        Ok(Self {
            inner,
            partial: Vec::new(),
            caught_up: false,
            eof_pending: false,
        })
    }

    /// Bytes of the line currently being accumulated.
    pub fn partial(&self) -> &[u8] {
        &self.partial
    }

    /// Read until a newline, the deadline, or end of stream.
    ///
    /// `None` waits as long as it takes. A zero-byte read at line start is
    /// `Eof`; in the middle of a line the partial line is returned first and
    /// `Eof` follows on the next call.
    pub fn read_line_or_timeout(&mut self, deadline: Option<Instant>) -> io::Result<ReadOutcome> {
        if self.eof_pending {
            return Ok(ReadOutcome::Eof);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => {
                    if self.partial.is_empty() {
                        return Ok(ReadOutcome::Eof);
                    }
                    self.eof_pending = true;
                    return Ok(ReadOutcome::Line(self.take_line()));
                }
                Ok(_) => {
                    self.partial.push(byte[0]);
                    if byte[0] == b'\n' {
                        return Ok(ReadOutcome::Line(self.take_line()));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.caught_up = true;
                    if !wait_readable(self.inner.as_raw_fd(), deadline)? {
                        return Ok(ReadOutcome::Timeout);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn take_line(&mut self) -> Line {
        let line = Line {
            raw: std::mem::take(&mut self.partial),
            caught_up: self.caught_up,
        };
        self.caught_up = false;
        line
    }
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    // SAFETY: fcntl on a descriptor we borrow; no memory is passed.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if flags & libc::O_NONBLOCK != 0 {
        return Ok(());
    }
    // SAFETY: as above.
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Wait until `fd` is readable or the deadline passes. Returns `false` on
/// timeout. An interrupted wait reports readable so the caller re-reads and
/// re-evaluates the deadline.
fn wait_readable(fd: RawFd, deadline: Option<Instant>) -> io::Result<bool> {
    let timeout_ms: libc::c_int = match deadline {
        None => -1,
        Some(d) => {
            let remaining = d.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }
            let ms = remaining.as_micros().div_ceil(1000);
            ms.min(libc::c_int::MAX as u128) as libc::c_int
        }
    };
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // SAFETY: one valid pollfd on the stack.
    let ret = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
    if ret < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(true);
        }
        return Err(err);
    }
    Ok(ret > 0)
}

// ─────────────────────────────────────────────────────────────────────────────
// File reader
// ─────────────────────────────────────────────────────────────────────────────

/// Blocking line reader for regular files.
pub struct FileLineReader<R> {
    inner: R,
}

impl<R: BufRead> FileLineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Next line with its terminator, or `None` at end of file.
    pub fn read_line(&mut self) -> io::Result<Option<Line>> {
        let mut raw = Vec::new();
        if self.inner.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        Ok(Some(Line {
            raw,
            caught_up: true,
        }))
    }
}
