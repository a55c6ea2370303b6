use crate::raw_mode::{self, RawModeGuard};
use anyhow::{bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

const DEFAULT_COLUMNS: u16 = 80;
const DEFAULT_ROWS: u16 = 24;
const CURSOR_REPORT_TIMEOUT_MS: i32 = 500;
const CURSOR_QUERY: &[u8] = b"\x1b[6n";

/// Everything the line editor needs from the terminal device.
pub trait Terminal {
    /// Open the input device for blocking reads. Called once per prompt.
    fn open(&mut self) -> Result<()>;
    /// Close the input device. Safe to call when already closed.
    fn close(&mut self) -> Result<()>;
    /// Switch raw mode on or off. Returns whether it was on before the call.
    fn set_raw_mode(&mut self, raw: bool) -> Result<bool>;
    /// One blocking read of at most `buf.len()` bytes.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize>;
    /// Write and flush.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    /// `(columns, rows)`.
    fn size(&self) -> (u16, u16);
    /// 1-based `(row, col)` of the terminal cursor. Requires raw mode.
    fn cursor_position(&mut self) -> Result<(u16, u16)>;
}

/// The controlling terminal: input from `/dev/tty`, output to stdout.
pub struct TtyTerminal {
    path: PathBuf,
    device: Option<File>,
    raw: Option<RawModeGuard>,
}

impl TtyTerminal {
    pub fn new() -> Self {
        Self::with_path("/dev/tty")
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            device: None,
            raw: None,
        }
    }

    fn device_fd(&self) -> Result<RawFd> {
        match &self.device {
            Some(file) => Ok(file.as_raw_fd()),
            None => bail!("terminal {} is not open", self.path.display()),
        }
    }

    fn device_read(&self, buf: &mut [u8]) -> Result<usize> {
        let fd = self.device_fd()?;
        loop {
            match nix::unistd::read(fd, buf) {
                Ok(n) => return Ok(n),
                Err(nix::errno::Errno::EINTR) => continue,
                Err(e) => return Err(e).context("read from terminal"),
            }
        }
    }

    fn wait_readable(&self, timeout_ms: i32) -> Result<bool> {
        let mut fds = [libc::pollfd {
            fd: self.device_fd()?,
            events: libc::POLLIN,
            revents: 0,
        }];
        let ret = unsafe { libc::poll(fds.as_mut_ptr(), 1, timeout_ms) };
        if ret < 0 {
            bail!("poll on terminal failed");
        }
        Ok(ret > 0 && fds[0].revents & libc::POLLIN != 0)
    }
}

impl Default for TtyTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for TtyTerminal {
    fn open(&mut self) -> Result<()> {
        if self.device.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        tracing::debug!("opened {}", self.path.display());
        self.device = Some(file);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Dropping a live guard puts back whatever mode we found.
        self.raw = None;
        if self.device.take().is_some() {
            tracing::debug!("closed {}", self.path.display());
        }
        Ok(())
    }

    fn set_raw_mode(&mut self, raw: bool) -> Result<bool> {
        let fd = self.device_fd()?;
        let was_raw = self.raw.is_some() || raw_mode::is_raw(fd)?;
        if raw {
            if !was_raw {
                self.raw = Some(RawModeGuard::enter(fd)?);
            }
        } else if let Some(guard) = self.raw.take() {
            guard.restore()?;
        }
        Ok(was_raw)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.device_read(buf)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(bytes).context("write to stdout")?;
        out.flush().context("flush stdout")?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        let fd = self.device.as_ref().map(|f| f.as_raw_fd()).unwrap_or(1);
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let ret = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };
        if ret == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
            (ws.ws_col, ws.ws_row)
        } else {
            (DEFAULT_COLUMNS, DEFAULT_ROWS)
        }
    }

    fn cursor_position(&mut self) -> Result<(u16, u16)> {
        let fd = self.device_fd()?;
        let mut written = 0;
        while written < CURSOR_QUERY.len() {
            let borrowed = unsafe { std::os::fd::BorrowedFd::borrow_raw(fd) };
            written += nix::unistd::write(borrowed, &CURSOR_QUERY[written..])
                .context("write cursor query")?;
        }

        let mut reply = Vec::with_capacity(16);
        let mut byte = [0u8; 1];
        while reply.len() < 32 {
            if !self.wait_readable(CURSOR_REPORT_TIMEOUT_MS)? {
                bail!("terminal did not report its cursor position");
            }
            if self.device_read(&mut byte)? == 0 {
                break;
            }
            reply.push(byte[0]);
            if byte[0] == b'R' {
                break;
            }
        }
        match parse_cursor_report(&reply) {
            Some(pos) => Ok(pos),
            None => bail!("malformed cursor report {:?}", String::from_utf8_lossy(&reply)),
        }
    }
}

/// Parse a `ESC [ <row> ; <col> R` cursor position report.
///
/// Bytes before the last `ESC [` are ignored (keys typed while the query was
/// in flight).
pub fn parse_cursor_report(reply: &[u8]) -> Option<(u16, u16)> {
    let start = reply.windows(2).rposition(|w| w == b"\x1b[")?;
    let body = &reply[start + 2..];
    let end = body.iter().position(|&b| b == b'R')?;
    let text = std::str::from_utf8(&body[..end]).ok()?;
    let (row, col) = text.split_once(';')?;
    let row: u16 = row.parse().ok()?;
    let col: u16 = col.parse().ok()?;
    if row == 0 || col == 0 {
        return None;
    }
    Some((row, col))
}
