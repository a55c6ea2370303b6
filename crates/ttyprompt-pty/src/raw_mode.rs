use anyhow::{Context, Result};
use nix::sys::termios::{self, LocalFlags, OutputFlags, SetArg, Termios};
use std::os::fd::{BorrowedFd, RawFd};

/// Raw input mode for the lifetime of the guard.
///
/// Input is unbuffered and unechoed and signals are delivered as bytes, but
/// output post-processing stays on so `\n` still returns the carriage.
pub struct RawModeGuard {
    fd: RawFd,
    original: Option<Termios>,
}

impl RawModeGuard {
    pub fn enter(fd: RawFd) -> Result<Self> {
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        let original = termios::tcgetattr(&borrowed).context("tcgetattr")?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        raw.output_flags |= OutputFlags::OPOST | OutputFlags::ONLCR;
        termios::tcsetattr(&borrowed, SetArg::TCSANOW, &raw).context("tcsetattr")?;
        Ok(Self {
            fd,
            original: Some(original),
        })
    }

    /// Restore the saved settings now, reporting failure instead of ignoring it.
    pub fn restore(mut self) -> Result<()> {
        match self.original.take() {
            Some(original) => {
                let borrowed = unsafe { BorrowedFd::borrow_raw(self.fd) };
                termios::tcsetattr(&borrowed, SetArg::TCSANOW, &original)
                    .context("restore terminal settings")?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            let borrowed = unsafe { BorrowedFd::borrow_raw(self.fd) };
            let _ = termios::tcsetattr(&borrowed, SetArg::TCSANOW, &original);
        }
    }
}

/// Whether the terminal behind `fd` already has canonical input switched off.
pub fn is_raw(fd: RawFd) -> Result<bool> {
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    let current = termios::tcgetattr(&borrowed).context("tcgetattr")?;
    Ok(!current.local_flags.contains(LocalFlags::ICANON))
}
