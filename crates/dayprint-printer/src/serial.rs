//! Serial device setup.
//!
//! On Unix the port is put into raw mode at the requested baud rate with a
//! bounded read timeout. A path that is not a terminal (a regular file or a
//! FIFO) is written to as-is, which is handy for capturing output.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{PrinterError, PrinterResult};
use crate::thermal::ThermalPrinter;

pub const DEFAULT_DEVICE: &str = "/dev/ttyAMA0";
pub const DEFAULT_BAUD_RATE: u32 = 19200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const SUPPORTED_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

/// Where the printer is attached and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub device: PathBuf,
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SerialSettings {
    /// Opens the device and initializes the printer on it.
    pub fn open_printer(&self) -> PrinterResult<ThermalPrinter<File>> {
        let file = open_serial(&self.device, self.baud_rate, self.timeout)?;
        let mut printer = ThermalPrinter::new(file);
        printer.begin()?;
        info!("printer ready on {}", self.device.display());
        Ok(printer)
    }
}

/// Opens a serial device for writing.
///
/// # Errors
///
/// [`PrinterError::UnsupportedBaud`] for a rate outside 9600-115200,
/// [`PrinterError::Open`] if the path cannot be opened and
/// [`PrinterError::Configure`] if terminal setup fails.
pub fn open_serial(path: &Path, baud_rate: u32, timeout: Duration) -> PrinterResult<File> {
    if !SUPPORTED_BAUD_RATES.contains(&baud_rate) {
        return Err(PrinterError::UnsupportedBaud(baud_rate));
    }

    let mut options = OpenOptions::new();
    options.read(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOCTTY);
    }

    let file = options
        .open(path)
        .map_err(|e| PrinterError::open(path, e))?;

    #[cfg(unix)]
    configure_tty(&file, baud_rate, timeout).map_err(|e| PrinterError::configure(path, e))?;
    #[cfg(not(unix))]
    let _ = timeout;

    debug!("opened {} at {} baud", path.display(), baud_rate);
    Ok(file)
}

#[cfg(unix)]
fn speed(baud_rate: u32) -> libc::speed_t {
    match baud_rate {
        9600 => libc::B9600,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        _ => libc::B19200,
    }
}

/// Raw 8N1 at `baud_rate`, reads return after `timeout` (VTIME is in
/// tenths of a second, capped at 25.5 s).
#[cfg(unix)]
fn configure_tty(file: &File, baud_rate: u32, timeout: Duration) -> std::io::Result<()> {
    use std::io;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    let mut tty = std::mem::MaybeUninit::<libc::termios>::uninit();

    // SAFETY: fd is open for the lifetime of `file`; tcgetattr fills `tty`.
    if unsafe { libc::tcgetattr(fd, tty.as_mut_ptr()) } != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ENOTTY) {
            debug!("not a terminal, writing without line setup");
            return Ok(());
        }
        return Err(err);
    }
    // SAFETY: tcgetattr succeeded, so the struct is initialized.
    let mut tty = unsafe { tty.assume_init() };

    let deciseconds = (timeout.as_millis() / 100).min(u128::from(u8::MAX)) as libc::cc_t;

    // SAFETY: tty is a valid termios value owned by this frame.
    unsafe {
        libc::cfmakeraw(&mut tty);
        if libc::cfsetispeed(&mut tty, speed(baud_rate)) != 0
            || libc::cfsetospeed(&mut tty, speed(baud_rate)) != 0
        {
            return Err(io::Error::last_os_error());
        }
    }
    tty.c_cflag |= libc::CLOCAL | libc::CREAD;
    tty.c_cflag &= !(libc::CSTOPB | libc::PARENB);
    tty.c_cc[libc::VMIN] = 0;
    tty.c_cc[libc::VTIME] = deciseconds;

    // SAFETY: fd is valid and tty is fully initialized.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tty) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
