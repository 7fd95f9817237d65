//! Thermal receipt printer output.
//!
//! - [`PrintSink`] - where rendered [`dayprint_core::PrintInstruction`]s go
//! - [`ThermalPrinter`] - encodes instructions as printer command bytes
//! - [`TextSink`] - plain-text preview, for dry runs
//! - [`open_serial`] - opens and configures the printer's serial device

pub mod error;
pub mod serial;
pub mod sink;
pub mod thermal;

pub use error::{PrinterError, PrinterResult};
pub use serial::{SUPPORTED_BAUD_RATES, SerialSettings, open_serial};
pub use sink::{PrintSink, TextSink};
pub use thermal::ThermalPrinter;
