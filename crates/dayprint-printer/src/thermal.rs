//! Command encoding for ESC/POS-style thermal receipt printers.
//!
//! The byte sequences match the small serial printers sold for hobby
//! boards (Adafruit "Mini Thermal Receipt Printer" and its clones).

use std::io::Write;

use dayprint_core::{Justify, PrintInstruction, TextSize};
use tracing::debug;

use crate::error::PrinterResult;
use crate::sink::PrintSink;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// Print-mode bit that selects emphasized (bold) text.
const BOLD_MASK: u8 = 1 << 3;

/// Dots of heating, heat time (x10 us) and heat interval (x10 us) sent on
/// startup.
const HEAT_DOTS: u8 = 11;
const HEAT_TIME: u8 = 120;
const HEAT_INTERVAL: u8 = 40;

/// Degree sign in the printer's code page 437.
const DEGREE: u8 = 0xF8;

/// A thermal printer behind any byte writer (usually the serial device).
#[derive(Debug)]
pub struct ThermalPrinter<W: Write> {
    writer: W,
    print_mode: u8,
}

impl<W: Write> ThermalPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            print_mode: 0,
        }
    }

    /// Resets the printer and sends the heating configuration.
    pub fn begin(&mut self) -> PrinterResult<()> {
        self.write(&[ESC, b'@'])?;
        self.write(&[ESC, b'7', HEAT_DOTS, HEAT_TIME, HEAT_INTERVAL])?;
        self.print_mode = 0;
        debug!("printer initialized");
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, bytes: &[u8]) -> PrinterResult<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn set_print_mode_bit(&mut self, mask: u8, on: bool) -> PrinterResult<()> {
        if on {
            self.print_mode |= mask;
        } else {
            self.print_mode &= !mask;
        }
        self.write(&[ESC, b'!', self.print_mode])
    }
}

/// Encodes one line of text for the printer's single-byte code page.
///
/// ASCII passes through, the degree sign maps to its code page byte and
/// anything else prints as `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '°' => DEGREE,
            c if c.is_ascii() => c as u8,
            _ => b'?',
        })
        .collect()
}

fn size_byte(size: TextSize) -> u8 {
    match size {
        TextSize::Small => 0x00,
        TextSize::Medium => 0x01,
        TextSize::Large => 0x11,
    }
}

fn justify_byte(justify: Justify) -> u8 {
    match justify {
        Justify::Left => 0,
        Justify::Center => 1,
        Justify::Right => 2,
    }
}

impl<W: Write> PrintSink for ThermalPrinter<W> {
    fn execute(&mut self, instruction: &PrintInstruction) -> PrinterResult<()> {
        match instruction {
            PrintInstruction::Text(text) => {
                let mut bytes = encode_text(text);
                bytes.push(b'\n');
                self.write(&bytes)
            }
            PrintInstruction::Bold(on) => self.set_print_mode_bit(BOLD_MASK, *on),
            PrintInstruction::Underline(on) => self.write(&[ESC, b'-', u8::from(*on)]),
            PrintInstruction::Justify(j) => self.write(&[ESC, b'a', justify_byte(*j)]),
            PrintInstruction::Size(s) => self.write(&[GS, b'!', size_byte(*s)]),
            PrintInstruction::Feed(lines) => self.write(&[ESC, b'd', *lines]),
        }
    }

    fn finish(&mut self) -> PrinterResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
