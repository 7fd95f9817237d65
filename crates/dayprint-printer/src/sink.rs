//! Print sinks.

use std::io::Write;

use dayprint_core::{Justify, PrintInstruction, plain_text};

use crate::error::PrinterResult;

/// A destination for print instructions.
///
/// Instructions are applied in order as they arrive, so whatever was sent
/// before a later failure has already left the machine.
pub trait PrintSink {
    /// Applies one instruction.
    fn execute(&mut self, instruction: &PrintInstruction) -> PrinterResult<()>;

    /// Flushes anything buffered. Called once, after the last instruction.
    fn finish(&mut self) -> PrinterResult<()>;

    /// Applies a batch of instructions in order.
    fn execute_all(&mut self, instructions: &[PrintInstruction]) -> PrinterResult<()> {
        for instruction in instructions {
            self.execute(instruction)?;
        }
        Ok(())
    }
}

/// Writes the plain-text rendering of each instruction.
#[derive(Debug)]
pub struct TextSink<W: Write> {
    writer: W,
    width: Option<usize>,
    justify: Justify,
}

impl<W: Write> TextSink<W> {
    /// Creates a preview sink. With a width, centered lines are padded.
    pub fn new(writer: W, width: Option<usize>) -> Self {
        Self {
            writer,
            width,
            justify: Justify::Left,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PrintSink for TextSink<W> {
    fn execute(&mut self, instruction: &PrintInstruction) -> PrinterResult<()> {
        if let PrintInstruction::Justify(j) = instruction {
            self.justify = *j;
            return Ok(());
        }
        let text = plain_text(
            &[PrintInstruction::Justify(self.justify), instruction.clone()],
            self.width,
        );
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> PrinterResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
