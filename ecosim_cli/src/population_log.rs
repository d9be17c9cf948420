// Population log: one CSV row per snapshot.
//
// Columns are `tick,herbivores,predators,grass`. The writer is generic so
// tests can log into a `Vec<u8>`; the binary wraps a `BufWriter<File>`.
//
// See also: `main.rs`, `ecosim_sim::snapshot` for the values written.

use ecosim_sim::WorldSnapshot;
use std::io::{self, Write};

pub const HEADER: &str = "tick,herbivores,predators,grass";

pub struct PopulationLog<W: Write> {
    out: W,
    rows: u64,
}

impl<W: Write> PopulationLog<W> {
    /// Start a log, writing the header line immediately.
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{HEADER}")?;
        Ok(Self { out, rows: 0 })
    }

    pub fn record(&mut self, snapshot: &WorldSnapshot) -> io::Result<()> {
        let (tick, herbivores, predators, grass) = snapshot.counts();
        writeln!(self.out, "{tick},{herbivores},{predators},{grass}")?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
