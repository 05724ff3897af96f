//! Result writers for `partmatch run`.
//!
//! - `text`: `part;master` per line, `part;` when unmatched
//! - `csv`: `part,master,tier` with a header row
//! - `json`: the full run result, pretty-printed

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use partmatch_recon::config::{LineEnding, OutputFormat};
use partmatch_recon::{MatchRow, ReconResult};

use crate::exit_codes::EXIT_IO;
use crate::CliError;

/// Resolved output settings after CLI flags are merged over the config file.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub delimiter: u8,
    pub line_ending: LineEnding,
}

/// Write results to `path`, or to stdout when `path` is `-`.
pub fn write_results(path: &Path, opts: OutputOptions, result: &ReconResult) -> Result<(), CliError> {
    let io_err = |e: io::Error| CliError {
        code: EXIT_IO,
        message: format!("cannot write {}: {e}", path.display()),
        hint: None,
    };

    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        write_to(&mut out, opts, result).map_err(io_err)?;
        return out.flush().map_err(io_err);
    }

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    write_to(&mut out, opts, result).map_err(io_err)?;
    out.flush().map_err(io_err)
}

pub fn write_to<W: Write>(out: &mut W, opts: OutputOptions, result: &ReconResult) -> io::Result<()> {
    match opts.format {
        OutputFormat::Text => write_text(out, &result.rows, opts.delimiter, opts.line_ending),
        OutputFormat::Csv => write_csv(out, &result.rows, opts.line_ending),
        OutputFormat::Json => write_json(out, result, opts.line_ending),
    }
}

// ── Text ────────────────────────────────────────────────────────────

pub fn write_text<W: Write>(
    out: &mut W,
    rows: &[MatchRow],
    delimiter: u8,
    line_ending: LineEnding,
) -> io::Result<()> {
    let eol = line_ending.as_bytes();
    for row in rows {
        out.write_all(row.part.as_bytes())?;
        out.write_all(&[delimiter])?;
        if let Some(master) = &row.master {
            out.write_all(master.as_bytes())?;
        }
        out.write_all(eol)?;
    }
    Ok(())
}

// ── CSV ─────────────────────────────────────────────────────────────

pub fn write_csv<W: Write>(out: &mut W, rows: &[MatchRow], line_ending: LineEnding) -> io::Result<()> {
    let terminator = match line_ending {
        LineEnding::Lf => csv::Terminator::Any(b'\n'),
        LineEnding::Crlf => csv::Terminator::CRLF,
    };
    let mut wtr = csv::WriterBuilder::new().terminator(terminator).from_writer(out);

    wtr.write_record(["part", "master", "tier"])?;
    for row in rows {
        let tier = row.tier.map(|t| t.to_string()).unwrap_or_default();
        wtr.write_record([
            row.part.as_str(),
            row.master.as_deref().unwrap_or(""),
            tier.as_str(),
        ])?;
    }
    wtr.flush()
}

// ── JSON ────────────────────────────────────────────────────────────

pub fn write_json<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
    line_ending: LineEnding,
) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    out.write_all(line_ending.as_bytes())
}
