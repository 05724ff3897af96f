//! `partmatch run | validate | lookup`: batch reconciliation and ad-hoc lookups.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Subcommand, ValueEnum};
use serde::Serialize;

use partmatch_recon::catalog::MasterCatalog;
use partmatch_recon::config::{LineEnding, OutputFormat};
use partmatch_recon::model::ReconMeta;
use partmatch_recon::source::split_records;
use partmatch_recon::{MasterLookup, MatchRow, ReconConfig, ReconError, ReconInput, ReconSummary};

use crate::exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_IO, EXIT_USAGE};
use crate::export::{self, OutputOptions};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Match every part code against the master parts list
    #[command(after_help = "\
Examples:
  partmatch run parts.txt master-parts.txt results.txt
  partmatch run parts.txt master-parts.txt results.csv --format csv
  partmatch run parts.txt master-parts.txt - --delimiter '|' --quiet
  partmatch run parts.txt master-parts.txt results.txt --config nightly.toml --json")]
    Run {
        /// Part codes, one per line
        parts: PathBuf,

        /// Master part codes, one per line
        masters: PathBuf,

        /// Results file (`-` for stdout)
        results: PathBuf,

        /// TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(long, short = 'f')]
        format: Option<FormatArg>,

        /// Field delimiter for text output (overrides config)
        #[arg(long, short = 'd')]
        delimiter: Option<char>,

        /// Terminate result lines with CRLF
        #[arg(long)]
        crlf: bool,

        /// Worker threads (overrides config)
        #[arg(long, short = 'j', env = "PARTMATCH_THREADS")]
        threads: Option<usize>,

        /// Write the run summary as JSON to this file
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Print the run summary as JSON on stdout instead of the match count
        #[arg(long)]
        json: bool,

        /// Suppress the human summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  partmatch validate nightly.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },

    /// Look up part codes against the master list (suffix and hyphen-insensitive tiers)
    #[command(after_help = "\
Examples:
  partmatch lookup master-parts.txt 100200 x100200
  partmatch lookup master-parts.txt QZ1 --json")]
    Lookup {
        /// Master part codes, one per line
        masters: PathBuf,

        /// Codes to look up
        #[arg(required = true)]
        codes: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Text,
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run {
            parts,
            masters,
            results,
            config,
            format,
            delimiter,
            crlf,
            threads,
            summary_json,
            json,
            quiet,
        } => {
            let overrides = Overrides { format, delimiter, crlf, threads, summary_json };
            cmd_run(parts, masters, results, config, overrides, json, quiet)
        }
        ReconCommands::Validate { config } => cmd_validate(config),
        ReconCommands::Lookup { masters, codes, json } => cmd_lookup(masters, codes, json),
    }
}

fn recon_err(err: ReconError) -> CliError {
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint: None }
}

fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path)
        .map_err(|e| CliError { code: EXIT_IO, message: format!("cannot read {}: {e}", path.display()), hint: None })
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_IO,
        message: format!("cannot read config: {e}"),
        hint: None,
    })?;
    ReconConfig::from_toml(&config_str).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: format!("{}: {e}", path.display()),
        hint: None,
    })
}

// ============================================================================
// run
// ============================================================================

/// Command-line values that take precedence over the config file.
struct Overrides {
    format: Option<FormatArg>,
    delimiter: Option<char>,
    crlf: bool,
    threads: Option<usize>,
    summary_json: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut ReconConfig) -> Result<Option<PathBuf>, CliError> {
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        if let Some(delimiter) = self.delimiter {
            config.output.delimiter = delimiter.to_string();
        }
        if self.crlf {
            config.output.line_ending = LineEnding::Crlf;
        }
        if self.threads.is_some() {
            config.engine.threads = self.threads;
        }

        config.validate().map_err(|e| CliError {
            code: EXIT_USAGE,
            message: e.to_string(),
            hint: Some("check --delimiter and --threads".into()),
        })?;

        Ok(self.summary_json.or_else(|| config.output.summary_json.as_ref().map(PathBuf::from)))
    }
}

/// Run metadata and counts, without the per-part rows.
#[derive(Serialize)]
struct RunSummary<'a> {
    meta: &'a ReconMeta,
    summary: &'a ReconSummary,
}

fn cmd_run(
    parts_path: PathBuf,
    masters_path: PathBuf,
    results_path: PathBuf,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    json_output: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let start = Instant::now();

    let mut config = match &config_path {
        Some(path) => load_config(path)?,
        None => ReconConfig::default(),
    };
    let summary_path = overrides.apply(&mut config)?;

    let parts_buf = read_input(&parts_path)?;
    let masters_buf = read_input(&masters_path)?;
    let input = ReconInput::from_buffers(&parts_buf, &masters_buf);
    tracing::info!(
        parts = input.parts.len(),
        masters = input.masters.len(),
        "loaded {} and {}",
        parts_path.display(),
        masters_path.display(),
    );

    let result = partmatch_recon::run(&config, &input).map_err(recon_err)?;

    let opts = OutputOptions {
        format: config.output.format,
        delimiter: config.output.delimiter_byte(),
        line_ending: config.output.line_ending,
    };
    export::write_results(&results_path, opts, &result)?;

    let run_summary = RunSummary { meta: &result.meta, summary: &result.summary };
    let summary_str = serde_json::to_string_pretty(&run_summary).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })?;

    if let Some(ref path) = summary_path {
        std::fs::write(path, format!("{summary_str}\n")).map_err(|e| CliError {
            code: EXIT_IO,
            message: format!("cannot write {}: {e}", path.display()),
            hint: None,
        })?;
    }

    let to_stdout = results_path.as_os_str() == "-";
    if json_output {
        println!("{summary_str}");
    } else if !to_stdout {
        println!("{}", result.summary.matched);
    }

    if !quiet {
        let s = &result.summary;
        eprintln!(
            "{} parts against {} masters: {} matched ({} suffix, {} hyphen-insensitive, {} reverse-suffix), {} unmatched",
            s.total_parts,
            result.meta.master_count,
            s.matched,
            s.tiers.suffix,
            s.tiers.hyphen_insensitive,
            s.tiers.reverse_suffix,
            s.unmatched,
        );
        if !to_stdout {
            eprintln!("wrote {} ({})", results_path.display(), opts.format);
        }
        if let Some(ref path) = summary_path {
            eprintln!("wrote {}", path.display());
        }
        eprintln!("elapsed: {}ms", start.elapsed().as_millis());
    }

    Ok(())
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let threads = match config.engine.threads {
        Some(n) => n.to_string(),
        None => "auto".to_string(),
    };
    eprintln!(
        "valid: config '{}' (format {}, delimiter {:?}, threads {})",
        config.name.as_deref().unwrap_or("unnamed"),
        config.output.format,
        config.output.delimiter,
        threads,
    );
    Ok(())
}

// ============================================================================
// lookup
// ============================================================================

fn cmd_lookup(masters_path: PathBuf, codes: Vec<String>, json_output: bool) -> Result<(), CliError> {
    let masters_buf = read_input(&masters_path)?;
    let records = split_records(&masters_buf);
    let catalog = MasterCatalog::from_records(&records).map_err(recon_err)?;
    let lookup = MasterLookup::new(&catalog);

    let rows: Vec<MatchRow> = codes
        .into_iter()
        .map(|code| match lookup.find_match(code.as_bytes()) {
            Some(res) => MatchRow {
                master: Some(String::from_utf8_lossy(catalog.record(res.master_index)).into_owned()),
                master_index: Some(res.master_index),
                tier: Some(res.tier),
                part: code,
            },
            None => MatchRow { part: code, master: None, master_index: None, tier: None },
        })
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = if json_output {
        export::write_json(&mut out, &rows, LineEnding::Lf)
    } else {
        export::write_text(&mut out, &rows, b';', LineEnding::Lf)
    };
    written.map_err(|e| CliError { code: EXIT_IO, message: format!("cannot write output: {e}"), hint: None })
}
