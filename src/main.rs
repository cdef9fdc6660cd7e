use amend::cli::output::{self, OutputFormat, ReviewChoice};
use amend::provider::{CorrectionProvider, GeminiProvider, StaticProvider};
use amend::{ApplyOutcome, BulkReport, Config, MemoryDocument, Ordinal, Scope, Session};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "amend")]
#[command(version, about = "Review AI-suggested corrections as word-level edits", long_about = None)]
struct Cli {
    /// File to check
    #[arg(value_name = "FILE", required_unless_present = "completion")]
    file: Option<PathBuf>,

    /// Only check these lines (1-based, inclusive), e.g. 3:7
    #[arg(long, value_name = "FROM:TO")]
    lines: Option<LineRange>,

    /// Read the corrected text from a file instead of asking the provider
    #[arg(long, value_name = "FILE")]
    corrected: Option<PathBuf>,

    /// Apply the edit with this number (repeatable)
    #[arg(short, long, value_name = "N")]
    apply: Vec<Ordinal>,

    /// Apply every fix and removal
    #[arg(long, conflicts_with = "apply")]
    apply_all: bool,

    /// Review each edit and choose whether to apply it
    #[arg(short, long, conflicts_with_all = ["apply", "apply_all"])]
    interactive: bool,

    /// Write the patched text back to FILE instead of printing it
    #[arg(short, long)]
    write: bool,

    /// Print the checked text with flagged words marked
    #[arg(long)]
    marks: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if edits are suggested
    #[arg(long)]
    no_fail: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Model used by the correction provider
    #[arg(long, env = "AMEND_MODEL")]
    model: Option<String>,

    /// Log debug information to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,
}

/// Inclusive, 1-based line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineRange {
    from: usize,
    to: usize,
}

impl FromStr for LineRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s.split_once(':').unwrap_or((s, s));
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid line range: {}", s))
        };
        let (from, to) = (parse(from)?, parse(to)?);
        if from == 0 || to < from {
            return Err(format!("Invalid line range: {}", s));
        }
        Ok(LineRange { from, to })
    }
}

impl LineRange {
    /// Byte range of the lines inside `text`, without the final line break.
    fn byte_range(&self, text: &str) -> Option<Range<usize>> {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        let start = *starts.get(self.from - 1)?;
        let end = starts
            .get(self.to)
            .map(|next| next - 1)
            .unwrap_or(text.len());
        Some(start..end.max(start))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "amend=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "amend", &mut io::stdout());
        return Ok(());
    }

    let Some(file_path) = cli.file.clone() else {
        anyhow::bail!("No file specified. Use --help for usage information.");
    };
    let colored = !cli.no_color;
    let config = Config::load(cli.model.clone())?;

    let content = fs::read_to_string(&file_path)
        .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

    let (document, scope) = match cli.lines {
        Some(lines) => {
            let range = lines.byte_range(&content).with_context(|| {
                format!("Line {} is past the end of {}", lines.from, file_path.display())
            })?;
            (MemoryDocument::new(content).with_selection(range), Scope::Selection)
        }
        None => (MemoryDocument::new(content), Scope::Whole),
    };

    let provider: Box<dyn CorrectionProvider> = match &cli.corrected {
        Some(path) => Box::new(StaticProvider::new(fs::read_to_string(path).with_context(
            || format!("Failed to read corrected text: {}", path.display()),
        )?)),
        None => Box::new(GeminiProvider::from_config(&config)?),
    };

    let mut session = Session::new(document, &config);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.set_message("Checking...");
    pb.enable_steady_tick(Duration::from_millis(100));
    let checked = session.check(scope, provider.as_ref());
    pb.finish_and_clear();
    let report = checked?;

    let cards = session.cards();
    if cli.marks && matches!(cli.format, OutputFormat::Text) {
        output::print_marked(session.document(), colored);
    }
    output::print_cards(&file_path, &cards, report.edits, colored, &cli.format)?;

    let text_output = matches!(cli.format, OutputFormat::Text);
    let applying = cli.apply_all || cli.interactive || !cli.apply.is_empty();

    if !applying {
        if text_output {
            output::print_check_summary(cards.len(), colored);
        }
        if !cards.is_empty() && !cli.no_fail {
            std::process::exit(1);
        }
        return Ok(());
    }

    let report = if cli.apply_all {
        session.apply_all()
    } else if cli.interactive {
        review(&mut session, colored)?
    } else {
        let mut report = BulkReport::default();
        for ordinal in &cli.apply {
            let outcome = session.apply(*ordinal)?;
            tally(&mut report, *ordinal, outcome);
        }
        report
    };

    if text_output {
        output::print_apply_summary(&report, colored);
    }

    let patched = session.into_document().into_content();
    if cli.write {
        fs::write(&file_path, patched)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
    } else if text_output {
        println!("\n{}", patched);
    }

    Ok(())
}

fn review(session: &mut Session<MemoryDocument>, colored: bool) -> Result<BulkReport> {
    let mut report = BulkReport::default();

    for card in session.cards() {
        match output::prompt_review(&card, colored)? {
            ReviewChoice::Apply => {
                let outcome = session.apply(card.ordinal)?;
                tally(&mut report, card.ordinal, outcome);
            }
            ReviewChoice::Skip => {
                session.skip(card.ordinal);
            }
            ReviewChoice::Quit => break,
        }
    }

    Ok(report)
}

/// Count an apply outcome, warning about edits that were not applied.
fn tally(report: &mut BulkReport, ordinal: Ordinal, outcome: ApplyOutcome) {
    match outcome {
        ApplyOutcome::Applied => report.applied += 1,
        ApplyOutcome::NotFound => report.not_found += 1,
        ApplyOutcome::NoAnchor => {
            eprintln!("Warning: edit {} is an addition; insert it by hand", ordinal)
        }
        ApplyOutcome::Ignored => eprintln!("Warning: no open edit {}", ordinal),
    }
}
