use crate::document::memory::MemoryDocument;
use crate::patch::BulkReport;
use crate::ReviewCard;
use anyhow::Result;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    file: String,
    total_edits: usize,
    open_edits: usize,
    edits: &'a [ReviewCard],
}

/// What the user decided for one card in interactive review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewChoice {
    Apply,
    Skip,
    Quit,
}

pub fn print_cards(
    file_path: &Path,
    cards: &[ReviewCard],
    total_edits: usize,
    colored_output: bool,
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print_text_cards(file_path, cards, colored_output);
            Ok(())
        }
        OutputFormat::Json => print_json_cards(file_path, cards, total_edits),
    }
}

fn print_text_cards(file_path: &Path, cards: &[ReviewCard], colored_output: bool) {
    if cards.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();
    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for card in cards {
        println!("{}", format_card(card, colored_output));
    }
}

fn print_json_cards(file_path: &Path, cards: &[ReviewCard], total_edits: usize) -> Result<()> {
    let output = JsonOutput {
        file: file_path.display().to_string(),
        total_edits,
        open_edits: cards.len(),
        edits: cards,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Two lines: the change in context, then old and new side.
pub fn format_card(card: &ReviewCard, colored: bool) -> String {
    let old = if card.old.is_empty() { "(empty)" } else { card.old.as_str() };
    let new = if card.new.is_empty() { "(removed)" } else { card.new.as_str() };
    let context = format_context(card, colored);

    if colored {
        let label = match card.kind {
            "fix" => card.kind.red().bold(),
            "removal" => card.kind.magenta().bold(),
            _ => card.kind.green().bold(),
        };
        format!(
            "  {} {} {}\n    {} {} {}",
            card.ordinal.to_string().blue().bold(),
            label,
            context,
            old.red(),
            "→".dimmed(),
            new.green()
        )
    } else {
        format!(
            "  {} {} {}\n    {} → {}",
            card.ordinal, card.kind, context, old, new
        )
    }
}

fn format_context(card: &ReviewCard, colored: bool) -> String {
    let mut parts = vec!["…".to_string()];
    if !card.before.is_empty() {
        parts.push(card.before.clone());
    }
    if !card.old.is_empty() {
        if colored {
            parts.push(card.old.red().strikethrough().to_string());
        } else {
            parts.push(format!("[-{}-]", card.old));
        }
    } else if !card.new.is_empty() {
        if colored {
            parts.push(card.new.green().to_string());
        } else {
            parts.push(format!("{{+{}+}}", card.new));
        }
    }
    if !card.after.is_empty() {
        parts.push(card.after.clone());
    }
    parts.push("…".to_string());
    parts.join(" ")
}

/// Print the checked text with highlighted spans marked.
pub fn print_marked(document: &MemoryDocument, colored: bool) {
    let text = document.content();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    for (range, _) in document.highlights() {
        if range.start < pos {
            continue;
        }
        out.push_str(&text[pos..range.start]);
        let marked = &text[range.clone()];
        if colored {
            out.push_str(&marked.black().on_yellow().to_string());
        } else {
            out.push_str(&format!("[{}]", marked));
        }
        pos = range.end;
    }
    out.push_str(&text[pos..]);

    println!("{}", out);
}

pub fn print_check_summary(open_edits: usize, colored: bool) {
    println!();
    if open_edits == 0 {
        if colored {
            println!("{}", "✓ No corrections suggested!".green().bold());
        } else {
            println!("✓ No corrections suggested!");
        }
    } else {
        let edit_word = if open_edits == 1 { "edit" } else { "edits" };
        if colored {
            println!(
                "{} {} suggested {}",
                "✗".red().bold(),
                open_edits.to_string().red().bold(),
                edit_word
            );
        } else {
            println!("✗ {} suggested {}", open_edits, edit_word);
        }
    }
}

pub fn print_apply_summary(report: &BulkReport, colored: bool) {
    let fix_word = if report.applied == 1 { "edit" } else { "edits" };
    if colored {
        println!(
            "{} {} {} applied",
            "✓".green().bold(),
            report.applied.to_string().green().bold(),
            fix_word
        );
    } else {
        println!("✓ {} {} applied", report.applied, fix_word);
    }

    if report.not_found > 0 {
        let line = format!("{} no longer found in the text", report.not_found);
        if colored {
            println!("  {}", line.yellow());
        } else {
            println!("  {}", line);
        }
    }
    if report.failed > 0 {
        let line = format!("{} failed", report.failed);
        if colored {
            println!("  {}", line.red());
        } else {
            println!("  {}", line);
        }
    }
}

pub fn prompt_review(card: &ReviewCard, colored: bool) -> Result<ReviewChoice> {
    println!("\n{}", format_card(card, colored));

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Apply this edit?")
        .items(&["Apply", "Skip", "Quit"])
        .default(0)
        .interact()?;

    Ok(match choice {
        0 => ReviewChoice::Apply,
        1 => ReviewChoice::Skip,
        _ => ReviewChoice::Quit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Ordinal;

    fn card(kind: &'static str, old: &str, new: &str) -> ReviewCard {
        ReviewCard {
            ordinal: Ordinal(2),
            kind,
            old: old.to_string(),
            new: new.to_string(),
            before: "the cat".to_string(),
            after: "on the".to_string(),
        }
    }

    #[test]
    fn test_format_plain_fix() {
        let text = format_card(&card("fix", "sta", "sat"), false);
        assert_eq!(text, "  #2 fix … the cat [-sta-] on the …\n    sta → sat");
    }

    #[test]
    fn test_format_plain_addition_and_removal() {
        let text = format_card(&card("addition", "", "quietly"), false);
        assert!(text.contains("{+quietly+}"));
        assert!(text.ends_with("(empty) → quietly"));

        let text = format_card(&card("removal", "very", ""), false);
        assert!(text.ends_with("very → (removed)"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Text.to_string(), "text");
    }
}
