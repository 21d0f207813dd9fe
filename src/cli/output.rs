//! Terminal output for the CLI
//!
//! Status lines go to stderr; answers, chunk previews and the collection
//! table go to stdout so they can be piped.

use crate::db::CollectionInfo;
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Info,
    Warn,
    Error,
}

impl Status {
    fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[OK]",
            Status::Info => "[INFO]",
            Status::Warn => "[WARN]",
            Status::Error => "[ERROR]",
        }
    }
}

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn success(&self, message: &str) {
        self.status(Status::Ok, message);
    }

    pub fn info(&self, message: &str) {
        self.status(Status::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.status(Status::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.status(Status::Error, message);
    }

    fn status(&self, status: Status, message: &str) {
        if !self.colored {
            eprintln!("  {} {}", status.tag(), message);
            return;
        }
        match status {
            Status::Ok => eprintln!("  {} {}", "✓".green().bold(), message.green()),
            Status::Info => eprintln!("  {} {}", "•".blue(), message),
            Status::Warn => eprintln!("  {} {}", "⚠".yellow().bold(), message.yellow()),
            Status::Error => eprintln!("  {} {}", "✗".red().bold(), message.red()),
        }
    }

    /// Section title on stdout
    pub fn section(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a generated answer, unindented and uncolored
    pub fn answer(&self, text: &str) {
        println!("{}", text.trim_end());
    }

    /// Print one retrieved source with its rank and score
    pub fn source(&self, rank: usize, score: f32, text: &str) {
        let preview = preview(text, 160);
        if self.colored {
            println!(
                "  {} {} {}",
                format!("[{}]", rank).bright_cyan().bold(),
                format!("{:.3}", score).dimmed(),
                preview
            );
        } else {
            println!("  [{}] {:.3} {}", rank, score, preview);
        }
    }

    /// Print a chunk with its index and length
    pub fn chunk(&self, index: usize, char_len: usize, text: &str) {
        let preview = preview(text, 120);
        if self.colored {
            println!(
                "  {} {} {}",
                format!("#{:<4}", index).bright_cyan(),
                format!("{:>5} chars", char_len).dimmed(),
                preview
            );
        } else {
            println!("  #{:<4} {:>5} chars {}", index, char_len, preview);
        }
    }

    /// One row per collection: name, entry count, vector dimensions.
    pub fn collections(&self, collections: &[CollectionInfo]) {
        let header = format!("{:<20} {:>8} {:>10}", "Name", "Entries", "Dimensions");
        if self.colored {
            println!("    {}", header.bold());
        } else {
            println!("    {}", header);
        }
        for info in collections {
            let dims = info
                .dimensions
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("    {:<20} {:>8} {:>10}", info.name, info.entry_count, dims);
        }
    }
}

/// Single-line preview of at most `max_chars` characters.
fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
