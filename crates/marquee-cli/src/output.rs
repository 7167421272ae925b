use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// Rendering helper shared by all commands: glyph-prefixed lines in human
/// mode, one JSON document per message otherwise.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            _ => self.print_json(&serde_json::json!({
                "type": "success",
                "message": msg.as_ref(),
            })),
        }
    }

    /// Errors are shown even in quiet mode.
    pub fn error(&self, msg: impl AsRef<str>) {
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            _ => self.print_json(&serde_json::json!({
                "type": "error",
                "message": msg.as_ref(),
            })),
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "⚠".yellow(), msg.as_ref()),
            _ => self.print_json(&serde_json::json!({
                "type": "warning",
                "message": msg.as_ref(),
            })),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            _ => self.print_json(&serde_json::json!({
                "type": "info",
                "message": msg.as_ref(),
            })),
        }
    }

    /// Raw line in human mode only; structured commands emit their own JSON.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.quiet || self.format != OutputFormat::Human {
            return;
        }
        println!("{}", msg.as_ref());
    }

    pub fn print_json(&self, value: &serde_json::Value) {
        let rendered = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(value),
            _ => serde_json::to_string(value),
        };
        match rendered {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("failed to render JSON output: {err}"),
        }
    }

    /// Spinner while a request is in flight; human mode only.
    pub fn spinner(&self, msg: &str) -> Option<ProgressBar> {
        if self.quiet || self.format != OutputFormat::Human {
            return None;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    }
}
