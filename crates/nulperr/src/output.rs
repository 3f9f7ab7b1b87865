//! Terminal styling of report lines.

use clap::ValueEnum;
use crossterm::style::Stylize;
use nulp_compare::Tone;

/// When to emit terminal styling.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Style only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => atty::is(atty::Stream::Stdout),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// Writes report lines to stdout and fatal messages to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
}

impl Printer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn line(&self, tone: Tone, text: &str) {
        println!("{}", self.styled(tone, text));
    }

    pub fn error_line(&self, tone: Tone, text: &str) {
        eprintln!("{}", self.styled(tone, text));
    }

    pub fn styled(&self, tone: Tone, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let text = text.to_string();
        match tone {
            Tone::Plain => text,
            Tone::Dim => text.dim().to_string(),
            Tone::Warning => text.red().to_string(),
            Tone::Error => text.red().bold().to_string(),
            Tone::Emphasis => text.bold().to_string(),
            Tone::Info => text.blue().to_string(),
        }
    }
}
