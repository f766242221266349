use comfy_table::Table;
use owo_colors::OwoColorize;

const RULE_WIDTH: usize = 70;

/// Human-readable console report on stdout. Logs go through tracing on stderr.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        println!("{} {}", "✓".green(), msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors should always be shown, even in quiet mode
        println!("{} {}", "✗".red(), msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        println!("{} {}", "⚠".yellow(), msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        println!("{} {}", "ℹ".blue(), msg.as_ref());
    }

    pub fn println(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        println!("{}", msg.as_ref());
    }

    /// Indented list entry
    pub fn item(&self, msg: impl AsRef<str>) {
        self.println(format!("  - {}", msg.as_ref()));
    }

    /// Title between two horizontal rules
    pub fn heading(&self, title: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        println!("{}", rule());
        println!("{}", title.as_ref().bold());
        println!("{}", rule());
    }

    pub fn rule(&self) {
        self.println(rule());
    }

    pub fn table(&self, table: &Table) {
        if self.quiet {
            return;
        }
        println!("{}", table);
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}
