//! Presentation sink for migration status

use console::style;

/// Output channels used by the status report
pub trait StatusReporter: Send + Sync {
    /// Neutral "all clear" message
    fn success(&self, message: &str);

    /// Header preceding a listing
    fn notice(&self, message: &str);

    /// One pending item
    fn alert(&self, message: &str);
}

/// Writes coloured lines to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn success(&self, message: &str) {
        println!("{}", style(message).green());
    }

    fn notice(&self, message: &str) {
        println!("{}", style(message).white());
    }

    fn alert(&self, message: &str) {
        println!("{}", style(message).red());
    }
}
