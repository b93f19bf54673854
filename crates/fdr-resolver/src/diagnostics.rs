use fdr_common::diagnostics::{Diagnostic, DiagnosticMessage};
use tracing::warn;

/// Diagnostics collected during resolution, in the order they were raised.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!(
            code = diagnostic.code,
            subject = %diagnostic.subject,
            message = %diagnostic.message_text,
            "diagnostic"
        );
        self.items.push(diagnostic);
    }

    pub fn report(&mut self, message: &DiagnosticMessage, subject: &str, args: &[&str]) {
        self.push(Diagnostic::from_message(message, subject, args));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_code(&self, code: u32) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    /// Drain everything collected so far.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.items)
    }
}
