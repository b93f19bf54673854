//! Diagnostic records and the message catalogue for resolution.
//!
//! Diagnostics never unwind: they are collected on descriptors (signature
//! errors) or in the resolver's bag and surfaced after resolution.

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const INCOMPLETE_HIERARCHY: u32 = 1001;
    pub const UNRESOLVED_SUPERTYPE: u32 = 1002;
    pub const PROPAGATED_SIGNATURE_ERROR: u32 = 2001;
    pub const EXTERNAL_SIGNATURE_ERROR: u32 = 2002;
    pub const INCOMPATIBLE_OVERRIDE_RETURN: u32 = 2003;
    pub const UNRESOLVED_ANNOTATION_CLASS: u32 = 3001;
    pub const UNRESOLVED_ENUM_ENTRY: u32 = 3002;
    pub const ABI_VERSION_MISMATCH: u32 = 4001;
    pub const MALFORMED_METADATA: u32 = 4002;
}

pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage, diagnostic_codes};

    pub const INCOMPLETE_HIERARCHY: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::INCOMPLETE_HIERARCHY,
        category: DiagnosticCategory::Error,
        message: "Supertypes of '{0}' cannot be fully resolved.",
    };
    pub const UNRESOLVED_SUPERTYPE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_SUPERTYPE,
        category: DiagnosticCategory::Error,
        message: "Cannot resolve supertype '{0}' of '{1}'.",
    };
    pub const PROPAGATED_SIGNATURE_ERROR: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::PROPAGATED_SIGNATURE_ERROR,
        category: DiagnosticCategory::Warning,
        message: "Signature of '{0}' disagrees with overridden members: {1}",
    };
    pub const EXTERNAL_SIGNATURE_ERROR: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::EXTERNAL_SIGNATURE_ERROR,
        category: DiagnosticCategory::Warning,
        message: "External signature of '{0}' is ignored: {1}",
    };
    pub const INCOMPATIBLE_OVERRIDE_RETURN: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::INCOMPATIBLE_OVERRIDE_RETURN,
        category: DiagnosticCategory::Warning,
        message: "Return type of '{0}' is not a subtype of the overridden return type '{1}'.",
    };
    pub const UNRESOLVED_ANNOTATION_CLASS: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_ANNOTATION_CLASS,
        category: DiagnosticCategory::Warning,
        message: "Annotation class '{0}' cannot be resolved.",
    };
    pub const UNRESOLVED_ENUM_ENTRY: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_ENUM_ENTRY,
        category: DiagnosticCategory::Warning,
        message: "Enum entry '{0}' of '{1}' cannot be resolved.",
    };
    pub const ABI_VERSION_MISMATCH: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::ABI_VERSION_MISMATCH,
        category: DiagnosticCategory::Error,
        message: "'{0}' was compiled with incompatible metadata version {1}, expected version is {2}.",
    };
    pub const MALFORMED_METADATA: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::MALFORMED_METADATA,
        category: DiagnosticCategory::Error,
        message: "Embedded metadata of '{0}' cannot be read: {1}",
    };

    pub const ALL: &[DiagnosticMessage] = &[
        INCOMPLETE_HIERARCHY,
        UNRESOLVED_SUPERTYPE,
        PROPAGATED_SIGNATURE_ERROR,
        EXTERNAL_SIGNATURE_ERROR,
        INCOMPATIBLE_OVERRIDE_RETURN,
        UNRESOLVED_ANNOTATION_CLASS,
        UNRESOLVED_ENUM_ENTRY,
        ABI_VERSION_MISMATCH,
        MALFORMED_METADATA,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub subject: String,
    pub message_text: String,
}

/// A diagnostic attached to a declaration, identified by its native name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Fully-qualified name of the declaration the diagnostic is about.
    pub subject: String,
    pub message_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    pub fn error(subject: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            subject: subject.into(),
            message_text: message.into(),
            related_information: Vec::new(),
        }
    }

    /// Build a diagnostic from a catalogue entry, substituting `{n}` placeholders.
    pub fn from_message(
        message: &DiagnosticMessage,
        subject: impl Into<String>,
        args: &[&str],
    ) -> Self {
        Self {
            category: message.category,
            code: message.code,
            subject: subject.into(),
            message_text: format_message(message.message, args),
            related_information: Vec::new(),
        }
    }

    pub fn with_related(mut self, subject: impl Into<String>, message: impl Into<String>) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            category: DiagnosticCategory::Message,
            code: 0,
            subject: subject.into(),
            message_text: message.into(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    diagnostic_messages::ALL
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
