//! Canonical address and parser diagnostic records

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// Postal-standardized address produced by the parser
///
/// All fields are uppercase and abbreviated; omitted fields are empty
/// strings. Downstream formatting relies only on these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalAddress {
    pub firm: String,
    pub street_address: String,
    pub secondary_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub zip_plus4: String,
    pub urbanization: String,
}

impl CanonicalAddress {
    /// True when every field is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.firm.is_empty()
            && self.street_address.is_empty()
            && self.secondary_address.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.zip_code.is_empty()
            && self.zip_plus4.is_empty()
            && self.urbanization.is_empty()
    }

    /// Delivery line: street followed by the secondary designator, if any
    #[must_use]
    pub fn delivery_line(&self) -> String {
        join_nonempty(&[self.street_address.as_str(), self.secondary_address.as_str()], " ")
    }

    /// ZIP or ZIP+4 in `NNNNN-NNNN` form
    #[must_use]
    pub fn full_zip(&self) -> String {
        if self.zip_plus4.is_empty() {
            self.zip_code.clone()
        } else {
            format!("{}-{}", self.zip_code, self.zip_plus4)
        }
    }

    /// Last line: `CITY ST NNNNN-NNNN`
    #[must_use]
    pub fn last_line(&self) -> String {
        let zip = self.full_zip();
        let state_zip = join_nonempty(&[self.state.as_str(), zip.as_str()], " ");
        join_nonempty(&[self.city.as_str(), state_zip.as_str()], " ")
    }

    /// Non-empty mailing lines in USPS order (firm, urbanization, delivery,
    /// last line)
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        [
            self.firm.clone(),
            self.urbanization.clone(),
            self.delivery_line(),
            self.last_line(),
        ]
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect()
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

fn join_nonempty(parts: &[&str], separator: &str) -> String {
    parts.iter().filter(|part| !part.is_empty()).copied().collect::<Vec<_>>().join(separator)
}

/// Diagnostic severity; errors sort before warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl_domain_enum_conversions!(Severity {
    Error => "error",
    Warning => "warning",
});

/// Stable machine identifiers for parser observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    EmptyInput,
    EmptyStreet,
    InsufficientSegments,
    InvalidStateZip,
    MissingCity,
    MissingStateZip,
    MissingStreet,
    UnknownSecondary,
    UnknownState,
}

impl_domain_enum_conversions!(DiagnosticCode {
    EmptyInput => "empty_input",
    EmptyStreet => "empty_street",
    InsufficientSegments => "insufficient_segments",
    InvalidStateZip => "invalid_state_zip",
    MissingCity => "missing_city",
    MissingStateZip => "missing_state_zip",
    MissingStreet => "missing_street",
    UnknownSecondary => "unknown_secondary",
    UnknownState => "unknown_state",
});

impl DiagnosticCode {
    /// Severity the parser reports this code with
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::MissingCity | Self::UnknownSecondary => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Byte range into the original (unprocessed) input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One parser observation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity
    #[must_use]
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: Option<Span>) -> Self {
        Self { severity: code.severity(), code, message: message.into(), span }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Deterministic ordering: severity, code, span start, span end
    #[must_use]
    pub fn sort_order(&self, other: &Self) -> Ordering {
        self.severity
            .cmp(&other.severity)
            .then_with(|| self.code.as_str().cmp(other.code.as_str()))
            .then_with(|| self.span.map(|s| s.start).cmp(&other.span.map(|s| s.start)))
            .then_with(|| self.span.map(|s| s.end).cmp(&other.span.map(|s| s.end)))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        if let Some(span) = self.span {
            write!(f, " ({}..{})", span.start, span.end)?;
        }
        Ok(())
    }
}

/// Parser output: the canonical address plus its sorted diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    pub address: CanonicalAddress,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedAddress {
    /// Bundle an address with its diagnostics, sorting them stably
    #[must_use]
    pub fn new(address: CanonicalAddress, mut diagnostics: Vec<Diagnostic>) -> Self {
        diagnostics.sort_by(Diagnostic::sort_order);
        Self { address, diagnostics }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    #[must_use]
    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }
}
