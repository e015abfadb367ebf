//! Translates build-file parsing failures into actionable diagnostics.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A fatal syntax error in a build file.
///
/// Carries the offending source text and span so `miette` can render the
/// failing line. Parse errors always abort the whole translation run; a
/// half-translated build graph is unsafe to consume.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid syntax in build file: {message}")]
#[diagnostic(code(tsugite::manifest::parse))]
pub struct ParseError {
    /// The source file the error occurred in.
    #[source_code]
    pub src: NamedSource<String>,
    /// The offending location.
    #[label("{label}")]
    pub span: SourceSpan,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Short label rendered at the span.
    pub label: String,
}

impl ParseError {
    /// Build a parse error for `span` within `src`.
    #[must_use]
    pub fn new(
        name: impl AsRef<str>,
        src: impl Into<String>,
        span: impl Into<SourceSpan>,
        message: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            src: NamedSource::new(name, src.into()),
            span: span.into(),
            message: message.into(),
            label: label.into(),
        }
    }
}
