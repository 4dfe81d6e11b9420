//! Diagnostic output.
//!
//! Human output goes through miette's graphical handler, with source
//! snippets when the source text is available. Machine output is JSON.

use ember_diagnostics::{Diagnostic, DiagnosticCollection, Stage};
use miette::{GraphicalReportHandler, LabeledSpan, NamedSource, Severity, SourceCode};
use serde::Serialize;
use std::fmt;

/// Source text the syntax tree was parsed from.
#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

/// One binder diagnostic, ready for miette.
#[derive(Debug)]
pub struct Report<'a> {
    diagnostic: &'a Diagnostic,
    source: Option<NamedSource<String>>,
}

impl<'a> Report<'a> {
    pub fn new(diagnostic: &'a Diagnostic, source: Option<&SourceFile>) -> Self {
        Self {
            diagnostic,
            source: source.map(|s| NamedSource::new(&s.name, s.text.clone())),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic.message_text)
    }
}

impl std::error::Error for Report<'_> {}

impl miette::Diagnostic for Report<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        Some(Box::new(error_code(self.diagnostic)))
    }

    fn severity(&self) -> Option<Severity> {
        Some(Severity::Error)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        Some(Box::new(self.diagnostic.kind))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.source.as_ref().map(|source| source as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        self.source.as_ref()?;
        let span = self.diagnostic.span?;
        let label = LabeledSpan::new_with_span(None, span.to_range());
        Some(Box::new(std::iter::once(label)))
    }
}

/// `BND0012` for binder diagnostics, `PKG0003` for packager ones.
pub fn error_code(diagnostic: &Diagnostic) -> String {
    let prefix = match diagnostic.stage {
        Stage::Binder => "BND",
        Stage::Packager => "PKG",
    };
    format!("{}{:04}", prefix, diagnostic.code())
}

/// Render diagnostics for a terminal, at most `max` of them.
pub fn render_human(diagnostics: &DiagnosticCollection, source: Option<&SourceFile>, max: Option<usize>) -> String {
    let handler = GraphicalReportHandler::new();
    let limit = max.unwrap_or(usize::MAX);
    let mut out = String::new();

    for diagnostic in diagnostics.diagnostics().iter().take(limit) {
        let report = Report::new(diagnostic, source);
        if handler.render_report(&mut out, &report).is_err() {
            // Fall back to the plain form.
            out.push_str(&format!("error[{}]: {}\n", error_code(diagnostic), diagnostic));
        }
    }

    let count = diagnostics.error_count();
    if count > limit {
        out.push_str(&format!("... and {} more\n", count - limit));
    }
    if count > 0 {
        out.push_str(&format!("Found {} error{}.\n", count, if count == 1 { "" } else { "s" }));
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDiagnostic<'a> {
    code: String,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    error_count: usize,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

/// Render every diagnostic as one JSON document.
pub fn render_json(diagnostics: &DiagnosticCollection) -> Result<String, serde_json::Error> {
    let output = JsonOutput {
        error_count: diagnostics.error_count(),
        diagnostics: diagnostics
            .diagnostics()
            .iter()
            .map(|diagnostic| JsonDiagnostic {
                code: error_code(diagnostic),
                diagnostic,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}
