//! ember_cli: Driver behind the `emberc` binary.
//!
//! Loads a serialized syntax tree, registers package manifests, binds the
//! program, optionally lowers it, and renders diagnostics.

pub mod config;
pub mod render;

use config::{ConfigError, EmberConfig};
use ember_binder::{bind_program, BindSession, BoundProgram, PackageError, PackageRegistry};
use ember_diagnostics::DiagnosticCollection;
use ember_lowerer::{lower_program, FlowLowerer};
use ember_syntax::CompilationUnit;
use render::SourceFile;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, miette::Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(code(emberc::config))]
    Config(#[from] ConfigError),
    #[error(transparent)]
    #[diagnostic(code(emberc::package))]
    Package(#[from] PackageError),
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(emberc::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid syntax tree {path}: {source}")]
    #[diagnostic(code(emberc::syntax), help("the input must be a JSON-serialized compilation unit"))]
    Syntax {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize diagnostics: {0}")]
    #[diagnostic(code(emberc::output))]
    Output(#[from] serde_json::Error),
}

/// Everything one run needs, after config and flags are merged.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub unit: PathBuf,
    pub source: Option<PathBuf>,
    pub packages: Vec<PathBuf>,
    pub emit_bound_tree: bool,
    pub lower: bool,
    pub json: bool,
    pub max_errors: Option<usize>,
}

impl Options {
    /// Merge file config with command-line values. Flags only ever turn
    /// settings on; package lists are concatenated.
    pub fn merge(mut self, config: EmberConfig) -> Self {
        let mut packages = config.packages;
        packages.append(&mut self.packages);
        self.packages = packages;
        self.emit_bound_tree |= config.emit_bound_tree;
        self.lower |= config.lower;
        self.max_errors = self.max_errors.or(config.max_errors);
        self
    }
}

/// Result of binding one unit.
#[derive(Debug)]
pub struct Compilation {
    pub program: BoundProgram,
    pub diagnostics: DiagnosticCollection,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_unit(path: &Path) -> Result<CompilationUnit, CliError> {
    let content = read(path)?;
    serde_json::from_str(&content).map_err(|source| CliError::Syntax {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_packages(paths: &[PathBuf]) -> Result<PackageRegistry, CliError> {
    let mut registry = PackageRegistry::new();
    for path in paths {
        registry.register_manifest_file(path)?;
    }
    tracing::debug!(packages = registry.len(), "registered package manifests");
    Ok(registry)
}

/// Bind `unit` against `registry`. Lowering only runs on programs that
/// bound without errors.
pub fn compile(unit: &CompilationUnit, registry: PackageRegistry, lower: bool) -> Compilation {
    let mut session = BindSession::new().with_resolver(registry);
    if lower {
        session = session.with_lowerer(FlowLowerer::new());
    }

    let mut program = bind_program(&mut session, unit);
    let diagnostics = session.take_diagnostics();
    if lower && !diagnostics.has_errors() {
        lower_program(&mut program);
    }
    Compilation { program, diagnostics }
}

/// Run one compilation and print its output. Returns whether binding
/// reported errors.
pub fn run(options: &Options) -> Result<bool, CliError> {
    let unit = load_unit(&options.unit)?;
    let registry = load_packages(&options.packages)?;
    let source = match &options.source {
        Some(path) => Some(SourceFile {
            name: path.display().to_string(),
            text: read(path)?,
        }),
        None => None,
    };

    let compilation = compile(&unit, registry, options.lower);
    tracing::info!(errors = compilation.diagnostics.error_count(), "binding finished");

    if options.json {
        println!("{}", render::render_json(&compilation.diagnostics)?);
    } else {
        eprint!(
            "{}",
            render::render_human(&compilation.diagnostics, source.as_ref(), options.max_errors)
        );
    }
    if options.emit_bound_tree {
        println!("{:#?}", compilation.program);
    }
    Ok(compilation.has_errors())
}
