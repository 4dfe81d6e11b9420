//! Package resolution.
//!
//! The binder only ever sees [`PackageSymbol`]s. Where they come from is up
//! to a [`PackageResolver`]; [`PackageRegistry`] is the in-memory resolver,
//! usually filled from JSON [`PackageManifest`]s.

use crate::symbol::{ClassSymbol, FunctionKind, FunctionSymbol, PackageSymbol, SymbolId, VariableSymbol};
use crate::types::TypeSymbol;
use ember_core::text::TextSpan;
use ember_diagnostics::{messages, DiagnosticCollection, Stage};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Supplies package symbols by name.
pub trait PackageResolver {
    /// Resolve `name`, reporting into `diagnostics` (at `span`) on failure.
    fn resolve(&self, name: &str, span: TextSpan, diagnostics: &mut DiagnosticCollection) -> Option<Arc<PackageSymbol>>;
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("failed to read package manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid package manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("package \"{package}\": unknown type \"{ty}\"")]
    UnknownType { package: String, ty: String },
    #[error("package \"{package}\": malformed type \"{ty}\"")]
    MalformedType { package: String, ty: String },
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: FxHashMap<String, Arc<PackageSymbol>>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, package: PackageSymbol) {
        self.packages.insert(package.name.clone(), Arc::new(package));
    }

    /// Parse a manifest and register the package it describes.
    pub fn register_manifest(&mut self, json: &str) -> Result<(), PackageError> {
        let manifest = PackageManifest::from_json(json)?;
        self.register(manifest.into_symbol()?);
        Ok(())
    }

    pub fn register_manifest_file(&mut self, path: &Path) -> Result<(), PackageError> {
        let content = std::fs::read_to_string(path).map_err(|source| PackageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.register_manifest(&content)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageResolver for PackageRegistry {
    fn resolve(&self, name: &str, span: TextSpan, diagnostics: &mut DiagnosticCollection) -> Option<Arc<PackageSymbol>> {
        let found = self.packages.get(name).cloned();
        if found.is_none() {
            tracing::debug!(package = name, "package not registered");
            diagnostics.error(Stage::Packager, span, &messages::PACKAGE_NOT_AVAILABLE, &[name]);
        }
        found
    }
}

// ============================================================================
// Manifests
// ============================================================================

/// JSON description of a package's exported surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    #[serde(default)]
    pub classes: Vec<ManifestClass>,
    #[serde(default)]
    pub functions: Vec<ManifestFunction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestClass {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ManifestVariable>,
    #[serde(default)]
    pub functions: Vec<ManifestFunction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFunction {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ManifestVariable>,
    #[serde(default = "default_return_type")]
    pub return_type: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub is_variadic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

fn default_return_type() -> String {
    "void".to_string()
}

fn default_true() -> bool {
    true
}

impl PackageManifest {
    pub fn from_json(json: &str) -> Result<Self, PackageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the package symbol. Class types are qualified with the package
    /// name; type strings may refer to any class of the same package.
    pub fn into_symbol(self) -> Result<PackageSymbol, PackageError> {
        let parser = TypeParser {
            package: &self.name,
            class_names: self.classes.iter().map(|c| c.name.as_str()).collect(),
        };

        let mut classes = Vec::with_capacity(self.classes.len());
        for class in &self.classes {
            let fields = class
                .fields
                .iter()
                .map(|f| Ok(Arc::new(VariableSymbol::global(f.name.clone(), parser.parse(&f.ty)?))))
                .collect::<Result<Vec<_>, PackageError>>()?;
            let functions = class
                .functions
                .iter()
                .map(|f| parser.function(f))
                .collect::<Result<Vec<_>, PackageError>>()?;
            classes.push(Arc::new(ClassSymbol {
                id: SymbolId::fresh(),
                name: class.name.clone(),
                ty: TypeSymbol::class(&class.name, Some(&self.name)),
                functions,
                fields,
                span: TextSpan::default(),
            }));
        }

        let functions = self
            .functions
            .iter()
            .map(|f| parser.function(f))
            .collect::<Result<Vec<_>, PackageError>>()?;

        tracing::debug!(package = %self.name, classes = classes.len(), functions = functions.len(), "loaded package manifest");
        Ok(PackageSymbol::new(self.name.clone(), classes, functions))
    }
}

struct TypeParser<'a> {
    package: &'a str,
    class_names: Vec<&'a str>,
}

impl TypeParser<'_> {
    fn function(&self, function: &ManifestFunction) -> Result<Arc<FunctionSymbol>, PackageError> {
        let parameters = function
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| Ok(Arc::new(VariableSymbol::parameter(p.name.clone(), i, self.parse(&p.ty)?))))
            .collect::<Result<Vec<_>, PackageError>>()?;
        let return_type = self.parse(&function.return_type)?;
        let mut symbol = FunctionSymbol::new(
            function.name.clone(),
            parameters,
            return_type,
            FunctionKind::External,
            TextSpan::default(),
        );
        symbol.is_public = function.is_public;
        symbol.is_variadic = function.is_variadic;
        Ok(Arc::new(symbol))
    }

    /// Parse surface type syntax: `int`, `array<string>`, `action<int, bool>`.
    fn parse(&self, text: &str) -> Result<TypeSymbol, PackageError> {
        let text = text.trim();
        let malformed = || PackageError::MalformedType {
            package: self.package.to_string(),
            ty: text.to_string(),
        };

        let Some(open) = text.find('<') else {
            if let Some(primitive) = TypeSymbol::primitive(text) {
                return Ok(primitive);
            }
            if self.class_names.contains(&text) {
                return Ok(TypeSymbol::class(text, Some(self.package)));
            }
            return Err(PackageError::UnknownType {
                package: self.package.to_string(),
                ty: text.to_string(),
            });
        };

        let inner = text[open + 1..].strip_suffix('>').ok_or_else(malformed)?;
        let sub_types = split_top_level(inner)
            .into_iter()
            .map(|part| self.parse(part))
            .collect::<Result<Vec<_>, PackageError>>()?;

        match (text[..open].trim(), sub_types.as_slice()) {
            ("array", [element]) => Ok(TypeSymbol::array_of(element.clone())),
            ("pointer", [target]) => Ok(TypeSymbol::pointer_to(target.clone())),
            ("action", [parameters @ .., return_type]) => Ok(TypeSymbol::action(parameters.to_vec(), return_type.clone())),
            _ => Err(malformed()),
        }
    }
}

/// Split on commas that are not nested inside angle brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}
