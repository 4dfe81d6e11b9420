//! Symbol definitions.
//!
//! Symbols are shared through `Arc` so scopes, bound nodes and the class /
//! package symbols that snapshot them all point at the same declaration.

use crate::types::TypeSymbol;
use ember_core::text::TextSpan;
use indexmap::IndexMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Unique identity of a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

static NEXT_SYMBOL_ID: AtomicU32 = AtomicU32::new(1);

impl SymbolId {
    /// Allocate a process-wide unique id.
    pub fn fresh() -> Self {
        SymbolId(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of symbol kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    LocalVariable,
    GlobalVariable,
    Parameter,
    Function,
    ExternalFunction,
    Class,
    Struct,
    Enum,
    Package,
    TypeFunction,
}

// ============================================================================
// Variables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Local,
    Global,
    Parameter,
}

#[derive(Debug, Clone)]
pub struct VariableSymbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: VariableKind,
    pub read_only: bool,
    pub ty: TypeSymbol,
    /// Position in the parameter list (parameters only).
    pub ordinal: usize,
}

impl VariableSymbol {
    pub fn new(name: impl Into<String>, kind: VariableKind, read_only: bool, ty: TypeSymbol) -> Self {
        Self {
            id: SymbolId::fresh(),
            name: name.into(),
            kind,
            read_only,
            ty,
            ordinal: 0,
        }
    }

    pub fn local(name: impl Into<String>, ty: TypeSymbol) -> Self {
        Self::new(name, VariableKind::Local, false, ty)
    }

    pub fn global(name: impl Into<String>, ty: TypeSymbol) -> Self {
        Self::new(name, VariableKind::Global, false, ty)
    }

    pub fn parameter(name: impl Into<String>, ordinal: usize, ty: TypeSymbol) -> Self {
        Self {
            ordinal,
            ..Self::new(name, VariableKind::Parameter, false, ty)
        }
    }

    pub fn symbol_kind(&self) -> SymbolKind {
        match self.kind {
            VariableKind::Local => SymbolKind::LocalVariable,
            VariableKind::Global => SymbolKind::GlobalVariable,
            VariableKind::Parameter => SymbolKind::Parameter,
        }
    }

    pub fn is_global(&self) -> bool {
        self.kind == VariableKind::Global
    }
}

// ============================================================================
// Functions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    User,
    External,
    Lambda,
    Builtin,
}

#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub id: SymbolId,
    pub name: String,
    pub parameters: Vec<Arc<VariableSymbol>>,
    pub return_type: TypeSymbol,
    pub kind: FunctionKind,
    pub is_public: bool,
    pub is_variadic: bool,
    /// External function whose arguments are adapted to the native ABI.
    pub is_adapted: bool,
    /// Span of the declaration.
    pub span: TextSpan,
}

impl FunctionSymbol {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Arc<VariableSymbol>>,
        return_type: TypeSymbol,
        kind: FunctionKind,
        span: TextSpan,
    ) -> Self {
        Self {
            id: SymbolId::fresh(),
            name: name.into(),
            parameters,
            return_type,
            kind,
            is_public: false,
            is_variadic: false,
            is_adapted: false,
            span,
        }
    }

    pub fn symbol_kind(&self) -> SymbolKind {
        match self.kind {
            FunctionKind::External => SymbolKind::ExternalFunction,
            _ => SymbolKind::Function,
        }
    }

    /// The `action<...>` type of a reference to this function.
    pub fn action_type(&self) -> TypeSymbol {
        TypeSymbol::action(
            self.parameters.iter().map(|p| p.ty.clone()).collect(),
            self.return_type.clone(),
        )
    }
}

// ============================================================================
// User types
// ============================================================================

/// A class. Members are a snapshot of the class scope at declaration time.
#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub id: SymbolId,
    pub name: String,
    pub ty: TypeSymbol,
    pub functions: Vec<Arc<FunctionSymbol>>,
    pub fields: Vec<Arc<VariableSymbol>>,
    pub span: TextSpan,
}

impl ClassSymbol {
    pub const CONSTRUCTOR: &'static str = "Constructor";

    pub fn function(&self, name: &str) -> Option<&Arc<FunctionSymbol>> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Arc<VariableSymbol>> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn constructor(&self) -> Option<&Arc<FunctionSymbol>> {
        self.function(Self::CONSTRUCTOR)
    }

    pub fn owns(&self, function: &FunctionSymbol) -> bool {
        self.functions.iter().any(|f| f.id == function.id)
    }
}

#[derive(Debug, Clone)]
pub struct StructSymbol {
    pub id: SymbolId,
    pub name: String,
    pub ty: TypeSymbol,
    pub fields: Vec<Arc<VariableSymbol>>,
    pub span: TextSpan,
}

impl StructSymbol {
    pub fn field(&self, name: &str) -> Option<&Arc<VariableSymbol>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct EnumSymbol {
    pub id: SymbolId,
    pub name: String,
    pub ty: TypeSymbol,
    /// Field name to value, in declaration order.
    pub values: IndexMap<String, i32>,
    pub span: TextSpan,
}

/// A loaded package, or an alias of one.
#[derive(Debug, Clone)]
pub struct PackageSymbol {
    pub id: SymbolId,
    pub name: String,
    pub classes: Vec<Arc<ClassSymbol>>,
    pub functions: Vec<Arc<FunctionSymbol>>,
    pub is_alias: bool,
    /// The aliased package.
    pub original: Option<Arc<PackageSymbol>>,
}

impl PackageSymbol {
    pub fn new(name: impl Into<String>, classes: Vec<Arc<ClassSymbol>>, functions: Vec<Arc<FunctionSymbol>>) -> Self {
        Self {
            id: SymbolId::fresh(),
            name: name.into(),
            classes,
            functions,
            is_alias: false,
            original: None,
        }
    }

    pub fn class(&self, name: &str) -> Option<&Arc<ClassSymbol>> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&Arc<FunctionSymbol>> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Which builtin operation a type function performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFunctionKind {
    GetLength,
    GetArrayLength,
    GetBuffer,
    Substring,
    Push,
    PrimitivePush,
    Join,
    Kill,
    Run,
    RunThread,
}

impl TypeFunctionKind {
    pub fn name(self) -> &'static str {
        match self {
            TypeFunctionKind::GetLength => "GetLength",
            TypeFunctionKind::GetArrayLength => "GetArrayLength",
            TypeFunctionKind::GetBuffer => "GetBuffer",
            TypeFunctionKind::Substring => "Substring",
            TypeFunctionKind::Push => "Push",
            TypeFunctionKind::PrimitivePush => "PPush",
            TypeFunctionKind::Join => "Join",
            TypeFunctionKind::Kill => "Kill",
            TypeFunctionKind::Run => "Run",
            TypeFunctionKind::RunThread => "RunThread",
        }
    }
}

/// A builtin function invoked on a value (`value->Function()`).
#[derive(Debug, Clone)]
pub struct TypeFunctionSymbol {
    pub kind: TypeFunctionKind,
    pub parameters: Vec<Arc<VariableSymbol>>,
    pub return_type: TypeSymbol,
    /// Type name the function is defined on (`string`, `array`, ...).
    pub origin: &'static str,
}

// ============================================================================
// Symbol
// ============================================================================

/// Anything that can be declared in a scope.
#[derive(Debug, Clone)]
pub enum Symbol {
    Variable(Arc<VariableSymbol>),
    Function(Arc<FunctionSymbol>),
    Class(Arc<ClassSymbol>),
    Struct(Arc<StructSymbol>),
    Enum(Arc<EnumSymbol>),
    Package(Arc<PackageSymbol>),
    TypeFunction(Arc<TypeFunctionSymbol>),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(s) => &s.name,
            Symbol::Function(s) => &s.name,
            Symbol::Class(s) => &s.name,
            Symbol::Struct(s) => &s.name,
            Symbol::Enum(s) => &s.name,
            Symbol::Package(s) => &s.name,
            Symbol::TypeFunction(s) => s.kind.name(),
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Variable(s) => s.symbol_kind(),
            Symbol::Function(s) => s.symbol_kind(),
            Symbol::Class(_) => SymbolKind::Class,
            Symbol::Struct(_) => SymbolKind::Struct,
            Symbol::Enum(_) => SymbolKind::Enum,
            Symbol::Package(_) => SymbolKind::Package,
            Symbol::TypeFunction(_) => SymbolKind::TypeFunction,
        }
    }
}
