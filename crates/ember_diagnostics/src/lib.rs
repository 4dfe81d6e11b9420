//! ember_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every user-facing error the front-end can produce is declared once in
//! [`messages`] as a [`DiagnosticMessage`] template. Reporting an error never
//! aborts: the caller records it in a [`DiagnosticCollection`] and keeps going
//! with a sentinel value.

use ember_core::text::TextSpan;
use serde::Serialize;
use std::fmt;

/// The pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Binder,
    Packager,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Binder => write!(f, "BINDER"),
            Stage::Packager => write!(f, "PACKAGER"),
        }
    }
}

macro_rules! error_kinds {
    ($($name:ident = $code:expr,)*) => {
        /// Stable classification of every diagnostic. The numeric code never
        /// changes once assigned.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum ErrorKind {
            $($name,)*
        }

        impl ErrorKind {
            /// Every kind, in code order.
            pub const ALL: &'static [ErrorKind] = &[$(ErrorKind::$name,)*];

            pub fn code(self) -> u32 {
                match self {
                    $(ErrorKind::$name => $code,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(ErrorKind::$name => stringify!($name),)*
                }
            }
        }
    };
}

error_kinds! {
    // Name resolution
    UnknownDataType = 1001,
    UnknownClass = 1002,
    UnknownStruct = 1003,
    UnknownField = 1004,
    UnknownPackage = 1005,
    UndefinedVariableReference = 1006,
    UndefinedFunctionCall = 1007,
    TypeFunctionDoesNotExist = 1008,
    InvalidClassAccess = 1009,

    // Declarations
    DuplicateParameter = 1101,
    DuplicateFunction = 1102,
    DuplicateVariableDeclaration = 1103,
    DuplicatePackageImport = 1104,
    DuplicateField = 1105,
    DuplicateEnumValue = 1106,
    IllegalFunctionSignature = 1107,
    IllegalVariableDeclaration = 1108,

    // Arity and signatures
    BadNumberOfParameters = 1201,
    TooManyStructParameters = 1202,
    IncorrectTypeFunctionCall = 1203,
    InvalidNumberOfSubtypes = 1204,

    // Types and conversions
    ConversionError = 1301,
    ExplicitConversionError = 1302,
    UnaryOperatorTypeError = 1303,
    BinaryOperatorTypeError = 1304,
    TernaryOperatorTypeError = 1305,
    UnexpectedNonIntegerValue = 1306,
    UnexpectedNonArrayValue = 1307,
    UnexpectedNonPointerValue = 1308,
    VoidReturn = 1309,

    // Placement
    InvalidExternalFunctionPlacement = 1401,
    IllegalNestedClasses = 1402,
    InvalidStatementPlacement = 1403,
    UnexpectedExpressionStatement = 1404,
    OutsideReturn = 1405,
    OutsideBreak = 1406,
    OutsideContinue = 1407,
    OutsideConstructorCall = 1408,
    OutsideThis = 1409,

    // Access
    FunctionAccessViolation = 1501,
    IllegalConstructorCall = 1502,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A diagnostic message template with its kind.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub kind: ErrorKind,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub kind: ErrorKind,
    /// The source text span where this diagnostic occurred, if any.
    pub span: Option<TextSpan>,
    pub message_text: String,
}

impl Diagnostic {
    /// Create a diagnostic without location info.
    pub fn new(stage: Stage, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            stage,
            kind: message.kind,
            span: None,
            message_text: format_message(message.message, args),
        }
    }

    /// Create a diagnostic attached to a source span.
    pub fn with_span(stage: Stage, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            stage,
            kind: message.kind,
            span: Some(span),
            message_text: format_message(message.message, args),
        }
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(span) = self.span {
            write!(f, "({}): ", span.start)?;
        }
        write!(
            f,
            "{} E{} {}: {}",
            self.stage,
            self.kind.code(),
            self.kind,
            self.message_text
        )
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during binding.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record an error for `stage` at `span`.
    pub fn error(&mut self, stage: Stage, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::with_span(stage, span, message, args));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Number of diagnostics of the given kind.
    pub fn count_of(&self, kind: ErrorKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.diagnostics.iter().map(|d| d.kind).collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sort diagnostics by position. Diagnostics without a span go first.
    pub fn sort(&mut self) {
        self.diagnostics
            .sort_by_key(|d| d.span.map(|s| (s.start, s.length)));
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($kind:ident, $msg:expr) => {
            DiagnosticMessage { kind: ErrorKind::$kind, message: $msg }
        };
    }

    // ========================================================================
    // Name resolution
    // ========================================================================

    pub const UNKNOWN_DATA_TYPE: DiagnosticMessage = diag!(UnknownDataType, "Couldn't find datatype \"{0}\"! Are you missing a package reference?");
    pub const UNKNOWN_CLASS: DiagnosticMessage = diag!(UnknownClass, "Could not find class \"{0}\"!");
    pub const UNKNOWN_CLASS_IN_PACKAGE: DiagnosticMessage = diag!(UnknownClass, "Package \"{0}\" does not contain a class called \"{1}\"!");
    pub const UNKNOWN_STRUCT: DiagnosticMessage = diag!(UnknownStruct, "Could not find struct \"{0}\"!");
    pub const UNKNOWN_FIELD: DiagnosticMessage = diag!(UnknownField, "\"{0}\" does not have a field called \"{1}\"!");
    pub const UNKNOWN_PACKAGE: DiagnosticMessage = diag!(UnknownPackage, "Couldn't find package \"{0}\"! Are you missing a package reference?");
    pub const PACKAGE_NOT_AVAILABLE: DiagnosticMessage = diag!(UnknownPackage, "Package \"{0}\" is not available to this program!");
    pub const UNDEFINED_VARIABLE_REFERENCE: DiagnosticMessage = diag!(UndefinedVariableReference, "Could not find variable \"{0}\"!");
    pub const UNDEFINED_FUNCTION_CALL: DiagnosticMessage = diag!(UndefinedFunctionCall, "Function \"{0}\" could not be found!");
    pub const UNDEFINED_PACKAGE_FUNCTION: DiagnosticMessage = diag!(UndefinedFunctionCall, "Package \"{0}\" does not contain a function called \"{1}\"!");
    pub const TYPE_FUNCTION_DOES_NOT_EXIST: DiagnosticMessage = diag!(TypeFunctionDoesNotExist, "Type \"{0}\" does not have a function called \"{1}\"!");
    pub const INVALID_CLASS_ACCESS: DiagnosticMessage = diag!(InvalidClassAccess, "Cannot access members of non-class type \"{0}\"!");
    pub const UNKNOWN_ENUM_FIELD: DiagnosticMessage = diag!(InvalidClassAccess, "Enum \"{0}\" does not have a field called \"{1}\"!");

    // ========================================================================
    // Declarations
    // ========================================================================

    pub const DUPLICATE_PARAMETER: DiagnosticMessage = diag!(DuplicateParameter, "A parameter with the name \"{0}\" already exists for function \"{1}\"!");
    pub const DUPLICATE_FUNCTION: DiagnosticMessage = diag!(DuplicateFunction, "A member with the name \"{0}\" already exists!");
    pub const DUPLICATE_VARIABLE_DECLARATION: DiagnosticMessage = diag!(DuplicateVariableDeclaration, "Variable \"{0}\" is already declared in this scope!");
    pub const DUPLICATE_PACKAGE_IMPORT: DiagnosticMessage = diag!(DuplicatePackageImport, "Package \"{0}\" has already been loaded!");
    pub const ALIAS_OF_ALIAS: DiagnosticMessage = diag!(DuplicatePackageImport, "Creating an alias of the alias \"{0}\" is not allowed!");
    pub const DUPLICATE_FIELD: DiagnosticMessage = diag!(DuplicateField, "A field with the name \"{0}\" already exists in struct \"{1}\"!");
    pub const DUPLICATE_ENUM_VALUE: DiagnosticMessage = diag!(DuplicateEnumValue, "Enum field \"{0}\" reuses the value {1}!");
    pub const ILLEGAL_CONSTRUCTOR_SIGNATURE: DiagnosticMessage = diag!(IllegalFunctionSignature, "A class constructor is not allowed to be public!");
    pub const ILLEGAL_MAIN_SIGNATURE: DiagnosticMessage = diag!(IllegalFunctionSignature, "The name \"main\" is reserved for the program entry point!");
    pub const ILLEGAL_VARIABLE_DECLARATION: DiagnosticMessage = diag!(IllegalVariableDeclaration, "Variable \"{0}\" is neither given a type, nor an initializer!");

    // ========================================================================
    // Arity and signatures
    // ========================================================================

    pub const BAD_NUMBER_OF_PARAMETERS: DiagnosticMessage = diag!(BadNumberOfParameters, "Function \"{0}\" expects {1} arguments but got {2}!");
    pub const BAD_NUMBER_OF_CONSTRUCTOR_ARGUMENTS: DiagnosticMessage = diag!(BadNumberOfParameters, "Constructor for class \"{0}\" expects {1} arguments but got {2}!");
    pub const TOO_MANY_STRUCT_PARAMETERS: DiagnosticMessage = diag!(TooManyStructParameters, "Struct \"{0}\" has {1} fields but {2} values were given!");
    pub const INCORRECT_TYPE_FUNCTION_CALL: DiagnosticMessage = diag!(IncorrectTypeFunctionCall, "Function \"{0}\" cannot be called on a value of type \"{1}\"!");
    pub const INVALID_NUMBER_OF_SUBTYPES: DiagnosticMessage = diag!(InvalidNumberOfSubtypes, "Type \"{0}\" takes {1} subtype(s) but got {2}!");

    // ========================================================================
    // Types and conversions
    // ========================================================================

    pub const CONVERSION_ERROR: DiagnosticMessage = diag!(ConversionError, "Cannot convert type \"{0}\" to \"{1}\"!");
    pub const ARRAY_ASSIGNMENT_MISMATCH: DiagnosticMessage = diag!(ConversionError, "Array assignment types don't match! Expected \"{0}\" but got \"{1}\"!");
    pub const EXPLICIT_CONVERSION_ERROR: DiagnosticMessage = diag!(ExplicitConversionError, "Cannot implicitly convert type \"{0}\" to \"{1}\"! (An explicit conversion exists. Are you missing a cast?)");
    pub const UNARY_OPERATOR_TYPE_ERROR: DiagnosticMessage = diag!(UnaryOperatorTypeError, "Unary operator \"{0}\" is not defined for type \"{1}\"!");
    pub const BINARY_OPERATOR_TYPE_ERROR: DiagnosticMessage = diag!(BinaryOperatorTypeError, "Binary operator \"{0}\" is not defined for types \"{1}\" and \"{2}\"!");
    pub const TERNARY_CONDITION_TYPE_ERROR: DiagnosticMessage = diag!(TernaryOperatorTypeError, "Ternary condition needs to be of type \"bool\" but is \"{0}\"!");
    pub const TERNARY_BRANCH_TYPE_ERROR: DiagnosticMessage = diag!(TernaryOperatorTypeError, "Ternary branches have mismatching types \"{0}\" and \"{1}\"!");
    pub const UNEXPECTED_NON_INTEGER_VALUE: DiagnosticMessage = diag!(UnexpectedNonIntegerValue, "Expected a value of type \"int\" but got \"{0}\"!");
    pub const NON_INTEGER_ENUM_VALUE: DiagnosticMessage = diag!(UnexpectedNonIntegerValue, "Enum fields are only allowed to be of type \"int\"!");
    pub const UNEXPECTED_NON_ARRAY_VALUE: DiagnosticMessage = diag!(UnexpectedNonArrayValue, "Cannot index into a value of type \"{0}\"!");
    pub const UNEXPECTED_NON_POINTER_VALUE: DiagnosticMessage = diag!(UnexpectedNonPointerValue, "Cannot dereference a value of type \"{0}\"!");
    pub const VOID_RETURN: DiagnosticMessage = diag!(VoidReturn, "Function \"{0}\" does not return a value!");

    // ========================================================================
    // Placement
    // ========================================================================

    pub const INVALID_EXTERNAL_FUNCTION_PLACEMENT: DiagnosticMessage = diag!(InvalidExternalFunctionPlacement, "External functions must be declared in the global scope!");
    pub const ILLEGAL_NESTED_CLASSES: DiagnosticMessage = diag!(IllegalNestedClasses, "Classes are not allowed to contain other classes!");
    pub const ONLY_VARIABLES_IN_CLASS: DiagnosticMessage = diag!(InvalidStatementPlacement, "Only variable declarations are allowed in a class' global scope!");
    pub const ONLY_GLOBALS_IN_CLASS: DiagnosticMessage = diag!(InvalidStatementPlacement, "Only global variable declarations (\"set\") are allowed in a class' global scope!");
    pub const INVALID_FOR_INITIALIZER: DiagnosticMessage = diag!(InvalidStatementPlacement, "The initializer of a for-loop must be a variable declaration!");
    pub const UNEXPECTED_EXPRESSION_STATEMENT: DiagnosticMessage = diag!(UnexpectedExpressionStatement, "Only call and assignment expressions can be used as a statement!");
    pub const OUTSIDE_RETURN: DiagnosticMessage = diag!(OutsideReturn, "Cannot use \"return\" outside of a function!");
    pub const OUTSIDE_BREAK: DiagnosticMessage = diag!(OutsideBreak, "Cannot use \"break\" outside of a loop!");
    pub const OUTSIDE_CONTINUE: DiagnosticMessage = diag!(OutsideContinue, "Cannot use \"continue\" outside of a loop!");
    pub const OUTSIDE_CONSTRUCTOR_CALL: DiagnosticMessage = diag!(OutsideConstructorCall, "Objects cannot be created while declaring a class or struct!");
    pub const OUTSIDE_THIS: DiagnosticMessage = diag!(OutsideThis, "Cannot use \"this\" outside of a class!");

    // ========================================================================
    // Access
    // ========================================================================

    pub const FUNCTION_ACCESS_VIOLATION: DiagnosticMessage = diag!(FunctionAccessViolation, "Function \"{0}\" is not public and cannot be accessed from here!");
    pub const VARIABLE_ACCESS_VIOLATION: DiagnosticMessage = diag!(FunctionAccessViolation, "Variable \"{0}\" is not global and cannot be accessed from here!");
    pub const ILLEGAL_CONSTRUCTOR_CALL: DiagnosticMessage = diag!(IllegalConstructorCall, "A class is not allowed to call its own constructor!");
    pub const ILLEGAL_CONSTRUCTOR_REFERENCE: DiagnosticMessage = diag!(IllegalConstructorCall, "Lambda reference to the constructor of the own class is not allowed!");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message("Cannot convert type \"{0}\" to \"{1}\"!", &["string", "int"]);
        assert_eq!(msg, "Cannot convert type \"string\" to \"int\"!");
    }

    #[test]
    fn test_format_message_no_args() {
        let msg = format_message("Cannot use \"this\" outside of a class!", &[]);
        assert_eq!(msg, "Cannot use \"this\" outside of a class!");
    }

    #[test]
    fn test_error_codes_are_unique() {
        let mut codes: Vec<u32> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::with_span(
            Stage::Binder,
            TextSpan::new(10, 5),
            &messages::UNDEFINED_VARIABLE_REFERENCE,
            &["foo"],
        );
        let display = format!("{}", diag);
        assert!(display.contains("BINDER"));
        assert!(display.contains("E1006"));
        assert!(display.contains("foo"));
    }

    #[test]
    fn test_diagnostic_without_location() {
        let diag = Diagnostic::new(Stage::Packager, &messages::UNKNOWN_PACKAGE, &["sys"]);
        assert!(diag.span.is_none());
        assert_eq!(diag.kind, ErrorKind::UnknownPackage);
        assert_eq!(diag.code(), 1005);
    }

    #[test]
    fn test_diagnostic_collection() {
        let mut collection = DiagnosticCollection::new();
        assert!(collection.is_empty());
        assert!(!collection.has_errors());

        collection.error(Stage::Binder, TextSpan::new(3, 1), &messages::OUTSIDE_BREAK, &[]);
        collection.error(Stage::Binder, TextSpan::new(1, 1), &messages::OUTSIDE_BREAK, &[]);
        assert!(collection.has_errors());
        assert_eq!(collection.error_count(), 2);
        assert_eq!(collection.count_of(ErrorKind::OutsideBreak), 2);
        assert!(!collection.contains(ErrorKind::OutsideContinue));
    }

    #[test]
    fn test_diagnostic_collection_sort() {
        let mut collection = DiagnosticCollection::new();
        collection.error(Stage::Binder, TextSpan::new(10, 1), &messages::OUTSIDE_BREAK, &[]);
        collection.error(Stage::Binder, TextSpan::new(2, 1), &messages::OUTSIDE_THIS, &[]);
        collection.sort();
        assert_eq!(collection.diagnostics()[0].kind, ErrorKind::OutsideThis);
    }

    #[test]
    fn test_diagnostic_serializes_kind_and_stage() {
        let diag = Diagnostic::with_span(Stage::Binder, TextSpan::new(0, 4), &messages::OUTSIDE_THIS, &[]);
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"stage\":\"BINDER\""));
        assert!(json.contains("\"kind\":\"OutsideThis\""));
    }
}
