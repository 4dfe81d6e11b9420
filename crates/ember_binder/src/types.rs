//! Type symbols.
//!
//! A [`TypeSymbol`] is an immutable description of a type: a discriminating
//! name (`int`, `array`, `pointer`, `action`, or a user type name), ordered
//! subtypes, classification flags and the package that defines it. Two types
//! are the same type exactly when their fingerprints are equal.

use std::borrow::Cow;
use std::fmt;

bitflags::bitflags! {
    /// Classification of a type, independent of its name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        const NONE          = 0;
        /// Values live on the heap and are reference counted.
        const OBJECT        = 1 << 0;
        /// Declared by the program (class or struct).
        const USER_DEFINED  = 1 << 1;
        const ENUM          = 1 << 2;
    }
}

#[derive(Clone)]
pub struct TypeSymbol {
    pub name: Cow<'static, str>,
    pub sub_types: Vec<TypeSymbol>,
    pub flags: TypeFlags,
    /// Name of the package the type was declared in.
    pub package: Option<Cow<'static, str>>,
}

const fn primitive(name: &'static str, flags: TypeFlags) -> TypeSymbol {
    TypeSymbol {
        name: Cow::Borrowed(name),
        sub_types: Vec::new(),
        flags,
        package: None,
    }
}

impl TypeSymbol {
    pub const VOID: TypeSymbol = primitive("void", TypeFlags::NONE);
    pub const BOOL: TypeSymbol = primitive("bool", TypeFlags::NONE);
    pub const BYTE: TypeSymbol = primitive("byte", TypeFlags::NONE);
    pub const INT: TypeSymbol = primitive("int", TypeFlags::NONE);
    pub const UINT: TypeSymbol = primitive("uint", TypeFlags::NONE);
    pub const LONG: TypeSymbol = primitive("long", TypeFlags::NONE);
    pub const ULONG: TypeSymbol = primitive("ulong", TypeFlags::NONE);
    pub const FLOAT: TypeSymbol = primitive("float", TypeFlags::NONE);
    pub const DOUBLE: TypeSymbol = primitive("double", TypeFlags::NONE);
    pub const STRING: TypeSymbol = primitive("string", TypeFlags::OBJECT);
    pub const ANY: TypeSymbol = primitive("any", TypeFlags::OBJECT);
    pub const THREAD: TypeSymbol = primitive("thread", TypeFlags::OBJECT);
    /// Sentinel for expressions whose type could not be determined.
    pub const ERROR: TypeSymbol = primitive("?", TypeFlags::NONE);

    pub const ARRAY_NAME: &'static str = "array";
    pub const POINTER_NAME: &'static str = "pointer";
    pub const ACTION_NAME: &'static str = "action";

    /// The primitive table, in lookup order.
    pub const PRIMITIVES: [TypeSymbol; 12] = [
        Self::VOID,
        Self::BOOL,
        Self::BYTE,
        Self::INT,
        Self::LONG,
        Self::FLOAT,
        Self::UINT,
        Self::ULONG,
        Self::DOUBLE,
        Self::STRING,
        Self::THREAD,
        Self::ANY,
    ];

    pub fn primitive(name: &str) -> Option<TypeSymbol> {
        Self::PRIMITIVES.into_iter().find(|t| t.name == name)
    }

    pub fn array_of(element: TypeSymbol) -> TypeSymbol {
        TypeSymbol {
            name: Cow::Borrowed(Self::ARRAY_NAME),
            sub_types: vec![element],
            flags: TypeFlags::OBJECT,
            package: None,
        }
    }

    pub fn pointer_to(target: TypeSymbol) -> TypeSymbol {
        TypeSymbol {
            name: Cow::Borrowed(Self::POINTER_NAME),
            sub_types: vec![target],
            flags: TypeFlags::NONE,
            package: None,
        }
    }

    /// A function type; the last subtype is the return type.
    pub fn action(parameters: Vec<TypeSymbol>, return_type: TypeSymbol) -> TypeSymbol {
        let mut sub_types = parameters;
        sub_types.push(return_type);
        TypeSymbol {
            name: Cow::Borrowed(Self::ACTION_NAME),
            sub_types,
            flags: TypeFlags::NONE,
            package: None,
        }
    }

    pub fn class(name: &str, package: Option<&str>) -> TypeSymbol {
        TypeSymbol {
            name: Cow::Owned(name.to_string()),
            sub_types: Vec::new(),
            flags: TypeFlags::OBJECT | TypeFlags::USER_DEFINED,
            package: package.map(|p| Cow::Owned(p.to_string())),
        }
    }

    pub fn structure(name: &str) -> TypeSymbol {
        TypeSymbol {
            name: Cow::Owned(name.to_string()),
            sub_types: Vec::new(),
            flags: TypeFlags::USER_DEFINED,
            package: None,
        }
    }

    pub fn enumeration(name: &str) -> TypeSymbol {
        TypeSymbol {
            name: Cow::Owned(name.to_string()),
            sub_types: Vec::new(),
            flags: TypeFlags::ENUM,
            package: None,
        }
    }

    /// Canonical identity string: name, recursively fingerprinted subtypes,
    /// then the defining package.
    pub fn fingerprint(&self) -> String {
        let mut out = String::new();
        self.write_fingerprint(&mut out);
        out
    }

    fn write_fingerprint(&self, out: &mut String) {
        out.push_str(&self.name);
        if !self.sub_types.is_empty() {
            out.push('<');
            for (i, sub) in self.sub_types.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                sub.write_fingerprint(out);
            }
            out.push('>');
        }
        if let Some(package) = &self.package {
            out.push('@');
            out.push_str(package);
        }
    }

    pub fn is_error(&self) -> bool {
        self.name == Self::ERROR.name && self.sub_types.is_empty() && self.package.is_none()
    }

    pub fn is_void(&self) -> bool {
        *self == Self::VOID
    }

    pub fn is_object(&self) -> bool {
        self.flags.contains(TypeFlags::OBJECT)
    }

    pub fn is_user_defined(&self) -> bool {
        self.flags.contains(TypeFlags::USER_DEFINED)
    }

    pub fn is_enum(&self) -> bool {
        self.flags.contains(TypeFlags::ENUM)
    }

    pub fn is_array(&self) -> bool {
        self.name == Self::ARRAY_NAME
    }

    pub fn is_pointer(&self) -> bool {
        self.name == Self::POINTER_NAME
    }

    pub fn is_action(&self) -> bool {
        self.name == Self::ACTION_NAME
    }

    /// Element type of an array or target of a pointer.
    pub fn element_type(&self) -> Option<&TypeSymbol> {
        if self.is_array() || self.is_pointer() {
            self.sub_types.first()
        } else {
            None
        }
    }

    /// Whether any part of this type is the error sentinel.
    pub fn contains_error(&self) -> bool {
        self.is_error() || self.sub_types.iter().any(TypeSymbol::contains_error)
    }
}

impl PartialEq for TypeSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.package == other.package
            && self.sub_types == other.sub_types
    }
}

impl Eq for TypeSymbol {}

impl std::hash::Hash for TypeSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.fingerprint().hash(state);
    }
}

impl fmt::Debug for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSymbol({})", self.fingerprint())
    }
}

/// Displays the plain type name, as used in most diagnostics.
impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_of_composites() {
        let ty = TypeSymbol::array_of(TypeSymbol::pointer_to(TypeSymbol::INT));
        assert_eq!(ty.fingerprint(), "array<pointer<int>>");
        let action = TypeSymbol::action(vec![TypeSymbol::STRING, TypeSymbol::BOOL], TypeSymbol::VOID);
        assert_eq!(action.fingerprint(), "action<string,bool,void>");
    }

    #[test]
    fn test_fingerprint_includes_package() {
        let local = TypeSymbol::class("Socket", None);
        let foreign = TypeSymbol::class("Socket", Some("net"));
        assert_eq!(foreign.fingerprint(), "Socket@net");
        assert_ne!(local, foreign);
    }

    #[test]
    fn test_primitive_table() {
        assert_eq!(TypeSymbol::primitive("int"), Some(TypeSymbol::INT));
        assert!(TypeSymbol::primitive("string").unwrap().is_object());
        assert!(TypeSymbol::primitive("array").is_none());
        assert!(TypeSymbol::primitive("?").is_none());
    }

    #[test]
    fn test_error_type_never_matches_real_types() {
        for ty in TypeSymbol::PRIMITIVES {
            assert_ne!(ty.fingerprint(), TypeSymbol::ERROR.fingerprint());
        }
        assert!(TypeSymbol::array_of(TypeSymbol::ERROR).contains_error());
        assert!(!TypeSymbol::array_of(TypeSymbol::ERROR).is_error());
    }
}
