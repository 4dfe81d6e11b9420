//! Conversion classification between two types.

use crate::types::TypeSymbol;

/// How a value of one type can become a value of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub exists: bool,
    /// Source and target are the same type; no node is needed.
    pub is_identity: bool,
    /// Only allowed through an explicit cast.
    pub is_explicit: bool,
}

impl Conversion {
    pub const NONE: Conversion = Conversion { exists: false, is_identity: false, is_explicit: false };
    pub const IDENTITY: Conversion = Conversion { exists: true, is_identity: true, is_explicit: false };
    pub const IMPLICIT: Conversion = Conversion { exists: true, is_identity: false, is_explicit: false };
    pub const EXPLICIT: Conversion = Conversion { exists: true, is_identity: false, is_explicit: true };

    pub fn is_implicit(&self) -> bool {
        self.exists && !self.is_explicit
    }
}

const NUMERIC: [&str; 7] = ["byte", "int", "uint", "long", "ulong", "float", "double"];

fn is_numeric(ty: &TypeSymbol) -> bool {
    ty.package.is_none() && ty.sub_types.is_empty() && NUMERIC.contains(&ty.name.as_ref())
}

/// Lossless numeric promotions.
fn widens_to(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("byte", "int" | "uint" | "long" | "ulong" | "float" | "double")
            | ("int", "long" | "float" | "double")
            | ("uint", "long" | "ulong" | "float" | "double")
            | ("long" | "ulong", "float" | "double")
            | ("float", "double")
    )
}

/// Classify the conversion from `from` to `to`. Pure; never reports.
pub fn classify_conversion(from: &TypeSymbol, to: &TypeSymbol) -> Conversion {
    if from == to {
        return Conversion::IDENTITY;
    }

    if from.is_error() || to.is_error() || from.is_void() || to.is_void() {
        return Conversion::NONE;
    }

    if *to == TypeSymbol::ANY {
        return Conversion::IMPLICIT;
    }
    if *from == TypeSymbol::ANY {
        return Conversion::EXPLICIT;
    }

    if is_numeric(from) && is_numeric(to) {
        return if widens_to(&from.name, &to.name) {
            Conversion::IMPLICIT
        } else {
            Conversion::EXPLICIT
        };
    }

    let from_scalar = is_numeric(from) || *from == TypeSymbol::BOOL;
    let to_scalar = is_numeric(to) || *to == TypeSymbol::BOOL;
    if (from_scalar && *to == TypeSymbol::STRING) || (*from == TypeSymbol::STRING && to_scalar) {
        return Conversion::EXPLICIT;
    }

    if from.is_enum() && *to == TypeSymbol::INT {
        return Conversion::IMPLICIT;
    }
    if *from == TypeSymbol::INT && to.is_enum() {
        return Conversion::EXPLICIT;
    }

    let is_class = |t: &TypeSymbol| t.is_object() && t.is_user_defined();
    if is_class(from) && is_class(to) {
        return Conversion::EXPLICIT;
    }

    Conversion::NONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_on_equal_fingerprints() {
        let a = TypeSymbol::array_of(TypeSymbol::INT);
        let b = TypeSymbol::array_of(TypeSymbol::INT);
        assert_eq!(classify_conversion(&a, &b), Conversion::IDENTITY);
    }

    #[test]
    fn test_error_type_has_no_conversions() {
        assert_eq!(classify_conversion(&TypeSymbol::ERROR, &TypeSymbol::INT), Conversion::NONE);
        assert_eq!(classify_conversion(&TypeSymbol::INT, &TypeSymbol::ERROR), Conversion::NONE);
        assert_eq!(classify_conversion(&TypeSymbol::ERROR, &TypeSymbol::ANY), Conversion::NONE);
    }

    #[test]
    fn test_enum_and_int() {
        let color = TypeSymbol::enumeration("Color");
        assert_eq!(classify_conversion(&color, &TypeSymbol::INT), Conversion::IMPLICIT);
        assert_eq!(classify_conversion(&TypeSymbol::INT, &color), Conversion::EXPLICIT);
        assert_eq!(classify_conversion(&color, &TypeSymbol::LONG), Conversion::NONE);
    }
}
