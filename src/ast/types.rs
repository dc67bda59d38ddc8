//! Declared types for fields, trigger parameters, and function signatures.

/// A declared type: a bare name, `list<T>`, or `map<K, V>`.
///
/// Unknown generics (`Foo<A, B>`) are collapsed by the parser into a
/// `Simple` carrying the rendered text, so the validator sees one shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Simple {
        name: String,
        line: usize,
        column: usize,
    },
    List {
        element: Box<TypeExpr>,
        line: usize,
        column: usize,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        line: usize,
        column: usize,
    },
}

impl TypeExpr {
    pub fn simple(name: impl Into<String>, line: usize, column: usize) -> Self {
        TypeExpr::Simple {
            name: name.into(),
            line,
            column,
        }
    }

    /// True when `object` appears as this type or any generic argument,
    /// including inside collapsed unknown generics.
    pub fn mentions_object(&self) -> bool {
        match self {
            TypeExpr::Simple { name, .. } => name
                .split(|c: char| !c.is_alphanumeric() && c != '_')
                .any(|part| part.eq_ignore_ascii_case("object")),
            TypeExpr::List { element, .. } => element.mentions_object(),
            TypeExpr::Map { key, value, .. } => key.mentions_object() || value.mentions_object(),
        }
    }
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeExpr::Simple { name, .. } => write!(f, "{name}"),
            TypeExpr::List { element, .. } => write!(f, "list<{element}>"),
            TypeExpr::Map { key, value, .. } => write!(f, "map<{key}, {value}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(name: &str) -> TypeExpr {
        TypeExpr::List {
            element: Box::new(TypeExpr::simple(name, 1, 1)),
            line: 1,
            column: 1,
        }
    }

    #[test]
    fn display_renders_generics() {
        assert_eq!(list_of("peer_id").to_string(), "list<peer_id>");
        let map = TypeExpr::Map {
            key: Box::new(TypeExpr::simple("string", 1, 1)),
            value: Box::new(TypeExpr::simple("bool", 1, 1)),
            line: 1,
            column: 1,
        };
        assert_eq!(map.to_string(), "map<string, bool>");
    }

    #[test]
    fn object_detection_is_structural() {
        assert!(TypeExpr::simple("object", 1, 1).mentions_object());
        assert!(list_of("object").mentions_object());
        assert!(TypeExpr::simple("Foo<object, int>", 1, 1).mentions_object());
        assert!(!TypeExpr::simple("objection", 1, 1).mentions_object());
        assert!(!list_of("uint").mentions_object());
    }
}
