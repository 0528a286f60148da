//! Recursive structural type descriptor
//!
//! `TypeRef` mirrors what the Go parser reports for a parameter or field type.
//! Shape checks (context type, error type, inline declarations) and the wire
//! drift check both work on this tree. The wire check compares the
//! import-free `CanonicalType` projection rather than rendered strings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::declarations::{FieldDecl, MethodDecl, Parameter};

/// Import path of the standard cancellation/deadline context package.
pub const CONTEXT_PACKAGE: &str = "context";
/// Name of the context type inside [`CONTEXT_PACKAGE`].
pub const CONTEXT_TYPE: &str = "Context";
/// Name of the built-in error-signaling type.
pub const ERROR_TYPE: &str = "error";

/// Length marker of an array-like type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayLen {
    /// `[]T`
    Slice,
    /// `...T` (variadic parameter)
    Ellipsis,
    /// `[N]T`
    Fixed(usize),
}

/// A structural type reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A named type, built-in (`string`) or declared (`Comment`)
    Name {
        /// Type name without any package qualifier
        name: String,
    },
    /// One or more pointer indirections
    Pointer {
        /// Number of `*` in front of the next type
        #[serde(default = "default_depth")]
        depth: usize,
        /// Pointee
        next: Box<TypeRef>,
    },
    /// Slice, fixed-length array or variadic marker
    Array {
        /// Length marker
        len: ArrayLen,
        /// Element type
        next: Box<TypeRef>,
    },
    /// `map[K]V`
    Map {
        /// Key type
        key: Box<TypeRef>,
        /// Value type
        value: Box<TypeRef>,
    },
    /// Inline `interface{ ... }`
    Interface {
        /// Declared methods; empty for `interface{}`
        #[serde(default)]
        methods: Vec<MethodDecl>,
    },
    /// Inline `struct{ ... }`
    Struct {
        /// Declared fields
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
    /// Inline `func(...) (...)`
    Func {
        /// Function arguments
        #[serde(default)]
        args: Vec<Parameter>,
        /// Function results
        #[serde(default)]
        results: Vec<Parameter>,
    },
    /// Import-qualified reference (`pkg.Next`)
    Import {
        /// Import path of the package, e.g. `github.com/go-kit/log`
        package: String,
        /// Local alias when the import is renamed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        /// The qualified type
        next: Box<TypeRef>,
    },
}

fn default_depth() -> usize { 1 }

impl TypeRef {
    /// A named type
    pub fn named(name: impl Into<String>) -> Self { TypeRef::Name { name: name.into() } }

    /// A single pointer to `next`
    pub fn pointer(next: TypeRef) -> Self { TypeRef::Pointer { depth: 1, next: Box::new(next) } }

    /// A slice of `next`
    pub fn slice(next: TypeRef) -> Self {
        TypeRef::Array { len: ArrayLen::Slice, next: Box::new(next) }
    }

    /// A fixed-length array of `next`
    pub fn array(len: usize, next: TypeRef) -> Self {
        TypeRef::Array { len: ArrayLen::Fixed(len), next: Box::new(next) }
    }

    /// A map from `key` to `value`
    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Map { key: Box::new(key), value: Box::new(value) }
    }

    /// An import-qualified reference
    pub fn imported(package: impl Into<String>, next: TypeRef) -> Self {
        TypeRef::Import { package: package.into(), alias: None, next: Box::new(next) }
    }

    /// `context.Context`
    pub fn context() -> Self { Self::imported(CONTEXT_PACKAGE, Self::named(CONTEXT_TYPE)) }

    /// `error`
    pub fn error() -> Self { Self::named(ERROR_TYPE) }

    /// Skip any import qualifiers wrapping this type
    pub fn strip_imports(&self) -> &TypeRef {
        let mut current = self;
        while let TypeRef::Import { next, .. } = current {
            current = next;
        }
        current
    }

    /// Whether this is the standard cancellation context type
    pub fn is_context(&self) -> bool {
        match self {
            TypeRef::Import { package, next, .. } => {
                package == CONTEXT_PACKAGE
                    && matches!(next.as_ref(), TypeRef::Name { name } if name == CONTEXT_TYPE)
            }
            _ => false,
        }
    }

    /// Whether this is the built-in error type
    pub fn is_error(&self) -> bool { matches!(self, TypeRef::Name { name } if name == ERROR_TYPE) }

    /// Name of the type if it is a plain (unqualified) named type
    pub fn plain_name(&self) -> Option<&str> {
        match self {
            TypeRef::Name { name } => Some(name),
            _ => None,
        }
    }

    /// Skip import qualifiers, pointers, slices, arrays and variadic markers
    pub fn element(&self) -> &TypeRef {
        let mut current = self;
        loop {
            match current {
                TypeRef::Import { next, .. }
                | TypeRef::Pointer { next, .. }
                | TypeRef::Array { next, .. } => current = next,
                _ => return current,
            }
        }
    }

    /// Whether the element type is an inline interface with at least one method
    pub fn is_non_empty_interface(&self) -> bool {
        matches!(self.element(), TypeRef::Interface { methods } if !methods.is_empty())
    }

    /// Whether the element type is an inline struct
    pub fn is_raw_struct(&self) -> bool { matches!(self.element(), TypeRef::Struct { .. }) }

    /// Whether the element type is an inline function type
    pub fn is_raw_function(&self) -> bool { matches!(self.element(), TypeRef::Func { .. }) }

    /// Project this type onto its import-free canonical form
    ///
    /// Import qualifiers are dropped at every depth and chains of pointer nodes
    /// collapse into one node carrying the summed depth, so `**T` written as one
    /// node or as two nested ones compares equal.
    pub fn canonical(&self) -> CanonicalType {
        match self {
            TypeRef::Name { name } => CanonicalType::Name(name.clone()),
            TypeRef::Import { next, .. } => next.canonical(),
            TypeRef::Pointer { depth, next } => match next.canonical() {
                CanonicalType::Pointer(inner, pointee) => {
                    CanonicalType::Pointer(depth + inner, pointee)
                }
                other => CanonicalType::Pointer(*depth, Box::new(other)),
            },
            TypeRef::Array { len, next } => CanonicalType::Array(*len, Box::new(next.canonical())),
            TypeRef::Map { key, value } => {
                CanonicalType::Map(Box::new(key.canonical()), Box::new(value.canonical()))
            }
            TypeRef::Interface { methods } => CanonicalType::Interface(
                methods
                    .iter()
                    .map(|m| CanonicalSignature::new(Some(&m.name), &m.args, &m.results))
                    .collect(),
            ),
            TypeRef::Struct { fields } => CanonicalType::Struct(
                fields.iter().map(|f| (f.name.clone(), f.ty.canonical())).collect(),
            ),
            TypeRef::Func { args, results } => {
                CanonicalType::Func(CanonicalSignature::new(None, args, results))
            }
        }
    }

    /// Structural equality ignoring import qualifiers
    pub fn same_shape(&self, other: &TypeRef) -> bool { self.canonical() == other.canonical() }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Name { name } => write!(f, "{}", name),
            TypeRef::Pointer { depth, next } => write!(f, "{}{}", "*".repeat(*depth), next),
            TypeRef::Array { len, next } => write!(f, "{}{}", len, next),
            TypeRef::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeRef::Interface { methods } if methods.is_empty() => write!(f, "interface{{}}"),
            TypeRef::Interface { methods } => {
                write!(f, "interface{{ ")?;
                for (i, m) in methods.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", m.name)?;
                    write_signature(f, &m.args, &m.results)?;
                }
                write!(f, " }}")
            }
            TypeRef::Struct { fields } if fields.is_empty() => write!(f, "struct{{}}"),
            TypeRef::Struct { fields } => {
                write!(f, "struct{{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{} {}", field.name, field.ty)?;
                }
                write!(f, " }}")
            }
            TypeRef::Func { args, results } => {
                write!(f, "func")?;
                write_signature(f, args, results)
            }
            TypeRef::Import { package, alias, next } => {
                write!(f, "{}.{}", alias.as_deref().unwrap_or_else(|| package_name(package)), next)
            }
        }
    }
}

impl fmt::Display for ArrayLen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLen::Slice => write!(f, "[]"),
            ArrayLen::Ellipsis => write!(f, "..."),
            ArrayLen::Fixed(n) => write!(f, "[{}]", n),
        }
    }
}

fn write_signature(
    f: &mut fmt::Formatter<'_>,
    args: &[Parameter],
    results: &[Parameter],
) -> fmt::Result {
    write!(f, "(")?;
    for (i, p) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", p)?;
    }
    write!(f, ")")?;
    match results {
        [] => Ok(()),
        [single] if single.name.is_empty() => write!(f, " {}", single.ty),
        _ => {
            write!(f, " (")?;
            for (i, p) in results.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", p)?;
            }
            write!(f, ")")
        }
    }
}

/// Last segment of an import path, used as the default package qualifier
pub fn package_name(import_path: &str) -> &str {
    import_path.rsplit('/').next().unwrap_or(import_path)
}

/// Import-free structural projection of a [`TypeRef`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalType {
    /// Named type
    Name(String),
    /// Merged pointer chain
    Pointer(usize, Box<CanonicalType>),
    /// Array-like type
    Array(ArrayLen, Box<CanonicalType>),
    /// Map type
    Map(Box<CanonicalType>, Box<CanonicalType>),
    /// Inline interface with its method signatures
    Interface(Vec<CanonicalSignature>),
    /// Inline struct with named fields
    Struct(Vec<(String, CanonicalType)>),
    /// Function type
    Func(CanonicalSignature),
}

/// Method or function signature in canonical form; parameter names are not part of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSignature {
    /// Method name; `None` for function types
    pub name: Option<String>,
    /// Argument types
    pub args: Vec<CanonicalType>,
    /// Result types
    pub results: Vec<CanonicalType>,
}

impl CanonicalSignature {
    fn new(name: Option<&str>, args: &[Parameter], results: &[Parameter]) -> Self {
        Self {
            name: name.map(str::to_string),
            args: args.iter().map(|p| p.ty.canonical()).collect(),
            results: results.iter().map(|p| p.ty.canonical()).collect(),
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalType::Name(name) => write!(f, "{}", name),
            CanonicalType::Pointer(depth, next) => write!(f, "{}{}", "*".repeat(*depth), next),
            CanonicalType::Array(len, next) => write!(f, "{}{}", len, next),
            CanonicalType::Map(key, value) => write!(f, "map[{}]{}", key, value),
            CanonicalType::Interface(methods) if methods.is_empty() => write!(f, "interface{{}}"),
            CanonicalType::Interface(methods) => {
                write!(f, "interface{{ ")?;
                for (i, m) in methods.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", m)?;
                }
                write!(f, " }}")
            }
            CanonicalType::Struct(fields) => {
                write!(f, "struct{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    write!(f, "{}{} {}", if i > 0 { "; " } else { " " }, name, ty)?;
                }
                if !fields.is_empty() {
                    write!(f, " ")?;
                }
                write!(f, "}}")
            }
            CanonicalType::Func(sig) => write!(f, "func{}", sig),
        }
    }
}

impl fmt::Display for CanonicalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |types: &[CanonicalType]| {
            types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        };
        write!(f, "{}({})", self.name.as_deref().unwrap_or(""), join(&self.args))?;
        match self.results.len() {
            0 => Ok(()),
            1 => write!(f, " {}", self.results[0]),
            _ => write!(f, " ({})", join(&self.results)),
        }
    }
}
