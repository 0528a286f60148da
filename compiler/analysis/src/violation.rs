//! Typed validation findings

use std::fmt;

/// Which side of a signature a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSide {
    /// Method argument, compared against the request struct
    Argument,
    /// Method result, compared against the response struct
    Result,
}

impl fmt::Display for ParameterSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterSide::Argument => write!(f, "argument"),
            ParameterSide::Result => write!(f, "result"),
        }
    }
}

/// One broken rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// The interface declares no methods
    #[error("interface {interface} has no methods")]
    NoMethods {
        /// Interface name
        interface: String,
    },
    /// The first argument is not `context.Context`
    #[error("{method}: first argument should be of type context.Context")]
    ContextFirst {
        /// Method name
        method: String,
    },
    /// The last result is not `error`
    #[error("{method}: last result should be of type error")]
    ErrorLast {
        /// Method name
        method: String,
    },
    /// A parameter without a name
    #[error("{method}: unnamed parameter of type {ty}")]
    UnnamedParameter {
        /// Method name
        method: String,
        /// Rendered parameter type
        ty: String,
    },
    /// A parameter typed as an inline interface with methods
    #[error("{method}: non empty interface {parameter} is not allowed, declare it outside")]
    NonEmptyInterface {
        /// Method name
        method: String,
        /// Rendered parameter
        parameter: String,
    },
    /// A parameter typed as an inline struct
    #[error("{method}: raw struct {parameter} is not allowed, declare it outside")]
    RawStruct {
        /// Method name
        method: String,
        /// Parameter name
        parameter: String,
    },
    /// A parameter typed as an inline function
    #[error("{method}: raw function {parameter} is not allowed, declare it outside")]
    RawFunction {
        /// Method name
        method: String,
        /// Parameter name
        parameter: String,
    },
    /// A GET method with an argument that cannot be placed in the URL path
    #[error("{method}: can't use GET method with provided arguments")]
    GetArguments {
        /// Method name
        method: String,
    },
    /// The wire file lacks a request or response struct
    #[error("did not find struct {name} in wire file")]
    MissingWireStruct {
        /// Expected struct name
        name: String,
    },
    /// A wire struct lacks the field of a parameter
    #[error("did not find field {field} in struct {structure} in wire file")]
    MissingWireField {
        /// Expected field name
        field: String,
        /// Struct searched
        structure: String,
    },
    /// A wire field's type differs from its parameter's type
    #[error(
        "{side} {parameter} in method {method} has different type in wire file: \
         expected {expected}, got {found}"
    )]
    WireTypeMismatch {
        /// Argument or result
        side: ParameterSide,
        /// Parameter name
        parameter: String,
        /// Method name
        method: String,
        /// Canonical type of the parameter
        expected: String,
        /// Canonical type of the wire field
        found: String,
    },
}

impl Violation {
    /// Name of the method the violation is about, if any
    pub fn method(&self) -> Option<&str> {
        match self {
            Violation::ContextFirst { method }
            | Violation::ErrorLast { method }
            | Violation::UnnamedParameter { method, .. }
            | Violation::NonEmptyInterface { method, .. }
            | Violation::RawStruct { method, .. }
            | Violation::RawFunction { method, .. }
            | Violation::GetArguments { method }
            | Violation::WireTypeMismatch { method, .. } => Some(method),
            Violation::NoMethods { .. }
            | Violation::MissingWireStruct { .. }
            | Violation::MissingWireField { .. } => None,
        }
    }
}
