#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Microgen Validation Engine
//!
//! Checks the tagged service interface against the shape contract generated
//! code relies on, and optionally against the structs of an independently
//! generated wire file. Every violation found in one pass is reported together
//! through a single [`ValidationError`].

use std::fmt;

use ir::{InterfaceDecl, WireStructFile};
use semantics::DirectiveSet;

pub mod validator;
pub mod violation;
pub mod wire;

pub use validator::InterfaceValidator;
pub use violation::{ParameterSide, Violation};
pub use wire::WireChecker;

/// All violations found while validating one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Wrap a list of violations; `None` when the list is empty
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    /// The violations, in discovery order
    pub fn violations(&self) -> &[Violation] { &self.violations }

    /// Number of violations
    pub fn len(&self) -> usize { self.violations.len() }

    /// Always false; an empty error is never constructed
    pub fn is_empty(&self) -> bool { self.violations.is_empty() }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.as_slice() {
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "many errors:")?;
                for (i, violation) in many.iter().enumerate() {
                    write!(f, "\n{}. {}", i + 1, violation)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result alias for validation
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validate `iface`, interpreting its directives on the way
///
/// Use [`InterfaceValidator`] directly when the directives are already at hand.
pub fn validate_interface(iface: &InterfaceDecl, wire: Option<&WireStructFile>) -> Result<()> {
    let directives = DirectiveSet::interpret(iface);
    InterfaceValidator::new(&directives).with_wire_file(wire).validate(iface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_violation_prints_alone() {
        let err = ValidationError::from_violations(vec![Violation::NoMethods {
            interface: "Svc".into(),
        }])
        .expect("one violation");
        assert_eq!(err.to_string(), "interface Svc has no methods");
    }

    #[test]
    fn several_violations_are_numbered() {
        let err = ValidationError::from_violations(vec![
            Violation::ContextFirst { method: "A".into() },
            Violation::ErrorLast { method: "A".into() },
        ])
        .expect("two violations");
        assert_eq!(
            err.to_string(),
            "many errors:\n1. A: first argument should be of type context.Context\n\
             2. A: last result should be of type error"
        );
    }

    #[test]
    fn no_violations_is_no_error() {
        assert!(ValidationError::from_violations(Vec::new()).is_none());
    }
}
