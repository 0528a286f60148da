//! Interface and method shape validation
//!
//! Validates the tagged interface before anything is generated. Methods in
//! the default mode get the full contract; every other mode only gets the
//! named-parameter rule, since streaming and excluded methods are not turned
//! into request/response wrappers.

use ir::{InterfaceDecl, MethodDecl, WireStructFile};
use semantics::{DirectiveSet, GenerationMode, HttpMethod};

use crate::violation::Violation;
use crate::wire::WireChecker;
use crate::{Result, ValidationError};

/// Types a GET route can carry as path variables
const PATH_INSERTABLE_TYPES: [&str; 7] =
    ["string", "int", "int32", "int64", "uint", "uint32", "uint64"];

/// Interface validator
#[derive(Debug, Clone, Copy)]
pub struct InterfaceValidator<'a> {
    directives: &'a DirectiveSet,
    wire: Option<&'a WireStructFile>,
}

impl<'a> InterfaceValidator<'a> {
    /// Create a validator using the interpreted directives of the interface
    pub fn new(directives: &'a DirectiveSet) -> Self { Self { directives, wire: None } }

    /// Also cross-check default-mode methods against a wire file
    pub fn with_wire_file(mut self, wire: Option<&'a WireStructFile>) -> Self {
        self.wire = wire;
        self
    }

    /// Validate and fold every violation into one error
    pub fn validate(&self, iface: &InterfaceDecl) -> Result<()> {
        match ValidationError::from_violations(self.violations(iface)) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every violation of `iface`, in method order
    pub fn violations(&self, iface: &InterfaceDecl) -> Vec<Violation> {
        let mut violations = Vec::new();
        if iface.methods.is_empty() {
            violations.push(Violation::NoMethods { interface: iface.name.clone() });
        }
        for method in &iface.methods {
            self.validate_method(method, &mut violations);
        }
        violations
    }

    fn validate_method(&self, method: &MethodDecl, violations: &mut Vec<Violation>) {
        check_named_parameters(method, violations);
        if self.directives.mode_of(&method.name) != GenerationMode::Default {
            return;
        }

        if !method.is_context_first() {
            violations.push(Violation::ContextFirst { method: method.name.clone() });
        }
        if !method.is_error_last() {
            violations.push(Violation::ErrorLast { method: method.name.clone() });
        }
        check_inline_types(method, violations);

        let http_method = self.directives.method(&method.name).map(|d| d.http_method);
        if http_method == Some(HttpMethod::Get) && !arguments_fit_path(method) {
            violations.push(Violation::GetArguments { method: method.name.clone() });
        }

        if let Some(wire) = self.wire {
            violations.extend(WireChecker::new(wire).check_method(method));
        }
    }
}

fn check_named_parameters(method: &MethodDecl, violations: &mut Vec<Violation>) {
    for param in method.parameters().filter(|p| p.name.is_empty()) {
        violations.push(Violation::UnnamedParameter {
            method: method.name.clone(),
            ty: param.ty.to_string(),
        });
    }
}

fn check_inline_types(method: &MethodDecl, violations: &mut Vec<Violation>) {
    for param in method.parameters() {
        if param.ty.is_non_empty_interface() {
            violations.push(Violation::NonEmptyInterface {
                method: method.name.clone(),
                parameter: param.to_string(),
            });
        }
        if param.ty.is_raw_struct() {
            violations.push(Violation::RawStruct {
                method: method.name.clone(),
                parameter: param.name.clone(),
            });
        }
        if param.ty.is_raw_function() {
            violations.push(Violation::RawFunction {
                method: method.name.clone(),
                parameter: param.name.clone(),
            });
        }
    }
}

fn arguments_fit_path(method: &MethodDecl) -> bool {
    method.args_without_context().iter().all(|arg| {
        arg.ty
            .strip_imports()
            .plain_name()
            .is_some_and(|name| PATH_INSERTABLE_TYPES.contains(&name))
    })
}
