//! Wire-format cross validation
//!
//! A method `M` is expected to have `MRequest` and `MResponse` structs in the
//! wire file, with one field per parameter named after the parameter with its
//! first letter upper-cased. The leading argument and the trailing result are
//! the context and error slots and have no field.

use ir::{MethodDecl, Parameter, StructDecl, WireStructFile};

use crate::violation::{ParameterSide, Violation};

/// Checks methods against the structs of one wire file
#[derive(Debug, Clone, Copy)]
pub struct WireChecker<'a> {
    wire: &'a WireStructFile,
}

impl<'a> WireChecker<'a> {
    /// Create a checker over `wire`
    pub fn new(wire: &'a WireStructFile) -> Self { Self { wire } }

    /// Violations of `method` against the wire file
    pub fn check_method(&self, method: &MethodDecl) -> Vec<Violation> {
        let mut violations = Vec::new();

        let args = method.args.get(1..).unwrap_or_default();
        let results = method.results.split_last().map(|(_, rest)| rest).unwrap_or_default();

        self.check_struct(
            method,
            &request_struct_name(&method.name),
            args,
            ParameterSide::Argument,
            &mut violations,
        );
        self.check_struct(
            method,
            &response_struct_name(&method.name),
            results,
            ParameterSide::Result,
            &mut violations,
        );
        violations
    }

    fn check_struct(
        &self,
        method: &MethodDecl,
        struct_name: &str,
        params: &[Parameter],
        side: ParameterSide,
        violations: &mut Vec<Violation>,
    ) {
        let Some(structure) = self.wire.find_struct(struct_name) else {
            violations.push(Violation::MissingWireStruct { name: struct_name.to_string() });
            return;
        };
        for param in params {
            check_field(method, structure, param, side, violations);
        }
    }
}

fn check_field(
    method: &MethodDecl,
    structure: &StructDecl,
    param: &Parameter,
    side: ParameterSide,
    violations: &mut Vec<Violation>,
) {
    let field_name = exported_name(&param.name);
    let Some(field) = structure.field(&field_name) else {
        violations.push(Violation::MissingWireField {
            field: field_name,
            structure: structure.name.clone(),
        });
        return;
    };
    let expected = param.ty.canonical();
    let found = field.ty.canonical();
    if expected != found {
        violations.push(Violation::WireTypeMismatch {
            side,
            parameter: param.name.clone(),
            method: method.name.clone(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
}

/// Name of the wire request struct of a method
pub fn request_struct_name(method: &str) -> String { format!("{}Request", method) }

/// Name of the wire response struct of a method
pub fn response_struct_name(method: &str) -> String { format!("{}Response", method) }

fn exported_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use ir::{FieldDecl, TypeRef};

    use super::*;

    fn count_method() -> MethodDecl {
        MethodDecl {
            name: "Count".into(),
            args: vec![
                Parameter::new("ctx", TypeRef::context()),
                Parameter::new("text", TypeRef::named("string")),
            ],
            results: vec![
                Parameter::new("count", TypeRef::named("int")),
                Parameter::new("err", TypeRef::error()),
            ],
            docs: vec![],
        }
    }

    #[test]
    fn both_structs_are_reported_when_missing() {
        let wire = WireStructFile::default();
        let violations = WireChecker::new(&wire).check_method(&count_method());
        assert_eq!(
            violations,
            vec![
                Violation::MissingWireStruct { name: "CountRequest".into() },
                Violation::MissingWireStruct { name: "CountResponse".into() },
            ]
        );
    }

    #[test]
    fn type_mismatch_names_both_sides() {
        let wire = WireStructFile::from_structs(vec![
            StructDecl {
                name: "CountRequest".into(),
                fields: vec![FieldDecl::new("Text", TypeRef::named("string"))],
            },
            StructDecl {
                name: "CountResponse".into(),
                fields: vec![FieldDecl::new("Count", TypeRef::named("int64"))],
            },
        ]);
        let violations = WireChecker::new(&wire).check_method(&count_method());
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "result count in method Count has different type in wire file: expected int, got int64"
        );
    }

    #[test]
    fn exported_name_upper_cases_first_letter() {
        assert_eq!(exported_name("symbol"), "Symbol");
        assert_eq!(exported_name("ID"), "ID");
        assert_eq!(exported_name(""), "");
    }
}
