use std::collections::BTreeMap;

use ir::{
    ArrayLen, FieldDecl, InterfaceDecl, MethodDecl, Parameter, SourceFile, StructDecl, TypeRef,
    WireStructFile,
};
use microgen_analysis::{validate_interface, InterfaceValidator, ParameterSide, Violation};
use semantics::DirectiveSet;

const SVC: &str = "github.com/acme/svc";

fn param(name: &str, ty: TypeRef) -> Parameter { Parameter::new(name, ty) }

fn method(name: &str, docs: &[&str], args: Vec<Parameter>, results: Vec<Parameter>) -> MethodDecl {
    MethodDecl {
        name: name.into(),
        args,
        results,
        docs: docs.iter().map(|d| d.to_string()).collect(),
    }
}

fn service(methods: Vec<MethodDecl>) -> InterfaceDecl {
    InterfaceDecl {
        name: "StringService".into(),
        methods,
        docs: vec!["// @microgen middleware".into()],
    }
}

fn count() -> MethodDecl {
    method(
        "Count",
        &[],
        vec![
            param("ctx", TypeRef::context()),
            param("text", TypeRef::named("string")),
            param("symbol", TypeRef::named("string")),
        ],
        vec![param("count", TypeRef::named("int")), param("err", TypeRef::error())],
    )
}

fn count_wire(symbol_field: &str) -> WireStructFile {
    WireStructFile::from_structs(vec![
        StructDecl {
            name: "CountRequest".into(),
            fields: vec![
                FieldDecl::new("Text", TypeRef::named("string")),
                FieldDecl::new(symbol_field, TypeRef::named("string")),
            ],
        },
        StructDecl {
            name: "CountResponse".into(),
            fields: vec![FieldDecl::new("Count", TypeRef::named("int"))],
        },
    ])
}

#[test]
fn test_well_formed_interface_passes() {
    assert!(validate_interface(&service(vec![count()]), None).is_ok());
}

#[test]
fn test_interface_without_methods() {
    let err = validate_interface(&service(vec![]), None).expect_err("no methods must fail");
    assert_eq!(err.violations(), &[Violation::NoMethods { interface: "StringService".into() }]);
    assert!(err.to_string().contains("no methods"));
}

#[test]
fn test_violations_accumulate_across_methods() {
    let bad_context = method(
        "Upper",
        &[],
        vec![param("s", TypeRef::named("string"))],
        vec![param("err", TypeRef::error())],
    );
    let bad_everything = method(
        "Lower",
        &[],
        vec![param("s", TypeRef::named("string"))],
        vec![param("", TypeRef::named("string"))],
    );
    let err = validate_interface(&service(vec![bad_context, count(), bad_everything]), None)
        .expect_err("broken methods must fail");
    assert_eq!(
        err.violations(),
        &[
            Violation::ContextFirst { method: "Upper".into() },
            Violation::UnnamedParameter { method: "Lower".into(), ty: "string".into() },
            Violation::ContextFirst { method: "Lower".into() },
            Violation::ErrorLast { method: "Lower".into() },
        ]
    );
    assert!(err.to_string().starts_with("many errors:\n1. Upper: first argument"));
}

#[test]
fn test_excluded_method_only_checks_names() {
    let excluded = method(
        "Internal",
        &["// @microgen -"],
        vec![param("", TypeRef::Struct { fields: vec![] })],
        vec![],
    );
    let err = validate_interface(&service(vec![excluded]), None).expect_err("unnamed param");
    assert_eq!(
        err.violations(),
        &[Violation::UnnamedParameter { method: "Internal".into(), ty: "struct{}".into() }]
    );
}

#[test]
fn test_streaming_methods_skip_shape_rules() {
    let stream = method(
        "Watch",
        &["// @microgen one-to-many, many-to-one"],
        vec![param("filter", TypeRef::named("string"))],
        vec![param("events", TypeRef::named("Event"))],
    );
    assert!(validate_interface(&service(vec![stream]), Some(&WireStructFile::default())).is_ok());
}

#[test]
fn test_inline_types_are_rejected() {
    let doer = TypeRef::Interface { methods: vec![method("Do", &[], vec![], vec![])] };
    let inline = method(
        "Configure",
        &[],
        vec![
            param("ctx", TypeRef::context()),
            param("hook", TypeRef::Func { args: vec![], results: vec![] }),
            param("opts", TypeRef::imported(SVC, TypeRef::Struct { fields: vec![] })),
            param("any", TypeRef::Interface { methods: vec![] }),
            param("doer", doer),
        ],
        vec![param("err", TypeRef::error())],
    );
    let err = validate_interface(&service(vec![inline]), None).expect_err("inline types");
    assert_eq!(
        err.violations(),
        &[
            Violation::RawFunction { method: "Configure".into(), parameter: "hook".into() },
            Violation::RawStruct { method: "Configure".into(), parameter: "opts".into() },
            Violation::NonEmptyInterface {
                method: "Configure".into(),
                parameter: "doer interface{ Do() }".into(),
            },
        ]
    );
}

#[test]
fn test_inline_types_behind_pointers_and_slices_are_rejected() {
    let doer = TypeRef::Interface { methods: vec![method("Do", &[], vec![], vec![])] };
    let wrapped = method(
        "Configure",
        &[],
        vec![
            param("ctx", TypeRef::context()),
            param("opts", TypeRef::pointer(TypeRef::Struct { fields: vec![] })),
            param("hooks", TypeRef::slice(TypeRef::Func { args: vec![], results: vec![] })),
        ],
        vec![param("err", TypeRef::error())],
    );
    let variadic = method(
        "Run",
        &[],
        vec![
            param("ctx", TypeRef::context()),
            param(
                "doers",
                TypeRef::Array { len: ArrayLen::Ellipsis, next: Box::new(TypeRef::pointer(doer)) },
            ),
        ],
        vec![param("err", TypeRef::error())],
    );
    let named = method(
        "Apply",
        &[],
        vec![
            param("ctx", TypeRef::context()),
            param("opts", TypeRef::pointer(TypeRef::named("Options"))),
        ],
        vec![
            param("hooks", TypeRef::slice(TypeRef::named("Hook"))),
            param("err", TypeRef::error()),
        ],
    );

    let err = validate_interface(&service(vec![wrapped, variadic, named]), None)
        .expect_err("wrapped inline types");
    assert_eq!(
        &err.violations()[..2],
        &[
            Violation::RawStruct { method: "Configure".into(), parameter: "opts".into() },
            Violation::RawFunction { method: "Configure".into(), parameter: "hooks".into() },
        ]
    );
    assert!(matches!(err.violations()[2], Violation::NonEmptyInterface { .. }));

    let mut per_method = BTreeMap::new();
    for violation in err.violations() {
        *per_method.entry(violation.method().expect("method violation")).or_insert(0) += 1;
    }
    assert_eq!(per_method, BTreeMap::from([("Configure", 2), ("Run", 1)]));
}

#[test]
fn test_interface_level_violations_name_no_method() {
    let err = validate_interface(&service(vec![]), None).expect_err("no methods must fail");
    assert_eq!(err.violations()[0].method(), None);

    let err = validate_interface(&service(vec![count()]), Some(&count_wire("Sym")))
        .expect_err("drift");
    assert_eq!(err.violations()[0].method(), None);
}

#[test]
fn test_get_requires_path_insertable_arguments() {
    let args = |ty: TypeRef| {
        vec![
            param("ctx", TypeRef::context()),
            param("id", TypeRef::named("uint64")),
            param("q", ty),
        ]
    };
    let results = || vec![param("err", TypeRef::error())];
    let get = &["// @http-method GET"];

    let with_struct = method("Find", get, args(TypeRef::named("Query")), results());
    let err = validate_interface(&service(vec![with_struct]), None).expect_err("GET with struct");
    assert_eq!(err.violations(), &[Violation::GetArguments { method: "Find".into() }]);
    assert_eq!(err.to_string(), "Find: can't use GET method with provided arguments");

    let with_scalars = method("Find", get, args(TypeRef::named("string")), results());
    assert!(validate_interface(&service(vec![with_scalars]), None).is_ok());

    let post = method("Find", &[], args(TypeRef::named("Query")), results());
    assert!(validate_interface(&service(vec![post]), None).is_ok());
}

#[test]
fn test_wire_file_matches() {
    let wire = count_wire("Symbol");
    assert!(validate_interface(&service(vec![count()]), Some(&wire)).is_ok());
}

#[test]
fn test_wire_field_drift_names_expected_field() {
    let wire = count_wire("Sym");
    let err = validate_interface(&service(vec![count()]), Some(&wire)).expect_err("drift");
    assert_eq!(
        err.violations(),
        &[Violation::MissingWireField {
            field: "Symbol".into(),
            structure: "CountRequest".into(),
        }]
    );
    assert_eq!(err.to_string(), "did not find field Symbol in struct CountRequest in wire file");
}

#[test]
fn test_wire_comparison_ignores_imports_but_not_pointers() {
    let lookup = method(
        "Lookup",
        &[],
        vec![
            param("ctx", TypeRef::context()),
            param("ids", TypeRef::slice(TypeRef::imported(SVC, TypeRef::named("ID")))),
        ],
        vec![
            param("item", TypeRef::pointer(TypeRef::named("Item"))),
            param("err", TypeRef::error()),
        ],
    );
    let wire = WireStructFile::from_structs(vec![
        StructDecl {
            name: "LookupRequest".into(),
            fields: vec![FieldDecl::new("Ids", TypeRef::slice(TypeRef::named("ID")))],
        },
        StructDecl {
            name: "LookupResponse".into(),
            fields: vec![FieldDecl::new("Item", TypeRef::named("Item"))],
        },
    ]);
    let err = validate_interface(&service(vec![lookup]), Some(&wire)).expect_err("pointer drift");
    assert_eq!(
        err.violations(),
        &[Violation::WireTypeMismatch {
            side: ParameterSide::Result,
            parameter: "item".into(),
            method: "Lookup".into(),
            expected: "*Item".into(),
            found: "Item".into(),
        }]
    );
}

#[test]
fn test_validator_reuses_interpreted_directives() {
    let iface = service(vec![count()]);
    let directives = DirectiveSet::interpret(&iface);
    let validator = InterfaceValidator::new(&directives);
    assert!(validator.violations(&iface).is_empty());
    assert_eq!(validator.violations(&iface), validator.violations(&iface));
}

#[test]
fn test_validates_json_model() {
    let source = SourceFile::from_json(
        r#"{
            "package": "stringsvc",
            "interfaces": [{
                "name": "StringService",
                "docs": ["// @microgen middleware"],
                "methods": [{
                    "name": "Uppercase",
                    "args": [
                        {"name": "ctx", "type": {
                            "kind": "import",
                            "package": "context",
                            "next": {"kind": "name", "name": "Context"}
                        }},
                        {"name": "s", "type": {"kind": "name", "name": "string"}}
                    ],
                    "results": [
                        {"name": "ans", "type": {"kind": "name", "name": "string"}},
                        {"name": "err", "type": {"kind": "name", "name": "error"}}
                    ]
                }]
            }]
        }"#,
    )
    .expect("valid model");
    let iface = source.interface("StringService").expect("interface present");
    assert!(validate_interface(iface, None).is_ok());
}
