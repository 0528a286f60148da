use ir::{InterfaceDecl, MethodDecl, Parameter, SourceFile, TypeRef};
use logging::MemorySink;
use microgen_semantics::{
    find_service_interface, interpret_directives, DirectiveSet, DirectiveWarning,
    GenerationMode, HttpMethod, InterfaceTag, MethodDirectives,
};

fn method(name: &str, docs: &[&str]) -> MethodDecl {
    MethodDecl {
        name: name.into(),
        args: vec![
            Parameter::new("ctx", TypeRef::context()),
            Parameter::new("s", TypeRef::named("string")),
        ],
        results: vec![Parameter::new("err", TypeRef::error())],
        docs: docs.iter().map(|d| d.to_string()).collect(),
    }
}

fn interface(docs: &[&str], methods: Vec<MethodDecl>) -> InterfaceDecl {
    InterfaceDecl {
        name: "StringService".into(),
        methods,
        docs: docs.iter().map(|d| d.to_string()).collect(),
    }
}

fn tokens(list: &[&str]) -> Vec<String> { list.iter().map(|t| t.to_string()).collect() }

#[test]
fn test_mode_defaults_without_directives() {
    assert_eq!(GenerationMode::from_tags(&[]), GenerationMode::Default);
    assert_eq!(GenerationMode::from_tags(&tokens(&["get"])), GenerationMode::Default);
}

#[test]
fn test_mode_single_directive() {
    assert_eq!(GenerationMode::from_tags(&tokens(&["-"])), GenerationMode::Excluded);
    assert_eq!(GenerationMode::from_tags(&tokens(&["many-to-one"])), GenerationMode::ManyToOne);
    assert!(GenerationMode::ManyToMany.is_streaming());
    assert!(!GenerationMode::Excluded.is_streaming());
}

#[test]
fn test_mode_priority_is_fixed_not_positional() {
    let mode = GenerationMode::from_tags(&tokens(&["many-to-one", "one-to-many"]));
    assert_eq!(mode, GenerationMode::OneToMany);
    let mode = GenerationMode::from_tags(&tokens(&["many-to-one", "many-to-many"]));
    assert_eq!(mode, GenerationMode::ManyToMany);
    let mode = GenerationMode::from_tags(&tokens(&["one-to-many", "-"]));
    assert_eq!(mode, GenerationMode::Excluded);
}

#[test]
fn test_conflicting_modes_warn() {
    let m = method("Upper", &["// @microgen one-to-many, many-to-one"]);
    let directives = MethodDirectives::from_method(&m);
    assert_eq!(directives.mode, GenerationMode::OneToMany);
    assert_eq!(
        directives.warnings(),
        &[DirectiveWarning::ConflictingModes {
            method: "Upper".into(),
            chosen: GenerationMode::OneToMany,
            ignored: vec![GenerationMode::ManyToOne],
        }]
    );
}

#[test]
fn test_http_method_resolution() {
    let explicit = MethodDirectives::from_method(&method("A", &["// @http-method get"]));
    assert_eq!(explicit.http_method, HttpMethod::Get);

    let inline = MethodDirectives::from_method(&method("B", &["// @microgen PUT"]));
    assert_eq!(inline.http_method, HttpMethod::Put);
    assert!(inline.warnings().is_empty());

    let none = MethodDirectives::from_method(&method("C", &[]));
    assert_eq!(none.http_method, HttpMethod::Post);

    let ambiguous = MethodDirectives::from_method(&method("D", &["// @http-method get put"]));
    assert_eq!(ambiguous.http_method, HttpMethod::Post);
    assert!(matches!(
        ambiguous.warnings(),
        [DirectiveWarning::AmbiguousHttpMethod { .. }]
    ));

    let unknown = MethodDirectives::from_method(&method("E", &["// @http-method fetch"]));
    assert_eq!(unknown.http_method, HttpMethod::Post);
    assert!(matches!(unknown.warnings(), [DirectiveWarning::UnknownHttpMethod { .. }]));
}

#[test]
fn test_auxiliary_method_tags() {
    let m = method(
        "Login",
        &["// @http-path /login/{name}", "// @logs-ignore password", "// @logs-len tokens"],
    );
    let directives = MethodDirectives::from_method(&m);
    assert_eq!(directives.http_path.as_deref(), Some("/login/{name}"));
    assert_eq!(directives.logs_ignore, vec!["password"]);
    assert_eq!(directives.logs_len, vec!["tokens"]);
}

#[test]
fn test_interface_tags_deduplicated_and_unknown_reported() {
    let iface = interface(
        &[
            "// @microgen middleware, logging, logging",
            "// @microgen grpc, bogus",
            "// @protobuf github.com/acme/protobuf",
            "// @grpc-addr acme.StringService",
        ],
        vec![],
    );
    let set = DirectiveSet::interpret(&iface);
    assert_eq!(
        set.interface.tags,
        vec![InterfaceTag::Middleware, InterfaceTag::Logging, InterfaceTag::Grpc]
    );
    assert!(set.interface.has(InterfaceTag::Grpc));
    assert!(!set.interface.has_any(&[InterfaceTag::Http, InterfaceTag::Transport]));
    assert_eq!(set.interface.protobuf_import.as_deref(), Some("github.com/acme/protobuf"));
    assert_eq!(set.interface.grpc_address.as_deref(), Some("acme.StringService"));
    assert_eq!(
        set.warnings().cloned().collect::<Vec<_>>(),
        vec![DirectiveWarning::UnknownInterfaceTag {
            interface: "StringService".into(),
            tag: "bogus".into(),
        }]
    );
}

#[test]
fn test_interpretation_is_idempotent() {
    let iface = interface(
        &["// @microgen logging"],
        vec![method("Count", &["// @microgen -"]), method("Upper", &[])],
    );
    assert_eq!(DirectiveSet::interpret(&iface), DirectiveSet::interpret(&iface));
    let set = DirectiveSet::interpret(&iface);
    assert_eq!(set.mode_of("Count"), GenerationMode::Excluded);
    assert_eq!(set.mode_of("Upper"), GenerationMode::Default);
    assert_eq!(set.mode_of("Missing"), GenerationMode::Default);
    assert!(set.method("Count").is_some_and(|m| m.is_excluded()));
}

#[test]
fn test_warnings_reach_the_sink() {
    let iface = interface(&["// @microgen grpc"], vec![method("Count", &["// @microgen shiny"])]);
    let sink = MemorySink::new();
    let set = interpret_directives(&iface, &sink);
    assert_eq!(set.warnings().count(), 1);
    let warnings = sink.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Count: unexpected directive `shiny`"));
}

#[test]
fn test_find_service_interface() {
    let source = SourceFile {
        package: "stringsvc".into(),
        interfaces: vec![
            interface(&["// Helper has no directives."], vec![]),
            InterfaceDecl {
                name: "Tagged".into(),
                docs: vec!["// @microgen".into()],
                ..Default::default()
            },
        ],
        structs: vec![],
    };
    assert_eq!(find_service_interface(&source).map(|i| i.name.as_str()), Some("Tagged"));
    assert!(find_service_interface(&SourceFile::default()).is_none());
}
