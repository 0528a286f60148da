#![allow(dead_code)]

use config::GenerationFlags;
use ir::{InterfaceDecl, MethodDecl, Parameter, SourceFile, TypeRef};
use pipeline::GenerationContext;

pub const IMPORT: &str = "github.com/acme/stringsvc";
pub const PROTOBUF: &str = "github.com/acme/stringsvc/pb";

pub fn docs(lines: &[&str]) -> Vec<String> { lines.iter().map(|l| l.to_string()).collect() }

/// `Count(ctx context.Context, text string, symbol string) (count int, err error)`
pub fn count_method(doc_lines: &[&str]) -> MethodDecl {
    MethodDecl {
        name: "Count".to_string(),
        args: vec![
            Parameter::new("ctx", TypeRef::context()),
            Parameter::new("text", TypeRef::named("string")),
            Parameter::new("symbol", TypeRef::named("string")),
        ],
        results: vec![
            Parameter::new("count", TypeRef::named("int")),
            Parameter::new("err", TypeRef::error()),
        ],
        docs: docs(doc_lines),
    }
}

/// `TestCase(ctx context.Context, comments []*Comment) (tree map[string]int, err error)`
pub fn test_case_method() -> MethodDecl {
    MethodDecl {
        name: "TestCase".to_string(),
        args: vec![
            Parameter::new("ctx", TypeRef::context()),
            Parameter::new("comments", TypeRef::slice(TypeRef::pointer(TypeRef::named("Comment")))),
        ],
        results: vec![
            Parameter::new("tree", TypeRef::map(TypeRef::named("string"), TypeRef::named("int"))),
            Parameter::new("err", TypeRef::error()),
        ],
        docs: vec![],
    }
}

/// `Watch(ctx context.Context, topic string) (err error)` streamed to the client
pub fn watch_method() -> MethodDecl {
    MethodDecl {
        name: "Watch".to_string(),
        args: vec![
            Parameter::new("ctx", TypeRef::context()),
            Parameter::new("topic", TypeRef::named("string")),
        ],
        results: vec![Parameter::new("err", TypeRef::error())],
        docs: docs(&["// @microgen one-to-many"]),
    }
}

/// `Ignored()` left out of generation
pub fn ignored_method() -> MethodDecl {
    MethodDecl {
        name: "Ignored".to_string(),
        args: vec![],
        results: vec![],
        docs: docs(&["// @microgen -"]),
    }
}

pub fn service(interface_docs: &[&str], methods: Vec<MethodDecl>) -> InterfaceDecl {
    InterfaceDecl { name: "StringService".to_string(), methods, docs: docs(interface_docs) }
}

pub fn source(interface: InterfaceDecl) -> SourceFile {
    SourceFile { package: "stringsvc".to_string(), interfaces: vec![interface], structs: vec![] }
}

pub fn flags() -> GenerationFlags {
    GenerationFlags { import_package: IMPORT.to_string(), ..Default::default() }
}

pub fn context(interface: InterfaceDecl, flags: GenerationFlags) -> GenerationContext {
    GenerationContext::builder()
        .interface(interface)
        .source_package("stringsvc")
        .flags(flags)
        .build()
        .expect("context builds")
}
