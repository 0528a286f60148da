#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Directive extraction and interpretation for microgen.
//!
//! Doc comments are the configuration channel of the generator: a line such as
//! `// @microgen middleware, logging` above the service interface selects the
//! artifacts to generate, and the same marker above a method selects how that
//! method is generated. This crate turns those lines into typed directives and
//! reports anything it could not make sense of as a warning.

use ir::{InterfaceDecl, SourceFile};

pub mod directives;
pub mod tags;

pub use directives::{
    interpret_directives, DirectiveSet, DirectiveWarning, GenerationMode, HttpMethod,
    InterfaceDirectives, InterfaceTag, MethodDirectives,
};
pub use tags::{
    contains_tag, fetch_tags, has_tag_line, GRPC_ADDR_TAG, HTTP_METHOD_TAG, HTTP_PATH_TAG,
    LOGS_IGNORE_TAG, LOGS_LEN_TAG, MICROGEN_TAG, PROTOBUF_TAG, TAG_MARK,
};

/// Errors that can occur while reading directives.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    /// A token that should name an HTTP method does not.
    #[error("unknown HTTP method `{0}`")]
    UnknownHttpMethod(String),
}

/// Result type for directive operations.
pub type Result<T> = std::result::Result<T, SemanticError>;

/// The first interface of `source` carrying a `@microgen` line
pub fn find_service_interface(source: &SourceFile) -> Option<&InterfaceDecl> {
    source.interfaces.iter().find(|i| has_tag_line(&i.docs, MICROGEN_TAG))
}
