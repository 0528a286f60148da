//! Directive interpretation
//!
//! Turns extracted tag tokens into a per-method [`GenerationMode`] plus the
//! auxiliary hints renderers need, and the interface-level token list into
//! typed [`InterfaceTag`]s. Problems are collected as [`DirectiveWarning`]s and
//! never fail interpretation.

use std::fmt;
use std::str::FromStr;

use ir::{InterfaceDecl, MethodDecl};
use logging::LogSink;

use crate::tags::{
    fetch_tags, GRPC_ADDR_TAG, HTTP_METHOD_TAG, HTTP_PATH_TAG, LOGS_IGNORE_TAG, LOGS_LEN_TAG,
    MICROGEN_TAG, PROTOBUF_TAG,
};
use crate::SemanticError;

const LOG_MODULE: &str = "directives";

/// How a method is generated, derived from its directives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    /// Unary request/response method
    #[default]
    Default,
    /// `-`: left out of generation
    Excluded,
    /// `one-to-many`: server streaming
    OneToMany,
    /// `many-to-one`: client streaming
    ManyToOne,
    /// `many-to-many`: bidirectional streaming
    ManyToMany,
}

impl GenerationMode {
    /// Exclusive directives in the order they are looked up
    const PRIORITY: [GenerationMode; 4] = [
        GenerationMode::Excluded,
        GenerationMode::OneToMany,
        GenerationMode::ManyToMany,
        GenerationMode::ManyToOne,
    ];

    /// Directive token selecting this mode; `None` for the default mode
    pub fn directive(&self) -> Option<&'static str> {
        match self {
            GenerationMode::Default => None,
            GenerationMode::Excluded => Some("-"),
            GenerationMode::OneToMany => Some("one-to-many"),
            GenerationMode::ManyToOne => Some("many-to-one"),
            GenerationMode::ManyToMany => Some("many-to-many"),
        }
    }

    /// Mode of a method carrying `tags`; the first match in priority order wins
    pub fn from_tags(tags: &[String]) -> Self { Self::resolve(tags).0 }

    /// Whether the method is a streaming one
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            GenerationMode::OneToMany | GenerationMode::ManyToOne | GenerationMode::ManyToMany
        )
    }

    /// Chosen mode plus every other exclusive directive that was present
    fn resolve(tags: &[String]) -> (Self, Vec<Self>) {
        let mut present = Self::PRIORITY
            .into_iter()
            .filter(|mode| mode.directive().is_some_and(|d| tags.iter().any(|t| t == d)));
        match present.next() {
            Some(chosen) => (chosen, present.collect()),
            None => (GenerationMode::Default, Vec::new()),
        }
    }

    fn is_directive(token: &str) -> bool {
        Self::PRIORITY.iter().any(|mode| mode.directive() == Some(token))
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive().unwrap_or("one-to-one"))
    }
}

/// HTTP verb a method is mapped onto
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET; every argument must fit into the URL path
    Get,
    /// POST, the default
    #[default]
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case verb
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = SemanticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(SemanticError::UnknownHttpMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Recognized interface-level tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InterfaceTag {
    /// `middleware`: the Middleware type
    Middleware,
    /// `logging`: logging middleware
    Logging,
    /// `error-logging`: error-logging middleware
    ErrorLogging,
    /// `recovering`: panic-recovering middleware
    Recovering,
    /// `grpc`: gRPC server and client
    Grpc,
    /// `grpc-server`
    GrpcServer,
    /// `grpc-client`
    GrpcClient,
    /// `http`: HTTP server and client
    Http,
    /// `http-server`
    HttpServer,
    /// `http-client`
    HttpClient,
    /// `transport`: every gRPC and HTTP artifact
    Transport,
    /// `main`: entry-point scaffold
    Main,
}

impl InterfaceTag {
    /// Every recognized tag
    pub const ALL: [InterfaceTag; 12] = [
        InterfaceTag::Middleware,
        InterfaceTag::Logging,
        InterfaceTag::ErrorLogging,
        InterfaceTag::Recovering,
        InterfaceTag::Grpc,
        InterfaceTag::GrpcServer,
        InterfaceTag::GrpcClient,
        InterfaceTag::Http,
        InterfaceTag::HttpServer,
        InterfaceTag::HttpClient,
        InterfaceTag::Transport,
        InterfaceTag::Main,
    ];

    /// Token spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceTag::Middleware => "middleware",
            InterfaceTag::Logging => "logging",
            InterfaceTag::ErrorLogging => "error-logging",
            InterfaceTag::Recovering => "recovering",
            InterfaceTag::Grpc => "grpc",
            InterfaceTag::GrpcServer => "grpc-server",
            InterfaceTag::GrpcClient => "grpc-client",
            InterfaceTag::Http => "http",
            InterfaceTag::HttpServer => "http-server",
            InterfaceTag::HttpClient => "http-client",
            InterfaceTag::Transport => "transport",
            InterfaceTag::Main => "main",
        }
    }

    /// Parse a token; `None` for unrecognized ones
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == token)
    }
}

impl fmt::Display for InterfaceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Something in the directives that was resolved or ignored rather than rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveWarning {
    /// More than one exclusive directive on one method
    #[error(
        "{method}: conflicting directives, using `{chosen}` and ignoring {}",
        mode_list(.ignored)
    )]
    ConflictingModes {
        /// Method name
        method: String,
        /// Mode that won the priority order
        chosen: GenerationMode,
        /// Modes that were also present
        ignored: Vec<GenerationMode>,
    },
    /// A method token that is neither a mode directive nor an HTTP verb
    #[error("{method}: unexpected directive `{token}`")]
    UnknownMethodToken {
        /// Method name
        method: String,
        /// The token
        token: String,
    },
    /// An interface token that names no artifact
    #[error("{interface}: unexpected tag `{tag}`")]
    UnknownInterfaceTag {
        /// Interface name
        interface: String,
        /// The token
        tag: String,
    },
    /// `@http-method` with a verb that is not supported
    #[error("{method}: unknown HTTP method `{verb}`, using POST")]
    UnknownHttpMethod {
        /// Method name
        method: String,
        /// The verb as written
        verb: String,
    },
    /// `@http-method` with more than one token
    #[error("{method}: several HTTP methods {verbs:?}, using POST")]
    AmbiguousHttpMethod {
        /// Method name
        method: String,
        /// All verbs given
        verbs: Vec<String>,
    },
}

fn mode_list(modes: &[GenerationMode]) -> String {
    modes.iter().map(|m| format!("`{}`", m)).collect::<Vec<_>>().join(", ")
}

/// Interpreted directives of one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDirectives {
    /// Method name
    pub method: String,
    /// Raw `@microgen` tokens
    pub tokens: Vec<String>,
    /// Generation mode
    pub mode: GenerationMode,
    /// HTTP verb hint
    pub http_method: HttpMethod,
    /// Explicit HTTP path template
    pub http_path: Option<String>,
    /// Parameters the logging middleware leaves out
    pub logs_ignore: Vec<String>,
    /// Parameters the logging middleware prints by length
    pub logs_len: Vec<String>,
    warnings: Vec<DirectiveWarning>,
}

impl MethodDirectives {
    /// Interpret the doc comments of `method`
    pub fn from_method(method: &MethodDecl) -> Self {
        let tokens = fetch_tags(&method.docs, MICROGEN_TAG);
        let mut warnings = Vec::new();

        let (mode, ignored) = GenerationMode::resolve(&tokens);
        if !ignored.is_empty() {
            warnings.push(DirectiveWarning::ConflictingModes {
                method: method.name.clone(),
                chosen: mode,
                ignored,
            });
        }
        for token in &tokens {
            if !GenerationMode::is_directive(token) && token.parse::<HttpMethod>().is_err() {
                warnings.push(DirectiveWarning::UnknownMethodToken {
                    method: method.name.clone(),
                    token: token.clone(),
                });
            }
        }

        let http_method = resolve_http_method(method, &tokens, &mut warnings);

        Self {
            method: method.name.clone(),
            http_path: fetch_tags(&method.docs, HTTP_PATH_TAG).into_iter().next(),
            logs_ignore: fetch_tags(&method.docs, LOGS_IGNORE_TAG),
            logs_len: fetch_tags(&method.docs, LOGS_LEN_TAG),
            tokens,
            mode,
            http_method,
            warnings,
        }
    }

    /// Whether the method is left out of generation
    pub fn is_excluded(&self) -> bool { self.mode == GenerationMode::Excluded }

    /// Warnings produced while interpreting this method
    pub fn warnings(&self) -> &[DirectiveWarning] { &self.warnings }
}

/// `@http-method` wins; otherwise a verb among the `@microgen` tokens; otherwise POST
fn resolve_http_method(
    method: &MethodDecl,
    tokens: &[String],
    warnings: &mut Vec<DirectiveWarning>,
) -> HttpMethod {
    let explicit = fetch_tags(&method.docs, HTTP_METHOD_TAG);
    match explicit.as_slice() {
        [] => tokens.iter().find_map(|t| t.parse().ok()).unwrap_or_default(),
        [verb] => verb.parse().unwrap_or_else(|_| {
            warnings.push(DirectiveWarning::UnknownHttpMethod {
                method: method.name.clone(),
                verb: verb.clone(),
            });
            HttpMethod::default()
        }),
        _ => {
            warnings.push(DirectiveWarning::AmbiguousHttpMethod {
                method: method.name.clone(),
                verbs: explicit.clone(),
            });
            HttpMethod::default()
        }
    }
}

/// Interpreted directives of the service interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDirectives {
    /// Interface name
    pub interface: String,
    /// Raw `@microgen` tokens
    pub tokens: Vec<String>,
    /// Recognized tags, first occurrence order, without duplicates
    pub tags: Vec<InterfaceTag>,
    /// Import path of the protobuf stubs (`@protobuf`)
    pub protobuf_import: Option<String>,
    /// Fully qualified gRPC service name (`@grpc-addr`)
    pub grpc_address: Option<String>,
    warnings: Vec<DirectiveWarning>,
}

impl InterfaceDirectives {
    /// Interpret the doc comments of `iface`
    pub fn from_interface(iface: &InterfaceDecl) -> Self {
        let tokens = fetch_tags(&iface.docs, MICROGEN_TAG);
        let mut tags = Vec::new();
        let mut warnings = Vec::new();
        for token in &tokens {
            match InterfaceTag::parse(token) {
                Some(tag) if !tags.contains(&tag) => tags.push(tag),
                Some(_) => {}
                None => warnings.push(DirectiveWarning::UnknownInterfaceTag {
                    interface: iface.name.clone(),
                    tag: token.clone(),
                }),
            }
        }

        Self {
            interface: iface.name.clone(),
            protobuf_import: fetch_tags(&iface.docs, PROTOBUF_TAG).into_iter().next(),
            grpc_address: fetch_tags(&iface.docs, GRPC_ADDR_TAG).into_iter().next(),
            tokens,
            tags,
            warnings,
        }
    }

    /// Whether `tag` was given
    pub fn has(&self, tag: InterfaceTag) -> bool { self.tags.contains(&tag) }

    /// Whether any of `tags` was given
    pub fn has_any(&self, tags: &[InterfaceTag]) -> bool { tags.iter().any(|t| self.has(*t)) }

    /// Warnings produced while interpreting the interface
    pub fn warnings(&self) -> &[DirectiveWarning] { &self.warnings }
}

/// Directives of an interface and all of its methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveSet {
    /// Interface-level directives
    pub interface: InterfaceDirectives,
    methods: Vec<MethodDirectives>,
}

impl DirectiveSet {
    /// Interpret every directive of `iface`
    pub fn interpret(iface: &InterfaceDecl) -> Self {
        Self {
            interface: InterfaceDirectives::from_interface(iface),
            methods: iface.methods.iter().map(MethodDirectives::from_method).collect(),
        }
    }

    /// Directives of one method
    pub fn method(&self, name: &str) -> Option<&MethodDirectives> {
        self.methods.iter().find(|m| m.method == name)
    }

    /// Mode of one method; unknown methods are `Default`
    pub fn mode_of(&self, name: &str) -> GenerationMode {
        self.method(name).map(|m| m.mode).unwrap_or_default()
    }

    /// Directives of every method, in declaration order
    pub fn methods(&self) -> &[MethodDirectives] { &self.methods }

    /// All warnings, interface first
    pub fn warnings(&self) -> impl Iterator<Item = &DirectiveWarning> {
        self.interface.warnings().iter().chain(self.methods.iter().flat_map(|m| m.warnings()))
    }

    /// Emit every warning through `sink`
    pub fn report(&self, sink: &dyn LogSink) {
        for warning in self.warnings() {
            sink.warn(LOG_MODULE, &warning.to_string());
        }
    }
}

/// Interpret the directives of `iface`, reporting warnings to `sink`
pub fn interpret_directives(iface: &InterfaceDecl, sink: &dyn LogSink) -> DirectiveSet {
    let set = DirectiveSet::interpret(iface);
    set.report(sink);
    set
}
