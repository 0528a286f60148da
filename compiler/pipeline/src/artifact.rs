//! Artifact catalog
//!
//! Every file microgen can produce is one [`ArtifactKind`]. The order of
//! [`ArtifactKind::CATALOG`] is the precedence order of a plan: artifacts
//! declaring names come before the artifacts that use them.

use std::fmt;
use std::path::PathBuf;

use codegen::WritePolicy;
use regex::Regex;
use semantics::InterfaceTag;

use crate::generation_context::GenerationContext;
use crate::module_generators::{self, ArtifactGenerator};

const GRPC_TAGS: [InterfaceTag; 4] = [
    InterfaceTag::Grpc,
    InterfaceTag::GrpcServer,
    InterfaceTag::GrpcClient,
    InterfaceTag::Transport,
];
const HTTP_TAGS: [InterfaceTag; 4] = [
    InterfaceTag::Http,
    InterfaceTag::HttpServer,
    InterfaceTag::HttpClient,
    InterfaceTag::Transport,
];
const MIDDLEWARE_TAGS: [InterfaceTag; 4] = [
    InterfaceTag::Middleware,
    InterfaceTag::Logging,
    InterfaceTag::ErrorLogging,
    InterfaceTag::Recovering,
];

/// One kind of generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// Request/response wrapper structs
    Exchanges,
    /// Endpoint set and server-side endpoint constructors
    Endpoints,
    /// The `Middleware` decorator type
    Middleware,
    /// Logging middleware
    LoggingMiddleware,
    /// Error-logging middleware
    ErrorLoggingMiddleware,
    /// Panic-recovering middleware
    RecoveringMiddleware,
    /// The `.proto` protocol definition
    ProtocolDefinition,
    /// Conversions between service types and protobuf types
    GrpcTypeConverters,
    /// Request/response encoders and decoders for gRPC
    GrpcEndpointConverters,
    /// gRPC server binding
    GrpcServer,
    /// Request/response encoders and decoders for HTTP
    HttpConverters,
    /// HTTP handler
    HttpServer,
    /// Endpoint set implementing the service interface
    EndpointsClient,
    /// gRPC client
    GrpcClient,
    /// HTTP client
    HttpClient,
    /// `cmd/<svc>/main.go` scaffold
    EntryPoint,
}

impl ArtifactKind {
    /// Every artifact in precedence order
    pub const CATALOG: [ArtifactKind; 16] = [
        ArtifactKind::Exchanges,
        ArtifactKind::Endpoints,
        ArtifactKind::Middleware,
        ArtifactKind::LoggingMiddleware,
        ArtifactKind::ErrorLoggingMiddleware,
        ArtifactKind::RecoveringMiddleware,
        ArtifactKind::ProtocolDefinition,
        ArtifactKind::GrpcTypeConverters,
        ArtifactKind::GrpcEndpointConverters,
        ArtifactKind::GrpcServer,
        ArtifactKind::HttpConverters,
        ArtifactKind::HttpServer,
        ArtifactKind::EndpointsClient,
        ArtifactKind::GrpcClient,
        ArtifactKind::HttpClient,
        ArtifactKind::EntryPoint,
    ];

    /// Short stable name
    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::Exchanges => "exchanges",
            ArtifactKind::Endpoints => "endpoints",
            ArtifactKind::Middleware => "middleware",
            ArtifactKind::LoggingMiddleware => "logging",
            ArtifactKind::ErrorLoggingMiddleware => "error-logging",
            ArtifactKind::RecoveringMiddleware => "recovering",
            ArtifactKind::ProtocolDefinition => "protobuf",
            ArtifactKind::GrpcTypeConverters => "grpc-type-converters",
            ArtifactKind::GrpcEndpointConverters => "grpc-endpoint-converters",
            ArtifactKind::GrpcServer => "grpc-server",
            ArtifactKind::HttpConverters => "http-converters",
            ArtifactKind::HttpServer => "http-server",
            ArtifactKind::EndpointsClient => "client",
            ArtifactKind::GrpcClient => "grpc-client",
            ArtifactKind::HttpClient => "http-client",
            ArtifactKind::EntryPoint => "main",
        }
    }

    /// How the file meets an existing one
    pub fn policy(&self) -> WritePolicy {
        match self {
            ArtifactKind::ProtocolDefinition | ArtifactKind::EntryPoint => {
                WritePolicy::CreateIfAbsent
            }
            ArtifactKind::GrpcTypeConverters => WritePolicy::MergePreserving,
            _ => WritePolicy::Overwrite,
        }
    }

    /// Output path relative to the output directory
    pub fn relative_path(&self, ctx: &GenerationContext) -> PathBuf {
        match self {
            ArtifactKind::Exchanges => PathBuf::from("transport/exchanges.microgen.go"),
            ArtifactKind::Endpoints => PathBuf::from("transport/endpoints.microgen.go"),
            ArtifactKind::Middleware => PathBuf::from("service/middleware.microgen.go"),
            ArtifactKind::LoggingMiddleware => PathBuf::from("service/logging.microgen.go"),
            ArtifactKind::ErrorLoggingMiddleware => {
                PathBuf::from("service/error_logging.microgen.go")
            }
            ArtifactKind::RecoveringMiddleware => PathBuf::from("service/recovering.microgen.go"),
            ArtifactKind::ProtocolDefinition => {
                PathBuf::from(format!("{}.proto", ctx.service_file_name()))
            }
            ArtifactKind::GrpcTypeConverters => {
                PathBuf::from("transport/grpc/protobuf_type_converters.microgen.go")
            }
            ArtifactKind::GrpcEndpointConverters => {
                PathBuf::from("transport/grpc/protobuf_endpoint_converters.microgen.go")
            }
            ArtifactKind::GrpcServer => PathBuf::from("transport/grpc/server.microgen.go"),
            ArtifactKind::HttpConverters => PathBuf::from("transport/http/converters.microgen.go"),
            ArtifactKind::HttpServer => PathBuf::from("transport/http/server.microgen.go"),
            ArtifactKind::EndpointsClient => PathBuf::from("transport/client.microgen.go"),
            ArtifactKind::GrpcClient => PathBuf::from("transport/grpc/client.microgen.go"),
            ArtifactKind::HttpClient => PathBuf::from("transport/http/client.microgen.go"),
            ArtifactKind::EntryPoint => {
                PathBuf::from("cmd").join(ctx.service_file_name()).join("main.go")
            }
        }
    }

    /// Whether the flags and interface tags request this artifact
    pub fn is_active(&self, ctx: &GenerationContext) -> bool {
        let tags = &ctx.directives.interface;
        let flags = &ctx.flags;
        match self {
            ArtifactKind::Exchanges | ArtifactKind::Endpoints | ArtifactKind::EndpointsClient => {
                flags.emit_core
            }
            ArtifactKind::Middleware => tags.has_any(&MIDDLEWARE_TAGS),
            ArtifactKind::LoggingMiddleware => tags.has(InterfaceTag::Logging),
            ArtifactKind::ErrorLoggingMiddleware => tags.has(InterfaceTag::ErrorLogging),
            ArtifactKind::RecoveringMiddleware => tags.has(InterfaceTag::Recovering),
            ArtifactKind::ProtocolDefinition => flags.wants_protocol_file(),
            ArtifactKind::GrpcTypeConverters | ArtifactKind::GrpcEndpointConverters => {
                tags.has_any(&GRPC_TAGS)
            }
            ArtifactKind::GrpcServer => tags.has_any(&[
                InterfaceTag::Grpc,
                InterfaceTag::GrpcServer,
                InterfaceTag::Transport,
            ]),
            ArtifactKind::GrpcClient => tags.has_any(&[
                InterfaceTag::Grpc,
                InterfaceTag::GrpcClient,
                InterfaceTag::Transport,
            ]),
            ArtifactKind::HttpConverters => tags.has_any(&HTTP_TAGS),
            ArtifactKind::HttpServer => tags.has_any(&[
                InterfaceTag::Http,
                InterfaceTag::HttpServer,
                InterfaceTag::Transport,
            ]),
            ArtifactKind::HttpClient => tags.has_any(&[
                InterfaceTag::Http,
                InterfaceTag::HttpClient,
                InterfaceTag::Transport,
            ]),
            ArtifactKind::EntryPoint => flags.emit_entry_point || tags.has(InterfaceTag::Main),
        }
    }

    /// Unmet prerequisites of this artifact; empty when it can be generated
    pub fn missing_prerequisites(&self, ctx: &GenerationContext) -> Vec<String> {
        let mut missing = Vec::new();
        if *self == ArtifactKind::ProtocolDefinition {
            if !is_dotted_identifier(ctx.protocol_package()) {
                missing.push(format!("invalid protocol package `{}`", ctx.protocol_package()));
            }
            return missing;
        }
        if ctx.service_import().trim().is_empty() {
            missing.push("import package is empty".to_string());
        }
        if self.is_grpc() && ctx.protobuf_import().is_none() {
            missing.push(
                "protobuf import path is empty, add a `// @protobuf <path>` line".to_string(),
            );
        }
        missing
    }

    /// Whether the artifact belongs to the gRPC transport
    pub fn is_grpc(&self) -> bool {
        matches!(
            self,
            ArtifactKind::GrpcTypeConverters
                | ArtifactKind::GrpcEndpointConverters
                | ArtifactKind::GrpcServer
                | ArtifactKind::GrpcClient
        )
    }

    /// Renderer producing this artifact
    pub fn generator(&self) -> &'static dyn ArtifactGenerator {
        module_generators::generator_for(*self)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

fn is_dotted_identifier(package: &str) -> bool {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .map(|re| re.is_match(package))
        .unwrap_or(false)
}
