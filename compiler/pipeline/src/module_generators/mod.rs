//! Artifact renderers for the code generation pipeline.
//!
//! Every [`ArtifactKind`] has one generator implementing [`ArtifactGenerator`];
//! the helpers here hold what several of them render the same way.

use std::fmt::Write as _;

use analysis::wire::{request_struct_name, response_struct_name};
use codegen::utils::{to_snake_case, to_upper_first};
use codegen::{GoFile, TypeRenderer};
use ir::{MethodDecl, Parameter};

use crate::artifact::ArtifactKind;
use crate::generation_context::GenerationContext;
use crate::PipelineError;

pub mod endpoints;
pub mod entry_point;
pub mod exchanges;
pub mod grpc;
pub mod http;
pub mod middleware;
pub mod protobuf;

/// Import paths of the go-kit stack the generated code builds on
pub mod go_imports {
    /// Standard context package
    pub const CONTEXT: &str = "context";
    /// go-kit endpoint abstraction
    pub const KIT_ENDPOINT: &str = "github.com/go-kit/kit/endpoint";
    /// go-kit structured logger
    pub const KIT_LOG: &str = "github.com/go-kit/log";
    /// go-kit gRPC transport
    pub const KIT_GRPC: &str = "github.com/go-kit/kit/transport/grpc";
    /// go-kit HTTP transport
    pub const KIT_HTTP: &str = "github.com/go-kit/kit/transport/http";
    /// gRPC runtime
    pub const GRPC: &str = "google.golang.org/grpc";
    /// HTTP router
    pub const MUX: &str = "github.com/gorilla/mux";
}

/// Renders the source text of one artifact
pub trait ArtifactGenerator {
    /// Render the artifact; an empty string means there is nothing to write
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError>;
}

/// Generator of `kind`
pub fn generator_for(kind: ArtifactKind) -> &'static dyn ArtifactGenerator {
    match kind {
        ArtifactKind::Exchanges => &exchanges::ExchangesGenerator,
        ArtifactKind::Endpoints => &endpoints::EndpointsGenerator,
        ArtifactKind::EndpointsClient => &endpoints::EndpointsClientGenerator,
        ArtifactKind::Middleware => &middleware::MiddlewareTypeGenerator,
        ArtifactKind::LoggingMiddleware => &middleware::LoggingGenerator,
        ArtifactKind::ErrorLoggingMiddleware => &middleware::ErrorLoggingGenerator,
        ArtifactKind::RecoveringMiddleware => &middleware::RecoveringGenerator,
        ArtifactKind::ProtocolDefinition => &protobuf::ProtocolGenerator,
        ArtifactKind::GrpcTypeConverters => &grpc::TypeConvertersGenerator,
        ArtifactKind::GrpcEndpointConverters => &grpc::EndpointConvertersGenerator,
        ArtifactKind::GrpcServer => &grpc::ServerGenerator,
        ArtifactKind::GrpcClient => &grpc::ClientGenerator,
        ArtifactKind::HttpConverters => &http::ConvertersGenerator,
        ArtifactKind::HttpServer => &http::ServerGenerator,
        ArtifactKind::HttpClient => &http::ClientGenerator,
        ArtifactKind::EntryPoint => &entry_point::EntryPointGenerator,
    }
}

/// File in `package` that imports the service package under its declared name
pub(crate) fn service_file(ctx: &GenerationContext, package: &str) -> GoFile {
    GoFile::new(package).with_alias(ctx.service_import(), &ctx.source_package)
}

/// Renderer qualifying service-declared types
pub(crate) fn service_types(ctx: &GenerationContext) -> TypeRenderer<'_> {
    TypeRenderer::qualified(ctx.service_import())
}

/// Rendered file, or nothing when no declaration was written
pub(crate) fn finish(file: &GoFile) -> String {
    if file.is_empty() {
        String::new()
    } else {
        file.render()
    }
}

/// `Name(args) results` of `method`
pub(crate) fn method_signature(
    method: &MethodDecl,
    types: &TypeRenderer<'_>,
    file: &mut GoFile,
) -> String {
    let args = types.params(&method.args, file);
    let results = types.results(&method.results, file);
    format!("{}({}) {}", method.name, args, results).trim_end().to_string()
}

/// Call forwarding every argument of `method` to `target`
pub(crate) fn forward_call(target: &str, method: &MethodDecl, types: &TypeRenderer<'_>) -> String {
    let call = format!("{}.{}({})", target, method.name, types.call_args(&method.args));
    if method.results.is_empty() {
        call
    } else {
        format!("return {}", call)
    }
}

/// Name of the request exchange of `method`
pub(crate) fn request_type(method: &MethodDecl) -> String { request_struct_name(&method.name) }

/// Name of the response exchange of `method`
pub(crate) fn response_type(method: &MethodDecl) -> String { response_struct_name(&method.name) }

/// Name of the exchange field carrying `param`
pub(crate) fn exchange_field(param: &Parameter) -> String { to_upper_first(&param.name) }

/// Go field name protoc gives the protobuf field of `param`
pub(crate) fn proto_field(param: &Parameter) -> String {
    to_snake_case(&param.name).split('_').map(to_upper_first).collect()
}

/// Name of the endpoint field of `method` in `EndpointsSet`
pub(crate) fn endpoint_field(method: &MethodDecl) -> String { format!("{}Endpoint", method.name) }

/// Write `Name: value,` lines with values aligned
pub(crate) fn write_key_values(
    out: &mut GoFile,
    indent: &str,
    pairs: &[(String, String)],
) -> std::fmt::Result {
    let width = pairs.iter().map(|(k, _)| k.len() + 1).max().unwrap_or(0);
    for (key, value) in pairs {
        writeln!(out, "{}{:<width$} {},", indent, format!("{}:", key), value, width = width)?;
    }
    Ok(())
}

/// Write struct field lines with names and types aligned
pub(crate) fn write_fields(
    out: &mut GoFile,
    indent: &str,
    fields: &[(String, String, String)],
) -> std::fmt::Result {
    let name_width = fields.iter().map(|(n, _, _)| n.len()).max().unwrap_or(0);
    let type_width = fields.iter().map(|(_, t, _)| t.len()).max().unwrap_or(0);
    for (name, ty, tag) in fields {
        if tag.is_empty() {
            writeln!(out, "{}{:<nw$} {}", indent, name, ty, nw = name_width)?;
        } else {
            writeln!(
                out,
                "{}{:<nw$} {:<tw$} {}",
                indent,
                name,
                ty,
                tag,
                nw = name_width,
                tw = type_width
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proto_fields_follow_protoc_naming() {
        let p = Parameter::new("userID", ir::TypeRef::named("string"));
        assert_eq!(exchange_field(&p), "UserID");
        assert_eq!(proto_field(&p), "UserId");
        let p = Parameter::new("text", ir::TypeRef::named("string"));
        assert_eq!(proto_field(&p), "Text");
    }

    #[test]
    fn key_values_are_aligned() {
        let mut file = GoFile::new("transport");
        let pairs = vec![
            ("Text".to_string(), "text".to_string()),
            ("Symbol".to_string(), "symbol".to_string()),
        ];
        write_key_values(&mut file, "\t", &pairs).expect("write");
        assert_eq!(file.body(), "\tText:   text,\n\tSymbol: symbol,\n");
    }
}
