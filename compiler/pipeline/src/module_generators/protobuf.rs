//! Protocol-definition file
//!
//! The `.proto` file is written once and then belongs to the user, so it
//! carries no generated-code header.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use codegen::utils::{is_builtin_type, to_snake_case};
use ir::{ArrayLen, Parameter, TypeRef};
use semantics::GenerationMode;

use super::{request_type, response_type, ArtifactGenerator};
use crate::generation_context::GenerationContext;
use crate::PipelineError;

const TIMESTAMP_PROTO: &str = "google/protobuf/timestamp.proto";

/// Renders `<svc>.proto`
pub struct ProtocolGenerator;

impl ArtifactGenerator for ProtocolGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut mapper = ProtoTypes::default();
        let mut rpcs = String::new();
        let mut messages = String::new();

        for method in ctx.generated_methods() {
            let mode = ctx.mode_of(method);
            let client_stream =
                matches!(mode, GenerationMode::ManyToOne | GenerationMode::ManyToMany);
            let server_stream =
                matches!(mode, GenerationMode::OneToMany | GenerationMode::ManyToMany);
            writeln!(
                rpcs,
                "  rpc {} ({}{}) returns ({}{});",
                method.name,
                if client_stream { "stream " } else { "" },
                request_type(method),
                if server_stream { "stream " } else { "" },
                response_type(method)
            )?;
            let (request, response) = (request_type(method), response_type(method));
            write_message(&mut messages, &mut mapper, &request, method.args_without_context())?;
            write_message(&mut messages, &mut mapper, &response, method.results_without_error())?;
        }

        let mut out = String::new();
        writeln!(out, "syntax = \"proto3\";\n")?;
        writeln!(out, "package {};\n", ctx.protocol_package())?;
        if let Some(go_package) = ctx.protobuf_import() {
            writeln!(out, "option go_package = \"{}\";\n", go_package)?;
        }
        if mapper.uses_timestamp {
            writeln!(out, "import \"{}\";\n", TIMESTAMP_PROTO)?;
        }
        writeln!(out, "service {} {{", ctx.service_name())?;
        out.push_str(&rpcs);
        writeln!(out, "}}")?;
        out.push_str(&messages);
        for name in &mapper.referenced {
            write!(out, "\nmessage {} {{\n}}\n", name)?;
        }
        Ok(out)
    }
}

fn write_message(
    out: &mut String,
    mapper: &mut ProtoTypes,
    name: &str,
    params: &[Parameter],
) -> Result<(), PipelineError> {
    writeln!(out, "\nmessage {} {{", name)?;
    for (i, param) in params.iter().enumerate() {
        let field_type = mapper.field_type(&param.ty);
        writeln!(out, "  {} {} = {};", field_type, to_snake_case(&param.name), i + 1)?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// Go to protobuf type mapping, remembering messages it has to declare
#[derive(Debug, Default)]
pub(crate) struct ProtoTypes {
    /// Service types used as messages
    pub(crate) referenced: BTreeSet<String>,
    /// Whether `google.protobuf.Timestamp` is used
    pub(crate) uses_timestamp: bool,
}

impl ProtoTypes {
    /// Type of a message field holding `ty`
    pub(crate) fn field_type(&mut self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Array { next, .. } if !is_byte(next) => {
                format!("repeated {}", self.scalar(next))
            }
            TypeRef::Map { key, value } => {
                format!("map<{}, {}>", self.scalar(key), self.scalar(value))
            }
            other => self.scalar(other),
        }
    }

    fn scalar(&mut self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Name { name } => match proto_scalar(name) {
                Some(scalar) => scalar.to_string(),
                None if is_builtin_type(name) => "bytes".to_string(),
                None => {
                    self.referenced.insert(name.clone());
                    name.clone()
                }
            },
            TypeRef::Pointer { next, .. } => self.scalar(next),
            TypeRef::Array { len: ArrayLen::Slice | ArrayLen::Ellipsis, next } if is_byte(next) => {
                "bytes".to_string()
            }
            TypeRef::Import { package, next, .. } => match next.plain_name() {
                Some("Time") if package == "time" => {
                    self.uses_timestamp = true;
                    "google.protobuf.Timestamp".to_string()
                }
                Some("Duration") if package == "time" => "int64".to_string(),
                Some(name) => {
                    self.referenced.insert(name.to_string());
                    name.to_string()
                }
                None => "bytes".to_string(),
            },
            _ => "bytes".to_string(),
        }
    }
}

/// Protobuf scalar for a Go predeclared type
pub(crate) fn proto_scalar(go: &str) -> Option<&'static str> {
    Some(match go {
        "string" => "string",
        "bool" => "bool",
        "int" | "int64" => "int64",
        "int8" | "int16" | "int32" | "rune" => "int32",
        "uint" | "uint64" => "uint64",
        "uint8" | "byte" | "uint16" | "uint32" => "uint32",
        "float32" => "float",
        "float64" => "double",
        _ => return None,
    })
}

fn is_byte(ty: &TypeRef) -> bool { matches!(ty.plain_name(), Some("byte") | Some("uint8")) }
