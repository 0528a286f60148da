//! gRPC transport: protobuf converters, server binding and client

use std::collections::BTreeMap;
use std::fmt::Write as _;

use codegen::utils::{is_builtin_type, to_lower_first, to_upper_first};
use codegen::GoFile;
use ir::{ArrayLen, MethodDecl, Parameter, TypeRef};

use super::go_imports::{CONTEXT, GRPC, KIT_GRPC};
use super::protobuf::proto_scalar;
use super::{
    endpoint_field, exchange_field, finish, proto_field, request_type, response_type,
    service_file, service_types, write_key_values, ArtifactGenerator,
};
use crate::generation_context::GenerationContext;
use crate::PipelineError;

const PACKAGE: &str = "transportgrpc";
const TIMESTAMP_GO: &str = "google.golang.org/protobuf/types/known/timestamppb";

/// Types protoc generates with the same Go type
const SAME_IN_PROTO: &[&str] =
    &["string", "bool", "int32", "int64", "uint32", "uint64", "float32", "float64", "rune"];

/// How a value crosses between an exchange field and a protobuf field
#[derive(Debug, Clone, PartialEq, Eq)]
enum Conversion {
    /// Plain assignment
    Direct,
    /// Numeric conversion; Go type on each side
    Cast { go: String, proto: &'static str },
    /// Through the `<Stem>ToProto` / `ProtoTo<Stem>` pair
    Converter(String),
}

fn conversion(ty: &TypeRef) -> Conversion {
    match ty {
        TypeRef::Name { name } if SAME_IN_PROTO.contains(&name.as_str()) => Conversion::Direct,
        TypeRef::Name { name } if is_builtin_type(name) => match proto_scalar(name) {
            Some(scalar) => Conversion::Cast { go: name.clone(), proto: proto_go_scalar(scalar) },
            None => Conversion::Converter(converter_stem(ty)),
        },
        TypeRef::Array { len: ArrayLen::Slice | ArrayLen::Ellipsis, next } => match next.as_ref() {
            TypeRef::Name { name }
                if SAME_IN_PROTO.contains(&name.as_str()) || name == "byte" || name == "uint8" =>
            {
                Conversion::Direct
            }
            _ => Conversion::Converter(converter_stem(ty)),
        },
        _ => Conversion::Converter(converter_stem(ty)),
    }
}

fn proto_go_scalar(scalar: &str) -> &'static str {
    match scalar {
        "int32" => "int32",
        "uint32" => "uint32",
        "uint64" => "uint64",
        "float" => "float32",
        "double" => "float64",
        "bool" => "bool",
        "string" => "string",
        _ => "int64",
    }
}

/// Identifier fragment naming the converter pair of `ty`
fn converter_stem(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Name { name } => to_upper_first(name),
        TypeRef::Pointer { next, .. } => format!("Ptr{}", converter_stem(next)),
        TypeRef::Array { len: ArrayLen::Fixed(n), next } => {
            format!("Array{}{}", n, converter_stem(next))
        }
        TypeRef::Array { next, .. } => format!("List{}", converter_stem(next)),
        TypeRef::Map { key, value } => {
            format!("Map{}{}", converter_stem(key), converter_stem(value))
        }
        TypeRef::Import { next, .. } => converter_stem(next),
        TypeRef::Interface { .. } => "Interface".to_string(),
        TypeRef::Struct { .. } => "Struct".to_string(),
        TypeRef::Func { .. } => "Func".to_string(),
    }
}

/// Go type protoc generates for a field holding `ty`
fn proto_go_type(ty: &TypeRef, file: &mut GoFile, pb: &str) -> String {
    match ty {
        TypeRef::Name { name } => match proto_scalar(name) {
            Some(scalar) => proto_go_scalar(scalar).to_string(),
            None if is_builtin_type(name) => "[]byte".to_string(),
            None => format!("*{}.{}", pb, name),
        },
        TypeRef::Pointer { next, .. } => proto_go_type(next, file, pb),
        TypeRef::Array { next, .. } if matches!(next.plain_name(), Some("byte" | "uint8")) => {
            "[]byte".to_string()
        }
        TypeRef::Array { next, .. } => format!("[]{}", proto_go_type(next, file, pb)),
        TypeRef::Map { key, value } => {
            format!("map[{}]{}", proto_go_type(key, file, pb), proto_go_type(value, file, pb))
        }
        TypeRef::Import { package, next, .. } => match next.plain_name() {
            Some("Time") if package == "time" => {
                format!("*{}", file.qual(TIMESTAMP_GO, "Timestamp"))
            }
            Some("Duration") if package == "time" => "int64".to_string(),
            Some(name) => format!("*{}.{}", pb, name),
            None => "[]byte".to_string(),
        },
        _ => "[]byte".to_string(),
    }
}

fn protobuf_import(ctx: &GenerationContext) -> Result<&str, PipelineError> {
    ctx.protobuf_import()
        .ok_or_else(|| PipelineError::Message("protobuf import path is empty".to_string()))
}

fn pb_alias(file: &mut GoFile, ctx: &GenerationContext) -> Result<String, PipelineError> {
    Ok(file.import_as(protobuf_import(ctx)?, "pb"))
}

/// Renders `transport/grpc/protobuf_type_converters.microgen.go`
///
/// Converter bodies are left to the user; the file is merged, never overwritten.
pub struct TypeConvertersGenerator;

impl ArtifactGenerator for TypeConvertersGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file = service_file(ctx, PACKAGE);
        let types = service_types(ctx);
        let pb = protobuf_import(ctx)?.to_string();

        let mut needed: BTreeMap<String, &TypeRef> = BTreeMap::new();
        for method in ctx.default_methods() {
            for param in exchanged(method) {
                if let Conversion::Converter(stem) = conversion(&param.ty) {
                    needed.entry(stem).or_insert(&param.ty);
                }
            }
        }

        let mut first = true;
        for (stem, ty) in needed {
            let go_type = types.field_type(ty, &mut file);
            let pb_name = file.import_as(&pb, "pb");
            let proto_type = proto_go_type(ty, &mut file, &pb_name);
            let value = to_lower_first(&stem);
            if !first {
                writeln!(file)?;
            }
            first = false;
            writeln!(
                file,
                "func {}ToProto({} {}) ({}, error) {{",
                stem, value, go_type, proto_type
            )?;
            writeln!(file, "\tpanic(\"function not provided\")\n}}\n")?;
            writeln!(
                file,
                "func ProtoTo{}(proto{} {}) ({}, error) {{",
                stem, stem, proto_type, go_type
            )?;
            writeln!(file, "\tpanic(\"function not provided\")\n}}")?;
        }
        Ok(finish(&file))
    }
}

fn exchanged(method: &MethodDecl) -> impl Iterator<Item = &Parameter> {
    method.args_without_context().iter().chain(method.results_without_error())
}

/// Renders `transport/grpc/protobuf_endpoint_converters.microgen.go`
pub struct EndpointConvertersGenerator;

/// Direction of one generated converter function
#[derive(Clone, Copy)]
enum Direction {
    Encode,
    Decode,
}

impl ArtifactGenerator for EndpointConvertersGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file = service_file(ctx, PACKAGE);
        let mut first = true;
        for method in ctx.default_methods() {
            for (suffix, params, exchange) in [
                ("Request", method.args_without_context(), request_type(method)),
                ("Response", method.results_without_error(), response_type(method)),
            ] {
                for direction in [Direction::Encode, Direction::Decode] {
                    if !first {
                        writeln!(file)?;
                    }
                    first = false;
                    write_converter(&mut file, ctx, method, suffix, params, &exchange, direction)?;
                }
            }
        }
        Ok(finish(&file))
    }
}

fn write_converter(
    file: &mut GoFile,
    ctx: &GenerationContext,
    method: &MethodDecl,
    suffix: &str,
    params: &[Parameter],
    exchange: &str,
    direction: Direction,
) -> Result<(), PipelineError> {
    let context = file.qual(CONTEXT, "Context");
    let pb = pb_alias(file, ctx)?;
    let transport = file.import(&ctx.transport_import());
    let errors = file.import("errors");
    let var = if suffix == "Request" { "req" } else { "resp" };
    let arg = if suffix == "Request" { "request" } else { "response" };
    let ours = format!("{}.{}", transport, exchange);
    let theirs = format!("{}.{}", pb, exchange);
    let (verb, from, to) = match direction {
        Direction::Encode => ("Encode", ours, theirs),
        Direction::Decode => ("Decode", theirs, ours),
    };

    writeln!(
        file,
        "func _{}_{}_{}(ctx {}, {} interface{{}}) (interface{{}}, error) {{",
        verb, method.name, suffix, context, arg
    )?;
    writeln!(file, "\tif {} == nil {{", arg)?;
    writeln!(file, "\t\treturn nil, {}.New(\"nil {}\")", errors, exchange)?;
    writeln!(file, "\t}}")?;
    if params.is_empty() {
        writeln!(file, "\treturn &{}{{}}, nil", to)?;
        writeln!(file, "}}")?;
        return Ok(());
    }
    writeln!(file, "\t{} := {}.(*{})", var, arg, from)?;

    let mut pairs = Vec::new();
    for param in params {
        let (source, target) = match direction {
            Direction::Encode => (exchange_field(param), proto_field(param)),
            Direction::Decode => (proto_field(param), exchange_field(param)),
        };
        let value = match conversion(&param.ty) {
            Conversion::Direct => format!("{}.{}", var, source),
            Conversion::Cast { go, proto } => match direction {
                Direction::Encode => format!("{}({}.{})", proto, var, source),
                Direction::Decode => format!("{}({}.{})", go, var, source),
            },
            Conversion::Converter(stem) => {
                let local = format!("{}{}", var, exchange_field(param));
                let function = match direction {
                    Direction::Encode => format!("{}ToProto", stem),
                    Direction::Decode => format!("ProtoTo{}", stem),
                };
                writeln!(file, "\t{}, err := {}({}.{})", local, function, var, source)?;
                writeln!(file, "\tif err != nil {{\n\t\treturn nil, err\n\t}}")?;
                local
            }
        };
        pairs.push((target, value));
    }
    writeln!(file, "\treturn &{}{{", to)?;
    write_key_values(file, "\t\t", &pairs)?;
    writeln!(file, "\t}}, nil")?;
    writeln!(file, "}}")?;
    Ok(())
}

fn server_type(ctx: &GenerationContext) -> String {
    format!("{}Server", to_lower_first(ctx.service_name()))
}

fn handler_field(method: &MethodDecl) -> String {
    format!("{}Handler", to_lower_first(&method.name))
}

/// Renders `transport/grpc/server.microgen.go`
pub struct ServerGenerator;

impl ArtifactGenerator for ServerGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file = service_file(ctx, PACKAGE);
        let methods: Vec<_> = ctx.default_methods().collect();
        if methods.is_empty() {
            return Ok(String::new());
        }
        let pb = pb_alias(&mut file, ctx)?;
        let kit = file.import_as(KIT_GRPC, "grpckit");
        let transport = file.import(&ctx.transport_import());
        let context = file.qual(CONTEXT, "Context");
        let service = ctx.service_name();
        let server = server_type(ctx);

        writeln!(file, "type {} struct {{", server)?;
        writeln!(file, "\t{}.Unimplemented{}Server", pb, service)?;
        let width = methods.iter().map(|m| handler_field(m).len()).max().unwrap_or(0);
        for method in &methods {
            writeln!(file, "\t{:<width$} {}.Handler", handler_field(method), kit, width = width)?;
        }
        writeln!(file, "}}\n")?;

        writeln!(file, "// NewGRPCServer serves the endpoints of {} over gRPC.", service)?;
        writeln!(
            file,
            "func NewGRPCServer(endpoints *{}.EndpointsSet, \
             opts ...{}.ServerOption) {}.{}Server {{",
            transport, kit, pb, service
        )?;
        writeln!(file, "\treturn &{}{{", server)?;
        for method in &methods {
            writeln!(file, "\t\t{}: {}.NewServer(", handler_field(method), kit)?;
            writeln!(file, "\t\t\tendpoints.{},", endpoint_field(method))?;
            writeln!(file, "\t\t\t_Decode_{}_Request,", method.name)?;
            writeln!(file, "\t\t\t_Encode_{}_Response,", method.name)?;
            writeln!(file, "\t\t\topts...,")?;
            writeln!(file, "\t\t),")?;
        }
        writeln!(file, "\t}}\n}}")?;

        for method in &methods {
            writeln!(file)?;
            writeln!(
                file,
                "func (S *{}) {}(ctx {}, req *{}.{}) (*{}.{}, error) {{",
                server,
                method.name,
                context,
                pb,
                request_type(method),
                pb,
                response_type(method)
            )?;
            writeln!(file, "\t_, resp, err := S.{}.ServeGRPC(ctx, req)", handler_field(method))?;
            writeln!(file, "\tif err != nil {{\n\t\treturn nil, err\n\t}}")?;
            writeln!(file, "\treturn resp.(*{}.{}), nil", pb, response_type(method))?;
            writeln!(file, "}}")?;
        }
        Ok(finish(&file))
    }
}

/// Renders `transport/grpc/client.microgen.go`
pub struct ClientGenerator;

impl ArtifactGenerator for ClientGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file = service_file(ctx, PACKAGE);
        let methods: Vec<_> = ctx.default_methods().collect();
        if methods.is_empty() {
            return Ok(String::new());
        }
        let pb = pb_alias(&mut file, ctx)?;
        let kit = file.import_as(KIT_GRPC, "grpckit");
        let transport = file.import(&ctx.transport_import());
        let conn = file.qual(GRPC, "ClientConn");

        writeln!(
            file,
            "// NewGRPCClient returns endpoints calling {} at {}.",
            ctx.service_name(),
            ctx.grpc_address
        )?;
        writeln!(
            file,
            "func NewGRPCClient(conn *{}, opts ...{}.ClientOption) {}.EndpointsSet {{",
            conn, kit, transport
        )?;
        writeln!(file, "\taddr := \"{}\"", ctx.grpc_address)?;
        writeln!(file, "\treturn {}.EndpointsSet{{", transport)?;
        for method in &methods {
            writeln!(file, "\t\t{}: {}.NewClient(", endpoint_field(method), kit)?;
            writeln!(file, "\t\t\tconn, addr, \"{}\",", method.name)?;
            writeln!(file, "\t\t\t_Encode_{}_Request,", method.name)?;
            writeln!(file, "\t\t\t_Decode_{}_Response,", method.name)?;
            writeln!(file, "\t\t\t{}.{}{{}},", pb, response_type(method))?;
            writeln!(file, "\t\t\topts...,")?;
            writeln!(file, "\t\t).Endpoint(),")?;
        }
        writeln!(file, "\t}}\n}}")?;
        Ok(finish(&file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_follow_protoc_types() {
        assert_eq!(conversion(&TypeRef::named("string")), Conversion::Direct);
        assert_eq!(conversion(&TypeRef::slice(TypeRef::named("byte"))), Conversion::Direct);
        assert_eq!(
            conversion(&TypeRef::named("int")),
            Conversion::Cast { go: "int".into(), proto: "int64" }
        );
        assert_eq!(
            conversion(&TypeRef::slice(TypeRef::pointer(TypeRef::named("Comment")))),
            Conversion::Converter("ListPtrComment".into())
        );
        assert_eq!(
            conversion(&TypeRef::map(TypeRef::named("string"), TypeRef::named("int"))),
            Conversion::Converter("MapStringInt".into())
        );
    }

    #[test]
    fn protobuf_go_types() {
        let mut file = GoFile::new(PACKAGE);
        let ty = TypeRef::slice(TypeRef::pointer(TypeRef::named("Comment")));
        assert_eq!(proto_go_type(&ty, &mut file, "pb"), "[]*pb.Comment");
        let ts = TypeRef::imported("time", TypeRef::named("Time"));
        assert_eq!(proto_go_type(&ts, &mut file, "pb"), "*timestamppb.Timestamp");
    }
}
