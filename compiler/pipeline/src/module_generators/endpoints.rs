//! Endpoint set, server-side endpoint constructors and the client stub

use std::fmt::Write as _;

use codegen::{GoFile, TypeRenderer};
use ir::{ArrayLen, MethodDecl, Parameter, TypeRef};

use super::go_imports::{CONTEXT, KIT_ENDPOINT};
use super::{
    endpoint_field, exchange_field, finish, method_signature, request_type, response_type,
    service_file, service_types, write_fields, write_key_values, ArtifactGenerator,
};
use crate::generation_context::GenerationContext;
use crate::PipelineError;

/// Renders `transport/endpoints.microgen.go`
pub struct EndpointsGenerator;

impl ArtifactGenerator for EndpointsGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file = service_file(ctx, "transport");
        let methods: Vec<_> = ctx.default_methods().collect();
        if methods.is_empty() {
            return Ok(String::new());
        }
        let service = file.qual(ctx.service_import(), ctx.service_name());
        let endpoint = file.qual(KIT_ENDPOINT, "Endpoint");

        writeln!(
            file,
            "// EndpointsSet implements {} API and used for transport purposes.",
            ctx.service_name()
        )?;
        writeln!(file, "type EndpointsSet struct {{")?;
        let fields: Vec<_> = methods
            .iter()
            .map(|m| (endpoint_field(m), endpoint.clone(), String::new()))
            .collect();
        write_fields(&mut file, "\t", &fields)?;
        writeln!(file, "}}\n")?;

        writeln!(
            file,
            "// Endpoints creates an endpoint for every method of {}.",
            ctx.service_name()
        )?;
        writeln!(file, "func Endpoints(svc {}) EndpointsSet {{", service)?;
        writeln!(file, "\treturn EndpointsSet{{")?;
        let pairs: Vec<_> = methods
            .iter()
            .map(|m| (endpoint_field(m), format!("{}(svc)", endpoint_field(m))))
            .collect();
        write_key_values(&mut file, "\t\t", &pairs)?;
        writeln!(file, "\t}}\n}}")?;

        for method in methods {
            writeln!(file)?;
            write_server_endpoint(&mut file, method, &service, &endpoint)?;
        }
        Ok(finish(&file))
    }
}

fn write_server_endpoint(
    file: &mut GoFile,
    method: &MethodDecl,
    service: &str,
    endpoint: &str,
) -> Result<(), PipelineError> {
    let context = file.qual(CONTEXT, "Context");
    let args = method.args_without_context();
    let results = method.results_without_error();

    writeln!(
        file,
        "// {} wraps {}.{} into an endpoint.",
        endpoint_field(method),
        service,
        method.name
    )?;
    writeln!(file, "func {}(svc {}) {} {{", endpoint_field(method), service, endpoint)?;
    writeln!(
        file,
        "\treturn func(ctx {}, request interface{{}}) (interface{{}}, error) {{",
        context
    )?;
    if !args.is_empty() {
        writeln!(file, "\t\treq := request.(*{})", request_type(method))?;
    }

    let mut call_args = vec!["ctx".to_string()];
    call_args.extend(args.iter().map(|p| match &p.ty {
        TypeRef::Array { len: ArrayLen::Ellipsis, .. } => format!("req.{}...", exchange_field(p)),
        _ => format!("req.{}", exchange_field(p)),
    }));
    let mut outputs: Vec<String> = (0..results.len()).map(|i| format!("res{}", i)).collect();
    outputs.push("err".to_string());
    writeln!(
        file,
        "\t\t{} := svc.{}({})",
        outputs.join(", "),
        method.name,
        call_args.join(", ")
    )?;

    if results.is_empty() {
        writeln!(file, "\t\treturn &{}{{}}, err", response_type(method))?;
    } else {
        writeln!(file, "\t\treturn &{}{{", response_type(method))?;
        let pairs: Vec<_> = results
            .iter()
            .enumerate()
            .map(|(i, p)| (exchange_field(p), format!("res{}", i)))
            .collect();
        write_key_values(file, "\t\t\t", &pairs)?;
        writeln!(file, "\t\t}}, err")?;
    }
    writeln!(file, "\t}}\n}}")?;
    Ok(())
}

/// Renders `transport/client.microgen.go`: `EndpointsSet` as a service implementation
pub struct EndpointsClientGenerator;

impl ArtifactGenerator for EndpointsClientGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file = service_file(ctx, "transport");
        let types = service_types(ctx);
        let mut first = true;
        for method in ctx.default_methods() {
            if !first {
                writeln!(file)?;
            }
            first = false;
            write_client_method(&mut file, &types, ctx.service_name(), method)?;
        }
        Ok(finish(&file))
    }
}

fn write_client_method(
    file: &mut GoFile,
    types: &TypeRenderer<'_>,
    service: &str,
    method: &MethodDecl,
) -> Result<(), PipelineError> {
    let signature = method_signature(method, types, file);
    let ctx_name = method.args.first().map(|p| p.name.as_str()).unwrap_or("ctx");
    let err_name = method.results.last().map(|p| p.name.as_str()).unwrap_or("err");
    let args = method.args_without_context();
    let results = method.results_without_error();

    writeln!(file, "// {} implements {}.", method.name, service)?;
    writeln!(file, "func (set EndpointsSet) {} {{", signature)?;
    if args.is_empty() {
        writeln!(file, "\t_request := {}{{}}", request_type(method))?;
    } else {
        writeln!(file, "\t_request := {}{{", request_type(method))?;
        write_key_values(file, "\t\t", &field_assignments(args))?;
        writeln!(file, "\t}}")?;
    }
    let response = if results.is_empty() { "_" } else { "_response" };
    writeln!(
        file,
        "\t{}, _err := set.{}({}, &_request)",
        response,
        endpoint_field(method),
        ctx_name
    )?;
    writeln!(file, "\tif _err != nil {{")?;
    writeln!(file, "\t\t{} = _err", err_name)?;
    writeln!(file, "\t\treturn")?;
    writeln!(file, "\t}}")?;
    if results.is_empty() {
        writeln!(file, "\treturn nil")?;
    } else {
        writeln!(file, "\t_res := _response.(*{})", response_type(method))?;
        let values: Vec<_> =
            results.iter().map(|p| format!("_res.{}", exchange_field(p))).collect();
        writeln!(file, "\treturn {}, nil", values.join(", "))?;
    }
    writeln!(file, "}}")?;
    Ok(())
}

fn field_assignments(params: &[Parameter]) -> Vec<(String, String)> {
    params.iter().map(|p| (exchange_field(p), p.name.clone())).collect()
}
