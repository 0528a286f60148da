//! HTTP transport: JSON converters, gorilla/mux handler and client
//!
//! Exchanges travel as JSON bodies. GET exchanges carry their arguments in
//! the path template or, when the template has no `{name}` for one, in the
//! query string.

use std::fmt::Write as _;

use codegen::utils::to_snake_case;
use codegen::GoFile;
use ir::{MethodDecl, Parameter};
use semantics::HttpMethod;

use super::go_imports::{CONTEXT, KIT_HTTP, MUX};
use super::{
    endpoint_field, exchange_field, finish, request_type, response_type, service_file,
    ArtifactGenerator,
};
use crate::generation_context::GenerationContext;
use crate::PipelineError;

const PACKAGE: &str = "transporthttp";

/// Route of one exchange method
struct Route<'m> {
    method: &'m MethodDecl,
    verb: HttpMethod,
    template: String,
}

impl<'m> Route<'m> {
    fn new(ctx: &GenerationContext, method: &'m MethodDecl) -> Self {
        let directives = ctx.method_directives(method);
        let verb = directives.map(|d| d.http_method).unwrap_or_default();
        let template = match directives.and_then(|d| d.http_path.as_deref()) {
            Some(explicit) => explicit.trim_matches('/').to_string(),
            None => default_template(method, verb),
        };
        Self { method, verb, template }
    }

    fn is_get(&self) -> bool { self.verb == HttpMethod::Get }

    fn in_path(&self, param: &Parameter) -> bool {
        self.template.contains(&format!("{{{}}}", param.name))
    }
}

/// `count-words` for non-GET methods, `count-words/{text}/{limit}` for GET
fn default_template(method: &MethodDecl, verb: HttpMethod) -> String {
    let mut template = to_snake_case(&method.name).replace('_', "-");
    if verb == HttpMethod::Get {
        for param in method.args_without_context() {
            template.push_str(&format!("/{{{}}}", param.name));
        }
    }
    template
}

fn routes(ctx: &GenerationContext) -> Vec<Route<'_>> {
    ctx.default_methods().map(|m| Route::new(ctx, m)).collect()
}

/// Renders `transport/http/converters.microgen.go`
pub struct ConvertersGenerator;

impl ArtifactGenerator for ConvertersGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let routes = routes(ctx);
        if routes.is_empty() {
            return Ok(String::new());
        }
        let mut file = service_file(ctx, PACKAGE);
        let context = file.qual(CONTEXT, "Context");
        let http = file.import("net/http");
        let json = file.import("encoding/json");
        let transport = file.import(&ctx.transport_import());

        let bytes = file.import("bytes");
        let io = file.import("io");
        writeln!(file, "// CommonHTTPRequestEncoder writes request as JSON into the body.")?;
        writeln!(
            file,
            "func CommonHTTPRequestEncoder(_ {}, r *{}.Request, request interface{{}}) error {{",
            context, http
        )?;
        writeln!(file, "\tvar buf {}.Buffer", bytes)?;
        writeln!(file, "\tif err := {}.NewEncoder(&buf).Encode(request); err != nil {{", json)?;
        writeln!(file, "\t\treturn err\n\t}}")?;
        writeln!(file, "\tr.Body = {}.NopCloser(&buf)", io)?;
        writeln!(file, "\treturn nil\n}}\n")?;

        writeln!(file, "// CommonHTTPResponseEncoder writes response as JSON.")?;
        writeln!(
            file,
            "func CommonHTTPResponseEncoder(_ {}, w {}.ResponseWriter, \
             response interface{{}}) error {{",
            context, http
        )?;
        writeln!(file, "\tw.Header().Set(\"Content-Type\", \"application/json; charset=utf-8\")")?;
        writeln!(file, "\treturn {}.NewEncoder(w).Encode(response)\n}}", json)?;

        for route in &routes {
            let method = route.method;
            writeln!(file)?;
            if route.is_get() {
                write_get_request_decoder(&mut file, route, &context, &http, &transport)?;
            } else {
                writeln!(
                    file,
                    "func _Decode_{}_Request(_ {}, r *{}.Request) (interface{{}}, error) {{",
                    method.name, context, http
                )?;
                writeln!(file, "\tvar req {}.{}", transport, request_type(method))?;
                writeln!(file, "\terr := {}.NewDecoder(r.Body).Decode(&req)", json)?;
                writeln!(file, "\treturn &req, err\n}}")?;
            }

            writeln!(file)?;
            let fmt = file.import("fmt");
            let strings = file.import("strings");
            writeln!(
                file,
                "func _Decode_{}_Response(_ {}, r *{}.Response) (interface{{}}, error) {{",
                method.name, context, http
            )?;
            writeln!(file, "\tif r.StatusCode != {}.StatusOK {{", http)?;
            writeln!(file, "\t\tbody, _ := {}.ReadAll(r.Body)", io)?;
            writeln!(
                file,
                "\t\treturn nil, {}.Errorf(\"%s: %s\", r.Status, {}.TrimSpace(string(body)))",
                fmt, strings
            )?;
            writeln!(file, "\t}}")?;
            writeln!(file, "\tvar resp {}.{}", transport, response_type(method))?;
            writeln!(file, "\terr := {}.NewDecoder(r.Body).Decode(&resp)", json)?;
            writeln!(file, "\treturn &resp, err\n}}")?;

            writeln!(file)?;
            if route.is_get() {
                write_get_request_encoder(&mut file, route, &context, &http, &transport)?;
            } else {
                let path = file.import("path");
                writeln!(
                    file,
                    "func _Encode_{}_Request(ctx {}, r *{}.Request, \
                     request interface{{}}) error {{",
                    method.name, context, http
                )?;
                writeln!(file, "\tr.URL.Path = {}.Join(r.URL.Path, \"{}\")", path, route.template)?;
                writeln!(file, "\treturn CommonHTTPRequestEncoder(ctx, r, request)\n}}")?;
            }

            writeln!(file)?;
            writeln!(
                file,
                "func _Encode_{}_Response(ctx {}, w {}.ResponseWriter, \
                 response interface{{}}) error {{",
                method.name, context, http
            )?;
            writeln!(file, "\treturn CommonHTTPResponseEncoder(ctx, w, response)\n}}")?;
        }
        Ok(finish(&file))
    }
}

fn write_get_request_encoder(
    file: &mut GoFile,
    route: &Route<'_>,
    context: &str,
    http: &str,
    transport: &str,
) -> Result<(), PipelineError> {
    let method = route.method;
    let args = method.args_without_context();
    let path = file.import("path");
    writeln!(
        file,
        "func _Encode_{}_Request(_ {}, r *{}.Request, request interface{{}}) error {{",
        method.name, context, http
    )?;
    if !args.is_empty() {
        writeln!(file, "\treq := request.(*{}.{})", transport, request_type(method))?;
    }

    let (in_path, in_query): (Vec<&Parameter>, Vec<&Parameter>) =
        args.iter().partition(|p| route.in_path(p));
    if in_path.is_empty() {
        writeln!(file, "\tr.URL.Path = {}.Join(r.URL.Path, \"{}\")", path, route.template)?;
    } else {
        let strings = file.import("strings");
        let fmt = file.import("fmt");
        writeln!(file, "\tr.URL.Path = {}.Join(r.URL.Path, {}.NewReplacer(", path, strings)?;
        for param in &in_path {
            writeln!(
                file,
                "\t\t\"{{{}}}\", {}.Sprint(req.{}),",
                param.name,
                fmt,
                exchange_field(param)
            )?;
        }
        writeln!(file, "\t).Replace(\"{}\"))", route.template)?;
    }
    if !in_query.is_empty() {
        let fmt = file.import("fmt");
        writeln!(file, "\tquery := r.URL.Query()")?;
        for param in &in_query {
            writeln!(
                file,
                "\tquery.Set(\"{}\", {}.Sprint(req.{}))",
                param.name,
                fmt,
                exchange_field(param)
            )?;
        }
        writeln!(file, "\tr.URL.RawQuery = query.Encode()")?;
    }
    writeln!(file, "\treturn nil\n}}")?;
    Ok(())
}

fn write_get_request_decoder(
    file: &mut GoFile,
    route: &Route<'_>,
    context: &str,
    http: &str,
    transport: &str,
) -> Result<(), PipelineError> {
    let method = route.method;
    let args = method.args_without_context();
    writeln!(
        file,
        "func _Decode_{}_Request(_ {}, r *{}.Request) (interface{{}}, error) {{",
        method.name, context, http
    )?;
    writeln!(file, "\tvar req {}.{}", transport, request_type(method))?;
    if args.iter().any(|p| route.in_path(p)) {
        let mux = file.import(MUX);
        writeln!(file, "\tvars := {}.Vars(r)", mux)?;
    }
    if args.iter().any(|p| !route.in_path(p)) {
        writeln!(file, "\tquery := r.URL.Query()")?;
    }

    for param in args {
        let raw = format!("{}Param", param.name);
        if route.in_path(param) {
            let errors = file.import("errors");
            writeln!(file, "\t{}, ok := vars[\"{}\"]", raw, param.name)?;
            writeln!(file, "\tif !ok {{")?;
            writeln!(file, "\t\treturn nil, {}.New(\"param {} not found\")", errors, param.name)?;
            writeln!(file, "\t}}")?;
        } else {
            writeln!(file, "\t{} := query.Get(\"{}\")", raw, param.name)?;
        }

        let field = exchange_field(param);
        match param.ty.plain_name().and_then(parse_function) {
            None => writeln!(file, "\treq.{} = {}", field, raw)?,
            Some((parse, bits, go)) => {
                let strconv = file.import("strconv");
                let value = format!("{}Value", param.name);
                writeln!(file, "\t{}, err := {}.{}({}, 10, {})", value, strconv, parse, raw, bits)?;
                writeln!(file, "\tif err != nil {{\n\t\treturn nil, err\n\t}}")?;
                writeln!(file, "\treq.{} = {}({})", field, go, value)?;
            }
        }
    }
    writeln!(file, "\treturn &req, nil\n}}")?;
    Ok(())
}

/// strconv function, bit size and target type for an integer GET argument
fn parse_function(go: &str) -> Option<(&'static str, u8, &str)> {
    match go {
        "int" | "int64" => Some(("ParseInt", 64, go)),
        "int32" => Some(("ParseInt", 32, go)),
        "uint" | "uint64" => Some(("ParseUint", 64, go)),
        "uint32" => Some(("ParseUint", 32, go)),
        _ => None,
    }
}

/// Renders `transport/http/server.microgen.go`
pub struct ServerGenerator;

impl ArtifactGenerator for ServerGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let routes = routes(ctx);
        if routes.is_empty() {
            return Ok(String::new());
        }
        let mut file = service_file(ctx, PACKAGE);
        let http = file.import("net/http");
        let kit = file.import_as(KIT_HTTP, "httpkit");
        let mux = file.import(MUX);
        let transport = file.import(&ctx.transport_import());

        writeln!(file, "// NewHTTPHandler routes the endpoints of {}.", ctx.service_name())?;
        writeln!(
            file,
            "func NewHTTPHandler(endpoints *{}.EndpointsSet, \
             opts ...{}.ServerOption) {}.Handler {{",
            transport, kit, http
        )?;
        writeln!(file, "\trouter := {}.NewRouter()", mux)?;
        for route in &routes {
            writeln!(
                file,
                "\trouter.Methods(\"{}\").Path(\"/{}\").Handler(",
                route.verb, route.template
            )?;
            writeln!(file, "\t\t{}.NewServer(", kit)?;
            writeln!(file, "\t\t\tendpoints.{},", endpoint_field(route.method))?;
            writeln!(file, "\t\t\t_Decode_{}_Request,", route.method.name)?;
            writeln!(file, "\t\t\t_Encode_{}_Response,", route.method.name)?;
            writeln!(file, "\t\t\topts...))")?;
        }
        writeln!(file, "\treturn router\n}}")?;
        Ok(finish(&file))
    }
}

/// Renders `transport/http/client.microgen.go`
pub struct ClientGenerator;

impl ArtifactGenerator for ClientGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let routes = routes(ctx);
        if routes.is_empty() {
            return Ok(String::new());
        }
        let mut file = service_file(ctx, PACKAGE);
        let url = file.import("net/url");
        let kit = file.import_as(KIT_HTTP, "httpkit");
        let transport = file.import(&ctx.transport_import());

        writeln!(file, "// NewHTTPClient returns endpoints calling {} at u.", ctx.service_name())?;
        writeln!(
            file,
            "func NewHTTPClient(u *{}.URL, opts ...{}.ClientOption) {}.EndpointsSet {{",
            url, kit, transport
        )?;
        writeln!(file, "\treturn {}.EndpointsSet{{", transport)?;
        for route in &routes {
            writeln!(file, "\t\t{}: {}.NewClient(", endpoint_field(route.method), kit)?;
            writeln!(file, "\t\t\t\"{}\", u,", route.verb)?;
            writeln!(file, "\t\t\t_Encode_{}_Request,", route.method.name)?;
            writeln!(file, "\t\t\t_Decode_{}_Response,", route.method.name)?;
            writeln!(file, "\t\t\topts...,")?;
            writeln!(file, "\t\t).Endpoint(),")?;
        }
        writeln!(file, "\t}}\n}}")?;
        Ok(finish(&file))
    }
}
