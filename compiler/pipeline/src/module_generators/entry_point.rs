//! `cmd/<svc>/main.go` scaffold

use std::fmt::Write as _;

use codegen::GoFile;
use semantics::InterfaceTag;

use super::go_imports::{GRPC, KIT_LOG};
use super::ArtifactGenerator;
use crate::artifact::ArtifactKind;
use crate::generation_context::GenerationContext;
use crate::template_management::{fill_template, MAIN_TEMPLATE};
use crate::PipelineError;

const GRPC_ADDR: &str = ":8081";
const HTTP_ADDR: &str = ":8080";

/// Middleware constructors in wrapping order, innermost first
const MIDDLEWARE: [(InterfaceTag, &str); 3] = [
    (InterfaceTag::Logging, "LoggingMiddleware"),
    (InterfaceTag::ErrorLogging, "ErrorLoggingMiddleware"),
    (InterfaceTag::Recovering, "RecoveringMiddleware"),
];

/// Renders the editable `main.go` scaffold
pub struct EntryPointGenerator;

impl ArtifactGenerator for EntryPointGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file =
            GoFile::editable("main").with_alias(ctx.service_import(), &ctx.source_package);
        for path in [KIT_LOG, "os", "os/signal", "syscall", "fmt"] {
            file.import(path);
        }
        let service_type = file.qual(ctx.service_import(), ctx.service_name());
        let middleware = middleware_lines(&mut file, ctx)?;
        let servers = server_lines(&mut file, ctx)?;

        let body = fill_template(
            MAIN_TEMPLATE,
            &[
                ("service", ctx.service_name().to_string()),
                ("service_type", service_type),
                ("middleware", middleware),
                ("servers", servers),
            ],
        )?;
        file.write_str(&body)?;
        Ok(file.render())
    }
}

fn middleware_lines(file: &mut GoFile, ctx: &GenerationContext) -> Result<String, PipelineError> {
    let mut lines = String::new();
    for (tag, constructor) in MIDDLEWARE {
        if ctx.directives.interface.has(tag) {
            let service = file.import(&ctx.middleware_import());
            writeln!(lines, "\tsvc = {}.{}(logger)(svc)", service, constructor)?;
        }
    }
    Ok(lines)
}

/// Servers started from `main`; with none, `svc` is still marked as used
fn server_lines(file: &mut GoFile, ctx: &GenerationContext) -> Result<String, PipelineError> {
    let mut lines = String::new();
    let has_endpoints = ctx.flags.emit_core && ctx.default_methods().next().is_some();
    let serve_grpc = has_endpoints
        && ArtifactKind::GrpcServer.is_active(ctx)
        && ctx.protobuf_import().is_some();
    let serve_http = has_endpoints && ArtifactKind::HttpServer.is_active(ctx);
    if !serve_grpc && !serve_http {
        writeln!(lines, "\n\t_ = svc")?;
        return Ok(lines);
    }

    let transport = file.import(&ctx.transport_import());
    writeln!(lines, "\n\tendpoints := {}.Endpoints(svc)", transport)?;

    if let (true, Some(pb_import)) = (serve_grpc, ctx.protobuf_import()) {
        let net = file.import("net");
        let grpc = file.import(GRPC);
        let pb = file.import_as(pb_import, "pb");
        let server = file.import_as(&ctx.grpc_transport_import(), "transportgrpc");
        writeln!(lines, "\tgo func() {{")?;
        writeln!(lines, "\t\tlistener, err := {}.Listen(\"tcp\", \"{}\")", net, GRPC_ADDR)?;
        writeln!(lines, "\t\tif err != nil {{\n\t\t\terrc <- err\n\t\t\treturn\n\t\t}}")?;
        writeln!(lines, "\t\tserver := {}.NewServer()", grpc)?;
        writeln!(
            lines,
            "\t\t{}.Register{}Server(server, {}.NewGRPCServer(&endpoints))",
            pb,
            ctx.service_name(),
            server
        )?;
        writeln!(lines, "\t\tlogger.Log(\"transport\", \"gRPC\", \"addr\", \"{}\")", GRPC_ADDR)?;
        writeln!(lines, "\t\terrc <- server.Serve(listener)")?;
        writeln!(lines, "\t}}()")?;
    }
    if serve_http {
        let http = file.import("net/http");
        let handler = file.import_as(&ctx.http_transport_import(), "transporthttp");
        writeln!(lines, "\tgo func() {{")?;
        writeln!(lines, "\t\tlogger.Log(\"transport\", \"HTTP\", \"addr\", \"{}\")", HTTP_ADDR)?;
        writeln!(
            lines,
            "\t\terrc <- {}.ListenAndServe(\"{}\", {}.NewHTTPHandler(&endpoints))",
            http, HTTP_ADDR, handler
        )?;
        writeln!(lines, "\t}}()")?;
    }
    Ok(lines)
}
