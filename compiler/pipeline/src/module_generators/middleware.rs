//! Service middleware: the decorator type and the logging, error-logging and
//! panic-recovering wrappers
//!
//! Wrappers implement the whole interface. Exchange methods get the
//! wrapper's behavior; streaming and excluded methods are forwarded as is.

use std::fmt::Write as _;

use codegen::{GoFile, TypeRenderer};
use ir::MethodDecl;
use semantics::GenerationMode;

use super::go_imports::KIT_LOG;
use super::{
    exchange_field, finish, forward_call, method_signature, service_file, service_types,
    write_fields, write_key_values, ArtifactGenerator,
};
use crate::generation_context::GenerationContext;
use crate::PipelineError;

const RECEIVER: &str = "M";

/// Renders `service/middleware.microgen.go`
pub struct MiddlewareTypeGenerator;

impl ArtifactGenerator for MiddlewareTypeGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file = service_file(ctx, "service");
        let service = file.qual(ctx.service_import(), ctx.service_name());
        writeln!(file, "// Middleware wraps {} with additional behavior.", ctx.service_name())?;
        writeln!(file, "type Middleware func({}) {}", service, service)?;
        Ok(finish(&file))
    }
}

/// Renders `service/logging.microgen.go`
pub struct LoggingGenerator;

impl ArtifactGenerator for LoggingGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let wrapper = Wrapper {
            constructor: "LoggingMiddleware",
            doc: "writes params, results and working time of method call to provided logger \
                  after its execution.",
            type_name: "loggingMiddleware",
        };
        let mut file = service_file(ctx, "service");
        let types = service_types(ctx);
        wrapper.write_header(&mut file, ctx)?;

        let mut log_types = Vec::new();
        for method in &ctx.interface.methods {
            writeln!(file)?;
            if ctx.mode_of(method) != GenerationMode::Default {
                wrapper.write_forward(&mut file, &types, method)?;
                continue;
            }
            let directives = ctx.method_directives(method);
            let ignore = directives.map(|d| d.logs_ignore.as_slice()).unwrap_or_default();
            let by_len = directives.map(|d| d.logs_len.as_slice()).unwrap_or_default();

            let request = LogExchange::new(
                format!("log{}Request", method.name),
                method.args_without_context(),
                ignore,
                by_len,
            );
            let response = LogExchange::new(
                format!("log{}Response", method.name),
                method.results_without_error(),
                ignore,
                by_len,
            );
            let err_name = method.results.last().map(|p| p.name.as_str()).unwrap_or("err");
            let time = file.import("time");

            let signature = method_signature(method, &types, &mut file);
            writeln!(file, "func ({} {}) {} {{", RECEIVER, wrapper.type_name, signature)?;
            writeln!(file, "\tdefer func(begin {}.Time) {{", time)?;
            writeln!(file, "\t\t{}.logger.Log(", RECEIVER)?;
            writeln!(file, "\t\t\t\"method\", \"{}\",", method.name)?;
            writeln!(file, "\t\t\t\"message\", \"{} called\",", method.name)?;
            writeln!(file, "\t\t\t\"request\", {},", request.literal())?;
            writeln!(file, "\t\t\t\"response\", {},", response.literal())?;
            writeln!(file, "\t\t\t\"err\", {},", err_name)?;
            writeln!(file, "\t\t\t\"took\", {}.Since(begin))", time)?;
            writeln!(file, "\t}}({}.Now())", time)?;
            writeln!(file, "\t{}", forward_call(&format!("{}.next", RECEIVER), method, &types))?;
            writeln!(file, "}}")?;
            log_types.push(request);
            log_types.push(response);
        }

        if !log_types.is_empty() {
            writeln!(file, "\ntype (")?;
            for log_type in &log_types {
                log_type.write_declaration(&mut file, &types)?;
            }
            writeln!(file, ")")?;
        }
        Ok(finish(&file))
    }
}

/// Renders `service/error_logging.microgen.go`
pub struct ErrorLoggingGenerator;

impl ArtifactGenerator for ErrorLoggingGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let wrapper = Wrapper {
            constructor: "ErrorLoggingMiddleware",
            doc: "writes to logger any error, if it is not nil.",
            type_name: "errorLoggingMiddleware",
        };
        let mut file = service_file(ctx, "service");
        let types = service_types(ctx);
        wrapper.write_header(&mut file, ctx)?;

        for method in &ctx.interface.methods {
            writeln!(file)?;
            if ctx.mode_of(method) != GenerationMode::Default {
                wrapper.write_forward(&mut file, &types, method)?;
                continue;
            }
            let err_name = method.results.last().map(|p| p.name.as_str()).unwrap_or("err");
            let signature = method_signature(method, &types, &mut file);
            writeln!(file, "func ({} {}) {} {{", RECEIVER, wrapper.type_name, signature)?;
            writeln!(file, "\tdefer func() {{")?;
            writeln!(file, "\t\tif {} != nil {{", err_name)?;
            writeln!(
                file,
                "\t\t\t{}.logger.Log(\"method\", \"{}\", \"message\", {})",
                RECEIVER, method.name, err_name
            )?;
            writeln!(file, "\t\t}}")?;
            writeln!(file, "\t}}()")?;
            writeln!(file, "\t{}", forward_call(&format!("{}.next", RECEIVER), method, &types))?;
            writeln!(file, "}}")?;
        }
        Ok(finish(&file))
    }
}

/// Renders `service/recovering.microgen.go`
pub struct RecoveringGenerator;

impl ArtifactGenerator for RecoveringGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let wrapper = Wrapper {
            constructor: "RecoveringMiddleware",
            doc: "recovers panics from method calls, writes to provided logger and returns \
                  the error of panic as method error.",
            type_name: "recoveringMiddleware",
        };
        let mut file = service_file(ctx, "service");
        let types = service_types(ctx);
        wrapper.write_header(&mut file, ctx)?;

        for method in &ctx.interface.methods {
            writeln!(file)?;
            if ctx.mode_of(method) != GenerationMode::Default {
                wrapper.write_forward(&mut file, &types, method)?;
                continue;
            }
            let err_name = method.results.last().map(|p| p.name.as_str()).unwrap_or("err");
            let fmt = file.import("fmt");
            let signature = method_signature(method, &types, &mut file);
            writeln!(file, "func ({} {}) {} {{", RECEIVER, wrapper.type_name, signature)?;
            writeln!(file, "\tdefer func() {{")?;
            writeln!(file, "\t\tif r := recover(); r != nil {{")?;
            writeln!(
                file,
                "\t\t\t{}.logger.Log(\"method\", \"{}\", \"message\", r)",
                RECEIVER, method.name
            )?;
            writeln!(file, "\t\t\t{} = {}.Errorf(\"%v\", r)", err_name, fmt)?;
            writeln!(file, "\t\t}}")?;
            writeln!(file, "\t}}()")?;
            writeln!(file, "\t{}", forward_call(&format!("{}.next", RECEIVER), method, &types))?;
            writeln!(file, "}}")?;
        }
        Ok(finish(&file))
    }
}

/// Constructor, struct and forwarding methods shared by the wrappers
struct Wrapper {
    constructor: &'static str,
    doc: &'static str,
    type_name: &'static str,
}

impl Wrapper {
    fn write_header(
        &self,
        file: &mut GoFile,
        ctx: &GenerationContext,
    ) -> Result<(), PipelineError> {
        let service = file.qual(ctx.service_import(), ctx.service_name());
        let logger = file.qual(KIT_LOG, "Logger");

        writeln!(file, "// {} {}", self.constructor, self.doc)?;
        writeln!(file, "func {}(logger {}) Middleware {{", self.constructor, logger)?;
        writeln!(file, "\treturn func(next {}) {} {{", service, service)?;
        writeln!(file, "\t\treturn &{}{{", self.type_name)?;
        let pairs = vec![
            ("logger".to_string(), "logger".to_string()),
            ("next".to_string(), "next".to_string()),
        ];
        write_key_values(file, "\t\t\t", &pairs)?;
        writeln!(file, "\t\t}}\n\t}}\n}}\n")?;

        writeln!(file, "type {} struct {{", self.type_name)?;
        let fields = vec![
            ("logger".to_string(), logger, String::new()),
            ("next".to_string(), service, String::new()),
        ];
        write_fields(file, "\t", &fields)?;
        writeln!(file, "}}")?;
        Ok(())
    }

    fn write_forward(
        &self,
        file: &mut GoFile,
        types: &TypeRenderer<'_>,
        method: &MethodDecl,
    ) -> Result<(), PipelineError> {
        let signature = method_signature(method, types, file);
        writeln!(file, "func ({} {}) {} {{", RECEIVER, self.type_name, signature)?;
        writeln!(file, "\t{}", forward_call(&format!("{}.next", RECEIVER), method, types))?;
        writeln!(file, "}}")?;
        Ok(())
    }
}

/// Struct printed by the logging middleware in place of raw parameters
struct LogExchange<'m> {
    name: String,
    fields: Vec<LogField<'m>>,
}

struct LogField<'m> {
    param: &'m ir::Parameter,
    by_len: bool,
}

impl<'m> LogField<'m> {
    fn field_name(&self) -> String {
        if self.by_len {
            format!("Len{}", exchange_field(self.param))
        } else {
            exchange_field(self.param)
        }
    }
}

impl<'m> LogExchange<'m> {
    fn new(
        name: String,
        params: &'m [ir::Parameter],
        ignore: &[String],
        by_len: &[String],
    ) -> Self {
        let fields = params
            .iter()
            .filter(|p| !ignore.contains(&p.name))
            .map(|param| LogField { param, by_len: by_len.contains(&param.name) })
            .collect();
        Self { name, fields }
    }

    fn literal(&self) -> String {
        let values: Vec<_> = self
            .fields
            .iter()
            .map(|f| {
                if f.by_len {
                    format!("{}: len({})", f.field_name(), f.param.name)
                } else {
                    format!("{}: {}", f.field_name(), f.param.name)
                }
            })
            .collect();
        format!("{}{{{}}}", self.name, values.join(", "))
    }

    fn write_declaration(
        &self,
        file: &mut GoFile,
        types: &TypeRenderer<'_>,
    ) -> Result<(), PipelineError> {
        if self.fields.is_empty() {
            writeln!(file, "\t{} struct{{}}", self.name)?;
            return Ok(());
        }
        let fields: Vec<_> = self
            .fields
            .iter()
            .map(|f| {
                let ty = if f.by_len {
                    "int".to_string()
                } else {
                    types.field_type(&f.param.ty, file)
                };
                (f.field_name(), ty, String::new())
            })
            .collect();
        writeln!(file, "\t{} struct {{", self.name)?;
        write_fields(file, "\t\t", &fields)?;
        writeln!(file, "\t}}")?;
        Ok(())
    }
}
