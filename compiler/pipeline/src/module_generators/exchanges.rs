//! Request and response wrappers of every exchange method

use std::fmt::Write as _;

use codegen::GoFile;
use ir::Parameter;

use super::{
    exchange_field, finish, request_type, response_type, service_file, service_types,
    write_fields, ArtifactGenerator,
};
use crate::generation_context::GenerationContext;
use crate::PipelineError;

/// Renders `transport/exchanges.microgen.go`
pub struct ExchangesGenerator;

impl ArtifactGenerator for ExchangesGenerator {
    fn render(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        let mut file = service_file(ctx, "transport");
        let methods: Vec<_> = ctx.default_methods().collect();
        if methods.is_empty() {
            return Ok(String::new());
        }

        writeln!(file, "type (")?;
        for method in methods {
            write_exchange(&mut file, ctx, &request_type(method), method.args_without_context())?;
            write_exchange(
                &mut file,
                ctx,
                &response_type(method),
                method.results_without_error(),
            )?;
        }
        writeln!(file, ")")?;
        Ok(finish(&file))
    }
}

fn write_exchange(
    file: &mut GoFile,
    ctx: &GenerationContext,
    name: &str,
    params: &[Parameter],
) -> Result<(), PipelineError> {
    if params.is_empty() {
        writeln!(file, "\t// Formal exchange type, please do not delete.")?;
        writeln!(file, "\t{} struct{{}}", name)?;
        return Ok(());
    }
    let types = service_types(ctx);
    let fields: Vec<_> = params
        .iter()
        .map(|p| {
            let ty = types.field_type(&p.ty, file);
            (exchange_field(p), ty, format!("`json:\"{}\"`", p.name))
        })
        .collect();
    writeln!(file, "\t{} struct {{", name)?;
    write_fields(file, "\t\t", &fields)?;
    writeln!(file, "\t}}")?;
    Ok(())
}
