use crate::output::{cell, json_output, table_output};
use crate::{reject_extra_args, CommandOutput, Context};

pub const USAGE: &str = "\
Show the value each field's widget receives. Grouped options show their own
name when selected and an empty value otherwise.

Usage:
  contract-inspect --template PATH [--data PATH] inputs [--json]";

pub fn run(ctx: &Context, args: &[&str]) -> CommandOutput {
    if let Err(out) = reject_extra_args(args) {
        return out;
    }
    let inputs = ctx.engine.widget_inputs(&ctx.data);
    if ctx.json {
        return json_output(ctx, &inputs);
    }
    if inputs.is_empty() {
        return CommandOutput::ok("No fields found\n".to_string());
    }

    // Index order, not key order, so rows line up with the template.
    let rows: Vec<String> = ctx
        .engine
        .index()
        .fields()
        .iter()
        .map(|f| format!("{}\t{}", f.name, cell(inputs.get(&f.name).map(String::as_str))))
        .collect();
    table_output("FIELD\tVALUE", &rows, None)
}
