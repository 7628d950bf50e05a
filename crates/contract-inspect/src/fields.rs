use crate::output::{cell, json_output, table_output};
use crate::{reject_extra_args, CommandOutput, Context};

pub const USAGE: &str = "\
List indexed fields in page order. Signature fields and duplicate names are
not indexed.

Usage:
  contract-inspect --template PATH fields [--json]";

pub fn run(ctx: &Context, args: &[&str]) -> CommandOutput {
    if let Err(out) = reject_extra_args(args) {
        return out;
    }
    let fields = ctx.engine.index().fields();
    if ctx.json {
        return json_output(ctx, fields);
    }
    if fields.is_empty() {
        return CommandOutput::ok("No fields found\n".to_string());
    }

    let rows: Vec<String> = fields
        .iter()
        .map(|f| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                f.page,
                f.field_type.as_str(),
                f.name,
                cell(f.group.as_deref()),
                if f.required { "yes" } else { "no" },
            )
        })
        .collect();
    table_output("PAGE\tTYPE\tNAME\tGROUP\tREQUIRED", &rows, None)
}
