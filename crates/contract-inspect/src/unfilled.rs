use crate::output::{json_output, table_output};
use crate::{reject_extra_args, CommandOutput, Context};

pub const USAGE: &str = "\
List required entries that are still empty, ordered by page then vertical
position. Each option group counts once.

Usage:
  contract-inspect --template PATH [--data PATH] unfilled [--json]";

pub fn run(ctx: &Context, args: &[&str]) -> CommandOutput {
    if let Err(out) = reject_extra_args(args) {
        return out;
    }
    let report = ctx.engine.unfilled(&ctx.data);
    if ctx.json {
        return json_output(ctx, &report);
    }

    let footer = format!(
        "filled {}/{} ({}%)",
        report.filled_count,
        report.total_required,
        report.progress_percent()
    );
    if report.is_complete() {
        return CommandOutput::ok(format!("All required fields are filled\n{footer}\n"));
    }

    let rows: Vec<String> = report
        .unfilled_fields
        .iter()
        .map(|e| format!("{}\t{}\t{}\t{}", e.page, e.name, e.label, e.field_type.as_str()))
        .collect();
    table_output("PAGE\tNAME\tLABEL\tTYPE", &rows, Some(footer))
}
