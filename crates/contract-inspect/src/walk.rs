use serde::Serialize;

use crate::output::{json_output, table_output};
use crate::{reject_extra_args, CommandOutput, Context};

pub const USAGE: &str = "\
Step the field navigator from the first unfilled entry until it wraps.

Usage:
  contract-inspect --template PATH [--data PATH] walk [--json]";

#[derive(Debug, Serialize)]
struct Step {
    position: usize,
    total: usize,
    name: String,
    label: String,
    page: u32,
}

pub fn run(ctx: &Context, args: &[&str]) -> CommandOutput {
    if let Err(out) = reject_extra_args(args) {
        return out;
    }
    let mut nav = ctx.engine.navigator(&ctx.data);
    let mut steps = Vec::new();
    let total = nav.entries().len();
    for _ in 0..total {
        if let (Some(entry), Some((position, total))) = (nav.current(), nav.position()) {
            steps.push(Step {
                position,
                total,
                name: entry.name.clone(),
                label: entry.label.clone(),
                page: entry.page,
            });
        }
        nav.go_next();
    }

    if ctx.json {
        return json_output(ctx, &steps);
    }
    if steps.is_empty() {
        return CommandOutput::ok("Nothing to visit: all required fields are filled\n".to_string());
    }
    let rows: Vec<String> = steps
        .iter()
        .map(|s| format!("{}/{}\t{}\t{}\t{}", s.position, s.total, s.name, s.label, s.page))
        .collect();
    table_output("STEP\tNAME\tLABEL\tPAGE", &rows, None)
}
