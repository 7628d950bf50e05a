use serde::Serialize;

use contract_core::radio::selected_option;

use crate::output::{cell, json_output, table_output};
use crate::{reject_extra_args, CommandOutput, Context};

pub const USAGE: &str = "\
List option groups with their members and the stored selection.

Usage:
  contract-inspect --template PATH [--data PATH] groups [--json]";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupRow<'a> {
    group_key: &'a str,
    members: Vec<&'a str>,
    selected: Option<&'a str>,
    required: bool,
}

pub fn run(ctx: &Context, args: &[&str]) -> CommandOutput {
    if let Err(out) = reject_extra_args(args) {
        return out;
    }
    let groups: Vec<GroupRow<'_>> = ctx
        .engine
        .index()
        .groups()
        .iter()
        .map(|g| GroupRow {
            group_key: &g.key,
            members: g.member_names().collect(),
            selected: selected_option(g, &ctx.data).map(|m| m.name.as_str()),
            required: g.is_required(),
        })
        .collect();

    if ctx.json {
        return json_output(ctx, &groups);
    }
    if groups.is_empty() {
        return CommandOutput::ok("No option groups found\n".to_string());
    }

    let rows: Vec<String> = groups
        .iter()
        .map(|g| {
            format!(
                "{}\t{}\t{}\t{}",
                g.group_key,
                g.members.join(", "),
                cell(g.selected),
                if g.required { "yes" } else { "no" },
            )
        })
        .collect();
    table_output("GROUP\tMEMBERS\tSELECTED\tREQUIRED", &rows, None)
}
