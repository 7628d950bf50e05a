use contract_core::PatchOp;

use crate::output::{cell, json_output, table};
use crate::{CommandOutput, Context};

pub const USAGE: &str = "\
Compute the patch an edit produces and the record after merging it. Nothing
is written back to disk.

Usage:
  contract-inspect --template PATH [--data PATH] update --field NAME (--value V | --clear) [--json]";

#[derive(Debug, PartialEq, Eq)]
struct UpdateArgs<'a> {
    field: &'a str,
    value: Option<&'a str>,
}

fn parse_update_args<'a>(args: &[&'a str]) -> Result<UpdateArgs<'a>, (i32, String)> {
    let mut field = None;
    let mut value = None;
    let mut clear = false;

    let mut i = 0;
    while i < args.len() {
        let (flag, inline) = match args[i].split_once('=') {
            Some((flag, v)) if flag.starts_with("--") => (flag, Some(v)),
            _ => (args[i], None),
        };
        match flag {
            "--field" | "--value" => {
                let v = match inline {
                    Some(v) => v,
                    None => {
                        i += 1;
                        match args.get(i) {
                            Some(v) => *v,
                            None => return Err((2, format!("flag needs an argument: {flag}"))),
                        }
                    }
                };
                if flag == "--field" {
                    field = Some(v);
                } else {
                    value = Some(v);
                }
            }
            "--clear" => clear = true,
            other if other.starts_with('-') => return Err((2, format!("unknown flag: {other}"))),
            other => return Err((2, format!("unexpected argument: {other}"))),
        }
        i += 1;
    }

    let Some(field) = field.map(str::trim).filter(|f| !f.is_empty()) else {
        return Err((2, "required flag \"--field\" not set".to_string()));
    };
    match (value, clear) {
        (Some(_), true) => Err((2, "--value and --clear are mutually exclusive".to_string())),
        (None, false) => Err((2, "one of --value or --clear is required".to_string())),
        (value, _) => Ok(UpdateArgs { field, value }),
    }
}

pub fn run(ctx: &Context, args: &[&str]) -> CommandOutput {
    let parsed = match parse_update_args(args) {
        Ok(parsed) => parsed,
        Err((code, msg)) => return CommandOutput::fail(code, &msg),
    };

    let patch = ctx.engine.update(&ctx.data, parsed.field, parsed.value);
    let record = ctx.data.merged(&patch);

    if ctx.json {
        let payload = serde_json::json!({
            "patch": patch.to_value(),
            "record": record.to_value(),
        });
        return json_output(ctx, &payload);
    }

    let mut text = String::new();
    if patch.is_empty() {
        text.push_str("No change\n");
    } else {
        let rows: Vec<String> = patch
            .iter()
            .map(|(key, op)| match op {
                PatchOp::Set(v) => format!("{key}\tset\t{}", cell(Some(v.as_str()))),
                PatchOp::Clear => format!("{key}\tclear\t-"),
            })
            .collect();
        match table("KEY\tOP\tVALUE", &rows) {
            Ok(rendered) => text.push_str(&rendered),
            Err(err) => return CommandOutput::fail(1, &err),
        }
    }

    text.push('\n');
    if record.is_empty() {
        text.push_str("Record is empty\n");
    } else {
        let rows: Vec<String> = record
            .iter()
            .map(|(key, v)| format!("{key}\t{}", cell(Some(v))))
            .collect();
        match table("RECORD KEY\tVALUE", &rows) {
            Ok(rendered) => text.push_str(&rendered),
            Err(err) => return CommandOutput::fail(1, &err),
        }
    }
    CommandOutput::ok(text)
}
