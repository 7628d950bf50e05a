use contract_core::RenderItem;
use tracing::warn;

use crate::output::{json_output, table};
use crate::{CommandOutput, Context};

pub const USAGE: &str = "\
Show render sections: fields grouped by family, option groups collapsed into
one item and checkboxes paired with their descriptions.

Usage:
  contract-inspect --template PATH [--data PATH] render [--page N] [--json]";

fn parse_render_args(args: &[&str]) -> Result<Option<u32>, (i32, String)> {
    let mut page = None;
    let mut i = 0;
    while i < args.len() {
        let (flag, inline) = match args[i].split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (args[i], None),
        };
        match flag {
            "--page" => {
                let raw = match inline {
                    Some(value) => value,
                    None => {
                        i += 1;
                        match args.get(i) {
                            Some(value) => *value,
                            None => return Err((2, "flag needs an argument: --page".to_string())),
                        }
                    }
                };
                match raw.trim().parse::<u32>() {
                    Ok(n) if n >= 1 => page = Some(n),
                    _ => return Err((2, format!("invalid --page {raw:?}: must be a page number starting at 1"))),
                }
            }
            other if other.starts_with('-') => return Err((2, format!("unknown flag: {other}"))),
            other => return Err((2, format!("unexpected argument: {other}"))),
        }
        i += 1;
    }
    Ok(page)
}

pub fn run(ctx: &Context, args: &[&str]) -> CommandOutput {
    let page = match parse_render_args(args) {
        Ok(page) => page,
        Err((code, msg)) => return CommandOutput::fail(code, &msg),
    };

    let model = ctx.engine.render_model(&ctx.data, page);
    for name in &model.unresolved {
        warn!(field = %name, "no option group governs this description field; it stays hidden");
    }

    if ctx.json {
        return json_output(ctx, &model);
    }
    if model.sections.is_empty() {
        return CommandOutput::ok("No fields to render\n".to_string());
    }

    let mut text = String::new();
    for section in &model.sections {
        let rows: Vec<String> = section.items.iter().flat_map(item_rows).collect();
        match table("KIND\tLABEL\tFIELD", &rows) {
            Ok(rendered) => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&format!("## {}\n", section.title));
                text.push_str(&rendered);
            }
            Err(err) => return CommandOutput::fail(1, &err),
        }
    }
    CommandOutput::ok(text)
}

fn item_rows(item: &RenderItem) -> Vec<String> {
    match item {
        RenderItem::Single { field, label } => vec![format!("single\t{label}\t{}", field.name)],
        RenderItem::GroupedOption {
            group_key,
            label,
            options,
        } => {
            let mut rows = vec![format!("group\t{label}\t{group_key}")];
            rows.extend(
                options
                    .iter()
                    .map(|o| format!("  option\t{}\t{}", o.label, o.field.name)),
            );
            rows
        }
        RenderItem::PairedCheckbox {
            checkbox,
            description,
            label,
        } => vec![
            format!("checkbox\t{label}\t{}", checkbox.name),
            format!("  description\t\t{}", description.name),
        ],
    }
}
