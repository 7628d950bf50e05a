//! contract-inspect: command-line harness over the contract form engine.
//!
//! Loads a template (and optionally a data record) from disk and prints what
//! the engine derives from them: the field index, option groups, render
//! sections, widget inputs, unfilled entries, the patch for an edit and the
//! navigator's visit order.

use std::sync::OnceLock;

use contract_core::{ContractData, ContractEngine};

use crate::config::ConfigEnv;

pub mod config;
pub mod fields;
pub mod groups;
pub mod inputs;
pub mod logging;
pub mod output;
pub mod render;
pub mod unfilled;
pub mod update;
pub mod walk;

/// Stable crate label used by smoke tests.
pub fn crate_label() -> &'static str {
    "contract-inspect"
}

static VERSION: OnceLock<String> = OnceLock::new();

/// Set the version string for `--version` output.
pub fn set_version(version: &str) {
    let _ = VERSION.set(version.to_string());
}

fn get_version() -> &'static str {
    VERSION.get().map(|s| s.as_str()).unwrap_or("dev")
}

pub fn help_text() -> String {
    "\
contract-inspect shows what the contract form engine derives from a template.

Usage:
  contract-inspect --template PATH [--data PATH] [command]

Available Commands:
  fields      List indexed fields
  groups      List option groups and their current selection
  inputs      Show per-field widget input values
  render      Show render sections (use --page N for one page)
  unfilled    List required entries that are still empty
  update      Compute the patch for one edit (--field NAME --value V | --clear)
  walk        Show the unfilled-field visit order

Flags:
      --config PATH     config file (default $XDG_CONFIG_HOME/contract-engine/config.yaml)
      --data PATH       contract data JSON (default: empty record)
  -h, --help            help for contract-inspect
      --json            machine-readable output
      --template PATH   template JSON (required)
  -v, --version         version for contract-inspect

Use \"contract-inspect [command] --help\" for more information about a command.\n"
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub(crate) fn ok(stdout: String) -> Self {
        Self {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub(crate) fn fail(exit_code: i32, message: &str) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("{message}\n"),
            exit_code,
        }
    }
}

/// Everything a command needs: the indexed template, the record and how to
/// format output.
#[derive(Debug)]
pub struct Context {
    pub engine: ContractEngine,
    pub data: ContractData,
    pub json: bool,
    pub pretty: bool,
}

#[derive(Debug, Default)]
struct GlobalArgs<'a> {
    template: Option<&'a str>,
    data: Option<&'a str>,
    config: Option<&'a str>,
    json: bool,
    help: bool,
    version: bool,
    rest: Vec<&'a str>,
}

fn parse_global_args<'a>(args: &[&'a str]) -> Result<GlobalArgs<'a>, String> {
    let mut parsed = GlobalArgs::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i];
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (arg, None),
        };
        let slot = match flag {
            "--template" => Some(&mut parsed.template),
            "--data" => Some(&mut parsed.data),
            "--config" => Some(&mut parsed.config),
            _ => None,
        };
        if let Some(slot) = slot {
            let value = match inline {
                Some(value) => value,
                None => {
                    i += 1;
                    match args.get(i) {
                        Some(value) => *value,
                        None => return Err(format!("flag needs an argument: {flag}")),
                    }
                }
            };
            *slot = Some(value);
            i += 1;
            continue;
        }
        match arg {
            "--json" => parsed.json = true,
            "-h" | "--help" => parsed.help = true,
            "-v" | "--version" => parsed.version = true,
            "" => {}
            other => parsed.rest.push(other),
        }
        i += 1;
    }
    Ok(parsed)
}

/// Run with no process environment: no default config file and no
/// `CONTRACT_ENGINE_LOG` override.
pub fn run_cli_for_test(args: &[&str]) -> CommandOutput {
    dispatch(args, &ConfigEnv::default(), false)
}

pub fn run_cli_with_env_for_test(args: &[&str], env: &ConfigEnv) -> CommandOutput {
    dispatch(args, env, false)
}

/// Entry point for the binary: also installs the log subscriber.
pub fn run_cli(args: &[String]) -> CommandOutput {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    dispatch(&args, &ConfigEnv::from_process(), true)
}

fn dispatch(args: &[&str], env: &ConfigEnv, init_logging: bool) -> CommandOutput {
    let global = match parse_global_args(args) {
        Ok(global) => global,
        Err(err) => return CommandOutput::fail(2, &err),
    };

    if global.version {
        return CommandOutput::ok(format!("contract-inspect version {}\n", get_version()));
    }

    let Some((cmd, rest)) = global.rest.split_first() else {
        return CommandOutput::ok(help_text());
    };
    if *cmd == "help" {
        return CommandOutput::ok(help_text());
    }
    let usage = match command_usage(cmd) {
        Some(usage) => usage,
        None => return CommandOutput::fail(2, &format!("unknown command {cmd:?} for \"contract-inspect\"")),
    };
    if global.help {
        return CommandOutput::ok(format!("{usage}\n"));
    }
    let Some(template_path) = global.template.map(str::trim).filter(|p| !p.is_empty()) else {
        return CommandOutput::fail(2, "required flag \"--template\" not set");
    };

    let (cfg, _) = match config::load_config(global.config, env) {
        Ok(loaded) => loaded,
        Err(err) => return CommandOutput::fail(1, &err),
    };
    if init_logging {
        logging::init(&cfg.logging);
    }

    let ctx = match load_context(template_path, &global, cfg.output.pretty) {
        Ok(ctx) => ctx,
        Err(err) => return CommandOutput::fail(1, &err),
    };

    match *cmd {
        "fields" => fields::run(&ctx, rest),
        "groups" => groups::run(&ctx, rest),
        "inputs" => inputs::run(&ctx, rest),
        "render" => render::run(&ctx, rest),
        "unfilled" => unfilled::run(&ctx, rest),
        "update" => update::run(&ctx, rest),
        "walk" => walk::run(&ctx, rest),
        _ => CommandOutput::fail(2, &format!("unknown command {cmd:?} for \"contract-inspect\"")),
    }
}

fn command_usage(cmd: &str) -> Option<&'static str> {
    Some(match cmd {
        "fields" => fields::USAGE,
        "groups" => groups::USAGE,
        "inputs" => inputs::USAGE,
        "render" => render::USAGE,
        "unfilled" => unfilled::USAGE,
        "update" => update::USAGE,
        "walk" => walk::USAGE,
        _ => return None,
    })
}

fn load_context(
    template_path: &str,
    global: &GlobalArgs<'_>,
    pretty: bool,
) -> Result<Context, String> {
    let text = std::fs::read_to_string(template_path)
        .map_err(|err| format!("read template {template_path}: {err}"))?;
    let engine = ContractEngine::from_json_str(&text)
        .map_err(|err| format!("load template {template_path}: {err}"))?;

    let data = match global.data.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| format!("read data {path}: {err}"))?;
            ContractData::from_json_str(&text)
                .map_err(|err| format!("load data {path}: {err}"))?
        }
        None => ContractData::new(),
    };

    tracing::debug!(
        template = template_path,
        fields = engine.index().fields().len(),
        values = data.len(),
        "loaded contract"
    );

    Ok(Context {
        engine,
        data,
        json: global.json,
        pretty,
    })
}

/// Reject any argument a command does not take.
pub(crate) fn reject_extra_args(args: &[&str]) -> Result<(), CommandOutput> {
    match args.first() {
        None => Ok(()),
        Some(arg) if arg.starts_with('-') => {
            Err(CommandOutput::fail(2, &format!("unknown flag: {arg}")))
        }
        Some(_) => Err(CommandOutput::fail(
            2,
            &format!("accepts 0 arg(s), received {}", args.len()),
        )),
    }
}
