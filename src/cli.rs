use std::fs;

use tokio::runtime::{Builder, Runtime};

use crate::battle::{analyze_battle, parse_battle_log_json, report_to_json, BattleLog};
use crate::config::AnalyzerConfig;
use crate::names::{resolve_actor_names, CharacterCatalog, FileNameResolver};
use crate::server;

const USAGE: &str = "usage: combat_digest <analyze|serve|names>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Analyze,
    Serve,
    Names,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("analyze") => Some(Command::Analyze),
        Some("serve") => Some(Command::Serve),
        Some("names") => Some(Command::Names),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let config = AnalyzerConfig::from_env();
    match parse_command(args) {
        Some(Command::Analyze) => handle_analyze(args, &config),
        Some(Command::Serve) => handle_serve(&config),
        Some(Command::Names) => handle_names(args, &config),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_serve(config: &AnalyzerConfig) -> i32 {
    match server::run_server(config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn load_log(path: &str) -> Result<BattleLog, String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("failed to read '{path}': {err}"))?;
    parse_battle_log_json(&raw).map_err(|err| format!("failed to parse '{path}': {err}"))
}

fn runtime() -> Result<Runtime, String> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("failed to start runtime: {err}"))
}

fn handle_analyze(args: &[String], config: &AnalyzerConfig) -> i32 {
    let Some(path) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: combat_digest analyze <battle.json> [--compact]");
        return 2;
    };
    let compact = args.iter().skip(3).any(|arg| arg == "--compact");

    let (log, runtime) = match load_log(path).and_then(|log| Ok((log, runtime()?))) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let resolver = FileNameResolver::new(&config.names_path);
    let catalog = CharacterCatalog::load_or_empty(&config.catalog_path);
    let report = runtime.block_on(analyze_battle(&log, &resolver, &catalog, config.locale));

    let rendered = report_to_json(&report).and_then(|document| {
        if compact {
            serde_json::to_string(&document)
        } else {
            serde_json::to_string_pretty(&document)
        }
    });
    match rendered {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize report: {err}");
            1
        }
    }
}

fn handle_names(args: &[String], config: &AnalyzerConfig) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: combat_digest names <battle.json>");
        return 2;
    };

    let (log, runtime) = match load_log(path).and_then(|log| Ok((log, runtime()?))) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let resolver = FileNameResolver::new(&config.names_path);
    let names = runtime.block_on(resolve_actor_names(
        &resolver,
        &log.avatar_ids(),
        &log.character_name_map,
    ));
    match serde_json::to_string_pretty(names.as_map()) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize names: {err}");
            1
        }
    }
}
