// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod print;
mod runtime;

use anyhow::{Context, Result, anyhow};
use castlist_app::{SortKey, TableController};
use castlist_source::{Loader, Source};
use config::Config;
use logging::LogTarget;
use print::{PrintFormat, ViewOptions};
use runtime::SourceRuntime;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `castlist --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let source = if options.demo {
        Source::Bundled
    } else if let Some(raw) = &options.source {
        Source::parse(raw).context("invalid --source")?
    } else {
        config.source()?
    };
    if options.print_source {
        println!("{source}");
        return Ok(());
    }

    logging::init(&log_target(&options, &config)?, config.log_level())?;
    tracing::info!(
        config = %options.config_path.display(),
        %source,
        "config resolved"
    );

    let loader = Loader::new()?;
    if options.check_only {
        let entries = loader.load(&source).with_context(|| {
            format!(
                "load dataset from {source} -- if this location is wrong, set [data].source or pass --source"
            )
        })?;
        println!("ok: {} entries from {source}", entries.len());
        return Ok(());
    }

    let mut controller = TableController::default();
    options.view.apply(&mut controller)?;

    if let Some(format) = options.print {
        let result = loader
            .load(&source)
            .map_err(|error| source.load_failure(&error));
        controller.finish_load(result);
        return print::print_view(&controller, format);
    }

    let mut runtime = SourceRuntime::new(loader, source);
    castlist_tui::run_app(&mut controller, &mut runtime)
}

/// The print harness owns stdout and must not depend on a writable data dir.
fn log_target(options: &CliOptions, config: &Config) -> Result<LogTarget> {
    if options.print.is_some() {
        return Ok(LogTarget::Stderr);
    }
    Ok(LogTarget::File(config.log_file()?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    source: Option<String>,
    print_config_path: bool,
    print_source: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    print: Option<PrintFormat>,
    view: ViewOptions,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        source: None,
        print_config_path: false,
        print_source: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        print: None,
        view: ViewOptions::default(),
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--source" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--source requires a path or http(s) URL"))?;
                options.source = Some(value.as_ref().to_owned());
            }
            "--print" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--print requires one of text, html, json"))?;
                options.print = Some(PrintFormat::parse(value.as_ref())?);
            }
            "--query" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--query requires a search text"))?;
                options.view.query = Some(value.as_ref().to_owned());
            }
            "--season" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--season requires S## or \"\""))?;
                options.view.season = Some(value.as_ref().to_owned());
            }
            "--sort" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow!("--sort requires one of character, actor, first, last, end")
                })?;
                let key = SortKey::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown sort key {:?}; use one of character, actor, first, last, end",
                        value.as_ref()
                    )
                })?;
                options.view.sorts.push(key);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-source" => {
                options.print_source = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("castlist");
    println!("  --config <path>          Use a specific config path");
    println!("  --source <path|url>      Load the dataset from this path or http(s) URL");
    println!("  --demo                   Use the bundled demo dataset");
    println!("  --check                  Validate config and load the dataset once");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-source           Print resolved dataset source");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --print <text|html|json> Print the view to stdout instead of opening the TUI");
    println!("  --query <text>           Initial search text");
    println!("  --season <S##|\"\">        Initial season filter");
    println!("  --sort <key>             Activate a column header; repeat to flip direction");
    println!("  --help                   Show this help");
}
