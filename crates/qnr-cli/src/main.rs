//! Questionnaire deliverable toolkit CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use qnr_cli::logging::{LogConfig, LogFormat, init_logging};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_build, run_clean, run_fields, run_inspect, run_verify};
use crate::summary::{print_build, print_cleaning, print_fields, print_inspection, print_verification};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let config = cli.config.as_ref();
    let exit_code = match &cli.command {
        Command::Fields(args) => match run_fields(args) {
            Ok(plan) => {
                print_fields(&plan);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Inspect(args) => match run_inspect(args) {
            Ok(report) => {
                if args.json {
                    print_json(&report);
                } else {
                    print_inspection(&report);
                }
                if report.overall_status().is_failed() { 1 } else { 0 }
            }
            Err(error) => report_error(&error),
        },
        Command::Clean(args) => match run_clean(args) {
            Ok(stats) => {
                print_cleaning(&stats);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Verify(args) => match run_verify(args, config) {
            Ok(report) => {
                if args.json {
                    print_json(&report);
                } else {
                    print_verification(&report);
                }
                if report.has_failures() { 1 } else { 0 }
            }
            Err(error) => report_error(&error),
        },
        Command::Build(args) => match run_build(args, config) {
            Ok(result) => {
                print_build(&result, args.dry_run);
                0
            }
            Err(error) => report_error(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(error) => eprintln!("error: serialize report: {error}"),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
