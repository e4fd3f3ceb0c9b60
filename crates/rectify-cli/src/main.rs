// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use rectify_app::{FormState, SearchStatus, Session, TowerWingTable};
use rectify_client::Client;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "RECTIFY_LOG";

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
            "load config {}; run `rectify --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let log_target = if options.check_only || options.lookup.is_some() {
        LogTarget::Stderr
    } else {
        LogTarget::File(config.log_file()?)
    };
    init_logging(config.log_level(), &log_target)?;

    let client = Client::new(&config.endpoint_url(), config.endpoint_timeout()?).with_context(
        || {
            format!(
                "invalid [endpoint] config in {}; fix url/timeout values",
                options.config_path.display()
            )
        },
    )?;
    info!(url = client.url(), "endpoint configured");
    if options.check_only {
        return Ok(());
    }

    let session = Session::new(TowerWingTable::standard(), config.submission_tags());
    if let Some(booking_id) = options.lookup {
        return run_lookup(session, &client, &booking_id);
    }

    let mut session = session;
    rectify_tui::run_app(&mut session, client)
}

fn run_lookup(mut session: Session, client: &Client, booking_id: &str) -> Result<()> {
    session.set_booking_id(booking_id);
    let booking_id = session
        .begin_search()
        .ok_or_else(|| anyhow!("--lookup requires a non-empty booking id"))?;
    let outcome = client
        .lookup(&booking_id)
        .with_context(|| format!("look up booking {booking_id}"))?;

    match session.finish_search(&booking_id, Ok(outcome)) {
        SearchStatus::Found => {
            print!("{}", render_form(session.primary()));
            Ok(())
        }
        status => bail!("{}: {booking_id}", status.text()),
    }
}

fn render_form(form: &FormState) -> String {
    form.specs()
        .iter()
        .map(|spec| {
            let value = form.value(spec.name).unwrap_or_default();
            format!("{:<15} {value}\n", spec.label)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
}

fn init_logging(level: &str, target: &LogTarget) -> Result<()> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level {level:?}"))?,
    };

    let installed = match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    lookup: Option<String>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        lookup: None,
        show_help: false,
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
            "--lookup" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--lookup requires a booking id"))?;
                options.lookup = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options");
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("rectify");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and endpoint settings");
    println!("  --lookup <id>            Fetch one booking and print the filled form");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args, render_form, run_lookup};
    use anyhow::Result;
    use rectify_app::{
        FormSide, FormState, SubmissionTags, TowerWingTable, Session, UNIT,
    };
    use rectify_client::Client;
    use std::path::PathBuf;
    use std::time::Duration;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/rectify-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                lookup: None,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_lookup_id() -> Result<()> {
        let options = parse_cli_args(vec!["--lookup", "BK-1042"], default_options_path())?;
        assert_eq!(options.lookup.as_deref(), Some("BK-1042"));

        let error = parse_cli_args(vec!["--lookup"], default_options_path())
            .expect_err("missing lookup value should fail");
        assert!(error.to_string().contains("--lookup requires a booking id"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        assert!(parse_cli_args(vec!["--help"], default_options_path())?.show_help);
        assert!(parse_cli_args(vec!["-h"], default_options_path())?.show_help);
        Ok(())
    }

    #[test]
    fn render_form_lists_every_field_in_order() {
        let mut form = FormState::new(FormSide::Primary);
        form.set_value(UNIT, "C-1204");
        let rendered = render_form(&form);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), FormSide::Primary.fields().len());
        assert!(lines[0].starts_with("Applicant name"));
        assert_eq!(lines[3].split_whitespace().collect::<Vec<_>>(), ["Unit", "C-1204"]);
    }

    #[test]
    fn lookup_rejects_blank_booking_id() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1/exec", Duration::from_millis(50))?;
        let session = Session::new(TowerWingTable::standard(), SubmissionTags::default());
        let error = run_lookup(session, &client, "   ").expect_err("blank id should fail");
        assert!(error.to_string().contains("non-empty booking id"));
        Ok(())
    }
}
