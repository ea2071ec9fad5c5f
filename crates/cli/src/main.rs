// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use cinevault_config::{Config, ConfigManager, LogLevel, Overrides};
use cinevault_content_sources::{OmdbOptions, OmdbSource};
use cinevault_library::{LibraryController, LibraryStore};
use cinevault_resilience::RetryPolicy;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod notice;

fn build_cli() -> Command {
    Command::new("cinevault")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Personal movie library kept in a plain JSON file")
        .arg(
            Arg::new("vault")
                .long("vault")
                .value_name("DIR")
                .help("Vault directory holding library files (overrides config)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(Command::new("init").about("Create a new library file and link it"))
        .subcommand(
            Command::new("link")
                .about("Link an existing library file")
                .arg(Arg::new("path").required(true).value_name("PATH").help("Library file, relative to the vault or absolute")),
        )
        .subcommand(Command::new("unlink").about("Forget the linked library (the file is kept)"))
        .subcommand(Command::new("files").about("List JSON files in the vault"))
        .subcommand(
            Command::new("search")
                .about("Search OMDb by title")
                .arg(Arg::new("query").required(true).num_args(1..).value_name("QUERY").help("Title to search for"))
                .arg(
                    Arg::new("add")
                        .short('a')
                        .long("add")
                        .value_name("N")
                        .help("Import result number N")
                        .value_parser(value_parser!(usize)),
                )
                .arg(Arg::new("watched").short('w').long("watched").help("Mark the imported title as watched").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("add")
                .about("Import a title by IMDb id")
                .arg(Arg::new("imdb_id").required(true).value_name("IMDB_ID").help("IMDb id, e.g. tt0133093"))
                .arg(Arg::new("watched").short('w').long("watched").help("Mark as watched").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("list")
                .about("List the library")
                .arg(
                    Arg::new("tab")
                        .short('t')
                        .long("tab")
                        .value_name("TAB")
                        .help("Which tab to show")
                        .value_parser(["to-watch", "watched"])
                        .default_value("to-watch"),
                )
                .arg(
                    Arg::new("view")
                        .short('v')
                        .long("view")
                        .value_name("MODE")
                        .help("Layout (defaults to the configured view mode)")
                        .value_parser(["grid", "list"]),
                ),
        )
        .subcommand(
            Command::new("info")
                .about("Show everything stored for a title")
                .arg(Arg::new("id").required(true).value_name("ID").help("Record id or unique prefix")),
        )
        .subcommand(
            Command::new("rate")
                .about("Set the personal star rating (0 clears it)")
                .arg(Arg::new("id").required(true).value_name("ID").help("Record id or unique prefix"))
                .arg(
                    Arg::new("stars")
                        .required(true)
                        .value_name("STARS")
                        .help("0 to 5")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("toggle").long("toggle").help("Clear the rating if it already equals STARS").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("watched")
                .about("Toggle the watched flag")
                .arg(Arg::new("id").required(true).value_name("ID").help("Record id or unique prefix")),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a title from the library")
                .arg(Arg::new("id").required(true).value_name("ID").help("Record id or unique prefix"))
                .arg(Arg::new("force").short('f').long("force").help("Skip confirmation prompt").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("export").about("Copy the linked library into the vault root"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the effective settings"))
                .subcommand(
                    Command::new("set-key")
                        .about("Store the OMDb API key")
                        .arg(Arg::new("key").required(true).value_name("KEY")),
                )
                .subcommand(
                    Command::new("view")
                        .about("Set the default layout")
                        .arg(Arg::new("mode").required(true).value_name("MODE").value_parser(["grid", "list"])),
                ),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    match matches.get_one::<PathBuf>("config-dir") {
        Some(dir) => Ok(ConfigManager::with_directory(dir)),
        None => ConfigManager::new().context("Failed to locate config directory"),
    }
}

/// Environment overrides with command-line flags on top
fn overrides(matches: &ArgMatches, env: Overrides) -> Overrides {
    match matches.get_one::<PathBuf>("vault") {
        Some(vault) => env.overlay(Overrides::vault(vault)),
        None => env,
    }
}

fn load_config(manager: &ConfigManager, overrides: &Overrides) -> Result<Config> {
    manager
        .initialize()
        .context("Failed to create default config")?;
    let config = manager
        .load_effective(overrides)
        .context("Failed to load config")?;
    Ok(config)
}

fn init_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.as_filter())
        .parse_default_env()
        .init();
}

fn omdb_options(config: &Config) -> OmdbOptions {
    let omdb = &config.omdb;
    let retry = if omdb.retry_delay_ms == 0 {
        RetryPolicy::immediate(omdb.max_attempts)
    } else {
        RetryPolicy::new(omdb.max_attempts).with_initial_delay(omdb.retry_delay())
    };

    OmdbOptions::new(omdb.api_key.clone())
        .with_base_url(omdb.base_url.clone())
        .with_timeout(omdb.timeout())
        .with_retry(retry)
}

fn build_controller(manager: ConfigManager, config: &Config) -> Result<LibraryController> {
    let vault = config.library.vault_dir.clone();
    log::debug!("Using vault {}", vault.display());

    let source = OmdbSource::new(omdb_options(config)).context("Failed to set up HTTP client")?;
    let mut controller =
        LibraryController::new(LibraryStore::new(vault), Box::new(source), Box::new(manager));
    // A broken linked file must not block `link`, `init` or `unlink`
    if let Err(e) = controller.restore() {
        notice::report(&anyhow::Error::new(e).context("Failed to reopen the linked library"));
    }
    Ok(controller)
}

fn run(matches: &ArgMatches) -> Result<()> {
    let manager = config_manager(matches)?;
    let loaded = load_config(&manager, &overrides(matches, Overrides::from_env()));
    init_logging(
        loaded
            .as_ref()
            .map(|c| c.app.log_level)
            .unwrap_or(LogLevel::Warn),
    );
    let config = loaded?;
    console::set_colors_enabled(config.app.color_output);
    let config_path = manager.config_path().to_path_buf();

    let Some((name, sub_matches)) = matches.subcommand() else {
        build_cli().print_help()?;
        return Ok(());
    };

    let mut controller = build_controller(manager, &config)?;
    match name {
        "init" => commands::init_library(&mut controller),
        "link" => commands::link_library(&mut controller, sub_matches),
        "unlink" => commands::unlink_library(&mut controller),
        "files" => commands::list_files(&controller),
        "search" => commands::search_titles(&mut controller, sub_matches),
        "add" => commands::add_title(&mut controller, sub_matches),
        "list" => commands::list_library(&controller, &config, sub_matches),
        "info" => commands::show_info(&controller, sub_matches),
        "rate" => commands::rate_title(&mut controller, sub_matches),
        "watched" => commands::toggle_watched(&mut controller, sub_matches),
        "remove" => commands::remove_title(&mut controller, sub_matches),
        "export" => commands::export_library(&controller),
        "config" => commands::configure(&controller, &config, &config_path, sub_matches),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            notice::report(&err);
            ExitCode::FAILURE
        }
    }
}
