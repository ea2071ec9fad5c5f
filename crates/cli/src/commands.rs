// FILE: crates/cli/src/commands.rs

use anyhow::{anyhow, bail, Context, Result};
use cinevault_config::{Config, ViewMode};
use cinevault_content_sources::SourceError;
use cinevault_core::{MovieRecord, SearchHit, MAX_STAR_RATING};
use cinevault_library::{
    toggled_star_rating, ImportOutcome, LibraryController, LibraryError, LibraryView, Tab,
    MIN_QUERY_CHARS,
};
use clap::ArgMatches;
use console::style;
use std::io::{BufRead, Write};
use std::path::Path;

const ID_WIDTH: usize = 8;
const GRID_COLUMNS: usize = 3;
const GRID_CELL: usize = 26;

/// Create a new library file and link it
pub fn init_library(controller: &mut LibraryController) -> Result<()> {
    let handle = controller.create_library()?;
    println!("{} Created library {}", style("✓").green().bold(), handle);
    Ok(())
}

/// Link an existing library file
pub fn link_library(controller: &mut LibraryController, matches: &ArgMatches) -> Result<()> {
    let path = required(matches, "path")?;
    let count = controller.link(path)?.len();
    let handle = controller
        .handle()
        .ok_or_else(|| anyhow!("Library was not linked"))?;
    println!(
        "{} Linked {} ({} titles)",
        style("✓").green().bold(),
        handle,
        count
    );
    Ok(())
}

pub fn unlink_library(controller: &mut LibraryController) -> Result<()> {
    controller.unlink()?;
    println!("{} Library unlinked; the file was kept.", style("✓").green().bold());
    Ok(())
}

/// List JSON files in the vault, marking the linked one
pub fn list_files(controller: &LibraryController) -> Result<()> {
    let files = controller.store().list_json_files()?;
    if files.is_empty() {
        println!(
            "No JSON files under {}. Use 'init' to create a library.",
            controller.store().vault().display()
        );
        return Ok(());
    }

    let linked = controller.handle().map(|h| h.path());
    for file in files {
        let marker = if Some(file.as_path()) == linked { "*" } else { " " };
        println!("{} {}", style(marker).green().bold(), file.display());
    }
    Ok(())
}

/// Search OMDb and optionally import one hit
pub fn search_titles(controller: &mut LibraryController, matches: &ArgMatches) -> Result<()> {
    let query = matches
        .get_many::<String>("query")
        .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    if query.trim().chars().count() < MIN_QUERY_CHARS {
        println!("Type at least {} characters to search.", MIN_QUERY_CHARS);
        return Ok(());
    }
    if !controller.provider_available() {
        return Err(LibraryError::Source(SourceError::MissingApiKey).into());
    }

    let hits = controller.search(&query);
    if hits.is_empty() {
        println!("No results for '{}'", query);
        return Ok(());
    }

    println!(
        "\n{} results for '{}'",
        style(hits.len()).bold().cyan(),
        query
    );
    println!("{}", "=".repeat(80));
    for (index, hit) in hits.iter().enumerate() {
        println!("{}", hit_line(index + 1, hit, in_library(controller, hit)));
    }

    if let Some(&number) = matches.get_one::<usize>("add") {
        let hit = pick_hit(&hits, number)?;
        import(controller, hit, matches.get_flag("watched"))?;
    }
    Ok(())
}

/// Import a title by IMDb id
pub fn add_title(controller: &mut LibraryController, matches: &ArgMatches) -> Result<()> {
    let imdb_id = required(matches, "imdb_id")?.trim();
    if imdb_id.is_empty() {
        bail!("IMDb id is required");
    }
    import(
        controller,
        &SearchHit::from_external_id(imdb_id),
        matches.get_flag("watched"),
    )
}

/// List one tab of the library
pub fn list_library(
    controller: &LibraryController,
    config: &Config,
    matches: &ArgMatches,
) -> Result<()> {
    let document = controller
        .document()
        .ok_or(LibraryError::NotLinked)?;

    let tab = match matches.get_one::<String>("tab") {
        Some(raw) => raw.parse::<Tab>().map_err(|e| anyhow!(e))?,
        None => Tab::default(),
    };
    let mode = match matches.get_one::<String>("view") {
        Some(raw) => raw.parse::<ViewMode>()?,
        None => config.display.view_mode,
    };
    let view = LibraryView::new(tab, mode);

    let (to_watch, watched) = LibraryView::counts(document);
    println!(
        "\n{} ({})  |  {} ({})",
        tab_label(Tab::ToWatch, view.tab, to_watch),
        to_watch,
        tab_label(Tab::Watched, view.tab, watched),
        watched
    );
    println!("{}", "=".repeat(80));

    let entries = view.entries(document);
    if entries.is_empty() {
        match view.tab {
            Tab::ToWatch => println!("Nothing to watch. Use 'search' to add titles."),
            Tab::Watched => println!("No watched titles yet."),
        }
        return Ok(());
    }

    match view.mode {
        ViewMode::List => {
            for movie in entries {
                println!("{}", list_line(movie));
            }
        }
        ViewMode::Grid => {
            for row in grid_rows(&entries) {
                println!("{}", row);
            }
        }
    }
    Ok(())
}

/// Show everything stored for a title
pub fn show_info(controller: &LibraryController, matches: &ArgMatches) -> Result<()> {
    let movie = find(controller, required(matches, "id")?)?;

    println!("\n{}", style(&movie.title).bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID: {}", movie.id);
    if !movie.external_id.is_empty() {
        println!("IMDb: {}", movie.external_id);
    }
    let details = movie.details_line();
    if !details.is_empty() {
        println!("{}", details);
    }

    for (label, value) in [
        ("Rated", &movie.rated),
        ("Released", &movie.released),
        ("Runtime", &movie.runtime),
        ("Genre", &movie.genre),
        ("Director", &movie.director),
        ("Writer", &movie.writer),
        ("Actors", &movie.actors),
        ("Language", &movie.language),
        ("Country", &movie.country),
        ("Awards", &movie.awards),
        ("Box office", &movie.box_office),
        ("Seasons", &movie.total_seasons),
    ] {
        if !value.is_empty() {
            println!("{}: {}", label, value);
        }
    }

    if !movie.plot.is_empty() {
        println!("\nPlot:\n{}", movie.plot);
    }

    if !movie.ratings.is_empty() || !movie.imdb_rating.is_empty() {
        println!("\nRatings:");
        for rating in &movie.ratings {
            println!("  {}: {}", rating.source, rating.value);
        }
        if !movie.metascore.is_empty() {
            println!("  Metascore: {}", movie.metascore);
        }
        if !movie.imdb_votes.is_empty() {
            println!("  IMDb votes: {}", movie.imdb_votes);
        }
    }

    println!("\nYour rating: {}", stars(movie.star_rating));
    println!("Watched: {}", if movie.watched { "Yes" } else { "No" });
    if !movie.notes.is_empty() {
        println!("Notes: {}", movie.notes);
    }
    Ok(())
}

/// Set (or with `--toggle`, flip) the star rating
pub fn rate_title(controller: &mut LibraryController, matches: &ArgMatches) -> Result<()> {
    let movie = find(controller, required(matches, "id")?)?;
    let (id, title, current) = (movie.id.clone(), movie.title.clone(), movie.star_rating);

    let requested = matches
        .get_one::<i64>("stars")
        .copied()
        .ok_or_else(|| anyhow!("Star count is required"))?;

    let value = match u8::try_from(requested) {
        Ok(clicked) if matches.get_flag("toggle") && clicked <= MAX_STAR_RATING => {
            i64::from(toggled_star_rating(current, clicked))
        }
        _ => requested,
    };

    controller.set_star_rating(&id, value)?;
    if value == 0 {
        println!("{} Cleared rating of '{}'", style("✓").green().bold(), title);
    } else {
        println!("{} '{}' {}", style("✓").green().bold(), title, stars(value as u8));
    }
    Ok(())
}

pub fn toggle_watched(controller: &mut LibraryController, matches: &ArgMatches) -> Result<()> {
    let movie = find(controller, required(matches, "id")?)?;
    let (id, title) = (movie.id.clone(), movie.title.clone());

    let watched = controller.toggle_watched(&id)?;
    let state = if watched { "watched" } else { "to watch" };
    println!("{} Moved '{}' to {}", style("✓").green().bold(), title, state);
    Ok(())
}

/// Remove a title, asking first unless `--force`
pub fn remove_title(controller: &mut LibraryController, matches: &ArgMatches) -> Result<()> {
    let movie = find(controller, required(matches, "id")?)?;
    let (id, title) = (movie.id.clone(), movie.title.clone());

    if !matches.get_flag("force") {
        let prompt = format!("Are you sure you want to remove '{}'? (y/N)", title);
        let stdin = std::io::stdin();
        if !confirm(&prompt, &mut stdin.lock())? {
            println!("Removal cancelled.");
            return Ok(());
        }
    }

    if controller.remove(&id)? {
        println!("{} Removed '{}'", style("✓").green().bold(), title);
    } else {
        println!("'{}' was already gone.", title);
    }
    Ok(())
}

pub fn export_library(controller: &LibraryController) -> Result<()> {
    let path = controller.export()?;
    println!("{} Exported to {}", style("✓").green().bold(), path.display());
    Ok(())
}

/// `config show|set-key|view`
pub fn configure(
    controller: &LibraryController,
    config: &Config,
    config_path: &Path,
    matches: &ArgMatches,
) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => {
            show_config(controller, config, config_path);
            Ok(())
        }
        Some(("set-key", sub)) => {
            let key = required(sub, "key")?.trim().to_string();
            controller
                .settings()
                .update_settings(&mut |c| c.omdb.api_key = key.clone())
                .context("Failed to store API key")?;
            println!("{} API key saved to {}", style("✓").green().bold(), config_path.display());
            Ok(())
        }
        Some(("view", sub)) => {
            let mode = required(sub, "mode")?.parse::<ViewMode>()?;
            controller
                .settings()
                .update_settings(&mut |c| c.display.view_mode = mode)
                .context("Failed to store view mode")?;
            println!("{} Default view set to {}", style("✓").green().bold(), mode);
            Ok(())
        }
        _ => bail!("Unknown config command"),
    }
}

fn show_config(controller: &LibraryController, config: &Config, config_path: &Path) {
    println!("\n{}", style("Settings").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Config file: {}", config_path.display());
    println!("Vault: {}", controller.store().vault().display());
    match controller.handle() {
        Some(handle) => println!("Linked library: {}", handle),
        None => println!("Linked library: (none)"),
    }
    println!("OMDb API key: {}", mask_key(&config.omdb.api_key));
    println!("OMDb endpoint: {}", config.omdb.base_url);
    println!(
        "Details retries: {} attempts, {} ms initial delay",
        config.omdb.max_attempts, config.omdb.retry_delay_ms
    );
    println!("Default view: {}", config.display.view_mode);
    println!("Log level: {}", config.app.log_level);
}

fn import(controller: &mut LibraryController, hit: &SearchHit, watched: bool) -> Result<()> {
    let outcome = controller.import_or_update(hit, watched)?;
    let title = controller
        .document()
        .and_then(|doc| doc.find(outcome.id()))
        .map(|m| m.title.clone())
        .unwrap_or_else(|| hit.external_id.clone());

    match outcome {
        ImportOutcome::Added(id) => println!(
            "{} Added '{}' ({})",
            style("✓").green().bold(),
            title,
            short_id(id.as_str())
        ),
        ImportOutcome::Updated(_) => println!(
            "{} '{}' is already in your library; marked as {}",
            style("✓").green().bold(),
            title,
            if watched { "watched" } else { "to watch" }
        ),
    }
    Ok(())
}

fn find<'a>(controller: &'a LibraryController, prefix: &str) -> Result<&'a MovieRecord> {
    let id = controller.resolve_id(prefix)?;
    controller
        .document()
        .and_then(|doc| doc.find(&id))
        .ok_or_else(|| anyhow!("Title {} disappeared from the library", id))
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing argument <{}>", name))
}

fn in_library(controller: &LibraryController, hit: &SearchHit) -> bool {
    controller
        .document()
        .is_some_and(|doc| doc.find_by_external_id(&hit.external_id).is_some())
}

/// 1-based pick from the printed result list
fn pick_hit(hits: &[SearchHit], number: usize) -> Result<&SearchHit> {
    number
        .checked_sub(1)
        .and_then(|i| hits.get(i))
        .ok_or_else(|| anyhow!("No result number {} (pick 1 to {})", number, hits.len()))
}

fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool> {
    println!("{}", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read input")?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn tab_label(tab: Tab, active: Tab, count: usize) -> String {
    let label = tab.label();
    if tab == active {
        style(label).bold().underlined().to_string()
    } else if count == 0 {
        style(label).dim().to_string()
    } else {
        label.to_string()
    }
}

fn hit_line(number: usize, hit: &SearchHit, in_library: bool) -> String {
    let mut line = format!("{:>3}. {}", number, hit.title);
    if !hit.year.is_empty() {
        line.push_str(&format!(" ({})", hit.year));
    }
    line.push_str(&format!("  [{}]", hit.external_id));
    if in_library {
        line.push_str("  in library");
    }
    line
}

fn list_line(movie: &MovieRecord) -> String {
    let details = movie.details_line();
    let mut line = format!("{}  {}", short_id(movie.id.as_str()), movie.title);
    if !details.is_empty() {
        line.push_str(&format!("  ({})", details));
    }
    if movie.is_rated() {
        line.push_str(&format!("  {}", stars(movie.star_rating)));
    }
    line
}

/// Lays cards out `GRID_COLUMNS` to a row; each card is title plus details
fn grid_rows(movies: &[&MovieRecord]) -> Vec<String> {
    let mut rows = Vec::new();
    for chunk in movies.chunks(GRID_COLUMNS) {
        let titles: Vec<String> = chunk
            .iter()
            .map(|m| cell(&format!("{} {}", short_id(m.id.as_str()), m.title)))
            .collect();
        let details: Vec<String> = chunk
            .iter()
            .map(|m| {
                let mut text = m.details_line();
                if m.is_rated() {
                    text = format!("{} {}", text, stars(m.star_rating));
                }
                cell(text.trim())
            })
            .collect();
        rows.push(titles.join(" ").trim_end().to_string());
        rows.push(details.join(" ").trim_end().to_string());
        rows.push(String::new());
    }
    rows
}

/// Pads or truncates to `GRID_CELL` characters
fn cell(text: &str) -> String {
    let count = text.chars().count();
    if count > GRID_CELL {
        let cut: String = text.chars().take(GRID_CELL - 3).collect();
        format!("{}...", cut)
    } else {
        format!("{}{}", text, " ".repeat(GRID_CELL - count))
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(ID_WIDTH).collect()
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(MAX_STAR_RATING));
    let empty = usize::from(MAX_STAR_RATING) - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

fn mask_key(key: &str) -> String {
    let key = key.trim();
    match key.chars().count() {
        0 => "(not set)".to_string(),
        n if n <= 4 => "*".repeat(n),
        n => {
            let tail: String = key.chars().skip(n - 2).collect();
            format!("{}{}", "*".repeat(n - 2), tail)
        }
    }
}
