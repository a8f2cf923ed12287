//! PureFeed CLI
//!
//! CLI tool for validating section configs, checking which rules apply to a
//! URL, and toggling settings files.

mod store;

use std::fs;

use clap::{Parser, Subcommand};

use pf_config::{compile_config, CompiledConfig, JsonConfig};
use pf_core::settings::Settings;
use pf_core::store::{ConfigSource, SettingsStore};
use pf_core::url::Location;
use pf_core::{decide, ControlPanel, SectionCatalog, SectionKind};

use crate::store::{FileConfigSource, JsonFileStore};

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "PureFeed section config and settings tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a section config
    Validate {
        /// Config file
        #[arg(short, long)]
        config: String,
    },

    /// Summarize a section config
    Info {
        /// Config file
        #[arg(short, long)]
        config: String,
    },

    /// Show which sections apply to a URL and whether it would redirect
    Check {
        /// Config file
        #[arg(short, long)]
        config: String,

        /// Page URL
        #[arg(short, long)]
        url: String,

        /// Settings file (defaults to everything enabled)
        #[arg(short, long)]
        settings: Option<String>,
    },

    /// Toggle the extension or one section in a settings file
    Toggle {
        /// Settings file, created if missing
        #[arg(short, long)]
        settings: String,

        /// Toggle the whole extension
        #[arg(long, conflicts_with = "section", required_unless_present = "section")]
        extension: bool,

        /// Toggle one section by id
        #[arg(long)]
        section: Option<String>,

        /// Config file, used to merge in new sections
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Info { config } => cmd_info(&config),
        Commands::Check {
            config,
            url,
            settings,
        } => block_on(cmd_check(&config, &url, settings.as_deref())),
        Commands::Toggle {
            settings,
            extension,
            section,
            config,
        } => block_on(cmd_toggle(&settings, extension, section.as_deref(), config.as_deref())),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn block_on<F>(future: F) -> Result<(), String>
where
    F: std::future::Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
    runtime.block_on(future)
}

fn load_config(path: &str) -> Result<CompiledConfig, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    compile_config(&text).map_err(|e| format!("Invalid config '{}': {}", path, e))
}

fn kind_label(kind: SectionKind) -> String {
    let mut labels = Vec::new();
    if kind.contains(SectionKind::HIDE) {
        labels.push("hide");
    }
    if kind.contains(SectionKind::REDIRECT) {
        labels.push("redirect");
    }
    if kind.contains(SectionKind::CLICK) {
        labels.push("click");
    }
    if labels.is_empty() {
        labels.push("inert");
    }
    labels.join("+")
}

fn cmd_validate(config: &str) -> Result<(), String> {
    let compiled = load_config(config)?;
    let stats = compiled.stats;

    println!("Config '{}' is valid", config);
    println!("  Sections: {} -> {}", stats.before, stats.after);
    println!("  Deduped:  {}", stats.deduped);
    println!("  Invalid:  {}", stats.invalid);

    if stats.after == 0 {
        println!("  Warning: no usable sections");
    }
    Ok(())
}

fn cmd_info(config: &str) -> Result<(), String> {
    let catalog = SectionCatalog::new(load_config(config)?.sections);
    let sections = catalog.sections();
    let count = |kind: SectionKind| sections.iter().filter(|s| s.kind().contains(kind)).count();

    println!("Config Info:");
    println!("  Sections:  {}", catalog.len());
    println!("  Hiding:    {}", count(SectionKind::HIDE));
    println!("  Redirects: {}", count(SectionKind::REDIRECT));
    println!("  Clicks:    {}", count(SectionKind::CLICK));
    println!("  Platforms: {}", catalog.platforms().join(", "));
    println!();

    for section in sections {
        println!(
            "  {:<20} {:<14} {:<10} {}",
            section.id(),
            kind_label(section.kind()),
            section.platform(),
            section.name()
        );
    }
    Ok(())
}

async fn cmd_check(config: &str, url: &str, settings: Option<&str>) -> Result<(), String> {
    let catalog = SectionCatalog::new(load_config(config)?.sections);
    let settings = match settings {
        Some(path) => JsonFileStore::new(path)
            .load()
            .await
            .map(Settings::from_stored)
            .map_err(|e| e.to_string())?,
        None => Settings::new(),
    };

    let location = Location::parse(url);
    let applicable = catalog.applicable(location.host);

    println!("URL:       {}", url);
    println!("Host:      {}", location.host);
    println!("Path:      {}", location.path);
    println!("Extension: {}", if settings.is_enabled() { "enabled" } else { "disabled" });
    println!();

    if applicable.is_empty() {
        println!("No sections apply to this host");
        return Ok(());
    }

    println!("Applicable sections:");
    for section in &applicable {
        let state = if settings.is_section_enabled(section.id()) { "on" } else { "off" };
        println!("  [{:>3}] {:<20} {}", state, section.id(), kind_label(section.kind()));
    }
    println!();

    if !settings.is_enabled() {
        println!("Redirect:  none (extension disabled)");
        return Ok(());
    }

    let enabled = applicable
        .into_iter()
        .filter(|section| settings.is_section_enabled(section.id()));
    let decision = decide(enabled, &location);
    match (decision.target_url, decision.section_id) {
        (Some(target), Some(section_id)) if decision.should_redirect => {
            println!("Redirect:  {} (section '{}')", target, section_id);
        }
        _ => println!("Redirect:  none"),
    }
    Ok(())
}

async fn cmd_toggle(
    settings: &str,
    extension: bool,
    section: Option<&str>,
    config: Option<&str>,
) -> Result<(), String> {
    let store = JsonFileStore::new(settings);
    let source: Box<dyn ConfigSource> = match config {
        Some(path) => Box::new(FileConfigSource::new(path)),
        None => Box::new(JsonConfig::new("[]")),
    };
    let mut panel = ControlPanel::load(store, source.as_ref()).await;

    let toggled = if extension {
        Some(panel.toggle_extension().await.map_err(|e| e.to_string())?)
    } else {
        let id = section.ok_or("Either --extension or --section is required")?;
        panel.toggle_section(id).await.map_err(|e| e.to_string())?
    };

    match toggled {
        Some(toggled) => {
            let message = serde_json::to_string(&toggled.message).map_err(|e| e.to_string())?;
            println!("Now {}", if toggled.enabled { "enabled" } else { "disabled" });
            println!("Message: {}", message);
        }
        None => println!("Extension is disabled; section toggles are ignored"),
    }
    println!("Status:  {}", panel.status());
    println!("Saved to '{}'", panel.store().path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::Message;

    #[test]
    fn test_kind_label() {
        assert_eq!(kind_label(SectionKind::HIDE | SectionKind::CLICK), "hide+click");
        assert_eq!(kind_label(SectionKind::REDIRECT), "redirect");
        assert_eq!(kind_label(SectionKind::empty()), "inert");
    }

    #[tokio::test]
    async fn test_toggle_through_file_store() {
        let dir = std::env::temp_dir();
        let settings = dir.join(format!("pf-cli-{}-toggle.json", std::process::id()));
        let _ = std::fs::remove_file(&settings);

        let config = JsonConfig::new(
            r#"[{"id":"feed","name":"For You","platform":"twitter","currentPath":"/home","newPath":"/following"}]"#,
        );
        let mut panel = ControlPanel::load(JsonFileStore::new(&settings), &config).await;
        let off = panel.toggle_section("feed").await.unwrap().unwrap();
        assert!(!off.enabled);

        let mut panel = ControlPanel::load(JsonFileStore::new(&settings), &config).await;
        assert!(!panel.settings().is_section_enabled("feed"));
        let on = panel.toggle_section("feed").await.unwrap().unwrap();
        assert_eq!(
            on.message,
            Message::CheckRedirect {
                section_id: "feed".into()
            }
        );

        let _ = std::fs::remove_file(&settings);
    }
}
