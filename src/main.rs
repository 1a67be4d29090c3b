//! # blockview
//!
//! A terminal viewer for pages exported from a block-based editor.
//!
//! ## Usage
//!
//! Launch the interactive viewer:
//! ```sh
//! blockview notes.blocks.json
//! ```
//!
//! List all headings:
//! ```sh
//! blockview -l notes.blocks.json
//! ```
//!
//! Render to plain text:
//! ```sh
//! blockview --render --width 100 notes.blocks.json
//! ```

mod cli;

use blockview::client::{ContentClient, DirectoryClient, RelayClient, RelayConfig};
use blockview::page::{Page, load_page};
use blockview::render::{HeadingEntry, filter_headings, headings_at_level};
use blockview::tui::{self, App, AppOptions, ColorMode, TerminalCapabilities};
use blockview::{Config, logging};
use clap::Parser as ClapParser;
use cli::{Cli, ColorModeArg, OutputFormat};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;

    // Handle dynamic shell completions
    #[cfg(feature = "unstable-dynamic")]
    clap_complete::CompleteEnv::with_factory(|| {
        use clap::CommandFactory;
        Cli::command()
    })
    .complete();

    let args = Cli::parse();
    let log_path = logging::init(args.log_file.as_deref());

    let mut config = Config::load();
    if let Some(ref theme_name) = args.theme {
        config.ui.theme = theme_name.clone();
    }

    let (client, page_id) = build_client(&args, &config)?;
    info!(
        source = %client.describe(),
        page = %page_id,
        log = ?log_path,
        "starting"
    );

    if !args.is_interactive() {
        let page = load_page(client.as_ref(), &page_id);
        handle_cli_mode(&args, &config, client.as_ref(), &page)?;
        return Ok(());
    }

    // Priority: CLI args > config file > auto-detection
    let caps = TerminalCapabilities::detect();
    let color_mode = match args.color_mode {
        Some(ColorModeArg::Auto) => caps.recommended_color_mode,
        Some(ColorModeArg::Rgb) => ColorMode::Rgb,
        Some(ColorModeArg::Color256) => ColorMode::Indexed256,
        None => caps.resolve(&config.terminal.color_mode),
    };
    let options = AppOptions {
        color_mode,
        show_images: !args.no_images && config.images.enabled,
        config_path: Config::config_path(),
    };

    let app = App::new(config, client, &page_id, options);
    let mut terminal = ratatui::init();
    let result = tui::run(&mut terminal, app);
    ratatui::restore();
    result
}

/// Pick the content client for the positional source.
///
/// An existing file is read from its directory. A page id goes to `--dir`,
/// then `--relay-url`, then the config file's `[source]` section.
fn build_client(args: &Cli, config: &Config) -> Result<(Arc<dyn ContentClient>, String)> {
    let path = Path::new(&args.source);
    if path.is_file() {
        let (client, id) = DirectoryClient::from_blocks_file(path)
            .ok_or_else(|| eyre!("{} is not a <id>.blocks.json file", path.display()))?;
        let client: Arc<dyn ContentClient> = Arc::new(client);
        return Ok((client, id));
    }

    let id = args.source.clone();
    let directory = |dir: &Path| -> Arc<dyn ContentClient> { Arc::new(DirectoryClient::new(dir)) };
    if let Some(ref dir) = args.dir {
        return Ok((directory(dir), id));
    }

    let relay_url = args
        .relay_url
        .clone()
        .or_else(|| config.source.relay_url.clone());
    if let Some(base_url) = relay_url {
        let relay: Arc<dyn ContentClient> = Arc::new(RelayClient::new(RelayConfig {
            base_url,
            token: config.source.token(),
            api_version: Some(config.source.api_version.clone()),
        })?);
        return Ok((relay, id));
    }

    if let Some(ref dir) = config.source.directory {
        return Ok((directory(dir), id));
    }

    Err(eyre!(
        "{} is not a file; pass --dir or --relay-url to resolve page ids",
        args.source
    ))
}

fn handle_cli_mode(
    args: &Cli,
    config: &Config,
    client: &dyn ContentClient,
    page: &Page,
) -> Result<()> {
    if args.count {
        return print_heading_counts(&page.headings, &args.output);
    }

    if args.render {
        let base_dir = client
            .source_path(&page.id)
            .and_then(|p| p.parent().map(Path::to_path_buf));
        let show_images = !args.no_images && config.images.enabled;
        for row in tui::render_plain(page, config, args.width, show_images, base_dir.as_deref()) {
            println!("{}", row);
        }
        return Ok(());
    }

    // Apply filters
    let headings: Vec<&HeadingEntry> = if let Some(level) = args.level {
        headings_at_level(&page.headings, level)
    } else if let Some(ref filter) = args.filter {
        filter_headings(&page.headings, filter)
    } else {
        page.headings.iter().collect()
    };
    print_headings(&headings, &args.output)
}

fn print_headings(headings: &[&HeadingEntry], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            for heading in headings {
                let prefix = "#".repeat(heading.level);
                println!("{} {}", prefix, heading.text);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(headings)?);
        }
    }
    Ok(())
}

fn print_heading_counts(headings: &[HeadingEntry], format: &OutputFormat) -> Result<()> {
    let count = |level: usize| headings.iter().filter(|h| h.level == level).count();

    match format {
        OutputFormat::Plain => {
            println!("Heading counts:");
            for level in 1..=3 {
                let n = count(level);
                if n > 0 {
                    println!("  {}: {}", "#".repeat(level), n);
                }
            }
            println!("\nTotal: {}", headings.len());
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "h1": count(1),
                "h2": count(2),
                "h3": count(3),
                "total": headings.len(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
