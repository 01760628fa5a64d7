//! `holocron` subcommands
//!
//! Each command returns the text to print so the binary stays a thin shell
//! around this module.

use crate::config::HolocronConfig;
use crate::format::{format_count, format_date, format_field};
use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use holocron_overlay::{
    DetailView, EditSession, EditStore, EditableField, FileBackend, OverlayRecord,
    PersistenceBackend, RecordId, SessionOutcome, merge,
};
use holocron_swapi::resources::resolve_name;
use holocron_swapi::{Catalog, Character, CharacterField, ImageLookup, RecordFetcher, SwapiClient};
use owo_colors::OwoColorize;
use std::fmt::Write as _;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

/// Browse Star Wars characters and keep local edits on top of them
#[derive(Debug, Parser)]
#[command(name = "holocron", version)]
pub struct Cli {
    /// Config file (default: ~/.config/holocron/holocron.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// File holding local edits (overrides the config)
    #[arg(long, global = true, value_name = "PATH")]
    pub edits: Option<PathBuf>,

    /// SWAPI base URL (overrides the config)
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,

    /// Portrait API base URL (overrides the config)
    #[arg(long, global = true, value_name = "URL")]
    pub image_base: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Never colorize output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List one page of characters
    List(ListArgs),
    /// Show a character with local edits applied
    Show(ShowArgs),
    /// Edit fields of a character locally
    ///
    /// A value equal to the server's value removes the local edit for that
    /// field.
    Edit(EditArgs),
    /// Drop local edits of a character (all of them, or one field)
    Reset(ResetArgs),
    /// Print stored local edits as JSON
    Edits(EditsArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Filter by name
    #[arg(long, default_value = "")]
    pub search: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,

    /// Skip homeworld and portrait lookups
    #[arg(long)]
    pub no_lookups: bool,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: String,

    /// FIELD=VALUE, repeatable
    #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
    pub assignments: Vec<FieldAssignment>,
}

#[derive(Debug, Args)]
pub struct ResetArgs {
    pub id: String,

    /// Reset only this field
    #[arg(long, value_parser = parse_field)]
    pub field: Option<CharacterField>,
}

#[derive(Debug, Args)]
pub struct EditsArgs {
    /// Only this character
    pub id: Option<String>,
}

/// One `FIELD=VALUE` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAssignment {
    pub field: CharacterField,
    pub value: String,
}

impl FromStr for FieldAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD=VALUE, got {s:?}"))?;
        Ok(Self {
            field: parse_field(name.trim())?,
            value: value.to_string(),
        })
    }
}

pub fn parse_field(name: &str) -> Result<CharacterField, String> {
    CharacterField::parse(name).ok_or_else(|| {
        let known = CharacterField::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown field {name:?} (editable: {known})")
    })
}

/// Output styling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    pub color: bool,
}

impl Style {
    pub fn detect(no_color: bool) -> Self {
        Self {
            color: !no_color && std::io::stdout().is_terminal(),
        }
    }

    fn edited(self, text: &str) -> String {
        if self.color {
            format!("{} {}", text.yellow(), "*".yellow().bold())
        } else {
            format!("{text} *")
        }
    }

    fn heading(self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Secondary lookups for the detail screen.
#[derive(Debug, Clone)]
pub struct Lookups {
    pub http: reqwest::Client,
    pub images: ImageLookup,
}

/// Run a parsed command line and return what to print.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let cfg = HolocronConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let style = Style::detect(cli.no_color);
    let edits_path = cli.edits.unwrap_or_else(|| cfg.resolved_edits_path());
    tracing::debug!(path = %edits_path.display(), "Using edit store");
    let mut store = EditStore::new(FileBackend::new(edits_path));

    let api_base = cli.api_base.unwrap_or_else(|| cfg.api.base_url.clone());
    let client = || {
        SwapiClient::new(api_base.clone(), cfg.timeout()).context("failed to create HTTP client")
    };

    match cli.command {
        Command::Edits(args) => dump_edits(&store, args.id.as_deref()),
        Command::List(args) => {
            let catalog = Catalog::new(client()?, cfg.debounce());
            list(&catalog, &store, args.page, &args.search, style).await
        }
        Command::Show(args) => {
            let client = client()?;
            let lookups = (!args.no_lookups).then(|| Lookups {
                http: client.http().clone(),
                images: ImageLookup::new(
                    client.http().clone(),
                    cli.image_base
                        .unwrap_or_else(|| cfg.api.image_base_url.clone()),
                ),
            });
            show(&client, &store, &args.id, lookups.as_ref(), style).await
        }
        Command::Edit(args) => {
            edit(&client()?, &mut store, &args.id, &args.assignments, style).await
        }
        Command::Reset(args) => reset(&client()?, &mut store, &args.id, args.field, style).await,
    }
}

async fn fetch_character<F>(fetcher: &F, id: &str) -> anyhow::Result<Character>
where
    F: RecordFetcher<Record = Character>,
{
    fetcher
        .fetch_by_id(&RecordId::from(id))
        .await
        .with_context(|| format!("failed to load character {id}"))
}

/// One page of the catalog, names shown with local edits applied.
pub async fn list<F, B>(
    catalog: &Catalog<F>,
    store: &EditStore<B>,
    page: u32,
    search: &str,
    style: Style,
) -> anyhow::Result<String>
where
    F: RecordFetcher<Record = Character>,
    B: PersistenceBackend,
{
    let Some(result) = catalog
        .load_page(page, search)
        .await
        .context("failed to load characters")?
    else {
        bail!("page load was superseded");
    };

    let mut out = String::new();
    let search = search.trim();
    let title = if search.is_empty() {
        format!("Page {page} ({} characters)", result.total_count)
    } else {
        format!(
            "Page {page} ({} characters matching {search:?})",
            result.total_count
        )
    };
    let _ = writeln!(out, "{}", style.heading(&title));

    if result.items.is_empty() {
        let _ = writeln!(out, "  No characters found");
    }

    for character in &result.items {
        let id = character.record_id();
        let overrides = store.get(&id);
        let display = merge(character, overrides.as_ref());
        let name = display.value(CharacterField::Name);
        let name = if overrides.is_some() {
            style.edited(name)
        } else {
            name.to_string()
        };
        let _ = writeln!(out, "  {:>4}  {name}", id.as_str());
    }

    if let Some(nav) = page_nav(page, result.has_previous, result.has_next) {
        let _ = writeln!(out, "{}", style.dim(&nav));
    }

    Ok(out)
}

fn page_nav(page: u32, has_previous: bool, has_next: bool) -> Option<String> {
    let mut nav = Vec::new();
    if has_previous {
        nav.push(format!("previous: --page {}", page.saturating_sub(1).max(1)));
    }
    if has_next {
        nav.push(format!("next: --page {}", page.saturating_add(1)));
    }
    (!nav.is_empty()).then(|| nav.join("  "))
}

/// Detail screen for one character.
pub async fn show<F, B>(
    fetcher: &F,
    store: &EditStore<B>,
    id: &str,
    lookups: Option<&Lookups>,
    style: Style,
) -> anyhow::Result<String>
where
    F: RecordFetcher<Record = Character>,
    B: PersistenceBackend,
{
    let character = fetch_character(fetcher, id).await?;
    let view = DetailView::build(&character, store);

    let mut extras = Extras::default();
    if let Some(lookups) = lookups {
        let (homeworld, image) = tokio::join!(
            resolve_name(&lookups.http, &character.homeworld),
            lookups.images.image_url(&view.id),
        );
        extras.homeworld = Some(homeworld).filter(|name| !name.is_empty());
        extras.image = Some(match image {
            Ok(Some(url)) => url,
            Ok(None) => "none".to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "Portrait lookup failed");
                "unavailable".to_string()
            }
        });
    }

    Ok(render_detail(&view, &extras, style))
}

/// Apply `assignments` through an edit session and show the result.
pub async fn edit<F, B>(
    fetcher: &F,
    store: &mut EditStore<B>,
    id: &str,
    assignments: &[FieldAssignment],
    style: Style,
) -> anyhow::Result<String>
where
    F: RecordFetcher<Record = Character>,
    B: PersistenceBackend,
{
    let character = fetch_character(fetcher, id).await?;
    if character.record_id().is_empty() {
        bail!("character {id} has no usable id (url {:?})", character.url);
    }
    let mut session = EditSession::for_record(character.clone());
    session.start(&*store);
    for assignment in assignments {
        session.update_field(assignment.field, assignment.value.clone());
    }

    let mut out = String::new();
    match session.save(store) {
        SessionOutcome::Committed {
            overridden,
            reverted,
        } => {
            let _ = writeln!(
                out,
                "Saved local edits for #{id}: {} overridden, {} reverted",
                overridden.len(),
                reverted.len()
            );
        }
        SessionOutcome::Cleared | SessionOutcome::Skipped => {
            let _ = writeln!(out, "No local edits for #{id}");
        }
    }

    let view = DetailView::build(&character, store);
    out.push_str(&render_detail(&view, &Extras::default(), style));
    Ok(out)
}

/// Drop all local edits of `id`, or only those of `field`.
pub async fn reset<F, B>(
    fetcher: &F,
    store: &mut EditStore<B>,
    id: &str,
    field: Option<CharacterField>,
    style: Style,
) -> anyhow::Result<String>
where
    F: RecordFetcher<Record = Character>,
    B: PersistenceBackend,
{
    let character = fetch_character(fetcher, id).await?;
    let mut session = EditSession::for_record(character.clone());

    let outcome = match field {
        Some(field) => session.reset_field(store, field),
        None => session.reset_all(store),
    };

    let mut out = String::new();
    match (outcome, field) {
        (SessionOutcome::Skipped, _) => {
            let _ = writeln!(out, "Nothing to reset for #{id}");
        }
        (_, Some(field)) => {
            let _ = writeln!(out, "Reset {} for #{id}", field.as_str());
        }
        (_, None) => {
            let _ = writeln!(out, "Cleared local edits for #{id}");
        }
    }

    let view = DetailView::build(&character, store);
    out.push_str(&render_detail(&view, &Extras::default(), style));
    Ok(out)
}

/// Stored edits as pretty JSON, optionally for a single record.
pub fn dump_edits<B: PersistenceBackend>(
    store: &EditStore<B>,
    id: Option<&str>,
) -> anyhow::Result<String> {
    let json = match id {
        Some(id) => serde_json::to_string_pretty(&store.get(&RecordId::from(id)))?,
        None => serde_json::to_string_pretty(&store.all())?,
    };
    Ok(format!("{json}\n"))
}

#[derive(Debug, Default)]
struct Extras {
    homeworld: Option<String>,
    image: Option<String>,
}

fn render_detail(view: &DetailView<Character>, extras: &Extras, style: Style) -> String {
    let record = view.display.record();
    let mut out = String::new();

    let badge = if view.has_local_edits {
        format!(" {}", style.dim("[local edits]"))
    } else {
        String::new()
    };
    let _ = writeln!(
        out,
        "{} (#{}){badge}",
        style.heading(view.display.value(CharacterField::Name)),
        view.id
    );

    for field in CharacterField::ALL {
        let value = format_field(view.display.value(*field), field.unit());
        let value = if view.provenance.is_overridden(*field) {
            style.edited(&value)
        } else {
            value
        };
        let _ = writeln!(out, "  {:<12}{value}", field.label());
    }

    let homeworld = extras
        .homeworld
        .clone()
        .unwrap_or_else(|| format_field(&record.homeworld, None));
    let _ = writeln!(out, "  {:<12}{homeworld}", "Homeworld");
    for (label, items) in [
        ("Films", &record.films),
        ("Species", &record.species),
        ("Vehicles", &record.vehicles),
        ("Starships", &record.starships),
    ] {
        let _ = writeln!(out, "  {label:<12}{}", format_count(items));
    }
    let _ = writeln!(out, "  {:<12}{}", "Created", format_date(&record.created));
    let _ = writeln!(out, "  {:<12}{}", "Edited", format_date(&record.edited));
    if let Some(image) = &extras.image {
        let _ = writeln!(out, "  {:<12}{image}", "Image");
    }

    if !view.provenance.is_empty() {
        let _ = writeln!(out, "{}", style.dim("* edited locally"));
    }

    out
}
