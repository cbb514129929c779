//! Parle assistant CLI
//!
//! Terminal host for the engine. Provides:
//! - Default: interactive conversation over the loaded grammar files
//! - `ask` for a single turn and `check` for grammar validation

mod file_extension;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use file_extension::FileExtension;
use parle_core::config::{Config, Directories, FileSettings};
use parle_core::grammar::{self, Block, Entry, Item, WordSet};
use parle_core::{Engine, EngineUpdate, ReplyKind};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Parle assistant CLI
#[derive(Parser)]
#[command(name = "parle")]
#[command(about = "Parle - rule-based conversational assistant")]
#[command(version)]
#[command(after_help = "\
Examples:
  parle -g heure.xml -g web.xml          Start a conversation
  parle -g heure.xml ask quelle heure    Answer one message and exit
  parle check heure.xml                  Validate a grammar file

Inside a conversation:
  :1, :2 ...   Press the numbered button of the last reply
  :ext         List loaded extensions
  :q           Quit
")]
struct Cli {
    /// Grammar file to load as an extension (repeatable, order is match order)
    #[arg(short, long = "grammar", value_name = "FILE")]
    grammars: Vec<PathBuf>,

    /// Seed for reply selection (overrides `engine.rngSeed`)
    #[arg(long)]
    seed: Option<u64>,

    /// Use DIR for config.json and settings.json
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation (default)
    Repl,

    /// Answer a single message and exit
    Ask {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Parse a grammar file and print its items
    Check {
        /// Grammar file
        file: PathBuf,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parle={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match &cli.command {
        Some(Commands::Check { file }) => check_grammar(file),
        Some(Commands::Ask { text }) => {
            let mut session = Session::start(&cli)?;
            session.submit(&text.join(" "));
            Ok(())
        }
        Some(Commands::Repl) | None => run_repl(Session::start(&cli)?),
    }
}

/// Engine plus the terminal state between turns.
struct Session {
    engine: Engine,
    rx: UnboundedReceiver<EngineUpdate>,
    /// Actions behind the buttons of the last reply
    buttons: Vec<String>,
    quit: bool,
}

impl Session {
    fn start(cli: &Cli) -> Result<Self> {
        let dirs = match &cli.config_dir {
            Some(dir) => Directories::with_base(dir.clone()),
            None => Directories::new().context("Failed to resolve config directory")?,
        };
        dirs.ensure_exists()
            .with_context(|| format!("Failed to create {}", dirs.config.display()))?;

        let mut config = Config::load(&dirs.config_file)
            .with_context(|| format!("Failed to load {}", dirs.config_file.display()))?;
        if cli.seed.is_some() {
            config.engine.rng_seed = cli.seed;
        }
        let settings = FileSettings::open(&dirs.settings_file)
            .with_context(|| format!("Failed to load {}", dirs.settings_file.display()))?;

        let (mut engine, rx) = Engine::new(config, Box::new(settings));
        for path in &cli.grammars {
            let extension = FileExtension::load(path)?;
            engine
                .register(Box::new(extension))
                .with_context(|| format!("Failed to register {}", path.display()))?;
        }
        info!("Loaded {} extension(s)", engine.extension_ids().len());

        Ok(Self {
            engine,
            rx,
            buttons: Vec::new(),
            quit: false,
        })
    }

    fn submit(&mut self, text: &str) {
        self.engine.process(text);
        self.flush();
    }

    fn press(&mut self, number: usize) {
        let Some(action) = number
            .checked_sub(1)
            .and_then(|index| self.buttons.get(index))
            .cloned()
        else {
            println!("No button {number}");
            return;
        };
        debug!("Button {} -> {}", number, action);
        self.engine.execute_action(&action);
        self.flush();
    }

    /// Print everything the engine emitted since the last call.
    fn flush(&mut self) {
        let mut propositions_changed = false;
        while let Ok(update) = self.rx.try_recv() {
            match &update {
                EngineUpdate::Reply { urls, kind, .. } if *kind == ReplyKind::Message => {
                    self.buttons.clone_from(urls);
                }
                EngineUpdate::PropositionAdded { .. }
                | EngineUpdate::PropositionRemoved { .. }
                | EngineUpdate::PropositionsCleared => propositions_changed = true,
                EngineUpdate::QuitRequested => self.quit = true,
                _ => {}
            }
            if let Some(line) = render_update(&update, &self.engine) {
                println!("{line}");
            }
        }

        if propositions_changed && self.engine.settings().propositions_enabled {
            let shown = self.engine.propositions().shown();
            if !shown.is_empty() {
                println!("  » {}", shown.join(" | "));
            }
        }
    }
}

/// Terminal rendering of one update; proposition updates are summarised by the caller.
fn render_update(update: &EngineUpdate, engine: &Engine) -> Option<String> {
    match update {
        EngineUpdate::Reply {
            text, kind, urls, labels, ..
        } => Some(match kind {
            ReplyKind::Message => {
                let mut out = text.clone();
                for (index, label) in labels.iter().enumerate() {
                    out.push_str(&format!("\n  [{}] {label}", index + 1));
                }
                out
            }
            ReplyKind::Settings => {
                let settings = engine.settings();
                format!(
                    "Nom: {}\nPropositions: {}\nSon: {}",
                    settings.user_name, settings.propositions_enabled, settings.sound_enabled
                )
            }
            ReplyKind::WebWithoutActionBtn | ReplyKind::WebWithActionBtn => {
                format!("→ {}", urls.join(" "))
            }
        }),
        EngineUpdate::ShowGeneratedView { url } => Some(format!("→ {url}")),
        EngineUpdate::HideWindowRequested => Some("(hidden)".to_string()),
        EngineUpdate::ExtensionFound { id } => Some(format!("  - {id}")),
        EngineUpdate::ExtensionMessage {
            extension_id,
            message,
        } => Some(format!("[{extension_id}] {message}")),
        EngineUpdate::QuitRequested
        | EngineUpdate::PropositionAdded { .. }
        | EngineUpdate::PropositionRemoved { .. }
        | EngineUpdate::PropositionsCleared => None,
    }
}

fn run_repl(mut session: Session) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to open line editor")?;
    session.engine.show_base_propositions();
    session.flush();

    while !session.quit {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        remember(&mut editor, line);

        match line {
            ":q" => break,
            ":ext" => {
                session.engine.list_extensions();
                session.flush();
            }
            meta if meta.starts_with(':') => match meta[1..].parse::<usize>() {
                Ok(number) => session.press(number),
                Err(_) => println!("Unknown command: {meta}"),
            },
            text => session.submit(text),
        }
    }
    Ok(())
}

fn remember(editor: &mut DefaultEditor, line: &str) {
    if let Err(e) = editor.add_history_entry(line) {
        debug!("Failed to record history: {}", e);
    }
}

fn check_grammar(path: &Path) -> Result<()> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = match grammar::parse(&xml) {
        Ok(document) => document,
        Err(e) => bail!("{}: {e}", path.display()),
    };

    println!("{}", path.display());
    println!("  suggestions: {}", document.suggestions.len());
    for item in &document.items {
        print_item(item, 1);
    }
    Ok(())
}

fn print_item(item: &Item, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut header = format!(
        "{indent}item {}",
        item.id.as_deref().unwrap_or("(anonymous)")
    );
    if let Some(need_id) = &item.need_id {
        header.push_str(&format!(" -> {need_id}"));
    }
    println!("{header}");

    for block in &item.blocks {
        match block {
            Block::Keywords(keywords) => {
                let max = keywords
                    .max_word
                    .map_or_else(|| "∞".to_string(), |max| max.to_string());
                let sets: Vec<String> = keywords
                    .sets
                    .iter()
                    .map(|set| match set {
                        WordSet::Words(words) => format!("+{}", words.len()),
                        WordSet::NoWords(words) => format!("-{}", words.len()),
                    })
                    .collect();
                println!(
                    "{indent}  keywords {}..{max} [{}]",
                    keywords.min_word,
                    sets.join(" ")
                );
            }
            Block::Var(var) => println!(
                "{indent}  var {} (max {})",
                var.anchors.join("|"),
                var.max.map_or_else(|| "all".to_string(), |max| max.to_string())
            ),
            Block::Reply(entries) => println!("{indent}  reply {}", count_leaves(entries)),
            Block::Actions(entries) => println!("{indent}  actions {}", count_leaves(entries)),
            Block::Prop(propositions) => println!("{indent}  prop {}", propositions.len()),
            Block::Item(sub_item) => print_item(sub_item, depth + 1),
        }
    }
}

fn count_leaves(entries: &[Entry]) -> usize {
    entries
        .iter()
        .map(|entry| match entry {
            Entry::Leaf(_) => 1,
            Entry::Condition { body, .. } | Entry::Else(body) => count_leaves(body),
        })
        .sum()
}
