use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use atty::Stream;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;
use wikireader_rs::config::DEFAULT_API_BASE;
use wikireader_rs::render::Layout;
use wikireader_rs::{FetchConfig, Reader, ReaderConfig, RelatedTopics, Theme, ThemeStore, Topic};

#[derive(Parser, Debug)]
#[command(name = "wikireader", about = "Read encyclopedia articles", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Scheme and host of the encyclopedia API.
    #[arg(long, global = true, default_value = DEFAULT_API_BASE)]
    api_base: String,
    /// User-Agent sent with every request.
    #[arg(long, global = true)]
    user_agent: Option<String>,
    /// Request timeout; requests wait indefinitely when unset.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// File holding the persisted theme.
    #[arg(long, global = true, default_value = ".wikireader/theme.json")]
    theme_file: PathBuf,
}

impl SourceArgs {
    fn reader_config(&self) -> ReaderConfig {
        let mut fetch = FetchConfig::default().with_api_base(self.api_base.clone());
        if let Some(agent) = &self.user_agent {
            fetch.user_agent = agent.clone();
        }
        fetch.timeout = self.timeout_secs.map(Duration::from_secs);
        ReaderConfig {
            fetch,
            theme_path: Some(self.theme_file.clone()),
            ..ReaderConfig::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the reader page over HTTP.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: std::net::SocketAddr,
    },
    /// Fetch, sanitize and lay out one article.
    Show {
        /// Topic to load, e.g. "Quantum Computing".
        topic: String,
        /// Print the rendered content-region markup.
        #[arg(long)]
        html: bool,
    },
    /// List the suggested follow-up topics for a topic.
    Related {
        /// Topic to look up (exact, case-sensitive).
        topic: String,
    },
    /// Read or change the persisted theme.
    #[command(subcommand)]
    Theme(ThemeCommand),
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    /// Print the current theme.
    Get,
    /// Persist a theme.
    Set {
        /// `light` or `dark`.
        theme: Theme,
    },
    /// Switch between light and dark.
    Toggle,
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.source.reader_config();
    match cli.command {
        #[cfg(feature = "web")]
        Command::Serve { addr } => {
            init_tracing("wikireader_rs=info,tower_http=info");
            let reader = Reader::from_config(&config)?;
            let web_config = wikireader_rs::web::WebConfig { addr };
            runtime()?.block_on(wikireader_rs::web::serve(reader, web_config))?;
            Ok(())
        }
        Command::Show { topic, html } => {
            init_tracing("warn");
            runtime()?.block_on(handle_show(&config, topic, html, cli.json))
        }
        Command::Related { topic } => handle_related(&topic, cli.json),
        Command::Theme(command) => handle_theme(command, &config, cli.json),
    }
}

fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

async fn handle_show(
    config: &ReaderConfig,
    topic: String,
    as_html: bool,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let reader = Reader::from_config(config)?;
    let topic = Topic::from(topic);

    if as_html {
        let (_, html) = reader.render_topic(&topic).await?;
        println!("{html}");
        return Ok(());
    }

    let view = reader.article_view(&topic).await?;
    if as_json {
        let (content, info) = match &view.layout {
            Layout::Full { body_html } => (Some(body_html.as_str()), Vec::new()),
            Layout::Summary { info } => (
                None,
                info.iter()
                    .map(|row| json!({ "label": row.label, "value": row.value }))
                    .collect(),
            ),
        };
        let payload = json!({
            "topic": view.topic,
            "layout": view.kind().as_str(),
            "title": view.title,
            "description": view.description,
            "extract": view.extract,
            "page_url": view.page_url,
            "updated": view.updated,
            "content": content,
            "info": info,
            "related": view.related.iter().map(|link| &link.topic).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", view.title);
    println!("{}", view.description);
    if let Some(updated) = &view.updated {
        println!("Updated: {updated}");
    }
    println!("Source: {}", view.page_url);
    match &view.layout {
        Layout::Full { body_html } => {
            render_markdown_block("Summary", &view.extract);
            println!("\nFull article available ({} bytes of markup, use --html).", body_html.len());
        }
        Layout::Summary { info } => {
            render_markdown_block("Comprehensive Summary", &view.extract);
            println!();
            let width = info.iter().map(|row| row.label.len()).max().unwrap_or(0);
            for row in info {
                println!("{:<width$}  {}", row.label, row.value, width = width);
            }
        }
    }
    let related: Vec<_> = view.related.iter().map(|link| link.topic.as_str()).collect();
    println!("\nRelated Topics: {}", related.join(", "));
    Ok(())
}

fn handle_related(topic: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let related = RelatedTopics::curated().resolve(topic);
    if as_json {
        let payload = json!({ "topic": topic, "related": related });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Related to \"{topic}\":");
        for suggestion in related {
            println!("- {suggestion}");
        }
    }
    Ok(())
}

fn handle_theme(
    command: ThemeCommand,
    config: &ReaderConfig,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let store = match &config.theme_path {
        Some(path) => ThemeStore::persistent(path),
        None => ThemeStore::ephemeral(),
    };
    let theme = match command {
        ThemeCommand::Get => store.get(),
        ThemeCommand::Set { theme } => {
            store.set(theme);
            theme
        }
        ThemeCommand::Toggle => store.toggle(),
    };
    if as_json {
        let payload = json!({ "theme": theme, "label": theme.switch_label() });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{theme} (switcher shows \"{}\")", theme.switch_label());
    }
    Ok(())
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn markdown_skin() -> MadSkin {
    MadSkin::default()
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    println!("\n{title}:");
    if stdout_is_tty() {
        let skin = markdown_skin();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}");
    }
}
