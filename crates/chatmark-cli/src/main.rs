use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chatmark_core::{HtmlEmitOptions, ListNumbering, render_markdown, render_markdown_sanitized};
use chatmark_renderer::{Renderer, Theme};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const FENCE: &str = "```";

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(about = "Render chat-flavored markdown answers to HTML")]
struct Cli {
    /// Input file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Output file (writes stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input is an ask response: {"answer": "...", "context": ["..."]}
    #[arg(long)]
    answer_json: bool,

    /// Append the response's context excerpts under a Sources header
    #[arg(long, requires = "answer_json")]
    with_context: bool,

    /// Clean the output against the renderer's tag allow-list
    #[arg(long)]
    sanitized: bool,

    /// Extra class for the outer wrapper element
    #[arg(long = "class", value_name = "CLASS")]
    class: Option<String>,

    /// How numbered list items are labelled
    #[arg(long, value_enum)]
    numbering: Option<NumberingArg>,

    /// TOML file with render options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Wrap the fragment in a complete HTML page with inline CSS
    #[arg(long)]
    standalone: bool,

    /// With --standalone, write chatmark.css into DIR and link it instead of inlining
    #[arg(long, value_name = "DIR", requires = "standalone")]
    css_dir: Option<PathBuf>,

    /// Palette for --standalone: auto, light or dark
    #[arg(long, default_value = "auto", value_parser = parse_theme)]
    theme: Theme,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum NumberingArg {
    Running,
    Source,
}

impl From<NumberingArg> for ListNumbering {
    fn from(value: NumberingArg) -> Self {
        match value {
            NumberingArg::Running => ListNumbering::Running,
            NumberingArg::Source => ListNumbering::Source,
        }
    }
}

/// Body of the backend's ask endpoint.
#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: String,
    #[serde(default)]
    context: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let options = load_options(&cli)?;
    let input = read_input(cli.input.as_deref())?;

    let message = if cli.answer_json {
        answer_message(&input, cli.with_context)?
    } else {
        strip_final_newline(&input).to_string()
    };
    debug!(bytes = message.len(), sanitized = cli.sanitized, "rendering message");

    let html = if cli.sanitized {
        render_markdown_sanitized(&message, &options)
    } else {
        render_markdown(&message, &options)
    };
    let html = if cli.standalone {
        let renderer = Renderer::new(cli.theme);
        if let Some(dir) = &cli.css_dir {
            renderer
                .generate_files(dir)
                .with_context(|| format!("failed to write stylesheet to {}", dir.display()))?;
        }
        renderer.embed_html(&html, cli.css_dir.is_none())
    } else {
        html
    };

    write_output(cli.output.as_deref(), &html)
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::from_name(value).ok_or_else(|| format!("unknown theme {:?} (auto | light | dark)", value))
}

fn load_options(cli: &Cli) -> Result<HtmlEmitOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => HtmlEmitOptions::default(),
    };
    if let Some(class) = &cli.class {
        options.wrapper_class = Some(class.clone());
    }
    if let Some(numbering) = cli.numbering {
        options.numbering = numbering.into();
    }
    debug!(
        numbering = ?options.numbering,
        wrapper_class = ?options.wrapper_class,
        "render options"
    );
    Ok(options)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

// Files and pipes end with a newline the chat message itself does not have.
fn strip_final_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

fn answer_message(payload: &str, with_context: bool) -> Result<String> {
    let response: AskResponse =
        serde_json::from_str(payload).context("input is not an ask response")?;
    debug!(excerpts = response.context.len(), "decoded ask response");
    if !with_context || response.context.is_empty() {
        return Ok(response.answer);
    }

    let mut message = response.answer;
    message.push_str("\n\n### Sources");
    for excerpt in &response.context {
        message.push('\n');
        message.push_str(FENCE);
        message.push('\n');
        // An excerpt must not close its fence early.
        message.push_str(&excerpt.trim().replace(FENCE, "'''"));
        message.push('\n');
        message.push_str(FENCE);
    }
    Ok(message)
}

fn write_output(path: Option<&Path>, html: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(html.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write stdout")
        }
    }
}
