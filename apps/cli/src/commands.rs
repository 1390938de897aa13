//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use docbrief_core::{GeminiInvoker, PipelineProgress, Session};
use docbrief_extract::UploadedDocument;
use docbrief_shared::{AppConfig, BlogArtifacts, Stage, init_config, load_config, validate_api_key};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docbrief: chat with PDFs and turn them into blog posts.
#[derive(Parser)]
#[command(
    name = "docbrief",
    version,
    about = "Ask questions about PDF documents and generate blog posts from them with Gemini.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Documents to process before running a command.
#[derive(Args, Debug)]
pub(crate) struct DocumentArgs {
    /// PDF files, processed in the order given.
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Directory receiving a copy of each file (overrides `uploads.data_dir`).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Interactive question answering over the given documents.
    Chat {
        #[command(flatten)]
        docs: DocumentArgs,
    },

    /// Ask a single question and print the answer.
    Ask {
        #[command(flatten)]
        docs: DocumentArgs,

        /// The question to answer.
        #[arg(short, long)]
        question: String,
    },

    /// Generate a research brief and a blog post from the documents.
    Blog {
        #[command(flatten)]
        docs: DocumentArgs,

        /// Write the brief to this file instead of stdout.
        #[arg(long)]
        brief_out: Option<PathBuf>,

        /// Write the post to this file instead of stdout.
        #[arg(long)]
        post_out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so answers on
/// stdout stay clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docbrief=warn",
        1 => "docbrief=info",
        2 => "docbrief=debug",
        _ => "docbrief=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Chat { docs } => cmd_chat(&docs).await,
        Command::Ask { docs, question } => cmd_ask(&docs, &question).await,
        Command::Blog {
            docs,
            brief_out,
            post_out,
        } => cmd_blog(&docs, brief_out.as_deref(), post_out.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// Load config, check the credential, and build the two invokers
/// (chat model, agent model).
fn build_invokers(config: &AppConfig) -> Result<(GeminiInvoker, GeminiInvoker)> {
    let api_key = validate_api_key(config)?;
    let chat = GeminiInvoker::new(api_key.clone(), &config.gemini.chat_model, &config.gemini)?;
    let agent = GeminiInvoker::new(api_key, &config.gemini.agent_model, &config.gemini)?;
    Ok((chat, agent))
}

/// Save copies of the files, extract their text, and load it into a new session.
async fn process_documents(config: &AppConfig, args: &DocumentArgs) -> Result<Session> {
    let spinner = Spinner::new("Processing PDF...");

    let docs = args
        .files
        .iter()
        .map(|path| UploadedDocument::from_path(path))
        .collect::<docbrief_shared::Result<Vec<_>>>()?;

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| config.uploads.data_dir.clone());
    let saved = docbrief_extract::save_uploads(&data_dir, &docs)?;

    let text = tokio::task::spawn_blocking(move || docbrief_extract::extract_text(&docs))
        .await
        .wrap_err("text extraction task failed")?;

    spinner.finish();

    let mut session = Session::new(&config.chat);
    session.process(text);

    if !session.has_corpus() {
        return Err(eyre!(
            "no text could be extracted from the given file(s); scanned or corrupt PDFs are not supported"
        ));
    }

    info!(session = %session.id(), files = saved.len(), "documents processed");
    eprintln!(
        "Processed and saved {} PDF(s) to '{}'.",
        saved.len(),
        data_dir.display()
    );

    Ok(session)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ask(args: &DocumentArgs, question: &str) -> Result<()> {
    let config = load_config()?;
    let (chat, _agent) = build_invokers(&config)?;
    let mut session = process_documents(&config, args).await?;

    let spinner = Spinner::new("Gemini is thinking...");
    let answer = session.ask(&chat, question).await;
    spinner.finish();

    println!("{}", answer?);
    Ok(())
}

async fn cmd_blog(args: &DocumentArgs, brief_out: Option<&Path>, post_out: Option<&Path>) -> Result<()> {
    let config = load_config()?;
    let (_chat, agent) = build_invokers(&config)?;
    let session = process_documents(&config, args).await?;

    let spinner = Spinner::new("Starting blog pipeline");
    let result = session.create_blog_post(&agent, &spinner).await;
    spinner.finish();

    let artifacts = result?;
    emit_artifacts(&artifacts, brief_out, post_out)
}

async fn cmd_chat(args: &DocumentArgs) -> Result<()> {
    let config = load_config()?;
    let (chat, agent) = build_invokers(&config)?;
    let mut session = process_documents(&config, args).await?;

    println!("Ask a question about your PDF. Commands: /reset, /blog, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ChatInput::parse(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Reset => {
                session.reset();
                println!("Chat history cleared.");
            }
            ChatInput::Blog => {
                let spinner = Spinner::new("Starting blog pipeline");
                let result = session.create_blog_post(&agent, &spinner).await;
                spinner.finish();
                match result {
                    Ok(artifacts) => emit_artifacts(&artifacts, None, None)?,
                    Err(e) => eprintln!("An error occurred: {e}"),
                }
            }
            ChatInput::Question(question) => {
                let spinner = Spinner::new("Gemini is thinking...");
                let result = session.ask(&chat, question).await;
                spinner.finish();
                match result {
                    Ok(answer) => println!("\n{answer}\n"),
                    Err(e) => eprintln!("An error occurred: {e}"),
                }
            }
        }
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Chat input
// ---------------------------------------------------------------------------

/// One line typed into the chat loop.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Empty,
    Quit,
    Reset,
    Blog,
    Question(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "/quit" | "/exit" => Self::Quit,
            "/reset" | "/clear" => Self::Reset,
            "/blog" => Self::Blog,
            question => Self::Question(question),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Print both artifacts, or write each one to its file when a path is given.
fn emit_artifacts(artifacts: &BlogArtifacts, brief_out: Option<&Path>, post_out: Option<&Path>) -> Result<()> {
    match brief_out {
        Some(path) => write_artifact(path, &artifacts.brief)?,
        None => println!("## Research Brief\n\n{}\n", artifacts.brief),
    }
    match post_out {
        Some(path) => write_artifact(path, &artifacts.post)?,
        None => println!("## Final Blog Post\n\n{}\n", artifacts.post),
    }
    Ok(())
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown while a model call or extraction is in flight.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl PipelineProgress for Spinner {
    fn stage_started(&self, stage: Stage) {
        let message = match stage {
            Stage::Research => "Research Analyst is reading the documents...",
            Stage::Write => "Blog Writer is drafting the post...",
        };
        self.bar.set_message(message);
    }

    fn stage_finished(&self, stage: Stage, artifact_chars: usize) {
        self.bar
            .set_message(format!("{stage} stage done ({artifact_chars} chars)"));
    }
}
