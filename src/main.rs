//! CLI entry point for `tridesk`.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use serde::Deserialize;

use tridesk::config::Config;
use tridesk::export::attachment::download_attachment;
use tridesk::i18n;
use tridesk::model::recurrence::RecurrenceUiState;
use tridesk::{
    AttachmentRef, MemoryAttachmentStore, MessageNormalizer, NormalizedMessage, RawMessage,
};

#[derive(Parser)]
#[command(name = "tridesk", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Language (en, es). Defaults to system locale.
    #[arg(long, value_name = "LANG", global = true)]
    lang: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw messages from a JSON file
    Normalize {
        /// JSON file holding one raw message or an array of them
        file: PathBuf,
        /// JSON attachment store used to fetch inline images
        #[arg(short, long, value_name = "STORE")]
        attachments: Option<PathBuf>,
        /// Credential passed to the attachment fetcher
        #[arg(long, default_value = "")]
        token: String,
        #[arg(long)]
        json: bool,
    },
    /// Save one attachment from an attachment store
    Attachment {
        message_id: String,
        attachment_id: String,
        #[arg(short, long, value_name = "STORE")]
        attachments: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// File name to save as (defaults to the attachment id)
        #[arg(long)]
        filename: Option<String>,
        /// Credential passed to the attachment fetcher
        #[arg(long, default_value = "")]
        token: String,
    },
    /// Parse, describe and convert recurrence rules
    Rrule {
        #[command(subcommand)]
        action: RruleAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(Subcommand)]
enum RruleAction {
    /// Describe a rule in words
    Describe { rule: String },
    /// Show the structured rule and its canonical form
    Parse { rule: String },
    /// Convert a rule to form state (JSON)
    ToUi { rule: String },
    /// Convert form state to a rule
    FromUi {
        /// JSON file, or '-' for stdin
        state: PathBuf,
    },
}

/// One raw message or many, as stored in an input file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Many(Vec<RawMessage>),
    One(Box<RawMessage>),
}

/// Detect language early from --lang arg, config or system env, before clap
/// processes --help.
fn detect_lang_early(config: &Config) -> i18n::Lang {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--lang" {
            if let Some(lang) = args.get(i + 1).and_then(|c| i18n::Lang::from_code(c)) {
                return lang;
            }
        }
        if let Some(lang) = args[i]
            .strip_prefix("--lang=")
            .and_then(i18n::Lang::from_code)
        {
            return lang;
        }
    }
    config
        .general
        .lang
        .as_deref()
        .and_then(i18n::Lang::from_code)
        .unwrap_or_else(i18n::detect_system_lang)
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    let cmd = Cli::command()
        .about(i18n::app_about())
        .long_about(i18n::app_long_about())
        .mut_arg("verbose", |a| a.help(i18n::help_verbose()))
        .mut_arg("lang", |a| a.help(i18n::help_lang()));

    cmd.mut_subcommand("normalize", |s| {
        s.about(i18n::help_cmd_normalize())
            .mut_arg("json", |a| a.help(i18n::help_output_json()))
    })
    .mut_subcommand("attachment", |s| s.about(i18n::help_cmd_attachment()))
    .mut_subcommand("rrule", |s| {
        s.about(i18n::help_cmd_rrule())
            .mut_subcommand("describe", |s| s.about(i18n::help_cmd_rrule_describe()))
            .mut_subcommand("parse", |s| s.about(i18n::help_cmd_rrule_parse()))
            .mut_subcommand("to-ui", |s| s.about(i18n::help_cmd_rrule_to_ui()))
            .mut_subcommand("from-ui", |s| s.about(i18n::help_cmd_rrule_from_ui()))
    })
    .mut_subcommand("completions", |s| s.about(i18n::help_cmd_completions()))
    .mut_subcommand("manpage", |s| s.about(i18n::help_cmd_manpage()))
}

fn main() -> anyhow::Result<()> {
    let config = tridesk::config::load_config();

    // Detect language BEFORE clap parsing so --help is localized
    i18n::set_lang(detect_lang_early(&config));

    let matches = build_localized_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Normalize {
            file,
            attachments,
            token,
            json,
        } => cmd_normalize(&file, attachments.as_deref(), &token, json, &config),
        Commands::Attachment {
            message_id,
            attachment_id,
            attachments,
            output,
            filename,
            token,
        } => cmd_attachment(
            &message_id,
            &attachment_id,
            &attachments,
            &output,
            filename.as_deref(),
            &token,
        ),
        Commands::Rrule { action } => cmd_rrule(action),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = tridesk::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "tridesk.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "tridesk", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let man = clap_mangen::Man::new(Cli::command());
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    if !path.exists() {
        anyhow::bail!("{}: {}", i18n::err_file_not_found(), path.display());
    }
    Ok(std::fs::read_to_string(path)?)
}

fn open_store(path: Option<&Path>) -> anyhow::Result<MemoryAttachmentStore> {
    match path {
        Some(path) if !path.exists() => {
            anyhow::bail!("{}: {}", i18n::err_file_not_found(), path.display())
        }
        Some(path) => Ok(MemoryAttachmentStore::open(path)?),
        None => Ok(MemoryAttachmentStore::new()),
    }
}

/// Normalize every message in a JSON file and print the result.
fn cmd_normalize(
    path: &Path,
    attachments: Option<&Path>,
    token: &str,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let raws = match serde_json::from_str::<RawInput>(&read_input(path)?)? {
        RawInput::Many(raws) => raws,
        RawInput::One(raw) => vec![*raw],
    };
    let store = open_store(attachments)?;
    let normalizer = MessageNormalizer::with_config(store, &config.mail);

    let runtime = tokio::runtime::Runtime::new()?;
    let messages = runtime.block_on(normalizer.normalize_batch(&raws, token));

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
    } else {
        print_messages_table(&messages, &config.general.date_format);
        let dropped = raws.len() - messages.len();
        if dropped > 0 {
            println!("  {dropped} {}", i18n::msg_dropped_malformed());
            println!();
        }
    }
    Ok(())
}

/// Print normalized messages in a human-readable layout.
fn print_messages_table(messages: &[NormalizedMessage], date_format: &str) {
    println!();
    println!("  {} {}", messages.len(), i18n::msg_messages());

    for message in messages {
        let date = message.headers.display_date(date_format);
        let labels: Vec<&str> = message.label_ids.iter().map(String::as_str).collect();

        println!();
        println!("  [{}]", message.id);
        println!("  {:<20} {}", i18n::msg_subject(), message.headers.subject);
        println!("  {:<20} {}", i18n::msg_from(), message.headers.from);
        println!("  {:<20} {}", i18n::msg_to(), message.headers.to);
        println!("  {:<20} {}", i18n::msg_date(), date);
        println!("  {:<20} {}", i18n::msg_labels(), labels.join(", "));
        println!("  {:<20} {}", i18n::msg_body_length(), message.body.len());
        println!(
            "  {:<20} {}",
            i18n::msg_inline_images(),
            message.inline_images.len()
        );
        if !message.attachments.is_empty() {
            println!("  {}:", i18n::msg_attachments());
            for att in &message.attachments {
                println!(
                    "    {:>10}  {}  ({})",
                    att.display_size(),
                    att.filename,
                    att.mime_type
                );
            }
        }
    }
    println!();
}

/// Fetch one attachment from a JSON store and save it.
fn cmd_attachment(
    message_id: &str,
    attachment_id: &str,
    store_path: &Path,
    output: &Path,
    filename: Option<&str>,
    token: &str,
) -> anyhow::Result<()> {
    let store = open_store(Some(store_path))?;
    let mime_type = store
        .get(message_id, attachment_id)
        .and_then(|f| f.mime_type.clone())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let attachment = AttachmentRef {
        attachment_id: attachment_id.to_string(),
        filename: filename.unwrap_or(attachment_id).to_string(),
        mime_type,
        size: 0,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let path = runtime.block_on(download_attachment(
        &store,
        message_id,
        &attachment,
        token,
        output,
    ))?;
    println!("  {} {}", i18n::msg_saved_to(), path.display());
    Ok(())
}

fn cmd_rrule(action: RruleAction) -> anyhow::Result<()> {
    match action {
        RruleAction::Describe { rule } => {
            let description = tridesk::describe_recurrence(&rule);
            println!("  {:<10} {}", i18n::msg_short_label(), description.short_label);
            println!(
                "  {:<10} {}",
                i18n::msg_full_description(),
                description.full_description
            );
        }
        RruleAction::Parse { rule } => {
            let parsed = tridesk::parse_recurrence_rule(&rule);
            if parsed.is_none() {
                eprintln!("{}: {rule:?}", i18n::err_not_a_rule());
            }
            let output = serde_json::json!({
                "rule": parsed,
                "canonical": parsed.as_ref().map(tridesk::build_recurrence_rule),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        RruleAction::ToUi { rule } => {
            let state = tridesk::recurrence_to_ui_state(&rule);
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        RruleAction::FromUi { state } => {
            let state: RecurrenceUiState = serde_json::from_str(&read_input(&state)?)?;
            println!("{}", tridesk::ui_state_to_recurrence(&state));
        }
    }
    Ok(())
}
