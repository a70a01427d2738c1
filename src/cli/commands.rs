use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

use crate::clipboard::copy_to_clipboard;
use crate::config::{ClientConfig, DEFAULT_SERVER, LogTarget, SERVER_ENV, init_logging};
use crate::gateway::{ConversionGateway, HttpTransport};
use crate::history::{
    Answered, Confirm, HistoryItemView, HistoryStore, PreviewAction, PromptConfirm,
    RecentFormats, dump_local, perform_download, project, render_table, save_archive,
};
use crate::models::{
    ConversionKind, ConversionOutcome, FormatCatalog, HistoryRecord, ImageSettings, OptionTags,
    PendingConversionRequest,
};
use crate::preview::PreviewContent;
use crate::storage::FileStorage;
use crate::tui::run_tui;
use crate::utils::{DATA_DIR_ENV, default_data_dir, default_download_dir, sanitize_for_terminal};

#[derive(Parser)]
#[command(name = "convert-desk")]
#[command(version)]
#[command(
    about = "Convert documents, text and images through a conversion server",
    long_about = None
)]
pub struct Cli {
    /// Conversion server base URL
    #[arg(long, global = true, env = SERVER_ENV, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Directory holding history, recent formats and the theme
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a conversion and record it in history
    Convert {
        #[command(subcommand)]
        source: ConvertSource,
    },
    /// Inspect and manage conversion history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Preview a local file without converting it
    Preview { path: PathBuf },
    /// List formats supported by the server
    Formats,
    /// Start the interactive interface
    Tui,
}

#[derive(Subcommand)]
pub enum ConvertSource {
    /// Convert a document file
    File {
        path: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Convert text given inline or on stdin
    Text {
        /// Text to convert; read from stdin when omitted
        text: Option<String>,
        #[arg(long, default_value = "markdown")]
        from: String,
        #[arg(long, default_value = "html")]
        to: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Convert base64 content given inline or on stdin
    Base64 {
        /// Base64 payload; read from stdin when omitted
        data: Option<String>,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Convert an image to another format
    Image {
        path: PathBuf,
        #[arg(long)]
        to: String,
        /// Output quality, 1-100
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,
        /// Target size such as 800x600
        #[arg(long)]
        resize: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
pub struct OutputArgs {
    /// Extra converter option; repeat for several
    #[arg(short = 'o', long = "option", allow_hyphen_values = true)]
    pub options: Vec<String>,

    /// Save the result into this directory instead of printing it
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Copy the result to the clipboard
    #[arg(long)]
    pub copy: bool,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// Show stored conversions, newest first
    List,
    /// Delete one record by its list index
    Remove { index: usize },
    /// Delete every record
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Save the result of one record
    Download {
        index: usize,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Show the result of one record
    Preview { index: usize },
    /// Ask the server for a ZIP of the whole history
    Export {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Write the raw history as JSON without contacting the server
    Dump {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<()> {
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let config = ClientConfig::new(&cli.server, data_dir)?;

    let target = match cli.command {
        Some(Commands::Tui) => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    init_logging(cli.verbose, target, &config.data_dir)?;
    debug!(
        server = %config.server_url,
        data_dir = %config.data_dir.display(),
        "Resolved config"
    );

    match cli.command {
        Some(Commands::Convert { source }) => convert(&config, source)?,
        Some(Commands::History { action }) => history(&config, action)?,
        Some(Commands::Preview { path }) => preview_file(&path)?,
        Some(Commands::Formats) => formats(&config)?,
        Some(Commands::Tui) => run_tui(&config)?,
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
    Ok(buf)
}

fn build_request(source: ConvertSource) -> Result<(PendingConversionRequest, OutputArgs)> {
    let (request, output) = match source {
        ConvertSource::File { path, from, to, output } => {
            (PendingConversionRequest::file(path, &from, &to), output)
        }
        ConvertSource::Text { text, from, to, output } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            (PendingConversionRequest::text(text, &from, &to), output)
        }
        ConvertSource::Base64 { data, from, to, output } => {
            let data = match data {
                Some(data) => data,
                None => read_stdin()?,
            };
            (PendingConversionRequest::base64(data.trim(), &from, &to), output)
        }
        ConvertSource::Image { path, to, quality, resize, output } => {
            let request = PendingConversionRequest::image(path, &to)
                .with_image_settings(ImageSettings { quality, resize });
            (request, output)
        }
    };
    let options: OptionTags = output.options.iter().collect();
    Ok((request.with_options(options), output))
}

fn convert(config: &ClientConfig, source: ConvertSource) -> Result<()> {
    let (request, output) = build_request(source)?;
    request.validate()?;

    let gateway = config.gateway()?;
    let mut store = HistoryStore::new(config.open_storage()?);

    let outcome = gateway.submit(&request)?;
    let record = store.append(HistoryRecord::from_outcome(
        request.display_name(),
        request.kind,
        &request.from_format,
        &request.to_format,
        &outcome,
        Utc::now(),
    ));

    if request.kind != ConversionKind::Image {
        let mut recent = RecentFormats::load(store.storage());
        recent.record(&request.from_format, &request.to_format);
        recent.save(store.storage_mut());
    }

    report_outcome(&gateway, &record, &outcome, &output)
}

fn report_outcome<T: HttpTransport>(
    gateway: &ConversionGateway<T>,
    record: &HistoryRecord,
    outcome: &ConversionOutcome,
    output: &OutputArgs,
) -> Result<()> {
    let view = project(std::slice::from_ref(record)).pop();

    if let Some(dir) = &output.out_dir {
        match view.and_then(|item| item.download) {
            Some(action) => {
                let path = perform_download(&action, gateway, dir)?;
                println!("Saved {}", path.display());
            }
            None => bail!("The server returned nothing to save"),
        }
    } else if let Some(url) = &outcome.download_url {
        println!("Download: {}", gateway.absolute_url(url));
    } else if let Some(content) = &outcome.content {
        println!("{}", content);
    } else if let Some(base64) = &outcome.base64 {
        println!("{}", base64);
    } else {
        println!("Conversion completed (no content returned)");
    }

    if output.copy {
        let text = outcome
            .content
            .clone()
            .or_else(|| outcome.base64.clone())
            .or_else(|| outcome.download_url.as_deref().map(|u| gateway.absolute_url(u)));
        match text {
            Some(text) => {
                copy_to_clipboard(&text)?;
                eprintln!("Copied to clipboard");
            }
            None => bail!("Nothing to copy"),
        }
    }
    Ok(())
}

fn item_at(items: &[HistoryItemView], index: usize) -> Result<&HistoryItemView> {
    items.get(index).with_context(|| format!("No history item at index {}", index))
}

fn history(config: &ClientConfig, action: HistoryCommand) -> Result<()> {
    let mut store: HistoryStore<FileStorage> = HistoryStore::new(config.open_storage()?);
    let items = project(&store.list());

    match action {
        HistoryCommand::List => print!("{}", render_table(&items)),
        HistoryCommand::Remove { index } => {
            let title = item_at(&items, index)?.title.clone();
            store.remove(index);
            println!("Removed {}", sanitize_for_terminal(&title));
        }
        HistoryCommand::Clear { yes } => {
            if items.is_empty() {
                println!("History is already empty");
                return Ok(());
            }
            let mut confirm: Box<dyn Confirm> =
                if yes { Box::new(Answered(true)) } else { Box::new(PromptConfirm::stdio()) };
            if store.clear(confirm.as_mut()) {
                println!("Conversion history cleared");
            } else {
                println!("Cancelled");
            }
        }
        HistoryCommand::Download { index, out_dir } => {
            let action = item_at(&items, index)?
                .download
                .clone()
                .with_context(|| format!("History item {} has no stored result", index))?;
            let dir = out_dir.unwrap_or_else(default_download_dir);
            let path = perform_download(&action, &config.gateway()?, &dir)?;
            println!("Saved {}", path.display());
        }
        HistoryCommand::Preview { index } => {
            let item = item_at(&items, index)?;
            let content = match &item.preview {
                Some(PreviewAction::ShowText { title, content }) => {
                    PreviewContent::for_text(title, content)
                }
                Some(PreviewAction::Embed { url, category }) => {
                    let source = config.gateway()?.absolute_url(url);
                    PreviewContent::for_reference(&item.title, &source, *category)
                }
                None => bail!("History item {} has no preview", index),
            };
            print_preview(&content);
        }
        HistoryCommand::Export { out_dir } => {
            let records = store.list();
            let archive = config.gateway()?.export_history(&records)?;
            let path = save_archive(&archive, &out_dir.unwrap_or_else(default_download_dir))?;
            println!("Saved {}", path.display());
        }
        HistoryCommand::Dump { out_dir } => {
            let records = store.list();
            if records.is_empty() {
                bail!("No conversion history to download");
            }
            let path = dump_local(&records, &out_dir.unwrap_or_else(default_download_dir))?;
            println!("Saved {}", path.display());
        }
    }

    Ok(())
}

fn print_preview(content: &PreviewContent) {
    let title = sanitize_for_terminal(&content.title);
    println!("{} [{}]", title, content.category.label());
    println!("{}", "=".repeat(title.chars().count().max(8)));
    for line in content.lines() {
        println!("{}", sanitize_for_terminal(&line));
    }
}

fn preview_file(path: &Path) -> Result<()> {
    let content = PreviewContent::for_local_file(path)?;
    print_preview(&content);
    Ok(())
}

fn formats(config: &ClientConfig) -> Result<()> {
    let catalog = match config.gateway()?.fetch_formats() {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, "Falling back to built-in format list");
            eprintln!("Server unavailable ({}), showing built-in formats", e);
            FormatCatalog::default()
        }
    };

    let recent = RecentFormats::load(&config.open_storage()?);
    if !recent.from.is_empty() {
        println!("Recent input formats: {}", recent.from.join(", "));
        println!("Recent output formats: {}", recent.to.join(", "));
        println!();
    }
    println!("Input formats: {}", catalog.input_formats.join(", "));
    println!("Output formats: {}", catalog.output_formats.join(", "));
    Ok(())
}
