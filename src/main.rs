use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use converter::{CONVERSION_ERROR_PREFIX, MarkdownConfig, NoteFormatConverter, debug};
use mimalloc::MiMalloc;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MARKDOWN_EXTENSION: &str = "md";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Markdown,
    Plain,
    Outline,
}

/// Convert a note saved by the editor (HTML) into Markdown or plain text.
#[derive(Debug, Parser)]
#[command(name = "nottak", version, about)]
struct ConvertOptions {
    /// Input HTML file; stdin when absent or `-`
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
    format: Format,

    /// Output file (stdout when absent); Markdown output gets a `.md` suffix when missing
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Marker for unordered list entries
    #[arg(long, default_value_t = '-')]
    bullet: char,

    /// Do not insert spaces between adjacent inline pieces
    #[arg(long)]
    no_join: bool,

    /// Start the output with the document title
    #[arg(long)]
    with_title: bool,

    /// Write an error line instead of failing when the input does not parse
    #[arg(long)]
    lenient: bool,

    /// Maximum number of lines in the outline format
    #[arg(long, default_value_t = 500)]
    outline_cap: usize,

    /// Log parser activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl ConvertOptions {
    fn markdown_config(&self) -> MarkdownConfig {
        MarkdownConfig {
            bullet: self.bullet,
            join_inline: !self.no_join,
        }
    }
}

fn markdown_path(path: &Path) -> PathBuf {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION))
    {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(MARKDOWN_EXTENSION);
    PathBuf::from(name)
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut html = String::new();
            io::stdin()
                .read_to_string(&mut html)
                .context("failed to read stdin")?;
            Ok(html)
        }
    }
}

fn convert(options: &ConvertOptions, html: &str) -> Result<String> {
    let converter = match NoteFormatConverter::from_html_with_config(html, options.markdown_config())
    {
        Ok(converter) => converter,
        Err(err) if options.lenient => {
            log::warn!(target: "nottak", "{err}");
            return Ok(format!("{CONVERSION_ERROR_PREFIX}{err}\n"));
        }
        Err(err) => return Err(err).context("input is not a valid note document"),
    };

    let body = match options.format {
        Format::Markdown => converter.to_markdown(),
        Format::Plain => converter.to_plain_text(),
        Format::Outline => {
            let mut lines = debug::outline(converter.root(), options.outline_cap).join("\n");
            lines.push('\n');
            lines
        }
    };

    let title = converter.title();
    if !options.with_title || title.is_empty() {
        return Ok(body);
    }
    Ok(match options.format {
        Format::Markdown => format!("# {title}\n\n{body}"),
        Format::Plain | Format::Outline => format!("{title}\n\n{body}"),
    })
}

fn run(options: &ConvertOptions) -> Result<()> {
    let html = read_input(options.input.as_deref())?;
    let text = convert(options, &html)?;

    match &options.output {
        Some(path) => {
            let path = match options.format {
                Format::Markdown => markdown_path(path),
                Format::Plain | Format::Outline => path.clone(),
            };
            fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
            log::info!(target: "nottak", "wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("failed to write stdout")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let options = ConvertOptions::parse();

    let default_level = if options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    run(&options)
}
