//! Command line front end: parse markup files, report what the scanner had
//! to repair, and write the tree back out.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use quasixml::parser::{self, ParseOptions};
use quasixml::serial::{self, RenderOptions};
use quasixml::tree::{Document, NodeId};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// quasilint -- parse lenient XML-like markup and re-render it.
#[derive(Parser, Debug)]
#[command(name = "quasilint", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Markup files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    /// Log scanner recoveries (debug level).
    #[arg(long)]
    verbose: bool,

    // -- Parsing options ---------------------------------------------------
    /// Fail on the first malformed construct instead of repairing it.
    #[arg(long)]
    abort_on_error: bool,

    /// Collapse whitespace runs inside attribute values.
    #[arg(long)]
    normalize_attributes: bool,

    /// Keep elements that are still open at end of input.
    #[arg(long)]
    auto_close: bool,

    // -- Output options ----------------------------------------------------
    /// Indent the output, one element per line.
    #[arg(long)]
    format: bool,

    /// Indent character used with `--format`.
    #[arg(long, value_enum, default_value_t = IndentChar::Tab)]
    indent_char: IndentChar,

    /// Indent characters per nesting level.
    #[arg(long, value_name = "N", default_value_t = 1)]
    indent_width: usize,

    /// Render childless elements as `<name />`.
    #[arg(long)]
    self_close_empty: bool,

    /// Output only the children of the root element.
    #[arg(long)]
    inner: bool,

    /// Do not output the result tree.
    #[arg(long)]
    noout: bool,

    /// Save output to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<String>,

    // -- Debug options -----------------------------------------------------
    /// Print the node tree, one summary per line.
    #[arg(long)]
    debug: bool,

    /// Print every condition the scanner recovered from.
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IndentChar {
    Space,
    Tab,
}

impl IndentChar {
    fn as_char(self) -> char {
        match self {
            Self::Space => ' ',
            Self::Tab => '\t',
        }
    }
}

impl Cli {
    fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .abort_on_error(self.abort_on_error)
            .normalize_attribute_whitespace(self.normalize_attributes)
            .auto_close_open_tags(self.auto_close)
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions::new()
            .auto_indent(self.format)
            .indent_char(self.indent_char.as_char())
            .indent_width(self.indent_width)
            .render_empty_as_self_closing(self.self_close_empty)
    }
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_IO_ERROR: u8 = 2;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut worst_exit = EXIT_SUCCESS;
    for file in &cli.files {
        worst_exit = worst_exit.max(process_file(&cli, file));
    }
    ExitCode::from(worst_exit)
}

/// Processes a single input file and returns an exit code.
fn process_file(cli: &Cli, filename: &str) -> u8 {
    let input = match read_input(filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{filename}: failed to read: {e}");
            return EXIT_IO_ERROR;
        }
    };

    let doc = match parser::parse_bytes_with_options(&input, &cli.parse_options()) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{filename}: {e}");
            return EXIT_PARSE_ERROR;
        }
    };
    tracing::debug!(
        file = filename,
        nodes = doc.node_count(),
        diagnostics = doc.diagnostics.len(),
        "parsed"
    );

    if cli.diagnostics {
        for diag in &doc.diagnostics {
            eprintln!("{filename}: {diag}");
        }
    }

    if cli.debug {
        print!("{}", format_debug_tree(&doc));
    }

    if cli.noout {
        return EXIT_SUCCESS;
    }

    let rendered = render(cli, &doc);
    match write_output(cli, &rendered) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let target = cli.output.as_deref().unwrap_or("stdout");
            eprintln!("{target}: failed to write: {e}");
            EXIT_IO_ERROR
        }
    }
}

fn read_input(filename: &str) -> io::Result<Vec<u8>> {
    if filename == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(filename)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn render(cli: &Cli, doc: &Document) -> String {
    let Some(root) = doc.root_element() else {
        return String::new();
    };
    let options = cli.render_options();
    let mut out = if cli.inner {
        serial::render_inner(doc, root, &options)
    } else {
        serial::render(doc, root, &options)
    };
    out.push('\n');
    out
}

fn write_output(cli: &Cli, content: &str) -> io::Result<()> {
    if let Some(ref output_file) = cli.output {
        fs::write(output_file, content)
    } else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()
    }
}

/// Formats the tree as indented node summaries, e.g.
///
/// ```text
/// Element, Name="root"
///   Text, Value="hello"
/// ```
fn format_debug_tree(doc: &Document) -> String {
    let mut out = String::new();
    let mut pending: Vec<(NodeId, usize)> =
        doc.root_element().map(|root| (root, 0)).into_iter().collect();
    while let Some((id, depth)) = pending.pop() {
        let indent = "  ".repeat(depth);
        let summary = doc.node(id).kind.to_string().replace('\n', "\\n");
        let _ = writeln!(out, "{indent}{summary}");
        if let Some(attributes) = doc.attributes(id) {
            for (key, value) in attributes {
                let _ = writeln!(out, "{indent}  @{key}=\"{value}\"");
            }
        }
        let mut child = doc.last_child(id);
        while let Some(current) = child {
            pending.push((current, depth + 1));
            child = doc.prev_sibling(current);
        }
    }
    out
}
