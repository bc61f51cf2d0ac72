//! twig - print the element tree of an HTML document
//!
//! Usage:
//!   twig <file>                  Print the element tree
//!   twig --html '<p>..</p>'      Parse an inline string
//!   twig --url <url>             Fetch a document, then parse it
//!   twig <file> --json           Output the tree as JSON
//!   twig <file> --tokens         Show tag tokens before the tree
//!   twig <file> --issues         Report end tags the parser ignored
//!   twig <file> -o tree.txt      Write the output to a file
//!
//! Logging is controlled by `RUST_LOG`; `--verbose` defaults it to `debug`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use twig_common::fetch_text;
use twig_dom::{DomTree, print_tree, to_json_pretty, write_json_to_file, write_tree_to_file};
use twig_html::{HtmlParser, ParseIssue, ParserOptions, RecoveryPolicy, TextPolicy, Tokenizer};

#[derive(Debug, Parser)]
#[command(name = "twig", version, about = "Print the element tree of an HTML document")]
#[allow(clippy::struct_excessive_bools)]
struct Args {
    /// HTML file to parse
    file: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, conflicts_with_all = ["file", "url"])]
    html: Option<String>,

    /// Fetch the document from a URL (http, https or data)
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Output the tree as JSON
    #[arg(short, long)]
    json: bool,

    /// Show tag tokens before the tree
    #[arg(short, long)]
    tokens: bool,

    /// Report end tags that were ignored during recovery
    #[arg(long)]
    issues: bool,

    /// Keep text between tags as text nodes
    #[arg(long)]
    keep_text: bool,

    /// What to do with end tags that do not match the open element
    #[arg(long, default_value_t = RecoveryPolicy::Lenient)]
    recovery: RecoveryPolicy,

    /// Write the tree (or JSON) to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log parser decisions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let source = read_source(&args)?;
    let text = if args.keep_text {
        TextPolicy::Keep
    } else {
        TextPolicy::Discard
    };
    let options = ParserOptions::new()
        .with_recovery(args.recovery)
        .with_text(text);

    if args.tokens {
        print_tokens(&source, args.keep_text);
    }

    let (tree, issues) = HtmlParser::new(options)
        .parse_with_issues(&source)
        .context("document rejected by strict recovery")?;

    if args.issues {
        report_issues(&issues);
    }

    write_output(&args, &tree)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(args: &Args) -> Result<String> {
    if let Some(html) = &args.html {
        return Ok(html.clone());
    }
    if let Some(url) = &args.url {
        debug!(%url, "loading from network");
        return smol::block_on(fetch_text(url)).with_context(|| format!("failed to fetch '{url}'"));
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()));
    }
    bail!("no input: pass a FILE, --html '<...>' or --url <url>");
}

fn print_tokens(source: &str, keep_text: bool) {
    let tokens = Tokenizer::new(source).with_text(keep_text).into_tokens();
    println!("{}", format!("=== Tokens ({}) ===", tokens.len()).bold());
    for (i, token) in tokens.iter().enumerate() {
        println!("  {i:3}: {token:?}");
    }
    println!();
}

fn report_issues(issues: &[ParseIssue]) {
    if issues.is_empty() {
        eprintln!("{}", "no recovery was needed".green());
        return;
    }
    for issue in issues {
        eprintln!(
            "{} token {}: {}",
            "ignored".yellow().bold(),
            issue.token_index,
            issue.message
        );
    }
}

fn write_output(args: &Args, tree: &DomTree) -> Result<()> {
    let root = tree.root();
    match (&args.output, args.json) {
        (Some(path), true) => write_json_to_file(tree, root, path)
            .with_context(|| format!("failed to write '{}'", path.display())),
        (Some(path), false) => write_tree_to_file(tree, root, path)
            .with_context(|| format!("failed to write '{}'", path.display())),
        (None, true) => {
            println!("{}", to_json_pretty(tree, root)?);
            Ok(())
        }
        (None, false) => print_tree(tree, root).context("failed to write to stdout"),
    }
}
