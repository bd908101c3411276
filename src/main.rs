reexport!(cli_tests, test);

#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, span, trace, warn};

use clap::Parser;
use grepsql::diagnostics::DiagnosticSink;
use grepsql::engine::{search_compiled, ParsedDocument};
use grepsql::pattern::parse_with_diagnostics;
use std::path::PathBuf;
use std::process::ExitCode;

/// Structural grep for SQL: match an s-expression pattern against the
/// PostgreSQL AST of one or more SQL inputs.
#[derive(Parser, Debug)]
#[command(name = "grepsql", version, about)]
struct Cli {
    /// The s-expression pattern to compile and search for.
    pattern: String,

    /// SQL files to search. With none given (and no `--sql`), reads from stdin.
    files: Vec<PathBuf>,

    /// Inline SQL text to search, in addition to any files given.
    #[arg(long)]
    sql: Option<String>,

    /// Emit tokenizer/parser/matcher diagnostics to stderr.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let diagnostics = if cli.debug {
        DiagnosticSink::enabled()
    } else {
        DiagnosticSink::disabled()
    };

    // Exit codes follow spec.md §6: 0 if at least one match, 1 if none, 2 on error.
    const EXIT_MATCH: u8 = 0;
    const EXIT_NO_MATCH: u8 = 1;
    const EXIT_ERROR: u8 = 2;

    let matcher = match parse_with_diagnostics(&cli.pattern, diagnostics) {
        Ok(matcher) => matcher,
        Err(err) => {
            error!(%err, "failed to compile pattern");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let sources = match collect_sources(&cli) {
        Ok(sources) => sources,
        Err(err) => {
            error!(%err, "failed to read input");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut saw_error = false;
    let mut total_matches = 0usize;
    for (label, sql) in &sources {
        match ParsedDocument::parse(sql) {
            Ok(doc) => {
                let (records, _) = search_compiled(&matcher, &doc, diagnostics);
                for record in &records {
                    total_matches += 1;
                    println!(
                        "{label}: statement {} ({}) {}",
                        record.statement_index,
                        record.origin,
                        record.node.type_name()
                    );
                }
            }
            Err(err) => {
                error!(source = %label, %err, "failed to parse SQL");
                saw_error = true;
            }
        }
    }

    if saw_error {
        return ExitCode::from(EXIT_ERROR);
    }
    if total_matches == 0 {
        info!("no matches found");
        return ExitCode::from(EXIT_NO_MATCH);
    }
    ExitCode::from(EXIT_MATCH)
}

/// Gather every `(label, sql text)` pair to search: `--sql`, then every
/// file argument, falling back to stdin when neither is given.
fn collect_sources(cli: &Cli) -> std::io::Result<Vec<(String, String)>> {
    let mut sources = Vec::new();

    if let Some(sql) = &cli.sql {
        sources.push(("<inline>".to_string(), sql.clone()));
    }

    for path in &cli.files {
        let text = std::fs::read_to_string(path)?;
        sources.push((path.display().to_string(), text));
    }

    if sources.is_empty() {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        if !buf.trim().is_empty() {
            sources.push(("<stdin>".to_string(), buf));
        }
    }

    Ok(sources)
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[macro_export]
macro_rules! reexport {
    ($module:ident) => {
        $crate::reexport!($module, false);
    };
    ($module:ident, test) => {
        $crate::reexport!($module, true);
    };
    ($module:ident, $is_test:literal) => {
        #[cfg_attr($is_test, cfg(test))]
        mod $module;
        #[cfg_attr($is_test, cfg(test))]
        #[allow(unused_imports)]
        pub use $module::*;
    };
}
