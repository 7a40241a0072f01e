mod batch;
mod cli;
mod exclusion;
mod file_reader;
mod glob;
mod models;
mod scanner;
mod tracing_config;
mod yaml_output;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use liva_index::diagnostics::{self, DiagnosticTable};
use liva_index::outline::{self, OutlineNode};
use liva_index::resolver;

use cli::{Mode, Query};
use models::{DiagnosticFile, Location, LocationFile, MetaInfo, OutlineFile, OutputEnvelope};
use scanner::SourceFile;

fn main() {
    tracing_config::init_tracing();
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let action = match cli::parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    match action {
        cli::CliAction::Help => {
            cli::print_help();
            0
        }
        cli::CliAction::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            0
        }
        cli::CliAction::Run(args) => execute(args),
    }
}

/// Per-mode result before the meta block is attached.
struct Report {
    envelope: OutputEnvelope,
    files_matched: usize,
    total_matches: usize,
}

fn execute(args: cli::CliArgs) -> i32 {
    let root = Path::new(&args.root);
    if !root.is_dir() {
        let envelope = OutputEnvelope::failure(format!("Directory not found: {}", args.root));
        yaml_output::write_output(&envelope, args.format);
        return 1;
    }

    let cancelled = Arc::new(AtomicBool::new(false));
    ctrlc_handler(cancelled.clone());

    if let Some(secs) = args.timeout {
        let cancelled = cancelled.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_secs(secs));
            cancelled.store(true, Ordering::Relaxed);
        });
    }

    let filter = exclusion::ExclusionFilter::new(&args.excludes, args.no_defaults);
    let globs = glob::GlobSet::new(&args.globs);
    let start = Instant::now();

    let files = scanner::find_files(root, &globs, &filter, &cancelled);

    if cancelled.load(Ordering::Relaxed) {
        let envelope = OutputEnvelope {
            meta: Some(MetaInfo {
                elapsed_ms: start.elapsed().as_millis(),
                timeout: true,
                files_scanned: files.len(),
                files_matched: 0,
                total_matches: None,
            }),
            error: Some("Operation timed out".into()),
            ..Default::default()
        };
        yaml_output::write_output(&envelope, args.format);
        return 2;
    }

    let report = match args.mode {
        Mode::Outline => execute_outline(&files, &cancelled),
        Mode::Check => execute_check(&files, &cancelled),
        Mode::Definition(ref query) => execute_lookup(&files, &cancelled, query, None),
        Mode::References(ref query) => {
            execute_lookup(&files, &cancelled, query, Some(args.include_declaration))
        }
    };

    let timed_out = cancelled.load(Ordering::Relaxed);
    let mut envelope = report.envelope;
    envelope.meta = Some(MetaInfo {
        elapsed_ms: start.elapsed().as_millis(),
        timeout: timed_out,
        files_scanned: files.len(),
        files_matched: report.files_matched,
        total_matches: Some(report.total_matches),
    });
    if timed_out {
        envelope.error = Some("Operation timed out — partial results may be incomplete".into());
    }

    info!(
        files = files.len(),
        matched = report.files_matched,
        total = report.total_matches,
        timed_out,
        "run complete"
    );
    yaml_output::write_output(&envelope, args.format);
    if timed_out { 2 } else { 0 }
}

fn execute_outline(files: &[SourceFile], cancelled: &AtomicBool) -> Report {
    let outcomes = batch::analyze_files(files, cancelled, outline::document_outline);

    let entries: Vec<OutlineFile> = outcomes
        .into_iter()
        .map(|o| match o.result {
            Ok(nodes) => OutlineFile { path: o.relative, nodes, error: None },
            Err(e) => OutlineFile { path: o.relative, nodes: Vec::new(), error: Some(e) },
        })
        .filter(OutlineFile::is_reportable)
        .collect();

    let total: usize = entries
        .iter()
        .flat_map(|f| f.nodes.iter())
        .map(OutlineNode::count)
        .sum();

    Report {
        files_matched: entries.len(),
        total_matches: total,
        envelope: OutputEnvelope {
            outline: Some(entries),
            ..Default::default()
        },
    }
}

fn execute_check(files: &[SourceFile], cancelled: &AtomicBool) -> Report {
    let outcomes = batch::analyze_files(files, cancelled, diagnostics::diagnose);

    let mut table = DiagnosticTable::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(diags) => table.set(outcome.relative, diags),
            Err(e) => failed.push(DiagnosticFile {
                path: outcome.relative,
                diagnostics: Vec::new(),
                error: Some(e),
            }),
        }
    }
    debug!(documents = table.len(), errors = table.error_count(), "diagnostics published");

    let mut entries: Vec<DiagnosticFile> = table
        .iter()
        .filter(|(_, diags)| !diags.is_empty())
        .map(|(doc, diags)| DiagnosticFile {
            path: doc.to_owned(),
            diagnostics: diags.to_vec(),
            error: None,
        })
        .chain(failed)
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let total: usize = entries.iter().map(|f| f.diagnostics.len()).sum();
    Report {
        files_matched: entries.len(),
        total_matches: total,
        envelope: OutputEnvelope {
            diagnostics: Some(entries),
            ..Default::default()
        },
    }
}

/// Definitions when `references` is `None`; otherwise references, with
/// declaration lines kept when the flag is true.
fn execute_lookup(
    files: &[SourceFile],
    cancelled: &AtomicBool,
    query: &Query,
    references: Option<bool>,
) -> Report {
    let lookup = |text: &str, name: &str| -> Vec<Location> {
        match references {
            Some(include_declaration) => resolver::find_references(text, name, include_declaration)
                .into_iter()
                .map(Location::from)
                .collect(),
            None => resolver::resolve_definition(text, name)
                .into_iter()
                .map(Location::from)
                .collect(),
        }
    };

    let outcomes = batch::analyze_files(files, cancelled, |text| match query {
        Query::Name(name) => (None, lookup(text, name.as_str())),
        Query::At(position) => match resolver::word_at(text, *position) {
            Some((word, _)) => {
                let found = lookup(text, word.as_str());
                (Some(word), found)
            }
            None => (None, Vec::new()),
        },
    });

    let entries: Vec<LocationFile> = outcomes
        .into_iter()
        .map(|o| match o.result {
            Ok((name, locations)) => LocationFile { path: o.relative, name, locations, error: None },
            Err(e) => LocationFile { path: o.relative, name: None, locations: Vec::new(), error: Some(e) },
        })
        .filter(LocationFile::is_reportable)
        .collect();

    let label = match query {
        Query::Name(name) => name.clone(),
        Query::At(p) => format!("{}:{}", p.line + 1, p.column + 1),
    };
    let total: usize = entries.iter().map(|f| f.locations.len()).sum();
    Report {
        files_matched: entries.len(),
        total_matches: total,
        envelope: OutputEnvelope {
            query: Some(label),
            locations: Some(entries),
            ..Default::default()
        },
    }
}

#[cfg(unix)]
fn ctrlc_handler(cancelled: Arc<AtomicBool>) {
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, cancelled) {
        debug!(error = %e, "SIGINT handler not installed");
    }
}

#[cfg(not(unix))]
fn ctrlc_handler(_cancelled: Arc<AtomicBool>) {
    debug!("ctrl-c cancellation is only wired up on unix");
}
