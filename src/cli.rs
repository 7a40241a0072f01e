use liva_index::Position;

use crate::yaml_output::OutputFormat;

/// What to look up in `--def` / `--refs` queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Name(String),
    /// The word under a position, given 1-based on the command line and
    /// stored 0-based.
    At(Position),
}

impl Query {
    fn parse(flag: &str, value: &str) -> Result<Self, String> {
        let (line, column) = match value.split_once(':') {
            Some(parts) => parts,
            None => return Ok(Query::Name(value.to_owned())),
        };
        let line = parse_one_based(flag, line, value)?;
        let column = parse_one_based(flag, column, value)?;
        Ok(Query::At(Position::new(line, column)))
    }
}

fn parse_one_based(flag: &str, part: &str, whole: &str) -> Result<usize, String> {
    match part.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!(
            "Invalid position for {}: '{}'. Expected <line>:<col>, both starting at 1.",
            flag, whole
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Outline,
    Check,
    Definition(Query),
    References(Query),
}

pub struct CliArgs {
    pub root: String,
    pub globs: Vec<String>,
    pub mode: Mode,
    pub include_declaration: bool,
    pub format: OutputFormat,
    pub timeout: Option<u64>,
    pub excludes: Vec<String>,
    pub no_defaults: bool,
}

pub enum CliAction {
    Run(CliArgs),
    Help,
    Version,
}

pub fn parse_args(args: &[String]) -> Result<CliAction, String> {
    let mut root: Option<String> = None;
    let mut globs = Vec::new();
    let mut modes: Vec<(&str, Mode)> = Vec::new();
    let mut include_declaration = true;
    let mut format = OutputFormat::Yaml;
    let mut timeout: Option<u64> = None;
    let mut excludes = Vec::new();
    let mut no_defaults = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--root" | "-d" => {
                i += 1;
                if i >= args.len() { return Err("Missing value for --root".into()); }
                root = Some(args[i].clone());
            }
            "--r" | "--glob" | "-g" => {
                i += 1;
                if i >= args.len() { return Err("Missing value for --glob".into()); }
                globs.push(args[i].clone());
            }
            "--outline" => modes.push(("--outline", Mode::Outline)),
            "--check" => modes.push(("--check", Mode::Check)),
            "--def" => {
                i += 1;
                if i >= args.len() { return Err("Missing value for --def".into()); }
                modes.push(("--def", Mode::Definition(Query::parse("--def", &args[i])?)));
            }
            "--refs" => {
                i += 1;
                if i >= args.len() { return Err("Missing value for --refs".into()); }
                modes.push(("--refs", Mode::References(Query::parse("--refs", &args[i])?)));
            }
            "--no-declaration" => include_declaration = false,
            "--format" => {
                i += 1;
                if i >= args.len() { return Err("Missing value for --format".into()); }
                format = match args[i].as_str() {
                    "yaml" => OutputFormat::Yaml,
                    "json" => OutputFormat::Json,
                    other => return Err(format!("Invalid value for --format: '{}'. Use 'yaml' or 'json'.", other)),
                };
            }
            "--timeout" => {
                i += 1;
                if i >= args.len() { return Err("Missing value for --timeout".into()); }
                timeout = Some(args[i].parse::<u64>()
                    .map_err(|_| format!("Invalid integer for --timeout: {}", args[i]))?);
            }
            "--exclude" => {
                i += 1;
                if i >= args.len() { return Err("Missing value for --exclude".into()); }
                excludes.push(args[i].clone());
            }
            "--no-defaults" => no_defaults = true,
            "--help" | "-h" | "-?" => return Ok(CliAction::Help),
            "--version" | "-V" => return Ok(CliAction::Version),
            other => return Err(format!("Unknown option: {}\nRun 'liva-index --help' for usage information.", other)),
        }
        i += 1;
    }

    if modes.len() > 1 {
        let names: Vec<&str> = modes.iter().map(|(flag, _)| *flag).collect();
        return Err(format!("{} are mutually exclusive and cannot be combined.", names.join(" and ")));
    }
    let mode = modes.pop().map(|(_, mode)| mode).unwrap_or(Mode::Outline);

    if !include_declaration && !matches!(mode, Mode::References(_)) {
        return Err("--no-declaration only applies to --refs".into());
    }

    if globs.is_empty() {
        globs.push("*.liva".to_owned());
    }

    let root = root.unwrap_or_else(|| std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| ".".into()));

    Ok(CliAction::Run(CliArgs {
        root,
        globs,
        mode,
        include_declaration,
        format,
        timeout,
        excludes,
        no_defaults,
    }))
}

pub fn print_help() {
    print!(
r#"liva-index — structural index for Liva source trees

Usage:
  liva-index [options]

Modes:
  --outline               Outline of every file: functions, classes, interfaces, constants (default)
  --check                 Interface conformance diagnostics
  --def <name|line:col>   Definition sites of a name, or of the word at line:col in each file
  --refs <name|line:col>  Whole-word references of a name, or of the word at line:col

Options:
  --root, -d <path>       Root directory (default: current directory)
  --glob, -g, --r <glob>  File glob pattern (repeatable, default: *.liva)
  --no-declaration        With --refs, drop references on let/const/fn lines
  --format <yaml|json>    Output format (default: yaml)
  --timeout <secs>        Max execution time in seconds
  --exclude <name>        Additional exclusions (repeatable)
  --no-defaults           Disable built-in exclusions (.git, target, node_modules, etc.)
  --help, -h              Show this help
  --version, -V           Show version

Environment:
  LIVA_LOG, RUST_LOG      Log filter for diagnostics on stderr (e.g. debug)
  LIVA_LOG_FORMAT         text (default) or json

Examples:
  liva-index                                      Outline all .liva files
  liva-index --check -d /path/to/project          Report missing interface methods
  liva-index --def Shape                          Where Shape is declared
  liva-index --refs total --no-declaration        Uses of total, declarations dropped
  liva-index --def 12:9 --r src/app.liva          Definition of the word at 12:9
  liva-index --check --format json                Diagnostics as JSON
"#);
}
