//! flagconf CLI
//!
//! Entry point for the `flagconf` command-line tool.

use clap::{Parser, Subcommand};
use flagconf::config::{default_host_config_path, EffectiveConfig, Settings};
use flagconf::frontend::current_exe_dir;
use flagconf::host::{CONFIRM_CONF_VAR, GLOBAL_CONF_VAR};
use flagconf::loader::{SearchPath, SEARCH_PATH_ENV};
use flagconf::{ConfSources, ConfirmationGate, Flags, FrontEnd, ProcessLoader, TerminalHost};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "FLAGCONF_LOG";

#[derive(Parser)]
#[command(name = "flagconf")]
#[command(about = "Per-file compile flags from project configuration sources", version)]
struct Cli {
    /// Path to host config file (default: <config dir>/flagconf/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Trusted fallback configuration source, loaded without confirmation
    #[arg(long, global = true)]
    global_conf: Option<String>,

    /// Load configuration sources without asking
    #[arg(long, global = true)]
    no_confirm: bool,

    /// Program used to run configuration sources
    #[arg(long, global = true)]
    interpreter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve compile flags for one or more files
    Flags {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Files to resolve
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the configuration sources that apply to a file, nearest first
    Locate {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        file: PathBuf,
    },

    /// Sanitize a flag list without consulting any source
    Sanitize {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// The flags to sanitize (after --)
        #[arg(last = true)]
        flags: Vec<String>,
    },

    /// Print the effective configuration
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Flags { json, files } => run_flags(config, &files, json),
        Commands::Locate { json, file } => run_locate(config, &file, json),
        Commands::Sanitize { json, flags } => run_sanitize(&flags, json),
        Commands::Config { json } => run_config(&config, json),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Turn the global options into the CLI config layer.
fn cli_overrides(cli: &Cli) -> Option<Value> {
    let mut overrides = Map::new();
    if let Some(global) = &cli.global_conf {
        overrides.insert(GLOBAL_CONF_VAR.to_string(), json!(global));
    }
    if cli.no_confirm {
        overrides.insert(CONFIRM_CONF_VAR.to_string(), json!(false));
    }
    if let Some(interpreter) = &cli.interpreter {
        overrides.insert("interpreter".to_string(), json!(interpreter));
    }

    if overrides.is_empty() {
        None
    } else {
        Some(Value::Object(overrides))
    }
}

fn load_config(cli: &Cli) -> Result<EffectiveConfig, String> {
    let host_path = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(format!("{}: file not found", path.display()));
        }
        Some(path) => Some(path.clone()),
        None => default_host_config_path(),
    };

    EffectiveConfig::build(host_path.as_deref(), cli_overrides(cli)).map_err(|e| e.to_string())
}

fn build_resolver(config: EffectiveConfig) -> Result<Flags<TerminalHost, ProcessLoader>, String> {
    let settings = Settings::from_config(&config);

    let exe_error = |e: std::io::Error| format!("cannot locate executable: {}", e);
    let frontend = match settings.frontend_dir {
        Some(dir) => FrontEnd::new(dir),
        None => FrontEnd::from_current_exe().map_err(exe_error)?,
    };
    let helper_dir = match settings.helper_dir {
        Some(dir) => dir,
        None => current_exe_dir().map_err(exe_error)?,
    };

    let search_path = std::env::var_os(SEARCH_PATH_ENV)
        .map(|v| SearchPath::from_env_value(&v))
        .unwrap_or_default();
    let loader = ProcessLoader::new(helper_dir)
        .with_interpreter(settings.interpreter)
        .with_search_path(search_path);

    Ok(Flags::new(TerminalHost::new(config), loader, frontend))
}

fn run_flags(config: EffectiveConfig, files: &[PathBuf], json_output: bool) -> ExitCode {
    let mut flags = match build_resolver(config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    let mut results = Vec::with_capacity(files.len());

    for file in files {
        match flags.resolve(file) {
            Ok(resolved) => {
                if json_output {
                    results.push(json!({
                        "file": file.display().to_string(),
                        "flags": resolved,
                        "source": flags.bound_location(file).map(|p| p.display().to_string()),
                    }));
                } else {
                    match resolved {
                        Some(vec) => println!("{}: {}", file.display(), vec.join(" ")),
                        None => println!("{}: (no flags)", file.display()),
                    }
                }
            }
            Err(e) => {
                failed = true;
                if json_output {
                    results.push(json!({
                        "file": file.display().to_string(),
                        "error": e.to_string(),
                    }));
                } else {
                    eprintln!("{}: {}", file.display(), e);
                }
            }
        }
    }

    if json_output {
        match serde_json::to_string_pretty(&results) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_locate(config: EffectiveConfig, file: &Path, json_output: bool) -> ExitCode {
    let host = TerminalHost::new(config);
    let gate = ConfirmationGate::from_host(&host);

    let abs = match flagconf::ancestry::absolutize(file) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let sources: Vec<PathBuf> =
        ConfSources::for_file(&abs, gate.global_conf().map(Path::to_path_buf)).collect();

    if json_output {
        let entries: Vec<Value> = sources
            .iter()
            .map(|s| {
                json!({
                    "location": s.display().to_string(),
                    "global": gate.is_global(s),
                })
            })
            .collect();
        println!("{}", json!({ "file": abs.display().to_string(), "sources": entries }));
    } else if sources.is_empty() {
        println!("No configuration sources for {}", abs.display());
    } else {
        for source in &sources {
            if gate.is_global(source) {
                println!("{} (global)", source.display());
            } else {
                println!("{}", source.display());
            }
        }
    }

    if sources.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_sanitize(flags: &[String], json_output: bool) -> ExitCode {
    let result = flagconf::sanitize(flags);

    if json_output {
        match serde_json::to_string_pretty(&result) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", result.flags.join(" "));
        for dropped in &result.dropped {
            eprintln!("dropped: {}", dropped.to_code());
        }
    }

    ExitCode::SUCCESS
}

fn run_config(config: &EffectiveConfig, json_output: bool) -> ExitCode {
    if json_output {
        return match config.to_json() {
            Ok(out) => {
                println!("{}", out);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    println!("Effective configuration ({})", config.schema_id);
    println!();
    for source in &config.sources {
        match &source.path {
            Some(path) => println!("  {:?}: {}", source.origin, path),
            None => println!("  {:?}", source.origin),
        }
    }
    println!();

    let global = config.get_str(GLOBAL_CONF_VAR).unwrap_or("");
    let confirm = config.get_bool(CONFIRM_CONF_VAR).unwrap_or(true);
    println!("  {}: {}", GLOBAL_CONF_VAR, if global.is_empty() { "(none)" } else { global });
    println!("  {}: {}", CONFIRM_CONF_VAR, confirm);

    let settings = Settings::from_config(config);
    if let Some(interpreter) = &settings.interpreter {
        println!("  interpreter: {}", interpreter);
    }
    if let Some(dir) = &settings.frontend_dir {
        println!("  frontend_dir: {}", dir.display());
    }
    if let Some(dir) = &settings.helper_dir {
        println!("  helper_dir: {}", dir.display());
    }

    ExitCode::SUCCESS
}
