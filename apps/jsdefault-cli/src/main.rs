use anyhow::{ensure, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use jsdefault_core::config::{load_config, write_schema_file, InstantiatorConfig};
use jsdefault_core::{config, instantiate, SchemaRegistry};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

mod loader;

#[derive(Parser)]
#[command(
    name = "jsdefault",
    version,
    about = "Derive default instances from JSON Schema documents"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default instance of a schema id or reference (JSON)
    Instantiate(InstantiateArgs),
    /// List registered schema ids
    List(SourceArgs),
    /// Print the JSON Schema of the TOML configuration file
    ConfigSchema(ConfigSchemaArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Schema file or directory to load (repeatable)
    #[arg(short = 's', long = "schemas", value_name = "PATH")]
    schemas: Vec<PathBuf>,
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Skip meta-schema validation of loaded documents
    #[arg(long)]
    no_validate: bool,
}

#[derive(Args)]
struct InstantiateArgs {
    /// Schema id (`message.json`) or reference (`definitions.json#/header`)
    schema: String,
    #[command(flatten)]
    source: SourceArgs,
    /// Expand `$ref` objects embedded in literal defaults
    #[arg(long)]
    resolve_default_refs: bool,
    /// Only build required properties
    #[arg(long)]
    required_only: bool,
    /// Maximum resolver nesting
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ConfigSchemaArgs {
    /// Write to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct CompletionsArgs {
    /// Target shell (bash, zsh, fish, powershell, elvish)
    shell: clap_complete::Shell,
    /// Output directory (writes a file). If not set, prints to stdout.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Instantiate(args) => cmd_instantiate(&args),
        Commands::List(args) => cmd_list(&args),
        Commands::ConfigSchema(args) => cmd_config_schema(&args),
        Commands::Completions(args) => cmd_completions(args.shell, args.out_dir.as_deref()),
    };
    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Config file (if any) with command-line switches applied on top.
fn effective_config(source: &SourceArgs) -> Result<InstantiatorConfig> {
    let mut cfg = match &source.config {
        Some(path) => {
            let mut cfg = load_config(path)?;
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            cfg.registry.paths = cfg
                .registry
                .paths
                .iter()
                .map(|p| base.join(p).to_string_lossy().into_owned())
                .collect();
            cfg
        }
        None => InstantiatorConfig::default(),
    };
    if source.no_validate {
        cfg.registry.validate = false;
    }
    Ok(cfg)
}

fn build_registry(cfg: &InstantiatorConfig, source: &SourceArgs) -> Result<SchemaRegistry> {
    let mut sources: Vec<PathBuf> = cfg.registry.paths.iter().map(PathBuf::from).collect();
    sources.extend(source.schemas.iter().cloned());
    ensure!(
        !sources.is_empty(),
        "no schema sources; pass --schemas or set registry.paths in the config"
    );

    let mut registry = cfg.registry();
    for loaded in loader::load_documents(&sources)? {
        registry
            .register(loaded.document)
            .with_context(|| format!("failed to register schema from {}", loaded.origin.display()))?;
    }
    tracing::debug!(count = registry.len(), "schema registry ready");
    Ok(registry)
}

fn cmd_instantiate(args: &InstantiateArgs) -> Result<()> {
    let mut cfg = effective_config(&args.source)?;
    if args.resolve_default_refs {
        cfg.instantiate.resolve_default_refs = true;
    }
    if args.required_only {
        cfg.instantiate.required_only = true;
    }
    if let Some(max_depth) = args.max_depth {
        ensure!(max_depth > 0, "--max-depth must be at least 1");
        cfg.instantiate.max_depth = max_depth;
    }

    let registry = build_registry(&cfg, &args.source)?;
    let options = cfg.options(&registry);
    let value = instantiate(&options, &args.schema).map_err(|err| {
        let code = err.code();
        anyhow::Error::new(err).context(format!("cannot instantiate {} ({})", args.schema, code))
    })?;

    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn cmd_list(args: &SourceArgs) -> Result<()> {
    let cfg = effective_config(args)?;
    let registry = build_registry(&cfg, args)?;
    for id in registry.ids() {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_config_schema(args: &ConfigSchemaArgs) -> Result<()> {
    match &args.out {
        Some(path) => {
            write_schema_file(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config::config_schema_json())?),
    }
    Ok(())
}

fn cmd_completions(shell: clap_complete::Shell, out_dir: Option<&Path>) -> Result<()> {
    use clap_complete::{generate, generate_to};
    use std::io::stdout;
    let mut cmd = Cli::command();
    let bin = "jsdefault";
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = generate_to(shell, &mut cmd, bin, dir)?;
        println!("Wrote {}", path.display());
    } else {
        generate(shell, &mut cmd, bin, &mut stdout());
    }
    Ok(())
}
