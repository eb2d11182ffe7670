//! luastub CLI: generate Lua annotation stubs from a resolved symbol snapshot.
//!
//! Calls `luastub-core` directly; all progress goes to stderr so stdout stays
//! free for JSON delivery.

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use luastub_core::symbols::JsonSymbolSource;
use luastub_core::{find_config, load_stub_config, run, Binding, ExportMode, GenerateOptions};

/// Generate EmmyLua stubs for a C# API surface.
#[derive(Parser)]
#[command(name = "luastub", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate stubs or API JSON from a symbol snapshot
    Generate {
        /// Symbol snapshot written by a resolver
        #[arg(short, long)]
        symbols: PathBuf,

        /// Namespaces to export, split by ';'
        #[arg(short, long)]
        namespace: Option<String>,

        /// Binding convention: none, xlua or tolua
        #[arg(short, long)]
        bind: Option<Binding>,

        /// Output directory, or '-' for stdout in json mode
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export mode: lua, json or stream
        #[arg(short, long)]
        export: Option<ExportMode>,

        /// Config file (default: luastub.toml next to the snapshot)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stub file size threshold in bytes
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Skip types declared in the global namespace
        #[arg(long)]
        no_global: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("luastub=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "luastub", &mut std::io::stdout());
        }
        Commands::Generate {
            symbols,
            namespace,
            bind,
            output,
            export,
            config,
            chunk_size,
            no_global,
        } => {
            let config_path = config.or_else(|| find_config(&symbols));
            let mut options = match &config_path {
                Some(path) => load_stub_config(path),
                None => GenerateOptions::default(),
            };

            // Flags win over the config file.
            if let Some(list) = namespace {
                options.namespaces = GenerateOptions::parse_namespaces(&list);
            }
            if let Some(binding) = bind {
                options.binding = binding;
            }
            if let Some(output) = output {
                options.output = output;
            }
            if let Some(export) = export {
                options.export = export;
            }
            if let Some(size) = chunk_size {
                options.chunk_size = size;
            }
            if no_global {
                options.include_global = false;
            }

            let source = JsonSymbolSource::new(symbols);
            if let Err(e) = run(&source, &options) {
                error!(snapshot = %source.path().display(), "Generation failed: {e}");
                std::process::exit(1);
            }
        }
    }
}
