use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wooseo::ai::provider::ProviderKind;
use wooseo::cli::ProviderOverrides;

#[derive(Parser)]
#[command(name = "wooseo")]
#[command(
    version,
    about = "SEO metadata generator and field injector for WooCommerce product editors"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Config file (skips the global/project lookup)")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(clap::Args, Clone, Default)]
struct ProviderArgs {
    #[arg(long, help = "LLM provider (gemini, openai)")]
    provider: Option<ProviderKind>,
    #[arg(long, help = "Model to use")]
    model: Option<String>,
}

impl From<ProviderArgs> for ProviderOverrides {
    fn from(args: ProviderArgs) -> Self {
        ProviderOverrides {
            provider: args.provider,
            model: args.model,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Read the product snapshot from a saved page
    Extract {
        #[arg(help = "Saved product editor page (HTML)")]
        page: PathBuf,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Generate SEO metadata for the product on a page
    Generate {
        #[arg(help = "Saved product editor page (HTML)")]
        page: PathBuf,
        #[command(flatten)]
        provider: ProviderArgs,
        #[arg(long, help = "Inject the generated fields into the page")]
        apply: bool,
        #[arg(long, help = "Inject and save the page")]
        write: bool,
        #[arg(long, short, help = "Save to this file instead of the input page")]
        output: Option<PathBuf>,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Inject a saved result into a page
    Apply {
        #[arg(help = "Saved product editor page (HTML)")]
        page: PathBuf,
        #[arg(help = "Result JSON file, or - for stdin")]
        result: PathBuf,
        #[arg(long, help = "Only apply this field (e.g. slug, focus_keyword)")]
        field: Option<String>,
        #[arg(long, help = "Save the page")]
        write: bool,
        #[arg(long, short, help = "Save to this file instead of the input page")]
        output: Option<PathBuf>,
    },

    /// Answer one protocol message read from stdin
    Message {
        #[arg(long, help = "Saved product editor page (HTML) for page-side actions")]
        page: Option<PathBuf>,
        #[command(flatten)]
        provider: ProviderArgs,
        #[arg(long, help = "Save the page after page-side actions")]
        write: bool,
        #[arg(long, short, help = "Save to this file instead of the input page")]
        output: Option<PathBuf>,
    },

    /// Show which editors and fields a page exposes
    Diagnose {
        #[arg(help = "Saved product editor page (HTML)")]
        page: PathBuf,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Check that the provider accepts the configured key and model
    TestConnection {
        #[command(flatten)]
        provider: ProviderArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mwooseo encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    // Logs go to stderr so JSON on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config;

    match cli.command {
        Commands::Extract { page, format } => {
            wooseo::cli::commands::extract::run(&page, &format)?;
        }
        Commands::Generate {
            page,
            provider,
            apply,
            write,
            output,
            format,
        } => {
            use wooseo::cli::commands::generate::{GenerateOptions, run};

            let rt = Runtime::new()?;
            rt.block_on(run(GenerateOptions {
                page,
                config,
                overrides: provider.into(),
                apply,
                write,
                output,
                format,
            }))?;
        }
        Commands::Apply {
            page,
            result,
            field,
            write,
            output,
        } => {
            use wooseo::cli::commands::apply::{ApplyOptions, run};

            run(ApplyOptions {
                page,
                result,
                field,
                write,
                output,
            })?;
        }
        Commands::Message {
            page,
            provider,
            write,
            output,
        } => {
            use wooseo::cli::commands::message::{MessageOptions, run};

            let rt = Runtime::new()?;
            rt.block_on(run(MessageOptions {
                page,
                config,
                overrides: provider.into(),
                write,
                output,
            }))?;
        }
        Commands::Diagnose { page, format } => {
            wooseo::cli::commands::diagnose::run(&page, &format)?;
        }
        Commands::TestConnection { provider } => {
            let rt = Runtime::new()?;
            rt.block_on(wooseo::cli::commands::connection::run(
                config.as_deref(),
                &provider.into(),
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                wooseo::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                wooseo::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                wooseo::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(())
}
