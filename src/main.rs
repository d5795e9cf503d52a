use clap::Parser;
use enigma::cli::{convert_files, describe_config, ConvertOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("ENIGMA_VERSION");
const BUILD: &str = env!("ENIGMA_BUILD");
const PROFILE: &str = env!("ENIGMA_PROFILE");
const GIT_HASH: &str = env!("ENIGMA_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH)
    })
}

#[derive(Parser)]
#[command(name = "enigma")]
#[command(author, about = "Rotor cipher machine simulator", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Print the parsed machine configuration as JSON and exit
    #[arg(long)]
    describe: bool,

    /// Characters per output group (0 disables grouping)
    #[arg(long, default_value = "5")]
    group_size: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Machine configuration file
    #[arg(required_unless_present = "version")]
    config: Option<PathBuf>,

    /// File of settings lines and messages (default: standard input)
    input: Option<PathBuf>,

    /// File for converted messages (default: standard output)
    output: Option<PathBuf>,
}

/// Log to stderr; RUST_LOG overrides the level chosen with -v
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    // usage errors exit 1 like every other failure; --help still exits 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if cli.version {
        println!("enigma {}", get_version());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);

    let config = match cli.config {
        Some(config) => config,
        None => {
            eprintln!("Error: missing configuration file");
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.describe {
        describe_config(&config).map(|json| println!("{}", json))
    } else {
        let options = ConvertOptions {
            group_size: cli.group_size,
        };
        convert_files(&config, cli.input.as_deref(), cli.output.as_deref(), &options).map(|_| ())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
