use clap::Parser;
use prism::{config, output, process};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let hash = env!("PRISM_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once; called exactly once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Decode, reorient, fit and re-encode a JPEG or PNG image")]
#[command(long_about = "\
Decode, reorient, fit and re-encode a JPEG or PNG image

The image is decoded (inputs whose declared size exceeds the pixel limit are
rejected before decoding), rotated upright according to its EXIF orientation,
scaled down to fit WIDTH x HEIGHT if given, and written to
<output-dir>/resized.<ext> in its source format. GIF input is written as PNG.

A bound of 0 leaves that axis unconstrained. Images are never upscaled.

Run 'prism --print-config' to print a documented prism.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Source image (JPEG, PNG or GIF)
    #[arg(required_unless_present = "print_config")]
    image: Option<PathBuf>,

    /// Maximum output width (0 = unconstrained)
    #[arg(requires = "height")]
    width: Option<u32>,

    /// Maximum output height (0 = unconstrained)
    height: Option<u32>,

    /// Config file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to write the output file into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print a stock prism.toml with all options documented
    #[arg(long, exclusive = true)]
    print_config: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Usage errors exit 1; --help and --version are not errors
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.print_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(cli.config.as_deref())?;
    init_thread_pool(&config.processing);

    let source = cli.image.ok_or("missing IMAGE argument")?;
    let bounds = cli.width.zip(cli.height);
    let report = process::run(&process::RunOptions {
        source,
        bounds,
        output_dir: cli.output_dir,
        config,
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report);
    }
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "prism=debug",
        _ => "prism=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
