#[cfg(not(test))]
use anyhow::Result;
use clap::{Parser, Subcommand};
#[cfg(not(test))]
use xtask::*;

#[derive(Parser)]
#[command(author, version, about = "Development tasks for peaklets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Build,
    Test,
    Clippy,
    Fmt,
    /// Run fmt, then clippy
    Analyze,
    /// Run the demo matching the detected configuration
    Demo,
    #[command(name = "bench-libs")]
    BenchLibs,
    Sanity {
        /// Signal file (WAV or text)
        input: Option<String>,
        /// Use a generated signal of this many samples
        #[arg(long)]
        synthetic: Option<usize>,
        /// Write a heatmap PNG
        #[arg(long)]
        png: Option<String>,
    },
}

#[cfg(not(test))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = detect_config();

    match cli.command {
        Commands::Build => run(build_command(&cfg)),
        Commands::Test => run(test_command(&cfg)),
        Commands::Clippy => run(clippy_command()),
        Commands::Fmt => run(fmt_command()),
        Commands::Analyze => {
            run(fmt_command())?;
            run(clippy_command())
        }
        Commands::Demo => run(demo_command(&cfg)),
        Commands::BenchLibs => run(bench_libs_command(&cfg)),
        Commands::Sanity {
            input,
            synthetic,
            png,
        } => {
            let synthetic = if input.is_none() && synthetic.is_none() {
                Some(2048)
            } else {
                synthetic
            };
            run(sanity_command(input.as_deref(), synthetic, png.as_deref()))
        }
    }
}
