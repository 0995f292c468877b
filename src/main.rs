//! `BeanFlow` CLI - generate the narrated pitch video

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use beanflow::GeneratorConfig;

#[derive(Parser)]
#[command(name = "beanflow")]
#[command(about = "Turn the BeanFlow pitch script into a narrated MP4 video")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ~/.config/beanflow/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (default: beanflow_output)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the pitch video (default)
    Generate {
        /// Do not ask for a Pexels API key; build a text-slide video
        #[arg(long)]
        no_prompt: bool,

        /// Keep intermediate audio, slide and clip files
        #[arg(long)]
        keep_work: bool,

        /// Narrate this text instead of the built-in pitch (one slide per sentence)
        #[arg(long)]
        text: Option<String>,
    },

    /// Check that ffmpeg and ffprobe are available
    Check,

    /// Render the text slides only, without narration or encoding
    Slides {
        /// Directory for the slide images (default: <output-dir>/slides)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Render slides for this text instead of the built-in pitch
        #[arg(long)]
        text: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let mut config = GeneratorConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config = config.with_output_dir(dir);
    }

    match cli.command.unwrap_or(Commands::Generate {
        no_prompt: false,
        keep_work: false,
        text: None,
    }) {
        Commands::Generate {
            no_prompt,
            keep_work,
            text,
        } => {
            let keep_work = keep_work || config.keep_work_files;
            cmd::cmd_generate(config.with_keep_work_files(keep_work), no_prompt, text.as_deref())
                .await?;
        }
        Commands::Check => {
            cmd::cmd_check(&config).await;
        }
        Commands::Slides { dir, text } => {
            cmd::cmd_slides(&config, dir, text.as_deref())?;
        }
    }

    Ok(())
}
