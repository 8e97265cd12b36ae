//! Kiln CLI - static front-end asset build.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kiln_pipeline::BuildError;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

/// Exit code for errors that do not belong to a build stage.
const EXIT_UNEXPECTED: u8 = 10;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Compile SCSS, bundle JavaScript and copy static files into a build directory")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to kiln.toml config file, relative to the project root
    #[arg(short, long, default_value = "kiln.toml")]
    config: PathBuf,

    /// Project root
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the output tree (default)
    Build {
        /// Output directory (defaults to config or "build")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Remove the output directory
    Clean,

    /// Scaffold a source tree in the project root
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let config_path = cli.root.join(&cli.config);

    // Execute command
    let result = match cli.command.unwrap_or(Commands::Build {
        output: None,
        no_minify: false,
    }) {
        Commands::Build { output, no_minify } => {
            let minify = if no_minify { Some(false) } else { None };
            commands::build::run(&cli.root, &config_path, output, minify).await
        }
        Commands::Clean => commands::clean::run(&cli.root, &config_path).await,
        Commands::Init { yes } => commands::init::run(&cli.root, yes).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Stage failures carry their own exit code; anything else is unexpected.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<BuildError>()
        .map(BuildError::exit_code)
        .unwrap_or(EXIT_UNEXPECTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_compilers::BundleError;

    #[test]
    fn build_errors_keep_their_code() {
        let err = anyhow::Error::new(BuildError::Scripts(BundleError::Unsupported(
            "source maps".into(),
        )));

        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn other_errors_are_unexpected() {
        let err = anyhow::anyhow!("Failed to parse kiln.toml");

        assert_eq!(exit_code(&err), 10);
    }

    #[test]
    fn build_is_the_default_command() {
        let cli = Cli::try_parse_from(["kiln"]).unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("kiln.toml"));
    }

    #[test]
    fn parses_build_flags() {
        let cli = Cli::try_parse_from(["kiln", "-v", "build", "--output", "dist", "--no-minify"])
            .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Build { output, no_minify }) => {
                assert_eq!(output, Some(PathBuf::from("dist")));
                assert!(no_minify);
            }
            _ => panic!("expected build command"),
        }
    }
}
