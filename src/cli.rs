//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::project::DEFAULT_FILE_NAME;

/// Default path of the generated Ninja file.
pub const DEFAULT_OUTPUT: &str = "build.ninja";

/// Expand variant-matrix target declarations into a Ninja build file.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the Matrixfile to compile.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_FILE_NAME,
        env = "BUILDMATRIX_FILE"
    )]
    pub file: PathBuf,

    /// Run as if started in this directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `generate` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse the provided arguments, applying the default command when needed.
    ///
    /// # Errors
    ///
    /// Returns the clap error when the arguments are invalid.
    pub fn try_parse_with_default<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map(Self::with_default_command)
    }

    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::default());
        }
        self
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Write the Ninja file for the project.
    Generate {
        /// Output path; `-` writes to standard output.
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Print the SHA-256 fingerprint of the generated statement stream.
    Fingerprint,

    /// List the variant tags a target expands to, in matrix order.
    Variants {
        /// Target name as declared in the Matrixfile.
        target: String,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Self::Generate {
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}
