//! Configuration and CLI definitions

use crate::types::ReplikError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Policy for entries and attributes the process cannot replicate
/// (device nodes, sockets, fifos, ownership or xattr namespaces that
/// need elevated privilege)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Abort the copy with the offending path (default: a replication
    /// tool should not report success for an incomplete tree)
    #[default]
    Fail,

    /// Skip the entry or attribute, count it, and keep going
    Skip,
}

/// Runtime configuration for replik
#[derive(Debug, Clone)]
pub struct Config {
    /// Source tree (left tree for verify)
    pub source: PathBuf,

    /// Destination tree (right tree for verify)
    pub destination: PathBuf,

    /// How to handle unsupported entries and attributes during copy
    pub unsupported: UnsupportedPolicy,

    /// Verify: collect every difference instead of stopping at the first
    pub report_all: bool,

    /// Verify: also compare modification times
    pub check_times: bool,

    /// Verify: emit differences as JSON
    pub json: bool,

    /// Suppress progress and summary output
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            unsupported: UnsupportedPolicy::default(),
            report_all: false,
            check_times: false,
            json: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Validate configuration for a copy operation
    pub fn validate(&self) -> Result<(), ReplikError> {
        if !self.source.exists() {
            return Err(ReplikError::Config(format!(
                "Source path does not exist: {:?}",
                self.source
            )));
        }

        if self.source == self.destination {
            return Err(ReplikError::Config(
                "Source and destination cannot be the same".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate configuration for a verify operation (both roots must exist)
    pub fn validate_verify(&self) -> Result<(), ReplikError> {
        self.validate()?;

        if !self.destination.exists() {
            return Err(ReplikError::Config(format!(
                "Tree to verify does not exist: {:?}",
                self.destination
            )));
        }

        Ok(())
    }
}

/// Command-line interface
#[derive(Debug, Parser)]
#[command(
    name = "replik",
    version,
    about = "Directory tree replication - faithful copies, verified equivalence"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replicate a directory tree
    Copy {
        /// Source directory
        source: PathBuf,

        /// Destination directory (created if missing)
        destination: PathBuf,

        /// Skip unsupported entries and attributes instead of failing
        #[arg(long)]
        skip_unsupported: bool,

        /// Suppress progress and summary output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Verify that two trees are semantically identical
    Verify {
        /// Left tree
        left: PathBuf,

        /// Right tree
        right: PathBuf,

        /// Report every difference instead of stopping at the first
        #[arg(long)]
        all: bool,

        /// Also compare modification times
        #[arg(long)]
        times: bool,

        /// Emit differences as JSON
        #[arg(long)]
        json: bool,

        /// Print nothing; communicate through the exit code only
        #[arg(long, short)]
        quiet: bool,
    },
}

impl From<Command> for Config {
    fn from(command: Command) -> Self {
        match command {
            Command::Copy {
                source,
                destination,
                skip_unsupported,
                quiet,
            } => Config {
                source,
                destination,
                unsupported: if skip_unsupported {
                    UnsupportedPolicy::Skip
                } else {
                    UnsupportedPolicy::Fail
                },
                quiet,
                ..Config::default()
            },
            Command::Verify {
                left,
                right,
                all,
                times,
                json,
                quiet,
            } => Config {
                source: left,
                destination: right,
                report_all: all,
                check_times: times,
                json,
                quiet,
                ..Config::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_rejects_missing_source() {
        let config = Config {
            source: PathBuf::from("/nonexistent/source/tree"),
            destination: PathBuf::from("/tmp/dest"),
            ..Config::default()
        };

        let error = config.validate().expect_err("validation should fail");
        assert!(error.is_validation_error());
    }

    #[test]
    fn test_validate_rejects_source_equal_destination() {
        let temp = TempDir::new().expect("create temp dir");
        let config = Config {
            source: temp.path().to_path_buf(),
            destination: temp.path().to_path_buf(),
            ..Config::default()
        };

        let error = config.validate().expect_err("validation should fail");
        assert!(error.to_string().contains("cannot be the same"));
    }

    #[test]
    fn test_validate_verify_requires_both_roots() {
        let temp = TempDir::new().expect("create temp dir");
        let config = Config {
            source: temp.path().to_path_buf(),
            destination: temp.path().join("missing"),
            ..Config::default()
        };

        assert!(config.validate().is_ok());
        assert!(config.validate_verify().is_err());
    }

    #[test]
    fn test_copy_command_maps_skip_policy() {
        let command = Command::Copy {
            source: PathBuf::from("/a"),
            destination: PathBuf::from("/b"),
            skip_unsupported: true,
            quiet: false,
        };

        let config = Config::from(command);
        assert_eq!(config.unsupported, UnsupportedPolicy::Skip);
        assert_eq!(config.source, PathBuf::from("/a"));
    }

    #[test]
    fn test_verify_command_maps_roots_and_flags() {
        let command = Command::Verify {
            left: PathBuf::from("/left"),
            right: PathBuf::from("/right"),
            all: true,
            times: true,
            json: false,
            quiet: true,
        };

        let config = Config::from(command);
        assert_eq!(config.source, PathBuf::from("/left"));
        assert_eq!(config.destination, PathBuf::from("/right"));
        assert!(config.report_all);
        assert!(config.check_times);
        assert!(config.quiet);
        assert_eq!(config.unsupported, UnsupportedPolicy::Fail);
    }

    #[test]
    fn test_cli_parses_copy_invocation() {
        let cli = Cli::try_parse_from(["replik", "copy", "/src", "/dst", "--skip-unsupported"])
            .expect("parse should succeed");

        match cli.command {
            Command::Copy {
                skip_unsupported, ..
            } => assert!(skip_unsupported),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
