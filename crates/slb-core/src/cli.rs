//! Command line surface

use crate::pipeline::{RunOptions, DEFAULT_OUTPUT_DIR};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use std::path::PathBuf;

/// Default store snapshot path
pub const DEFAULT_SNAPSHOT: &str = "snapshot.json";

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Build scripts from a config file
    Build {
        /// Config path
        config: PathBuf,
        /// Run switches
        options: RunOptions,
    },

    /// Print the dependencies of one service
    Dependencies {
        /// Service name
        service: String,
        /// Follow kernel-mode dependencies too
        kernel_mode: bool,
    },
}

/// Parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Store snapshot to plan against
    pub snapshot: PathBuf,

    /// Selected mode
    pub mode: Mode,
}

/// Build the argument parser
#[must_use]
pub fn command() -> Command {
    Command::new("service-list-builder")
        .version(crate::VERSION)
        .about("Builds dependency-safe scripts that disable services and restore them")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("config")
                .value_parser(clap::value_parser!(PathBuf))
                .help("path to lists config file"),
        )
        .arg(
            Arg::new("get-dependencies")
                .long("get-dependencies")
                .value_name("service")
                .help("returns the entire dependency tree for a given service"),
        )
        .group(
            ArgGroup::new("mode")
                .args(["config", "get-dependencies"])
                .required(true),
        )
        .arg(
            Arg::new("disable-running")
                .long("disable-running")
                .action(ArgAction::SetTrue)
                .requires("config")
                .conflicts_with("get-dependencies")
                .help("only disable services specified in the list that are currently running"),
        )
        .arg(
            Arg::new("kernel-mode")
                .long("kernel-mode")
                .action(ArgAction::SetTrue)
                .requires("get-dependencies")
                .conflicts_with("config")
                .help("includes kernel-mode services in the dependency tree when using --get-dependencies"),
        )
        .arg(
            Arg::new("disable-service-warning")
                .long("disable-service-warning")
                .action(ArgAction::SetTrue)
                .help("disable the non-Windows services warning"),
        )
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .value_name("file")
                .default_value(DEFAULT_SNAPSHOT)
                .value_parser(clap::value_parser!(PathBuf))
                .help("store snapshot of the target machine"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("dir")
                .default_value(DEFAULT_OUTPUT_DIR)
                .value_parser(clap::value_parser!(PathBuf))
                .help("directory build output is written under"),
        )
}

impl CliArgs {
    /// Parse from the process arguments, exiting on usage errors
    #[must_use]
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parse from an explicit argument list
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let path = |id: &str| {
            matches
                .get_one::<PathBuf>(id)
                .cloned()
                .unwrap_or_default()
        };

        let mode = match matches.get_one::<String>("get-dependencies") {
            Some(service) => Mode::Dependencies {
                service: service.clone(),
                kernel_mode: matches.get_flag("kernel-mode"),
            },
            None => Mode::Build {
                config: path("config"),
                options: RunOptions::new()
                    .with_disable_running(matches.get_flag("disable-running"))
                    .with_suppress_vendor_warning(matches.get_flag("disable-service-warning"))
                    .with_output_dir(path("output")),
            },
        };

        Self {
            snapshot: path("snapshot"),
            mode,
        }
    }
}
