//! Command-line definition for the `sysguard` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sysguard_core::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Parser)]
#[command(name = "sysguard", version, about = "Host metrics monitor with rule-driven auto-remediation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the YAML configuration file.
    #[arg(
        long,
        global = true,
        env = "SYSGUARD_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a CPU, memory and disk snapshot.
    Status,

    /// List the processes using the most CPU.
    Top {
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: usize,
    },

    /// Run an autofix check once, or continuously with `--watch`.
    Monitor {
        #[arg(long, short = 'w')]
        watch: bool,
    },

    /// Show recent alerts from the alert log.
    History {
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: i64,
    },

    /// Send SIGKILL to a process.
    Kill { pid: u32 },

    /// Validate the configured rules without evaluating them.
    Check,
}

/// Whether output should be rendered as tables or JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["sysguard"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn top_defaults_to_ten() {
        let cli = parse(&["top"]);
        assert_matches!(cli.command, Command::Top { limit: 10 });
        assert_eq!(cli.output_mode(), OutputMode::Human);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["history", "--limit", "3", "--json", "--config", "/tmp/sg.yaml"]);
        assert_matches!(cli.command, Command::History { limit: 3 });
        assert_eq!(cli.output_mode(), OutputMode::Json);
        assert_eq!(cli.config, PathBuf::from("/tmp/sg.yaml"));
    }

    #[test]
    fn monitor_watch_flag() {
        assert_matches!(parse(&["monitor"]).command, Command::Monitor { watch: false });
        assert_matches!(parse(&["monitor", "-w"]).command, Command::Monitor { watch: true });
    }

    #[test]
    fn kill_requires_numeric_pid() {
        assert_matches!(parse(&["kill", "4242"]).command, Command::Kill { pid: 4242 });
        assert!(Cli::try_parse_from(["sysguard", "kill", "nginx"]).is_err());
    }
}
