//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use tracing::warn;

use crate::domain::TreeParams;
use crate::util::scan::{scan_float, scan_int};

/// Drive guided tree programs and inspect the trees they build
#[derive(Parser, Debug)]
#[command(name = "guidetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug logging to stderr (repeat for more: -d -d -d)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .guidetree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run random-action episodes against a guided program
    Run {
        /// Number of episodes
        #[arg(short = 'n', long)]
        episodes: Option<usize>,

        /// Actions are drawn from [0, ACTION_SPACE)
        #[arg(long)]
        action_space: Option<u32>,

        /// Seed for the action generator
        #[arg(long)]
        seed: Option<u64>,

        /// State dictionary file
        #[arg(long, value_hint = ValueHint::FilePath)]
        state_dict: Option<PathBuf>,

        /// Seconds to wait for each line of program output
        #[arg(long)]
        timeout: Option<u64>,

        /// Print every STATE/ACTION/DONE line
        #[arg(short, long)]
        verbose: bool,

        /// Pass the program's stderr through
        #[arg(long)]
        show_stderr: bool,

        /// Guided program and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, value_hint = ValueHint::CommandWithArguments)]
        program: Vec<String>,
    },

    /// Archive states and return to rarely visited ones by replaying their actions
    Explore {
        /// Number of explore/restore rounds
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Actions are drawn from [0, ACTION_SPACE)
        #[arg(long)]
        action_space: Option<u32>,

        /// Upper bound of random actions per round
        #[arg(long)]
        explore_steps: Option<usize>,

        /// Seed for the action generator
        #[arg(long)]
        seed: Option<u64>,

        /// GUIDETREE_SEED passed to the program so replays are deterministic
        #[arg(long, default_value_t = 0)]
        program_seed: u64,

        /// State dictionary file
        #[arg(long, value_hint = ValueHint::FilePath)]
        state_dict: Option<PathBuf>,

        /// Seconds to wait for each line of program output
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the cell archive
        #[arg(short, long)]
        verbose: bool,

        /// Pass the program's stderr through
        #[arg(long)]
        show_stderr: bool,

        /// Guided program and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, value_hint = ValueHint::CommandWithArguments)]
        program: Vec<String>,
    },

    /// Group logged trees by shape
    Analyze {
        /// File with one tree or DONE line per line
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Display a rendered tree
    Show {
        /// Tree in (left,value,right) form
        tree: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}

/// Build a guided random binary tree with depth 4 and prune threshold 0.5
#[derive(Parser, Debug)]
#[command(name = "bst")]
#[command(author, version, about, long_about = None)]
pub struct BstArgs {
    /// Debug logging to stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Seed for the prune draws (random if absent)
    #[arg(long, env = "GUIDETREE_SEED")]
    pub seed: Option<u64>,
}

/// Build a guided random binary tree of the given depth and prune threshold
#[derive(Parser, Debug)]
#[command(name = "tree")]
#[command(author, version, about, long_about = None)]
pub struct TreeArgs {
    /// Maximum depth (scanned leniently, unreadable means 0)
    #[arg(allow_negative_numbers = true)]
    pub depth: String,

    /// Prune threshold in [0, 1] (scanned leniently, unreadable means 0)
    #[arg(allow_negative_numbers = true)]
    pub prune: String,

    /// Debug logging to stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Seed for the prune draws (random if absent)
    #[arg(long, env = "GUIDETREE_SEED")]
    pub seed: Option<u64>,
}

impl TreeArgs {
    /// Tree parameters from the positional arguments.
    ///
    /// Scanning is best effort: the numeric prefix is used, anything
    /// unreadable becomes 0 and a negative depth is treated as 0.
    pub fn params(&self) -> TreeParams {
        let depth = scan_int(&self.depth).unwrap_or_else(|| {
            warn!(value = %self.depth, "unreadable depth, using 0");
            0
        });
        let prune = scan_float(&self.prune).unwrap_or_else(|| {
            warn!(value = %self.prune, "unreadable prune threshold, using 0");
            0.0
        });
        let max_depth = u32::try_from(depth.max(0)).unwrap_or(u32::MAX);
        TreeParams::new(max_depth, prune)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
        BstArgs::command().debug_assert();
        TreeArgs::command().debug_assert();
    }

    #[test]
    fn given_tree_args_when_scanning_then_uses_numeric_prefixes() {
        let args = TreeArgs::try_parse_from(["tree", "3", "0.25"]).unwrap();
        assert_eq!(args.params(), TreeParams::new(3, 0.25));
    }

    #[test]
    fn given_unreadable_depth_when_scanning_then_depth_is_zero() {
        let args = TreeArgs::try_parse_from(["tree", "deep", "-1"]).unwrap();
        assert_eq!(args.params(), TreeParams::new(0, -1.0));
    }

    #[test]
    fn given_negative_depth_when_scanning_then_clamps_to_zero() {
        let args = TreeArgs::try_parse_from(["tree", "-2", "0.5"]).unwrap();
        assert_eq!(args.params().max_depth, 0);
    }

    #[test]
    fn given_missing_prune_when_parsing_tree_args_then_usage_error() {
        assert!(TreeArgs::try_parse_from(["tree", "3"]).is_err());
    }

    #[test]
    fn given_run_with_program_args_when_parsing_then_keeps_them_verbatim() {
        let cli = Cli::try_parse_from(["guidetree", "run", "-n", "3", "--", "tree", "2", "0.5"]).unwrap();
        match cli.command {
            Commands::Run { episodes, program, .. } => {
                assert_eq!(episodes, Some(3));
                assert_eq!(program, vec!["tree", "2", "0.5"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_explore_without_program_seed_when_parsing_then_defaults_to_zero() {
        let cli = Cli::try_parse_from(["guidetree", "explore", "-n", "4", "--", "bst"]).unwrap();
        match cli.command {
            Commands::Explore {
                iterations,
                program_seed,
                program,
                ..
            } => {
                assert_eq!(iterations, Some(4));
                assert_eq!(program_seed, 0);
                assert_eq!(program, vec!["bst"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
