use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::compare::SortColumn;

/// shelvcmp - compare the pending changes of two shelvesets
#[derive(Parser, Debug)]
#[command(name = "shelvcmp", version, about, long_about = None)]
pub struct Args {
    /// Repository holding the shelvesets (defaults to the current directory)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub repo: Option<PathBuf>,

    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List shelvesets, newest first
    List {
        /// Owner account or display name (defaults to the current user)
        #[arg(long)]
        user: Option<String>,

        /// Also list this user's shelvesets
        #[arg(long)]
        second_user: Option<String>,
    },

    /// Compare two shelvesets
    Compare {
        /// First shelveset: `name` or `owner/name`
        first: String,

        /// Second shelveset: `name` or `owner/name`
        second: String,

        /// Only show files whose path contains this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,

        /// Column to sort the listing by
        #[arg(long, value_enum, default_value_t = SortKey::First)]
        sort: SortKey,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the pending changes of one shelveset
    Details {
        /// `name` or `owner/name`
        shelveset: String,
    },

    /// Save a commit as a shelveset of the current user
    Shelve {
        name: String,

        /// Commit holding the shelved changes, diffed against its first parent
        #[arg(long, default_value = "HEAD")]
        rev: String,

        /// Shelveset comment
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current settings
    Show,
    /// Change one setting
    Set { key: String, value: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    First,
    Second,
    Status,
}

impl From<SortKey> for SortColumn {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::First => SortColumn::First,
            SortKey::Second => SortColumn::Second,
            SortKey::Status => SortColumn::Status,
        }
    }
}

/// Generate shell completions to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    generate(shell, &mut cmd, "shelvcmp", &mut io::stdout());
}
