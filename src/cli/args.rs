//! CLI argument definitions using clap
//!
//! Commands:
//! - insightdb query --config <path>
//! - insightdb list --config <path>
//! - insightdb add --config <path> --id <id> --kind <sections|rooms> --file <path>
//! - insightdb remove --config <path> --id <id>
//! - insightdb schedule --config <path> --sections <id> --rooms <id>

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dataset::DatasetKind;

/// insightdb - query engine and room scheduler for course and room datasets
#[derive(Parser, Debug)]
#[command(name = "insightdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read one JSON query from stdin and print its rows
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,
    },

    /// List stored datasets
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,
    },

    /// Store a dataset from a JSON array of records, replacing any existing one
    Add {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,

        /// Dataset id (non-empty, no underscore)
        #[arg(long)]
        id: String,

        /// Record shape of the file
        #[arg(long, value_enum)]
        kind: KindArg,

        /// JSON file holding the record array
        #[arg(long)]
        file: PathBuf,
    },

    /// Delete a stored dataset
    Remove {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,

        /// Dataset id
        #[arg(long)]
        id: String,
    },

    /// Assign every section of one dataset to rooms of another
    Schedule {
        /// Path to configuration file
        #[arg(long, default_value = "./insightdb.json")]
        config: PathBuf,

        /// Id of a sections dataset
        #[arg(long)]
        sections: String,

        /// Id of a rooms dataset
        #[arg(long)]
        rooms: String,
    },
}

/// Dataset kind as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Sections,
    Rooms,
}

impl From<KindArg> for DatasetKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Sections => DatasetKind::Sections,
            KindArg::Rooms => DatasetKind::Rooms,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "insightdb", "add", "--id", "courses", "--kind", "sections", "--file", "c.json",
        ])
        .unwrap();
        match cli.command {
            Command::Add { config, id, kind, file } => {
                assert_eq!(config, PathBuf::from("./insightdb.json"));
                assert_eq!(id, "courses");
                assert_eq!(DatasetKind::from(kind), DatasetKind::Sections);
                assert_eq!(file, PathBuf::from("c.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_schedule() {
        let cli = Cli::try_parse_from([
            "insightdb", "schedule", "--config", "x.json", "--sections", "c", "--rooms", "r",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Schedule { .. }));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Cli::try_parse_from([
            "insightdb", "add", "--id", "x", "--kind", "buildings", "--file", "f"
        ])
        .is_err());
    }
}
