//! Command-line interface for roster.

mod commands;

use clap::{Parser, Subcommand};

/// Roster - event registration for users and teams
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// List registered users
    #[command(alias = "u")]
    Users,

    /// List teams with their members
    #[command(alias = "t")]
    Teams,

    /// Grant site administrator rights to a user
    Promote {
        /// Email the user registered with
        email: String,
    },

    /// Delete a user, leaving their team first
    DeleteUser {
        /// User ID (see `roster users`)
        id: i32,
    },
}

pub use commands::*;
