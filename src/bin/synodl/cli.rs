use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Manage Synology Download Station tasks",
    long_about = "Manage Synology Download Station tasks.\n\n\
    Default values are read from ~/.synodl.ini, section [synology], keys \
    user, password, host, port, secure and timeout. Command-line options \
    override them."
)]
pub struct Cli {
    #[arg(short = 'u', long, global = true, help = "Account used to log in. Defaults to 'admin'.")]
    pub user: Option<String>,

    #[arg(short = 'p', long, global = true, help = "Password of the account. Asked if not provided.")]
    pub password: Option<String>,

    #[arg(short = 'H', long, global = true, help = "Hostname or IP address of the NAS. Defaults to 'syno'.")]
    pub host: Option<String>,

    #[arg(short = 'P', long, global = true, help = "Port of the NAS. Defaults to 5000.")]
    pub port: Option<u16>,

    #[arg(short = 's', long, global = true, help = "Use https to connect to the NAS.")]
    pub secure: bool,

    #[arg(long, global = true, help = "Accept self-signed certificates.")]
    pub insecure: bool,

    #[arg(short = 'c', long, global = true, help = "Configuration file to read instead of ~/.synodl.ini.")]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long, action = ArgAction::Count, global = true, help = "Increases verbosity (cumulative).")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Adds the URLs to the download queue
    Add {
        #[arg(short, long, help = "Destination folder on the NAS, e.g. video/Films.")]
        destination: Option<String>,

        #[arg(long, requires = "source_password", help = "Username for the download source.")]
        source_user: Option<String>,

        #[arg(long, requires = "source_user", help = "Password for the download source.")]
        source_password: Option<String>,

        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Lists the current downloads, finished or in progress
    List {
        #[arg(short, long, help = "Refresh the list until interrupted.")]
        watch: bool,

        #[arg(
            long,
            default_value = "1",
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Seconds between refreshes with --watch."
        )]
        interval: u64,
    },

    /// Shows the details of the given downloads
    Info {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Removes the downloads specified by their ids
    Delete {
        #[arg(short, long, help = "Also remove unfinished downloads.")]
        force: bool,

        #[arg(short, long, help = "Remove all downloads.")]
        all: bool,

        #[arg(required_unless_present = "all")]
        ids: Vec<String>,
    },
}
