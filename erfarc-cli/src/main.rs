//! erfarc CLI - ERF/MOD/HAK archive utility
//!
//! Lists, extracts, inspects and creates the resource archives of the
//! Aurora engine games. Nested archives are expanded in place.

mod commands;
mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{ExtractOptions, ListOptions};
use erfarc_archive::ErfVersion;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "erfarc")]
#[command(author, version, about = "ERF/MOD/HAK resource archive utility")]
#[command(long_about = "
erfarc reads and writes ERF-family resource archives (.erf, .mod, .hak).
Archives nested inside archives are expanded recursively.

Filters are regular expressions matched against logical paths such as
'scripts.erf/x0_onspawn.nss'. A resource is kept if any filter matches;
a container that does not match is skipped with everything inside it.

Examples:
  erfarc list module.mod
  erfarc list module.mod -d 1 --json
  erfarc extract module.mod -o out
  erfarc extract module.mod -f '\\.nss$' -f '^scripts\\.erf'
  erfarc info textures.hak
  erfarc create scripts.erf a.nss b.nss --version 1.1
  erfarc detect unknown.bin
")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of archives
    #[command(alias = "l")]
    List {
        /// Archive files to list
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Container levels to expand (negative for unlimited)
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        depth: i32,

        /// Keep only paths matching any of these regular expressions
        #[arg(short, long)]
        filter: Vec<String>,

        /// Also list meta files
        #[arg(short, long)]
        meta: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Extract resources from archives
    #[command(alias = "x")]
    Extract {
        /// Archive files to extract
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Output directory (defaults to each archive's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Container levels to expand (negative for unlimited)
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        depth: i32,

        /// Keep only paths matching any of these regular expressions
        #[arg(short, long)]
        filter: Vec<String>,

        /// Continue past failing resources and report them at the end
        #[arg(short, long)]
        keep_going: bool,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show header, strings and entry table of an archive
    #[command(alias = "i")]
    Info {
        /// Archive file to inspect
        archive: PathBuf,
    },

    /// Create a new archive
    #[command(alias = "c")]
    Create {
        /// Output archive file (.erf, .mod or .hak)
        archive: PathBuf,

        /// Files to add; key and type come from each filename
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Format version
        #[arg(long, value_enum, default_value = "1.0")]
        version: VersionArg,

        /// Description stored as an English localized string
        #[arg(long)]
        description: Option<String>,
    },

    /// Detect archive kind
    Detect {
        /// File to detect
        file: PathBuf,
    },
}

/// Archive format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum VersionArg {
    /// 16-byte keys
    #[default]
    #[value(name = "1.0")]
    V10,
    /// 32-byte keys
    #[value(name = "1.1")]
    V11,
}

impl From<VersionArg> for ErfVersion {
    fn from(version: VersionArg) -> Self {
        match version {
            VersionArg::V10 => ErfVersion::V1_0,
            VersionArg::V11 => ErfVersion::V1_1,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::List {
            archives,
            depth,
            filter,
            meta,
            json,
        } => commands::cmd_list(
            &archives,
            &ListOptions {
                depth,
                filters: &filter,
                meta,
                json,
            },
        ),
        Commands::Extract {
            archives,
            output,
            depth,
            filter,
            keep_going,
            quiet,
        } => commands::cmd_extract(
            &archives,
            &ExtractOptions {
                output: output.as_deref(),
                depth,
                filters: &filter,
                keep_going,
                progress: !quiet,
            },
        ),
        Commands::Info { archive } => commands::cmd_info(&archive),
        Commands::Create {
            archive,
            files,
            version,
            description,
        } => commands::cmd_create(&archive, &files, version.into(), description.as_deref()),
        Commands::Detect { file } => commands::cmd_detect(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_list() {
        let cli = Cli::try_parse_from([
            "erfarc", "-vv", "list", "a.mod", "b.hak", "-d", "-1", "-f", "^x", "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::List {
                archives,
                depth,
                filter,
                json,
                ..
            } => {
                assert_eq!(archives.len(), 2);
                assert_eq!(depth, -1);
                assert_eq!(filter, ["^x"]);
                assert!(json);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_cli_parses_create_version() {
        let cli =
            Cli::try_parse_from(["erfarc", "create", "out.erf", "a.nss", "--version", "1.1"])
                .unwrap();
        match cli.command {
            Commands::Create { version, .. } => {
                assert_eq!(ErfVersion::from(version), ErfVersion::V1_1)
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_cli_requires_archives() {
        assert!(Cli::try_parse_from(["erfarc", "extract"]).is_err());
    }
}
