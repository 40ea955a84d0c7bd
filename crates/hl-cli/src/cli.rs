use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hashlink",
    about = "hashlink: append-only, hash-linked block ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the ledger's block store
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to a hashlink.toml configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the ledger and its genesis block
    Init,
    /// Append a block carrying BODY
    Append(AppendArgs),
    /// Show the current tip height
    Height,
    /// Show the block at a height
    Get(GetArgs),
    /// Validate every block and link in the chain
    Validate,
    /// Print every stored block
    Dump,
    /// Overwrite a block's body without rehashing it
    Tamper(TamperArgs),
    /// Empty the ledger
    Reset,
}

#[derive(Args)]
pub struct AppendArgs {
    pub body: String,
}

#[derive(Args)]
pub struct GetArgs {
    pub height: u64,
}

#[derive(Args)]
pub struct TamperArgs {
    pub height: u64,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["hashlink", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init));
    }

    #[test]
    fn parse_append() {
        let cli = Cli::try_parse_from(["hashlink", "append", "hello world"]).unwrap();
        if let Command::Append(args) = cli.command {
            assert_eq!(args.body, "hello world");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_get() {
        let cli = Cli::try_parse_from(["hashlink", "get", "7"]).unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.height, 7);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn get_rejects_negative_height() {
        assert!(Cli::try_parse_from(["hashlink", "get", "-1"]).is_err());
    }

    #[test]
    fn parse_tamper() {
        let cli = Cli::try_parse_from(["hashlink", "tamper", "2", "induced chain error"]).unwrap();
        if let Command::Tamper(args) = cli.command {
            assert_eq!(args.height, 2);
            assert_eq!(args.body, "induced chain error");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "hashlink", "validate", "--data-dir", "/tmp/chain", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Validate));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/chain")));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::try_parse_from(["hashlink", "--config", "hashlink.toml", "height"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("hashlink.toml")));
        assert!(matches!(cli.command, Command::Height));
    }
}
