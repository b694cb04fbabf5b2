use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "pkgmirror")]
#[command(about = "Mirror a Python package index and serve searches over it")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ./pkgmirror.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mirror the catalog, or only the named packages
    Mirror(MirrorArgs),
    /// Answer XML-RPC search calls from the mirror index
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct MirrorArgs {
    /// Mirror root directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Reconcile these packages instead of listing the catalog
    #[arg(long = "package", value_name = "NAME")]
    pub packages: Vec<String>,

    #[arg(long)]
    pub reconcilers: Option<usize>,

    #[arg(long)]
    pub fetchers: Option<usize>,

    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Extra downloads after a checksum mismatch
    #[arg(long)]
    pub checksum_retries: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Mirror root directory holding the index
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

impl MirrorArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(n) = self.reconcilers {
            config.reconcilers = n;
        }
        if let Some(n) = self.fetchers {
            config.fetchers = n;
        }
        if let Some(n) = self.queue_capacity {
            config.queue_capacity = n;
        }
        if let Some(n) = self.checksum_retries {
            config.checksum_retries = n;
        }
    }
}

impl ServeArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "pkgmirror",
            "mirror",
            "--root",
            "/data/mirror",
            "--package",
            "Django",
            "--package",
            "flask",
            "--fetchers",
            "4",
            "-v",
        ]);
        assert!(cli.verbose);

        let Command::Mirror(args) = cli.command else {
            panic!("expected mirror subcommand");
        };
        assert_eq!(args.packages, vec!["Django", "flask"]);

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.root, PathBuf::from("/data/mirror"));
        assert_eq!(config.fetchers, 4);
        assert_eq!(config.reconcilers, Config::default().reconcilers);
    }

    #[test]
    fn test_serve_bind() {
        let cli = Cli::parse_from(["pkgmirror", "serve", "--bind", "0.0.0.0:8000"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve subcommand");
        };

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.bind.port(), 8000);
    }
}
