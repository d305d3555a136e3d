use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wayback_store::{EncodingVariant, EntityKind};

#[derive(Parser)]
#[command(
    name = "wayback",
    about = "Query a versioned map history store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Look up one version of one entity
    Get(GetArgs),
    /// Show estimated record counts per partition
    Stats(StatsArgs),
}

#[derive(Args)]
pub struct GetArgs {
    /// Store directory
    #[arg(long)]
    pub db: PathBuf,
    #[arg(long, value_enum)]
    pub kind: KindArg,
    #[arg(long, allow_negative_numbers = true)]
    pub id: i64,
    #[arg(long)]
    pub version: i32,
    /// Encoding the store was built with
    #[arg(long, value_enum, default_value = "compact")]
    pub encoding: EncodingArg,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Store directory
    #[arg(long)]
    pub db: PathBuf,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum KindArg {
    Node,
    Way,
    Relation,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Node => EntityKind::Point,
            KindArg::Way => EntityKind::Way,
            KindArg::Relation => EntityKind::Relation,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum EncodingArg {
    Compact,
    Document,
}

impl From<EncodingArg> for EncodingVariant {
    fn from(encoding: EncodingArg) -> Self {
        match encoding {
            EncodingArg::Compact => EncodingVariant::Compact,
            EncodingArg::Document => EncodingVariant::Document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from([
            "wayback", "get", "--db", "/tmp/db", "--kind", "way", "--id", "-12", "--version", "3",
            "--encoding", "document",
        ])
        .unwrap();
        match cli.command {
            Command::Get(args) => {
                assert_eq!(EntityKind::from(args.kind), EntityKind::Way);
                assert_eq!(args.id, -12);
                assert_eq!(args.version, 3);
                assert_eq!(EncodingVariant::from(args.encoding), EncodingVariant::Document);
            }
            Command::Stats(_) => panic!("expected get"),
        }
    }

    #[test]
    fn test_encoding_defaults_to_compact() {
        let cli = Cli::try_parse_from([
            "wayback", "get", "--db", "db", "--kind", "node", "--id", "1", "--version", "1",
        ])
        .unwrap();
        let Command::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(EncodingVariant::from(args.encoding), EncodingVariant::Compact);
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Cli::try_parse_from([
            "wayback", "get", "--db", "db", "--kind", "area", "--id", "1", "--version", "1",
        ])
        .is_err());
    }
}
