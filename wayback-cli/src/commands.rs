use anyhow::Context;
use serde_json::Value;
use wayback_store::{
    CompactCodec, EncodingVariant, EntityKind, ObjectStore, StoreConfig, StoreError,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Get(args) => cmd_get(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn cmd_get(args: GetArgs) -> anyhow::Result<()> {
    let variant = EncodingVariant::from(args.encoding);
    let kind = EntityKind::from(args.kind);
    log::debug!("Looking up {kind} {} v{} ({variant:?})", args.id, args.version);
    let store = ObjectStore::open_read_only(StoreConfig::new(&args.db, variant))
        .with_context(|| format!("opening {}", args.db.display()))?;

    let bytes = match store.get(args.id, kind, args.version) {
        Ok(bytes) => bytes,
        Err(StoreError::NotFound { .. }) => {
            anyhow::bail!("{kind} {} v{} not found", args.id, args.version)
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", render(variant, &bytes)?);
    Ok(())
}

/// Pretty JSON for either payload encoding.
fn render(variant: EncodingVariant, bytes: &[u8]) -> anyhow::Result<String> {
    let value: Value = match variant {
        EncodingVariant::Compact => serde_json::to_value(CompactCodec::decode(bytes)?)?,
        EncodingVariant::Document => serde_json::from_slice(bytes)?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    let mut store = ObjectStore::open_read_only(StoreConfig::new(&args.db, EncodingVariant::default()))
        .with_context(|| format!("opening {}", args.db.display()))?;

    let report = store.report_stats()?;
    log::debug!("{report}");
    for stats in &report.partitions {
        println!("{:<10} ~{}", stats.partition.name(), stats.estimated);
    }
    Ok(())
}
