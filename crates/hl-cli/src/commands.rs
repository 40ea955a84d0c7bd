use std::fmt::Write as _;
use std::sync::Arc;

use colored::Colorize;
use hl_ledger::{Block, Ledger, ValidationReport};
use hl_store::FileKvStore;
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = CliConfig::resolve(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    debug!(data_dir = %config.data_dir.display(), "opening ledger");
    let store = FileKvStore::new(&config.data_dir).with_sync_writes(config.sync_writes);
    let ledger = Ledger::open(Arc::new(store), config.ledger.clone()).await?;
    let result = execute(&ledger, cli.command, &cli.format).await;
    ledger.close().await?;

    print!("{}", result?);
    Ok(())
}

/// Run one command against an open ledger and render its output.
pub async fn execute(
    ledger: &Ledger,
    command: Command,
    format: &OutputFormat,
) -> anyhow::Result<String> {
    let json = matches!(format, OutputFormat::Json);
    match command {
        Command::Init => {
            let genesis = ledger.get_block(0).await?;
            if json {
                return render_json(&genesis);
            }
            let mut out = String::new();
            writeln!(out, "{} Ledger ready", "✓".green().bold())?;
            writeln!(out, "  Genesis: {}", genesis.hash.yellow())?;
            Ok(out)
        }
        Command::Append(args) => {
            let block = ledger.append(Block::new(args.body)).await?;
            if json {
                return render_json(&block);
            }
            let mut out = String::new();
            writeln!(out, "{} Appended block #{}", "✓".green().bold(), block.height.to_string().bold())?;
            writeln!(out, "  Hash: {}", block.hash.yellow())?;
            Ok(out)
        }
        Command::Height => {
            let height = ledger.block_height().await?;
            if json {
                return render_json(&json!({ "height": height }));
            }
            Ok(match height {
                Some(h) => format!("{h}\n"),
                None => format!("{}\n", "empty".dimmed()),
            })
        }
        Command::Get(args) => {
            let block = ledger.get_block(args.height).await?;
            if json {
                return render_json(&block);
            }
            Ok(render_block(&block))
        }
        Command::Validate => {
            let report = ledger.validate_chain().await?;
            if json {
                return render_json(&report_json(&report));
            }
            Ok(render_report(&report))
        }
        Command::Dump => {
            let blocks = ledger.dump_chain().await?;
            if json {
                return render_json(&blocks);
            }
            Ok(blocks.iter().map(render_block).collect())
        }
        Command::Tamper(args) => {
            let mut block = ledger.get_block(args.height).await?;
            block.body = args.body;
            ledger.update_block(args.height, block).await?;
            if json {
                return render_json(&json!({ "tampered": args.height }));
            }
            Ok(format!(
                "{} Block #{} overwritten; its hash is now stale\n",
                "!".red().bold(),
                args.height
            ))
        }
        Command::Reset => {
            ledger.reset().await?;
            if json {
                return render_json(&json!({ "reset": true }));
            }
            Ok(format!("{} Ledger reset\n", "✓".green().bold()))
        }
    }
}

fn render_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

fn render_block(block: &Block) -> String {
    format!(
        "{}  {}\n  time: {}\n  prev: {}\n  body: {}\n",
        format!("#{}", block.height).yellow().bold(),
        block.hash.dimmed(),
        block.timestamp,
        if block.previous_hash.is_empty() { "-" } else { block.previous_hash.as_str() },
        block.body,
    )
}

fn report_json(report: &ValidationReport) -> serde_json::Value {
    json!({
        "valid": report.is_valid(),
        "tip": report.tip,
        "blocks_checked": report.blocks_checked,
        "errors": report.error_heights(),
        "violations": report
            .violations
            .iter()
            .map(|v| json!({ "height": v.height, "kind": format!("{:?}", v.kind) }))
            .collect::<Vec<_>>(),
    })
}

fn render_report(report: &ValidationReport) -> String {
    if report.is_valid() {
        return format!(
            "{} No errors detected ({} blocks)\n",
            "✓".green().bold(),
            report.blocks_checked
        );
    }
    let mut out = format!(
        "{} Block errors = {}\n",
        "✗".red().bold(),
        report.violations.len()
    );
    for v in &report.violations {
        out.push_str(&format!("  #{} {:?}\n", v.height, v.kind));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_ledger::LedgerConfig;
    use hl_store::InMemoryKvStore;

    async fn ledger() -> Ledger {
        Ledger::open(Arc::new(InMemoryKvStore::new()), LedgerConfig::default())
            .await
            .unwrap()
    }

    fn append(body: &str) -> Command {
        Command::Append(AppendArgs { body: body.into() })
    }

    #[tokio::test]
    async fn append_then_height() {
        let ledger = ledger().await;
        execute(&ledger, append("one"), &OutputFormat::Text).await.unwrap();
        let out = execute(&ledger, Command::Height, &OutputFormat::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["height"], 1);
    }

    #[tokio::test]
    async fn tamper_shows_up_in_validate() {
        let ledger = ledger().await;
        for body in ["a", "b", "c"] {
            execute(&ledger, append(body), &OutputFormat::Text).await.unwrap();
        }
        execute(
            &ledger,
            Command::Tamper(TamperArgs { height: 2, body: "forged".into() }),
            &OutputFormat::Text,
        )
        .await
        .unwrap();

        let out = execute(&ledger, Command::Validate, &OutputFormat::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["errors"], json!([2]));
    }

    #[tokio::test]
    async fn get_renders_block_json() {
        let ledger = ledger().await;
        let out = execute(&ledger, Command::Get(GetArgs { height: 0 }), &OutputFormat::Json)
            .await
            .unwrap();
        let block: Block = serde_json::from_str(&out).unwrap();
        assert_eq!(block.height, 0);
    }

    #[tokio::test]
    async fn get_missing_block_is_an_error() {
        let ledger = ledger().await;
        assert!(execute(&ledger, Command::Get(GetArgs { height: 5 }), &OutputFormat::Text)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn dump_after_reset_is_empty() {
        let ledger = ledger().await;
        execute(&ledger, append("x"), &OutputFormat::Text).await.unwrap();
        execute(&ledger, Command::Reset, &OutputFormat::Text).await.unwrap();
        let out = execute(&ledger, Command::Dump, &OutputFormat::Json).await.unwrap();
        let blocks: Vec<Block> = serde_json::from_str(&out).unwrap();
        assert!(blocks.is_empty());
    }

    #[tokio::test]
    async fn run_command_uses_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("chain");
        for args in [
            vec!["hashlink", "append", "persisted"],
            vec!["hashlink", "validate"],
        ] {
            let mut cli = <Cli as clap::Parser>::try_parse_from(args).unwrap();
            cli.data_dir = Some(data_dir.clone());
            run_command(cli).await.unwrap();
        }

        let store = Arc::new(FileKvStore::new(&data_dir));
        let ledger = Ledger::open(store, LedgerConfig::default()).await.unwrap();
        assert_eq!(ledger.block_height().await.unwrap(), Some(1));
        assert_eq!(ledger.get_block(1).await.unwrap().body, "persisted");
    }
}
