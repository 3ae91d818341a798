//! minerworks - ore radar sweeps and backpack companions on a tick-driven host
//!
//! Headless runner: builds a seeded demo scene, drives the automation for a
//! fixed number of ticks and optionally writes a JSONL event log and a
//! metrics report.

mod config;
mod runner;
mod scene;

use anyhow::Result;
use runner::RunOptions;
use std::{env, path::PathBuf};
use tracing::info;

const DEFAULT_TICKS: u64 = 400;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting minerworks v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let automation = match &cli.config {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    };

    let summary = runner::run(
        automation,
        &RunOptions {
            ticks: cli.ticks,
            world_seed: cli.world_seed,
            events: cli.events,
            metrics: cli.metrics,
        },
    )?;

    let m = &summary.metrics;
    println!(
        "ticks={} sweeps={} extracted={} dropped={} commands={} companions(spawned={} hidden={} reused={}) ores_remaining={}",
        m.ticks,
        m.sweeps_started,
        m.blocks_extracted,
        m.items_dropped,
        m.commands,
        m.companions_spawned,
        m.companions_hidden,
        m.companions_reused,
        summary.ores_remaining,
    );
    Ok(())
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    config: Option<PathBuf>,
    ticks: u64,
    world_seed: u64,
    events: Option<PathBuf>,
    metrics: Option<PathBuf>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config: None,
            ticks: DEFAULT_TICKS,
            world_seed: 0,
            events: None,
            metrics: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--ticks" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.ticks = value,
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--ticks must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--ticks requires an integer");
                    }
                }
                "--world-seed" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.world_seed = value,
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--world-seed must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--world-seed requires an integer");
                    }
                }
                "--events" => {
                    if let Some(path) = args.next() {
                        opts.events = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--events requires a file path");
                    }
                }
                "--metrics" => {
                    if let Some(path) = args.next() {
                        opts.metrics = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--metrics requires a file path");
                    }
                }
                other => tracing::warn!("Ignoring unknown argument {other}"),
            }
        }

        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        let opts = parse(&[]);
        assert_eq!(opts.ticks, DEFAULT_TICKS);
        assert_eq!(opts.world_seed, 0);
        assert!(opts.config.is_none() && opts.events.is_none() && opts.metrics.is_none());
    }

    #[test]
    fn parses_every_flag() {
        let opts = parse(&[
            "--config", "a.toml", "--ticks", "90", "--world-seed", "11", "--events", "e.jsonl",
            "--metrics", "m.json",
        ]);
        assert_eq!(
            opts,
            CliOptions {
                config: Some(PathBuf::from("a.toml")),
                ticks: 90,
                world_seed: 11,
                events: Some(PathBuf::from("e.jsonl")),
                metrics: Some(PathBuf::from("m.json")),
            }
        );
    }

    #[test]
    fn bad_numbers_keep_defaults() {
        let opts = parse(&["--ticks", "lots", "--world-seed"]);
        assert_eq!(opts.ticks, DEFAULT_TICKS);
        assert_eq!(opts.world_seed, 0);
    }
}
