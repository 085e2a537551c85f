//! `deskgate` — resolve a user's navigation from JSON fixtures.
//!
//! Reads a registry catalog and a user context, prints the resolution
//! (tier + modules) as JSON on stdout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use deskgate_auth::UserContext;
use deskgate_navigation::{
    APPROVAL_BADGE_PATHS, BadgeError, BadgeSource, ModuleRegistry, NavigationConfig, apply_badges,
    collect_badges, resolve_with_trace,
};
use deskgate_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "deskgate", about = "Resolve visible navigation modules for a user")]
struct Args {
    /// Registry catalog (JSON).
    #[arg(long)]
    registry: PathBuf,

    /// User context (JSON).
    #[arg(long)]
    context: PathBuf,

    /// Badge counts keyed by sub-item path (JSON object).
    #[arg(long)]
    badges: Option<PathBuf>,

    /// Override the registry's fallback module.
    #[arg(long, env = "DESKGATE_FALLBACK_MODULE")]
    fallback_module: Option<String>,

    #[arg(long, default_value = "text")]
    log_format: LogFormat,
}

/// Badge counts read from a fixture file.
struct FixtureBadges(BTreeMap<String, u32>);

impl BadgeSource for FixtureBadges {
    async fn count(&self, path: &str) -> Result<u32, BadgeError> {
        self.0.get(path).copied().ok_or_else(|| BadgeError::Request {
            path: path.to_string(),
            reason: "no count in fixture".to_string(),
        })
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    deskgate_observability::tracing::init(args.log_format);

    let mut config = NavigationConfig::from_env();
    if args.fallback_module.is_some() {
        config.fallback_module = args.fallback_module.clone();
    }

    let registry = ModuleRegistry::from_json(&read(&args.registry)?)
        .with_context(|| format!("invalid registry catalog {}", args.registry.display()))?
        .with_config(&config);

    let ctx: UserContext = serde_json::from_str(&read(&args.context)?)
        .with_context(|| format!("context {} is not JSON", args.context.display()))?;

    let mut resolution = resolve_with_trace(&ctx, &registry);
    tracing::info!(
        tier = ?resolution.tier,
        modules = resolution.modules.len(),
        "resolved navigation"
    );

    if let Some(path) = &args.badges {
        let counts: BTreeMap<String, u32> = serde_json::from_str(&read(path)?)
            .with_context(|| format!("invalid badge fixture {}", path.display()))?;
        let counts = collect_badges(&FixtureBadges(counts), &APPROVAL_BADGE_PATHS).await;
        apply_badges(&mut resolution.modules, &counts);
    }

    let json = serde_json::to_string_pretty(&resolution)?;
    println!("{json}");
    Ok(())
}
