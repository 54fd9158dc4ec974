//! Tessera CLI — inspect and dry-run declarative test suites.
//!
//! Commands:
//! - `expand` — print the variants every class of a suite expands into
//! - `validate` — load a suite and expand it, reporting the first error
//! - `vocabulary` — list the built-in trait types
//! - `run` — dry-run a suite through the runner with scripted outcomes

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tessera_core::{StaticDeviceState, TraitRegistry, Variant};
use tessera_runner::{
    plan_suite, ClassPlan, LoadedSuite, Outcome, Runner, TestStatus, TracingListener,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tessera",
    about = "Tessera CLI — declarative test-trait resolution and parameterization"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the variants each class expands into, in run order.
    Expand {
        /// Path to a suite TOML file.
        #[arg(long)]
        suite: PathBuf,

        /// Expand as if the device runs in headless system user mode.
        #[arg(long, default_value_t = false)]
        headless: bool,

        /// Only expand this class.
        #[arg(long)]
        class: Option<String>,

        /// Emit JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Load and expand a suite without printing variants.
    Validate {
        /// Path to a suite TOML file.
        #[arg(long)]
        suite: PathBuf,
    },
    /// List built-in trait types with their kind and weight.
    Vocabulary {
        /// Emit JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Dry-run a suite: every variant passes unless scripted otherwise.
    Run {
        /// Path to a suite TOML file.
        #[arg(long)]
        suite: PathBuf,

        /// Expand as if the device runs in headless system user mode.
        #[arg(long, default_value_t = false)]
        headless: bool,

        /// Fail variants whose qualified name contains this text.
        #[arg(long)]
        fail: Vec<String>,

        /// Request one restart for variants whose qualified name contains this text.
        #[arg(long)]
        restart: Vec<String>,

        /// Emit the run summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Expand {
            suite,
            headless,
            class,
            json,
        } => run_expand(&suite, headless, class.as_deref(), json),
        Commands::Validate { suite } => run_validate(&suite),
        Commands::Vocabulary { json } => run_vocabulary(json),
        Commands::Run {
            suite,
            headless,
            fail,
            restart,
            json,
        } => run_dry(&suite, headless, &fail, &restart, json),
    }
}

fn load_suite(path: &Path, headless: bool) -> Result<LoadedSuite> {
    debug!(path = %path.display(), headless, "loading suite");
    let suite = if headless {
        LoadedSuite::from_file_with_device(path, StaticDeviceState::headless())
    } else {
        LoadedSuite::from_file(path)
    };
    suite.with_context(|| format!("loading suite {}", path.display()))
}

fn plan(suite: &LoadedSuite) -> Result<Vec<ClassPlan>> {
    plan_suite(suite).context("expanding suite")
}

fn run_expand(path: &Path, headless: bool, class: Option<&str>, json: bool) -> Result<()> {
    let suite = load_suite(path, headless)?;
    let plans: Vec<ClassPlan> = plan(&suite)?
        .into_iter()
        .filter(|p| class.map_or(true, |c| p.class == c))
        .collect();

    if let Some(c) = class {
        anyhow::ensure!(!plans.is_empty(), "no class named '{c}' in suite");
    }

    if json {
        let out: Vec<_> = plans
            .iter()
            .map(|p| serde_json::json!({ "class": p.class, "variants": p.planned() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for p in &plans {
        println!("{} ({} variants)", p.class, p.variants.len());
        for v in &p.variants {
            print_variant(v);
        }
    }
    Ok(())
}

fn print_variant(v: &Variant) {
    let marker = if v.is_ignored() { " (ignored)" } else { "" };
    println!("  {}{marker}", v.name());
    for t in v.traits() {
        println!("    {t}");
    }
}

fn run_validate(path: &Path) -> Result<()> {
    let suite = load_suite(path, false)?;
    let plans = plan(&suite)?;
    let variants: usize = plans.iter().map(|p| p.variants.len()).sum();
    println!(
        "{}: {} trait types, {} policies, {} classes, {} variants",
        path.display(),
        suite.registry().len(),
        suite.context.policies().len(),
        plans.len(),
        variants
    );
    Ok(())
}

fn run_vocabulary(json: bool) -> Result<()> {
    let registry = TraitRegistry::framework().context("building built-in vocabulary")?;

    if json {
        let out: Vec<_> = registry
            .definitions()
            .into_iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.id,
                    "kind": d.kind,
                    "weight": d.weight,
                    "sub_traits": d.sub_traits.iter().map(ToString::to_string).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for d in registry.definitions() {
        let weight = d.weight.map_or_else(|| "-".to_string(), |w| w.to_string());
        println!("{:<64} {:<16} {weight}", d.id.as_str(), d.kind.to_string());
    }
    Ok(())
}

fn run_dry(
    path: &Path,
    headless: bool,
    fail: &[String],
    restart: &[String],
    json: bool,
) -> Result<()> {
    let suite = load_suite(path, headless)?;
    let plans = plan(&suite)?;
    let variants: Vec<Variant> = plans.into_iter().flat_map(|p| p.variants).collect();

    let mut runner = Runner::new(suite.runner.clone());
    runner.add_listener(TracingListener);

    let mut restarted: Vec<String> = Vec::new();
    let mut body = |v: &Variant| {
        let name = v.qualified_name();
        if restart.iter().any(|p| name.contains(p.as_str())) && !restarted.contains(&name) {
            restarted.push(name);
            return Outcome::Retry("scripted restart".to_string());
        }
        if fail.iter().any(|p| name.contains(p.as_str())) {
            return Outcome::Done(TestStatus::Failed("scripted failure".to_string()));
        }
        Outcome::Done(TestStatus::Passed)
    };
    let summary = runner.run_all(&variants, &mut body);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for r in &summary.reports {
            let status = match &r.status {
                TestStatus::Passed => "PASS".to_string(),
                TestStatus::Failed(m) => format!("FAIL ({m})"),
                TestStatus::Ignored(reason) => format!("SKIP ({reason})"),
            };
            println!("{status:<32} {} [{} attempt(s)]", r.variant, r.attempts);
        }
        println!(
            "\n{} passed, {} failed, {} ignored, {} skipped",
            summary.passed, summary.failed, summary.ignored, summary.skipped
        );
    }

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
