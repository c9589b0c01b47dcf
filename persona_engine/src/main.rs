use std::fs;
use std::rc::Rc;

use anyhow::{Context, Result};
use persona_config::PersonaConfig;
use persona_engine::{Engine, FsResources};

mod cli;

const JOURNAL_TAIL: usize = 20;

fn main() -> Result<()> {
    let args = cli::parse()?;

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = PersonaConfig::from_json_file(&args.config)
        .with_context(|| format!("loading configuration {}", args.config.display()))?;
    let resources = Rc::new(FsResources::new(&args.scripts_root));
    let engine = Engine::boot(&config, resources).context("booting persona engine")?;
    fire_ticks(&engine, args.ticks)?;

    for target in &args.switches {
        match engine.switch_environment(Some(target)) {
            Ok(outcome) => log::debug!("--switch {target}: {outcome:?}"),
            Err(err) => eprintln!("[persona_engine] switch to {target} failed: {err}"),
        }
        fire_ticks(&engine, args.ticks)?;
    }

    for chunk in &args.chunks {
        engine
            .exec(chunk)
            .with_context(|| format!("running --exec chunk {chunk:?}"))?;
    }

    let summary = engine.summary();
    println!("Active environment: {}", summary.active);
    println!("Environments:");
    for env in &summary.environments {
        let marker = if env.id == summary.active { '*' } else { ' ' };
        let state = if env.initialized {
            "initialized"
        } else {
            "uninitialized"
        };
        println!("  {marker} {:<16} {state}", env.id);
    }

    let journal = engine.journal();
    let skip = journal.len().saturating_sub(JOURNAL_TAIL);
    println!("Host journal ({} entries, last {}):", journal.len(), journal.len() - skip);
    for entry in &journal[skip..] {
        println!("  {entry}");
    }

    if let Some(path) = args.summary_json.as_ref() {
        let json = serde_json::to_string_pretty(&summary)
            .context("serializing engine summary to JSON")?;
        fs::write(path, json)
            .with_context(|| format!("writing engine summary to {}", path.display()))?;
        println!("Saved engine summary to {}", path.display());
    }

    Ok(())
}

fn fire_ticks(engine: &Engine, ticks: u32) -> Result<()> {
    for _ in 0..ticks {
        engine.fire_event("TICK").context("firing TICK")?;
    }
    Ok(())
}
