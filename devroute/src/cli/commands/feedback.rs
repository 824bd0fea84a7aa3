//! `outcome`, `suggest` and `harvest`

use super::{Session, read_source};
use crate::cli::app::{HarvestArgs, OutcomeArgs, SuggestArgs};
use anyhow::{Context, Result};
use devroute_core::{FsWorkspace, Outcome, OutcomeContext, ProblemType};
use serde_json::json;
use std::path::Path;

pub async fn outcome(args: OutcomeArgs, config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;

    let problem_type = args
        .problem_type
        .as_deref()
        .map(str::parse::<ProblemType>)
        .transpose()
        .context("Invalid --problem-type")?;
    let outcome = if args.success { Outcome::Success } else { Outcome::Failure };
    let context = OutcomeContext {
        before: args.before,
        after: args.after,
        file_name: args.file,
        component_type: args.component,
        description: args.description,
        problem_type,
        primary_handler: Some(args.handler.clone()),
        confidence: args.confidence,
    };

    let before = session.core.stats().await;
    session.core.record_outcome(&args.handler, &args.action_type, outcome, &context).await;
    let after = session.core.stats().await;

    let report = json!({
        "handler": args.handler,
        "action_type": args.action_type,
        "outcome": outcome,
        "learning_enabled": after.learning_enabled,
        "patterns_learned": after.patterns_stored.saturating_sub(before.patterns_stored),
    });
    session.emit(&report, |_| {
        if after.learning_enabled {
            println!(
                "Recorded {:?} for {} ({}); {} new pattern(s)",
                outcome,
                args.handler,
                args.action_type,
                after.patterns_stored.saturating_sub(before.patterns_stored)
            );
        } else {
            println!("Learning is disabled; outcome not recorded");
        }
    })?;

    session.close().await;
    Ok(())
}

pub async fn suggest(args: SuggestArgs, config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    let code = match &args.file {
        Some(path) => read_source(path).await?,
        None => String::new(),
    };

    let suggestions = session.core.suggest(&code, &args.scenario).await;
    session.emit(&suggestions, |items| {
        println!("Suggestions for {}:", args.scenario);
        for (i, item) in items.iter().enumerate() {
            println!("  {}. {}", i + 1, item);
        }
    })?;

    session.close().await;
    Ok(())
}

pub async fn harvest(args: HarvestArgs, config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    let workspace = FsWorkspace::new(args.root.clone());

    let count = session
        .core
        .harvest(&workspace, &args.glob)
        .await
        .with_context(|| format!("Harvest of {} under {} failed", args.glob, args.root.display()))?;

    session.emit(&json!({ "patterns_harvested": count }), |_| {
        println!("Harvested {} pattern(s) from {}", count, args.root.display());
    })?;

    session.close().await;
    Ok(())
}
