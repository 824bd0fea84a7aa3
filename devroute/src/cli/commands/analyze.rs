//! `classify` and `route`

use super::{Session, read_source};
use crate::cli::app::SourceArgs;
use anyhow::Result;
use devroute_core::{OrchestrationResult, ProblemClassification, RequestContext};
use std::path::Path;
use tracing::info;

fn request_context(args: &SourceArgs) -> RequestContext {
    RequestContext {
        action: args.action.clone(),
        file_name: args.file.file_name().map(|n| n.to_string_lossy().into_owned()),
        component_type: args.component.clone(),
        description: args.description.clone(),
        confidence: None,
    }
}

pub async fn classify(args: SourceArgs, config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    let code = read_source(&args.file).await?;
    let file_path = args.file.to_string_lossy();

    let classification = session.core.classify(&code, &file_path, &request_context(&args)).await;
    session.emit(&classification, print_classification)?;

    session.close().await;
    Ok(())
}

pub async fn route(args: SourceArgs, config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    let code = read_source(&args.file).await?;
    let file_path = args.file.to_string_lossy();

    let context = RequestContext { action: None, ..request_context(&args) };
    let result = session.core.orchestrate(&code, &file_path, args.action.as_deref(), context).await;
    info!("Primary handler for {}: {}", file_path, result.primary_handler);
    session.emit(&result, print_routing)?;

    session.close().await;
    Ok(())
}

fn print_classification(c: &ProblemClassification) {
    println!("Problem:    {}", c.problem_type);
    println!("Complexity: {}", c.complexity);
    println!("Confidence: {:.2}", c.confidence);
    println!("Indicators:");
    for indicator in &c.indicators {
        println!("  - {}", indicator);
    }
}

fn print_routing(result: &OrchestrationResult) {
    print_classification(&result.classification);
    println!();
    println!("Primary handler: {} ({:.2})", result.primary_handler, result.confidence);
    if !result.backup_handlers.is_empty() {
        println!("Backups:         {}", result.backup_handlers.join(", "));
    }
    println!("Reasoning:       {}", result.reasoning);

    if !result.recommendations.is_empty() {
        println!();
        println!("Ranking:");
        for rec in &result.recommendations {
            println!(
                "  {:>2}. {:<24} {:.2}  est. success {:.0}%",
                rec.execution_order,
                rec.handler_name,
                rec.confidence,
                rec.estimated_success_rate * 100.0
            );
        }
    }
}
