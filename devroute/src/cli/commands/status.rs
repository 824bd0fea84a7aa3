//! Statistics, handler listing and toggles

use super::Session;
use anyhow::Result;
use devroute_core::{CoreStats, HandlerCapability, LearningMode};
use serde_json::json;
use std::path::Path;

pub async fn stats(config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    let stats = session.core.stats().await;
    session.emit(&stats, print_stats)?;
    session.close().await;
    Ok(())
}

fn print_stats(stats: &CoreStats) {
    println!("Registered handlers: {}", stats.registered_handlers);
    println!("Total decisions:     {}", stats.total_decisions);
    println!("Most used handler:   {}", stats.most_used_handler.as_deref().unwrap_or("-"));
    println!("Average confidence:  {:.2}", stats.average_confidence);
    println!("Patterns stored:     {}", stats.patterns_stored);
    println!("Sessions stored:     {}", stats.sessions_stored);
    println!("Learning:            {}", on_off(stats.learning_enabled));
    println!("Orchestration:       {}", on_off(stats.orchestration_enabled));
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

pub async fn handlers(config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    let handlers = session.core.handlers().await;
    session.emit(&handlers, |list: &Vec<HandlerCapability>| {
        for h in list {
            println!(
                "{:<24} {:<14} success {:.0}%  confidence {:.2}  used {}x",
                h.name,
                h.category.to_string(),
                h.success_rate * 100.0,
                h.confidence,
                h.usage_count
            );
        }
    })?;
    session.close().await;
    Ok(())
}

pub async fn toggle_learning(config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    let enabled = session.core.toggle_learning().await;
    session.emit(&json!({ "learning_enabled": enabled }), |_| {
        println!("Learning {}", on_off(enabled));
    })?;
    session.close().await;
    Ok(())
}

pub async fn toggle_orchestration(config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    let enabled = session.core.toggle_orchestration();
    session.emit(&json!({ "orchestration_enabled": enabled }), |_| {
        println!("Orchestration {}", on_off(enabled));
    })?;
    session.close().await;
    Ok(())
}

pub async fn set_mode(mode: &str, config: Option<&Path>, json: bool) -> Result<()> {
    let mode: LearningMode = mode.parse()?;
    let session = Session::open(config, json).await?;
    session.core.set_learning_mode(mode).await;
    session.emit(&json!({ "learning_mode": mode }), |_| {
        println!("Learning mode set to {}", mode);
    })?;
    session.close().await;
    Ok(())
}

pub async fn reset_learning(config: Option<&Path>, json: bool) -> Result<()> {
    let session = Session::open(config, json).await?;
    session.core.reset_learning().await;
    let stats = session.core.stats().await;
    session.emit(&json!({ "patterns_stored": stats.patterns_stored }), |_| {
        println!("Learning state cleared");
    })?;
    session.close().await;
    Ok(())
}
