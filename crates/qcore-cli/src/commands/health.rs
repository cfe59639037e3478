//! Health command implementation.

use anyhow::{Context, Result};
use console::style;
use tracing::debug;

use qcore_gateway::SimulationGateway;

use super::common::{Overrides, connect, spinner};

/// Execute the health command.
pub async fn execute(overrides: &Overrides) -> Result<()> {
    let (config, gateway) = connect(overrides)?;

    let pb = spinner(format!("Contacting {}...", config.base_url));
    let health = gateway.health().await;
    pb.finish_and_clear();
    let health = health.with_context(|| format!("Backend at {} is unreachable", config.base_url))?;

    let marker = if health.is_healthy() {
        style("✓").green().bold()
    } else {
        style("!").yellow().bold()
    };
    println!(
        "{} {} is {}",
        marker,
        style(&config.base_url).cyan(),
        style(&health.status).bold()
    );
    if let Some(version) = &health.version {
        println!("  Version:    {version}");
    }
    if let Some(ts) = health.timestamp_utc() {
        println!("  Server time: {}", ts.to_rfc3339());
    }
    if let Some(message) = &health.message {
        println!("  Message:    {message}");
    }
    if !health.algorithms.is_empty() {
        println!("  Algorithms: {}", health.algorithms.join(", "));
    }

    // Not every backend serves simulator info.
    match gateway.simulator_info().await {
        Ok(info) => {
            println!("\n  Simulator:  {}", style(&info.name).bold());
            if let Some(method) = &info.simulation_method {
                println!("  Method:     {method}");
            }
            if let Some(max) = info.max_qubits {
                println!("  Max qubits: {max}");
            }
        }
        Err(e) => debug!("No simulator info: {}", e),
    }

    if !health.is_healthy() {
        anyhow::bail!("Backend reported status '{}'", health.status);
    }
    Ok(())
}
