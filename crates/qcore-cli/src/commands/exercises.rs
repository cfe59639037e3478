//! Exercises command implementation.

use anyhow::{Context, Result};
use console::style;

use qcore_gateway::SimulationGateway;

use super::common::{Overrides, connect, spinner};

/// Execute the exercises command.
pub async fn execute(overrides: &Overrides) -> Result<()> {
    let (_, gateway) = connect(overrides)?;

    let pb = spinner("Fetching exercises...");
    let exercises = gateway.exercises().await;
    pb.finish_and_clear();
    let exercises = exercises.context("Failed to fetch exercises")?;

    if exercises.is_empty() {
        println!("No exercises available.");
        return Ok(());
    }

    println!("{}", style("Exercises:").bold());
    for ex in &exercises {
        println!(
            "  {:<24} {:<14} {} qubits  {}",
            style(&ex.id).cyan(),
            style(ex.difficulty.as_str()).yellow(),
            ex.num_qubits,
            ex.title
        );
    }
    println!("\n  {} exercises", exercises.len());
    Ok(())
}
