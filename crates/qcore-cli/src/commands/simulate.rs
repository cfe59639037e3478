//! Simulate command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qcore_circuit::PlacementPolicy;
use qcore_gateway::{SimulateRequest, SimulationGateway};

use super::common::{Overrides, connect, print_circuit, print_simulation, read_circuit_file, spinner};

/// Execute the simulate command.
pub async fn execute(
    overrides: &Overrides,
    input: &Path,
    qubits: Option<u32>,
    policy: Option<PlacementPolicy>,
) -> Result<()> {
    let circuit = read_circuit_file(input)?.build(qubits, policy)?;
    let (config, gateway) = connect(overrides)?;

    println!(
        "{} Simulating {} on {} ({} shots)",
        style("→").cyan().bold(),
        style(input.display()).green(),
        style(&config.base_url).yellow(),
        config.shots
    );
    print_circuit(&circuit);

    let request = SimulateRequest::from_snapshot(&circuit.snapshot(), config.shots);
    let pb = spinner("Simulating...");
    let result = gateway.simulate(&request).await;
    pb.finish_and_clear();
    let result = result.context("Simulation request failed")?;

    print_simulation(&result);
    if let Some(message) = result.failure_message() {
        anyhow::bail!("Simulation failed: {message}");
    }
    Ok(())
}
