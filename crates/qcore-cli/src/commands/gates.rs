//! Gates command implementation.

use anyhow::Result;
use console::style;

use qcore_circuit::{GateArity, GateCatalog};
use qcore_gateway::CatalogCache;

use super::common::{Overrides, connect, spinner};

/// Execute the gates command.
pub async fn execute(overrides: &Overrides, offline: bool) -> Result<()> {
    let catalog = if offline {
        GateCatalog::standard()
    } else {
        let (_, gateway) = connect(overrides)?;
        let cache = CatalogCache::new();
        let pb = spinner("Fetching gate catalog...");
        let catalog = cache.get_or_standard(&gateway).await;
        pb.finish_and_clear();
        catalog
    };

    print_catalog(&catalog);
    Ok(())
}

fn print_catalog(catalog: &GateCatalog) {
    println!("{}", style("Available gates:").bold());
    for arity in [GateArity::Single, GateArity::TwoQubit] {
        let header = match arity {
            GateArity::Single => "Single-qubit",
            GateArity::TwoQubit => "Two-qubit",
        };
        println!("\n  {}", style(header).underlined());
        for gate in catalog.list_gates().iter().filter(|g| g.arity == arity) {
            let param = if gate.parameterized { " (θ)" } else { "" };
            println!(
                "    {:>4}  {:<6} {}{}",
                style(&gate.symbol).cyan().bold(),
                gate.name,
                gate.description,
                style(param).dim()
            );
        }
    }
}
