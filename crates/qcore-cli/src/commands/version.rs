//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum circuit exercises from the terminal",
        style("QCore").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qcore-circuit  Circuit grid, gate catalog and placement rules");
    println!("  qcore-gateway  Simulation backend client");
    println!("  qcore-session  Exercise sessions: previews, grading, hints");
    println!("  qcore-cli      Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
