//! Shared helpers for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use qcore_circuit::{CircuitModel, GateKind, PlacementPolicy, QubitId};
use qcore_gateway::{GatewayConfig, HttpGateway, SimulationResult};
use qcore_session::ExerciseSession;

/// Global flags that override the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub api_url: Option<String>,
    pub shots: Option<u32>,
}

/// `~/.qcore/config.yaml`, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".qcore").join("config.yaml"))
}

/// Resolve the gateway configuration: file, then environment, then flags.
pub fn load_config(overrides: &Overrides) -> Result<GatewayConfig> {
    let path = match &overrides.config {
        Some(path) => Some(path.clone()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let mut config = GatewayConfig::resolve(path.as_deref()).with_context(|| match &path {
        Some(p) => format!("Failed to load configuration from {}", p.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    if let Some(url) = &overrides.api_url {
        config.base_url = url.clone();
    }
    if let Some(shots) = overrides.shots {
        config.shots = shots;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Build an HTTP gateway from the resolved configuration.
pub fn connect(overrides: &Overrides) -> Result<(GatewayConfig, HttpGateway)> {
    let config = load_config(overrides)?;
    let gateway = HttpGateway::new(&config)
        .with_context(|| format!("Failed to create client for {}", config.base_url))?;
    Ok((config, gateway))
}

/// Spinner shown while waiting on the backend.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// ============================================================================
// Circuit files
// ============================================================================

/// Circuit description read from JSON or YAML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CircuitFile {
    /// Register size; the largest referenced qubit + 1 when omitted.
    #[serde(default)]
    pub qubits: Option<u32>,
    #[serde(default)]
    pub policy: Option<PlacementPolicy>,
    #[serde(default)]
    pub gates: Vec<GateEntry>,
}

/// One gate to place.
#[derive(Debug, Clone, Deserialize)]
pub struct GateEntry {
    pub gate: String,
    pub qubit: u32,
    /// Column; appended after every earlier gate when omitted.
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub target: Option<u32>,
    #[serde(default)]
    pub parameter: Option<f64>,
}

impl CircuitFile {
    /// Register size implied by the entries.
    pub fn inferred_qubits(&self) -> u32 {
        self.gates
            .iter()
            .map(|g| g.qubit.max(g.target.unwrap_or(0)).saturating_add(1))
            .max()
            .unwrap_or(1)
    }

    /// Place every entry, in file order, on a fresh circuit.
    ///
    /// `qubits` and `policy` win over the values in the file.
    pub fn build(
        &self,
        qubits: Option<u32>,
        policy: Option<PlacementPolicy>,
    ) -> Result<CircuitModel> {
        let num_qubits = qubits
            .or(self.qubits)
            .unwrap_or_else(|| self.inferred_qubits());
        let policy = policy.or(self.policy).unwrap_or_default();
        let mut circuit = CircuitModel::new(num_qubits).with_policy(policy);

        for (index, entry) in self.gates.iter().enumerate() {
            let kind: GateKind = entry
                .gate
                .parse()
                .with_context(|| format!("Gate entry {index}"))?;
            let step = entry
                .step
                .map(Into::into)
                .unwrap_or_else(|| circuit.next_free_step());
            circuit
                .place_with(
                    entry.qubit,
                    step,
                    kind,
                    entry.target.map(QubitId),
                    entry.parameter,
                )
                .with_context(|| format!("Gate entry {index} ({}) was rejected", entry.gate))?;
        }
        Ok(circuit)
    }
}

/// Read a circuit file; `.json` is parsed as JSON, anything else as YAML.
pub fn read_circuit_file(path: &Path) -> Result<CircuitFile> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse_circuit(&source, path)
}

fn parse_circuit(source: &str, path: &Path) -> Result<CircuitFile> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "json" => serde_json::from_str(source)
            .with_context(|| format!("Invalid circuit JSON in {}", path.display())),
        _ => serde_yaml_ng::from_str(source)
            .with_context(|| format!("Invalid circuit YAML in {}", path.display())),
    }
}

/// Copy a built circuit into an exercise session, gate by gate.
pub fn replay_into(circuit: &CircuitModel, session: &mut ExerciseSession) -> Result<()> {
    for gate in circuit.ordered() {
        match gate.parameter {
            Some(theta) => session.place_rotation(gate.qubit, gate.step, gate.kind, theta)?,
            None => session.place_gate(gate.qubit, gate.step, gate.kind, gate.target)?,
        };
    }
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

/// Text rendering of the circuit grid, one line per qubit.
pub fn render_circuit(circuit: &CircuitModel) -> Vec<String> {
    (0..circuit.num_qubits())
        .map(|q| {
            let cells: Vec<String> = (0..circuit.depth())
                .map(|s| {
                    let cell = match circuit.gate_at(q, s) {
                        Some(g) if g.target == Some(QubitId(q)) => "⊕".to_string(),
                        Some(g) if g.kind.is_two_qubit() => "●".to_string(),
                        Some(g) => g.kind.symbol().to_string(),
                        None => "─".to_string(),
                    };
                    format!("{cell:─^4}")
                })
                .collect();
            format!("q{q}: ─{}", cells.concat())
        })
        .collect()
}

/// Print the grid under a header.
pub fn print_circuit(circuit: &CircuitModel) {
    println!(
        "  Circuit: {} qubits, {} gates, depth {}",
        circuit.num_qubits(),
        circuit.len(),
        circuit.depth()
    );
    for line in render_circuit(circuit) {
        println!("    {}", style(line).dim());
    }
}

/// Print a simulation outcome: amplitudes, probabilities and counts.
pub fn print_simulation(result: &SimulationResult) {
    if let Some(message) = result.failure_message() {
        println!(
            "\n{} Simulation failed: {}",
            style("✗").red().bold(),
            message
        );
        return;
    }

    println!(
        "\n{} Simulation ({} qubits, {} gates, depth {}):",
        style("✓").green().bold(),
        result.qubits,
        result.gate_count,
        result.circuit_depth
    );

    for state in result.basis_states() {
        if state.probability < 1e-9 {
            continue;
        }
        let bar_len = (state.probability * 50.0).round() as usize;
        println!(
            "  {}  {:>+.4}{:>+.4}i  {:>6.2}% {}",
            style(&state.label).cyan(),
            state.amplitude.re,
            state.amplitude.im,
            state.probability * 100.0,
            style("█".repeat(bar_len)).green()
        );
    }

    if !result.measurement_counts.is_empty() {
        println!("\n  Measurement counts:");
        for (outcome, count) in &result.measurement_counts {
            println!("    {}: {}", style(outcome).cyan(), count);
        }
    }
}
