//! Submit command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qcore_circuit::PlacementPolicy;
use qcore_gateway::{ScoreResult, SimulationGateway};
use qcore_session::{ExerciseSession, SessionOptions};

use super::common::{
    Overrides, connect, print_circuit, print_simulation, read_circuit_file, replay_into, spinner,
};

/// Execute the submit command.
pub async fn execute(
    overrides: &Overrides,
    exercise: &str,
    input: &Path,
    policy: Option<PlacementPolicy>,
    preview: bool,
) -> Result<()> {
    let file = read_circuit_file(input)?;
    let (config, gateway) = connect(overrides)?;

    let pb = spinner(format!("Loading exercise {exercise}..."));
    let spec = gateway.exercise(exercise).await;
    pb.finish_and_clear();
    let spec = spec.with_context(|| format!("Failed to open exercise '{exercise}'"))?;

    let policy = policy.or(file.policy).unwrap_or_default();
    let circuit = file
        .build(Some(spec.num_qubits), Some(policy))
        .with_context(|| format!("Circuit does not fit exercise '{exercise}'"))?;

    let options = SessionOptions::from_config(&config).with_policy(policy);
    let mut session = ExerciseSession::open(spec, options);
    replay_into(&circuit, &mut session)?;

    println!(
        "{} Submitting {} for {}",
        style("→").cyan().bold(),
        style(input.display()).green(),
        style(&session.spec().title).yellow()
    );
    print_circuit(session.circuit());

    if preview {
        let pb = spinner("Simulating...");
        let result = session.request_preview(&gateway).await;
        pb.finish_and_clear();
        print_simulation(result);
    }

    let pb = spinner("Grading...");
    let score = session.submit(&gateway).await;
    pb.finish_and_clear();
    let score = score?;

    print_score(score);
    if !score.passed {
        anyhow::bail!("Exercise '{exercise}' not passed");
    }
    Ok(())
}

fn print_score(score: &ScoreResult) {
    let (marker, verdict) = if score.passed {
        (style("✓").green().bold(), style("Passed").green().bold())
    } else {
        (style("✗").red().bold(), style("Not passed").red().bold())
    };
    println!("\n{marker} {verdict}  score {:.1}", score.score);
    if let Some(feedback) = &score.feedback {
        println!("  {feedback}");
    }
}
