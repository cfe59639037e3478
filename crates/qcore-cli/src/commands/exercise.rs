//! Exercise command implementation.

use anyhow::{Context, Result};
use console::style;

use qcore_gateway::ExerciseSpec;
use qcore_session::{ExerciseSession, SessionOptions};

use super::common::{Overrides, connect, spinner};

/// Execute the exercise command.
pub async fn execute(overrides: &Overrides, id: &str, hints: usize) -> Result<()> {
    let (config, gateway) = connect(overrides)?;

    let pb = spinner(format!("Loading exercise {id}..."));
    let session = ExerciseSession::load(&gateway, id, SessionOptions::from_config(&config)).await;
    pb.finish_and_clear();
    let mut session = session.with_context(|| format!("Failed to open exercise '{id}'"))?;

    print_exercise(session.spec());

    let total = session.spec().hints.len();
    for _ in 0..hints {
        let Some(hint) = session.reveal_next_hint() else {
            break;
        };
        println!("  {} {}", style("Hint:").yellow().bold(), hint);
    }
    if total > 0 && session.has_more_hints() {
        println!(
            "  {}",
            style(format!(
                "{} of {} hints shown (use --hints N for more)",
                session.hints_revealed(),
                total
            ))
            .dim()
        );
    }
    Ok(())
}

fn print_exercise(spec: &ExerciseSpec) {
    println!(
        "{} {} [{}]",
        style("→").cyan().bold(),
        style(&spec.title).bold(),
        style(spec.difficulty.as_str()).yellow()
    );
    println!("  ID:      {}", spec.id);
    println!("  Qubits:  {}", spec.num_qubits);
    println!("  Target:  {}", spec.target_type);
    if !spec.description.is_empty() {
        println!("\n  {}\n", spec.description);
    }

    if let Some(state) = spec.target_data.target_state() {
        println!("  Target state:");
        for (i, amp) in state.iter().enumerate() {
            if amp.norm_sqr() < 1e-12 {
                continue;
            }
            println!(
                "    {}  {:>+.4}{:>+.4}i",
                style(qcore_gateway::wire::basis_label(i, spec.num_qubits)).cyan(),
                amp.re,
                amp.im
            );
        }
    }
    if let Some(probs) = &spec.target_data.measurement_probabilities {
        println!("  Target probabilities:");
        for (outcome, p) in probs {
            println!("    {}  {:.4}", style(outcome).cyan(), p);
        }
    }
    println!("  Tolerance: {}", spec.target_data.tolerance);
}
