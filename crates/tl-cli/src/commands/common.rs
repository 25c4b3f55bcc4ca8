//! Shared helpers for command implementations

use anyhow::{Context, Result};
use tl_core::{Direction, MultiError};
use tl_migrate::{AppliedStep, Migrate};

/// Close `migrate` after a command body ran.
///
/// When both the body and the close fail, the two causes are merged into one
/// `MultiError`, body first.
pub(crate) async fn close_after<T>(migrate: Migrate, result: Result<T>) -> Result<T> {
    let closed = migrate.close().await;
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close)) => Err(close).context("Failed to close connections"),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close)) => Err(MultiError::new([
            Some(format!("{e:#}")),
            Some(format!("Failed to close connections: {close}")),
        ])
        .into()),
    }
}

/// One line per applied step, in execution order
pub(crate) fn format_steps(steps: &[AppliedStep]) -> Vec<String> {
    steps
        .iter()
        .map(|step| {
            let arrow = match step.direction {
                Direction::Up => "↑",
                Direction::Down => "↓",
            };
            format!("  {arrow} {} ({})", step.version, step.direction)
        })
        .collect()
}

pub(crate) fn print_steps(steps: &[AppliedStep]) {
    if steps.is_empty() {
        println!("Nothing to do.");
        return;
    }
    for line in format_steps(steps) {
        println!("{line}");
    }
    let noun = if steps.len() == 1 { "migration" } else { "migrations" };
    println!("\n{} {noun} applied.", steps.len());
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
