//! Decay weight table command

use anyhow::Result;
use ebb_core::Config;

use super::resolve_scheme;

pub fn cmd_weights(config: &Config, horizon: usize, scheme: Option<&str>) -> Result<()> {
    let scheme = resolve_scheme(config, scheme)?;
    let horizon = horizon.max(1);
    let weights = scheme.build(horizon);

    println!();
    println!("⚖️  Decay Weights ({}, {} months)", scheme.kind(), horizon);
    println!("   ─────────────────────");
    println!("   {:>5} │ {:>8}", "Age", "Weight");
    println!("   ──────┼──────────");
    for age in 0..horizon {
        println!("   {:>5} │ {:>8.4}", age, weights.weight(age as i32));
    }
    println!();

    Ok(())
}
