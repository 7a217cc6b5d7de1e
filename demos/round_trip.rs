//! Round-trip demonstration
//!
//! Runs a flipper → flipper → logger chain over a fixed set of lines: two
//! flips cancel out, so every line reaches the logger unchanged.
//!
//! Usage: cargo run --example round_trip

use std::io::Cursor;
use text_pipeline::Pipeline;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<String> = ["flipper", "flipper", "logger"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut pipeline = Pipeline::build(&names)?;
    pipeline.start(10)?;

    let input = "a flip of a flip\nis the identity\n<END>\n";
    pipeline.run(Cursor::new(input));

    println!("Pipeline shutdown complete");
    Ok(())
}
