use log::error;
use std::env;
use std::io;
use std::process::ExitCode;
use text_pipeline::{logging, registry, Pipeline, PipelineError};

/// Print usage information to stdout.
fn print_usage() {
    println!("Usage: analyzer <queue_size> <stage1> <stage2> ... <stageN>");
    println!("Arguments:");
    println!("  queue_size  Maximum number of items in each stage's queue");
    println!("  stage1..N   Names of stages to chain together");
    println!("Available stages:");
    for (name, description) in registry::AVAILABLE {
        println!("  {name:<11} - {description}");
    }
    println!("Example:");
    println!("  analyzer 20 uppercaser rotator logger");
    println!("  echo 'hello' | analyzer 20 uppercaser rotator logger");
    println!("  echo '<END>' | analyzer 20 uppercaser rotator logger");
}

/// Parse the queue size as a strict positive decimal: digits only, no
/// sign, no leading zeros, within the signed-integer range.
fn parse_queue_size(raw: &str) -> Result<usize, PipelineError> {
    let strict_decimal = !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && (raw.len() == 1 || !raw.starts_with('0'));
    if !strict_decimal {
        return Err(PipelineError::InvalidQueueSize(raw.to_string()));
    }
    let size: usize = raw
        .parse()
        .map_err(|_| PipelineError::InvalidQueueSize(raw.to_string()))?;
    if size == 0 || size > isize::MAX as usize {
        return Err(PipelineError::InvalidQueueSize(raw.to_string()));
    }
    Ok(size)
}

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        error!("insufficient arguments");
        print_usage();
        return ExitCode::from(1);
    }

    let queue_size = match parse_queue_size(&args[0]) {
        Ok(size) => size,
        Err(err) => {
            error!("{err}");
            print_usage();
            return ExitCode::from(1);
        }
    };

    let mut pipeline = match Pipeline::build(&args[1..]) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!("{err}");
            print_usage();
            return ExitCode::from(1);
        }
    };

    if let Err(err) = pipeline.start(queue_size) {
        error!("{err}");
        return ExitCode::from(2);
    }

    let stdin = io::stdin();
    pipeline.run(stdin.lock());

    println!("Pipeline shutdown complete");
    ExitCode::SUCCESS
}
