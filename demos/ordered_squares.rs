//! Parses each command-line argument as an integer on the worker pool and
//! prints the squares in argument order.
//!
//! Run with: cargo run --example ordered_squares -- 3 x 12 -4

use seqpool::prelude::*;
use seqpool::{init_logger, LoggerConfig};

fn main() -> Result<(), Error> {
    init_logger(&LoggerConfig::default())?;

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut pipeline = Pipeline::new(
        Config::default(),
        |arg: String| arg.parse::<i64>().map(|n| n * n),
        |seq: Sequence, outcome: Outcome<i64>| match outcome {
            Ok(square) => println!("#{}: {}", seq, square),
            Err(e) => println!("#{}: error: {}", seq, e.message),
        },
    )?;

    pipeline.submit_batch(args)?;

    let metrics = pipeline.metrics();
    tracing::info!(submitted = metrics.tasks_submitted, workers = pipeline.num_workers(), "submitted");

    drop(pipeline.shutdown()?);
    Ok(())
}
