//! Basic synchronous splitting example.
//!
//! Run with:
//!     cargo run --example sync_basic

use std::io::Cursor;

use splitrs::{FilterAction, SplitConfig, Splitter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = Cursor::new("apple,banana,pear,peach,cherry");

    let config = SplitConfig::new(",")?
        .with_chunk_size_limit(16)
        .with_flush_handler(|chunk| {
            println!(
                "Chunk {} values {} to {}: {}",
                chunk.sn,
                chunk.start_value_sn,
                chunk.end_value_sn,
                String::from_utf8_lossy(&chunk.data)
            );
        })
        .with_value_filter(|value: &[u8]| {
            if value == b"banana" {
                FilterAction::Drop
            } else {
                FilterAction::Keep
            }
        });

    let report = Splitter::new(config).run(input)?;

    println!(
        "\nTotal: {} chunks, {} values, {} bytes scanned",
        report.chunks, report.values, report.scanned_bytes
    );

    Ok(())
}
