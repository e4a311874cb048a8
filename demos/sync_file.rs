//! File splitting example: batches the lines of a file.
//!
//! Run with:
//!     cargo run --example sync_file --features hash-blake3 -- /path/to/file [limit]

use std::env;
use std::fs::File;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use splitrs::{HashConfig, SplitConfig, Splitter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "Cargo.toml".to_string());
    let limit = match args.next() {
        Some(limit) => limit.parse::<usize>()?,
        None => 256,
    };

    println!("Splitting file: {}\n", path);

    let file = File::open(&path)?;
    let metadata = file.metadata()?;
    println!("File size: {} bytes\n", metadata.len());

    let total_bytes = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&total_bytes);

    let config = SplitConfig::new("\n")?
        .with_chunk_size_limit(limit)
        .with_hash_config(HashConfig::enabled())
        .with_flush_handler(move |chunk| {
            counter.fetch_add(chunk.len() as u64, Ordering::Relaxed);
            let hash = chunk.hash.map(|h| h.to_hex()).unwrap_or_default();
            println!(
                "Chunk {:>4}: lines {:>6}..={:<6} len={:>6} scanned={:>8} {}",
                chunk.sn,
                chunk.start_value_sn,
                chunk.end_value_sn,
                chunk.len(),
                chunk.scanned_bytes,
                hash
            );
        });

    let report = Splitter::new(config).run(file)?;

    println!(
        "\nTotal: {} chunks, {} lines, {} payload bytes",
        report.chunks,
        report.values,
        total_bytes.load(Ordering::Relaxed)
    );
    if report.chunks > 0 {
        println!("Average chunk size: {} bytes", total_bytes.load(Ordering::Relaxed) / report.chunks);
    }

    Ok(())
}
