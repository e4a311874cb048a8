//! Async splitting example.
//!
//! Splits several in-memory streams concurrently on a tokio runtime. The
//! splitter only needs `futures_io::AsyncRead`, so tokio readers go through
//! the `compat` adapter.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use splitrs::{RunReport, SplitConfig, SplitError, Splitter};
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create multiple data streams
    let streams: Vec<Vec<u8>> = (0..3)
        .map(|s| {
            (0..5_000)
                .map(|i| format!("stream{s}-record{i}"))
                .collect::<Vec<_>>()
                .join("\n")
                .into_bytes()
        })
        .collect();

    println!("Processing {} streams concurrently...\n", streams.len());

    let handles: Vec<_> = streams
        .into_iter()
        .enumerate()
        .map(|(stream_id, data)| tokio::spawn(process_stream(stream_id, data)))
        .collect();

    for handle in handles {
        let (stream_id, report, total_bytes) = handle.await??;
        println!(
            "Stream {}: {} chunks, {} values, {} payload bytes",
            stream_id, report.chunks, report.values, total_bytes
        );
    }

    Ok(())
}

async fn process_stream(
    stream_id: usize,
    data: Vec<u8>,
) -> Result<(usize, RunReport, u64), SplitError> {
    let total_bytes = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&total_bytes);

    // Start sequence numbers per stream so chunk ids never collide
    let config = SplitConfig::new("\n")?
        .with_chunk_size_limit(8 * 1024)
        .with_start_chunk_sn(stream_id as u64 * 1_000_000)
        .with_flush_handler(move |chunk| {
            counter.fetch_add(chunk.len() as u64, Ordering::Relaxed);
        });

    // An in-memory duplex pipe stands in for a socket
    let (reader, mut writer) = tokio::io::duplex(4096);
    tokio::spawn(async move {
        use tokio::io::AsyncWriteExt;
        let _ = writer.write_all(&data).await;
    });

    let report = Splitter::new(config).run_async(reader.compat()).await?;
    Ok((stream_id, report, total_bytes.load(Ordering::Relaxed)))
}
