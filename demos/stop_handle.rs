//! Stopping a run from another thread.
//!
//! A slow producer feeds values through a pipe while the main thread asks the
//! splitter to stop. Chunks already delivered stay delivered; the pending
//! partial chunk is discarded.
//!
//! Run with:
//!     cargo run --example stop_handle

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use splitrs::{SplitConfig, Splitter};

/// Yields one line every few milliseconds until the channel closes.
struct SlowReader {
    lines: mpsc::Receiver<Vec<u8>>,
    current: io::Cursor<Vec<u8>>,
}

impl Read for SlowReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.current.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            match self.lines.recv() {
                Ok(line) => self.current = io::Cursor::new(line),
                Err(_) => return Ok(0),
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for i in 0.. {
            if tx.send(format!("event-{i}\n").into_bytes()).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
    });

    let config = SplitConfig::new("\n")?
        .with_chunk_size_limit(64)
        .with_flush_handler(|chunk| {
            println!("Chunk {}: {:?}", chunk.sn, chunk.value_range());
        });
    let splitter = Arc::new(Splitter::new(config));

    let runner = {
        let splitter = Arc::clone(&splitter);
        thread::spawn(move || {
            splitter.run(SlowReader {
                lines: rx,
                current: io::Cursor::new(Vec::new()),
            })
        })
    };

    thread::sleep(Duration::from_millis(300));
    println!("Requesting stop...");
    splitter.request_stop();

    let report = runner.join().map_err(|_| "splitter thread panicked")??;
    println!(
        "\n{:?} after {} chunks, {} values, {} bytes scanned",
        report.status, report.chunks, report.values, report.scanned_bytes
    );

    Ok(())
}
