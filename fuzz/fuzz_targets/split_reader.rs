#![no_main]

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use splitrs::{Chunk, HashConfig, SplitConfig, Splitter};

fn split(config: SplitConfig, data: &[u8]) -> Option<Vec<Chunk>> {
    let chunks = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&chunks);
    let splitter = Splitter::new(config.with_flush_handler(move |c| sink.lock().unwrap().push(c)));
    match splitter.run(data) {
        Ok(_) => Some(chunks.lock().unwrap().clone()),
        // Only an oversized value may abort an in-memory run.
        Err(splitrs::SplitError::ScanLimitExceeded { limit }) => {
            assert!(data.len() >= limit);
            None
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
}

fuzz_target!(|input: &[u8]| {
    // First byte picks the delimiter, second the chunk size limit.
    let (delimiter, limit, data) = match input {
        [d, l, rest @ ..] => {
            let delimiter: Bytes = match d % 3 {
                0 => Bytes::from_static(b","),
                1 => Bytes::from_static(b"\r\n"),
                _ => Bytes::from_static(b"--\n"),
            };
            (delimiter, *l as usize, rest)
        }
        _ => return,
    };

    let config = SplitConfig::new(delimiter.clone())
        .unwrap()
        .with_chunk_size_limit(limit)
        .with_hash_config(HashConfig::enabled());
    let effective_limit = config.chunk_size_limit();

    let Some(chunks) = split(config, data) else {
        return;
    };

    // Verify: sequence numbers are contiguous
    let mut next_value_sn = 0u64;
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.sn, i as u64);
        assert_eq!(chunk.start_value_sn, next_value_sn);
        assert!(chunk.end_value_sn >= chunk.start_value_sn);
        next_value_sn = chunk.end_value_sn + 1;

        // Verify: size bound holds for multi-value chunks
        assert!(chunk.len() <= effective_limit || chunk.value_count() == 1);
        assert!(!chunk.is_empty());
        assert!(!chunk.data.ends_with(&delimiter));
        assert!(chunk.hash.is_some());
    }

    // Verify: determinism - same input produces same chunks
    let again = SplitConfig::new(delimiter)
        .unwrap()
        .with_chunk_size_limit(limit)
        .with_hash_config(HashConfig::enabled());
    assert_eq!(split(again, data), Some(chunks));
});
