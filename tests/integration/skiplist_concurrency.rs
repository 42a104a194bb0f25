//! Skip list behaviour under concurrent writers and readers.
//!
//! Writers insert and overwrite overlapping key ranges while readers run
//! point lookups and ordered scans. After the threads join, the index must
//! hold exactly the model's key set with every level still well formed.

#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use memlane::storage::CounterMetrics;
use memlane::types::Result;
use memlane::{Entry, SkipList, SkipListOptions};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

const WRITERS: usize = 4;
const READERS: usize = 4;
const OPS_PER_WRITER: usize = 2_000;
const KEY_SPACE: u64 = 1_500;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn key(i: u64) -> Vec<u8> {
    format!("key-{i:06}").into_bytes()
}

#[test]
fn mixed_writers_and_readers_stay_consistent() -> Result<()> {
    init_tracing();
    let metrics = Arc::new(CounterMetrics::default());
    let list = SkipList::with_options(
        SkipListOptions::default()
            .seed(0xA11CE)
            .metrics(metrics.clone()),
    )?;
    let barrier = Barrier::new(WRITERS + READERS);
    let writers_done = AtomicBool::new(false);

    let written: Vec<BTreeSet<u64>> = thread::scope(|s| {
        let readers: Vec<_> = (0..READERS)
            .map(|r| {
                let (list, barrier, writers_done) = (&list, &barrier, &writers_done);
                s.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(1_000 + r as u64);
                    barrier.wait();
                    while !writers_done.load(Ordering::Acquire) {
                        let i = rng.gen_range(0..KEY_SPACE);
                        if let Some(found) = list.search(&key(i)) {
                            assert_eq!(found.key.as_ref(), key(i).as_slice());
                        }
                        if rng.gen_ratio(1, 64) {
                            let keys: Vec<_> = list.iter().map(|e| e.key.clone()).collect();
                            assert!(keys.windows(2).all(|w| w[0] < w[1]));
                        }
                    }
                })
            })
            .collect();

        let writers: Vec<_> = (0..WRITERS)
            .map(|w| {
                let (list, barrier) = (&list, &barrier);
                s.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(w as u64);
                    let mut mine = BTreeSet::new();
                    barrier.wait();
                    for op in 0..OPS_PER_WRITER {
                        let i = rng.gen_range(0..KEY_SPACE);
                        let value = format!("w{w}-{op}");
                        list.insert(Arc::new(Entry::new(key(i), value)))
                            .expect("insert");
                        mine.insert(i);
                    }
                    mine
                })
            })
            .collect();

        let written: Vec<BTreeSet<u64>> = writers
            .into_iter()
            .map(|h| h.join().expect("writer panicked"))
            .collect();
        writers_done.store(true, Ordering::Release);
        for reader in readers {
            reader.join().expect("reader panicked");
        }
        written
    });

    let expected: BTreeSet<u64> = written.into_iter().flatten().collect();
    assert_eq!(list.len(), expected.len());
    let keys: Vec<Vec<u8>> = list.iter().map(|e| e.key.to_vec()).collect();
    let expected_keys: Vec<Vec<u8>> = expected.iter().map(|i| key(*i)).collect();
    assert_eq!(keys, expected_keys);
    list.check_invariants()?;

    let snap = metrics.snapshot();
    assert_eq!(snap.inserts + snap.updates, (WRITERS * OPS_PER_WRITER) as u64);
    assert_eq!(snap.inserts, expected.len() as u64);
    Ok(())
}

#[test]
fn close_while_readers_run() -> Result<()> {
    init_tracing();
    let list = SkipList::with_options(SkipListOptions::default().seed(3))?;
    for i in 0..KEY_SPACE {
        list.insert(Arc::new(Entry::new(key(i), "v")))?;
    }

    thread::scope(|s| {
        for _ in 0..READERS {
            let list = &list;
            s.spawn(move || {
                for i in 0..KEY_SPACE {
                    // Either the record or nothing, never a torn read.
                    if let Some(found) = list.search(&key(i)) {
                        assert_eq!(found.value.as_ref(), b"v");
                    }
                }
            });
        }
        list.close().expect("close");
    });

    assert!(list.is_closed());
    assert!(list.is_empty());
    assert!(list.search(&key(0)).is_none());
    list.check_invariants()
}
