//! Memtable generation lifecycle: fill, seal, drain, close.

#![allow(missing_docs)]

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use memlane::types::{Error, Result};
use memlane::{Entry, Memtable, MemtableOptions, SkipListOptions};
use tempfile::tempdir;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn fill_seal_and_drain_in_order() -> Result<()> {
    init_tracing();
    let opts = MemtableOptions::default()
        .id(1)
        .memtable_size(4 << 10)
        .skiplist(SkipListOptions::default().seed(17));
    let mem = Memtable::new(opts)?;

    let mut i = 0u32;
    while !mem.is_full() {
        // Insert in descending order so the drain has to reorder.
        let key = format!("k{:08}", u32::MAX - i);
        mem.put(Entry::new(key, vec![b'x'; 32]))?;
        i += 1;
    }
    mem.seal();
    assert!(mem.footprint() >= 4 << 10);
    assert!(matches!(
        mem.put(Entry::new("late", "write")),
        Err(Error::Sealed)
    ));

    let drained: Vec<_> = mem.iter().collect();
    assert_eq!(drained.len(), i as usize);
    assert!(drained.windows(2).all(|w| w[0].key < w[1].key));
    let size: u64 = drained.iter().map(|e| e.size()).sum();
    assert_eq!(size, mem.size());

    mem.close()?;
    assert!(mem.is_empty());
    assert_eq!(mem.iter().count(), 0);
    Ok(())
}

#[test]
fn seal_races_with_writers() -> Result<()> {
    init_tracing();
    let mem = Memtable::new(MemtableOptions::default().id(2))?;
    let accepted = AtomicUsize::new(0);

    thread::scope(|s| {
        for t in 0..4 {
            let (mem, accepted) = (&mem, &accepted);
            s.spawn(move || {
                for i in 0..1_000 {
                    match mem.put(Entry::new(format!("t{t}-{i:04}"), "v")) {
                        Ok(_) => {
                            accepted.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(Error::Sealed) => break,
                        Err(err) => panic!("unexpected error: {err}"),
                    }
                }
            });
        }
        s.spawn(|| mem.seal());
    });

    assert!(mem.is_sealed());
    // Every acknowledged write is visible after the seal.
    assert_eq!(mem.len(), accepted.load(Ordering::Relaxed));
    mem.skiplist().check_invariants()
}

#[test]
fn options_load_from_toml_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("memtable.toml");
    fs::write(
        &path,
        r#"
id = 5
memtable_size = 2048

[skiplist]
max_level = 12
seed = 99
"#,
    )?;

    let opts = MemtableOptions::load(&path)?;
    assert_eq!(opts.id, 5);
    assert_eq!(opts.skiplist.max_level, 12);

    let mem = Memtable::new(opts)?;
    assert_eq!(mem.id(), 5);
    assert_eq!(mem.skiplist().max_level(), 12);
    mem.put(Entry::new("k", "v"))?;
    assert_eq!(mem.get(b"k").map(|e| e.value.clone()), Some("v".into()));
    Ok(())
}

#[test]
fn invalid_toml_file_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[skiplist]\nmax_level = 0\n")?;
    assert!(matches!(
        MemtableOptions::load(&path),
        Err(Error::InvalidOption(_))
    ));

    fs::write(&path, "memtable_size = \"big\"\n")?;
    assert!(matches!(MemtableOptions::load(&path), Err(Error::Config(_))));

    let missing = dir.path().join("missing.toml");
    assert!(matches!(MemtableOptions::load(&missing), Err(Error::Io(_))));
    Ok(())
}
