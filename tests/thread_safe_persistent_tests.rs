//! Integration tests for sharing persistent maps across threads.
//!
//! With the `arc` feature enabled, map versions can be read and extended
//! from many threads at once without any locking.

#![cfg(all(feature = "arc", feature = "persistent"))]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use bstmaps::persistent::PersistentBstMap;
use rstest::rstest;
use std::sync::Arc;
use std::thread;

#[rstest]
fn test_bst_map_cross_thread_structural_sharing() {
    let original: Arc<PersistentBstMap<i32, String>> = Arc::new(
        [50, 25, 75, 10, 30, 60, 90]
            .into_iter()
            .map(|key| (key, format!("value_{key}")))
            .collect(),
    );

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let map_clone = Arc::clone(&original);
            thread::spawn(move || {
                // Each thread creates its own version
                let key = 100 + index;
                let extended = map_clone.put(key, format!("thread_{index}"));
                let shrunk = extended.delete(&50).unwrap();
                assert_eq!(extended.len(), 8);
                assert_eq!(shrunk.len(), 7);
                assert_eq!(shrunk.max(), Ok(&key));
                // Original should be unchanged
                assert_eq!(map_clone.len(), 7);
                assert!(map_clone.contains(&50));
                shrunk
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .collect();

    for (index, map) in results.iter().enumerate() {
        let key = 100 + index as i32;
        assert_eq!(map.get(&key), Some(&format!("thread_{index}")));
        assert!(!map.contains(&50));
    }

    assert_eq!(original.len(), 7);
    assert_eq!(original.select(4), Ok(&50));
}

#[rstest]
fn test_bst_map_concurrent_readers() {
    let map: PersistentBstMap<i32, i32> = (0..200).map(|key| ((key * 37) % 200, key)).collect();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for key in 0..200 {
                    assert!(map.contains(&key));
                    assert_eq!(map.rank(&key), Ok(key as usize + 1));
                    assert_eq!(map.floor(&key), Ok(Some(&key)));
                }
            });
        }
    });
}
