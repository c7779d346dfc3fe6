//! Unit tests for PersistentBstMap.

use bstmaps::error::OrderedMapError;
use bstmaps::persistent::PersistentBstMap;
use rstest::{fixture, rstest};

#[fixture]
fn letters() -> PersistentBstMap<i32, String> {
    PersistentBstMap::new()
        .put(3, "C".to_string())
        .put(2, "B".to_string())
        .put(5, "E".to_string())
        .put(4, "D".to_string())
        .put(1, "A".to_string())
}

fn keys_of<V>(map: &PersistentBstMap<i32, V>) -> Vec<i32> {
    map.keys().copied().collect()
}

// =============================================================================
// Basic Construction Tests
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map: PersistentBstMap<i32, String> = PersistentBstMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.size(), 0);
}

#[rstest]
fn test_default_creates_empty_map() {
    let map: PersistentBstMap<i32, String> = PersistentBstMap::default();
    assert!(map.is_empty());
}

#[rstest]
fn test_singleton_creates_map_with_one_entry() {
    let map = PersistentBstMap::singleton(42, "answer".to_string());
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&42), Some(&"answer".to_string()));
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[rstest]
fn test_scenario_build(letters: PersistentBstMap<i32, String>) {
    assert_eq!(letters.len(), 5);
    assert_eq!(letters.min(), Ok(&1));
    assert_eq!(keys_of(&letters), vec![1, 2, 3, 4, 5]);
    assert_eq!(letters.select(3), Ok(&3));
    assert_eq!(letters.rank(&4), Ok(4));
}

#[rstest]
fn test_scenario_delete(letters: PersistentBstMap<i32, String>) {
    let removed = letters.delete(&3).unwrap();
    assert_eq!(removed.len(), 4);
    assert!(!removed.contains(&3));
    assert_eq!(keys_of(&removed), vec![1, 2, 4, 5]);
    for index in 1..=4 {
        let key = removed.select(index).unwrap();
        assert_eq!(removed.rank(key), Ok(index));
    }
    // The original version still holds every key
    assert_eq!(keys_of(&letters), vec![1, 2, 3, 4, 5]);
}

#[rstest]
fn test_scenario_delete_min(letters: PersistentBstMap<i32, String>) {
    let rest = letters.delete_min().unwrap();
    assert!(!rest.contains(&1));
    assert_eq!(rest.min(), Ok(&2));
    assert_eq!(rest.len(), 4);
    assert_eq!(letters.min(), Ok(&1));
}

// =============================================================================
// Get / Contains Tests
// =============================================================================

#[rstest]
fn test_get_on_empty_map_returns_none() {
    let map: PersistentBstMap<i32, String> = PersistentBstMap::new();
    assert_eq!(map.get(&1), None);
    assert!(!map.contains(&1));
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(-3)]
fn test_get_absent_key_returns_none(letters: PersistentBstMap<i32, String>, #[case] key: i32) {
    assert_eq!(letters.get(&key), None);
    assert!(!letters.contains(&key));
}

#[rstest]
fn test_get_with_borrowed_key() {
    let map = PersistentBstMap::new()
        .put("apple".to_string(), 1)
        .put("banana".to_string(), 2);
    assert_eq!(map.get("banana"), Some(&2));
    assert!(map.contains("apple"));
}

// =============================================================================
// Put Tests
// =============================================================================

#[rstest]
fn test_put_preserves_original_map() {
    let map1 = PersistentBstMap::new().put(1, "one".to_string());
    let map2 = map1.put(2, "two".to_string());

    assert_eq!(map1.len(), 1);
    assert_eq!(map2.len(), 2);
    assert_eq!(map1.get(&2), None);
    assert_eq!(map2.get(&2), Some(&"two".to_string()));
}

#[rstest]
fn test_put_existing_key_is_an_update(letters: PersistentBstMap<i32, String>) {
    let updated = letters.put(4, "four".to_string());
    assert_eq!(updated.len(), 5);
    assert_eq!(updated.get(&4), Some(&"four".to_string()));
    assert_eq!(letters.get(&4), Some(&"D".to_string()));
}

#[rstest]
fn test_put_same_entry_twice_is_idempotent() {
    let once = PersistentBstMap::new().put(7, "seven");
    let twice = once.put(7, "seven");
    assert_eq!(once, twice);
    assert_eq!(twice.len(), 1);
}

// =============================================================================
// Min / Max / Floor Tests
// =============================================================================

#[rstest]
fn test_min_max_entries(letters: PersistentBstMap<i32, String>) {
    assert_eq!(letters.max(), Ok(&5));
    assert_eq!(letters.min_entry(), Ok((&1, &"A".to_string())));
    assert_eq!(letters.max_entry(), Ok((&5, &"E".to_string())));
}

#[rstest]
fn test_floor_on_sparse_keys() {
    let map: PersistentBstMap<i32, ()> = [40, 20, 60, 10, 30].into_iter().map(|k| (k, ())).collect();
    assert_eq!(map.floor(&35), Ok(Some(&30)));
    assert_eq!(map.floor(&40), Ok(Some(&40)));
    assert_eq!(map.floor(&100), Ok(Some(&60)));
    assert_eq!(map.floor(&9), Ok(None));
}

#[rstest]
#[case(3, Some(2))]
#[case(2, Some(1))]
#[case(5, Some(4))]
#[case(1, None)]
#[case(4, None)]
#[case(9, None)]
fn test_subtree_predecessor(
    letters: PersistentBstMap<i32, String>,
    #[case] key: i32,
    #[case] expected: Option<i32>,
) {
    assert_eq!(letters.subtree_predecessor(&key), Ok(expected.as_ref()));
}

// =============================================================================
// Select / Rank Tests
// =============================================================================

#[rstest]
fn test_select_every_position(letters: PersistentBstMap<i32, String>) {
    let selected: Vec<i32> = (1..=letters.len())
        .map(|index| *letters.select(index).unwrap())
        .collect();
    assert_eq!(selected, vec![1, 2, 3, 4, 5]);
}

#[rstest]
#[case(0)]
#[case(6)]
fn test_select_out_of_range(letters: PersistentBstMap<i32, String>, #[case] index: usize) {
    assert_eq!(
        letters.select(index),
        Err(OrderedMapError::IndexOutOfRange { index, len: 5 })
    );
}

#[rstest]
fn test_rank_absent_key_is_zero(letters: PersistentBstMap<i32, String>) {
    assert_eq!(letters.rank(&42), Ok(0));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[rstest]
fn test_delete_absent_key_is_noop(letters: PersistentBstMap<i32, String>) {
    let unchanged = letters.delete(&42).unwrap();
    assert_eq!(unchanged, letters);
    assert!(unchanged.ptr_eq(&letters));
}

#[rstest]
fn test_delete_leaf_and_inner_nodes(letters: PersistentBstMap<i32, String>) {
    let without_leaf = letters.delete(&4).unwrap();
    assert_eq!(keys_of(&without_leaf), vec![1, 2, 3, 5]);

    let without_inner = letters.delete(&2).unwrap();
    assert_eq!(keys_of(&without_inner), vec![1, 3, 4, 5]);
    assert_eq!(without_inner.get(&1), Some(&"A".to_string()));
}

#[rstest]
fn test_delete_everything_reaches_empty(letters: PersistentBstMap<i32, String>) {
    let mut map = letters;
    for key in [3, 1, 5, 2, 4] {
        map = map.delete(&key).unwrap();
    }
    assert!(map.is_empty());
    assert_eq!(map.to_string(), "");
}

// =============================================================================
// Empty Map Error Tests
// =============================================================================

#[rstest]
fn test_empty_map_errors() {
    let map: PersistentBstMap<i32, String> = PersistentBstMap::new();
    let empty = |operation| OrderedMapError::EmptyMap { operation };

    assert_eq!(map.min(), Err(empty("min")));
    assert_eq!(map.max(), Err(empty("max")));
    assert_eq!(map.floor(&1), Err(empty("floor")));
    assert_eq!(map.subtree_predecessor(&1), Err(empty("subtree_predecessor")));
    assert_eq!(map.select(1), Err(empty("select")));
    assert_eq!(map.rank(&1), Err(empty("rank")));
    assert_eq!(map.delete_min().unwrap_err(), empty("delete_min"));
    assert_eq!(map.delete_max().unwrap_err(), empty("delete_max"));
    assert_eq!(map.delete(&1).unwrap_err(), empty("delete"));
}

// =============================================================================
// Iteration / Trait Tests
// =============================================================================

#[rstest]
fn test_into_iter_owned(letters: PersistentBstMap<i32, String>) {
    let entries: Vec<(i32, String)> = letters.into_iter().collect();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0], (1, "A".to_string()));
    assert_eq!(entries[4], (5, "E".to_string()));
}

#[rstest]
fn test_values_follow_key_order(letters: PersistentBstMap<i32, String>) {
    let values: String = letters.values().map(String::as_str).collect();
    assert_eq!(values, "ABCDE");
}

#[rstest]
fn test_eq_ignores_tree_shape() {
    let ascending: PersistentBstMap<i32, i32> = (1..=5).map(|k| (k, k)).collect();
    let mixed: PersistentBstMap<i32, i32> = [3, 1, 4, 5, 2].into_iter().map(|k| (k, k)).collect();
    assert_eq!(ascending, mixed);
    assert!(!ascending.ptr_eq(&mixed));
}

#[rstest]
fn test_hash_consistent_with_eq() {
    use std::collections::HashSet;

    let first: PersistentBstMap<i32, i32> = [(1, 10), (2, 20)].into_iter().collect();
    let second: PersistentBstMap<i32, i32> = [(2, 20), (1, 10)].into_iter().collect();
    let mut set = HashSet::new();
    set.insert(first);
    assert!(set.contains(&second));
}

#[rstest]
fn test_extend_puts_in_order() {
    let mut map = PersistentBstMap::new().put(1, "one");
    let before = map.clone();
    map.extend([(2, "two"), (1, "ONE")]);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&"ONE"));
    assert_eq!(before.get(&1), Some(&"one"));
}

#[rstest]
fn test_display_renders_delimited_block(letters: PersistentBstMap<i32, String>) {
    assert_eq!(
        letters.to_string(),
        "\n\n***\n1 --> A\n2 --> B\n3 --> C\n4 --> D\n5 --> E\n***\n\n"
    );
}
