use dawgdic_core::dawg_builder::{DawgBuilder, InsertError};

#[test]
fn banana_then_apple_is_an_order_violation() {
    let mut builder = DawgBuilder::new();
    builder.insert(b"banana", 0).unwrap();
    assert_eq!(builder.insert(b"apple", 1), Err(InsertError::OrderViolation));
}

#[test]
fn large_random_key_set_builds_with_merged_states() {
    let mut keys: Vec<String> = (0u32..65_536).map(|i| format!("{:06}", (i as u64 * 2_654_435_761) % 1_000_000)).collect();
    keys.sort();
    keys.dedup();

    let mut builder = DawgBuilder::new();
    for (i, key) in keys.iter().enumerate() {
        builder.insert(key.as_bytes(), i as i32).unwrap();
    }
    let dawg = builder.finish();

    assert!(dawg.merged_states_count() > 0);

    let dic = dawgdic_core::Dictionary::build(&dawg).unwrap();
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(dic.find(key.as_bytes()), Some(i as i32));
    }
}

#[test]
fn forward_and_reverse_insertion_minimise_to_the_same_state_count() {
    let keys = ["cities", "pities", "duties", "parties"];

    let mut forward = DawgBuilder::new();
    for key in keys {
        forward.insert(key.as_bytes(), 0).unwrap();
    }
    let forward_dawg = forward.finish();

    let mut reversed_keys = keys.to_vec();
    reversed_keys.sort();
    reversed_keys.reverse();
    let mut backward = DawgBuilder::new();
    for key in &reversed_keys {
        backward.insert(key.as_bytes(), 0).unwrap();
    }
    let backward_dawg = backward.finish();

    assert_eq!(forward_dawg.states_count(), backward_dawg.states_count());
}
