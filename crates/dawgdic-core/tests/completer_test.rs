use dawgdic_core::dawg_builder::DawgBuilder;
use dawgdic_core::{Completer, Dictionary, Guide, RankedCompleter, RankedGuide};

fn build(pairs: &[(&str, i32)]) -> Dictionary {
    let mut builder = DawgBuilder::new();
    for (key, value) in pairs {
        builder.insert(key.as_bytes(), *value).unwrap();
    }
    Dictionary::build(&builder.finish()).unwrap()
}

#[test]
fn plain_completer_yields_every_completion_in_lexicographic_order() {
    let dic = build(&[("apple", 10), ("application", 20), ("apply", 30)]);
    let guide = Guide::build(&dic);
    let root = dic.follow(b"appl", dic.root()).unwrap();

    let mut completer = Completer::new(&dic, &guide);
    completer.start(root, b"appl");
    let mut found = Vec::new();
    while completer.next() {
        found.push((completer.key().to_vec(), completer.value()));
    }

    assert_eq!(
        found,
        vec![
            (b"apple".to_vec(), 10),
            (b"application".to_vec(), 20),
            (b"apply".to_vec(), 30),
        ]
    );
}

#[test]
fn ranked_completer_yields_values_in_non_increasing_order() {
    let dic = build(&[("apple", 5), ("application", 50), ("apply", 20)]);
    let guide = RankedGuide::build(&dic);
    let root = dic.follow(b"appl", dic.root()).unwrap();

    let mut completer = RankedCompleter::new(&dic, &guide);
    completer.start(root, b"appl");
    let mut values = Vec::new();
    while completer.next() {
        values.push(completer.value());
    }

    assert_eq!(values, vec![50, 20, 5]);
    assert!(values.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn completion_set_matches_every_key_sharing_the_prefix() {
    let keys = [
        ("car", 1),
        ("card", 2),
        ("care", 3),
        ("cared", 4),
        ("cars", 5),
        ("cat", 6),
    ];
    let dic = build(&keys);
    let guide = Guide::build(&dic);
    let root = dic.follow(b"car", dic.root()).unwrap();

    let mut completer = Completer::new(&dic, &guide);
    completer.start(root, b"car");
    let mut found = Vec::new();
    while completer.next() {
        found.push(completer.key().to_vec());
    }

    let mut expected: Vec<Vec<u8>> = keys
        .iter()
        .map(|(k, _)| k.as_bytes().to_vec())
        .filter(|k| k.starts_with(b"car"))
        .collect();
    expected.sort();
    found.sort();
    assert_eq!(found, expected);
}
