use dawgdic_core::dawg_builder::DawgBuilder;
use dawgdic_core::{Completer, Dictionary, Guide};

#[test]
fn dictionary_round_trips_through_write_and_read() {
    let mut builder = DawgBuilder::new();
    for (key, value) in [("apple", 10), ("application", 20), ("apply", 30)] {
        builder.insert(key.as_bytes(), value).unwrap();
    }
    let dic = Dictionary::build(&builder.finish()).unwrap();

    let mut buf = Vec::new();
    dic.write(&mut buf).unwrap();
    let reread = Dictionary::read(std::io::Cursor::new(&buf)).unwrap();

    assert_eq!(reread.size(), dic.size());
    for key in ["apple", "application", "apply"] {
        assert_eq!(reread.find(key.as_bytes()), dic.find(key.as_bytes()));
    }
    assert!(!reread.contains(b"banana"));
}

#[test]
fn guide_round_trips_and_still_drives_completion_after_reload() {
    let mut builder = DawgBuilder::new();
    for (key, value) in [("apple", 10), ("application", 20), ("apply", 30)] {
        builder.insert(key.as_bytes(), value).unwrap();
    }
    let dic = Dictionary::build(&builder.finish()).unwrap();
    let guide = Guide::build(&dic);

    let mut dic_buf = Vec::new();
    dic.write(&mut dic_buf).unwrap();
    let mut guide_buf = Vec::new();
    guide.write(&mut guide_buf).unwrap();

    let reread_dic = Dictionary::read(std::io::Cursor::new(&dic_buf)).unwrap();
    let reread_guide = Guide::read_matching(std::io::Cursor::new(&guide_buf), &reread_dic).unwrap();

    let root = reread_dic.follow(b"appl", reread_dic.root()).unwrap();
    let mut completer = Completer::new(&reread_dic, &reread_guide);
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
fn truncated_dictionary_file_is_rejected() {
    let mut builder = DawgBuilder::new();
    builder.insert(b"apple", 0).unwrap();
    let dic = Dictionary::build(&builder.finish()).unwrap();

    let mut buf = Vec::new();
    dic.write(&mut buf).unwrap();
    buf.truncate(buf.len() - 1);

    assert!(Dictionary::read(std::io::Cursor::new(&buf)).is_err());
}
