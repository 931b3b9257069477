use rwgt_core::RwgtError;
use rwgt_events::{
    create_writer, open_reader, read_all, Event, EventFormat, EventSample, Particle,
};
use tempfile::tempdir;

fn sample_events() -> Vec<Event> {
    (0..4)
        .map(|id| {
            let beam = id as f64 + 50.0;
            Event::new(
                id * 3 - 2,
                vec![
                    Particle::new(21, [beam, 0.0, 0.0, beam]),
                    Particle::new(21, [beam, 0.0, 0.0, -beam]),
                ],
                vec![
                    Particle::new(6, [beam, 1.5, -0.5, 2.0]),
                    Particle::new(-6, [beam, -1.5, 0.5, -2.0]),
                ],
            )
        })
        .collect()
}

fn names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("F_{i}")).collect()
}

#[test]
fn both_formats_preserve_events_and_names() {
    let dir = tempdir().unwrap();
    for format in [EventFormat::JsonLines, EventFormat::Binary] {
        let path = dir.path().join(format!("sample.{format}"));
        let mut writer = create_writer(&path, format).unwrap();
        writer.set_coefficient_names(&names(3)).unwrap();
        let mut expected = Vec::new();
        for mut event in sample_events() {
            event.coefficients = vec![event.id as f64, 0.25, -1.0e-12];
            writer.write_event(&event).unwrap();
            expected.push(event);
        }
        assert_eq!(writer.finish().unwrap(), 4);

        let mut reader = open_reader(&path, format).unwrap();
        assert_eq!(reader.coefficient_names(), names(3).as_slice());
        assert_eq!(read_all(reader.as_mut()).unwrap(), expected, "format {format}");
    }
}

#[test]
fn binary_count_is_known_and_jsonl_is_not() {
    let dir = tempdir().unwrap();
    let bin = dir.path().join("events.bin");
    let jsonl = dir.path().join("events.jsonl");
    for path in [&bin, &jsonl] {
        let mut writer = create_writer(path, EventFormat::from_path(path)).unwrap();
        for event in sample_events() {
            writer.write_event(&event).unwrap();
        }
        writer.finish().unwrap();
    }
    assert_eq!(EventSample::detect(&bin).open().unwrap().count(), Some(4));
    assert_eq!(EventSample::detect(&jsonl).open().unwrap().count(), None);
}

#[test]
fn sample_can_be_read_more_than_once() {
    let dir = tempdir().unwrap();
    let sample = EventSample::new(dir.path().join("events.jsonl"), EventFormat::JsonLines);
    let mut writer = create_writer(&sample.path, sample.format).unwrap();
    for event in sample_events() {
        writer.write_event(&event).unwrap();
    }
    writer.finish().unwrap();

    let first = read_all(sample.open().unwrap().as_mut()).unwrap();
    let second = read_all(sample.open().unwrap().as_mut()).unwrap();
    assert_eq!(first, second);
    assert!(first.iter().all(|event| event.coefficients.is_empty()));
}

#[test]
fn coefficient_names_are_declared_once_before_writing() {
    let dir = tempdir().unwrap();
    let mut writer = create_writer(&dir.path().join("a.bin"), EventFormat::Binary).unwrap();
    writer.set_coefficient_names(&names(2)).unwrap();
    let err = writer.set_coefficient_names(&names(2)).unwrap_err();
    assert_eq!(err.code(), "coefficient-names-redeclared");

    let mut writer = create_writer(&dir.path().join("b.jsonl"), EventFormat::JsonLines).unwrap();
    writer.write_event(&sample_events()[0]).unwrap();
    let err = writer.set_coefficient_names(&names(2)).unwrap_err();
    assert_eq!(err.code(), "coefficient-names-late");
}

#[test]
fn coefficient_length_must_match_declared_names() {
    let dir = tempdir().unwrap();
    let mut writer = create_writer(&dir.path().join("c.bin"), EventFormat::Binary).unwrap();
    writer.set_coefficient_names(&names(3)).unwrap();
    let mut event = sample_events().remove(1);
    event.coefficients = vec![1.0, 2.0];
    match writer.write_event(&event).unwrap_err() {
        RwgtError::EventFile(info) => {
            assert_eq!(info.code, "coefficient-length");
            assert_eq!(info.context.get("event_id").map(String::as_str), Some("1"));
            assert_eq!(info.context.get("expected").map(String::as_str), Some("3"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn foreign_files_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("not-events.bin");
    std::fs::write(&path, b"definitely not an event file").unwrap();
    let err = open_reader(&path, EventFormat::Binary).err().unwrap();
    assert_eq!(err.code(), "event-header-unsupported");

    let path = dir.path().join("not-events.jsonl");
    std::fs::write(&path, "{\"format\":\"other\",\"version\":1}\n").unwrap();
    let err = open_reader(&path, EventFormat::JsonLines).err().unwrap();
    assert_eq!(err.code(), "event-header-unsupported");
}

#[test]
fn format_tags_parse() {
    assert_eq!("jsonl".parse::<EventFormat>().unwrap(), EventFormat::JsonLines);
    assert_eq!("binary".parse::<EventFormat>().unwrap(), EventFormat::Binary);
    assert!("root".parse::<EventFormat>().is_err());
}

#[test]
fn unfinished_binary_file_has_unknown_count_but_stays_readable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.bin");
    let mut writer = create_writer(&path, EventFormat::Binary).unwrap();
    for event in sample_events().into_iter().take(2) {
        writer.write_event(&event).unwrap();
    }
    drop(writer);

    let mut reader = open_reader(&path, EventFormat::Binary).unwrap();
    assert_eq!(reader.count(), None);
    assert_eq!(read_all(reader.as_mut()).unwrap().len(), 2);
}
