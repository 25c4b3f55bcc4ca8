use super::*;

fn flat(name: &str) -> MigrationFile {
    MigrationFile::parse_flat(Path::new(name)).unwrap()
}

#[test]
fn test_parse_flat_file() {
    let file = flat("1700000000001_create_users.up.sql");
    assert_eq!(file.version, 1700000000001);
    assert_eq!(file.identifier.as_deref(), Some("create_users"));
    assert_eq!(file.direction, Direction::Up);
    assert_eq!(file.format, PayloadFormat::Sql);
}

#[test]
fn test_parse_flat_file_without_name() {
    let file = flat("42.down.yaml");
    assert_eq!(file.version, 42);
    assert_eq!(file.identifier, None);
    assert_eq!(file.direction, Direction::Down);
    assert_eq!(file.format, PayloadFormat::Yaml);
}

#[test]
fn test_parse_flat_rejects_other_names() {
    assert!(MigrationFile::parse_flat(Path::new("README.md")).is_none());
    assert!(MigrationFile::parse_flat(Path::new("12_x.sideways.sql")).is_none());
    assert!(MigrationFile::parse_flat(Path::new("abc_x.up.sql")).is_none());
    assert!(MigrationFile::parse_flat(Path::new("12_x.up.txt")).is_none());
}

#[test]
fn test_parse_in_unit_dir() {
    let file = MigrationFile::parse_in_unit_dir(
        "1700000000002_add_email",
        Path::new("/m/1700000000002_add_email/up.sql"),
    )
    .unwrap();
    assert_eq!(file.version, 1700000000002);
    assert_eq!(file.identifier.as_deref(), Some("add_email"));
    assert_eq!(file.direction, Direction::Up);

    assert!(MigrationFile::parse_in_unit_dir("notes", Path::new("/m/notes/up.sql")).is_none());
    assert!(MigrationFile::parse_in_unit_dir("3_x", Path::new("/m/3_x/notes.sql")).is_none());
}

#[test]
fn test_index_walks_in_order() {
    let mut index = Migrations::new();
    for name in [
        "3_c.up.sql",
        "1_a.up.sql",
        "1_a.down.sql",
        "2_b.up.sql",
        "2_b.down.sql",
    ] {
        index.append(flat(name)).unwrap();
    }

    assert_eq!(index.len(), 3);
    assert_eq!(index.versions().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(index.first().unwrap(), 1);
    assert_eq!(index.next(1).unwrap(), 2);
    assert_eq!(index.next(2).unwrap(), 3);
    assert!(matches!(index.next(3), Err(SourceError::NoNextVersion(3))));
    assert_eq!(index.prev(3).unwrap(), 2);
    assert!(matches!(index.prev(1), Err(SourceError::NoPreviousVersion(1))));
}

#[test]
fn test_next_prev_for_unknown_version() {
    let mut index = Migrations::new();
    index.append(flat("10_a.up.sql")).unwrap();
    index.append(flat("20_b.up.sql")).unwrap();

    assert_eq!(index.next(0).unwrap(), 10);
    assert_eq!(index.next(15).unwrap(), 20);
    assert_eq!(index.prev(15).unwrap(), 10);
}

#[test]
fn test_empty_index() {
    let index = Migrations::new();
    assert!(index.is_empty());
    assert!(matches!(index.first(), Err(SourceError::NoMigrations)));
}

#[test]
fn test_duplicate_direction_rejected() {
    let mut index = Migrations::new();
    index.append(flat("5_a.up.sql")).unwrap();
    let err = index.append(flat("5_a.up.yaml")).unwrap_err();
    assert!(matches!(err, SourceError::DuplicateVersion { version: 5, .. }));
}

#[test]
fn test_same_version_different_name_rejected() {
    let mut index = Migrations::new();
    index.append(flat("5_a.up.sql")).unwrap();
    let err = index.append(flat("5_b.down.sql")).unwrap_err();
    assert!(matches!(err, SourceError::DuplicateVersion { version: 5, .. }));
}

#[test]
fn test_version_zero_rejected() {
    let mut index = Migrations::new();
    let err = index.append(flat("0_init.up.sql")).unwrap_err();
    assert!(matches!(err, SourceError::InvalidVersion { .. }));
}

#[test]
fn test_irreversible_unit() {
    let mut index = Migrations::new();
    index.append(flat("7_seed.up.sql")).unwrap();

    assert!(index.up(7).is_ok());
    assert!(matches!(index.down(7), Err(SourceError::NoDownMigration(7))));

    let info = index.describe(7).unwrap();
    assert_eq!(info.name.as_deref(), Some("seed"));
    assert!(info.has_up);
    assert!(!info.has_down);
    assert!(matches!(index.describe(8), Err(SourceError::UnknownVersion(8))));
}
