use super::*;
use crate::{FileSource, SourceDriver};
use tempfile::TempDir;
use tl_core::Payload;
use tokio::io::AsyncReadExt;

async fn body(payload: Payload) -> String {
    let mut reader = payload.reader;
    let mut out = String::new();
    reader.read_to_string(&mut out).await.unwrap();
    out
}

fn three_units(root: &Path) {
    for (version, name, up, down) in [
        (1, "users", "CREATE TABLE users (id INT);", Some("DROP TABLE users;")),
        (2, "teams", "CREATE TABLE teams (id INT);", Some("DROP TABLE teams;")),
        (3, "members", "CREATE TABLE members (id INT);", Some("DROP TABLE members;")),
    ] {
        let migration = NewMigration::new(version, name)
            .with_up(up)
            .with_down(down.map(String::from));
        create(root, &migration).unwrap();
    }
}

#[tokio::test]
async fn test_created_unit_is_read_back_by_file_source() {
    let dir = TempDir::new().unwrap();
    let migration = NewMigration::new(1700000000000, "add_users")
        .with_up("CREATE TABLE users (id INT);")
        .with_down(Some("DROP TABLE users;".to_string()));

    let unit = create(dir.path(), &migration).unwrap();
    assert_eq!(unit, dir.path().join("1700000000000_add_users"));

    let source = FileSource::from_path(dir.path()).unwrap();
    let info = source.describe(1700000000000).await.unwrap();
    assert_eq!(info.name.as_deref(), Some("add_users"));
    assert!(info.has_up && info.has_down);
    assert_eq!(
        body(source.read_up(1700000000000).await.unwrap()).await,
        "CREATE TABLE users (id INT);"
    );
    assert_eq!(
        body(source.read_down(1700000000000).await.unwrap()).await,
        "DROP TABLE users;"
    );
}

#[tokio::test]
async fn test_create_without_down_is_irreversible() {
    let dir = TempDir::new().unwrap();
    let migration = NewMigration::new(5, "seed").with_down(None);
    create(dir.path(), &migration).unwrap();

    let source = FileSource::from_path(dir.path()).unwrap();
    let info = source.describe(5).await.unwrap();
    assert!(info.has_up);
    assert!(!info.has_down);
}

#[test]
fn test_create_makes_missing_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("db").join("migrations");
    create(&root, &NewMigration::new(1, "init")).unwrap();
    assert!(root.join("1_init").join("up.sql").exists());
}

#[test]
fn test_create_rejects_taken_version() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("7_old.up.sql"), "SELECT 1;").unwrap();

    let err = create(dir.path(), &NewMigration::new(7, "new")).unwrap_err();
    assert!(matches!(err, SourceError::DuplicateVersion { version: 7, .. }));
    assert!(!dir.path().join("7_new").exists());
}

#[test]
fn test_create_rejects_bad_names_and_version_zero() {
    let dir = TempDir::new().unwrap();
    for name in ["", "../escape", "with space"] {
        let err = create(dir.path(), &NewMigration::new(1, name)).unwrap_err();
        assert!(matches!(err, SourceError::InvalidName { .. }), "{name}");
    }
    let err = create(dir.path(), &NewMigration::new(0, "zero")).unwrap_err();
    assert!(matches!(err, SourceError::InvalidVersion { .. }));
}

#[test]
fn test_timestamp_version_is_milliseconds() {
    let version = timestamp_version();
    assert!(version > 1_600_000_000_000);
    assert!(version < 10_000_000_000_000);
}

#[tokio::test]
async fn test_squash_combines_tail_and_removes_sources() {
    let dir = TempDir::new().unwrap();
    three_units(dir.path());

    let squashed = squash(
        dir.path(),
        &Squash {
            from: 2,
            version: 10,
            name: "squashed".to_string(),
            delete_source: true,
        },
    )
    .unwrap();
    assert_eq!(squashed.versions, vec![2, 3]);
    assert!(squashed.reversible);
    assert!(!dir.path().join("2_teams").exists());

    let source = FileSource::from_path(dir.path()).unwrap();
    assert_eq!(source.migrations().versions().collect::<Vec<_>>(), vec![1, 10]);

    let up = body(source.read_up(10).await.unwrap()).await;
    assert!(up.find("CREATE TABLE teams").unwrap() < up.find("CREATE TABLE members").unwrap());
    assert!(up.contains("-- 2_teams"));

    let down = body(source.read_down(10).await.unwrap()).await;
    assert!(down.find("DROP TABLE members").unwrap() < down.find("DROP TABLE teams").unwrap());
}

#[test]
fn test_squash_keeps_sources_by_default() {
    let dir = TempDir::new().unwrap();
    three_units(dir.path());

    squash(
        dir.path(),
        &Squash {
            from: 1,
            version: 4,
            name: "all".to_string(),
            delete_source: false,
        },
    )
    .unwrap();

    let source = FileSource::from_path(dir.path()).unwrap();
    assert_eq!(
        source.migrations().versions().collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[tokio::test]
async fn test_squash_with_irreversible_unit_has_no_down() {
    let dir = TempDir::new().unwrap();
    three_units(dir.path());
    let seed = NewMigration::new(4, "seed")
        .with_up("INSERT INTO users VALUES (1);")
        .with_down(None);
    create(dir.path(), &seed).unwrap();

    let squashed = squash(
        dir.path(),
        &Squash {
            from: 3,
            version: 20,
            name: "tail".to_string(),
            delete_source: false,
        },
    )
    .unwrap();
    assert!(!squashed.reversible);

    let source = FileSource::from_path(dir.path()).unwrap();
    assert!(!source.describe(20).await.unwrap().has_down);
}

#[test]
fn test_squash_rejects_bad_requests() {
    let dir = TempDir::new().unwrap();
    three_units(dir.path());
    std::fs::write(dir.path().join("4_track.up.yaml"), "- type: track_table\n").unwrap();

    let options = |from, version| Squash {
        from,
        version,
        name: "combined".to_string(),
        delete_source: false,
    };

    assert!(matches!(
        squash(dir.path(), &options(9, 100)).unwrap_err(),
        SourceError::UnknownVersion(9)
    ));
    assert!(matches!(
        squash(dir.path(), &options(1, 4)).unwrap_err(),
        SourceError::Squash(_)
    ));
    assert!(matches!(
        squash(dir.path(), &options(3, 100)).unwrap_err(),
        SourceError::Squash(_)
    ));
    assert!(!dir.path().join("100_combined").exists());
}
