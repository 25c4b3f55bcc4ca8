use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

fn apply_args(args: &[&str]) -> ApplyArgs {
    let cli = Cli::try_parse_from(args).unwrap();
    match cli.command {
        Commands::Migrate(MigrateArgs {
            command: MigrateCommands::Apply(apply),
        }) => apply,
        other => panic!("expected migrate apply, got {other:?}"),
    }
}

#[test]
fn test_up_without_count_means_all() {
    let apply = apply_args(&["tl", "migrate", "apply", "--up"]);
    assert_eq!(apply.up.as_deref(), Some("all"));
    assert!(apply.down.is_none());
}

#[test]
fn test_down_with_count() {
    let apply = apply_args(&["tl", "migrate", "apply", "--down", "2"]);
    assert_eq!(apply.down.as_deref(), Some("2"));
}

#[test]
fn test_goto_version() {
    let apply = apply_args(&["tl", "migrate", "apply", "--goto", "20240101"]);
    assert_eq!(apply.goto, Some(20240101));
}

#[test]
fn test_apply_requires_one_direction() {
    assert!(Cli::try_parse_from(["tl", "migrate", "apply"]).is_err());
    assert!(Cli::try_parse_from(["tl", "migrate", "apply", "--up", "--down"]).is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "tl",
        "migrate",
        "status",
        "--project-dir",
        "/srv/app",
        "--endpoint",
        "https://api.example.com",
        "-o",
        "json",
    ])
    .unwrap();
    assert_eq!(cli.global.project_dir, PathBuf::from("/srv/app"));
    assert_eq!(cli.global.endpoint.as_deref(), Some("https://api.example.com"));
    match cli.command {
        Commands::Migrate(MigrateArgs {
            command: MigrateCommands::Status(status),
        }) => assert_eq!(status.output, StatusOutput::Json),
        other => panic!("expected migrate status, got {other:?}"),
    }
}

#[test]
fn test_metadata_verbs() {
    for (verb, expected) in [
        ("apply", MetadataCommands::Apply),
        ("export", MetadataCommands::Export),
        ("reset", MetadataCommands::Reset),
        ("reload", MetadataCommands::Reload),
        ("init", MetadataCommands::Init),
    ] {
        let cli = Cli::try_parse_from(["tl", "metadata", verb]).unwrap();
        match cli.command {
            Commands::Metadata(args) => assert_eq!(args.command, expected),
            other => panic!("expected metadata command, got {other:?}"),
        }
    }
}

#[test]
fn test_migrate_create_args() {
    let cli = Cli::try_parse_from([
        "tl",
        "migrate",
        "create",
        "add_users",
        "--up-sql",
        "CREATE TABLE users (id INT);",
        "--irreversible",
    ])
    .unwrap();
    match cli.command {
        Commands::Migrate(MigrateArgs {
            command: MigrateCommands::Create(create),
        }) => {
            assert_eq!(create.name, "add_users");
            assert!(create.irreversible);
            assert!(create.down_sql.is_none());
        }
        other => panic!("expected migrate create, got {other:?}"),
    }

    assert!(Cli::try_parse_from([
        "tl",
        "migrate",
        "create",
        "x",
        "--up-sql",
        "SELECT 1;",
        "--sql-from-file",
        "up.sql",
    ])
    .is_err());
}

#[test]
fn test_migrate_squash_requires_from() {
    assert!(Cli::try_parse_from(["tl", "migrate", "squash"]).is_err());
    let cli =
        Cli::try_parse_from(["tl", "migrate", "squash", "--from", "3", "--delete-source"]).unwrap();
    match cli.command {
        Commands::Migrate(MigrateArgs {
            command: MigrateCommands::Squash(squash),
        }) => {
            assert_eq!(squash.from, 3);
            assert_eq!(squash.name, "squashed");
            assert!(squash.delete_source);
        }
        other => panic!("expected migrate squash, got {other:?}"),
    }
}
