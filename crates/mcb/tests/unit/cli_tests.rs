use std::path::PathBuf;

use clap::Parser;
use mcb::{Cli, Command};
use rstest::rstest;

#[test]
fn config_flag_defaults_to_default_toml() {
    let cli = Cli::parse_from(["mcb", "migrate"]);
    assert_eq!(cli.config, PathBuf::from("config/default.toml"));
}

#[test]
fn config_flag_is_overridable_before_the_subcommand() {
    let cli = Cli::parse_from(["mcb", "--config", "config/staging.toml", "worker"]);
    assert_eq!(cli.config, PathBuf::from("config/staging.toml"));
}

#[test]
fn enqueue_accepts_an_explicit_source_id() {
    let cli = Cli::parse_from(["mcb", "enqueue", "--project", "acme", "--source", "not-a-uuid"]);
    match cli.command {
        Command::Enqueue { project, source } => {
            assert_eq!(project, "acme");
            assert_eq!(source, Some("not-a-uuid".to_owned()));
        }
        _ => panic!("expected enqueue"),
    }
}

#[rstest]
#[case(&["mcb", "migrate"], true)]
#[case(&["mcb", "enqueue", "--project", "acme"], false)]
#[case(&["mcb", "worker"], false)]
fn migrate_is_the_only_subcommand_with_no_required_flags(#[case] argv: &[&str], #[case] expect_ok: bool) {
    let result = Cli::try_parse_from(argv.iter().copied());
    assert_eq!(result.is_ok() && matches!(result.unwrap().command, Command::Migrate), expect_ok);
}
