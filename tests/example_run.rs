//! Integration tests for the `example run` command.
use powerpath::cli::RunOpts;
use powerpath::cli::example::handle_example_run_command;
use powerpath::settings::Settings;
use std::collections::HashMap;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("POWERPATH_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        ..Default::default()
    };
    handle_example_run_command("national", &opts, Some(Settings::default())).unwrap();

    let mut reader = csv::Reader::from_path(tempdir.path().join("scenario_comparison.csv")).unwrap();
    let rows: Vec<HashMap<String, String>> = reader.deserialize().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 16);

    let status = |scenario: &str| {
        rows.iter()
            .find(|row| row["scenario"] == scenario)
            .map(|row| row["status"].clone())
            .unwrap()
    };
    assert_eq!(status("REN30_BAU"), "optimal");
    assert_eq!(status("REN70_HEG"), "failed");
}
