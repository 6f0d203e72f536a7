use crate::common::{assert_contains_line, make_temp_dir, normalized_lines, run_with_input, write_valid_config};

#[test]
fn menu_renders_and_quits() {
    let dir = make_temp_dir("autosched-menu");
    write_valid_config(dir.path());

    let output = run_with_input(dir.path(), "8\n");
    assert!(output.status.success());
    let lines = normalized_lines(&output.stdout);
    assert_contains_line(&lines, "A U T O S C H E D");
    assert_contains_line(&lines, "Main Menu");
    assert_contains_line(&lines, "1. Add Activity");
    assert_contains_line(&lines, "5. Dissolve Activity");
    assert_contains_line(&lines, "8. Quit");
}

#[test]
fn exit_keyword_quits_from_anywhere() {
    let dir = make_temp_dir("autosched-exit");
    write_valid_config(dir.path());

    // "1" enters the add-activity flow; "exit" still leaves immediately.
    let output = run_with_input(dir.path(), "1\nexit\n");
    assert!(output.status.success());
}

#[test]
fn invalid_menu_choice_reports_error_and_continues() {
    let dir = make_temp_dir("autosched-badchoice");
    write_valid_config(dir.path());

    let output = run_with_input(dir.path(), "42\n8\n");
    assert!(output.status.success());
    let err_lines = normalized_lines(&output.stderr);
    assert_contains_line(&err_lines, "Unknown choice");
    assert_contains_line(&err_lines, "between 1 and 8");
}

#[test]
fn missing_config_is_created_with_defaults() {
    let dir = make_temp_dir("autosched-initcfg");
    // No config written beforehand.
    let output = run_with_input(dir.path(), "8\n");
    assert!(output.status.success());
    assert!(dir.path().join("config.json").exists());
}

#[test]
fn unreachable_stores_fall_back_with_warnings() {
    let dir = make_temp_dir("autosched-fallback");
    write_valid_config(dir.path());

    let output = run_with_input(dir.path(), "8\n");
    assert!(output.status.success());
    let err_lines = normalized_lines(&output.stderr);
    assert_contains_line(&err_lines, "in-memory graph store");
    assert_contains_line(&err_lines, "in-memory vector store");
    assert_contains_line(&err_lines, "hash embeddings");
}

#[test]
fn file_logging_writes_session_log() {
    let dir = make_temp_dir("autosched-logs");
    write_valid_config(dir.path());

    let output = run_with_input(dir.path(), "1\npaint walls\n\n2\n8\n");
    assert!(output.status.success());
    let logs_dir = dir.path().join("logs");
    assert!(logs_dir.exists());
    let has_log = std::fs::read_dir(&logs_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.file_name().to_string_lossy().starts_with("session-"));
    assert!(has_log, "expected a session-*.log file in {logs_dir:?}");
}
