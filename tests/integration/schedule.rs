use crate::common::{assert_contains_line, make_temp_dir, normalized_lines, run_with_input, write_valid_config};

#[test]
fn add_activities_and_relationship_then_run_schedule() {
    let dir = make_temp_dir("autosched-run");
    write_valid_config(dir.path());

    let script = "\
1\nexcavate\ndig foundations\n4\n\
1\nframe\nframe the structure\n6\n\
3\nexcavate\nframe\nFS\n1\n\
7\n\
8\n";
    let output = run_with_input(dir.path(), script);
    assert!(output.status.success());
    let lines = normalized_lines(&output.stdout);

    assert_contains_line(&lines, "Added activity 'excavate' (4 days).");
    assert_contains_line(&lines, "Added activity 'frame' (6 days).");
    assert_contains_line(&lines, "Added FS relationship 'excavate' -> 'frame' (lag 1 days).");
    assert_contains_line(&lines, "ACTIVITIES");
    assert_contains_line(&lines, "RELATIONSHIPS");
    // 4 + 1 lag + 6 = 11 days end to end.
    assert_contains_line(&lines, "CRITICAL PATH (11 DAYS TOTAL)");
}

#[test]
fn empty_schedule_run_prints_placeholders() {
    let dir = make_temp_dir("autosched-empty");
    write_valid_config(dir.path());

    let output = run_with_input(dir.path(), "7\n8\n");
    assert!(output.status.success());
    let lines = normalized_lines(&output.stdout);
    assert_contains_line(&lines, "No activities yet.");
    assert_contains_line(&lines, "No relationships yet.");
    assert_contains_line(&lines, "The schedule is empty.");
}

#[test]
fn cycle_is_rejected_at_the_shell() {
    let dir = make_temp_dir("autosched-cycle");
    write_valid_config(dir.path());

    let script = "\
1\na\n\n1\n\
1\nb\n\n1\n\
3\na\nb\nFS\n\n\
3\nb\na\nFS\n\n\
8\n";
    let output = run_with_input(dir.path(), script);
    assert!(output.status.success());
    let err_lines = normalized_lines(&output.stderr);
    assert_contains_line(&err_lines, "would create a cycle");
}

#[test]
fn delete_relationship_by_index() {
    let dir = make_temp_dir("autosched-delrel");
    write_valid_config(dir.path());

    let script = "\
1\na\n\n1\n\
1\nb\n\n1\n\
3\na\nb\nSS\n2\n\
4\n1\n\
7\n\
8\n";
    let output = run_with_input(dir.path(), script);
    assert!(output.status.success());
    let lines = normalized_lines(&output.stdout);
    assert_contains_line(&lines, "Deleted Relationship(");
    assert_contains_line(&lines, "No relationships yet.");
}

#[test]
fn dissolve_keeps_neighbors_connected() {
    let dir = make_temp_dir("autosched-dissolve");
    write_valid_config(dir.path());

    let script = "\
1\na\n\n2\n\
1\nmid\n\n3\n\
1\nb\n\n4\n\
3\na\nmid\nFS\n\n\
3\nmid\nb\nFS\n\n\
5\nmid\n\
7\n\
8\n";
    let output = run_with_input(dir.path(), script);
    assert!(output.status.success());
    let lines = normalized_lines(&output.stdout);
    assert_contains_line(
        &lines,
        "Dissolved 'mid': removed 2 relationships, created 1 bridges.",
    );
    // a (2) then b (4) directly: 6 days total.
    assert_contains_line(&lines, "CRITICAL PATH (6 DAYS TOTAL)");
}

#[test]
fn deleting_unknown_activity_reports_not_found() {
    let dir = make_temp_dir("autosched-missing");
    write_valid_config(dir.path());

    let output = run_with_input(dir.path(), "2\nghost\n8\n");
    assert!(output.status.success());
    let err_lines = normalized_lines(&output.stderr);
    assert_contains_line(&err_lines, "Activity 'ghost' not found");
}

#[test]
fn invalid_duration_reports_parse_error() {
    let dir = make_temp_dir("autosched-baddur");
    write_valid_config(dir.path());

    let output = run_with_input(dir.path(), "1\nslab\n\nsoon\n8\n");
    assert!(output.status.success());
    let err_lines = normalized_lines(&output.stderr);
    assert_contains_line(&err_lines, "Invalid number of days: 'soon'.");
}

#[test]
fn invalid_relation_type_lists_valid_ones() {
    let dir = make_temp_dir("autosched-badrel");
    write_valid_config(dir.path());

    let script = "\
1\na\n\n1\n\
1\nb\n\n1\n\
3\na\nb\nXX\n\n\
8\n";
    let output = run_with_input(dir.path(), script);
    assert!(output.status.success());
    let err_lines = normalized_lines(&output.stderr);
    assert_contains_line(&err_lines, "Invalid relationship type: 'XX'. Valid types: FS, SS, FF, SF");
}
