//! End-to-end behavior of `AnchoredEditor` against real files.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use anchor_edit::{AnchoredEditor, EditError, MatchMode};

fn fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_unique_anchor_is_replaced() {
    let dir = TempDir::new().unwrap();
    let original = "def add(a, b):\n    return a + b\n\n\ndef sub(a, b):\n    return a - b\n";
    let path = fixture(&dir, "calc.py", original);
    let mut editor = AnchoredEditor::default();

    let result = editor
        .search_and_replace(&path, "return a + b", "return a * b", MatchMode::Strict, false)
        .unwrap();

    assert!(result.success);
    assert!(result.valid);
    assert_eq!(result.line, Some(2));
    assert_eq!(result.lines_changed, 1);
    assert_eq!(result.old_preview, "return a + b");
    assert_eq!(result.new_preview, "return a * b");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        original.replace("return a + b", "return a * b")
    );
}

#[test]
fn test_duplicate_anchor_is_rejected() {
    let dir = TempDir::new().unwrap();
    let original = "print('hello')\nx = 1\nprint('hello')\n";
    let path = fixture(&dir, "greet.py", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "print('hello')", "print('bye')", MatchMode::Strict, false)
        .unwrap_err();

    assert!(matches!(err, EditError::Ambiguous { match_count: 2, .. }));
    assert!(err.to_string().contains("found 2 times"));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert!(editor.get_history(None).is_empty());
}

#[test]
fn test_missing_anchor_is_rejected() {
    let dir = TempDir::new().unwrap();
    let original = "x = 1\n";
    let path = fixture(&dir, "m.py", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "y = 2", "y = 3", MatchMode::Strict, false)
        .unwrap_err();

    assert_eq!(err.match_count(), Some(0));
    assert!(err.to_string().contains("y = 2"));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_python_syntax_error_is_reverted() {
    let dir = TempDir::new().unwrap();
    let original = "def f(a, b):\n    return a + b\n";
    let path = fixture(&dir, "f.py", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "def f(a, b):", "def f(a, b)", MatchMode::Strict, false)
        .unwrap_err();

    match &err {
        EditError::ValidationFailed { reason, .. } => assert!(reason.contains("line"), "{reason}"),
        other => panic!("Expected EditError::ValidationFailed, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert!(editor.get_history(None).is_empty());
}

#[test]
fn test_json_trailing_comma_is_reverted() {
    let dir = TempDir::new().unwrap();
    let original = r#"{"value": 123}"#;
    let path = fixture(&dir, "data.json", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, r#""value": 123"#, r#""value": 123,"#, MatchMode::Strict, false)
        .unwrap_err();

    assert!(matches!(err, EditError::ValidationFailed { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_brace_imbalance_is_reverted() {
    let dir = TempDir::new().unwrap();
    let original = "fn main() {\n    println!(\"hi\");\n}\n";
    let path = fixture(&dir, "main.rs", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "println!(\"hi\");\n}", "println!(\"hi\");", MatchMode::Strict, false)
        .unwrap_err();

    assert!(err.to_string().contains("unclosed '{'"), "{err}");
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_yaml_breakage_is_reverted() {
    let dir = TempDir::new().unwrap();
    let original = "services:\n  web:\n    image: nginx\n";
    let path = fixture(&dir, "compose.yml", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "image: nginx", "image: [nginx", MatchMode::Strict, false)
        .unwrap_err();

    assert!(matches!(err, EditError::ValidationFailed { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_emptying_unknown_file_is_reverted() {
    let dir = TempDir::new().unwrap();
    let original = "only line";
    let path = fixture(&dir, "notes.txt", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "only line", "", MatchMode::Strict, false)
        .unwrap_err();

    assert!(err.to_string().contains("corruption"));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_noop_is_rejected_without_writing() {
    let dir = TempDir::new().unwrap();
    let original = "x = 1\n";
    let path = fixture(&dir, "m.py", original);
    let modified_before = fs::metadata(&path).unwrap().modified().unwrap();
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "x = 1", "x = 1", MatchMode::Strict, false)
        .unwrap_err();

    assert!(matches!(err, EditError::NoOp { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified_before);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(dir.path().join("absent.py"), "a", "b", MatchMode::Strict, false)
        .unwrap_err();

    assert!(matches!(err, EditError::FileNotFound(_)));
}

#[test]
fn test_undo_restores_original_bytes() {
    let dir = TempDir::new().unwrap();
    let original = "def f(a, b):\r\n    return a + b\r\n";
    let path = fixture(&dir, "f.py", original);
    let mut editor = AnchoredEditor::default();

    editor
        .search_and_replace(&path, "a + b", "a - b", MatchMode::Strict, false)
        .unwrap();
    assert_ne!(fs::read_to_string(&path).unwrap(), original);

    let undone = editor.undo_last().unwrap().expect("an edit to undo");

    assert!(undone.success);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert!(editor.get_history(None).is_empty());
    assert!(editor.undo_last().unwrap().is_none());
}

#[test]
fn test_undo_refuses_after_external_change() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "f.py", "x = 1\n");
    let mut editor = AnchoredEditor::default();

    editor
        .search_and_replace(&path, "x = 1", "x = 2", MatchMode::Strict, false)
        .unwrap();
    fs::write(&path, "x = 2\ny = 3\n").unwrap();

    let err = editor.undo_last().unwrap_err();

    assert!(matches!(err, EditError::StaleUndo { .. }));
    assert!(err.to_string().contains("changed since edit"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "x = 2\ny = 3\n");
    assert_eq!(editor.get_history(None).len(), 1);
}

#[test]
fn test_undo_walks_back_through_history() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "n.json", r#"{"n": 1}"#);
    let mut editor = AnchoredEditor::default();

    editor
        .search_and_replace(&path, "1", "2", MatchMode::Strict, false)
        .unwrap();
    editor
        .search_and_replace(&path, "2", "3", MatchMode::Strict, false)
        .unwrap();

    editor.undo_last().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"n": 2}"#);
    editor.undo_last().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"n": 1}"#);
}

#[test]
fn test_history_and_clear() {
    let dir = TempDir::new().unwrap();
    let a = fixture(&dir, "a.txt", "alpha");
    let b = fixture(&dir, "b.txt", "beta");
    let mut editor = AnchoredEditor::default();

    editor.search_and_replace(&a, "alpha", "ALPHA", MatchMode::Strict, false).unwrap();
    editor.search_and_replace(&b, "beta", "BETA", MatchMode::Strict, false).unwrap();

    let a_key = a.display().to_string();
    let a_history = editor.get_history(Some(&a_key));
    assert_eq!(a_history.len(), 1);
    assert_eq!(a_history[0].find_block, "alpha");
    assert_eq!(a_history[0].new_content, "ALPHA");
    assert_eq!(editor.get_history(None).len(), 2);

    editor.clear_history();
    assert!(editor.get_history(None).is_empty());
    assert!(editor.undo_last().unwrap().is_none());
}

#[test]
fn test_editors_do_not_share_history() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "a.txt", "one");
    let mut first = AnchoredEditor::default();
    let mut second = AnchoredEditor::default();

    first.search_and_replace(&path, "one", "two", MatchMode::Strict, false).unwrap();

    assert_eq!(first.get_history(None).len(), 1);
    assert!(second.get_history(None).is_empty());
    assert!(second.undo_last().unwrap().is_none());
}

#[test]
fn test_fuzzy_anchor_tolerates_whitespace_drift() {
    let dir = TempDir::new().unwrap();
    let original = "class A:\n\tdef f(self):   \n\t\treturn 1\n";
    let path = fixture(&dir, "a.py", original);
    let mut editor = AnchoredEditor::default();

    let strict = editor.search_and_replace(
        &path,
        "    def f(self):\n        return 1",
        "    def f(self):\n        return 2",
        MatchMode::Strict,
        false,
    );
    assert!(strict.unwrap_err().is_ambiguous());

    editor
        .search_and_replace(
            &path,
            "    def f(self):\n        return 1",
            "\tdef f(self):\n\t\treturn 2",
            MatchMode::Fuzzy,
            false,
        )
        .unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "class A:\n\tdef f(self):\n\t\treturn 2\n"
    );
}

#[test]
fn test_fuzzy_block_ending_in_newline_keeps_line_structure() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "m.py", "a = 1\nx = 1\nb = 2\n");
    let mut editor = AnchoredEditor::default();

    let result = editor
        .search_and_replace(&path, "x = 1\n", "x = 2\n", MatchMode::Fuzzy, false)
        .unwrap();

    assert_eq!(result.lines_changed, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\nx = 2\nb = 2\n");
}

#[test]
fn test_fuzzy_block_ending_in_newline_over_crlf() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "m.py", "a = 1\r\n\tx = 1\r\nb = 2\r\n");
    let mut editor = AnchoredEditor::default();

    editor
        .search_and_replace(&path, "    x = 1\n", "\tx = 2\r\n", MatchMode::Fuzzy, false)
        .unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\r\n\tx = 2\r\nb = 2\r\n");
}

#[test]
fn test_fuzzy_anchor_matching_twice_is_rejected() {
    let dir = TempDir::new().unwrap();
    let original = "max = 1\ny = 2\n\n  x = 1\n  y = 2\n";
    let path = fixture(&dir, "m.py", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "x = 1\ny = 2", "x = 9\ny = 9", MatchMode::Fuzzy, false)
        .unwrap_err();

    assert!(err.is_ambiguous(), "{err}");
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert!(editor.get_history(None).is_empty());
}

#[test]
fn test_overlapping_anchor_is_rejected() {
    let dir = TempDir::new().unwrap();
    let original = "fn f() {\n    if x {\n        g();\n    }\n}\n}\n";
    let path = fixture(&dir, "f.rs", original);
    let mut editor = AnchoredEditor::default();

    let err = editor
        .search_and_replace(&path, "}\n}", "}", MatchMode::Strict, false)
        .unwrap_err();

    assert!(matches!(err, EditError::Ambiguous { match_count: 2, .. }), "{err}");
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_validate_anchor_uses_requested_mode() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "m.py", "if x:\r\n\tpass\r\n");
    let editor = AnchoredEditor::default();

    let (strict_ok, _) = editor.validate_anchor_with_mode(&path, "if x:\n    pass", MatchMode::Strict);
    let (fuzzy_ok, message) = editor.validate_anchor_with_mode(&path, "if x:\n    pass", MatchMode::Fuzzy);

    assert!(!strict_ok);
    assert!(fuzzy_ok, "{message}");
}
