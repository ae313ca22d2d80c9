use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use treedump::{dump_tree, load_rules, relative_posix, validate_root, walk_tree};

// Helper function to create a temporary directory structure for testing
fn create_test_directory(rules: &str, files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();

    fs::write(dir.path().join(".gitignore"), rules).unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("contents of {file}\n")).unwrap();
    }

    dir
}

fn emitted(root: &Path, exclude: &[PathBuf]) -> Vec<String> {
    let root = validate_root(root).unwrap();
    let rules = load_rules(&root);

    let mut seen = Vec::new();
    walk_tree(&root, &rules, exclude, |p| seen.push(relative_posix(&root, p)));
    seen
}

#[test]
fn test_negation_keeps_one_log() {
    let dir = create_test_directory("*.log\n!keep.log\n", &["a.log", "keep.log", "b.txt"]);

    let seen = emitted(dir.path(), &[]);

    // The rules file itself is a regular, non-ignored file
    assert_eq!(seen, [".gitignore", "b.txt", "keep.log"]);
}

#[test]
fn test_ignored_directory_is_pruned_entirely() {
    let dir = create_test_directory(
        "node_modules/\n!*.md\n",
        &[
            "node_modules/pkg/index.js",
            "node_modules/README.md",
            "node_modules/deep/er/file.txt",
            "src/app.js",
        ],
    );

    let seen = emitted(dir.path(), &[]);

    assert!(
        seen.iter().all(|p| !p.starts_with("node_modules")),
        "nothing under node_modules should be emitted, got {seen:?}"
    );
    assert!(seen.contains(&"src/app.js".to_string()));
}

#[test]
fn test_self_path_is_never_emitted() {
    let dir = create_test_directory("", &["treedump", "notes.txt"]);
    let self_path = dir.path().join("treedump");

    let seen = emitted(dir.path(), &[self_path]);

    assert_eq!(seen, [".gitignore", "notes.txt"]);
}

#[test]
fn test_missing_rules_file_ignores_nothing() {
    let dir = create_test_directory("", &["a.log", "dir/b.log"]);
    fs::remove_file(dir.path().join(".gitignore")).unwrap();

    let seen = emitted(dir.path(), &[]);

    assert_eq!(seen, ["a.log", "dir/b.log"]);
}

#[test]
fn test_anchored_and_nested_rules() {
    let dir = create_test_directory(
        "/build\ndocs/**/draft.md\n",
        &[
            "build/out.bin",
            "src/build/keep.rs",
            "docs/draft.md",
            "docs/a/b/draft.md",
            "docs/final.md",
        ],
    );

    let seen = emitted(dir.path(), &[]);

    assert_eq!(
        seen,
        [".gitignore", "docs/final.md", "src/build/keep.rs"]
    );
}

#[test]
fn test_dump_output_format() {
    let dir = create_test_directory("*.tmp\n", &["x.tmp", "y.txt"]);
    let root = validate_root(dir.path()).unwrap();
    let rules = load_rules(&root);

    let mut buf = Vec::new();
    let stats = dump_tree(&root, &rules, &[], &mut buf, &ProgressBar::hidden()).unwrap();

    let expected = format!(
        "{g}\n```\n*.tmp\n```\n\n{y}\n```\ncontents of y.txt\n```\n\n",
        g = root.join(".gitignore").display(),
        y = root.join("y.txt").display(),
    );
    assert_eq!(String::from_utf8(buf).unwrap(), expected);
    assert_eq!(stats.files_written, 2);
    assert_eq!(stats.read_errors, 0);
}
