//! End-to-end tests for the build pipeline.
//!
//! Exercises the full stage sequence (import resolution, nesting
//! flattening, utility generation, vendor prefixing) against real files in
//! a temp directory, including the failure modes that must leave no
//! output behind.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use weft_build::{BuildError, build_stylesheet, run_build};
use weft_config::BuildConfig;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// A blog-theme-shaped fixture: entry importing a base file, a nested
/// hover rule, content markup with utility tokens, and a legacy browser
/// target.
fn fixture(dir: &TempDir) -> (PathBuf, BuildConfig) {
    write(dir, "theme/base.css", ".a { color: red; }\n");
    let entry = write(
        dir,
        "theme/main.css",
        "@import \"base\";\n.b { &:hover { color: blue; } }\n.hero { display: flex; }\n",
    );
    write(
        dir,
        "layouts/index.html",
        "<div class=\"mt-4 mt-999 bg-red\">hello</div>\n",
    );

    let mut config = BuildConfig::default();
    config.content_globs = vec!["layouts/**/*.html".to_string()];
    config.browser_targets = vec!["safari 8".to_string()];
    config.base_dir = Some(dir.path().to_path_buf());
    config
        .design_tokens
        .colors
        .insert("red".to_string(), "#ef4444".to_string());
    (entry, config)
}

#[test]
fn test_worked_example_from_end_to_end() {
    let dir = TempDir::new().unwrap();
    let (entry, config) = fixture(&dir);

    let css = build_stylesheet(&entry, &config).unwrap();

    // Imported content first, in import-statement position
    let a = css.find(".a {\n  color: red;\n}").expect("imported rule");
    let hover = css.find(".b:hover {\n  color: blue;\n}").expect("flattened rule");
    assert!(a < hover);

    // The declaration-free wrapper is not emitted
    assert!(!css.contains(".b {\n}"));

    // Utility generation: recognized token yields a rule, unmatched one is dropped
    assert!(css.contains(".mt-4 {\n  margin-top: 1rem;\n}"));
    assert!(css.contains(".bg-red {\n  background-color: #ef4444;\n}"));
    assert!(!css.contains("mt-999"));

    // Vendor prefixing: legacy variant immediately before the standard one
    let prefixed = css.find("display: -webkit-flex;").expect("vendor variant");
    let standard = css.find("display: flex;").expect("standard declaration");
    assert!(prefixed < standard);
}

#[test]
fn test_repeated_builds_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let (entry, config) = fixture(&dir);

    let first = build_stylesheet(&entry, &config).unwrap();
    let second = build_stylesheet(&entry, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_run_build_writes_artifact_and_reports_summary() {
    let dir = TempDir::new().unwrap();
    let (entry, config) = fixture(&dir);
    let output = dir.path().join("public/css/site.css");

    let summary = run_build(&entry, &output, &config).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(summary.bytes_written, written.len());
    assert_eq!(summary.utility_count, 2); // mt-4 and bg-red
    assert!(summary.rule_count >= 5);
}

#[test]
fn test_failed_build_emits_nothing() {
    let dir = TempDir::new().unwrap();
    let entry = write(&dir, "theme/main.css", "@import \"missing\";\n");
    let output = dir.path().join("public/site.css");

    let err = run_build(&entry, &output, &BuildConfig::default()).unwrap_err();
    assert!(matches!(err, BuildError::ImportNotFound { .. }));
    assert!(!output.exists(), "failed build must not write an artifact");
}

#[test]
fn test_unwritable_output_is_a_write_error() {
    let dir = TempDir::new().unwrap();
    let entry = write(&dir, "theme/main.css", ".a { color: red; }\n");
    // A directory standing where the output file should go
    let output = dir.path().join("site.css");
    fs::create_dir(&output).unwrap();

    let err = run_build(&entry, &output, &BuildConfig::default()).unwrap_err();
    assert!(matches!(err, BuildError::Write { .. }));
}

#[test]
fn test_parse_error_names_file_and_line() {
    let dir = TempDir::new().unwrap();
    let entry = write(&dir, "theme/main.css", ".a {\n  oops\n}\n");

    let err = build_stylesheet(&entry, &BuildConfig::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("main.css"));
    assert!(message.contains(":2:"));
}

#[test]
fn test_configured_library_root_is_fallback() {
    let dir = TempDir::new().unwrap();
    write(&dir, "vendor/css/reset.css", "body { margin: 0; }\n");
    let entry = write(&dir, "theme/main.css", "@import \"reset\";\n");

    let mut config = BuildConfig::default();
    config.search_roots = vec![dir.path().join("vendor/css")];
    let css = build_stylesheet(&entry, &config).unwrap();
    assert!(css.contains("body {\n  margin: 0;\n}"));
}

#[test]
fn test_breakpoint_variant_lands_in_media_block() {
    let dir = TempDir::new().unwrap();
    let entry = write(&dir, "theme/main.css", ".site { color: black; }\n");
    write(&dir, "layouts/post.html", "<p class=\"mt-4-sm\"></p>\n");

    let mut config = BuildConfig::default();
    config.content_globs = vec!["layouts/*.html".to_string()];
    config.base_dir = Some(dir.path().to_path_buf());

    let css = build_stylesheet(&entry, &config).unwrap();
    assert!(css.contains("@media (min-width: 640px) {"));
    assert!(css.contains(".mt-4-sm {\n    margin-top: 1rem;\n  }"));
}

#[test]
fn test_config_load_feeds_pipeline() {
    let dir = TempDir::new().unwrap();
    write(&dir, "theme/main.css", ".site { color: black; }\n");
    write(&dir, "layouts/index.html", "<div class=\"p-2\"></div>\n");
    let config_path = write(
        &dir,
        "weft.yml",
        "entry: theme/main.css\ncontent_globs:\n  - \"layouts/*.html\"\n",
    );

    let config = BuildConfig::load(&config_path).unwrap();
    let entry = config.entry.clone().unwrap();
    assert_eq!(entry, dir.path().join("theme/main.css"));

    let css = build_stylesheet(&entry, &config).unwrap();
    assert!(css.contains(".p-2 {\n  padding: 0.5rem;\n}"));
}

#[test]
fn test_independent_builds_share_nothing() {
    // Two builds over different trees in the same process must not
    // interfere; each constructs its own stylesheet from scratch.
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let entry_a = write(&dir_a, "main.css", ".a { color: red; }\n");
    let entry_b = write(&dir_b, "main.css", ".b { color: blue; }\n");

    let css_a = build_stylesheet(&entry_a, &BuildConfig::default()).unwrap();
    let css_b = build_stylesheet(&entry_b, &BuildConfig::default()).unwrap();
    assert!(css_a.contains(".a") && !css_a.contains(".b"));
    assert!(css_b.contains(".b") && !css_b.contains(".a"));
}

#[test]
fn test_entry_without_imports_round_trips() {
    let dir = TempDir::new().unwrap();
    let source = ".a {\n  color: red;\n}\n\n.b {\n  margin: 0;\n}\n";
    let entry = write(&dir, "main.css", source);

    let css = build_stylesheet(&entry, &BuildConfig::default()).unwrap();
    assert_eq!(css, source);
}
