use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::tempdir;

fn cli_bin() -> &'static str {
    env!("CARGO_BIN_EXE_gettext-turbo")
}

fn run_cli<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Output {
    Command::new(cli_bin())
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("failed to run gettext-turbo")
}

fn write_config(root: &Path) -> PathBuf {
    write_config_with(
        root,
        json!({
            "input": ["src/**/*.{js,ts,vue}"],
            "output": "po/messages.pot"
        }),
    )
}

fn write_config_with(root: &Path, config: Value) -> PathBuf {
    let config_path = root.join("gettext-turbo.json");
    fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    config_path
}

fn write_source(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn extract_creates_pot_file() {
    let tmp = tempdir().unwrap();
    let project = tmp.path();
    write_source(
        project,
        "src/app.js",
        r#"import { gettext, ngettext } from './i18n';
console.log(gettext('Hello world'));
console.log(ngettext('One item', '%d items', count));
"#,
    );
    let config_path = write_config(project);

    let output = run_cli(
        project,
        &["--config", config_path.to_str().unwrap(), "extract"],
    );
    assert_success(&output);

    let pot = fs::read_to_string(project.join("po/messages.pot")).unwrap();
    assert!(pot.starts_with("msgid \"\"\nmsgstr \"\"\n\"MIME-Version: 1.0\\n\"\n"));
    assert!(pot.contains("\"Language: C\\n\"\n"));
    assert!(pot.contains("#: src/app.js:2\nmsgid \"Hello world\"\nmsgstr \"\"\n"));
    assert!(pot.contains(
        "#: src/app.js:3\nmsgid \"One item\"\nmsgid_plural \"%d items\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n"
    ));
}

#[test]
fn extract_uses_default_config_file() {
    let tmp = tempdir().unwrap();
    let project = tmp.path();
    write_source(project, "src/a.js", "pgettext('menu', 'Open');\n");
    write_config(project);

    let output = run_cli(project, &["extract"]);
    assert_success(&output);

    let pot = fs::read_to_string(project.join("po/messages.pot")).unwrap();
    assert!(pot.contains("#: src/a.js:1\nmsgctxt \"menu\"\nmsgid \"Open\"\n"));
}

#[test]
fn extract_output_flag_overrides_config() {
    let tmp = tempdir().unwrap();
    let project = tmp.path();
    write_source(project, "src/a.js", "gettext('x');\n");
    write_config(project);

    let output = run_cli(project, &["extract", "--output", "out/nested/app.pot"]);
    assert_success(&output);

    assert!(project.join("out/nested/app.pot").exists());
    assert!(!project.join("po/messages.pot").exists());
}

#[test]
fn extract_skips_malformed_file() {
    let tmp = tempdir().unwrap();
    let project = tmp.path();
    write_source(project, "src/good.js", "gettext('Kept');\n");
    write_source(project, "src/bad.js", "gettext('Dropped');\nconst = ;\n");
    write_config(project);

    let output = run_cli(project, &["extract"]);
    assert_success(&output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parse error in src/bad.js:2:"), "stderr: {}", stderr);

    let pot = fs::read_to_string(project.join("po/messages.pot")).unwrap();
    assert!(pot.contains("msgid \"Kept\""));
    assert!(!pot.contains("Dropped"));
}

#[test]
fn extract_fail_on_skipped_returns_error_after_writing() {
    let tmp = tempdir().unwrap();
    let project = tmp.path();
    write_source(project, "src/good.js", "gettext('Kept');\n");
    write_source(project, "src/bad.js", "function (\n");
    write_config(project);

    let output = run_cli(project, &["extract", "--fail-on-skipped"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--fail-on-skipped"), "stderr: {}", stderr);

    let pot = fs::read_to_string(project.join("po/messages.pot")).unwrap();
    assert!(pot.contains("msgid \"Kept\""));
}

#[test]
fn extract_rejects_ambiguous_function_names() {
    let tmp = tempdir().unwrap();
    let project = tmp.path();
    write_source(project, "src/a.js", "tr('x');\n");
    write_config_with(
        project,
        json!({
            "input": ["src/**/*.js"],
            "functions": { "plain": ["tr"], "plural": ["tr"] }
        }),
    );

    let output = run_cli(project, &["extract"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tr"), "stderr: {}", stderr);
    assert!(!project.join("messages.pot").exists());
}

#[test]
fn extract_markup_and_ignore_patterns() {
    let tmp = tempdir().unwrap();
    let project = tmp.path();
    write_source(
        project,
        "src/App.vue",
        "<template>\n  <h1 v-translate translate-context=\"title\">Dashboard</h1>\n  <p>{{ $gettext('Summary') }}</p>\n</template>\n",
    );
    write_source(project, "src/vendor/lib.js", "gettext('Vendor');\n");
    write_config_with(
        project,
        json!({
            "input": ["src/**/*.{js,vue}"],
            "ignore": ["**/vendor/**"]
        }),
    );

    let output = run_cli(project, &["--log-level", "warn", "extract"]);
    assert_success(&output);
    assert!(output.stdout.is_empty());

    let pot = fs::read_to_string(project.join("messages.pot")).unwrap();
    assert!(pot.contains("#: src/App.vue:2\nmsgctxt \"title\"\nmsgid \"Dashboard\"\n"));
    assert!(pot.contains("#: src/App.vue:3\nmsgid \"Summary\"\n"));
    assert!(!pot.contains("Vendor"));
}
