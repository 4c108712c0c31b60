use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::catalog::{Catalog, CatalogMessage, CHARSET, LANGUAGE, PLURAL_FORMS};
use crate::fs::FileSystem;

/// `YYYY-MM-DD HH:MM+ZZZZ`, the date format gettext tools write
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M%z";

/// Header fields in output order
pub fn header_fields(catalog: &Catalog) -> Vec<(&'static str, String)> {
    let date = catalog.headers.created_at.format(DATE_FORMAT).to_string();
    vec![
        ("MIME-Version", "1.0".to_string()),
        ("Content-Type", format!("text/plain; charset={}", CHARSET)),
        ("Content-Transfer-Encoding", "8bit".to_string()),
        ("POT-Creation-Date", date.clone()),
        ("PO-Revision-Date", date),
        ("Language", LANGUAGE.to_string()),
        ("Plural-Forms", PLURAL_FORMS.to_string()),
    ]
}

/// Render the whole template.
pub fn render(catalog: &Catalog) -> String {
    let mut out = String::new();

    let header: String = header_fields(catalog)
        .into_iter()
        .map(|(name, value)| format!("{}: {}\n", name, value))
        .collect();
    write_keyword(&mut out, "msgid", "");
    write_keyword(&mut out, "msgstr", &header);

    for message in catalog.messages() {
        out.push('\n');
        render_message(&mut out, &message);
    }
    out
}

fn render_message(out: &mut String, message: &CatalogMessage<'_>) {
    for reference in &message.entry.references {
        let _ = writeln!(out, "#: {}", reference);
    }
    if !message.msgctxt.is_empty() {
        write_keyword(out, "msgctxt", message.msgctxt);
    }
    write_keyword(out, "msgid", message.msgid);
    match &message.entry.msgid_plural {
        Some(plural) => {
            write_keyword(out, "msgid_plural", plural);
            write_keyword(out, "msgstr[0]", "");
            write_keyword(out, "msgstr[1]", "");
        }
        None => write_keyword(out, "msgstr", ""),
    }
}

/// `keyword "value"`, or `keyword ""` plus one line per `\n`-terminated
/// chunk for multi-line values.
fn write_keyword(out: &mut String, keyword: &str, value: &str) {
    let multiline = value
        .find('\n')
        .is_some_and(|index| index + 1 < value.len());
    if !multiline {
        let _ = writeln!(out, "{} \"{}\"", keyword, escape(value));
        return;
    }
    let _ = writeln!(out, "{} \"\"", keyword);
    for chunk in value.split_inclusive('\n') {
        let _ = writeln!(out, "\"{}\"", escape(chunk));
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render the catalog and atomically replace `path` with it.
pub fn write<F: FileSystem>(catalog: &Catalog, path: &Path, fs: &F) -> Result<()> {
    let contents = render(catalog);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs.write_atomic(path, &contents)
        .with_context(|| format!("Failed to write catalog: {}", path.display()))
}
