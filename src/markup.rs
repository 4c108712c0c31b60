use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use crate::recognizer::ExtractedUnit;
use crate::syntax::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// `<script>` body, parsed as a whole program
    Script(Dialect),
    /// Interpolation or directive value
    Expression,
}

/// Script source embedded in markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptFragment<'a> {
    pub text: &'a str,
    /// Line of the fragment's first character in the enclosing file
    pub line: usize,
    pub kind: FragmentKind,
}

/// Everything found in one markup source
#[derive(Debug, Default)]
pub struct MarkupScan<'a> {
    pub fragments: Vec<ScriptFragment<'a>>,
    pub messages: Vec<ExtractedUnit>,
}

static SCRIPT_REGEX: OnceLock<Regex> = OnceLock::new();
static INTERPOLATION_REGEX: OnceLock<Regex> = OnceLock::new();
static DIRECTIVE_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
static START_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static TRANSLATE_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();

/// `<script ...>body</script>`: group 1 = attributes, group 2 = body
fn script_regex() -> &'static Regex {
    SCRIPT_REGEX.get_or_init(|| {
        Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>")
            .expect("SCRIPT_REGEX pattern is invalid - this is a bug")
    })
}

/// `{{ expression }}`, capturing the expression
fn interpolation_regex() -> &'static Regex {
    INTERPOLATION_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\{\{(.*?)\}\}")
            .expect("INTERPOLATION_REGEX pattern is invalid - this is a bug")
    })
}

/// Directive or binding attributes whose values are script:
/// `v-text="..."`, `:title="..."`, `@click='...'`, `v-bind:alt="..."`
fn directive_attr_regex() -> &'static Regex {
    DIRECTIVE_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"\s(?:v-[\w:.\-\[\]]+|[:@][\w.\-\[\]]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("DIRECTIVE_ATTR_REGEX pattern is invalid - this is a bug")
    })
}

/// Any start tag: group 1 = tag name, group 2 = attributes
fn start_tag_regex() -> &'static Regex {
    START_TAG_REGEX.get_or_init(|| {
        Regex::new(r#"<([a-zA-Z][\w\-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("START_TAG_REGEX pattern is invalid - this is a bug")
    })
}

/// Bare `translate` / `v-translate` attribute (not `translate-context` etc.)
fn translate_attr_regex() -> &'static Regex {
    TRANSLATE_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)(?:v-)?translate(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+))?(?:\s|/|$)"#)
            .expect("TRANSLATE_ATTR_REGEX pattern is invalid - this is a bug")
    })
}

fn comment_regex() -> &'static Regex {
    COMMENT_REGEX.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->").expect("COMMENT_REGEX pattern is invalid - this is a bug")
    })
}

/// Start or end tag: group 1 = `/` for end tags, group 2 = tag name
fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| {
        Regex::new(r"<(/?)([a-zA-Z][\w\-]*)\b[^>]*>")
            .expect("TAG_REGEX pattern is invalid - this is a bug")
    })
}

/// Quoted `name="value"` pair: group 1 = name, group 2 or 3 = value
fn attribute_regex() -> &'static Regex {
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"(?:^|\s)([\w:@.\-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("ATTRIBUTE_REGEX pattern is invalid - this is a bug")
    })
}

/// Precomputed line starts for offset → line lookups
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }
}

fn overlaps(range: &Range<usize>, excluded: &[Range<usize>]) -> bool {
    excluded
        .iter()
        .any(|ex| range.start < ex.end && ex.start < range.end)
}

/// Scan a markup source for script fragments and directly marked messages.
pub fn scan(source: &str) -> MarkupScan<'_> {
    let index = LineIndex::new(source);
    let mut scan = MarkupScan::default();

    let comments: Vec<Range<usize>> = comment_regex().find_iter(source).map(|m| m.range()).collect();

    // script bodies are opaque to the markup rules below
    let mut scripts: Vec<Range<usize>> = Vec::new();
    for caps in script_regex().captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        if overlaps(&whole.range(), &comments) {
            continue;
        }
        scripts.push(whole.range());
        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let Some(dialect) = script_dialect(attrs) else {
            continue;
        };
        if let Some(body) = caps.get(2) {
            scan.fragments.push(ScriptFragment {
                text: body.as_str(),
                line: index.line_of(body.start()),
                kind: FragmentKind::Script(dialect),
            });
        }
    }
    let mut excluded = comments;
    excluded.extend(scripts);

    for caps in interpolation_regex().captures_iter(source) {
        let Some(expr) = caps.get(1) else { continue };
        if overlaps(&expr.range(), &excluded) {
            continue;
        }
        scan.fragments.push(ScriptFragment {
            text: expr.as_str(),
            line: index.line_of(expr.start()),
            kind: FragmentKind::Expression,
        });
    }

    for tag in start_tag_regex().captures_iter(source) {
        let (Some(whole), Some(name)) = (tag.get(0), tag.get(1)) else {
            continue;
        };
        if overlaps(&whole.range(), &excluded) {
            continue;
        }
        let attrs = tag.get(2).map(|m| m.as_str()).unwrap_or("");

        for caps in directive_attr_regex().captures_iter(attrs) {
            if let Some(value) = caps.get(1).or_else(|| caps.get(2)) {
                let offset = tag.get(2).map(|m| m.start()).unwrap_or(0) + value.start();
                scan.fragments.push(ScriptFragment {
                    text: value.as_str(),
                    line: index.line_of(offset),
                    kind: FragmentKind::Expression,
                });
            }
        }

        let tag_name = name.as_str();
        let marked = tag_name.eq_ignore_ascii_case("translate")
            || translate_attr_regex().is_match(attrs);
        if !marked || attrs.trim_end().ends_with('/') {
            continue;
        }
        let Some(inner) = element_inner_text(source, tag_name, whole.end()) else {
            continue;
        };
        let msgid = normalize_text(inner);
        if msgid.is_empty() {
            continue;
        }
        let mut unit = ExtractedUnit::new(msgid, index.line_of(whole.start()));
        if let Some(context) = attribute_value(attrs, "translate-context") {
            unit = unit.with_context(decode_entities(&context));
        }
        if let Some(plural) = attribute_value(attrs, "translate-plural") {
            unit = unit.with_plural(decode_entities(&plural));
        }
        scan.messages.push(unit);
    }

    scan.fragments.sort_by_key(|fragment| fragment.line);
    scan
}

/// Dialect of a `<script>` block, `None` for non-script types like templates or JSON
fn script_dialect(attrs: &str) -> Option<Dialect> {
    if let Some(kind) = attribute_value(attrs, "type") {
        let kind = kind.trim().to_ascii_lowercase();
        let is_script = kind.is_empty()
            || kind == "module"
            || kind == "text/babel"
            || kind.ends_with("/javascript")
            || kind.ends_with("/ecmascript")
            || kind.ends_with("/typescript");
        if !is_script {
            return None;
        }
    }
    Some(
        attribute_value(attrs, "lang")
            .map(|lang| Dialect::from_lang(lang.trim()))
            .unwrap_or(Dialect::JavaScript),
    )
}

/// Text between the end of a start tag and its matching end tag,
/// accounting for nested elements with the same name.
fn element_inner_text<'a>(source: &'a str, tag_name: &str, content_start: usize) -> Option<&'a str> {
    let rest = &source[content_start..];
    let mut depth = 1usize;
    for caps in tag_regex().captures_iter(rest) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if !name.as_str().eq_ignore_ascii_case(tag_name) {
            continue;
        }
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some(&rest[..whole.start()]);
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

/// Read `name="value"` or `name='value'` from an attribute list
fn attribute_value(attrs: &str, name: &str) -> Option<String> {
    attribute_regex().captures_iter(attrs).find_map(|caps| {
        let matches_name = caps
            .get(1)
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case(name));
        if !matches_name {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
    })
}

/// Trim, collapse whitespace runs and decode the common entities
fn normalize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    decode_entities(&collapsed)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_fragment_with_line() {
        let source = "<div>\n</div>\n<script>\nconst a = $gettext('x');\n</script>\n";
        let scan = scan(source);
        assert_eq!(scan.fragments.len(), 1);
        assert_eq!(scan.fragments[0].line, 3);
        assert_eq!(
            scan.fragments[0].kind,
            FragmentKind::Script(Dialect::JavaScript)
        );
        assert!(scan.fragments[0].text.contains("$gettext('x')"));
    }

    #[test]
    fn test_script_lang_and_type() {
        let source = "<script lang=\"ts\">let a: number = 1;</script>\n\
                      <script type=\"text/x-template\"><p>{{ x }}</p></script>\n\
                      <script type=\"module\">go()</script>";
        let kinds: Vec<_> = scan(source).fragments.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FragmentKind::Script(Dialect::TypeScript),
                FragmentKind::Script(Dialect::JavaScript),
            ]
        );
    }

    #[test]
    fn test_interpolation_and_bindings() {
        let source = "<p>{{ $gettext('Hello') }}</p>\n<img :alt=\"$gettext('Logo')\" @click='go()'>";
        let scan = scan(source);
        let texts: Vec<_> = scan.fragments.iter().map(|f| (f.text.trim(), f.line)).collect();
        assert_eq!(
            texts,
            vec![
                ("$gettext('Hello')", 1),
                ("$gettext('Logo')", 2),
                ("go()", 2)
            ]
        );
        assert!(scan
            .fragments
            .iter()
            .all(|f| f.kind == FragmentKind::Expression));
    }

    #[test]
    fn test_attribute_value_matches_whole_name() {
        let attrs = r#" translate-context-extra="no" translate-context='menu'"#;
        assert_eq!(attribute_value(attrs, "translate-context"), Some("menu".to_string()));
        assert_eq!(attribute_value(attrs, "lang"), None);
    }

    #[test]
    fn test_translate_attribute() {
        let source = "<p>\n  <span v-translate translate-context=\"menu\">\n    Open   file\n  </span>\n</p>";
        let scan = scan(source);
        assert_eq!(
            scan.messages,
            vec![ExtractedUnit::new("Open file", 2).with_context("menu")]
        );
    }

    #[test]
    fn test_translate_tag_with_plural() {
        let source = r#"<translate translate-plural="%{n} apples">An apple &amp; more</translate>"#;
        let scan = scan(source);
        assert_eq!(
            scan.messages,
            vec![ExtractedUnit::new("An apple & more", 1).with_plural("%{n} apples")]
        );
    }

    #[test]
    fn test_nested_same_name_elements() {
        let source = "<div translate>Outer <div>inner</div> text</div>";
        let scan = scan(source);
        assert_eq!(scan.messages[0].msgid, "Outer <div>inner</div> text");
    }

    #[test]
    fn test_other_tags_do_not_end_the_element() {
        let source = "<p translate>One <span>two</span> <br/> three</p><p>after</p>";
        assert_eq!(scan(source).messages[0].msgid, "One <span>two</span> <br/> three");
    }

    #[test]
    fn test_unclosed_marked_element_is_ignored() {
        assert!(scan("<p translate>never closed").messages.is_empty());
    }

    #[test]
    fn test_context_attribute_alone_is_not_a_marker() {
        let scan = scan(r#"<span translate-context="x">Nope</span>"#);
        assert!(scan.messages.is_empty());
    }

    #[test]
    fn test_comments_and_scripts_are_ignored_for_markup_rules() {
        let source = "<!-- <p translate>Old</p> {{ $gettext('old') }} -->\n<script>const s = '<b translate>no</b>';</script>";
        let scan = scan(source);
        assert!(scan.messages.is_empty());
        assert_eq!(scan.fragments.len(), 1);
        assert_eq!(scan.fragments[0].line, 2);
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("a\nb\n\nc");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(4), 3);
        assert_eq!(index.line_of(5), 4);
    }
}
