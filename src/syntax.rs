use std::fmt;
use std::path::Path;
use swc_common::sync::Lrc;
use swc_common::{BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_parser::error::Error;
use swc_ecma_parser::unstable::{Capturing, Token as SwcToken, TokenAndSpan};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::literal::{collect_literals, LiteralSpan};
use crate::token::{Token, TokenKind};

/// Location and description of the first syntax error in a source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFailure {
    pub line: usize,
    /// 1-based, for editors' click-to-navigate
    pub column: usize,
    pub message: String,
}

impl fmt::Display for SyntaxFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Script flavour a source unit is parsed as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// JavaScript with JSX
    JavaScript,
    TypeScript,
    Tsx,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_lang(extension)
    }

    /// From a file extension or a `<script lang="...">` value
    pub fn from_lang(lang: &str) -> Self {
        match lang.to_ascii_lowercase().as_str() {
            "ts" | "mts" | "cts" => Dialect::TypeScript,
            "tsx" => Dialect::Tsx,
            _ => Dialect::JavaScript,
        }
    }

    fn syntax(self) -> Syntax {
        match self {
            Dialect::TypeScript => Syntax::Typescript(TsSyntax {
                decorators: true,
                ..Default::default()
            }),
            Dialect::Tsx => Syntax::Typescript(TsSyntax {
                tsx: true,
                decorators: true,
                ..Default::default()
            }),
            Dialect::JavaScript => Syntax::Es(EsSyntax {
                jsx: true,
                decorators: true,
                allow_return_outside_function: true,
                ..Default::default()
            }),
        }
    }
}

/// Parse `source` and return the tokens the parser consumed.
///
/// The tokens come from the parser-driven lexer, so regular expressions,
/// JSX text and template parts are classified in context. Literal tokens
/// carry the values of the matching AST nodes. Any syntax error, including
/// one the parser recovered from, fails the whole unit.
pub fn tokenize(source: &str, dialect: Dialect) -> Result<Vec<Token<'_>>, SyntaxFailure> {
    // the source map drops a leading BOM; keep offsets aligned with it
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);

    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Anon.into(), text.to_string());

    let lexer = Lexer::new(
        dialect.syntax(),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(Capturing::new(lexer));

    let program = match parser.parse_program() {
        Ok(program) => program,
        Err(e) => return Err(failure(&cm, &e)),
    };
    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(failure(&cm, &e));
    }

    let captured = parser.input_mut().iter_mut().take();
    let literals = collect_literals(&program);
    Ok(TokenBuilder {
        text,
        cm: &cm,
        start: fm.start_pos,
    }
    .build(&captured, &literals))
}

fn failure(cm: &SourceMap, e: &Error) -> SyntaxFailure {
    let loc = cm.lookup_char_pos(e.span().lo);
    SyntaxFailure {
        line: loc.line,
        column: loc.col_display + 1,
        message: format!("{:?}", e.kind()),
    }
}

/// Maps captured swc tokens onto recognizer tokens
struct TokenBuilder<'a, 'c> {
    text: &'a str,
    cm: &'c SourceMap,
    start: BytePos,
}

impl<'a> TokenBuilder<'a, '_> {
    fn build(&self, captured: &[TokenAndSpan], literals: &[LiteralSpan]) -> Vec<Token<'a>> {
        let mut tokens = Vec::with_capacity(captured.len());
        let mut pending = literals.iter().peekable();
        // end of the literal emitted last; tokens inside it are parts of it
        let mut covered_until = self.start;

        for captured_token in captured {
            let lo = captured_token.span.lo;
            if lo < covered_until {
                continue;
            }
            while pending.next_if(|literal| literal.hi <= lo).is_some() {}

            if let Some(literal) = pending.next_if(|literal| literal.lo <= lo) {
                covered_until = literal.hi;
                tokens.push(Token::new(
                    TokenKind::Literal(literal.value.clone()),
                    self.line(literal.lo),
                ));
                continue;
            }

            let kind = match captured_token.token {
                SwcToken::Plus => TokenKind::Plus,
                SwcToken::LParen => TokenKind::OpenParen,
                token if token.is_word() => TokenKind::Word(self.slice(captured_token.span)),
                _ => TokenKind::Other,
            };
            tokens.push(Token::new(kind, self.line(lo)));
        }
        tokens
    }

    fn line(&self, pos: BytePos) -> usize {
        self.cm.lookup_char_pos(pos).line
    }

    fn slice(&self, span: Span) -> &'a str {
        let from = (span.lo.0 - self.start.0) as usize;
        let to = (span.hi.0 - self.start.0) as usize;
        self.text.get(from..to).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind<'_>> {
        tokenize(source, Dialect::JavaScript)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn literals(source: &str) -> Vec<Option<String>> {
        kinds(source)
            .into_iter()
            .filter_map(|kind| match kind {
                TokenKind::Literal(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_valid_sources_pass() {
        assert!(tokenize("const a = gettext('x');", Dialect::JavaScript).is_ok());
        assert!(tokenize("export default () => <p>{gettext('x')}</p>;", Dialect::JavaScript).is_ok());
        assert!(tokenize("let n: number = ngettext('a', 'b', 2);", Dialect::TypeScript).is_ok());
        assert!(tokenize("const el = <div title={_('x')} />;", Dialect::Tsx).is_ok());
    }

    #[test]
    fn test_broken_source_reports_location() {
        let failure = tokenize("const a = 1;\nconst = gettext('x');", Dialect::JavaScript)
            .unwrap_err();
        assert_eq!(failure.line, 2);
        assert!(failure.column >= 1);
        assert!(!failure.message.is_empty());
    }

    #[test]
    fn test_call_tokens() {
        let tokens = tokenize("a;\ngettext('x' + 1)", Dialect::JavaScript).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::word("a", 1),
                Token::new(TokenKind::Other, 1),
                Token::word("gettext", 2),
                Token::new(TokenKind::OpenParen, 2),
                Token::literal("x", 2),
                Token::new(TokenKind::Plus, 2),
                Token::literal("1", 2),
                Token::new(TokenKind::Other, 2),
            ]
        );
    }

    #[test]
    fn test_literal_values_are_cooked() {
        assert_eq!(
            literals(r#"f("a\nb\t\u{1F600}\x41", 'it\'s', `tplA`)"#),
            vec![
                Some("a\nb\t\u{1F600}A".to_string()),
                Some("it's".to_string()),
                Some("tplA".to_string()),
            ]
        );
        assert_eq!(
            literals("f(0x10, 1_000, 1e21, 10n)"),
            vec![
                Some("16".to_string()),
                Some("1000".to_string()),
                Some("1e+21".to_string()),
                Some("10".to_string()),
            ]
        );
    }

    #[test]
    fn test_lone_surrogate_has_no_value() {
        assert_eq!(literals(r#"f("\uD800")"#), vec![None]);
        assert_eq!(
            literals(r#"f("😀")"#),
            vec![Some("\u{1F600}".to_string())]
        );
    }

    #[test]
    fn test_template_with_substitution_is_not_a_literal() {
        let kinds = kinds("f(`a ${b} c`)");
        assert!(!kinds.iter().any(|kind| matches!(kind, TokenKind::Literal(_))));
        assert!(kinds.contains(&TokenKind::Word("b")));
    }

    #[test]
    fn test_regex_contents_are_one_token() {
        let kinds = kinds("if (ok) /gettext('x')/.test(s);");
        assert!(!kinds.contains(&TokenKind::Word("gettext")));
        assert!(!kinds.iter().any(|kind| matches!(kind, TokenKind::Literal(_))));
    }

    #[test]
    fn test_jsx_text_is_not_lexed_as_script() {
        let tokens = tokenize("<p>Don't {gettext(\"Save\")}</p>", Dialect::JavaScript).unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
        assert!(kinds.contains(&TokenKind::Word("gettext")));
        assert!(kinds.contains(&TokenKind::Literal(Some("Save".to_string()))));
    }

    #[test]
    fn test_leading_bom() {
        let tokens = tokenize("\u{feff}gettext('x')", Dialect::JavaScript).unwrap();
        assert_eq!(tokens[0], Token::word("gettext", 1));
    }

    #[test]
    fn test_dialect_detection() {
        assert_eq!(Dialect::from_path(Path::new("a/b.ts")), Dialect::TypeScript);
        assert_eq!(Dialect::from_path(Path::new("a/b.TSX")), Dialect::Tsx);
        assert_eq!(Dialect::from_path(Path::new("a/b.mjs")), Dialect::JavaScript);
        assert_eq!(Dialect::from_lang("ts"), Dialect::TypeScript);
    }
}
