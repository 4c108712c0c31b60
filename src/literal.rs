use swc_common::{BytePos, Span};
use swc_ecma_ast::{BigInt, Number, Program, Str, Tpl};
use swc_ecma_visit::{Visit, VisitWith};

/// Source range of a literal together with its runtime string value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSpan {
    pub lo: BytePos,
    pub hi: BytePos,
    /// `None` when the cooked value holds a lone surrogate
    pub value: Option<String>,
}

#[derive(Default)]
struct LiteralCollector {
    literals: Vec<LiteralSpan>,
}

impl LiteralCollector {
    fn push(&mut self, span: Span, value: Option<String>) {
        // synthesized nodes carry an empty span
        if span.lo < span.hi {
            self.literals.push(LiteralSpan {
                lo: span.lo,
                hi: span.hi,
                value,
            });
        }
    }
}

impl Visit for LiteralCollector {
    fn visit_str(&mut self, node: &Str) {
        self.push(node.span, node.value.as_str().map(|s| s.to_string()));
    }

    fn visit_number(&mut self, node: &Number) {
        self.push(node.span, Some(format_number(node.value)));
    }

    fn visit_big_int(&mut self, node: &BigInt) {
        self.push(node.span, Some(node.value.to_string()));
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        if !node.exprs.is_empty() {
            node.visit_children_with(self);
            return;
        }
        let cooked = node
            .quasis
            .first()
            .and_then(|quasi| quasi.cooked.as_ref())
            .and_then(|cooked| cooked.as_str())
            .map(|s| s.to_string());
        self.push(node.span, cooked);
    }
}

/// Every string, number and no-substitution template literal in `program`,
/// ordered by position.
pub fn collect_literals(program: &Program) -> Vec<LiteralSpan> {
    let mut collector = LiteralCollector::default();
    program.visit_with(&mut collector);
    let mut literals = collector.literals;
    literals.sort_by_key(|literal| literal.lo);
    literals
}

/// Format a number the way JavaScript's `String(n)` does.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&value.abs()) {
        // shortest round-trip digits, never an exponent
        return value.to_string();
    }
    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}
