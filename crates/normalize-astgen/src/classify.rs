//! Field classification: does a field hold child nodes a traversal must visit?
//!
//! Classification works on the raw type expression text. No type is resolved
//! beyond knowing which names are enums (literal unions) and which extra names
//! are configured as scalars.

use crate::ir::DeclKind;
use crate::table::DeclarationTable;
use serde::Serialize;
use std::collections::HashSet;

/// Built-in scalar keywords. A field typed with one of these is never visited.
pub const SCALAR_KEYWORDS: &[&str] = &[
    "string",
    "number",
    "boolean",
    "bigint",
    "symbol",
    "null",
    "undefined",
    "void",
    "any",
    "unknown",
    "never",
    "object",
];

/// Category of a field's type expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    Primitive,
    LiteralUnion,
    NestedReference,
}

impl FieldClass {
    pub fn is_nested(self) -> bool {
        self == FieldClass::NestedReference
    }
}

/// Classifies type expressions against a set of known scalar and enum names.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    scalars: HashSet<String>,
    literal_aliases: HashSet<String>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat these names as scalars in addition to [`SCALAR_KEYWORDS`].
    pub fn with_scalars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scalars.extend(names.into_iter().map(Into::into));
        self
    }

    /// Treat these names as aliases of literal unions.
    pub fn with_literal_aliases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.literal_aliases.extend(names.into_iter().map(Into::into));
        self
    }

    /// A classifier that knows every enum declared in `table`.
    pub fn for_table(table: &DeclarationTable, extra_scalars: &[String]) -> Self {
        Self::new()
            .with_scalars(extra_scalars.iter().cloned())
            .with_literal_aliases(
                table
                    .iter()
                    .filter(|d| d.kind == DeclKind::Enum)
                    .map(|d| d.name.clone()),
            )
    }

    pub fn classify(&self, expr: &str) -> FieldClass {
        let expr = strip_parens(expr.trim());

        let arms = split_top_level(expr, '|');
        if arms.len() > 1 {
            let mut all_literal = true;
            for arm in arms {
                match self.classify(arm) {
                    FieldClass::NestedReference => return FieldClass::NestedReference,
                    FieldClass::Primitive => all_literal = false,
                    FieldClass::LiteralUnion => {}
                }
            }
            return if all_literal {
                FieldClass::LiteralUnion
            } else {
                FieldClass::Primitive
            };
        }

        if expr.starts_with('[') && closing_of_first(expr, '[', ']') == Some(expr.len() - 1) {
            return self.classify_tuple(&expr[1..expr.len() - 1]);
        }
        if let Some(element) = expr.strip_suffix("[]") {
            return self.classify(element);
        }
        if let Some(element) = generic_argument(expr, "Array")
            .or_else(|| generic_argument(expr, "ReadonlyArray"))
        {
            return self.classify(element);
        }
        if let Some(body) = expr.strip_prefix('{').and_then(|e| e.strip_suffix('}')) {
            return self.classify_object(body);
        }
        if find_top_level(expr, "=>").is_some() {
            // Callbacks are opaque values.
            return FieldClass::Primitive;
        }
        if is_literal(expr) {
            return FieldClass::LiteralUnion;
        }
        if SCALAR_KEYWORDS.contains(&expr) || self.scalars.contains(expr) {
            return FieldClass::Primitive;
        }
        if self.literal_aliases.contains(expr) {
            return FieldClass::LiteralUnion;
        }
        FieldClass::NestedReference
    }

    /// Tuple or bracketed list: nested if any element is nested.
    fn classify_tuple(&self, body: &str) -> FieldClass {
        let mut all_literal = true;
        let mut any = false;
        for element in split_top_level(body, ',') {
            let element = element.trim_start_matches("...");
            // Labeled elements: `start: number`, `end?: number`.
            let element = match find_top_level(element, ":") {
                Some(colon) => &element[colon + 1..],
                None => element.strip_suffix('?').unwrap_or(element),
            };
            any = true;
            match self.classify(element) {
                FieldClass::NestedReference => return FieldClass::NestedReference,
                FieldClass::Primitive => all_literal = false,
                FieldClass::LiteralUnion => {}
            }
        }
        if any && all_literal {
            FieldClass::LiteralUnion
        } else {
            FieldClass::Primitive
        }
    }

    /// Inline object: nested if any member is nested.
    fn classify_object(&self, body: &str) -> FieldClass {
        let members = split_top_level(body, ';')
            .into_iter()
            .flat_map(|m| split_top_level(m, ','));
        for member in members {
            let Some(colon) = find_top_level(member, ":") else {
                continue;
            };
            if self.classify(&member[colon + 1..]).is_nested() {
                return FieldClass::NestedReference;
            }
        }
        FieldClass::Primitive
    }
}

/// Classify with only the built-in scalar keywords.
pub fn classify(expr: &str) -> FieldClass {
    Classifier::new().classify(expr)
}

fn is_literal(expr: &str) -> bool {
    let quoted = |q: char| expr.len() >= 2 && expr.starts_with(q) && expr.ends_with(q);
    quoted('"')
        || quoted('\'')
        || quoted('`')
        || expr == "true"
        || expr == "false"
        || (expr.starts_with(|c: char| c.is_ascii_digit() || c == '-')
            && expr.parse::<f64>().is_ok())
}

/// `Name<T>` -> `T`.
fn generic_argument<'a>(expr: &'a str, name: &str) -> Option<&'a str> {
    let inner = expr.strip_prefix(name)?.trim_start().strip_prefix('<')?;
    let inner = inner.strip_suffix('>')?;
    Some(inner.trim())
}

/// Remove parentheses that wrap the whole expression.
fn strip_parens(mut expr: &str) -> &str {
    while expr.starts_with('(') && closing_of_first(expr, '(', ')') == Some(expr.len() - 1) {
        expr = expr[1..expr.len() - 1].trim();
    }
    expr
}

fn closing_of_first(expr: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in expr.char_indices() {
        match c {
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offsets of characters at nesting depth zero, outside string literals.
fn top_level_offsets(expr: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    for (i, c) in expr.char_indices() {
        if let Some(q) = quote {
            if c == q && prev != '\\' {
                quote = None;
            }
            prev = c;
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            // `=>` is an arrow, not a closing angle bracket.
            '>' if prev == '=' => {}
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(i),
            _ => {}
        }
        prev = c;
    }
    out
}

fn find_top_level(expr: &str, needle: &str) -> Option<usize> {
    top_level_offsets(expr)
        .into_iter()
        .find(|&i| expr[i..].starts_with(needle))
}

fn split_top_level(expr: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for i in top_level_offsets(expr) {
        if expr[i..].starts_with(sep) {
            parts.push(expr[start..i].trim());
            start = i + sep.len_utf8();
        }
    }
    parts.push(expr[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_and_literals() {
        assert_eq!(classify("string"), FieldClass::Primitive);
        assert_eq!(classify("boolean"), FieldClass::Primitive);
        assert_eq!(classify("\"let\""), FieldClass::LiteralUnion);
        assert_eq!(classify("\"let\" | \"const\" | \"var\""), FieldClass::LiteralUnion);
        assert_eq!(classify("true"), FieldClass::LiteralUnion);
        assert_eq!(classify("42"), FieldClass::LiteralUnion);
    }

    #[test]
    fn test_references_are_nested() {
        assert_eq!(classify("Expression"), FieldClass::NestedReference);
        assert_eq!(classify("Expression | null"), FieldClass::NestedReference);
        assert_eq!(classify("Statement[]"), FieldClass::NestedReference);
        assert_eq!(classify("Array<Pattern | null>"), FieldClass::NestedReference);
        assert_eq!(classify("(Expression | SpreadElement)[]"), FieldClass::NestedReference);
    }

    #[test]
    fn test_mixed_scalar_union_is_primitive() {
        assert_eq!(classify("string | number | null"), FieldClass::Primitive);
        assert_eq!(classify("string[]"), FieldClass::Primitive);
        assert_eq!(classify("\"a\" | string"), FieldClass::Primitive);
    }

    #[test]
    fn test_inline_objects() {
        assert_eq!(
            classify("{ cooked: string; raw: string }"),
            FieldClass::Primitive
        );
        assert_eq!(
            classify("{ pattern: string, flags: string }"),
            FieldClass::Primitive
        );
        assert_eq!(
            classify("{ key: Expression; value: string }"),
            FieldClass::NestedReference
        );
    }

    #[test]
    fn test_callback_is_opaque() {
        assert_eq!(classify("(node: Node) => void"), FieldClass::Primitive);
        assert_eq!(classify("Map<string, (n: Node) => Node>"), FieldClass::NestedReference);
    }

    #[test]
    fn test_configured_names() {
        let classifier = Classifier::new()
            .with_scalars(["RegExp"])
            .with_literal_aliases(["UnaryOperator"]);
        assert_eq!(classifier.classify("RegExp"), FieldClass::Primitive);
        assert_eq!(
            classifier.classify("string | boolean | number | RegExp"),
            FieldClass::Primitive
        );
        assert_eq!(classifier.classify("UnaryOperator"), FieldClass::LiteralUnion);
        assert_eq!(classify("RegExp"), FieldClass::NestedReference);
    }

    #[test]
    fn test_enum_names_from_table() {
        let mut table = DeclarationTable::new();
        table
            .merge(
                crate::ir::FragmentRecord::enumeration("UpdateOperator", ["\"++\"", "\"--\""]),
                crate::passes::ExtendsPolicy::First,
            )
            .unwrap();
        let classifier = Classifier::for_table(&table, &[]);
        assert_eq!(
            classifier.classify("UpdateOperator"),
            FieldClass::LiteralUnion
        );
    }

    #[test]
    fn test_tuples_classify_by_element() {
        assert_eq!(classify("[number, number]"), FieldClass::Primitive);
        assert_eq!(classify("[ string ]"), FieldClass::Primitive);
        assert_eq!(classify("[\"a\", \"b\"]"), FieldClass::LiteralUnion);
        assert_eq!(classify("[ Statement ]"), FieldClass::NestedReference);
        assert_eq!(classify("[number, Expression | null]"), FieldClass::NestedReference);
        assert_eq!(classify("[start: number, end?: number]"), FieldClass::Primitive);
        assert_eq!(classify("[number, ...Node[]]"), FieldClass::NestedReference);
        assert_eq!(classify("[number, number][]"), FieldClass::Primitive);
        assert_eq!(classify("[]"), FieldClass::Primitive);
    }

    #[test]
    fn test_split_respects_nesting() {
        assert_eq!(
            split_top_level("A<B | C> | D", '|'),
            vec!["A<B | C>", "D"]
        );
        assert_eq!(split_top_level("\"a|b\" | c", '|'), vec!["\"a|b\"", "c"]);
    }
}
