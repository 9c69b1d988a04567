//! Explaining the textual difference between two mapped statements.
//!
//! Tokens are aligned with a longest-common-subsequence table; each run of
//! unaligned tokens becomes one [`Replacement`], classified by what the
//! tokens are and where they sit.

use crate::token::{self, Token, TokenKind};
use facet::Facet;

/// Above this many table cells the statements are treated as one opaque
/// expression replacement.
const MAX_ALIGNMENT_CELLS: usize = 160_000;

/// What kind of code fragment was swapped.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ReplacementKind {
    /// A variable, field or parameter name.
    VariableName,
    /// The name of an invoked method.
    MethodInvocationName,
    /// A type name.
    Type,
    /// The type of a `new` expression.
    ClassInstanceCreation,
    /// A string literal.
    StringLiteral,
    /// A numeric literal.
    NumberLiteral,
    /// `true` / `false`.
    BooleanLiteral,
    /// `null`.
    NullLiteral,
    /// A character literal.
    CharLiteral,
    /// An operator.
    Operator,
    /// Anything else.
    Expression,
}

impl ReplacementKind {
    /// Upper-case name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            ReplacementKind::VariableName => "VARIABLE_NAME",
            ReplacementKind::MethodInvocationName => "METHOD_INVOCATION_NAME",
            ReplacementKind::Type => "TYPE",
            ReplacementKind::ClassInstanceCreation => "CLASS_INSTANCE_CREATION",
            ReplacementKind::StringLiteral => "STRING_LITERAL",
            ReplacementKind::NumberLiteral => "NUMBER_LITERAL",
            ReplacementKind::BooleanLiteral => "BOOLEAN_LITERAL",
            ReplacementKind::NullLiteral => "NULL_LITERAL",
            ReplacementKind::CharLiteral => "CHAR_LITERAL",
            ReplacementKind::Operator => "OPERATOR",
            ReplacementKind::Expression => "EXPRESSION",
        }
    }
}

/// One substitution that, with the others on the same pair, turns the
/// before statement into the after statement.
#[derive(Facet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Replacement {
    /// Fragment category.
    pub kind: ReplacementKind,
    /// Fragment in the before statement.
    pub before: String,
    /// Fragment in the after statement.
    pub after: String,
}

impl Replacement {
    /// Create a replacement.
    pub fn new(kind: ReplacementKind, before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            kind,
            before: before.into(),
            after: after.into(),
        }
    }
}

/// A maximal run of unaligned tokens.
#[derive(Debug, Clone, Copy)]
struct Hunk {
    before: (usize, usize),
    after: (usize, usize),
}

/// Compute the replacements explaining `before` -> `after`. Equal token
/// texts yield no replacements.
pub fn extract(before: &[Token], after: &[Token]) -> Vec<Replacement> {
    if texts_equal(before, after) {
        return Vec::new();
    }
    if (before.len() + 1) * (after.len() + 1) > MAX_ALIGNMENT_CELLS {
        return vec![Replacement::new(
            ReplacementKind::Expression,
            token::render(before),
            token::render(after),
        )];
    }

    let mut out: Vec<Replacement> = Vec::new();
    for hunk in align(before, after) {
        let r = classify(before, after, hunk);
        if !out.contains(&r) {
            out.push(r);
        }
    }
    out
}

fn texts_equal(a: &[Token], b: &[Token]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.text == y.text)
}

fn align(a: &[Token], b: &[Token]) -> Vec<Hunk> {
    let (n, m) = (a.len(), b.len());
    // lcs[i][j] = LCS length of a[i..] and b[j..]
    let width = m + 1;
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if a[i].text == b[j].text {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut hunks = Vec::new();
    let mut open: Option<Hunk> = None;
    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && a[i].text == b[j].text {
            hunks.extend(open.take());
            i += 1;
            j += 1;
            continue;
        }
        let h = open.get_or_insert(Hunk {
            before: (i, i),
            after: (j, j),
        });
        if j == m || (i < n && lcs[(i + 1) * width + j] >= lcs[i * width + j + 1]) {
            i += 1;
            h.before.1 = i;
        } else {
            j += 1;
            h.after.1 = j;
        }
    }
    hunks.extend(open);
    hunks
}

fn classify(a: &[Token], b: &[Token], hunk: Hunk) -> Replacement {
    let (a0, a1) = hunk.before;
    let (b0, b1) = hunk.after;

    if a1 - a0 == 1 && b1 - b0 == 1 {
        let (x, y) = (&a[a0], &b[b0]);
        if let Some(kind) = classify_single(a, a0, b, b0) {
            return Replacement::new(kind, x.text.clone(), y.text.clone());
        }
    }

    if a1 > a0 && b1 > b0 && after_new(a, a0) && after_new(b, b0) {
        return Replacement::new(
            ReplacementKind::ClassInstanceCreation,
            token::render(&a[a0..a1]),
            token::render(&b[b0..b1]),
        );
    }

    // widen pure insertions and deletions by one shared token so that both
    // sides carry text
    let (mut a0, mut a1, mut b0, mut b1) = (a0, a1, b0, b1);
    if a0 == a1 || b0 == b1 {
        if a0 > 0 && b0 > 0 {
            a0 -= 1;
            b0 -= 1;
        } else if a1 < a.len() && b1 < b.len() {
            a1 += 1;
            b1 += 1;
        }
    }
    Replacement::new(
        ReplacementKind::Expression,
        token::render(&a[a0..a1]),
        token::render(&b[b0..b1]),
    )
}

fn classify_single(a: &[Token], i: usize, b: &[Token], j: usize) -> Option<ReplacementKind> {
    let (x, y) = (&a[i], &b[j]);
    if x.kind == y.kind && x.kind.is_literal() {
        return Some(match x.kind {
            TokenKind::StringLiteral => ReplacementKind::StringLiteral,
            TokenKind::CharLiteral => ReplacementKind::CharLiteral,
            TokenKind::NumberLiteral => ReplacementKind::NumberLiteral,
            TokenKind::BooleanLiteral => ReplacementKind::BooleanLiteral,
            _ => ReplacementKind::NullLiteral,
        });
    }
    if x.kind == TokenKind::Operator && y.kind == TokenKind::Operator {
        return Some(ReplacementKind::Operator);
    }

    let name_like = |t: &Token| matches!(t.kind, TokenKind::Identifier | TokenKind::PrimitiveType);
    if !name_like(x) || !name_like(y) {
        return None;
    }
    if x.kind == TokenKind::PrimitiveType || y.kind == TokenKind::PrimitiveType {
        return Some(ReplacementKind::Type);
    }
    let called = |t: &[Token], k: usize| t.get(k + 1).is_some_and(|n| n.is("("));
    if called(a, i) && called(b, j) {
        return Some(if after_new(a, i) && after_new(b, j) {
            ReplacementKind::ClassInstanceCreation
        } else {
            ReplacementKind::MethodInvocationName
        });
    }
    if type_position(a, i) || type_position(b, j) {
        return Some(ReplacementKind::Type);
    }
    Some(ReplacementKind::VariableName)
}

/// Whether the token at `k` is part of the type name of a `new` expression.
fn after_new(t: &[Token], k: usize) -> bool {
    let mut k = k;
    while k >= 2 && t[k - 1].is(".") && t[k - 2].kind == TokenKind::Identifier {
        k -= 2;
    }
    k >= 1 && t[k - 1].kind == TokenKind::Keyword && t[k - 1].text == "new"
}

/// Declarations (`Foo x`), generic heads (`Foo<`), class literals
/// (`Foo.class`) and capitalised static receivers (`Foo.bar`).
fn type_position(t: &[Token], k: usize) -> bool {
    let next = t.get(k + 1);
    let capitalised = t[k].text.chars().next().is_some_and(char::is_uppercase);
    next.is_some_and(|n| n.kind == TokenKind::Identifier || n.is("<"))
        || (next.is_some_and(|n| n.is("."))
            && (capitalised || t.get(k + 2).is_some_and(|n| n.text == "class")))
        || after_new(t, k)
}
