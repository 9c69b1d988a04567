//! Statement tokenisation and text normalisation.
//!
//! Statements are compared as token sequences, never as raw text, so that
//! whitespace, comments and line breaks never influence a match.

use core::fmt;
use smallvec::SmallVec;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier, including qualified-name segments.
    Identifier,
    /// Reserved word other than a literal keyword.
    Keyword,
    /// Primitive type keyword (`int`, `boolean`, ...).
    PrimitiveType,
    /// `"..."` literal, quotes included.
    StringLiteral,
    /// `'x'` literal, quotes included.
    CharLiteral,
    /// Numeric literal.
    NumberLiteral,
    /// `true` or `false`.
    BooleanLiteral,
    /// `null`.
    NullLiteral,
    /// Arithmetic, logical, comparison or assignment operator.
    Operator,
    /// Brackets, separators, `.` and `@`.
    Punctuation,
}

impl TokenKind {
    /// Whether the token is a literal of any kind.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::NumberLiteral
                | TokenKind::BooleanLiteral
                | TokenKind::NullLiteral
        )
    }

    /// Tokens that need a separating space when rendered next to each other.
    fn is_wordlike(self) -> bool {
        !matches!(self, TokenKind::Operator | TokenKind::Punctuation)
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Lexical category.
    pub kind: TokenKind,
    /// Exact source text of the token.
    pub text: String,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Whether this token is the punctuation or operator `s`.
    #[inline]
    pub fn is(&self, s: &str) -> bool {
        matches!(self.kind, TokenKind::Punctuation | TokenKind::Operator) && self.text == s
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

const KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "interface",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "volatile",
    "while",
    "yield",
];

const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void", "var",
];

/// Longest operators first so that greedy matching picks `>>>=` over `>>`.
const OPERATORS: &[&str] = &[
    ">>>=", "<<=", ">>=", ">>>", "...", "->", "::", "++", "--", "&&", "||", "==", "!=", "<=",
    ">=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>",
];

const PUNCTUATION: &[char] = &['(', ')', '{', '}', '[', ']', ';', ',', '.', '@'];

fn classify_word(word: &str) -> TokenKind {
    match word {
        "true" | "false" => TokenKind::BooleanLiteral,
        "null" => TokenKind::NullLiteral,
        w if PRIMITIVE_TYPES.contains(&w) => TokenKind::PrimitiveType,
        w if KEYWORDS.contains(&w) => TokenKind::Keyword,
        _ => TokenKind::Identifier,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Split statement text into tokens. Comments and whitespace are dropped.
///
/// Unterminated literals and comments run to the end of the input; the
/// tokenizer never fails.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // comments
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            while i < chars.len() && is_ident_continue(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(Token::new(classify_word(&word), word));
            continue;
        }

        if c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()))
        {
            let start = i;
            let hex = c == '0' && matches!(chars.get(i + 1), Some('x' | 'X'));
            i += 1;
            while i < chars.len() {
                let n = chars[i];
                let exponent_sign = !hex
                    && matches!(n, '+' | '-')
                    && matches!(chars[i - 1], 'e' | 'E');
                if n.is_ascii_alphanumeric() || n == '.' || n == '_' || exponent_sign {
                    i += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token::new(
                TokenKind::NumberLiteral,
                chars[start..i].iter().collect::<String>(),
            ));
            continue;
        }

        if c == '"' || c == '\'' {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i] != c {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(chars.len());
            let kind = if c == '"' {
                TokenKind::StringLiteral
            } else {
                TokenKind::CharLiteral
            };
            tokens.push(Token::new(kind, chars[start..i].iter().collect::<String>()));
            continue;
        }

        if let Some(op) = OPERATORS.iter().find(|op| {
            let len = op.chars().count();
            i + len <= chars.len() && op.chars().eq(chars[i..i + len].iter().copied())
        }) {
            i += op.chars().count();
            tokens.push(Token::new(TokenKind::Operator, *op));
            continue;
        }

        let kind = if PUNCTUATION.contains(&c) {
            TokenKind::Punctuation
        } else {
            TokenKind::Operator
        };
        tokens.push(Token::new(kind, c.to_string()));
        i += 1;
    }

    tokens
}

/// Render tokens back to canonical text: a single space between adjacent
/// word-like tokens, nothing elsewhere.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<TokenKind> = None;
    for token in tokens {
        if let Some(p) = prev
            && p.is_wordlike()
            && token.kind.is_wordlike()
        {
            out.push(' ');
        }
        out.push_str(&token.text);
        prev = Some(token.kind);
    }
    out
}

/// Canonical form of a piece of source text.
pub fn normalize(text: &str) -> String {
    render(&tokenize(text))
}

/// Index of the token closing the bracket opened at `open`, if balanced.
pub(crate) fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let (o, c) = match tokens.get(open)?.text.as_str() {
        "(" => ("(", ")"),
        "[" => ("[", "]"),
        "{" => ("{", "}"),
        _ => return None,
    };
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate().skip(open) {
        if t.is(o) {
            depth += 1;
        } else if t.is(c) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Index of the token opening the bracket closed at `close`, if balanced.
pub(crate) fn matching_open(tokens: &[Token], close: usize) -> Option<usize> {
    let (o, c) = match tokens.get(close)?.text.as_str() {
        ")" => ("(", ")"),
        "]" => ("[", "]"),
        "}" => ("{", "}"),
        _ => return None,
    };
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        let t = &tokens[i];
        if t.is(c) {
            depth += 1;
        } else if t.is(o) {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split `tokens` at commas that are not nested inside any bracket.
///
/// Argument lists are short, so the parts stay inline.
pub(crate) fn split_top_level(tokens: &[Token]) -> SmallVec<[&[Token]; 4]> {
    let mut parts = SmallVec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, t) in tokens.iter().enumerate() {
        if t.is("(") || t.is("[") || t.is("{") {
            depth += 1;
        } else if t.is(")") || t.is("]") || t.is("}") {
            depth -= 1;
        } else if t.is(",") && depth == 0 {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    if start < tokens.len() {
        parts.push(&tokens[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn texts(s: &str) -> Vec<String> {
        tokenize(s).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_whitespace_and_comments_are_ignored() {
        assert_eq!(
            normalize("int   x =\n 5; // trailing"),
            normalize("int x /* inline */ = 5;")
        );
        assert_eq!(normalize("int x = 5;"), "int x=5;");
    }

    #[test]
    fn test_multi_char_operators() {
        assert_eq!(texts("a >>>= b"), ["a", ">>>=", "b"]);
        assert_eq!(texts("x -> x != y"), ["x", "->", "x", "!=", "y"]);
        assert_eq!(texts("i++;"), ["i", "++", ";"]);
    }

    #[test]
    fn test_literals() {
        let tokens = tokenize(r#"f("a \" b", 'c', 1.5e-3, 0xFF, true, null)"#);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&TokenKind::StringLiteral));
        assert!(kinds.contains(&TokenKind::CharLiteral));
        assert!(kinds.contains(&TokenKind::BooleanLiteral));
        assert!(kinds.contains(&TokenKind::NullLiteral));
        let numbers: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::NumberLiteral)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(numbers, ["1.5e-3", "0xFF"]);
        assert_eq!(tokens[2].text, r#""a \" b""#);
    }

    #[test]
    fn test_keyword_classification() {
        let tokens = tokenize("return new int[0];");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].kind, TokenKind::PrimitiveType);
    }

    #[test]
    fn test_unterminated_input_does_not_panic() {
        assert_eq!(texts("\"open"), ["\"open"]);
        assert!(tokenize("/* never closed").is_empty());
    }

    #[test]
    fn test_split_top_level() {
        let tokens = tokenize("a, f(b, c), {d, e}");
        let parts: Vec<String> = split_top_level(&tokens).into_iter().map(render).collect();
        assert_eq!(parts, ["a", "f(b,c)", "{d,e}"]);
    }

    #[test]
    fn test_matching_brackets() {
        let tokens = tokenize("f(a(b), c)");
        assert_eq!(matching_close(&tokens, 1), Some(8));
        assert_eq!(matching_open(&tokens, 8), Some(1));
    }
}
