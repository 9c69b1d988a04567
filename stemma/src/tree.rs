//! Statement trees: the arena-backed representation of one method body.
//!
//! Every body is rooted at a synthetic [`StatementKind::Block`]. The root is
//! never reported as a statement; everything below it is.

use crate::token::{self, Token, TokenKind};
use core::fmt;
use indextree::{Arena, NodeId};

/// A region of a source file. Lines and columns are 1-based; zero means
/// unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SourceRange {
    /// First line.
    pub start_line: u32,
    /// First column.
    pub start_column: u32,
    /// Last line.
    pub end_line: u32,
    /// Last column.
    pub end_column: u32,
}

impl SourceRange {
    /// Range spanning whole lines.
    pub fn lines(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            start_column: 0,
            end_line,
            end_column: 0,
        }
    }
}

/// Kinds of leaf statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// Expression statement, usually a call or an assignment.
    Expression,
    /// `return ...;`
    Return,
    /// Local variable declaration.
    VariableDeclaration,
    /// `throw ...;`
    Throw,
    /// `break;`
    Break,
    /// `continue;`
    Continue,
    /// `case X:` / `default:`
    SwitchCase,
    /// `assert ...;`
    Assert,
    /// `;`
    Empty,
    /// Local class declarations and anything else the front end emits.
    Other,
}

/// Statement kinds. Composite kinds carry the header fields that identify
/// them; their bodies are child nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// `{ ... }`
    Block,
    /// `if (condition)`; the then branch and optional else branch are children.
    If {
        /// Condition expression.
        condition: String,
    },
    /// Classic `for (init; condition; update)`.
    For {
        /// Initializer expressions.
        initializers: Vec<String>,
        /// Loop condition, if any.
        condition: Option<String>,
        /// Update expressions.
        updaters: Vec<String>,
    },
    /// `for (Type v : iterable)`.
    EnhancedFor {
        /// Loop variable.
        variable: VariableDeclaration,
        /// Iterated expression.
        iterable: String,
    },
    /// `while (condition)`
    While {
        /// Condition expression.
        condition: String,
    },
    /// `do ... while (condition)`
    DoWhile {
        /// Condition expression.
        condition: String,
    },
    /// `try`, optionally with resources. Children are the body statements
    /// followed by [`StatementKind::Catch`] and [`StatementKind::Finally`]
    /// nodes.
    Try {
        /// Resource declarations.
        resources: Vec<String>,
    },
    /// `catch (A | B e)`
    Catch {
        /// Caught exception types.
        exception_types: Vec<String>,
        /// Name of the catch variable.
        variable: String,
    },
    /// `finally`
    Finally,
    /// `switch (selector)`
    Switch {
        /// Selector expression.
        selector: String,
    },
    /// `synchronized (lock)`
    Synchronized {
        /// Lock expression.
        lock: String,
    },
    /// `label:`
    Labeled {
        /// Label name.
        label: String,
    },
    /// Lambda with a block body. Owned by the leaf whose expression contains
    /// it; its children are the lambda body.
    Lambda {
        /// Parameter names.
        parameters: Vec<String>,
    },
    /// A leaf statement.
    Leaf(LeafKind),
}

impl StatementKind {
    /// Whether statements of this kind are leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self, StatementKind::Leaf(_))
    }

    /// Small stable tag used to decide whether two statements may be mapped
    /// and to seed subtree hashes. Leaves of different kinds share a tag.
    pub fn tag(&self) -> u8 {
        match self {
            StatementKind::Block => 1,
            StatementKind::If { .. } => 2,
            StatementKind::For { .. } => 3,
            StatementKind::EnhancedFor { .. } => 4,
            StatementKind::While { .. } => 5,
            StatementKind::DoWhile { .. } => 6,
            StatementKind::Try { .. } => 7,
            StatementKind::Catch { .. } => 8,
            StatementKind::Finally => 9,
            StatementKind::Switch { .. } => 10,
            StatementKind::Synchronized { .. } => 11,
            StatementKind::Labeled { .. } => 12,
            StatementKind::Lambda { .. } => 13,
            StatementKind::Leaf(_) => 0,
        }
    }

    /// Header source for composites. Leaves have no header.
    fn header(&self) -> String {
        match self {
            StatementKind::Block | StatementKind::Leaf(_) => String::new(),
            StatementKind::If { condition } => format!("if({condition})"),
            StatementKind::For {
                initializers,
                condition,
                updaters,
            } => format!(
                "for({};{};{})",
                initializers.join(","),
                condition.as_deref().unwrap_or_default(),
                updaters.join(",")
            ),
            StatementKind::EnhancedFor { variable, iterable } => {
                format!("for({} {}:{iterable})", variable.type_name, variable.name)
            }
            StatementKind::While { condition } => format!("while({condition})"),
            StatementKind::DoWhile { condition } => format!("do while({condition})"),
            StatementKind::Try { resources } if resources.is_empty() => "try".to_string(),
            StatementKind::Try { resources } => format!("try({})", resources.join(";")),
            StatementKind::Catch {
                exception_types,
                variable,
            } => format!("catch({} {variable})", exception_types.join("|")),
            StatementKind::Finally => "finally".to_string(),
            StatementKind::Switch { selector } => format!("switch({selector})"),
            StatementKind::Synchronized { lock } => format!("synchronized({lock})"),
            StatementKind::Labeled { label } => format!("{label}:"),
            StatementKind::Lambda { parameters } => format!("({})->", parameters.join(",")),
        }
    }
}

/// A local variable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableDeclaration {
    /// Variable name.
    pub name: String,
    /// Declared type, as written.
    pub type_name: String,
    /// Normalised initializer expression, if any.
    pub initializer: Option<String>,
}

impl VariableDeclaration {
    /// Create a declaration.
    pub fn new(type_name: &str, name: &str, initializer: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            type_name: token::normalize(type_name),
            initializer: initializer.map(token::normalize),
        }
    }
}

/// Whether an [`Invocation`] calls a method or creates an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    /// `receiver.name(args)` or `name(args)`.
    Method,
    /// `new Name(args)`.
    Creation,
}

/// A call site inside a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    /// Method or call, as a plain call or object creation.
    pub kind: InvocationKind,
    /// Simple method name, or the created type.
    pub name: String,
    /// Normalised receiver expression, if any.
    pub receiver: Option<String>,
    /// Normalised argument expressions.
    pub arguments: Vec<String>,
}

impl Invocation {
    /// Whether this is a method call named `name` whose receiver is one of
    /// `receivers`. An empty receiver list accepts any receiver; a `""` entry
    /// accepts a missing one.
    pub fn calls(&self, name: &str, receivers: &[&str]) -> bool {
        self.kind == InvocationKind::Method
            && self.name == name
            && (receivers.is_empty()
                || receivers.contains(&self.receiver.as_deref().unwrap_or_default()))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.receiver) {
            (InvocationKind::Creation, _) => write!(f, "new {}", self.name)?,
            (InvocationKind::Method, Some(r)) => write!(f, "{r}.{}", self.name)?,
            (InvocationKind::Method, None) => f.write_str(&self.name)?,
        }
        write!(f, "({})", self.arguments.join(","))
    }
}

/// One statement node.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Statement kind and header fields.
    pub kind: StatementKind,
    /// Normalised text. Header text for composites.
    pub text: String,
    /// Tokens of `text`.
    pub tokens: Vec<Token>,
    /// Source location.
    pub range: SourceRange,
    /// Call sites in this statement's own text.
    pub invocations: Vec<Invocation>,
    /// Variables declared by this statement.
    pub variables: Vec<VariableDeclaration>,
}

impl Statement {
    /// Build a leaf from source text. Invocations and, for declarations, the
    /// declared variable are recovered from the tokens; use
    /// [`Statement::with_invocations`] to supply them from a real parser.
    pub fn leaf(kind: LeafKind, text: &str) -> Self {
        let tokens = token::tokenize(text);
        let invocations = scan_invocations(&tokens);
        let variables = match kind {
            LeafKind::VariableDeclaration => scan_declaration(&tokens).into_iter().collect(),
            _ => Vec::new(),
        };
        Self {
            kind: StatementKind::Leaf(kind),
            text: token::render(&tokens),
            tokens,
            range: SourceRange::default(),
            invocations,
            variables,
        }
    }

    /// Build a composite; its text is the canonical header.
    pub fn composite(kind: StatementKind) -> Self {
        let tokens = token::tokenize(&kind.header());
        let invocations = scan_invocations(&tokens);
        let variables = match &kind {
            StatementKind::EnhancedFor { variable, .. } => vec![variable.clone()],
            _ => Vec::new(),
        };
        Self {
            text: token::render(&tokens),
            kind,
            tokens,
            range: SourceRange::default(),
            invocations,
            variables,
        }
    }

    /// Set the source range.
    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    /// Replace the recovered invocations.
    pub fn with_invocations(mut self, invocations: Vec<Invocation>) -> Self {
        self.invocations = invocations;
        self
    }

    /// Replace the recovered variable declarations.
    pub fn with_variables(mut self, variables: Vec<VariableDeclaration>) -> Self {
        self.variables = variables;
        self
    }

    /// Whether this statement is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    /// Leaves with at most `max_tokens` tokens (`break;`, `return;`, ...).
    pub fn is_trivial(&self, max_tokens: usize) -> bool {
        self.is_leaf() && self.tokens.len() <= max_tokens
    }
}

/// Recover call sites from a token stream.
fn scan_invocations(tokens: &[Token]) -> Vec<Invocation> {
    let mut out = Vec::new();
    for i in 0..tokens.len() {
        let t = &tokens[i];
        if t.kind != TokenKind::Identifier || !tokens.get(i + 1).is_some_and(|n| n.is("(")) {
            continue;
        }
        let Some(close) = token::matching_close(tokens, i + 1) else {
            continue;
        };
        let arguments = token::split_top_level(&tokens[i + 2..close])
            .into_iter()
            .map(token::render)
            .collect();

        // walk back over a qualified name to find `new`
        let mut j = i;
        while j >= 2 && tokens[j - 1].is(".") && tokens[j - 2].kind == TokenKind::Identifier {
            j -= 2;
        }
        if j >= 1 && tokens[j - 1].kind == TokenKind::Keyword && tokens[j - 1].text == "new" {
            out.push(Invocation {
                kind: InvocationKind::Creation,
                name: token::render(&tokens[j..=i]),
                receiver: None,
                arguments,
            });
            continue;
        }

        let receiver = if i >= 1 && tokens[i - 1].is(".") {
            receiver_start(tokens, i - 1).map(|start| token::render(&tokens[start..i - 1]))
        } else {
            None
        };
        out.push(Invocation {
            kind: InvocationKind::Method,
            name: t.text.clone(),
            receiver,
            arguments,
        });
    }
    out
}

/// First token of the receiver expression ending just before the `.` at `dot`.
fn receiver_start(tokens: &[Token], dot: usize) -> Option<usize> {
    let mut k = dot;
    loop {
        if k == 0 {
            break;
        }
        let prev = &tokens[k - 1];
        if prev.is(")") || prev.is("]") {
            k = token::matching_open(tokens, k - 1)?;
            // the callee name of a chained call, if there is one
            if k >= 1 && tokens[k - 1].kind == TokenKind::Identifier {
                k -= 1;
            }
        } else if matches!(prev.kind, TokenKind::Identifier | TokenKind::Keyword)
            || prev.kind.is_literal()
        {
            k -= 1;
        } else {
            break;
        }
        if k >= 1 && tokens[k - 1].is(".") {
            k -= 1;
        } else {
            break;
        }
    }
    (k < dot).then_some(k)
}

/// Recover `Type name = init;` from a declaration's tokens.
fn scan_declaration(tokens: &[Token]) -> Option<VariableDeclaration> {
    let end = tokens
        .iter()
        .position(|t| t.is("=") || t.is(";"))
        .unwrap_or(tokens.len());
    let head: Vec<&Token> = tokens[..end]
        .iter()
        .filter(|t| !(t.kind == TokenKind::Keyword && t.text == "final"))
        .collect();
    let (name, ty) = head.split_last()?;
    if name.kind != TokenKind::Identifier || ty.is_empty() {
        return None;
    }
    let type_tokens: Vec<Token> = ty.iter().map(|t| (*t).clone()).collect();
    let initializer = tokens.get(end).filter(|t| t.is("=")).map(|_| {
        let rest = &tokens[end + 1..];
        let rest = rest.strip_suffix(&[Token::new(TokenKind::Punctuation, ";")]).unwrap_or(rest);
        token::render(rest)
    });
    Some(VariableDeclaration {
        name: name.text.clone(),
        type_name: token::render(&type_tokens),
        initializer,
    })
}

/// The statements of one method body in an arena.
#[derive(Debug, Clone)]
pub struct StatementTree {
    arena: Arena<Statement>,
    /// The synthetic root block.
    pub root: NodeId,
}

impl Default for StatementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementTree {
    /// Create a tree holding only the root block.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Statement::composite(StatementKind::Block));
        Self { arena, root }
    }

    /// Append `statement` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, statement: Statement) -> NodeId {
        let id = self.arena.new_node(statement);
        parent.append(id, &mut self.arena);
        id
    }

    /// Borrow a statement.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Statement {
        self.arena
            .get(id)
            .map(|n| n.get())
            .unwrap_or_else(|| panic!("statement {id:?} is not part of this tree"))
    }

    /// Parent of a node, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent())
    }

    /// Direct children in source order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        id.ancestors(&self.arena).skip(1).any(|a| a == ancestor)
    }

    /// Statements in pre-order, root excluded.
    pub fn statements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root.descendants(&self.arena).skip(1)
    }

    /// Descendants of `id` in pre-order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena).skip(1)
    }

    /// Number of statements, root excluded.
    pub fn len(&self) -> usize {
        self.statements().count()
    }

    /// Whether the body has no statements.
    pub fn is_empty(&self) -> bool {
        self.root.children(&self.arena).next().is_none()
    }

    /// Upper bound on node indices, for sizing lookup tables.
    pub fn capacity(&self) -> usize {
        self.arena.count() + 1
    }

    /// Leaf statements in pre-order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.statements().filter(|&id| self.get(id).is_leaf())
    }

    /// Composite statements in pre-order, root excluded.
    pub fn composites(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.statements().filter(|&id| !self.get(id).is_leaf())
    }

    /// Body statements of a `try`: its children minus catch and finally.
    pub fn try_body(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|&c| {
            !matches!(
                self.get(c).kind,
                StatementKind::Catch { .. } | StatementKind::Finally
            )
        })
    }

    /// The catch clauses of a `try`.
    pub fn catch_clauses(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(|&c| matches!(self.get(c).kind, StatementKind::Catch { .. }))
    }

    /// The lambda composite owned by a leaf, if it has one.
    pub fn lambda_of(&self, leaf: NodeId) -> Option<NodeId> {
        self.children(leaf)
            .find(|&c| matches!(self.get(c).kind, StatementKind::Lambda { .. }))
    }

    /// Every invocation in the body, with the statement that contains it.
    pub fn invocations(&self) -> impl Iterator<Item = (NodeId, &Invocation)> + '_ {
        self.statements()
            .flat_map(move |id| self.get(id).invocations.iter().map(move |inv| (id, inv)))
    }

    /// Every declared local variable, with the statement that declares it.
    pub fn variables(&self) -> impl Iterator<Item = (NodeId, &VariableDeclaration)> + '_ {
        self.statements()
            .flat_map(move |id| self.get(id).variables.iter().map(move |v| (id, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_invocations_are_recovered() {
        let s = Statement::leaf(
            LeafKind::Expression,
            "Assertions.assertThrows(IllegalArgumentException.class, () -> run(0));",
        );
        assert_eq!(s.invocations.len(), 2);
        let outer = &s.invocations[0];
        assert!(outer.calls("assertThrows", &["Assertions"]));
        assert_eq!(outer.arguments[0], "IllegalArgumentException.class");
        assert!(s.invocations[1].calls("run", &[""]));
    }

    #[test]
    fn test_chained_receiver() {
        let s = Statement::leaf(LeafKind::Expression, "this.items.get(i).close();");
        let close = s.invocations.iter().find(|i| i.name == "close").unwrap();
        assert_eq!(close.receiver.as_deref(), Some("this.items.get(i)"));
        let get = s.invocations.iter().find(|i| i.name == "get").unwrap();
        assert_eq!(get.receiver.as_deref(), Some("this.items"));
    }

    #[test]
    fn test_creation() {
        let s = Statement::leaf(LeafKind::Expression, "list.add(new java.util.Date(1));");
        let creation = s
            .invocations
            .iter()
            .find(|i| i.kind == InvocationKind::Creation)
            .unwrap();
        assert_eq!(creation.name, "java.util.Date");
        assert_eq!(creation.to_string(), "new java.util.Date(1)");
    }

    #[test]
    fn test_declaration_is_recovered() {
        let s = Statement::leaf(
            LeafKind::VariableDeclaration,
            "final List<String> names = load();",
        );
        let v = &s.variables[0];
        assert_eq!(v.name, "names");
        assert_eq!(v.type_name, "List<String>");
        assert_eq!(v.initializer.as_deref(), Some("load()"));
    }

    #[test]
    fn test_composite_header_is_normalised() {
        let s = Statement::composite(StatementKind::If {
            condition: "x  >  0".into(),
        });
        assert_eq!(s.text, "if(x>0)");
        let c = Statement::composite(StatementKind::Catch {
            exception_types: vec!["IllegalArgumentException".into()],
            variable: "e".into(),
        });
        assert_eq!(c.text, "catch(IllegalArgumentException e)");
    }

    #[test]
    fn test_try_body_excludes_handlers() {
        let mut tree = StatementTree::new();
        let t = tree.add_child(
            tree.root,
            Statement::composite(StatementKind::Try { resources: vec![] }),
        );
        let body = tree.add_child(t, Statement::leaf(LeafKind::Expression, "run();"));
        let catch = tree.add_child(
            t,
            Statement::composite(StatementKind::Catch {
                exception_types: vec!["Exception".into()],
                variable: "e".into(),
            }),
        );
        assert_eq!(tree.try_body(t).collect::<Vec<_>>(), [body]);
        assert_eq!(tree.catch_clauses(t).collect::<Vec<_>>(), [catch]);
        assert_eq!(tree.len(), 3);
        assert!(tree.is_ancestor(t, body));
        assert!(!tree.is_ancestor(body, t));
    }
}
