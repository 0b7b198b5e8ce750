//! Line, statement and expression models shared by the parser, the
//! validator and the emitter.
//!
//! Expressions are small arenas: a flat vector of nodes addressed by
//! `i32` indices with `-1` meaning "absent". The arena layout keeps
//! tree rotations during operator-precedence parsing cheap and lets the
//! validator traverse without allocation. Code must never hold a node
//! reference across an arena mutation; everything works through
//! indices.

use indexmap::{IndexMap, IndexSet};

use basc_lex::{Keyword, Token, TokenKind};
use basc_util::{canonical_name, decorated_name, name_value_type, ValueType, MAX_LINE_NUMBER};

/// One node of an expression tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionNode {
    /// Operator / function / identifier / literal token. Folded
    /// constant values are stored back into this token's
    /// `dvalue`/`svalue` fields.
    pub token: Token,
    /// Arena index of the left child, -1 when absent.
    pub left: i32,
    /// Arena index of the right child, -1 when absent.
    pub right: i32,
    /// Argument sub-expressions of a function call or array subscript.
    pub args: Vec<Expression>,
    /// Set when this node was the root of a parenthesized
    /// sub-expression; freezes it against precedence rotations.
    pub brackets: bool,
    /// Inferred value type.
    pub vtype: ValueType,
    /// Set when the node's value is a compile-time constant.
    pub constval: bool,
}

impl Default for ExpressionNode {
    fn default() -> Self {
        Self {
            token: Token::default(),
            left: -1,
            right: -1,
            args: Vec::new(),
            brackets: false,
            vtype: ValueType::None,
            constval: false,
        }
    }
}

impl ExpressionNode {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    /// True for nodes that participate in precedence climbing:
    /// binary operators plus the unary `NOT`.
    pub fn is_operation(&self) -> bool {
        self.token.is_binary_operation() || self.token.is_keyword(Keyword::Not)
    }

    /// Operation priority; lower numbers bind tighter.
    ///
    /// A bracketed sub-tree is atomic (priority 1); non-operation
    /// nodes report 0.
    pub fn priority(&self) -> i32 {
        if self.brackets {
            return 1;
        }

        if self.token.kind == TokenKind::Operation {
            return match self.token.text.as_str() {
                "^" => 2,
                "*" | "/" => 3,
                "\\" => 4,
                "+" | "-" => 6,
                "=" | "<>" | "><" | "<" | ">" | "<=" | ">=" | "=<" | "=>" => 7,
                _ => 0,
            };
        }

        if self.token.kind == TokenKind::Keyword {
            return match self.token.keyword {
                Keyword::Mod => 5,
                Keyword::Not => 8,
                Keyword::And => 9,
                Keyword::Or | Keyword::Xor => 10,
                Keyword::Eqv => 11,
                Keyword::Imp => 12,
                _ => 0,
            };
        }

        0
    }
}

/// An expression: a node arena plus the root index (-1 if empty).
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    pub nodes: Vec<ExpressionNode>,
    pub root: i32,
}

impl Default for Expression {
    fn default() -> Self {
        Self::new()
    }
}

impl Expression {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: -1,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node, if the expression is non-empty.
    pub fn root_node(&self) -> Option<&ExpressionNode> {
        self.nodes.get(usize::try_from(self.root).ok()?)
    }

    /// Index of the parent of `index`, or -1 for the root.
    pub fn parent_index(&self, index: i32) -> i32 {
        for (i, node) in self.nodes.iter().enumerate() {
            if node.left == index || node.right == index {
                return i as i32;
            }
        }
        -1
    }

    /// Append a plain operand node and return its index. Does not link
    /// it into the tree.
    pub fn push_node(&mut self, node: ExpressionNode) -> i32 {
        let index = self.nodes.len() as i32;
        self.nodes.push(node);
        index
    }

    /// Insert a binary (or unary `NOT`) operation node into the tree.
    ///
    /// Walks upward from `prev` (the previously inserted operation, or
    /// the root when -1) until it finds a node that binds more loosely,
    /// is bracketed, or is the root; the new node steals that node's
    /// right child as its own left child. Equal priorities keep
    /// climbing (left associativity) except for `^`, which stops
    /// (right associativity).
    pub fn add_operation_node(&mut self, mut node: ExpressionNode, prev: i32) -> i32 {
        let index = self.nodes.len() as i32;
        let mut pred = if prev < 0 { self.root } else { prev };

        {
            let nodepred = &self.nodes[pred as usize];
            if !nodepred.is_operation() || nodepred.brackets {
                node.left = pred;
                self.root = index;
                self.nodes.push(node);
                return index;
            }
        }

        let pri = node.priority();
        let right_assoc = node.token.is_operation("^");
        loop {
            let nodepred = &self.nodes[pred as usize];
            let pripred = nodepred.priority();

            if nodepred.brackets || pripred > pri || (pripred == pri && right_assoc) {
                node.left = nodepred.right;
                self.nodes[pred as usize].right = index;
                break;
            }

            let parent = self.parent_index(pred);
            if parent < 0 {
                node.left = pred;
                self.root = index;
                break;
            }

            pred = parent;
        }

        self.nodes.push(node);
        index
    }

    /// Splice a parsed sub-expression into this arena, marking its root
    /// as bracketed. Returns the spliced root's index.
    pub fn splice_bracketed(&mut self, inner: Expression) -> i32 {
        let shift = self.nodes.len() as i32;
        let inner_root = inner.root;
        for (i, mut node) in inner.nodes.into_iter().enumerate() {
            if i as i32 == inner_root {
                node.brackets = true;
            }
            if node.left >= 0 {
                node.left += shift;
            }
            if node.right >= 0 {
                node.right += shift;
            }
            self.nodes.push(node);
        }
        inner_root + shift
    }

    /// True when the whole expression folded to a constant.
    pub fn is_const(&self) -> bool {
        self.root_node().is_some_and(|node| node.constval)
    }

    /// Folded numeric value of a constant expression.
    pub fn const_dvalue(&self) -> f64 {
        self.root_node().map_or(0.0, |node| node.token.dvalue)
    }

    /// Folded string value of a constant expression.
    pub fn const_svalue(&self) -> &str {
        self.root_node().map_or("", |node| node.token.svalue.as_str())
    }

    /// True when the expression is a bare scalar variable reference.
    pub fn is_variable(&self) -> bool {
        self.root_node().is_some_and(|node| {
            node.token.kind == TokenKind::Identifier
                && node.args.is_empty()
                && node.left < 0
                && node.right < 0
        })
    }

    /// Decorated storage label of a bare variable expression.
    pub fn variable_decorated_name(&self) -> String {
        self.root_node()
            .map_or_else(String::new, |node| {
                decorated_name(&canonical_name(&node.token.text))
            })
    }

    /// Value type of the root node.
    pub fn value_type(&self) -> ValueType {
        self.root_node().map_or(ValueType::None, |node| node.vtype)
    }
}

/// A registered variable: canonical name plus `DIM` extents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variable {
    /// Variable name; canonicalized when registered.
    pub name: String,
    /// Array extents from `DIM`, empty for scalars.
    pub indices: Vec<i32>,
}

impl Variable {
    pub fn new(name: &str) -> Self {
        Self {
            name: canonical_name(name),
            indices: Vec::new(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        name_value_type(&canonical_name(&self.name))
    }

    pub fn decorated_name(&self) -> String {
        decorated_name(&canonical_name(&self.name))
    }
}

/// An assignable variable occurrence: name plus subscript expressions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableExpression {
    pub name: String,
    /// Subscript expressions of an array element reference.
    pub args: Vec<Expression>,
}

impl VariableExpression {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn canonical_name(&self) -> String {
        canonical_name(&self.name)
    }

    pub fn value_type(&self) -> ValueType {
        name_value_type(&self.canonical_name())
    }

    pub fn decorated_name(&self) -> String {
        decorated_name(&self.canonical_name())
    }
}

/// One parsed statement.
///
/// For `IF`, line-number targets land in `params` in source order; a
/// `THEN`/`ELSE` payload that is itself a statement lands in
/// `then_stmt`/`else_stmt` instead and contributes nothing to
/// `params`. So: when `then_stmt` is `None` the `THEN` target is
/// `params[0]` and an `ELSE` target is `params[1]`; when `then_stmt`
/// is present an `ELSE` target is `params[0]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statement {
    /// Token of the leading keyword.
    pub token: Token,
    /// Target-line parameter of `GOTO`/`GOSUB`/`RESTORE`; the paired
    /// line for `FOR`/`NEXT` (filled by the validator); the routine
    /// number of `DEF USR`.
    pub paramline: u32,
    /// Loop variable of `FOR`; defined name of `DEF FN`.
    pub ident: Token,
    /// `@`-prefixed coordinates in graphics statements.
    pub relative: bool,
    /// True for `ON … GOTO`, false for `ON … GOSUB`.
    pub gotogosub: bool,
    /// `PRINT` ended in `;` or `,` — no final CR/LF.
    pub nocrlf: bool,
    /// True for `DEF FN`, false for `DEF USR`.
    pub deffnorusr: bool,
    /// Argument expressions.
    pub args: Vec<Expression>,
    /// Parameter tokens: `DATA` literals, `ON`/`IF` line numbers,
    /// `INPUT` prompt, `SCREEN`/`WIDTH` numbers, `NEXT` variables.
    pub params: Vec<Token>,
    /// Variable references of `DIM`, `READ`, `INPUT`.
    pub variables: Vec<Variable>,
    /// Assignable variable occurrences of `LET`.
    pub varexprs: Vec<VariableExpression>,
    /// `THEN` payload when it is a statement rather than a line number.
    pub then_stmt: Option<Box<Statement>>,
    /// `ELSE` payload when it is a statement rather than a line number.
    pub else_stmt: Option<Box<Statement>>,
}

impl Statement {
    /// `THEN` line-number token of an `IF`, if the `THEN` branch is a
    /// line target.
    pub fn then_line_token(&self) -> Option<&Token> {
        if self.then_stmt.is_some() {
            None
        } else {
            self.params.first()
        }
    }

    /// `ELSE` line-number token of an `IF`, if an `ELSE` line target
    /// is present.
    pub fn else_line_token(&self) -> Option<&Token> {
        if self.else_stmt.is_some() {
            return None;
        }
        if self.then_stmt.is_some() {
            self.params.first()
        } else {
            self.params.get(1)
        }
    }

    /// True when the `IF` has any `ELSE` branch.
    pub fn has_else(&self) -> bool {
        self.else_stmt.is_some() || self.else_line_token().is_some()
    }
}

/// One parsed source line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceLine {
    /// BASIC line number.
    pub number: u32,
    /// Full source text of the line.
    pub text: String,
    /// Set when any stage recorded an error for this line.
    pub error: bool,
    pub statement: Statement,
}

/// The whole program: ordered lines plus the interning tables.
#[derive(Debug, Default)]
pub struct SourceModel {
    /// Lines in source order.
    pub lines: Vec<SourceLine>,
    /// Registered variables keyed by canonical name, in registration
    /// order. Sorted by decorated name at emission.
    pub vars: IndexMap<String, Variable>,
    /// Interned non-empty literal strings, insertion-ordered and
    /// deduplicated; position + 1 is the `ST<i>` label index.
    pub conststrings: IndexSet<String>,
}

impl SourceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_variable_registered(&self, canonical: &str) -> bool {
        self.vars.contains_key(canonical)
    }

    /// Register a variable under its canonical name.
    ///
    /// Returns false when a variable with the same canonical name was
    /// already registered; the existing registration is kept.
    pub fn register_variable(&mut self, var: Variable) -> bool {
        let key = canonical_name(&var.name);
        if self.vars.contains_key(&key) {
            return false;
        }
        self.vars.insert(key, var);
        true
    }

    /// Intern a non-empty literal string, returning its 1-based index.
    pub fn register_const_string(&mut self, value: &str) -> usize {
        debug_assert!(!value.is_empty());
        let (index, _) = self.conststrings.insert_full(value.to_string());
        index + 1
    }

    /// 1-based intern index of a previously registered string.
    pub fn const_string_index(&self, value: &str) -> Option<usize> {
        self.conststrings.get_index_of(value).map(|i| i + 1)
    }

    pub fn line_number_exists(&self, number: u32) -> bool {
        self.lines.iter().any(|line| line.number == number)
    }

    /// Smallest line number strictly greater than `number`, or the
    /// sentinel `MAX_LINE_NUMBER + 1`.
    pub fn next_line_number(&self, number: u32) -> u32 {
        self.lines
            .iter()
            .map(|line| line.number)
            .filter(|&n| n > number)
            .min()
            .unwrap_or(MAX_LINE_NUMBER + 1)
    }

    pub fn line_by_number(&self, number: u32) -> Option<&SourceLine> {
        self.lines.iter().find(|line| line.number == number)
    }

    pub fn line_by_number_mut(&mut self, number: u32) -> Option<&mut SourceLine> {
        self.lines.iter_mut().find(|line| line.number == number)
    }
}
