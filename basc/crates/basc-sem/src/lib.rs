//! basc-sem - Validator for the basc compiler.
//!
//! A single linear pass over the parsed lines that resolves identifiers
//! into the program-wide symbol table, interns literal strings, infers
//! every expression node's value type, folds constants, pairs `FOR`
//! with `NEXT`, verifies cross-line jump targets and rewrites adjacent
//! constant strings in `PRINT` argument lists.
//!
//! Errors are recorded per line and counted on the shared handler;
//! validation never aborts early, so one run reports every problem in
//! the program.

mod funcs;
mod ops;
mod stmt;

use rustc_hash::FxHashSet;

use basc_lex::{Keyword, TokenKind};
use basc_par::{Expression, SourceModel, Statement, Variable};
use basc_util::{canonical_name, name_value_type, Handler, Pos, ValueType};

/// An open `FOR` loop on the validator's pairing stack.
#[derive(Clone, Debug)]
struct ForSpec {
    /// Line number of the `FOR` statement.
    line_number: u32,
    /// Canonical loop-variable name.
    varname: String,
}

/// Snapshot of an operand node, taken before the parent is mutated.
#[derive(Clone, Debug)]
pub(crate) struct Operand {
    pub vtype: ValueType,
    pub constval: bool,
    pub dvalue: f64,
    pub svalue: String,
}

/// Result of validating one operator or function node.
#[derive(Clone, Debug, Default)]
pub(crate) struct Fold {
    pub vtype: ValueType,
    pub constval: bool,
    pub dvalue: f64,
    pub svalue: String,
}

impl Fold {
    pub fn plain(vtype: ValueType) -> Self {
        Fold {
            vtype,
            ..Fold::default()
        }
    }

    pub fn number(vtype: ValueType, dvalue: f64) -> Self {
        Fold {
            vtype,
            constval: true,
            dvalue,
            ..Fold::default()
        }
    }

    pub fn string(svalue: String) -> Self {
        Fold {
            vtype: ValueType::String,
            constval: true,
            svalue,
            ..Fold::default()
        }
    }
}

/// The validator.
pub struct Validator<'a> {
    source: &'a mut SourceModel,
    handler: &'a Handler,
    /// All line numbers of the program, for jump-target checks.
    line_numbers: FxHashSet<u32>,
    /// LIFO stack of open FOR loops.
    fornext_stack: Vec<ForSpec>,
    /// Number of the line being validated.
    current_line: u32,
    /// Set when the current line recorded an error.
    line_errored: bool,
}

impl<'a> Validator<'a> {
    pub fn new(source: &'a mut SourceModel, handler: &'a Handler) -> Self {
        let line_numbers = source.lines.iter().map(|line| line.number).collect();
        Self {
            source,
            handler,
            line_numbers,
            fornext_stack: Vec::new(),
            current_line: 0,
            line_errored: false,
        }
    }

    /// Validate the whole program.
    pub fn process(&mut self) {
        for index in 0..self.source.lines.len() {
            self.process_line(index);
        }

        // Loops still open at end of program.
        let unclosed = std::mem::take(&mut self.fornext_stack);
        for spec in unclosed {
            self.handler.error(
                spec.line_number,
                format!("FOR {} without NEXT.", spec.varname),
            );
            if let Some(line) = self.source.line_by_number_mut(spec.line_number) {
                line.error = true;
            }
        }
    }

    fn process_line(&mut self, index: usize) {
        // Take the line out of the model so statement validation can
        // link into other lines (FOR/NEXT pairing) without aliasing.
        let mut line = std::mem::take(&mut self.source.lines[index]);
        self.current_line = line.number;
        self.line_errored = line.error;

        if !line.error {
            let mut statement = std::mem::take(&mut line.statement);
            self.validate_statement(&mut statement);
            line.statement = statement;
        }

        line.error = self.line_errored;
        self.source.lines[index] = line;
    }

    /// Dispatch one statement to its validator.
    pub(crate) fn validate_statement(&mut self, stmt: &mut Statement) {
        match stmt.token.keyword {
            Keyword::Beep
            | Keyword::Bload
            | Keyword::Bsave
            | Keyword::Cload
            | Keyword::Close
            | Keyword::Cls
            | Keyword::Csave
            | Keyword::End
            | Keyword::Files
            | Keyword::Load
            | Keyword::Lprint
            | Keyword::Merge
            | Keyword::Rem
            | Keyword::Return
            | Keyword::Save
            | Keyword::Stop
            | Keyword::Troff
            | Keyword::Tron => {} // nothing to validate
            Keyword::Circle => self.validate_circle(stmt),
            Keyword::Clear => self.validate_clear(stmt),
            Keyword::Color => self.validate_color(stmt),
            Keyword::Data => self.validate_data(stmt),
            Keyword::Def => self.validate_def(stmt),
            Keyword::Dim => self.validate_dim(stmt),
            Keyword::Draw => self.validate_draw(stmt),
            Keyword::For => self.validate_for(stmt),
            Keyword::Gosub | Keyword::Goto => self.validate_goto_gosub(stmt),
            Keyword::If => self.validate_if(stmt),
            Keyword::Input => self.validate_input(stmt),
            Keyword::Key => self.validate_key(stmt),
            Keyword::Let => self.validate_let(stmt),
            Keyword::Line => self.validate_line(stmt),
            Keyword::Locate => self.validate_locate(stmt),
            Keyword::Next => self.validate_next(stmt),
            Keyword::On => self.validate_on(stmt),
            Keyword::Open => self.validate_open(stmt),
            Keyword::Out => self.validate_out(stmt),
            Keyword::Paint => self.validate_paint(stmt),
            Keyword::Poke => self.validate_poke(stmt),
            Keyword::Print => self.validate_print(stmt),
            Keyword::Pset | Keyword::Preset => self.validate_pset_preset(stmt),
            Keyword::Read => self.validate_read(stmt),
            Keyword::Restore => self.validate_restore(stmt),
            Keyword::Screen => self.validate_screen(stmt),
            Keyword::Width => self.validate_width(stmt),
            keyword => {
                self.error(format!("Validator not found for keyword {}.", keyword));
            }
        }
    }

    // Error reporting ------------------------------------------------------

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.handler.error(self.current_line, message);
        self.line_errored = true;
    }

    pub(crate) fn error_at(&mut self, pos: Pos, message: impl Into<String>) {
        self.handler.error_at(self.current_line, pos, message);
        self.line_errored = true;
    }

    pub(crate) fn line_number_exists(&self, number: u32) -> bool {
        self.line_numbers.contains(&number)
    }

    // Expression validation ------------------------------------------------

    /// Validate an expression and intern its folded string value if the
    /// whole expression is a non-empty string constant.
    pub(crate) fn validate_expression(&mut self, expr: &mut Expression) {
        if expr.root < 0 {
            return;
        }
        self.validate_expression_node(expr, expr.root);
        self.register_const_string_result(expr);
    }

    /// Intern the folded string value of a constant string expression.
    pub(crate) fn register_const_string_result(&mut self, expr: &mut Expression) {
        if expr.is_const() && expr.value_type() == ValueType::String {
            let svalue = expr.const_svalue().to_string();
            if !svalue.is_empty() {
                self.source.register_const_string(&svalue);
            }
        }
    }

    /// Post-order walk over one node: children first, then the node
    /// itself through the operator/function dispatch tables.
    pub(crate) fn validate_expression_node(&mut self, expr: &mut Expression, index: i32) {
        if index < 0 {
            return;
        }

        let (left, right) = {
            let node = &expr.nodes[index as usize];
            (node.left, node.right)
        };
        if left >= 0 {
            self.validate_expression_node(expr, left);
        }
        if right >= 0 {
            self.validate_expression_node(expr, right);
        }

        let kind = expr.nodes[index as usize].token.kind;
        match kind {
            TokenKind::Number => {
                let node = &mut expr.nodes[index as usize];
                node.vtype = node.token.vtype;
                node.constval = true;
            }
            TokenKind::String => {
                let node = &mut expr.nodes[index as usize];
                node.vtype = ValueType::String;
                node.constval = true;
            }
            TokenKind::Identifier => {
                let name = canonical_name(&expr.nodes[index as usize].token.text);
                self.source.register_variable(Variable::new(&name));

                // Subscripts of an array reference.
                let mut args = std::mem::take(&mut expr.nodes[index as usize].args);
                for arg in &mut args {
                    self.validate_expression_node_tree(arg);
                }
                let node = &mut expr.nodes[index as usize];
                node.args = args;
                node.vtype = name_value_type(&name);
                node.constval = false;
            }
            TokenKind::Operation => {
                if left < 0 && right >= 0 {
                    self.validate_unary(expr, index, right);
                } else if left >= 0 && right >= 0 {
                    self.validate_binary(expr, index, left, right);
                } else {
                    let pos = expr.nodes[index as usize].token.pos;
                    let text = expr.nodes[index as usize].token.text.clone();
                    self.error_at(pos, format!("Operation \'{}\' has no operands.", text));
                }
            }
            TokenKind::Keyword => {
                let keyword = expr.nodes[index as usize].token.keyword;
                if keyword == Keyword::Not {
                    self.validate_unary(expr, index, right);
                } else if keyword.is_binary_operator() {
                    self.validate_binary(expr, index, left, right);
                } else if keyword.is_function() {
                    self.validate_function(expr, index);
                } else {
                    let pos = expr.nodes[index as usize].token.pos;
                    self.error_at(pos, format!("Unexpected keyword {} in expression.", keyword));
                }
            }
            _ => {
                // Symbols (the PRINT comma separator) carry no value.
            }
        }
    }

    /// Validate a whole sub-expression tree without the top-level
    /// string-interning step.
    pub(crate) fn validate_expression_node_tree(&mut self, expr: &mut Expression) {
        if expr.root >= 0 {
            self.validate_expression_node(expr, expr.root);
        }
    }

    fn operand(expr: &Expression, index: i32) -> Operand {
        let node = &expr.nodes[index as usize];
        Operand {
            vtype: node.vtype,
            constval: node.constval,
            dvalue: node.token.dvalue,
            svalue: node.token.svalue.clone(),
        }
    }

    fn apply_fold(expr: &mut Expression, index: i32, fold: Fold) {
        let node = &mut expr.nodes[index as usize];
        node.vtype = fold.vtype;
        node.constval = fold.constval;
        node.token.dvalue = fold.dvalue;
        node.token.svalue = fold.svalue;
    }

    fn validate_unary(&mut self, expr: &mut Expression, index: i32, right: i32) {
        let pos = expr.nodes[index as usize].token.pos;
        if right < 0 {
            self.error_at(pos, "Operand expected for unary operation.");
            return;
        }
        let operand = Self::operand(expr, right);
        if operand.vtype == ValueType::None {
            self.error_at(pos, "Operand vtype not defined.");
            return;
        }

        let name = Self::operation_name(expr, index);
        let fold = match name.as_str() {
            "+" => self.oper_unary_plus(pos, &operand),
            "-" => self.oper_unary_minus(pos, &operand),
            "NOT" => self.oper_unary_not(pos, &operand),
            _ => {
                self.error_at(pos, format!("Unexpected unary operator \'{}\'.", name));
                None
            }
        };
        if let Some(fold) = fold {
            Self::apply_fold(expr, index, fold);
        }
    }

    fn validate_binary(&mut self, expr: &mut Expression, index: i32, left: i32, right: i32) {
        let pos = expr.nodes[index as usize].token.pos;
        if left < 0 || right < 0 {
            self.error_at(pos, "Operand expected for binary operation.");
            return;
        }

        let lhs = Self::operand(expr, left);
        let rhs = Self::operand(expr, right);
        if lhs.vtype == ValueType::None || rhs.vtype == ValueType::None {
            self.error_at(pos, "Cannot calculate value type for the node.");
            return;
        }

        let name = Self::operation_name(expr, index);
        let fold = match name.as_str() {
            "+" => self.oper_plus(pos, &lhs, &rhs),
            "-" => self.oper_minus(pos, &lhs, &rhs),
            "*" => self.oper_mul(pos, &lhs, &rhs),
            "/" => self.oper_div(pos, &lhs, &rhs),
            "\\" => self.oper_div_int(pos, &lhs, &rhs),
            "MOD" => self.oper_mod(pos, &lhs, &rhs),
            "^" => self.oper_power(pos, &lhs, &rhs),
            "=" => self.oper_compare(pos, &lhs, &rhs, "="),
            "<>" | "><" => self.oper_compare(pos, &lhs, &rhs, "<>"),
            "<" => self.oper_compare(pos, &lhs, &rhs, "<"),
            ">" => self.oper_compare(pos, &lhs, &rhs, ">"),
            "<=" | "=<" => self.oper_compare(pos, &lhs, &rhs, "<="),
            ">=" | "=>" => self.oper_compare(pos, &lhs, &rhs, ">="),
            "AND" => self.oper_bitwise(pos, &lhs, &rhs, "AND"),
            "OR" => self.oper_bitwise(pos, &lhs, &rhs, "OR"),
            "XOR" => self.oper_bitwise(pos, &lhs, &rhs, "XOR"),
            "EQV" => self.oper_bitwise(pos, &lhs, &rhs, "EQV"),
            "IMP" => self.oper_bitwise(pos, &lhs, &rhs, "IMP"),
            _ => {
                self.error_at(pos, format!("Validator not found for operator \'{}\'.", name));
                None
            }
        };
        if let Some(fold) = fold {
            Self::apply_fold(expr, index, fold);
        }
    }

    /// Operator name for table dispatch: the token text for operation
    /// tokens, the keyword tag for reserved-word operators.
    fn operation_name(expr: &Expression, index: i32) -> String {
        let token = &expr.nodes[index as usize].token;
        if token.kind == TokenKind::Keyword {
            token.keyword.as_str().to_string()
        } else {
            token.text.clone()
        }
    }

    fn validate_function(&mut self, expr: &mut Expression, index: i32) {
        let keyword = expr.nodes[index as usize].token.keyword;
        let pos = expr.nodes[index as usize].token.pos;
        let mut args = std::mem::take(&mut expr.nodes[index as usize].args);

        let fold = self.dispatch_function(keyword, pos, &mut args);

        expr.nodes[index as usize].args = args;
        if let Some(fold) = fold {
            Self::apply_fold(expr, index, fold);
        }
    }

    fn dispatch_function(
        &mut self,
        keyword: Keyword,
        pos: Pos,
        args: &mut [Expression],
    ) -> Option<Fold> {
        match keyword {
            Keyword::Sin => self.func_trig(pos, args, f64::sin),
            Keyword::Cos => self.func_trig(pos, args, f64::cos),
            Keyword::Tan => self.func_trig(pos, args, f64::tan),
            Keyword::Atn => self.func_trig(pos, args, f64::atan),
            Keyword::Exp => self.func_trig(pos, args, f64::exp),
            Keyword::Log => self.func_log(pos, args),
            Keyword::Sqr => self.func_sqr(pos, args),
            Keyword::Pi => self.func_pi(pos, args),
            Keyword::Abs => self.func_abs(pos, args),
            Keyword::Fix | Keyword::Cint => self.func_cint_fix(pos, args),
            Keyword::Int => self.func_int(pos, args),
            Keyword::Sgn => self.func_sgn(pos, args),
            Keyword::Rnd => self.func_rnd(pos, args),
            Keyword::Fre => self.func_fre(pos, args),
            Keyword::Csng | Keyword::Cdbl => self.func_csng(pos, args),
            Keyword::Peek => self.func_peek(pos, args),
            Keyword::Inp => self.func_inp(pos, args),
            Keyword::Asc => self.func_asc(pos, args),
            Keyword::Chr => self.func_chr(pos, args),
            Keyword::Len => self.func_len(pos, args),
            Keyword::Mid => self.func_mid(pos, args),
            Keyword::StringFn => self.func_string(pos, args),
            Keyword::Val => self.func_val(pos, args),
            Keyword::Inkey => self.func_inkey(pos, args),
            Keyword::Str => self.func_str(pos, args),
            Keyword::Bin => self.func_radix(pos, args, 2),
            Keyword::Oct => self.func_radix(pos, args, 8),
            Keyword::Hex => self.func_radix(pos, args, 16),
            Keyword::Csrlin | Keyword::Pos | Keyword::Lpos => self.func_cursor(pos, args),
            Keyword::Eof => self.func_eof(pos, args),
            Keyword::Point => self.func_point(pos, args),
            _ => {
                self.error_at(pos, format!("Validator not found for function {}.", keyword));
                None
            }
        }
    }

    // Expression kind checks ----------------------------------------------

    /// Validate an expression and require a numeric result.
    pub(crate) fn check_integer_or_single_expression(&mut self, expr: &mut Expression) -> bool {
        if expr.is_empty() {
            self.error("Expression should not be empty.");
            return false;
        }

        self.validate_expression_node_tree(expr);

        if !expr.value_type().is_numeric() {
            let pos = expr.root_node().map(|n| n.token.pos).unwrap_or_default();
            self.error_at(pos, "Expression should be of type Integer or Single.");
            return false;
        }
        true
    }

    /// Validate an expression and require a string result.
    pub(crate) fn check_string_expression(&mut self, expr: &mut Expression) -> bool {
        if expr.is_empty() {
            self.error("Expression should not be empty.");
            return false;
        }

        self.validate_expression_node_tree(expr);

        if expr.value_type() != ValueType::String {
            let pos = expr.root_node().map(|n| n.token.pos).unwrap_or_default();
            self.error_at(pos, "Expression should be of type String.");
            return false;
        }
        true
    }
}
