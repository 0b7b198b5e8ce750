//! Per-keyword statement parsing routines.
//!
//! Each routine consumes exactly the tokens of its statement body and
//! leaves the line positioned after the statement terminator (the EOL,
//! or an `ELSE` belonging to an enclosing `IF`, which is left for the
//! `IF` routine to consume).

use basc_lex::{Keyword, Token, TokenKind};

use crate::ast::{Expression, ExpressionNode, Statement, Variable, VariableExpression};
use crate::Parser;

impl<'a> Parser<'a> {
    /// BEEP, CLS, END, RETURN, STOP, TRON, TROFF: no statement body.
    pub(crate) fn parse_no_params(&mut self, stmt: &mut Statement) {
        let name = stmt.token.keyword.as_str().to_string();
        self.expect_statement_end(&name);
    }

    /// Statements accepted but ignored (cassette/file I/O, LPRINT):
    /// consume the body without looking at it.
    pub(crate) fn parse_skipped(&mut self, _stmt: &mut Statement) {
        loop {
            let token = self.get_next_token();
            if token.is_eol_or_eot() {
                break;
            }
        }
    }

    pub(crate) fn parse_rem(&mut self, _stmt: &mut Statement) {
        loop {
            let token = self.get_next_token();
            if token.is_eol_or_eot() {
                break;
            }
        }
    }

    /// CLEAR, COLOR, LOCATE: comma-separated expressions, empty slots
    /// allowed; counts and types are checked by the validator.
    pub(crate) fn parse_clear(&mut self, stmt: &mut Statement) {
        self.parse_expression_list(stmt);
    }

    pub(crate) fn parse_color(&mut self, stmt: &mut Statement) {
        self.parse_expression_list(stmt);
    }

    pub(crate) fn parse_locate(&mut self, stmt: &mut Statement) {
        self.parse_expression_list(stmt);
    }

    fn parse_expression_list(&mut self, stmt: &mut Statement) {
        loop {
            let expr = self.parse_expression();
            if self.had_error {
                return;
            }
            stmt.args.push(expr);

            let token = self.peek_next_token_skip_divider();
            if token.is_comma() {
                self.get_next_token_skip_divider();
                continue;
            }
            break;
        }
        let name = stmt.token.keyword.as_str().to_string();
        self.expect_statement_end(&name);
    }

    /// DATA: comma-separated number or string literals.
    pub(crate) fn parse_data(&mut self, stmt: &mut Statement) {
        loop {
            let token = self.get_next_token_skip_divider();
            if token.is_eol_or_eot() {
                return; // empty DATA reported by the validator
            }
            if !matches!(token.kind, TokenKind::Number | TokenKind::String) {
                self.error(&token, "Parameter should be of type Number or String.");
                return;
            }
            stmt.params.push(token);

            let sep = self.peek_next_token_skip_divider();
            if sep.is_comma() {
                self.get_next_token_skip_divider();
                continue;
            }
            break;
        }
        self.expect_statement_end("DATA");
    }

    /// DIM: variables with constant integer extents.
    pub(crate) fn parse_dim(&mut self, stmt: &mut Statement) {
        loop {
            let token = self.get_next_token_skip_divider();
            if token.kind != TokenKind::Identifier {
                self.error(&token, "DIM variable expected.");
                return;
            }
            let mut var = Variable::new(&token.text);

            let next = self.peek_next_token_skip_divider();
            if next.is_open_bracket() {
                self.get_next_token_skip_divider();
                loop {
                    let token = self.get_next_token_skip_divider();
                    if token.kind != TokenKind::Number || !token.is_dvalue_integer() {
                        self.error(&token, "Integer parameter expected in DIM.");
                        return;
                    }
                    var.indices.push(token.dvalue as i32);

                    let sep = self.get_next_token_skip_divider();
                    if sep.is_close_bracket() {
                        break;
                    }
                    if !sep.is_comma() {
                        self.error(&sep, "Close bracket expected in DIM.");
                        return;
                    }
                }
            }
            stmt.variables.push(var);

            let sep = self.peek_next_token_skip_divider();
            if sep.is_comma() {
                self.get_next_token_skip_divider();
                continue;
            }
            break;
        }
        self.expect_statement_end("DIM");
    }

    /// DRAW: one string expression.
    pub(crate) fn parse_draw(&mut self, stmt: &mut Statement) {
        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(expr);
        self.expect_statement_end("DRAW");
    }

    /// DEF FN<name>[(params)] = expr  |  DEF USR[n] = expr
    pub(crate) fn parse_def(&mut self, stmt: &mut Statement) {
        let token = self.get_next_token_skip_divider();

        if token.is_keyword(Keyword::Fn) {
            stmt.deffnorusr = true;
            let ident = self.get_next_token_skip_divider();
            if ident.kind != TokenKind::Identifier {
                self.error(&ident, "DEF FN name expected.");
                return;
            }
            stmt.ident = ident;
            self.parse_def_fn_tail(stmt);
            return;
        }

        if token.is_keyword(Keyword::Usr) {
            stmt.deffnorusr = false;
            let next = self.peek_next_token_skip_divider();
            if next.kind == TokenKind::Number {
                self.get_next_token_skip_divider();
                stmt.paramline = next.dvalue as u32;
            }
            self.parse_def_usr_tail(stmt);
            return;
        }

        // FNA / USR3 lex as plain identifiers: the name glues to the
        // keyword without a divider.
        if token.kind == TokenKind::Identifier {
            let upper = token.text.to_ascii_uppercase();
            if upper.starts_with("FN") && upper.len() > 2 {
                stmt.deffnorusr = true;
                stmt.ident = token;
                self.parse_def_fn_tail(stmt);
                return;
            }
            if let Some(digits) = upper.strip_prefix("USR") {
                stmt.deffnorusr = false;
                match digits.parse::<u32>() {
                    Ok(number) => stmt.paramline = number,
                    Err(_) => {
                        self.error(&token, "DEF USR number expected.");
                        return;
                    }
                }
                self.parse_def_usr_tail(stmt);
                return;
            }
        }

        self.error(&token, "FN or USR expected after DEF.");
    }

    fn parse_def_fn_tail(&mut self, stmt: &mut Statement) {
        let next = self.peek_next_token_skip_divider();
        if next.is_open_bracket() {
            self.get_next_token_skip_divider();
            loop {
                let token = self.get_next_token_skip_divider();
                if token.kind != TokenKind::Identifier {
                    self.error(&token, "DEF FN parameter name expected.");
                    return;
                }
                stmt.params.push(token);

                let sep = self.get_next_token_skip_divider();
                if sep.is_close_bracket() {
                    break;
                }
                if !sep.is_comma() {
                    self.error(&sep, "Close bracket expected in DEF FN.");
                    return;
                }
            }
        }

        let eq = self.get_next_token_skip_divider();
        if !eq.is_equal_sign() {
            self.error(&eq, "DEF FN '=' symbol expected.");
            return;
        }

        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(expr);
        self.expect_statement_end("DEF FN");
    }

    fn parse_def_usr_tail(&mut self, stmt: &mut Statement) {
        let eq = self.get_next_token_skip_divider();
        if !eq.is_equal_sign() {
            self.error(&eq, "DEF USR '=' symbol expected.");
            return;
        }

        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(expr);
        self.expect_statement_end("DEF USR");
    }

    /// FOR <var> = e1 TO e2 [STEP e3]
    pub(crate) fn parse_for(&mut self, stmt: &mut Statement) {
        let token = self.get_next_token_skip_divider();
        if token.kind != TokenKind::Identifier {
            self.error(&token, "FOR variable expected.");
            return;
        }
        stmt.ident = token;

        let token = self.get_next_token_skip_divider();
        if !token.is_equal_sign() {
            self.error(&token, "FOR '=' symbol expected.");
            return;
        }

        let exprfrom = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(exprfrom);

        let token = self.get_next_token_skip_divider();
        if !token.is_keyword(Keyword::To) {
            self.error(&token, "TO expected in FOR operator.");
            return;
        }

        let exprto = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(exprto);

        let token = self.peek_next_token_skip_divider();
        if token.is_keyword(Keyword::Step) {
            self.get_next_token_skip_divider();
            let exprstep = self.parse_expression();
            if self.had_error {
                return;
            }
            stmt.args.push(exprstep);
        }

        self.expect_statement_end("FOR operator");
    }

    /// GOTO/GOSUB <linenumber>
    pub(crate) fn parse_goto_gosub(&mut self, stmt: &mut Statement) {
        let name = stmt.token.keyword.as_str().to_string();

        let token = self.get_next_token_skip_divider();
        if token.kind != TokenKind::Number || !token.is_dvalue_integer() {
            self.error(&token, format!("{} line number expected.", name));
            return;
        }
        stmt.paramline = token.dvalue as u32;

        self.expect_statement_end(&name);
    }

    /// IF expr THEN <line|statement> [ELSE <line|statement>]
    /// IF expr GOTO <line>
    pub(crate) fn parse_if(&mut self, stmt: &mut Statement) {
        let start = self.peek_next_token_skip_divider();
        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        if expr.is_empty() {
            self.error(&start, "IF condition should not be empty.");
            return;
        }
        stmt.args.push(expr);

        let token = self.get_next_token_skip_divider();
        if token.is_keyword(Keyword::Goto) {
            let target = self.get_next_token_skip_divider();
            if target.kind != TokenKind::Number || !target.is_dvalue_integer() {
                self.error(&target, "GOTO line number expected.");
                return;
            }
            stmt.params.push(target);
        } else if token.is_keyword(Keyword::Then) {
            let next = self.peek_next_token_skip_divider();
            if next.kind == TokenKind::Number {
                self.get_next_token_skip_divider();
                stmt.params.push(next);
            } else {
                stmt.then_stmt = Some(self.parse_nested_statement());
                if self.had_error {
                    return;
                }
                if self.at_line_end {
                    return; // the nested statement consumed the EOL
                }
            }
        } else {
            self.error(&token, "THEN or GOTO expected in IF operator.");
            return;
        }

        let token = self.peek_next_token_skip_divider();
        if token.is_keyword(Keyword::Else) {
            self.get_next_token_skip_divider();
            let next = self.peek_next_token_skip_divider();
            if next.kind == TokenKind::Number {
                self.get_next_token_skip_divider();
                stmt.params.push(next);
            } else {
                stmt.else_stmt = Some(self.parse_nested_statement());
                return;
            }
        }

        self.expect_statement_end("IF operator");
    }

    fn parse_nested_statement(&mut self) -> Box<Statement> {
        let token = self.get_next_token_skip_divider();
        let mut sub = Statement::default();
        self.parse_statement(&mut sub, token);
        Box::new(sub)
    }

    /// INPUT ["prompt" ;] var [, var ...]
    pub(crate) fn parse_input(&mut self, stmt: &mut Statement) {
        let token = self.peek_next_token_skip_divider();
        if token.kind == TokenKind::String {
            self.get_next_token_skip_divider();
            stmt.params.push(token);

            let sep = self.get_next_token_skip_divider();
            if !sep.is_semicolon() && !sep.is_comma() {
                self.error(&sep, "Separator expected after INPUT prompt.");
                return;
            }
        }

        loop {
            let token = self.get_next_token_skip_divider();
            if token.kind != TokenKind::Identifier {
                self.error(&token, "INPUT variable expected.");
                return;
            }
            stmt.variables.push(Variable::new(&token.text));

            let sep = self.peek_next_token_skip_divider();
            if sep.is_comma() {
                self.get_next_token_skip_divider();
                continue;
            }
            break;
        }
        self.expect_statement_end("INPUT");
    }

    /// KEY <index>, <text>
    pub(crate) fn parse_key(&mut self, stmt: &mut Statement) {
        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(expr);

        if !self.expect_comma() {
            return;
        }

        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(expr);
        self.expect_statement_end("KEY");
    }

    pub(crate) fn parse_let(&mut self, stmt: &mut Statement) {
        let token = self.get_next_token_skip_divider();
        if token.kind != TokenKind::Identifier {
            self.error(&token, "LET variable expected.");
            return;
        }
        self.parse_let_short(token, stmt);
    }

    /// Assignment tail shared by LET and the implicit form: the target
    /// (optionally subscripted), `=`, and the value expression.
    pub(crate) fn parse_let_short(&mut self, token_ident: Token, stmt: &mut Statement) {
        stmt.ident = token_ident.clone();
        let mut varexpr = VariableExpression::new(&token_ident.text);

        let next = self.peek_next_token_skip_divider();
        if next.is_open_bracket() {
            self.get_next_token_skip_divider();
            loop {
                let arg = self.parse_expression();
                if self.had_error {
                    return;
                }
                varexpr.args.push(arg);

                let sep = self.get_next_token_skip_divider();
                if sep.is_close_bracket() {
                    break;
                }
                if !sep.is_comma() {
                    self.error(&sep, "Close bracket expected in LET.");
                    return;
                }
            }
        }
        stmt.varexprs.push(varexpr);

        let eq = self.get_next_token_skip_divider();
        if !eq.is_equal_sign() {
            self.error(&eq, "LET '=' symbol expected.");
            return;
        }

        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(expr);
        self.expect_statement_end("LET");
    }

    /// NEXT [var [, var ...]]
    pub(crate) fn parse_next_stmt(&mut self, stmt: &mut Statement) {
        let token = self.peek_next_token_skip_divider();
        if Self::at_statement_end(&token) {
            if matches!(token.kind, TokenKind::Eol | TokenKind::EndComment) {
                self.get_next_token_skip_divider();
            }
            return;
        }

        loop {
            let token = self.get_next_token_skip_divider();
            if token.kind != TokenKind::Identifier {
                self.error(&token, "NEXT variable expected.");
                return;
            }
            stmt.params.push(token);

            let sep = self.peek_next_token_skip_divider();
            if sep.is_comma() {
                self.get_next_token_skip_divider();
                continue;
            }
            break;
        }
        self.expect_statement_end("NEXT");
    }

    /// ON expr GOTO/GOSUB n1, n2, ...
    pub(crate) fn parse_on(&mut self, stmt: &mut Statement) {
        let start = self.peek_next_token_skip_divider();
        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        if expr.is_empty() {
            self.error(&start, "ON expression should not be empty.");
            return;
        }
        stmt.args.push(expr);

        let token = self.get_next_token_skip_divider();
        if token.is_keyword(Keyword::Goto) {
            stmt.gotogosub = true;
        } else if token.is_keyword(Keyword::Gosub) {
            stmt.gotogosub = false;
        } else {
            self.error(&token, "GOTO or GOSUB expected in ON operator.");
            return;
        }

        loop {
            let token = self.get_next_token_skip_divider();
            if token.kind != TokenKind::Number || !token.is_dvalue_integer() {
                self.error(&token, "Integer parameter expected.");
                return;
            }
            stmt.params.push(token);

            let sep = self.peek_next_token_skip_divider();
            if sep.is_comma() {
                self.get_next_token_skip_divider();
                continue;
            }
            break;
        }
        self.expect_statement_end("ON");
    }

    /// OPEN <string expression>
    pub(crate) fn parse_open(&mut self, stmt: &mut Statement) {
        let expr = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(expr);
        self.expect_statement_end("OPEN");
    }

    /// OUT <port>, <mask>, <value>
    pub(crate) fn parse_out(&mut self, stmt: &mut Statement) {
        self.parse_fixed_args(stmt, 3, "OUT");
    }

    /// POKE <address>, <value>
    pub(crate) fn parse_poke(&mut self, stmt: &mut Statement) {
        self.parse_fixed_args(stmt, 2, "POKE");
    }

    fn parse_fixed_args(&mut self, stmt: &mut Statement, count: usize, name: &str) {
        for i in 0..count {
            let expr = self.parse_expression();
            if self.had_error {
                return;
            }
            stmt.args.push(expr);

            if i + 1 < count && !self.expect_comma() {
                return;
            }
        }
        self.expect_statement_end(name);
    }

    /// PRINT [expr] [; expr ...] [,] [;]
    pub(crate) fn parse_print(&mut self, stmt: &mut Statement) {
        loop {
            let token = self.peek_next_token_skip_divider();
            if Self::at_statement_end(&token) {
                if matches!(token.kind, TokenKind::Eol | TokenKind::EndComment) {
                    self.get_next_token_skip_divider();
                }
                break;
            }

            if token.is_semicolon() || token.is_comma() {
                self.get_next_token_skip_divider();
                if token.is_comma() {
                    // The print-zone separator takes part in the
                    // argument list as a bare comma node.
                    let mut comma = Expression::new();
                    comma.push_node(ExpressionNode::new(token.clone()));
                    comma.root = 0;
                    stmt.args.push(comma);
                }

                let next = self.peek_next_token_skip_divider();
                if Self::at_statement_end(&next) {
                    stmt.nocrlf = true;
                    if matches!(next.kind, TokenKind::Eol | TokenKind::EndComment) {
                        self.get_next_token_skip_divider();
                    }
                    break;
                }
                continue;
            }

            let expr = self.parse_expression();
            if self.had_error {
                return;
            }
            if expr.is_empty() {
                self.error(&token, "Expression expected in PRINT.");
                return;
            }
            stmt.args.push(expr);
        }
    }

    /// PSET/PRESET [@] (x, y) [, color]
    pub(crate) fn parse_pset_preset(&mut self, stmt: &mut Statement) {
        let name = stmt.token.keyword.as_str().to_string();
        self.parse_coord_prefix(stmt);
        if !self.parse_coord_pair(stmt) {
            return;
        }

        let sep = self.peek_next_token_skip_divider();
        if sep.is_comma() {
            self.get_next_token_skip_divider();
            let expr = self.parse_expression();
            if self.had_error {
                return;
            }
            stmt.args.push(expr);
        }
        self.expect_statement_end(&name);
    }

    /// LINE [@] [(x1, y1)] - (x2, y2) [, color]
    pub(crate) fn parse_line_stmt(&mut self, stmt: &mut Statement) {
        self.parse_coord_prefix(stmt);

        let token = self.peek_next_token_skip_divider();
        if token.is_operation("-") {
            // First point omitted: continue from the current position.
            stmt.args.push(Expression::new());
            stmt.args.push(Expression::new());
        } else if !self.parse_coord_pair(stmt) {
            return;
        }

        let dash = self.get_next_token_skip_divider();
        if !dash.is_operation("-") {
            self.error(&dash, "'-' expected in LINE operator.");
            return;
        }

        if !self.parse_coord_pair(stmt) {
            return;
        }

        let sep = self.peek_next_token_skip_divider();
        if sep.is_comma() {
            self.get_next_token_skip_divider();
            let expr = self.parse_expression();
            if self.had_error {
                return;
            }
            stmt.args.push(expr);
        }
        self.expect_statement_end("LINE");
    }

    /// CIRCLE [@] (x, y), r [, color [, start [, end [, aspect]]]]
    pub(crate) fn parse_circle(&mut self, stmt: &mut Statement) {
        self.parse_coord_prefix(stmt);
        if !self.parse_coord_pair(stmt) {
            return;
        }
        if !self.expect_comma() {
            return;
        }

        let radius = self.parse_expression();
        if self.had_error {
            return;
        }
        stmt.args.push(radius);

        self.parse_optional_args(stmt);
        self.expect_statement_end("CIRCLE");
    }

    /// PAINT [@] (x, y) [, color [, border]]
    pub(crate) fn parse_paint(&mut self, stmt: &mut Statement) {
        self.parse_coord_prefix(stmt);
        if !self.parse_coord_pair(stmt) {
            return;
        }
        self.parse_optional_args(stmt);
        self.expect_statement_end("PAINT");
    }

    /// Trailing `, expr` groups; empty slots allowed.
    fn parse_optional_args(&mut self, stmt: &mut Statement) {
        loop {
            let sep = self.peek_next_token_skip_divider();
            if !sep.is_comma() {
                break;
            }
            self.get_next_token_skip_divider();
            let expr = self.parse_expression();
            if self.had_error {
                return;
            }
            stmt.args.push(expr);
        }
    }

    fn parse_coord_prefix(&mut self, stmt: &mut Statement) {
        let token = self.peek_next_token_skip_divider();
        if token.is_symbol('@') {
            self.get_next_token_skip_divider();
            stmt.relative = true;
        }
    }

    fn parse_coord_pair(&mut self, stmt: &mut Statement) -> bool {
        let token = self.get_next_token_skip_divider();
        if !token.is_open_bracket() {
            self.error(&token, "Open bracket expected.");
            return false;
        }

        let x = self.parse_expression();
        if self.had_error {
            return false;
        }
        stmt.args.push(x);

        if !self.expect_comma() {
            return false;
        }

        let y = self.parse_expression();
        if self.had_error {
            return false;
        }
        stmt.args.push(y);

        let token = self.get_next_token_skip_divider();
        if !token.is_close_bracket() {
            self.error(&token, "Close bracket expected.");
            return false;
        }
        true
    }

    /// READ var [, var ...]
    pub(crate) fn parse_read(&mut self, stmt: &mut Statement) {
        loop {
            let token = self.get_next_token_skip_divider();
            if token.kind != TokenKind::Identifier {
                self.error(&token, "READ variable expected.");
                return;
            }
            stmt.variables.push(Variable::new(&token.text));

            let sep = self.peek_next_token_skip_divider();
            if sep.is_comma() {
                self.get_next_token_skip_divider();
                continue;
            }
            break;
        }
        self.expect_statement_end("READ");
    }

    /// RESTORE [linenumber]
    pub(crate) fn parse_restore(&mut self, stmt: &mut Statement) {
        let token = self.peek_next_token_skip_divider();
        if token.kind == TokenKind::Number && token.is_dvalue_integer() {
            self.get_next_token_skip_divider();
            stmt.paramline = token.dvalue as u32;
        }
        self.expect_statement_end("RESTORE");
    }

    /// SCREEN <number>
    pub(crate) fn parse_screen(&mut self, stmt: &mut Statement) {
        let token = self.get_next_token_skip_divider();
        if token.kind != TokenKind::Number {
            self.error(&token, "Numeric parameter expected.");
            return;
        }
        stmt.params.push(token);
        self.expect_statement_end("SCREEN");
    }

    /// WIDTH <number> [, <number>]
    pub(crate) fn parse_width(&mut self, stmt: &mut Statement) {
        let token = self.get_next_token_skip_divider();
        if token.kind != TokenKind::Number {
            self.error(&token, "Numeric parameter expected.");
            return;
        }
        stmt.params.push(token);

        let sep = self.peek_next_token_skip_divider();
        if sep.is_comma() {
            self.get_next_token_skip_divider();
            let token = self.get_next_token_skip_divider();
            if token.kind != TokenKind::Number {
                self.error(&token, "Numeric parameter expected.");
                return;
            }
            stmt.params.push(token);
        }
        self.expect_statement_end("WIDTH");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SourceLine, SourceModel};
    use basc_util::Handler;

    fn parse(source: &str) -> (SourceModel, Handler) {
        let handler = Handler::new();
        let mut model = SourceModel::new();
        {
            let tokenizer = basc_lex::Tokenizer::new(source);
            let mut parser = Parser::new(tokenizer, &handler);
            while let Some(line) = parser.parse_next_line() {
                model.lines.push(line);
            }
        }
        (model, handler)
    }

    fn parse_line(source: &str) -> SourceLine {
        let (model, handler) = parse(source);
        assert!(
            !handler.has_errors(),
            "unexpected errors: {:?}",
            handler.drain()
        );
        model.lines.into_iter().next().unwrap()
    }

    #[test]
    fn test_for_with_to() {
        let line = parse_line("10 FOR I% = 1 TO 10\n");
        let stmt = &line.statement;
        assert_eq!(stmt.token.keyword, Keyword::For);
        assert_eq!(stmt.ident.text, "I%");
        assert_eq!(stmt.args.len(), 2);
    }

    #[test]
    fn test_for_with_step() {
        let line = parse_line("10 FOR I% = 1 TO 10 STEP 2\n");
        assert_eq!(line.statement.args.len(), 3);
    }

    #[test]
    fn test_for_missing_to() {
        let (_, handler) = parse("10 FOR I% = 1, 10\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags[0].message.contains("TO expected"));
    }

    #[test]
    fn test_goto() {
        let line = parse_line("10 GOTO 100\n");
        assert_eq!(line.statement.paramline, 100);
    }

    #[test]
    fn test_gosub_missing_number() {
        let (_, handler) = parse("10 GOSUB X\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags[0].message.contains("GOSUB line number expected"));
    }

    #[test]
    fn test_next_with_variables() {
        let line = parse_line("10 NEXT I%, J%\n");
        let params = &line.statement.params;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].text, "I%");
        assert_eq!(params[1].text, "J%");
    }

    #[test]
    fn test_next_bare() {
        let line = parse_line("10 NEXT\n");
        assert!(line.statement.params.is_empty());
    }

    #[test]
    fn test_on_goto() {
        let line = parse_line("10 ON K% GOTO 100, 200, 300\n");
        let stmt = &line.statement;
        assert!(stmt.gotogosub);
        assert_eq!(stmt.args.len(), 1);
        assert_eq!(stmt.params.len(), 3);
        assert_eq!(stmt.params[1].dvalue, 200.0);
    }

    #[test]
    fn test_on_gosub() {
        let line = parse_line("10 ON K% GOSUB 100, 200\n");
        assert!(!line.statement.gotogosub);
    }

    #[test]
    fn test_print_semicolons() {
        let line = parse_line("10 PRINT \"A\"; B%; 3\n");
        let stmt = &line.statement;
        assert_eq!(stmt.args.len(), 3);
        assert!(!stmt.nocrlf);
    }

    #[test]
    fn test_print_trailing_semicolon() {
        let line = parse_line("10 PRINT \"A\";\n");
        assert!(line.statement.nocrlf);
    }

    #[test]
    fn test_print_adjacent_strings() {
        let line = parse_line("10 PRINT \"AB\" \"CD\"\n");
        assert_eq!(line.statement.args.len(), 2);
    }

    #[test]
    fn test_print_comma_argument() {
        let line = parse_line("10 PRINT 1, 2\n");
        let stmt = &line.statement;
        // Three arguments: 1, the comma zone separator, 2.
        assert_eq!(stmt.args.len(), 3);
        assert!(stmt.args[1].root_node().unwrap().token.is_comma());
    }

    #[test]
    fn test_print_empty() {
        let line = parse_line("10 PRINT\n");
        assert!(line.statement.args.is_empty());
        assert!(!line.statement.nocrlf);
    }

    #[test]
    fn test_dim() {
        let line = parse_line("10 DIM A%(10), M(5, 5)\n");
        let vars = &line.statement.variables;
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "A%");
        assert_eq!(vars[0].indices, vec![10]);
        assert_eq!(vars[1].indices, vec![5, 5]);
    }

    #[test]
    fn test_input_with_prompt() {
        let line = parse_line("10 INPUT \"VALUE\"; A%, B%\n");
        let stmt = &line.statement;
        assert_eq!(stmt.params.len(), 1);
        assert_eq!(stmt.params[0].svalue, "VALUE");
        assert_eq!(stmt.variables.len(), 2);
    }

    #[test]
    fn test_input_without_prompt() {
        let line = parse_line("10 INPUT A%\n");
        assert!(line.statement.params.is_empty());
        assert_eq!(line.statement.variables.len(), 1);
    }

    #[test]
    fn test_data_items() {
        let line = parse_line("10 DATA 1, -2, \"TEXT\"\n");
        let params = &line.statement.params;
        assert_eq!(params.len(), 3);
        assert_eq!(params[1].dvalue, -2.0);
        assert_eq!(params[2].svalue, "TEXT");
    }

    #[test]
    fn test_read_variables() {
        let line = parse_line("10 READ A%, B$\n");
        assert_eq!(line.statement.variables.len(), 2);
    }

    #[test]
    fn test_restore_with_line() {
        let line = parse_line("10 RESTORE 100\n");
        assert_eq!(line.statement.paramline, 100);
    }

    #[test]
    fn test_restore_bare() {
        let line = parse_line("10 RESTORE\n");
        assert_eq!(line.statement.paramline, 0);
    }

    #[test]
    fn test_if_then_line() {
        let line = parse_line("10 IF A% > 0 THEN 100\n");
        let stmt = &line.statement;
        assert_eq!(stmt.args.len(), 1);
        assert_eq!(stmt.then_line_token().unwrap().dvalue, 100.0);
        assert!(!stmt.has_else());
    }

    #[test]
    fn test_if_goto_line() {
        let line = parse_line("10 IF A% > 0 GOTO 100\n");
        assert_eq!(line.statement.then_line_token().unwrap().dvalue, 100.0);
    }

    #[test]
    fn test_if_then_else_lines() {
        let line = parse_line("10 IF A% > 0 THEN 100 ELSE 200\n");
        let stmt = &line.statement;
        assert_eq!(stmt.then_line_token().unwrap().dvalue, 100.0);
        assert_eq!(stmt.else_line_token().unwrap().dvalue, 200.0);
    }

    #[test]
    fn test_if_then_statement() {
        let line = parse_line("10 IF A% > 0 THEN PRINT \"POS\"\n");
        let stmt = &line.statement;
        let then_stmt = stmt.then_stmt.as_ref().unwrap();
        assert_eq!(then_stmt.token.keyword, Keyword::Print);
        assert!(stmt.then_line_token().is_none());
    }

    #[test]
    fn test_if_then_statement_else_line() {
        let line = parse_line("10 IF A% > 0 THEN PRINT \"POS\" ELSE 200\n");
        let stmt = &line.statement;
        assert!(stmt.then_stmt.is_some());
        assert_eq!(stmt.else_line_token().unwrap().dvalue, 200.0);
    }

    #[test]
    fn test_if_then_line_else_statement() {
        let line = parse_line("10 IF A% THEN 100 ELSE BEEP\n");
        let stmt = &line.statement;
        assert_eq!(stmt.then_line_token().unwrap().dvalue, 100.0);
        assert_eq!(
            stmt.else_stmt.as_ref().unwrap().token.keyword,
            Keyword::Beep
        );
        assert!(stmt.else_line_token().is_none());
        assert!(stmt.has_else());
    }

    #[test]
    fn test_poke() {
        let line = parse_line("10 POKE &H1000, 255\n");
        assert_eq!(line.statement.args.len(), 2);
    }

    #[test]
    fn test_out() {
        let line = parse_line("10 OUT 177714, 0, 255\n");
        assert_eq!(line.statement.args.len(), 3);
    }

    #[test]
    fn test_color_with_empty_slot() {
        let line = parse_line("10 COLOR , 2\n");
        let args = &line.statement.args;
        assert_eq!(args.len(), 2);
        assert!(args[0].is_empty());
        assert!(!args[1].is_empty());
    }

    #[test]
    fn test_pset() {
        let line = parse_line("10 PSET (10, 20), 3\n");
        let stmt = &line.statement;
        assert!(!stmt.relative);
        assert_eq!(stmt.args.len(), 3);
    }

    #[test]
    fn test_pset_relative() {
        let line = parse_line("10 PSET @(10, 20)\n");
        assert!(line.statement.relative);
        assert_eq!(line.statement.args.len(), 2);
    }

    #[test]
    fn test_line_full() {
        let line = parse_line("10 LINE (0, 0) - (100, 100), 2\n");
        assert_eq!(line.statement.args.len(), 5);
    }

    #[test]
    fn test_line_from_current() {
        let line = parse_line("10 LINE - (100, 100)\n");
        let args = &line.statement.args;
        assert_eq!(args.len(), 4);
        assert!(args[0].is_empty());
        assert!(args[1].is_empty());
    }

    #[test]
    fn test_circle() {
        let line = parse_line("10 CIRCLE (128, 100), 50, 2\n");
        assert_eq!(line.statement.args.len(), 4);
    }

    #[test]
    fn test_def_usr() {
        let line = parse_line("10 DEF USR1 = &H1000\n");
        let stmt = &line.statement;
        assert!(!stmt.deffnorusr);
        assert_eq!(stmt.paramline, 1);
        assert_eq!(stmt.args.len(), 1);
    }

    #[test]
    fn test_def_fn() {
        let line = parse_line("10 DEF FN A(X) = X * 2\n");
        let stmt = &line.statement;
        assert!(stmt.deffnorusr);
        assert_eq!(stmt.ident.text, "A");
        assert_eq!(stmt.params.len(), 1);
        assert_eq!(stmt.args.len(), 1);
    }

    #[test]
    fn test_screen_and_width() {
        let line = parse_line("10 SCREEN 2\n");
        assert_eq!(line.statement.params.len(), 1);

        let line = parse_line("10 WIDTH 80, 24\n");
        assert_eq!(line.statement.params.len(), 2);
    }

    #[test]
    fn test_let_array_target() {
        let line = parse_line("10 LET M(2, 3) = 7\n");
        let stmt = &line.statement;
        assert_eq!(stmt.varexprs.len(), 1);
        assert_eq!(stmt.varexprs[0].args.len(), 2);
        assert_eq!(stmt.args.len(), 1);
    }

    #[test]
    fn test_ignored_statements_parse() {
        for source in [
            "10 CLOAD \"X\"\n",
            "10 SAVE \"Y\", A\n",
            "10 LPRINT \"Z\"\n",
            "10 CLOSE\n",
        ] {
            let (model, handler) = parse(source);
            assert!(!handler.has_errors(), "errors for {:?}", source);
            assert!(!model.lines[0].error);
        }
    }

    #[test]
    fn test_tron_troff_distinct() {
        let (model, handler) = parse("10 TRON\n20 TROFF\n");
        assert!(!handler.has_errors());
        assert_eq!(model.lines[0].statement.token.keyword, Keyword::Tron);
        assert_eq!(model.lines[1].statement.token.keyword, Keyword::Troff);
    }
}
