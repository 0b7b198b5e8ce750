//! Operator-precedence expression parsing.
//!
//! The tree is grown incrementally while reading tokens, alternating
//! between expecting an operand and expecting a binary operator. New
//! operator nodes climb the tree from the previous insertion point per
//! the priority table on [`ExpressionNode::priority`]; bracketed
//! sub-expressions are parsed recursively and spliced in with their
//! root frozen against rotations.

use basc_lex::{Keyword, Token, TokenKind};

use crate::ast::{Expression, ExpressionNode};
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parse one expression; empty when the next token already ends
    /// an expression.
    pub(crate) fn parse_expression(&mut self) -> Expression {
        let mut expr = Expression::new();
        let mut isop = false; // currently expecting a binary operation
        let mut prev: i32 = -1; // index of the previous operation node

        let token = self.peek_next_token_skip_divider();
        if token.is_end_of_expression() {
            return expr; // empty expression
        }

        // Unary plus/minus/NOT prefixing the first operand.
        if token.is_operation("+") || token.is_operation("-") || token.is_keyword(Keyword::Not) {
            let token = self.get_next_token_skip_divider();
            expr.push_node(ExpressionNode::new(token));
            expr.root = 0;
            prev = 0;
        }

        loop {
            let token = self.peek_next_token_skip_divider();

            if isop {
                // A string literal can never continue an expression;
                // PRINT picks it up as its next argument.
                if token.is_end_of_expression() || token.kind == TokenKind::String {
                    break;
                }
                if !token.is_binary_operation() {
                    self.error(&token, "Binary operation expected in expression.");
                    return expr;
                }

                let token = self.get_next_token_skip_divider();
                prev = expr.add_operation_node(ExpressionNode::new(token), prev);
            } else {
                if token.is_end_of_expression() {
                    self.error(&token, "Operand expected in expression.");
                    return expr;
                }
                if token.is_binary_operation() {
                    self.error(&token, "Binary operation is not expected here.");
                    return expr;
                }

                let token = self.get_next_token_skip_divider();

                // NOT prefix in operand position: insert the node and
                // keep expecting an operand for its right child.
                if token.is_keyword(Keyword::Not) {
                    let index = expr.push_node(ExpressionNode::new(token));
                    self.attach_operand(&mut expr, prev, index);
                    prev = index;
                    continue;
                }

                let index = if token.is_open_bracket() {
                    match self.parse_bracketed(&mut expr, &token) {
                        Some(index) => index,
                        None => return expr,
                    }
                } else if token.kind == TokenKind::Keyword && token.keyword.is_function() {
                    match self.parse_call_operand(token) {
                        Some(node) => expr.push_node(node),
                        None => return expr,
                    }
                } else if token.kind == TokenKind::Identifier {
                    // Identifier, possibly an array reference with a
                    // subscript list.
                    match self.parse_call_operand(token) {
                        Some(node) => expr.push_node(node),
                        None => return expr,
                    }
                } else {
                    expr.push_node(ExpressionNode::new(token))
                };

                self.attach_operand(&mut expr, prev, index);
            }

            isop = !isop;
        }

        expr
    }

    /// Link a freshly pushed operand node into the tree.
    fn attach_operand(&mut self, expr: &mut Expression, prev: i32, index: i32) {
        if expr.root < 0 {
            expr.root = index;
            return;
        }
        let pred = if prev < 0 { expr.root } else { prev };
        if expr.nodes[pred as usize].right < 0 {
            expr.nodes[pred as usize].right = index;
        }
    }

    /// Parse `( expression )` and splice it into the host arena.
    fn parse_bracketed(&mut self, expr: &mut Expression, open: &Token) -> Option<i32> {
        let inner = self.parse_expression();
        if self.had_error {
            return None;
        }
        if inner.is_empty() {
            self.error(open, "Expression in brackets should not be empty.");
            return None;
        }

        let token = self.get_next_token_skip_divider();
        if !token.is_close_bracket() {
            self.error(&token, "Close bracket expected in expression.");
            return None;
        }

        Some(expr.splice_bracketed(inner))
    }

    /// Parse a function call or array reference operand: the name
    /// token optionally followed by a parenthesized argument list.
    /// Argument count is not checked here.
    fn parse_call_operand(&mut self, token: Token) -> Option<ExpressionNode> {
        let mut node = ExpressionNode::new(token);

        let next = self.peek_next_token_skip_divider();
        if next.is_open_bracket() {
            self.get_next_token_skip_divider(); // open bracket

            loop {
                let arg = self.parse_expression();
                if self.had_error {
                    return None;
                }
                node.args.push(arg);

                let token = self.peek_next_token_skip_divider();
                if token.is_close_bracket() {
                    self.get_next_token_skip_divider();
                    break;
                }
                if !token.is_comma() {
                    self.error(&token, "Comma expected in function parameter list.");
                    return None;
                }
                self.get_next_token_skip_divider(); // comma
            }
        }

        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceModel;
    use basc_util::Handler;

    /// Parse `10 LET A = <source>` and return the expression.
    fn parse_expr(source: &str) -> (Expression, Handler) {
        let handler = Handler::new();
        let program = format!("10 LET A = {}\n", source);
        let mut model = SourceModel::new();
        {
            let tokenizer = basc_lex::Tokenizer::new(&program);
            let mut parser = Parser::new(tokenizer, &handler);
            while let Some(line) = parser.parse_next_line() {
                model.lines.push(line);
            }
        }
        let expr = model.lines[0].statement.args.first().cloned().unwrap_or_default();
        (expr, handler)
    }

    fn node<'e>(expr: &'e Expression, index: i32) -> &'e ExpressionNode {
        &expr.nodes[index as usize]
    }

    fn root<'e>(expr: &'e Expression) -> &'e ExpressionNode {
        node(expr, expr.root)
    }

    #[test]
    fn test_single_operand() {
        let (expr, handler) = parse_expr("42");
        assert!(!handler.has_errors());
        assert_eq!(expr.nodes.len(), 1);
        assert_eq!(root(&expr).token.dvalue, 42.0);
    }

    #[test]
    fn test_priority_rotation() {
        // 1 + 2 * 3 parses as +(1, *(2, 3))
        let (expr, handler) = parse_expr("1 + 2 * 3");
        assert!(!handler.has_errors());
        assert_eq!(root(&expr).token.text, "+");
        let right = node(&expr, root(&expr).right);
        assert_eq!(right.token.text, "*");
        assert_eq!(node(&expr, right.left).token.dvalue, 2.0);
        assert_eq!(node(&expr, right.right).token.dvalue, 3.0);
    }

    #[test]
    fn test_equal_priority_is_left_associative() {
        // 10 - 4 - 3 parses as -(-(10, 4), 3)
        let (expr, handler) = parse_expr("10 - 4 - 3");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.text, "-");
        assert_eq!(node(&expr, r.left).token.text, "-");
        assert_eq!(node(&expr, r.right).token.dvalue, 3.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        let (expr, handler) = parse_expr("2 ^ 3 ^ 2");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.text, "^");
        assert_eq!(node(&expr, r.left).token.dvalue, 2.0);
        assert_eq!(node(&expr, r.right).token.text, "^");
    }

    #[test]
    fn test_brackets_freeze_precedence() {
        // (1 + 2) * 3 keeps the + sub-tree under *
        let (expr, handler) = parse_expr("(1 + 2) * 3");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.text, "*");
        let left = node(&expr, r.left);
        assert_eq!(left.token.text, "+");
        assert!(left.brackets);
    }

    #[test]
    fn test_keyword_operators() {
        // 7 MOD 2 and logical operators use keyword tokens.
        let (expr, handler) = parse_expr("7 MOD 2");
        assert!(!handler.has_errors());
        assert_eq!(root(&expr).token.keyword, Keyword::Mod);

        let (expr, handler) = parse_expr("A AND B OR C");
        assert!(!handler.has_errors());
        // OR (10) binds looser than AND (9): OR(AND(A,B), C)
        assert_eq!(root(&expr).token.keyword, Keyword::Or);
        assert_eq!(node(&expr, root(&expr).left).token.keyword, Keyword::And);
    }

    #[test]
    fn test_not_binds_looser_than_comparison() {
        // NOT A = 1 parses as NOT(=(A, 1))
        let (expr, handler) = parse_expr("NOT A = 1");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.keyword, Keyword::Not);
        assert_eq!(r.left, -1);
        assert_eq!(node(&expr, r.right).token.text, "=");
    }

    #[test]
    fn test_not_after_and() {
        // A AND NOT B parses as AND(A, NOT(B))
        let (expr, handler) = parse_expr("A AND NOT B");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.keyword, Keyword::And);
        let right = node(&expr, r.right);
        assert_eq!(right.token.keyword, Keyword::Not);
        assert_eq!(node(&expr, right.right).token.text, "B");
    }

    #[test]
    fn test_unary_minus() {
        // - A + 1 parses as +(-(A), 1)
        let (expr, handler) = parse_expr("- A + 1");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.text, "+");
        let left = node(&expr, r.left);
        assert_eq!(left.token.text, "-");
        assert_eq!(left.left, -1);
    }

    #[test]
    fn test_function_call_with_args() {
        let (expr, handler) = parse_expr("SIN(1)");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.keyword, Keyword::Sin);
        assert_eq!(r.args.len(), 1);
        assert!(!r.args[0].is_empty());
    }

    #[test]
    fn test_function_multi_args() {
        let (expr, handler) = parse_expr("MID$(S$, 2, 3)");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.keyword, Keyword::Mid);
        assert_eq!(r.args.len(), 3);
    }

    #[test]
    fn test_function_without_brackets() {
        let (expr, handler) = parse_expr("PI * 2");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.text, "*");
        assert_eq!(node(&expr, r.left).token.keyword, Keyword::Pi);
        assert!(node(&expr, r.left).args.is_empty());
    }

    #[test]
    fn test_array_reference() {
        let (expr, handler) = parse_expr("M(2, 3)");
        assert!(!handler.has_errors());
        let r = root(&expr);
        assert_eq!(r.token.kind, TokenKind::Identifier);
        assert_eq!(r.args.len(), 2);
    }

    #[test]
    fn test_missing_close_bracket() {
        let (_, handler) = parse_expr("(1 + 2");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("Close bracket expected")));
    }

    #[test]
    fn test_missing_operand() {
        let (_, handler) = parse_expr("1 +");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("Operand expected")));
    }

    #[test]
    fn test_doubled_operator() {
        let (_, handler) = parse_expr("1 + * 2");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("Binary operation is not expected here")));
    }

    #[test]
    fn test_empty_brackets() {
        let (_, handler) = parse_expr("()");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("should not be empty")));
    }
}
