//! Per-statement validation routines.

use basc_lex::{Keyword, Token, TokenKind};
use basc_par::{Expression, ExpressionNode, Statement, Variable};
use basc_util::{canonical_name, ValueType};

use crate::{ForSpec, Validator};

impl<'a> Validator<'a> {
    /// Range check for a constant parameter expression.
    fn check_const_range(&mut self, expr: &Expression, min: i32, max: i32) {
        if expr.is_const() {
            let ivalue = expr.const_dvalue() as i32;
            if ivalue < min || ivalue > max {
                self.error(format!(
                    "Parameter value ({}) is out of range {}..{}.",
                    ivalue, min, max
                ));
            }
        }
    }

    pub(crate) fn validate_clear(&mut self, stmt: &mut Statement) {
        if stmt.args.is_empty() {
            self.error("Parameter expected.");
            return;
        }
        if stmt.args.len() > 2 {
            self.error("Too many parameters.");
            return;
        }
        for expr in stmt.args.iter_mut() {
            if !self.check_integer_or_single_expression(expr) {
                return;
            }
        }
    }

    pub(crate) fn validate_color(&mut self, stmt: &mut Statement) {
        if stmt.args.is_empty() {
            self.error("Parameter expected.");
            return;
        }
        if stmt.args.len() > 3 {
            self.error("Too many parameters.");
            return;
        }
        for index in 0..stmt.args.len() {
            let mut expr = std::mem::take(&mut stmt.args[index]);
            if !expr.is_empty() {
                if !self.check_integer_or_single_expression(&mut expr) {
                    stmt.args[index] = expr;
                    return;
                }
                self.check_const_range(&expr, 0, 8);
            }
            stmt.args[index] = expr;
        }
    }

    pub(crate) fn validate_data(&mut self, stmt: &mut Statement) {
        if stmt.params.is_empty() {
            self.error("Parameter(s) expected.");
            return;
        }
        for index in 0..stmt.params.len() {
            let token = stmt.params[index].clone();
            if !matches!(token.kind, TokenKind::Number | TokenKind::String) {
                self.error("Parameter should be of type Number or String.");
                return;
            }
            if token.kind == TokenKind::String && !token.svalue.is_empty() {
                self.source.register_const_string(&token.svalue);
            }
        }
    }

    pub(crate) fn validate_read(&mut self, stmt: &mut Statement) {
        if stmt.variables.is_empty() {
            self.error("Variable(s) expected.");
            return;
        }
        for var in &stmt.variables {
            self.source.register_variable(var.clone());
        }
    }

    pub(crate) fn validate_dim(&mut self, stmt: &mut Statement) {
        for var in &stmt.variables {
            let name = var.name.clone();
            if !self.source.register_variable(var.clone()) {
                self.error(format!("Variable redefinition for {}.", name));
                return;
            }
        }
    }

    pub(crate) fn validate_key(&mut self, stmt: &mut Statement) {
        if stmt.args.len() != 2 {
            self.error("Two parameters expected.");
            return;
        }
        let (index_expr, rest) = stmt.args.split_first_mut().unwrap();
        if !self.check_integer_or_single_expression(index_expr) {
            return;
        }
        if index_expr.is_const() {
            let ivalue = index_expr.const_dvalue() as i32;
            if !(1..=10).contains(&ivalue) {
                self.error(format!(
                    "Parameter value ({}) is out of range 1..10.",
                    ivalue
                ));
                return;
            }
        }
        if !self.check_string_expression(&mut rest[0]) {
            return;
        }
    }

    pub(crate) fn validate_draw(&mut self, stmt: &mut Statement) {
        if stmt.args.len() != 1 {
            self.error("One parameter expected.");
            return;
        }
        let mut expr = std::mem::take(&mut stmt.args[0]);
        if self.check_string_expression(&mut expr) {
            self.register_const_string_result(&mut expr);
        }
        stmt.args[0] = expr;
    }

    pub(crate) fn validate_for(&mut self, stmt: &mut Statement) {
        if stmt.ident.kind != TokenKind::Identifier {
            self.error("Identifier expected.");
            return;
        }

        let varname = canonical_name(&stmt.ident.text);
        self.source.register_variable(Variable::new(&varname));

        // Open the loop on the FOR/NEXT pairing stack.
        let line_number = self.current_line;
        self.fornext_stack.push(ForSpec {
            line_number,
            varname,
        });

        if stmt.args.len() < 2 {
            self.error("Two parameters expected.");
            return;
        }
        if stmt.args.len() > 3 {
            self.error("Too many parameters.");
            return;
        }
        for expr in stmt.args.iter_mut() {
            if !self.check_integer_or_single_expression(expr) {
                return;
            }
        }
    }

    pub(crate) fn validate_goto_gosub(&mut self, stmt: &mut Statement) {
        if !self.line_number_exists(stmt.paramline) {
            self.error(format!("Invalid line number {}.", stmt.paramline));
        }
    }

    pub(crate) fn validate_if(&mut self, stmt: &mut Statement) {
        if stmt.args.len() != 1 {
            self.error("One parameter expected.");
            return;
        }
        let mut expr = std::mem::take(&mut stmt.args[0]);
        if expr.is_empty() {
            self.error("Expression should not be empty.");
            return;
        }
        self.validate_expression(&mut expr);
        stmt.args[0] = expr;

        // THEN branch.
        if let Some(mut sub) = stmt.then_stmt.take() {
            self.validate_statement(&mut sub);
            stmt.then_stmt = Some(sub);
        } else {
            match stmt.then_line_token() {
                Some(token) => {
                    let number = token.dvalue as u32;
                    if !self.line_number_exists(number) {
                        self.error(format!("Invalid line number {}.", number));
                        return;
                    }
                }
                None => {
                    self.error("One or two parameters expected.");
                    return;
                }
            }
        }

        // ELSE branch.
        if let Some(mut sub) = stmt.else_stmt.take() {
            self.validate_statement(&mut sub);
            stmt.else_stmt = Some(sub);
        } else if let Some(token) = stmt.else_line_token() {
            let number = token.dvalue as u32;
            if !self.line_number_exists(number) {
                self.error(format!("Invalid line number {}.", number));
            }
        }
    }

    pub(crate) fn validate_input(&mut self, stmt: &mut Statement) {
        if stmt.params.len() > 1 {
            self.error("Too many parameters.");
            return;
        }
        if let Some(param) = stmt.params.first() {
            if param.kind != TokenKind::String {
                self.error("Parameter should be of type String.");
                return;
            }
            let prompt = param.svalue.clone();
            if !prompt.is_empty() {
                self.source.register_const_string(&prompt);
            }
        }

        if stmt.variables.is_empty() {
            self.error("Variable(s) expected.");
            return;
        }
        for var in &stmt.variables {
            self.source.register_variable(var.clone());
        }
    }

    pub(crate) fn validate_open(&mut self, stmt: &mut Statement) {
        if stmt.args.len() != 1 {
            self.error("One parameter expected.");
            return;
        }
        let mut expr = std::mem::take(&mut stmt.args[0]);
        let ok = self.check_string_expression(&mut expr);
        if ok {
            self.register_const_string_result(&mut expr);
        }
        stmt.args[0] = expr;
    }

    pub(crate) fn validate_line(&mut self, stmt: &mut Statement) {
        if stmt.args.len() < 4 || stmt.args.len() > 5 {
            self.error("Four or five parameters expected.");
            return;
        }
        // The first point may be omitted (continue from the current
        // position); the second point is required.
        for index in 0..stmt.args.len() {
            let mut expr = std::mem::take(&mut stmt.args[index]);
            let optional = index < 2;
            if !(optional && expr.is_empty()) && !self.check_integer_or_single_expression(&mut expr)
            {
                stmt.args[index] = expr;
                return;
            }
            if index == 4 {
                self.check_const_range(&expr, 0, 8);
            }
            stmt.args[index] = expr;
        }
    }

    pub(crate) fn validate_circle(&mut self, stmt: &mut Statement) {
        if stmt.args.len() < 3 || stmt.args.len() > 7 {
            self.error("Three to seven parameters expected.");
            return;
        }
        for index in 0..stmt.args.len() {
            let mut expr = std::mem::take(&mut stmt.args[index]);
            let optional = index >= 3;
            if !(optional && expr.is_empty()) && !self.check_integer_or_single_expression(&mut expr)
            {
                stmt.args[index] = expr;
                return;
            }
            if index == 3 {
                self.check_const_range(&expr, 0, 8);
            }
            stmt.args[index] = expr;
        }
    }

    pub(crate) fn validate_paint(&mut self, stmt: &mut Statement) {
        if stmt.args.len() < 2 || stmt.args.len() > 4 {
            self.error("Two to four parameters expected.");
            return;
        }
        for index in 0..stmt.args.len() {
            let mut expr = std::mem::take(&mut stmt.args[index]);
            let optional = index >= 2;
            if !(optional && expr.is_empty()) && !self.check_integer_or_single_expression(&mut expr)
            {
                stmt.args[index] = expr;
                return;
            }
            if index >= 2 {
                self.check_const_range(&expr, 0, 8);
            }
            stmt.args[index] = expr;
        }
    }

    pub(crate) fn validate_let(&mut self, stmt: &mut Statement) {
        if stmt.varexprs.len() != 1 {
            self.error("One variable expected.");
            return;
        }

        let mut varexpr = std::mem::take(&mut stmt.varexprs[0]);
        for arg in varexpr.args.iter_mut() {
            self.validate_expression(arg);
        }
        let var_vtype = varexpr.value_type();
        self.source
            .register_variable(Variable::new(&varexpr.canonical_name()));
        stmt.varexprs[0] = varexpr;

        if stmt.args.len() != 1 {
            self.error("One parameter expected.");
            return;
        }
        let mut expr = std::mem::take(&mut stmt.args[0]);
        self.validate_expression(&mut expr);

        let expr_vtype = expr.value_type();
        if expr_vtype != ValueType::None
            && (var_vtype == ValueType::String) != (expr_vtype == ValueType::String)
        {
            self.error("Value types are incompatible.");
        }
        stmt.args[0] = expr;
    }

    pub(crate) fn validate_locate(&mut self, stmt: &mut Statement) {
        if stmt.args.is_empty() {
            self.error("Parameter expected.");
            return;
        }
        if stmt.args.len() > 3 {
            self.error("Too many parameters.");
            return;
        }
        for index in 0..stmt.args.len() {
            let mut expr = std::mem::take(&mut stmt.args[index]);
            if !expr.is_empty() {
                if !self.check_integer_or_single_expression(&mut expr) {
                    stmt.args[index] = expr;
                    return;
                }
                if index < 2 {
                    self.check_const_range(&expr, 0, 255);
                }
            }
            stmt.args[index] = expr;
        }
    }

    pub(crate) fn validate_pset_preset(&mut self, stmt: &mut Statement) {
        if stmt.args.len() < 2 {
            self.error("Parameters expected.");
            return;
        }
        if stmt.args.len() > 3 {
            self.error("Too many parameters.");
            return;
        }
        for index in 0..stmt.args.len() {
            let mut expr = std::mem::take(&mut stmt.args[index]);
            if !expr.is_empty() {
                if !self.check_integer_or_single_expression(&mut expr) {
                    stmt.args[index] = expr;
                    return;
                }
                if index == 2 {
                    self.check_const_range(&expr, 0, 8);
                }
            }
            stmt.args[index] = expr;
        }
    }

    pub(crate) fn validate_next(&mut self, stmt: &mut Statement) {
        if stmt.params.is_empty() {
            // NEXT without a variable adopts the innermost open FOR.
            let Some(spec) = self.fornext_stack.pop() else {
                self.error("NEXT without FOR.");
                return;
            };

            let mut tokenvar = Token::synthetic_identifier(&spec.varname);
            // The paired FOR line rides on the name token.
            tokenvar.dvalue = spec.line_number as f64;
            stmt.params.push(tokenvar);

            stmt.paramline = spec.line_number;
            self.link_for_line(spec.line_number);
            return;
        }

        for index in 0..stmt.params.len() {
            let varname = canonical_name(&stmt.params[index].text);
            if !self.source.is_variable_registered(&varname) {
                self.error(format!("Variable not found: {}.", varname));
                return;
            }

            let Some(spec) = self.fornext_stack.pop() else {
                self.error("NEXT without FOR.");
                return;
            };
            if spec.varname != varname {
                self.error(format!(
                    "NEXT variable expected: {}, found: {}.",
                    spec.varname, varname
                ));
                return;
            }

            stmt.params[index].dvalue = spec.line_number as f64;
            stmt.paramline = spec.line_number;
            self.link_for_line(spec.line_number);
        }
    }

    /// Record this NEXT's line number on the paired FOR statement.
    fn link_for_line(&mut self, for_line: u32) {
        let current = self.current_line;
        if let Some(line) = self.source.line_by_number_mut(for_line) {
            line.statement.paramline = current;
        }
    }

    pub(crate) fn validate_on(&mut self, stmt: &mut Statement) {
        if stmt.args.len() != 1 {
            self.error("One parameter expected.");
            return;
        }
        if !self.check_integer_or_single_expression(&mut stmt.args[0]) {
            return;
        }

        if stmt.params.is_empty() {
            self.error("Parameters expected.");
            return;
        }
        for index in 0..stmt.params.len() {
            let param = stmt.params[index].clone();
            if param.kind != TokenKind::Number || !param.is_dvalue_integer() {
                self.error("Integer parameter expected.");
                return;
            }
            let number = param.dvalue as u32;
            if !self.line_number_exists(number) {
                self.error(format!("Invalid line number {}.", number));
                return;
            }
        }
    }

    pub(crate) fn validate_out(&mut self, stmt: &mut Statement) {
        if stmt.args.len() != 3 {
            self.error("Three parameters expected.");
            return;
        }
        for expr in stmt.args.iter_mut() {
            if !self.check_integer_or_single_expression(expr) {
                return;
            }
        }
    }

    pub(crate) fn validate_poke(&mut self, stmt: &mut Statement) {
        if stmt.args.len() != 2 {
            self.error("Two parameters expected.");
            return;
        }
        for expr in stmt.args.iter_mut() {
            if !self.check_integer_or_single_expression(expr) {
                return;
            }
        }
    }

    pub(crate) fn validate_print(&mut self, stmt: &mut Statement) {
        // First validate the plain arguments, so constant flags are
        // known before the merge step. AT/TAB/SPC roots and comma
        // separators are handled after the merge.
        for arg in stmt.args.iter_mut() {
            if arg.is_empty() {
                self.error("Expressions should not be empty.");
                return;
            }
            let root = arg.root_node().expect("non-empty expression has a root");
            if root.token.is_comma() || Self::is_print_positioner(&root.token) {
                continue;
            }
            self.validate_expression_node_tree(arg);
        }

        // Join adjacent constant string arguments into one constant,
        // repeating until no adjacent pair is foldable. This shrinks
        // the runtime work and the interned-string set.
        let mut index = 0;
        while index + 1 < stmt.args.len() {
            let foldable = {
                let first = &stmt.args[index];
                let second = &stmt.args[index + 1];
                first.is_const()
                    && first.value_type() == ValueType::String
                    && second.is_const()
                    && second.value_type() == ValueType::String
            };
            if !foldable {
                index += 1;
                continue;
            }

            let second = stmt.args.remove(index + 1);
            let first = &mut stmt.args[index];

            let mut svalue = format!("{}{}", first.const_svalue(), second.const_svalue());
            svalue.truncate(255);

            let plus_index = first.nodes.len() as i32;
            let shift = plus_index + 1;
            let mut plus = ExpressionNode::new(Token {
                kind: TokenKind::Operation,
                text: "+".to_string(),
                ..Token::default()
            });
            plus.left = first.root;
            plus.right = second.root + shift;
            plus.vtype = ValueType::String;
            plus.constval = true;
            plus.token.svalue = svalue;
            first.nodes.push(plus);
            first.root = plus_index;

            for mut node in second.nodes {
                if node.left >= 0 {
                    node.left += shift;
                }
                if node.right >= 0 {
                    node.right += shift;
                }
                first.nodes.push(node);
            }
        }

        // Final pass: positioning pseudo-functions and interning.
        for arg in stmt.args.iter_mut() {
            let root_index = arg.root;
            let root_token = arg.nodes[root_index as usize].token.clone();

            if root_token.is_comma() {
                arg.nodes[root_index as usize].vtype = ValueType::Integer;
                continue;
            }

            if root_token.is_keyword(Keyword::At) {
                let mut fnargs = std::mem::take(&mut arg.nodes[root_index as usize].args);
                if fnargs.len() != 2 {
                    self.error("Two expressions expected for AT function.");
                } else if self.check_integer_or_single_expression(&mut fnargs[0]) {
                    self.check_integer_or_single_expression(&mut fnargs[1]);
                }
                arg.nodes[root_index as usize].args = fnargs;
                arg.nodes[root_index as usize].vtype = ValueType::Integer;
                continue;
            }

            if root_token.is_keyword(Keyword::Tab) {
                let mut fnargs = std::mem::take(&mut arg.nodes[root_index as usize].args);
                if fnargs.len() != 1 {
                    self.error("One expression expected for TAB function.");
                } else {
                    self.check_integer_or_single_expression(&mut fnargs[0]);
                }
                arg.nodes[root_index as usize].args = fnargs;
                arg.nodes[root_index as usize].vtype = ValueType::Integer;
                continue;
            }

            if root_token.is_keyword(Keyword::Spc) {
                let mut fnargs = std::mem::take(&mut arg.nodes[root_index as usize].args);
                if fnargs.len() != 1 {
                    self.error("One expression expected for SPC function.");
                } else if self.check_integer_or_single_expression(&mut fnargs[0]) {
                    if fnargs[0].is_const() {
                        let ivalue = fnargs[0].const_dvalue() as i32;
                        if !(0..=255).contains(&ivalue) {
                            self.error(format!(
                                "PRINT SPC argument is {}, out of 0..255 range.",
                                ivalue
                            ));
                        }
                    }
                }
                arg.nodes[root_index as usize].args = fnargs;
                arg.nodes[root_index as usize].vtype = ValueType::Integer;
                continue;
            }

            self.register_const_string_result(arg);
        }
    }

    fn is_print_positioner(token: &Token) -> bool {
        token.is_keyword(Keyword::At)
            || token.is_keyword(Keyword::Tab)
            || token.is_keyword(Keyword::Spc)
    }

    pub(crate) fn validate_restore(&mut self, stmt: &mut Statement) {
        if stmt.paramline != 0 && !self.line_number_exists(stmt.paramline) {
            self.error(format!("Invalid line number {}.", stmt.paramline));
        }
    }

    pub(crate) fn validate_def(&mut self, stmt: &mut Statement) {
        if stmt.deffnorusr {
            // DEF FN
            if stmt.args.len() != 1 {
                self.error("One parameter expected.");
                return;
            }
            let mut expr = std::mem::take(&mut stmt.args[0]);
            self.validate_expression(&mut expr);
            stmt.args[0] = expr;
        } else {
            // DEF USR
            if stmt.paramline > 9 {
                self.error("DEF USR number is out of range 0..9.");
                return;
            }
            if stmt.args.len() != 1 {
                self.error("One parameter expected.");
                return;
            }
            self.check_integer_or_single_expression(&mut stmt.args[0]);
        }
    }

    pub(crate) fn validate_screen(&mut self, stmt: &mut Statement) {
        if stmt.params.is_empty() {
            self.error("Parameter expected.");
            return;
        }
        if stmt.params[0].kind != TokenKind::Number {
            self.error("Numeric parameter expected.");
        }
    }

    // WIDTH <Integer>, [<Integer>]: accepted and ignored.
    pub(crate) fn validate_width(&mut self, stmt: &mut Statement) {
        if stmt.params.is_empty() || stmt.params.len() > 2 {
            self.error("One or two parameters expected.");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::validate_program;

    #[test]
    fn test_print_at_arguments() {
        let (_, handler) = validate_program("10 PRINT AT(2, 3); \"X\"\n");
        assert!(!handler.has_errors(), "errors: {:?}", handler.drain());
    }

    #[test]
    fn test_print_spc_range() {
        let (_, handler) = validate_program("10 PRINT SPC(300)\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("out of 0..255 range")));
    }

    #[test]
    fn test_color_range() {
        let (_, handler) = validate_program("10 COLOR 9\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("out of range 0..8")));
    }

    #[test]
    fn test_key_range() {
        let (_, handler) = validate_program("10 KEY 11, \"LIST\"\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("out of range 1..10")));
    }

    #[test]
    fn test_locate_range() {
        let (_, handler) = validate_program("10 LOCATE 300, 10\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("out of range 0..255")));
    }

    #[test]
    fn test_input_prompt_interned() {
        let (model, handler) = validate_program("10 INPUT \"VALUE\"; A%\n");
        assert!(!handler.has_errors());
        assert_eq!(model.const_string_index("VALUE"), Some(1));
        assert!(model.is_variable_registered("A%"));
    }

    #[test]
    fn test_data_strings_interned() {
        let (model, handler) = validate_program("10 DATA 1, \"TWO\", 3\n");
        assert!(!handler.has_errors());
        assert_eq!(model.const_string_index("TWO"), Some(1));
    }

    #[test]
    fn test_restore_target_checked() {
        let (_, handler) = validate_program("10 RESTORE 99\n");
        assert!(handler.has_errors());

        let (_, handler) = validate_program("10 DATA 1\n20 RESTORE 10\n");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_on_goto_targets_checked() {
        let (_, handler) = validate_program("10 ON K% GOTO 20, 99\n20 END\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("Invalid line number 99")));
    }

    #[test]
    fn test_if_then_else_targets_checked() {
        let (_, handler) = validate_program("10 IF A% THEN 20 ELSE 99\n20 END\n");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_if_nested_statement_validated() {
        let (model, handler) = validate_program("10 IF A% THEN PRINT \"Y\"\n");
        assert!(!handler.has_errors());
        assert_eq!(model.const_string_index("Y"), Some(1));
    }

    #[test]
    fn test_let_type_mismatch() {
        let (_, handler) = validate_program("10 LET A% = \"TEXT\"\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("Value types are incompatible")));
    }

    #[test]
    fn test_def_usr_range() {
        let (_, handler) = validate_program("10 DEF USR12 = &H1000\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("out of range 0..9")));
    }

    #[test]
    fn test_read_registers_variables() {
        let (model, handler) = validate_program("10 DATA 1, 2\n20 READ A%, B%\n");
        assert!(!handler.has_errors());
        assert!(model.is_variable_registered("A%"));
        assert!(model.is_variable_registered("B%"));
    }

    #[test]
    fn test_nested_for_next_pairing() {
        let (model, handler) = validate_program(
            "10 FOR I% = 1 TO 3\n20 FOR J% = 1 TO 3\n30 NEXT J%\n40 NEXT I%\n",
        );
        assert!(!handler.has_errors());
        assert_eq!(model.lines[0].statement.paramline, 40);
        assert_eq!(model.lines[1].statement.paramline, 30);
        assert_eq!(model.lines[2].statement.paramline, 20);
        assert_eq!(model.lines[3].statement.paramline, 10);
    }

    #[test]
    fn test_next_multi_variable() {
        let (model, handler) =
            validate_program("10 FOR I% = 1 TO 3\n20 FOR J% = 1 TO 3\n30 NEXT J%, I%\n");
        assert!(!handler.has_errors());
        let next = &model.lines[2].statement;
        assert_eq!(next.params.len(), 2);
        // Each name token carries its paired FOR line.
        assert_eq!(next.params[0].dvalue, 20.0);
        assert_eq!(next.params[1].dvalue, 10.0);
    }

    #[test]
    fn test_bare_next_adopts_top_variable() {
        let (model, handler) = validate_program("10 FOR I% = 1 TO 3\n20 NEXT\n");
        assert!(!handler.has_errors());
        let next = &model.lines[1].statement;
        assert_eq!(next.params.len(), 1);
        assert_eq!(next.params[0].text, "I%");
        assert_eq!(next.paramline, 10);
    }
}
