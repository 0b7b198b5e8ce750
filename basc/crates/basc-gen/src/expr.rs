//! Expression emission.
//!
//! Every expression leaves its value in R0. Binary operators follow a
//! single discipline: emit the left operand into R0, apply a peephole
//! when the right operand is a small constant or an integer variable,
//! otherwise push R0 with the auto-decrement idiom, emit the right
//! operand and combine. Comparison operators materialize -1/0 through
//! a conditional branch; `IF` bypasses the materialization and
//! consumes the flags directly.

use basc_lex::{Keyword, TokenKind};
use basc_par::{Expression, ExpressionNode, VariableExpression};
use basc_util::{canonical_name, decorated_name, ValueType};

use crate::Generator;

impl<'a> Generator<'a> {
    /// Emit code leaving the expression value in R0.
    pub(crate) fn generate_expression(&mut self, expr: &Expression) {
        if expr.root >= 0 {
            self.generate_expression_node(expr, expr.root);
        }
    }

    pub(crate) fn generate_expression_node(&mut self, expr: &Expression, index: i32) {
        let node = &expr.nodes[index as usize];

        if !node.vtype.is_numeric() {
            self.output.add_comment("TODO calculate non-integer expression");
            return;
        }

        if node.constval {
            let ivalue = Self::int_value(node.token.dvalue);
            if ivalue == 0 {
                self.output.add_line("\tCLR\tR0");
            } else {
                self.output
                    .add_line(format!("\tMOV\t{}, R0", Self::immediate(ivalue)));
            }
            return;
        }

        match node.token.kind {
            TokenKind::Keyword if node.token.keyword.is_function() => {
                self.generate_expr_function(expr, index);
            }
            TokenKind::Keyword if node.token.keyword == Keyword::Not => {
                self.generate_expr_unary(expr, index);
            }
            TokenKind::Keyword if node.token.keyword.is_binary_operator() => {
                self.generate_expr_binary(expr, index);
            }
            TokenKind::Identifier => {
                if node.args.is_empty() {
                    let deconame = decorated_name(&canonical_name(&node.token.text));
                    self.output.add_line(format!("\tMOV\t{}, R0", deconame));
                } else {
                    self.output.add_comment("TODO array element access");
                }
            }
            TokenKind::Operation => {
                if node.left >= 0 && node.right >= 0 {
                    self.generate_expr_binary(expr, index);
                } else if node.right >= 0 {
                    self.generate_expr_unary(expr, index);
                } else {
                    self.output.add_comment("TODO generate complex expression");
                }
            }
            _ => {
                self.output.add_comment("TODO generate complex expression");
            }
        }
    }

    fn generate_expr_unary(&mut self, expr: &Expression, index: i32) {
        let node = &expr.nodes[index as usize];
        let right = node.right;
        let name = Self::operation_name(node);
        self.generate_expression_node(expr, right);
        match name.as_str() {
            "-" => self.output.add_line("\tNEG\tR0\t; unary minus"),
            "NOT" => self.output.add_line("\tCOM\tR0\t; Operation \'NOT\'"),
            _ => {} // unary plus is a no-op
        }
    }

    fn generate_expr_binary(&mut self, expr: &Expression, index: i32) {
        let node = &expr.nodes[index as usize];
        let (left, right) = (node.left, node.right);

        let left_vtype = expr.nodes[left as usize].vtype;
        let right_vtype = expr.nodes[right as usize].vtype;
        if left_vtype == ValueType::None || right_vtype == ValueType::None {
            self.error("Cannot calculate value type for the node.");
            return;
        }

        let name = Self::operation_name(node);
        match name.as_str() {
            "+" => self.generate_oper_plus(expr, left, right),
            "-" => self.generate_oper_minus(expr, left, right),
            "*" => self.generate_oper_mul(expr, left, right),
            "/" => self.generate_oper_div(expr, left, right, "/"),
            "\\" => self.generate_oper_div(expr, left, right, "\\"),
            "MOD" => self.generate_oper_div(expr, left, right, "MOD"),
            "=" => self.generate_oper_compare(expr, left, right, "="),
            "<>" | "><" => self.generate_oper_compare(expr, left, right, "<>"),
            "<" => self.generate_oper_compare(expr, left, right, "<"),
            ">" => self.generate_oper_compare(expr, left, right, ">"),
            "<=" | "=<" => self.generate_oper_compare(expr, left, right, "<="),
            ">=" | "=>" => self.generate_oper_compare(expr, left, right, ">="),
            "AND" | "OR" | "XOR" => self.generate_oper_logical(expr, left, right, &name),
            _ => {
                self.output
                    .add_comment(format!("TODO operation {}", name));
            }
        }
    }

    pub(crate) fn operation_name(node: &ExpressionNode) -> String {
        if node.token.kind == TokenKind::Keyword {
            node.token.keyword.as_str().to_string()
        } else {
            node.token.text.clone()
        }
    }

    /// Right operand as a small integer constant, when the peephole
    /// applies: left integer, right a folded numeric constant.
    fn peephole_const(expr: &Expression, left: i32, right: i32) -> Option<i32> {
        let lnode = &expr.nodes[left as usize];
        let rnode = &expr.nodes[right as usize];
        if lnode.vtype == ValueType::Integer && rnode.constval && rnode.vtype.is_numeric() {
            Some(Self::int_value(rnode.token.dvalue))
        } else {
            None
        }
    }

    /// Right operand as a scalar integer variable.
    fn peephole_var(expr: &Expression, left: i32, right: i32) -> Option<String> {
        let lnode = &expr.nodes[left as usize];
        let rnode = &expr.nodes[right as usize];
        if lnode.vtype == ValueType::Integer
            && rnode.vtype == ValueType::Integer
            && rnode.token.kind == TokenKind::Identifier
            && rnode.args.is_empty()
        {
            Some(decorated_name(&canonical_name(&rnode.token.text)))
        } else {
            None
        }
    }

    fn generate_oper_plus(&mut self, expr: &Expression, left: i32, right: i32) {
        let comment = "\t; Operation \'+\'";

        self.generate_expression_node(expr, left);

        if let Some(ivalue) = Self::peephole_const(expr, left, right) {
            if ivalue == 0 {
                // nothing to add
            } else if ivalue == 1 {
                self.output.add_line(format!("\tINC\tR0{}", comment));
            } else {
                self.output.add_line(format!(
                    "\tADD\t{}, R0{}",
                    Self::immediate(ivalue),
                    comment
                ));
            }
            return;
        }

        if let Some(deconame) = Self::peephole_var(expr, left, right) {
            self.output
                .add_line(format!("\tADD\t{}, R0{}", deconame, comment));
            return;
        }

        self.output.add_line("\tMOV\tR0, -(SP)");
        self.generate_expression_node(expr, right);
        self.output.add_line(format!("\tADD\t(SP)+, R0{}", comment));
    }

    fn generate_oper_minus(&mut self, expr: &Expression, left: i32, right: i32) {
        let comment = "\t; Operation \'-\'";

        self.generate_expression_node(expr, left);

        if let Some(ivalue) = Self::peephole_const(expr, left, right) {
            if ivalue == 0 {
                // nothing to subtract
            } else if ivalue == 1 {
                self.output.add_line(format!("\tDEC\tR0{}", comment));
            } else {
                self.output.add_line(format!(
                    "\tSUB\t{}, R0{}",
                    Self::immediate(ivalue),
                    comment
                ));
            }
            return;
        }

        if let Some(deconame) = Self::peephole_var(expr, left, right) {
            self.output
                .add_line(format!("\tSUB\t{}, R0{}", deconame, comment));
            return;
        }

        self.output.add_line("\tMOV\tR0, -(SP)");
        self.generate_expression_node(expr, right);
        self.output.add_line("\tMOV\tR0, R1");
        self.output.add_line("\tMOV\t(SP)+, R0");
        self.output.add_line(format!("\tSUB\tR1, R0{}", comment));
    }

    fn generate_oper_mul(&mut self, expr: &Expression, left: i32, right: i32) {
        self.generate_expression_node(expr, left);
        self.output.add_line("\tMOV\tR0, -(SP)");
        self.generate_expression_node(expr, right);
        self.output.add_line("\tMOV\tR0, R1");
        self.output.add_line("\tMOV\t(SP)+, R0");
        self.output.add_line("\tMUL\tR1, R0\t; Operation \'*\'");
        // Product low word lands in the odd register of the pair.
        self.output.add_line("\tMOV\tR1, R0");
    }

    /// `/`, `\` and MOD share the EIS division sequence: dividend
    /// sign-extended into R0:R1, divisor in R2, quotient in R0 and
    /// remainder in R1.
    fn generate_oper_div(&mut self, expr: &Expression, left: i32, right: i32, name: &str) {
        self.generate_expression_node(expr, left);
        self.output.add_line("\tMOV\tR0, -(SP)");
        self.generate_expression_node(expr, right);
        self.output.add_line("\tMOV\tR0, R2");
        self.output.add_line("\tMOV\t(SP)+, R1");
        self.output.add_line("\tSXT\tR0");
        self.output
            .add_line(format!("\tDIV\tR2, R0\t; Operation \'{}\'", name));
        if name == "MOD" {
            self.output.add_line("\tMOV\tR1, R0");
        }
    }

    /// Emit the operand-loading sequence ending in a CMP whose flags
    /// reflect `right - left`.
    pub(crate) fn generate_compare_flags(
        &mut self,
        expr: &Expression,
        left: i32,
        right: i32,
        comment: &str,
    ) {
        self.generate_expression_node(expr, left);

        let rnode = &expr.nodes[right as usize];
        if rnode.constval && rnode.vtype.is_numeric() {
            let ivalue = Self::int_value(rnode.token.dvalue);
            self.output.add_line(format!(
                "\tCMP\t{}, R0{}",
                Self::immediate(ivalue),
                comment
            ));
            return;
        }
        if rnode.token.kind == TokenKind::Identifier
            && rnode.vtype.is_numeric()
            && rnode.args.is_empty()
        {
            let deconame = decorated_name(&canonical_name(&rnode.token.text));
            self.output
                .add_line(format!("\tCMP\t{}, R0{}", deconame, comment));
            return;
        }

        self.output.add_line("\tMOV\tR0, -(SP)");
        self.generate_expression_node(expr, right);
        self.output.add_line("\tMOV\tR0, R1");
        self.output.add_line("\tMOV\t(SP)+, R0");
        self.output.add_line(format!("\tCMP\tR1, R0{}", comment));
    }

    /// Branch mnemonic that fires when the comparison holds, given
    /// flags of `right - left`.
    pub(crate) fn compare_true_branch(name: &str) -> &'static str {
        match name {
            "=" => "BEQ",
            "<>" => "BNE",
            "<" => "BGT",
            ">" => "BLT",
            "<=" => "BGE",
            _ => "BLE", // >=
        }
    }

    /// Branch mnemonic that fires when the comparison fails.
    pub(crate) fn compare_false_branch(name: &str) -> &'static str {
        match name {
            "=" => "BNE",
            "<>" => "BEQ",
            "<" => "BLE",
            ">" => "BGE",
            "<=" => "BLT",
            _ => "BGT", // >=
        }
    }

    fn generate_oper_compare(&mut self, expr: &Expression, left: i32, right: i32, name: &str) {
        let comment = format!("\t; Operation \'{}\'", name);
        self.generate_compare_flags(expr, left, right, &comment);

        // Materialize the -1/0 truth value.
        let true_label = self.local_label();
        let done_label = self.local_label();
        self.output
            .add_line(format!("\t{}\t{}", Self::compare_true_branch(name), true_label));
        self.output.add_line("\tCLR\tR0");
        self.output.add_line(format!("\tBR\t{}", done_label));
        self.output
            .add_line(format!("{}:\tMOV\t#-1., R0", true_label));
        self.output.add_line(format!("{}:", done_label));
    }

    fn generate_oper_logical(&mut self, expr: &Expression, left: i32, right: i32, name: &str) {
        let comment = format!("\t; Operation \'{}\'", name);

        self.generate_expression_node(expr, left);
        self.output.add_line("\tMOV\tR0, -(SP)");
        self.generate_expression_node(expr, right);
        self.output.add_line("\tMOV\tR0, R1");
        self.output.add_line("\tMOV\t(SP)+, R0");
        match name {
            "AND" => {
                self.output.add_line("\tCOM\tR1");
                self.output.add_line(format!("\tBIC\tR1, R0{}", comment));
            }
            "OR" => {
                self.output.add_line(format!("\tBIS\tR1, R0{}", comment));
            }
            _ => {
                self.output.add_line(format!("\tXOR\tR1, R0{}", comment));
            }
        }
    }

    // Function emission ----------------------------------------------------

    fn generate_expr_function(&mut self, expr: &Expression, index: i32) {
        let node = &expr.nodes[index as usize];
        match node.token.keyword {
            Keyword::Abs => self.generate_func_abs(node),
            Keyword::Rnd => self.generate_func_rnd(node),
            Keyword::Peek => self.generate_func_peek(node),
            Keyword::Inp => self.generate_func_inp(node),
            Keyword::Len => self.generate_func_len(node),
            Keyword::Inkey => self.output.add_comment("TODO INKEY$"),
            Keyword::Pos => self.generate_func_pos(node),
            keyword => {
                self.output.add_comment(format!(
                    "TODO generate function expression for {}",
                    keyword
                ));
            }
        }
    }

    fn generate_func_abs(&mut self, node: &ExpressionNode) {
        if let Some(arg) = node.args.first() {
            self.generate_expression(arg);
        }
        let label = self.local_label();
        self.output.add_line(format!("\tBPL\t{}", label));
        self.output.add_line("\tNEG\tR0");
        self.output.add_line(format!("{}:", label));
    }

    fn generate_func_rnd(&mut self, node: &ExpressionNode) {
        if let Some(arg) = node.args.first() {
            self.generate_expression(arg);
        }
        self.output.add_line("\tCALL\tRND");
    }

    fn generate_func_peek(&mut self, node: &ExpressionNode) {
        if let Some(arg) = node.args.first() {
            self.generate_expression(arg);
        }
        self.output.add_line("\tMOV\t(R0), R0\t; PEEK");
    }

    fn generate_func_inp(&mut self, node: &ExpressionNode) {
        if node.args.len() != 2 {
            return;
        }
        self.generate_expression(&node.args[0]);
        self.output.add_line("\tMOV\t(R0), R1\t; INP value");
        self.generate_expression(&node.args[1]);
        self.output.add_line("\tCOM\tR0");
        self.output.add_line("\tBIC\tR0, R1\t; INP mask");
        self.output.add_line("\tMOV\tR1, R0\t; INP");
    }

    fn generate_func_len(&mut self, node: &ExpressionNode) {
        let Some(arg) = node.args.first() else {
            return;
        };
        if !self.load_string_address(arg) {
            self.output.add_comment("TODO LEN of string expression");
            return;
        }
        self.output.add_line("\tMOV\tR0, R1");
        self.output.add_line("\tCLR\tR0");
        // The first byte of a string is its length.
        self.output.add_line("\tBISB\t(R1), R0\t; LEN");
    }

    fn generate_func_pos(&mut self, node: &ExpressionNode) {
        // The argument is only evaluated when it is not constant.
        if let Some(arg) = node.args.first() {
            if !arg.is_const() {
                self.generate_expression(arg);
            }
        }
        self.output.add_comment("TODO POS");
    }

    /// Load the address of a string value into R0: an interned
    /// constant or a string variable. Returns false when the
    /// expression is neither.
    pub(crate) fn load_string_address(&mut self, expr: &Expression) -> bool {
        let Some(root) = expr.root_node() else {
            return false;
        };

        if root.constval && root.vtype == ValueType::String {
            let svalue = &root.token.svalue;
            match self.source.const_string_index(svalue) {
                Some(index) => {
                    self.output.add_line(format!("\tMOV\t#ST{}, R0", index));
                    true
                }
                None => {
                    self.error(format!(
                        "Failed to find index for const string \"{}\".",
                        svalue
                    ));
                    false
                }
            }
        } else if root.token.kind == TokenKind::Identifier
            && root.vtype == ValueType::String
            && root.args.is_empty()
        {
            let deconame = decorated_name(&canonical_name(&root.token.text));
            self.output.add_line(format!("\tMOV\t#{}, R0", deconame));
            true
        } else {
            false
        }
    }

    // Assignment -----------------------------------------------------------

    /// Calculate an expression and store the result into a variable.
    /// Used by LET and the FOR initializer.
    pub(crate) fn generate_assignment(&mut self, var: &VariableExpression, expr: &Expression) {
        let comment = "\t; assignment";
        let vtype = var.value_type();
        let deconame = var.decorated_name();

        if !var.args.is_empty() {
            self.output.add_comment("TODO array element assignment");
            return;
        }

        if expr.is_const() {
            match vtype {
                ValueType::Integer => {
                    let ivalue = Self::int_value(expr.const_dvalue());
                    if ivalue == 0 {
                        self.output
                            .add_line(format!("\tCLR\t{}{}", deconame, comment));
                    } else {
                        self.output.add_line(format!(
                            "\tMOV\t{}, {}{}",
                            Self::immediate(ivalue),
                            deconame,
                            comment
                        ));
                    }
                }
                ValueType::String => {
                    let svalue = expr.const_svalue().to_string();
                    match self.source.const_string_index(&svalue) {
                        Some(index) => {
                            self.output.add_line(format!("\tMOV\t#ST{}, R0", index));
                            self.output.add_line(format!("\tMOV\t#{}, R1", deconame));
                            self.output
                                .add_line(format!("\tCALL\tSTRCPY{}", comment));
                        }
                        None => {
                            self.error(format!(
                                "Failed to find index for const string \"{}\".",
                                svalue
                            ));
                        }
                    }
                }
                _ => {
                    self.output
                        .add_comment("TODO assignment to Single variable");
                }
            }
            return;
        }

        if expr.is_variable() {
            match vtype {
                ValueType::Integer => {
                    let svalue = expr.variable_decorated_name();
                    self.output
                        .add_line(format!("\tMOV\t{}, {}{}", svalue, deconame, comment));
                }
                ValueType::String => {
                    let svalue = expr.variable_decorated_name();
                    self.output.add_line(format!("\tMOV\t#{}, R0", svalue));
                    self.output.add_line(format!("\tMOV\t#{}, R1", deconame));
                    self.output.add_line(format!("\tCALL\tSTRCPY{}", comment));
                }
                _ => {
                    self.output
                        .add_comment("TODO assignment to Single variable");
                }
            }
            return;
        }

        // Convert "A% = A% + N" and "A% = A% - N" into INC/DEC/ADD/SUB
        // directly on the variable.
        if vtype == ValueType::Integer {
            if let Some(root) = expr.root_node() {
                if root.token.is_binary_operation()
                    && (root.token.text == "+" || root.token.text == "-")
                    && root.left >= 0
                    && root.right >= 0
                {
                    let lnode = &expr.nodes[root.left as usize];
                    let rnode = &expr.nodes[root.right as usize];
                    if lnode.token.kind == TokenKind::Identifier
                        && canonical_name(&lnode.token.text) == var.canonical_name()
                        && rnode.constval
                        && rnode.vtype.is_numeric()
                    {
                        let plus = root.token.text == "+";
                        let ivalue = Self::int_value(rnode.token.dvalue);
                        let line = if plus && ivalue == 1 {
                            format!("\tINC\t{}{}", deconame, comment)
                        } else if !plus && ivalue == 1 {
                            format!("\tDEC\t{}{}", deconame, comment)
                        } else if plus {
                            format!("\tADD\t{}, {}{}", Self::immediate(ivalue), deconame, comment)
                        } else {
                            format!("\tSUB\t{}, {}{}", Self::immediate(ivalue), deconame, comment)
                        };
                        self.output.add_line(line);
                        return;
                    }
                }
            }
        }

        if vtype == ValueType::String {
            self.output
                .add_comment("TODO assignment of string expression");
            return;
        }

        self.generate_expression(expr);
        self.output
            .add_line(format!("\tMOV\tR0, {}{}", deconame, comment));
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::compile;

    #[test]
    fn test_constant_folded_assignment() {
        let text = compile("10 LET A% = 3 + 4\n");
        assert!(text.contains("\tMOV\t#7., VARA$I"), "text:\n{}", text);
        // No runtime arithmetic.
        assert!(!text.contains("ADD"));
    }

    #[test]
    fn test_zero_assignment_clears() {
        let text = compile("10 LET A% = 0\n");
        assert!(text.contains("\tCLR\tVARA$I"), "text:\n{}", text);
    }

    #[test]
    fn test_increment_peephole() {
        let text = compile("10 LET I% = I% + 1\n");
        assert!(text.contains("\tINC\tVARI$I"), "text:\n{}", text);
        assert!(!text.contains("R0"), "no register traffic:\n{}", text);
    }

    #[test]
    fn test_decrement_peephole() {
        let text = compile("10 LET I% = I% - 1\n");
        assert!(text.contains("\tDEC\tVARI$I"), "text:\n{}", text);
    }

    #[test]
    fn test_add_constant_peephole() {
        let text = compile("10 LET I% = I% + 5\n");
        assert!(text.contains("\tADD\t#5., VARI$I"), "text:\n{}", text);
    }

    #[test]
    fn test_variable_copy() {
        let text = compile("10 LET A% = B%\n");
        assert!(text.contains("\tMOV\tVARB$I, VARA$I"), "text:\n{}", text);
    }

    #[test]
    fn test_addition_with_variable_rhs() {
        let text = compile("10 LET A% = B% + C%\n");
        assert!(text.contains("\tMOV\tVARB$I, R0"), "text:\n{}", text);
        assert!(text.contains("\tADD\tVARC$I, R0"), "text:\n{}", text);
        assert!(text.contains("\tMOV\tR0, VARA$I"), "text:\n{}", text);
    }

    #[test]
    fn test_subtraction_stack_protocol() {
        let text = compile("10 LET A% = B% - C% * 2\n");
        assert!(text.contains("\tMOV\tR0, -(SP)"), "text:\n{}", text);
        assert!(text.contains("\tMOV\t(SP)+, R0"), "text:\n{}", text);
        assert!(text.contains("\tSUB\tR1, R0"), "text:\n{}", text);
    }

    #[test]
    fn test_multiplication_uses_eis() {
        let text = compile("10 LET A% = B% * C%\n");
        assert!(text.contains("\tMUL\tR1, R0"), "text:\n{}", text);
    }

    #[test]
    fn test_division_sign_extends() {
        let text = compile("10 LET A% = B% \\ C%\n");
        assert!(text.contains("\tSXT\tR0"), "text:\n{}", text);
        assert!(text.contains("\tDIV\tR2, R0"), "text:\n{}", text);
    }

    #[test]
    fn test_mod_takes_remainder() {
        let text = compile("10 LET A% = B% MOD C%\n");
        assert!(text.contains("\tDIV\tR2, R0"), "text:\n{}", text);
        let div_pos = text.find("\tDIV\t").unwrap();
        assert!(
            text[div_pos..].contains("\tMOV\tR1, R0"),
            "remainder moved:\n{}",
            text
        );
    }

    #[test]
    fn test_comparison_materializes_truth() {
        let text = compile("10 LET A% = B% < 3\n");
        assert!(text.contains("\tCMP\t#3., R0"), "text:\n{}", text);
        assert!(text.contains("\tBGT\t"), "text:\n{}", text);
        assert!(text.contains("\tMOV\t#-1., R0"), "text:\n{}", text);
    }

    #[test]
    fn test_logical_and() {
        let text = compile("10 LET A% = B% AND C%\n");
        assert!(text.contains("\tCOM\tR1"), "text:\n{}", text);
        assert!(text.contains("\tBIC\tR1, R0"), "text:\n{}", text);
    }

    #[test]
    fn test_logical_or_and_xor() {
        let text = compile("10 LET A% = B% OR C%\n");
        assert!(text.contains("\tBIS\tR1, R0"), "text:\n{}", text);

        let text = compile("10 LET A% = B% XOR C%\n");
        assert!(text.contains("\tXOR\tR1, R0"), "text:\n{}", text);
    }

    #[test]
    fn test_unary_minus_negates() {
        let text = compile("10 LET A% = - B%\n");
        assert!(text.contains("\tNEG\tR0"), "text:\n{}", text);
    }

    #[test]
    fn test_not_complements() {
        let text = compile("10 LET A% = NOT B%\n");
        assert!(text.contains("\tCOM\tR0"), "text:\n{}", text);
    }

    #[test]
    fn test_abs_function() {
        let text = compile("10 LET A% = ABS(B%)\n");
        assert!(text.contains("\tBPL\t10$"), "text:\n{}", text);
        assert!(text.contains("\tNEG\tR0"), "text:\n{}", text);
        assert!(text.contains("10$:"), "text:\n{}", text);
    }

    #[test]
    fn test_peek_indirects() {
        let text = compile("10 LET A% = PEEK(&H1000)\n");
        assert!(text.contains("\tMOV\t(R0), R0\t; PEEK"), "text:\n{}", text);
    }

    #[test]
    fn test_len_of_string_variable() {
        let text = compile("10 LET A% = LEN(S$)\n");
        assert!(text.contains("\tMOV\t#VARS$S, R0"), "text:\n{}", text);
        assert!(text.contains("\tBISB\t(R1), R0\t; LEN"), "text:\n{}", text);
    }

    #[test]
    fn test_string_constant_assignment() {
        let text = compile("10 LET S$ = \"HI\"\n");
        assert!(text.contains("\tMOV\t#ST1, R0"), "text:\n{}", text);
        assert!(text.contains("\tMOV\t#VARS$S, R1"), "text:\n{}", text);
        assert!(text.contains("\tCALL\tSTRCPY"), "text:\n{}", text);
    }

    #[test]
    fn test_string_variable_copy() {
        let text = compile("10 LET A$ = B$\n");
        assert!(text.contains("\tMOV\t#VARB$S, R0"), "text:\n{}", text);
        assert!(text.contains("\tMOV\t#VARA$S, R1"), "text:\n{}", text);
        assert!(text.contains("\tCALL\tSTRCPY"), "text:\n{}", text);
    }

    #[test]
    fn test_rnd_calls_runtime() {
        let text = compile("10 LET A = RND(1)\n");
        assert!(text.contains("\tCALL\tRND"), "text:\n{}", text);
    }
}
