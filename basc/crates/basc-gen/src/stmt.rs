//! Per-statement emission routines.

use basc_lex::{Keyword, TokenKind};
use basc_par::{Expression, Statement, VariableExpression};
use basc_util::{canonical_name, decorated_name, ValueType, MAX_LINE_NUMBER};

use crate::Generator;

impl<'a> Generator<'a> {
    pub(crate) fn generate_beep(&mut self) {
        self.output.add_line("\tCALL\tBEEP");
    }

    pub(crate) fn generate_cls(&mut self) {
        self.output.add_line("\tCALL\tCLS");
    }

    pub(crate) fn generate_stop(&mut self) {
        self.output.add_line("\tHALT");
    }

    pub(crate) fn generate_return(&mut self) {
        self.output.add_line("\tRETURN");
    }

    pub(crate) fn generate_ignored(&mut self, stmt: &Statement) {
        self.output.add_comment(format!(
            "{} statement is ignored",
            stmt.token.keyword.as_str()
        ));
    }

    /// END jumps to the sentinel label, unless this is already the
    /// last line and execution falls into it anyway.
    pub(crate) fn generate_end(&mut self) {
        let next = self.source.next_line_number(self.current_line);
        if next != MAX_LINE_NUMBER + 1 {
            self.output
                .add_line(format!("\tJMP\tL{}", MAX_LINE_NUMBER + 1));
        }
    }

    pub(crate) fn generate_goto(&mut self, stmt: &Statement) {
        self.output.add_line(format!("\tJMP\tL{}", stmt.paramline));
    }

    pub(crate) fn generate_gosub(&mut self, stmt: &Statement) {
        self.output.add_line(format!("\tCALL\tL{}", stmt.paramline));
    }

    pub(crate) fn generate_let(&mut self, stmt: &Statement) {
        let (Some(var), Some(expr)) = (stmt.varexprs.first(), stmt.args.first()) else {
            return;
        };
        self.generate_assignment(var, expr);
    }

    /// FOR: assign the start value, store the final value into the
    /// immediate field of the loop-head CMP (self-modifying when not
    /// constant), optionally store STEP into the increment at the
    /// paired NEXT, then emit the loop head.
    pub(crate) fn generate_for(&mut self, stmt: &Statement) {
        if stmt.args.len() < 2 || stmt.ident.kind != TokenKind::Identifier {
            return;
        }

        let var = VariableExpression::new(&stmt.ident.text);
        let deconame = var.decorated_name();

        self.generate_assignment(&var, &stmt.args[0]);

        // Final value: a constant lands directly in the CMP immediate;
        // anything else patches the instruction through the N-label.
        let expr2 = &stmt.args[1];
        let mut tovalue = "#0".to_string();
        if expr2.is_const() {
            tovalue = Self::immediate(Self::int_value(expr2.const_dvalue()));
        } else if expr2.is_variable() {
            let svalue = expr2.variable_decorated_name();
            self.output.add_line(format!(
                "\tMOV\t{}, @#<N{}+2>",
                svalue, self.current_line
            ));
        } else {
            self.generate_expression(expr2);
            self.output.add_line(format!(
                "\tMOV\tR0, @#<N{}+2>",
                self.current_line
            ));
        }

        // STEP patches the increment immediate at the paired NEXT.
        if stmt.args.len() > 2 && stmt.paramline != 0 {
            self.generate_expression(&stmt.args[2]);
            self.output
                .add_line(format!("\tMOV\tR0, @#<L{}+2>", stmt.paramline));
        }

        let next = self.source.next_line_number(self.current_line);
        self.output.add_line(format!(
            "N{}:\tCMP\t{}, {}",
            self.current_line, tovalue, deconame
        ));
        self.output.add_line(format!("\tBHIS\tL{}", next));
        self.output
            .add_line(format!("\tJMP\tX{}", self.current_line));
    }

    /// NEXT: increment each loop variable and jump back to its loop
    /// head; the post-loop X label follows. The paired FOR line rides
    /// on each name token, put there by the validator.
    pub(crate) fn generate_next(&mut self, stmt: &Statement) {
        for param in &stmt.params {
            let forline = param.dvalue as u32;
            let Some(linefor) = self.source.line_by_number(forline) else {
                continue;
            };

            let deconame =
                decorated_name(&canonical_name(&linefor.statement.ident.text));
            if linefor.statement.args.len() < 3 {
                self.output.add_line(format!("\tINC\t{}", deconame));
            } else {
                // The immediate is the STEP-patched field.
                self.output.add_line(format!("\tADD\t#1, {}", deconame));
            }
            self.output.add_line(format!("\tJMP\tN{}", forline));
            self.output.add_line(format!("X{}:", forline));
        }
    }

    pub(crate) fn generate_if(&mut self, stmt: &Statement) {
        let Some(expr) = stmt.args.first() else {
            return;
        };

        let then_line = stmt.then_line_token().map(|t| t.dvalue as u32);
        let else_line = stmt.else_line_token().map(|t| t.dvalue as u32);

        // Constant condition: only one direction survives.
        if expr.is_const() {
            if Self::int_value(expr.const_dvalue()) != 0 {
                if let Some(target) = then_line {
                    self.output.add_line(format!("\tJMP\tL{}\t; THEN", target));
                } else if let Some(sub) = &stmt.then_stmt {
                    self.generate_statement(sub);
                }
            } else if let Some(sub) = &stmt.else_stmt {
                self.generate_statement(sub);
            } else if let Some(target) = else_line {
                self.output.add_line(format!("\tJMP\tL{}\t; ELSE", target));
            } else {
                self.output.add_line("\t\t\t; ELSE do nothing");
            }
            return;
        }

        // Load the condition into the flags. A comparison at the root
        // feeds the branch directly; anything else materializes into
        // R0 and tests it.
        let false_branch = self.generate_condition_flags(expr);

        let next = self.source.next_line_number(self.current_line);
        match (then_line, &stmt.then_stmt) {
            (Some(then_target), _) => {
                if let Some(sub) = &stmt.else_stmt {
                    // IF expr THEN line ELSE statement
                    let skip = self.local_label();
                    self.output
                        .add_line(format!("\t{}\t{}", false_branch, skip));
                    self.output.add_line(format!("\tJMP\tL{}", then_target));
                    self.output.add_line(format!("{}:", skip));
                    self.generate_statement(sub);
                } else if let Some(else_target) = else_line {
                    // IF expr THEN line ELSE line
                    let skip = self.local_label();
                    self.output
                        .add_line(format!("\t{}\t{}", false_branch, skip));
                    self.output.add_line(format!("\tJMP\tL{}", then_target));
                    self.output
                        .add_line(format!("{}:\tJMP\tL{}", skip, else_target));
                } else {
                    // IF expr THEN line
                    self.output
                        .add_line(format!("\t{}\tL{}", false_branch, next));
                    self.output.add_line(format!("\tJMP\tL{}", then_target));
                }
            }
            (None, Some(then_stmt)) => {
                if let Some(sub) = &stmt.else_stmt {
                    // IF expr THEN statement ELSE statement
                    let else_label = self.local_label();
                    let done_label = self.local_label();
                    self.output
                        .add_line(format!("\t{}\t{}", false_branch, else_label));
                    self.generate_statement(then_stmt);
                    self.output.add_line(format!("\tBR\t{}", done_label));
                    self.output.add_line(format!("{}:", else_label));
                    self.generate_statement(sub);
                    self.output.add_line(format!("{}:", done_label));
                } else if let Some(else_target) = else_line {
                    // IF expr THEN statement ELSE line
                    let else_label = self.local_label();
                    let done_label = self.local_label();
                    self.output
                        .add_line(format!("\t{}\t{}", false_branch, else_label));
                    self.generate_statement(then_stmt);
                    self.output.add_line(format!("\tBR\t{}", done_label));
                    self.output
                        .add_line(format!("{}:\tJMP\tL{}", else_label, else_target));
                    self.output.add_line(format!("{}:", done_label));
                } else {
                    // IF expr THEN statement
                    let skip = self.local_label();
                    self.output
                        .add_line(format!("\t{}\t{}", false_branch, skip));
                    self.generate_statement(then_stmt);
                    self.output.add_line(format!("{}:", skip));
                }
            }
            (None, None) => {}
        }
    }

    /// Emit the condition's flag-setting sequence and return the
    /// branch mnemonic that fires when the condition is false.
    fn generate_condition_flags(&mut self, expr: &Expression) -> &'static str {
        if let Some(root) = expr.root_node() {
            if root.token.kind == TokenKind::Operation && root.left >= 0 && root.right >= 0 {
                let name = match root.token.text.as_str() {
                    "=" => Some("="),
                    "<>" | "><" => Some("<>"),
                    "<" => Some("<"),
                    ">" => Some(">"),
                    "<=" | "=<" => Some("<="),
                    ">=" | "=>" => Some(">="),
                    _ => None,
                };
                if let Some(name) = name {
                    let comment = format!("\t; Operation \'{}\'", name);
                    self.generate_compare_flags(expr, root.left, root.right, &comment);
                    return Self::compare_false_branch(name);
                }
            }
        }

        self.generate_expression(expr);
        self.output.add_line("\tTST\tR0");
        "BEQ"
    }

    /// ON expr GOTO/GOSUB: bounds-checked dispatch through a word
    /// table of line labels.
    pub(crate) fn generate_on(&mut self, stmt: &Statement) {
        let Some(expr) = stmt.args.first() else {
            return;
        };
        self.generate_expression(expr);

        let next = format!("L{}", self.source.next_line_number(self.current_line));
        let count = stmt.params.len();
        let table = self.local_label();

        self.output.add_line("\tDEC\tR0");
        self.output.add_line(format!("\tBMI\t{}", next));
        self.output
            .add_line(format!("\tCMP\t{}, R0", Self::immediate(count as i32)));
        self.output.add_line(format!("\tBLE\t{}", next));
        self.output.add_line("\tASL\tR0");
        if stmt.gotogosub {
            self.output.add_line(format!("\tJMP\t@{}(R0)", table));
        } else {
            self.output.add_line(format!("\tCALL\t@{}(R0)", table));
            self.output.add_line(format!("\tBR\t{}", next));
        }

        for (index, param) in stmt.params.iter().enumerate() {
            let target = param.dvalue as u32;
            if index == 0 {
                self.output
                    .add_line(format!("{}:\t.WORD\tL{}", table, target));
            } else {
                self.output.add_line(format!("\t.WORD\tL{}", target));
            }
        }
    }

    pub(crate) fn generate_print(&mut self, stmt: &Statement) {
        for arg in &stmt.args {
            let Some(root) = arg.root_node() else { continue };

            if root.token.is_comma() {
                self.output.add_comment("TODO PRINT next zone");
                continue;
            }

            if root.token.is_keyword(Keyword::At) {
                if root.args.len() == 2 {
                    self.generate_expression(&root.args[0]);
                    self.output.add_line("\tMOV\tR0, -(SP)");
                    self.generate_expression(&root.args[1]);
                    self.output.add_line("\tMOV\tR0, R1");
                    self.output.add_line("\tMOV\t(SP)+, R0");
                    self.output.add_line("\tCALL\tPRAT");
                }
                continue;
            }

            if root.token.is_keyword(Keyword::Tab) {
                if let Some(arg1) = root.args.first() {
                    self.generate_expression(arg1);
                    self.output.add_line("\tCALL\tWRTAB");
                }
                continue;
            }

            if root.token.is_keyword(Keyword::Spc) {
                if let Some(arg1) = root.args.first() {
                    // SPC(0) prints nothing at all.
                    if arg1.is_const() && Self::int_value(arg1.const_dvalue()) == 0 {
                        continue;
                    }
                    self.generate_expression(arg1);
                    self.output.add_line("\tCALL\tWRSPC");
                }
                continue;
            }

            match root.vtype {
                ValueType::String => self.generate_print_string(arg),
                ValueType::Integer => {
                    self.generate_expression(arg);
                    self.output.add_line("\tCALL\tWRINT");
                }
                ValueType::Single => {
                    self.generate_expression(arg);
                    self.output.add_line("\tCALL\tWRSNG");
                }
                ValueType::None => {
                    self.output.add_comment("TODO PRINT untyped expression");
                }
            }
        }

        if !stmt.nocrlf {
            self.output.add_line("\tCALL\tWRCRLF");
        }
    }

    fn generate_print_string(&mut self, expr: &Expression) {
        let Some(root) = expr.root_node() else { return };

        if root.constval {
            let svalue = root.token.svalue.clone();
            if svalue.is_empty() {
                return; // nothing to print
            }
            if svalue.len() == 1 {
                // A one-character string goes through WRCHR without an
                // interned constant.
                let byte = svalue.as_bytes()[0];
                self.output
                    .add_line(format!("\tMOV\t{}, R0", Self::immediate(byte as i32)));
                self.output.add_line("\tCALL\tWRCHR");
                return;
            }

            match self.source.const_string_index(&svalue) {
                Some(index) => {
                    self.output.add_line(format!("\tMOV\t#ST{}, R0", index));
                    self.output.add_line("\tCALL\tWRSTR");
                }
                None => {
                    self.error(format!(
                        "Failed to find index for const string \"{}\".",
                        svalue
                    ));
                }
            }
            return;
        }

        if root.token.kind == TokenKind::Identifier && root.args.is_empty() {
            let deconame = decorated_name(&canonical_name(&root.token.text));
            self.output.add_line(format!("\tMOV\t#{}, R0", deconame));
            self.output.add_line("\tCALL\tWRSTR");
            return;
        }

        self.output.add_comment("TODO PRINT string expression");
    }

    pub(crate) fn generate_input(&mut self, stmt: &Statement) {
        if let Some(param) = stmt.params.first() {
            if let Some(index) = self.source.const_string_index(&param.svalue) {
                self.output.add_line(format!("\tMOV\t#ST{}, R0", index));
                self.output
                    .add_line("\tCALL\tWRSTR\t; print the prompt");
            }
        }

        for var in &stmt.variables {
            let vardeco = var.decorated_name();
            if var.value_type() == ValueType::Integer {
                self.output.add_line("\tCALL\tREADI");
                self.output.add_line(format!("\tMOV\tR0, {}", vardeco));
            } else {
                self.output
                    .add_comment(format!("TODO INPUT {}", var.name));
            }
        }
    }

    /// POKE addr, val: constants store directly; otherwise the two
    /// values are patched into the immediate slots of a self-modifying
    /// MOV anchored on a local label.
    pub(crate) fn generate_poke(&mut self, stmt: &Statement) {
        if stmt.args.len() != 2 {
            return;
        }
        let addr = &stmt.args[0];
        let value = &stmt.args[1];

        if addr.is_const() && value.is_const() {
            let iaddr = Self::int_value(addr.const_dvalue());
            let ivalue = Self::int_value(value.const_dvalue());
            self.output.add_line(format!(
                "\tMOV\t{}, @#{}.\t; POKE",
                Self::immediate(ivalue),
                iaddr
            ));
            return;
        }

        let label = self.local_label();
        self.generate_expression(addr);
        self.output
            .add_line(format!("\tMOV\tR0, @#<{}+4>", label));
        self.generate_expression(value);
        self.output
            .add_line(format!("\tMOV\tR0, @#<{}+2>", label));
        self.output
            .add_line(format!("{}:\tMOV\t#0, @#0\t; POKE", label));
    }
}
