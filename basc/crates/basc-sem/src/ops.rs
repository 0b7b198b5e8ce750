//! Operator validation and constant folding.
//!
//! Every operator routine follows the same discipline: verify operand
//! value types, compute the result type under integer/single
//! promotion, propagate the constant flag, and fold the value when
//! both operands are constants.

use basc_util::{Pos, ValueType};

use crate::{Fold, Operand, Validator};

/// Maximum length of a string value.
const MAX_STRING_LEN: usize = 255;

/// Integer/single promotion: equal types keep the type, a mixed pair
/// promotes to single, strings are handled by each operator.
fn numeric_result_type(lhs: ValueType, rhs: ValueType) -> Option<ValueType> {
    if lhs == rhs && lhs.is_numeric() {
        return Some(lhs);
    }
    if lhs.is_numeric() && rhs.is_numeric() {
        return Some(ValueType::Single);
    }
    None
}

impl<'a> Validator<'a> {
    pub(crate) fn oper_unary_plus(&mut self, pos: Pos, operand: &Operand) -> Option<Fold> {
        if operand.vtype == ValueType::String {
            self.error_at(pos, "Operation \'+\' not applicable to strings.");
            return None;
        }
        Some(Fold {
            vtype: operand.vtype,
            constval: operand.constval,
            dvalue: operand.dvalue,
            svalue: String::new(),
        })
    }

    pub(crate) fn oper_unary_minus(&mut self, pos: Pos, operand: &Operand) -> Option<Fold> {
        if operand.vtype == ValueType::String {
            self.error_at(pos, "Operation \'-\' not applicable to strings.");
            return None;
        }
        Some(Fold {
            vtype: operand.vtype,
            constval: operand.constval,
            dvalue: -operand.dvalue,
            svalue: String::new(),
        })
    }

    /// Unary NOT: bitwise complement of the integer reinterpretation.
    pub(crate) fn oper_unary_not(&mut self, pos: Pos, operand: &Operand) -> Option<Fold> {
        if operand.vtype == ValueType::String {
            self.error_at(pos, "Operation \'NOT\' not applicable to strings.");
            return None;
        }
        Some(Fold {
            vtype: ValueType::Integer,
            constval: operand.constval,
            dvalue: !(operand.dvalue as i32) as f64,
            svalue: String::new(),
        })
    }

    pub(crate) fn oper_plus(&mut self, pos: Pos, lhs: &Operand, rhs: &Operand) -> Option<Fold> {
        // '+' doubles as string concatenation, capped at 255 chars.
        if lhs.vtype == ValueType::String && rhs.vtype == ValueType::String {
            let constval = lhs.constval && rhs.constval;
            let mut svalue = String::new();
            if constval {
                svalue = format!("{}{}", lhs.svalue, rhs.svalue);
                svalue.truncate(MAX_STRING_LEN);
            }
            return Some(Fold {
                vtype: ValueType::String,
                constval,
                dvalue: 0.0,
                svalue,
            });
        }

        let vtype = match numeric_result_type(lhs.vtype, rhs.vtype) {
            Some(vtype) => vtype,
            None => {
                self.error_at(pos, "Value types are incompatible.");
                return None;
            }
        };

        let constval = lhs.constval && rhs.constval;
        Some(Fold {
            vtype,
            constval,
            dvalue: lhs.dvalue + rhs.dvalue,
            svalue: String::new(),
        })
    }

    pub(crate) fn oper_minus(&mut self, pos: Pos, lhs: &Operand, rhs: &Operand) -> Option<Fold> {
        self.numeric_oper(pos, lhs, rhs, "-", |l, r| l - r)
    }

    pub(crate) fn oper_mul(&mut self, pos: Pos, lhs: &Operand, rhs: &Operand) -> Option<Fold> {
        self.numeric_oper(pos, lhs, rhs, "*", |l, r| l * r)
    }

    fn numeric_oper(
        &mut self,
        pos: Pos,
        lhs: &Operand,
        rhs: &Operand,
        name: &str,
        fold: impl Fn(f64, f64) -> f64,
    ) -> Option<Fold> {
        if lhs.vtype == ValueType::String || rhs.vtype == ValueType::String {
            self.error_at(pos, format!("Operation \'{}\' not applicable to strings.", name));
            return None;
        }
        let vtype = match numeric_result_type(lhs.vtype, rhs.vtype) {
            Some(vtype) => vtype,
            None => {
                self.error_at(pos, "Value types are incompatible.");
                return None;
            }
        };
        Some(Fold {
            vtype,
            constval: lhs.constval && rhs.constval,
            dvalue: fold(lhs.dvalue, rhs.dvalue),
            svalue: String::new(),
        })
    }

    pub(crate) fn oper_div(&mut self, pos: Pos, lhs: &Operand, rhs: &Operand) -> Option<Fold> {
        if lhs.vtype == ValueType::String || rhs.vtype == ValueType::String {
            self.error_at(pos, "Operation \'/\' not applicable to strings.");
            return None;
        }
        let vtype = match numeric_result_type(lhs.vtype, rhs.vtype) {
            Some(vtype) => vtype,
            None => {
                self.error_at(pos, "Value types are incompatible.");
                return None;
            }
        };
        let constval = lhs.constval && rhs.constval;
        if constval && rhs.dvalue == 0.0 {
            self.error_at(pos, "Division by zero.");
            return None;
        }
        Some(Fold {
            vtype,
            constval,
            dvalue: if constval { lhs.dvalue / rhs.dvalue } else { 0.0 },
            svalue: String::new(),
        })
    }

    pub(crate) fn oper_div_int(&mut self, pos: Pos, lhs: &Operand, rhs: &Operand) -> Option<Fold> {
        if lhs.vtype == ValueType::String || rhs.vtype == ValueType::String {
            self.error_at(pos, "Operation \'\\\' not applicable to strings.");
            return None;
        }
        let constval = lhs.constval && rhs.constval;
        let mut dvalue = 0.0;
        if constval {
            let divisor = rhs.dvalue as i32;
            if divisor == 0 {
                self.error_at(pos, "Division by zero.");
                return None;
            }
            dvalue = ((lhs.dvalue as i32) / divisor) as f64;
        }
        Some(Fold {
            vtype: ValueType::Integer,
            constval,
            dvalue,
            svalue: String::new(),
        })
    }

    pub(crate) fn oper_mod(&mut self, pos: Pos, lhs: &Operand, rhs: &Operand) -> Option<Fold> {
        if lhs.vtype == ValueType::String || rhs.vtype == ValueType::String {
            self.error_at(pos, "Operation \'MOD\' not applicable to strings.");
            return None;
        }
        let constval = lhs.constval && rhs.constval;
        let mut dvalue = 0.0;
        if constval {
            let divisor = rhs.dvalue as i32;
            if divisor == 0 {
                self.error_at(pos, "Division by zero.");
                return None;
            }
            dvalue = ((lhs.dvalue as i32) % divisor) as f64;
        }
        Some(Fold {
            vtype: ValueType::Integer,
            constval,
            dvalue,
            svalue: String::new(),
        })
    }

    pub(crate) fn oper_power(&mut self, pos: Pos, lhs: &Operand, rhs: &Operand) -> Option<Fold> {
        if lhs.vtype == ValueType::String || rhs.vtype == ValueType::String {
            self.error_at(pos, "Operation \'^\' not applicable to strings.");
            return None;
        }

        let constval = lhs.constval && rhs.constval;
        let mut vtype = ValueType::Single;
        let mut dvalue = 0.0;
        if constval {
            dvalue = lhs.dvalue.powf(rhs.dvalue);
            if !dvalue.is_finite() {
                self.error_at(pos, "Bad result of power operation in const expression.");
                return None;
            }
            // Integer operands with an in-range result stay integer,
            // matching the target's integer-preferred arithmetic.
            if lhs.vtype == ValueType::Integer
                && rhs.vtype == ValueType::Integer
                && (-32768.0..=32767.0).contains(&dvalue)
            {
                vtype = ValueType::Integer;
            }
        }
        Some(Fold {
            vtype,
            constval,
            dvalue,
            svalue: String::new(),
        })
    }

    /// Comparison operators: numeric or string-to-string, integer
    /// result with -1 for true and 0 for false.
    pub(crate) fn oper_compare(
        &mut self,
        pos: Pos,
        lhs: &Operand,
        rhs: &Operand,
        name: &str,
    ) -> Option<Fold> {
        if (lhs.vtype == ValueType::String) != (rhs.vtype == ValueType::String) {
            self.error_at(
                pos,
                format!(
                    "Operand types ({}, {}) are not suitable for comparison operation.",
                    lhs.vtype, rhs.vtype
                ),
            );
            return None;
        }

        let constval = lhs.constval && rhs.constval;
        let mut dvalue = 0.0;
        if constval {
            let truth = if lhs.vtype == ValueType::String {
                match name {
                    "=" => lhs.svalue == rhs.svalue,
                    "<>" => lhs.svalue != rhs.svalue,
                    "<" => lhs.svalue < rhs.svalue,
                    ">" => lhs.svalue > rhs.svalue,
                    "<=" => lhs.svalue <= rhs.svalue,
                    _ => lhs.svalue >= rhs.svalue,
                }
            } else {
                match name {
                    "=" => lhs.dvalue == rhs.dvalue,
                    "<>" => lhs.dvalue != rhs.dvalue,
                    "<" => lhs.dvalue < rhs.dvalue,
                    ">" => lhs.dvalue > rhs.dvalue,
                    "<=" => lhs.dvalue <= rhs.dvalue,
                    _ => lhs.dvalue >= rhs.dvalue,
                }
            };
            dvalue = if truth { -1.0 } else { 0.0 };
        }
        Some(Fold {
            vtype: ValueType::Integer,
            constval,
            dvalue,
            svalue: String::new(),
        })
    }

    /// Bitwise logical operators over the integer reinterpretation of
    /// the operands.
    pub(crate) fn oper_bitwise(
        &mut self,
        pos: Pos,
        lhs: &Operand,
        rhs: &Operand,
        name: &str,
    ) -> Option<Fold> {
        if lhs.vtype == ValueType::String || rhs.vtype == ValueType::String {
            self.error_at(pos, format!("Operation \'{}\' not applicable to strings.", name));
            return None;
        }

        let constval = lhs.constval && rhs.constval;
        let mut dvalue = 0.0;
        if constval {
            let l = lhs.dvalue as i32;
            let r = rhs.dvalue as i32;
            let folded = match name {
                "AND" => l & r,
                "OR" => l | r,
                "XOR" => l ^ r,
                "EQV" => !(l ^ r),
                _ => !l | r, // IMP
            };
            dvalue = folded as f64;
        }
        Some(Fold {
            vtype: ValueType::Integer,
            constval,
            dvalue,
            svalue: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::validate_program;
    use basc_par::SourceModel;
    use basc_util::ValueType;

    fn folded(source: &str) -> f64 {
        let (model, handler) = validate_program(source);
        assert!(!handler.has_errors(), "errors: {:?}", handler.drain());
        model.lines[0].statement.args[0].const_dvalue()
    }

    fn result_type(model: &SourceModel) -> ValueType {
        model.lines[0].statement.args[0].value_type()
    }

    #[test]
    fn test_arithmetic_folds() {
        assert_eq!(folded("10 LET A = 2 + 3\n"), 5.0);
        assert_eq!(folded("10 LET A = 2 - 5\n"), -3.0);
        assert_eq!(folded("10 LET A = 6 * 7\n"), 42.0);
        assert_eq!(folded("10 LET A = 7 / 2\n"), 3.5);
        assert_eq!(folded("10 LET A = 7 \\ 2\n"), 3.0);
        assert_eq!(folded("10 LET A = 7 MOD 2\n"), 1.0);
    }

    #[test]
    fn test_precedence_in_folds() {
        assert_eq!(folded("10 LET A = 2 + 3 * 4\n"), 14.0);
        assert_eq!(folded("10 LET A = (2 + 3) * 4\n"), 20.0);
        assert_eq!(folded("10 LET A = 2 ^ 3 ^ 2\n"), 512.0);
    }

    #[test]
    fn test_unary_folds() {
        assert_eq!(folded("10 LET A = - (2 + 3)\n"), -5.0);
        assert_eq!(folded("10 LET A% = NOT 5\n"), -6.0);
        assert_eq!(folded("10 LET A% = NOT -1\n"), 0.0);
    }

    #[test]
    fn test_integer_division_truncates() {
        assert_eq!(folded("10 LET A% = 9 \\ 4\n"), 2.0);
        assert_eq!(folded("10 LET A% = -9 \\ 4\n"), -2.0);
    }

    #[test]
    fn test_mod_sign_follows_dividend() {
        assert_eq!(folded("10 LET A% = -7 MOD 3\n"), -1.0);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(folded("10 LET A% = 2 = 2\n"), -1.0);
        assert_eq!(folded("10 LET A% = 2 <> 2\n"), 0.0);
        assert_eq!(folded("10 LET A% = 2 <= 2\n"), -1.0);
        assert_eq!(folded("10 LET A% = 3 > 4\n"), 0.0);
    }

    #[test]
    fn test_string_comparisons() {
        assert_eq!(folded("10 LET A% = \"AB\" = \"AB\"\n"), -1.0);
        assert_eq!(folded("10 LET A% = \"AB\" < \"AC\"\n"), -1.0);
        assert_eq!(folded("10 LET A% = \"B\" < \"A\"\n"), 0.0);
    }

    #[test]
    fn test_eqv_imp_bitwise() {
        assert_eq!(folded("10 LET A% = 12 EQV 10\n"), (!(12 ^ 10)) as f64);
        assert_eq!(folded("10 LET A% = 12 IMP 10\n"), ((!12) | 10) as f64);
    }

    #[test]
    fn test_promotion_to_single() {
        let (model, handler) = validate_program("10 LET A = 1% + 0.5\n");
        assert!(!handler.has_errors());
        assert_eq!(result_type(&model), ValueType::Single);
    }

    #[test]
    fn test_integer_plus_integer_stays_integer() {
        let (model, handler) = validate_program("10 LET A% = 1% + 2%\n");
        assert!(!handler.has_errors());
        assert_eq!(result_type(&model), ValueType::Integer);
    }

    #[test]
    fn test_concat_cap_255() {
        // Two 200-char strings concatenate to a 255-char result.
        let long = "X".repeat(200);
        let source = format!("10 LET S$ = \"{}\" + \"{}\"\n", long, long);
        let (model, handler) = validate_program(&source);
        assert!(!handler.has_errors());
        assert_eq!(model.lines[0].statement.args[0].const_svalue().len(), 255);
    }

    #[test]
    fn test_division_by_zero_variants() {
        for source in [
            "10 LET A = 1 / 0\n",
            "10 LET A% = 1 \\ 0\n",
            "10 LET A% = 1 MOD 0\n",
        ] {
            let (_, handler) = validate_program(source);
            assert!(handler.has_errors(), "no error for {:?}", source);
            let diags = handler.drain();
            assert!(diags.iter().any(|d| d.message.contains("Division by zero")));
        }
    }

    #[test]
    fn test_power_overflow_rejected() {
        let (_, handler) = validate_program("10 LET A = 10 ^ 10000\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("Bad result of power operation")));
    }

    #[test]
    fn test_non_const_keeps_type_only() {
        let (model, handler) = validate_program("10 LET A% = B% + 1\n");
        assert!(!handler.has_errors());
        let expr = &model.lines[0].statement.args[0];
        assert_eq!(expr.value_type(), ValueType::Integer);
        assert!(!expr.is_const());
    }
}
