//! Function validation: arity and operand-type checks, plus constant
//! folding for the functions whose value is known at compile time.
//!
//! Foldable: trigonometry, ABS, INT, FIX, CINT, CSNG, SGN, SQR, LEN,
//! ASC, CHR$, MID$, STRING$, BIN$, OCT$, HEX$, STR$, VAL, PI.
//! Type-only: RND, INKEY$, POINT, EOF, PEEK, INP, FRE, POS, CSRLIN,
//! LPOS.

use basc_par::Expression;
use basc_util::{Pos, ValueType};

use crate::{Fold, Validator};

impl<'a> Validator<'a> {
    /// One numeric argument, single result, folded through `f` when
    /// the argument is constant.
    pub(crate) fn func_trig(
        &mut self,
        pos: Pos,
        args: &mut [Expression],
        f: impl Fn(f64) -> f64,
    ) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if arg.is_const() {
            let dvalue = f(arg.const_dvalue());
            if !dvalue.is_finite() {
                self.error_at(pos, "Bad result of function in const expression.");
                return None;
            }
            Some(Fold::number(ValueType::Single, dvalue))
        } else {
            Some(Fold::plain(ValueType::Single))
        }
    }

    pub(crate) fn func_log(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        self.func_trig(pos, args, f64::ln)
    }

    pub(crate) fn func_sqr(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        self.func_trig(pos, args, f64::sqrt)
    }

    pub(crate) fn func_pi(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        if !args.is_empty() {
            self.error_at(pos, "No arguments expected.");
            return None;
        }
        Some(Fold::number(ValueType::Single, 3.141593))
    }

    pub(crate) fn func_abs(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if arg.is_const() {
            Some(Fold {
                vtype: arg.value_type(),
                constval: true,
                dvalue: arg.const_dvalue().abs(),
                svalue: String::new(),
            })
        } else {
            Some(Fold::plain(arg.value_type()))
        }
    }

    /// CINT and FIX: truncation toward zero, integer result.
    pub(crate) fn func_cint_fix(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if arg.is_const() {
            Some(Fold::number(ValueType::Integer, arg.const_dvalue().trunc()))
        } else {
            Some(Fold::plain(ValueType::Integer))
        }
    }

    /// INT: floor, integer result.
    pub(crate) fn func_int(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if arg.is_const() {
            Some(Fold::number(ValueType::Integer, arg.const_dvalue().floor()))
        } else {
            Some(Fold::plain(ValueType::Integer))
        }
    }

    pub(crate) fn func_sgn(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if arg.is_const() {
            let dvalue = arg.const_dvalue();
            let sign = if dvalue == 0.0 {
                0.0
            } else if dvalue > 0.0 {
                1.0
            } else {
                -1.0
            };
            Some(Fold::number(ValueType::Integer, sign))
        } else {
            Some(Fold::plain(ValueType::Integer))
        }
    }

    pub(crate) fn func_rnd(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }
        Some(Fold::plain(ValueType::Single))
    }

    pub(crate) fn func_fre(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        if args.len() > 1 {
            self.error_at(pos, "Zero or one arguments expected.");
            return None;
        }
        if let Some(arg) = args.first_mut() {
            // Either a numeric or a string argument is acceptable.
            self.validate_expression_node_tree(arg);
        }
        Some(Fold::plain(ValueType::Integer))
    }

    pub(crate) fn func_csng(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if arg.is_const() {
            Some(Fold::number(ValueType::Single, arg.const_dvalue()))
        } else {
            Some(Fold::plain(ValueType::Single))
        }
    }

    pub(crate) fn func_peek(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }
        Some(Fold::plain(ValueType::Integer))
    }

    pub(crate) fn func_inp(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [port, mask] = args else {
            self.error_at(pos, "Two arguments expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(port) {
            return None;
        }
        if !self.check_integer_or_single_expression(mask) {
            return None;
        }
        Some(Fold::plain(ValueType::Integer))
    }

    pub(crate) fn func_asc(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_string_expression(arg) {
            return None;
        }

        if arg.is_const() {
            let svalue = arg.const_svalue();
            if svalue.is_empty() {
                self.error_at(pos, "Function ASC parameter is empty.");
                return None;
            }
            Some(Fold::number(
                ValueType::Integer,
                svalue.as_bytes()[0] as f64,
            ))
        } else {
            Some(Fold::plain(ValueType::Integer))
        }
    }

    pub(crate) fn func_chr(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if arg.is_const() {
            let ivalue = arg.const_dvalue() as i32;
            if !(0..=255).contains(&ivalue) {
                self.error_at(pos, "Function CHR$ parameter is out of range 0..255.");
                return None;
            }
            Some(Fold::string(((ivalue as u8) as char).to_string()))
        } else {
            Some(Fold::plain(ValueType::String))
        }
    }

    pub(crate) fn func_len(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_string_expression(arg) {
            return None;
        }

        if arg.is_const() {
            Some(Fold::number(
                ValueType::Integer,
                arg.const_svalue().len() as f64,
            ))
        } else {
            Some(Fold::plain(ValueType::Integer))
        }
    }

    pub(crate) fn func_mid(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        if args.len() < 2 || args.len() > 3 {
            self.error_at(pos, "Two or three arguments expected.");
            return None;
        }

        let (source, rest) = args.split_first_mut().unwrap();
        let (start, rest) = rest.split_first_mut().unwrap();
        if !self.check_string_expression(source) {
            return None;
        }
        if !self.check_integer_or_single_expression(start) {
            return None;
        }
        if let Some(length) = rest.first_mut() {
            if !self.check_integer_or_single_expression(length) {
                return None;
            }
        }

        let all_const =
            source.is_const() && start.is_const() && rest.first().map_or(true, |e| e.is_const());
        if !all_const {
            return Some(Fold::plain(ValueType::String));
        }

        let svalue = source.const_svalue();
        let istart = start.const_dvalue() as i32;
        if !(1..=255).contains(&istart) {
            self.error_at(pos, "Function MID$ second parameter out of range 1..255.");
            return None;
        }

        let folded = if svalue.is_empty() || (istart - 1) as usize >= svalue.len() {
            String::new()
        } else if let Some(length) = rest.first() {
            let ilen = length.const_dvalue() as i32;
            if ilen < 0 {
                self.error_at(pos, "Function MID$ third parameter should not be negative.");
                return None;
            }
            svalue
                .chars()
                .skip((istart - 1) as usize)
                .take(ilen as usize)
                .collect()
        } else {
            svalue.chars().skip((istart - 1) as usize).collect()
        };

        Some(Fold::string(folded))
    }

    pub(crate) fn func_string(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [count, filler] = args else {
            self.error_at(pos, "Two arguments expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(count) {
            return None;
        }
        // The filler may be a string or a character code.
        self.validate_expression_node_tree(filler);

        if !(count.is_const() && filler.is_const()) {
            return Some(Fold::plain(ValueType::String));
        }

        let icount = count.const_dvalue() as i32;
        if !(0..=255).contains(&icount) {
            self.error_at(pos, "Function STRING$ first parameter is not in range 0..255.");
            return None;
        }

        let ch = if filler.value_type() == ValueType::String {
            let svalue = filler.const_svalue();
            match svalue.chars().next() {
                Some(ch) => ch,
                None => {
                    self.error_at(pos, "Function STRING$ second parameter is empty string.");
                    return None;
                }
            }
        } else {
            let icode = filler.const_dvalue() as i32;
            if !(0..=255).contains(&icode) {
                self.error_at(
                    pos,
                    "Function STRING$ second parameter is not in range 0..255.",
                );
                return None;
            }
            (icode as u8) as char
        };

        Some(Fold::string(ch.to_string().repeat(icount as usize)))
    }

    /// VAL: numeric value of the leading number in a string.
    pub(crate) fn func_val(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_string_expression(arg) {
            return None;
        }

        if arg.is_const() {
            Some(Fold::number(
                ValueType::Single,
                leading_number(arg.const_svalue()),
            ))
        } else {
            Some(Fold::plain(ValueType::Single))
        }
    }

    pub(crate) fn func_inkey(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        if !args.is_empty() {
            self.error_at(pos, "No arguments expected.");
            return None;
        }
        Some(Fold::plain(ValueType::String))
    }

    pub(crate) fn func_str(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if !arg.is_const() {
            return Some(Fold::plain(ValueType::String));
        }

        let dvalue = arg.const_dvalue();
        if arg.value_type() == ValueType::Integer {
            let ivalue = dvalue as i64;
            if !(-32768..=32767).contains(&ivalue) {
                self.error_at(pos, "Function STR$ parameter is out of Integer range.");
                return None;
            }
            Some(Fold::string(format!("{}", ivalue)))
        } else if dvalue.floor() == dvalue && dvalue.abs() < 1e15 {
            Some(Fold::string(format!("{}", dvalue as i64)))
        } else {
            Some(Fold::string(format!("{}", dvalue)))
        }
    }

    /// BIN$, OCT$, HEX$: 16-bit representation in the given radix,
    /// negative values wrapped to 0..65535.
    pub(crate) fn func_radix(
        &mut self,
        pos: Pos,
        args: &mut [Expression],
        radix: u32,
    ) -> Option<Fold> {
        let name = match radix {
            2 => "BIN$",
            8 => "OCT$",
            _ => "HEX$",
        };
        let [arg] = args else {
            self.error_at(pos, "One argument expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(arg) {
            return None;
        }

        if !arg.is_const() {
            return Some(Fold::plain(ValueType::String));
        }

        let ivalue = arg.const_dvalue() as i64;
        if !(-32768..=32767).contains(&ivalue) {
            self.error_at(
                pos,
                format!("Function {} parameter is out of Integer range.", name),
            );
            return None;
        }
        let wrapped = if ivalue < 0 { 65536 + ivalue } else { ivalue } as u32;

        let svalue = match radix {
            2 => format!("{:b}", wrapped),
            8 => format!("{:o}", wrapped),
            _ => format!("{:X}", wrapped),
        };
        Some(Fold::string(svalue))
    }

    /// CSRLIN, POS, LPOS: cursor queries, integer, never constant.
    pub(crate) fn func_cursor(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        if args.len() > 1 {
            self.error_at(pos, "Zero or one arguments expected.");
            return None;
        }
        if let Some(arg) = args.first_mut() {
            if !self.check_integer_or_single_expression(arg) {
                return None;
            }
        }
        Some(Fold::plain(ValueType::Integer))
    }

    pub(crate) fn func_eof(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        if !args.is_empty() {
            self.error_at(pos, "No arguments expected.");
            return None;
        }
        Some(Fold::plain(ValueType::Integer))
    }

    pub(crate) fn func_point(&mut self, pos: Pos, args: &mut [Expression]) -> Option<Fold> {
        let [x, y] = args else {
            self.error_at(pos, "Two arguments expected.");
            return None;
        };
        if !self.check_integer_or_single_expression(x) {
            return None;
        }
        if !self.check_integer_or_single_expression(y) {
            return None;
        }
        Some(Fold::plain(ValueType::Integer))
    }
}

/// Value of the leading decimal number of a string, `0` when there is
/// none. Accepts sign, fraction and exponent.
fn leading_number(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let mut end = 0;
    let bytes = trimmed.as_bytes();
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        let b = bytes[end];
        let ok = match b {
            b'0'..=b'9' => true,
            b'+' | b'-' => end == 0 || bytes[end - 1] == b'E' || bytes[end - 1] == b'e',
            b'.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            b'E' | b'e' if !seen_exp && end > 0 => {
                seen_exp = true;
                true
            }
            _ => false,
        };
        if !ok {
            break;
        }
        end += 1;
    }
    trimmed[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::leading_number;
    use crate::tests::validate_program;
    use basc_util::ValueType;

    fn folded(source: &str) -> f64 {
        let (model, handler) = validate_program(source);
        assert!(!handler.has_errors(), "errors: {:?}", handler.drain());
        model.lines[0].statement.args[0].const_dvalue()
    }

    fn folded_string(source: &str) -> String {
        let (model, handler) = validate_program(source);
        assert!(!handler.has_errors(), "errors: {:?}", handler.drain());
        model.lines[0].statement.args[0].const_svalue().to_string()
    }

    #[test]
    fn test_numeric_folds() {
        assert_eq!(folded("10 LET A% = ABS(-7)\n"), 7.0);
        assert_eq!(folded("10 LET A% = SGN(-3)\n"), -1.0);
        assert_eq!(folded("10 LET A% = SGN(0)\n"), 0.0);
        assert_eq!(folded("10 LET A% = INT(2.7)\n"), 2.0);
        assert_eq!(folded("10 LET A% = INT(-2.7)\n"), -3.0);
        assert_eq!(folded("10 LET A% = FIX(-2.7)\n"), -2.0);
        assert_eq!(folded("10 LET A% = CINT(2.7)\n"), 2.0);
        assert_eq!(folded("10 LET A = SQR(16)\n"), 4.0);
    }

    #[test]
    fn test_trig_folds() {
        assert!((folded("10 LET A = SIN(0)\n")).abs() < 1e-12);
        assert!((folded("10 LET A = COS(0)\n") - 1.0).abs() < 1e-12);
        assert!((folded("10 LET A = EXP(0)\n") - 1.0).abs() < 1e-12);
        assert!((folded("10 LET A = ATN(0)\n")).abs() < 1e-12);
        assert!((folded("10 LET A = PI\n") - 3.141593).abs() < 1e-9);
    }

    #[test]
    fn test_string_folds() {
        assert_eq!(folded("10 LET A% = LEN(\"HELLO\")\n"), 5.0);
        assert_eq!(folded("10 LET A% = ASC(\"A\")\n"), 65.0);
        assert_eq!(folded_string("10 LET S$ = CHR$(65)\n"), "A");
        assert_eq!(folded_string("10 LET S$ = MID$(\"HELLO\", 2, 3)\n"), "ELL");
        assert_eq!(folded_string("10 LET S$ = MID$(\"HELLO\", 3)\n"), "LLO");
        assert_eq!(folded_string("10 LET S$ = STRING$(3, \"AB\")\n"), "AAA");
        assert_eq!(folded_string("10 LET S$ = STRING$(2, 66)\n"), "BB");
    }

    #[test]
    fn test_radix_folds() {
        assert_eq!(folded_string("10 LET S$ = HEX$(255)\n"), "FF");
        assert_eq!(folded_string("10 LET S$ = OCT$(8)\n"), "10");
        assert_eq!(folded_string("10 LET S$ = BIN$(5)\n"), "101");
        // Negative values wrap into 0..65535.
        assert_eq!(folded_string("10 LET S$ = HEX$(-1)\n"), "FFFF");
    }

    #[test]
    fn test_str_and_val() {
        assert_eq!(folded_string("10 LET S$ = STR$(7%)\n"), "7");
        assert_eq!(folded("10 LET A = VAL(\"12.5\")\n"), 12.5);
        assert_eq!(folded("10 LET A = VAL(\"X\")\n"), 0.0);
    }

    #[test]
    fn test_mid_out_of_range_start() {
        let (_, handler) = validate_program("10 LET S$ = MID$(\"HI\", 0)\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("MID$ second parameter out of range")));
    }

    #[test]
    fn test_mid_start_beyond_end_is_empty() {
        let (model, handler) = validate_program("10 LET S$ = MID$(\"HI\", 10)\n");
        assert!(!handler.has_errors());
        assert_eq!(model.lines[0].statement.args[0].const_svalue(), "");
    }

    #[test]
    fn test_chr_out_of_range() {
        let (_, handler) = validate_program("10 LET S$ = CHR$(256)\n");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_asc_empty_string() {
        let (_, handler) = validate_program("10 LET A% = ASC(\"\")\n");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_hex_out_of_range() {
        let (_, handler) = validate_program("10 LET S$ = HEX$(70000)\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("out of Integer range")));
    }

    #[test]
    fn test_non_const_functions_type_only() {
        let (model, handler) = validate_program("10 LET A% = PEEK(&H1000)\n");
        assert!(!handler.has_errors());
        let expr = &model.lines[0].statement.args[0];
        assert_eq!(expr.value_type(), ValueType::Integer);
        assert!(!expr.is_const());
    }

    #[test]
    fn test_folded_chr_is_interned() {
        let (model, handler) = validate_program("10 LET S$ = CHR$(65)\n");
        assert!(!handler.has_errors());
        assert_eq!(model.const_string_index("A"), Some(1));
    }

    #[test]
    fn test_string_type_mismatch() {
        let (_, handler) = validate_program("10 LET A% = LEN(5)\n");
        assert!(handler.has_errors());
        let diags = handler.drain();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("should be of type String")));
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("42"), 42.0);
        assert_eq!(leading_number("  -3.5X"), -3.5);
        assert_eq!(leading_number("1E2"), 100.0);
        assert_eq!(leading_number("ABC"), 0.0);
        assert_eq!(leading_number(""), 0.0);
    }
}
