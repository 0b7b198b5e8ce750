//! basc-gen - Assembly emitter for the basc compiler.
//!
//! Walks the validated lines in order and appends PDP-11 assembly text
//! to the output buffer: a prologue (`.MCALL .EXIT`, the entry label),
//! one labelled block per source line, and an epilogue holding the
//! sentinel label, the interned string table and the variable area.
//!
//! The convention throughout is that the value of any expression is
//! left in R0. Statements that have no implemented target lowering
//! emit a `; TODO ...` comment instead of an error; the test suite
//! treats a TODO-free output as the success signal.

mod expr;
mod output;
mod stmt;

pub use output::AsmOutput;

use basc_lex::Keyword;
use basc_par::{SourceLine, SourceModel, Statement, Variable};
use basc_util::{Handler, ValueType, MAX_LINE_NUMBER};

/// The assembly generator.
pub struct Generator<'a> {
    source: &'a SourceModel,
    output: &'a mut AsmOutput,
    handler: &'a Handler,
    /// Number of the line being emitted.
    current_line: u32,
    /// Next free local-label number; reset for every source line.
    next_local: u32,
}

impl<'a> Generator<'a> {
    pub fn new(source: &'a SourceModel, output: &'a mut AsmOutput, handler: &'a Handler) -> Self {
        Self {
            source,
            output,
            handler,
            current_line: 0,
            next_local: 10,
        }
    }

    /// Emit the whole program.
    pub fn process(&mut self) {
        self.process_begin();
        for index in 0..self.source.lines.len() {
            let line = self.source.lines[index].clone();
            self.process_line(&line);
        }
        self.process_end();
    }

    fn process_begin(&mut self) {
        self.output.add_line("\t.MCALL\t.EXIT");
        self.output.add_line("START:");
    }

    fn process_line(&mut self, line: &SourceLine) {
        self.current_line = line.number;
        self.next_local = 10;

        self.output.add_comment(&line.text);
        self.output.add_line(format!("L{}:", line.number));

        self.generate_statement(&line.statement);
    }

    fn process_end(&mut self) {
        // Sentinel label: the universal "after the end" jump target.
        self.output.add_line(format!("L{}:", MAX_LINE_NUMBER + 1));
        self.output.add_line("\t.EXIT");

        self.generate_strings();
        self.generate_variables();

        self.output.add_line("\t.END\tSTART");
    }

    /// Dispatch one statement body to its emitter.
    pub(crate) fn generate_statement(&mut self, stmt: &Statement) {
        match stmt.token.keyword {
            Keyword::Beep => self.generate_beep(),
            Keyword::Cls => self.generate_cls(),
            Keyword::End => self.generate_end(),
            Keyword::Stop => self.generate_stop(),
            Keyword::Return => self.generate_return(),
            Keyword::Rem | Keyword::Dim => {} // nothing to emit
            Keyword::Bload
            | Keyword::Bsave
            | Keyword::Cload
            | Keyword::Csave
            | Keyword::Load
            | Keyword::Save
            | Keyword::Merge
            | Keyword::Files
            | Keyword::Lprint
            | Keyword::Clear
            | Keyword::Screen
            | Keyword::Width
            | Keyword::Key
            | Keyword::Tron
            | Keyword::Troff => self.generate_ignored(stmt),
            Keyword::Data => self.output.add_comment("TODO DATA"),
            Keyword::Read => self.output.add_comment("TODO READ"),
            Keyword::Restore => self.output.add_comment("TODO RESTORE"),
            Keyword::Color => self.output.add_comment("TODO COLOR"),
            Keyword::Locate => self.output.add_comment("TODO LOCATE"),
            Keyword::Draw => self.output.add_comment("TODO DRAW"),
            Keyword::Line => self.output.add_comment("TODO LINE"),
            Keyword::Circle => self.output.add_comment("TODO CIRCLE"),
            Keyword::Paint => self.output.add_comment("TODO PAINT"),
            Keyword::Pset => self.output.add_comment("TODO PSET"),
            Keyword::Preset => self.output.add_comment("TODO PRESET"),
            Keyword::Open => self.output.add_comment("TODO OPEN"),
            Keyword::Close => self.output.add_comment("TODO CLOSE"),
            Keyword::Out => self.output.add_comment("TODO OUT"),
            Keyword::Def => self.output.add_comment("TODO DEF"),
            Keyword::Poke => self.generate_poke(stmt),
            Keyword::For => self.generate_for(stmt),
            Keyword::Next => self.generate_next(stmt),
            Keyword::Goto => self.generate_goto(stmt),
            Keyword::Gosub => self.generate_gosub(stmt),
            Keyword::If => self.generate_if(stmt),
            Keyword::On => self.generate_on(stmt),
            Keyword::Let => self.generate_let(stmt),
            Keyword::Input => self.generate_input(stmt),
            Keyword::Print => self.generate_print(stmt),
            keyword => {
                self.error(format!("Generator for keyword {} not found.", keyword));
            }
        }
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.handler.error(self.current_line, message);
    }

    /// A fresh local label for the current line, `10$` first.
    pub(crate) fn local_label(&mut self) -> String {
        let label = format!("{}$", self.next_local);
        self.next_local += 1;
        label
    }

    /// Immediate operand text for an integer constant, decimal form.
    pub(crate) fn immediate(value: i32) -> String {
        format!("#{}.", value)
    }

    /// Integer value of a folded constant, truncated toward negative
    /// infinity like the assignment paths.
    pub(crate) fn int_value(dvalue: f64) -> i32 {
        dvalue.floor() as i32
    }

    // Epilogue sections ----------------------------------------------------

    /// Interned-string table: length-prefixed `.ASCII` entries, padded
    /// to word size, with control bytes and `/` escaped in octal.
    fn generate_strings(&mut self) {
        if self.source.conststrings.is_empty() {
            return;
        }

        self.output.add_comment("STRINGS");
        self.output.add_line("\t.EVEN");

        for (index, value) in self.source.conststrings.iter().enumerate() {
            let label = format!("ST{}", index + 1);

            let mut length = value.len().to_string();
            if value.len() > 7 {
                length.push('.'); // force decimal radix
            }

            let mut bytes: Vec<u8> = value.bytes().collect();
            if value.len() % 2 == 0 {
                bytes.push(0); // align the length byte + text to a word
            }

            let mut out = format!("{}:\t.ASCII\t<{}>", label, length);
            let mut inside = false; // inside a /.../ run
            let last = bytes.len().saturating_sub(1);
            for (i, &byte) in bytes.iter().enumerate() {
                if byte < 32 || byte == b'/' || byte >= 127 {
                    if inside {
                        out.push('/');
                        inside = false;
                    }
                    out.push_str(&format!("<{:o}>", byte));
                } else {
                    if !inside {
                        out.push('/');
                        inside = true;
                    }
                    out.push(byte as char);
                }

                if out.len() >= 87 {
                    if inside {
                        out.push('/');
                        inside = false;
                    }
                    self.output.add_line(out.clone());
                    out.clear();
                    if i < last {
                        out.push_str("\t.ASCII\t");
                    }
                }
            }
            if !out.is_empty() {
                if inside {
                    out.push('/');
                }
                self.output.add_line(out);
            }
        }
    }

    /// Variable area: one declaration per variable, sorted by
    /// decorated name. Arrays reserve the product of their extents.
    fn generate_variables(&mut self) {
        if self.source.vars.is_empty() {
            return;
        }

        self.output.add_comment("VARIABLES");

        let mut vars: Vec<&Variable> = self.source.vars.values().collect();
        vars.sort_by_key(|var| var.decorated_name());

        for var in vars {
            let deconame = var.decorated_name();
            let vtype = var.value_type();

            if var.indices.is_empty() {
                let line = match vtype {
                    ValueType::Integer => format!("{}:\t.WORD\t0\t; {}", deconame, var.name),
                    ValueType::String => format!("{}:\t.BLKB\t256.\t; {}", deconame, var.name),
                    _ => format!("{}:\t.WORD\t0,0\t; {}", deconame, var.name),
                };
                self.output.add_line(line);
            } else {
                let elements: i64 = var.indices.iter().map(|&n| (n as i64) + 1).product();
                let elem_size: i64 = match vtype {
                    ValueType::Integer => 2,
                    ValueType::String => 256,
                    _ => 4,
                };
                self.output.add_line(format!(
                    "{}:\t.BLKB\t{}.\t; {}",
                    deconame,
                    elements * elem_size,
                    var.name
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basc_lex::Tokenizer;
    use basc_par::Parser;
    use basc_sem::Validator;

    /// Run the full pipeline and return the assembly text.
    pub(crate) fn compile(source: &str) -> String {
        let handler = Handler::new();
        let mut model = SourceModel::new();
        {
            let tokenizer = Tokenizer::new(source);
            let mut parser = Parser::new(tokenizer, &handler);
            while let Some(line) = parser.parse_next_line() {
                model.lines.push(line);
            }
        }
        assert!(!handler.has_errors(), "parse errors: {:?}", handler.drain());
        {
            let mut validator = Validator::new(&mut model, &handler);
            validator.process();
        }
        assert!(
            !handler.has_errors(),
            "validation errors: {:?}",
            handler.drain()
        );

        let mut output = AsmOutput::new();
        {
            let mut generator = Generator::new(&model, &mut output, &handler);
            generator.process();
        }
        assert!(
            !handler.has_errors(),
            "generation errors: {:?}",
            handler.drain()
        );
        output.text()
    }

    fn assert_in_order(text: &str, needles: &[&str]) {
        let mut offset = 0;
        for needle in needles {
            match text[offset..].find(needle) {
                Some(found) => offset += found + needle.len(),
                None => panic!("{:?} not found in order in:\n{}", needle, text),
            }
        }
    }

    #[test]
    fn test_emission_ordering() {
        let text = compile("10 PRINT \"HI\"\n20 LET A% = 1\n");
        assert_in_order(
            &text,
            &[
                "\t.MCALL\t.EXIT",
                "START:",
                "L10:",
                "L20:",
                "L65536:",
                "\t.EXIT",
                "; STRINGS",
                "; VARIABLES",
                "\t.END\tSTART",
            ],
        );
    }

    #[test]
    fn test_string_table_entry() {
        let text = compile("10 PRINT \"HI\"\n");
        assert!(text.contains("ST1:\t.ASCII\t<2>/HI/"), "text:\n{}", text);
        assert!(text.contains("\t.EVEN"));
    }

    #[test]
    fn test_string_table_escapes_slash() {
        let text = compile("10 PRINT \"A/B\"\n");
        // '/' appears as its octal code inside the .ASCII payload.
        assert!(text.contains("<57>"), "text:\n{}", text);
    }

    #[test]
    fn test_string_table_even_length_padded() {
        // Length 2 plus its count byte is odd, so a NUL pad lands at
        // the end of the entry.
        let text = compile("10 PRINT \"HI\"\n");
        assert!(text.contains("/HI/<0>"), "text:\n{}", text);
    }

    #[test]
    fn test_variables_sorted_by_decorated_name() {
        let text = compile("10 LET Z% = 1\n20 LET A% = 2\n");
        let a = text.find("VARA$I:").expect("VARA$I present");
        let z = text.find("VARZ$I:").expect("VARZ$I present");
        assert!(a < z);
    }

    #[test]
    fn test_variable_declarations_by_type() {
        let text = compile("10 LET A% = 1\n20 LET B = 2\n30 LET C$ = \"X\"\n");
        assert!(text.contains("VARA$I:\t.WORD\t0\t; A%"));
        assert!(text.contains("VARB:\t.WORD\t0,0\t; B"));
        assert!(text.contains("VARC$S:\t.BLKB\t256.\t; C$"));
    }

    #[test]
    fn test_array_reserves_extents() {
        let text = compile("10 DIM M%(3, 3)\n");
        // (3+1) * (3+1) integer elements, two bytes each.
        assert!(text.contains("VARM$I:\t.BLKB\t32.\t; M%"), "text:\n{}", text);
    }

    #[test]
    fn test_source_lines_echoed_as_comments() {
        let text = compile("10 REM HELLO\n");
        assert!(text.contains("; 10 REM HELLO"));
    }

    #[test]
    fn test_no_strings_section_without_strings() {
        let text = compile("10 LET A% = 1\n");
        assert!(!text.contains("STRINGS"));
    }

    #[test]
    fn test_ignored_statement_comment() {
        let text = compile("10 SCREEN 2\n");
        assert!(text.contains("; SCREEN statement is ignored"));
    }
}
