//! Reserved words of the source language.

use std::fmt;

/// Keyword tag carried by keyword tokens.
///
/// Covers every reserved word of the dialect, including the string
/// functions whose names end in `$`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Not a keyword.
    #[default]
    None,
    Abs,
    And,
    Asc,
    At,
    Atn,
    Auto,
    Beep,
    Bload,
    Bsave,
    Bin,
    Cdbl,
    Chr,
    Cint,
    Circle,
    Clear,
    Cload,
    Cls,
    Color,
    Cont,
    Cos,
    Csave,
    Csng,
    Csrlin,
    Close,
    Screen,
    Delete,
    Dim,
    Draw,
    Data,
    Def,
    Else,
    End,
    Eof,
    Eqv,
    Exp,
    Files,
    Fix,
    Fn,
    For,
    Fre,
    Gosub,
    Goto,
    Hex,
    If,
    Imp,
    Inkey,
    Inp,
    Input,
    Int,
    Key,
    Len,
    Let,
    List,
    Llist,
    Load,
    Locate,
    Log,
    Lpos,
    Lprint,
    Line,
    Mid,
    Mod,
    Merge,
    New,
    Next,
    Not,
    On,
    Or,
    Out,
    Open,
    Oct,
    Paint,
    Peek,
    Pi,
    Point,
    Poke,
    Pos,
    Preset,
    Print,
    Pset,
    Rem,
    Renum,
    Return,
    Rnd,
    Read,
    Restore,
    Save,
    Sgn,
    Sin,
    Sqr,
    Step,
    Stop,
    Str,
    System,
    StringFn,
    Spc,
    Tab,
    Tan,
    Then,
    To,
    Troff,
    Tron,
    Usr,
    Val,
    Width,
    Xor,
}

impl Keyword {
    /// Look up a reserved word, case-insensitively.
    ///
    /// Returns `Keyword::None` when the text is not a reserved word.
    pub fn lookup(text: &str) -> Keyword {
        let upper = text.to_ascii_uppercase();
        match upper.as_str() {
            "ABS" => Keyword::Abs,
            "AND" => Keyword::And,
            "ASC" => Keyword::Asc,
            "AT" => Keyword::At,
            "ATN" => Keyword::Atn,
            "AUTO" => Keyword::Auto,
            "BEEP" => Keyword::Beep,
            "BLOAD" => Keyword::Bload,
            "BSAVE" => Keyword::Bsave,
            "BIN$" => Keyword::Bin,
            "CDBL" => Keyword::Cdbl,
            "CHR$" => Keyword::Chr,
            "CINT" => Keyword::Cint,
            "CIRCLE" => Keyword::Circle,
            "CLEAR" => Keyword::Clear,
            "CLOAD" => Keyword::Cload,
            "CLS" => Keyword::Cls,
            "COLOR" => Keyword::Color,
            "CONT" => Keyword::Cont,
            "COS" => Keyword::Cos,
            "CSAVE" => Keyword::Csave,
            "CSNG" => Keyword::Csng,
            "CSRLIN" => Keyword::Csrlin,
            "CLOSE" => Keyword::Close,
            "SCREEN" => Keyword::Screen,
            "DELETE" => Keyword::Delete,
            "DIM" => Keyword::Dim,
            "DRAW" => Keyword::Draw,
            "DATA" => Keyword::Data,
            "DEF" => Keyword::Def,
            "ELSE" => Keyword::Else,
            "END" => Keyword::End,
            "EOF" => Keyword::Eof,
            "EQV" => Keyword::Eqv,
            "EXP" => Keyword::Exp,
            "FILES" => Keyword::Files,
            "FIX" => Keyword::Fix,
            "FN" => Keyword::Fn,
            "FOR" => Keyword::For,
            "FRE" => Keyword::Fre,
            "GOSUB" => Keyword::Gosub,
            "GOTO" => Keyword::Goto,
            "HEX$" => Keyword::Hex,
            "IF" => Keyword::If,
            "IMP" => Keyword::Imp,
            "INKEY$" => Keyword::Inkey,
            "INP" => Keyword::Inp,
            "INPUT" => Keyword::Input,
            "INT" => Keyword::Int,
            "KEY" => Keyword::Key,
            "LEN" => Keyword::Len,
            "LET" => Keyword::Let,
            "LIST" => Keyword::List,
            "LLIST" => Keyword::Llist,
            "LOAD" => Keyword::Load,
            "LOCATE" => Keyword::Locate,
            "LOG" => Keyword::Log,
            "LPOS" => Keyword::Lpos,
            "LPRINT" => Keyword::Lprint,
            "LINE" => Keyword::Line,
            "MID$" => Keyword::Mid,
            "MOD" => Keyword::Mod,
            "MERGE" => Keyword::Merge,
            "NEW" => Keyword::New,
            "NEXT" => Keyword::Next,
            "NOT" => Keyword::Not,
            "ON" => Keyword::On,
            "OR" => Keyword::Or,
            "OUT" => Keyword::Out,
            "OPEN" => Keyword::Open,
            "OCT$" => Keyword::Oct,
            "PAINT" => Keyword::Paint,
            "PEEK" => Keyword::Peek,
            "PI" => Keyword::Pi,
            "POINT" => Keyword::Point,
            "POKE" => Keyword::Poke,
            "POS" => Keyword::Pos,
            "PRESET" => Keyword::Preset,
            "PRINT" => Keyword::Print,
            "PSET" => Keyword::Pset,
            "REM" => Keyword::Rem,
            "RENUM" => Keyword::Renum,
            "RETURN" => Keyword::Return,
            "RND" => Keyword::Rnd,
            "READ" => Keyword::Read,
            "RESTORE" => Keyword::Restore,
            "SAVE" => Keyword::Save,
            "SGN" => Keyword::Sgn,
            "SIN" => Keyword::Sin,
            "SQR" => Keyword::Sqr,
            "STEP" => Keyword::Step,
            "STOP" => Keyword::Stop,
            "STR$" => Keyword::Str,
            "SYSTEM" => Keyword::System,
            "STRING$" => Keyword::StringFn,
            "SPC" => Keyword::Spc,
            "TAB" => Keyword::Tab,
            "TAN" => Keyword::Tan,
            "THEN" => Keyword::Then,
            "TO" => Keyword::To,
            "TROFF" => Keyword::Troff,
            "TRON" => Keyword::Tron,
            "USR" => Keyword::Usr,
            "VAL" => Keyword::Val,
            "WIDTH" => Keyword::Width,
            "XOR" => Keyword::Xor,
            _ => Keyword::None,
        }
    }

    /// The reserved word as it appears in source, uppercase.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::None => "",
            Keyword::Abs => "ABS",
            Keyword::And => "AND",
            Keyword::Asc => "ASC",
            Keyword::At => "AT",
            Keyword::Atn => "ATN",
            Keyword::Auto => "AUTO",
            Keyword::Beep => "BEEP",
            Keyword::Bload => "BLOAD",
            Keyword::Bsave => "BSAVE",
            Keyword::Bin => "BIN$",
            Keyword::Cdbl => "CDBL",
            Keyword::Chr => "CHR$",
            Keyword::Cint => "CINT",
            Keyword::Circle => "CIRCLE",
            Keyword::Clear => "CLEAR",
            Keyword::Cload => "CLOAD",
            Keyword::Cls => "CLS",
            Keyword::Color => "COLOR",
            Keyword::Cont => "CONT",
            Keyword::Cos => "COS",
            Keyword::Csave => "CSAVE",
            Keyword::Csng => "CSNG",
            Keyword::Csrlin => "CSRLIN",
            Keyword::Close => "CLOSE",
            Keyword::Screen => "SCREEN",
            Keyword::Delete => "DELETE",
            Keyword::Dim => "DIM",
            Keyword::Draw => "DRAW",
            Keyword::Data => "DATA",
            Keyword::Def => "DEF",
            Keyword::Else => "ELSE",
            Keyword::End => "END",
            Keyword::Eof => "EOF",
            Keyword::Eqv => "EQV",
            Keyword::Exp => "EXP",
            Keyword::Files => "FILES",
            Keyword::Fix => "FIX",
            Keyword::Fn => "FN",
            Keyword::For => "FOR",
            Keyword::Fre => "FRE",
            Keyword::Gosub => "GOSUB",
            Keyword::Goto => "GOTO",
            Keyword::Hex => "HEX$",
            Keyword::If => "IF",
            Keyword::Imp => "IMP",
            Keyword::Inkey => "INKEY$",
            Keyword::Inp => "INP",
            Keyword::Input => "INPUT",
            Keyword::Int => "INT",
            Keyword::Key => "KEY",
            Keyword::Len => "LEN",
            Keyword::Let => "LET",
            Keyword::List => "LIST",
            Keyword::Llist => "LLIST",
            Keyword::Load => "LOAD",
            Keyword::Locate => "LOCATE",
            Keyword::Log => "LOG",
            Keyword::Lpos => "LPOS",
            Keyword::Lprint => "LPRINT",
            Keyword::Line => "LINE",
            Keyword::Mid => "MID$",
            Keyword::Mod => "MOD",
            Keyword::Merge => "MERGE",
            Keyword::New => "NEW",
            Keyword::Next => "NEXT",
            Keyword::Not => "NOT",
            Keyword::On => "ON",
            Keyword::Or => "OR",
            Keyword::Out => "OUT",
            Keyword::Open => "OPEN",
            Keyword::Oct => "OCT$",
            Keyword::Paint => "PAINT",
            Keyword::Peek => "PEEK",
            Keyword::Pi => "PI",
            Keyword::Point => "POINT",
            Keyword::Poke => "POKE",
            Keyword::Pos => "POS",
            Keyword::Preset => "PRESET",
            Keyword::Print => "PRINT",
            Keyword::Pset => "PSET",
            Keyword::Rem => "REM",
            Keyword::Renum => "RENUM",
            Keyword::Return => "RETURN",
            Keyword::Rnd => "RND",
            Keyword::Read => "READ",
            Keyword::Restore => "RESTORE",
            Keyword::Save => "SAVE",
            Keyword::Sgn => "SGN",
            Keyword::Sin => "SIN",
            Keyword::Sqr => "SQR",
            Keyword::Step => "STEP",
            Keyword::Stop => "STOP",
            Keyword::Str => "STR$",
            Keyword::System => "SYSTEM",
            Keyword::StringFn => "STRING$",
            Keyword::Spc => "SPC",
            Keyword::Tab => "TAB",
            Keyword::Tan => "TAN",
            Keyword::Then => "THEN",
            Keyword::To => "TO",
            Keyword::Troff => "TROFF",
            Keyword::Tron => "TRON",
            Keyword::Usr => "USR",
            Keyword::Val => "VAL",
            Keyword::Width => "WIDTH",
            Keyword::Xor => "XOR",
        }
    }

    /// True for keywords usable as functions inside expressions.
    pub fn is_function(self) -> bool {
        matches!(
            self,
            Keyword::Sqr
                | Keyword::Sin
                | Keyword::Cos
                | Keyword::Tan
                | Keyword::Atn
                | Keyword::Pi
                | Keyword::Exp
                | Keyword::Log
                | Keyword::Abs
                | Keyword::Fix
                | Keyword::Int
                | Keyword::Sgn
                | Keyword::Rnd
                | Keyword::Fre
                | Keyword::Cint
                | Keyword::Csng
                | Keyword::Cdbl
                | Keyword::Peek
                | Keyword::Inp
                | Keyword::Asc
                | Keyword::Chr
                | Keyword::Len
                | Keyword::Mid
                | Keyword::StringFn
                | Keyword::Val
                | Keyword::Inkey
                | Keyword::Str
                | Keyword::Bin
                | Keyword::Oct
                | Keyword::Hex
                | Keyword::Csrlin
                | Keyword::Pos
                | Keyword::Lpos
                | Keyword::Eof
                | Keyword::Point
                | Keyword::At
                | Keyword::Tab
                | Keyword::Spc
                | Keyword::Fn
                | Keyword::Usr
        )
    }

    /// True for the reserved words that act as binary infix operators.
    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            Keyword::Mod
                | Keyword::And
                | Keyword::Or
                | Keyword::Xor
                | Keyword::Eqv
                | Keyword::Imp
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(Keyword::lookup("print"), Keyword::Print);
        assert_eq!(Keyword::lookup("Print"), Keyword::Print);
        assert_eq!(Keyword::lookup("PRINT"), Keyword::Print);
    }

    #[test]
    fn test_lookup_dollar_names() {
        assert_eq!(Keyword::lookup("mid$"), Keyword::Mid);
        assert_eq!(Keyword::lookup("CHR$"), Keyword::Chr);
        assert_eq!(Keyword::lookup("inkey$"), Keyword::Inkey);
        assert_eq!(Keyword::lookup("STRING$"), Keyword::StringFn);
    }

    #[test]
    fn test_lookup_non_keyword() {
        assert_eq!(Keyword::lookup("FOO"), Keyword::None);
        assert_eq!(Keyword::lookup("PRINTX"), Keyword::None);
        // MID without the $ is an ordinary identifier.
        assert_eq!(Keyword::lookup("MID"), Keyword::None);
    }

    #[test]
    fn test_function_classification() {
        assert!(Keyword::Sin.is_function());
        assert!(Keyword::Mid.is_function());
        assert!(Keyword::Tab.is_function());
        assert!(!Keyword::Print.is_function());
        assert!(!Keyword::For.is_function());
        assert!(!Keyword::Mod.is_function());
    }

    #[test]
    fn test_binary_operator_keywords() {
        assert!(Keyword::Mod.is_binary_operator());
        assert!(Keyword::And.is_binary_operator());
        assert!(Keyword::Imp.is_binary_operator());
        assert!(Keyword::Eqv.is_binary_operator());
        assert!(!Keyword::Not.is_binary_operator());
        assert!(!Keyword::Sin.is_binary_operator());
    }

    #[test]
    fn test_roundtrip_as_str() {
        for kw in [Keyword::Print, Keyword::Mid, Keyword::StringFn, Keyword::Xor] {
            assert_eq!(Keyword::lookup(kw.as_str()), kw);
        }
    }
}
