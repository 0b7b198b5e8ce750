//! basc-par - Parser for the basc compiler.
//!
//! Reads the token stream and produces one [`SourceLine`] model per
//! source line. Each line holds a statement with argument expressions,
//! parameter tokens and variable references; expressions are built by
//! the operator-precedence sub-parser in [`expr`].
//!
//! Parse errors are recoverable per line: the error is recorded on the
//! diagnostic handler, the line is marked, the parser resynchronizes at
//! the next end of line and keeps going, so one run surfaces every
//! syntax error in the file.

pub mod ast;
mod expr;
mod stmt;

pub use ast::{
    Expression, ExpressionNode, SourceLine, SourceModel, Statement, Variable, VariableExpression,
};

use basc_lex::{Keyword, Token, TokenKind, Tokenizer};
use basc_util::{Handler, MAX_LINE_NUMBER};

/// The statement parser.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    handler: &'a Handler,
    peeked: Option<Token>,
    /// Number of the line currently being parsed, for diagnostics.
    line_number: u32,
    /// Set when the current line recorded an error.
    had_error: bool,
    /// True when the last consumed token ended the line; keeps error
    /// resynchronization from eating into the following line.
    at_line_end: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: Tokenizer<'a>, handler: &'a Handler) -> Self {
        Self {
            tokenizer,
            handler,
            peeked: None,
            line_number: 0,
            had_error: false,
            at_line_end: false,
        }
    }

    /// Parse the next source line, or `None` at end of input.
    pub fn parse_next_line(&mut self) -> Option<SourceLine> {
        let mut token = self.get_next_token();
        loop {
            match token.kind {
                TokenKind::Eol | TokenKind::Divider | TokenKind::EndComment => {
                    token = self.get_next_token();
                }
                TokenKind::Eot => return None,
                _ => break,
            }
        }

        let mut line = SourceLine::default();
        self.had_error = false;
        self.line_number = 0;

        if token.kind != TokenKind::Number {
            self.error(&token, "Line number not found.");
            self.skip_til_end();
            line.error = true;
            return Some(line);
        }

        let number = token.dvalue as u32;
        if !token.is_dvalue_integer() || number < 1 || number > MAX_LINE_NUMBER {
            self.error(&token, format!("Invalid line number {}.", token.text));
            self.skip_til_end();
            line.error = true;
            return Some(line);
        }
        line.number = number;
        line.text = self.tokenizer.line_text(token.pos.line).to_string();
        self.line_number = number;

        let token = self.get_next_token_skip_divider();
        self.parse_statement(&mut line.statement, token);

        if self.had_error {
            line.error = true;
            if !self.at_line_end {
                self.skip_til_end();
            }
        }
        Some(line)
    }

    /// Parse one statement starting at its leading token. Used for the
    /// statement body of a line and for `THEN`/`ELSE` payloads.
    fn parse_statement(&mut self, stmt: &mut Statement, token: Token) {
        match token.kind {
            TokenKind::EndComment => {
                // Apostrophe comment: alias for REM; the tokenizer has
                // already consumed the rest of the line.
                let mut token = token;
                token.keyword = Keyword::Rem;
                stmt.token = token;
            }
            TokenKind::Symbol if token.symbol == '?' => {
                // PRINT short form.
                let mut token = token;
                token.keyword = Keyword::Print;
                stmt.token = token;
                self.parse_print(stmt);
            }
            TokenKind::Identifier => {
                // LET without the keyword.
                stmt.token = Token::synthetic_keyword(Keyword::Let);
                self.parse_let_short(token, stmt);
            }
            TokenKind::Keyword => {
                stmt.token = token.clone();
                self.dispatch_keyword(stmt, &token);
            }
            _ => {
                self.error(&token, "Keyword expected.");
            }
        }
    }

    fn dispatch_keyword(&mut self, stmt: &mut Statement, token: &Token) {
        match token.keyword {
            Keyword::Beep
            | Keyword::Cls
            | Keyword::End
            | Keyword::Return
            | Keyword::Stop
            | Keyword::Tron
            | Keyword::Troff => self.parse_no_params(stmt),
            Keyword::Bload
            | Keyword::Bsave
            | Keyword::Cload
            | Keyword::Csave
            | Keyword::Load
            | Keyword::Save
            | Keyword::Merge
            | Keyword::Files
            | Keyword::Lprint
            | Keyword::Close => self.parse_skipped(stmt),
            Keyword::Circle => self.parse_circle(stmt),
            Keyword::Clear => self.parse_clear(stmt),
            Keyword::Color => self.parse_color(stmt),
            Keyword::Data => self.parse_data(stmt),
            Keyword::Def => self.parse_def(stmt),
            Keyword::Dim => self.parse_dim(stmt),
            Keyword::Draw => self.parse_draw(stmt),
            Keyword::For => self.parse_for(stmt),
            Keyword::Gosub | Keyword::Goto => self.parse_goto_gosub(stmt),
            Keyword::If => self.parse_if(stmt),
            Keyword::Input => self.parse_input(stmt),
            Keyword::Key => self.parse_key(stmt),
            Keyword::Let => self.parse_let(stmt),
            Keyword::Line => self.parse_line_stmt(stmt),
            Keyword::Locate => self.parse_locate(stmt),
            Keyword::Next => self.parse_next_stmt(stmt),
            Keyword::On => self.parse_on(stmt),
            Keyword::Open => self.parse_open(stmt),
            Keyword::Out => self.parse_out(stmt),
            Keyword::Paint => self.parse_paint(stmt),
            Keyword::Poke => self.parse_poke(stmt),
            Keyword::Print => self.parse_print(stmt),
            Keyword::Pset | Keyword::Preset => self.parse_pset_preset(stmt),
            Keyword::Read => self.parse_read(stmt),
            Keyword::Rem => self.parse_rem(stmt),
            Keyword::Restore => self.parse_restore(stmt),
            Keyword::Screen => self.parse_screen(stmt),
            Keyword::Width => self.parse_width(stmt),
            _ => {
                self.error(token, format!("Unexpected keyword {}.", token.keyword));
            }
        }
    }

    // Token plumbing ------------------------------------------------------

    fn get_next_token(&mut self) -> Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.tokenizer.next_token(),
        };
        self.at_line_end = token.is_eol_or_eot();
        token
    }

    fn peek_next_token(&mut self) -> Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.tokenizer.next_token());
        }
        self.peeked.clone().unwrap()
    }

    fn get_next_token_skip_divider(&mut self) -> Token {
        let mut token = self.get_next_token();
        while token.kind == TokenKind::Divider {
            token = self.get_next_token();
        }
        token
    }

    fn peek_next_token_skip_divider(&mut self) -> Token {
        let mut token = self.peek_next_token();
        while token.kind == TokenKind::Divider {
            self.get_next_token();
            token = self.peek_next_token();
        }
        token
    }

    fn skip_til_end(&mut self) {
        loop {
            let token = self.get_next_token();
            if token.is_eol_or_eot() {
                break;
            }
        }
    }

    // Shared statement helpers -------------------------------------------

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        self.handler
            .error_at(self.line_number, token.pos, message);
        self.had_error = true;
    }

    /// True when `token` ends a statement: end of line, end of text, or
    /// an `ELSE` that belongs to an enclosing `IF`.
    fn at_statement_end(token: &Token) -> bool {
        token.is_eol_or_eot() || token.is_keyword(Keyword::Else)
    }

    /// Consume the end of the statement, or report unexpected text.
    /// An `ELSE` terminator is left for the enclosing `IF` to consume.
    fn expect_statement_end(&mut self, after: &str) {
        let token = self.peek_next_token_skip_divider();
        if token.is_keyword(Keyword::Else) {
            return;
        }
        if token.is_eol_or_eot() {
            self.get_next_token_skip_divider();
            return;
        }
        self.error(&token, format!("Unexpected text after {}.", after));
    }

    fn expect_comma(&mut self) -> bool {
        let token = self.get_next_token_skip_divider();
        if !token.is_comma() {
            self.error(&token, "Comma expected.");
            return false;
        }
        true
    }
}
