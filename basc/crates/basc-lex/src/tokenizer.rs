//! The tokenizer.
//!
//! Consumes characters with one-character lookahead and tracks 1-based
//! line/column positions. Tokenization is total: any byte stream yields
//! a finite token stream terminated by exactly one end-of-text token.

use basc_util::{Pos, ValueType};

use crate::token::parse_number_value;
use crate::{Keyword, Token, TokenKind};

/// Streaming tokenizer over a source text.
pub struct Tokenizer<'a> {
    source: &'a str,
    /// Byte offsets of each physical line (start, end), EOL excluded.
    line_spans: Vec<(usize, usize)>,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_spans = Vec::new();
        let mut start = 0;
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                let end = if i > start && source.as_bytes()[i - 1] == b'\r' {
                    i - 1
                } else {
                    i
                };
                line_spans.push((start, end));
                start = i + 1;
            }
        }
        line_spans.push((start, source.len()));

        Self {
            source,
            line_spans,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Full text of a physical source line (1-based), without the EOL.
    ///
    /// Used for the source-echo comments in the generated assembly.
    pub fn line_text(&self, line: u32) -> &'a str {
        match self.line_spans.get(line as usize - 1) {
            Some(&(start, end)) => &self.source[start..end],
            None => "",
        }
    }

    fn current(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn peek(&self) -> Option<char> {
        let mut chars = self.source[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        let mut token = Token {
            pos: Pos::new(self.line, self.column),
            ..Token::default()
        };

        let ch = match self.bump() {
            None => {
                token.kind = TokenKind::Eot;
                return token;
            }
            Some(ch) => ch,
        };

        if ch == '\n' {
            token.kind = TokenKind::Eol;
            return token;
        }

        if ch == '\r' {
            if self.current() == Some('\n') {
                self.bump();
                token.kind = TokenKind::Eol;
                return token;
            }
            token.kind = TokenKind::Symbol;
            token.symbol = '\r';
            return token;
        }

        if ch.is_ascii_alphabetic() {
            return self.lex_identifier(token, ch);
        }

        let next = self.current();
        if ch.is_ascii_digit()
            || ch == '.'
            || (ch == '-' && matches!(next, Some(c) if c.is_ascii_digit() || c == '.'))
        {
            return self.lex_number(token, ch);
        }

        if ch == '"' {
            return self.lex_string(token);
        }

        if ch == ' ' || ch == '\t' {
            token.text.push(ch);
            while let Some(c @ (' ' | '\t')) = self.current() {
                token.text.push(c);
                self.bump();
            }
            token.kind = TokenKind::Divider;
            return token;
        }

        if ch == '&' {
            if let Some(radix_tag @ ('H' | 'O' | 'B')) = self.current() {
                return self.lex_radix_number(token, radix_tag);
            }
        }

        if ch == '\'' {
            // Apostrophe comment: consume the rest of the line
            // including the EOL itself.
            token.text.push(ch);
            while let Some(c) = self.current() {
                self.bump();
                if c == '\n' {
                    break;
                }
                if c != '\r' {
                    token.text.push(c);
                }
            }
            token.kind = TokenKind::EndComment;
            return token;
        }

        if matches!(ch, '+' | '-' | '*' | '/' | '\\' | '^' | '=' | '<' | '>') {
            token.text.push(ch);
            let pair = match (ch, self.current()) {
                ('<', Some(c @ ('=' | '>'))) => Some(c),
                ('>', Some(c @ ('=' | '<'))) => Some(c),
                ('=', Some(c @ ('<' | '>'))) => Some(c),
                _ => None,
            };
            if let Some(c) = pair {
                token.text.push(c);
                self.bump();
            }
            token.kind = TokenKind::Operation;
            return token;
        }

        token.kind = TokenKind::Symbol;
        token.symbol = ch;
        token.text.push(ch);
        token
    }

    fn lex_identifier(&mut self, mut token: Token, first: char) -> Token {
        token.text.push(first);
        while let Some(c) = self.current() {
            if c.is_ascii_alphanumeric() {
                token.text.push(c);
                self.bump();
            } else if matches!(c, '$' | '%' | '!') {
                token.text.push(c);
                self.bump();
                break;
            } else {
                break;
            }
        }

        token.kind = TokenKind::Identifier;
        token.keyword = Keyword::lookup(&token.text);
        if token.keyword != Keyword::None {
            token.kind = TokenKind::Keyword;
        }
        token
    }

    fn lex_number(&mut self, mut token: Token, first: char) -> Token {
        token.text.push(first);
        token.vtype = ValueType::Single; // by default
        let mut has_dot = first == '.';
        let mut has_exp = false;
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                token.text.push(c);
                self.bump();
            } else if c == '.' {
                if has_dot {
                    break;
                }
                token.text.push(c);
                self.bump();
                has_dot = true;
            } else if c == 'E' || c == 'e' {
                if has_exp {
                    break;
                }
                token.text.push('E');
                self.bump();
                has_exp = true;
                if let Some(sign @ ('-' | '+')) = self.current() {
                    token.text.push(sign);
                    self.bump();
                }
            } else if matches!(c, '%' | '!' | '#') {
                token.text.push(c);
                self.bump();
                if c == '%' {
                    token.vtype = ValueType::Integer;
                }
                // '!' keeps Single; '#' (reserved double) maps to Single.
                break;
            } else {
                break;
            }
        }

        token.kind = TokenKind::Number;
        token.dvalue = parse_number_value(&token.text);
        token.constval = true;
        token
    }

    fn lex_radix_number(&mut self, mut token: Token, radix_tag: char) -> Token {
        token.text.push('&');
        token.text.push(radix_tag);
        self.bump();
        while let Some(c) = self.current() {
            let in_range = match radix_tag {
                'H' => c.is_ascii_digit() || ('A'..='F').contains(&c),
                'O' => ('0'..='7').contains(&c),
                _ => c == '0' || c == '1',
            };
            if !in_range {
                break;
            }
            token.text.push(c);
            self.bump();
        }

        token.kind = TokenKind::Number;
        token.vtype = ValueType::Integer;
        token.dvalue = parse_number_value(&token.text);
        token.constval = true;
        token
    }

    fn lex_string(&mut self, mut token: Token) -> Token {
        token.text.push('"');
        loop {
            match self.current() {
                None | Some('\r') | Some('\n') => break, // incomplete string
                Some(c) => {
                    self.bump();
                    token.text.push(c);
                    if c == '"' {
                        break;
                    }
                    token.svalue.push(c);
                }
            }
        }

        token.kind = TokenKind::String;
        token.vtype = ValueType::String;
        token.constval = true;
        token
    }
}
