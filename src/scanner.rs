//! Module `scanner` turns Lox source text into [`Token`]s.
//!
//! The [`Scanner`] is a streaming, fused iterator: each call to `next` skips
//! any whitespace and comments, then yields either one token or one lexical
//! error.  Errors never end the stream, so every fault in a file is
//! surfaced in a single pass, and the stream always closes with exactly one
//! `EOF` token.
//!
//! # Public API
//!
//! - `Scanner::new(src)` borrows the source for the lifetime of the scan.
//! - `impl Iterator<Item = Result<Token>>` for incremental consumers (the
//!   `tokenize` command prints tokens and errors as they come).
//! - `scan_tokens(src, &mut Diagnostics)` collects the whole stream and files
//!   every error with the accumulator, which is what the pipeline uses.
//!
//! # Lexical grammar
//!
//! | Class          | Accepted input                                           |
//! |----------------|----------------------------------------------------------|
//! | punctuation    | `( ) { } , . - + ; *` and `/` when not a comment         |
//! | operators      | `!` `!=` `=` `==` `<` `<=` `>` `>=` (one byte lookahead)   |
//! | comments       | `//` to end of line, skipped with `memchr`               |
//! | strings        | `"..."`, no escapes, may span lines                      |
//! | numbers        | `123`, `3.14`; a dot needs a digit after it (`123.foo`)  |
//! | words          | `[A-Za-z_][A-Za-z0-9_]*`, keywords via a `phf` table     |
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("print 123; // example");
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use std::iter::FusedIterator;

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::diagnostics::Diagnostics;
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

/// Reserved words, resolved at compile time.
static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

/// Tokens that are always exactly one byte long.
fn punctuation(byte: u8) -> Option<TokenType> {
    let tt = match byte {
        b'(' => TokenType::LEFT_PAREN,
        b')' => TokenType::RIGHT_PAREN,
        b'{' => TokenType::LEFT_BRACE,
        b'}' => TokenType::RIGHT_BRACE,
        b',' => TokenType::COMMA,
        b'.' => TokenType::DOT,
        b'-' => TokenType::MINUS,
        b'+' => TokenType::PLUS,
        b';' => TokenType::SEMICOLON,
        b'*' => TokenType::STAR,
        _ => return None,
    };

    Some(tt)
}

#[inline]
fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Streaming lexer over a borrowed source string.
pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    start: usize, // first byte of the lexeme in progress
    pos: usize,   // next unread byte
    line: usize,
    finished: bool, // EOF already handed out
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            pos: 0,
            line: 1,
            finished: false,
        }
    }

    // ───────────────────────────── cursor ──────────────────────────────────

    #[inline(always)]
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Consume and return the next byte.  Only called when not at the end.
    #[inline(always)]
    fn bump(&mut self) -> u8 {
        let byte = self.bytes[self.pos];
        self.pos += 1;
        byte
    }

    /// The byte `offset` places ahead of the cursor, or `0` past the end.
    #[inline(always)]
    fn look(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn eat(&mut self, expected: u8) -> bool {
        let hit = self.look(0) == expected && !self.at_end();
        if hit {
            self.pos += 1;
        }
        hit
    }

    /// `double` if an `=` follows, otherwise `single`.
    #[inline(always)]
    fn either(&mut self, single: TokenType, double: TokenType) -> TokenType {
        if self.eat(b'=') {
            double
        } else {
            single
        }
    }

    fn lexeme(&self) -> &'a str {
        &self.src[self.start..self.pos]
    }

    // ───────────────────────────── lexing ──────────────────────────────────

    /// Lex whatever starts at `self.start`.  `Ok(None)` means the input was
    /// trivia (whitespace or a comment) and produced no token.
    fn lex_one(&mut self) -> Result<Option<TokenType>> {
        let byte = self.bump();

        if let Some(tt) = punctuation(byte) {
            return Ok(Some(tt));
        }

        let tt = match byte {
            b'!' => self.either(TokenType::BANG, TokenType::BANG_EQUAL),
            b'=' => self.either(TokenType::EQUAL, TokenType::EQUAL_EQUAL),
            b'<' => self.either(TokenType::LESS, TokenType::LESS_EQUAL),
            b'>' => self.either(TokenType::GREATER, TokenType::GREATER_EQUAL),

            b'/' if self.eat(b'/') => {
                self.skip_comment();
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),
            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.word(),

            _ => return Err(self.unexpected()),
        };

        Ok(Some(tt))
    }

    /// Jump to the end of the line.  The newline stays unread so the line
    /// counter still sees it.
    fn skip_comment(&mut self) {
        self.pos = match memchr(b'\n', &self.bytes[self.pos..]) {
            Some(offset) => self.pos + offset,
            None => self.bytes.len(),
        };
    }

    /// Report the character at `self.start`.  The whole UTF-8 scalar is
    /// consumed so multi-byte input yields a single error.
    fn unexpected(&mut self) -> LoxError {
        let c: char = self.src[self.start..]
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.pos = self.start + c.len_utf8();

        LoxError::lex(self.line, format!("Unexpected character: {}", c))
    }

    /// Body of a string literal; the opening quote is already consumed.
    fn string(&mut self) -> Result<TokenType> {
        let closing = memchr(b'"', &self.bytes[self.pos..]);

        let end = match closing {
            Some(offset) => self.pos + offset,
            None => self.bytes.len(),
        };

        self.line += memchr::memchr_iter(b'\n', &self.bytes[self.pos..end]).count();
        self.pos = end;

        if closing.is_none() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.pos += 1; // closing quote

        let contents = &self.src[self.start + 1..self.pos - 1];
        Ok(TokenType::STRING(contents.to_owned()))
    }

    fn number(&mut self) -> TokenType {
        self.skip_digits();

        if self.look(0) == b'.' && self.look(1).is_ascii_digit() {
            self.pos += 1;
            self.skip_digits();
        }

        // The lexeme is ASCII digits with at most one interior dot.
        let value: f64 = self.lexeme().parse().unwrap_or(0.0);
        TokenType::NUMBER(value)
    }

    fn skip_digits(&mut self) {
        while self.look(0).is_ascii_digit() {
            self.pos += 1;
        }
    }

    fn word(&mut self) -> TokenType {
        while is_word_byte(self.look(0)) {
            self.pos += 1;
        }

        KEYWORDS
            .get(self.lexeme())
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.at_end() {
                self.finished = true;
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            self.start = self.pos;

            match self.lex_one() {
                Ok(Some(tt)) => {
                    debug!("Scanned token ({:?}) on line {}", tt, self.line);
                    return Some(Ok(Token::new(tt, self.lexeme(), self.line)));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan `source` to completion.  Lexical errors are reported into
/// `diagnostics`; the returned stream always ends with one `EOF` token.
pub fn scan_tokens(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => diagnostics.report(e),
        }
    }

    info!("Scanned {} token(s)", tokens.len());

    tokens
}
