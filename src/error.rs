//! Error type shared by every phase of the interpreter.
//!
//! Each variant's `Display` is exactly the text the driver prints to
//! stderr, so callers never format diagnostics themselves.  Static errors
//! (`Lex`, `Parse`, `Resolve`) are collected by
//! [`crate::diagnostics::Diagnostics`]; a `Runtime` error ends the run.

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Everything that can go wrong between reading a file and running it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Malformed input the scanner could not turn into a token.
    #[error("[line {line}] Error: {message}")]
    Lex { message: String, line: usize },

    /// Grammar violation found by the parser.
    ///
    /// `location` is either ` at end` or ` at '<lexeme>'`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Scope rule violation found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Fault raised while executing; `line` is that of the offending token.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Reading source or writing `print` output failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Source file is not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Lex error on line {}: {}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**, anchored at `token`.
    pub fn parse_at<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Parse error: line={}, lexeme={}, msg={}",
            token.line, token.lexeme, message
        );

        LoxError::Parse {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**, anchored at `token`.
    pub fn resolve_at<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Resolve error: line={}, lexeme={}, msg={}",
            token.line, token.lexeme, message
        );

        LoxError::Resolve {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**; the token supplies the line.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }
}

fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

pub type Result<T> = std::result::Result<T, LoxError>;
