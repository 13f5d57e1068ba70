//! Shared harness: run Lox source through the full pipeline and capture
//! what `print` wrote alongside every reported diagnostic.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox::diagnostics::Diagnostics;
use rox::interpreter::Interpreter;

/// In-memory `print` sink that stays readable after the interpreter owns a
/// clone of it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Outcome {
    pub output: String,
    pub errors: Vec<String>,
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl Outcome {
    /// Printed lines, without trailing newlines.
    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().collect()
    }
}

/// Interpreter with a fixed clock writing into `buffer`.
pub fn interpreter(buffer: &SharedBuffer) -> Interpreter {
    Interpreter::new(Box::new(buffer.clone()), || 42.0)
}

/// Run a whole program with a fresh interpreter.
pub fn run(source: &str) -> Outcome {
    let buffer = SharedBuffer::default();
    let mut interpreter = interpreter(&buffer);
    let mut diagnostics = Diagnostics::new();

    rox::run(source, &mut interpreter, &mut diagnostics);

    Outcome {
        output: buffer.contents(),
        errors: diagnostics.messages(),
        had_error: diagnostics.had_error(),
        had_runtime_error: diagnostics.had_runtime_error(),
    }
}
