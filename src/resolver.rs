//! Static scope resolution.
//!
//! Runs between parsing and execution.  It mirrors the runtime scope chain
//! with a stack of `name -> defined?` maps and, for every local reference,
//! hands the interpreter the number of scopes between the use and its
//! binding.  References that are not found in any local scope stay
//! unrecorded and are looked up in the globals at runtime.
//!
//! The same walk enforces the static rules of the language (redeclaration,
//! self-referencing initializers, misplaced `return` / `this` / `super`,
//! self-inheritance).  Violations go to the diagnostics accumulator and the
//! walk continues.

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::class::INITIALIZER;
use crate::diagnostics::Diagnostics;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;

/// Kind of function body being resolved; governs `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// Kind of class body being resolved; governs `this` and `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Records hop counts into an [`Interpreter`] and static errors into a
/// [`Diagnostics`].
pub struct Resolver<'r> {
    interpreter: &'r mut Interpreter,
    diagnostics: &'r mut Diagnostics,
    /// `false` while a name's initializer is being resolved.
    scopes: Vec<HashMap<String, bool>>,
    function_kind: FunctionType,
    class_kind: ClassType,
}

impl<'r> Resolver<'r> {
    pub fn new(interpreter: &'r mut Interpreter, diagnostics: &'r mut Diagnostics) -> Self {
        debug!("Resolver created");

        Resolver {
            interpreter,
            diagnostics,
            scopes: Vec::new(),
            function_kind: FunctionType::None,
            class_kind: ClassType::None,
        }
    }

    /// Resolve a program (or one REPL line).
    pub fn resolve(&mut self, statements: &[Stmt]) {
        info!("Resolving {} statement(s)", statements.len());

        self.resolve_all(statements);
    }

    fn resolve_all(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.push_scope();
                self.resolve_all(statements);
                self.pop_scope();
            }

            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // Defined eagerly so the body can recurse.
                self.declare(&declaration.name);
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function);
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(otherwise) = else_branch.as_deref() {
                    self.resolve_stmt(otherwise);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.function_kind == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }

                if let Some(expr) = value {
                    if self.function_kind == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(expr);
                }
            }
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[std::rc::Rc<FunctionDecl>],
    ) {
        let enclosing_class = self.class_kind;
        self.class_kind = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = superclass
            {
                if super_name.lexeme == name.lexeme {
                    self.error(super_name, "A class can't inherit from itself.");
                }
            }

            self.class_kind = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.push_scope();
            self.define_synthetic("super");
        }

        self.push_scope();
        self.define_synthetic("this");

        for method in methods {
            let kind = if method.name.lexeme == INITIALIZER {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        self.pop_scope();

        if superclass.is_some() {
            self.pop_scope();
        }

        self.class_kind = enclosing_class;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                let in_own_initializer: bool = self
                    .scopes
                    .last()
                    .is_some_and(|scope| scope.get(&name.lexeme) == Some(&false));

                if in_own_initializer {
                    self.error(name, "Can't read local variable in its own initializer.");
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            Expr::This { id, keyword } => {
                if self.class_kind == ClassType::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                    return;
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => {
                match self.class_kind {
                    ClassType::None => {
                        self.error(keyword, "Can't use 'super' outside of a class.")
                    }
                    ClassType::Class => {
                        self.error(keyword, "Can't use 'super' in a class with no superclass.")
                    }
                    ClassType::Subclass => {}
                }

                self.resolve_local(*id, keyword);
            }
        }
    }

    /// Parameters and body share one scope, matching `LoxFunction::call`.
    fn resolve_function(&mut self, declaration: &FunctionDecl, kind: FunctionType) {
        let enclosing = self.function_kind;
        self.function_kind = kind;

        self.push_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_all(&declaration.body);
        self.pop_scope();

        self.function_kind = enclosing;
    }

    #[inline]
    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Globals are exempt from the redeclaration check.
    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        let duplicate = scope.contains_key(&name.lexeme);
        scope.insert(name.lexeme.clone(), false);

        if duplicate {
            self.error(name, "Already a variable with this name in this scope.");
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    /// Bind an implicit name (`this`, `super`) in the innermost scope.
    fn define_synthetic(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.diagnostics.report(LoxError::resolve_at(token, message));
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                debug!("'{}' is local, {} scope(s) out", name.lexeme, depth);
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        debug!("'{}' left to the globals", name.lexeme);
    }
}
