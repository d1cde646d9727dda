use super::environment::{Environment, Scope};
use super::error::{RuntimeError, ScriptError};
use super::parser::TokenParser;
use crate::ast::{
    BinaryOp, Block, ElseBranch, Expr, ExprKind, ForInit, IfStmt, LetStmt, Program, Stmt, UnaryOp,
};
use crate::config::{KeywordConfig, KeywordTable};
use crate::diagnostic::{Diagnostic, Span};
use crate::lexer::tokenize;
use crate::value::Value;
use std::cmp::Ordering;
use std::rc::Rc;

/// Receives every value passed to `print`, in execution order.
pub trait PrintSink {
    fn print(&mut self, value: &Value);
}

impl<F: FnMut(&Value)> PrintSink for F {
    fn print(&mut self, value: &Value) {
        self(value)
    }
}

pub struct Interpreter<S: PrintSink> {
    env: Environment,
    sink: S,
}

impl<S: PrintSink> Interpreter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            env: Environment::new(),
            sink,
        }
    }

    /// Executes every statement against the global scope and returns the
    /// value of the last one (`null` for an empty program).
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let mut last_val = Value::Null;
        for stmt in &program.statements {
            last_val = self.execute_statement(stmt)?;
        }
        tracing::debug!(globals = self.env.globals().len(), "program finished");
        Ok(last_val)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn into_globals(self) -> Scope {
        self.env.into_globals()
    }

    fn execute_statement(&mut self, statement: &Stmt) -> Result<Value, RuntimeError> {
        tracing::trace!(depth = self.env.scope_depth(), "executing statement");
        match statement {
            Stmt::Let(stmt) => self.execute_let(stmt),
            Stmt::Print(expr) => {
                let val = self.evaluate(expr)?;
                self.sink.print(&val);
                Ok(Value::Null)
            }
            Stmt::Block(block) => self.execute_block(block),
            Stmt::If(stmt) => self.execute_if(stmt),
            Stmt::While { condition, body } => {
                let mut result = Value::Null;
                while self.evaluate(condition)?.is_truthy() {
                    result = self.execute_block(body)?;
                }
                Ok(result)
            }
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => self.in_scope(|this| {
                match initializer {
                    Some(ForInit::Let(stmt)) => {
                        this.execute_let(stmt)?;
                    }
                    Some(ForInit::Expr(expr)) => {
                        this.evaluate(expr)?;
                    }
                    None => {}
                }

                let mut result = Value::Null;
                loop {
                    if let Some(condition) = condition {
                        if !this.evaluate(condition)?.is_truthy() {
                            break;
                        }
                    }
                    result = this.execute_block(body)?;
                    if let Some(increment) = increment {
                        this.evaluate(increment)?;
                    }
                }
                Ok(result)
            }),
            Stmt::Expr(expr) => self.evaluate(expr),
        }
    }

    fn execute_let(&mut self, stmt: &LetStmt) -> Result<Value, RuntimeError> {
        let val = self.evaluate(&stmt.value)?;
        self.env.define(&stmt.name, val.clone());
        Ok(val)
    }

    fn execute_block(&mut self, block: &Block) -> Result<Value, RuntimeError> {
        self.in_scope(|this| {
            let mut result = Value::Null;
            for stmt in &block.statements {
                result = this.execute_statement(stmt)?;
            }
            Ok(result)
        })
    }

    fn execute_if(&mut self, stmt: &IfStmt) -> Result<Value, RuntimeError> {
        if self.evaluate(&stmt.condition)?.is_truthy() {
            return self.execute_block(&stmt.consequence);
        }
        match stmt.alternative.as_deref() {
            Some(ElseBranch::Block(block)) => self.execute_block(block),
            Some(ElseBranch::If(nested)) => self.execute_if(nested),
            None => Ok(Value::Null),
        }
    }

    /// Runs `f` in a fresh child scope, popping it whether or not `f` fails.
    fn in_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        self.env.push_scope();
        let result = f(self);
        self.env.pop_scope();
        result
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::String(s) => Ok(Value::String(Rc::clone(s))),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Identifier(name) => self
                .env
                .lookup(name)
                .cloned()
                .ok_or_else(|| RuntimeError::undefined_variable_at(name.as_ref(), expr.span)),
            ExprKind::Assignment { name, value } => {
                let val = self.evaluate(value)?;
                if self.env.assign(name, val.clone()) {
                    Ok(val)
                } else {
                    Err(RuntimeError::undefined_variable_at(name.as_ref(), expr.span))
                }
            }
            ExprKind::Binary {
                left,
                op: BinaryOp::And,
                right,
            } => {
                if !self.evaluate(left)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.evaluate(right)?.is_truthy()))
            }
            ExprKind::Binary {
                left,
                op: BinaryOp::Or,
                right,
            } => {
                if self.evaluate(left)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.evaluate(right)?.is_truthy()))
            }
            ExprKind::Binary { left, op, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                apply_binary(*op, left_val, right_val, expr.span, right.span)
            }
            ExprKind::Unary { op, operand } => {
                let val = self.evaluate(operand)?;
                apply_unary(*op, val, expr.span)
            }
        }
    }
}

fn operand_error(op: BinaryOp, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::type_error_at(
        format!(
            "cannot apply `{}` to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ),
        span,
    )
}

fn apply_binary(
    op: BinaryOp,
    left: Value,
    right: Value,
    span: Span,
    divisor_span: Span,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => match (&left, &right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(Rc::from(format!("{}{}", left, right))))
            }
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            _ => Err(operand_error(op, &left, &right, span)),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            let (Value::Number(a), Value::Number(b)) = (&left, &right) else {
                return Err(operand_error(op, &left, &right, span));
            };
            let result = match op {
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                _ => {
                    if *b == 0.0 {
                        return Err(RuntimeError::division_by_zero_at(divisor_span));
                    }
                    a / b
                }
            };
            Ok(Value::Number(result))
        }
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => Ok(Value::Bool(left != right)),
        BinaryOp::Less | BinaryOp::Greater => {
            let ordering = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => return Err(operand_error(op, &left, &right, span)),
            };
            let wanted = if op == BinaryOp::Less {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            Ok(Value::Bool(ordering == Some(wanted)))
        }
        // Both operands already evaluated; same result as the short-circuit path.
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

fn apply_unary(op: UnaryOp, operand: Value, span: Span) -> Result<Value, RuntimeError> {
    match (op, &operand) {
        (UnaryOp::Not, _) => Ok(Value::Bool(!operand.is_truthy())),
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Plus, Value::Number(n)) => Ok(Value::Number(*n)),
        _ => Err(RuntimeError::type_error_at(
            format!("cannot apply unary `{}` to {}", op, operand.type_name()),
            span,
        )),
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Value of the last top-level statement.
    pub value: Value,
    /// Final contents of the global scope, in definition order.
    pub globals: Scope,
}

/// Lexes, parses and executes `source`, sending printed values to `sink`.
pub fn parse_and_run<S: PrintSink>(
    source: &str,
    keywords: &KeywordConfig,
    sink: S,
) -> Result<RunOutcome, ScriptError> {
    parse_and_run_with_table(source, &KeywordTable::new(keywords), sink)
}

/// Like [`parse_and_run`], for callers that already built the keyword table.
pub fn parse_and_run_with_table<S: PrintSink>(
    source: &str,
    table: &KeywordTable,
    sink: S,
) -> Result<RunOutcome, ScriptError> {
    let tokens = tokenize(source, table)?;
    let program = TokenParser::new(tokens).parse()?;

    let mut interpreter = Interpreter::new(sink);
    let value = interpreter.run(&program)?;
    Ok(RunOutcome {
        value,
        globals: interpreter.into_globals(),
    })
}

pub fn parse_and_run_with_diagnostics<S: PrintSink>(
    source: &str,
    table: &KeywordTable,
    sink: S,
) -> Result<RunOutcome, Vec<Diagnostic>> {
    parse_and_run_with_table(source, table, sink).map_err(|e| vec![e.to_diagnostic()])
}
