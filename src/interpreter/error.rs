use super::parser::ParseError;
use crate::diagnostic::{Diagnostic, Label, Span};
use crate::lexer::LexError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },
    #[error("Division by zero")]
    DivisionByZero { span: Span },
    #[error("Type error: {message}")]
    TypeError { message: String, span: Span },
}

impl RuntimeError {
    pub fn undefined_variable_at(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span,
        }
    }

    pub fn division_by_zero_at(span: Span) -> Self {
        Self::DivisionByZero { span }
    }

    pub fn type_error_at(message: impl Into<String>, span: Span) -> Self {
        Self::TypeError {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. } => *span,
            Self::DivisionByZero { span } => *span,
            Self::TypeError { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UndefinedVariable { name, span } => {
                Diagnostic::error(format!("undefined variable `{}`", name))
                    .with_code("E0201")
                    .with_label(Label::primary(*span, "not found in any enclosing scope"))
            }
            Self::TypeError { message, span } => Diagnostic::error(format!("type error: {}", message))
                .with_code("E0202")
                .with_label(Label::primary(*span, "")),
            Self::DivisionByZero { span } => Diagnostic::error("division by zero")
                .with_code("E0205")
                .with_label(Label::primary(*span, "divisor evaluates to 0")),
        }
    }
}

/// Failure of any pipeline stage; every stage stops at its first error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl ScriptError {
    pub fn span(&self) -> Span {
        match self {
            ScriptError::Lex(e) => e.span(),
            ScriptError::Parse(e) => e.span,
            ScriptError::Runtime(e) => e.span(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ScriptError::Lex(e) => e.to_diagnostic(),
            ScriptError::Parse(e) => e.to_diagnostic(),
            ScriptError::Runtime(e) => e.to_diagnostic(),
        }
    }
}
