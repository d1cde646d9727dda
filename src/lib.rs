pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod format;
pub mod interpreter;
pub mod lexer;
pub mod token;
pub mod value;

pub use ast::{Expr, ExprKind, Program, Stmt};
pub use config::{KeywordConfig, KeywordTable};
pub use interpreter::{parse_and_run, RunOutcome, ScriptError};
pub use lexer::tokenize;
pub use token::{KeywordRole, Token};
pub use value::Value;
