pub mod parser;
pub mod environment;
pub mod error;
pub mod evaluator;

pub use error::{RuntimeError, ScriptError};
pub use environment::{Environment, Scope};
pub use parser::{TokenParser, ParseError};
pub use evaluator::{
    Interpreter, PrintSink, RunOutcome, parse_and_run, parse_and_run_with_diagnostics,
    parse_and_run_with_table,
};
