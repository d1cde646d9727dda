#![allow(dead_code)]

use kwscript::interpreter::{parse_and_run, RunOutcome, ScriptError};
use kwscript::{KeywordConfig, Value};

/// Everything observable from one run: printed lines plus the outcome.
pub struct Run {
    pub printed: Vec<String>,
    pub result: Result<RunOutcome, ScriptError>,
}

impl Run {
    pub fn outcome(&self) -> &RunOutcome {
        match &self.result {
            Ok(outcome) => outcome,
            Err(e) => panic!("program failed: {}", e),
        }
    }

    pub fn error(&self) -> &ScriptError {
        match &self.result {
            Ok(_) => panic!("program succeeded, printed {:?}", self.printed),
            Err(e) => e,
        }
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.outcome().globals.get(name)
    }
}

pub fn run_with(source: &str, keywords: &KeywordConfig) -> Run {
    let mut printed = Vec::new();
    let result = parse_and_run(source, keywords, |value: &Value| {
        printed.push(value.to_string())
    });
    Run { printed, result }
}

pub fn run(source: &str) -> Run {
    run_with(source, &KeywordConfig::default())
}

/// Runs `source` and returns its printed lines, panicking on any error.
pub fn output(source: &str) -> Vec<String> {
    let run = run(source);
    run.outcome();
    run.printed
}
