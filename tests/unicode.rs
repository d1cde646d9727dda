//! Identifiers and strings in non-Latin scripts

mod common;

use common::{output, run};
use kwscript::config::KeywordTable;
use kwscript::interpreter::ScriptError;
use kwscript::lexer::{tokenize, LexError};
use kwscript::{Token, Value};

#[test]
fn test_tamil_identifier_is_one_token() {
    let tokens = tokenize("கணக்கு", &KeywordTable::default()).unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].token, Token::Ident("கணக்கு".to_string()));
    assert_eq!(tokens[1].token, Token::Eof);
}

#[test]
fn test_devanagari_identifier_with_marks() {
    let tokens = tokenize("संख्या = 1", &KeywordTable::default()).unwrap();
    assert_eq!(tokens[0].token, Token::Ident("संख्या".to_string()));
    assert_eq!(tokens[1].token, Token::Assign);
}

#[test]
fn test_unicode_variables_define_and_lookup() {
    let run = run("let கணக்கு = 2; let число = 3; let 数 = கணக்கு * число; print(数);");
    assert_eq!(run.printed, vec!["6"]);
    assert_eq!(run.global("数"), Some(&Value::Number(6.0)));
    let names: Vec<&str> = run.outcome().globals.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["கணக்கு", "число", "数"]);
}

#[test]
fn test_unicode_string_literals_are_raw() {
    assert_eq!(output("print(\"வணக்கம் \" + \"🌍\");"), vec!["வணக்கம் 🌍"]);
    assert_eq!(output("print(\"a\\nb\");"), vec!["a\\nb"]);
}

#[test]
fn test_unicode_whitespace_is_skipped() {
    // U+00A0 no-break space and U+3000 ideographic space
    assert_eq!(output("let\u{00A0}x = 1;\u{3000}print(x);"), vec!["1"]);
}

#[test]
fn test_string_comparison_by_code_point() {
    assert_eq!(run("\"அ\" < \"ஆ\";").outcome().value, Value::Bool(true));
}

#[test]
fn test_symbol_is_not_an_identifier() {
    assert!(tokenize("let 🌍 = 1;", &KeywordTable::default()).is_err());
}

#[test]
fn test_enclosing_mark_continues_identifier() {
    // U+20DD COMBINING ENCLOSING CIRCLE
    let run = run("let x\u{20DD} = 5; print(x\u{20DD});");
    assert_eq!(run.printed, vec!["5"]);
    assert_eq!(run.global("x\u{20DD}"), Some(&Value::Number(5.0)));
}

#[test]
fn test_connector_punctuation_is_invalid_character() {
    // U+203F UNDERTIE is connector punctuation, not a letter, mark or number
    let run = run("let a\u{203F}b = 1;");
    assert!(matches!(
        run.error(),
        ScriptError::Lex(LexError::InvalidCharacter { ch: '\u{203F}', .. })
    ));
    assert!(run.printed.is_empty());
}

#[test]
fn test_letter_numbers_cannot_start_identifiers() {
    // U+216B ROMAN NUMERAL TWELVE
    assert!(tokenize("\u{216B}", &KeywordTable::default()).is_err());
    assert_eq!(output("let v\u{216B} = 12; print(v\u{216B});"), vec!["12"]);
}
