use crate::config::KeywordTable;
use crate::diagnostic::{Diagnostic, Label, Span};
use crate::token::{SpannedToken, Token};
use chumsky::prelude::*;
use thiserror::Error;
use unicode_general_category::{get_general_category, GeneralCategory};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Invalid character: {ch}")]
    InvalidCharacter { ch: char, span: Span },
    #[error("Unterminated string")]
    UnterminatedString { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidCharacter { span, .. } | LexError::UnterminatedString { span } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LexError::InvalidCharacter { ch, span } => {
                Diagnostic::error(format!("invalid character `{}`", ch.escape_debug()))
                    .with_code("E0001")
                    .with_label(Label::primary(*span, "not part of the language"))
            }
            LexError::UnterminatedString { span } => Diagnostic::error("unterminated string")
                .with_code("E0002")
                .with_label(Label::primary(*span, "string starts here"))
                .with_help("add a closing `\"`"),
        }
    }
}

/// Identifiers start with a letter (`L*`), a mark (`M*`), or `_`.
pub fn is_ident_start(c: char) -> bool {
    if c.is_ascii() {
        return c == '_' || c.is_ascii_alphabetic();
    }
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::NonspacingMark
            | GeneralCategory::SpacingMark
            | GeneralCategory::EnclosingMark
    )
}

/// Identifiers continue with letters, numbers (`N*`), marks, or `_`.
pub fn is_ident_continue(c: char) -> bool {
    if c.is_ascii() {
        return c == '_' || c.is_ascii_alphanumeric();
    }
    is_ident_start(c)
        || matches!(
            get_general_category(c),
            GeneralCategory::DecimalNumber
                | GeneralCategory::LetterNumber
                | GeneralCategory::OtherNumber
        )
}

/// Raw scanner output. Bad input is captured rather than failing the scan so
/// the first problem can be reported at its exact position.
#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Token(Token),
    UnterminatedString,
    Unknown(char),
}

fn lexer<'a>(
    keywords: KeywordTable,
) -> impl Parser<'a, &'a str, Vec<(Lexeme, SimpleSpan)>, extra::Err<Simple<'a, char>>> {
    let number = text::digits(10)
        .then(just('.').then(text::digits(10).or_not()).or_not())
        .to_slice()
        .map(|s: &str| Token::Number(s.parse().unwrap_or_default()));

    let string = just('"')
        .ignore_then(none_of("\"").repeated().to_slice())
        .then_ignore(just('"'))
        .map(|s: &str| Token::String(s.to_string()));

    let ident = any()
        .filter(|c: &char| is_ident_start(*c))
        .then(any().filter(|c: &char| is_ident_continue(*c)).repeated())
        .to_slice()
        .map(move |s: &str| keywords.lookup(s).unwrap_or_else(|| Token::Ident(s.to_string())));

    let op_double = choice((
        just("==").to(Token::Eq),
        just("!=").to(Token::NotEq),
        just("&&").to(Token::And),
        just("||").to(Token::Or),
    ));

    let op_single = choice((
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
        just('=').to(Token::Assign),
        just('<').to(Token::Less),
        just('>').to(Token::Greater),
        just(';').to(Token::Semicolon),
        just('!').to(Token::Bang),
    ));

    let token = choice((number, string, ident, op_double, op_single)).map(Lexeme::Token);

    let unterminated = just('"')
        .then(any().repeated())
        .to(Lexeme::UnterminatedString);

    let unknown = any().map(Lexeme::Unknown);

    let line_comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();
    let trivia = line_comment
        .or(any().filter(|c: &char| c.is_whitespace()).ignored())
        .repeated();

    let lexeme = choice((token, unterminated, unknown))
        .map_with(|lexeme, e| (lexeme, e.span()))
        .then_ignore(trivia.clone());

    trivia
        .ignore_then(lexeme.repeated().collect())
        .then_ignore(end())
}

/// Scans `source` into tokens terminated by [`Token::Eof`].
pub fn tokenize(source: &str, keywords: &KeywordTable) -> Result<Vec<SpannedToken>, LexError> {
    let lexemes = lexer(keywords.clone())
        .parse(source)
        .into_result()
        .map_err(|errors| {
            // The scanner accepts any input; a failure here means a bug in the grammar.
            let start = errors.first().map(|e| e.span().start).unwrap_or_default();
            let ch = source.get(start..).and_then(|rest| rest.chars().next()).unwrap_or('\0');
            LexError::InvalidCharacter {
                ch,
                span: Span::new(start, start + ch.len_utf8()),
            }
        })?;

    let mut tokens = Vec::with_capacity(lexemes.len() + 1);
    for (lexeme, span) in lexemes {
        let span = Span::from(span);
        match lexeme {
            Lexeme::Token(token) => tokens.push(SpannedToken { token, span }),
            Lexeme::UnterminatedString => {
                return Err(LexError::UnterminatedString {
                    span: Span::new(span.start, span.start + 1),
                })
            }
            Lexeme::Unknown(ch) => return Err(LexError::InvalidCharacter { ch, span }),
        }
    }

    tokens.push(SpannedToken {
        token: Token::Eof,
        span: Span::new(source.len(), source.len()),
    });

    tracing::debug!(count = tokens.len(), "lexed source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordConfig;
    use crate::token::KeywordRole;

    fn lex(source: &str) -> Vec<Token> {
        lex_with(source, &KeywordTable::default())
    }

    fn lex_with(source: &str, keywords: &KeywordTable) -> Vec<Token> {
        let mut tokens: Vec<Token> = tokenize(source, keywords)
            .expect("Lexer failed")
            .into_iter()
            .map(|st| st.token)
            .collect();
        assert_eq!(tokens.pop(), Some(Token::Eof));
        tokens
    }

    fn ident(name: &str) -> Token {
        Token::Ident(name.to_string())
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            lex("let print if else true false while for"),
            vec![
                Token::Let,
                Token::Print,
                Token::If,
                Token::Else,
                Token::True,
                Token::False,
                Token::While,
                Token::For
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(lex("letter iffy"), vec![ident("letter"), ident("iffy")]);
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(lex("foo"), vec![ident("foo")]);
        assert_eq!(lex("bar123"), vec![ident("bar123")]);
        assert_eq!(lex("_test"), vec![ident("_test")]);
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(lex("变量"), vec![ident("变量")]);
        assert_eq!(lex("日本語"), vec![ident("日本語")]);
        assert_eq!(lex("தமிழ்"), vec![ident("தமிழ்")]);
        assert_eq!(lex("மென்பொருள் = 1"), vec![ident("மென்பொருள்"), Token::Assign, Token::Number(1.0)]);
    }

    #[test]
    fn test_combining_marks_in_identifiers() {
        // U+20DD COMBINING ENCLOSING CIRCLE is an enclosing mark
        assert_eq!(lex("x\u{20DD}"), vec![ident("x\u{20DD}")]);
        assert_eq!(lex("\u{0301}a"), vec![ident("\u{0301}a")]);
    }

    #[test]
    fn test_number_categories_only_continue_identifiers() {
        assert_eq!(lex("x\u{216B}"), vec![ident("x\u{216B}")]);
        assert_eq!(lex("n\u{0663}"), vec![ident("n\u{0663}")]);
        let err = tokenize("\u{216B}", &KeywordTable::default()).unwrap_err();
        assert!(matches!(err, LexError::InvalidCharacter { ch: '\u{216B}', .. }));
    }

    #[test]
    fn test_connector_punctuation_is_invalid() {
        for (source, bad) in [("a\u{203F}b", '\u{203F}'), ("a\u{FF3F}b", '\u{FF3F}'), ("a\u{00B7}b", '\u{00B7}')] {
            let err = tokenize(source, &KeywordTable::default()).unwrap_err();
            assert_eq!(err, LexError::InvalidCharacter { ch: bad, span: Span::new(1, 1 + bad.len_utf8()) });
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("42"), vec![Token::Number(42.0)]);
        assert_eq!(lex("0"), vec![Token::Number(0.0)]);
        assert_eq!(lex("2.5"), vec![Token::Number(2.5)]);
        assert_eq!(lex("007"), vec![Token::Number(7.0)]);
        assert_eq!(lex("1."), vec![Token::Number(1.0)]);
    }

    #[test]
    fn test_number_then_identifier() {
        assert_eq!(lex("2x"), vec![Token::Number(2.0), ident("x")]);
    }

    #[test]
    fn test_strings_are_raw() {
        assert_eq!(lex(r#""hello""#), vec![Token::String("hello".to_string())]);
        assert_eq!(lex(r#""""#), vec![Token::String(String::new())]);
        assert_eq!(lex(r#""a\nb""#), vec![Token::String("a\\nb".to_string())]);
        assert_eq!(lex("\"two\nlines\""), vec![Token::String("two\nlines".to_string())]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex("+ - * / ( ) { } = < > ; !"),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::LParen,
                Token::RParen,
                Token::LBrace,
                Token::RBrace,
                Token::Assign,
                Token::Less,
                Token::Greater,
                Token::Semicolon,
                Token::Bang
            ]
        );
    }

    #[test]
    fn test_double_operators_win_over_single() {
        assert_eq!(
            lex("== != && || !x =y"),
            vec![
                Token::Eq,
                Token::NotEq,
                Token::And,
                Token::Or,
                Token::Bang,
                ident("x"),
                Token::Assign,
                ident("y")
            ]
        );
    }

    #[test]
    fn test_whitespace_and_comments() {
        assert_eq!(
            lex("  let\n\tx // trailing comment\n// whole line\n= 1\u{3000}"),
            vec![Token::Let, ident("x"), Token::Assign, Token::Number(1.0)]
        );
        assert_eq!(lex("   "), vec![]);
        assert_eq!(lex("// only a comment"), vec![]);
    }

    #[test]
    fn test_single_slash_is_division() {
        assert_eq!(
            lex("a / b"),
            vec![ident("a"), Token::Slash, ident("b")]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("let 变量 = 1;", &KeywordTable::default()).unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[1].span, Span::new(4, 10));
        assert_eq!(tokens.last().unwrap().span, Span::new(15, 15));
    }

    #[test]
    fn test_invalid_character() {
        let err = tokenize("let x = 1 @ 2;", &KeywordTable::default()).unwrap_err();
        assert_eq!(err, LexError::InvalidCharacter { ch: '@', span: Span::new(10, 11) });
        assert_eq!(err.to_string(), "Invalid character: @");
    }

    #[test]
    fn test_lone_ampersand_is_invalid() {
        let err = tokenize("a & b", &KeywordTable::default()).unwrap_err();
        assert_eq!(err, LexError::InvalidCharacter { ch: '&', span: Span::new(2, 3) });
    }

    #[test]
    fn test_first_error_wins() {
        let err = tokenize("# \"open", &KeywordTable::default()).unwrap_err();
        assert!(matches!(err, LexError::InvalidCharacter { ch: '#', .. }));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("print(\"oops);", &KeywordTable::default()).unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { span: Span::new(6, 7) });
    }

    #[test]
    fn test_remapped_keywords() {
        let config = KeywordConfig::default()
            .with(KeywordRole::Let, "var")
            .with(KeywordRole::Print, "affiche");
        let table = KeywordTable::new(&config);
        assert_eq!(
            lex_with("var let affiche print", &table),
            vec![Token::Let, ident("let"), Token::Print, ident("print")]
        );
    }

    #[test]
    fn test_non_latin_keyword_spelling() {
        let table = KeywordTable::new(&KeywordConfig::default().with(KeywordRole::Print, "அச்சிடு"));
        assert_eq!(lex_with("அச்சிடு", &table), vec![Token::Print]);
    }
}
