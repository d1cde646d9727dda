use crate::diagnostic::Span;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Let,
    Print,
    If,
    Else,
    True,
    False,
    While,
    For,

    // Literals and identifiers
    Ident(String),
    Number(f64),
    String(String),

    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,

    // Comparison operators
    Eq,
    NotEq,
    Less,
    Greater,

    // Logical operators
    And,
    Or,
    Bang,

    Assign,

    // Delimiters
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,

    Eof,
}

impl Token {
    pub fn is_same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn keyword_role(&self) -> Option<KeywordRole> {
        match self {
            Token::Let => Some(KeywordRole::Let),
            Token::Print => Some(KeywordRole::Print),
            Token::If => Some(KeywordRole::If),
            Token::Else => Some(KeywordRole::Else),
            Token::True => Some(KeywordRole::True),
            Token::False => Some(KeywordRole::False),
            Token::While => Some(KeywordRole::While),
            Token::For => Some(KeywordRole::For),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // spellings are configurable, so keywords are named by role
            Token::Let => write!(f, "{} keyword", KeywordRole::Let),
            Token::Print => write!(f, "{} keyword", KeywordRole::Print),
            Token::If => write!(f, "{} keyword", KeywordRole::If),
            Token::Else => write!(f, "{} keyword", KeywordRole::Else),
            Token::True => write!(f, "{} keyword", KeywordRole::True),
            Token::False => write!(f, "{} keyword", KeywordRole::False),
            Token::While => write!(f, "{} keyword", KeywordRole::While),
            Token::For => write!(f, "{} keyword", KeywordRole::For),
            Token::Ident(name) if name.is_empty() => write!(f, "identifier"),
            Token::Ident(name) => write!(f, "identifier `{}`", name),
            Token::Number(n) => write!(f, "number `{}`", n),
            Token::String(_) => write!(f, "string literal"),
            Token::Plus => write!(f, "`+`"),
            Token::Minus => write!(f, "`-`"),
            Token::Star => write!(f, "`*`"),
            Token::Slash => write!(f, "`/`"),
            Token::Eq => write!(f, "`==`"),
            Token::NotEq => write!(f, "`!=`"),
            Token::Less => write!(f, "`<`"),
            Token::Greater => write!(f, "`>`"),
            Token::And => write!(f, "`&&`"),
            Token::Or => write!(f, "`||`"),
            Token::Bang => write!(f, "`!`"),
            Token::Assign => write!(f, "`=`"),
            Token::Semicolon => write!(f, "`;`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBrace => write!(f, "`{{`"),
            Token::RBrace => write!(f, "`}}`"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// The eight keyword slots whose spelling the caller may choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordRole {
    Let,
    Print,
    If,
    Else,
    True,
    False,
    While,
    For,
}

impl KeywordRole {
    /// Insertion order of the keyword table; later roles win on clashes.
    pub const ALL: [KeywordRole; 8] = [
        KeywordRole::Let,
        KeywordRole::Print,
        KeywordRole::If,
        KeywordRole::Else,
        KeywordRole::True,
        KeywordRole::False,
        KeywordRole::While,
        KeywordRole::For,
    ];

    pub fn default_spelling(self) -> &'static str {
        match self {
            KeywordRole::Let => "let",
            KeywordRole::Print => "print",
            KeywordRole::If => "if",
            KeywordRole::Else => "else",
            KeywordRole::True => "true",
            KeywordRole::False => "false",
            KeywordRole::While => "while",
            KeywordRole::For => "for",
        }
    }

    /// Key of this role in a JSON keyword config, e.g. `letKeyword`.
    pub fn config_key(self) -> &'static str {
        match self {
            KeywordRole::Let => "letKeyword",
            KeywordRole::Print => "printKeyword",
            KeywordRole::If => "ifKeyword",
            KeywordRole::Else => "elseKeyword",
            KeywordRole::True => "trueKeyword",
            KeywordRole::False => "falseKeyword",
            KeywordRole::While => "whileKeyword",
            KeywordRole::For => "forKeyword",
        }
    }

    pub fn token(self) -> Token {
        match self {
            KeywordRole::Let => Token::Let,
            KeywordRole::Print => Token::Print,
            KeywordRole::If => Token::If,
            KeywordRole::Else => Token::Else,
            KeywordRole::True => Token::True,
            KeywordRole::False => Token::False,
            KeywordRole::While => Token::While,
            KeywordRole::For => Token::For,
        }
    }
}

impl fmt::Display for KeywordRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_spelling())
    }
}

impl FromStr for KeywordRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let role = lowered.strip_suffix("keyword").unwrap_or(&lowered);
        KeywordRole::ALL
            .into_iter()
            .find(|candidate| candidate.default_spelling() == role)
            .ok_or_else(|| {
                format!(
                    "Unknown keyword role: {}. Must be one of let, print, if, else, true, false, while, for",
                    s
                )
            })
    }
}
