use crate::lexer::{is_ident_continue, is_ident_start};
use crate::token::{KeywordRole, Token};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Caller-chosen keyword spellings. Unset or blank roles use the English word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct KeywordConfig {
    pub let_keyword: Option<String>,
    pub print_keyword: Option<String>,
    pub if_keyword: Option<String>,
    pub else_keyword: Option<String>,
    pub true_keyword: Option<String>,
    pub false_keyword: Option<String>,
    pub while_keyword: Option<String>,
    pub for_keyword: Option<String>,
}

impl KeywordConfig {
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid keyword config: {}", e))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_json_str(&json)
    }

    pub fn with(mut self, role: KeywordRole, spelling: impl Into<String>) -> Self {
        self.set(role, spelling);
        self
    }

    pub fn set(&mut self, role: KeywordRole, spelling: impl Into<String>) {
        *self.slot_mut(role) = Some(spelling.into());
    }

    /// Parses a `role=spelling` override, e.g. `let=var`.
    pub fn apply_override(&mut self, assignment: &str) -> Result<(), String> {
        let (role, spelling) = assignment
            .split_once('=')
            .ok_or_else(|| format!("Expected ROLE=SPELLING, got `{}`", assignment))?;
        let role: KeywordRole = role.parse()?;
        self.set(role, spelling.trim());
        Ok(())
    }

    pub fn spelling(&self, role: KeywordRole) -> &str {
        let configured = match role {
            KeywordRole::Let => &self.let_keyword,
            KeywordRole::Print => &self.print_keyword,
            KeywordRole::If => &self.if_keyword,
            KeywordRole::Else => &self.else_keyword,
            KeywordRole::True => &self.true_keyword,
            KeywordRole::False => &self.false_keyword,
            KeywordRole::While => &self.while_keyword,
            KeywordRole::For => &self.for_keyword,
        };
        match configured.as_deref() {
            Some(spelling) if !spelling.trim().is_empty() => spelling,
            _ => role.default_spelling(),
        }
    }

    fn slot_mut(&mut self, role: KeywordRole) -> &mut Option<String> {
        match role {
            KeywordRole::Let => &mut self.let_keyword,
            KeywordRole::Print => &mut self.print_keyword,
            KeywordRole::If => &mut self.if_keyword,
            KeywordRole::Else => &mut self.else_keyword,
            KeywordRole::True => &mut self.true_keyword,
            KeywordRole::False => &mut self.false_keyword,
            KeywordRole::While => &mut self.while_keyword,
            KeywordRole::For => &mut self.for_keyword,
        }
    }
}

/// Spelling -> keyword token lookup used by the lexer.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: HashMap<String, Token>,
    unreachable: Vec<(KeywordRole, String)>,
}

impl KeywordTable {
    pub fn new(config: &KeywordConfig) -> Self {
        let mut entries = HashMap::with_capacity(KeywordRole::ALL.len());
        let mut unreachable = Vec::new();

        for role in KeywordRole::ALL {
            let spelling = config.spelling(role);
            if !is_identifier_spelling(spelling) {
                tracing::warn!(%role, spelling, "keyword spelling is not an identifier and can never match");
                unreachable.push((role, spelling.to_string()));
            }
            entries.insert(spelling.to_string(), role.token());
        }

        Self {
            entries,
            unreachable,
        }
    }

    pub fn lookup(&self, word: &str) -> Option<Token> {
        self.entries.get(word).cloned()
    }

    /// Roles whose configured spelling can never lex as a single identifier.
    pub fn unreachable(&self) -> &[(KeywordRole, String)] {
        &self.unreachable
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(&KeywordConfig::default())
    }
}

fn is_identifier_spelling(spelling: &str) -> bool {
    let mut chars = spelling.chars();
    match chars.next() {
        Some(first) => is_ident_start(first) && chars.all(is_ident_continue),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let table = KeywordTable::default();
        assert_eq!(table.lookup("let"), Some(Token::Let));
        assert_eq!(table.lookup("for"), Some(Token::For));
        assert_eq!(table.lookup("var"), None);
        assert!(table.unreachable().is_empty());
    }

    #[test]
    fn test_remapped_role_frees_default_spelling() {
        let table = KeywordTable::new(&KeywordConfig::default().with(KeywordRole::Let, "var"));
        assert_eq!(table.lookup("var"), Some(Token::Let));
        assert_eq!(table.lookup("let"), None);
    }

    #[test]
    fn test_blank_spelling_falls_back() {
        let config = KeywordConfig::default().with(KeywordRole::Print, "   ");
        assert_eq!(config.spelling(KeywordRole::Print), "print");
    }

    #[test]
    fn test_later_role_wins_on_clash() {
        let config = KeywordConfig::default()
            .with(KeywordRole::If, "x")
            .with(KeywordRole::While, "x");
        assert_eq!(KeywordTable::new(&config).lookup("x"), Some(Token::While));
    }

    #[test]
    fn test_unreachable_spelling_is_reported() {
        let config = KeywordConfig::default().with(KeywordRole::For, "for-each");
        let table = KeywordTable::new(&config);
        assert_eq!(table.unreachable(), &[(KeywordRole::For, "for-each".to_string())]);
    }

    #[test]
    fn test_from_json_uses_camel_case_keys() {
        let config = KeywordConfig::from_json_str(r#"{"letKeyword": "soit", "printKeyword": "affiche"}"#)
            .unwrap();
        assert_eq!(config.spelling(KeywordRole::Let), "soit");
        assert_eq!(config.spelling(KeywordRole::Print), "affiche");
        assert_eq!(config.spelling(KeywordRole::If), "if");
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        assert!(KeywordConfig::from_json_str(r#"{"loopKeyword": "loop"}"#).is_err());
    }

    #[test]
    fn test_apply_override() {
        let mut config = KeywordConfig::default();
        config.apply_override("let=var").unwrap();
        assert_eq!(config.spelling(KeywordRole::Let), "var");
        assert!(config.apply_override("let").is_err());
        assert!(config.apply_override("loop=x").is_err());
    }
}
