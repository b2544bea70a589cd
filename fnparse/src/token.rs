use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Keyword,
  Identifier,
  StringLiteral,
  Separator,
  Operator,
  Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: String,
}

/// The two bracket pairs the parser balances: `(` `)` and `{` `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
  Paren,
  Brace,
}

impl Token {
  pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
    Token { kind, text: text.into() }
  }

  pub const fn eof() -> Self {
    Token {
      kind: TokenKind::Eof,
      text: String::new(),
    }
  }

  pub fn is(&self, kind: TokenKind, text: &str) -> bool {
    self.kind == kind && self.text == text
  }

  pub fn opening_bracket(&self) -> Option<Bracket> {
    if self.kind != TokenKind::Separator {
      return None;
    }
    match self.text.as_str() {
      "(" => Some(Bracket::Paren),
      "{" => Some(Bracket::Brace),
      _ => None,
    }
  }

  pub fn closing_bracket(&self) -> Option<Bracket> {
    if self.kind != TokenKind::Separator {
      return None;
    }
    match self.text.as_str() {
      ")" => Some(Bracket::Paren),
      "}" => Some(Bracket::Brace),
      _ => None,
    }
  }
}

impl Bracket {
  pub const fn closer(self) -> &'static str {
    match self {
      Bracket::Paren => ")",
      Bracket::Brace => "}",
    }
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      TokenKind::Eof => write!(f, "end of input"),
      kind => write!(f, "{kind:?} `{}`", self.text),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::token::TokenKind as T;

  #[test]
  fn bracket_classification() {
    let cases: &[(Token, Option<Bracket>, Option<Bracket>)] = &[
      (Token::new(T::Separator, "("), Some(Bracket::Paren), None),
      (Token::new(T::Separator, ")"), None, Some(Bracket::Paren)),
      (Token::new(T::Separator, "{"), Some(Bracket::Brace), None),
      (Token::new(T::Separator, "}"), None, Some(Bracket::Brace)),
      (Token::new(T::Separator, ";"), None, None),
      (Token::new(T::StringLiteral, "("), None, None),
      (Token::eof(), None, None),
    ];
    for (token, opening, closing) in cases {
      assert_eq!(token.opening_bracket(), *opening, "{token:?}");
      assert_eq!(token.closing_bracket(), *closing, "{token:?}");
    }
  }

  #[test]
  fn display() {
    assert_eq!(Token::new(T::Identifier, "foo").to_string(), "Identifier `foo`");
    assert_eq!(Token::eof().to_string(), "end of input");
  }
}
