use thiserror::Error;

use crate::internal::{TokenKind as T, *};

#[derive(Debug)]
pub struct Lexer<'src> {
  src: &'src str,
  pos: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
  #[error("unexpected character `{ch}` at offset {offset}")]
  UnexpectedChar { ch: char, offset: usize },
  #[error("unterminated string literal starting at offset {offset}")]
  UnterminatedString { offset: usize },
}

impl<'src> Lexer<'src> {
  pub const fn new(src: &'src str) -> Self {
    Lexer { src, pos: 0 }
  }

  /// Lexes the whole input. The returned tokens carry no trailing `Eof`,
  /// the token stream synthesizes one.
  pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::with_capacity(64);
    loop {
      let token = self.next_token()?;
      if token.kind == T::Eof {
        return Ok(tokens);
      }
      tokens.push(token);
    }
  }

  pub fn next_token(&mut self) -> Result<Token, LexError> {
    let bytes = self.src.as_bytes();
    while !self.eof() && bytes[self.pos].is_ascii_whitespace() {
      self.pos += 1;
    }
    if self.eof() {
      return Ok(Token::eof());
    }
    match bytes[self.pos] {
      b'(' | b')' | b'{' | b'}' | b';' | b',' | b'.' => Ok(self.simple_token(T::Separator, 1)),
      b'=' | b'!' | b'<' | b'>' if self.peek() == b'=' => Ok(self.simple_token(T::Operator, 2)),
      b'+' | b'-' | b'*' | b'/' | b'%' | b'=' | b'!' | b'<' | b'>' => {
        Ok(self.simple_token(T::Operator, 1))
      }
      b'"' => self.string_lit(),
      b if b.is_ascii_alphabetic() || b == b'_' => Ok(self.word()),
      _ => Err(LexError::UnexpectedChar {
        ch: self.src[self.pos..].chars().next().unwrap_or_default(),
        offset: self.pos,
      }),
    }
  }

  fn simple_token(&mut self, kind: TokenKind, len: usize) -> Token {
    let token = Token::new(kind, &self.src[self.pos..self.pos + len]);
    self.pos += len;
    token
  }

  fn string_lit(&mut self) -> Result<Token, LexError> {
    let offset = self.pos;
    let start = self.pos + 1; // "
    // TODO: escaped quotes
    let Some(len) = self.src[start..].find('"') else {
      return Err(LexError::UnterminatedString { offset });
    };
    self.pos = start + len + 1;
    Ok(Token::new(T::StringLiteral, &self.src[start..start + len]))
  }

  fn word(&mut self) -> Token {
    let start = self.pos;
    let bytes = self.src.as_bytes();
    self.pos += 1;
    while !self.eof() && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_') {
      self.pos += 1;
    }
    match &self.src[start..self.pos] {
      "function" => Token::new(T::Keyword, "function"),
      ident => Token::new(T::Identifier, ident),
    }
  }

  fn peek(&self) -> u8 {
    *self.src.as_bytes().get(self.pos + 1).unwrap_or(&0)
  }

  const fn eof(&self) -> bool {
    self.pos >= self.src.len()
  }
}
