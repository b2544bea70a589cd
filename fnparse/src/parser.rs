#[cfg(debug_assertions)]
use std::sync::Once;

use thiserror::Error;
use tracing::{instrument, trace};
#[cfg(debug_assertions)]
use tracing_subscriber::{EnvFilter, fmt, fmt::format::FmtSpan};

use crate::internal::{TokenKind as T, *};
use ParseError as E;

/// Outcome of one production: `Ok(Some(_))` matched, `Ok(None)` the
/// leading tokens were absent and the stream is back where it started,
/// `Err(_)` the whole parse is over.
pub type Attempt<N> = Result<Option<N>, ParseError>;

#[derive(Debug)]
pub struct Parser {
  stream: TokenStream,
  /// For each `(` token, the index of the `)` that closes it before any
  /// brace or end of input.
  closers: Vec<Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("mismatched bracket: found {found}, expected `{}`", .expected.closer())]
  Mismatch { found: Token, expected: Bracket },
  #[error("expected end of input, found {found}")]
  TrailingInput { found: Token },
  #[error(transparent)]
  Stream(#[from] StreamError),
}

impl Parser {
  pub fn new(tokens: Vec<Token>) -> Parser {
    #[cfg(debug_assertions)]
    configure_test_tracing();

    let closers = paren_closers(&tokens);
    Parser {
      stream: TokenStream::new(tokens),
      closers,
    }
  }

  pub fn new_str(src: &str) -> Result<Parser, LexError> {
    Ok(Parser::new(Lexer::new(src).lex()?))
  }

  pub const fn position(&self) -> usize {
    self.stream.position()
  }

  pub fn stream(&self) -> &TokenStream {
    &self.stream
  }

  /// Parses a whole program and requires nothing but end of input after
  /// the last declaration.
  #[instrument(skip_all)]
  pub fn parse(mut self) -> Result<Program, ParseError> {
    let program = self.parse_program()?;
    let found = self.stream.next();
    if found.kind != T::Eof {
      return Err(E::TrailingInput { found: found.clone() });
    }
    Ok(program)
  }

  /// Collects function declarations until one fails to match. The cursor
  /// is left on the first token that does not start a declaration.
  #[instrument(skip_all)]
  pub fn parse_program(&mut self) -> Result<Program, ParseError> {
    let mut statements = Vec::new();
    while let Some(decl) = self.parse_function_decl()? {
      statements.push(Stmt::FunctionDecl(decl));
    }
    trace!(statements = statements.len(), pos = self.position(), "program done");
    Ok(Program::new(statements))
  }

  #[instrument(skip_all)]
  pub fn parse_function_decl(&mut self) -> Attempt<FunctionDeclaration> {
    self.speculate(|p| {
      if !p.stream.next().is(T::Keyword, "function") {
        return Ok(None);
      }
      let name = p.accept(T::Identifier).unwrap_or_default();
      if !p.expect(T::Separator, "(") || !p.expect(T::Separator, ")") {
        return Ok(None);
      }
      let Some(body) = p.parse_function_body()? else {
        return Ok(None);
      };
      trace!(name = name.as_str(), calls = body.calls.len(), "function decl");
      Ok(Some(FunctionDeclaration::new(name, body)))
    })
  }

  /// Scans a `{ ... }` block, balancing `()` and `{}` on an explicit
  /// stack and picking up every call it walks over.
  #[instrument(skip_all)]
  pub fn parse_function_body(&mut self) -> Attempt<FunctionBody> {
    self.speculate(|p| {
      if !p.expect(T::Separator, "{") {
        return Ok(None);
      }
      let mut open = vec![Bracket::Brace];
      let mut calls = Vec::new();
      while let Some(&expected) = open.last() {
        if let Some(call) = p.parse_function_call()? {
          calls.push(call);
          continue;
        }
        let token = p.stream.next();
        if token.kind == T::Eof {
          trace!(unclosed = open.len(), "body runs past end of input");
          return Ok(None);
        }
        if let Some(bracket) = token.opening_bracket() {
          open.push(bracket);
        } else if let Some(bracket) = token.closing_bracket() {
          if bracket != expected {
            return Err(E::Mismatch { found: token.clone(), expected });
          }
          open.pop();
        }
      }
      Ok(Some(FunctionBody::new(calls)))
    })
  }

  #[instrument(skip_all)]
  pub fn parse_function_call(&mut self) -> Attempt<FunctionCall> {
    self.speculate(|p| {
      let Some(name) = p.accept(T::Identifier) else {
        return Ok(None);
      };
      let open = p.stream.position();
      if !p.expect(T::Separator, "(") {
        return Ok(None);
      }
      if p.closers.get(open).copied().flatten().is_none() {
        trace!(name = name.as_str(), "call is never closed");
        return Ok(None);
      }
      let Some(parameters) = p.parameter_list() else {
        return Ok(None);
      };
      trace!(name = name.as_str(), parameters = parameters.len(), "function call");
      Ok(Some(FunctionCall::new(name, parameters)))
    })
  }

  /// Raw text of each comma separated parameter, up to the `)` closing the
  /// call. Parameters get no grammar of their own: nested parens are kept
  /// verbatim and a brace or end of input means this was not a call.
  fn parameter_list(&mut self) -> Option<Vec<String>> {
    let mut parameters = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut prev_word = false;
    loop {
      let token = self.stream.next();
      match (token.kind, token.text.as_str()) {
        (T::Eof, _) | (T::Separator, "{" | "}") => return None,
        (T::Separator, ")") if depth == 0 => break,
        (T::Separator, ",") if depth == 0 => {
          parameters.push(std::mem::take(&mut current));
          continue;
        }
        (T::Separator, "(") => depth += 1,
        (T::Separator, ")") => depth -= 1,
        _ => {}
      }
      let word = matches!(token.kind, T::Identifier | T::StringLiteral | T::Keyword);
      if word && prev_word && !current.is_empty() {
        current.push(' ');
      }
      current.push_str(&token.text);
      prev_word = word;
    }
    if !current.is_empty() || !parameters.is_empty() {
      parameters.push(current);
    }
    Some(parameters)
  }

  /// Runs one attempt between a mark and its matching commit or restore,
  /// so the save stack is balanced on every exit, fatal errors included.
  fn speculate<N>(&mut self, attempt: impl FnOnce(&mut Self) -> Attempt<N>) -> Attempt<N> {
    self.stream.mark();
    match attempt(self) {
      Ok(Some(node)) => {
        self.stream.commit()?;
        Ok(Some(node))
      }
      Ok(None) => {
        self.stream.restore(0)?;
        Ok(None)
      }
      Err(err) => {
        // the fatal error is what the caller needs to see, not a second underflow
        let _ = self.stream.restore(0);
        Err(err)
      }
    }
  }

  /// Consumes the next token if it has the given kind.
  fn accept(&mut self, kind: TokenKind) -> Option<String> {
    let pos = self.stream.position();
    let token = self.stream.next();
    if token.kind == kind {
      return Some(token.text.clone());
    }
    self.stream.seek(pos);
    None
  }

  fn expect(&mut self, kind: TokenKind, text: &str) -> bool {
    self.stream.next().is(kind, text)
  }
}

/// Pairs every `(` with its closing `)` in one pass. A brace closes the
/// scan for every paren still open, so those openers get `None`.
fn paren_closers(tokens: &[Token]) -> Vec<Option<usize>> {
  let mut closers = vec![None; tokens.len()];
  let mut open = Vec::new();
  for (index, token) in tokens.iter().enumerate() {
    if token.kind != T::Separator {
      continue;
    }
    match token.text.as_str() {
      "(" => open.push(index),
      ")" => {
        if let Some(opener) = open.pop() {
          closers[opener] = Some(index);
        }
      }
      "{" | "}" => open.clear(),
      _ => {}
    }
  }
  closers
}

#[cfg(debug_assertions)]
static INIT: Once = Once::new();

#[cfg(debug_assertions)]
fn configure_test_tracing() {
  INIT.call_once(|| {
    let subscriber = fmt::Subscriber::builder()
      .with_env_filter(EnvFilter::from_default_env())
      .with_test_writer()
      .with_span_events(FmtSpan::ACTIVE)
      .finish();
    // keep any subscriber the host already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
  });
}
