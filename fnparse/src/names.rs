use std::collections::BTreeMap;

use tracing::{debug, instrument, trace};

use crate::internal::*;

/// Links every call to the top-level declaration carrying its name.
#[derive(Debug)]
pub struct Resolver {
  program: Program,
  scope: Scope,
}

impl Resolver {
  pub fn new(program: Program) -> Resolver {
    Resolver { program, scope: Scope::global() }
  }

  pub fn resolve(mut self) -> Program {
    for (index, decl) in self.program.declarations() {
      self.scope.declare(&decl.name, index);
    }
    for stmt in &mut self.program.statements {
      match stmt {
        Stmt::FunctionDecl(decl) => visit_fn_decl(&self.scope, decl),
      }
    }
    self.program
  }
}

#[instrument(skip_all)]
fn visit_fn_decl(scope: &Scope, fn_decl: &mut FunctionDeclaration) {
  for call in &mut fn_decl.body.calls {
    visit_call(scope, call);
  }
}

#[instrument(skip_all)]
fn visit_call(scope: &Scope, call: &mut FunctionCall) {
  match scope.lookup(&call.name) {
    Some(decl) => call.resolve_to(decl),
    None => trace!(name = call.name.as_str(), "unresolved call"),
  }
  for Expr::Call(inner) in &mut call.callee {
    visit_call(scope, inner);
  }
}

#[derive(Debug, PartialEq, Eq, Default)]
pub struct Scope {
  symbols: BTreeMap<String, idx::Decl>,
}

impl Scope {
  pub const fn global() -> Scope {
    Scope { symbols: BTreeMap::new() }
  }

  /// Anonymous declarations are not callable by name, and a repeated name
  /// keeps pointing at its first declaration.
  pub fn declare(&mut self, name: &str, decl: idx::Decl) {
    if name.is_empty() {
      return;
    }
    if let Some(first) = self.symbols.get(name) {
      debug!(name, ?first, ?decl, "duplicate declaration ignored");
      return;
    }
    self.symbols.insert(name.to_string(), decl);
  }

  pub fn lookup(&self, name: &str) -> Option<idx::Decl> {
    self.symbols.get(name).copied()
  }
}
