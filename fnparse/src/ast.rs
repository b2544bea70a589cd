use std::fmt;

use crate::internal::*;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
  pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
  FunctionDecl(FunctionDeclaration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  Call(FunctionCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
  /// Empty for `function () { ... }`.
  pub name: String,
  pub body: FunctionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionBody {
  pub calls: Vec<FunctionCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
  pub name: String,
  pub parameters: Vec<String>,
  pub callee: Vec<Expr>,
  definition: Option<idx::Decl>,
}

impl Program {
  pub const fn new(statements: Vec<Stmt>) -> Self {
    Program { statements }
  }

  pub fn declaration(&self, index: idx::Decl) -> Option<&FunctionDeclaration> {
    match self.statements.get(index.usize())? {
      Stmt::FunctionDecl(decl) => Some(decl),
    }
  }

  pub fn declarations(&self) -> impl Iterator<Item = (idx::Decl, &FunctionDeclaration)> {
    self
      .statements
      .iter()
      .enumerate()
      .map(|(i, Stmt::FunctionDecl(decl))| (idx::Decl::new(i as u32), decl))
  }

  /// Every call in the program, depth first in source order.
  pub fn calls(&self) -> Vec<&FunctionCall> {
    fn collect<'a>(call: &'a FunctionCall, out: &mut Vec<&'a FunctionCall>) {
      out.push(call);
      for Expr::Call(inner) in &call.callee {
        collect(inner, out);
      }
    }
    let mut calls = Vec::new();
    for (_, decl) in self.declarations() {
      for call in &decl.body.calls {
        collect(call, &mut calls);
      }
    }
    calls
  }
}

impl FunctionDeclaration {
  pub fn new(name: impl Into<String>, body: FunctionBody) -> Self {
    FunctionDeclaration { name: name.into(), body }
  }

  pub fn is_anonymous(&self) -> bool {
    self.name.is_empty()
  }
}

impl FunctionBody {
  pub const fn new(calls: Vec<FunctionCall>) -> Self {
    FunctionBody { calls }
  }
}

impl FunctionCall {
  pub fn new(name: impl Into<String>, parameters: Vec<String>) -> Self {
    FunctionCall {
      name: name.into(),
      parameters,
      callee: Vec::new(),
      definition: None,
    }
  }

  pub const fn definition(&self) -> Option<idx::Decl> {
    self.definition
  }

  pub const fn is_resolved(&self) -> bool {
    self.definition.is_some()
  }

  pub(crate) fn resolve_to(&mut self, decl: idx::Decl) {
    self.definition = Some(decl);
  }
}

/// Borrowed view of any AST node, for traversal and dumping.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
  Program(&'a Program),
  FunctionDecl(&'a FunctionDeclaration),
  FunctionBody(&'a FunctionBody),
  FunctionCall(&'a FunctionCall),
}

impl<'a> Node<'a> {
  pub fn children(&self) -> Vec<Node<'a>> {
    match *self {
      Node::Program(program) => program
        .statements
        .iter()
        .map(|Stmt::FunctionDecl(decl)| Node::FunctionDecl(decl))
        .collect(),
      Node::FunctionDecl(decl) => vec![Node::FunctionBody(&decl.body)],
      Node::FunctionBody(body) => body.calls.iter().map(Node::FunctionCall).collect(),
      Node::FunctionCall(call) => call
        .callee
        .iter()
        .map(|Expr::Call(inner)| Node::FunctionCall(inner))
        .collect(),
    }
  }

  /// Indented tree dump, one node per line, two spaces per level.
  pub fn render(&self, indent: usize) -> String {
    let mut out = String::new();
    self.render_into(&mut out, indent);
    out
  }

  fn render_into(&self, out: &mut String, indent: usize) {
    let pad = "  ".repeat(indent);
    out.push_str(&pad);
    match *self {
      Node::Program(_) => out.push_str("Program"),
      Node::FunctionDecl(decl) if decl.is_anonymous() => {
        out.push_str("FunctionDeclaration <anonymous>")
      }
      Node::FunctionDecl(decl) => {
        out.push_str("FunctionDeclaration ");
        out.push_str(&decl.name);
      }
      Node::FunctionBody(_) => out.push_str("FunctionBody"),
      Node::FunctionCall(call) => {
        out.push_str("FunctionCall ");
        out.push_str(&call.name);
        match call.definition {
          Some(decl) => out.push_str(&format!(" (resolved #{})", decl.usize())),
          None => out.push_str(" (unresolved)"),
        }
      }
    }
    out.push('\n');
    if let Node::FunctionCall(call) = self {
      for parameter in &call.parameters {
        out.push_str(&pad);
        out.push_str("  Parameter: ");
        out.push_str(parameter);
        out.push('\n');
      }
    }
    for child in self.children() {
      child.render_into(out, indent + 1);
    }
  }
}

impl fmt::Display for Program {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&Node::Program(self).render(0))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn program() -> Program {
    let mut outer = FunctionCall::new("log", vec!["a".to_string(), "b".to_string()]);
    outer.callee.push(Expr::Call(FunctionCall::new("inner", vec![])));
    let mut greet = FunctionCall::new("greet", vec![]);
    greet.resolve_to(idx::Decl::new(0));
    Program::new(vec![
      Stmt::FunctionDecl(FunctionDeclaration::new(
        "greet",
        FunctionBody::new(vec![outer]),
      )),
      Stmt::FunctionDecl(FunctionDeclaration::new("", FunctionBody::new(vec![greet]))),
    ])
  }

  #[test]
  fn render_tree() {
    assert_eq!(
      program().to_string(),
      [
        "Program",
        "  FunctionDeclaration greet",
        "    FunctionBody",
        "      FunctionCall log (unresolved)",
        "        Parameter: a",
        "        Parameter: b",
        "        FunctionCall inner (unresolved)",
        "  FunctionDeclaration <anonymous>",
        "    FunctionBody",
        "      FunctionCall greet (resolved #0)",
        "",
      ]
      .join("\n")
    );
  }

  #[test]
  fn render_subtree_at_indent() {
    let program = program();
    let Stmt::FunctionDecl(decl) = &program.statements[1];
    assert_eq!(
      Node::FunctionBody(&decl.body).render(2),
      "    FunctionBody\n      FunctionCall greet (resolved #0)\n"
    );
  }

  #[test]
  fn declaration_lookup_and_call_walk() {
    let program = program();
    assert_eq!(program.declaration(idx::Decl::new(0)).unwrap().name, "greet");
    assert!(program.declaration(idx::Decl::new(1)).unwrap().is_anonymous());
    assert_eq!(program.declaration(idx::Decl::new(2)), None);
    let names: Vec<_> = program.calls().into_iter().map(|call| call.name.as_str()).collect();
    assert_eq!(names, ["log", "inner", "greet"]);
    let greet = program.calls()[2];
    assert_eq!(greet.definition(), Some(idx::Decl::new(0)));
    assert!(greet.is_resolved());
  }
}
