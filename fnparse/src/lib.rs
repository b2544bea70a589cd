pub mod ast;
pub mod idx;
pub mod lexer;
pub mod names;
pub mod parser;
pub mod token;
pub mod token_stream;

pub mod internal {
  pub use crate::ast::*;
  pub use crate::idx;
  pub use crate::lexer::*;
  pub use crate::names::*;
  pub use crate::parser::*;
  pub use crate::token::*;
  pub use crate::token_stream::*;
}

pub use internal::*;
