macro_rules! index_impl_for {
  ($type:ty) => {
    impl $type {
      pub const fn new(idx: u32) -> Self {
        Self(idx)
      }

      pub const fn usize(&self) -> usize {
        self.0 as usize
      }
    }
    impl std::fmt::Debug for $type {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "idx::{}({})", stringify!($type), self.0)
      }
    }
  };
}

/// Position of a declaration in `Program::statements`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decl(u32);
index_impl_for!(Decl);
