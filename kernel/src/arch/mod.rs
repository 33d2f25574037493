//! Architecture-specific glue. Only x86_64 is implemented; the split
//! exists so that boundary is explicit rather than implicit.

pub mod x86_64;
