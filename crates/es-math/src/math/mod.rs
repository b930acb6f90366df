//! Core math modules.

pub mod density;
pub mod grid;
pub mod interp;
pub mod quadrature;
pub mod special;
