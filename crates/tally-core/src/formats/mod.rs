//! One module per supported statement format.

pub mod columnar;
pub mod csv;
pub mod ocbc;
pub mod paylah;
pub mod posb;
