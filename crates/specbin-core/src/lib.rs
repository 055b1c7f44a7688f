pub mod common;
pub mod domain;
pub mod io;
pub mod numerics;
pub mod opacity;
pub mod rebin;
