pub mod cli;
pub mod display;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
