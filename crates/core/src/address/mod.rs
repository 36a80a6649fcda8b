//! Free-form address parsing
//!
//! The parser splits input on commas, assigns the first segment to the
//! street, the last to state/ZIP and classifies the rest as secondary
//! designators or city words. Output is always produced; diagnostics carry
//! anything that went wrong.

mod parser;
mod region;
mod segment;
mod street;
mod tables;

pub use parser::parse;
