//! Orchestration for the glyphstamp CLI: obtain a key pair, sign a
//! payload, render the signed envelope as a symbol, and persist all
//! artifacts.

pub mod pipeline;
