//! Client-side interface of the echo program: instruction encoding, program
//! derived addresses and account layouts.

pub mod error;
pub mod instruction;
pub mod pda;
pub mod state;

pub use solana_program;
