//! # Personas Feature
//!
//! The Mechamaru character and its offline reply generator.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod generator;
pub mod persona;

pub use generator::{RandomSource, ReplyGenerator, SeededRandom, ThreadRandom, ENDING_PROBABILITY};
pub use persona::{Persona, MECHAMARU};
