//! Command-line front end for tabula: single questions, batch evaluation
//! runs, and dataset inspection.

pub mod questions;
pub mod strategy;
