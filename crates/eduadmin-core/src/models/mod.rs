//! Wire and domain models

pub mod upload;
