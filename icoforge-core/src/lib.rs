#![allow(clippy::new_without_default)]

pub mod convert;
pub mod error;
pub mod util;
