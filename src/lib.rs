#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the connection lifecycle gate library.
//! 连接生命周期门控库的根。

pub mod bootstrap;
pub mod error;
pub mod gate;
pub mod state;
