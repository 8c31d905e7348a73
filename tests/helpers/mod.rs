#![allow(dead_code, unused_imports)]
pub mod fake_notify;
pub mod fixtures;
pub mod test_app;

pub use fake_notify::*;
pub use fixtures::*;
pub use test_app::*;
