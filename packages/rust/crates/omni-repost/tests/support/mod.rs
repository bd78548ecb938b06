#![allow(dead_code)]

mod bootstrap;
mod doubles;

#[allow(unused_imports)]
pub use bootstrap::spawn_test_server;
#[allow(unused_imports)]
pub use doubles::{RecordingSleeper, ScriptedChannel, StaticProbe};
