//! 应用层 - 命令（写操作）

mod prediction_commands;

pub mod handlers;

pub use prediction_commands::*;
