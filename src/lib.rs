//! Block programs compiled to Yail and run live on a companion.
//!
//! A [`blocks::Workspace`] holds the program as a forest of typed blocks,
//! edited through a [`session::EditorSession`]. The [`compiler`] lowers it
//! into a [`compiler::CodeBundle`] that a [`transport::Transport`] ships to
//! an interpreter, and the [`dispatch::DispatchBridge`] routes component
//! events back into the Yail handlers.

pub mod blocks;
pub mod compiler;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod interpreter;
pub mod logger;
pub mod server;
pub mod session;
pub mod transport;
