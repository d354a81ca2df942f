pub mod config;
pub mod session;
pub mod storage;
pub mod terminal;

pub use storage::FileStorage;
pub use terminal::{PrintNavigator, TerminalRenderer, TokioTimer};
