//! PocketChat terminal application
//!
//! Drives the shared session controller from a line editor, with conversations
//! kept in a JSON file under the data directory.

pub mod app;
pub mod cli;
pub mod storage;
pub mod view;

pub use app::{run_repl_mode, setup_from_cli, AppConfig};
pub use cli::{Cli, Commands};
pub use storage::FileStore;
pub use view::TerminalView;
