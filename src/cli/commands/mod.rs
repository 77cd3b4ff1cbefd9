//! One module per subcommand.  Each exposes an `execute` function.

pub mod delete;
pub mod get;
pub mod init;
pub mod list;
pub mod reset;
pub mod set;
pub mod status;
