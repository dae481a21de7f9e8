pub mod import;
pub mod init;

pub use import::ImportCommand;
pub use init::InitCommand;
