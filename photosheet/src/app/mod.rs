pub(crate) mod commands;
mod event_loop;
mod export;
mod init;
mod state;

pub use state::App;
