mod server;
mod token_sweeper;

pub use server::*;
pub use token_sweeper::*;
