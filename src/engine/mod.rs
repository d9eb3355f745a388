mod builder;
mod command;
mod feed_engine;
mod handle;

pub use builder::*;
pub use command::*;
pub use feed_engine::*;
pub use handle::*;
