mod callback;
mod command;

pub use callback::CallbackHandler;
pub use command::CommandHandler;
