pub mod chat;
pub mod clock;
mod convert;
pub mod dispatcher;
pub mod error;
pub mod mentions;
pub mod search;

pub use chat::ChatService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use dispatcher::Dispatcher;
pub use error::{ChatError, ChatResult};
