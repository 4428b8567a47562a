mod call;
mod message;
mod schedule;
mod user;

pub use call::Call;
pub use message::{Message, MessageRow, Reaction};
pub use schedule::Schedule;
pub use user::{AuthUser, User};
