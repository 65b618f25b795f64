//! Wire entities decoded from gateway dispatches and REST responses

mod channel;
mod guild;
mod member;
mod message;
mod presence;
mod user;

pub use channel::{Channel, ChannelType};
pub use guild::{Guild, UnavailableGuild};
pub use member::Member;
pub use message::{Attachment, Message};
pub use presence::{OnlineStatus, Presence, PresenceUser};
pub use user::User;
