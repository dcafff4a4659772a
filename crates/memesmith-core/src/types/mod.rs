//! Domain types shared by every MemeSmith crate.

mod effect;
mod ids;
mod meme;
mod template;
mod user;

pub use effect::Effect;
pub use ids::{normalize_id, MemeId, TemplateId, UserId};
pub use meme::{Meme, MemePage, NewMeme, MAX_CAPTION_CHARS};
pub use template::{MemeTemplate, TextPosition, TextPositions};
pub use user::{ProfileUpdate, UserProfile};
