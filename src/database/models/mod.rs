pub mod entry;
pub mod user;

pub use entry::{DiaryEntry, EntryDraft};
pub use user::{NewUser, User};
