pub mod book;
pub mod favorites;
pub mod session;

pub use book::{BookRecord, ImageLinks, VolumeInfo};
pub use favorites::FavoritesDocument;
pub use session::{Session, SessionChange};
