pub mod ebook;
pub mod section;
pub mod user;
