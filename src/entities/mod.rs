pub mod prelude;

pub mod ebooks;
pub mod sections;
pub mod users;
