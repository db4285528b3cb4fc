pub use super::ebooks::Entity as Ebooks;
pub use super::sections::Entity as Sections;
pub use super::users::Entity as Users;
