pub use super::jokes::Entity as Jokes;
pub use super::users::Entity as Users;
