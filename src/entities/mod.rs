pub mod prelude;

pub mod jokes;
pub mod users;
