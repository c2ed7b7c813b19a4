pub mod prelude;

pub mod documents;
pub mod search_cache;
pub mod users;
