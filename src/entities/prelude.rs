pub use super::documents::Entity as Documents;
pub use super::search_cache::Entity as SearchCache;
pub use super::users::Entity as Users;
