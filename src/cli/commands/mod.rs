mod ingest;
mod list;
mod seed;
mod sweep;

pub use ingest::cmd_ingest;
pub use list::cmd_list_documents;
pub use seed::cmd_seed;
pub use sweep::cmd_sweep_cache;
