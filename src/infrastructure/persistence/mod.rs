mod in_memory_job_state_store;
mod pg_job_state_store;
mod pg_pool;

pub use in_memory_job_state_store::InMemoryJobStateStore;
pub use pg_job_state_store::PgJobStateStore;
pub use pg_pool::{create_pool, run_migrations};
