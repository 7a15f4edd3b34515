// Jetsite Infrastructure - In-Memory Adapter
// Implements: TaskStore

mod task_store;

pub use task_store::InMemoryTaskStore;
