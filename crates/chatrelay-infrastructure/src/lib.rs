pub mod config_service;
pub mod keyspace;
pub mod kv_message_repository;
pub mod kv_session_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::kv_message_repository::KvMessageRepository;
pub use crate::kv_session_repository::KvSessionRepository;
pub use crate::paths::{ChatRelayPaths, PathError};
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
