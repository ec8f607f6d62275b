// dashstore - In-memory users/posts repository with filtering, pagination and stats

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod query;
pub mod record;
pub mod seed;
pub mod service;
pub mod stats;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Result, StoreError};
pub use filter::{Filter, FilterOp};
pub use models::{NewPost, NewUser, Post, PostPatch, Tags, User, UserPatch};
pub use query::{ListParams, Page, Pagination, query};
pub use record::{IndexValue, Record};
pub use service::{Dashboard, Envelope, Reply};
pub use stats::{PostStats, UserStats, post_stats, user_stats};
pub use store::RecordStore;
