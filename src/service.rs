// Dashboard facade: both collections plus the response envelope
//
// This is the function-call contract an HTTP layer sits on. Each operation
// returns a `Reply` holding the status code and the envelope to serialize.

use crate::config::Config;
use crate::error::{StoreError, capitalize};
use crate::filter::FilterOp;
use crate::models::{NewPost, NewUser, Post, PostPatch, User, UserPatch};
use crate::query::{self, ListParams, POST_FILTERS, Pagination, USER_FILTERS};
use crate::record::Record;
use crate::seed;
use crate::stats;
use crate::store::RecordStore;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Standard response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// HTTP status plus envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Envelope,
}

impl Reply {
    fn success(status: u16, message: String, data: Value) -> Self {
        Self {
            status,
            body: Envelope {
                success: true,
                data: Some(data),
                count: None,
                pagination: None,
                message,
                error: None,
            },
        }
    }

    fn failure(err: &StoreError) -> Self {
        let status = err.status_code();
        if status >= 500 {
            warn!(error = %err, "Request failed");
        } else {
            debug!(error = %err, status, "Request rejected");
        }

        let error = match err {
            StoreError::Internal(detail) => Some(detail.clone()),
            _ => None,
        };

        Self {
            status,
            body: Envelope {
                success: false,
                data: None,
                count: None,
                pagination: None,
                message: err.user_message(),
                error,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.body.success
    }
}

fn to_data<S: Serialize>(value: &S) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Internal(e.to_string()))
}

fn respond<S: Serialize>(status: u16, message: String, result: Result<S, StoreError>) -> Reply {
    match result.and_then(|value| to_data(&value)) {
        Ok(data) => Reply::success(status, message, data),
        Err(err) => Reply::failure(&err),
    }
}

/// Users and posts, each owned by its own store
#[derive(Debug, Clone)]
pub struct Dashboard {
    users: RecordStore<User>,
    posts: RecordStore<Post>,
    default_limit: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(RecordStore::new(), RecordStore::new())
    }
}

impl Dashboard {
    pub fn new(users: RecordStore<User>, posts: RecordStore<Post>) -> Self {
        Self {
            users,
            posts,
            default_limit: query::DEFAULT_LIMIT,
        }
    }

    /// Dashboard preloaded with the demo users and posts
    pub fn demo() -> Result<Self, StoreError> {
        Ok(Self::new(
            RecordStore::with_records(seed::demo_users())?,
            RecordStore::with_records(seed::demo_posts())?,
        ))
    }

    /// Build from configuration: seed files first, then demo data, else empty
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let dashboard = match &config.seed_dir {
            Some(dir) => Self::new(seed::load_store(dir)?, seed::load_store(dir)?),
            None if config.demo_data => Self::demo()?,
            None => Self::default(),
        };
        Ok(dashboard.with_default_limit(config.default_limit))
    }

    /// Page size used when a listing gives no valid `limit`
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    pub fn users(&self) -> &RecordStore<User> {
        &self.users
    }

    pub fn posts(&self) -> &RecordStore<Post> {
        &self.posts
    }

    // ========================================================================
    // Posts
    // ========================================================================

    /// Filter by `category`/`author` and paginate by `page`/`limit`
    pub fn list_posts(&self, query: &HashMap<String, String>) -> Reply {
        list(&self.posts, query, POST_FILTERS, self.default_limit)
    }

    pub fn get_post(&self, id: u64) -> Reply {
        get(&self.posts, id)
    }

    pub fn create_post(&mut self, draft: NewPost) -> Reply {
        create(&mut self.posts, draft)
    }

    pub fn update_post(&mut self, id: u64, patch: PostPatch) -> Reply {
        update(&mut self.posts, id, patch)
    }

    pub fn delete_post(&mut self, id: u64) -> Reply {
        delete(&mut self.posts, id)
    }

    pub fn like_post(&mut self, id: u64) -> Reply {
        respond(200, "Post liked successfully".to_string(), self.posts.increment_likes(id))
    }

    pub fn post_stats(&self) -> Reply {
        respond(
            200,
            "Post statistics retrieved successfully".to_string(),
            Ok(stats::post_stats(self.posts.list())),
        )
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Filter by `role` and paginate by `page`/`limit`
    pub fn list_users(&self, query: &HashMap<String, String>) -> Reply {
        list(&self.users, query, USER_FILTERS, self.default_limit)
    }

    pub fn get_user(&self, id: u64) -> Reply {
        get(&self.users, id)
    }

    pub fn create_user(&mut self, draft: NewUser) -> Reply {
        create(&mut self.users, draft)
    }

    pub fn update_user(&mut self, id: u64, patch: UserPatch) -> Reply {
        update(&mut self.users, id, patch)
    }

    pub fn delete_user(&mut self, id: u64) -> Reply {
        delete(&mut self.users, id)
    }

    pub fn user_stats(&self) -> Reply {
        respond(
            200,
            "User statistics retrieved successfully".to_string(),
            Ok(stats::user_stats(self.users.list())),
        )
    }
}

fn list<T: Record>(
    store: &RecordStore<T>,
    raw: &HashMap<String, String>,
    allowed: &[(&str, FilterOp)],
    default_limit: usize,
) -> Reply {
    let params = ListParams::parse(raw, allowed, default_limit);
    let page = query::query(store.list(), &params);
    let message = format!("{} retrieved successfully", capitalize(T::collection_name()));

    let mut reply = respond(200, message, Ok(&page.data));
    if reply.is_success() {
        reply.body.count = Some(page.total);
        reply.body.pagination = Some(page.pagination);
    }
    reply
}

fn get<T: Record>(store: &RecordStore<T>, id: u64) -> Reply {
    let message = format!("{} retrieved successfully", capitalize(T::kind()));
    respond(200, message, store.find_by_id(id))
}

fn create<T: Record>(store: &mut RecordStore<T>, draft: T::Draft) -> Reply {
    let message = format!("{} created successfully", capitalize(T::kind()));
    respond(201, message, store.insert(draft))
}

fn update<T: Record>(store: &mut RecordStore<T>, id: u64, patch: T::Patch) -> Reply {
    let message = format!("{} updated successfully", capitalize(T::kind()));
    respond(200, message, store.update(id, patch))
}

fn delete<T: Record>(store: &mut RecordStore<T>, id: u64) -> Reply {
    let message = format!("{} deleted successfully", capitalize(T::kind()));
    respond(200, message, store.delete(id))
}
