// Grouped aggregates over a full collection snapshot

use crate::models::{ADMIN_ROLE, DEFAULT_ROLE, Post, User};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate view of all posts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStats {
    pub total_posts: usize,
    pub total_likes: u64,
    /// 0.0 when there are no posts
    pub average_likes: f64,
    /// One entry per distinct category, in first-seen order
    pub categories: Vec<CategoryStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub count: usize,
    pub total_likes: u64,
    pub average_likes: f64,
}

/// Aggregate view of all users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: usize,
    pub admin_count: usize,
    pub user_count: usize,
    /// Count per role name; always contains "admin" and "user"
    pub roles: BTreeMap<String, usize>,
}

/// Totals, average likes and the per-category breakdown
///
/// Categories are grouped by exact value, so "News" and "news" are distinct.
pub fn post_stats(posts: &[Post]) -> PostStats {
    let mut categories: Vec<CategoryStats> = Vec::new();
    let mut total_likes: u64 = 0;

    for post in posts {
        total_likes = total_likes.saturating_add(post.likes);

        match categories.iter_mut().find(|c| c.category == post.category) {
            Some(group) => {
                group.count += 1;
                group.total_likes = group.total_likes.saturating_add(post.likes);
            }
            None => categories.push(CategoryStats {
                category: post.category.clone(),
                count: 1,
                total_likes: post.likes,
                average_likes: 0.0,
            }),
        }
    }

    for group in &mut categories {
        group.average_likes = average(group.total_likes, group.count);
    }

    PostStats {
        total_posts: posts.len(),
        total_likes,
        average_likes: average(total_likes, posts.len()),
        categories,
    }
}

/// Totals per role
///
/// Role values are not validated; unknown roles get their own histogram entry.
pub fn user_stats(users: &[User]) -> UserStats {
    let mut roles = BTreeMap::new();
    roles.insert(ADMIN_ROLE.to_string(), 0);
    roles.insert(DEFAULT_ROLE.to_string(), 0);

    for user in users {
        *roles.entry(user.role.clone()).or_insert(0) += 1;
    }

    UserStats {
        total_users: users.len(),
        admin_count: roles[ADMIN_ROLE],
        user_count: roles[DEFAULT_ROLE],
        roles,
    }
}

fn average(sum: u64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum as f64 / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPost, NewUser, PostPatch};
    use crate::store::RecordStore;

    fn post(store: &mut RecordStore<Post>, category: &str, likes: u64) {
        let id = store.insert(NewPost::new("t", "c").with_category(category)).unwrap().id;
        let patch = PostPatch {
            likes: Some(likes),
            ..Default::default()
        };
        store.update(id, patch).unwrap();
    }

    #[test]
    fn test_post_stats_empty() {
        let stats = post_stats(&[]);
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.total_likes, 0);
        assert_eq!(stats.average_likes, 0.0);
        assert!(stats.categories.is_empty());

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["averageLikes"], 0.0);
    }

    #[test]
    fn test_post_stats_groups_in_first_seen_order() {
        let mut store: RecordStore<Post> = RecordStore::new();
        post(&mut store, "tutorial", 8);
        post(&mut store, "announcement", 15);
        post(&mut store, "tutorial", 2);

        let stats = post_stats(store.list());
        assert_eq!(stats.total_posts, 3);
        assert_eq!(stats.total_likes, 25);
        assert!((stats.average_likes - 25.0 / 3.0).abs() < f64::EPSILON);

        assert_eq!(
            stats.categories,
            vec![
                CategoryStats {
                    category: "tutorial".to_string(),
                    count: 2,
                    total_likes: 10,
                    average_likes: 5.0,
                },
                CategoryStats {
                    category: "announcement".to_string(),
                    count: 1,
                    total_likes: 15,
                    average_likes: 15.0,
                },
            ]
        );
    }

    #[test]
    fn test_user_stats() {
        let mut store: RecordStore<User> = RecordStore::new();
        store.insert(NewUser::new("A", "a@x.com").with_role("admin")).unwrap();
        store.insert(NewUser::new("B", "b@x.com")).unwrap();
        store.insert(NewUser::new("C", "c@x.com")).unwrap();
        store.insert(NewUser::new("D", "d@x.com").with_role("editor")).unwrap();

        let stats = user_stats(store.list());
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.admin_count, 1);
        assert_eq!(stats.user_count, 2);
        assert_eq!(stats.roles.get("editor"), Some(&1));
        assert_eq!(stats.roles.len(), 3);
    }

    #[test]
    fn test_user_stats_empty_keeps_known_roles() {
        let stats = user_stats(&[]);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.roles.get("admin"), Some(&0));
        assert_eq!(stats.roles.get("user"), Some(&0));
    }
}
