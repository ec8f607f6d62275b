// Generic in-memory record store
//
// One RecordStore owns the ordered collection of a single resource kind and
// its id sequence. All mutation goes through it; readers get `&[T]`.

use crate::error::{Result, StoreError};
use crate::models::{self, Post};
use crate::record::Record;
use std::collections::HashSet;
use tracing::{debug, info};

/// Ordered collection of records of one kind
#[derive(Debug, Clone)]
pub struct RecordStore<T: Record> {
    records: Vec<T>,
    /// Highest id ever assigned or loaded; freed ids are never reused
    high_water: u64,
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            high_water: 0,
        }
    }

    /// Create a store holding pre-existing records, in the given order
    ///
    /// Ids must be positive and unique. The next assigned id follows the largest one.
    pub fn with_records(records: Vec<T>) -> Result<Self> {
        Self::with_records_from(records, 0)
    }

    /// Like `with_records`, but the id sequence resumes from at least `high_water`
    ///
    /// Restores the sequence of an exported collection whose newest records
    /// were deleted. Unique keys must not repeat.
    pub fn with_records_from(records: Vec<T>, high_water: u64) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut keys = HashSet::new();
        for record in &records {
            let id = record.id();
            if id == 0 {
                return Err(StoreError::Validation(format!("{} id must be positive", T::kind())));
            }
            if !seen.insert(id) {
                return Err(StoreError::Validation(format!("Duplicate {} id: {}", T::kind(), id)));
            }
            if let Some((field, value)) = record.unique_key()
                && !keys.insert((field, value))
            {
                return Err(StoreError::DuplicateKey {
                    field,
                    value: value.to_string(),
                });
            }
        }

        let high_water = records.iter().map(|r| r.id()).max().unwrap_or(0).max(high_water);
        debug!(kind = T::kind(), count = records.len(), high_water, "with_records: loaded");

        Ok(Self { records, high_water })
    }

    /// Highest id ever assigned or loaded
    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order
    pub fn list(&self) -> &[T] {
        &self.records
    }

    /// Validate a draft, assign the next id and append the new record
    pub fn insert(&mut self, draft: T::Draft) -> Result<T> {
        let id = self.next_id()?;
        let record = T::from_draft(id, draft, models::now())?;

        if let Some((field, value)) = record.unique_key()
            && self.records.iter().any(|r| r.unique_key() == Some((field, value)))
        {
            debug!(kind = T::kind(), field, value, "insert: duplicate key");
            return Err(StoreError::DuplicateKey {
                field,
                value: value.to_string(),
            });
        }

        self.high_water = id;
        self.records.push(record.clone());
        info!(kind = T::kind(), id, "Created record");

        Ok(record)
    }

    /// Get a record by id
    pub fn find_by_id(&self, id: u64) -> Result<&T> {
        let index = self.position(id)?;
        Ok(&self.records[index])
    }

    /// Merge a partial update over the record and refresh `updated_at`
    pub fn update(&mut self, id: u64, patch: T::Patch) -> Result<T> {
        let index = self.position(id)?;
        let record = &mut self.records[index];

        record.apply_patch(patch);
        let updated_at = models::advance(record.updated_at());
        record.touch(updated_at);
        info!(kind = T::kind(), id, "Updated record");

        Ok(record.clone())
    }

    /// Remove a record, keeping the order of the rest
    pub fn delete(&mut self, id: u64) -> Result<T> {
        let index = self.position(id)?;
        let removed = self.records.remove(index);
        info!(kind = T::kind(), id, "Deleted record");

        Ok(removed)
    }

    fn next_id(&self) -> Result<u64> {
        self.high_water
            .checked_add(1)
            .ok_or_else(|| StoreError::Internal(format!("{} id sequence exhausted", T::kind())))
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(StoreError::NotFound { kind: T::kind(), id })
    }
}

impl RecordStore<Post> {
    /// Add one like to a post and refresh `updated_at`
    pub fn increment_likes(&mut self, id: u64) -> Result<Post> {
        let index = self.position(id)?;
        let post = &mut self.records[index];

        post.likes = post.likes.saturating_add(1);
        post.updated_at = models::advance(post.updated_at);
        debug!(id, likes = post.likes, "increment_likes: liked");

        Ok(post.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPost, NewUser, PostPatch, User, UserPatch};

    fn post_store() -> RecordStore<Post> {
        let mut store = RecordStore::new();
        store.insert(NewPost::new("First", "one")).unwrap();
        store.insert(NewPost::new("Second", "two")).unwrap();
        store.insert(NewPost::new("Third", "three")).unwrap();
        store
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let store = post_store();
        let ids: Vec<u64> = store.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_ids_never_reused_after_delete() {
        let mut store = post_store();
        store.delete(3).unwrap();
        store.delete(1).unwrap();

        let post = store.insert(NewPost::new("Fourth", "four")).unwrap();
        assert_eq!(post.id, 4);

        store.delete(4).unwrap();
        store.delete(2).unwrap();
        assert!(store.is_empty());

        let post = store.insert(NewPost::new("Fifth", "five")).unwrap();
        assert_eq!(post.id, 5);
    }

    #[test]
    fn test_insert_sets_both_timestamps() {
        let mut store: RecordStore<Post> = RecordStore::new();
        let post = store.insert(NewPost::new("t", "c")).unwrap();
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_insert_validation_leaves_store_unchanged() {
        let mut store = post_store();
        let err = store.insert(NewPost::new("", "content")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.len(), 3);

        // A failed insert does not consume an id
        let post = store.insert(NewPost::new("ok", "ok")).unwrap();
        assert_eq!(post.id, 4);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let mut store: RecordStore<User> = RecordStore::new();
        store.insert(NewUser::new("A", "a@x.com")).unwrap();

        let err = store.insert(NewUser::new("B", "a@x.com")).unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateKey {
                field: "email",
                value: "a@x.com".to_string()
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_may_introduce_duplicate_email() {
        let mut store: RecordStore<User> = RecordStore::new();
        store.insert(NewUser::new("A", "a@x.com")).unwrap();
        store.insert(NewUser::new("B", "b@x.com")).unwrap();

        let patch = UserPatch {
            email: Some("a@x.com".to_string()),
            ..Default::default()
        };
        let updated = store.update(2, patch).unwrap();
        assert_eq!(updated.email, "a@x.com");
    }

    #[test]
    fn test_find_by_id() {
        let store = post_store();
        assert_eq!(store.find_by_id(2).unwrap().title, "Second");
        assert_eq!(
            store.find_by_id(42).unwrap_err(),
            StoreError::NotFound { kind: "post", id: 42 }
        );
    }

    #[test]
    fn test_delete_then_find_is_not_found() {
        let mut store = post_store();
        let removed = store.delete(2).unwrap();
        assert_eq!(removed.title, "Second");

        assert!(matches!(store.find_by_id(2), Err(StoreError::NotFound { .. })));
        let titles: Vec<&str> = store.list().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Third"]);
    }

    #[test]
    fn test_delete_absent_is_not_found() {
        let mut store = post_store();
        store.delete(1).unwrap();
        assert!(matches!(store.delete(1), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_empty_update_only_advances_updated_at() {
        let mut store = post_store();
        let before = store.find_by_id(1).unwrap().clone();

        let after = store.update(1, PostPatch::default()).unwrap();
        assert!(after.updated_at > before.updated_at);

        let mut expected = before.clone();
        expected.updated_at = after.updated_at;
        assert_eq!(after, expected);
    }

    #[test]
    fn test_update_merges_supplied_fields() {
        let mut store = post_store();
        let patch = PostPatch {
            title: Some("Renamed".to_string()),
            tags: Some("solo".into()),
            ..Default::default()
        };

        let updated = store.update(1, patch).unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.content, "one");
        assert_eq!(updated.tags, vec!["solo".to_string()]);
        assert_eq!(store.find_by_id(1).unwrap(), &updated);
    }

    #[test]
    fn test_update_missing_leaves_collection_unchanged() {
        let mut store = post_store();
        let before = store.list().to_vec();

        let patch = PostPatch {
            title: Some("x".to_string()),
            ..Default::default()
        };
        assert!(matches!(store.update(99, patch), Err(StoreError::NotFound { .. })));
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn test_increment_likes_n_times() {
        let mut store = post_store();
        let start = store.find_by_id(2).unwrap().clone();

        let mut last = start.clone();
        for _ in 0..5 {
            let liked = store.increment_likes(2).unwrap();
            assert!(liked.updated_at > last.updated_at);
            last = liked;
        }
        assert_eq!(last.likes, start.likes + 5);
        assert!(matches!(store.increment_likes(77), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_with_records_primes_id_sequence() {
        let posts = post_store().list().to_vec();
        let mut store = RecordStore::with_records(vec![posts[2].clone(), posts[0].clone()]).unwrap();

        let post = store.insert(NewPost::new("Next", "n")).unwrap();
        assert_eq!(post.id, 4);
        let ids: Vec<u64> = store.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 4]);
    }

    #[test]
    fn test_with_records_rejects_bad_ids() {
        let posts = post_store().list().to_vec();
        assert!(RecordStore::with_records(vec![posts[0].clone(), posts[0].clone()]).is_err());

        let mut zero = posts[0].clone();
        zero.id = 0;
        assert!(RecordStore::with_records(vec![zero]).is_err());
    }

    #[test]
    fn test_with_records_from_respects_floor() {
        let posts = post_store().list().to_vec();

        let mut store = RecordStore::with_records_from(vec![posts[0].clone()], 3).unwrap();
        assert_eq!(store.high_water(), 3);
        let post = store.insert(NewPost::new("Next", "n")).unwrap();
        assert_eq!(post.id, 4);

        // A stale floor below the largest id is ignored
        let store = RecordStore::with_records_from(posts, 1).unwrap();
        assert_eq!(store.high_water(), 3);
    }

    #[test]
    fn test_with_records_rejects_duplicate_unique_key() {
        let mut users: RecordStore<User> = RecordStore::new();
        let first = users.insert(NewUser::new("Ann", "ann@example.com")).unwrap();
        let mut second = users.insert(NewUser::new("Bob", "bob@example.com")).unwrap();
        second.email = first.email.clone();

        let err = RecordStore::with_records(vec![first, second]).unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateKey {
                field: "email",
                value: "ann@example.com".to_string()
            }
        );
    }
}
