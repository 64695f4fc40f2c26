//! The persistence seam used by request handlers.

use std::sync::Mutex;

use agora_core::moderation::{Outcome, Standing};
use agora_core::pagination::next_timestamp;
use agora_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use chrono::SubsecRound;

use crate::error::StoreResult;
use crate::models::forum::{CreateForum, Forum};
use crate::models::post::{Post, PostInThread};
use crate::models::thread::{CreateThread, PageView, Thread, ThreadSummary};
use crate::models::user::{CreateUser, User};

/// A moderation transition run by [`ForumStore::moderate`].
pub type StandingChange = Box<dyn FnOnce(&mut Standing) -> Outcome + Send>;

/// Everything the API needs from storage.
///
/// Methods returning `Option` use `None` for "no such row"; rule violations
/// (locked thread, banned author, duplicate name) come back as
/// [`StoreError::Core`](crate::StoreError::Core).
#[async_trait]
pub trait ForumStore: Send + Sync {
    // --- Forums ---

    async fn list_forums(&self) -> StoreResult<Vec<Forum>>;

    async fn find_forum(&self, id: DbId) -> StoreResult<Option<Forum>>;

    /// Fails with `Conflict` if the name is taken.
    async fn create_forum(&self, input: &CreateForum) -> StoreResult<Forum>;

    /// Remove a forum and every thread, page and post under it.
    async fn delete_forum(&self, id: DbId) -> StoreResult<bool>;

    // --- Threads ---

    async fn list_threads(&self, forum_id: DbId) -> StoreResult<Vec<ThreadSummary>>;

    async fn thread_summary(&self, id: DbId) -> StoreResult<Option<ThreadSummary>>;

    /// Create a thread, its first page and its opening post as one unit.
    async fn create_thread(
        &self,
        forum_id: DbId,
        author_id: &str,
        input: &CreateThread,
    ) -> StoreResult<Thread>;

    async fn set_thread_locked(&self, id: DbId, locked: bool)
        -> StoreResult<Option<ThreadSummary>>;

    /// Remove a thread and every page and post under it.
    async fn delete_thread(&self, id: DbId) -> StoreResult<bool>;

    // --- Posts ---

    /// Append a post to the thread's last page, opening a new page when the
    /// last one is full. Serialized per thread.
    async fn append_post(&self, thread_id: DbId, author_id: &str, content: &str)
        -> StoreResult<Post>;

    /// One page of a thread with author names resolved. `NotFound` if the
    /// thread or the page number does not exist.
    async fn page_view(&self, thread_id: DbId, page_number: i64) -> StoreResult<PageView>;

    async fn find_post(&self, id: DbId) -> StoreResult<Option<PostInThread>>;

    async fn edit_post(&self, id: DbId, content: &str) -> StoreResult<Option<Post>>;

    /// Replace the content with the deletion sentinel. The row stays.
    async fn soft_delete_post(&self, id: DbId) -> StoreResult<Option<Post>>;

    // --- Users ---

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;

    /// Fails with `Conflict` if the id is taken.
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    /// Apply `change` to the user's current standing and persist the result
    /// if it reports `Success`, as one atomic read-modify-write. `None` if
    /// the user does not exist.
    async fn moderate(
        &self,
        id: &str,
        change: StandingChange,
    ) -> StoreResult<Option<(User, Outcome)>>;

    // --- Health ---

    async fn healthy(&self) -> bool;
}

/// Issues creation timestamps that strictly increase across one store.
///
/// Timestamps are truncated to microseconds, the precision of `TIMESTAMPTZ`.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<Timestamp>>,
}

impl MonotonicClock {
    pub fn now(&self) -> Timestamp {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = next_timestamp(*last, chrono::Utc::now().trunc_subsecs(6));
        *last = Some(next);
        next
    }
}
