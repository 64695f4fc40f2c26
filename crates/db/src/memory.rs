//! In-process [`ForumStore`] backed by an id-indexed arena.
//!
//! Every mutation runs under one write lock, which also serializes post
//! appends. Cascading deletes walk the arena's child indexes explicitly.

use std::collections::{BTreeMap, HashMap};

use agora_core::error::CoreError;
use agora_core::limits::DELETED_POST_CONTENT;
use agora_core::moderation::{ensure_may_post, Outcome, Standing};
use agora_core::pagination::{
    check_page_number, distinct_authors, place_post, LastPage, Placement,
};
use agora_core::types::{DbId, UserId};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::models::forum::{CreateForum, Forum};
use crate::models::page::Page;
use crate::models::post::{Post, PostInThread, PostView};
use crate::models::thread::{CreateThread, PageView, Thread, ThreadSummary};
use crate::models::user::{CreateUser, User};
use crate::store::{ForumStore, MonotonicClock, StandingChange};

/// Per-table id sequence, starting at 1 like `BIGSERIAL`.
#[derive(Debug, Default)]
struct Sequence(DbId);

impl Sequence {
    fn next(&mut self) -> DbId {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
struct Arena {
    forum_ids: Sequence,
    thread_ids: Sequence,
    page_ids: Sequence,
    post_ids: Sequence,

    forums: BTreeMap<DbId, Forum>,
    threads: BTreeMap<DbId, Thread>,
    pages: HashMap<DbId, Page>,
    posts: HashMap<DbId, Post>,
    users: HashMap<UserId, User>,

    /// Page ids of each thread, index `n` holding page number `n + 1`.
    thread_pages: HashMap<DbId, Vec<DbId>>,
    /// Post ids of each page in creation order.
    page_posts: HashMap<DbId, Vec<DbId>>,
}

impl Arena {
    fn summary(&self, thread: &Thread) -> ThreadSummary {
        let pages = self.thread_pages.get(&thread.id).map_or(0, Vec::len);
        ThreadSummary::new(thread.clone(), pages as i64)
    }

    fn last_page(&self, thread_id: DbId) -> Option<(DbId, LastPage)> {
        let pages = self.thread_pages.get(&thread_id)?;
        let page_id = *pages.last()?;
        let post_count = self.page_posts.get(&page_id).map_or(0, Vec::len);
        Some((
            page_id,
            LastPage {
                page_number: pages.len() as i32,
                post_count: post_count as i64,
            },
        ))
    }

    fn open_page(&mut self, thread_id: DbId, page_number: i32) -> DbId {
        let id = self.page_ids.next();
        self.pages.insert(
            id,
            Page {
                id,
                thread_id,
                page_number,
            },
        );
        self.thread_pages.entry(thread_id).or_default().push(id);
        tracing::info!(thread_id, page_number, "Created page");
        id
    }

    fn insert_post(
        &mut self,
        page_id: DbId,
        user_id: &str,
        content: &str,
        clock: &MonotonicClock,
    ) -> Post {
        let id = self.post_ids.next();
        let post = Post {
            id,
            user_id: user_id.to_string(),
            page_id,
            content: content.to_string(),
            created_at: clock.now(),
            edited_at: None,
        };
        self.posts.insert(id, post.clone());
        self.page_posts.entry(page_id).or_default().push(id);
        post
    }

    fn author_standing(&self, author_id: &str) -> Option<Standing> {
        self.users.get(author_id).map(User::standing)
    }

    /// Remove a thread with its pages and posts. Returns (pages, posts) removed.
    fn remove_thread(&mut self, thread_id: DbId) -> Option<(usize, usize)> {
        self.threads.remove(&thread_id)?;
        let page_ids = self.thread_pages.remove(&thread_id).unwrap_or_default();
        let mut posts = 0;
        for page_id in &page_ids {
            self.pages.remove(page_id);
            for post_id in self.page_posts.remove(page_id).unwrap_or_default() {
                self.posts.remove(&post_id);
                posts += 1;
            }
        }
        Some((page_ids.len(), posts))
    }

    fn rewrite_post(&mut self, id: DbId, content: &str, clock: &MonotonicClock) -> Option<Post> {
        let post = self.posts.get_mut(&id)?;
        post.content = content.to_string();
        post.edited_at = Some(clock.now());
        Some(post.clone())
    }
}

/// A [`ForumStore`] that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    arena: RwLock<Arena>,
    clock: MonotonicClock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForumStore for MemoryStore {
    async fn list_forums(&self) -> StoreResult<Vec<Forum>> {
        let arena = self.arena.read().await;
        Ok(arena.forums.values().cloned().collect())
    }

    async fn find_forum(&self, id: DbId) -> StoreResult<Option<Forum>> {
        let arena = self.arena.read().await;
        Ok(arena.forums.get(&id).cloned())
    }

    async fn create_forum(&self, input: &CreateForum) -> StoreResult<Forum> {
        let mut arena = self.arena.write().await;
        if arena.forums.values().any(|f| f.name == input.name) {
            return Err(CoreError::Conflict(
                "Duplicate value violates unique constraint: uq_forums_name".into(),
            )
            .into());
        }

        let id = arena.forum_ids.next();
        let forum = Forum {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
        };
        arena.forums.insert(id, forum.clone());
        tracing::info!(forum_id = id, name = %forum.name, "Created forum");
        Ok(forum)
    }

    async fn delete_forum(&self, id: DbId) -> StoreResult<bool> {
        let mut arena = self.arena.write().await;
        if arena.forums.remove(&id).is_none() {
            return Ok(false);
        }

        let thread_ids: Vec<DbId> = arena
            .threads
            .values()
            .filter(|t| t.forum_id == id)
            .map(|t| t.id)
            .collect();
        let threads = thread_ids.len();
        for thread_id in thread_ids {
            arena.remove_thread(thread_id);
        }
        tracing::info!(forum_id = id, threads, "Deleted forum");
        Ok(true)
    }

    async fn list_threads(&self, forum_id: DbId) -> StoreResult<Vec<ThreadSummary>> {
        let arena = self.arena.read().await;
        Ok(arena
            .threads
            .values()
            .filter(|t| t.forum_id == forum_id)
            .map(|t| arena.summary(t))
            .collect())
    }

    async fn thread_summary(&self, id: DbId) -> StoreResult<Option<ThreadSummary>> {
        let arena = self.arena.read().await;
        Ok(arena.threads.get(&id).map(|t| arena.summary(t)))
    }

    async fn create_thread(
        &self,
        forum_id: DbId,
        author_id: &str,
        input: &CreateThread,
    ) -> StoreResult<Thread> {
        let mut arena = self.arena.write().await;
        if !arena.forums.contains_key(&forum_id) {
            return Err(CoreError::not_found("Forum", forum_id).into());
        }

        let now = self.clock.now();
        ensure_may_post(false, arena.author_standing(author_id).as_ref(), now)?;

        let id = arena.thread_ids.next();
        let thread = Thread {
            id,
            forum_id,
            user_id: author_id.to_string(),
            title: input.title.clone(),
            created_at: now,
            locked: false,
        };
        arena.threads.insert(id, thread.clone());
        let page_id = arena.open_page(id, 1);
        let post = arena.insert_post(page_id, author_id, &input.content, &self.clock);

        tracing::info!(forum_id, thread_id = id, post_id = post.id, "Created thread");
        Ok(thread)
    }

    async fn set_thread_locked(
        &self,
        id: DbId,
        locked: bool,
    ) -> StoreResult<Option<ThreadSummary>> {
        let mut arena = self.arena.write().await;
        let Some(thread) = arena.threads.get_mut(&id) else {
            return Ok(None);
        };
        thread.locked = locked;
        let thread = thread.clone();
        tracing::info!(thread_id = id, locked, "Changed thread lock");
        Ok(Some(arena.summary(&thread)))
    }

    async fn delete_thread(&self, id: DbId) -> StoreResult<bool> {
        let mut arena = self.arena.write().await;
        match arena.remove_thread(id) {
            Some((pages, posts)) => {
                tracing::info!(thread_id = id, pages, posts, "Deleted thread");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn append_post(
        &self,
        thread_id: DbId,
        author_id: &str,
        content: &str,
    ) -> StoreResult<Post> {
        let mut arena = self.arena.write().await;
        let locked = arena
            .threads
            .get(&thread_id)
            .map(|t| t.locked)
            .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;

        ensure_may_post(
            locked,
            arena.author_standing(author_id).as_ref(),
            self.clock.now(),
        )?;

        let last = arena.last_page(thread_id);
        let page_id = match (place_post(last.map(|(_, fill)| fill)), last) {
            (Placement::Reuse { .. }, Some((page_id, _))) => page_id,
            (placement, _) => arena.open_page(thread_id, placement.page_number()),
        };

        let post = arena.insert_post(page_id, author_id, content, &self.clock);
        tracing::debug!(thread_id, post_id = post.id, page_id, "Appended post");
        Ok(post)
    }

    async fn page_view(&self, thread_id: DbId, page_number: i64) -> StoreResult<PageView> {
        let arena = self.arena.read().await;
        let thread = arena
            .threads
            .get(&thread_id)
            .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;

        let page_ids = arena
            .thread_pages
            .get(&thread_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let index = check_page_number(thread_id, page_number, page_ids.len())?;
        let page_id = page_ids[index];

        let mut posts: Vec<&Post> = arena
            .page_posts
            .get(&page_id)
            .into_iter()
            .flatten()
            .filter_map(|id| arena.posts.get(id))
            .collect();
        posts.sort_by_key(|p| (p.created_at, p.id));

        let authors = distinct_authors(posts.iter().map(|p| p.user_id.as_str()));
        let names: HashMap<&str, &str> = authors
            .iter()
            .filter_map(|id| arena.users.get(id))
            .map(|u| (u.id.as_str(), u.name.as_str()))
            .collect();

        let posts = posts
            .into_iter()
            .map(|post| {
                let name = names.get(post.user_id.as_str()).map(|n| n.to_string());
                PostView::new(post.clone(), name)
            })
            .collect();

        Ok(PageView::new(thread.clone(), (index + 1) as i32, posts))
    }

    async fn find_post(&self, id: DbId) -> StoreResult<Option<PostInThread>> {
        let arena = self.arena.read().await;
        Ok(arena.posts.get(&id).and_then(|post| {
            let page = arena.pages.get(&post.page_id)?;
            Some(PostInThread {
                post: post.clone(),
                thread_id: page.thread_id,
            })
        }))
    }

    async fn edit_post(&self, id: DbId, content: &str) -> StoreResult<Option<Post>> {
        let mut arena = self.arena.write().await;
        let post = arena.rewrite_post(id, content, &self.clock);
        if post.is_some() {
            tracing::info!(post_id = id, "Edited post");
        }
        Ok(post)
    }

    async fn soft_delete_post(&self, id: DbId) -> StoreResult<Option<Post>> {
        let mut arena = self.arena.write().await;
        let post = arena.rewrite_post(id, DELETED_POST_CONTENT, &self.clock);
        if post.is_some() {
            tracing::info!(post_id = id, "Soft-deleted post");
        }
        Ok(post)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let arena = self.arena.read().await;
        let mut users: Vec<User> = arena.users.values().cloned().collect();
        users.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        let arena = self.arena.read().await;
        Ok(arena.users.get(id).cloned())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut arena = self.arena.write().await;
        if arena.users.contains_key(&input.user_id) {
            return Err(CoreError::Conflict(
                "Duplicate value violates unique constraint: users_pkey".into(),
            )
            .into());
        }

        let user = User {
            id: input.user_id.clone(),
            name: input.name.clone(),
            role: input.role,
            status: Default::default(),
            joined_at: self.clock.now(),
            probation_start_date: None,
            probation_end_date: None,
        };
        arena.users.insert(user.id.clone(), user.clone());
        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
        Ok(user)
    }

    async fn moderate(
        &self,
        id: &str,
        change: StandingChange,
    ) -> StoreResult<Option<(User, Outcome)>> {
        let mut arena = self.arena.write().await;
        let Some(user) = arena.users.get_mut(id) else {
            return Ok(None);
        };

        let mut standing = user.standing();
        let outcome = change(&mut standing);
        if outcome.applied() {
            user.apply_standing(&standing);
            tracing::info!(user_id = %id, role = %user.role, status = %user.status, "Updated standing");
        }
        Ok(Some((user.clone(), outcome)))
    }

    async fn healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agora_core::pagination::PAGE_CAPACITY;
    use agora_core::roles::Role;
    use agora_core::status::UserStatus;
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::StoreError;

    // ---------------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------------

    async fn store_with_user(user_id: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_user(&CreateUser {
                user_id: user_id.to_string(),
                name: format!("{user_id}-name"),
                role: Role::User,
            })
            .await
            .unwrap();
        store
    }

    async fn forum(store: &MemoryStore, name: &str) -> Forum {
        store
            .create_forum(&CreateForum {
                name: name.to_string(),
                description: "A place".to_string(),
            })
            .await
            .unwrap()
    }

    async fn thread(store: &MemoryStore, forum_id: DbId, author: &str) -> Thread {
        store
            .create_thread(
                forum_id,
                author,
                &CreateThread {
                    title: "Hello".to_string(),
                    content: "First!".to_string(),
                },
            )
            .await
            .unwrap()
    }

    // ---------------------------------------------------------------------------
    // Forums
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn duplicate_forum_name_conflicts() {
        let store = MemoryStore::new();
        forum(&store, "General").await;

        let err = store
            .create_forum(&CreateForum {
                name: "General".to_string(),
                description: "again".to_string(),
            })
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));

        forum(&store, "Other").await;
        assert_eq!(store.list_forums().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn deleting_a_forum_cascades() {
        let store = store_with_user("alice").await;
        let f = forum(&store, "General").await;
        let t = thread(&store, f.id, "alice").await;
        let post = store.append_post(t.id, "alice", "reply").await.unwrap();

        assert!(store.delete_forum(f.id).await.unwrap());
        assert!(store.thread_summary(t.id).await.unwrap().is_none());
        assert!(store.find_post(post.id).await.unwrap().is_none());
        assert!(!store.delete_forum(f.id).await.unwrap());
    }

    // ---------------------------------------------------------------------------
    // Threads and pagination
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn new_thread_has_one_page_with_the_opening_post() {
        let store = store_with_user("alice").await;
        let f = forum(&store, "General").await;
        let t = thread(&store, f.id, "alice").await;

        let summary = store.thread_summary(t.id).await.unwrap().unwrap();
        assert_eq!(summary.pages, 1);

        let page = store.page_view(t.id, 1).await.unwrap();
        assert_eq!(page.page_number, 1);
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].content, "First!");
        assert_eq!(page.posts[0].user_name.as_deref(), Some("alice-name"));
    }

    #[tokio::test]
    async fn forty_first_post_lands_on_page_two() {
        let store = store_with_user("alice").await;
        let f = forum(&store, "General").await;
        let t = thread(&store, f.id, "alice").await;

        for i in 1..PAGE_CAPACITY {
            store.append_post(t.id, "alice", &format!("reply {i}")).await.unwrap();
        }
        assert_eq!(store.thread_summary(t.id).await.unwrap().unwrap().pages, 1);

        store.append_post(t.id, "alice", "overflow").await.unwrap();
        assert_eq!(store.thread_summary(t.id).await.unwrap().unwrap().pages, 2);

        let first = store.page_view(t.id, 1).await.unwrap();
        assert_eq!(first.posts.len() as i64, PAGE_CAPACITY);
        let second = store.page_view(t.id, 2).await.unwrap();
        assert_eq!(second.posts.len(), 1);
        assert_eq!(second.posts[0].content, "overflow");
    }

    #[tokio::test]
    async fn posts_are_ordered_by_creation() {
        let store = store_with_user("alice").await;
        let f = forum(&store, "General").await;
        let t = thread(&store, f.id, "alice").await;
        for i in 0..5 {
            store.append_post(t.id, "alice", &format!("{i}")).await.unwrap();
        }

        let page = store.page_view(t.id, 1).await.unwrap();
        let created: Vec<_> = page.posts.iter().map(|p| p.created_at).collect();
        assert!(created.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn page_out_of_range_is_not_found() {
        let store = store_with_user("alice").await;
        let f = forum(&store, "General").await;
        let t = thread(&store, f.id, "alice").await;

        assert_matches!(
            store.page_view(t.id, 2).await,
            Err(StoreError::Core(CoreError::NotFound { .. }))
        );
        assert_matches!(
            store.page_view(t.id, 0).await,
            Err(StoreError::Core(CoreError::NotFound { .. }))
        );
        assert_matches!(
            store.page_view(999, 1).await,
            Err(StoreError::Core(CoreError::NotFound { entity: "Thread", .. }))
        );
    }

    // ---------------------------------------------------------------------------
    // Posting rules
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn locked_thread_rejects_posts() {
        let store = store_with_user("alice").await;
        let f = forum(&store, "General").await;
        let t = thread(&store, f.id, "alice").await;

        let summary = store.set_thread_locked(t.id, true).await.unwrap().unwrap();
        assert!(summary.locked);
        assert_matches!(
            store.append_post(t.id, "alice", "nope").await,
            Err(StoreError::Core(CoreError::Unprocessable(_)))
        );

        store.set_thread_locked(t.id, false).await.unwrap();
        assert!(store.append_post(t.id, "alice", "yes").await.is_ok());
    }

    #[tokio::test]
    async fn unregistered_and_banned_authors_cannot_post() {
        let store = store_with_user("alice").await;
        let f = forum(&store, "General").await;
        let t = thread(&store, f.id, "alice").await;

        assert_matches!(
            store.append_post(t.id, "ghost", "boo").await,
            Err(StoreError::Core(CoreError::Forbidden(_)))
        );

        let ban: StandingChange = Box::new(|s: &mut Standing| s.set_status(UserStatus::Banned));
        store.moderate("alice", ban).await.unwrap();

        assert_matches!(
            store.append_post(t.id, "alice", "hi").await,
            Err(StoreError::Core(CoreError::Forbidden(_)))
        );
    }

    // ---------------------------------------------------------------------------
    // Posts
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn soft_delete_keeps_the_row() {
        let store = store_with_user("alice").await;
        let f = forum(&store, "General").await;
        let t = thread(&store, f.id, "alice").await;
        let post = store.append_post(t.id, "alice", "regret").await.unwrap();

        let deleted = store.soft_delete_post(post.id).await.unwrap().unwrap();
        assert_eq!(deleted.content, DELETED_POST_CONTENT);
        assert!(deleted.edited_at.is_some());

        let found = store.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(found.thread_id, t.id);
        assert_eq!(found.post.content, DELETED_POST_CONTENT);
        assert_eq!(store.thread_summary(t.id).await.unwrap().unwrap().pages, 1);
    }

    #[tokio::test]
    async fn editing_a_missing_post_returns_none() {
        let store = MemoryStore::new();
        assert!(store.edit_post(42, "x").await.unwrap().is_none());
        assert!(store.soft_delete_post(42).await.unwrap().is_none());
    }

    // ---------------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn duplicate_user_id_conflicts() {
        let store = store_with_user("alice").await;
        let err = store
            .create_user(&CreateUser {
                user_id: "alice".to_string(),
                name: "Other".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn applied_moderation_is_persisted() {
        let store = store_with_user("alice").await;
        let now = chrono::Utc::now();

        let change: StandingChange = Box::new(move |s: &mut Standing| {
            s.set_role(Role::Moderator)
                .or(s.set_probation("1 WEEK", now))
        });
        let (user, outcome) = store
            .moderate("alice", change)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(user.role, Role::Moderator);
        assert!(user.probation_end_date.is_some());

        let stored = store.find_user("alice").await.unwrap().unwrap();
        assert_eq!(stored, user);

        assert!(store
            .moderate("nobody", Box::new(|s: &mut Standing| s.set_role(Role::Admin)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn failed_moderation_changes_nothing() {
        let store = store_with_user("alice").await;
        let before = store.find_user("alice").await.unwrap().unwrap();

        let (user, outcome) = store
            .moderate("alice", Box::new(|s: &mut Standing| s.request_role("OWNER")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(user, before);
    }

    // ---------------------------------------------------------------------------
    // Concurrency
    // ---------------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_appends_fill_pages_exactly() {
        let store = Arc::new(store_with_user("alice").await);
        let f = forum(&store, "General").await;
        let thread_id = thread(&store, f.id, "alice").await.id;

        // 199 replies plus the opening post make five full pages.
        let handles: Vec<_> = (0..199)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.append_post(thread_id, "alice", &format!("reply {i}")).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let summary = store.thread_summary(thread_id).await.unwrap().unwrap();
        assert_eq!(summary.pages, 5);

        let mut counts = Vec::new();
        for page_number in 1..=summary.pages {
            let page = store.page_view(thread_id, page_number).await.unwrap();
            assert_eq!(i64::from(page.page_number), page_number);
            counts.push(page.posts.len() as i64);
        }
        assert_eq!(counts, vec![PAGE_CAPACITY; 5]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_moderation_keeps_both_changes() {
        let store = Arc::new(store_with_user("alice").await);

        let promote = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .moderate("alice", Box::new(|s: &mut Standing| s.set_role(Role::Moderator)))
                    .await
            })
        };
        let ban = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .moderate("alice", Box::new(|s: &mut Standing| s.set_status(UserStatus::Banned)))
                    .await
            })
        };
        promote.await.unwrap().unwrap();
        ban.await.unwrap().unwrap();

        let user = store.find_user("alice").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Moderator);
        assert_eq!(user.status, UserStatus::Banned);
    }
}
