//! PostgreSQL implementation of [`ForumStore`].

use std::collections::HashMap;

use agora_core::error::CoreError;
use agora_core::moderation::{ensure_may_post, Outcome};
use agora_core::pagination::{check_page_number, distinct_authors, place_post, Placement};
use agora_core::types::DbId;
use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::forum::{CreateForum, Forum};
use crate::models::post::{Post, PostInThread, PostView};
use crate::models::thread::{CreateThread, PageView, Thread, ThreadSummary};
use crate::models::user::{CreateUser, User};
use crate::repositories::{ForumRepo, PageRepo, PostRepo, ThreadRepo, UserRepo};
use crate::store::{ForumStore, MonotonicClock, StandingChange};
use crate::DbPool;

pub struct PgStore {
    pool: DbPool,
    clock: MonotonicClock,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            clock: MonotonicClock::default(),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ForumStore for PgStore {
    async fn list_forums(&self) -> StoreResult<Vec<Forum>> {
        Ok(ForumRepo::list(&self.pool).await?)
    }

    async fn find_forum(&self, id: DbId) -> StoreResult<Option<Forum>> {
        Ok(ForumRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_forum(&self, input: &CreateForum) -> StoreResult<Forum> {
        let forum = ForumRepo::create(&self.pool, input).await?;
        tracing::info!(forum_id = forum.id, name = %forum.name, "Created forum");
        Ok(forum)
    }

    async fn delete_forum(&self, id: DbId) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let posts = PostRepo::delete_by_forum(&mut *tx, id).await?;
        let pages = PageRepo::delete_by_forum(&mut *tx, id).await?;
        let threads = ThreadRepo::delete_by_forum(&mut *tx, id).await?;
        let deleted = ForumRepo::delete(&mut *tx, id).await?;
        tx.commit().await?;

        if deleted {
            tracing::info!(forum_id = id, threads, pages, posts, "Deleted forum");
        }
        Ok(deleted)
    }

    async fn list_threads(&self, forum_id: DbId) -> StoreResult<Vec<ThreadSummary>> {
        Ok(ThreadRepo::list_by_forum(&self.pool, forum_id).await?)
    }

    async fn thread_summary(&self, id: DbId) -> StoreResult<Option<ThreadSummary>> {
        Ok(ThreadRepo::summary(&self.pool, id).await?)
    }

    async fn create_thread(
        &self,
        forum_id: DbId,
        author_id: &str,
        input: &CreateThread,
    ) -> StoreResult<Thread> {
        let mut tx = self.pool.begin().await?;

        ForumRepo::find_by_id(&mut *tx, forum_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Forum", forum_id))?;

        let now = self.clock.now();
        let author = UserRepo::find_by_id(&mut *tx, author_id).await?;
        ensure_may_post(false, author.as_ref().map(User::standing).as_ref(), now)?;

        let thread = ThreadRepo::create(&mut *tx, forum_id, author_id, &input.title, now).await?;
        let page = PageRepo::create(&mut *tx, thread.id, 1).await?;
        let post = PostRepo::create(&mut *tx, page.id, author_id, &input.content, now).await?;
        tx.commit().await?;

        tracing::info!(
            forum_id,
            thread_id = thread.id,
            post_id = post.id,
            "Created thread"
        );
        Ok(thread)
    }

    async fn set_thread_locked(
        &self,
        id: DbId,
        locked: bool,
    ) -> StoreResult<Option<ThreadSummary>> {
        if !ThreadRepo::set_locked(&self.pool, id, locked).await? {
            return Ok(None);
        }
        tracing::info!(thread_id = id, locked, "Changed thread lock");
        Ok(ThreadRepo::summary(&self.pool, id).await?)
    }

    async fn delete_thread(&self, id: DbId) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let posts = PostRepo::delete_by_thread(&mut *tx, id).await?;
        let pages = PageRepo::delete_by_thread(&mut *tx, id).await?;
        let deleted = ThreadRepo::delete(&mut *tx, id).await?;
        tx.commit().await?;

        if deleted {
            tracing::info!(thread_id = id, pages, posts, "Deleted thread");
        }
        Ok(deleted)
    }

    async fn append_post(
        &self,
        thread_id: DbId,
        author_id: &str,
        content: &str,
    ) -> StoreResult<Post> {
        let mut tx = self.pool.begin().await?;

        let thread = ThreadRepo::lock_for_append(&mut *tx, thread_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;

        let now = self.clock.now();
        let author = UserRepo::find_by_id(&mut *tx, author_id).await?;
        ensure_may_post(
            thread.locked,
            author.as_ref().map(User::standing).as_ref(),
            now,
        )?;

        let last = PageRepo::last_with_fill(&mut *tx, thread_id).await?;
        let page_id = match (place_post(last.as_ref().map(|fill| fill.last_page())), last) {
            (Placement::Reuse { .. }, Some(fill)) => fill.id,
            (placement, _) => {
                let page = PageRepo::create(&mut *tx, thread_id, placement.page_number()).await?;
                tracing::info!(thread_id, page_number = page.page_number, "Created page");
                page.id
            }
        };

        let post = PostRepo::create(&mut *tx, page_id, author_id, content, now).await?;
        tx.commit().await?;

        tracing::debug!(thread_id, post_id = post.id, page_id, "Appended post");
        Ok(post)
    }

    async fn page_view(&self, thread_id: DbId, page_number: i64) -> StoreResult<PageView> {
        let thread = ThreadRepo::find_by_id(&self.pool, thread_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Thread", thread_id))?;

        let page_count = PageRepo::count_for_thread(&self.pool, thread_id).await?;
        let index = check_page_number(thread_id, page_number, page_count as usize)?;
        let number = (index + 1) as i32;

        let page = PageRepo::find_by_number(&self.pool, thread_id, number)
            .await?
            .ok_or_else(|| CoreError::not_found("Page", format!("{number} of thread {thread_id}")))?;

        let posts = PostRepo::list_by_page(&self.pool, page.id).await?;
        let authors = distinct_authors(posts.iter().map(|p| p.user_id.as_str()));
        let names: HashMap<String, String> = UserRepo::names(&self.pool, &authors)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let posts = posts
            .into_iter()
            .map(|post| {
                let name = names.get(&post.user_id).cloned();
                PostView::new(post, name)
            })
            .collect();

        Ok(PageView::new(thread, number, posts))
    }

    async fn find_post(&self, id: DbId) -> StoreResult<Option<PostInThread>> {
        Ok(PostRepo::find_with_thread(&self.pool, id).await?)
    }

    async fn edit_post(&self, id: DbId, content: &str) -> StoreResult<Option<Post>> {
        let post = PostRepo::update_content(&self.pool, id, content, self.clock.now()).await?;
        if post.is_some() {
            tracing::info!(post_id = id, "Edited post");
        }
        Ok(post)
    }

    async fn soft_delete_post(&self, id: DbId) -> StoreResult<Option<Post>> {
        let post = PostRepo::soft_delete(&self.pool, id, self.clock.now()).await?;
        if post.is_some() {
            tracing::info!(post_id = id, "Soft-deleted post");
        }
        Ok(post)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(UserRepo::list(&self.pool).await?)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let user = UserRepo::create(&self.pool, input).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
        Ok(user)
    }

    async fn moderate(
        &self,
        id: &str,
        change: StandingChange,
    ) -> StoreResult<Option<(User, Outcome)>> {
        let mut tx = self.pool.begin().await?;
        let Some(user) = UserRepo::lock_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };

        let mut standing = user.standing();
        let outcome = change(&mut standing);
        if !outcome.applied() {
            return Ok(Some((user, outcome)));
        }

        let user = UserRepo::update_standing(&mut *tx, id, &standing)
            .await?
            .ok_or_else(|| CoreError::not_found("User", id))?;
        tx.commit().await?;

        tracing::info!(user_id = %id, role = %user.role, status = %user.status, "Updated standing");
        Ok(Some((user, outcome)))
    }

    async fn healthy(&self) -> bool {
        crate::health_check(&self.pool).await.is_ok()
    }
}
