use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::models::{Id, Post, User};

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user(&self, name: &str) -> RepoResult<Option<User>>;
    /// Insert a new user; `Conflict` when the name is taken.
    async fn create_user(&self, user: User) -> RepoResult<()>;
}

/// Membership set of currently-valid refresh tokens.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn insert_refresh_token(&self, token: String) -> RepoResult<()>;
    async fn has_refresh_token(&self, token: &str) -> RepoResult<bool>;
    /// Remove exactly one matching entry; `NotFound` when absent.
    async fn remove_refresh_token(&self, token: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn list_posts(&self) -> RepoResult<Vec<Post>>;
    async fn list_posts_by(&self, author: &str) -> RepoResult<Vec<Post>>;
    async fn get_post(&self, id: Id) -> RepoResult<Post>;
    /// Swap the matched post for `replacement` wholesale, keeping its slot in
    /// the collection. Returns the stored state.
    async fn replace_post(&self, id: Id, replacement: Post) -> RepoResult<Post>;
}

pub trait Repo: UserRepo + SessionRepo + PostRepo {}

impl<T> Repo for T where T: UserRepo + SessionRepo + PostRepo {}

// Vectors, not maps: list endpoints promise collection order.
#[derive(Default)]
struct State {
    users: Vec<User>,
    refresh_tokens: Vec<String>,
    posts: Vec<Post>,
}

/// Volatile store; everything resets on restart.
#[derive(Clone, Default)]
pub struct InMemRepo {
    state: Arc<RwLock<State>>,
}

impl InMemRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-existing post collection.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        let repo = Self::new();
        repo.state.write().unwrap().posts = posts;
        repo
    }
}

#[async_trait]
impl UserRepo for InMemRepo {
    async fn find_user(&self, name: &str) -> RepoResult<Option<User>> {
        let s = self.state.read().unwrap();
        Ok(s.users.iter().find(|u| u.name == name).cloned())
    }

    async fn create_user(&self, user: User) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        if s.users.iter().any(|u| u.name == user.name) {
            return Err(RepoError::Conflict);
        }
        s.users.push(user);
        Ok(())
    }
}

#[async_trait]
impl SessionRepo for InMemRepo {
    async fn insert_refresh_token(&self, token: String) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        s.refresh_tokens.push(token);
        Ok(())
    }

    async fn has_refresh_token(&self, token: &str) -> RepoResult<bool> {
        let s = self.state.read().unwrap();
        Ok(s.refresh_tokens.iter().any(|t| t == token))
    }

    async fn remove_refresh_token(&self, token: &str) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        match s.refresh_tokens.iter().position(|t| t == token) {
            Some(i) => {
                s.refresh_tokens.remove(i);
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepo for InMemRepo {
    async fn list_posts(&self) -> RepoResult<Vec<Post>> {
        let s = self.state.read().unwrap();
        Ok(s.posts.clone())
    }

    async fn list_posts_by(&self, author: &str) -> RepoResult<Vec<Post>> {
        let s = self.state.read().unwrap();
        Ok(s
            .posts
            .iter()
            .filter(|p| p.author.as_deref() == Some(author))
            .cloned()
            .collect())
    }

    async fn get_post(&self, id: Id) -> RepoResult<Post> {
        let s = self.state.read().unwrap();
        s.posts
            .iter()
            .find(|p| p.id == Some(id))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn replace_post(&self, id: Id, replacement: Post) -> RepoResult<Post> {
        let mut s = self.state.write().unwrap();
        let slot = s
            .posts
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or(RepoError::NotFound)?;
        *slot = replacement;
        Ok(slot.clone())
    }
}
