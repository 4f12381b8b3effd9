//! PostgreSQL persistence adapter using Diesel with async pooling.
//!
//! - **Thin adapter**: the repository only translates between rows and domain
//!   types; article rules live in the domain.
//! - **Internal models**: `models` and `schema` are private to this module.
//! - **Errors**: pool and Diesel failures become `ArticleRepositoryError`.
//!
//! ```ignore
//! use articles_backend::outbound::persistence::{DbPool, DieselArticleRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/articles")).await?;
//! let repo = DieselArticleRepository::new(pool);
//! ```

mod diesel_article_repository;
mod models;
mod pool;
mod schema;

pub use diesel_article_repository::DieselArticleRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
