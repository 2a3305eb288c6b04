//! sea-orm repositories.
//!
//! Reads go through [`read`], which retries connection-level failures per the
//! configured [`RetryPolicy`]. Writes run once; anything that must not be
//! replayed blindly is expressed as a conditional update instead.

use std::future::Future;

use sea_orm::DbErr;

use hub_core::retry::RetryPolicy;
use hub_core::sea_ext::is_transient;

use crate::error::{ApiServiceError, DbContext};

mod catalog;
mod credit;
mod engagement;
mod resource;
mod stats;
mod user;

pub use catalog::{DbCategoryRepository, DbTagRepository};
pub use credit::{DbCreditRepository, DbOrderRepository};
pub use engagement::{DbFavoriteRepository, DbRatingRepository};
pub use resource::DbResourceRepository;
pub use stats::DbStatsRepository;
pub use user::{DbAuthCodeRepository, DbUserRepository};

/// Run a read query with retry and classify the final error.
pub(crate) async fn read<T, F, Fut>(
    retry: &RetryPolicy,
    op: &'static str,
    query: F,
) -> Result<T, ApiServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    retry.run(op, is_transient, query).await.db_context(op)
}

/// `%term%` for ILIKE, with LIKE wildcards in the term escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
