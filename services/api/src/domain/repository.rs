#![allow(async_fn_in_trait)]

use uuid::Uuid;

use hub_domain::pagination::{PageRequest, Paginated};
use hub_domain::resource::ResourceStatus;

use crate::domain::types::{
    AuthCode, BatchTask, Category, CreditTransaction, Enrichment, FavoriteEntry, LinkCheck, Order,
    PaymentOutcome, RatingSummary, Resource, ResourceChanges, ResourceFilter, ResourceInput, Tag,
    UnlockOutcome, User,
};
use crate::error::ApiServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiServiceError>;

    /// Create an account. A positive `signup_bonus` is credited together with
    /// its ledger row.
    async fn create(
        &self,
        email: &str,
        name: &str,
        signup_bonus: i64,
    ) -> Result<User, ApiServiceError>;

    /// Returns `None` when the user does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Option<User>, ApiServiceError>;

    /// Case-insensitive match on email or name.
    async fn search(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<User>, ApiServiceError>;
}

/// Repository for one-time sign-in codes.
pub trait AuthCodeRepository: Send + Sync {
    /// Count unexpired, unused codes for an email.
    async fn count_active(&self, email: &str) -> Result<u64, ApiServiceError>;
    async fn create(&self, code: &AuthCode) -> Result<(), ApiServiceError>;
    async fn find_valid(&self, email: &str, code: &str)
    -> Result<Option<AuthCode>, ApiServiceError>;

    /// Mark a code used. Returns `false` if it was consumed concurrently.
    async fn mark_used(&self, id: Uuid) -> Result<bool, ApiServiceError>;
}

/// Repository for the category hierarchy.
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by `sort_order`, then name.
    async fn list(&self) -> Result<Vec<Category>, ApiServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<Category>, ApiServiceError>;

    /// Fails with `Duplicate("category")` when the name is taken.
    async fn create(&self, category: &Category) -> Result<(), ApiServiceError>;
    async fn update(&self, category: &Category) -> Result<(), ApiServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiServiceError>;
    async fn count_children(&self, id: Uuid) -> Result<u64, ApiServiceError>;
    async fn count_resources(&self, id: Uuid) -> Result<u64, ApiServiceError>;
}

/// Repository for tags.
pub trait TagRepository: Send + Sync {
    /// Ordered by usage count, most used first.
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<Tag>, ApiServiceError>;

    /// Fails with `Duplicate("tag")` when the name is taken.
    async fn create(&self, name: &str) -> Result<Tag, ApiServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ApiServiceError>;
}

/// Repository for resources and their tag links.
pub trait ResourceRepository: Send + Sync {
    /// Approved resources only, pinned first.
    async fn list_public(
        &self,
        filter: &ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError>;

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError>;

    /// Moderation queue. `None` lists every status.
    async fn list_by_status(
        &self,
        status: Option<ResourceStatus>,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError>;

    async fn find(&self, id: Uuid) -> Result<Option<Resource>, ApiServiceError>;

    /// Insert a pending resource, upserting its tags and bumping their usage.
    async fn create(
        &self,
        owner_id: Uuid,
        input: &ResourceInput,
    ) -> Result<Resource, ApiServiceError>;

    /// Apply changes. Tag usage counters follow the tag diff. Returns `None`
    /// when the resource is gone.
    async fn update(
        &self,
        id: Uuid,
        changes: &ResourceChanges,
    ) -> Result<Option<Resource>, ApiServiceError>;

    /// Delete a resource and decrement its tags' usage counters.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiServiceError>;

    async fn increment_view(&self, id: Uuid) -> Result<(), ApiServiceError>;
    async fn increment_visit(&self, id: Uuid) -> Result<(), ApiServiceError>;

    /// `UPDATE .. SET status = to WHERE id = ? AND status = from`.
    /// Returns `false` when the row no longer holds `from`.
    async fn set_status(
        &self,
        id: Uuid,
        from: ResourceStatus,
        to: ResourceStatus,
        reject_reason: Option<&str>,
    ) -> Result<bool, ApiServiceError>;

    /// `UPDATE .. SET is_top = new WHERE id = ? AND is_top = expected`.
    /// Returns `false` when another writer got there first.
    async fn set_top_if(
        &self,
        id: Uuid,
        expected: bool,
        new: bool,
    ) -> Result<bool, ApiServiceError>;

    async fn set_enrichment(
        &self,
        id: Uuid,
        summary: &str,
        score: i32,
    ) -> Result<(), ApiServiceError>;

    async fn has_unlocked(&self, user_id: Uuid, resource_id: Uuid)
    -> Result<bool, ApiServiceError>;
}

/// Repository for favorites.
pub trait FavoriteRepository: Send + Sync {
    /// Insert if absent. Returns `true` only when a row was created.
    async fn add(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError>;

    /// Returns `true` if a row was deleted.
    async fn remove(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError>;
    async fn exists(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError>;

    /// Newest first.
    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<FavoriteEntry>, ApiServiceError>;
}

/// Repository for ratings. Every write recomputes the resource aggregate.
pub trait RatingRepository: Send + Sync {
    async fn upsert(
        &self,
        user_id: Uuid,
        resource_id: Uuid,
        value: i16,
    ) -> Result<RatingSummary, ApiServiceError>;

    async fn remove(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError>;

    async fn summary(
        &self,
        resource_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<RatingSummary, ApiServiceError>;
}

/// Credit balances and the append-only ledger.
pub trait CreditRepository: Send + Sync {
    async fn balance(&self, user_id: Uuid) -> Result<Option<i64>, ApiServiceError>;

    /// Newest first.
    async fn transactions(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<CreditTransaction>, ApiServiceError>;

    /// Charge the buyer, credit the owner and record the unlock atomically.
    async fn unlock(
        &self,
        buyer_id: Uuid,
        resource: &Resource,
    ) -> Result<UnlockOutcome, ApiServiceError>;

    /// Signed admin adjustment. Returns the new balance, `None` when the
    /// balance would go negative.
    async fn adjust(
        &self,
        user_id: Uuid,
        amount: i64,
        note: &str,
    ) -> Result<Option<i64>, ApiServiceError>;
}

/// Repository for credit purchase orders.
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> Result<(), ApiServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<Order>, ApiServiceError>;

    /// Newest first.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Order>, ApiServiceError>;

    /// Move `pending → paid` and grant the order's credits in one transaction.
    async fn settle_paid(
        &self,
        order: &Order,
        trade_no: &str,
    ) -> Result<PaymentOutcome, ApiServiceError>;

    /// Move `pending → failed`. Returns `false` when the order was not pending.
    async fn mark_failed(&self, id: Uuid, trade_no: &str) -> Result<bool, ApiServiceError>;
}

/// Aggregate counters for the admin dashboard. Each is a single query so the
/// caller can issue them concurrently.
pub trait StatsRepository: Send + Sync {
    async fn count_users(&self) -> Result<u64, ApiServiceError>;
    async fn count_resources(&self, status: ResourceStatus) -> Result<u64, ApiServiceError>;
    async fn count_favorites(&self) -> Result<u64, ApiServiceError>;
    async fn count_ratings(&self) -> Result<u64, ApiServiceError>;
    async fn count_paid_orders(&self) -> Result<u64, ApiServiceError>;
    async fn revenue_cents(&self) -> Result<i64, ApiServiceError>;
    async fn credits_in_circulation(&self) -> Result<i64, ApiServiceError>;
}

/// Batch upload task state held in the cache.
pub trait BatchTaskStore: Send + Sync {
    async fn save(&self, task: &BatchTask) -> Result<(), ApiServiceError>;
    async fn load(&self, id: Uuid) -> Result<Option<BatchTask>, ApiServiceError>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BatchTask>, ApiServiceError>;

    /// Take the exclusive processing lease. `None` while another run holds it.
    async fn acquire_lease(&self, id: Uuid) -> Result<Option<Uuid>, ApiServiceError>;

    /// Drop the lease if `token` still owns it.
    async fn release_lease(&self, id: Uuid, token: Uuid) -> Result<(), ApiServiceError>;
}

/// Outbound transactional email.
pub trait Mailer: Send + Sync {
    async fn send_authcode(&self, email: &str, code: &str) -> Result<(), ApiServiceError>;
}

/// Link availability probe.
pub trait LinkChecker: Send + Sync {
    async fn check(&self, url: &str) -> LinkCheck;
}

/// LLM content enrichment.
pub trait Enricher: Send + Sync {
    async fn enrich(&self, resource: &Resource) -> Result<Enrichment, ApiServiceError>;
}

/// Payment gateway webhook signature check.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, body: &[u8], signature: &str) -> bool;
}
