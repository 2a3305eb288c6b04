use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hub_domain::credit::CreditTxKind;
use hub_domain::order::OrderStatus;
use hub_domain::resource::{ResourceSort, ResourceStatus};

use crate::error::ApiServiceError;

/// Auth code length (decimal digits).
pub const AUTHCODE_LEN: usize = 6;

/// Auth code lifetime in seconds (10 minutes).
pub const AUTHCODE_TTL_SECS: i64 = 600;

/// Maximum unexpired, unused codes per email.
pub const MAX_ACTIVE_AUTHCODES: u64 = 5;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LEN: usize = 32;
pub const MAX_PRICE_CREDITS: i64 = 10_000;
pub const MAX_CATEGORY_NAME_LEN: usize = 50;
pub const MAX_USER_NAME_LEN: usize = 50;
pub const MAX_BATCH_ITEMS: usize = 50;

/// Batch task lifetime in the cache (24 hours).
pub const BATCH_TASK_TTL_SECS: u64 = 86_400;

/// Processing lease on a batch task. A crashed run frees the task after this.
pub const BATCH_LEASE_MS: u64 = 300_000;

// ── Accounts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AuthCode {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuthCode {
    pub fn is_valid(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its descendants, for `?tree=true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Nest a flat category list. Input order is kept among siblings; entries
/// whose parent is missing are treated as roots.
pub fn build_category_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    use std::collections::{HashMap, HashSet};

    let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for c in categories {
        let parent = c.parent_id.filter(|p| ids.contains(p) && *p != c.id);
        by_parent.entry(parent).or_default().push(c);
    }

    fn attach(
        parent: Option<Uuid>,
        by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>,
    ) -> Vec<CategoryNode> {
        let Some(children) = by_parent.remove(&parent) else {
            return Vec::new();
        };
        children
            .into_iter()
            .map(|category| {
                let children = attach(Some(category.id), by_parent);
                CategoryNode { category, children }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

/// Whether making `new_parent` the parent of `id` would create a cycle.
pub fn creates_cycle(categories: &[Category], id: Uuid, new_parent: Uuid) -> bool {
    let mut cursor = Some(new_parent);
    let mut steps = 0;
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        steps += 1;
        if steps > categories.len() {
            return true;
        }
        cursor = categories
            .iter()
            .find(|c| c.id == current)
            .and_then(|c| c.parent_id);
    }
    false
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
}

// ── Resources ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub link: String,
    pub price_credits: i64,
    pub status: ResourceStatus,
    pub reject_reason: Option<String>,
    pub is_top: bool,
    pub view_count: i64,
    pub visit_count: i64,
    pub favorite_count: i64,
    pub rating_avg: f64,
    pub rating_count: i64,
    pub ai_summary: Option<String>,
    pub ai_score: Option<i32>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn is_free(&self) -> bool {
        self.price_credits == 0
    }
}

/// Client-supplied resource fields, shared by single create and batch upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub link: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price_credits: i64,
}

impl ResourceInput {
    /// Trim and validate in place. Tags are lowercased and deduplicated.
    pub fn normalize(mut self) -> Result<Self, ApiServiceError> {
        self.title = validate_title(&self.title)?;
        self.description = validate_description(&self.description)?;
        self.link = validate_link(&self.link)?;
        self.tags = normalize_tags(&self.tags)?;
        validate_price(self.price_credits)?;
        Ok(self)
    }
}

/// Partial update of a resource. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub price_credits: Option<i64>,
    pub status: Option<ResourceStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub category_id: Option<Uuid>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub sort: ResourceSort,
}

pub fn validate_title(raw: &str) -> Result<String, ApiServiceError> {
    let title = raw.trim();
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_LEN {
        return Err(ApiServiceError::invalid(format!(
            "title must be 1-{MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_owned())
}

pub fn validate_description(raw: &str) -> Result<String, ApiServiceError> {
    let description = raw.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiServiceError::invalid(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_owned())
}

/// Accept only absolute http(s) URLs with a host.
pub fn validate_link(raw: &str) -> Result<String, ApiServiceError> {
    let link = raw.trim();
    let parsed =
        url::Url::parse(link).map_err(|_| ApiServiceError::invalid("link must be a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ApiServiceError::invalid("link must be an http(s) URL"));
    }
    Ok(link.to_owned())
}

pub fn normalize_tags(raw: &[String]) -> Result<Vec<String>, ApiServiceError> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = validate_tag_name(tag)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    if tags.len() > MAX_TAGS {
        return Err(ApiServiceError::invalid(format!(
            "at most {MAX_TAGS} tags are allowed"
        )));
    }
    Ok(tags)
}

pub fn validate_tag_name(raw: &str) -> Result<String, ApiServiceError> {
    let tag = raw.trim().to_lowercase();
    let len = tag.chars().count();
    if len == 0 || len > MAX_TAG_LEN {
        return Err(ApiServiceError::invalid(format!(
            "tags must be 1-{MAX_TAG_LEN} characters"
        )));
    }
    Ok(tag)
}

pub fn validate_price(price: i64) -> Result<(), ApiServiceError> {
    if !(0..=MAX_PRICE_CREDITS).contains(&price) {
        return Err(ApiServiceError::invalid(format!(
            "priceCredits must be between 0 and {MAX_PRICE_CREDITS}"
        )));
    }
    Ok(())
}

/// What a caller sees when opening a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceView {
    pub resource: Resource,
    /// Whether the link may be shown to this caller.
    pub link_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCheck {
    pub reachable: bool,
    pub status: Option<u16>,
}

/// LLM enrichment output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Enrichment {
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub score: f64,
}

// ── Favorites & ratings ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteEntry {
    pub resource: Resource,
    pub favorited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mine: Option<i16>,
}

// ── Credits & orders ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub balance_after: i64,
    pub kind: CreditTxKind,
    pub reference_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked { balance: i64 },
    AlreadyUnlocked { balance: i64 },
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_id: String,
    pub credits: i64,
    pub amount_cents: i64,
    pub status: OrderStatus,
    pub trade_no: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Credited { balance: i64 },
    AlreadyPaid,
    NotPending(OrderStatus),
}

/// Gateway-reported payment result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentResult {
    Paid,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotification {
    pub order_id: Uuid,
    pub status: PaymentResult,
    pub trade_no: String,
    pub amount_cents: i64,
}

// ── Admin ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: u64,
    pub pending_resources: u64,
    pub approved_resources: u64,
    pub rejected_resources: u64,
    pub favorites: u64,
    pub ratings: u64,
    pub paid_orders: u64,
    pub revenue_cents: i64,
    pub credits_in_circulation: i64,
    pub elapsed_ms: u64,
}

// ── Batch upload ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Running,
    Completed,
    /// Stored state no longer matches its items; never resumed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub index: usize,
    pub message: String,
}

/// Batch upload progress, checkpointed to the cache after every item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: Vec<BatchFailure>,
    pub created_ids: Vec<Uuid>,
    pub status: BatchStatus,
    pub items: Vec<ResourceInput>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchTask {
    pub fn new(user_id: Uuid, items: Vec<ResourceInput>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            total: items.len(),
            processed: 0,
            succeeded: 0,
            failed: Vec::new(),
            created_ids: Vec::new(),
            status: BatchStatus::Running,
            items,
            created_at: now,
            updated_at: now,
        }
    }
}
