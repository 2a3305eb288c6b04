use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hub_domain::order::OrderStatus;
use hub_domain::pagination::{PageRequest, Paginated};
use hub_domain::resource::ResourceStatus;
use hub_domain::user::Actor;

use hub_api::domain::repository::{
    BatchTaskStore, CategoryRepository, CreditRepository, FavoriteRepository, OrderRepository,
    ResourceRepository,
};
use hub_api::domain::types::{
    BatchTask, Category, CreditTransaction, FavoriteEntry, Order, PaymentOutcome, Resource,
    ResourceChanges, ResourceFilter, ResourceInput, UnlockOutcome,
};
use hub_api::error::ApiServiceError;

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Paginated<T> {
    let window = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Paginated::new(window, items.len() as u64, page)
}

// ── MockResourceRepo ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockResourceRepo {
    pub resources: Arc<Mutex<Vec<Resource>>>,
    pub unlocked: Arc<Mutex<HashSet<(Uuid, Uuid)>>>,
    /// Zero-based create call that fails with a server error, once.
    pub fail_create_at: Arc<Mutex<Option<usize>>>,
    pub create_calls: Arc<AtomicUsize>,
    /// Simulates a concurrent toggle landing right after the next `find`.
    pub flip_top_after_find: Arc<AtomicBool>,
}

impl MockResourceRepo {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self {
            resources: Arc::new(Mutex::new(resources)),
            ..Self::default()
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Resource> {
        self.resources
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.resources.lock().unwrap().len()
    }

    pub fn grant_unlock(&self, user_id: Uuid, resource_id: Uuid) {
        self.unlocked.lock().unwrap().insert((user_id, resource_id));
    }

    fn with<T>(&self, id: Uuid, f: impl FnOnce(&mut Resource) -> T) -> Option<T> {
        self.resources
            .lock()
            .unwrap()
            .iter_mut()
            .find(|r| r.id == id)
            .map(f)
    }
}

impl ResourceRepository for MockResourceRepo {
    async fn list_public(
        &self,
        filter: &ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        let mut items: Vec<Resource> = self
            .resources
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status == ResourceStatus::Approved)
            .filter(|r| filter.category_id.is_none_or(|c| r.category_id == Some(c)))
            .filter(|r| filter.tag.as_ref().is_none_or(|t| r.tags.contains(t)))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.is_top.cmp(&a.is_top).then(b.created_at.cmp(&a.created_at)));
        Ok(page_of(&items, page))
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        let items: Vec<Resource> = self
            .resources
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(page_of(&items, page))
    }

    async fn list_by_status(
        &self,
        status: Option<ResourceStatus>,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ApiServiceError> {
        let items: Vec<Resource> = self
            .resources
            .lock()
            .unwrap()
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        Ok(page_of(&items, page))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Resource>, ApiServiceError> {
        let found = self.get(id);
        if self.flip_top_after_find.swap(false, Ordering::SeqCst) {
            self.with(id, |r| r.is_top = !r.is_top);
        }
        Ok(found)
    }

    async fn create(
        &self,
        owner_id: Uuid,
        input: &ResourceInput,
    ) -> Result<Resource, ApiServiceError> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut fail_at = self.fail_create_at.lock().unwrap();
            if *fail_at == Some(call) {
                *fail_at = None;
                return Err(ApiServiceError::Database(anyhow::anyhow!(
                    "connection reset by peer"
                )));
            }
        }
        let now = Utc::now();
        let resource = Resource {
            id: Uuid::now_v7(),
            owner_id,
            category_id: input.category_id,
            title: input.title.clone(),
            description: input.description.clone(),
            link: input.link.clone(),
            price_credits: input.price_credits,
            status: ResourceStatus::Pending,
            reject_reason: None,
            is_top: false,
            view_count: 0,
            visit_count: 0,
            favorite_count: 0,
            rating_avg: 0.0,
            rating_count: 0,
            ai_summary: None,
            ai_score: None,
            tags: input.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        self.resources.lock().unwrap().push(resource.clone());
        Ok(resource)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ResourceChanges,
    ) -> Result<Option<Resource>, ApiServiceError> {
        Ok(self.with(id, |r| {
            if let Some(title) = &changes.title {
                r.title = title.clone();
            }
            if let Some(description) = &changes.description {
                r.description = description.clone();
            }
            if let Some(link) = &changes.link {
                r.link = link.clone();
            }
            if let Some(category_id) = changes.category_id {
                r.category_id = Some(category_id);
            }
            if let Some(tags) = &changes.tags {
                r.tags = tags.clone();
            }
            if let Some(price) = changes.price_credits {
                r.price_credits = price;
            }
            if let Some(status) = changes.status {
                r.status = status;
                r.reject_reason = None;
            }
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiServiceError> {
        let mut all = self.resources.lock().unwrap();
        let before = all.len();
        all.retain(|r| r.id != id);
        Ok(all.len() < before)
    }

    async fn increment_view(&self, id: Uuid) -> Result<(), ApiServiceError> {
        self.with(id, |r| r.view_count += 1);
        Ok(())
    }

    async fn increment_visit(&self, id: Uuid) -> Result<(), ApiServiceError> {
        self.with(id, |r| r.visit_count += 1);
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        from: ResourceStatus,
        to: ResourceStatus,
        reject_reason: Option<&str>,
    ) -> Result<bool, ApiServiceError> {
        Ok(self
            .with(id, |r| {
                if r.status != from {
                    return false;
                }
                r.status = to;
                r.reject_reason = reject_reason.map(str::to_owned);
                true
            })
            .unwrap_or(false))
    }

    async fn set_top_if(&self, id: Uuid, expected: bool, new: bool) -> Result<bool, ApiServiceError> {
        Ok(self
            .with(id, |r| {
                if r.is_top != expected {
                    return false;
                }
                r.is_top = new;
                true
            })
            .unwrap_or(false))
    }

    async fn set_enrichment(&self, id: Uuid, summary: &str, score: i32) -> Result<(), ApiServiceError> {
        self.with(id, |r| {
            r.ai_summary = Some(summary.to_owned());
            r.ai_score = Some(score);
        })
        .ok_or(ApiServiceError::ResourceNotFound)
    }

    async fn has_unlocked(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        Ok(self.unlocked.lock().unwrap().contains(&(user_id, resource_id)))
    }
}

// ── MockCategoryRepo ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCategoryRepo {
    pub categories: Arc<Mutex<Vec<Category>>>,
    pub resources_per_category: Arc<Mutex<HashMap<Uuid, u64>>>,
}

impl MockCategoryRepo {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Arc::new(Mutex::new(categories)),
            ..Self::default()
        }
    }
}

impl CategoryRepository for MockCategoryRepo {
    async fn list(&self) -> Result<Vec<Category>, ApiServiceError> {
        let mut all = self.categories.lock().unwrap().clone();
        all.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        Ok(all)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Category>, ApiServiceError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn create(&self, category: &Category) -> Result<(), ApiServiceError> {
        let mut all = self.categories.lock().unwrap();
        if all.iter().any(|c| c.name == category.name) {
            return Err(ApiServiceError::Duplicate("category"));
        }
        all.push(category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), ApiServiceError> {
        let mut all = self.categories.lock().unwrap();
        if let Some(c) = all.iter_mut().find(|c| c.id == category.id) {
            *c = category.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiServiceError> {
        let mut all = self.categories.lock().unwrap();
        let before = all.len();
        all.retain(|c| c.id != id);
        Ok(all.len() < before)
    }

    async fn count_children(&self, id: Uuid) -> Result<u64, ApiServiceError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .count() as u64)
    }

    async fn count_resources(&self, id: Uuid) -> Result<u64, ApiServiceError> {
        Ok(self
            .resources_per_category
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or(0))
    }
}

// ── MockFavoriteRepo ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockFavoriteRepo {
    pub rows: Arc<Mutex<Vec<(Uuid, Uuid, DateTime<Utc>)>>>,
    pub resources: MockResourceRepo,
}

impl MockFavoriteRepo {
    pub fn new(resources: MockResourceRepo) -> Self {
        Self {
            rows: Arc::default(),
            resources,
        }
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl FavoriteRepository for MockFavoriteRepo {
    async fn add(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|(u, r, _)| *u == user_id && *r == resource_id) {
            return Ok(false);
        }
        rows.push((user_id, resource_id, Utc::now()));
        self.resources.with(resource_id, |r| r.favorite_count += 1);
        Ok(true)
    }

    async fn remove(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(u, r, _)| !(*u == user_id && *r == resource_id));
        let removed = rows.len() < before;
        if removed {
            self.resources
                .with(resource_id, |r| r.favorite_count = (r.favorite_count - 1).max(0));
        }
        Ok(removed)
    }

    async fn exists(&self, user_id: Uuid, resource_id: Uuid) -> Result<bool, ApiServiceError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|(u, r, _)| *u == user_id && *r == resource_id))
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<FavoriteEntry>, ApiServiceError> {
        let mut entries: Vec<FavoriteEntry> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .filter_map(|(_, r, at)| {
                self.resources.get(*r).map(|resource| FavoriteEntry {
                    resource,
                    favorited_at: *at,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.favorited_at.cmp(&a.favorited_at));
        Ok(page_of(&entries, page))
    }
}

// ── MockOrderRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOrderRepo {
    pub orders: Arc<Mutex<Vec<Order>>>,
    pub balances: Arc<Mutex<HashMap<Uuid, i64>>>,
}

impl MockOrderRepo {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders)),
            ..Self::default()
        }
    }

    pub fn balance(&self, user_id: Uuid) -> i64 {
        self.balances
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn status(&self, id: Uuid) -> Option<OrderStatus> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.status)
    }
}

impl OrderRepository for MockOrderRepo {
    async fn create(&self, order: &Order) -> Result<(), ApiServiceError> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, ApiServiceError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<Order>, ApiServiceError> {
        let items: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_of(&items, page))
    }

    async fn settle_paid(&self, order: &Order, trade_no: &str) -> Result<PaymentOutcome, ApiServiceError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(stored) = orders.iter_mut().find(|o| o.id == order.id) else {
            return Err(ApiServiceError::OrderNotFound);
        };
        match stored.status {
            OrderStatus::Pending => {
                stored.status = OrderStatus::Paid;
                stored.trade_no = Some(trade_no.to_owned());
                stored.paid_at = Some(Utc::now());
                let mut balances = self.balances.lock().unwrap();
                let balance = balances.entry(stored.user_id).or_insert(0);
                *balance += stored.credits;
                Ok(PaymentOutcome::Credited { balance: *balance })
            }
            OrderStatus::Paid => Ok(PaymentOutcome::AlreadyPaid),
            other => Ok(PaymentOutcome::NotPending(other)),
        }
    }

    async fn mark_failed(&self, id: Uuid, trade_no: &str) -> Result<bool, ApiServiceError> {
        let mut orders = self.orders.lock().unwrap();
        match orders
            .iter_mut()
            .find(|o| o.id == id && o.status == OrderStatus::Pending)
        {
            Some(o) => {
                o.status = OrderStatus::Failed;
                o.trade_no = Some(trade_no.to_owned());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockCreditRepo ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCreditRepo {
    pub balances: Arc<Mutex<HashMap<Uuid, i64>>>,
    pub adjust_calls: Arc<AtomicUsize>,
}

impl MockCreditRepo {
    pub fn with_balance(user_id: Uuid, balance: i64) -> Self {
        let repo = Self::default();
        repo.balances.lock().unwrap().insert(user_id, balance);
        repo
    }

    pub fn balance_of(&self, user_id: Uuid) -> Option<i64> {
        self.balances.lock().unwrap().get(&user_id).copied()
    }
}

impl CreditRepository for MockCreditRepo {
    async fn balance(&self, user_id: Uuid) -> Result<Option<i64>, ApiServiceError> {
        Ok(self.balance_of(user_id))
    }

    async fn transactions(
        &self,
        _user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<CreditTransaction>, ApiServiceError> {
        Ok(page_of(&[], page))
    }

    async fn unlock(
        &self,
        buyer_id: Uuid,
        resource: &Resource,
    ) -> Result<UnlockOutcome, ApiServiceError> {
        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(buyer_id).or_insert(0);
        if *balance < resource.price_credits {
            return Ok(UnlockOutcome::Insufficient);
        }
        *balance -= resource.price_credits;
        Ok(UnlockOutcome::Unlocked { balance: *balance })
    }

    async fn adjust(
        &self,
        user_id: Uuid,
        amount: i64,
        _note: &str,
    ) -> Result<Option<i64>, ApiServiceError> {
        self.adjust_calls.fetch_add(1, Ordering::SeqCst);
        let mut balances = self.balances.lock().unwrap();
        let Some(balance) = balances.get_mut(&user_id) else {
            return Ok(None);
        };
        match balance.checked_add(amount) {
            Some(next) if next >= 0 => {
                *balance = next;
                Ok(Some(next))
            }
            _ => Ok(None),
        }
    }
}

// ── MockBatchStore ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockBatchStore {
    pub tasks: Arc<Mutex<HashMap<Uuid, BatchTask>>>,
    pub saves: Arc<AtomicUsize>,
    pub leases: Arc<Mutex<HashMap<Uuid, Uuid>>>,
}

impl MockBatchStore {
    pub fn get(&self, id: Uuid) -> Option<BatchTask> {
        self.tasks.lock().unwrap().get(&id).cloned()
    }

    pub fn only_task(&self) -> BatchTask {
        let tasks = self.tasks.lock().unwrap();
        assert_eq!(tasks.len(), 1, "expected exactly one stored task");
        tasks.values().next().cloned().unwrap()
    }
}

impl BatchTaskStore for MockBatchStore {
    /// Yields after every checkpoint so concurrent runs interleave.
    async fn save(&self, task: &BatchTask) -> Result<(), ApiServiceError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.tasks.lock().unwrap().insert(task.id, task.clone());
        tokio::task::yield_now().await;
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<BatchTask>, ApiServiceError> {
        Ok(self.get(id))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BatchTask>, ApiServiceError> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn acquire_lease(&self, id: Uuid) -> Result<Option<Uuid>, ApiServiceError> {
        let mut leases = self.leases.lock().unwrap();
        if leases.contains_key(&id) {
            return Ok(None);
        }
        let token = Uuid::new_v4();
        leases.insert(id, token);
        Ok(Some(token))
    }

    async fn release_lease(&self, id: Uuid, token: Uuid) -> Result<(), ApiServiceError> {
        let mut leases = self.leases.lock().unwrap();
        if leases.get(&id) == Some(&token) {
            leases.remove(&id);
        }
        Ok(())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub fn member(user_id: Uuid) -> Actor {
    Actor {
        user_id,
        is_admin: false,
    }
}

pub fn admin() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        is_admin: true,
    }
}

pub fn test_resource(owner_id: Uuid, status: ResourceStatus, price_credits: i64) -> Resource {
    let now = Utc::now();
    Resource {
        id: Uuid::now_v7(),
        owner_id,
        category_id: None,
        title: "Rust async book".to_owned(),
        description: "Notes on futures and executors".to_owned(),
        link: "https://example.com/async-book".to_owned(),
        price_credits,
        status,
        reject_reason: None,
        is_top: false,
        view_count: 0,
        visit_count: 0,
        favorite_count: 0,
        rating_avg: 0.0,
        rating_count: 0,
        ai_summary: None,
        ai_score: None,
        tags: vec!["rust".to_owned()],
        created_at: now,
        updated_at: now,
    }
}

pub fn resource_input(title: &str) -> ResourceInput {
    ResourceInput {
        title: title.to_owned(),
        description: String::new(),
        link: format!("https://example.com/{}", title.replace(' ', "-")),
        category_id: None,
        tags: vec!["Batch".to_owned()],
        price_credits: 0,
    }
}

pub fn test_order(user_id: Uuid, status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::now_v7(),
        user_id,
        package_id: "starter".to_owned(),
        credits: 100,
        amount_cents: 990,
        status,
        trade_no: None,
        paid_at: None,
        created_at: now,
        updated_at: now,
    }
}
