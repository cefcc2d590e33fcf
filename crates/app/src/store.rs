//! Document store
//!
//! In-memory collections standing in for the document database. Each document sits behind its
//! own mutex inside a read-write-locked map: lookups share the map lock, and a read-modify-write
//! holds the document lock for its whole duration so a document has one writer at a time.

use std::{hash::Hash, sync::Arc};

use nutrishop::{
    carts::Cart,
    orders::{Order, OrderNumber, OrderUuid},
    products::{Product, ProductUuid},
    subscriptions::{Subscription, SubscriptionUuid},
    users::UserUuid,
};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Store errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A document with the same key (or unique field) already exists.
    #[error("document already exists")]
    Duplicate,
}

/// A handle to one locked document.
pub type Document<V> = Arc<Mutex<V>>;

/// Keyed collection of documents.
#[derive(Debug)]
pub struct Collection<K, V> {
    documents: RwLock<FxHashMap<K, Document<V>>>,
}

impl<K, V> Default for Collection<K, V> {
    fn default() -> Self {
        Self {
            documents: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Copy,
{
    /// Insert a new document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the key is taken.
    pub async fn insert(&self, key: K, value: V) -> Result<Document<V>, StoreError> {
        let mut documents = self.documents.write().await;

        if documents.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }

        let document = Arc::new(Mutex::new(value));

        documents.insert(key, Arc::clone(&document));

        Ok(document)
    }

    /// The document for `key`, inserting `init()` first if there is none.
    pub async fn get_or_insert_with(&self, key: K, init: impl FnOnce() -> V) -> Document<V> {
        if let Some(document) = self.document(key).await {
            return document;
        }

        let mut documents = self.documents.write().await;

        Arc::clone(
            documents
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(init()))),
        )
    }

    /// The document for `key`.
    pub async fn document(&self, key: K) -> Option<Document<V>> {
        self.documents.read().await.get(&key).map(Arc::clone)
    }

    /// Handles to every document, in no particular order.
    pub async fn documents(&self) -> Vec<Document<V>> {
        self.documents
            .read()
            .await
            .values()
            .map(Arc::clone)
            .collect()
    }

    /// Remove a document. Returns whether it existed.
    pub async fn remove(&self, key: K) -> bool {
        self.documents.write().await.remove(&key).is_some()
    }

    /// Number of documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    /// A copy of the document for `key`, taken under its lock.
    pub async fn get(&self, key: K) -> Option<V> {
        let document = self.document(key).await?;
        let value = document.lock().await.clone();

        Some(value)
    }

    /// Copies of every document.
    pub async fn values(&self) -> Vec<V> {
        let mut values = Vec::new();

        for document in self.documents().await {
            values.push(document.lock().await.clone());
        }

        values
    }
}

#[derive(Debug, Default)]
struct Documents {
    products: Collection<ProductUuid, Product>,
    carts: Collection<UserUuid, Cart>,
    orders: Collection<OrderUuid, Order>,
    order_numbers: Mutex<FxHashMap<OrderNumber, OrderUuid>>,
    subscriptions: Collection<SubscriptionUuid, Subscription>,
}

/// Shared handle to every collection. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<Documents>,
}

impl Store {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Product catalog.
    pub fn products(&self) -> &Collection<ProductUuid, Product> {
        &self.inner.products
    }

    /// Carts, keyed by owner. An owner has at most one.
    pub fn carts(&self) -> &Collection<UserUuid, Cart> {
        &self.inner.carts
    }

    /// Orders.
    pub fn orders(&self) -> &Collection<OrderUuid, Order> {
        &self.inner.orders
    }

    /// Subscriptions.
    pub fn subscriptions(&self) -> &Collection<SubscriptionUuid, Subscription> {
        &self.inner.subscriptions
    }

    /// Insert an order, enforcing unique order numbers.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if the order id or number is taken.
    pub async fn insert_order(&self, order: Order) -> Result<(), StoreError> {
        let mut numbers = self.inner.order_numbers.lock().await;

        if numbers.contains_key(order.order_number()) {
            return Err(StoreError::Duplicate);
        }

        let number = order.order_number().clone();
        let uuid = order.uuid();

        self.inner.orders.insert(uuid, order).await?;
        numbers.insert(number, uuid);

        Ok(())
    }

    /// The id of the order with this number.
    pub async fn order_by_number(&self, number: &OrderNumber) -> Option<OrderUuid> {
        self.inner.order_numbers.lock().await.get(number).copied()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn insert_rejects_duplicate_keys() -> TestResult {
        let collection = Collection::<u32, &str>::default();

        collection.insert(1, "first").await?;

        assert_eq!(
            collection.insert(1, "second").await.map(|_| ()),
            Err(StoreError::Duplicate)
        );
        assert_eq!(collection.get(1).await, Some("first"));

        Ok(())
    }

    #[tokio::test]
    async fn get_or_insert_with_only_initialises_once() {
        let collection = Collection::<u32, u32>::default();

        let first = collection.get_or_insert_with(7, || 1).await;
        let second = collection.get_or_insert_with(7, || 2).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second.lock().await, 1);
        assert_eq!(collection.len().await, 1);
    }

    #[tokio::test]
    async fn writes_through_document_handles_are_visible() {
        let collection = Collection::<u32, u32>::default();
        let document = collection.get_or_insert_with(1, || 0).await;

        *document.lock().await += 5;

        assert_eq!(collection.get(1).await, Some(5));
        assert_eq!(collection.values().await, vec![5]);
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let collection = Collection::<u32, u32>::default();

        collection.get_or_insert_with(1, || 0).await;

        assert!(collection.remove(1).await);
        assert!(!collection.remove(1).await);
        assert!(collection.is_empty().await);
    }
}
