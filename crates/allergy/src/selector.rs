use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use safemenu_shared::{CanonicalTargets, Product, ProductId, TargetSet};

use crate::aggregation::compute_eligible_products_with;
use crate::classifier::Classifier;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Owned product list with a revision bumped on every mutation.
#[derive(Debug)]
pub struct ProductStore {
    id: u64,
    revision: u64,
    products: Vec<Product>,
}

impl Default for ProductStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Clone for ProductStore {
    fn clone(&self) -> Self {
        Self::new(self.products.clone())
    }
}

impl ProductStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            revision: 0,
            products,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub fn replace_all(&mut self, products: Vec<Product>) {
        self.products = products;
        self.revision += 1;
    }

    /// Replace the product with the same id, or append it.
    pub fn upsert(&mut self, product: Product) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
        self.revision += 1;
    }

    pub fn remove(&mut self, id: &ProductId) -> Option<Product> {
        let index = self.products.iter().position(|p| &p.id == id)?;
        self.revision += 1;
        Some(self.products.remove(index))
    }
}

#[derive(Debug)]
struct Cached {
    store_id: u64,
    revision: u64,
    targets: CanonicalTargets,
    eligible: BTreeSet<ProductId>,
}

/// Memoized eligible-id selector.
///
/// The only dependencies are the product store and the target set; when
/// either differs from the cached one the whole set is recomputed with the
/// same algorithm.
#[derive(Debug, Default)]
pub struct EligibleSelector {
    classifier: Classifier,
    cached: Option<Cached>,
    recomputations: usize,
}

impl EligibleSelector {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            cached: None,
            recomputations: 0,
        }
    }

    pub fn select(&mut self, store: &ProductStore, targets: &TargetSet) -> &BTreeSet<ProductId> {
        let canonical = targets.canonical();

        let cached = match self.cached.take() {
            Some(cached)
                if cached.store_id == store.id
                    && cached.revision == store.revision
                    && cached.targets == canonical =>
            {
                cached
            }
            _ => {
                tracing::debug!(
                    revision = store.revision,
                    products = store.len(),
                    "recomputing eligible products"
                );
                self.recomputations += 1;

                Cached {
                    store_id: store.id,
                    revision: store.revision,
                    eligible: compute_eligible_products_with(
                        store.products(),
                        targets,
                        &self.classifier,
                    ),
                    targets: canonical,
                }
            }
        };

        &self.cached.insert(cached).eligible
    }

    /// Number of full recomputations so far.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
