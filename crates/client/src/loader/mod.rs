//! Cache-first loading of the reference collections.
//!
//! ### Flow per collection
//! 1. Read the timed cache; a fresh entry is returned as is
//! 2. On a miss, fetch from the engine through the resilient fetcher
//! 3. Store the fresh payload, then return it
//! 4. Fetch failures surface as [`LoadError`]; stale data is never served
//!
//! Concurrent requests for one collection share a single in-flight load.
//! Each collection's state is published on a `watch` channel.

mod error;

pub use error::LoadError;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::{Mutex, watch};

use eduform_core::{InstitutionRecord, TimedCache};

use crate::api::{EngineClient, InstitutionQuery};

/// A reference collection the loader knows how to fetch and cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Regions,
    /// Cities, optionally restricted to one region.
    Cities { region: Option<String> },
    FounderTypes,
    /// The unfiltered institution directory.
    Institutions,
}

impl Collection {
    pub fn cities_in(region: Option<&str>) -> Self {
        let region = region.map(str::trim).filter(|r| !r.is_empty()).map(str::to_string);
        Self::Cities { region }
    }

    /// Key under which the collection is cached.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Regions => "cachedRegions".to_string(),
            Self::Cities { region: None } => "cachedCities".to_string(),
            Self::Cities { region: Some(region) } => format!("cachedCities:{region}"),
            Self::FounderTypes => "cachedFounderTypes".to_string(),
            Self::Institutions => "allInstitutions".to_string(),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regions => f.write_str("regions"),
            Self::Cities { region: None } => f.write_str("cities"),
            Self::Cities { region: Some(region) } => write!(f, "cities in {region}"),
            Self::FounderTypes => f.write_str("founder types"),
            Self::Institutions => f.write_str("institutions"),
        }
    }
}

/// Payload of a loaded collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionData {
    Names(Arc<Vec<String>>),
    Institutions(Arc<Vec<InstitutionRecord>>),
}

impl CollectionData {
    pub fn len(&self) -> usize {
        match self {
            Self::Names(names) => names.len(),
            Self::Institutions(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Observable status of one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready(CollectionData),
    Failed(LoadError),
}

type SharedLoad = Shared<BoxFuture<'static, Result<CollectionData, LoadError>>>;

/// Loads reference collections cache-first, one fetch per collection at a time.
#[derive(Clone)]
pub struct ReferenceDataLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    api: EngineClient,
    cache: TimedCache,
    /// Keyed by collection and whether the load skips the cache read.
    inflight: Mutex<HashMap<(Collection, bool), SharedLoad>>,
    states: Mutex<HashMap<Collection, watch::Sender<LoadState>>>,
}

impl fmt::Debug for ReferenceDataLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceDataLoader").field("cache", &self.inner.cache).finish_non_exhaustive()
    }
}

impl ReferenceDataLoader {
    pub fn new(api: EngineClient, cache: TimedCache) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                api,
                cache,
                inflight: Mutex::new(HashMap::new()),
                states: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn api(&self) -> &EngineClient {
        &self.inner.api
    }

    pub fn cache(&self) -> &TimedCache {
        &self.inner.cache
    }

    /// Load `collection`, cache first.
    pub async fn load(&self, collection: Collection) -> Result<CollectionData, LoadError> {
        self.run(collection, false).await
    }

    /// Load `collection` from the network even if a fresh entry is cached.
    pub async fn refresh(&self, collection: Collection) -> Result<CollectionData, LoadError> {
        self.run(collection, true).await
    }

    pub async fn regions(&self) -> Result<Arc<Vec<String>>, LoadError> {
        self.names(Collection::Regions).await
    }

    pub async fn cities(&self, region: Option<&str>) -> Result<Arc<Vec<String>>, LoadError> {
        self.names(Collection::cities_in(region)).await
    }

    pub async fn founder_types(&self) -> Result<Arc<Vec<String>>, LoadError> {
        self.names(Collection::FounderTypes).await
    }

    /// The full institution directory.
    pub async fn institutions(&self) -> Result<Arc<Vec<InstitutionRecord>>, LoadError> {
        match self.load(Collection::Institutions).await? {
            CollectionData::Institutions(records) => Ok(records),
            CollectionData::Names(_) => Err(LoadError::unexpected(&Collection::Institutions)),
        }
    }

    /// Watch the state of `collection`.
    ///
    /// A collection nobody has requested yet reports `Loading` until its
    /// first load finishes.
    pub async fn subscribe(&self, collection: &Collection) -> watch::Receiver<LoadState> {
        let mut states = self.inner.states.lock().await;
        states
            .entry(collection.clone())
            .or_insert_with(|| watch::channel(LoadState::Loading).0)
            .subscribe()
    }

    /// Current state, if the collection was ever requested or watched.
    pub async fn state(&self, collection: &Collection) -> Option<LoadState> {
        let states = self.inner.states.lock().await;
        states.get(collection).map(|tx| tx.borrow().clone())
    }

    async fn names(&self, collection: Collection) -> Result<Arc<Vec<String>>, LoadError> {
        match self.load(collection.clone()).await? {
            CollectionData::Names(names) => Ok(names),
            CollectionData::Institutions(_) => Err(LoadError::unexpected(&collection)),
        }
    }

    async fn run(&self, collection: Collection, force: bool) -> Result<CollectionData, LoadError> {
        let load = {
            let mut inflight = self.inner.inflight.lock().await;
            // A plain load may ride on a forced one; a forced load never joins a plain one.
            let existing = inflight
                .get(&(collection.clone(), true))
                .or_else(|| if force { None } else { inflight.get(&(collection.clone(), false)) })
                .cloned();
            match existing {
                Some(existing) => {
                    tracing::debug!(collection = %collection, force, "joining in-flight load");
                    existing
                }
                None => {
                    let load = LoaderInner::start(Arc::clone(&self.inner), collection.clone(), force);
                    inflight.insert((collection, force), load.clone());
                    load
                }
            }
        };

        load.await
    }
}

impl LoaderInner {
    fn start(inner: Arc<Self>, collection: Collection, force: bool) -> SharedLoad {
        async move {
            inner.publish(&collection, LoadState::Loading).await;

            let result = inner.fetch_collection(&collection, force).await;
            inner.inflight.lock().await.remove(&(collection.clone(), force));

            let state = match &result {
                Ok(data) => LoadState::Ready(data.clone()),
                Err(e) => LoadState::Failed(e.clone()),
            };
            inner.publish(&collection, state).await;
            result
        }
        .boxed()
        .shared()
    }

    async fn publish(&self, collection: &Collection, state: LoadState) {
        let mut states = self.states.lock().await;
        match states.get(collection) {
            Some(tx) => {
                tx.send_replace(state);
            }
            None => {
                states.insert(collection.clone(), watch::channel(state).0);
            }
        }
    }

    async fn fetch_collection(&self, collection: &Collection, force: bool) -> Result<CollectionData, LoadError> {
        let key = collection.cache_key();

        if !force && let Some(data) = self.read_cache(collection, &key).await {
            tracing::debug!(collection = %collection, items = data.len(), "served from cache");
            return Ok(data);
        }

        let data = self.fetch_remote(collection).await.map_err(|e| LoadError::from_fetch(collection, e))?;

        let stored = match &data {
            CollectionData::Names(names) => self.cache.set(&key, names.as_ref()).await,
            CollectionData::Institutions(records) => self.cache.set(&key, records.as_ref()).await,
        };
        if let Err(e) = stored {
            tracing::warn!(collection = %collection, error = %e, "failed to cache collection");
        }

        tracing::info!(collection = %collection, items = data.len(), forced = force, "loaded collection");
        Ok(data)
    }

    async fn read_cache(&self, collection: &Collection, key: &str) -> Option<CollectionData> {
        match collection {
            Collection::Institutions => {
                self.cache.get::<Vec<InstitutionRecord>>(key).await.map(|r| CollectionData::Institutions(Arc::new(r)))
            }
            _ => self.cache.get::<Vec<String>>(key).await.map(|n| CollectionData::Names(Arc::new(n))),
        }
    }

    async fn fetch_remote(&self, collection: &Collection) -> Result<CollectionData, crate::fetch::FetchError> {
        let data = match collection {
            Collection::Regions => CollectionData::Names(Arc::new(self.api.regions().await?)),
            Collection::Cities { region } => CollectionData::Names(Arc::new(self.api.cities(region.as_deref()).await?)),
            Collection::FounderTypes => CollectionData::Names(Arc::new(self.api.founder_types().await?)),
            Collection::Institutions => {
                CollectionData::Institutions(Arc::new(self.api.institutions(&InstitutionQuery::default()).await?))
            }
        };
        Ok(data)
    }
}
