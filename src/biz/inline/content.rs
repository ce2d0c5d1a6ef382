use app_error::AppError;
use dashmap::DashMap;
use database::content::ContentStore;
use database_entity::dto::ContentKey;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{instrument, trace};

/// Reads and writes simple content slots.
///
/// Hits are cached in process. A save writes through to the cache, and a read that
/// misses only fills an empty cache entry, so a value loaded before a concurrent save
/// never replaces the saved one.
pub struct ContentProvider {
  store: Arc<dyn ContentStore>,
  cache: DashMap<ContentKey, String>,
  fallback_locale: Option<String>,
  /// Saves are serialized so the store and the cache agree on the last writer.
  save_lock: Mutex<()>,
}

impl ContentProvider {
  pub fn new(store: Arc<dyn ContentStore>, fallback_locale: Option<String>) -> Self {
    Self {
      store,
      cache: DashMap::new(),
      fallback_locale,
      save_lock: Mutex::new(()),
    }
  }

  /// Returns the content of the slot, the content of the same slot in the fallback locale,
  /// or an empty string.
  #[instrument(level = "trace", skip_all, fields(key = %key))]
  pub async fn get_content(&self, key: &ContentKey) -> Result<String, AppError> {
    if let Some(content) = self.load(key).await? {
      return Ok(content);
    }

    if let Some(fallback) = self
      .fallback_locale
      .as_deref()
      .filter(|fallback| *fallback != key.locale)
    {
      if let Some(content) = self.load(&key.with_locale(fallback)).await? {
        trace!("use fallback locale {} for {}", fallback, key);
        return Ok(content);
      }
    }

    Ok(String::new())
  }

  pub async fn save_content(&self, key: &ContentKey, content: &str) -> Result<(), AppError> {
    let _guard = self.save_lock.lock().await;
    if let Err(err) = self.store.save(key, content).await {
      // the store may or may not hold the new value, reload it on the next read
      self.cache.remove(key);
      return Err(err);
    }
    self.cache.insert(key.clone(), content.to_string());
    Ok(())
  }

  async fn load(&self, key: &ContentKey) -> Result<Option<String>, AppError> {
    let cached = self.cache.get(key).map(|entry| entry.value().clone());
    if cached.is_some() {
      return Ok(cached);
    }

    let content = match self.store.get(key).await? {
      None => None,
      Some(content) => Some(
        self
          .cache
          .entry(key.clone())
          .or_insert(content)
          .value()
          .clone(),
      ),
    };
    Ok(content)
  }
}
