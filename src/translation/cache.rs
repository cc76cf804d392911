//! 翻译结果缓存
//!
//! 进程内 LRU 缓存，只保存机器翻译的结果（词典命中不需要缓存）。

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::config::constants::DEFAULT_CACHE_SIZE;

/// 缓存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub sets: usize,
}

impl CacheStats {
    /// 命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheInner {
    entries: LruCache<String, String>,
    stats: CacheStats,
}

/// 本地 LRU 缓存
pub struct TranslationCache {
    inner: Mutex<CacheInner>,
}

impl TranslationCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_SIZE))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            inner: Mutex::new(CacheInner {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
        }
    }

    /// 生成缓存键
    pub fn generate_key(text: &str, source_lang: &str, target_lang: &str) -> String {
        format!("{}:{}:{}", source_lang, target_lang, text)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let Ok(mut inner) = self.inner.lock() else {
            return None;
        };

        let cached = inner.entries.get(key).cloned();
        match cached {
            Some(_) => inner.stats.hits += 1,
            None => inner.stats.misses += 1,
        }
        cached
    }

    pub fn set(&self, key: String, translated: String) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.put(key, translated);
            inner.stats.sets += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.inner
            .lock()
            .map(|inner| inner.stats)
            .unwrap_or_default()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
