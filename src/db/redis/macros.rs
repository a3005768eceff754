/// Read-through caching for async lookups.
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, queues the result for a background write with `$ttl` seconds and
/// returns it. A failing cache read is logged and treated as a miss, so an
/// unavailable Redis only costs latency.
///
/// ```text
/// let movie: CatalogTitle = cached!(self.cache, CacheKey::Movie(id), TTL, self.fetch_movie(id))?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, bypassing cache");
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
