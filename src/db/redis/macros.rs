/// Read-through caching against the Redis [`Cache`](crate::db::Cache).
///
/// Returns the cached value when present. Otherwise awaits `$block`,
/// queues the result for a background write with `$ttl` seconds to live,
/// and returns it. Errors from the cache read or the block propagate with `?`.
///
/// # Example
/// ```rust,ignore
/// let profile = cached!(self.cache, CacheKey::DietaryProfile(user_id), 300, async {
///     self.inner.get_profile(user_id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
