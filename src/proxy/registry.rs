//! Model alias resolution.

use std::sync::{Arc, RwLock};

use crate::proxy::errors::{ProxyError, ProxyResult};
use crate::proxy::upstream::CatalogSource;

/// Maps short model aliases to the upstream's fully qualified identifiers.
///
/// The alias table is an immutable snapshot behind an `RwLock`. A refresh
/// fetches the catalog with no lock held, builds the replacement table
/// completely, then publishes it with a single swap. Concurrent readers
/// see either the old table or the new one, never a mix.
pub struct ModelRegistry {
    catalog: Arc<dyn CatalogSource>,
    table: RwLock<Arc<Vec<String>>>,
    strict: bool,
}

impl ModelRegistry {
    pub fn new(catalog: Arc<dyn CatalogSource>, strict: bool) -> Self {
        Self {
            catalog,
            table: RwLock::new(Arc::new(Vec::new())),
            strict,
        }
    }

    /// Current table snapshot. Cheap: clones an `Arc`, not the table.
    pub fn snapshot(&self) -> ProxyResult<Arc<Vec<String>>> {
        Ok(self
            .table
            .read()
            .map_err(|e| ProxyError::Internal(format!("alias table lock poisoned: {}", e)))?
            .clone())
    }

    /// Replaces the alias table wholesale with a fresh id list.
    pub fn install(&self, ids: Vec<String>) -> ProxyResult<Arc<Vec<String>>> {
        let next = Arc::new(ids);
        let mut guard = self
            .table
            .write()
            .map_err(|e| ProxyError::Internal(format!("alias table lock poisoned: {}", e)))?;
        *guard = next.clone();
        Ok(next)
    }

    /// Re-fetches the catalog and publishes a fresh table.
    pub async fn refresh(&self) -> ProxyResult<Arc<Vec<String>>> {
        let ids = self.catalog.model_ids().await?;
        log::debug!("alias table refreshed with {} model(s)", ids.len());
        self.install(ids)
    }

    /// Resolves a client-supplied alias to a fully qualified model id.
    ///
    /// Exact matches win. Otherwise the first catalog entry in listing
    /// order whose id ends with the alias is taken, so an ambiguous
    /// suffix resolves to whichever entry the upstream listed first.
    /// Unknown aliases pass through unchanged unless strict mode is on:
    /// they are assumed to be fully qualified already, and the upstream
    /// call will reject them if not.
    pub async fn resolve(&self, alias: &str) -> ProxyResult<String> {
        let mut table = self.snapshot()?;
        if table.is_empty() {
            table = self.refresh().await?;
        }

        if let Some(exact) = table.iter().find(|id| id.as_str() == alias) {
            return Ok(exact.clone());
        }
        if let Some(suffix) = table.iter().find(|id| id.ends_with(alias)) {
            return Ok(suffix.clone());
        }

        if self.strict {
            log::warn!("model alias '{}' not found in upstream catalog", alias);
            return Err(ProxyError::ModelNotResolved(alias.to_string()));
        }
        Ok(alias.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedCatalog {
        ids: Vec<String>,
        calls: AtomicUsize,
    }

    impl FixedCatalog {
        fn new(ids: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                ids: ids.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CatalogSource for FixedCatalog {
        async fn model_ids(&self) -> ProxyResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.ids.clone())
        }
    }

    fn registry(ids: &[&str]) -> ModelRegistry {
        ModelRegistry::new(FixedCatalog::new(ids), false)
    }

    #[tokio::test]
    async fn exact_match_resolves_to_itself() {
        let registry = registry(&["anthropic/claude-sonnet-4", "openai/gpt-4o"]);
        let resolved = registry.resolve("anthropic/claude-sonnet-4").await.unwrap();
        assert_eq!(resolved, "anthropic/claude-sonnet-4");
    }

    #[tokio::test]
    async fn suffix_match_recovers_vendor_prefix() {
        let registry = registry(&["openai/gpt-4o", "anthropic/claude-sonnet-4"]);
        let resolved = registry.resolve("claude-sonnet-4").await.unwrap();
        assert_eq!(resolved, "anthropic/claude-sonnet-4");
    }

    #[tokio::test]
    async fn unknown_alias_passes_through() {
        let registry = registry(&["openai/gpt-4o"]);
        let resolved = registry.resolve("vendor/brand-new-model").await.unwrap();
        assert_eq!(resolved, "vendor/brand-new-model");
    }

    #[tokio::test]
    async fn strict_mode_rejects_unknown_alias() {
        let registry = ModelRegistry::new(FixedCatalog::new(&["openai/gpt-4o"]), true);
        let err = registry.resolve("no-such-model").await.unwrap_err();
        assert!(matches!(err, ProxyError::ModelNotResolved(alias) if alias == "no-such-model"));
    }

    #[tokio::test]
    async fn ambiguous_suffix_takes_first_in_listing_order() {
        let registry = registry(&["alpha/shared-name", "beta/shared-name"]);
        let resolved = registry.resolve("shared-name").await.unwrap();
        assert_eq!(resolved, "alpha/shared-name");
    }

    #[tokio::test]
    async fn empty_table_triggers_one_refresh() {
        let catalog = FixedCatalog::new(&["anthropic/claude-sonnet-4"]);
        let registry = ModelRegistry::new(catalog.clone(), false);

        registry.resolve("claude-sonnet-4").await.unwrap();
        registry.resolve("claude-sonnet-4").await.unwrap();

        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_replaces_the_table_wholesale() {
        let registry = registry(&[]);
        registry.install(vec!["old/model".to_string()]).unwrap();
        registry.install(vec!["new/model".to_string()]).unwrap();

        let table = registry.snapshot().unwrap();
        assert_eq!(table.as_slice(), ["new/model".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_readers_never_see_a_partial_table() {
        // Two complete tables of different sizes; readers must observe one
        // of them in full, never a mixture.
        let table_a: Vec<String> = (0..500).map(|i| format!("a/m{}", i)).collect();
        let table_b: Vec<String> = (0..800).map(|i| format!("b/m{}", i)).collect();

        let registry = Arc::new(registry(&[]));
        registry.install(table_a.clone()).unwrap();

        let writer = {
            let registry = registry.clone();
            let (table_a, table_b) = (table_a.clone(), table_b.clone());
            tokio::spawn(async move {
                for i in 0..200 {
                    let next = if i % 2 == 0 { &table_b } else { &table_a };
                    registry.install(next.clone()).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let snapshot = registry.snapshot().unwrap();
                        match snapshot.len() {
                            500 => assert!(snapshot[0].starts_with("a/")),
                            800 => assert!(snapshot[0].starts_with("b/")),
                            n => panic!("observed partially built table of {} entries", n),
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
