//! Name-keyed catalog of provider factories.
//!
//! Names are lower-cased before storage and lookup, so `"MOCK"`, `"mock"` and `"Mock"` address
//! the same entry. Besides explicitly constructed registries there is one process-wide
//! instance, [`ProviderRegistry::global`]; tests that touch it should [`clear`] it first.
//!
//! [`clear`]: ProviderRegistry::clear

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};
use tracing::debug;

use crate::{
    error::{ExchangeRateError, Result},
    provider::RateProvider,
};

/// Builds a fresh provider instance on every call.
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn RateProvider> + Send + Sync>;

static GLOBAL: LazyLock<Arc<ProviderRegistry>> =
    LazyLock::new(|| Arc::new(ProviderRegistry::new()));

#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, ProviderFactory>>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry").field("providers", &self.names()).finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<ProviderRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Store `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn RateProvider> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(factory));
    }

    /// Register a factory that arrives type-erased.
    ///
    /// Fails with [`ExchangeRateError::InvalidProviderKind`] unless `factory` is a
    /// [`ProviderFactory`]; nothing is stored or constructed in that case.
    pub fn register_erased(&self, name: &str, factory: Box<dyn Any + Send + Sync>) -> Result<()> {
        let factory = factory
            .downcast::<ProviderFactory>()
            .map_err(|_| ExchangeRateError::InvalidProviderKind(name.to_string()))?;

        self.insert(name, *factory);
        Ok(())
    }

    fn insert(&self, name: &str, factory: ProviderFactory) {
        let key = name.to_lowercase();
        debug!(provider = %key, "Registering exchange rate provider");

        self.providers.write().unwrap_or_else(PoisonError::into_inner).insert(key, factory);
    }

    /// Create a new instance of the provider registered under `name`.
    pub fn make(&self, name: &str) -> Result<Box<dyn RateProvider>> {
        let key = name.to_lowercase();

        let factory = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
            .ok_or_else(|| ExchangeRateError::ProviderNotFound(key.clone()))?;

        debug!(provider = %key, "Creating exchange rate provider");
        Ok(factory())
    }

    pub fn has(&self, name: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&name.to_lowercase())
    }

    /// Snapshot of every registered name and its factory.
    pub fn providers(&self) -> HashMap<String, ProviderFactory> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.providers.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.providers.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Currency, CurrencyRate};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct MockProvider;

    #[async_trait]
    impl RateProvider for MockProvider {
        async fn convert(&self, amount: f64, _from: Currency, _to: Currency) -> Result<Option<f64>> {
            Ok(Some(amount * 1.5))
        }

        async fn get_rates(
            &self,
            source: Currency,
            targets: &[Currency],
        ) -> Result<Vec<CurrencyRate>> {
            Ok(targets.iter().map(|&t| CurrencyRate::new(source, t, 1.5)).collect())
        }
    }

    fn mock() -> Box<dyn RateProvider> {
        Box::new(MockProvider)
    }

    #[test]
    fn can_register_provider() {
        let registry = ProviderRegistry::new();
        registry.register("mock", mock);
        assert!(registry.has("mock"));
        assert!(!registry.has("other"));
    }

    #[test]
    fn provider_names_are_case_insensitive() {
        let registry = ProviderRegistry::new();
        registry.register("MOCK", mock);

        assert!(registry.has("mock"));
        assert!(registry.has("MOCK"));
        assert!(registry.has("Mock"));
        assert!(registry.make("mock").is_ok());
        assert_eq!(registry.names(), vec!["mock".to_string()]);
    }

    #[tokio::test]
    async fn make_builds_a_fresh_instance_each_time() {
        let registry = ProviderRegistry::new();
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        registry.register("mock", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            mock()
        });

        let provider = registry.make("mock").unwrap();
        registry.make("Mock").unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 2);
        let result = provider.convert(100.0, Currency::USD, Currency::EUR).await.unwrap();
        assert_eq!(result, Some(150.0));
    }

    #[test]
    fn make_unregistered_provider_fails() {
        let registry = ProviderRegistry::new();
        let err = registry.make("Unregistered").unwrap_err();

        assert!(matches!(err, ExchangeRateError::ProviderNotFound(ref name) if name == "unregistered"));
    }

    #[test]
    fn erased_registration_accepts_provider_factories() {
        let registry = ProviderRegistry::new();
        let factory: ProviderFactory = Arc::new(mock);

        registry.register_erased("mock", Box::new(factory)).unwrap();
        assert!(registry.make("mock").is_ok());
    }

    #[test]
    fn erased_registration_rejects_other_values() {
        let registry = ProviderRegistry::new();

        let err = registry.register_erased("invalid", Box::new("not a provider")).unwrap_err();

        assert!(matches!(err, ExchangeRateError::InvalidProviderKind(ref name) if name == "invalid"));
        assert!(!registry.has("invalid"));
    }

    #[test]
    fn can_get_all_providers() {
        let registry = ProviderRegistry::new();
        registry.register("mock1", mock);
        registry.register("mock2", mock);

        let providers = registry.providers();
        assert_eq!(providers.len(), 2);
        assert!(providers.contains_key("mock1"));
        assert!(providers.contains_key("mock2"));
    }

    #[test]
    fn can_clear_providers() {
        let registry = ProviderRegistry::new();
        registry.register("mock", mock);
        registry.clear();

        assert!(registry.providers().is_empty());
        assert!(!registry.has("mock"));
    }

    #[test]
    fn global_registry_is_shared() {
        let name = "registry-global-test";
        ProviderRegistry::global().register(name, mock);

        assert!(ProviderRegistry::global().has(name));
        assert!(Arc::ptr_eq(&ProviderRegistry::global(), &ProviderRegistry::global()));
    }
}
