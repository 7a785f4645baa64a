//! AdapterRegistry - provider adapters keyed by service id.

use std::collections::HashMap;
use std::sync::Arc;

use super::ProviderAdapter;
use crate::domain::{RegistryError, ServiceId};

/// AdapterRegistry は登録済みの adapter を保持
///
/// # 登録ルール
/// - 同じ ServiceId の二重登録は RegistryError::DuplicateAdapter
/// - 文字列での分岐はせず、map lookup だけで dispatch する
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ServiceId, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) -> Result<(), RegistryError> {
        let id = adapter.id().clone();
        if self.adapters.contains_key(&id) {
            return Err(RegistryError::DuplicateAdapter(id));
        }
        self.adapters.insert(id, adapter);
        Ok(())
    }

    pub fn get(&self, id: &ServiceId) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(id).cloned()
    }

    pub fn contains(&self, id: &ServiceId) -> bool {
        self.adapters.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn service_ids(&self) -> Vec<ServiceId> {
        let mut ids: Vec<ServiceId> = self.adapters.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("services", &self.service_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaClass;
    use crate::testing::ScriptedAdapter;

    #[test]
    fn register_and_get() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(ScriptedAdapter::new("svc-a", MediaClass::Image)))
            .unwrap();

        assert!(registry.get(&ServiceId::new("svc-a")).is_some());
        assert!(registry.get(&ServiceId::new("svc-b")).is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(ScriptedAdapter::new("svc-a", MediaClass::Image)))
            .unwrap();
        let result = registry.register(Arc::new(ScriptedAdapter::new("svc-a", MediaClass::Video)));

        assert!(matches!(
            result,
            Err(RegistryError::DuplicateAdapter(id)) if id.as_str() == "svc-a"
        ));
    }

    #[test]
    fn service_ids_are_sorted() {
        let mut registry = AdapterRegistry::new();
        for id in ["veo-2", "flux-kontext", "google-gemini"] {
            registry
                .register(Arc::new(ScriptedAdapter::new(id, MediaClass::Image)))
                .unwrap();
        }
        let ids: Vec<String> = registry
            .service_ids()
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["flux-kontext", "google-gemini", "veo-2"]);
    }
}
