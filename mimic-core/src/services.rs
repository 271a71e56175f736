//! Services handle threaded through adaptations.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

/// Shared services handle.
pub type ServicesRef = Arc<dyn Services>;

/// Resolves services by capability type.
///
/// The engine never owns the scope behind a handle; whoever created it
/// releases it.
pub trait Services: Send + Sync {
    fn resolve_any(&self, capability: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

impl dyn Services {
    /// Resolve a service by its concrete type.
    pub fn resolve<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.resolve_any(TypeId::of::<T>())
            .and_then(|service| service.downcast::<T>().ok())
    }
}

/// A fixed map of services keyed by type.
#[derive(Default, Clone)]
pub struct ServiceMap {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Any + Send + Sync>(mut self, service: T) -> Self {
        self.entries.insert(TypeId::of::<T>(), Arc::new(service));
        self
    }

    pub fn into_ref(self) -> ServicesRef {
        Arc::new(self)
    }
}

impl Services for ServiceMap {
    fn resolve_any(&self, capability: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(&capability).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Clock(u64);

    #[test]
    fn test_resolve_by_type() {
        let services = ServiceMap::new().with(Clock(42)).into_ref();
        assert_eq!(services.resolve::<Clock>().as_deref(), Some(&Clock(42)));
        assert!(services.resolve::<String>().is_none());
    }
}
