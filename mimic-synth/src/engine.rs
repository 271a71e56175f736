//! The adaptation engine: registration, synthesis and instance construction.

use std::sync::Arc;

use mimic_core::{EnumInfo, Error, ObjectRef, Result, ServicesRef, TypeInfo};
use mimic_ir::SynthesisKey;
use mimic_manifest::{ContractDescriptor, Manifest};
use tracing::info;

use crate::{
    AdaptedInstance, AdapterType, CallEnv, Hook, HookRegistry, TypeCache, TypeRegistry,
    pipeline::{Pipeline, Plugin, SynthesisRequest},
    strategy::{self, Strategy},
};

/// State shared by an engine and every instance it adapts.
pub(crate) struct EngineInner {
    pub(crate) registry: TypeRegistry,
    pub(crate) hooks: HookRegistry,
    pub(crate) strategies: Vec<Arc<dyn Strategy>>,
    pipeline: Pipeline,
    cache: TypeCache,
}

impl EngineInner {
    fn synthesize(&self, source: &Arc<TypeInfo>, key: SynthesisKey) -> Result<Arc<AdapterType>> {
        self.cache.get_or_try_insert(&key, || {
            let request = SynthesisRequest {
                key: &key,
                source,
                registry: &self.registry,
                hooks: &self.hooks,
                strategies: &self.strategies,
            };
            let mut ctx = self.pipeline.run(request)?;
            let adapter = ctx.take_adapter()?;
            info!(
                adapter = %adapter.name(),
                slots = adapter.slots().count(),
                builds = self.cache.builds(),
                "synthesized adapter type"
            );
            Ok(adapter)
        })
    }

    fn check_contracts(&self, contracts: &[&str]) -> Result<()> {
        if contracts.is_empty() {
            return Err(Error::argument("contracts", "at least one contract is required"));
        }
        for contract in contracts {
            if contract.trim().is_empty() {
                return Err(Error::argument("contracts", "contract name is empty"));
            }
            if !self.registry.is_contract(contract) {
                return Err(Error::argument(
                    "contracts",
                    format!("contract '{}' is not registered", contract),
                ));
            }
        }
        Ok(())
    }

    /// Adapt an object, synthesizing its adapter type on first use.
    pub(crate) fn adapt_object(
        engine: &Arc<EngineInner>,
        source: ObjectRef,
        contracts: &[&str],
        services: Option<ServicesRef>,
    ) -> Result<Arc<AdaptedInstance>> {
        engine.check_contracts(contracts)?;
        let info = source.type_info();
        let key = SynthesisKey::new(info.name.as_str(), contracts.iter().copied());
        let ty = engine.synthesize(&info, key)?;
        let env = CallEnv::new(source, services, Arc::clone(engine));
        Ok(Arc::new(AdaptedInstance::new(ty, env)))
    }
}

/// Synthesizes adapter types and adapts objects to contracts.
///
/// Cloning is cheap; clones share the registry and the type cache.
///
/// # Example
///
/// ```ignore
/// let engine = Engine::builder()
///     .manifest(manifest)
///     .with_default_strategies()
///     .build();
///
/// let child = engine.adapt(Some(object), "IChild", None)?.unwrap();
/// assert_eq!(child.get("Test")?, Value::from("yikes"));
/// ```
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    pub fn cache(&self) -> &TypeCache {
        &self.inner.cache
    }

    /// Get or build the adapter type of a registered source type.
    ///
    /// # Errors
    ///
    /// `Argument` if the source type or a contract is missing or not
    /// registered, `AdapterGeneration` if synthesis fails.
    pub fn synthesize(&self, source_type: &str, contracts: &[&str]) -> Result<Arc<AdapterType>> {
        if source_type.trim().is_empty() {
            return Err(Error::argument("source_type", "source type name is empty"));
        }
        let source = self
            .inner
            .registry
            .type_info(source_type)
            .ok_or_else(|| {
                Error::argument(
                    "source_type",
                    format!("type '{}' is not registered", source_type),
                )
            })?;
        self.synthesize_for(source, contracts)
    }

    /// Get or build the adapter type for a source description that need not
    /// be registered.
    pub fn synthesize_for(
        &self,
        source: &Arc<TypeInfo>,
        contracts: &[&str],
    ) -> Result<Arc<AdapterType>> {
        self.inner.check_contracts(contracts)?;
        let key = SynthesisKey::new(source.name.as_str(), contracts.iter().copied());
        self.inner.synthesize(source, key)
    }

    /// Adapt `instance` to one contract. `None` adapts to `None`.
    pub fn adapt(
        &self,
        instance: Option<ObjectRef>,
        contract: &str,
        services: Option<ServicesRef>,
    ) -> Result<Option<Arc<AdaptedInstance>>> {
        self.adapt_all(instance, &[contract], services)
    }

    /// Adapt `instance` to several contracts at once. `None` adapts to `None`.
    ///
    /// # Errors
    ///
    /// Contracts are checked first, so a bad contract list fails even when
    /// there is nothing to adapt.
    pub fn adapt_all(
        &self,
        instance: Option<ObjectRef>,
        contracts: &[&str],
        services: Option<ServicesRef>,
    ) -> Result<Option<Arc<AdaptedInstance>>> {
        self.inner.check_contracts(contracts)?;
        let Some(source) = instance else {
            return Ok(None);
        };
        EngineInner::adapt_object(&self.inner, source, contracts, services).map(Some)
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    registry: TypeRegistry,
    hooks: HookRegistry,
    strategies: Vec<Arc<dyn Strategy>>,
    pipeline: Pipeline,
    imports: Vec<Arc<AdapterType>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source type.
    pub fn source_type(mut self, info: Arc<TypeInfo>) -> Self {
        self.registry.register_type(info);
        self
    }

    pub fn enum_info(mut self, info: EnumInfo) -> Self {
        self.registry.register_enum(info);
        self
    }

    pub fn contract(mut self, contract: ContractDescriptor) -> Self {
        self.registry.register_contract(contract);
        self
    }

    /// Register every contract and enum of a manifest.
    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.registry.load(manifest);
        self
    }

    /// Add a strategy after those already registered.
    pub fn strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Add the built-in strategies after those already registered.
    pub fn with_default_strategies(mut self) -> Self {
        self.strategies.extend(strategy::defaults());
        self
    }

    pub fn hook(mut self, name: impl Into<String>, hook: impl Hook + 'static) -> Self {
        self.hooks.register(name, Arc::new(hook));
        self
    }

    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.pipeline.add_plugin(Box::new(plugin));
        self
    }

    /// Replace the synthesis pipeline, keeping plugins already added.
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        let previous = std::mem::replace(&mut self.pipeline, pipeline);
        self.pipeline.take_plugins_from(previous);
        self
    }

    /// Seed the cache with an adapter type built by another engine.
    pub fn import(mut self, ty: Arc<AdapterType>) -> Self {
        self.imports.push(ty);
        self
    }

    pub fn build(self) -> Engine {
        let cache = TypeCache::new();
        for ty in self.imports {
            cache.insert(ty);
        }

        Engine {
            inner: Arc::new(EngineInner {
                registry: self.registry,
                hooks: self.hooks,
                strategies: self.strategies,
                pipeline: self.pipeline,
                cache,
            }),
        }
    }
}
