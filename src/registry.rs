//! Descriptor registry: a read-mostly, race-safe cache from method identity
//! to its built [`MethodDescriptor`]. Writes only
//! occur at first lookup per method; a double-insert race is tolerated and
//! resolved last-write-wins.

use crate::descriptor::MethodDescriptor;
use crate::error::ClientError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
pub struct DescriptorRegistry {
    cache: RwLock<HashMap<TypeId, Arc<MethodDescriptor>>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self { DescriptorRegistry::default() }

    /// Returns the cached descriptor for `Op`, building (and validating) it
    /// on first lookup via `build`. Build failures are not cached, so a
    /// transient authoring mistake fixed between calls can succeed later;
    /// successful builds are cached for the registry's lifetime.
    pub fn get_or_build<Op: Any>(
        &self,
        build: impl FnOnce() -> Result<MethodDescriptor, ClientError>,
    ) -> Result<Arc<MethodDescriptor>, ClientError> {
        let key = TypeId::of::<Op>();
        if let Some(found) = self.cache.read().expect("registry lock poisoned").get(&key) {
            return Ok(found.clone());
        }

        let built = Arc::new(build()?);
        let mut guard = self.cache.write().expect("registry lock poisoned");
        // Tolerate a concurrent double-insert: last writer wins, but we
        // still hand back whatever ended up in the map so all racing
        // callers observe the same descriptor.
        guard.insert(key, built.clone());
        Ok(guard.get(&key).expect("just inserted").clone())
    }

    pub fn len(&self) -> usize { self.cache.read().expect("registry lock poisoned").len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{MethodDescriptorBuilder, Verb};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OpA;
    struct OpB;

    #[test]
    fn caches_per_type_and_builds_once() {
        let registry = DescriptorRegistry::new();
        let builds = AtomicUsize::new(0);

        let build_a = || {
            builds.fetch_add(1, Ordering::SeqCst);
            MethodDescriptorBuilder::new("a", Verb::Get, "/a").build()
        };

        let d1 = registry.get_or_build::<OpA>(build_a).unwrap();
        let d2 = registry.get_or_build::<OpA>(build_a).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(d1, d2);

        let d3 = registry
            .get_or_build::<OpB>(|| MethodDescriptorBuilder::new("b", Verb::Post, "/b").build())
            .unwrap();
        assert_ne!(d3.method_name, d1.method_name);
        assert_eq!(registry.len(), 2);
    }
}
