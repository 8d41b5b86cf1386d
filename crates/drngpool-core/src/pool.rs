//! Per-domain DRNG replicas.
//!
//! Architecture:
//! 1. A backend is registered once per process (one `DrngManager`)
//! 2. The initial instance is allocated and serves every domain
//! 3. A one-shot background job allocates one instance per active domain
//! 4. The finished array is published once, atomically
//! 5. Readers switch to their domain's instance without taking a lock
//!
//! A failed build rolls back everything it allocated and leaves the pool
//! unpublished; the initial instance keeps serving all domains.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;

use serde::Serialize;

use crate::backend::DrngBackend;
use crate::config::DrngConfig;
use crate::error::{DrngError, Result};
use crate::instance::{GeneratorInstance, lock};
use crate::topology::DomainTopology;

/// Hooks for the seed accounting that lives outside this crate.
///
/// Both run only after the per-domain array has been published, with no
/// manager lock held, so hooks may call back into the manager.
pub trait PoolObserver: Send + Sync {
    /// A domain received its own instance.
    fn domain_instance_allocated(&self, _domain: usize) {}

    /// Every active domain now has an instance. Fired exactly once.
    fn all_domains_allocated(&self, _active_domains: usize) {}
}

/// Published, immutable array of per-domain instances.
///
/// Every slot holds an instance: inactive domains share the initial one.
#[derive(Debug)]
pub struct DomainInstances {
    slots: Box<[Arc<GeneratorInstance>]>,
}

impl DomainInstances {
    pub fn get(&self, domain: usize) -> Option<&Arc<GeneratorInstance>> {
        self.slots.get(domain)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Arc<GeneratorInstance>)> {
        self.slots.iter().enumerate()
    }
}

/// Result of one run of the domain build job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The array was published with this many freshly allocated instances.
    Published { dedicated: usize },
    /// An earlier run already published the array.
    AlreadyPublished,
    /// Another publisher got there between build and publish.
    LostRace,
}

/// Snapshot of the manager for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub backend: Option<String>,
    pub seed_hash: Option<String>,
    pub domains: usize,
    pub active_domains: Vec<usize>,
    pub initialized: bool,
    pub build_scheduled: bool,
    pub published: bool,
    pub dedicated_instances: usize,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Owns the instances allocated during a build until they are published.
///
/// Dropping an unfinished builder destroys every instance it allocated. The
/// initial instance is only borrowed and survives.
struct DomainPoolBuilder {
    initial: Arc<GeneratorInstance>,
    slots: Vec<Option<Arc<GeneratorInstance>>>,
    finished: bool,
}

impl DomainPoolBuilder {
    fn new(initial: Arc<GeneratorInstance>, domain_count: usize) -> Self {
        Self {
            initial,
            slots: vec![None; domain_count],
            finished: false,
        }
    }

    /// Fill `domains` in order. The first one reuses the initial instance,
    /// the rest get a fresh instance from `alloc`.
    fn fill(
        &mut self,
        domains: &[usize],
        mut alloc: impl FnMut(usize) -> Result<GeneratorInstance>,
    ) -> Result<()> {
        let mut initial_used = false;
        for &domain in domains {
            if domain >= self.slots.len() {
                log::warn!("ignoring domain {domain} outside the topology");
                continue;
            }
            if !initial_used {
                self.slots[domain] = Some(Arc::clone(&self.initial));
                initial_used = true;
                continue;
            }
            let drng = alloc(domain)?;
            log::info!("DRNG for domain {domain} allocated");
            self.slots[domain] = Some(Arc::new(drng));
        }
        Ok(())
    }

    fn is_dedicated(&self, slot: &Arc<GeneratorInstance>) -> bool {
        !Arc::ptr_eq(slot, &self.initial)
    }

    fn dedicated_domains(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(d, slot)| match slot {
                Some(drng) if self.is_dedicated(drng) => Some(d),
                _ => None,
            })
            .collect()
    }

    fn finish(mut self) -> DomainInstances {
        self.finished = true;
        let slots = std::mem::take(&mut self.slots)
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Arc::clone(&self.initial)))
            .collect();
        DomainInstances { slots }
    }
}

impl Drop for DomainPoolBuilder {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut released = 0;
        for drng in self.slots.iter().flatten().rev() {
            if self.is_dedicated(drng) {
                drng.destroy();
                released += 1;
            }
        }
        if released > 0 {
            log::warn!("rolled back {released} per-domain DRNG instances");
        }
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owner of the registered backend, the initial instance and the
/// per-domain array.
pub struct DrngManager {
    config: DrngConfig,
    topology: Box<dyn DomainTopology>,
    /// Registered backend. Its mutex also serializes domain builds.
    backend: Mutex<Option<Arc<dyn DrngBackend>>>,
    initial: OnceLock<Arc<GeneratorInstance>>,
    domains: OnceLock<DomainInstances>,
    build_scheduled: AtomicBool,
    observer: Option<Arc<dyn PoolObserver>>,
}

impl DrngManager {
    pub fn new(config: DrngConfig, topology: impl DomainTopology + 'static) -> Self {
        Self {
            config,
            topology: Box::new(topology),
            backend: Mutex::new(None),
            initial: OnceLock::new(),
            domains: OnceLock::new(),
            build_scheduled: AtomicBool::new(false),
            observer: None,
        }
    }

    /// Attach the seed-accounting hooks.
    pub fn with_observer(mut self, observer: Arc<dyn PoolObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &DrngConfig {
        &self.config
    }

    pub fn topology(&self) -> &dyn DomainTopology {
        self.topology.as_ref()
    }

    /// Install `backend`. Fails if one is already installed.
    pub fn register_backend(&self, backend: Arc<dyn DrngBackend>) -> Result<()> {
        let mut slot = lock(&self.backend);
        if let Some(current) = slot.as_ref() {
            log::error!("DRNG backend {} already registered", current.name());
            return Err(DrngError::AlreadyRegistered(current.name().to_string()));
        }
        log::info!("DRNG backend {} registered", backend.name());
        *slot = Some(backend);
        Ok(())
    }

    /// Remove the installed backend and return it.
    ///
    /// Fails once the initial instance exists. References the caller keeps
    /// to the backend do not count as use.
    pub fn unregister_backend(&self) -> Result<Option<Arc<dyn DrngBackend>>> {
        let mut slot = lock(&self.backend);
        if let Some(current) = slot.as_ref() {
            // Every instance is the initial one or a sibling of it, and the
            // initial instance lives as long as the manager.
            if self.initial.get().is_some() {
                return Err(DrngError::BackendInUse(current.name().to_string()));
            }
            log::info!("DRNG backend {} unregistered", current.name());
        }
        Ok(slot.take())
    }

    pub fn backend_name(&self) -> Option<String> {
        lock(&self.backend).as_ref().map(|b| b.name().to_string())
    }

    /// Allocate the initial instance if it does not exist yet.
    pub fn initialize(&self) -> Result<Arc<GeneratorInstance>> {
        let backend = lock(&self.backend);
        self.initialize_locked(&backend).map(Arc::clone)
    }

    fn initialize_locked(
        &self,
        backend: &Option<Arc<dyn DrngBackend>>,
    ) -> Result<&Arc<GeneratorInstance>> {
        if let Some(initial) = self.initial.get() {
            return Ok(initial);
        }
        let backend = backend.clone().ok_or(DrngError::NoBackend)?;
        let drng = GeneratorInstance::new(
            backend,
            self.config.seed_hash.as_deref(),
            self.config.security_strength,
        )?;
        log::info!("initial DRNG {} allocated", drng.name());
        Ok(self.initial.get_or_init(|| Arc::new(drng)))
    }

    pub fn initial_instance(&self) -> Option<&Arc<GeneratorInstance>> {
        self.initial.get()
    }

    /// Instance serving `domain`. Never blocks.
    ///
    /// Before the per-domain array is published, and for ids outside it,
    /// this is the initial instance. `None` until the manager is initialized.
    pub fn instance(&self, domain: usize) -> Option<&Arc<GeneratorInstance>> {
        match self.domains.get() {
            Some(domains) => domains.get(domain).or_else(|| self.initial.get()),
            None => self.initial.get(),
        }
    }

    /// The published per-domain array, if any.
    pub fn domain_instances(&self) -> Option<&DomainInstances> {
        self.domains.get()
    }

    pub fn is_published(&self) -> bool {
        self.domains.get().is_some()
    }

    /// Allocate and publish one instance per active domain.
    ///
    /// Runs at most once to completion: later calls see the published array
    /// and return [`BuildOutcome::AlreadyPublished`]. On error nothing is
    /// published and every instance allocated by this call is destroyed.
    pub fn build_domain_instances(&self) -> Result<BuildOutcome> {
        let backend = lock(&self.backend);
        if self.domains.get().is_some() {
            return Ok(BuildOutcome::AlreadyPublished);
        }

        let initial = Arc::clone(self.initialize_locked(&backend)?);
        let strength = self.config.security_strength;
        let active = self.topology.active_domains();

        let mut builder = DomainPoolBuilder::new(Arc::clone(&initial), self.topology.domain_count());
        builder
            .fill(&active, |_| initial.sibling(strength))
            .inspect_err(|e| log::error!("per-domain DRNG allocation failed: {e}"))?;
        let dedicated = builder.dedicated_domains();

        if self.domains.set(builder.finish()).is_err() {
            log::warn!("per-domain DRNGs were published concurrently, discarding this build");
            return Ok(BuildOutcome::LostRace);
        }
        log::info!(
            "per-domain DRNGs published for {} active domains ({} dedicated)",
            active.len(),
            dedicated.len()
        );
        drop(backend);

        if let Some(observer) = &self.observer {
            for &domain in &dedicated {
                observer.domain_instance_allocated(domain);
            }
            observer.all_domains_allocated(active.len());
        }
        Ok(BuildOutcome::Published {
            dedicated: dedicated.len(),
        })
    }

    /// Start the domain build on a background thread.
    ///
    /// Only the first call spawns the job; later calls return `None`. The
    /// returned handle may be joined but nothing needs to wait for it.
    pub fn schedule_domain_build(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.build_scheduled.swap(true, Ordering::AcqRel) {
            return None;
        }
        let manager = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name("drng-domain-build".to_string())
            .spawn(move || manager.run_domain_build());
        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("{}", DrngError::Spawn(e.to_string()));
                self.build_scheduled.store(false, Ordering::Release);
                None
            }
        }
    }

    fn run_domain_build(&self) {
        match self.build_domain_instances() {
            Ok(outcome) => log::debug!("domain build finished: {outcome:?}"),
            Err(e) => log::error!("all domains keep using the initial DRNG: {e}"),
        }
    }

    fn select(&self, domain: usize) -> Result<&Arc<GeneratorInstance>> {
        match self.instance(domain) {
            Some(drng) => Ok(drng),
            None => {
                self.initialize()?;
                self.instance(domain).ok_or(DrngError::NoBackend)
            }
        }
    }

    /// Random bytes from the instance serving `domain`.
    pub fn generate(&self, domain: usize, len: usize) -> Result<Vec<u8>> {
        self.select(domain)?.generate(len)
    }

    /// Reseed the instance serving `domain`.
    pub fn reseed(&self, domain: usize, seed: &[u8]) -> Result<()> {
        self.select(domain)?.reseed(seed)
    }

    pub fn status(&self) -> PoolStatus {
        let initial = self.initial.get();
        let dedicated_instances = self.domains.get().map_or(0, |domains| {
            domains
                .iter()
                .filter(|(_, drng)| initial.is_none_or(|i| !Arc::ptr_eq(drng, i)))
                .count()
        });
        PoolStatus {
            backend: self.backend_name(),
            seed_hash: initial
                .and_then(|i| i.seed_hash())
                .map(|h| h.name().to_string()),
            domains: self.topology.domain_count(),
            active_domains: self.topology.active_domains(),
            initialized: initial.is_some(),
            build_scheduled: self.build_scheduled.load(Ordering::Acquire),
            published: self.is_published(),
            dedicated_instances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::topology::StaticTopology;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl PoolObserver for RecordingObserver {
        fn domain_instance_allocated(&self, domain: usize) {
            self.events.lock().unwrap().push(format!("domain {domain}"));
        }
        fn all_domains_allocated(&self, active_domains: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("all {active_domains}"));
        }
    }

    fn manager(backend: &Arc<MockBackend>, topology: StaticTopology) -> DrngManager {
        let manager = DrngManager::new(DrngConfig::default(), topology);
        manager.register_backend(backend.clone()).unwrap();
        manager
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    #[test]
    fn test_double_registration_rejected() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(1));
        let err = manager.register_backend(backend.clone()).unwrap_err();
        assert_eq!(err, DrngError::AlreadyRegistered("mock".into()));
    }

    #[test]
    fn test_unregister_then_register() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(1));
        assert!(manager.unregister_backend().unwrap().is_some());
        assert_eq!(manager.backend_name(), None);
        assert!(manager.unregister_backend().unwrap().is_none());
        manager.register_backend(backend.clone()).unwrap();
        assert_eq!(manager.backend_name().as_deref(), Some("mock"));
    }

    #[test]
    fn test_unregister_while_caller_holds_backend() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(2));
        let extra = backend.clone();
        let removed = manager.unregister_backend().unwrap().unwrap();
        let expected: Arc<dyn DrngBackend> = extra;
        assert!(Arc::ptr_eq(&removed, &expected));
        assert_eq!(backend.allocs(), 0);
    }

    #[test]
    fn test_unregister_refused_while_in_use() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(1));
        manager.initialize().unwrap();
        assert!(matches!(
            manager.unregister_backend(),
            Err(DrngError::BackendInUse(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------------

    #[test]
    fn test_no_instance_before_initialize() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(2));
        assert!(manager.instance(0).is_none());
        assert_eq!(backend.allocs(), 0);
    }

    #[test]
    fn test_initial_instance_serves_every_domain() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(3));
        let initial = manager.initialize().unwrap();
        for domain in 0..5 {
            assert!(Arc::ptr_eq(manager.instance(domain).unwrap(), &initial));
        }
        assert!(Arc::ptr_eq(&manager.initialize().unwrap(), &initial));
        assert_eq!(backend.allocs(), 1);
    }

    #[test]
    fn test_generate_initializes_lazily() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(2));
        assert_eq!(manager.generate(1, 10).unwrap().len(), 10);
        manager.reseed(1, b"more seed").unwrap();
        assert!(manager.initial_instance().is_some());
    }

    #[test]
    fn test_generate_without_backend_fails() {
        let manager = DrngManager::new(DrngConfig::default(), StaticTopology::new(1));
        assert_eq!(manager.generate(0, 4).unwrap_err(), DrngError::NoBackend);
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    #[test]
    fn test_build_reuses_initial_for_first_domain() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(3));
        let initial = manager.initialize().unwrap();

        let outcome = manager.build_domain_instances().unwrap();
        assert_eq!(outcome, BuildOutcome::Published { dedicated: 2 });
        assert!(Arc::ptr_eq(manager.instance(0).unwrap(), &initial));
        assert!(!Arc::ptr_eq(manager.instance(1).unwrap(), &initial));
        assert!(!Arc::ptr_eq(
            manager.instance(1).unwrap(),
            manager.instance(2).unwrap()
        ));
        assert_eq!(backend.allocs(), 3);
    }

    #[test]
    fn test_build_allocates_initial_when_missing() {
        let backend = Arc::new(MockBackend::with_seed_size(0));
        let manager = manager(&backend, StaticTopology::new(2));
        manager.build_domain_instances().unwrap();
        let initial = manager.initial_instance().unwrap();
        assert!(Arc::ptr_eq(manager.instance(0).unwrap(), initial));
        assert_eq!(backend.allocs(), 2);
    }

    #[test]
    fn test_first_active_domain_reuses_initial() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::with_inactive(3, &[0]));
        let initial = manager.initialize().unwrap();
        manager.build_domain_instances().unwrap();

        let domains = manager.domain_instances().unwrap();
        assert_eq!(domains.len(), 3);
        assert!(Arc::ptr_eq(domains.get(0).unwrap(), &initial));
        assert!(Arc::ptr_eq(domains.get(1).unwrap(), &initial));
        assert!(!Arc::ptr_eq(domains.get(2).unwrap(), &initial));
        assert_eq!(backend.allocs(), 2);
    }

    #[test]
    fn test_second_build_is_noop() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = manager(&backend, StaticTopology::new(2));
        manager.build_domain_instances().unwrap();
        let before = manager.instance(1).unwrap().id();
        assert_eq!(
            manager.build_domain_instances().unwrap(),
            BuildOutcome::AlreadyPublished
        );
        assert_eq!(manager.instance(1).unwrap().id(), before);
        assert_eq!(backend.allocs(), 2);
    }

    #[test]
    fn test_build_without_backend_fails() {
        let manager = DrngManager::new(DrngConfig::default(), StaticTopology::new(2));
        assert_eq!(
            manager.build_domain_instances().unwrap_err(),
            DrngError::NoBackend
        );
        assert!(!manager.is_published());
    }

    #[test]
    fn test_failed_build_rolls_back() {
        let backend = Arc::new(MockBackend {
            fail_alloc_at: Some(4),
            ..MockBackend::with_seed_size(32)
        });
        let manager = manager(&backend, StaticTopology::new(4));
        let initial = manager.initialize().unwrap();

        let err = manager.build_domain_instances().unwrap_err();
        assert_eq!(err, DrngError::AllocationFailed("mock".into()));
        assert!(!manager.is_published());
        assert_eq!(backend.allocs(), 3);
        assert_eq!(backend.live(), 1);
        assert!(!initial.is_destroyed());
        assert!(Arc::ptr_eq(manager.instance(3).unwrap(), &initial));
        assert_eq!(manager.generate(2, 8).unwrap().len(), 8);
    }

    #[test]
    fn test_observer_fired_once_after_publish() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let observer = Arc::new(RecordingObserver::default());
        let manager = DrngManager::new(DrngConfig::default(), StaticTopology::new(3))
            .with_observer(observer.clone());
        manager.register_backend(backend.clone()).unwrap();

        manager.build_domain_instances().unwrap();
        manager.build_domain_instances().unwrap();
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec!["domain 1", "domain 2", "all 3"]
        );
    }

    #[derive(Default)]
    struct ReentrantObserver {
        manager: OnceLock<std::sync::Weak<DrngManager>>,
        seen: Mutex<Vec<Option<String>>>,
    }

    impl PoolObserver for ReentrantObserver {
        fn all_domains_allocated(&self, _active_domains: usize) {
            let manager = self.manager.get().and_then(|m| m.upgrade()).unwrap();
            let status = manager.status();
            assert!(status.published);
            self.seen.lock().unwrap().push(status.backend);
        }
    }

    #[test]
    fn test_observer_may_query_manager() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let observer = Arc::new(ReentrantObserver::default());
        let manager = Arc::new(
            DrngManager::new(DrngConfig::default(), StaticTopology::new(2))
                .with_observer(observer.clone()),
        );
        observer.manager.set(Arc::downgrade(&manager)).unwrap();
        manager.register_backend(backend.clone()).unwrap();

        manager.schedule_domain_build().unwrap().join().unwrap();
        assert_eq!(*observer.seen.lock().unwrap(), vec![Some("mock".to_string())]);
    }

    #[test]
    fn test_observer_silent_on_failure() {
        let backend = Arc::new(MockBackend {
            fail_alloc_at: Some(2),
            ..MockBackend::with_seed_size(32)
        });
        let observer = Arc::new(RecordingObserver::default());
        let manager = DrngManager::new(DrngConfig::default(), StaticTopology::new(2))
            .with_observer(observer.clone());
        manager.register_backend(backend.clone()).unwrap();

        assert!(manager.build_domain_instances().is_err());
        assert!(observer.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_builder_drop_skips_initial() {
        let backend = Arc::new(MockBackend::with_seed_size(0));
        let dyn_backend: Arc<dyn DrngBackend> = backend.clone();
        let initial = Arc::new(GeneratorInstance::new(dyn_backend, None, 32).unwrap());
        {
            let mut builder = DomainPoolBuilder::new(Arc::clone(&initial), 3);
            builder
                .fill(&[0, 1, 2], |_| initial.sibling(32))
                .unwrap();
            assert_eq!(builder.dedicated_domains(), vec![1, 2]);
            assert_eq!(backend.live(), 3);
        }
        assert_eq!(backend.live(), 1);
        assert!(!initial.is_destroyed());
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    #[test]
    fn test_schedule_only_once() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = Arc::new(manager(&backend, StaticTopology::new(2)));
        let handle = manager.schedule_domain_build().unwrap();
        assert!(manager.schedule_domain_build().is_none());
        handle.join().unwrap();
        assert!(manager.is_published());
        assert!(manager.schedule_domain_build().is_none());
        assert_eq!(backend.allocs(), 2);
    }

    #[test]
    fn test_concurrent_schedules_spawn_one_job() {
        let backend = Arc::new(MockBackend::with_seed_size(32));
        let manager = Arc::new(manager(&backend, StaticTopology::new(4)));
        let handles: Vec<_> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| s.spawn(|| manager.schedule_domain_build()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        let spawned: Vec<_> = handles.into_iter().flatten().collect();
        assert_eq!(spawned.len(), 1);
        for handle in spawned {
            handle.join().unwrap();
        }
        assert!(manager.is_published());
        assert_eq!(backend.allocs(), 4);
    }

    #[test]
    fn test_failed_scheduled_build_stays_on_initial() {
        let backend = Arc::new(MockBackend {
            fail_alloc_at: Some(2),
            ..MockBackend::with_seed_size(32)
        });
        let manager = Arc::new(manager(&backend, StaticTopology::new(2)));
        manager.schedule_domain_build().unwrap().join().unwrap();
        assert!(!manager.is_published());
        assert!(manager.schedule_domain_build().is_none());
        let initial = manager.initial_instance().unwrap();
        assert!(Arc::ptr_eq(manager.instance(1).unwrap(), initial));
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    #[test]
    fn test_status_tracks_lifecycle() {
        let backend = Arc::new(MockBackend::with_seed_size(48));
        let manager = manager(&backend, StaticTopology::new(3));
        let status = manager.status();
        assert!(!status.initialized);
        assert!(!status.published);
        assert_eq!(status.seed_hash, None);

        manager.build_domain_instances().unwrap();
        let status = manager.status();
        assert_eq!(status.backend.as_deref(), Some("mock"));
        assert_eq!(status.seed_hash.as_deref(), Some("sha384"));
        assert_eq!(status.domains, 3);
        assert_eq!(status.active_domains, vec![0, 1, 2]);
        assert!(status.initialized);
        assert!(status.published);
        assert_eq!(status.dedicated_instances, 2);
    }
}
