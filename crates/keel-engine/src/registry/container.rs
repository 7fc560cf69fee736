use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::core::QuitSignal;

use super::error::RegistryError;
use super::service::{Construct, Dependencies, Inject, Service};

type Disposer = Box<dyn Fn() + Send + Sync>;

struct Entry {
    name: &'static str,
    /// Registration sequence number; disposal runs in reverse.
    order: u64,
    /// Always an `Arc<T>` for the `T` this entry is keyed under.
    instance: Box<dyn Any + Send + Sync>,
    dispose: Option<Disposer>,
}

/// Process-wide map from service type to its single instance.
///
/// The map sits behind an `RwLock`, so resolving from a background worker is
/// safe; all registration is expected on the logic thread during startup.
///
/// Once the application's [`QuitSignal`] fires, every service is disposed and
/// all further requests are refused with [`RegistryError::ShuttingDown`].
pub struct ServiceRegistry {
    entries:    RwLock<HashMap<TypeId, Entry>>,
    next_order: AtomicU64,
    quit:       Arc<QuitSignal>,
    disposed:   AtomicBool,
}

impl ServiceRegistry {
    /// Creates an empty registry that tears itself down when `quit` fires.
    pub fn new(quit: Arc<QuitSignal>) -> Arc<Self> {
        let registry = Arc::new(Self {
            entries:    RwLock::new(HashMap::new()),
            next_order: AtomicU64::new(0),
            quit:       Arc::clone(&quit),
            disposed:   AtomicBool::new(false),
        });

        let weak = Arc::downgrade(&registry);
        quit.subscribe(move |_| {
            if let Some(registry) = weak.upgrade() {
                registry.dispose_all();
            }
        });

        registry
    }

    #[inline]
    pub fn is_quitting(&self) -> bool {
        self.quit.is_quitting()
    }

    // ── registration ──────────────────────────────────────────────────────

    /// Registers `instance` under its concrete type.
    ///
    /// Its [`Service::dispose`] hook runs when the application quits.
    pub fn register<T: Service>(&self, instance: Arc<T>) -> Result<Arc<T>, RegistryError> {
        let hook = Arc::clone(&instance);
        let dispose: Disposer = Box::new(move || hook.dispose());
        self.insert::<T>(Arc::clone(&instance), Some(dispose))?;
        Ok(instance)
    }

    /// Registers `instance` under an explicit, usually abstract, contract.
    ///
    /// `contract` upcasts the concrete service to the type it is keyed under;
    /// the concrete type keeps its [`Service::dispose`] hook.
    ///
    /// ```rust,ignore
    /// registry.register_as::<dyn Clock, _>(Arc::new(SystemClock), |c| c)?;
    /// let clock = registry.resolve::<dyn Clock>()?;
    /// ```
    ///
    /// `dyn Any` contracts are rejected as [`RegistryError::TooGeneric`].
    pub fn register_as<T, S>(
        &self,
        instance: Arc<S>,
        contract: impl FnOnce(Arc<S>) -> Arc<T>,
    ) -> Result<Arc<T>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
        S: Service,
    {
        let hook = Arc::clone(&instance);
        let dispose: Disposer = Box::new(move || hook.dispose());
        let bound = contract(instance);
        self.insert::<T>(Arc::clone(&bound), Some(dispose))?;
        Ok(bound)
    }

    /// Builds `T` from its single declared constructor and registers it.
    ///
    /// Fails here, not at first resolution, when `T` declares zero or several
    /// constructors or when a dependency is missing.
    pub fn register_constructed<T: Construct>(&self) -> Result<Arc<T>, RegistryError> {
        let service = type_name::<T>();
        let [constructor] = <[_; 1]>::try_from(T::constructors()).map_err(|found: Vec<_>| {
            let err = RegistryError::ConstructorCount { service, found: found.len() };
            log::error!("{err}");
            err
        })?;

        let deps = Dependencies::new(self, service);
        let instance = constructor.build(&deps).inspect_err(|err| {
            log::error!("failed to construct `{service}`: {err}");
        })?;

        self.register(Arc::new(instance))
    }

    fn insert<T>(&self, instance: Arc<T>, dispose: Option<Disposer>) -> Result<(), RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let name = type_name::<T>();

        if is_too_generic::<T>() {
            let err = RegistryError::TooGeneric(name);
            log::error!("{err}");
            return Err(err);
        }
        if self.is_quitting() {
            let err = RegistryError::ShuttingDown(name);
            log::error!("tried to register while quitting: {err}");
            return Err(err);
        }

        let mut entries = self.entries.write();
        if entries.contains_key(&TypeId::of::<T>()) {
            let err = RegistryError::AlreadyRegistered(name);
            log::error!("{err}");
            return Err(err);
        }

        let order = self.next_order.fetch_add(1, Ordering::Relaxed);
        entries.insert(TypeId::of::<T>(), Entry {
            name,
            order,
            instance: Box::new(instance),
            dispose,
        });
        log::debug!("registered service `{name}`");
        Ok(())
    }

    // ── resolution ────────────────────────────────────────────────────────

    /// Returns the instance bound to `T`.
    ///
    /// After quitting has begun this logs and returns
    /// [`RegistryError::ShuttingDown`] instead of touching a half torn-down
    /// service.
    pub fn resolve<T>(&self) -> Result<Arc<T>, RegistryError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let name = type_name::<T>();
        if self.is_quitting() {
            log::error!("tried to resolve `{name}` while quitting; it will not be resolved");
            return Err(RegistryError::ShuttingDown(name));
        }

        self.entries
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.instance.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or(RegistryError::NotRegistered(name))
    }

    /// Like [`resolve`](Self::resolve) but yields `None` on any failure.
    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>().ok()
    }

    /// `true` if `T` is registered (regardless of quitting state).
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.entries.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wires `target` through its [`Inject`] impl.
    ///
    /// Refused (logged, `ShuttingDown`) once quitting has begun.
    pub fn inject_dependencies<T: Inject>(&self, target: &mut T) -> Result<(), RegistryError> {
        let name = type_name::<T>();
        if self.is_quitting() {
            log::error!("tried to inject dependencies into `{name}` while quitting; skipped");
            return Err(RegistryError::ShuttingDown(name));
        }
        target.inject(&Dependencies::new(self, name)).inspect_err(|err| {
            log::error!("error injecting dependencies into `{name}`: {err}");
        })
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    fn dispose_all(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Drain first so dispose hooks run without the map locked.
        let mut drained: Vec<Entry> = self.entries.write().drain().map(|(_, e)| e).collect();
        drained.sort_by(|a, b| b.order.cmp(&a.order));

        let count = drained.len();
        for entry in &drained {
            if let Some(dispose) = &entry.dispose {
                log::debug!("disposing `{}`", entry.name);
                dispose();
            }
        }
        log::info!("service registry disposed ({count} services)");
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        let mut names: Vec<_> = entries.values().map(|e| (e.order, e.name)).collect();
        names.sort();
        f.debug_struct("ServiceRegistry")
            .field("services", &names.into_iter().map(|(_, n)| n).collect::<Vec<_>>())
            .field("quitting", &self.is_quitting())
            .finish()
    }
}

fn is_too_generic<T: ?Sized + 'static>() -> bool {
    let id = TypeId::of::<T>();
    id == TypeId::of::<dyn Any>()
        || id == TypeId::of::<dyn Any + Send>()
        || id == TypeId::of::<dyn Any + Send + Sync>()
        || id == TypeId::of::<()>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Constructor;
    use parking_lot::Mutex;

    fn registry() -> (Arc<ServiceRegistry>, Arc<QuitSignal>) {
        let quit = Arc::new(QuitSignal::new());
        (ServiceRegistry::new(Arc::clone(&quit)), quit)
    }

    #[derive(Debug)]
    struct Audio;
    impl Service for Audio {}

    #[derive(Debug)]
    struct Mixer {
        audio: Arc<Audio>,
    }
    impl Service for Mixer {}
    impl Construct for Mixer {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|deps| Ok(Self { audio: deps.get()? }))]
        }
    }

    #[derive(Debug)]
    struct Ambiguous;
    impl Service for Ambiguous {}
    impl Construct for Ambiguous {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|_| Ok(Self)), Constructor::new(|_| Ok(Self))]
        }
    }

    struct Tracked {
        name: &'static str,
        log:  Arc<Mutex<Vec<&'static str>>>,
    }
    impl Service for Tracked {
        fn dispose(&self) {
            self.log.lock().push(self.name);
        }
    }
    struct TrackedToo(Tracked);
    impl Service for TrackedToo {
        fn dispose(&self) {
            self.0.dispose();
        }
    }

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }
    struct English;
    impl Service for English {}
    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    // ── register / resolve ────────────────────────────────────────────────

    #[test]
    fn resolve_before_register_is_not_registered() {
        let (reg, _quit) = registry();
        assert_eq!(
            reg.resolve::<Audio>().unwrap_err(),
            RegistryError::NotRegistered(type_name::<Audio>())
        );
    }

    #[test]
    fn resolve_returns_the_same_instance() {
        let (reg, _quit) = registry();
        let audio = reg.register(Arc::new(Audio)).unwrap();
        let a = reg.resolve::<Audio>().unwrap();
        let b = reg.resolve::<Audio>().unwrap();
        assert!(Arc::ptr_eq(&audio, &a));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let (reg, _quit) = registry();
        let first = reg.register(Arc::new(Audio)).unwrap();
        let err = reg.register(Arc::new(Audio)).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered(type_name::<Audio>()));
        assert!(Arc::ptr_eq(&first, &reg.resolve::<Audio>().unwrap()));
    }

    #[test]
    fn abstract_contracts_resolve_through_trait_objects() {
        let (reg, _quit) = registry();
        reg.register_as::<dyn Greeter, _>(Arc::new(English), |g| g).unwrap();
        assert_eq!(reg.resolve::<dyn Greeter>().unwrap().greet(), "hello");
        assert!(!reg.contains::<English>());
    }

    #[test]
    fn any_contracts_are_too_generic() {
        let (reg, _quit) = registry();
        let err = reg
            .register_as::<dyn Any + Send + Sync, _>(Arc::new(Audio), |a| a)
            .unwrap_err();
        assert!(matches!(err, RegistryError::TooGeneric(_)));
        assert!(reg.is_empty());
    }

    #[test]
    fn resolving_from_another_thread_while_registering() {
        let (reg, _quit) = registry();
        let reader = Arc::clone(&reg);

        let handle = std::thread::spawn(move || {
            let mut misses = 0u64;
            loop {
                if let Some(audio) = reader.try_resolve::<Audio>() {
                    return (audio, misses);
                }
                misses += 1;
                std::thread::yield_now();
            }
        });

        let log = Arc::new(Mutex::new(Vec::new()));
        reg.register(Arc::new(Tracked { name: "tracked", log })).unwrap();
        reg.register_as::<dyn Greeter, _>(Arc::new(English), |g| g).unwrap();
        let audio = reg.register(Arc::new(Audio)).unwrap();

        let (seen, _misses) = handle.join().unwrap();
        assert!(Arc::ptr_eq(&seen, &audio));
        assert_eq!(reg.len(), 3);
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn constructed_services_receive_dependencies() {
        let (reg, _quit) = registry();
        let audio = reg.register(Arc::new(Audio)).unwrap();
        let mixer = reg.register_constructed::<Mixer>().unwrap();
        assert!(Arc::ptr_eq(&mixer.audio, &audio));
    }

    #[test]
    fn missing_dependency_fails_at_registration() {
        let (reg, _quit) = registry();
        let err = reg.register_constructed::<Mixer>().unwrap_err();
        assert_eq!(err, RegistryError::MissingDependency {
            service:    type_name::<Mixer>(),
            dependency: type_name::<Audio>(),
        });
        assert!(!reg.contains::<Mixer>());
    }

    #[test]
    fn two_constructors_fail_at_registration() {
        let (reg, _quit) = registry();
        let err = reg.register_constructed::<Ambiguous>().unwrap_err();
        assert_eq!(err, RegistryError::ConstructorCount {
            service: type_name::<Ambiguous>(),
            found:   2,
        });
        assert!(!reg.contains::<Ambiguous>());
    }

    // ── injection ─────────────────────────────────────────────────────────

    #[derive(Default)]
    struct Widget {
        audio: Option<Arc<Audio>>,
        mixer: Option<Arc<Mixer>>,
    }
    impl Inject for Widget {
        fn inject(&mut self, deps: &Dependencies<'_>) -> Result<(), RegistryError> {
            deps.fill(&mut self.audio);
            deps.fill(&mut self.mixer);
            Ok(())
        }
    }

    #[test]
    fn inject_fills_what_it_can() {
        let (reg, _quit) = registry();
        reg.register(Arc::new(Audio)).unwrap();
        let mut widget = Widget::default();
        reg.inject_dependencies(&mut widget).unwrap();
        assert!(widget.audio.is_some());
        assert!(widget.mixer.is_none());
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    #[test]
    fn quitting_disposes_in_reverse_order_once() {
        let (reg, quit) = registry();
        let log = Arc::new(Mutex::new(Vec::new()));
        reg.register(Arc::new(Tracked { name: "first", log: Arc::clone(&log) })).unwrap();
        reg.register(Arc::new(TrackedToo(Tracked { name: "second", log: Arc::clone(&log) })))
            .unwrap();

        assert!(quit.trigger());
        assert!(!quit.trigger());

        assert_eq!(*log.lock(), vec!["second", "first"]);
        assert!(reg.is_empty());
    }

    struct Wall {
        disposed: Arc<Mutex<u32>>,
    }
    impl Service for Wall {
        fn dispose(&self) {
            *self.disposed.lock() += 1;
        }
    }
    impl Greeter for Wall {
        fn greet(&self) -> &'static str {
            "tick"
        }
    }

    #[test]
    fn services_bound_to_a_contract_are_disposed_on_quit() {
        let (reg, quit) = registry();
        let disposed = Arc::new(Mutex::new(0));
        let wall = Arc::new(Wall { disposed: Arc::clone(&disposed) });
        reg.register_as::<dyn Greeter, _>(wall, |w| w).unwrap();
        assert_eq!(reg.resolve::<dyn Greeter>().unwrap().greet(), "tick");

        quit.trigger();
        quit.trigger();

        assert_eq!(*disposed.lock(), 1);
    }

    #[test]
    fn requests_after_quit_degrade_gracefully() {
        let (reg, quit) = registry();
        reg.register(Arc::new(Audio)).unwrap();
        quit.trigger();

        assert!(matches!(reg.resolve::<Audio>(), Err(RegistryError::ShuttingDown(_))));
        assert!(reg.try_resolve::<Audio>().is_none());
        assert!(matches!(reg.register(Arc::new(Audio)), Err(RegistryError::ShuttingDown(_))));

        let mut widget = Widget::default();
        assert!(matches!(
            reg.inject_dependencies(&mut widget),
            Err(RegistryError::ShuttingDown(_))
        ));
        assert!(widget.audio.is_none());
    }
}
