//! Thread-local storage registry
//!
//! [`ThreadStorage`] hands every calling thread its own value, created on
//! first access by a constructor hook. Nodes use it for scratch caches so
//! that concurrent traversals of a shared graph never race on them.
//!
//! The registry lock only covers the map lookup and insertion; constructor
//! and destructor hooks run outside of it. When a thread exits, a
//! thread-local exit hook releases that thread's values from every registry
//! it touched. Values still present when the registry drops are destructed
//! then.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

type Constructor<T> = Box<dyn Fn() -> T + Send + Sync>;
type Destructor<T> = Box<dyn Fn(&mut T) + Send + Sync>;

/// Shared part of a [`ThreadStorage`], referenced weakly by exit hooks
struct Registry<T> {
    constructor: Constructor<T>,
    destructor: Option<Destructor<T>>,
    slots: Mutex<HashMap<ThreadId, Arc<Mutex<T>>>>,
}

impl<T> Registry<T> {
    fn slots(&self) -> MutexGuard<'_, HashMap<ThreadId, Arc<Mutex<T>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
    
    fn destruct(&self, slot: &Mutex<T>) {
        if let Some(destructor) = &self.destructor {
            let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
            destructor(&mut value);
        }
    }
}

impl<T> Drop for Registry<T> {
    fn drop(&mut self) {
        let slots = std::mem::take(self.slots.get_mut().unwrap_or_else(PoisonError::into_inner));
        for slot in slots.into_values() {
            self.destruct(&slot);
        }
    }
}

/// Type-erased release entry point used by thread exit hooks
trait ThreadRelease: Send + Sync {
    fn release(&self, thread: ThreadId);
}

impl<T: Send> ThreadRelease for Registry<T> {
    fn release(&self, thread: ThreadId) {
        let slot = self.slots().remove(&thread);
        if let Some(slot) = slot {
            self.destruct(&slot);
        }
    }
}

/// Registries the current thread has values in
struct ExitHooks {
    thread: ThreadId,
    registries: Vec<Weak<dyn ThreadRelease>>,
}

impl ExitHooks {
    /// Add `registry` unless it is already registered. Entries whose
    /// storage has been dropped are pruned first.
    fn register(&mut self, registry: Weak<dyn ThreadRelease>) {
        self.registries.retain(|entry| entry.strong_count() > 0);
        if !self.registries.iter().any(|entry| Weak::ptr_eq(entry, &registry)) {
            self.registries.push(registry);
        }
    }
}

impl Drop for ExitHooks {
    fn drop(&mut self) {
        for registry in self.registries.drain(..) {
            if let Some(registry) = registry.upgrade() {
                registry.release(self.thread);
            }
        }
    }
}

thread_local! {
    static EXIT_HOOKS: RefCell<ExitHooks> = RefCell::new(ExitHooks {
        thread: thread::current().id(),
        registries: Vec::new(),
    });
}

/// One value of `T` per thread, created lazily
pub struct ThreadStorage<T> {
    registry: Arc<Registry<T>>,
}

impl<T: Send + 'static> ThreadStorage<T> {
    /// Storage whose per-thread values are built by `constructor`
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::build(Box::new(constructor), None)
    }
    
    /// Storage with a destructor hook run when a thread's value is released
    pub fn with_destructor<F, D>(constructor: F, destructor: D) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        D: Fn(&mut T) + Send + Sync + 'static,
    {
        Self::build(Box::new(constructor), Some(Box::new(destructor)))
    }
    
    fn build(constructor: Constructor<T>, destructor: Option<Destructor<T>>) -> Self {
        Self {
            registry: Arc::new(Registry {
                constructor,
                destructor,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }
    
    /// The calling thread's value, constructing it on first access
    pub fn get(&self) -> Arc<Mutex<T>> {
        let id = thread::current().id();
        if let Some(slot) = self.registry.slots().get(&id) {
            return Arc::clone(slot);
        }
        
        // Only this thread inserts under its own id, so nothing can race
        // between the lookup above and the insert below.
        let slot = Arc::new(Mutex::new((self.registry.constructor)()));
        self.registry.slots().insert(id, Arc::clone(&slot));
        
        let hook: Weak<dyn ThreadRelease> = Arc::downgrade(&self.registry) as Weak<dyn ThreadRelease>;
        let registered = EXIT_HOOKS.try_with(|hooks| hooks.borrow_mut().register(hook));
        if registered.is_err() {
            log::debug!("ThreadStorage: thread is exiting, value kept until the storage drops");
        }
        slot
    }
    
    /// Run `f` with exclusive access to the calling thread's value
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let slot = self.get();
        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut value)
    }
    
    /// Release the calling thread's value now, running the destructor hook
    pub fn release_current_thread(&self) {
        self.registry.release(thread::current().id());
    }
    
    /// Number of threads currently holding a value
    pub fn thread_count(&self) -> usize {
        self.registry.slots().len()
    }
}

impl<T> fmt::Debug for ThreadStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadStorage")
            .field("threads", &self.registry.slots().len())
            .field("has_destructor", &self.registry.destructor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    
    #[test]
    fn test_same_thread_gets_same_value() {
        let storage = ThreadStorage::new(|| 0_u32);
        storage.with(|value| *value += 5);
        assert_eq!(storage.with(|value| *value), 5);
        assert_eq!(storage.thread_count(), 1);
    }
    
    #[test]
    fn test_threads_get_separate_values() {
        let storage = Arc::new(ThreadStorage::new(Vec::<u32>::new));
        storage.with(|v| v.push(1));
        
        let worker = Arc::clone(&storage);
        let seen = thread::spawn(move || {
            worker.with(|v| {
                v.push(2);
                v.clone()
            })
        })
        .join()
        .expect("worker thread panicked");
        
        assert_eq!(seen, vec![2]);
        assert_eq!(storage.with(|v| v.clone()), vec![1]);
    }
    
    #[test]
    fn test_thread_exit_runs_destructor() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&destroyed);
        let storage = Arc::new(ThreadStorage::with_destructor(
            || 7_u32,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        ));
        
        let worker = Arc::clone(&storage);
        thread::spawn(move || worker.with(|v| *v))
            .join()
            .expect("worker thread panicked");
        
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(storage.thread_count(), 0);
    }
    
    fn exit_hook_count() -> usize {
        EXIT_HOOKS.with(|hooks| hooks.borrow().registries.len())
    }
    
    #[test]
    fn test_exit_hooks_stay_bounded() {
        thread::spawn(|| {
            let kept = ThreadStorage::new(|| 0_u32);
            kept.with(|_| ());
            for _ in 0..1000 {
                let storage = ThreadStorage::new(|| 0_u32);
                storage.with(|_| ());
                storage.release_current_thread();
                storage.with(|_| ());
            }
            assert_eq!(exit_hook_count(), 2);
            
            kept.release_current_thread();
            kept.with(|_| ());
            assert_eq!(exit_hook_count(), 1);
        })
        .join()
        .expect("worker thread panicked");
    }
    
    #[test]
    fn test_drop_destructs_remaining_values() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&destroyed);
        let storage = ThreadStorage::with_destructor(
            || 1_u8,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        storage.with(|_| ());
        storage.release_current_thread();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        
        storage.with(|_| ());
        drop(storage);
        assert_eq!(destroyed.load(Ordering::SeqCst), 2);
    }
}
