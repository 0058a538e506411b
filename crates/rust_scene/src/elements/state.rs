//! Element stacks for one traversal
//!
//! The state keeps one stack per element kind. A stack only grows when an
//! element is first written inside a new push level, so [`State::pop`]
//! touches exactly the slots that were written since the matching
//! [`State::push`].

use std::sync::atomic::{AtomicU64, Ordering};

use super::{AnyElement, Element, ElementKind, ElementMask};

static NEXT_STATE_ID: AtomicU64 = AtomicU64::new(1);

/// One value in a slot stack
#[derive(Debug)]
struct Entry {
    /// Push depth at which the value was written
    depth: usize,
    /// Slot generation at the time of the last write
    generation: u64,
    value: Box<dyn AnyElement>,
}

/// Stack of values for one element kind
#[derive(Debug, Default)]
struct Slot {
    entries: Vec<Entry>,
    next_generation: u64,
}

impl Slot {
    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

/// An element read by a cached subgraph from outside of it
#[derive(Debug)]
struct Dependency {
    kind: ElementKind,
    generation: u64,
    snapshot: Box<dyn AnyElement>,
}

/// Elements a cached result depended on, captured by
/// [`State::end_cache`] and checked with [`State::dependencies_match`]
#[derive(Debug)]
pub struct CacheDependencies {
    state_id: u64,
    entries: Vec<Dependency>,
}

impl CacheDependencies {
    /// Number of distinct elements the cache depends on
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    
    /// True if the cached result did not read any outside element
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    
    /// True if the cache depends on the given element kind
    pub fn depends_on(&self, kind: ElementKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }
}

/// An open cache: every element read whose value was set at or above
/// `start_depth` is recorded
#[derive(Debug)]
struct CacheRecorder {
    start_depth: usize,
    dependencies: Vec<Dependency>,
}

/// Live traversal state: one element stack per enabled kind
#[derive(Debug)]
pub struct State {
    id: u64,
    enabled: ElementMask,
    slots: Vec<Slot>,
    depth: usize,
    /// Slot indices written at each push level, innermost last
    modified: Vec<Vec<usize>>,
    recorders: Vec<CacheRecorder>,
}

impl State {
    /// Create a state with the given element kinds enabled
    pub fn new(enabled: ElementMask) -> Self {
        Self {
            id: NEXT_STATE_ID.fetch_add(1, Ordering::Relaxed),
            enabled,
            slots: (0..ElementKind::COUNT).map(|_| Slot::default()).collect(),
            depth: 0,
            modified: Vec::new(),
            recorders: Vec::new(),
        }
    }
    
    /// Element kinds this state accepts
    pub fn enabled(&self) -> ElementMask {
        self.enabled
    }
    
    /// Enable additional element kinds
    pub fn enable(&mut self, mask: ElementMask) {
        self.enabled |= mask;
    }
    
    /// True if `kind` may be accessed
    pub fn is_enabled(&self, kind: ElementKind) -> bool {
        self.enabled.includes(kind)
    }
    
    /// Current push depth
    pub fn depth(&self) -> usize {
        self.depth
    }
    
    /// Drop every element value and return to depth zero
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.entries.clear();
        }
        self.depth = 0;
        self.modified.clear();
        self.recorders.clear();
    }
    
    /// Save a checkpoint. Elements written after this are restored by the
    /// matching [`State::pop`].
    pub fn push(&mut self) {
        self.depth += 1;
        self.modified.push(Vec::new());
    }
    
    /// Restore the elements to their values at the matching push
    ///
    /// # Panics
    ///
    /// Panics when called without a matching push.
    pub fn pop(&mut self) {
        assert!(self.depth > 0, "State::pop called without a matching push");
        let written = self.modified.pop().unwrap_or_default();
        for index in written {
            let popped = self.slots[index].entries.pop();
            debug_assert!(popped.is_some_and(|entry| entry.depth == self.depth));
        }
        self.depth -= 1;
    }
    
    fn check_enabled(&self, kind: ElementKind) {
        assert!(
            self.is_enabled(kind),
            "element {kind:?} is not enabled for this action (enabled: {:?})",
            self.enabled
        );
    }
    
    /// Make sure the slot for `E` has a value, creating the default
    fn ensure<E: Element>(&mut self) -> usize {
        self.check_enabled(E::KIND);
        let index = E::KIND.index();
        let slot = &mut self.slots[index];
        if slot.entries.is_empty() {
            let generation = slot.bump();
            slot.entries.push(Entry {
                depth: 0,
                generation,
                value: Box::new(E::default()),
            });
        }
        index
    }
    
    /// Note a read of slot `index` in every open cache it is external to
    fn record_read(&mut self, index: usize) {
        if self.recorders.is_empty() {
            return;
        }
        let Some(top) = self.slots[index].entries.last() else {
            return;
        };
        let kind = top.value.kind();
        for recorder in &mut self.recorders {
            if top.depth > recorder.start_depth || recorder.dependencies.iter().any(|d| d.kind == kind) {
                continue;
            }
            recorder.dependencies.push(Dependency {
                kind,
                generation: top.generation,
                snapshot: top.value.clone_element(),
            });
        }
    }
    
    /// Current visible value of element `E`
    ///
    /// # Panics
    ///
    /// Panics if `E` is not enabled for this state.
    pub fn get<E: Element>(&mut self) -> &E {
        let index = self.ensure::<E>();
        self.record_read(index);
        self.top::<E>(index)
    }
    
    fn top<E: Element>(&self, index: usize) -> &E {
        self.slots[index]
            .entries
            .last()
            .and_then(|entry| entry.value.as_ref().as_any().downcast_ref::<E>())
            .unwrap_or_else(|| panic!("slot {:?} holds a foreign element", E::KIND))
    }
    
    /// Replace the value of element `E` at the current depth
    pub fn set<E: Element>(&mut self, value: E) {
        let index = self.ensure::<E>();
        let depth = self.depth;
        let slot = &mut self.slots[index];
        let generation = slot.bump();
        let top_depth = slot.entries.last().map_or(0, |entry| entry.depth);
        if top_depth < depth {
            slot.entries.push(Entry { depth, generation, value: Box::new(value) });
            self.note_modified(index);
        } else if let Some(top) = slot.entries.last_mut() {
            top.generation = generation;
            top.value = Box::new(value);
        }
    }
    
    /// Modify element `E` in place. The inherited value is cloned into the
    /// current push level on the first write after a push.
    pub fn modify<E: Element>(&mut self, f: impl FnOnce(&mut E)) {
        let index = self.ensure::<E>();
        self.record_read(index);
        
        let depth = self.depth;
        let slot = &mut self.slots[index];
        let generation = slot.bump();
        let needs_copy = slot.entries.last().is_some_and(|entry| entry.depth < depth);
        if needs_copy {
            let inherited = slot.entries.last().map(|entry| entry.value.clone_element());
            if let Some(value) = inherited {
                slot.entries.push(Entry { depth, generation, value });
            }
            self.note_modified(index);
        }
        
        let slot = &mut self.slots[index];
        if let Some(top) = slot.entries.last_mut() {
            top.generation = generation;
            if let Some(value) = top.value.as_mut().as_any_mut().downcast_mut::<E>() {
                f(value);
            }
        }
    }
    
    fn note_modified(&mut self, index: usize) {
        if let Some(level) = self.modified.last_mut() {
            level.push(index);
        }
    }
    
    /// Generation of the visible value of `E`; changes on every write and
    /// reverts when a pop restores an earlier value
    pub fn generation<E: Element>(&mut self) -> u64 {
        let index = self.ensure::<E>();
        self.slots[index].entries.last().map_or(0, |entry| entry.generation)
    }
    
    /// Start recording the elements a subgraph reads from outside of it
    pub fn begin_cache(&mut self) {
        self.recorders.push(CacheRecorder {
            start_depth: self.depth,
            dependencies: Vec::new(),
        });
    }
    
    /// Stop the innermost recording and return what it captured
    ///
    /// # Panics
    ///
    /// Panics without a matching [`State::begin_cache`].
    pub fn end_cache(&mut self) -> CacheDependencies {
        let recorder = self
            .recorders
            .pop()
            .unwrap_or_else(|| panic!("State::end_cache called without begin_cache"));
        debug_assert_eq!(recorder.start_depth, self.depth, "cache recording spans unbalanced push/pop");
        CacheDependencies {
            state_id: self.id,
            entries: recorder.dependencies,
        }
    }
    
    /// Report a cache hit to the caches still recording, as if the cached
    /// subgraph had read its dependencies again
    pub fn replay_dependencies(&mut self, dependencies: &CacheDependencies) {
        for dependency in &dependencies.entries {
            if self.is_enabled(dependency.kind) {
                self.record_read(dependency.kind.index());
            }
        }
    }
    
    /// True if every element a cache depended on still has the value it had
    /// when the cache was built
    pub fn dependencies_match(&self, dependencies: &CacheDependencies) -> bool {
        dependencies.entries.iter().all(|dependency| {
            if !self.is_enabled(dependency.kind) {
                return false;
            }
            match self.slots[dependency.kind.index()].entries.last() {
                Some(top) => {
                    (dependencies.state_id == self.id && top.generation == dependency.generation)
                        || dependency.snapshot.matches(top.value.as_ref())
                }
                None => dependency.snapshot.is_default(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{DrawMode, DrawStyleElement, MaterialElement, ModelMatrixElement};
    use crate::foundation::math::{Mat4, Vec3};
    
    fn state() -> State {
        State::new(ElementMask::MODEL_MATRIX | ElementMask::MATERIAL | ElementMask::DRAW_STYLE)
    }
    
    fn translation(x: f32) -> Mat4 {
        Mat4::new_translation(&Vec3::new(x, 0.0, 0.0))
    }
    
    #[test]
    fn test_get_creates_default_lazily() {
        let mut state = state();
        assert_eq!(state.get::<ModelMatrixElement>().matrix, Mat4::identity());
        assert_eq!(state.get::<MaterialElement>(), &MaterialElement::default());
    }
    
    #[test]
    fn test_push_pop_restores_values() {
        let mut state = state();
        ModelMatrixElement::set(&mut state, translation(1.0));
        
        state.push();
        ModelMatrixElement::mult(&mut state, &translation(2.0));
        state.set(DrawStyleElement { mode: DrawMode::Lines, ..Default::default() });
        assert_eq!(ModelMatrixElement::get(&mut state), translation(3.0));
        
        state.push();
        ModelMatrixElement::mult(&mut state, &translation(4.0));
        ModelMatrixElement::mult(&mut state, &translation(4.0));
        assert_eq!(ModelMatrixElement::get(&mut state), translation(11.0));
        state.pop();
        
        assert_eq!(ModelMatrixElement::get(&mut state), translation(3.0));
        state.pop();
        
        assert_eq!(ModelMatrixElement::get(&mut state), translation(1.0));
        assert_eq!(state.get::<DrawStyleElement>().mode, DrawMode::Filled);
        assert_eq!(state.depth(), 0);
    }
    
    #[test]
    fn test_writes_in_one_level_share_one_entry() {
        let mut state = state();
        state.push();
        for _ in 0..10 {
            ModelMatrixElement::mult(&mut state, &translation(1.0));
        }
        assert_eq!(state.slots[ElementKind::ModelMatrix.index()].entries.len(), 2);
        assert_eq!(state.modified.last().map(Vec::len), Some(1));
        state.pop();
        assert_eq!(state.slots[ElementKind::ModelMatrix.index()].entries.len(), 1);
    }
    
    #[test]
    fn test_untouched_slots_are_not_popped() {
        let mut state = state();
        state.set(MaterialElement { transparency: 0.25, ..Default::default() });
        state.push();
        ModelMatrixElement::set(&mut state, translation(1.0));
        state.pop();
        assert_eq!(state.get::<MaterialElement>().transparency, 0.25);
    }
    
    #[test]
    fn test_generation_changes_on_write_and_reverts_on_pop() {
        let mut state = state();
        let base = state.generation::<ModelMatrixElement>();
        state.push();
        ModelMatrixElement::mult(&mut state, &translation(1.0));
        let inner = state.generation::<ModelMatrixElement>();
        assert_ne!(base, inner);
        state.pop();
        assert_eq!(state.generation::<ModelMatrixElement>(), base);
    }
    
    #[test]
    fn test_random_sequences_match_clone_per_push() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        
        // (transparency, x translation) copied whole at every push
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..50 {
            let mut state = state();
            let mut levels = vec![(MaterialElement::default().transparency, 0.0_f32)];
            
            for _ in 0..200 {
                match rng.gen_range(0..4) {
                    0 => {
                        state.push();
                        let top = *levels.last().unwrap();
                        levels.push(top);
                    }
                    1 if levels.len() > 1 => {
                        state.pop();
                        levels.pop();
                    }
                    2 => {
                        let transparency = f32::from(rng.gen_range(0_u8..=4)) * 0.25;
                        state.set(MaterialElement { transparency, ..Default::default() });
                        levels.last_mut().unwrap().0 = transparency;
                    }
                    _ => {
                        let step = f32::from(rng.gen_range(-3_i8..=3));
                        ModelMatrixElement::mult(&mut state, &translation(step));
                        levels.last_mut().unwrap().1 += step;
                    }
                }
                
                let (transparency, x) = *levels.last().unwrap();
                assert_eq!(state.depth(), levels.len() - 1);
                assert_eq!(state.get::<MaterialElement>().transparency, transparency);
                assert_eq!(ModelMatrixElement::get(&mut state), translation(x));
            }
            
            while state.depth() > 0 {
                state.pop();
            }
            assert_eq!(state.get::<MaterialElement>().transparency, levels[0].0);
            assert_eq!(ModelMatrixElement::get(&mut state), translation(levels[0].1));
        }
    }
    
    #[test]
    #[should_panic(expected = "without a matching push")]
    fn test_pop_past_initial_depth_panics() {
        let mut state = state();
        state.pop();
    }
    
    #[test]
    #[should_panic(expected = "not enabled")]
    fn test_disabled_element_access_panics() {
        let mut state = State::new(ElementMask::MATERIAL);
        let _ = state.get::<ModelMatrixElement>();
    }
    
    #[test]
    fn test_cache_records_only_outside_reads() {
        let mut state = state();
        ModelMatrixElement::set(&mut state, translation(1.0));
        
        state.begin_cache();
        state.push();
        state.set(MaterialElement { transparency: 0.5, ..Default::default() });
        let _ = state.get::<MaterialElement>();
        let _ = ModelMatrixElement::get(&mut state);
        state.pop();
        let deps = state.end_cache();
        
        assert_eq!(deps.len(), 1);
        assert!(deps.depends_on(ElementKind::ModelMatrix));
        assert!(state.dependencies_match(&deps));
        
        ModelMatrixElement::set(&mut state, translation(2.0));
        assert!(!state.dependencies_match(&deps));
        
        ModelMatrixElement::set(&mut state, translation(1.0));
        assert!(state.dependencies_match(&deps));
    }
    
    #[test]
    fn test_replayed_dependencies_reach_outer_recording() {
        let mut state = state();
        state.push();
        state.begin_cache();
        let _ = ModelMatrixElement::get(&mut state);
        let inner = state.end_cache();
        state.pop();
        
        ModelMatrixElement::set(&mut state, translation(3.0));
        state.begin_cache();
        state.push();
        state.replay_dependencies(&inner);
        state.pop();
        let outer = state.end_cache();
        assert!(outer.depends_on(ElementKind::ModelMatrix));
    }
    
    #[test]
    fn test_cache_dependencies_match_across_states_by_value() {
        let mut first = state();
        first.begin_cache();
        let _ = ModelMatrixElement::get(&mut first);
        let deps = first.end_cache();
        
        let mut second = state();
        assert!(second.dependencies_match(&deps));
        ModelMatrixElement::set(&mut second, translation(5.0));
        assert!(!second.dependencies_match(&deps));
    }
}
