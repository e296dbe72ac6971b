//! Section scopes.
//!
//! A [`SectionScope`] owns every trigger registration made for one activation of
//! a section. Bindings live in a fixed arena indexed by declaration order; slots
//! whose target did not resolve at activation stay inert for the scope's lifetime.
//!
//! When a scrubbed binding and a one-shot share a target, the scrubbed output is
//! held back until the one-shot has finished playing and then applied on top.

use hashbrown::HashMap;
use log::debug;

use crate::descriptor::AnimationDescriptor;
use crate::ids::{ScopeId, TriggerHandle};
use crate::layout::{LayoutProbe, TargetResolver};
use crate::outputs::{Change, MotionEvent, Outputs};
use crate::registry::{ProgressUpdate, TriggerRegistry};
use crate::timeline::{evaluate_from, BindingTrack, OneShotStep};
use crate::value::PropertyState;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeState {
    Active,
    /// Terminal. A reverted scope is never reused.
    Reverted,
}

#[derive(Debug)]
struct Binding {
    handle: TriggerHandle,
    baseline: PropertyState,
    track: BindingTrack,
    /// Scrubbed output held back behind a running one-shot on the same target.
    deferred: Option<PropertyState>,
}

#[derive(Debug)]
struct Slot {
    descriptor: AnimationDescriptor,
    binding: Option<Binding>,
}

enum Reaction {
    Idle,
    Render(PropertyState),
    OneShot(OneShotStep),
}

#[derive(Debug)]
pub struct SectionScope {
    id: ScopeId,
    section: String,
    state: ScopeState,
    slots: Box<[Slot]>,
    by_handle: HashMap<TriggerHandle, usize>,
}

impl SectionScope {
    /// Resolve, register and wire every descriptor, emitting each bound target's
    /// initial state. Descriptors whose target or trigger is not mounted are skipped.
    pub fn activate<P>(
        id: ScopeId,
        section: impl Into<String>,
        registry: &mut TriggerRegistry<P>,
        descriptors: Vec<AnimationDescriptor>,
        out: &mut Outputs,
    ) -> SectionScope
    where
        P: LayoutProbe + TargetResolver,
    {
        Self::activate_over(id, section, registry, descriptors, &[], out)
    }

    /// Like [`activate`](Self::activate), but baselines for targets in `restored`
    /// are taken from those changes instead of the resolver. Used when a prior
    /// scope was just reverted and the host has not applied its restores yet.
    pub(crate) fn activate_over<P>(
        id: ScopeId,
        section: impl Into<String>,
        registry: &mut TriggerRegistry<P>,
        descriptors: Vec<AnimationDescriptor>,
        restored: &[Change],
        out: &mut Outputs,
    ) -> SectionScope
    where
        P: LayoutProbe + TargetResolver,
    {
        let section = section.into();
        let mut slots = Vec::with_capacity(descriptors.len());
        let mut by_handle = HashMap::with_capacity(descriptors.len());
        let mut skipped = 0;

        for descriptor in descriptors {
            let trigger_mounted = registry.probe().rect(descriptor.trigger_key()).is_some();
            let baseline = registry.probe_mut().resolve(&descriptor.target).map(|current| {
                restored
                    .iter()
                    .rev()
                    .find(|c| c.target == descriptor.target)
                    .map_or(current, |c| c.state)
            });
            let binding = match (baseline, trigger_mounted) {
                (Some(baseline), true) => {
                    let handle = registry.register(descriptor.trigger_key(), descriptor.window);
                    by_handle.insert(handle, slots.len());
                    Some(Binding {
                        handle,
                        baseline,
                        track: BindingTrack::for_mode(&descriptor.mode),
                        deferred: None,
                    })
                }
                _ => {
                    debug!(
                        "scope {:?} ({section}): target '{}' not mounted, skipping",
                        id, descriptor.target
                    );
                    skipped += 1;
                    out.push_event(MotionEvent::TargetSkipped {
                        scope: id,
                        target: descriptor.target.clone(),
                    });
                    None
                }
            };
            slots.push(Slot {
                descriptor,
                binding,
            });
        }

        let mut scope = SectionScope {
            id,
            section,
            state: ScopeState::Active,
            slots: slots.into_boxed_slice(),
            by_handle,
        };
        for idx in 0..scope.slots.len() {
            if let Some(b) = &scope.slots[idx].binding {
                let initial = evaluate_from(&scope.slots[idx].descriptor, &b.baseline, 0.0);
                scope.emit(idx, initial, out);
            }
        }
        debug!(
            "scope {:?} ({}) activated: {} bound, {} skipped",
            scope.id,
            scope.section,
            scope.by_handle.len(),
            skipped
        );
        out.push_event(MotionEvent::ScopeActivated {
            scope: scope.id,
            section: scope.section.clone(),
            bound: scope.by_handle.len(),
            skipped,
        });
        scope
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ScopeState::Active
    }

    /// Number of declared descriptors, bound or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.binding.is_some()).count()
    }

    /// Registry handles currently owned, in declaration order.
    pub fn handles(&self) -> Vec<TriggerHandle> {
        self.slots
            .iter()
            .filter_map(|s| s.binding.as_ref().map(|b| b.handle))
            .collect()
    }

    pub fn descriptor(&self, index: usize) -> Option<&AnimationDescriptor> {
        self.slots.get(index).map(|s| &s.descriptor)
    }

    /// Baseline captured at activation for the descriptor at `index`; `None` if it was skipped.
    pub fn baseline(&self, index: usize) -> Option<PropertyState> {
        self.slots
            .get(index)
            .and_then(|s| s.binding.as_ref())
            .map(|b| b.baseline)
    }

    /// Route registry progress to this scope's bindings in declaration order.
    /// Updates for handles this scope does not own are ignored.
    pub fn on_progress(&mut self, updates: &[ProgressUpdate], out: &mut Outputs) {
        if !self.is_active() {
            return;
        }
        for update in updates {
            let Some(&idx) = self.by_handle.get(&update.handle) else {
                continue;
            };
            let reaction = {
                let slot = &mut self.slots[idx];
                let Some(binding) = slot.binding.as_mut() else {
                    continue;
                };
                match &mut binding.track {
                    BindingTrack::Scrub(track) => match track.set_progress(update.progress) {
                        Some(shown) => Reaction::Render(evaluate_from(
                            &slot.descriptor,
                            &binding.baseline,
                            shown,
                        )),
                        None => Reaction::Idle,
                    },
                    BindingTrack::OneShot(track) => {
                        Reaction::OneShot(track.observe(update.progress))
                    }
                }
            };
            self.react(idx, reaction, out);
        }
    }

    /// Advance time-driven state: scrub smoothing and one-shot playback.
    pub fn advance(&mut self, dt: f32, out: &mut Outputs) {
        if !self.is_active() {
            return;
        }
        for idx in 0..self.slots.len() {
            let reaction = {
                let slot = &mut self.slots[idx];
                let Some(binding) = slot.binding.as_mut() else {
                    continue;
                };
                match &mut binding.track {
                    BindingTrack::Scrub(track) => match track.advance(dt) {
                        Some(shown) => Reaction::Render(evaluate_from(
                            &slot.descriptor,
                            &binding.baseline,
                            shown,
                        )),
                        None => Reaction::Idle,
                    },
                    BindingTrack::OneShot(track) => Reaction::OneShot(track.advance(dt)),
                }
            };
            self.react(idx, reaction, out);
        }
    }

    /// Unregister every binding and restore each target's baseline before returning.
    /// Returns the number of targets restored; reverting twice is a no-op.
    pub fn revert<P: LayoutProbe>(
        &mut self,
        registry: &mut TriggerRegistry<P>,
        out: &mut Outputs,
    ) -> usize {
        if !self.is_active() {
            return 0;
        }
        self.state = ScopeState::Reverted;
        self.by_handle.clear();

        let mut restored: Vec<String> = Vec::new();
        for slot in self.slots.iter_mut() {
            let Some(binding) = slot.binding.as_mut() else {
                continue;
            };
            registry.unregister(binding.handle);
            binding.track.reset();
            binding.deferred = None;
            if !restored.contains(&slot.descriptor.target) {
                restored.push(slot.descriptor.target.clone());
                out.push_change(slot.descriptor.target.clone(), binding.baseline);
            }
        }
        let count = restored.len();
        debug!("scope {:?} ({}) reverted: {count} targets restored", self.id, self.section);
        out.push_event(MotionEvent::ScopeReverted {
            scope: self.id,
            section: self.section.clone(),
            restored: count,
        });
        count
    }

    fn react(&mut self, idx: usize, reaction: Reaction, out: &mut Outputs) {
        match reaction {
            Reaction::Idle => {}
            Reaction::Render(state) => self.emit(idx, state, out),
            Reaction::OneShot(step) => self.handle_one_shot(idx, step, out),
        }
    }

    fn handle_one_shot(&mut self, idx: usize, step: OneShotStep, out: &mut Outputs) {
        let target = self.slots[idx].descriptor.target.clone();
        match step {
            OneShotStep::Idle => {}
            OneShotStep::Fired => {
                out.push_event(MotionEvent::OneShotFired {
                    scope: self.id,
                    target,
                });
            }
            OneShotStep::Progressed { t } => {
                if let Some(state) = self.evaluate_slot(idx, t) {
                    self.emit(idx, state, out);
                }
            }
            OneShotStep::Completed { fired } => {
                if fired {
                    out.push_event(MotionEvent::OneShotFired {
                        scope: self.id,
                        target: target.clone(),
                    });
                }
                if let Some(state) = self.evaluate_slot(idx, 1.0) {
                    self.emit(idx, state, out);
                }
                out.push_event(MotionEvent::OneShotCompleted {
                    scope: self.id,
                    target: target.clone(),
                });
                self.flush_deferred(&target, out);
            }
        }
    }

    fn evaluate_slot(&self, idx: usize, t: f32) -> Option<PropertyState> {
        let slot = &self.slots[idx];
        slot.binding
            .as_ref()
            .map(|b| evaluate_from(&slot.descriptor, &b.baseline, t))
    }

    /// True while a one-shot on `target` has not finished playing.
    fn entrance_pending(&self, target: &str) -> bool {
        self.slots.iter().any(|s| {
            s.descriptor.target == target
                && matches!(
                    &s.binding,
                    Some(Binding {
                        track: BindingTrack::OneShot(t),
                        ..
                    }) if !t.is_complete()
                )
        })
    }

    fn emit(&mut self, idx: usize, state: PropertyState, out: &mut Outputs) {
        let is_scrub = matches!(
            self.slots[idx].binding,
            Some(Binding {
                track: BindingTrack::Scrub(_),
                ..
            })
        );
        if is_scrub && self.entrance_pending(&self.slots[idx].descriptor.target) {
            if let Some(b) = self.slots[idx].binding.as_mut() {
                b.deferred = Some(state);
            }
            return;
        }
        out.push_change(self.slots[idx].descriptor.target.clone(), state);
    }

    fn flush_deferred(&mut self, target: &str, out: &mut Outputs) {
        if self.entrance_pending(target) {
            return;
        }
        for slot in self.slots.iter_mut() {
            if slot.descriptor.target != target {
                continue;
            }
            if let Some(state) = slot.binding.as_mut().and_then(|b| b.deferred.take()) {
                out.push_change(slot.descriptor.target.clone(), state);
            }
        }
    }
}
