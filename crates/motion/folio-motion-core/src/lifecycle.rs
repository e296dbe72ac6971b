//! Section lifecycle manager.
//!
//! Owns the trigger registry and one [`SectionScope`] per active section. Sections
//! are kept in activation order, which is also the order scopes see progress.

use indexmap::IndexMap;
use log::warn;

use crate::descriptor::AnimationDescriptor;
use crate::ids::{IdAllocator, ScopeId};
use crate::layout::{LayoutProbe, TargetResolver};
use crate::outputs::Outputs;
use crate::registry::{ProgressUpdate, TriggerRegistry};
use crate::scope::SectionScope;

#[derive(Debug)]
pub struct SectionLifecycle<P> {
    registry: TriggerRegistry<P>,
    ids: IdAllocator,
    scopes: IndexMap<String, SectionScope>,
    updates: Vec<ProgressUpdate>,
}

impl<P> SectionLifecycle<P>
where
    P: LayoutProbe + TargetResolver,
{
    pub fn new(probe: P) -> Self {
        Self {
            registry: TriggerRegistry::new(probe),
            ids: IdAllocator::new(),
            scopes: IndexMap::new(),
            updates: Vec::new(),
        }
    }

    /// Activate `section`. An already active scope for the same section is
    /// reverted first, so its baselines are restored before new ones are captured.
    pub fn activate(
        &mut self,
        section: &str,
        descriptors: Vec<AnimationDescriptor>,
        out: &mut Outputs,
    ) -> ScopeId {
        let mut restored = Vec::new();
        if let Some(mut prior) = self.scopes.shift_remove(section) {
            warn!(
                "section '{section}' activated while scope {:?} is still active; reverting it first",
                prior.id()
            );
            let start = out.changes.len();
            prior.revert(&mut self.registry, out);
            restored.extend_from_slice(&out.changes[start..]);
        }
        let id = self.ids.alloc_scope();
        let scope = SectionScope::activate_over(
            id,
            section,
            &mut self.registry,
            descriptors,
            &restored,
            out,
        );
        self.scopes.insert(section.to_string(), scope);
        id
    }

    /// Revert and drop the scope for `section`. Returns false if it was not active.
    pub fn deactivate(&mut self, section: &str, out: &mut Outputs) -> bool {
        match self.scopes.shift_remove(section) {
            Some(mut scope) => {
                scope.revert(&mut self.registry, out);
                true
            }
            None => false,
        }
    }

    /// Revert every active scope in activation order.
    pub fn revert_all(&mut self, out: &mut Outputs) {
        for (_, mut scope) in self.scopes.drain(..) {
            scope.revert(&mut self.registry, out);
        }
    }

    /// Re-read geometry and route progress changes to their scopes.
    pub fn tick(&mut self, out: &mut Outputs) {
        self.updates.clear();
        self.updates.extend_from_slice(self.registry.tick(out));
        if self.updates.is_empty() {
            return;
        }
        for scope in self.scopes.values_mut() {
            scope.on_progress(&self.updates, out);
        }
    }

    /// Advance scrub smoothing and one-shot playback by `dt` seconds.
    pub fn advance(&mut self, dt: f32, out: &mut Outputs) {
        for scope in self.scopes.values_mut() {
            scope.advance(dt, out);
        }
    }

    /// One host frame: [`tick`](Self::tick) then [`advance`](Self::advance).
    pub fn step(&mut self, dt: f32, out: &mut Outputs) {
        self.tick(out);
        self.advance(dt, out);
    }

    pub fn scope(&self, section: &str) -> Option<&SectionScope> {
        self.scopes.get(section)
    }

    pub fn is_active(&self, section: &str) -> bool {
        self.scopes.contains_key(section)
    }

    /// Active section ids in activation order.
    pub fn sections(&self) -> impl Iterator<Item = &str> + '_ {
        self.scopes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn registry(&self) -> &TriggerRegistry<P> {
        &self.registry
    }

    pub fn probe(&self) -> &P {
        self.registry.probe()
    }

    pub fn probe_mut(&mut self) -> &mut P {
        self.registry.probe_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PlayMode, PropertyDelta};
    use crate::layout::{LayoutSnapshot, Rect, Viewport};
    use crate::outputs::MotionEvent;
    use crate::value::PropertyState;

    fn lifecycle() -> SectionLifecycle<LayoutSnapshot> {
        let mut page = LayoutSnapshot::new(Viewport {
            scroll_y: 0.0,
            height: 1000.0,
        });
        page.mount("about.header", Rect {
            top: 1500.0,
            height: 200.0,
        });
        SectionLifecycle::new(page)
    }

    fn header() -> Vec<AnimationDescriptor> {
        vec![AnimationDescriptor::scrubbed(
            "about.header",
            PropertyDelta {
                dy: 100.0,
                opacity: Some(0.0),
                ..Default::default()
            },
        )]
    }

    #[test]
    fn double_activation_reverts_prior_scope() {
        let mut lc = lifecycle();
        let mut out = Outputs::default();
        let first = lc.activate("about", header(), &mut out);
        out.clear();
        let second = lc.activate("about", header(), &mut out);
        assert_ne!(first, second);
        assert_eq!(lc.len(), 1);
        assert_eq!(lc.registry().len(), 1);
        assert!(matches!(
            out.events[0],
            MotionEvent::ScopeReverted { scope, .. } if scope == first
        ));
        assert_eq!(lc.scope("about").map(|s| s.id()), Some(second));
    }

    #[test]
    fn double_activation_keeps_original_baselines() {
        let mut lc = lifecycle();
        let mut out = Outputs::default();
        lc.activate("about", header(), &mut out);
        lc.probe_mut().set_scroll(750.0);
        out.clear();
        lc.step(0.016, &mut out);
        let changes = out.changes.clone();
        lc.probe_mut().apply_changes(&changes);
        assert_ne!(lc.probe().state("about.header"), Some(PropertyState::IDENTITY));

        out.clear();
        lc.activate("about", header(), &mut out);
        assert_eq!(
            lc.scope("about").and_then(|s| s.baseline(0)),
            Some(PropertyState::IDENTITY)
        );
    }

    #[test]
    fn deactivate_tears_down_everything() {
        let mut lc = lifecycle();
        let mut out = Outputs::default();
        lc.activate("about", header(), &mut out);
        assert!(lc.deactivate("about", &mut out));
        assert!(!lc.deactivate("about", &mut out));
        assert!(lc.registry().is_empty());
        assert!(lc.is_empty());
    }

    #[test]
    fn nan_frame_does_not_stall_smoothed_scrub() {
        let mut lc = lifecycle();
        let mut out = Outputs::default();
        let smoothed: Vec<_> = header()
            .into_iter()
            .map(|d| d.with_mode(PlayMode::Scrubbed { lag: Some(1.0) }))
            .collect();
        lc.activate("about", smoothed, &mut out);
        lc.step(1.0 / 60.0, &mut out);
        lc.probe_mut().set_scroll(750.0);
        lc.step(f32::NAN, &mut out);
        for _ in 0..1200 {
            lc.step(1.0 / 60.0, &mut out);
        }
        // progress 0.5 through power2.out
        let last = out.changes_for("about.header").last().map(|c| c.state.opacity);
        assert!(last.is_some_and(|o| (o - 0.875).abs() < 1e-3), "{last:?}");
        out.clear();
        lc.step(1.0 / 60.0, &mut out);
        assert!(out.changes.is_empty());
    }

    #[test]
    fn step_routes_progress_to_scopes() {
        let mut lc = lifecycle();
        let mut out = Outputs::default();
        lc.activate("about", header(), &mut out);
        out.clear();
        // window top 90% -> top 60% of a 1000px viewport: [600, 900]
        lc.probe_mut().set_scroll(900.0);
        lc.step(0.016, &mut out);
        let last = out.changes_for("about.header").last().map(|c| c.state);
        assert_eq!(last.map(|s| s.opacity), Some(1.0));
        assert_eq!(last.map(|s| s.y), Some(0.0));
    }
}
