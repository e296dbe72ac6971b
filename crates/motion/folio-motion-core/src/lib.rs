//! Folio Motion Core (engine-agnostic)
//!
//! Scroll-synchronized animation orchestration: a trigger registry mapping scroll
//! position to per-element progress, a pure timeline evaluator, deterministic
//! stagger plans, section scopes that own every registration made for one
//! activation, and an independent render loop for the ambient 3D object.
//!
//! Nothing here touches a DOM or a renderer. Hosts provide geometry through
//! [`LayoutProbe`], resolve targets through [`TargetResolver`], and apply the
//! [`Change`]s collected in [`Outputs`].

pub mod clock;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod ids;
pub mod interp;
pub mod layout;
pub mod lifecycle;
pub mod outputs;
pub mod registry;
pub mod render_loop;
pub mod scope;
pub mod stagger;
pub mod timeline;
pub mod value;

// Re-exports for consumers (stage, adapters)
pub use clock::FrameClock;
pub use config::Config;
pub use descriptor::{
    parse_descriptors_json, AnimationDescriptor, Direction, PlayMode, PropertyDelta, Reveal,
    TriggerEdge, TriggerWindow, TweenDirection,
};
pub use error::{MotionError, RenderError};
pub use ids::{ScopeId, TargetKey, TriggerHandle};
pub use interp::Easing;
pub use layout::{LayoutProbe, LayoutSnapshot, MountedTarget, Rect, TargetResolver, Viewport};
pub use lifecycle::SectionLifecycle;
pub use outputs::{Change, MotionEvent, Outputs};
pub use registry::{ProgressUpdate, ScrollRange, TriggerRegistry};
pub use render_loop::{
    FloatEffect, LoopHandle, LoopStatus, NullSurface, RenderLoop, RenderLoopCfg, RenderLoopState,
    RenderSurface,
};
pub use scope::{ScopeState, SectionScope};
pub use stagger::{plan, StaggerPlan};
pub use timeline::{
    evaluate, evaluate_from, BindingTrack, OneShotLatch, OneShotStep, OneShotTrack, ScrubTrack,
};
pub use value::PropertyState;
