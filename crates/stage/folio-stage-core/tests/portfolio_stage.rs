use folio_motion_core::{
    Config, LayoutSnapshot, MotionEvent, NullSurface, PropertyState, RenderError,
    RenderLoopState, RenderSurface,
};
use folio_stage::{SectionSpec, Stage, StageFrame};

fn portfolio() -> Stage {
    let layout: LayoutSnapshot = folio_test_fixtures::layouts::load("portfolio").expect("layout");
    let mut stage = Stage::with_layout(Config::default(), layout);
    for key in folio_test_fixtures::sections::keys() {
        let spec: SectionSpec = folio_test_fixtures::sections::load(&key).expect("section");
        stage.mount_section(spec).expect("mount");
    }
    stage
}

fn run(stage: &mut Stage, seconds: f32) -> Vec<StageFrame> {
    let frames = (seconds * 60.0).round() as usize;
    (0..frames)
        .map(|_| stage.step(1.0 / 60.0, &mut NullSurface))
        .collect()
}

fn state(stage: &Stage, target: &str) -> PropertyState {
    stage.layout().state(target).expect("target mounted")
}

#[test]
fn every_fixture_target_binds() {
    let mut stage = portfolio();
    assert_eq!(stage.sections().count(), 7);
    let frame = stage.step(0.0, &mut NullSurface);
    assert!(!frame
        .events
        .iter()
        .any(|e| matches!(e, MotionEvent::TargetSkipped { .. })));
    let activated = frame
        .events
        .iter()
        .filter(|e| matches!(e, MotionEvent::ScopeActivated { .. }))
        .count();
    assert_eq!(activated, 7);
    // Below-the-fold content starts hidden.
    assert_eq!(state(&stage, "about.header").opacity, 0.0);
    assert_eq!(state(&stage, "experience.card.1").x, 150.0);
    assert_eq!(state(&stage, "hero.content"), PropertyState::IDENTITY);
}

#[test]
fn scrolling_to_the_bottom_reveals_everything() {
    let mut stage = portfolio();
    stage.set_scroll(8000.0);
    run(&mut stage, 20.0);

    let layout = stage.layout().clone();
    for (key, target) in &layout.targets {
        let expected = match key.as_str() {
            "hero.content" => PropertyState {
                x: 0.0,
                y: -50.0,
                scale: 0.9,
                opacity: 0.0,
            },
            _ => PropertyState::IDENTITY,
        };
        assert!(
            target.state.approx_eq(&expected, 1e-3),
            "{key}: {:?}",
            target.state
        );
    }
}

#[test]
fn hero_entrances_are_staggered() {
    let mut stage = portfolio();
    let frames = run(&mut stage, 3.0);
    let fired: Vec<(usize, String)> = frames
        .iter()
        .enumerate()
        .flat_map(|(i, f)| {
            f.events.iter().filter_map(move |e| match e {
                MotionEvent::OneShotCompleted { target, .. } if target.starts_with("hero.") => {
                    Some((i, target.clone()))
                }
                _ => None,
            })
        })
        .collect();
    let order: Vec<&str> = fired.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(
        order,
        vec!["hero.greeting", "hero.name", "hero.title", "hero.blurb", "hero.cta"]
    );
    // delay 0.5 + 0.2 i, duration 1 s: completions about 12 frames apart
    for pair in fired.windows(2) {
        let gap = pair[1].0 - pair[0].0;
        assert!((11..=13).contains(&gap), "gap {gap}");
    }
}

#[test]
fn skill_category_scrub_waits_for_its_entrance() {
    let mut stage = portfolio();
    // category 0 window [2140 - 855, 2140 - 630]
    stage.set_scroll(1400.0);
    let first = stage.step(1.0 / 60.0, &mut NullSurface);
    assert!(first.events.iter().any(|e| matches!(
        e,
        MotionEvent::OneShotFired { target, .. } if target == "skills.category.0"
    )));
    let mut frames = run(&mut stage, 0.5);
    // While the entrance plays, only its own (rising) opacity reaches the target.
    let opacities: Vec<f32> = frames
        .iter()
        .flat_map(|f| f.changes.iter())
        .filter(|c| c.target == "skills.category.0")
        .map(|c| c.state.opacity)
        .collect();
    assert!(opacities.windows(2).all(|w| w[0] <= w[1] + 1e-6));
    frames.extend(run(&mut stage, 10.0));
    let s = state(&stage, "skills.category.0");
    // scrub progress (1400 - 1285) / 225 with power2.out
    let p: f32 = (1400.0 - 1285.0) / 225.0;
    let eased = 1.0 - (1.0 - p).powi(3);
    assert!((s.opacity - eased).abs() < 1e-3, "{s:?}");
}

#[test]
fn unmount_restores_and_reports_in_next_frame() {
    let mut stage = portfolio();
    stage.set_scroll(500.0);
    run(&mut stage, 1.0);
    assert_ne!(state(&stage, "about.image"), PropertyState::IDENTITY);

    assert!(stage.unmount_section("about"));
    assert!(!stage.unmount_section("about"));
    assert_eq!(state(&stage, "about.image"), PropertyState::IDENTITY);

    let frame = stage.step(1.0 / 60.0, &mut NullSurface);
    assert!(frame
        .changes
        .iter()
        .any(|c| c.target == "about.image" && c.state == PropertyState::IDENTITY));
    assert!(frame
        .events
        .iter()
        .any(|e| matches!(e, MotionEvent::ScopeReverted { section, .. } if section == "about")));

    stage.set_scroll(900.0);
    let after = run(&mut stage, 1.0);
    assert!(after
        .iter()
        .all(|f| f.changes.iter().all(|c| !c.target.starts_with("about."))));
}

#[test]
fn remount_skips_removed_targets() {
    let mut stage = portfolio();
    stage.step(0.0, &mut NullSurface);
    assert!(stage.remove_target("hero.cta"));
    stage.remount_all().expect("remount");
    let frame = stage.step(0.0, &mut NullSurface);
    let skipped: Vec<&str> = frame
        .events
        .iter()
        .filter_map(|e| match e {
            MotionEvent::TargetSkipped { target, .. } => Some(target.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec!["hero.cta"]);
    assert_eq!(stage.sections().count(), 7);
}

#[test]
fn invalid_section_is_rejected_with_context() {
    let mut stage = Stage::default();
    let err = stage
        .mount_section_json(
            r#"{ "id": "broken", "descriptors": [ { "target": "x", "ease": "spring" } ] }"#,
        )
        .unwrap_err();
    assert!(format!("{err:#}").contains("invalid section 'broken'"));
    assert_eq!(stage.sections().count(), 0);
}

struct LosesContext {
    frames_left: u32,
}

impl RenderSurface for LosesContext {
    fn present(&mut self, _state: &RenderLoopState) -> Result<(), RenderError> {
        if self.frames_left == 0 {
            return Err(RenderError::ContextLost);
        }
        self.frames_left -= 1;
        Ok(())
    }
}

#[test]
fn render_loop_runs_beside_sections_and_survives_context_loss() {
    let mut stage = portfolio();
    let handle = stage.start_render_loop();
    let again = stage.start_render_loop();
    assert!(handle.is_running() && again.is_running());

    let mut surface = LosesContext { frames_left: 3 };
    let mut objects = Vec::new();
    for ts in [1000.0, 1016.0, 1032.0, 1048.0] {
        objects.push(stage.step_at(ts, &mut surface).object);
    }
    assert!(objects[0].is_none());
    assert_eq!(objects[3].map(|o| o.frame), Some(3));
    assert!((stage.render_state().elapsed - 0.048).abs() < 1e-5);

    stage.set_scroll(500.0);
    let lost = stage.step_at(1064.0, &mut surface);
    assert!(lost.object.is_none());
    assert!(lost
        .events
        .iter()
        .any(|e| matches!(e, MotionEvent::RenderContextLost { .. })));
    assert!(!stage.is_rendering());
    // Scroll-driven sections keep animating.
    assert!(!lost.changes.is_empty());

    let frozen = *stage.render_state();
    stage.step_at(1080.0, &mut NullSurface);
    assert_eq!(*stage.render_state(), frozen);
}
