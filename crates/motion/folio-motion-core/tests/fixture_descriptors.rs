use folio_motion_core::{
    parse_descriptors_json, LayoutProbe, LayoutSnapshot, MotionError, Outputs, PlayMode,
    SectionLifecycle,
};

#[test]
fn about_descriptors_parse_and_validate() {
    let json = folio_test_fixtures::descriptors::json("about").unwrap();
    let descriptors = parse_descriptors_json(&json).unwrap();
    assert_eq!(descriptors.len(), 3);
    assert_eq!(descriptors[0].target, "about.header");
    assert_eq!(descriptors[0].delta.dy, 100.0);
    assert_eq!(descriptors[0].window.start.viewport, 0.9);
    assert!(descriptors
        .iter()
        .all(|d| matches!(d.mode, PlayMode::Scrubbed { .. })));
}

#[test]
fn unknown_easing_is_rejected_at_parse_time() {
    let json = folio_test_fixtures::descriptors::json("unknown-easing").unwrap();
    match parse_descriptors_json(&json) {
        Err(MotionError::Parse(msg)) => assert!(msg.contains("bounce"), "{msg}"),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn portfolio_layout_drives_about_section() {
    let page: LayoutSnapshot = folio_test_fixtures::layouts::load("portfolio").unwrap();
    assert_eq!(page.viewport().height, 900.0);
    let descriptors =
        parse_descriptors_json(&folio_test_fixtures::descriptors::json("about").unwrap()).unwrap();

    let mut lc = SectionLifecycle::new(page);
    let mut out = Outputs::default();
    lc.activate("about", descriptors, &mut out);
    assert_eq!(lc.registry().len(), 3);
    assert_eq!(out.changes.len(), 3);
    assert!(out.changes.iter().all(|c| c.state.opacity == 0.0));

    lc.probe_mut().set_scroll(2000.0);
    out.clear();
    lc.step(0.016, &mut out);
    assert_eq!(out.changes.len(), 3);
    assert!(out.changes.iter().all(|c| c.state.opacity == 1.0));
}
