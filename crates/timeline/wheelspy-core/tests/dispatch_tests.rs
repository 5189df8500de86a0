use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use wheelspy_core::{
    ChangeKind, ConfigPatch, ErrorKind, MemoryHost, NodeId, StyleDecl, StyleHost, StyleMap,
    Timeline, TimelineError, TweenEngine, UnitValue,
};
use wheelspy_test_fixtures::configs;

fn host_with(id: &str, style: &[(&str, &str)]) -> (MemoryHost, NodeId) {
    let mut host = MemoryHost::new();
    let root = host.root();
    host.set_style(root, "width", "1000px");
    host.set_style(root, "height", "800px");
    let node = host.append(root, "div", Some(id), &[]);
    for (property, value) in style {
        host.set_style(node, property, value);
    }
    (host, node)
}

fn inline(tl: &Timeline<MemoryHost>, node: NodeId, property: &str) -> UnitValue {
    let raw = tl
        .host()
        .inline_style(node, property)
        .unwrap_or_else(|| panic!("{property} was never written"));
    UnitValue::parse(raw).unwrap()
}

type TweenLog = Rc<RefCell<Vec<(NodeId, f64, StyleMap)>>>;

struct RecordingTween(TweenLog);

impl TweenEngine for RecordingTween {
    fn tween(&mut self, node: NodeId, seconds: f64, style: &StyleMap) {
        self.0.borrow_mut().push((node, seconds, style.clone()));
    }
}

#[test]
fn opacity_fades_in_and_clamps_past_the_end() {
    let (host, node) = host_with("box", &[("opacity", "0")]);
    let mut tl = Timeline::new(host);
    tl.register("#box")
        .unwrap()
        .to(0.0, 100.0, StyleDecl::new().with("opacity", 1))
        .unwrap();

    tl.dispatch(50.0, 0.0).unwrap();
    assert_relative_eq!(inline(&tl, node, "opacity").value, 0.5, epsilon = 1e-9);

    tl.dispatch(0.0, 0.0).unwrap();
    assert_eq!(inline(&tl, node, "opacity").value, 0.0);

    let out = tl.dispatch(150.0, 0.0).unwrap();
    assert_eq!(out.frame, 100.0);
    assert_eq!(tl.current_frame(), 100.0);
    assert_eq!(inline(&tl, node, "opacity").value, 1.0);
}

#[test]
fn current_frame_always_stays_in_bounds() {
    let (host, _) = host_with("box", &[]);
    let mut tl = Timeline::new(host);
    tl.register("#box")
        .unwrap()
        .to(10.0, 60.0, StyleDecl::new().with("left", 100))
        .unwrap();
    for frame in [-50.0, 1e9, 30.0, f64::NAN, f64::INFINITY, -0.0, 60.0, 61.0] {
        tl.dispatch(frame, 0.0).unwrap();
        let current = tl.current_frame();
        assert!((0.0..=60.0).contains(&current), "{frame} -> {current}");
    }
}

#[test]
fn boundaries_reproduce_begin_and_final_values() {
    let (host, node) = host_with("box", &[("left", "13.3px")]);
    let mut tl = Timeline::new(host);
    tl.register("#box")
        .unwrap()
        .to(0.0, 100.0, StyleDecl::new().with("left", "77.7px"))
        .unwrap();

    tl.dispatch(0.0, 0.0).unwrap();
    assert_eq!(tl.host().inline_style(node, "left"), Some("13.3px"));
    tl.dispatch(100.0, 0.0).unwrap();
    assert_eq!(tl.host().inline_style(node, "left"), Some("77.7px"));
}

#[test]
fn interpolation_is_monotonic() {
    let (host, node) = host_with("box", &[("top", "200px")]);
    let mut tl = Timeline::new(host);
    tl.register("#box")
        .unwrap()
        .to(0.0, 100.0, StyleDecl::new().with("top", -40))
        .unwrap();

    let mut last = f64::INFINITY;
    for frame in (0..=100).step_by(5) {
        tl.dispatch(frame as f64, 0.0).unwrap();
        let v = inline(&tl, node, "top").value;
        assert!(v <= last, "frame {frame}: {v} > {last}");
        last = v;
    }
    assert_eq!(last, -40.0);
}

#[test]
fn overlapping_ranges_fail_in_any_order() {
    let (host, _) = host_with("box", &[]);
    let mut tl = Timeline::new(host);
    let id = tl.register("#box").unwrap().id();
    let decl = || StyleDecl::new().with("left", 1);

    tl.target_mut(id).unwrap().to(40.0, 80.0, decl()).unwrap();
    for (start, end) in [(0.0, 41.0), (79.0, 90.0), (50.0, 60.0), (0.0, 100.0)] {
        let err = tl.target_mut(id).unwrap().to(start, end, decl()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Construction, "[{start},{end}]");
    }
    tl.target_mut(id)
        .unwrap()
        .to(0.0, 40.0, decl())
        .unwrap()
        .to(80.0, 90.0, decl())
        .unwrap();
    assert_eq!(tl.target(id).unwrap().ranges().len(), 3);
}

#[test]
fn progress_hook_and_outputs_follow_each_render() {
    let (host, node) = host_with("box", &[]);
    let mut tl = Timeline::new(host);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = tl
        .register("#box")
        .unwrap()
        .to_with(100.0, 200.0, StyleDecl::new().with("width", 300), move |p| {
            sink.borrow_mut().push(p)
        })
        .unwrap()
        .id();

    let out = tl.dispatch(50.0, 0.0).unwrap();
    assert!(out.is_empty());

    let out = tl.dispatch(125.0, 0.0).unwrap();
    let change = out.for_target(id).next().unwrap();
    assert_eq!(change.node, node);
    assert_eq!(change.kind, ChangeKind::Interpolated);
    assert_eq!(change.percent, 0.25);
    assert_eq!(change.style["width"], "75px");

    tl.dispatch(200.0, 0.0).unwrap();
    assert_eq!(*seen.borrow(), vec![0.25, 1.0]);
    assert_eq!(tl.target(id).unwrap().ranges()[0].percent, 1.0);
}

#[test]
fn unparsable_begin_value_is_a_parse_error() {
    let (host, _) = host_with("box", &[("left", "calc(10px + 2em)")]);
    let mut tl = Timeline::new(host);
    tl.register("#box")
        .unwrap()
        .to(0.0, 10.0, StyleDecl::new().with("left", 5))
        .unwrap();
    let err = tl.dispatch(5.0, 0.0).unwrap_err();
    assert!(matches!(err, TimelineError::BadValue { .. }));
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn unparsable_final_value_is_skipped() {
    let (host, node) = host_with("box", &[("opacity", "0")]);
    let mut tl = Timeline::new(host);
    tl.register("#box")
        .unwrap()
        .to(
            0.0,
            10.0,
            StyleDecl::new().with("left", "auto").with("opacity", 1),
        )
        .unwrap();
    let out = tl.dispatch(5.0, 0.0).unwrap();
    let style = &out.changes[0].style;
    assert!(!style.contains_key("left"));
    assert_eq!(style["opacity"], "0.5");
    assert_eq!(tl.host().inline_style(node, "left"), None);
}

#[test]
fn tween_engine_receives_styles_when_enabled() {
    let (host, node) = host_with("box", &[]);
    let log: TweenLog = Rc::default();
    let mut tl = Timeline::new(host).with_tween(Box::new(RecordingTween(Rc::clone(&log))));
    tl.register("#box")
        .unwrap()
        .to(0.0, 100.0, StyleDecl::new().with("height", 100))
        .unwrap();

    tl.dispatch(50.0, 250.0).unwrap();
    {
        let calls = log.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, node);
        assert_relative_eq!(calls[0].1, 0.5);
        assert_eq!(calls[0].2["height"], "50px");
    }
    assert_eq!(tl.host().inline_style(node, "height"), None);

    tl.configure(ConfigPatch {
        use_tween: Some(false),
        ..Default::default()
    });
    tl.dispatch(20.0, 250.0).unwrap();
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(tl.host().inline_style(node, "height"), Some("20px"));
}

#[test]
fn skipped_ranges_snap_only_when_enabled() {
    let build = |snap: bool| {
        let (host, node) = host_with("box", &[("left", "0px")]);
        let mut tl = Timeline::new(host);
        if snap {
            let patch: ConfigPatch = configs::load("snapping").unwrap();
            tl.configure(patch);
        }
        assert_eq!(tl.config().snap_passed_ranges, snap);
        tl.register("#box")
            .unwrap()
            .to(0.0, 10.0, StyleDecl::new().with("left", 100))
            .unwrap()
            .to(20.0, 30.0, StyleDecl::new().with("left", 200))
            .unwrap();
        (tl, node)
    };

    let (mut tl, _) = build(false);
    let kinds: Vec<_> = tl
        .dispatch(25.0, 0.0)
        .unwrap()
        .changes
        .iter()
        .map(|c| (c.range, c.kind))
        .collect();
    assert_eq!(kinds, vec![(1, ChangeKind::Interpolated)]);
    assert_eq!(tl.targets()[0].ranges()[0].percent, 0.0);

    let (mut tl, _) = build(true);
    let out = tl.dispatch(25.0, 0.0).unwrap();
    let kinds: Vec<_> = out.changes.iter().map(|c| (c.range, c.kind)).collect();
    assert_eq!(
        kinds,
        vec![(0, ChangeKind::Snapped), (1, ChangeKind::Interpolated)]
    );
    assert_eq!(out.changes[0].style["left"], "100px");
    assert_eq!(tl.targets()[0].ranges()[0].percent, 1.0);

    // scrolling back snaps the later range to its begin style
    let out = tl.dispatch(0.0, 0.0).unwrap();
    let back = out.changes.iter().find(|c| c.range == 1).unwrap();
    assert_eq!(back.kind, ChangeKind::Snapped);
    assert_eq!(back.percent, 0.0);
    assert_eq!(back.style["left"], "100px");
}

#[test]
fn snapping_through_the_tween_uses_at_least_half_a_second() {
    let (host, _) = host_with("box", &[]);
    let log: TweenLog = Rc::default();
    let mut tl = Timeline::new(host).with_tween(Box::new(RecordingTween(Rc::clone(&log))));
    tl.configure_json(r#"{"snap_passed_ranges": true}"#).unwrap();
    tl.register("#box")
        .unwrap()
        .to(0.0, 10.0, StyleDecl::new().with("width", 10))
        .unwrap()
        .to(10.0, 40.0, StyleDecl::new().with("width", 40))
        .unwrap();

    tl.dispatch(8.0, 0.0).unwrap();
    log.borrow_mut().clear();
    tl.dispatch(30.0, 0.0).unwrap();
    let calls = log.borrow();
    // range 0 was at 0.8: snapping the remaining 0.2 is stretched to 0.5s
    assert_relative_eq!(calls[0].1, 0.5);
    assert_eq!(calls[0].2["width"], "10px");
}

#[test]
fn unsupported_properties_are_dropped_silently() {
    let (host, node) = host_with("box", &[]);
    let mut tl = Timeline::new(host);
    tl.register("#box")
        .unwrap()
        .to(
            0.0,
            10.0,
            StyleDecl::new().with("transform", "rotate(4deg)").with("left", 10),
        )
        .unwrap();
    let range = &tl.targets()[0].ranges()[0];
    assert!(!range.final_style.contains_key("transform"));
    tl.dispatch(10.0, 0.0).unwrap();
    assert_eq!(tl.host().inline_style(node, "left"), Some("10px"));
    assert!(tl.host().query("#box").is_some());
}

#[test]
fn configure_json_rejects_bad_types() {
    let (host, _) = host_with("box", &[]);
    let mut tl = Timeline::new(host);
    let err = tl.configure_json(r#"{"tick_ms": "soon"}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(tl.config().tick_ms, 16.0);
}
