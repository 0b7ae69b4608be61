use super::*;
use crate::config::EngineConfig;
use crate::render::background::BackgroundChoice;
use crate::render::compositor::SourceLayer;

#[test]
fn tickets_increase_monotonically() {
    let gate = RenderGate::new();
    let a = gate.begin();
    let b = gate.begin();
    assert!(b > a);
    assert_eq!(b.generation(), a.generation() + 1);
}

#[test]
fn only_the_latest_ticket_is_accepted() {
    let gate = RenderGate::new();
    let first = gate.begin();
    let second = gate.begin();
    assert_eq!(gate.accept(first, "stale"), None);
    assert_eq!(gate.accept(second, "fresh"), Some("fresh"));
    assert!(gate.is_current(second));
}

#[test]
fn out_of_order_completion_keeps_the_newest() {
    let gate = RenderGate::new();
    let slow = gate.begin();
    let fast = gate.begin();
    let mut shown = None;
    if let Some(v) = gate.accept(fast, 2) {
        shown = Some(v);
    }
    if let Some(v) = gate.accept(slow, 1) {
        shown = Some(v);
    }
    assert_eq!(shown, Some(2));
}

#[test]
fn gate_render_delivers_when_uncontended() {
    let src = Bitmap::filled(30, 40, [10, 20, 30, 255]).unwrap();
    let renderer = CompositeRenderer::new(EngineConfig::default()).unwrap();
    let spec = CompositeSpec {
        source: SourceLayer::Cropped(&src),
        foreground: None,
        background: BackgroundChoice::White,
        output_width: 30,
        output_height: 40,
        tier: ResolutionTier::Preview,
    };
    let gate = RenderGate::new();
    assert!(gate.render(&renderer, &spec).unwrap().is_some());
}
