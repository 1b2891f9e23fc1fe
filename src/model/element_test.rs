use super::*;

#[test]
fn rect_centers_and_edges() {
    let r = Rect::new(10.0, 20.0, 100.0, 80.0);
    assert!((r.center_x() - 60.0).abs() < f64::EPSILON);
    assert!((r.center_y() - 60.0).abs() < f64::EPSILON);
    assert!((r.right() - 110.0).abs() < f64::EPSILON);
    assert!((r.bottom() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn rect_overlap_is_open_interval() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let touching = Rect::new(100.0, 100.0, 50.0, 50.0);
    let inside = Rect::new(99.0, 99.0, 50.0, 50.0);
    assert!(!a.overlaps_x(&touching));
    assert!(!a.overlaps_y(&touching));
    assert!(a.overlaps_x(&inside));
    assert!(a.overlaps_y(&inside));
}

#[test]
fn rect_finite_check_covers_all_fields() {
    assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_finite());
    assert!(!Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
    assert!(!Rect::new(0.0, 0.0, f64::INFINITY, 1.0).is_finite());
}

#[test]
fn rect_union_and_expand() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(20.0, -5.0, 10.0, 10.0);
    assert_eq!(a.union(&b), Rect::new(0.0, -5.0, 30.0, 15.0));
    assert_eq!(a.expand(5.0), Rect::new(-5.0, -5.0, 20.0, 20.0));
}

#[test]
fn kind_parse_accepts_namespaced_and_bare_names() {
    assert_eq!(NodeKind::parse("bpmn:UserTask"), NodeKind::UserTask);
    assert_eq!(NodeKind::parse("ServiceTask"), NodeKind::ServiceTask);
    assert_eq!(NodeKind::parse(" bpmn:ExclusiveGateway "), NodeKind::ExclusiveGateway);
    assert_eq!(NodeKind::parse("bpmn:SubProcess"), NodeKind::Other);
}

#[test]
fn family_of_known_kinds() {
    assert_eq!(family_of("bpmn:BusinessRuleTask"), NodeFamily::Task);
    assert_eq!(family_of("bpmn:StartEvent"), NodeFamily::Event);
    assert_eq!(family_of("bpmn:ParallelGateway"), NodeFamily::Gateway);
    assert_eq!(family_of("bpmn:EventBasedGateway"), NodeFamily::Gateway);
}

#[test]
fn family_of_unknown_types_uses_substrings() {
    assert_eq!(family_of("bpmn:SignalEventDefinition"), NodeFamily::Event);
    assert_eq!(family_of("custom:FancyGateway"), NodeFamily::Gateway);
    assert_eq!(family_of("bpmn:SubProcess"), NodeFamily::Task);
    assert_eq!(family_of(""), NodeFamily::Task);
}

#[test]
fn default_sizes_by_family() {
    assert_eq!(NodeFamily::Task.default_size(), (100.0, 80.0));
    assert_eq!(NodeFamily::Event.default_size(), (36.0, 36.0));
    assert_eq!(NodeFamily::Gateway.default_size(), (50.0, 50.0));
}

#[test]
fn parent_serializes_with_kind_tag() {
    let lane = serde_json::to_value(Parent::Lane("Lane_a".into())).unwrap();
    assert_eq!(lane, serde_json::json!({"kind": "lane", "id": "Lane_a"}));
    let pool = serde_json::to_value(Parent::Pool).unwrap();
    assert_eq!(pool, serde_json::json!({"kind": "pool"}));
    assert_eq!(Parent::Lane("x".into()).lane_id(), Some("x"));
    assert_eq!(Parent::Pool.lane_id(), None);
}
