use super::*;

fn lane_bounds(y: f64) -> Rect {
    Rect::new(190.0, y, 600.0, 150.0)
}

#[test]
fn new_model_has_baseline_pool_only() {
    let model = DiagramModel::new();
    let pool = model.pool().unwrap();
    assert_eq!(pool.id, BASELINE_POOL_ID);
    assert_eq!(pool.label, "Process");
    assert_eq!(pool.bounds, BASELINE_POOL_BOUNDS);
    assert!(pool.horizontal);
    assert!(model.is_empty());
    assert_eq!(model.kind_of(BASELINE_POOL_ID), Some(ElementKind::Pool));
}

#[test]
fn empty_model_rejects_creation() {
    let mut model = DiagramModel::empty();
    assert!(matches!(model.create_lane(lane_bounds(80.0)), Err(ModelError::PoolMissing)));
    assert!(matches!(
        model.create_node("bpmn:Task", Rect::new(0.0, 0.0, 100.0, 80.0), Parent::Pool),
        Err(ModelError::PoolMissing)
    ));
}

#[test]
fn create_lane_generates_prefixed_id() {
    let mut model = DiagramModel::new();
    let id = model.create_lane(lane_bounds(80.0)).unwrap();
    assert!(id.starts_with("Lane_"));
    assert_eq!(model.kind_of(&id), Some(ElementKind::Lane));
    assert!(!model.is_empty());
}

#[test]
fn create_node_requires_existing_lane() {
    let mut model = DiagramModel::new();
    let err = model
        .create_node("bpmn:UserTask", Rect::new(0.0, 0.0, 100.0, 80.0), Parent::Lane("ghost".into()))
        .unwrap_err();
    assert!(matches!(err, ModelError::LaneNotFound(ref id) if id == "ghost"));
    assert_eq!(err.error_code(), "E_LANE_NOT_FOUND");
}

#[test]
fn create_node_parses_kind() {
    let mut model = DiagramModel::new();
    let lane = model.create_lane(lane_bounds(80.0)).unwrap();
    let id = model
        .create_node("bpmn:ExclusiveGateway", Rect::new(0.0, 0.0, 50.0, 50.0), Parent::Lane(lane.clone()))
        .unwrap();
    let node = model.node(&id).unwrap();
    assert_eq!(node.kind, NodeKind::ExclusiveGateway);
    assert_eq!(node.family(), NodeFamily::Gateway);
    assert_eq!(node.parent, Parent::Lane(lane));
}

#[test]
fn connect_routes_between_nodes() {
    let mut model = DiagramModel::new();
    let a = model
        .create_node("bpmn:Task", Rect::new(0.0, 0.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    let b = model
        .create_node("bpmn:Task", Rect::new(400.0, 0.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    let id = model.connect(&a, &b).unwrap();
    let connection = model.connection(&id).unwrap();
    assert_eq!(connection.source, a);
    assert_eq!(connection.target, b);
    assert_eq!(connection.waypoints.len(), 2);
}

#[test]
fn connect_reports_missing_endpoint() {
    let mut model = DiagramModel::new();
    let a = model
        .create_node("bpmn:Task", Rect::new(0.0, 0.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    let err = model.connect(&a, "nowhere").unwrap_err();
    assert!(matches!(err, ModelError::NodeNotFound(ref id) if id == "nowhere"));
    assert!(model.connections().is_empty());
}

#[test]
fn reassign_lane_id_rewires_children() {
    let mut model = DiagramModel::new();
    let lane = model.create_lane(lane_bounds(80.0)).unwrap();
    let node = model
        .create_node("bpmn:Task", Rect::new(0.0, 0.0, 100.0, 80.0), Parent::Lane(lane.clone()))
        .unwrap();

    model.reassign_id(&lane, "lane_sales").unwrap();

    assert!(model.lane(&lane).is_none());
    assert_eq!(model.lane("lane_sales").unwrap().id, "lane_sales");
    assert_eq!(model.node(&node).unwrap().parent, Parent::Lane("lane_sales".into()));
    assert_eq!(model.nodes_in_lane("lane_sales").len(), 1);
}

#[test]
fn reassign_node_id_rewires_connections() {
    let mut model = DiagramModel::new();
    let a = model
        .create_node("bpmn:Task", Rect::new(0.0, 0.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    let b = model
        .create_node("bpmn:Task", Rect::new(400.0, 0.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    let flow = model.connect(&a, &b).unwrap();

    model.reassign_id(&a, "task_1").unwrap();
    model.reassign_id(&b, "task_2").unwrap();

    let connection = model.connection(&flow).unwrap();
    assert_eq!(connection.source, "task_1");
    assert_eq!(connection.target, "task_2");
}

#[test]
fn reassign_to_taken_id_fails_and_keeps_old() {
    let mut model = DiagramModel::new();
    let lane = model.create_lane(lane_bounds(80.0)).unwrap();
    let err = model.reassign_id(&lane, BASELINE_POOL_ID).unwrap_err();
    assert!(matches!(err, ModelError::DuplicateId(_)));
    assert!(model.lane(&lane).is_some());
}

#[test]
fn reassign_unknown_id_fails() {
    let mut model = DiagramModel::new();
    assert!(matches!(model.reassign_id("ghost", "spirit"), Err(ModelError::NotFound(_))));
    assert!(matches!(model.reassign_id("ghost", "ghost"), Err(ModelError::NotFound(_))));
}

#[test]
fn set_label_covers_pool_lane_and_node() {
    let mut model = DiagramModel::new();
    let lane = model.create_lane(lane_bounds(80.0)).unwrap();
    let node = model
        .create_node("bpmn:Task", Rect::new(0.0, 0.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    model.set_label(BASELINE_POOL_ID, "Order to Cash").unwrap();
    model.set_label(&lane, "Sales").unwrap();
    model.set_label(&node, "1. Take order").unwrap();
    assert_eq!(model.pool().unwrap().label, "Order to Cash");
    assert_eq!(model.lane(&lane).unwrap().label, "Sales");
    assert_eq!(model.node(&node).unwrap().label, "1. Take order");
    assert!(matches!(model.set_label("ghost", "x"), Err(ModelError::NotFound(_))));
}

#[test]
fn move_and_resize_node() {
    let mut model = DiagramModel::new();
    let node = model
        .create_node("bpmn:Task", Rect::new(10.0, 10.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    model.move_node(&node, 5.0, -5.0).unwrap();
    assert_eq!(model.node(&node).unwrap().bounds, Rect::new(15.0, 5.0, 100.0, 80.0));
    model.resize_node(&node, Rect::new(0.0, 0.0, 120.0, 90.0)).unwrap();
    assert_eq!(model.node(&node).unwrap().bounds, Rect::new(0.0, 0.0, 120.0, 90.0));
    assert!(model.move_node("ghost", 1.0, 1.0).is_err());
}

#[test]
fn resize_lane_does_not_move_children() {
    let mut model = DiagramModel::new();
    let lane = model.create_lane(lane_bounds(80.0)).unwrap();
    let node = model
        .create_node("bpmn:Task", Rect::new(300.0, 100.0, 100.0, 80.0), Parent::Lane(lane.clone()))
        .unwrap();
    model.resize_lane(&lane, Rect::new(0.0, 500.0, 900.0, 400.0)).unwrap();
    assert_eq!(model.node(&node).unwrap().bounds.y, 100.0);
}

#[test]
fn enumeration_is_in_creation_order() {
    let mut model = DiagramModel::new();
    let ids: Vec<ElementId> = (0..5)
        .map(|i| model.create_lane(lane_bounds(f64::from(i) * 150.0)).unwrap())
        .collect();
    let listed: Vec<ElementId> = model.lanes().iter().map(|l| l.id.clone()).collect();
    assert_eq!(listed, ids);
}

#[test]
fn layout_connections_refreshes_waypoints() {
    let mut model = DiagramModel::new();
    let a = model
        .create_node("bpmn:Task", Rect::new(0.0, 0.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    let b = model
        .create_node("bpmn:Task", Rect::new(400.0, 0.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    let flow = model.connect(&a, &b).unwrap();
    model.move_node(&b, 0.0, 300.0).unwrap();

    assert_eq!(model.layout_connections(), 1);
    assert_eq!(model.connection(&flow).unwrap().waypoints.len(), 4);
}

#[test]
fn fit_view_covers_pool_and_nodes() {
    let mut model = DiagramModel::new();
    model
        .create_node("bpmn:Task", Rect::new(2000.0, 100.0, 100.0, 80.0), Parent::Pool)
        .unwrap();
    let view = model.fit_view().unwrap();
    assert!(view.x <= BASELINE_POOL_BOUNDS.x);
    assert!(view.right() >= 2100.0);
    assert_eq!(model.viewport(), Some(view));
}

#[test]
fn fit_view_on_empty_model_clears_viewport() {
    let mut model = DiagramModel::empty();
    assert!(model.fit_view().is_none());
}

#[test]
fn reset_restores_baseline() {
    let mut model = DiagramModel::new();
    model.create_lane(lane_bounds(80.0)).unwrap();
    model.resize_pool(Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
    model.reset();
    assert!(model.is_empty());
    assert_eq!(model.pool().unwrap().bounds, BASELINE_POOL_BOUNDS);
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut model = DiagramModel::new();
    let lane = model.create_lane(lane_bounds(80.0)).unwrap();
    let a = model
        .create_node("bpmn:StartEvent", Rect::new(250.0, 100.0, 36.0, 36.0), Parent::Lane(lane.clone()))
        .unwrap();
    let b = model
        .create_node("bpmn:UserTask", Rect::new(500.0, 100.0, 100.0, 80.0), Parent::Lane(lane))
        .unwrap();
    model.connect(&a, &b).unwrap();

    let json = serde_json::to_string(&model.snapshot()).unwrap();
    let restored = DiagramModel::from_snapshot(serde_json::from_str(&json).unwrap());
    assert_eq!(restored.snapshot(), model.snapshot());

    // New elements keep sorting after restored ones.
    let mut restored = restored;
    let later = restored.create_lane(lane_bounds(400.0)).unwrap();
    assert_eq!(restored.lanes().last().unwrap().id, later);
}
