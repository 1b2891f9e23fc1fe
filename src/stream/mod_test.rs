use super::*;

const LANE: &str = r#"{"command":"createLane","id":"lane_sales","label":"Sales","x":190,"y":80,"width":1200,"height":250}"#;

#[test]
fn lane_split_across_three_chunks_matches_whole() {
    let (whole, _) = parse_all(LANE);
    assert_eq!(whole.len(), 1);

    let mut stream = CommandStream::new();
    let mut got = Vec::new();
    got.extend(stream.push(&LANE[..20]));
    got.extend(stream.push(&LANE[20..61]));
    assert!(got.is_empty());
    got.extend(stream.push(&LANE[61..]));
    assert_eq!(got, whole);

    let stats = stream.finish();
    assert_eq!(stats.candidates, 1);
    assert_eq!(stats.commands, 1);
}

#[test]
fn arithmetic_in_coordinates_is_evaluated() {
    let (commands, _) = parse_all(
        r#"{"command":"addShape","id":"t","type":"bpmn:Task","parent":"l","x":250 + 450,"y":230 + 120}"#,
    );
    let [DiagramCommand::AddShape(shape)] = commands.as_slice() else {
        panic!("expected a single addShape, got {commands:?}");
    };
    assert_eq!((shape.x, shape.y), (700.0, 350.0));
}

#[test]
fn malformed_object_is_skipped_and_stream_continues() {
    let input = format!(r#"{{"command": "createLane", "id": }} {LANE}"#);
    let (commands, stats) = parse_all(&input);
    assert_eq!(commands.len(), 1);
    assert_eq!(stats.unparsable, 1);
    assert_eq!(stats.commands, 1);
}

#[test]
fn unknown_command_is_counted_as_rejected() {
    let (commands, stats) = parse_all(r#"{"command":"deleteEverything"} {"hello":"world"}"#);
    assert!(commands.is_empty());
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.candidates, 2);
}

#[test]
fn trailing_comma_inside_object_is_repaired() {
    let (commands, stats) = parse_all(r#"{"command":"addConnection","id":"f","sourceId":"a","targetId":"b",}"#);
    assert_eq!(commands.len(), 1);
    assert_eq!(stats.unparsable, 0);
}

#[test]
fn unterminated_tail_is_reported_at_finish() {
    let mut stream = CommandStream::new();
    let commands = stream.push(&format!("{LANE}\n{{\"command\":\"addShape\""));
    assert_eq!(commands.len(), 1);
    let stats = stream.finish();
    assert_eq!(stats.leftover_bytes, r#"{"command":"addShape""#.len());
    assert_eq!(stats.commands, 1);
}

#[test]
fn fenced_response_parses_every_command() {
    let text = format!("```json\n{LANE}\n{LANE}\n```");
    let (commands, stats) = parse_all(&text);
    assert_eq!(commands.len(), 2);
    assert_eq!(stats, StreamStats { candidates: 2, commands: 2, ..StreamStats::default() });
}

#[test]
fn null_and_numeric_ids_still_yield_commands() {
    let input = concat!(
        r#"{"command":"createLane","id":"lane_1","label":null,"x":190,"y":80,"width":1200,"height":250}"#,
        r#"{"command":"addShape","id":7,"type":"bpmn:Task","parent":"lane_1","x":250,"y":120}"#,
        r#"{"command":"addConnection","id":"f1","sourceId":"7","targetId":null}"#,
    );
    let (commands, stats) = parse_all(input);
    assert_eq!(stats.commands, 3);
    assert_eq!(stats.rejected, 0);
    assert_eq!(commands.len(), 3);
}
