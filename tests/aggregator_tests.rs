use netemu_studio::aggregator::{aggregate_function_times, rank_function_times};
use netemu_studio::parser::{parse_flow_log, parse_trace_events, ObservationWindow, TraceEvent};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_window_and_throughput_scenario() {
    let log = parse_flow_log("flow", "0.0:1:100\n1.0:2:100\n");
    let window = log.window().unwrap();

    assert_eq!(window, ObservationWindow::new(0.0, 1.0));
    assert_eq!(log.total_bytes(), 200);
    assert!(approx(log.throughput_mbps().unwrap(), 8.0 * 200.0 / (1.0 * 1e6)));
}

#[test]
fn test_short_flow_lines_count_towards_window_only() {
    let log = parse_flow_log("flow", "1.0\n2.0:5:1000\n4.0:5\n");
    let window = log.window().unwrap();

    assert_eq!(window.start, 1.0);
    assert_eq!(window.stop, 4.0);
    assert_eq!(log.total_bytes(), 1000);
}

#[test]
fn test_single_pair_scenario() {
    let window = ObservationWindow::new(0.0, 1.0);
    let events = parse_trace_events("0.5:i:x:foo\n0.8:o:x:foo\n", &window);
    let table = aggregate_function_times(&events);

    assert_eq!(table.len(), 1);
    assert!(approx(table.get("foo").unwrap(), 0.3));
}

#[test]
fn test_two_field_line_is_skipped() {
    let window = ObservationWindow::new(0.0, 1.0);
    let events = parse_trace_events("0.1:i\n0.5:i:x:foo\n0.8:o:x:foo\n", &window);

    assert_eq!(events.len(), 2);
}

#[test]
fn test_unmatched_exit_leaves_table_unchanged() {
    let events = vec![
        TraceEvent::entry(0.1, "a"),
        TraceEvent::exit(0.2, "a"),
        TraceEvent::exit(0.3, "b"),
    ];
    let table = aggregate_function_times(&events);

    assert_eq!(table.len(), 1);
    assert_eq!(table.get("b"), None);
}

#[test]
fn test_events_outside_window_dropped_before_matching() {
    // Entry before the window start cannot be matched by an in-window exit
    let window = ObservationWindow::new(1.0, 2.0);
    let content = "0.5:i:0:f\n1.5:o:0:f\n1.6:i:0:g\n1.9:o:0:g\n";
    let table = aggregate_function_times(&parse_trace_events(content, &window));

    assert_eq!(table.get("f"), None);
    assert!(approx(table.get("g").unwrap(), 0.3));
    assert_eq!(table.stats.unmatched_exits, 1);
}

#[test]
fn test_rank_after_aggregation() {
    let window = ObservationWindow::new(0.0, 10.0);
    let content = "\
0.0:i:0:recv
4.0:o:0:recv
4.0:i:0:send
5.0:o:0:send
5.0:i:0:ack
5.001:o:0:ack
5.1:i:0:timer
5.102:o:0:timer
";
    let table = aggregate_function_times(&parse_trace_events(content, &window));
    let ranked = rank_function_times(&table, window.duration(), 0.01);
    let names: Vec<&str> = ranked.iter().map(|f| f.function.as_str()).collect();

    // "timer" is the first entry below threshold and still listed; "ack" is cut
    assert_eq!(names, vec!["recv", "send", "timer"]);
}
