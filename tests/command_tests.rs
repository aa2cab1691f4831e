use netemu_studio::commands::{analyze_session, execute_analyze, AnalyzeArgs, SessionInput};
use netemu_studio::output::render_session_report;
use netemu_studio::parser::schema::AnalysisReport;
use netemu_studio::parser::{read_flow_log, read_trace_events, ObservationWindow};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{tempdir, NamedTempFile};

fn write_temp(content: &str) -> NamedTempFile {
    write_temp_bytes(content.as_bytes())
}

fn write_temp_bytes(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file
}

#[test]
fn test_analyze_session_end_to_end() {
    let flow = write_temp("0.0:1:100\n1.0:2:100\n");
    let trace = write_temp("0.5:i:x:foo\n0.8:o:x:foo\n1.5:i:x:late\n1.6:o:x:late\n");

    let input = SessionInput {
        tag: "server".to_string(),
        flow_file: flow.path().to_path_buf(),
        trace_file: trace.path().to_path_buf(),
    };
    let report = analyze_session(&input, 0.01).unwrap();

    assert_eq!(report.functions.len(), 1);
    assert_eq!(report.functions[0].function, "foo");
    assert_eq!(report.stats.events_in_window, 2);
    assert_eq!(report.total_bytes, 200);

    let text = render_session_report(&report);
    assert_eq!(
        text,
        "\
*** Throughput: 0.00 Mbps
*** Times spent in server functions between 0.00s and 1.00s:
*** Time interval is 1.00s
    Time in foo == 0.30s

"
    );
}

#[test]
fn test_analyze_session_skips_malformed_lines() {
    let flow = write_temp_bytes(b"0.0:1:100\nnot-a-number:1:5\n0.5:1:\xff\n1.0:2:100\n");
    let trace = write_temp_bytes(
        b"0.5:i:x:foo\n0.6:i\n0.65:i:x:\xff\xfe\ngarbage\n\n0.8:o:x:foo\n",
    );

    let log = read_flow_log(flow.path()).unwrap();
    assert_eq!(log.records.len(), 2);
    assert_eq!(log.skipped_lines, 2);

    let window = log.window().unwrap();
    let events = read_trace_events(trace.path(), &window).unwrap();
    assert_eq!(events.len(), 2);

    let input = SessionInput {
        tag: "server".to_string(),
        flow_file: flow.path().to_path_buf(),
        trace_file: trace.path().to_path_buf(),
    };
    let report = analyze_session(&input, 0.01).unwrap();

    assert_eq!(report.window, ObservationWindow::new(0.0, 1.0));
    assert_eq!(report.total_bytes, 200);
    assert_eq!(report.functions.len(), 1);
    assert_eq!(report.functions[0].function, "foo");
    assert!((report.functions[0].total_secs - 0.3).abs() < 1e-9);
    assert_eq!(report.stats.matched_pairs, 1);
}

#[test]
fn test_empty_flow_log_is_an_error() {
    let flow = write_temp("\n");
    let trace = write_temp("0.5:i:x:foo\n");

    let input = SessionInput {
        tag: "client".to_string(),
        flow_file: flow.path().to_path_buf(),
        trace_file: trace.path().to_path_buf(),
    };
    assert!(analyze_session(&input, 0.01).is_err());
}

#[test]
fn test_execute_analyze_writes_json() {
    let server_flow = write_temp("10.0:1:1250000\n11.0:1:1250000\n");
    let server_trace = write_temp("10.2:i:0:recv\n10.7:o:0:recv\n");
    let client_flow = write_temp("10.0:1:500\n12.0:1:500\n");
    let client_trace = write_temp("10.5:i:0:send\n");

    let out_dir = tempdir().unwrap();
    let json_path = out_dir.path().join("report.json");

    let sessions = AnalyzeArgs::pair_sessions(
        vec![
            server_flow.path().to_path_buf(),
            client_flow.path().to_path_buf(),
        ],
        vec![
            server_trace.path().to_path_buf(),
            client_trace.path().to_path_buf(),
        ],
        vec!["server".to_string()],
    )
    .unwrap();

    let args = AnalyzeArgs {
        sessions,
        output_json: Some(json_path.clone()),
        ..Default::default()
    };
    let report = execute_analyze(args).unwrap();

    assert_eq!(report.sessions.len(), 2);
    assert_eq!(report.sessions[1].tag, "session-2");
    assert!(report.sessions[1].functions.is_empty());
    assert_eq!(report.sessions[1].stats.dangling_entries, 1);

    // 2 * 1_250_000 bytes over 1s = 20 Mbps
    let throughput = report.sessions[0].throughput_mbps.unwrap();
    assert!((throughput - 20.0).abs() < 1e-9);

    let text = std::fs::read_to_string(&json_path).unwrap();
    let loaded: AnalysisReport = serde_json::from_str(&text).unwrap();
    assert_eq!(loaded.sessions.len(), 2);
    assert_eq!(loaded.sessions[0].functions[0].function, "recv");
}

#[test]
fn test_pair_sessions_mismatch() {
    let result = AnalyzeArgs::pair_sessions(
        vec![PathBuf::from("a"), PathBuf::from("b")],
        vec![PathBuf::from("c")],
        Vec::new(),
    );
    assert!(result.is_err());
}

#[test]
fn test_pair_sessions_too_many_tags() {
    let result = AnalyzeArgs::pair_sessions(
        vec![PathBuf::from("a")],
        vec![PathBuf::from("b")],
        vec!["x".to_string(), "y".to_string()],
    );
    assert!(result.is_err());
}
