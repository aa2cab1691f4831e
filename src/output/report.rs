//! Plain-text session report.
//!
//! Format:
//! ```text
//! *** Throughput: 9.41 Mbps
//! *** Times spent in server functions between 3.37s and 32.90s:
//! *** Time interval is 29.53s
//!     Time in recv_segment == 12.04s
//!     Time in send_ack == 3.10s
//! ```

use crate::parser::schema::SessionReport;

/// Render a session report the way it is printed to stdout
///
/// **Public** - used by the analyze command
pub fn render_session_report(report: &SessionReport) -> String {
    let mut out = String::new();
    let window = &report.window;

    out.push_str(&render_throughput(report.throughput_mbps));
    out.push('\n');
    out.push_str(&format!(
        "*** Times spent in {} functions between {:.2}s and {:.2}s:\n",
        report.tag, window.start, window.stop
    ));
    out.push_str(&format!("*** Time interval is {:.2}s\n", window.duration()));
    for entry in &report.functions {
        out.push_str(&format!(
            "    Time in {} == {:.2}s\n",
            entry.function, entry.total_secs
        ));
    }
    out.push('\n');
    out
}

/// Throughput line; `n/a` when the window has no duration
pub fn render_throughput(throughput_mbps: Option<f64>) -> String {
    match throughput_mbps {
        Some(mbps) => format!("*** Throughput: {:.2} Mbps", mbps),
        None => "*** Throughput: n/a".to_string(),
    }
}
