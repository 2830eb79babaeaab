#![no_main]

use buildtrace::classifier::Classifier;
use buildtrace::scan::analyze_reader;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes, including invalid UTF-8 and unterminated quotes, must scan
    // without panicking, and the tally must agree with the summary.
    let classifier = Classifier::default();
    if let Ok(analysis) = analyze_reader(Cursor::new(data), &classifier, Path::new("fuzz.log")) {
        assert_eq!(analysis.tally.total(), analysis.summary.syscall_lines);
        assert_eq!(analysis.graph.edge_count() as u64, analysis.summary.edges);
    }
});
