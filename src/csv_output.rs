//! CSV output for syscall tables and dependency edge lists

use crate::dependency::DependencyGraph;
use crate::stats::SyscallTally;

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Syscall frequency table: `syscall,count,percentage`, descending by count
pub fn syscall_table_csv(tally: &SyscallTally) -> String {
    let mut output = String::from("syscall,count,percentage\n");

    for row in tally.sorted() {
        output.push_str(&escape_field(&row.name));
        output.push(',');
        output.push_str(&row.count.to_string());
        output.push(',');
        output.push_str(&tally.format_percentage(row.count));
        output.push('\n');
    }

    output
}

/// Flattened dependency edges: `source,target`
pub fn edge_list_csv(graph: &DependencyGraph) -> String {
    let mut output = String::from("source,target\n");

    for edge in graph.edges() {
        output.push_str(&escape_field(&edge.source));
        output.push(',');
        output.push_str(&escape_field(&edge.target));
        output.push('\n');
    }

    output
}
