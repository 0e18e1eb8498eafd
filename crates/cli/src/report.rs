use photogps_core::PropagationSummary;
use serde_json::Value;

pub fn json_summary(summary: &PropagationSummary) -> serde_json::Result<Value> {
    let status = if summary.failed == 0 { "ok" } else { "partial" };
    Ok(serde_json::json!({
        "status": status,
        "root": summary.root,
        "scanned": summary.scanned,
        "tagged": summary.tagged,
        "untagged": summary.untagged,
        "matched": summary.matched,
        "updated": summary.updated,
        "failed": summary.failed,
        "dry_run": summary.dry_run,
        "backups_removed": summary.backups_removed,
        "matches": serde_json::to_value(&summary.matches)?,
    }))
}

/// One-line human summary, e.g. `scanned 12, tagged 5, updated 7`.
pub fn text_summary(summary: &PropagationSummary) -> String {
    let (verb, count) = if summary.dry_run {
        ("matched", summary.matched)
    } else {
        ("updated", summary.updated)
    };
    let mut line = format!(
        "scanned {}, tagged {}, {} {}",
        summary.scanned, summary.tagged, verb, count
    );
    if summary.failed > 0 {
        line.push_str(&format!(", failed {}", summary.failed));
    }
    line
}
