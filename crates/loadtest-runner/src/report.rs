//! Console reporting

use crate::evaluate::ThresholdOutcome;
use crate::metrics::RunSummary;

const LINE: &str = "═══════════════════════════════════════════════════════════════";

fn row(label: &str, value: String) {
    println!("║ {:<22} {:>37} ║", label, value);
}

/// Print the boxed run summary
pub fn print_summary(summary: &RunSummary) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║               OPENCLOUDHUB LOAD TEST RESULTS                 ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    row("Test type:", summary.test_type.clone());
    row("Target:", summary.test_target.clone());
    row("Duration:", format!("{:.2}s", summary.duration_secs));
    row("Requests:", summary.http_reqs.to_string());
    row("Failed:", summary.http_req_failed.to_string());
    row("Failure rate:", format!("{:.2}%", summary.failure_rate * 100.0));
    row("Throughput:", format!("{:.2} req/s", summary.request_rate));
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║ LATENCY (milliseconds)                                       ║");
    row("  avg:", format!("{:.1}", summary.http_req_duration.avg));
    row("  min:", format!("{:.1}", summary.http_req_duration.min));
    row("  med:", format!("{:.1}", summary.http_req_duration.med));
    row("  max:", format!("{:.1}", summary.http_req_duration.max));
    row("  p90:", format!("{:.1}", summary.http_req_duration.p90));
    row("  p95:", format!("{:.1}", summary.http_req_duration.p95));
    row("  p99:", format!("{:.1}", summary.http_req_duration.p99));

    if !summary.scenarios.is_empty() {
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ SCENARIOS (p95 ms)                                           ║");
        for (name, trend) in &summary.scenarios {
            row(&format!("  {}:", name), format!("{:.1}", trend.p95));
        }
    }

    let checks = &summary.checks;
    if !checks.by_name.is_empty() {
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ CHECKS                                                       ║");
        row("  pass rate:", format!("{:.2}%", checks.pass_rate() * 100.0));
        row("  recorded:", checks.total().to_string());
    }
    println!("╚══════════════════════════════════════════════════════════════╝");

    if !checks.by_name.is_empty() {
        for (name, counter) in &checks.by_name {
            let mark = if counter.fails == 0 { "✅" } else { "❌" };
            println!(
                "  {} {} ({} passed, {} failed)",
                mark, name, counter.passes, counter.fails
            );
        }
    }
}

/// Print per-threshold outcomes; returns true when everything passed
pub fn print_thresholds(outcomes: &[ThresholdOutcome]) -> bool {
    println!("\n{}", LINE);
    println!("                         THRESHOLDS");
    println!("{}", LINE);

    let mut all_passed = true;
    for outcome in outcomes {
        let mark = if outcome.passed { "✅ PASS" } else { "❌ FAIL" };
        println!(
            "  {} - {} {} (actual: {:.2})",
            mark, outcome.selector, outcome.expression, outcome.actual
        );
        all_passed &= outcome.passed;
    }

    println!("{}", LINE);
    if all_passed {
        println!("  OVERALL: ✅ ALL THRESHOLDS PASS");
    } else {
        println!("  OVERALL: ❌ SOME THRESHOLDS FAILED");
    }
    println!("{}", LINE);
    all_passed
}
