use chemrisk_core::classify::{Assessment, CompatibilityMatrix, MatrixCell, SubstanceClassification};
use chemrisk_core::model::{Axis, Severity};

pub fn print_assessment(a: &Assessment, verbose: bool) {
    println!("=== Assessment ({} substances) ===\n", a.substances.len());

    let review = if a.expert_review_required {
        "  -- expert review required"
    } else {
        ""
    };
    println!(
        "  Global score: {}/100 ({}){}\n",
        a.global_score, a.global_level, review
    );

    // Axis scores with a small bar
    for axis in Axis::ALL {
        let score = a.axis(axis);
        let level = a
            .axis_levels
            .get(&axis)
            .map(|l| l.as_str())
            .unwrap_or("low");
        let bar = "#".repeat(usize::from(score / 5));
        println!("  {:<15} {:>3}  {:<9} {}", axis.as_str(), score, level, bar);
    }
    println!();

    let mut alerts = Vec::new();
    if a.alerts.explosion {
        alerts.push("explosion");
    }
    if a.alerts.toxic {
        alerts.push("toxic");
    }
    if a.alerts.gas {
        alerts.push("gas");
    }
    if !alerts.is_empty() {
        println!("  ALERTS: {}\n", alerts.join(", "));
    }

    if !a.bonuses.is_empty() {
        let names: Vec<&str> = a.bonuses.iter().map(|b| b.name.as_str()).collect();
        println!("  Interactions: {}\n", names.join(", "));
    }

    if a.critical_pairs.is_empty() {
        println!("  No critical pairs.\n");
    } else {
        println!("  Critical pairs:");
        for cp in &a.critical_pairs {
            let reaction = cp
                .compatibility
                .triggered_rules
                .first()
                .map(|r| r.reaction.as_str())
                .unwrap_or("");
            println!(
                "    {} + {} -> {}  ({})",
                cp.first_name, cp.second_name, cp.compatibility.severity, reaction
            );
        }
        println!();
    }

    if !a.gases_detected.is_empty() {
        let gases: Vec<&str> = a.gases_detected.iter().map(String::as_str).collect();
        println!("  Gases: {}\n", gases.join(", "));
    }

    println!("  pH: {}", a.ph_estimate.label);
    if a.thermal_stability.stable {
        println!("  Thermal: stable");
    } else {
        println!("  Thermal: UNSTABLE");
    }
    if verbose || !a.thermal_stability.stable {
        for r in &a.thermal_stability.reasons {
            println!("    {r}");
        }
    }
    println!();

    if verbose {
        print_classifications(&a.substances, false);
        if let Some(trace) = &a.trace {
            println!("  Reasoning:");
            for entry in &trace.entries {
                println!("    [{}] {}", entry.substance_index, entry.raw_name);
                for step in &entry.steps {
                    println!("      {}", step.message);
                }
            }
            println!();
            for d in &trace.decisions {
                let subject = d.subject.as_deref().unwrap_or("overall");
                println!("    {subject}: {} -- {}", d.outcome, d.reason);
            }
            println!();
        }
    }

    if !a.warnings.is_empty() {
        println!("  Warnings:");
        for w in &a.warnings {
            println!("    - {w}");
        }
        println!();
    }
}

pub fn print_classifications(classifications: &[SubstanceClassification], verbose: bool) {
    if classifications.is_empty() {
        println!("  (no substances)\n");
        return;
    }

    let max_name = classifications
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(10);

    println!("  Hazard classes:");
    for c in classifications {
        let classes = if c.classes.is_empty() {
            "(unclassified)".to_string()
        } else {
            c.classes
                .iter()
                .map(|h| h.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("    {:<width$}  {}", c.name, classes, width = max_name);
        if verbose {
            for m in &c.matches {
                println!("    {:<width$}    {}: {}", "", m.class, m.reason, width = max_name);
            }
        }
        for (x, y) in &c.conflicts {
            println!("    {:<width$}    ! conflicting tags {x} / {y}", "", width = max_name);
        }
    }
    println!();
}

fn severity_symbol(severity: Severity) -> &'static str {
    match severity {
        Severity::Ok => ".",
        Severity::Warning => "W",
        Severity::Danger => "D",
        Severity::Critical => "C",
    }
}

pub fn print_matrix(matrix: &CompatibilityMatrix, labels: &[String]) {
    let n = matrix.size();
    if n == 0 {
        println!("  (no substances)\n");
        return;
    }

    let max_label = labels.iter().map(|l| l.chars().count()).max().unwrap_or(10);

    print!("  {:<width$}", "", width = max_label + 4);
    for j in 0..n {
        print!(" {:>2}", j);
    }
    println!();

    for i in 0..n {
        let label = labels.get(i).map(String::as_str).unwrap_or("");
        print!("  {:>2}  {:<width$}", i, label, width = max_label);
        for j in 0..n {
            let symbol = match matrix.cell(i, j) {
                Some(MatrixCell::Pair(p)) => severity_symbol(p.severity),
                _ => "-",
            };
            print!(" {:>2}", symbol);
        }
        println!();
    }
    println!("\n  . ok   W warning   D danger   C critical\n");

    let mut noted = false;
    for (i, j, p) in matrix.pairs() {
        if p.severity == Severity::Ok {
            continue;
        }
        if !noted {
            println!("  Incompatible pairs:");
            noted = true;
        }
        println!("    {} x {}: {}", i, j, p.severity);
        for r in &p.triggered_rules {
            println!("      {} + {}: {}", r.pair[0], r.pair[1], r.reaction);
        }
        if !p.gases.is_empty() {
            let gases: Vec<&str> = p.gases.iter().map(String::as_str).collect();
            println!("      gases: {}", gases.join(", "));
        }
    }
    if noted {
        println!();
    }
}
