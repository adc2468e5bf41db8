use chemrisk_core::error::ChemRiskError;
use chemrisk_core::model::{Axis, HazardClass, Severity};
use chemrisk_core::rules::builtin::{self, builtin};
use chemrisk_core::rules::schema::MatcherDef;
use std::path::Path;

pub fn list() -> Result<(), ChemRiskError> {
    let rules = builtin();
    println!("Embedded rule tables:\n");
    for name in builtin::TABLES {
        let version = table_version(name).unwrap_or_else(|| "?".into());
        let summary = match *name {
            "classes" => format!("{} hazard classes", rules.classes().len()),
            "compatibility" => format!("{} incompatible class pairs", rules.compatibility().len()),
            "axes" => format!(
                "{} triggers on {} axes, {} interaction rules",
                Axis::ALL
                    .iter()
                    .map(|a| rules.axis_triggers(*a).len())
                    .sum::<usize>(),
                Axis::ALL.len(),
                rules.interactions().len()
            ),
            "heuristics" => {
                let ph = rules.ph();
                format!(
                    "{} pH keywords, {} thermal triggers",
                    ph.strong_acid.len()
                        + ph.weak_acid.len()
                        + ph.strong_base.len()
                        + ph.weak_base.len(),
                    rules.thermal().keywords.len() + rules.thermal().h_codes.len()
                )
            }
            _ => String::new(),
        };
        println!("  {:<14} (v{}) {}", name, version, summary);
    }
    println!();
    Ok(())
}

fn table_version(name: &str) -> Option<String> {
    let json = builtin::table_json(name)?;
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    value.get("version")?.as_str().map(str::to_string)
}

pub fn explain(topic: &str) -> Result<(), ChemRiskError> {
    match topic.trim().to_lowercase().as_str() {
        "classes" => explain_classes(),
        "compat" | "compatibility" => explain_compatibility(),
        "axis" | "axes" => {
            for axis in Axis::ALL {
                explain_axis(axis);
            }
            explain_interactions();
        }
        "heuristics" | "ph" | "thermal" => explain_heuristics(),
        other => {
            let axis: Axis = other.parse().map_err(|_| {
                ChemRiskError::RulesInvalid(format!(
                    "unknown topic '{topic}'. Use classes, compat, axes, heuristics or an axis name"
                ))
            })?;
            explain_axis(axis);
        }
    }
    Ok(())
}

fn describe_matcher(m: &MatcherDef) -> String {
    let mut parts = Vec::new();
    if !m.keywords.is_empty() {
        parts.push(format!("name contains: {}", m.keywords.join(", ")));
    }
    if !m.h_codes.is_empty() {
        parts.push(format!("H-codes: {}", m.h_codes.join(", ")));
    }
    if !m.ghs.is_empty() {
        let ghs: Vec<&str> = m.ghs.iter().map(|g| g.code()).collect();
        parts.push(format!("pictograms: {}", ghs.join(", ")));
    }
    parts.join("; ")
}

fn explain_classes() {
    println!("Hazard classes\n");
    println!("A substance receives every class whose name keywords, H-code prefixes or");
    println!("pictograms it matches. Contradictory tags are kept and reported as warnings.\n");
    for def in builtin().classes() {
        print!("  {}", def.class);
        match &def.description {
            Some(desc) => println!(" -- {desc}"),
            None => println!(),
        }
        println!("    {}", describe_matcher(&def.matcher));
        println!();
    }
}

fn explain_compatibility() {
    let table = builtin().compatibility();
    println!("Compatibility table (version {})\n", table.version());
    println!("Pairs are unordered. Pairs not listed are compatible (ok).");
    println!("Pairs at danger or critical are reported as critical pairs.\n");

    let width = HazardClass::ALL
        .iter()
        .map(|c| c.as_str().len())
        .max()
        .unwrap_or(14);

    let mut rules: Vec<_> = table.rules().collect();
    rules.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.pair.cmp(&b.pair)));
    for rule in rules {
        println!(
            "  {:<w$} + {:<w$}  {:<8}  {}",
            rule.pair[0].as_str(),
            rule.pair[1].as_str(),
            rule.severity.to_string(),
            rule.reaction,
            w = width
        );
        if !rule.gases.is_empty() {
            let gases: Vec<&str> = rule.gases.iter().map(String::as_str).collect();
            println!("  {:<w$}    gases: {}", "", gases.join(", "), w = width * 2);
        }
    }
    println!();
}

fn explain_axis(axis: Axis) {
    let triggers = builtin().axis_triggers(axis);
    println!("Axis '{axis}' ({} triggers)\n", triggers.len());
    for t in triggers {
        println!("  {:+4}  {}", t.points, describe_matcher(&t.matcher));
        if let Some(note) = &t.note {
            println!("        ({note})");
        }
    }
    println!();
}

fn explain_interactions() {
    println!("Interaction bonuses (applied once per assessment)\n");
    for i in builtin().interactions() {
        let requires: Vec<String> = i.requires.iter().map(|c| c.to_string()).collect();
        let bonuses: Vec<String> = i
            .bonuses
            .iter()
            .map(|(axis, points)| format!("{axis} {points:+}"))
            .collect();
        println!(
            "  {:<14} if {} present: {}",
            i.name,
            requires.join(" and "),
            bonuses.join(", ")
        );
    }
    println!();
    println!("Each axis is clamped to 0..100. The global score is the mean of the 8 axes,");
    println!("rounded half up. Bands: low <20, moderate <40, high <70, critical >=70.\n");
}

fn explain_heuristics() {
    let rules = builtin();
    let ph = rules.ph();
    println!("pH estimate\n");
    println!(
        "  Strong acid keywords weigh {}, weak ones {}; strong base keywords {}, weak ones {}.",
        ph.strong_acid_weight, ph.weak_acid_weight, ph.strong_base_weight, ph.weak_base_weight
    );
    println!("  Each substance counts once per side, with its strongest match.\n");
    println!("  strong acids: {}", ph.strong_acid.join(", "));
    println!("  weak acids:   {}", ph.weak_acid.join(", "));
    println!("  strong bases: {}", ph.strong_base.join(", "));
    println!("  weak bases:   {}\n", ph.weak_base.join(", "));

    let thermal = rules.thermal();
    println!("Thermal stability\n");
    println!(
        "  Unstable if the name contains {} or the H-codes include {}.\n",
        thermal.keywords.join(", "),
        thermal.h_codes.join(", ")
    );
}

pub fn export(table: &str) -> Result<(), ChemRiskError> {
    let json = builtin::table_json(table).ok_or_else(|| {
        ChemRiskError::RulesInvalid(format!(
            "unknown table '{table}'. Available: {}",
            builtin::TABLES.join(", ")
        ))
    })?;
    print!("{json}");
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), ChemRiskError> {
    let table = chemrisk_core::rules::load_compatibility(file)?;

    println!(
        "Compatibility table '{}' is valid.",
        table.version()
    );
    println!("  Rules: {} class pairs", table.len());

    // Check for potential issues (warnings, not errors)
    let mut warnings = Vec::new();
    for rule in table.rules() {
        if rule.severity == Severity::Ok {
            warnings.push(format!(
                "pair {} + {} has severity 'ok' and will never be reported",
                rule.pair[0], rule.pair[1]
            ));
        }
        if rule.severity.is_alarming() && rule.gases.is_empty() {
            warnings.push(format!(
                "pair {} + {} is {} but lists no gases",
                rule.pair[0], rule.pair[1], rule.severity
            ));
        }
    }
    let builtin_pairs = builtin().compatibility();
    let missing: Vec<String> = builtin_pairs
        .rules()
        .filter(|r| table.lookup(r.pair[0], r.pair[1]).is_none())
        .map(|r| format!("{}/{}", r.pair[0], r.pair[1]))
        .collect();
    if !missing.is_empty() {
        warnings.push(format!(
            "{} built-in pair(s) not covered: {}",
            missing.len(),
            missing.join(", ")
        ));
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
