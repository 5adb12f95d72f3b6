//! Text report and JSON export for a decoded snapshot. A section that was
//! searched but came up empty renders "none found" so it cannot be
//! mistaken for a section that was never scanned.

use serde::Serialize;

use crate::cards;
use crate::experiments::{Boost, Effect, ExperimentKind, Recommendation};
use crate::save::{OrderedMap, Snapshot};

const RULE: &str = "================================================================================";

fn section(out: &mut String, title: &str) {
    out.push_str(RULE);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');
}

fn format_value(value: f64) -> String {
    if value > 1e6 {
        format!("{:.2e}", value)
    } else {
        format!("{:.0}", value)
    }
}

/// Render the structured sections of a snapshot as plain text.
pub fn format_snapshot(snapshot: &Snapshot, source: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Decoded: {}\n\n", source));

    section(&mut out, "CURRENCIES");
    out.push_str(&format!("Scientists: {:.0}\n", snapshot.scientists()));
    out.push_str(&format!("Comrades:   {:.2e}\n", snapshot.comrades()));
    if !snapshot.scientist_candidates.is_empty() {
        out.push_str("Scientist count candidates (ambiguous heuristic matches):\n");
        for candidate in &snapshot.scientist_candidates {
            out.push_str(&format!(
                "  0x{:04x}: {}\n",
                candidate.offset, candidate.value
            ));
        }
    }
    out.push('\n');

    section(&mut out, "MISSION PROGRESS & MEDALS");
    if snapshot.progress.is_empty() {
        out.push_str("none found\n");
    } else {
        for (label, value) in snapshot.progress.iter() {
            out.push_str(&format!(
                "{:30}: {:5}\n",
                cards::mission_display_name(label),
                value
            ));
        }
    }
    out.push('\n');

    section(&mut out, "TOTAL RESOURCES EARNED");
    let mut any_resource = false;
    for &id in cards::TOTAL_EARNED_IDS {
        if let Some(card) = snapshot.cards.get(&id) {
            let name = cards::card_name(id).unwrap_or("?");
            out.push_str(&format!("{:30}: {:.2e}\n", name, card.value));
            any_resource = true;
        }
    }
    if !any_resource {
        out.push_str("none found\n");
    }
    out.push('\n');

    section(&mut out, "GENERATORS & UPGRADES");
    let mut any_generator = false;
    for (industry, id_range) in cards::INDUSTRY_CARD_RANGES {
        let mut lines = Vec::new();
        for id in id_range.clone() {
            if let Some(card) = snapshot.cards.get(&id) {
                if card.value > 0.0 {
                    let name =
                        cards::card_name(id).map(String::from).unwrap_or_else(|| {
                            format!("Card {}", id)
                        });
                    lines.push(format!(
                        "  [{:2}] {:30}: {}\n",
                        id,
                        name,
                        format_value(card.value)
                    ));
                }
            }
        }
        if !lines.is_empty() {
            any_generator = true;
            out.push_str(&format!("\n{}:\n", industry));
            for line in lines {
                out.push_str(&line);
            }
        }
    }
    if !any_generator {
        out.push_str("none found\n");
    }
    out.push('\n');

    section(&mut out, "STATISTICS");
    if snapshot.statistics.is_empty() {
        out.push_str("none found\n");
    } else {
        for (key, value) in snapshot.statistics.iter() {
            out.push_str(&format!("{:40}: {}\n", key, format_value(*value)));
        }
    }

    out
}

/// Render the ROI analysis: production ranking, affordable picks, entries
/// worth saving up for, and the best affordable pick per category.
pub fn format_recommendations(
    recommendations: &[Recommendation],
    scientists: u64,
    production: &[(Boost, f64)],
    top_n: usize,
) -> String {
    let mut out = String::new();

    section(&mut out, "INDUSTRY PRODUCTION RANKING (Focus on weakest)");
    let max_production = production
        .iter()
        .map(|&(_, v)| v)
        .fold(0.0f64, f64::max);
    for (i, &(boost, value)) in production.iter().enumerate() {
        let bar = if value > 0.0 && max_production > 0.0 {
            let width = ((value / max_production) * 40.0) as usize;
            "#".repeat(width.min(40))
        } else {
            String::new()
        };
        out.push_str(&format!(
            "{}. {:10} {:12.2e} {}\n",
            i + 1,
            boost.label(),
            value,
            bar
        ));
    }
    out.push('\n');

    section(&mut out, "EXPERIMENT RECOMMENDATIONS");
    out.push_str(&format!("Current Scientists: {}\n\n", scientists));

    if recommendations.is_empty() {
        out.push_str("none found\n");
        return out;
    }

    let affordable: Vec<&Recommendation> =
        recommendations.iter().filter(|r| r.affordable).collect();
    let unaffordable: Vec<&Recommendation> =
        recommendations.iter().filter(|r| !r.affordable).collect();

    if affordable.is_empty() {
        out.push_str("Affordable now: none\n");
    } else {
        out.push_str("AFFORDABLE NOW:\n\n");
        for (i, rec) in affordable.iter().take(top_n).enumerate() {
            let exp = rec.experiment;
            out.push_str(&format!("{}. {}\n", i + 1, exp.name));
            out.push_str(&format!(
                "   Type: {} | Industry: {}\n",
                exp.kind.label(),
                exp.boost.label()
            ));
            out.push_str(&format!("   Cost: {} Scientists\n", exp.cost));
            out.push_str(&format!("   Effect: {}\n", effect_label(exp.effect)));
            out.push_str(&format!("   Priority: {}/10\n", exp.priority));
            out.push_str(&format!("   ROI Score: {:.2}\n", rec.score));
            out.push_str(&format!("   -> {}\n\n", exp.description));
        }
    }

    if !unaffordable.is_empty() && affordable.len() < top_n {
        out.push_str("NEED MORE SCIENTISTS:\n\n");
        let remaining = top_n - affordable.len();
        for (i, rec) in unaffordable.iter().take(remaining).enumerate() {
            let exp = rec.experiment;
            out.push_str(&format!(
                "{}. {} - Need {} more Scientists\n",
                affordable.len() + i + 1,
                exp.name,
                exp.cost as u64 - scientists.min(exp.cost as u64),
            ));
            out.push_str(&format!(
                "   Cost: {} | Effect: {} | Priority: {}/10 | ROI Score: {:.2}\n\n",
                exp.cost,
                effect_label(exp.effect),
                exp.priority,
                rec.score
            ));
        }
    }

    section(&mut out, "BEST EXPERIMENT BY CATEGORY");
    for kind in [
        ExperimentKind::Industry,
        ExperimentKind::State,
        ExperimentKind::Trials,
    ] {
        if let Some(rec) = recommendations
            .iter()
            .find(|r| r.experiment.kind == kind && r.affordable)
        {
            let exp = rec.experiment;
            out.push_str(&format!(
                "{:12} - {:30} | {:12} | {:3} Scientists\n",
                kind.label(),
                exp.name,
                effect_label(exp.effect),
                exp.cost
            ));
        }
    }

    out
}

fn effect_label(effect: Effect) -> String {
    match effect {
        Effect::Multiplier(m) => format!("x{:.0}", m),
        Effect::Special(text) => text.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct CurrencyExport {
    scientists: f64,
    comrades: f64,
}

/// JSON export written alongside the input save. Field names and nesting
/// are stable across decoder versions for downstream tooling.
#[derive(Debug, Serialize)]
pub struct SaveExport {
    currency: CurrencyExport,
    mission_progress: OrderedMap<String, u32>,
    cards: OrderedMap<u32, f64>,
    statistics: OrderedMap<String, f64>,
}

impl SaveExport {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut card_values = OrderedMap::new();
        for (&id, card) in snapshot.cards.iter() {
            card_values.insert(id, card.value);
        }

        Self {
            currency: CurrencyExport {
                scientists: snapshot.scientists(),
                comrades: snapshot.comrades(),
            },
            mission_progress: snapshot.progress.clone(),
            cards: card_values,
            statistics: snapshot.statistics.clone(),
        }
    }
}
