//! Experiment catalog and ROI scoring. The save stores only how many
//! experiments are researched, not which, so the exclusion set comes from
//! the caller rather than from the decode.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::save::Snapshot;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExperimentKind {
    /// Permanent industry-wide multiplier.
    Industry,
    /// One-off state effects (auto-clickers, resource surges).
    State,
    /// Temporary boosts from the trials tab.
    Trials,
}

impl ExperimentKind {
    pub fn label(self) -> &'static str {
        match self {
            ExperimentKind::Industry => "INDUSTRY",
            ExperimentKind::State => "STATE",
            ExperimentKind::Trials => "TRIALS",
        }
    }
}

/// What an experiment boosts. The five industries take part in the
/// weakest-industry tiebreak; the rest never do.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Boost {
    Potato,
    Land,
    Weapons,
    Ore,
    Medicine,
    Comrades,
    Resources,
    Passive,
}

impl Boost {
    pub fn label(self) -> &'static str {
        match self {
            Boost::Potato => "Potato",
            Boost::Land => "Land",
            Boost::Weapons => "Weapons",
            Boost::Ore => "Ore",
            Boost::Medicine => "Medicine",
            Boost::Comrades => "Comrades",
            Boost::Resources => "Resources",
            Boost::Passive => "Passive",
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum Effect {
    /// Plain production multiplier.
    Multiplier(f64),
    /// Symbolic effect with no meaningful multiplier.
    Special(&'static str),
}

#[derive(Debug)]
pub struct Experiment {
    pub name: &'static str,
    /// Price in Scientists.
    pub cost: u32,
    pub kind: ExperimentKind,
    pub effect: Effect,
    pub boost: Boost,
    /// Fixed importance weight, 1-10.
    pub priority: u8,
    pub description: &'static str,
}

pub const EXPERIMENTS: &[Experiment] = &[
    Experiment {
        name: "Button Auto-Clickers",
        cost: 25,
        kind: ExperimentKind::State,
        effect: Effect::Special("Auto-click all buttons"),
        boost: Boost::Passive,
        priority: 9,
        description: "Automatically clicks production buttons - massive time saver",
    },
    Experiment {
        name: "Best-est Potato Button",
        cost: 60,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(99999.0),
        boost: Boost::Potato,
        priority: 10,
        description: "POTATO production x99999 - HUGE permanent boost",
    },
    Experiment {
        name: "Best-est Land Button",
        cost: 60,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(99999.0),
        boost: Boost::Land,
        priority: 10,
        description: "LAND production x99999 - HUGE permanent boost",
    },
    Experiment {
        name: "Best-est Weapon Button",
        cost: 60,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(99999.0),
        boost: Boost::Weapons,
        priority: 10,
        description: "WEAPONS production x99999 - HUGE permanent boost",
    },
    Experiment {
        name: "Best-est Ore Button",
        cost: 60,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(99999.0),
        boost: Boost::Ore,
        priority: 10,
        description: "ORE production x99999 - HUGE permanent boost",
    },
    Experiment {
        name: "Best-est Medicine Button",
        cost: 60,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(99999.0),
        boost: Boost::Medicine,
        priority: 10,
        description: "MEDICINE production x99999 - HUGE permanent boost",
    },
    Experiment {
        name: "Better-est Potato Button",
        cost: 45,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(9999.0),
        boost: Boost::Potato,
        priority: 8,
        description: "POTATO production x9999 - Very strong boost",
    },
    Experiment {
        name: "Better-est Land Button",
        cost: 45,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(9999.0),
        boost: Boost::Land,
        priority: 8,
        description: "LAND production x9999 - Very strong boost",
    },
    Experiment {
        name: "Better-est Weapon Button",
        cost: 45,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(9999.0),
        boost: Boost::Weapons,
        priority: 8,
        description: "WEAPONS production x9999 - Very strong boost",
    },
    Experiment {
        name: "Better-est Ore Button",
        cost: 45,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(9999.0),
        boost: Boost::Ore,
        priority: 8,
        description: "ORE production x9999 - Very strong boost",
    },
    Experiment {
        name: "Better-est Medicine Button",
        cost: 45,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(9999.0),
        boost: Boost::Medicine,
        priority: 8,
        description: "MEDICINE production x9999 - Very strong boost",
    },
    Experiment {
        name: "Better-er Potato Button",
        cost: 30,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(999.0),
        boost: Boost::Potato,
        priority: 7,
        description: "POTATO production x999 - Strong boost",
    },
    Experiment {
        name: "Better-er Land Button",
        cost: 30,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(999.0),
        boost: Boost::Land,
        priority: 7,
        description: "LAND production x999 - Strong boost",
    },
    Experiment {
        name: "Better-er Weapon Button",
        cost: 30,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(999.0),
        boost: Boost::Weapons,
        priority: 7,
        description: "WEAPONS production x999 - Strong boost",
    },
    Experiment {
        name: "Better-er Ore Button",
        cost: 30,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(999.0),
        boost: Boost::Ore,
        priority: 7,
        description: "ORE production x999 - Strong boost",
    },
    Experiment {
        name: "Better-er Medicine Button",
        cost: 30,
        kind: ExperimentKind::Industry,
        effect: Effect::Multiplier(999.0),
        boost: Boost::Medicine,
        priority: 7,
        description: "MEDICINE production x999 - Strong boost",
    },
    Experiment {
        name: "Comrade Blast",
        cost: 5,
        kind: ExperimentKind::Trials,
        effect: Effect::Multiplier(7777.0),
        boost: Boost::Comrades,
        priority: 3,
        description: "Comrade boost x7777 for 30 seconds - temporary",
    },
    Experiment {
        name: "Potato Button Blast",
        cost: 10,
        kind: ExperimentKind::Trials,
        effect: Effect::Multiplier(7777.0),
        boost: Boost::Potato,
        priority: 4,
        description: "Potato button x7777 for 20 seconds - temporary",
    },
    Experiment {
        name: "Land Button Blast",
        cost: 10,
        kind: ExperimentKind::Trials,
        effect: Effect::Multiplier(7777.0),
        boost: Boost::Land,
        priority: 4,
        description: "Land button x7777 for 20 seconds - temporary",
    },
    Experiment {
        name: "Ore Button Blast",
        cost: 10,
        kind: ExperimentKind::Trials,
        effect: Effect::Multiplier(7777.0),
        boost: Boost::Ore,
        priority: 4,
        description: "Ore button x7777 for 20 seconds - temporary",
    },
    Experiment {
        name: "Weapon Button Blast",
        cost: 10,
        kind: ExperimentKind::Trials,
        effect: Effect::Multiplier(7777.0),
        boost: Boost::Weapons,
        priority: 4,
        description: "Weapons button x7777 for 20 seconds - temporary",
    },
    Experiment {
        name: "Medicine Button Blast",
        cost: 10,
        kind: ExperimentKind::Trials,
        effect: Effect::Multiplier(7777.0),
        boost: Boost::Medicine,
        priority: 4,
        description: "Medicine button x7777 for 20 seconds - temporary",
    },
    Experiment {
        name: "Big Resource Surge",
        cost: 50,
        kind: ExperimentKind::State,
        effect: Effect::Special("Instant"),
        boost: Boost::Resources,
        priority: 2,
        description: "Get 4 hours worth of resources instantly",
    },
    Experiment {
        name: "Mega Resource Surge",
        cost: 150,
        kind: ExperimentKind::State,
        effect: Effect::Special("Instant"),
        boost: Boost::Resources,
        priority: 1,
        description: "Get 24 hours worth of resources instantly",
    },
];

#[derive(Clone, Debug)]
pub struct Recommendation {
    pub experiment: &'static Experiment,
    pub score: f64,
    /// Cost fits into the current Scientist count. Unaffordable entries
    /// are still scored and returned so they can be saved up for.
    pub affordable: bool,
    /// Tiebreak weight; higher means the boosted industry is weaker.
    pub weakness: u32,
}

/// Pairs total-earned card ids with the industry they measure.
const INDUSTRY_CARDS: &[(u32, Boost)] = &[
    (1, Boost::Potato),
    (2, Boost::Land),
    (3, Boost::Weapons),
    (4, Boost::Ore),
    (5, Boost::Medicine),
];

// Fallback weakness ordering when production values tie (typically a
// fresh or partially-decoded save where everything reads zero).
fn canonical_weakness(boost: Boost) -> u32 {
    match boost {
        Boost::Medicine => 5,
        Boost::Weapons => 4,
        Boost::Ore => 3,
        Boost::Land => 2,
        Boost::Potato => 1,
        Boost::Comrades | Boost::Resources | Boost::Passive => 0,
    }
}

fn roi_score(exp: &Experiment) -> f64 {
    match exp.effect {
        Effect::Multiplier(m) => {
            let base = (m / exp.cost as f64) * exp.priority as f64;
            if exp.kind == ExperimentKind::Industry {
                base
            } else {
                // Temporary boosts are worth far less than permanent ones.
                base * 0.01
            }
        }
        Effect::Special(_) => exp.priority as f64 * 100.0 / exp.cost as f64,
    }
}

/// The five industries with their total-earned values, weakest first.
pub fn industry_production(snapshot: &Snapshot) -> Vec<(Boost, f64)> {
    let mut production: Vec<(Boost, f64)> = INDUSTRY_CARDS
        .iter()
        .map(|&(id, boost)| (boost, snapshot.card_value(id)))
        .collect();

    production.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| canonical_weakness(b.0).cmp(&canonical_weakness(a.0)))
    });

    production
}

fn weakness_of(production: &[(Boost, f64)], boost: Boost) -> u32 {
    production
        .iter()
        .position(|&(b, _)| b == boost)
        .map(|rank| production.len() as u32 - rank as u32)
        .unwrap_or(0)
}

/// Score every experiment not in the researched set against the current
/// Scientist count. Returns recommendations sorted by score descending,
/// ties broken toward the weakest boosted industry, plus the Scientist
/// count used. Ordering is fully deterministic for a given snapshot.
pub fn analyze_experiments(
    snapshot: &Snapshot,
    researched: &HashSet<String>,
) -> (Vec<Recommendation>, u64) {
    let scientists = snapshot.scientists();
    let production = industry_production(snapshot);

    let mut recommendations: Vec<Recommendation> = EXPERIMENTS
        .iter()
        .filter(|exp| !researched.contains(exp.name))
        .map(|exp| Recommendation {
            experiment: exp,
            score: roi_score(exp),
            affordable: exp.cost as f64 <= scientists,
            weakness: weakness_of(&production, exp.boost),
        })
        .collect();

    // Stable sort: full ties keep catalog order.
    recommendations.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.weakness.cmp(&a.weakness))
    });

    (recommendations, scientists as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{CardRecord, OrderedMap, Snapshot};

    fn snapshot_with_cards(cards: &[(u32, f64)]) -> Snapshot {
        let mut map = OrderedMap::new();
        for &(id, value) in cards {
            map.insert(id, CardRecord { id, flags: 0, value });
        }
        Snapshot {
            cards: map,
            progress: OrderedMap::new(),
            statistics: OrderedMap::new(),
            scientist_candidates: Vec::new(),
        }
    }

    #[test]
    fn scoring_matches_roi_rules() {
        let snapshot = snapshot_with_cards(&[(36, 60.0)]);
        let (recs, scientists) = analyze_experiments(&snapshot, &HashSet::new());
        assert_eq!(scientists, 60);
        assert_eq!(recs.len(), EXPERIMENTS.len());

        // x99999 permanent multipliers at cost 60, priority 10 dominate.
        let top = &recs[0];
        assert!(top.experiment.name.starts_with("Best-est"));
        assert_eq!(top.score, (99999.0 / 60.0) * 10.0);
        assert!(top.affordable);

        let surge = recs
            .iter()
            .find(|r| r.experiment.name == "Mega Resource Surge")
            .unwrap();
        assert!(!surge.affordable);
        assert_eq!(surge.score, 1.0 * 100.0 / 150.0);
    }

    #[test]
    fn temporary_boosts_carry_the_penalty_factor() {
        let snapshot = snapshot_with_cards(&[(36, 500.0)]);
        let (recs, _) = analyze_experiments(&snapshot, &HashSet::new());

        let blast = recs
            .iter()
            .find(|r| r.experiment.name == "Comrade Blast")
            .unwrap();
        assert_eq!(blast.score, (7777.0 / 5.0) * 3.0 * 0.01);
    }

    #[test]
    fn ties_prefer_the_weakest_industry() {
        // Medicine has by far the lowest total earned.
        let snapshot = snapshot_with_cards(&[
            (1, 1e12),
            (2, 1e10),
            (3, 1e8),
            (4, 1e6),
            (5, 1e3),
            (36, 100.0),
        ]);
        let (recs, _) = analyze_experiments(&snapshot, &HashSet::new());

        let best_est: Vec<&str> = recs
            .iter()
            .filter(|r| r.experiment.name.starts_with("Best-est"))
            .map(|r| r.experiment.boost.label())
            .collect();
        assert_eq!(best_est, vec!["Medicine", "Ore", "Weapons", "Land", "Potato"]);
    }

    #[test]
    fn researched_experiments_are_excluded() {
        let snapshot = snapshot_with_cards(&[(36, 100.0)]);
        let researched: HashSet<String> =
            ["Best-est Potato Button".to_string()].into_iter().collect();
        let (recs, _) = analyze_experiments(&snapshot, &researched);

        assert_eq!(recs.len(), EXPERIMENTS.len() - 1);
        assert!(recs
            .iter()
            .all(|r| r.experiment.name != "Best-est Potato Button"));
    }

    #[test]
    fn ordering_is_deterministic() {
        let snapshot = snapshot_with_cards(&[(36, 42.0), (1, 5.0), (5, 9.0)]);
        let (first, _) = analyze_experiments(&snapshot, &HashSet::new());
        let (second, _) = analyze_experiments(&snapshot, &HashSet::new());

        let names_first: Vec<&str> = first.iter().map(|r| r.experiment.name).collect();
        let names_second: Vec<&str> = second.iter().map(|r| r.experiment.name).collect();
        assert_eq!(names_first, names_second);
    }

    #[test]
    fn production_ranking_is_weakest_first() {
        let snapshot = snapshot_with_cards(&[(1, 50.0), (2, 10.0), (3, 30.0)]);
        let ranking = industry_production(&snapshot);

        // Ore and Medicine read zero and fall back to the canonical order.
        let order: Vec<&str> = ranking.iter().map(|&(b, _)| b.label()).collect();
        assert_eq!(order, vec!["Medicine", "Ore", "Land", "Weapons", "Potato"]);
    }
}
