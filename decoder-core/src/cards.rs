//! Card id catalog for the fixed-stride table. The numbering below was
//! worked out by diffing saves: ids 1-5 are total resources earned, 6-35
//! are generator counts/costs grouped per industry, 36-39 are currencies
//! and leftovers.

pub const SCIENTISTS_ID: u32 = 36;
pub const COMRADES_ID: u32 = 38;

/// Total-earned resource ids, one per industry, in catalog order.
pub const TOTAL_EARNED_IDS: &[u32] = &[1, 2, 3, 4, 5];

/// Generator id ranges per industry, for the grouped report section.
pub const INDUSTRY_CARD_RANGES: &[(&str, std::ops::Range<u32>)] = &[
    ("POTATO", 6..11),
    ("LAND", 11..16),
    ("ORE", 16..22),
    ("WEAPONS", 22..28),
    ("MEDICINE", 28..34),
];

pub fn card_name(id: u32) -> Option<&'static str> {
    let name = match id {
        1 => "POTATOES (Total Earned)",
        2 => "LAND (Total Earned)",
        3 => "WEAPONS (Total Earned)",
        4 => "ORE (Total Earned)",
        5 => "MEDICINE (Total Earned)",

        6 => "Farmer (Upgrade Cost)",
        7 => "Commune (Upgrade Cost)",
        8 => "Collective (Upgrade Cost)",
        9 => "Plantation (Count/Level)",
        10 => "Hive (Count/Level)",

        11 => "Worker (Level)",
        12 => "Blasting Site (Count)",
        13 => "Clearcut (Upgrade Cost)",
        14 => "Road (Count)",
        15 => "Highway (Count/Level)",

        16 => "Super Highway (Level)",
        17 => "Miner (Level)",
        18 => "Mine (Count)",
        19 => "Excavator (Count)",
        20 => "Mega Mine (Level)",
        21 => "Deep Bore (Count/Level)",

        22 => "Mega Drill (Level)",
        23 => "Soldier (Level)",
        24 => "Fireteam (Count)",
        25 => "Squad (Upgrade Cost)",
        26 => "Platoon (Count)",
        27 => "Division (Count/Level)",

        28 => "Communist Ideal (Level)",
        29 => "Nurse (Level)",
        30 => "Ambulance (Count)",
        31 => "Field Hospital (Count)",
        32 => "Clinic (Level)",
        33 => "Hospital (Count/Level)",

        34 => "Cloning Lab (Count/Level)",
        35 => "Card 35 (Level)",

        36 => "SCIENTISTS",
        37 => "Potatoes (Current Resource)",
        38 => "COMRADES",
        39 => "Card 39",

        _ => return None,
    };
    Some(name)
}

/// Display names for the recovered mission progress labels.
pub fn mission_display_name(label: &str) -> &str {
    match label {
        "Intro" => "Farming Medals",
        "Medals" => "Total Medals",
        "Potatoes" => "Potato Missions",
        "Land" => "Land Missions",
        "Ore" => "Ore Missions",
        "Weapon" => "Weapon Missions",
        "Medicine.Earned.Total" => "Industry Experiments",
        other => other,
    }
}
