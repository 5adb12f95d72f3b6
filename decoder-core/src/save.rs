use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{DecodeError, Result};

/// Format tag at bytes 4..8 of every Adventure Communist save.
pub const MAGIC: &[u8; 4] = b"ADCM";

/// Mission/medal label strings embedded in the save, in the order the
/// progress extractor tries them. The result keeps this order, not the
/// order the labels appear in the buffer.
pub const MISSION_KEYWORDS: &[&[u8]] = &[
    b"Capsules and Scientists",
    b"Medals",
    b"Potatoes",
    b"Intro",
    b"Medicine",
    b"Weapon",
    b"Ore",
    b"Land",
];

/// Namespace prefixes that mark a statistics key.
pub const STAT_PREFIXES: &[&[u8]] = &[
    b"Generator.",
    b"Store.",
    b"Game.",
    b"Experiment.",
    b"Crate.",
];

/// Tuning knobs for the heuristic scanners. Every value here is an
/// empirically reverse-engineered constant; the defaults match the save
/// revisions observed so far, but the table window in particular drifts
/// between game updates, so callers can widen it without a rebuild.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Candidate start offsets tried by the card table locator.
    pub table_window: std::ops::Range<usize>,
    /// First table id must be strictly between these two values.
    pub table_id_min: u32,
    pub table_id_max: u32,
    /// A decoded id above this means the walk ran off the table.
    pub table_id_sentinel: u32,
    /// Hard cap on table entries, against runaway parsing.
    pub table_max_entries: usize,
    /// Bytes scanned past a label terminator for its counter.
    pub progress_window: usize,
    /// Counters above this are rejected as garbage.
    pub progress_max: u32,
    /// Longer keys are treated as prefix false positives.
    pub stat_key_max_len: usize,
    /// Bytes scanned past a statistics key for its value.
    pub stat_window: usize,
    /// Statistics values must lie in [0, stat_max).
    pub stat_max: f64,
    /// Scientist-candidate scan region around the anchor string.
    pub currency_back_window: usize,
    pub currency_fwd_window: usize,
    /// Candidates must be integral doubles strictly below this.
    pub currency_max: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            table_window: 0x1400..0x1600,
            table_id_min: 30,
            table_id_max: 50,
            table_id_sentinel: 200,
            table_max_entries: 100,
            progress_window: 20,
            progress_max: 500,
            stat_key_max_len: 100,
            stat_window: 40,
            stat_max: 1e15,
            currency_back_window: 100,
            currency_fwd_window: 200,
            currency_max: 1000.0,
        }
    }
}

/// One 16-byte table entry: [4 bytes id][4 bytes flags][8 bytes double].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRecord {
    pub id: u32,
    pub flags: u32,
    pub value: f64,
}

/// An ambiguous match from the scientist currency scan. The format gives
/// no authoritative way to pick one, so all matches are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScientistCandidate {
    pub offset: usize,
    pub value: u64,
}

/// Insertion-ordered mapping with last-write-wins semantics. A duplicate
/// key keeps its original position, only the value is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<K, V>(Vec<(K, V)>);

impl<K: PartialEq, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: K, value: V) {
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.0
            .iter()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: PartialEq, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Serialize for OrderedMap<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Complete result of one decode pass. Any section may be empty when its
/// region was not found; only a missing ADCM tag is a hard failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub cards: OrderedMap<u32, CardRecord>,
    pub progress: OrderedMap<String, u32>,
    pub statistics: OrderedMap<String, f64>,
    pub scientist_candidates: Vec<ScientistCandidate>,
}

impl Snapshot {
    /// Card value by id, 0.0 when the id was not recovered. Downstream
    /// lookups must never crash on a missing id.
    pub fn card_value(&self, id: u32) -> f64 {
        self.cards.get(&id).map(|c| c.value).unwrap_or(0.0)
    }

    pub fn scientists(&self) -> f64 {
        self.card_value(crate::cards::SCIENTISTS_ID)
    }

    pub fn comrades(&self) -> f64 {
        self.card_value(crate::cards::COMRADES_ID)
    }
}

fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

fn read_f64_le(data: &[u8], offset: usize) -> Option<f64> {
    let bytes = data.get(offset..offset.checked_add(8)?)?;
    Some(f64::from_le_bytes(bytes.try_into().ok()?))
}

// UTF-8 decode that drops invalid sequences instead of substituting a
// replacement character, so a label with stray bytes before its
// terminator still comes out as the bare keyword.
fn utf8_ignoring_invalid(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                out.push_str(text);
                break;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                if let Ok(text) = std::str::from_utf8(valid) {
                    out.push_str(text);
                }
                let skip = err.error_len().unwrap_or(after.len()).max(1);
                rest = &after[skip.min(after.len())..];
            }
        }
    }
    out
}

fn find(data: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= data.len() {
        return None;
    }
    data[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Decode a save buffer with the default scan configuration.
pub fn decode_save(data: &[u8]) -> Result<Snapshot> {
    decode_save_with(data, &ScanConfig::default())
}

/// Decode a save buffer. Fails only on a missing ADCM tag; every other
/// miss degrades to an empty section.
pub fn decode_save_with(data: &[u8], cfg: &ScanConfig) -> Result<Snapshot> {
    if data.len() < 8 || &data[4..8] != MAGIC {
        return Err(DecodeError::InvalidFormat);
    }

    Ok(Snapshot {
        cards: locate_card_table(data, cfg),
        progress: extract_mission_progress(data, cfg),
        statistics: extract_statistics(data, cfg),
        scientist_candidates: scientist_candidates(data, cfg),
    })
}

/// Find and walk the fixed-stride card table. The table carries no length
/// or offset field, so the locator tries every start offset in the window
/// and accepts the first one where three consecutive entries hold ids in
/// strictly-decreasing-by-one order, with the first id in a plausible
/// range. That 3-of-a-kind pattern is the sole disambiguator against
/// coincidental matches in surrounding binary data.
pub fn locate_card_table(data: &[u8], cfg: &ScanConfig) -> OrderedMap<u32, CardRecord> {
    let mut cards = OrderedMap::new();

    for start in cfg.table_window.clone() {
        let (Some(id1), Some(id2), Some(id3)) = (
            read_u32_le(data, start),
            read_u32_le(data, start + 16),
            read_u32_le(data, start + 32),
        ) else {
            break; // window ran past the buffer
        };

        if !(id1 > cfg.table_id_min && id1 < cfg.table_id_max) {
            continue;
        }
        if id2 != id1.wrapping_sub(1) || id3 != id2.wrapping_sub(1) {
            continue;
        }

        // Accepted. Walk forward in 16-byte strides until the buffer
        // ends, the entry cap is hit, or an id crosses the sentinel
        // (meaning we ran off the table into unrelated bytes).
        let mut pos = start;
        let mut entries = 0usize;
        while entries < cfg.table_max_entries {
            let Some(id) = read_u32_le(data, pos) else { break };
            let Some(flags) = read_u32_le(data, pos + 4) else { break };
            let Some(value) = read_f64_le(data, pos + 8) else { break };

            if id > cfg.table_id_sentinel {
                break;
            }

            // Kept even when the value looks odd; it may be real game data.
            cards.insert(id, CardRecord { id, flags, value });

            pos += 16;
            entries += 1;
        }

        break; // first accepted candidate wins
    }

    cards
}

/// Recover keyword-labelled progress counters. Label and value have no
/// explicit linkage in the format; the first in-range u32 within a short
/// window past the label's NUL terminator is taken as its counter.
pub fn extract_mission_progress(data: &[u8], cfg: &ScanConfig) -> OrderedMap<String, u32> {
    let mut progress = OrderedMap::new();

    for keyword in MISSION_KEYWORDS {
        let Some(pos) = find(data, keyword, 0) else {
            continue;
        };
        let Some(nul) = data[pos..].iter().position(|&b| b == 0).map(|p| p + pos) else {
            continue;
        };

        let label = utf8_ignoring_invalid(&data[pos..nul]);

        let scan_end = (nul + cfg.progress_window).min(data.len());
        for offset in nul + 1..scan_end {
            if let Some(value) = read_u32_le(data, offset) {
                if value <= cfg.progress_max {
                    progress.insert(label, value);
                    break;
                }
            }
        }
    }

    progress
}

/// Full linear scan for dotted statistics keys under the known prefixes,
/// each followed within a bounded window by a plausible double. Every
/// inner search is bounded, so the pass stays O(n) over the buffer.
pub fn extract_statistics(data: &[u8], cfg: &ScanConfig) -> OrderedMap<String, f64> {
    let mut statistics = OrderedMap::new();

    let mut offset = 0usize;
    while offset < data.len() {
        let matched = STAT_PREFIXES
            .iter()
            .any(|prefix| data[offset..].starts_with(prefix));
        if !matched {
            offset += 1;
            continue;
        }

        let key_limit = (offset + cfg.stat_key_max_len).min(data.len());
        let Some(nul) = data[offset..key_limit]
            .iter()
            .position(|&b| b == 0)
            .map(|p| p + offset)
        else {
            // No terminator in range: a prefix false positive.
            offset += 1;
            continue;
        };

        let key = utf8_ignoring_invalid(&data[offset..nul]);

        let scan_end = (nul + cfg.stat_window).min(data.len());
        for value_offset in nul + 1..scan_end {
            if let Some(value) = read_f64_le(data, value_offset) {
                // NaN fails the lower bound and is rejected with it.
                if value >= 0.0 && value < cfg.stat_max {
                    // Repeated keys are legitimate; last seen wins.
                    statistics.insert(key, value);
                    break;
                }
            }
        }

        // Advance one byte: a recognized prefix nested inside this key
        // (e.g. "Generator." inside "Game.Generator.Farmer") is a key of
        // its own and must still be tested.
        offset += 1;
    }

    statistics
}

/// Scan around the "Scientists" anchor for integral doubles in a small
/// range. The heuristic is weak and routinely matches more than once, so
/// every match is returned instead of silently picking the first.
pub fn scientist_candidates(data: &[u8], cfg: &ScanConfig) -> Vec<ScientistCandidate> {
    let Some(pos) = find(data, b"Scientists", 0) else {
        return Vec::new();
    };

    let start = pos.saturating_sub(cfg.currency_back_window);
    let end = (pos + cfg.currency_fwd_window).min(data.len());

    let mut candidates = Vec::new();
    for offset in start..end {
        if let Some(value) = read_f64_le(data, offset) {
            if value > 0.0 && value < cfg.currency_max && value.fract() == 0.0 {
                candidates.push(ScientistCandidate {
                    offset,
                    value: value as u64,
                });
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sav_buffer(len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        data[4..8].copy_from_slice(MAGIC);
        data
    }

    fn write_card(data: &mut [u8], offset: usize, id: u32, flags: u32, value: f64) {
        data[offset..offset + 4].copy_from_slice(&id.to_le_bytes());
        data[offset + 4..offset + 8].copy_from_slice(&flags.to_le_bytes());
        data[offset + 8..offset + 16].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn rejects_missing_magic() {
        let data = vec![0u8; 0x2000];
        assert!(matches!(
            decode_save(&data),
            Err(DecodeError::InvalidFormat)
        ));

        let short = [0u8; 6];
        assert!(matches!(
            decode_save(&short),
            Err(DecodeError::InvalidFormat)
        ));
    }

    #[test]
    fn card_table_roundtrip() {
        let mut data = sav_buffer(0x1800);

        let table_start = 0x1480;
        let mut offset = table_start;
        for id in (1..=40u32).rev() {
            write_card(&mut data, offset, id, id * 2, id as f64 * 1.5);
            offset += 16;
        }
        // Sentinel entry so the walk stops at the table edge instead of
        // consuming the zeroed tail as id-0 records.
        data[offset..offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        assert_eq!(snapshot.cards.len(), 40);

        for id in 1..=40u32 {
            let card = snapshot.cards.get(&id).expect("card missing");
            assert_eq!(card.id, id);
            assert_eq!(card.flags, id * 2);
            assert_eq!(card.value, id as f64 * 1.5);
        }

        // First table entry (id 40) must come first in insertion order.
        let first = snapshot.cards.iter().next().unwrap();
        assert_eq!(*first.0, 40);
    }

    #[test]
    fn no_table_pattern_leaves_cards_empty() {
        let mut data = sav_buffer(0x1800);

        // A progress label elsewhere must still decode.
        let pos = 0x100;
        data[pos..pos + 6].copy_from_slice(b"Medals");
        data[pos + 6] = 0;
        data[pos + 7..pos + 11].copy_from_slice(&7u32.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        assert!(snapshot.cards.is_empty());
        assert_eq!(snapshot.progress.get("Medals"), Some(&7));
    }

    #[test]
    fn medals_counter_recovered() {
        let mut data = sav_buffer(0x1800);
        let pos = 0x200;
        data[pos..pos + 6].copy_from_slice(b"Medals");
        data[pos + 6] = 0;
        data[pos + 7..pos + 11].copy_from_slice(&42u32.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        assert_eq!(snapshot.progress.get("Medals"), Some(&42));
    }

    #[test]
    fn out_of_range_counter_is_omitted() {
        let mut data = sav_buffer(0x1800);
        let pos = 0x200;
        data[pos..pos + 6].copy_from_slice(b"Medals");
        data[pos + 6] = 0;
        // Fill the whole value window with bytes that only decode to
        // values above the plausibility ceiling.
        for b in &mut data[pos + 7..pos + 7 + 24] {
            *b = 0xFF;
        }

        let snapshot = decode_save(&data).unwrap();
        assert_eq!(snapshot.progress.get("Medals"), None);
    }

    #[test]
    fn statistics_key_recovered() {
        let mut data = sav_buffer(0x1800);
        let key = b"Game.Prestige.Total";
        let pos = 0x300;
        data[pos..pos + key.len()].copy_from_slice(key);
        data[pos + key.len()] = 0;
        let voff = pos + key.len() + 1;
        data[voff..voff + 8].copy_from_slice(&3.5f64.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        assert_eq!(snapshot.statistics.get("Game.Prestige.Total"), Some(&3.5));
    }

    #[test]
    fn repeated_statistics_key_keeps_last_value() {
        let mut data = sav_buffer(0x1800);
        let key = b"Generator.Farmer.Count";

        for (pos, value) in [(0x300usize, 10.0f64), (0x400, 25.0)] {
            data[pos..pos + key.len()].copy_from_slice(key);
            data[pos + key.len()] = 0;
            let voff = pos + key.len() + 1;
            data[voff..voff + 8].copy_from_slice(&value.to_le_bytes());
        }

        let snapshot = decode_save(&data).unwrap();
        assert_eq!(snapshot.statistics.len(), 1);
        assert_eq!(snapshot.statistics.get("Generator.Farmer.Count"), Some(&25.0));
    }

    #[test]
    fn nested_prefix_keys_both_recovered() {
        let mut data = sav_buffer(0x1800);
        let key = b"Game.Generator.Farmer";
        let pos = 0x300;
        data[pos..pos + key.len()].copy_from_slice(key);
        data[pos + key.len()] = 0;
        let voff = pos + key.len() + 1;
        data[voff..voff + 8].copy_from_slice(&7.0f64.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        // "Generator." inside the outer key anchors a key of its own.
        assert_eq!(snapshot.statistics.get("Game.Generator.Farmer"), Some(&7.0));
        assert_eq!(snapshot.statistics.get("Generator.Farmer"), Some(&7.0));
        assert_eq!(snapshot.statistics.len(), 2);
    }

    #[test]
    fn invalid_utf8_between_label_and_terminator_is_dropped() {
        let mut data = sav_buffer(0x1800);
        let pos = 0x200;
        data[pos..pos + 6].copy_from_slice(b"Medals");
        data[pos + 6..pos + 9].copy_from_slice(&[0xFF, 0xFE, 0xFF]);
        data[pos + 9] = 0;
        data[pos + 10..pos + 14].copy_from_slice(&42u32.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        assert_eq!(snapshot.progress.get("Medals"), Some(&42));

        let mut data = sav_buffer(0x1800);
        let pos = 0x300;
        data[pos..pos + 10].copy_from_slice(b"Game.Stats");
        data[pos + 10] = 0xFF;
        data[pos + 11] = 0;
        data[pos + 12..pos + 20].copy_from_slice(&2.5f64.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        assert_eq!(snapshot.statistics.get("Game.Stats"), Some(&2.5));
    }

    #[test]
    fn progress_order_follows_keyword_list_not_buffer_order() {
        let mut data = sav_buffer(0x1800);

        // "Land" sits before "Medals" in the buffer; the keyword list
        // tries "Medals" first, and the result keeps that order.
        let pos = 0x100;
        data[pos..pos + 4].copy_from_slice(b"Land");
        data[pos + 4] = 0;
        data[pos + 5..pos + 9].copy_from_slice(&5u32.to_le_bytes());

        let pos = 0x200;
        data[pos..pos + 6].copy_from_slice(b"Medals");
        data[pos + 6] = 0;
        data[pos + 7..pos + 11].copy_from_slice(&9u32.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        let labels: Vec<&str> = snapshot
            .progress
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(labels, vec!["Medals", "Land"]);
    }

    #[test]
    fn unterminated_statistics_key_is_skipped() {
        let mut data = sav_buffer(0x1800);
        let pos = 0x300;
        data[pos..pos + 6].copy_from_slice(b"Store.");
        // 150 non-NUL bytes after the prefix: over the key length cap.
        for b in &mut data[pos + 6..pos + 156] {
            *b = b'x';
        }
        // Restore a zero tail terminator well past the cap.
        data[pos + 156] = 0;

        let snapshot = decode_save(&data).unwrap();
        assert!(snapshot.statistics.is_empty());
    }

    #[test]
    fn scientist_candidates_surfaced() {
        let mut data = sav_buffer(0x1800);
        let pos = 0x500;
        data[pos..pos + 10].copy_from_slice(b"Scientists");
        data[pos + 10] = 0;
        let voff = pos + 20;
        data[voff..voff + 8].copy_from_slice(&123.0f64.to_le_bytes());

        let snapshot = decode_save(&data).unwrap();
        assert_eq!(
            snapshot.scientist_candidates,
            vec![ScientistCandidate {
                offset: voff,
                value: 123
            }]
        );
    }

    #[test]
    fn garbage_after_header_never_panics() {
        // Deterministic pseudo-random fill; the decoder must tolerate
        // arbitrary bytes after the tag, including invalid UTF-8.
        let mut state = 0x1234_5678_9abc_def0u64;
        let mut data = sav_buffer(0x10000);
        for b in &mut data[8..] {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            *b = state as u8;
        }

        let first = decode_save(&data).unwrap();
        let second = decode_save(&data).unwrap();
        assert_eq!(first, second);
    }
}
