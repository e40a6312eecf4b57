//! Playlist sequencing
//!
//! Reorders a mapped playlist so tracks by the same creator are spread
//! evenly instead of clustering back-to-back. Placement is spacing-based:
//! each creator's items get ideal positions `floor(i*s + s/2)` where
//! `s = N / count`, claimed largest-group-first so the group with the least
//! placement freedom picks its slots before the flexible ones. When an
//! ideal slot is taken or would create adjacency, the search walks outward
//! alternating +1/-1; only when no adjacency-safe slot exists anywhere does
//! an item take the first free slot regardless.
//!
//! The output is always a permutation of the input. For a creator holding
//! K of N items the achievable lower bound on adjacent same-creator pairs
//! is `max(0, 2K - N - 1)`; adjacency appears only when structurally
//! unavoidable.

use std::collections::HashMap;

use crate::models::PlaylistTrack;

/// Reorder a playlist to minimize adjacent same-creator pairs.
///
/// Inputs of length 0, 1, or 2 are returned unchanged.
pub fn reorder(items: Vec<PlaylistTrack>) -> Vec<PlaylistTrack> {
    let n = items.len();
    if n <= 2 {
        return items;
    }

    // Group by creator, preserving first-appearance content
    let mut index_of: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<PlaylistTrack>)> = Vec::new();
    for track in items {
        match index_of.get(&track.creator) {
            Some(&idx) => groups[idx].1.push(track),
            None => {
                index_of.insert(track.creator.clone(), groups.len());
                groups.push((track.creator.clone(), vec![track]));
            }
        }
    }

    // Largest groups claim slots first; creator name breaks size ties so
    // the ordering is deterministic
    groups.sort_by(|a, b| {
        b.1.len()
            .cmp(&a.1.len())
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut slots: Vec<Option<PlaylistTrack>> = (0..n).map(|_| None).collect();

    for (creator, mut group) in groups {
        // Best-ranked item of the creator claims the best slot
        group.sort_by(|a, b| b.score.cmp(&a.score));

        let spacing = n as f64 / group.len() as f64;
        for (i, track) in group.into_iter().enumerate() {
            let ideal = ((i as f64 * spacing) + spacing / 2.0).floor() as usize;
            let position = find_slot(&slots, ideal.min(n - 1), &creator);
            slots[position] = Some(track);
        }
    }

    slots.into_iter().flatten().collect()
}

/// Count of adjacent pairs sharing a creator, for diagnostics and tests
pub fn adjacent_pairs(items: &[PlaylistTrack]) -> usize {
    items
        .windows(2)
        .filter(|pair| pair[0].creator == pair[1].creator)
        .count()
}

/// True when `position` is unused and placing `creator` there creates no
/// adjacency with an already-placed neighbor
fn is_placeable(slots: &[Option<PlaylistTrack>], position: usize, creator: &str) -> bool {
    if slots[position].is_some() {
        return false;
    }

    let before_same = position > 0
        && slots[position - 1]
            .as_ref()
            .is_some_and(|t| t.creator == creator);
    let after_same = position + 1 < slots.len()
        && slots[position + 1]
            .as_ref()
            .is_some_and(|t| t.creator == creator);

    !before_same && !after_same
}

/// Slot search: ideal position, then outward alternating +1/-1, then the
/// first unused slot when no adjacency-safe slot exists anywhere
fn find_slot(slots: &[Option<PlaylistTrack>], ideal: usize, creator: &str) -> usize {
    let n = slots.len();

    if is_placeable(slots, ideal, creator) {
        return ideal;
    }

    for offset in 1..n {
        let above = ideal + offset;
        if above < n && is_placeable(slots, above, creator) {
            return above;
        }
        if offset <= ideal {
            let below = ideal - offset;
            if is_placeable(slots, below, creator) {
                return below;
            }
        }
    }

    // Adjacency is structurally unavoidable for this item
    slots
        .iter()
        .position(|slot| slot.is_none())
        .expect("unused slot remains while items are unplaced")
}
