//! Recommendation-subsystem interface stub: builds `Vector`s with
//! `unknown_indexes`/`known_mean` from a small rating stream, and ranks
//! candidates by cosine similarity. The sentiment-lexicon/tokenisation
//! pipeline this collaborator would sit behind in a full system is out of
//! scope; this module exists to exercise the interface with a real caller.

use crate::error::Result;
use crate::vector::Vector;
use std::collections::BTreeMap;

pub struct Rating {
    pub user_id: String,
    pub item_index: usize,
    pub score: f64,
}

/// Builds one `Vector` per distinct `user_id`, with observed item scores in
/// place and missing items filled with that user's `known_mean`.
pub fn build_user_vectors(ratings: &[Rating], num_items: usize) -> Vec<Vector> {
    let mut by_user: BTreeMap<&str, Vec<(usize, f64)>> = BTreeMap::new();
    for r in ratings {
        by_user
            .entry(r.user_id.as_str())
            .or_insert_with(Vec::new)
            .push((r.item_index, r.score));
    }

    let mut out = Vec::with_capacity(by_user.len());
    for (user_id, entries) in by_user {
        let mut dims = vec![0.0; num_items];
        let mut seen = vec![false; num_items];
        for &(idx, score) in &entries {
            if idx < num_items {
                dims[idx] = score;
                seen[idx] = true;
            }
        }
        let known_mean = if entries.is_empty() {
            0.0
        } else {
            entries.iter().map(|&(_, s)| s).sum::<f64>() / entries.len() as f64
        };
        let unknown_indexes: Vec<usize> = (0..num_items).filter(|&i| !seen[i]).collect();
        for &i in &unknown_indexes {
            dims[i] = known_mean;
        }
        out.push(Vector::with_unknowns(user_id, dims, unknown_indexes, known_mean));
    }
    out
}

/// Ranks `candidates` by cosine similarity to `query`, highest first, excluding
/// the query's own id, keeping at most `n`.
pub fn top_n(query: &Vector, candidates: &[Vector], n: usize) -> Result<Vec<(usize, f64)>> {
    let mut scored = Vec::new();
    for (i, c) in candidates.iter().enumerate() {
        if c.id() == query.id() {
            continue;
        }
        let sim = query.cosine_similarity(c)?;
        scored.push((i, sim));
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    scored.truncate(n);
    Ok(scored)
}
