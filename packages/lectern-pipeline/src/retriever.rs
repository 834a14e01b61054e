use lectern_index::Candidate;

use crate::{Error, Result};

/// How many leading candidates get rerank scores. Never more than the
/// candidate count.
pub(crate) fn clamp_top_n(rerank_top_n: u32, candidate_count: usize) -> usize {
	(rerank_top_n as usize).min(candidate_count)
}

/// Attaches `scores` to the first `top_n` candidates and reorders that head
/// by score, highest first. The tail past `top_n` keeps its similarity order
/// and stays unscored. The sort is stable, so equal scores keep their
/// retrieval order.
pub(crate) fn apply_scores(
	mut candidates: Vec<Candidate>,
	scores: &[f32],
	top_n: usize,
) -> Result<Vec<Candidate>> {
	if scores.len() != top_n {
		return Err(Error::Provider {
			message: "Rerank provider returned mismatched score count.".to_string(),
		});
	}

	let tail = candidates.split_off(top_n);
	let mut head = candidates;

	for (candidate, score) in head.iter_mut().zip(scores) {
		candidate.score = Some(*score);
	}

	head.sort_by(|a, b| {
		b.score
			.partial_cmp(&a.score)
			.unwrap_or(std::cmp::Ordering::Equal)
	});
	head.extend(tail);

	Ok(head)
}
