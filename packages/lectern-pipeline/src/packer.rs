use lectern_index::Candidate;

/// Greedy prefix selection under `token_budget`. Candidates are consumed in
/// rank order; the first one that would overflow the budget ends the scan.
/// A single candidate larger than the whole budget is still selected when
/// nothing fits, so a non-empty candidate list never packs to nothing.
pub fn select_by_budget<F>(
	candidates: Vec<Candidate>,
	token_budget: u32,
	mut token_len: F,
) -> Vec<Candidate>
where
	F: FnMut(&str) -> usize,
{
	let mut selected = Vec::new();
	let mut used = 0_usize;

	for candidate in candidates {
		let len = token_len(&candidate.text);

		if used + len > token_budget as usize {
			if selected.is_empty() {
				selected.push(candidate);
			}

			break;
		}

		used += len;
		selected.push(candidate);
	}

	selected
}
