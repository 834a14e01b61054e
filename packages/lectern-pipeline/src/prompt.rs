use lectern_index::Candidate;

pub const SYSTEM_PROMPT: &str = "You are an expert assistant. Answer using ONLY the provided \
	context passages. If the answer is not contained in the context, respond: 'Not found in \
	provided documents.' Keep answers concise and cite passages by their id when relevant.";

/// Inserted in place of the context block when retrieval found nothing, so
/// the model is steered toward "not found" instead of free association.
pub const NO_CONTEXT_MARKER: &str = "(no relevant context passages were found)";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub fn assemble(system_instruction: &str, contexts: &[Candidate], query: &str) -> String {
	let joined = if contexts.is_empty() {
		NO_CONTEXT_MARKER.to_string()
	} else {
		contexts
			.iter()
			.map(|context| format!("[{}]\n{}", context.id, context.text))
			.collect::<Vec<_>>()
			.join(CONTEXT_SEPARATOR)
	};

	format!("{system_instruction}\n\nContext:\n{joined}\n\nQuestion: {query}\nAnswer:")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidate(id: &str, text: &str) -> Candidate {
		Candidate {
			id: id.to_string(),
			document_id: "doc".to_string(),
			title: "Doc".to_string(),
			text: text.to_string(),
			score: None,
		}
	}

	#[test]
	fn renders_contexts_with_id_headers_and_separators() {
		let contexts = vec![candidate("doc_chunk0", "First."), candidate("doc_chunk1", "Second.")];
		let prompt = assemble(SYSTEM_PROMPT, &contexts, "What?");

		assert!(prompt.starts_with(SYSTEM_PROMPT));
		assert!(prompt.contains("[doc_chunk0]\nFirst.\n\n---\n\n[doc_chunk1]\nSecond."));
		assert!(prompt.ends_with("Question: What?\nAnswer:"));
	}

	#[test]
	fn empty_contexts_render_the_no_context_marker() {
		let prompt = assemble(SYSTEM_PROMPT, &[], "What?");

		assert!(prompt.contains(NO_CONTEXT_MARKER));
		assert!(!prompt.contains("---"));
	}
}
