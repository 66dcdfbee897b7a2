use uuid::Uuid;

const FIELD_SEPARATOR: char = '\u{1f}';

/// Identity key of a posting. Stable across processes and sources, so the same title, company,
/// and location collapse to one stored job no matter which board reported it.
pub fn fingerprint(title: &str, company: &str, location: &str) -> String {
	let mut material = String::with_capacity(title.len() + company.len() + location.len() + 2);

	for (idx, field) in [title, company, location].into_iter().enumerate() {
		if idx > 0 {
			material.push(FIELD_SEPARATOR);
		}

		material.push_str(&field.trim().to_lowercase());
	}

	blake3::hash(material.as_bytes()).to_hex().to_string()
}

pub fn job_id(fingerprint: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, fingerprint.as_bytes())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn separator_keeps_fields_apart() {
		assert_ne!(fingerprint("ab", "c", ""), fingerprint("a", "bc", ""));
		assert_eq!(fingerprint("a", "b", "c").len(), 64);
	}

	#[test]
	fn job_id_follows_fingerprint() {
		let key = fingerprint("Engineer", "Acme", "Austin, TX");

		assert_eq!(job_id(&key), job_id(&key));
		assert_ne!(job_id(&key), job_id(&fingerprint("Engineer", "Acme", "Denver, CO")));
	}
}
