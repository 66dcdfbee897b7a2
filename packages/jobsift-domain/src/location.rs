//! Best-effort US/non-US labelling of free-text locations.
//!
//! Rules run in a fixed priority order and the first match decides. Exclusion signals are checked
//! before any inclusion signal, and anything left unclassified is excluded. Country, indicator
//! and city tokens match as plain substrings. Only state names and abbreviations are matched
//! against whole words.

use std::sync::LazyLock;

use regex::Regex;

const NON_DOMESTIC: &[&str] = &[
	"uk",
	"united kingdom",
	"england",
	"london",
	"scotland",
	"wales",
	"canada",
	"canadian",
	"toronto",
	"vancouver",
	"montreal",
	"ottawa",
	"australia",
	"australian",
	"sydney",
	"melbourne",
	"brisbane",
	"germany",
	"german",
	"berlin",
	"munich",
	"frankfurt",
	"france",
	"french",
	"paris",
	"lyon",
	"spain",
	"spanish",
	"madrid",
	"barcelona",
	"italy",
	"italian",
	"rome",
	"milan",
	"netherlands",
	"dutch",
	"amsterdam",
	"india",
	"indian",
	"bangalore",
	"mumbai",
	"delhi",
	"hyderabad",
	"china",
	"chinese",
	"beijing",
	"shanghai",
	"japan",
	"japanese",
	"tokyo",
	"osaka",
	"singapore",
	"hong kong",
	"brazil",
	"mexico",
	"argentina",
	"ireland",
	"dublin",
	"sweden",
	"stockholm",
	"norway",
	"oslo",
	"denmark",
	"copenhagen",
	"finland",
	"helsinki",
	"poland",
	"warsaw",
	"portugal",
	"lisbon",
	"israel",
	"tel aviv",
	"south africa",
	"new zealand",
	"auckland",
	"europe",
	"european",
	"asia",
	"emea",
	"worldwide",
	"global",
	"international",
	"anywhere",
];
const DOMESTIC_INDICATORS: &[&str] =
	&["usa", "us", "united states", "america", "american", "nationwide"];
const DOMESTIC_REMOTE_PHRASES: &[&str] = &[
	"us remote",
	"usa remote",
	"remote us",
	"remote usa",
	"remote (us)",
	"remote - us",
	"remote united states",
	"us only",
	"usa only",
];
const STATES: &[&str] = &[
	"alabama",
	"alaska",
	"arizona",
	"arkansas",
	"california",
	"colorado",
	"connecticut",
	"delaware",
	"florida",
	"georgia",
	"hawaii",
	"idaho",
	"illinois",
	"indiana",
	"iowa",
	"kansas",
	"kentucky",
	"louisiana",
	"maine",
	"maryland",
	"massachusetts",
	"michigan",
	"minnesota",
	"mississippi",
	"missouri",
	"montana",
	"nebraska",
	"nevada",
	"new hampshire",
	"new jersey",
	"new mexico",
	"new york",
	"north carolina",
	"north dakota",
	"ohio",
	"oklahoma",
	"oregon",
	"pennsylvania",
	"rhode island",
	"south carolina",
	"south dakota",
	"tennessee",
	"texas",
	"utah",
	"vermont",
	"virginia",
	"washington",
	"west virginia",
	"wisconsin",
	"wyoming",
	"washington dc",
	"district of columbia",
	"puerto rico",
];
const STATE_CODES: &[&str] = &[
	"al", "ak", "az", "ar", "ca", "co", "ct", "de", "fl", "ga", "hi", "id", "il", "in", "ia", "ks",
	"ky", "la", "me", "md", "ma", "mi", "mn", "ms", "mo", "mt", "ne", "nv", "nh", "nj", "nm", "ny",
	"nc", "nd", "oh", "ok", "or", "pa", "ri", "sc", "sd", "tn", "tx", "ut", "vt", "va", "wa", "wv",
	"wi", "wy", "dc", "pr",
];
const MAJOR_CITIES: &[&str] = &[
	"new york",
	"los angeles",
	"chicago",
	"houston",
	"phoenix",
	"philadelphia",
	"san antonio",
	"san diego",
	"dallas",
	"san jose",
	"austin",
	"jacksonville",
	"fort worth",
	"columbus",
	"charlotte",
	"san francisco",
	"indianapolis",
	"seattle",
	"denver",
	"washington",
	"boston",
	"el paso",
	"nashville",
	"detroit",
	"oklahoma city",
	"portland",
	"las vegas",
	"memphis",
	"louisville",
	"baltimore",
	"milwaukee",
	"albuquerque",
	"tucson",
	"fresno",
	"mesa",
	"sacramento",
	"atlanta",
	"kansas city",
	"colorado springs",
	"omaha",
	"raleigh",
	"miami",
	"long beach",
	"virginia beach",
	"oakland",
	"minneapolis",
	"tulsa",
	"tampa",
	"arlington",
	"new orleans",
	"nyc",
	"la",
	"sf",
	"dc",
];
const BARE_REMOTE: &[&str] = &["remote", "remote work", "work from home", "wfh"];
const MAX_STATE_WORDS: usize = 3;

static CITY_STATE_CODE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r",\s*([a-z]{2})\b").ok());
static WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[a-z]+").ok());

pub fn is_domestic(text: &str) -> bool {
	let lowered = text.trim().to_lowercase();

	if lowered.chars().filter(|ch| ch.is_alphanumeric()).count() < 2 {
		return true;
	}

	if NON_DOMESTIC.iter().any(|token| lowered.contains(token)) {
		return false;
	}
	if DOMESTIC_INDICATORS.iter().any(|token| lowered.contains(token)) {
		return true;
	}
	if DOMESTIC_REMOTE_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
		return true;
	}
	if names_state(&words(&lowered)) {
		return true;
	}
	if MAJOR_CITIES.iter().any(|city| lowered.contains(city)) {
		return true;
	}
	if ends_with_state_code(&lowered) {
		return true;
	}

	BARE_REMOTE.contains(&lowered.as_str())
}

fn words(text: &str) -> Vec<&str> {
	match WORD.as_ref() {
		Some(re) => re.find_iter(text).map(|found| found.as_str()).collect(),
		None => text.split(|ch: char| !ch.is_ascii_lowercase()).filter(|w| !w.is_empty()).collect(),
	}
}

fn names_state(words: &[&str]) -> bool {
	if words.iter().any(|word| STATE_CODES.contains(word)) {
		return true;
	}

	(1..=MAX_STATE_WORDS).any(|span| {
		words.windows(span).any(|window| {
			let phrase = window.join(" ");

			STATES.contains(&phrase.as_str())
		})
	})
}

fn ends_with_state_code(text: &str) -> bool {
	let Some(re) = CITY_STATE_CODE.as_ref() else {
		return false;
	};

	re.captures_iter(text)
		.filter_map(|captures| captures.get(1))
		.any(|code| STATE_CODES.contains(&code.as_str()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn country_and_city_tokens_match_as_substrings() {
		// "uk" inside Milwaukee is an exclusion hit.
		assert!(!is_domestic("Milwaukee"));
		// "us" inside campus is a domestic indicator.
		assert!(is_domestic("Zurich campus"));
		assert!(is_domestic("Greater Dallas area"));
	}

	#[test]
	fn state_abbreviations_need_word_boundaries() {
		// "id" and "ma" sit inside ordinary words here.
		assert!(!is_domestic("Hybrid hub, main office"));
		assert!(is_domestic("Springfield IL"));
	}

	#[test]
	fn multi_word_states_match() {
		assert!(is_domestic("Remote within North Carolina"));
		assert!(is_domestic("District of Columbia"));
	}

	#[test]
	fn exclusion_outranks_inclusion() {
		assert!(!is_domestic("USA or Canada"));
		assert!(!is_domestic("Remote - Europe / US"));
	}

	#[test]
	fn unclassified_defaults_to_excluded() {
		assert!(!is_domestic("Mars colony"));
		assert!(!is_domestic("Remote-first"));
	}
}
