pub mod candidate;
pub mod fingerprint;
pub mod location;
pub mod normalize;

pub use candidate::{AliasTable, CandidateRecord};
pub use fingerprint::{fingerprint, job_id};
pub use location::is_domestic;
pub use normalize::{NormalizedRecord, normalize, normalize_at};
