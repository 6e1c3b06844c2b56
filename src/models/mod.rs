pub mod verdict;
pub mod language;
pub mod evidence;
pub mod key;
pub mod record;

pub use verdict::Verdict;
pub use language::Language;
pub use evidence::{EvilInput, PumpPair};
pub use key::CacheKey;
pub use record::{TrustedRecord, UntrustedClaim};
