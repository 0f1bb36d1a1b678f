pub mod bearer;
pub mod validated_json;

pub use bearer::BearerClaims;
pub use validated_json::{ValidatedJson, WireNames};
