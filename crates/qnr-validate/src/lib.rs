pub mod checks;
pub mod deliverable;
pub mod inspector;
pub mod util;

pub use deliverable::{CheckOutcome, DeliverableReport, VerifyArea, verify_deliverable};
pub use inspector::QuestionnaireInspector;
pub use util::CaseInsensitiveSet;
