//! Correctness verification.
//!
//! # Data Flow
//! ```text
//! exercise JSON
//!     → descriptor.rs (parse; `true` sentinel → Expectation::Required)
//! (SolutionDescriptor, ApiRequest)           → request.rs  → Verdict
//! (ExpectedResponseDescriptor?, ApiResponse) → response.rs → Verdict
//!                                                 ↳ path.rs (dotted-path lookup)
//! ```
//!
//! # Design Decisions
//! - Every check is a pure function of its inputs
//! - A failed check is not an error: the verdict lists each mismatch so the
//!   caller can render feedback
//! - All sub-checks run; order is irrelevant because none has side effects

pub mod descriptor;
pub mod path;
pub mod request;
pub mod response;
pub mod verdict;

pub use descriptor::{Expectation, ExpectedResponseDescriptor, PartialRequest, SolutionDescriptor};
pub use request::{check_request, verify_request};
pub use response::{check_response, verify_response};
pub use verdict::{Mismatch, Verdict};
