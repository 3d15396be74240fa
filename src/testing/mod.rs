//! Test support: mock collaborators for exercising the execution engine
//! without a Python interpreter or a live CAD document.

pub mod mocks;

pub use mocks::{MockSandbox, StubWorkspace};
