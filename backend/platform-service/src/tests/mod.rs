/// Unit tests for the session and write-coordination logic (no database
/// required): the stores are replaced with in-memory fakes from `fixtures`.
pub mod fixtures;

mod coordinator_tests;
mod session_tests;
