// Job matching: rank the most recent postings against one CV.
// Fan-out lives in the orchestrator, ranking in the aggregator.

pub mod aggregator;
pub mod handlers;
pub mod orchestrator;
