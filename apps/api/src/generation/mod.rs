// Single-shot tools and the task plumbing shared with job matching.
// Every provider call goes through `runner::TaskRunner`.

pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod runner;
pub mod tasks;
pub mod tone;
