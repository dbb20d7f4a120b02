pub mod enumerator;
pub mod example;
pub mod fingerprint;
pub mod pipeline;
pub mod roles;
pub mod ssh;
pub mod sweeper;
pub mod synthesizer;
