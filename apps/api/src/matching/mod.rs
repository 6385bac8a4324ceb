// Résumé matching engine.
// Implements: text normalization, PDF extraction, skill detection, field scoring, job ranking.
// Pure and synchronous below `handlers`; PDF parsing runs inside tokio::task::spawn_blocking.

pub mod extractor;
pub mod field_analysis;
pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod ranking;
pub mod skills;
pub mod taxonomy;
pub mod uploads;
