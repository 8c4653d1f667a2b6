//! Predictive pre-rendering: edit signals, heuristic fusion, and the idle
//! queue that turns a prediction into cache warm-up work.

mod engine;
pub mod heuristics;
mod scheduler;
mod signals;

pub use engine::{Prediction, PredictionConfig, PredictionEngine};
pub use heuristics::Heuristic;
pub use scheduler::{PrerenderQueueEntry, PrerenderScheduler, SchedulerStatistics};
pub use signals::{CursorState, DEFAULT_HISTORY_DEPTH, EditEvent, EditSignalTracker};

pub(crate) use scheduler::METRIC_PRERENDER;
