//! # Learnplan Core Library
//!
//! This library provides the proposal engine behind learnplan: given a
//! learner's weekly availability and a course's uncompleted activities, it
//! lays out today's agenda of activities and rest breaks.
//!
//! ## Architecture
//!
//! - **Schedule**: A 7x24 grid of sleep/busy/free slots plus readiness per hour
//! - **Timeline**: Circular "user-day" detection bounded by sleep, free period grouping
//! - **Duration / Category**: Age and attempt aware sizing, category grouping and skip rules
//! - **Scheduler**: Greedy day allocator with relax breaks
//! - **Storage**: SQLite planner store (schedules, configuration, proposal cache) and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Planner`]: Request-level entry point
//! - [`WeeklySchedule`]: Availability grid
//! - [`FreeTimeExtractor`]: User-day window and free groups
//! - [`Allocator`]: Fills a user-day with learning objects
//! - [`ProposalCache`]: Per user-day memoization
//! - [`Database`]: SQLite [`PlannerStore`]
//! - [`Config`]: Engine configuration

pub mod activity;
pub mod cache;
pub mod category;
pub mod clock;
pub mod duration;
pub mod error;
pub mod planner;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod timeline;

pub use activity::{
    ActivityCatalog, ActivityConfig, ActivityInfo, ActivityProvider, ActivityRef, InteractionInfo,
    ModuleType, ObjectKind, PracticeOutcome,
};
pub use cache::ProposalCache;
pub use category::{Category, CategoryBuilder, LearningObject};
pub use clock::{Clock, ClockReading, FixedClock, SystemClock};
pub use duration::DurationModel;
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use planner::{AgendaItem, AgendaStatus, Planner, ProposalRequest};
pub use schedule::{Slot, SlotStatus, WeeklySchedule};
pub use scheduler::Allocator;
pub use storage::{CacheKey, Config, Database, PlannerStore};
pub use timeline::{
    DayInfo, DayPeriodInfo, FreePeriodGroup, FreeTimeExtractor, Proposal, ProposedActivity,
    ProposedItem, ProposedObject, ProposedRelax,
};
