//! Timeline Context - 时间线限界上下文
//!
//! 职责:
//! - 纪元坐标 (era, year_in_era) 到绝对刻度的换算
//! - 新纪元的默认起始刻度

mod tick;

pub use tick::{default_era_start, resolve_absolute_tick, ERA_SPAN};
