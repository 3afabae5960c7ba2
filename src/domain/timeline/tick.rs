//! Tick Resolver
//!
//! 绝对刻度是跨所有纪元排序事件的唯一线性坐标:
//! `absolute_tick = (era?.start_absolute_tick ?? 0) + year_in_era`

/// 未指定起始刻度时，新纪元相对上一纪元的默认跨度
pub const ERA_SPAN: i64 = 10_000;

/// 计算事件的绝对刻度
///
/// - `era_start`: 事件所属纪元的起始刻度，无纪元时为 `None`
/// - `year_in_era`: 纪元内的相对年份，缺省视为 0
///
/// 纯函数，任何输入都有结果（溢出时饱和）。事件的纪元或年份变化后必须重新调用，
/// 不要缓存旧结果。
pub fn resolve_absolute_tick(era_start: Option<i64>, year_in_era: Option<i64>) -> i64 {
    let year = year_in_era.unwrap_or(0);
    match era_start {
        Some(start) => start.saturating_add(year),
        None => year,
    }
}

/// 新纪元的起始刻度
///
/// 优先使用调用方指定的值；否则接在上一个纪元之后 `ERA_SPAN`；第一个纪元从 0 开始
pub fn default_era_start(requested: Option<i64>, last_era_start: Option<i64>) -> i64 {
    match (requested, last_era_start) {
        (Some(start), _) => start,
        (None, Some(last)) => last.saturating_add(ERA_SPAN),
        (None, None) => 0,
    }
}
