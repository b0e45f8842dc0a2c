pub mod formatter;

pub use formatter::{
    format_chart, format_gains, format_history, format_json, format_kpis, format_milestones,
    format_money, format_timeline, format_weight_breakdown, format_weights, should_use_colors,
    ScoreBand,
};
