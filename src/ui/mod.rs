pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    complexity_badge, decision, dim, error, header, info, is_quiet, muted, object_changed, percent, section,
    set_quiet, severity_badge, status, success, summary_row, warn,
};
pub use table::{
    capabilities_table, changes_table, enrichment_table, rules_table, stats_table, technologies_table,
};
pub use theme::{theme, Theme};
