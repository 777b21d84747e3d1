pub mod month_grid;

pub use month_grid::{days_in_month, month_name, GridCell, MonthCursor, MonthGrid, WEEKDAY_NAMES};
