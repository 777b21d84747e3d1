use chrono::{Datelike, NaiveDate};

/// Monday-first weekday header, rendered as 7 fixed cells before the grid.
pub const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// The (year, month) pair currently displayed. Month is stored 0-based to
/// make the roll-over arithmetic explicit; every external surface (URLs,
/// titles) uses the 1-based value from `month1()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month0: u32,
}

impl MonthCursor {
    pub fn from_date(date: NaiveDate) -> Self {
        MonthCursor {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn month1(&self) -> u32 {
        self.month0 + 1
    }

    /// Step one month forward, rolling the year on December.
    pub fn advance(&mut self) {
        if self.month0 == 11 {
            self.month0 = 0;
            self.year += 1;
        } else {
            self.month0 += 1;
        }
    }

    /// Step one month backward, rolling the year on January.
    pub fn retreat(&mut self) {
        if self.month0 == 0 {
            self.month0 = 11;
            self.year -= 1;
        } else {
            self.month0 -= 1;
        }
    }
}

/// One slot of the rendered grid, after the fixed weekday header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridCell {
    Blank,
    Day { day: u32, is_today: bool },
}

/// Layout of one displayed month: leading blanks plus day cells, computed
/// once per render from the cursor and the real-world current date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    /// Empty slots before day 1 so that day 1 lands on its ISO weekday
    /// column (Monday-first).
    pub leading_blanks: u32,
    pub days_in_month: u32,
    /// Day of month carrying the today marker, when today falls inside the
    /// displayed month.
    pub today_day: Option<u32>,
}

impl MonthGrid {
    pub fn compute(cursor: MonthCursor, today: NaiveDate) -> Self {
        let year = cursor.year;
        let month = cursor.month1();
        let first = first_of_month(year, month);
        // number_from_monday is already the Monday=1..Sunday=7 scale.
        let leading_blanks = first.weekday().number_from_monday() - 1;
        let today_day = (today.year() == year && today.month() == month).then(|| today.day());
        MonthGrid {
            year,
            month,
            leading_blanks,
            days_in_month: days_in_month(year, month),
            today_day,
        }
    }

    /// Blank and day cells in render order. Always exactly
    /// `leading_blanks + days_in_month` entries.
    pub fn cells(&self) -> Vec<GridCell> {
        let mut cells = Vec::with_capacity((self.leading_blanks + self.days_in_month) as usize);
        for _ in 0..self.leading_blanks {
            cells.push(GridCell::Blank);
        }
        for day in 1..=self.days_in_month {
            cells.push(GridCell::Day {
                day,
                is_today: self.today_day == Some(day),
            });
        }
        cells
    }

    /// The cells chunked into 7-wide rows, padded with empty slots on the
    /// final row.
    pub fn weeks(&self) -> Vec<[Option<u32>; 7]> {
        let mut weeks = Vec::new();
        let mut row = [None; 7];
        let mut col = self.leading_blanks as usize;
        for day in 1..=self.days_in_month {
            row[col] = Some(day);
            col += 1;
            if col == 7 {
                weeks.push(row);
                row = [None; 7];
                col = 0;
            }
        }
        if col > 0 {
            weeks.push(row);
        }
        weeks
    }

    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// Last day of the month via the day-before-the-first-of-next-month trick.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_of_month(next_year, next_month)
        .pred_opt()
        .unwrap()
        .day()
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
