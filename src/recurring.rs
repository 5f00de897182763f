// src/recurring.rs
// 周期任务的日期推算: 从 start_date 起每周找一次目标星期几
use chrono::{Datelike, Duration, NaiveDate, Weekday};

// 只认这七个标准英文写法, 大小写敏感
pub fn parse_day_of_week(name: &str) -> Option<Weekday> {
    match name {
        "Monday" => Some(Weekday::Mon),
        "Tuesday" => Some(Weekday::Tue),
        "Wednesday" => Some(Weekday::Wed),
        "Thursday" => Some(Weekday::Thu),
        "Friday" => Some(Weekday::Fri),
        "Saturday" => Some(Weekday::Sat),
        "Sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

// 第 i 周的锚点是 start_date + 7i 天, 取锚点当天或之后第一个目标星期几
pub fn occurrence_dates(start_date: NaiveDate, target: Weekday, weeks: i64) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for i in 0..weeks {
        let mut next = start_date + Duration::weeks(i);
        while next.weekday() != target {
            next = next + Duration::days(1);
        }
        dates.push(next);
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case("Monday", Weekday::Mon)]
    #[test_case("Tuesday", Weekday::Tue)]
    #[test_case("Wednesday", Weekday::Wed)]
    #[test_case("Thursday", Weekday::Thu)]
    #[test_case("Friday", Weekday::Fri)]
    #[test_case("Saturday", Weekday::Sat)]
    #[test_case("Sunday", Weekday::Sun)]
    fn parses_canonical_names(name: &str, expected: Weekday) {
        assert_eq!(parse_day_of_week(name), Some(expected));
    }

    #[test_case("tuesday"; "lowercase tuesday")]
    #[test_case("TUESDAY"; "uppercase tuesday")]
    #[test_case("Tue"; "abbreviated tue")]
    #[test_case("星期二"; "non-english tuesday")]
    #[test_case(""; "empty string")]
    fn rejects_non_canonical_names(name: &str) {
        assert_eq!(parse_day_of_week(name), None);
    }

    #[test]
    fn steps_to_first_tuesday_on_or_after_each_week() {
        // 2025-07-02 是周三, 两周的周二应当是 07-08 和 07-15
        let dates = occurrence_dates(date(2025, 7, 2), Weekday::Tue, 2);
        assert_eq!(dates, vec![date(2025, 7, 8), date(2025, 7, 15)]);
    }

    #[test]
    fn start_date_counts_when_it_matches() {
        // 起始日就是周三, 第 0 周用起始日本身
        let dates = occurrence_dates(date(2025, 7, 2), Weekday::Wed, 3);
        assert_eq!(
            dates,
            vec![date(2025, 7, 2), date(2025, 7, 9), date(2025, 7, 16)]
        );
    }

    #[test]
    fn default_four_weeks_shape() {
        let dates = occurrence_dates(date(2025, 7, 2), Weekday::Tue, 4);
        assert_eq!(dates.len(), 4);
        // 相邻两次正好差 7 天
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(7));
        }
    }

    #[test]
    fn zero_or_negative_weeks_generate_nothing() {
        assert!(occurrence_dates(date(2025, 7, 2), Weekday::Tue, 0).is_empty());
        assert!(occurrence_dates(date(2025, 7, 2), Weekday::Tue, -3).is_empty());
    }

    #[test]
    fn crosses_month_boundary() {
        // 2025-07-30 是周三, 下一个周一落在 8 月
        let dates = occurrence_dates(date(2025, 7, 30), Weekday::Mon, 1);
        assert_eq!(dates, vec![date(2025, 8, 4)]);
    }
}
