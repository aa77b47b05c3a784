//! INTERVAL values: months, days, and microseconds tracked independently
//! (spec.md §4.3 "Interval parsing") so that `1 month` stays distinct from
//! `30 days` even though they're usually close in wall-clock terms.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

impl Interval {
    pub const fn new(months: i32, days: i32, micros: i64) -> Self {
        Self {
            months,
            days,
            micros,
        }
    }

    /// Parses either an ISO-8601 interval (`P1Y2M3DT4H5M6S`) when the input
    /// starts with `P`, or the human form (`"3 days 4 hours"`).
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.starts_with('P') {
            Self::parse_iso8601(input)
        } else {
            Self::parse_human(input)
        }
    }

    fn parse_iso8601(input: &str) -> Option<Self> {
        let rest = input.strip_prefix('P')?;
        let (date_part, time_part) = match rest.split_once('T') {
            Some((d, t)) => (d, Some(t)),
            None => (rest, None),
        };

        let mut months = 0i32;
        let mut days = 0i32;
        let mut micros = 0i64;

        let mut num = String::new();
        for c in date_part.chars() {
            if c.is_ascii_digit() {
                num.push(c);
                continue;
            }
            let n: i32 = num.parse().ok()?;
            num.clear();
            match c {
                'Y' => months += n * 12,
                'M' => months += n,
                'W' => days += n * 7,
                'D' => days += n,
                _ => return None,
            }
        }
        if !num.is_empty() {
            return None;
        }

        if let Some(time_part) = time_part {
            let mut num = String::new();
            for c in time_part.chars() {
                if c.is_ascii_digit() || c == '.' {
                    num.push(c);
                    continue;
                }
                let n: f64 = num.parse().ok()?;
                num.clear();
                match c {
                    'H' => micros += (n * 3_600_000_000.0) as i64,
                    'M' => micros += (n * 60_000_000.0) as i64,
                    'S' => micros += (n * 1_000_000.0) as i64,
                    _ => return None,
                }
            }
            if !num.is_empty() {
                return None;
            }
        }

        Some(Self::new(months, days, micros))
    }

    fn parse_human(input: &str) -> Option<Self> {
        let mut months = 0i32;
        let mut days = 0i32;
        let mut micros = 0i64;

        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() % 2 != 0 {
            return None;
        }

        for pair in tokens.chunks(2) {
            let [amount, unit] = pair else { return None };
            let amount: f64 = amount.parse().ok()?;
            let unit = unit.trim_end_matches('s').to_ascii_lowercase();
            match unit.as_str() {
                "year" => months += (amount * 12.0) as i32,
                "month" => months += amount as i32,
                "week" => days += (amount * 7.0) as i32,
                "day" => days += amount as i32,
                "hour" => micros += (amount * 3_600_000_000.0) as i64,
                "minute" | "min" => micros += (amount * 60_000_000.0) as i64,
                "second" | "sec" => micros += (amount * 1_000_000.0) as i64,
                _ => return None,
            }
        }

        Some(Self::new(months, days, micros))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.months != 0 {
            parts.push(format!("{} mons", self.months));
        }
        if self.days != 0 {
            parts.push(format!("{} days", self.days));
        }
        if self.micros != 0 || parts.is_empty() {
            let total_secs = self.micros / 1_000_000;
            let hours = total_secs / 3600;
            let minutes = (total_secs % 3600) / 60;
            let seconds = total_secs % 60;
            let micros_rem = (self.micros % 1_000_000).abs();
            if micros_rem != 0 {
                parts.push(format!(
                    "{:02}:{:02}:{:02}.{:06}",
                    hours, minutes, seconds, micros_rem
                ));
            } else {
                parts.push(format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
            }
        }
        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso8601_date_and_time() {
        let iv = Interval::parse("P1Y2M3DT4H5M6S").unwrap();
        assert_eq!(iv.months, 14);
        assert_eq!(iv.days, 3);
        assert_eq!(iv.micros, 4 * 3_600_000_000 + 5 * 60_000_000 + 6_000_000);
    }

    #[test]
    fn parses_human_form() {
        let iv = Interval::parse("3 days 4 hours").unwrap();
        assert_eq!(iv.days, 3);
        assert_eq!(iv.micros, 4 * 3_600_000_000);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Interval::parse("not an interval").is_none());
    }
}
