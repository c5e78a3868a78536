use cafeops_core::CalendarFields;

/// Fixed 4-decimal rendering for lag/rolling features.
pub(crate) fn f4(value: f64) -> String {
    // Avoid "-0.0000".
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.4}")
}

/// Mean over a fixed-size window (missing buckets are already zeros).
pub(crate) fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// `year,month,day,hour,weekday,isWeekend`
pub(crate) fn hourly_calendar(cal: &CalendarFields) -> Vec<String> {
    vec![
        cal.year.to_string(),
        cal.month.to_string(),
        cal.day.to_string(),
        cal.hour.to_string(),
        cal.weekday.to_string(),
        cal.is_weekend().to_string(),
    ]
}

/// `year,month,day,weekday,isWeekend`
pub(crate) fn daily_calendar(cal: &CalendarFields) -> Vec<String> {
    vec![
        cal.year.to_string(),
        cal.month.to_string(),
        cal.day.to_string(),
        cal.weekday.to_string(),
        cal.is_weekend().to_string(),
    ]
}

/// `year,month,day,hour,weekday` (no weekend flag).
pub(crate) fn event_calendar(cal: &CalendarFields) -> Vec<String> {
    vec![
        cal.year.to_string(),
        cal.month.to_string(),
        cal.day.to_string(),
        cal.hour.to_string(),
        cal.weekday.to_string(),
    ]
}

pub(crate) fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_decimals_and_no_negative_zero() {
        assert_eq!(f4(1.0 / 3.0), "0.3333");
        assert_eq!(f4(-0.0), "0.0000");
        assert_eq!(f4(0.05508), "0.0551");
    }
}
