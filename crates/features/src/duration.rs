//! Reservation seating duration (sourced from the reservation collection).

use cafeops_core::CalendarFields;
use cafeops_inventory::Reservation;

use crate::dataset::Rows;
use crate::format::{f4, hourly_calendar, opt};

pub(crate) const DURATION_HEADER: &[&str] = &[
    "reservationId",
    "year",
    "month",
    "day",
    "hour",
    "weekday",
    "isWeekend",
    "partySize",
    "areaId",
    "tableId",
    "targetMinutes",
];

pub(crate) fn duration_rows(mut reservations: Vec<Reservation>) -> Rows {
    reservations.retain(|r| r.duration_minutes.is_some());
    reservations.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));

    Box::new(reservations.into_iter().map(|r| {
        let mut row = vec![r.id];
        row.extend(hourly_calendar(&CalendarFields::from_timestamp(&r.start_time)));
        row.extend([
            r.party_size.to_string(),
            opt(r.area_id),
            opt(r.table_id),
            f4(r.duration_minutes.unwrap_or_default()),
        ]);
        row
    }))
}
