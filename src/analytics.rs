//! Read-only aggregation over the session catalog, appointment ledger,
//! and inventory. Every call recomputes from the live store; nothing is
//! cached. All day bucketing is UTC, midnight to midnight.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{repository, DatabaseError};
use crate::inventory::{classify_expiry, classify_stock};

/// Days of appointment history in the trend series.
const TREND_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub trends: Trends,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_doctors: i64,
    pub total_patients: i64,
    pub total_appointments: i64,
    pub total_medicines: i64,
    pub today_appointments: i64,
    pub low_stock_count: i64,
    pub expiring_count: i64,
    pub session_utilization: SessionUtilization,
    pub lead_time: LeadTime,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUtilization {
    pub total_sessions: i64,
    pub booked_sessions: i64,
    pub utilization_rate: f64,
}

/// Days between when a booking was made and when the appointment takes
/// place. Zeroes when the ledger is empty.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadTime {
    pub average_lead_time: f64,
    pub min_lead_time: f64,
    pub max_lead_time: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub appointment_trends: Vec<DateCount>,
    pub appointments_by_time: Vec<LabelCount>,
    pub appointments_by_specialty: Vec<LabelCount>,
    pub doctor_workload: Vec<DoctorWorkload>,
    pub weekly_distribution: Vec<LabelCount>,
    pub medicine_inventory_status: Vec<LabelCount>,
    pub medicines_by_expiration: Vec<LabelCount>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorWorkload {
    pub doctor_name: String,
    pub specialty: String,
    pub appointment_count: i64,
}

/// Assemble the full report as of `now`.
pub fn build_report(conn: &Connection, now: DateTime<Utc>) -> Result<AnalyticsReport, DatabaseError> {
    let today = now.date_naive();

    let total_doctors = repository::count_doctors(conn)?;
    let total_patients = repository::count_patients(conn)?;
    let total_appointments = repository::count_appointments(conn)?;
    let total_medicines = repository::count_items(conn)?;
    let today_appointments = repository::count_appointments_on(conn, today)?;

    let schedule = repository::appointment_schedule_rows(conn)?;
    let (total_sessions, booked_sessions) = repository::session_counts(conn)?;
    let items = repository::list_items(conn)?;

    let mut low_stock_count = 0;
    let mut expiring_count = 0;
    let mut stock_counts: BTreeMap<&'static str, i64> = BTreeMap::new();
    let mut expiry_counts: BTreeMap<&'static str, i64> = BTreeMap::new();
    for item in &items {
        let stock = classify_stock(item.quantity);
        if stock == crate::models::enums::StockLevel::Critical {
            low_stock_count += 1;
        }
        *stock_counts.entry(stock.as_str()).or_default() += 1;

        let expiry = classify_expiry(item.expiration_date, today);
        if expiry == crate::models::enums::ExpiryStatus::ExpiringSoon {
            expiring_count += 1;
        }
        *expiry_counts.entry(expiry.as_str()).or_default() += 1;
    }

    Ok(AnalyticsReport {
        summary: Summary {
            total_doctors,
            total_patients,
            total_appointments,
            total_medicines,
            today_appointments,
            low_stock_count,
            expiring_count,
            session_utilization: utilization(total_sessions, booked_sessions),
            lead_time: lead_time(&schedule),
        },
        trends: Trends {
            appointment_trends: trend_by_day(&schedule, today),
            appointments_by_time: count_by_time(&schedule),
            appointments_by_specialty: repository::appointment_counts_by_specialty(conn)?
                .into_iter()
                .map(|(label, count)| LabelCount { label, count })
                .collect(),
            doctor_workload: repository::appointment_counts_by_doctor(conn)?
                .into_iter()
                .map(|(doctor_name, specialty, appointment_count)| DoctorWorkload {
                    doctor_name,
                    specialty,
                    appointment_count,
                })
                .collect(),
            weekly_distribution: weekday_distribution(&schedule),
            medicine_inventory_status: to_label_counts(stock_counts),
            medicines_by_expiration: to_label_counts(expiry_counts),
        },
    })
}

/// `booked / total × 100`, defined as 0 when there are no sessions.
pub fn utilization(total_sessions: i64, booked_sessions: i64) -> SessionUtilization {
    let utilization_rate = if total_sessions == 0 {
        0.0
    } else {
        booked_sessions as f64 / total_sessions as f64 * 100.0
    };
    SessionUtilization {
        total_sessions,
        booked_sessions,
        utilization_rate,
    }
}

fn lead_time(schedule: &[(NaiveDate, String, String)]) -> LeadTime {
    let mut days: Vec<f64> = Vec::with_capacity(schedule.len());
    for (date, _, created_at) in schedule {
        if let Ok(created) = DateTime::parse_from_rfc3339(created_at) {
            let delta = *date - created.with_timezone(&Utc).date_naive();
            days.push(delta.num_days() as f64);
        }
    }
    if days.is_empty() {
        return LeadTime {
            average_lead_time: 0.0,
            min_lead_time: 0.0,
            max_lead_time: 0.0,
        };
    }
    let sum: f64 = days.iter().sum();
    LeadTime {
        average_lead_time: sum / days.len() as f64,
        min_lead_time: days.iter().cloned().fold(f64::INFINITY, f64::min),
        max_lead_time: days.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Appointment counts per calendar day, from a week back onward.
/// Upcoming appointments count too; only older history is cut off.
fn trend_by_day(schedule: &[(NaiveDate, String, String)], today: NaiveDate) -> Vec<DateCount> {
    let window_start = today - Duration::days(TREND_DAYS);
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (date, _, _) in schedule {
        if *date >= window_start {
            *buckets.entry(*date).or_default() += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect()
}

fn count_by_time(schedule: &[(NaiveDate, String, String)]) -> Vec<LabelCount> {
    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
    for (_, time, _) in schedule {
        let label = if time.is_empty() {
            "Unspecified".to_string()
        } else {
            time.clone()
        };
        *buckets.entry(label).or_default() += 1;
    }
    to_label_counts_owned(buckets)
}

fn weekday_distribution(schedule: &[(NaiveDate, String, String)]) -> Vec<LabelCount> {
    const DAYS: [&str; 7] = [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ];
    let mut counts = [0i64; 7];
    for (date, _, _) in schedule {
        counts[date.weekday().num_days_from_sunday() as usize] += 1;
    }
    DAYS.iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| LabelCount {
            label: (*label).to_string(),
            count,
        })
        .collect()
}

fn to_label_counts(map: BTreeMap<&'static str, i64>) -> Vec<LabelCount> {
    map.into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

fn to_label_counts_owned(map: BTreeMap<String, i64>) -> Vec<LabelCount> {
    map.into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect()
}
