use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use crate::error::{BarreError, Result};
use crate::models::{AdditionalFee, ClassGroup, Payment, Snapshot, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    FlatAttendance,
    MonthlyFee,
}

/// Per-family financial summary as of the cutoff date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilySummary {
    pub name: String,
    /// Class charges, cents.
    pub charges: i64,
    /// Additional fees, cents.
    pub fees: i64,
    /// Payments received, cents.
    pub payments: i64,
    /// charges + fees - payments
    pub balance: i64,
    /// Monthly-fee mode only.
    pub paid_in_full: Option<bool>,
    /// Monthly-fee mode only. Always zero: credits are a deferred feature,
    /// reported but never computed.
    pub credits: Option<i64>,
}

/// Compute per-family balances as of `cutoff`, one summary per family with
/// a non-empty name, in family record order. Pure: reads the snapshot,
/// mutates nothing.
pub fn compute_balances(mode: Mode, cutoff: NaiveDate, snap: &Snapshot) -> Result<Vec<FamilySummary>> {
    match mode {
        Mode::FlatAttendance => flat_attendance(cutoff, snap),
        Mode::MonthlyFee => monthly_fee(cutoff, snap),
    }
}

// ---------------------------------------------------------------------------
// Shared folds
// ---------------------------------------------------------------------------

fn students_by_family(students: &[Student]) -> HashMap<&str, Vec<&str>> {
    let mut grouped: HashMap<&str, Vec<&str>> = HashMap::new();
    for s in students {
        grouped.entry(s.family_id.as_str()).or_default().push(s.id.as_str());
    }
    grouped
}

fn group_index(groups: &[ClassGroup]) -> HashMap<&str, &ClassGroup> {
    groups.iter().map(|g| (g.id.as_str(), g)).collect()
}

/// Most specific price wins: attendance override, then session override,
/// then the group default.
fn resolve_price(attendance: Option<i64>, session: Option<i64>, group_default: i64) -> i64 {
    attendance.or(session).unwrap_or(group_default)
}

fn fee_total(fees: &[AdditionalFee], member_ids: &[&str], cutoff: NaiveDate) -> i64 {
    fees.iter()
        .filter(|f| member_ids.contains(&f.student_id.as_str()) && f.date <= cutoff)
        .map(|f| f.price)
        .sum()
}

fn payment_total(payments: &[Payment], family_id: &str, cutoff: NaiveDate) -> i64 {
    payments
        .iter()
        .filter(|p| p.family_id == family_id && p.date <= cutoff)
        .map(|p| p.amount_paid)
        .sum()
}

// ---------------------------------------------------------------------------
// Flat-attendance mode
// ---------------------------------------------------------------------------

struct ResolvedAttendance<'a> {
    student_id: &'a str,
    date: NaiveDate,
    price: i64,
}

/// Join each attendance record to its class session and that session's
/// group, resolving the effective date and price. A broken join is an
/// explicit error, never an undefined price.
fn resolve_attendance(snap: &Snapshot) -> Result<Vec<ResolvedAttendance<'_>>> {
    let groups = group_index(&snap.class_groups);
    let sessions: HashMap<&str, _> = snap.classes.iter().map(|c| (c.id.as_str(), c)).collect();

    snap.attendance
        .iter()
        .map(|a| {
            let session = sessions.get(a.class_id.as_str()).ok_or_else(|| {
                BarreError::UnresolvedClass {
                    attendance_id: a.id.clone(),
                    class_id: a.class_id.clone(),
                }
            })?;
            let group = groups.get(session.class_group_id.as_str()).ok_or_else(|| {
                BarreError::UnresolvedGroup {
                    class_id: session.id.clone(),
                    group_id: session.class_group_id.clone(),
                }
            })?;
            Ok(ResolvedAttendance {
                student_id: a.student_id.as_str(),
                date: session.date,
                price: resolve_price(a.price, session.price, group.price),
            })
        })
        .collect()
}

fn flat_attendance(cutoff: NaiveDate, snap: &Snapshot) -> Result<Vec<FamilySummary>> {
    let members = students_by_family(&snap.students);
    let resolved = resolve_attendance(snap)?;

    let mut summaries = Vec::new();
    for family in &snap.families {
        if family.name.is_empty() {
            continue;
        }
        let member_ids: &[&str] = members
            .get(family.id.as_str())
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        let charges: i64 = resolved
            .iter()
            .filter(|r| member_ids.contains(&r.student_id) && r.date <= cutoff)
            .map(|r| r.price)
            .sum();
        let fees = fee_total(&snap.additional_fees, member_ids, cutoff);
        let payments = payment_total(&snap.payments, &family.id, cutoff);
        let balance = charges + fees - payments;

        summaries.push(FamilySummary {
            name: family.name.clone(),
            charges,
            fees,
            payments,
            balance,
            paid_in_full: None,
            credits: None,
        });
    }
    Ok(summaries)
}

// ---------------------------------------------------------------------------
// Monthly-fee mode
// ---------------------------------------------------------------------------

struct MonthBucket {
    #[allow(dead_code)]
    label: String,
    total: i64,
}

/// Accumulate session prices into calendar-month buckets for the given set
/// of class groups. Sessions without an id are skipped.
fn month_fee_buckets(
    snap: &Snapshot,
    groups: &HashMap<&str, &ClassGroup>,
    family_groups: &HashSet<&str>,
) -> Result<BTreeMap<(i32, u32), MonthBucket>> {
    let mut buckets = BTreeMap::new();
    for session in &snap.classes {
        if session.id.is_empty() {
            continue;
        }
        if !family_groups.contains(session.class_group_id.as_str()) {
            continue;
        }
        let group = groups.get(session.class_group_id.as_str()).ok_or_else(|| {
            BarreError::UnresolvedGroup {
                class_id: session.id.clone(),
                group_id: session.class_group_id.clone(),
            }
        })?;
        let price = resolve_price(None, session.price, group.price);
        let bucket = buckets
            .entry((session.date.year(), session.date.month()))
            .or_insert_with(|| MonthBucket {
                label: session.date.format("%B %Y").to_string(),
                total: 0,
            });
        bucket.total += price;
    }
    Ok(buckets)
}

/// Charges accrue per whole calendar month through the cutoff month, not
/// per session date; fees and payments honor the cutoff day exactly as in
/// flat mode.
fn monthly_fee(cutoff: NaiveDate, snap: &Snapshot) -> Result<Vec<FamilySummary>> {
    let groups = group_index(&snap.class_groups);
    let cutoff_month = (cutoff.year(), cutoff.month());

    let mut summaries = Vec::new();
    for family in &snap.families {
        if family.name.is_empty() {
            continue;
        }
        let active: Vec<&Student> = snap
            .students
            .iter()
            .filter(|s| s.family_id == family.id && s.is_active)
            .collect();
        if active.is_empty() {
            continue;
        }
        let family_groups: HashSet<&str> =
            active.iter().map(|s| s.class_group_id.as_str()).collect();

        let buckets = month_fee_buckets(snap, &groups, &family_groups)?;
        let charges: i64 = buckets
            .iter()
            .filter(|(month, _)| **month <= cutoff_month)
            .map(|(_, b)| b.total)
            .sum();

        let member_ids: Vec<&str> = snap
            .students
            .iter()
            .filter(|s| s.family_id == family.id)
            .map(|s| s.id.as_str())
            .collect();
        let fees = fee_total(&snap.additional_fees, &member_ids, cutoff);
        let payments = payment_total(&snap.payments, &family.id, cutoff);
        let balance = charges + fees - payments;

        summaries.push(FamilySummary {
            name: family.name.clone(),
            charges,
            fees,
            payments,
            balance,
            paid_in_full: Some(balance <= 0),
            credits: Some(0),
        });
    }
    Ok(summaries)
}
