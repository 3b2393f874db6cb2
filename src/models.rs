use chrono::NaiveDate;

/// A billing unit; one or more students share a balance.
/// A row with an empty name is a placeholder and is skipped by reports.
#[derive(Debug, Clone)]
pub struct Family {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Student {
    pub id: String,
    pub family_id: String,
    pub class_group_id: String,
    pub is_active: bool,
}

/// A recurring course offering with a default per-session price.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ClassGroup {
    pub id: String,
    pub name: String,
    /// Cents.
    pub price: i64,
}

/// One scheduled occurrence of a class group.
#[derive(Debug, Clone)]
pub struct ClassSession {
    pub id: String,
    pub class_group_id: String,
    pub date: NaiveDate,
    /// Cents; overrides the group default when present.
    pub price: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Attendance {
    pub id: String,
    pub student_id: String,
    pub class_id: String,
    /// Cents; overrides class and group prices when present.
    pub price: Option<i64>,
}

/// A one-off charge to a student outside normal attendance.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct AdditionalFee {
    pub id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub price: i64,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: String,
    pub family_id: String,
    pub date: NaiveDate,
    pub amount_paid: i64,
}

/// All seven record sets, loaded in row order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub families: Vec<Family>,
    pub students: Vec<Student>,
    pub class_groups: Vec<ClassGroup>,
    pub classes: Vec<ClassSession>,
    pub attendance: Vec<Attendance>,
    pub additional_fees: Vec<AdditionalFee>,
    pub payments: Vec<Payment>,
}
