use chrono::Datelike;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

/// a single expense-report record, the unit the whole system scores.
/// the same shape rides the csv dataset and the service payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub expense_id: String,
    pub request_id: String,
    pub requester_id: String,
    pub traveller_id: String,
    pub approver_id: String,
    pub request_date: NaiveDate,
    pub travel_date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub job_title: String,
    pub department: String,
    pub approval_status: String,
    #[serde(default)]
    pub fraud: crate::Label,
}

impl crate::Arbitrary for Expense {
    fn random() -> Self {
        use rand::Rng;
        let ref mut rng = rand::rng();
        let requester = format!("U{}", rng.random_range(0..5000));
        let day = NaiveDate::from_ymd_opt(2024, rng.random_range(1..13), rng.random_range(1..28))
            .expect("valid calendar day");
        Self {
            expense_id: format!("E{}", rng.random_range(1000000..2000000)),
            request_id: format!("R{}", rng.random_range(500000..600000)),
            requester_id: requester.clone(),
            traveller_id: requester,
            approver_id: format!("A{}", rng.random_range(0..800)),
            request_date: day,
            travel_date: day + chrono::Duration::days(rng.random_range(0..30)),
            category: "meals".into(),
            description: "lunch client".into(),
            amount: rng.random::<f64>() * 450. + 10.,
            currency: "BRL".into(),
            job_title: "analyst".into(),
            department: "finance".into(),
            approval_status: "approved".into(),
            fraud: 0,
        }
    }
}

impl Expense {
    /// days the trip leads (or trails) its own request
    pub fn lead_days(&self) -> i64 {
        (self.travel_date - self.request_date).num_days()
    }

    /// weekday of the request, sunday = 0
    pub fn weekday(&self) -> u32 {
        self.request_date.weekday().num_days_from_sunday()
    }

    pub fn month(&self) -> u32 {
        self.request_date.month()
    }
}
