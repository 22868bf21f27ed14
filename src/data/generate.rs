use super::expense::Expense;
use crate::Error;
use chrono::Duration;
use rand::Rng;
use rand::seq::IndexedRandom;

const CATEGORIES: [&str; 5] = crate::features::CATEGORIES;
const DEPARTMENTS: [&str; 5] = ["finance", "sales", "operations", "technology", "hr"];
const JOB_TITLES: [&str; 5] = ["analyst", "coordinator", "manager", "specialist", "director"];
const WORDS: [&str; 10] = [
    "lunch", "travel", "hotel", "rideshare", "cab", "toll", "fuel", "meeting", "client", "event",
];

/// seeded synthetic expense stream with correlated fraud signals:
/// self-approvals, inverted trips, suspiciously round amounts, and a
/// rule score that decides the label on top of the base rate.
#[derive(Debug, Clone)]
pub struct Generator {
    pub count: usize,
    pub fraud_rate: f64,
    pub seed: u64,
}

impl Generator {
    pub fn new(count: usize, fraud_rate: f64, seed: u64) -> Self {
        Self {
            count,
            fraud_rate,
            seed,
        }
    }

    pub fn sample(&self) -> Vec<Expense> {
        let ref mut rng = crate::model::rng(self.seed);
        let epoch = chrono::Utc::now().date_naive() - Duration::days(365);
        (0..self.count).map(|i| self.one(i, epoch, rng)).collect()
    }

    /// sample and write straight to the dataset csv
    pub fn export(&self, path: &str) -> Result<(), Error> {
        super::ingest::write(path, &self.sample())
    }

    fn one<R: Rng>(&self, i: usize, epoch: chrono::NaiveDate, rng: &mut R) -> Expense {
        let requester_id = format!("U{}", rng.random_range(0..5000));
        let traveller_id = match rng.random::<f64>() < 0.2 {
            true => format!("U{}", rng.random_range(0..5000)),
            false => requester_id.clone(),
        };
        let approver_id = match rng.random::<f64>() < 0.03 {
            true => requester_id.clone(),
            false => format!("A{}", rng.random_range(0..800)),
        };

        let lead = rng.random_range(0..300);
        let lag = match rng.random::<f64>() < 0.02 {
            true => lead - rng.random_range(0..5),
            false => lead + rng.random_range(0..30),
        };
        let request_date = epoch + Duration::days(lead);
        let travel_date = epoch + Duration::days(lag);

        let category = *CATEGORIES.choose(rng).expect("nonempty vocabulary");
        let description = format!(
            "{} {} {}",
            category,
            WORDS.choose(rng).expect("nonempty vocabulary"),
            WORDS.choose(rng).expect("nonempty vocabulary"),
        );

        let mut amount = rng.random::<f64>() * 450. + 10.;
        let rounded = rng.random::<f64>() < 0.25;
        let fived = rng.random::<f64>() < 0.25;
        if rounded {
            amount = amount.trunc();
        }
        if fived {
            amount = (amount / 5.).trunc() * 5.;
        }

        let approval_status = if rng.random::<f64>() < 0.1 {
            "rejected"
        } else if rng.random::<f64>() < 0.1 {
            "pending"
        } else {
            "approved"
        };

        let mut score = 0.;
        let mut flags = 0;
        if approver_id == requester_id {
            score += 0.35;
            flags += 1;
        }
        if traveller_id == requester_id {
            score += 0.1;
            flags += 1;
        }
        if rounded {
            score += 0.15;
            flags += 1;
        }
        if fived {
            score += 0.15;
            flags += 1;
        }
        if travel_date < request_date {
            score += 0.3;
            flags += 1;
        }
        if category == "taxi" && amount > 200. {
            score += 0.2;
            flags += 1;
        }
        let fraud = match flags >= 2 || travel_date < request_date {
            true => 1,
            false => (rng.random::<f64>() < self.fraud_rate + score) as crate::Label,
        };

        Expense {
            expense_id: format!("E{}", 1000000 + i),
            request_id: format!("R{}", 500000 + i),
            requester_id,
            traveller_id,
            approver_id,
            request_date,
            travel_date,
            category: category.into(),
            description,
            amount,
            currency: "BRL".into(),
            job_title: (*JOB_TITLES.choose(rng).expect("nonempty vocabulary")).into(),
            department: (*DEPARTMENTS.choose(rng).expect("nonempty vocabulary")).into(),
            approval_status: approval_status.into(),
            fraud,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_stream_has_the_requested_shape() {
        let records = Generator::new(500, 0.08, 42).sample();
        assert!(records.len() == 500);
        assert!(records.iter().all(|e| e.amount >= 0.));
        assert!(records.iter().all(|e| !e.expense_id.is_empty()));
    }

    #[test]
    fn the_same_seed_replays_the_same_stream() {
        let a = Generator::new(200, 0.08, 7).sample();
        let b = Generator::new(200, 0.08, 7).sample();
        assert!(a == b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = Generator::new(200, 0.08, 1).sample();
        let b = Generator::new(200, 0.08, 2).sample();
        assert!(a != b);
    }

    #[test]
    fn both_labels_appear_at_a_realistic_rate() {
        let records = Generator::new(2000, 0.08, 11).sample();
        let frauds = records.iter().filter(|e| e.fraud == 1).count();
        let rate = frauds as f64 / records.len() as f64;
        assert!(rate > 0.02);
        assert!(rate < 0.6);
    }

    #[test]
    fn inverted_trips_are_always_fraud() {
        let records = Generator::new(3000, 0.08, 5).sample();
        assert!(
            records
                .iter()
                .filter(|e| e.travel_date < e.request_date)
                .all(|e| e.fraud == 1)
        );
    }
}
