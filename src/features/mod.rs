use crate::data::expense::Expense;

/// canonical category vocabulary, one-hot encoded in vector order
pub const CATEGORIES: [&str; 5] = ["meals", "transport", "taxi", "toll", "lodging"];

/// fixed width of the feature vector
pub const WIDTH: usize = 8 + CATEGORIES.len();

/// feature slot names, aligned with [`vectorize`]
pub fn names() -> Vec<String> {
    let mut names = vec![
        "amount".to_string(),
        "lead_days".to_string(),
        "weekday".to_string(),
        "month".to_string(),
        "same_approver".to_string(),
        "requester_is_traveller".to_string(),
        "whole_amount".to_string(),
        "multiple_of_five".to_string(),
    ];
    names.extend(CATEGORIES.iter().map(|c| format!("cat_{}", c)));
    names
}

/// expense record to the fixed-width ordered vector the learners eat.
/// feature semantics stop here, downstream every slot is just a scalar.
pub fn vectorize(e: &Expense) -> Vec<f64> {
    let mut v = Vec::with_capacity(WIDTH);
    v.push(e.amount);
    v.push(e.lead_days() as f64);
    v.push(e.weekday() as f64);
    v.push(e.month() as f64);
    v.push(flag(e.approver_id == e.requester_id));
    v.push(flag(e.requester_id == e.traveller_id));
    v.push(flag(e.amount == e.amount.trunc()));
    v.push(flag((e.amount as i64) % 5 == 0));
    let category = e.category.to_lowercase();
    for c in CATEGORIES {
        v.push(flag(c == category));
    }
    v
}

fn flag(on: bool) -> f64 {
    match on {
        true => 1.,
        false => 0.,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arbitrary;
    use chrono::NaiveDate;

    fn fixture() -> Expense {
        Expense {
            expense_id: "E1".into(),
            request_id: "R1".into(),
            requester_id: "U7".into(),
            traveller_id: "U7".into(),
            approver_id: "U7".into(),
            request_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), // a monday
            travel_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            category: "Taxi".into(),
            description: "cab client".into(),
            amount: 245.,
            currency: "BRL".into(),
            job_title: "manager".into(),
            department: "sales".into(),
            approval_status: "approved".into(),
            fraud: 1,
        }
    }

    #[test]
    fn the_vector_matches_the_slot_layout() {
        let v = vectorize(&fixture());
        assert!(v.len() == WIDTH);
        assert!(v[0] == 245.); // amount
        assert!(v[1] == 10.); // lead days
        assert!(v[2] == 1.); // monday
        assert!(v[3] == 3.); // march
        assert!(v[4] == 1.); // approver is requester
        assert!(v[5] == 1.); // requester travels
        assert!(v[6] == 1.); // whole amount
        assert!(v[7] == 1.); // multiple of five
        assert!(v[8..] == [0., 0., 1., 0., 0.]); // taxi one-hot
    }

    #[test]
    fn category_matching_ignores_case() {
        let mut e = fixture();
        e.category = "LODGING".into();
        let v = vectorize(&e);
        assert!(v[8..] == [0., 0., 0., 0., 1.]);
    }

    #[test]
    fn unknown_categories_encode_to_nothing() {
        let mut e = fixture();
        e.category = "supplies".into();
        let v = vectorize(&e);
        assert!(v[8..].iter().all(|&b| b == 0.));
    }

    #[test]
    fn every_vector_has_the_same_width() {
        for _ in 0..32 {
            assert!(vectorize(&Expense::random()).len() == WIDTH);
        }
    }

    #[test]
    fn names_align_with_the_width() {
        assert!(names().len() == WIDTH);
    }
}
