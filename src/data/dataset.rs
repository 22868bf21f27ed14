use crate::Label;
use rand::Rng;
use rand::seq::SliceRandom;

/// an in-memory training set: dense rows paired with binary labels.
/// row order carries no meaning, but every shuffle keeps the pairing.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Label>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.y.iter().filter(|&&l| l == 1).count()
    }

    fn gather(&self, order: &[usize]) -> Self {
        Self {
            x: order.iter().map(|&i| self.x[i].clone()).collect(),
            y: order.iter().map(|&i| self.y[i]).collect(),
        }
    }

    /// random permutation preserving the (x, y) pairing
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order = (0..self.len()).collect::<Vec<_>>();
        order.shuffle(rng);
        *self = self.gather(&order);
    }

    /// stratified split: each class is permuted and cut at the ratio,
    /// then both halves are shuffled so classes intermix again.
    pub fn split<R: Rng>(&self, ratio: f64, rng: &mut R) -> (Self, Self) {
        let mut kept = vec![];
        let mut held = vec![];
        for class in [1u8, 0u8] {
            let mut members = (0..self.len())
                .filter(|&i| self.y[i] == class)
                .collect::<Vec<_>>();
            members.shuffle(rng);
            let cut = (ratio * members.len() as f64) as usize;
            kept.extend_from_slice(&members[..cut]);
            held.extend_from_slice(&members[cut..]);
        }
        kept.shuffle(rng);
        held.shuffle(rng);
        (self.gather(&kept), self.gather(&held))
    }
}

impl From<Vec<crate::data::expense::Expense>> for Dataset {
    fn from(records: Vec<crate::data::expense::Expense>) -> Self {
        let y = records.iter().map(|e| e.fraud).collect();
        let x = records.iter().map(crate::features::vectorize).collect();
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    /// rows tagged so the label is recoverable from the row itself
    fn tagged(n: usize) -> Dataset {
        Dataset {
            x: (0..n).map(|i| vec![i as f64]).collect(),
            y: (0..n).map(|i| (i % 4 == 0) as Label).collect(),
        }
    }

    fn paired(set: &Dataset) -> bool {
        set.x
            .iter()
            .zip(set.y.iter())
            .all(|(row, &label)| ((row[0] as usize) % 4 == 0) as Label == label)
    }

    #[test]
    fn shuffling_keeps_the_pairing() {
        let ref mut rng = SmallRng::seed_from_u64(3);
        let mut set = tagged(100);
        set.shuffle(rng);
        assert!(set.len() == 100);
        assert!(paired(&set));
        assert!(set.positives() == 25);
    }

    #[test]
    fn the_split_is_stratified() {
        let ref mut rng = SmallRng::seed_from_u64(9);
        let set = tagged(200);
        let (train, test) = set.split(0.8, rng);
        assert!(train.len() == 160);
        assert!(test.len() == 40);
        assert!(train.positives() == 40);
        assert!(test.positives() == 10);
        assert!(paired(&train));
        assert!(paired(&test));
    }

    #[test]
    fn split_halves_interleave_the_classes() {
        let ref mut rng = SmallRng::seed_from_u64(4);
        let (train, _) = tagged(400).split(0.8, rng);
        // all positives up front would mean the shuffle never happened
        let front = &train.y[..train.len() / 4];
        assert!(front.iter().any(|&l| l == 0));
    }
}
