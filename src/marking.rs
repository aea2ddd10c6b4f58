use anyhow::{Result, anyhow};
use std::fmt::{Debug, Display, Formatter};

/// A multiset of tokens over the places of a net. Markings compare by value.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Marking {
    pub(crate) place2token: Vec<u64>, //for each place: number of tokens in that place
}

impl Marking {
    pub fn new(size: usize) -> Self {
        Marking {
            place2token: vec![0; size],
        }
    }

    pub fn get_place2token(&self) -> &Vec<u64> {
        &self.place2token
    }

    pub fn get_number_of_places(&self) -> usize {
        self.place2token.len()
    }

    pub fn get_tokens(&self, place: usize) -> u64 {
        self.place2token[place]
    }

    pub fn increase(&mut self, place: usize, amount: u64) -> Result<()> {
        self.place2token[place] = self.place2token[place]
            .checked_add(amount)
            .ok_or_else(|| {
                anyhow!(
                    "tried to put too many tokens in a marking for place {}",
                    place
                )
            })?;
        Ok(())
    }

    pub fn decrease(&mut self, place: usize, amount: u64) -> Result<()> {
        if self.place2token[place] < amount {
            return Err(anyhow!(
                "tried to obtain a negative number of tokens in a marking for place {}",
                place
            ));
        }
        self.place2token[place] -= amount;
        Ok(())
    }

    pub fn add_place(&mut self) {
        self.place2token.push(0);
    }

    /// The marking of the disjoint union of two nets: the places of `other` follow the places of `self`.
    pub fn concatenate(&self, other: &Self) -> Self {
        let mut place2token = Vec::with_capacity(self.place2token.len() + other.place2token.len());
        place2token.extend_from_slice(&self.place2token);
        place2token.extend_from_slice(&other.place2token);
        Self { place2token }
    }

    pub fn is_empty(&self) -> bool {
        self.place2token.iter().all(|tokens| *tokens == 0)
    }
}

impl From<Vec<u64>> for Marking {
    fn from(value: Vec<u64>) -> Self {
        Self { place2token: value }
    }
}

impl Display for Marking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (place, multiplicity) in self.place2token.iter().enumerate() {
            if *multiplicity > 0 {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{}:{}", place, multiplicity)?;
            }
        }
        write!(f, "}}")
    }
}

impl Debug for Marking {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::Marking;

    #[test]
    fn marking_value_semantics() {
        let mut a = Marking::new(2);
        a.increase(1, 2).unwrap();
        let b = Marking::from(vec![0, 2]);

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{1:2}");
    }

    #[test]
    fn marking_cannot_go_negative() {
        let mut a = Marking::from(vec![1, 0]);
        assert!(a.decrease(1, 1).is_err());
        a.decrease(0, 1).unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn marking_concatenate() {
        let a = Marking::from(vec![1, 0]);
        let b = Marking::from(vec![0, 0, 3]);
        assert_eq!(a.concatenate(&b), Marking::from(vec![1, 0, 0, 0, 3]));
    }
}
