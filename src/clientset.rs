use std::fmt;
use std::iter::FromIterator;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type Client = usize;
const CLIENTSET_WORDS: usize = 2;
// 2 * u128 covers client ids 0..256

#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct ClientSet([u128; CLIENTSET_WORDS]);

impl ClientSet {
  pub fn new() -> Self {
    Self([0u128; CLIENTSET_WORDS])
  }

  pub fn iter<'a>(&'a self) -> impl Iterator<Item=Client> + 'a {
    self.0.iter()
      .enumerate()
      .flat_map(|(k, &bits)| Biterator::new(bits).map(move |i| i as Client + (k << 7)))
  }

  #[inline]
  pub fn insert(&mut self, c: Client) {
    let (word_index, bit_index) = Self::word_bit_index(c);
    self.0[word_index] |= 1 << bit_index;
  }

  #[inline]
  fn word_bit_index(c: Client) -> (usize, usize) {
    (c >> 7, c & 0x7f)
  }

  #[inline]
  pub fn contains(&self, c: Client) -> bool {
    let (word_index, bit_index) = Self::word_bit_index(c);
    (self.0[word_index] & (1 << bit_index)) != 0
  }

  pub fn union(&self, other: &Self) -> Self {
    let mut new = *self;
    new.union_inplace(other);
    new
  }

  pub fn union_inplace(&mut self, other: &Self) {
    self.0.iter_mut().zip(other.0.iter()).for_each(|(x, y)| *x |= y);
  }

  #[inline]
  pub fn subset(&self, other: &Self) -> bool {
    self.0.iter().zip(other.0.iter()).all(|(x, y)| *x & y == *x)
  }

  pub fn len(&self) -> usize {
    self.0.iter().map(|w| w.count_ones() as usize).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.0.iter().all(|w| *w == 0)
  }
}


impl fmt::Debug for ClientSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set()
      .entries(self.iter())
      .finish()
  }
}

impl FromIterator<Client> for ClientSet {
  fn from_iter<I: IntoIterator<Item=Client>>(iter: I) -> Self {
    let mut set = Self::new();
    for c in iter {
      set.insert(c);
    }
    set
  }
}

// Serialized as the sorted list of client ids
impl Serialize for ClientSet {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(self.iter())
  }
}

impl<'de> Deserialize<'de> for ClientSet {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let clients = Vec::<Client>::deserialize(deserializer)?;
    if let Some(c) = clients.iter().find(|&&c| c >= CLIENTSET_WORDS * 128) {
      return Err(serde::de::Error::custom(format!("client id {c} does not fit in a client set")));
    }
    Ok(clients.into_iter().collect())
  }
}


pub struct Biterator {
  bits : u128,
  ones : u32,
  next_index: u32,
}

impl Biterator {
  pub fn new(val : u128) -> Self {
    Self{ bits: val, ones: 0, next_index: 0 }
  }
}

impl Iterator for Biterator {
  type Item = u32;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if self.ones > 0 {
        let val = self.next_index;
        self.ones -= 1;
        self.next_index += 1;
        return Some(val);
      } else if self.bits == 0 {
        return None;
      }
      let nz = self.bits.trailing_zeros();
      self.bits >>= nz;
      self.next_index += nz;
      let no = (!self.bits).trailing_zeros();
      self.ones = no;
      // a run reaching the top bit would shift by 128
      self.bits = self.bits.checked_shr(no).unwrap_or(0);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_insert_contains() {
    let mut set = ClientSet::new();
    set.insert(1);
    set.insert(9);
    set.insert(200);
    assert!(set.contains(1));
    assert!(set.contains(200));
    assert!(!set.contains(2));
    assert_eq!(set.len(), 3);
  }

  #[test]
  fn test_iter_sorted_across_words() {
    let set: ClientSet = [130, 3, 127, 128, 4].into_iter().collect();
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 4, 127, 128, 130]);
  }

  #[test]
  fn test_iter_top_bit() {
    let set: ClientSet = [126, 127, 254, 255].into_iter().collect();
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![126, 127, 254, 255]);
  }

  #[test]
  fn test_union() {
    let a: ClientSet = [1, 2, 3].into_iter().collect();
    let b: ClientSet = [3, 4].into_iter().collect();
    let u = a.union(&b);
    assert_eq!(u.len(), 4);
    assert!(a.subset(&u));
    assert!(b.subset(&u));
    assert!(!u.subset(&a));
  }

  #[test]
  fn test_empty() {
    let set = ClientSet::new();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
    assert_eq!(format!("{:?}", set), "{}");
  }

  #[test]
  fn test_serde() {
    let set: ClientSet = serde_json::from_str("[5, 1, 9]").unwrap();
    assert_eq!(serde_json::to_string(&set).unwrap(), "[1,5,9]");
    assert!(serde_json::from_str::<ClientSet>("[256]").is_err());
  }
}
