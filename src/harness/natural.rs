//! Natural (human) ordering of file names
//!
//! Digit runs compare by numeric value and everything else compares case-insensitively, so `test2` sorts before
//! `test10` and `Test` ranks as `test`. A digit run sorts before any text at the same position. Names that are equal
//! under those rules fall back to plain byte order, which keeps the ordering total.

use std::cmp::Ordering;

/// Compare two names in natural order
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => cmp_chunk(x, y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

/// Sort names in place in natural order
pub fn sort_natural<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(char),
}

fn cmp_chunk(a: Chunk<'_>, b: Chunk<'_>) -> Ordering {
    match (a, b) {
        (Chunk::Number(x), Chunk::Number(y)) => cmp_digits(x, y),
        (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(y.to_lowercase()),
    }
}

/// Compare two ASCII digit runs by value without parsing (runs may exceed u128)
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let first = self.rest.chars().next()?;
        if first.is_ascii_digit() {
            let len = self.rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(self.rest.len());
            let (digits, rest) = self.rest.split_at(len);
            self.rest = rest;
            Some(Chunk::Number(digits))
        } else {
            self.rest = &self.rest[first.len_utf8()..];
            Some(Chunk::Text(first))
        }
    }
}
