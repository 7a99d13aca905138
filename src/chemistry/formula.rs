//! Molecular formulas
//!
//! Formulas are element counts in first-seen order. Heavy isotopes are
//! separate symbols with a trailing prime (`C'`, `N'`, `O'`, `O"`, `H'`,
//! `Cl'`, `Br'`), and `D` is accepted as an alias for `H'`. A single `-`
//! subtracts the right-hand side (`C12H5-H2`).

use std::fmt;
use std::str::FromStr;

use super::elements::{element_masses, is_heavy_symbol, light_symbol, MassType};
use super::ChemistryError;

/// Ordered element counts
#[derive(Debug, Clone, Default)]
pub struct Formula {
    counts: Vec<(String, i32)>,
}

impl Formula {
    /// The empty formula
    pub const fn new() -> Self {
        Self { counts: Vec::new() }
    }

    /// Parse formula text
    pub fn parse(text: &str) -> Result<Self, ChemistryError> {
        let text = text.trim();
        let (plus, minus) = match text.split_once('-') {
            Some((left, right)) => (left, Some(right)),
            None => (text, None),
        };
        let mut formula = Self::parse_terms(plus, text)?;
        if let Some(minus) = minus {
            if minus.contains('-') {
                return Err(ChemistryError::InvalidFormula(text.to_string()));
            }
            formula = formula.minus(&Self::parse_terms(minus, text)?);
        }
        Ok(formula)
    }

    fn parse_terms(part: &str, whole: &str) -> Result<Self, ChemistryError> {
        let mut formula = Self::new();
        let mut chars = part.chars().filter(|c| !c.is_whitespace()).peekable();
        while let Some(c) = chars.next() {
            if !c.is_ascii_uppercase() {
                return Err(ChemistryError::InvalidFormula(whole.to_string()));
            }
            let mut symbol = String::from(c);
            while let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() || next == '\'' || next == '"' {
                    symbol.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            let mut digits = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_digit() {
                    digits.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            let count = if digits.is_empty() {
                1
            } else {
                digits
                    .parse::<i32>()
                    .map_err(|_| ChemistryError::InvalidFormula(whole.to_string()))?
            };
            if symbol == "D" {
                symbol = "H'".to_string();
            }
            if element_masses(&symbol).is_none() {
                return Err(ChemistryError::UnknownElement {
                    symbol,
                    formula: whole.to_string(),
                });
            }
            formula.add(&symbol, count);
        }
        Ok(formula)
    }

    fn add(&mut self, symbol: &str, delta: i32) {
        match self.counts.iter_mut().find(|(s, _)| s == symbol) {
            Some((_, count)) => *count += delta,
            None => self.counts.push((symbol.to_string(), delta)),
        }
    }

    /// Whether no element has a non-zero count
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|(_, n)| *n == 0)
    }

    /// Count of one symbol
    pub fn count(&self, symbol: &str) -> i32 {
        self.counts
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Non-zero counts in first-seen order
    pub fn elements(&self) -> impl Iterator<Item = (&str, i32)> {
        self.counts
            .iter()
            .filter(|(_, n)| *n != 0)
            .map(|(s, n)| (s.as_str(), *n))
    }

    /// New formula with `delta` added to the count of `symbol`
    pub fn adjust_element_count(&self, symbol: &str, delta: i32) -> Self {
        let mut result = self.clone();
        result.add(symbol, delta);
        result
    }

    /// Element-wise sum
    pub fn plus(&self, other: &Formula) -> Self {
        let mut result = self.clone();
        for (symbol, count) in other.elements() {
            result.add(symbol, count);
        }
        result
    }

    /// Element-wise difference
    pub fn minus(&self, other: &Formula) -> Self {
        let mut result = self.clone();
        for (symbol, count) in other.elements() {
            result.add(symbol, -count);
        }
        result
    }

    /// Multiply every count
    pub fn times(&self, factor: i32) -> Self {
        Self {
            counts: self
                .counts
                .iter()
                .map(|(s, n)| (s.clone(), n * factor))
                .collect(),
        }
    }

    /// Whether any heavy isotope symbol is present
    pub fn has_isotopes(&self) -> bool {
        self.elements().any(|(s, _)| is_heavy_symbol(s))
    }

    /// Same formula with every heavy isotope replaced by its light element
    pub fn strip_isotopes(&self) -> Self {
        let mut result = Self::new();
        for (symbol, count) in self.elements() {
            result.add(light_symbol(symbol), count);
        }
        result
    }

    /// Mass of the formula
    pub fn mass(&self, mass_type: MassType) -> Result<f64, ChemistryError> {
        let mut total = 0.0;
        for (symbol, count) in self.elements() {
            let (mono, avg) =
                element_masses(symbol).ok_or_else(|| ChemistryError::UnknownElement {
                    symbol: symbol.to_string(),
                    formula: self.to_string(),
                })?;
            let mass = match mass_type {
                MassType::Monoisotopic => mono,
                MassType::Average => avg,
            };
            total += mass * count as f64;
        }
        Ok(total)
    }

    /// Monoisotopic mass
    pub fn monoisotopic_mass(&self) -> Result<f64, ChemistryError> {
        self.mass(MassType::Monoisotopic)
    }

    fn sorted(&self) -> Vec<(&str, i32)> {
        let mut v: Vec<_> = self.elements().collect();
        v.sort_unstable();
        v
    }
}

/// Heavy isotopes present in a formula, as (heavy symbol, count) pairs
pub fn find_isotope_labels_in_formula(formula: &Formula) -> Vec<(String, i32)> {
    formula
        .elements()
        .filter(|(s, n)| is_heavy_symbol(s) && *n > 0)
        .map(|(s, n)| (s.to_string(), n))
        .collect()
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl FromStr for Formula {
    type Err = ChemistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_part = |f: &mut fmt::Formatter<'_>, symbol: &str, count: i32| {
            if count == 1 {
                write!(f, "{symbol}")
            } else {
                write!(f, "{symbol}{count}")
            }
        };
        for (symbol, count) in self.elements().filter(|(_, n)| *n > 0) {
            write_part(f, symbol, count)?;
        }
        let mut negatives = self.elements().filter(|(_, n)| *n < 0).peekable();
        if negatives.peek().is_some() {
            write!(f, "-")?;
            for (symbol, count) in negatives {
                write_part(f, symbol, -count)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let formula = Formula::parse("C12H5O2").unwrap();
        assert_eq!(formula.count("C"), 12);
        assert_eq!(formula.count("H"), 5);
        assert_eq!(formula.count("N"), 0);
        assert_eq!(formula.to_string(), "C12H5O2");
    }

    #[test]
    fn test_heavy_symbols_and_alias() {
        let formula = Formula::parse("C'6C4N'2O\"D3").unwrap();
        assert_eq!(formula.count("C'"), 6);
        assert_eq!(formula.count("N'"), 2);
        assert_eq!(formula.count("O\""), 1);
        assert_eq!(formula.count("H'"), 3);
        assert!(formula.has_isotopes());
        let light = formula.strip_isotopes();
        assert_eq!(light.count("C"), 10);
        assert_eq!(light, Formula::parse("C10N2OH3").unwrap());
    }

    #[test]
    fn test_subtraction() {
        let formula = Formula::parse("C12H5-H2").unwrap();
        assert_eq!(formula, Formula::parse("C12H3").unwrap());
        assert!(Formula::parse("C2-H-O").is_err());
    }

    #[test]
    fn test_equality_ignores_order_and_zeros() {
        let a = Formula::parse("H5C12").unwrap();
        let b = Formula::parse("C12H5N").unwrap().adjust_element_count("N", -1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_element() {
        let err = Formula::parse("C2Xx").unwrap_err();
        assert!(matches!(err, ChemistryError::UnknownElement { .. }));
        assert!(Formula::parse("2C").is_err());
    }

    #[test]
    fn test_mass() {
        let water = Formula::parse("H2O").unwrap();
        let mass = water.monoisotopic_mass().unwrap();
        assert!((mass - 18.0105646837).abs() < 1e-6);
    }

    #[test]
    fn test_negative_display() {
        let formula = Formula::parse("C2").unwrap().adjust_element_count("H", -1);
        assert_eq!(formula.to_string(), "C2-H");
    }

    #[test]
    fn test_find_isotope_labels() {
        let formula = Formula::parse("C'12H5N'").unwrap();
        let labels = find_isotope_labels_in_formula(&formula);
        assert_eq!(labels, vec![("C'".to_string(), 12), ("N'".to_string(), 1)]);
    }
}
