//! Ionization adducts
//!
//! An adduct turns a neutral molecule into an ion: a charge, a molecule
//! multiplier, the atoms gained or lost, and optional isotope labels that
//! replace light atoms by heavy ones (or shift the mass by a raw amount).
//!
//! Accepted text forms:
//! - integer charges (`2`, `-1`), read as protonation
//! - bracketed descriptions `[M+H]`, `[2M+Na]`, `[M-H]-`, `[M2N15+2H]`,
//!   `[M1.0034+H]`, charge-only `[M+]` / `[M--]`

use std::fmt;

use super::elements::{
    element_masses, heavy_symbol_for_nickname, light_symbol, nickname_for_heavy_symbol, MassType,
    MASS_ELECTRON, MASS_PROTON,
};
use super::formula::Formula;
use super::ChemistryError;

/// Isotope labelling carried by an adduct
#[derive(Debug, Clone, PartialEq, Default)]
pub enum IsotopeLabels {
    /// No labels
    #[default]
    None,
    /// Whole-atom substitutions as (heavy symbol, count)
    Counts(Vec<(String, i32)>),
    /// Raw mass shift when no tidy atom count explains the difference
    MassShift(f64),
}

impl IsotopeLabels {
    fn mass(&self, mass_type: MassType) -> f64 {
        match self {
            IsotopeLabels::None => 0.0,
            IsotopeLabels::MassShift(shift) => *shift,
            IsotopeLabels::Counts(counts) => counts
                .iter()
                .filter_map(|(heavy, n)| {
                    let (heavy_mono, heavy_avg) = element_masses(heavy)?;
                    let (light_mono, light_avg) = element_masses(light_symbol(heavy))?;
                    let delta = match mass_type {
                        MassType::Monoisotopic => heavy_mono - light_mono,
                        MassType::Average => heavy_avg - light_avg,
                    };
                    Some(delta * *n as f64)
                })
                .sum(),
        }
    }
}

/// How the adduct was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdductKind {
    /// Peptide-style protonation from a bare charge
    Proteomic,
    /// Small-molecule adduct with an explicit composition
    Molecular,
    /// Charge with no mass contribution (`[M+]`)
    ChargeOnly,
}

/// A charge state plus the chemistry that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Adduct {
    charge: i32,
    multiplier: i32,
    composition: Formula,
    labels: IsotopeLabels,
    kind: AdductKind,
}

impl Default for Adduct {
    fn default() -> Self {
        Self::empty()
    }
}

/// Charge contributed by one unit of a known adduct species
fn species_charge(species: &str) -> i32 {
    match species {
        "H" | "Na" | "K" | "Li" | "NH4" | "Cs" => 1,
        "Cl" | "Br" | "I" | "F" | "HCOO" | "CH3COO" => -1,
        _ => 0,
    }
}

impl Adduct {
    /// No charge and no chemistry
    pub fn empty() -> Self {
        Self {
            charge: 0,
            multiplier: 1,
            composition: Formula::new(),
            labels: IsotopeLabels::None,
            kind: AdductKind::ChargeOnly,
        }
    }

    /// Peptide protonation (`+2` means two protons)
    pub fn from_charge_protonated(charge: i32) -> Self {
        Self {
            charge,
            multiplier: 1,
            composition: Formula::new().adjust_element_count("H", charge),
            labels: IsotopeLabels::None,
            kind: AdductKind::Proteomic,
        }
    }

    /// Small-molecule (de)protonation (`[M+H]`, `[M-2H]`)
    pub fn non_proteomic_protonated(charge: i32) -> Self {
        Self {
            kind: AdductKind::Molecular,
            ..Self::from_charge_protonated(charge)
        }
    }

    /// Charge only, the molecule mass already accounts for the ionization
    pub fn from_charge_no_mass(charge: i32) -> Self {
        Self {
            charge,
            multiplier: 1,
            composition: Formula::new(),
            labels: IsotopeLabels::None,
            kind: AdductKind::ChargeOnly,
        }
    }

    /// Parse adduct text, reading a bare integer as protonation.
    /// A missing or blank value is the empty adduct.
    pub fn from_string_assume_protonated(text: Option<&str>) -> Result<Self, ChemistryError> {
        match text.map(str::trim) {
            None | Some("") => Ok(Self::empty()),
            Some(text) => Self::parse(text),
        }
    }

    /// The adduct that explains the atoms of `ion` beyond `neutral`.
    /// Isotopes are compared as their light elements.
    pub fn from_formula_diff(ion: &Formula, neutral: &Formula, charge: i32) -> Self {
        Self {
            charge,
            multiplier: 1,
            composition: ion.strip_isotopes().minus(&neutral.strip_isotopes()),
            labels: IsotopeLabels::None,
            kind: AdductKind::Molecular,
        }
    }

    /// Parse adduct text
    pub fn parse(text: &str) -> Result<Self, ChemistryError> {
        let text = text.trim();
        let invalid = || ChemistryError::InvalidAdduct(text.to_string());
        if let Ok(charge) = text.trim_start_matches('+').parse::<i32>() {
            if charge == 0 {
                return Err(invalid());
            }
            return Ok(Self::from_charge_protonated(charge));
        }

        let (body, declared_charge) = match text.strip_prefix('[') {
            Some(rest) => {
                let (body, trailer) = rest.split_once(']').ok_or_else(invalid)?;
                (body, parse_trailing_charge(trailer).ok_or_else(invalid)?)
            }
            None => (text, None),
        };

        let m_pos = body.find('M').ok_or_else(invalid)?;
        let multiplier = match &body[..m_pos] {
            "" => 1,
            digits => digits.parse::<i32>().map_err(|_| invalid())?,
        };
        let rest = &body[m_pos + 1..];
        let ops_start = rest.find(['+', '-']).unwrap_or(rest.len());
        let labels = parse_labels(&rest[..ops_start]).ok_or_else(invalid)?;

        let mut composition = Formula::new();
        let mut charge = 0;
        let mut charge_only = true;
        let mut ops = &rest[ops_start..];
        while let Some(sign_char) = ops.chars().next() {
            let sign = if sign_char == '+' { 1 } else { -1 };
            ops = &ops[1..];
            let end = ops.find(['+', '-']).unwrap_or(ops.len());
            let term = &ops[..end];
            ops = &ops[end..];

            let digits_end = term
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(term.len());
            let count = match &term[..digits_end] {
                "" => 1,
                digits => digits.parse::<i32>().map_err(|_| invalid())?,
            };
            let species = &term[digits_end..];
            if species.is_empty() {
                charge += sign * count;
                continue;
            }
            charge_only = false;
            let species_formula = Formula::parse(species)?;
            composition = composition.plus(&species_formula.times(sign * count));
            charge += sign * count * species_charge(species);
        }

        if let Some(declared) = declared_charge {
            charge = declared;
        }
        if charge == 0 {
            return Err(invalid());
        }
        Ok(Self {
            charge,
            multiplier,
            composition,
            labels,
            kind: if charge_only {
                AdductKind::ChargeOnly
            } else {
                AdductKind::Molecular
            },
        })
    }

    /// Signed charge
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Absolute charge
    pub fn abs_charge(&self) -> i32 {
        self.charge.abs()
    }

    /// Whether this is the empty adduct
    pub fn is_empty(&self) -> bool {
        self.charge == 0
    }

    /// Whether this came from a bare peptide charge
    pub fn is_proteomic(&self) -> bool {
        self.kind == AdductKind::Proteomic
    }

    /// Whether the adduct contributes no mass
    pub fn is_charge_only(&self) -> bool {
        self.kind == AdductKind::ChargeOnly
    }

    /// Declaration kind
    pub fn kind(&self) -> AdductKind {
        self.kind
    }

    /// Atoms gained or lost
    pub fn composition(&self) -> &Formula {
        &self.composition
    }

    /// Isotope labels
    pub fn labels(&self) -> &IsotopeLabels {
        &self.labels
    }

    fn is_protonation(&self) -> bool {
        self.composition == Formula::new().adjust_element_count("H", self.charge)
    }

    /// Same adduct with labels given as (heavy symbol, count) pairs
    pub fn with_label_counts(&self, counts: Vec<(String, i32)>) -> Self {
        let labels = if counts.is_empty() {
            IsotopeLabels::None
        } else {
            IsotopeLabels::Counts(counts)
        };
        Self {
            labels,
            ..self.clone()
        }
    }

    /// Same adduct with a raw label mass shift
    pub fn with_label_mass(&self, shift: f64) -> Self {
        let labels = if shift == 0.0 {
            IsotopeLabels::None
        } else {
            IsotopeLabels::MassShift(shift)
        };
        Self {
            labels,
            ..self.clone()
        }
    }

    /// Same adduct without isotope labels
    pub fn unlabeled(&self) -> Self {
        Self {
            labels: IsotopeLabels::None,
            ..self.clone()
        }
    }

    /// Ion formula for a neutral formula
    pub fn apply_to_formula(&self, neutral: &Formula) -> Formula {
        let mut ion = neutral.times(self.multiplier).plus(&self.composition);
        if let IsotopeLabels::Counts(counts) = &self.labels {
            for (heavy, n) in counts {
                ion = ion
                    .adjust_element_count(light_symbol(heavy), -n)
                    .adjust_element_count(heavy, *n);
            }
        }
        ion
    }

    /// Mass added to `multiplier * M` before dividing by the charge
    fn ion_shift(&self, mass_type: MassType) -> f64 {
        if self.is_charge_only() {
            return 0.0;
        }
        if self.is_protonation() {
            return self.charge as f64 * MASS_PROTON;
        }
        let composition = self.composition.mass(mass_type).unwrap_or_default();
        composition - self.charge as f64 * MASS_ELECTRON
    }

    /// m/z of the ion formed from a neutral mass
    pub fn apply_to_mass(&self, neutral_mass: f64, mass_type: MassType) -> f64 {
        if self.is_empty() {
            return neutral_mass;
        }
        let ion_mass = self.multiplier as f64 * neutral_mass
            + self.ion_shift(mass_type)
            + self.labels.mass(mass_type);
        ion_mass / self.abs_charge() as f64
    }

    /// Neutral mass that would produce `mz` with this adduct
    pub fn mass_from_mz(&self, mz: f64, mass_type: MassType) -> f64 {
        if self.is_empty() {
            return mz;
        }
        let ion_mass = mz * self.abs_charge() as f64;
        (ion_mass - self.ion_shift(mass_type) - self.labels.mass(mass_type))
            / self.multiplier as f64
    }
}

/// `+`, `2+`, `+2`, `-`, `--` after the closing bracket
fn parse_trailing_charge(trailer: &str) -> Option<Option<i32>> {
    let trailer = trailer.trim();
    if trailer.is_empty() {
        return Some(None);
    }
    let signs = trailer.chars().filter(|c| *c == '+' || *c == '-').count();
    let negative = trailer.contains('-');
    if signs == 0 || (negative && trailer.contains('+')) {
        return None;
    }
    let digits: String = trailer.chars().filter(|c| c.is_ascii_digit()).collect();
    let magnitude = if digits.is_empty() {
        signs as i32
    } else {
        digits.parse::<i32>().ok()?
    };
    Some(Some(if negative { -magnitude } else { magnitude }))
}

/// Label segment between `M` and the first operator: `2N15C13` or `1.0034`
fn parse_labels(segment: &str) -> Option<IsotopeLabels> {
    if segment.is_empty() {
        return Some(IsotopeLabels::None);
    }
    if segment.contains('.') {
        return segment.parse::<f64>().ok().map(IsotopeLabels::MassShift);
    }
    let mut counts = Vec::new();
    let mut chars = segment.chars().peekable();
    while chars.peek().is_some() {
        let mut digits = String::new();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            chars.next();
        }
        let mut nickname = String::new();
        match chars.next() {
            Some(c) if c.is_ascii_uppercase() => nickname.push(c),
            _ => return None,
        }
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_lowercase) {
            nickname.push(c);
            chars.next();
        }
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            nickname.push(c);
            chars.next();
        }
        let count = if digits.is_empty() {
            1
        } else {
            digits.parse::<i32>().ok()?
        };
        let heavy = heavy_symbol_for_nickname(&nickname)?;
        counts.push((heavy.to_string(), count));
    }
    Some(IsotopeLabels::Counts(counts))
}

/// Split `C12H5[M+2H]` into the neutral formula and its adduct.
///
/// Returns `None` when the text carries no adduct.
pub fn split_formula_with_adduct(text: &str) -> Result<Option<(Formula, Adduct)>, ChemistryError> {
    let text = text.trim();
    match text.find('[') {
        None => Ok(None),
        Some(pos) => {
            let formula = Formula::parse(&text[..pos])?;
            let adduct = Adduct::parse(&text[pos..])?;
            Ok(Some((formula, adduct)))
        }
    }
}

impl fmt::Display for Adduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        if self.is_proteomic() {
            return write!(f, "{:+}", self.charge);
        }
        write!(f, "[")?;
        if self.multiplier != 1 {
            write!(f, "{}", self.multiplier)?;
        }
        write!(f, "M")?;
        match &self.labels {
            IsotopeLabels::None => {}
            IsotopeLabels::MassShift(shift) => write!(f, "{shift:.6}")?,
            IsotopeLabels::Counts(counts) => {
                for (heavy, n) in counts {
                    let nickname = nickname_for_heavy_symbol(heavy).unwrap_or(heavy);
                    if *n == 1 {
                        write!(f, "{nickname}")?;
                    } else {
                        write!(f, "{n}{nickname}")?;
                    }
                }
            }
        }
        if self.is_charge_only() {
            let sign = if self.charge > 0 { "+" } else { "-" };
            write!(f, "{}", sign.repeat(self.abs_charge() as usize))?;
        } else {
            for (symbol, n) in self.composition.elements() {
                let sign = if n > 0 { '+' } else { '-' };
                if n.abs() == 1 {
                    write!(f, "{sign}{symbol}")?;
                } else {
                    write!(f, "{sign}{}{symbol}", n.abs())?;
                }
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_integer_charge_is_protonation() {
        let adduct = Adduct::parse("2").unwrap();
        assert!(adduct.is_proteomic());
        assert_eq!(adduct.charge(), 2);
        assert_eq!(adduct, Adduct::from_charge_protonated(2));
        assert!(approx(
            adduct.apply_to_mass(1000.0, MassType::Monoisotopic),
            (1000.0 + 2.0 * MASS_PROTON) / 2.0
        ));
    }

    #[test]
    fn test_bracketed_forms() {
        let h = Adduct::parse("[M+H]").unwrap();
        assert_eq!(h.charge(), 1);
        assert_eq!(h, Adduct::non_proteomic_protonated(1));

        let na = Adduct::parse("[M+Na]+").unwrap();
        assert_eq!(na.charge(), 1);
        assert_eq!(na.composition().count("Na"), 1);

        let deprot = Adduct::parse("[M-H]").unwrap();
        assert_eq!(deprot.charge(), -1);

        let dimer = Adduct::parse("[2M+2H]2+").unwrap();
        assert_eq!(dimer.charge(), 2);
        let neutral = Formula::parse("C2H4").unwrap();
        assert_eq!(dimer.apply_to_formula(&neutral), Formula::parse("C4H10").unwrap());
    }

    #[test]
    fn test_charge_only() {
        let plus = Adduct::parse("[M+]").unwrap();
        assert!(plus.is_charge_only());
        assert_eq!(plus, Adduct::from_charge_no_mass(1));
        let minus = Adduct::parse("[M--]").unwrap();
        assert_eq!(minus.charge(), -2);
        assert!(approx(minus.apply_to_mass(300.0, MassType::Monoisotopic), 150.0));
    }

    #[test]
    fn test_label_counts() {
        let adduct = Adduct::parse("[M2N15+H]").unwrap();
        assert_eq!(
            adduct.labels(),
            &IsotopeLabels::Counts(vec![("N'".to_string(), 2)])
        );
        let neutral = Formula::parse("C10N3").unwrap();
        let ion = adduct.apply_to_formula(&neutral);
        assert_eq!(ion, Formula::parse("C10NN'2H").unwrap());
        assert_eq!(adduct.to_string(), "[M2N15+H]");
        assert_eq!(adduct.unlabeled(), Adduct::non_proteomic_protonated(1));
    }

    #[test]
    fn test_label_mass_shift() {
        let adduct = Adduct::parse("[M1.5+H]").unwrap();
        assert_eq!(adduct.labels(), &IsotopeLabels::MassShift(1.5));
        let light = Adduct::non_proteomic_protonated(1);
        let diff = adduct.apply_to_mass(100.0, MassType::Monoisotopic)
            - light.apply_to_mass(100.0, MassType::Monoisotopic);
        assert!(approx(diff, 1.5));
        assert_eq!(light.with_label_mass(0.0), light);
    }

    #[test]
    fn test_mass_from_mz_inverts_apply() {
        for adduct in [
            Adduct::parse("[M+Na]").unwrap(),
            Adduct::parse("[M-H]").unwrap(),
            Adduct::from_charge_protonated(3),
            Adduct::from_charge_no_mass(2),
        ] {
            let mz = adduct.apply_to_mass(523.25, MassType::Monoisotopic);
            assert!(approx(adduct.mass_from_mz(mz, MassType::Monoisotopic), 523.25));
        }
    }

    #[test]
    fn test_formula_diff() {
        let ion = Formula::parse("C'12H6").unwrap();
        let neutral = Formula::parse("C12H4").unwrap();
        let adduct = Adduct::from_formula_diff(&ion, &neutral, 2);
        assert_eq!(adduct, Adduct::non_proteomic_protonated(2));
    }

    #[test]
    fn test_split_formula_with_adduct() {
        let (formula, adduct) = split_formula_with_adduct("C12H5[M+2H]").unwrap().unwrap();
        assert_eq!(formula, Formula::parse("C12H5").unwrap());
        assert_eq!(adduct.charge(), 2);
        assert!(split_formula_with_adduct("C12H5").unwrap().is_none());
        assert!(split_formula_with_adduct("C12H5[M+").is_err());
    }

    #[test]
    fn test_empty_and_invalid() {
        assert!(Adduct::from_string_assume_protonated(None).unwrap().is_empty());
        assert!(Adduct::from_string_assume_protonated(Some(" ")).unwrap().is_empty());
        assert!(Adduct::parse("[M]").is_err());
        assert!(Adduct::parse("0").is_err());
        assert!(Adduct::parse("banana").is_err());
    }
}
