//! Element masses and isotope symbols

use serde::{Deserialize, Serialize};

/// Monoisotopic mass of a proton
pub const MASS_PROTON: f64 = 1.007276466812;

/// Mass of an electron
pub const MASS_ELECTRON: f64 = 0.00054857990946;

/// Monoisotopic mass of a hydrogen atom
pub const MASS_HYDROGEN: f64 = 1.007825035;

/// Spacing between isotope peaks (13C - 12C)
pub const MASS_SHIFT_C13: f64 = 1.0033548378;

/// Which mass of an element or molecule to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MassType {
    /// Mass of the most common isotope
    #[default]
    Monoisotopic,
    /// Natural-abundance weighted mass
    Average,
}

impl MassType {
    /// Parse the settings attribute value (`Monoisotopic` / `Average`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "monoisotopic" => Some(Self::Monoisotopic),
            "average" => Some(Self::Average),
            _ => None,
        }
    }
}

/// (symbol, monoisotopic, average). Monoisotopic is the most abundant
/// isotope; elements without a stable isotope use their longest-lived one.
const ELEMENTS: &[(&str, f64, f64)] = &[
    ("H", 1.007825035, 1.00794),
    ("H'", 2.014101779, 2.014101779),
    ("He", 4.00260325415, 4.002602),
    ("Li", 7.01600455, 6.941),
    ("Be", 9.0121822, 9.012182),
    ("B", 11.0093054, 10.811),
    ("C", 12.0, 12.0107),
    ("C'", 13.0033548378, 13.0033548378),
    ("N", 14.003074, 14.0067),
    ("N'", 15.0001088984, 15.0001088984),
    ("O", 15.99491463, 15.9994),
    ("O'", 17.9991604, 17.9991604),
    ("O\"", 16.9991315, 16.9991315),
    ("F", 18.99840322, 18.9984032),
    ("Ne", 19.9924401754, 20.1797),
    ("Na", 22.98976928, 22.98976928),
    ("Mg", 23.9850417, 24.305),
    ("Al", 26.98153863, 26.9815386),
    ("Si", 27.9769265325, 28.0855),
    ("P", 30.973762, 30.973761),
    ("S", 31.9720707, 32.065),
    ("Cl", 34.96885268, 35.453),
    ("Cl'", 36.96590259, 36.96590259),
    ("Ar", 39.9623831225, 39.948),
    ("K", 38.9637069, 39.0983),
    ("Ca", 39.96259098, 40.078),
    ("Sc", 44.9559119, 44.955912),
    ("Ti", 47.9479463, 47.867),
    ("V", 50.9439595, 50.9415),
    ("Cr", 51.9405075, 51.9961),
    ("Mn", 54.9380451, 54.938045),
    ("Fe", 55.9349375, 55.845),
    ("Co", 58.933195, 58.933195),
    ("Ni", 57.9353429, 58.6934),
    ("Cu", 62.9295975, 63.546),
    ("Zn", 63.9291422, 65.38),
    ("Ga", 68.9255736, 69.723),
    ("Ge", 73.9211778, 72.64),
    ("As", 74.9215965, 74.9216),
    ("Se", 79.9165196, 78.96),
    ("Br", 78.9183371, 79.904),
    ("Br'", 80.9162906, 80.9162906),
    ("Kr", 83.911507, 83.798),
    ("Rb", 84.911789738, 85.4678),
    ("Sr", 87.9056121, 87.62),
    ("Y", 88.9058483, 88.90585),
    ("Zr", 89.9047044, 91.224),
    ("Nb", 92.9063781, 92.90638),
    ("Mo", 97.9054082, 95.96),
    ("Tc", 97.907216, 98.0),
    ("Ru", 101.9043493, 101.07),
    ("Rh", 102.905504, 102.9055),
    ("Pd", 105.903486, 106.42),
    ("Ag", 106.905097, 107.8682),
    ("Cd", 113.9033585, 112.411),
    ("In", 114.903878, 114.818),
    ("Sn", 119.9021947, 118.71),
    ("Sb", 120.9038157, 121.76),
    ("Te", 129.9062244, 127.6),
    ("I", 126.904473, 126.90447),
    ("Xe", 131.9041535, 131.293),
    ("Cs", 132.905451933, 132.9054519),
    ("Ba", 137.9052472, 137.327),
    ("La", 138.9063533, 138.90547),
    ("Ce", 139.9054387, 140.116),
    ("Pr", 140.9076528, 140.90765),
    ("Nd", 141.9077233, 144.242),
    ("Pm", 144.912749, 145.0),
    ("Sm", 151.9197324, 150.36),
    ("Eu", 152.9212303, 151.964),
    ("Gd", 157.9241039, 157.25),
    ("Tb", 158.9253468, 158.92535),
    ("Dy", 163.9291748, 162.5),
    ("Ho", 164.9303221, 164.93032),
    ("Er", 165.9302931, 167.259),
    ("Tm", 168.9342133, 168.93421),
    ("Yb", 173.9388621, 173.054),
    ("Lu", 174.9407718, 174.9668),
    ("Hf", 179.94655, 178.49),
    ("Ta", 180.9479958, 180.94788),
    ("W", 183.9509312, 183.84),
    ("Re", 186.9557531, 186.207),
    ("Os", 191.9614807, 190.23),
    ("Ir", 192.9629264, 192.217),
    ("Pt", 194.9647911, 195.084),
    ("Au", 196.9665687, 196.966569),
    ("Hg", 201.970643, 200.59),
    ("Tl", 204.9744275, 204.3833),
    ("Pb", 207.9766521, 207.2),
    ("Bi", 208.9803987, 208.9804),
    ("Po", 208.9824304, 209.0),
    ("At", 209.987148, 210.0),
    ("Rn", 222.0175777, 222.0),
    ("Fr", 223.0197359, 223.0),
    ("Ra", 226.0254098, 226.0),
    ("Ac", 227.0277521, 227.0),
    ("Th", 232.0380553, 232.03806),
    ("Pa", 231.035884, 231.03588),
    ("U", 238.0507882, 238.02891),
    ("Np", 237.0481734, 237.0),
    ("Pu", 244.064204, 244.0),
    ("Am", 243.0613811, 243.0),
    ("Cm", 247.070354, 247.0),
    ("Bk", 247.070307, 247.0),
    ("Cf", 251.079587, 251.0),
    ("Es", 252.08298, 252.0),
    ("Fm", 257.095105, 257.0),
    ("Md", 258.098431, 258.0),
    ("No", 259.10103, 259.0),
    ("Lr", 262.10963, 262.0),
];

/// Adduct label nicknames (`2N15` in `[M2N15+H]`) and the heavy symbols they stand for
const ISOTOPE_NICKNAMES: &[(&str, &str)] = &[
    ("C13", "C'"),
    ("N15", "N'"),
    ("O18", "O'"),
    ("O17", "O\""),
    ("H2", "H'"),
    ("D", "H'"),
    ("Cl37", "Cl'"),
    ("Br81", "Br'"),
];

/// Monoisotopic and average masses of an element symbol
pub fn element_masses(symbol: &str) -> Option<(f64, f64)> {
    ELEMENTS
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|&(_, mono, avg)| (mono, avg))
}

/// Light counterpart of a heavy isotope symbol (`N'` -> `N`)
pub fn light_symbol(symbol: &str) -> &str {
    symbol.trim_end_matches(['\'', '"'])
}

/// Heavy symbol for an adduct label nickname (`N15` -> `N'`)
pub fn heavy_symbol_for_nickname(nickname: &str) -> Option<&'static str> {
    ISOTOPE_NICKNAMES
        .iter()
        .find(|(n, _)| *n == nickname)
        .map(|&(_, heavy)| heavy)
}

/// Nickname used in adduct text for a heavy symbol (`N'` -> `N15`)
pub fn nickname_for_heavy_symbol(symbol: &str) -> Option<&'static str> {
    ISOTOPE_NICKNAMES
        .iter()
        .find(|(_, heavy)| *heavy == symbol)
        .map(|&(nickname, _)| nickname)
}

/// Whether a symbol denotes a heavy isotope
pub(crate) fn is_heavy_symbol(symbol: &str) -> bool {
    symbol.ends_with(['\'', '"'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hydrogen_is_proton_plus_electron() {
        // The binding energy makes these differ only in the 8th decimal
        assert!((MASS_HYDROGEN - (MASS_PROTON + MASS_ELECTRON)).abs() < 1e-7);
    }

    #[test]
    fn test_nickname_round_trip() {
        assert_eq!(heavy_symbol_for_nickname("N15"), Some("N'"));
        assert_eq!(nickname_for_heavy_symbol("N'"), Some("N15"));
        assert_eq!(light_symbol("O\""), "O");
        assert_eq!(light_symbol("Cl'"), "Cl");
        assert!(is_heavy_symbol("C'"));
        assert!(!is_heavy_symbol("C"));
    }

    #[test]
    fn test_table_covers_periodic_table() {
        let light = ELEMENTS.iter().filter(|(s, _, _)| !is_heavy_symbol(s)).count();
        assert_eq!(light, 103);
        for symbol in ["Si", "B", "As", "Co", "Pt", "Hg", "Mn", "Ni", "U"] {
            assert!(element_masses(symbol).is_some(), "{symbol}");
        }
        let (mono, avg) = element_masses("Si").unwrap();
        assert!((mono - 27.97693).abs() < 1e-4);
        assert!((avg - 28.0855).abs() < 1e-4);
    }

    #[test]
    fn test_mass_type_from_name() {
        assert_eq!(MassType::from_name("Average"), Some(MassType::Average));
        assert_eq!(MassType::from_name("monoisotopic"), Some(MassType::Monoisotopic));
        assert_eq!(MassType::from_name("other"), None);
    }
}
