use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

/// Element symbols indexed by atomic number. Index 0 is the SMILES wildcard.
const SYMBOLS: [&str; 119] = [
    "*", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

lazy_static! {
    static ref BY_SYMBOL: HashMap<&'static str, Element> = SYMBOLS
        .iter()
        .enumerate()
        .map(|(number, symbol)| (*symbol, Element(number as u8)))
        .collect();
}

/// A chemical element, stored as its atomic number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Element(u8);

#[allow(non_upper_case_globals)]
impl Element {
    pub const WILDCARD: Element = Element(0);
    pub const H: Element = Element(1);
    pub const B: Element = Element(5);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const F: Element = Element(9);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);
    pub const Cl: Element = Element(17);
    pub const Se: Element = Element(34);
    pub const Br: Element = Element(35);
    pub const I: Element = Element(53);

    /// Looks up an element by its exact (case-sensitive) symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        BY_SYMBOL.get(symbol).copied()
    }

    /// Parses an atom written outside brackets, returning the element and
    /// whether it was written in lowercase (aromatic) form.
    pub fn from_organic_subset(symbol: &str) -> Option<(Self, bool)> {
        match symbol {
            "B" => Some((Self::B, false)),
            "C" => Some((Self::C, false)),
            "N" => Some((Self::N, false)),
            "O" => Some((Self::O, false)),
            "P" => Some((Self::P, false)),
            "S" => Some((Self::S, false)),
            "F" => Some((Self::F, false)),
            "Cl" => Some((Self::Cl, false)),
            "Br" => Some((Self::Br, false)),
            "I" => Some((Self::I, false)),
            "*" => Some((Self::WILDCARD, false)),
            "b" => Some((Self::B, true)),
            "c" => Some((Self::C, true)),
            "n" => Some((Self::N, true)),
            "o" => Some((Self::O, true)),
            "p" => Some((Self::P, true)),
            "s" => Some((Self::S, true)),
            _ => None,
        }
    }

    /// Parses the element part of a bracket atom. Lowercase symbols are the
    /// aromatic forms allowed inside brackets.
    pub fn from_bracket_symbol(symbol: &str) -> Option<(Self, bool)> {
        match symbol {
            "b" | "c" | "n" | "o" | "p" | "s" => Self::from_organic_subset(symbol),
            "se" => Some((Self::Se, true)),
            "as" => Some((Element(33), true)),
            "te" => Some((Element(52), true)),
            _ => Self::from_symbol(symbol).map(|element| (element, false)),
        }
    }

    pub fn atomic_number(&self) -> u8 {
        self.0
    }

    pub fn symbol(&self) -> &'static str {
        SYMBOLS[self.0 as usize]
    }

    /// Normal valences used to infer implicit hydrogens on organic-subset atoms.
    pub fn default_valences(&self) -> &'static [u8] {
        match *self {
            Self::B => &[3],
            Self::C => &[4],
            Self::N | Self::P => &[3, 5],
            Self::O => &[2],
            Self::S => &[2, 4, 6],
            Self::F | Self::Cl | Self::Br | Self::I => &[1],
            _ => &[],
        }
    }

    /// Depiction color for this element.
    pub fn color(&self) -> &'static str {
        match *self {
            Self::C => "black",
            Self::H => "gray",
            Self::O => "red",
            Self::N => "blue",
            Self::Cl => "darkgreen",
            Self::Br => "brown",
            Self::F => "darkcyan",
            Self::S => "darkgoldenrod",
            Self::P => "darkorange",
            Self::I => "purple",
            _ => "dimgray",
        }
    }
}

impl Debug for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(Element::from_symbol("C"), Some(Element::C));
        assert_eq!(Element::from_symbol("Cl"), Some(Element::Cl));
        assert_eq!(Element::from_symbol("Og").map(|e| e.atomic_number()), Some(118));
        assert_eq!(Element::from_symbol("cl"), None);
        assert_eq!(Element::from_symbol("Xx"), None);
        assert_eq!(Element::Br.symbol(), "Br");
    }

    #[test]
    fn test_organic_subset() {
        assert_eq!(Element::from_organic_subset("c"), Some((Element::C, true)));
        assert_eq!(Element::from_organic_subset("Cl"), Some((Element::Cl, false)));
        // Sodium must be bracketed.
        assert_eq!(Element::from_organic_subset("Na"), None);
        assert_eq!(Element::from_organic_subset("cl"), None);
    }

    #[test]
    fn test_bracket_symbols() {
        assert_eq!(Element::from_bracket_symbol("Na").map(|(e, _)| e.symbol()), Some("Na"));
        assert_eq!(Element::from_bracket_symbol("se"), Some((Element::Se, true)));
        assert_eq!(Element::from_bracket_symbol("nh"), None);
    }
}
