//! Parser for the contents of a SMILES bracket atom, e.g. `13CH3+`, `nH`, `NH4+:1`.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::many1_count,
    sequence::{pair, preceded, tuple},
    IResult,
};

use super::SmilesError;
use crate::{Atom, Element};

/// The raw pieces of a bracket atom before the element is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BracketParts<'a> {
    isotope: Option<u16>,
    symbol: &'a str,
    hydrogens: u8,
    charge: i8,
}

fn isotope(input: &str) -> IResult<&str, Option<u16>> {
    opt(map_res(digit1, str::parse::<u16>))(input)
}

fn symbol(input: &str) -> IResult<&str, &str> {
    alt((
        tag("se"),
        tag("as"),
        tag("te"),
        recognize(pair(
            satisfy(|c| c.is_ascii_uppercase()),
            opt(satisfy(|c| c.is_ascii_lowercase())),
        )),
        recognize(one_of("bcnops")),
        tag("*"),
    ))(input)
}

fn chirality(input: &str) -> IResult<&str, Option<&str>> {
    opt(recognize(pair(
        many1_count(char('@')),
        opt(pair(
            alt((tag("TH"), tag("AL"), tag("SP"), tag("TB"), tag("OH"))),
            digit1,
        )),
    )))(input)
}

fn hydrogens(input: &str) -> IResult<&str, u8> {
    map(
        opt(preceded(char('H'), opt(map_res(digit1, str::parse::<u8>)))),
        |count| match count {
            Some(Some(n)) => n,
            Some(None) => 1,
            None => 0,
        },
    )(input)
}

fn charge(input: &str) -> IResult<&str, i8> {
    map(
        opt(alt((
            map_res(preceded(char('+'), digit1), str::parse::<i8>),
            map_res(preceded(char('-'), digit1), |d: &str| {
                d.parse::<i8>().map(|n| -n)
            }),
            map_res(many1_count(char('+')), |n: usize| i8::try_from(n)),
            map_res(many1_count(char('-')), |n: usize| i8::try_from(n).map(|c| -c)),
        ))),
        |charge| charge.unwrap_or(0),
    )(input)
}

fn atom_class(input: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(char(':'), digit1))(input)
}

fn bracket_parts(input: &str) -> IResult<&str, BracketParts> {
    let (rest, (isotope, symbol, _, hydrogens, charge, _)) =
        all_consuming(tuple((isotope, symbol, chirality, hydrogens, charge, atom_class)))(input)?;
    Ok((
        rest,
        BracketParts {
            isotope,
            symbol,
            hydrogens,
            charge,
        },
    ))
}

/// Parses bracket contents (without the brackets) found at `position`.
pub(crate) fn parse_bracket_atom(content: &str, position: usize) -> Result<Atom, SmilesError> {
    let (_, parts) = bracket_parts(content)
        .map_err(|_| SmilesError::InvalidBracket(position, content.to_string()))?;

    let (element, aromatic) = Element::from_bracket_symbol(parts.symbol)
        .ok_or_else(|| SmilesError::UnknownElement(position + 1, parts.symbol.to_string()))?;

    Ok(Atom {
        element,
        aromatic,
        charge: parts.charge,
        hydrogens: Some(parts.hydrogens),
        isotope: parts.isotope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ammonium() {
        let atom = parse_bracket_atom("NH4+", 0).unwrap();
        assert_eq!(atom.element, Element::N);
        assert_eq!(atom.hydrogens, Some(4));
        assert_eq!(atom.charge, 1);
        assert!(!atom.aromatic);
    }

    #[test]
    fn test_charges() {
        assert_eq!(parse_bracket_atom("O-", 0).unwrap().charge, -1);
        assert_eq!(parse_bracket_atom("Fe+2", 0).unwrap().charge, 2);
        assert_eq!(parse_bracket_atom("Fe++", 0).unwrap().charge, 2);
        assert_eq!(parse_bracket_atom("O--", 0).unwrap().charge, -2);
        assert_eq!(parse_bracket_atom("S-2", 0).unwrap().charge, -2);
        assert_eq!(parse_bracket_atom("C", 0).unwrap().charge, 0);
    }

    #[test]
    fn test_oversized_charges_are_invalid() {
        let minus = format!("N{}", "-".repeat(128));
        assert_eq!(
            parse_bracket_atom(&minus, 0),
            Err(SmilesError::InvalidBracket(0, minus.clone()))
        );
        let plus = format!("N{}", "+".repeat(257));
        assert_eq!(
            parse_bracket_atom(&plus, 0),
            Err(SmilesError::InvalidBracket(0, plus.clone()))
        );
        assert!(matches!(
            parse_bracket_atom("N+200", 0),
            Err(SmilesError::InvalidBracket(..))
        ));
        assert!(matches!(
            parse_bracket_atom("N-128", 0),
            Err(SmilesError::InvalidBracket(..))
        ));

        let deepest = format!("O{}", "-".repeat(127));
        assert_eq!(parse_bracket_atom(&deepest, 0).unwrap().charge, -127);
    }

    #[test]
    fn test_full_bracket() {
        let atom = parse_bracket_atom("13C@@H+:7", 0).unwrap();
        assert_eq!(atom.isotope, Some(13));
        assert_eq!(atom.element, Element::C);
        assert_eq!(atom.hydrogens, Some(1));
        assert_eq!(atom.charge, 1);
    }

    #[test]
    fn test_aromatic_brackets() {
        let atom = parse_bracket_atom("nH+", 0).unwrap();
        assert_eq!(atom.element, Element::N);
        assert!(atom.aromatic);
        assert_eq!(atom.hydrogens, Some(1));
        assert_eq!(atom.charge, 1);

        assert!(parse_bracket_atom("se", 0).unwrap().aromatic);
    }

    #[test]
    fn test_hydrogen_atoms() {
        let proton = parse_bracket_atom("H+", 0).unwrap();
        assert_eq!(proton.element, Element::H);
        assert_eq!(proton.charge, 1);
        assert_eq!(proton.hydrogens, Some(0));

        assert_eq!(parse_bracket_atom("Hg", 0).unwrap().element.symbol(), "Hg");
    }

    #[test]
    fn test_invalid_brackets() {
        assert_eq!(
            parse_bracket_atom("", 3),
            Err(SmilesError::InvalidBracket(3, String::new()))
        );
        assert!(matches!(
            parse_bracket_atom("N+x", 0),
            Err(SmilesError::InvalidBracket(..))
        ));
        assert!(matches!(
            parse_bracket_atom("Xx", 0),
            Err(SmilesError::UnknownElement(1, _))
        ));
    }
}
