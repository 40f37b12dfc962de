//! Character reference decoding for the scanner.
//!
//! Contract:
//! - Named references are looked up in a fixed HTML4-style table: markup and punctuation
//!   (`amp`, `lt`, `gt`, `quot`, `nbsp`, `hellip`, `mdash`, ...), Latin-1 letters and symbols
//!   (`eacute`, `ntilde`, `uuml`, ...) and the Greek alphabet (`alpha`...`omega`, `Alpha`...`Omega`).
//!   Names are case-sensitive (`Agrave` and `agrave` differ).
//! - Numeric references are `#` followed by decimal digits, or `#x`/`#X` followed by hex digits.
//!   Every digit after the radix marker belongs to the value.
//! - A numeric body whose digits do not parse is logged and treated as absent (`Ok(None)`).
//! - Unknown names, empty bodies and numeric values outside the Unicode scalar range fail with
//!   `UnknownEntity`.

use crate::error::{ParseError, Result};

/// Decode the body of a character reference (the text between `&` and `;`).
pub fn char_from_entity_name(token: &str) -> Result<Option<char>> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ParseError::unknown_entity(token));
    }

    if let Some(numeric) = token.strip_prefix('#') {
        return decode_numeric(token, numeric);
    }

    named_entity(token)
        .map(Some)
        .ok_or_else(|| ParseError::unknown_entity(token))
}

fn decode_numeric(token: &str, numeric: &str) -> Result<Option<char>> {
    let (radix, digits) = match numeric.strip_prefix(['x', 'X']) {
        Some(hex) => (16, hex),
        None => (10, numeric),
    };

    let well_formed = !digits.is_empty() && digits.chars().all(|ch| ch.is_digit(radix));
    let value = if well_formed {
        u32::from_str_radix(digits, radix).ok()
    } else {
        None
    };

    let Some(value) = value else {
        log::warn!(target: "converter.entities", "does not contain a number: '{token}'");
        return Ok(None);
    };

    char::from_u32(value)
        .map(Some)
        .ok_or_else(|| ParseError::unknown_entity(token))
}

/// Lenient decoding for attribute values: references that do not decode are kept verbatim.
pub(crate) fn decode_entities(s: &str) -> String {
    // Longest name in the table plus room for numeric forms.
    const MAX_REFERENCE_LEN: usize = 12;

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let body_end = after
            .char_indices()
            .take(MAX_REFERENCE_LEN + 1)
            .find(|&(_, ch)| ch == ';' || ch == '&' || ch.is_whitespace())
            .filter(|&(_, ch)| ch == ';')
            .map(|(i, _)| i);

        let decoded = body_end.and_then(|end| {
            char_from_entity_name(&after[..end])
                .ok()
                .flatten()
                .map(|ch| (ch, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Look up a named character reference.
pub fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        // Markup and punctuation
        "Tab" => '\t',
        "NewLine" => '\n',
        "excl" => '!',
        "quot" => '"',
        "num" => '#',
        "dollar" => '$',
        "amp" => '&',
        "apos" => '\'',
        "lpar" => '(',
        "rpar" => ')',
        "plus" => '+',
        "comma" => ',',
        "period" => '.',
        "sol" => '/',
        "colon" => ':',
        "semi" => ';',
        "lt" => '<',
        "equals" => '=',
        "gt" => '>',
        "quest" => '?',
        "commat" => '@',
        "lsqb" => '[',
        "bsol" => '\\',
        "rsqb" => ']',
        "Hat" => '^',
        "lowbar" | "underbar" => '_',
        "lcub" | "lbrace" => '{',
        "verbar" | "vert" | "VerticalBar" => '|',
        "rcub" | "rbrace" => '}',
        "dash" => '\u{2010}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "horbar" => '\u{2015}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "bull" => '\u{2022}',
        "hellip" => '\u{2026}',
        "prime" => '\u{2032}',
        "euro" => '\u{20AC}',
        "trade" => '\u{2122}',
        "larr" => '\u{2190}',
        "uarr" => '\u{2191}',
        "rarr" => '\u{2192}',
        "darr" => '\u{2193}',
        "harr" => '\u{2194}',
        "minus" => '\u{2212}',
        "ctdot" => '\u{22EF}',
        "spade" => '\u{2660}',
        "club" => '\u{2663}',
        "heart" => '\u{2665}',
        "diamond" => '\u{2666}',
        "fnof" => '\u{0192}',

        // Latin-1 symbols
        "nbsp" => '\u{00A0}',
        "iexcl" => '\u{00A1}',
        "cent" => '\u{00A2}',
        "pound" => '\u{00A3}',
        "curren" => '\u{00A4}',
        "yen" => '\u{00A5}',
        "brvbar" => '\u{00A6}',
        "sect" => '\u{00A7}',
        "uml" => '\u{00A8}',
        "copy" => '\u{00A9}',
        "ordf" => '\u{00AA}',
        "laquo" => '\u{00AB}',
        "not" => '\u{00AC}',
        "shy" => '\u{00AD}',
        "reg" => '\u{00AE}',
        "macr" => '\u{00AF}',
        "deg" => '\u{00B0}',
        "plusmn" => '\u{00B1}',
        "sup2" => '\u{00B2}',
        "sup3" => '\u{00B3}',
        "acute" => '\u{00B4}',
        "micro" => '\u{00B5}',
        "para" => '\u{00B6}',
        "middot" => '\u{00B7}',
        "cedil" => '\u{00B8}',
        "sup1" => '\u{00B9}',
        "ordm" => '\u{00BA}',
        "raquo" => '\u{00BB}',
        "frac14" => '\u{00BC}',
        "frac12" => '\u{00BD}',
        "frac34" => '\u{00BE}',
        "iquest" => '\u{00BF}',
        "times" => '\u{00D7}',
        "divide" => '\u{00F7}',

        // Latin-1 letters
        "Agrave" => 'À',
        "Aacute" => 'Á',
        "Acirc" => 'Â',
        "Atilde" => 'Ã',
        "Auml" => 'Ä',
        "Aring" => 'Å',
        "AElig" => 'Æ',
        "Ccedil" => 'Ç',
        "Egrave" => 'È',
        "Eacute" => 'É',
        "Ecirc" => 'Ê',
        "Euml" => 'Ë',
        "Igrave" => 'Ì',
        "Iacute" => 'Í',
        "Icirc" => 'Î',
        "Iuml" => 'Ï',
        "ETH" => 'Ð',
        "Ntilde" => 'Ñ',
        "Ograve" => 'Ò',
        "Oacute" => 'Ó',
        "Ocirc" => 'Ô',
        "Otilde" => 'Õ',
        "Ouml" => 'Ö',
        "Oslash" => 'Ø',
        "Ugrave" => 'Ù',
        "Uacute" => 'Ú',
        "Ucirc" => 'Û',
        "Uuml" => 'Ü',
        "Yacute" => 'Ý',
        "THORN" => 'Þ',
        "szlig" => 'ß',
        "agrave" => 'à',
        "aacute" => 'á',
        "acirc" => 'â',
        "atilde" => 'ã',
        "auml" => 'ä',
        "aring" => 'å',
        "aelig" => 'æ',
        "ccedil" => 'ç',
        "egrave" => 'è',
        "eacute" => 'é',
        "ecirc" => 'ê',
        "euml" => 'ë',
        "igrave" => 'ì',
        "iacute" => 'í',
        "icirc" => 'î',
        "iuml" => 'ï',
        "eth" => 'ð',
        "ntilde" => 'ñ',
        "ograve" => 'ò',
        "oacute" => 'ó',
        "ocirc" => 'ô',
        "otilde" => 'õ',
        "ouml" => 'ö',
        "oslash" => 'ø',
        "ugrave" => 'ù',
        "uacute" => 'ú',
        "ucirc" => 'û',
        "uuml" => 'ü',
        "yacute" => 'ý',
        "thorn" => 'þ',
        "yuml" => 'ÿ',

        // Greek
        "Alpha" => 'Α',
        "Beta" => 'Β',
        "Gamma" => 'Γ',
        "Delta" => 'Δ',
        "Epsilon" => 'Ε',
        "Zeta" => 'Ζ',
        "Eta" => 'Η',
        "Theta" => 'Θ',
        "Iota" => 'Ι',
        "Kappa" => 'Κ',
        "Lambda" => 'Λ',
        "Mu" => 'Μ',
        "Nu" => 'Ν',
        "Xi" => 'Ξ',
        "Omicron" => 'Ο',
        "Pi" => 'Π',
        "Rho" => 'Ρ',
        "Sigma" => 'Σ',
        "Tau" => 'Τ',
        "Upsilon" => 'Υ',
        "Phi" => 'Φ',
        "Chi" => 'Χ',
        "Psi" => 'Ψ',
        "Omega" => 'Ω',
        "alpha" => 'α',
        "beta" => 'β',
        "gamma" => 'γ',
        "delta" => 'δ',
        "epsilon" => 'ε',
        "zeta" => 'ζ',
        "eta" => 'η',
        "theta" => 'θ',
        "iota" => 'ι',
        "kappa" => 'κ',
        "lambda" => 'λ',
        "mu" => 'μ',
        "nu" => 'ν',
        "xi" => 'ξ',
        "omicron" => 'ο',
        "pi" => 'π',
        "rho" => 'ρ',
        "sigmaf" => 'ς',
        "sigma" => 'σ',
        "tau" => 'τ',
        "upsilon" => 'υ',
        "phi" => 'φ',
        "chi" => 'χ',
        "psi" => 'ψ',
        "omega" => 'ω',
        "thetasym" => 'ϑ',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    #[test]
    fn latin1_names_decode_to_accented_letters() {
        let names = [
            "gt", "lt", "ntilde", "aacute", "eacute", "iacute", "oacute", "uacute",
        ];
        let expected = "><ñáéíóú";
        for (name, ch) in names.iter().zip(expected.chars()) {
            assert_eq!(char_from_entity_name(name), Ok(Some(ch)), "entity {name}");
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(named_entity("Agrave"), Some('À'));
        assert_eq!(named_entity("agrave"), Some('à'));
        assert_eq!(named_entity("AMP"), None);
    }

    #[test]
    fn greek_alphabet_is_covered() {
        assert_eq!(named_entity("alpha"), Some('α'));
        assert_eq!(named_entity("omega"), Some('ω'));
        assert_eq!(named_entity("Omega"), Some('Ω'));
    }

    // Every digit after the radix marker is part of the value.
    #[test]
    fn numeric_references_use_all_digits() {
        assert_eq!(char_from_entity_name("#65"), Ok(Some('A')));
        assert_eq!(char_from_entity_name("#x41"), Ok(Some('A')));
        assert_eq!(char_from_entity_name("#X41"), Ok(Some('A')));
        assert_eq!(char_from_entity_name("#241"), Ok(Some('ñ')));
        assert_eq!(char_from_entity_name("#x20AC"), Ok(Some('€')));
        assert_eq!(char_from_entity_name("#7"), Ok(Some('\u{7}')));
    }

    #[test]
    fn malformed_numeric_reference_is_absent() {
        assert_eq!(char_from_entity_name("#abc"), Ok(None));
        assert_eq!(char_from_entity_name("#x"), Ok(None));
        assert_eq!(char_from_entity_name("#"), Ok(None));
        assert_eq!(char_from_entity_name("#+65"), Ok(None));
    }

    #[test]
    fn out_of_range_numeric_reference_is_unknown() {
        let err = char_from_entity_name("#xD800").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnknownEntity);
        let err = char_from_entity_name("#x110000").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnknownEntity);
    }

    #[test]
    fn lenient_decoding_keeps_unknown_references() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("x.md?a=1&b=2"), "x.md?a=1&b=2");
        assert_eq!(decode_entities("&bogus;&lt;"), "&bogus;<");
        assert_eq!(decode_entities("caf&eacute; &"), "café &");
    }

    #[test]
    fn unknown_and_empty_names_fail() {
        let err = char_from_entity_name("bogus").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnknownEntity);
        let err = char_from_entity_name("").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::UnknownEntity);
    }
}
