//! Utterance normalization
//!
//! First stage of the pipeline: lower-cases the transcript, strips
//! punctuation noise, converts spoken number words to digits and maps unit
//! synonyms to canonical unit codes. Pure and deterministic; applying it
//! twice yields the same string.

const ONES: &[(&str, u32)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: &[(&str, u32)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

/// Spoken unit variants mapped to canonical unit codes.
const UNIT_SYNONYMS: &[(&str, &str)] = &[
    ("kg", "kg"),
    ("kgs", "kg"),
    ("kilo", "kg"),
    ("kilos", "kg"),
    ("kilogram", "kg"),
    ("kilograms", "kg"),
    ("g", "g"),
    ("gm", "g"),
    ("gms", "g"),
    ("gram", "g"),
    ("grams", "g"),
    ("mg", "mg"),
    ("milligram", "mg"),
    ("milligrams", "mg"),
    ("l", "l"),
    ("ltr", "l"),
    ("ltrs", "l"),
    ("litre", "l"),
    ("litres", "l"),
    ("liter", "l"),
    ("liters", "l"),
    ("ml", "ml"),
    ("millilitre", "ml"),
    ("millilitres", "ml"),
    ("milliliter", "ml"),
    ("milliliters", "ml"),
    ("pcs", "pcs"),
    ("pc", "pcs"),
    ("piece", "pcs"),
    ("pieces", "pcs"),
    ("unit", "pcs"),
    ("units", "pcs"),
    ("item", "pcs"),
    ("items", "pcs"),
    ("packet", "packet"),
    ("packets", "packet"),
    ("pack", "packet"),
    ("packs", "packet"),
    ("pkt", "packet"),
    ("pkts", "packet"),
    ("bottle", "bottle"),
    ("bottles", "bottle"),
    ("can", "can"),
    ("cans", "can"),
    ("jar", "jar"),
    ("jars", "jar"),
    ("dozen", "dozen"),
    ("dozens", "dozen"),
    ("bag", "bag"),
    ("bags", "bag"),
    ("sack", "sack"),
    ("sacks", "sack"),
    ("strip", "strip"),
    ("strips", "strip"),
    ("tin", "tin"),
    ("tins", "tin"),
    ("roll", "roll"),
    ("rolls", "roll"),
    ("carton", "carton"),
    ("cartons", "carton"),
];

/// Canonical code for a unit token, `None` when the token is not a unit.
pub fn normalize_unit(token: &str) -> Option<&'static str> {
    let t = token.trim();
    UNIT_SYNONYMS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(t))
        .map(|(_, c)| *c)
}

/// Alternation of every known unit token, longest first, for embedding in
/// extraction patterns.
pub(crate) fn unit_pattern() -> String {
    let mut tokens: Vec<&str> = UNIT_SYNONYMS.iter().map(|(s, _)| *s).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    tokens.join("|")
}

/// Normalize a raw transcript. Total: any input produces a string, possibly
/// empty.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = strip_punctuation(&lowered);
    let renumbered = replace_number_words(&stripped);
    canonicalize_units(&renumbered)
}

/// Punctuation policy: commas become standalone tokens (they delimit
/// segments) unless they sit between digits; `.` and `/` survive only inside
/// numbers; `-` survives between alphanumerics (hyphenated number words,
/// numeric dates); `₹` survives as its own token. Everything else becomes a
/// space.
fn strip_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut last_nonspace: Option<char> = None;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace()).copied();
                let between_digits = last_nonspace.map_or(false, |p| p.is_ascii_digit())
                    && next.map_or(false, |n| n.is_ascii_digit());
                if between_digits {
                    out.push(' ');
                } else {
                    out.push_str(" , ");
                }
            }
            '.' | '/' => {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                let next = chars.get(i + 1).copied();
                if prev.map_or(false, |p| p.is_ascii_digit())
                    && next.map_or(false, |n| n.is_ascii_digit())
                {
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
            '-' => {
                let prev = if i > 0 { Some(chars[i - 1]) } else { None };
                let next = chars.get(i + 1).copied();
                if prev.map_or(false, |p| p.is_alphanumeric())
                    && next.map_or(false, |n| n.is_alphanumeric())
                {
                    out.push(c);
                } else {
                    out.push(' ');
                }
            }
            '₹' => out.push_str(" ₹ "),
            '\'' => {}
            c if c.is_alphanumeric() || c.is_whitespace() => out.push(c),
            _ => out.push(' '),
        }
        if !c.is_whitespace() {
            last_nonspace = Some(c);
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn replace_number_words(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        match parse_number_words(&tokens, i) {
            Some((value, consumed)) => {
                out.push(value.to_string());
                i += consumed;
            }
            None => {
                out.push(tokens[i].to_string());
                i += 1;
            }
        }
    }
    out.join(" ")
}

fn canonicalize_units(text: &str) -> String {
    text.split_whitespace()
        .map(|tok| match normalize_unit(tok) {
            Some(canonical) => canonical,
            None => tok,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_ones(w: &str) -> Option<u32> {
    ONES.iter().find(|(name, _)| *name == w).map(|(_, v)| *v)
}

fn parse_tens(w: &str) -> Option<u32> {
    TENS.iter().find(|(name, _)| *name == w).map(|(_, v)| *v)
}

/// "twenty-three" style compounds.
fn parse_hyphenated(w: &str) -> Option<u32> {
    let (left, right) = w.split_once('-')?;
    let tens = parse_tens(left)?;
    let ones = parse_ones(right)?;
    if (1..=9).contains(&ones) {
        Some(tens + ones)
    } else {
        None
    }
}

/// Ones, tens or a two-word compound ("twenty three"). Returns the value and
/// the number of tokens consumed.
fn parse_small(tokens: &[&str], start: usize) -> Option<(u32, usize)> {
    let w = tokens.get(start)?;
    if let Some(v) = parse_hyphenated(w) {
        return Some((v, 1));
    }
    if let Some(tens) = parse_tens(w) {
        if let Some(next) = tokens.get(start + 1) {
            if let Some(ones) = parse_ones(next) {
                if (1..=9).contains(&ones) {
                    return Some((tens + ones, 2));
                }
            }
        }
        return Some((tens, 1));
    }
    parse_ones(w).map(|v| (v, 1))
}

/// Full spoken number with an optional hundred magnitude:
/// "two hundred and fifty" -> 250.
fn parse_number_words(tokens: &[&str], start: usize) -> Option<(u32, usize)> {
    let (mut value, mut consumed) = parse_small(tokens, start)?;
    if tokens.get(start + consumed).copied() == Some("hundred") {
        value *= 100;
        consumed += 1;
        let mut tail = start + consumed;
        if tokens.get(tail).copied() == Some("and") {
            tail += 1;
        }
        if let Some((rest, used)) = parse_small(tokens, tail) {
            if rest < 100 {
                value += rest;
                consumed = tail - start + used;
            }
        }
    }
    Some((value, consumed))
}
