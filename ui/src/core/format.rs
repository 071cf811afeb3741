//! Formatting helpers for presenting KPI figures.
//!
//! Number formats follow the subset of d3-format specifiers the host's
//! format pickers emit (`,d`, `,.2f`, `.1%`, `.3~s`, `+,.2f`, `.2e`, `$,.2f`)
//! plus the `SMART_NUMBER` family.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::{KpiError, Result};

/// Token rendered in place of a missing figure.
pub const PLACEHOLDER: &str = "—";

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Sign {
    #[default]
    Minus,
    Plus,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Fixed,
    Integer,
    Percent,
    Si,
    Exponent,
    Shortest,
}

/// Parsed d3-style specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    sign: Sign,
    dollar: bool,
    grouping: bool,
    precision: Option<usize>,
    trim: bool,
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NumberFormat {
    #[default]
    Smart,
    SmartSigned,
    Spec(FormatSpec),
}

impl NumberFormat {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "" | "SMART_NUMBER" => Ok(NumberFormat::Smart),
            "SMART_NUMBER_SIGNED" => Ok(NumberFormat::SmartSigned),
            spec => parse_spec(spec).map(NumberFormat::Spec),
        }
    }

    /// Default for percent deltas.
    pub fn percent() -> Self {
        NumberFormat::Spec(FormatSpec {
            sign: Sign::Minus,
            dollar: false,
            grouping: false,
            precision: Some(2),
            trim: false,
            kind: Kind::Percent,
        })
    }

    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return PLACEHOLDER.to_string();
        }
        match self {
            NumberFormat::Smart => smart_number(value),
            NumberFormat::SmartSigned => {
                let body = smart_number(value);
                if value > 0.0 {
                    format!("+{body}")
                } else {
                    body
                }
            }
            NumberFormat::Spec(spec) => spec.apply(value),
        }
    }

    /// The same format without its `$` flag; a currency supplies the glyph.
    pub fn without_dollar(&self) -> NumberFormat {
        match self {
            NumberFormat::Spec(spec) if spec.dollar => NumberFormat::Spec(FormatSpec {
                dollar: false,
                ..spec.clone()
            }),
            other => other.clone(),
        }
    }

    /// Format an optional figure, substituting [`PLACEHOLDER`] for `None`.
    pub fn format_opt(&self, value: Option<f64>) -> String {
        value.map_or_else(|| PLACEHOLDER.to_string(), |v| self.format(v))
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberFormat::Smart => f.write_str("SMART_NUMBER"),
            NumberFormat::SmartSigned => f.write_str("SMART_NUMBER_SIGNED"),
            NumberFormat::Spec(spec) => {
                match spec.sign {
                    Sign::Minus => {}
                    Sign::Plus => f.write_str("+")?,
                    Sign::Space => f.write_str(" ")?,
                }
                if spec.dollar {
                    f.write_str("$")?;
                }
                if spec.grouping {
                    f.write_str(",")?;
                }
                if let Some(precision) = spec.precision {
                    write!(f, ".{precision}")?;
                }
                if spec.trim {
                    f.write_str("~")?;
                }
                f.write_str(match spec.kind {
                    Kind::Fixed => "f",
                    Kind::Integer => "d",
                    Kind::Percent => "%",
                    Kind::Si => "s",
                    Kind::Exponent => "e",
                    Kind::Shortest => "",
                })
            }
        }
    }
}

impl FromStr for NumberFormat {
    type Err = KpiError;

    fn from_str(raw: &str) -> Result<Self> {
        NumberFormat::parse(raw)
    }
}

impl Serialize for NumberFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NumberFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NumberFormat::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn parse_spec(raw: &str) -> Result<FormatSpec> {
    let invalid = || KpiError::InvalidFormat(raw.to_string());
    let mut chars = raw.chars().peekable();

    let sign = match chars.peek() {
        Some('+') => Sign::Plus,
        Some('-') => Sign::Minus,
        Some(' ') => Sign::Space,
        _ => Sign::Minus,
    };
    if matches!(chars.peek(), Some('+' | '-' | ' ')) {
        chars.next();
    }

    let dollar = chars.next_if_eq(&'$').is_some();
    let grouping = chars.next_if_eq(&',').is_some();

    let precision = if chars.next_if_eq(&'.').is_some() {
        let mut digits = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            digits.push(d);
        }
        Some(digits.parse::<usize>().map_err(|_| invalid())?.min(20))
    } else {
        None
    };

    let trim = chars.next_if_eq(&'~').is_some();

    let kind = match chars.next() {
        None => Kind::Shortest,
        Some('f') => Kind::Fixed,
        Some('d') => Kind::Integer,
        Some('%') => Kind::Percent,
        Some('s') => Kind::Si,
        Some('e') => Kind::Exponent,
        Some(_) => return Err(invalid()),
    };

    if chars.next().is_some() {
        return Err(invalid());
    }

    Ok(FormatSpec {
        sign,
        dollar,
        grouping,
        precision,
        trim,
        kind,
    })
}

impl FormatSpec {
    fn apply(&self, value: f64) -> String {
        let magnitude = value.abs();
        let (mut body, suffix) = match self.kind {
            Kind::Fixed => (fixed(magnitude, self.precision.unwrap_or(6)), String::new()),
            Kind::Integer => (fixed(magnitude.round(), 0), String::new()),
            Kind::Percent => (
                fixed(magnitude * 100.0, self.precision.unwrap_or(6)),
                "%".to_string(),
            ),
            Kind::Si => {
                let (digits, prefix) = si(magnitude, self.precision.unwrap_or(6).max(1));
                (digits, prefix.to_string())
            }
            Kind::Exponent => (exponent(magnitude, self.precision.unwrap_or(6)), String::new()),
            Kind::Shortest => (format!("{magnitude}"), String::new()),
        };

        if self.trim {
            body = trim_zeros(&body);
        }
        if self.grouping {
            body = group_thousands(&body);
        }

        let is_zero = body.chars().all(|c| matches!(c, '0' | '.' | ','));
        let sign = if value < 0.0 && !is_zero {
            "-"
        } else {
            match self.sign {
                Sign::Minus => "",
                Sign::Plus => "+",
                Sign::Space => " ",
            }
        };
        let dollar = if self.dollar { "$" } else { "" };

        format!("{sign}{dollar}{body}{suffix}")
    }
}

fn fixed(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

fn exponent(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => raw,
    }
}

/// Scale `value` to an SI prefix keeping `significant` digits.
fn si(value: f64, significant: usize) -> (String, &'static str) {
    if value == 0.0 {
        return (fixed(0.0, significant.saturating_sub(1)), "");
    }
    // Round to the requested significant digits first so 999.96 -> 1.00k.
    let rounded: f64 = format!("{:.*e}", significant - 1, value)
        .parse()
        .unwrap_or(value);
    let exp10 = rounded.log10().floor() as i32;
    let si_exp = (exp10.div_euclid(3) * 3).clamp(-24, 24);
    let scaled = rounded / 10f64.powi(si_exp);
    let decimals = (significant as i32 - 1 - (exp10 - si_exp)).max(0) as usize;
    let prefix = SI_PREFIXES[((si_exp / 3) + 8) as usize];
    (fixed(scaled, decimals), prefix)
}

fn trim_zeros(body: &str) -> String {
    if !body.contains('.') || body.contains('e') {
        return body.to_string();
    }
    body.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn group_thousands(body: &str) -> String {
    let (int_part, rest) = match body.find(|c: char| c == '.' || c == 'e') {
        Some(idx) => body.split_at(idx),
        None => (body, ""),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push_str(rest);
    grouped
}

fn smart_number(value: f64) -> String {
    let si3 = NumberFormat::Spec(FormatSpec {
        sign: Sign::Minus,
        dollar: false,
        grouping: false,
        precision: Some(3),
        trim: true,
        kind: Kind::Si,
    });
    let fixed_trimmed = |precision| {
        NumberFormat::Spec(FormatSpec {
            sign: Sign::Minus,
            dollar: false,
            grouping: false,
            precision: Some(precision),
            trim: true,
            kind: Kind::Fixed,
        })
    };

    let magnitude = value.abs();
    if value == 0.0 {
        "0".to_string()
    } else if magnitude >= 1000.0 {
        // Billions read better than giga.
        si3.format(value).replace('G', "B")
    } else if magnitude >= 1.0 {
        fixed_trimmed(2).format(value)
    } else if magnitude >= 0.001 {
        fixed_trimmed(4).format(value)
    } else if magnitude > 0.000_001 {
        format!("{}µ", si3.format(value * 1_000_000.0))
    } else {
        si3.format(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Prefix,
    Suffix,
}

/// Currency decoration applied on top of a number format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormat {
    /// ISO 4217 code (`USD`) or a literal glyph.
    pub symbol: String,
    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>, symbol_position: SymbolPosition) -> Self {
        Self {
            symbol: symbol.into(),
            symbol_position,
        }
    }

    pub fn glyph(&self) -> &str {
        match self.symbol.to_ascii_uppercase().as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" | "CNY" => "¥",
            "INR" => "₹",
            "KRW" => "₩",
            "BRL" => "R$",
            _ => self.symbol.as_str(),
        }
    }

    /// Decorate an already formatted number. A leading sign (`-`, `+` or the
    /// alignment space) stays in front of a prefixed glyph.
    pub fn decorate(&self, formatted: &str) -> String {
        let glyph = self.glyph();
        match self.symbol_position {
            SymbolPosition::Prefix => match formatted.strip_prefix(['-', '+', ' ']) {
                Some(unsigned) => format!("{}{glyph}{unsigned}", &formatted[..1]),
                None => format!("{glyph}{formatted}"),
            },
            SymbolPosition::Suffix => format!("{formatted} {glyph}"),
        }
    }
}

/// Format a figure with an optional currency; `None` yields the placeholder.
pub fn format_figure(
    value: Option<f64>,
    format: &NumberFormat,
    currency: Option<&CurrencyFormat>,
) -> String {
    match (value.filter(|v| v.is_finite()), currency) {
        (None, _) => PLACEHOLDER.to_string(),
        (Some(v), None) => format.format(v),
        (Some(v), Some(currency)) => currency.decorate(&format.without_dollar().format(v)),
    }
}
