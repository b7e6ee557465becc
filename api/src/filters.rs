//! Custom askama filters. Every filter accepts plain numbers as well as
//! optional ones, rendering a missing value as `N/A`.

const MISSING: &str = "N/A";

pub trait Amount {
    fn amount(&self) -> Option<f64>;
}

impl Amount for f64 {
    fn amount(&self) -> Option<f64> {
        Some(*self)
    }
}

impl Amount for Option<f64> {
    fn amount(&self) -> Option<f64> {
        *self
    }
}

impl<T: Amount + ?Sized> Amount for &T {
    fn amount(&self) -> Option<f64> {
        (**self).amount()
    }
}

/// `1234567` becomes `1,234,567`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `$1,234.56`, negative amounts as `-$1,234.56`.
pub fn currency<T: Amount>(value: T) -> askama::Result<String> {
    let Some(v) = value.amount().filter(|v| v.is_finite()) else {
        return Ok(MISSING.to_string());
    };
    let formatted = format!("{:.2}", v.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let sign = if v < 0.0 && formatted != "0.00" { "-" } else { "" };
    Ok(format!("{}${}.{}", sign, group_thousands(whole), cents))
}

/// Whole numbers without decimals, anything else with its decimals kept.
pub fn number_with_commas<T: Amount>(value: T) -> askama::Result<String> {
    let Some(v) = value.amount().filter(|v| v.is_finite()) else {
        return Ok(MISSING.to_string());
    };
    let sign = if v < 0.0 { "-" } else { "" };
    let text = v.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };
    Ok(match fraction {
        Some(fraction) => format!("{}{}.{}", sign, group_thousands(whole), fraction),
        None => format!("{}{}", sign, group_thousands(whole)),
    })
}

pub fn percent<T: Amount>(value: T) -> askama::Result<String> {
    Ok(match value.amount().filter(|v| v.is_finite()) {
        Some(v) => format!("{:.2}%", v),
        None => MISSING.to_string(),
    })
}

/// CSS class for gains and losses.
pub fn gain_class<T: Amount>(value: T) -> askama::Result<&'static str> {
    Ok(match value.amount() {
        Some(v) if v > 0.0 => "gain",
        Some(v) if v < 0.0 => "loss",
        _ => "flat",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        assert_eq!(currency(1234.5).unwrap(), "$1,234.50");
        assert_eq!(currency(0.0).unwrap(), "$0.00");
        assert_eq!(currency(-1234567.891).unwrap(), "-$1,234,567.89");
        assert_eq!(currency(999.999).unwrap(), "$1,000.00");
        assert_eq!(currency(&Some(12.0)).unwrap(), "$12.00");
        assert_eq!(currency(None::<f64>).unwrap(), "N/A");
        assert_eq!(currency(f64::NAN).unwrap(), "N/A");
    }

    #[test]
    fn test_number_with_commas() {
        assert_eq!(number_with_commas(1500.0).unwrap(), "1,500");
        assert_eq!(number_with_commas(12.3456).unwrap(), "12.3456");
        assert_eq!(number_with_commas(1234567.5).unwrap(), "1,234,567.5");
        assert_eq!(number_with_commas(-2500.0).unwrap(), "-2,500");
        assert_eq!(number_with_commas(&None::<f64>).unwrap(), "N/A");
    }

    #[test]
    fn test_percent_and_gain_class() {
        assert_eq!(percent(12.345).unwrap(), "12.35%");
        assert_eq!(percent(-3.0).unwrap(), "-3.00%");
        assert_eq!(percent(None::<f64>).unwrap(), "N/A");
        assert_eq!(gain_class(1.0).unwrap(), "gain");
        assert_eq!(gain_class(-0.5).unwrap(), "loss");
        assert_eq!(gain_class(&0.0).unwrap(), "flat");
    }
}
