//! Russian date normalization.
//!
//! Search results carry dates like `15 марта 2020` (day, genitive month
//! name, year). Downstream aggregation scripts expect `mm/dd/yyyy`, so
//! this module maps the month name through a fixed 12-entry table and
//! zero-pads both fields.
//!
//! The month table is passed in rather than hardcoded so that each
//! configured site can bring its own spelling (e.g. nominative vs.
//! genitive case, or a different language entirely).

use crate::errors::DateError;

/// Month-name lookup table: `(name, month number)`.
pub type MonthTable = &'static [(&'static str, u32)];

/// Genitive-case Russian month names, as they appear in `1tv.ru` search
/// results.
pub const RUSSIAN_MONTHS: MonthTable = &[
    ("января", 1),
    ("февраля", 2),
    ("марта", 3),
    ("апреля", 4),
    ("мая", 5),
    ("июня", 6),
    ("июля", 7),
    ("августа", 8),
    ("сентября", 9),
    ("октября", 10),
    ("ноября", 11),
    ("декабря", 12),
];

/// Convert a `day monthname year` date string to `mm/dd/yyyy`.
///
/// # Errors
///
/// * [`DateError::MalformedDate`] if the input does not split into three
///   tokens with a numeric day and year.
/// * [`DateError::UnrecognizedMonth`] if the month token is not in
///   `months`. Never silently defaulted; callers skip the record and
///   keep the session alive.
pub fn convert_date(raw: &str, months: MonthTable) -> Result<String, DateError> {
    let mut parts = raw.split_whitespace();
    let (Some(day), Some(month_name), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(DateError::MalformedDate(raw.to_string()));
    };

    let day: u32 = day
        .parse()
        .map_err(|_| DateError::MalformedDate(raw.to_string()))?;
    let year: u32 = year
        .parse()
        .map_err(|_| DateError::MalformedDate(raw.to_string()))?;

    let month = months
        .iter()
        .find(|(name, _)| *name == month_name)
        .map(|(_, number)| *number)
        .ok_or_else(|| DateError::UnrecognizedMonth(month_name.to_string()))?;

    Ok(format!("{month:02}/{day:02}/{year}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_date_march() {
        assert_eq!(
            convert_date("15 марта 2020", RUSSIAN_MONTHS).unwrap(),
            "03/15/2020"
        );
    }

    #[test]
    fn test_convert_date_every_month() {
        for (name, number) in RUSSIAN_MONTHS {
            let converted = convert_date(&format!("21 {name} 2019"), RUSSIAN_MONTHS).unwrap();
            assert_eq!(converted, format!("{number:02}/21/2019"));
        }
    }

    #[test]
    fn test_convert_date_pads_single_digit_day() {
        assert_eq!(
            convert_date("1 января 2015", RUSSIAN_MONTHS).unwrap(),
            "01/01/2015"
        );
    }

    #[test]
    fn test_convert_date_unrecognized_month() {
        let err = convert_date("15 smarch 2020", RUSSIAN_MONTHS).unwrap_err();
        assert_eq!(err, DateError::UnrecognizedMonth("smarch".to_string()));
    }

    #[test]
    fn test_convert_date_nominative_case_is_rejected() {
        // The table is genitive; "март" alone must not silently map.
        let err = convert_date("15 март 2020", RUSSIAN_MONTHS).unwrap_err();
        assert_eq!(err, DateError::UnrecognizedMonth("март".to_string()));
    }

    #[test]
    fn test_convert_date_malformed() {
        assert_eq!(
            convert_date("вчера", RUSSIAN_MONTHS).unwrap_err(),
            DateError::MalformedDate("вчера".to_string())
        );
        assert_eq!(
            convert_date("15 марта 2020 г.", RUSSIAN_MONTHS).unwrap_err(),
            DateError::MalformedDate("15 марта 2020 г.".to_string())
        );
        assert_eq!(
            convert_date("пятнадцатое марта 2020", RUSSIAN_MONTHS).unwrap_err(),
            DateError::MalformedDate("пятнадцатое марта 2020".to_string())
        );
    }
}
