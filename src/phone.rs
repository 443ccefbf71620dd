use rlibphonenumber::{region_code::RegionCode, PhoneNumber, PhoneNumberFormat, PHONE_NUMBER_UTIL};

/// Characters the number field accepts (a phone keypad plus separators).
pub fn accepts_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')' | '.' | '#' | '*')
}

/// Number as shown in the list. The stored value is never rewritten.
pub fn display_number(raw: &str, default_region: Option<&str>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    parse_with_regions(trimmed, default_region).unwrap_or_else(|| trimmed.to_string())
}

fn parse_with_regions(input: &str, default_region: Option<&str>) -> Option<String> {
    let util = &*PHONE_NUMBER_UTIL;
    let mut candidates: Vec<&str> = Vec::new();

    if let Some(region) = default_region {
        if !region.is_empty() {
            candidates.push(region);
        }
    }

    // Without a region only numbers in international form can be parsed.
    if candidates.is_empty() && !input.starts_with('+') {
        return None;
    }

    let unknown = RegionCode::get_unknown();
    if candidates
        .iter()
        .all(|candidate| !candidate.eq_ignore_ascii_case(unknown))
    {
        candidates.push(unknown);
    }

    for region in candidates {
        if let Ok(parsed) = util.parse(input, region) {
            // Short codes parse but are not real numbers; show those as typed.
            if util.is_valid_number(&parsed) {
                return Some(format_parsed_number(&parsed));
            }
        }
    }

    None
}

fn format_parsed_number(number: &PhoneNumber) -> String {
    let mut formatted = PHONE_NUMBER_UTIL
        .format(number, PhoneNumberFormat::E164)
        .into_owned();

    if number.has_extension() {
        let ext = number.extension();
        if !ext.is_empty() {
            formatted.push_str(" ext. ");
            formatted.push_str(ext);
        }
    }

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_phone_pad_characters() {
        for c in "+55 (11) 9999-0000".chars() {
            assert!(accepts_char(c), "{c:?} should be accepted");
        }
        assert!(!accepts_char('a'));
        assert!(!accepts_char('/'));
    }

    #[test]
    fn test_display_keeps_unparseable_input() {
        assert_eq!(display_number("  123  ", None), "123");
        assert_eq!(display_number("", Some("BR")), "");
    }

    #[test]
    fn test_display_formats_with_region() {
        assert_eq!(display_number("(11) 98765-4321", Some("BR")), "+5511987654321");
    }

    #[test]
    fn test_display_keeps_short_codes_as_typed() {
        assert_eq!(display_number("123", Some("BR")), "123");
        assert_eq!(display_number("*123#", Some("BR")), "*123#");
    }
}
