use std::fmt;
use std::str::FromStr;

use url::Url;

use super::errors::EmailError;
use super::errors::FieldError;
use super::errors::PhoneError;

/// Email address type
///
/// Validated with an RFC 5322 parser and stored lower-cased, so lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let normalized = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Israeli phone number: `0`, a digit 2-9, then 7 or 8 more digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phone(String);

impl Phone {
    pub fn new(phone: String) -> Result<Self, PhoneError> {
        let phone = phone.trim().to_string();
        let bytes = phone.as_bytes();

        let valid = (9..=10).contains(&bytes.len())
            && bytes[0] == b'0'
            && (b'2'..=b'9').contains(&bytes[1])
            && bytes[2..].iter().all(u8::is_ascii_digit);

        if valid {
            Ok(Self(phone))
        } else {
            Err(PhoneError::InvalidFormat(phone))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trim `value` and check its length in characters.
///
/// # Errors
/// * `TooShort` - Fewer than `min` characters after trimming
/// * `TooLong` - More than `max` characters after trimming
pub fn bounded_text(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, FieldError> {
    let value = value.trim();
    let actual = value.chars().count();

    if actual < min {
        Err(FieldError::TooShort { field, min, actual })
    } else if actual > max {
        Err(FieldError::TooLong { field, max, actual })
    } else {
        Ok(value.to_string())
    }
}

/// Empty, or an absolute http(s) URL.
pub fn optional_web_url(field: &'static str, value: &str) -> Result<String, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }

    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(value.to_string())
        }
        _ => Err(FieldError::InvalidUrl { field }),
    }
}

/// Picture attached to a user or a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

impl Image {
    const ALT_MAX: usize = 100;

    pub const DEFAULT_USER_URL: &'static str =
        "https://cdn.pixabay.com/photo/2016/04/01/10/11/avatar-1299805_960_720.png";
    pub const DEFAULT_USER_ALT: &'static str = "User profile image";
    pub const DEFAULT_CARD_URL: &'static str =
        "https://cdn.pixabay.com/photo/2016/04/20/08/21/entrepreneur-1340649_960_720.jpg";
    pub const DEFAULT_CARD_ALT: &'static str = "Business card image";

    /// Build an image, substituting `default` for missing or blank parts.
    pub fn new(
        url: Option<String>,
        alt: Option<String>,
        default: (&str, &str),
    ) -> Result<Self, FieldError> {
        let url = optional_web_url("image url", url.as_deref().unwrap_or_default())?;
        let alt = bounded_text("image alt", alt.as_deref().unwrap_or_default(), 0, Self::ALT_MAX)?;

        Ok(Self {
            url: if url.is_empty() { default.0.to_string() } else { url },
            alt: if alt.is_empty() { default.1.to_string() } else { alt },
        })
    }

    pub fn user_default() -> Self {
        Self {
            url: Self::DEFAULT_USER_URL.to_string(),
            alt: Self::DEFAULT_USER_ALT.to_string(),
        }
    }

    pub fn card_default() -> Self {
        Self {
            url: Self::DEFAULT_CARD_URL.to_string(),
            alt: Self::DEFAULT_CARD_ALT.to_string(),
        }
    }
}

/// Postal address of a user or a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub state: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: u32,
    pub zip: String,
}

/// Raw address fields, all optional, for partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPatch {
    pub state: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<i64>,
    pub zip: Option<String>,
}

impl Address {
    /// Create a validated address.
    ///
    /// # Errors
    /// * `TooShort` / `TooLong` - A text field is out of bounds
    /// * `TooSmall` - House number below 1
    pub fn new(
        state: &str,
        country: &str,
        city: &str,
        street: &str,
        house_number: i64,
        zip: &str,
    ) -> Result<Self, FieldError> {
        if house_number < 1 {
            return Err(FieldError::TooSmall {
                field: "house number",
                min: 1,
                actual: house_number,
            });
        }
        let house_number = u32::try_from(house_number).map_err(|_| FieldError::TooLong {
            field: "house number",
            max: 10,
            actual: house_number.to_string().len(),
        })?;

        Ok(Self {
            state: bounded_text("state", state, 0, 50)?,
            country: bounded_text("country", country, 2, 50)?,
            city: bounded_text("city", city, 2, 50)?,
            street: bounded_text("street", street, 2, 100)?,
            house_number,
            zip: bounded_text("zip", zip, 0, 20)?,
        })
    }

    /// Apply a partial update, re-validating the merged address.
    pub fn patched(&self, patch: AddressPatch) -> Result<Self, FieldError> {
        Self::new(
            patch.state.as_deref().unwrap_or(&self.state),
            patch.country.as_deref().unwrap_or(&self.country),
            patch.city.as_deref().unwrap_or(&self.city),
            patch.street.as_deref().unwrap_or(&self.street),
            patch
                .house_number
                .unwrap_or_else(|| i64::from(self.house_number)),
            patch.zip.as_deref().unwrap_or(&self.zip),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address::new("", "Israel", "Tel Aviv", "Dizengoff", 50, "").unwrap()
    }

    #[test]
    fn test_email_is_lowercased() {
        let email = EmailAddress::new("  Alice@Example.COM ".to_string()).unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_rejects_garbage() {
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_phone_formats() {
        assert!(Phone::new("0501234567".to_string()).is_ok());
        assert!(Phone::new("031234567".to_string()).is_ok());

        for bad in ["0123456789", "501234567", "05012345", "05012345678", "050-123456"] {
            assert!(Phone::new(bad.to_string()).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn test_bounded_text() {
        assert_eq!(bounded_text("title", "  ab  ", 2, 5).unwrap(), "ab");
        assert_eq!(
            bounded_text("title", "a", 2, 5),
            Err(FieldError::TooShort {
                field: "title",
                min: 2,
                actual: 1
            })
        );
        assert_eq!(
            bounded_text("title", "abcdef", 2, 5),
            Err(FieldError::TooLong {
                field: "title",
                max: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn test_bounded_text_counts_chars_not_bytes() {
        assert!(bounded_text("name", "שלום", 2, 4).is_ok());
    }

    #[test]
    fn test_optional_web_url() {
        assert_eq!(optional_web_url("web", "").unwrap(), "");
        assert!(optional_web_url("web", "https://example.com/about").is_ok());
        assert!(optional_web_url("web", "ftp://example.com").is_err());
        assert!(optional_web_url("web", "example").is_err());
    }

    #[test]
    fn test_image_defaults() {
        let image = Image::new(None, Some("".to_string()), (Image::DEFAULT_CARD_URL, Image::DEFAULT_CARD_ALT)).unwrap();
        assert_eq!(image, Image::card_default());
    }

    #[test]
    fn test_address_validation() {
        assert!(matches!(
            Address::new("", "I", "Tel Aviv", "Dizengoff", 1, ""),
            Err(FieldError::TooShort { field: "country", .. })
        ));
        assert!(matches!(
            Address::new("", "Israel", "Tel Aviv", "Dizengoff", 0, ""),
            Err(FieldError::TooSmall { field: "house number", .. })
        ));
    }

    #[test]
    fn test_address_patch_merges_fields() {
        let patched = address()
            .patched(AddressPatch {
                city: Some("Haifa".to_string()),
                house_number: Some(7),
                ..AddressPatch::default()
            })
            .unwrap();

        assert_eq!(patched.city, "Haifa");
        assert_eq!(patched.house_number, 7);
        assert_eq!(patched.street, "Dizengoff");
        assert_eq!(patched.country, "Israel");
    }
}
