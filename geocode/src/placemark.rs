use serde::{Deserialize, Serialize};

/// A street address resolved from a coordinate.
///
/// Every component is optional; services fill in what they know.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Placemark {
    /// House number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_thoroughfare: Option<String>,
    /// Street name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thoroughfare: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    /// State or province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrative_area: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Country name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Placemark {
    /// Set the house number.
    #[must_use]
    pub fn sub_thoroughfare(mut self, value: impl Into<String>) -> Self {
        self.sub_thoroughfare = Some(value.into());
        self
    }

    /// Set the street name.
    #[must_use]
    pub fn thoroughfare(mut self, value: impl Into<String>) -> Self {
        self.thoroughfare = Some(value.into());
        self
    }

    /// Set the city.
    #[must_use]
    pub fn locality(mut self, value: impl Into<String>) -> Self {
        self.locality = Some(value.into());
        self
    }

    /// Set the state or province.
    #[must_use]
    pub fn administrative_area(mut self, value: impl Into<String>) -> Self {
        self.administrative_area = Some(value.into());
        self
    }

    /// Set the postal code.
    #[must_use]
    pub fn postal_code(mut self, value: impl Into<String>) -> Self {
        self.postal_code = Some(value.into());
        self
    }

    /// Set the country.
    #[must_use]
    pub fn country(mut self, value: impl Into<String>) -> Self {
        self.country = Some(value.into());
        self
    }

    /// Two-line postal address: street on the first line, city, state and
    /// postal code on the second.
    #[must_use]
    pub fn address(&self) -> String {
        let mut street = String::new();
        append_text(&mut street, self.sub_thoroughfare.as_deref(), " ");
        append_text(&mut street, self.thoroughfare.as_deref(), " ");

        let mut city = String::new();
        append_text(&mut city, self.locality.as_deref(), " ");
        append_text(&mut city, self.administrative_area.as_deref(), " ");
        append_text(&mut city, self.postal_code.as_deref(), " ");

        let city = (!city.is_empty()).then_some(city);
        append_text(&mut street, city.as_deref(), "\n");
        street
    }

    /// Single-line form for list rows: `"1 Infinite Loop, Cupertino"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = String::new();
        append_text(&mut text, self.sub_thoroughfare.as_deref(), "");
        append_text(&mut text, self.thoroughfare.as_deref(), " ");
        append_text(&mut text, self.locality.as_deref(), ", ");
        text
    }
}

/// Append `text` to `buf`, preceded by `separator` unless `buf` is empty.
/// `None` leaves `buf` untouched.
pub fn append_text(buf: &mut String, text: Option<&str>, separator: &str) {
    if let Some(text) = text {
        if !buf.is_empty() {
            buf.push_str(separator);
        }
        buf.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infinite_loop() -> Placemark {
        Placemark::default()
            .sub_thoroughfare("1")
            .thoroughfare("Infinite Loop")
            .locality("Cupertino")
            .administrative_area("CA")
            .postal_code("95014")
            .country("United States")
    }

    #[test]
    fn test_append_text() {
        let mut buf = String::new();
        append_text(&mut buf, Some("a"), ", ");
        append_text(&mut buf, None, ", ");
        append_text(&mut buf, Some("b"), ", ");
        assert_eq!(buf, "a, b");
    }

    #[test]
    fn test_address_two_lines() {
        assert_eq!(infinite_loop().address(), "1 Infinite Loop\nCupertino CA 95014");
    }

    #[test]
    fn test_address_without_street() {
        let placemark = Placemark::default().locality("Reykjavík");
        assert_eq!(placemark.address(), "Reykjavík");
    }

    #[test]
    fn test_summary() {
        assert_eq!(infinite_loop().summary(), "1 Infinite Loop, Cupertino");
        assert_eq!(Placemark::default().summary(), "");
    }

    #[test]
    fn test_serde_skips_missing_parts() {
        let json = serde_json::to_string(&Placemark::default().locality("Oslo"));
        assert_eq!(json.ok().as_deref(), Some(r#"{"locality":"Oslo"}"#));
    }
}
