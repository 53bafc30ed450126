//! Document number generators for the sender and application references.

use chrono::{Datelike, Local, NaiveDate};
use rand::Rng;

pub const DEFAULT_DOC_NO_APP_PREFIX: &str = "J";

/// `ddmmyy` + `R` + 5 random digits, 12 chars so it fits the form limit.
pub fn generate_sender_doc_no() -> String {
    generate_sender_doc_no_with(Local::now().date_naive(), &mut rand::rng())
}

pub fn generate_sender_doc_no_with<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
    let serial: u32 = rng.random_range(1..=99_999);
    format!("{}R{:05}", date.format("%d%m%y"), serial)
}

/// `yy` + prefix + a 6 digit random number zero-padded to 12 digits.
pub fn generate_doc_no_app(prefix: &str) -> String {
    generate_doc_no_app_with(Local::now().date_naive(), prefix, &mut rand::rng())
}

pub fn generate_doc_no_app_with<R: Rng + ?Sized>(date: NaiveDate, prefix: &str, rng: &mut R) -> String {
    let serial: u32 = rng.random_range(100_000..=999_999);
    format!("{:02}{}{:012}", date.year() % 100, prefix, serial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::form::DOCUMENT_NUMBER_MAX_CHARS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sender_doc_no_layout() {
        let mut rng = StdRng::seed_from_u64(7);
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();

        let doc_no = generate_sender_doc_no_with(date, &mut rng);

        assert_eq!(doc_no.len(), DOCUMENT_NUMBER_MAX_CHARS);
        assert!(doc_no.starts_with("090325R"));
        assert!(doc_no[7..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_doc_no_app_layout() {
        let mut rng = StdRng::seed_from_u64(42);
        let date = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();

        let doc_no = generate_doc_no_app_with(date, DEFAULT_DOC_NO_APP_PREFIX, &mut rng);

        assert_eq!(doc_no.len(), 15);
        assert!(doc_no.starts_with("25J000000"));
        assert!(doc_no[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generated_numbers_are_random() {
        let first = generate_sender_doc_no();
        let unique = (0..20).any(|_| generate_sender_doc_no() != first);
        assert!(unique);
    }
}
