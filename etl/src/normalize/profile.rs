//! Customer profile normalization.
//!
//! The raw id is dropped and the row position becomes the person reference.
//! Missing incomes are filled with the mean of the present ones.

use serde::Serialize;

use crate::error::{NormalizeError, NormalizeResult};
use crate::logs::log_warning;
use crate::models::{Gender, PersonRef, Profile, RawProfile};

/// Normalized profile table, indexed from 0.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedProfiles {
    pub profiles: Vec<Profile>,
    /// Mean written into missing incomes, if any were missing.
    pub imputed_income: Option<f64>,
    /// Number of rows whose income was imputed.
    pub imputed_count: usize,
}

impl NormalizedProfiles {
    pub fn get(&self, person: PersonRef) -> Option<&Profile> {
        self.profiles.get(person.0)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn encode_gender(row: usize, gender: Option<&str>) -> Gender {
    match gender {
        None => Gender::Unknown,
        Some(code) => Gender::from_code(code).unwrap_or_else(|| {
            log_warning(format!("Profile {}: unknown gender '{}', encoded as 0", row, code));
            Gender::Unknown
        }),
    }
}

/// Mean over the present values of the full column.
fn mean_income(raw: &[RawProfile]) -> Option<f64> {
    let (sum, count) = raw
        .iter()
        .filter_map(|p| p.income)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Normalize the profile table.
pub fn normalize_profiles(raw: Vec<RawProfile>) -> NormalizeResult<NormalizedProfiles> {
    let missing = raw.iter().filter(|p| p.income.is_none()).count();

    // Computed before any row is filled in
    let mean = mean_income(&raw);

    let fill = match (missing, mean) {
        (0, _) => None,
        (_, Some(mean)) => Some(mean),
        (missing, None) => return Err(NormalizeError::NoIncomeData { missing }),
    };

    let profiles = raw
        .into_iter()
        .enumerate()
        .map(|(row, p)| Profile {
            index: PersonRef(row),
            age: p.age,
            became_member_on: p.became_member_on,
            gender: encode_gender(row, p.gender.as_deref()),
            income: p.income.or(fill).unwrap_or_default(),
        })
        .collect();

    Ok(NormalizedProfiles {
        profiles,
        imputed_income: fill,
        imputed_count: missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(rows: serde_json::Value) -> Vec<RawProfile> {
        serde_json::from_value(rows).unwrap()
    }

    #[test]
    fn test_gender_codes() {
        let profiles = normalize_profiles(raw(json!([
            { "id": "a", "age": 55, "became_member_on": 20170715, "gender": "F", "income": 112000.0 },
            { "id": "b", "age": 75, "became_member_on": 20170509, "gender": "M", "income": 100000.0 },
            { "id": "c", "age": 68, "became_member_on": 20180426, "gender": "O", "income": 70000.0 },
            { "id": "d", "age": 118, "became_member_on": 20170804, "gender": null, "income": 50000.0 },
        ])))
        .unwrap();

        let codes: Vec<u8> = profiles.profiles.iter().map(|p| p.gender.code()).collect();
        assert_eq!(codes, vec![2, 3, 1, 0]);
        assert_eq!(profiles.get(PersonRef(2)).unwrap().age, 68);
        assert_eq!(profiles.imputed_count, 0);
        assert!(profiles.imputed_income.is_none());
    }

    #[test]
    fn test_unknown_gender_text() {
        let profiles = normalize_profiles(raw(json!([
            { "id": "a", "age": 30, "became_member_on": 20170101, "gender": "X", "income": 1.0 },
        ])))
        .unwrap();

        assert_eq!(profiles.profiles[0].gender, Gender::Unknown);
    }

    #[test]
    fn test_income_mean_imputation() {
        let profiles = normalize_profiles(raw(json!([
            { "id": "a", "age": 30, "became_member_on": 20170101, "income": 40000.0 },
            { "id": "b", "age": 31, "became_member_on": 20170101 },
            { "id": "c", "age": 32, "became_member_on": 20170101, "income": 80000.0 },
            { "id": "d", "age": 33, "became_member_on": 20170101, "income": null },
            { "id": "e", "age": 34, "became_member_on": 20170101, "income": 90000.0 },
        ])))
        .unwrap();

        // Mean of 40k, 80k, 90k regardless of where the gaps sit
        let mean = 70000.0;
        let incomes: Vec<f64> = profiles.profiles.iter().map(|p| p.income).collect();
        assert_eq!(incomes, vec![40000.0, mean, 80000.0, mean, 90000.0]);
        assert_eq!(profiles.imputed_income, Some(mean));
        assert_eq!(profiles.imputed_count, 2);
    }

    #[test]
    fn test_no_income_data() {
        let result = normalize_profiles(raw(json!([
            { "id": "a", "age": 30, "became_member_on": 20170101 },
        ])));

        assert!(matches!(result, Err(NormalizeError::NoIncomeData { missing: 1 })));
    }

    #[test]
    fn test_empty_table() {
        let profiles = normalize_profiles(Vec::new()).unwrap();
        assert!(profiles.is_empty());
    }
}
