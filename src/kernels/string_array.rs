//! This module contains the kernel for string dictionary encoding.
//!
//! This is a Layer 2 (Sparsity Exploitation) transform for text columns. It
//! builds a dictionary of unique strings in first-occurrence order, stores the
//! dictionary as one concatenated string plus a cumulative byte-offset table,
//! and replaces every value with its dictionary index. Empty strings are not
//! stored; they map to index `-1`.

use hashbrown::HashMap;

use crate::error::BinaryCifError;

/// The three streams produced by dictionary encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryParts {
    /// All unique non-empty strings, concatenated in first-occurrence order.
    pub string_data: String,
    /// `offsets[i]..offsets[i + 1]` is the byte range of entry `i`. Starts at 0.
    pub offsets: Vec<i32>,
    /// One dictionary index per input value, `-1` for the empty string.
    pub indices: Vec<i32>,
}

impl DictionaryParts {
    pub fn dictionary_len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

pub fn encode<S: AsRef<str>>(values: &[S]) -> Result<DictionaryParts, BinaryCifError> {
    let mut lookup: HashMap<&str, i32> = HashMap::new();
    let mut string_data = String::new();
    let mut offsets = vec![0i32];
    let mut indices = Vec::with_capacity(values.len());

    for value in values {
        let s = value.as_ref();
        if s.is_empty() {
            indices.push(-1);
            continue;
        }
        let next_index = lookup.len() as i32;
        let index = match lookup.get(s) {
            Some(&index) => index,
            None => {
                string_data.push_str(s);
                let end = i32::try_from(string_data.len()).map_err(|_| BinaryCifError::OutOfRange {
                    encoding: "StringArray",
                    value: format!("dictionary of {} bytes", string_data.len()),
                })?;
                offsets.push(end);
                lookup.insert(s, next_index);
                next_index
            }
        };
        indices.push(index);
    }

    Ok(DictionaryParts {
        string_data,
        offsets,
        indices,
    })
}

pub fn decode(
    string_data: &str,
    offsets: &[i64],
    indices: &[i64],
) -> Result<Vec<String>, BinaryCifError> {
    let mut dictionary: Vec<&str> = Vec::with_capacity(offsets.len().saturating_sub(1));
    for window in offsets.windows(2) {
        let (start, end) = (window[0] as usize, window[1] as usize);
        let entry = string_data
            .get(start..end)
            .filter(|_| window[0] >= 0 && window[0] <= window[1])
            .ok_or_else(|| {
                BinaryCifError::StringArrayError(format!(
                    "Offset range {}..{} is not a valid slice of the string data",
                    window[0], window[1]
                ))
            })?;
        dictionary.push(entry);
    }

    indices
        .iter()
        .map(|&index| {
            if index < 0 {
                return Ok(String::new());
            }
            dictionary
                .get(index as usize)
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    BinaryCifError::StringArrayError(format!(
                        "Index {} is outside the dictionary of {} entries",
                        index,
                        dictionary.len()
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_first_occurrence_order() {
        let values = vec!["ALA", "GLY", "ALA", "", "SER", "GLY"];
        let parts = encode(&values).unwrap();
        assert_eq!(parts.string_data, "ALAGLYSER");
        assert_eq!(parts.offsets, vec![0, 3, 6, 9]);
        assert_eq!(parts.indices, vec![0, 1, 0, -1, 2, 1]);
        assert_eq!(parts.dictionary_len(), 3);
    }

    #[test]
    fn test_roundtrip_with_multibyte_text() {
        let values: Vec<String> = vec!["Å".into(), "β-sheet".into(), "".into(), "Å".into()];
        let parts = encode(&values).unwrap();
        let offsets: Vec<i64> = parts.offsets.iter().map(|&v| v as i64).collect();
        let indices: Vec<i64> = parts.indices.iter().map(|&v| v as i64).collect();
        let decoded = decode(&parts.string_data, &offsets, &indices).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_bad_index_is_rejected() {
        let result = decode("AB", &[0, 1, 2], &[0, 5]);
        assert!(matches!(result, Err(BinaryCifError::StringArrayError(_))));
    }

    #[test]
    fn test_offset_inside_code_point_is_rejected() {
        let result = decode("Å", &[0, 1], &[0]);
        assert!(result.is_err());
    }
}
