//! `KEY=value|KEY=value` text → struct, driven by a static table per type.
//!
//! Unknown keys are ignored. A part without `=` is an error, and so is a value
//! the field setter cannot parse.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldsError {
    #[error("invalid {kind}: {part}")]
    InvalidPart { kind: &'static str, part: String },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("no address found")]
    NoAddress,
}

pub(crate) type Setter<T> = fn(&mut T, &str) -> Result<(), ()>;

/// Types that can be filled from `KEY=value|...` text.
pub(crate) trait TextFields: Default + Sized + 'static {
    /// Used in the error for a malformed part.
    const KIND: &'static str;
    const FIELDS: &'static [(&'static str, Setter<Self>)];
}

pub(crate) fn parse_fields<T: TextFields>(text: &str) -> Result<T, FieldsError> {
    let mut out = T::default();
    for part in text.split('|') {
        let Some((key, value)) = part.split_once('=') else {
            return Err(FieldsError::InvalidPart {
                kind: T::KIND,
                part: part.to_owned(),
            });
        };
        if let Some((name, set)) = T::FIELDS.iter().find(|(name, _)| *name == key) {
            set(&mut out, value).map_err(|()| FieldsError::InvalidValue {
                key: *name,
                value: value.to_owned(),
            })?;
        }
    }
    Ok(out)
}

/// Comma separated list of `KEY=value|...` items; blank text is an empty list.
pub(crate) fn parse_list<T: TextFields>(text: &str) -> Result<Vec<T>, FieldsError> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_fields)
        .collect()
}

pub(crate) fn set_port(port: &mut u16, value: &str) -> Result<(), ()> {
    *port = value.parse().map_err(|_| ())?;
    Ok(())
}
